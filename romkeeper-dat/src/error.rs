/// Errors that can occur while loading or matching against a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed catalog: {0}")]
    Malformed(String),

    #[error("Malformed catalog: details block missing for '{game}'")]
    MissingDetails { game: String },

    #[error("Catalog not found: {0}")]
    NotFound(String),
}

impl CatalogError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn missing_details(game: impl Into<String>) -> Self {
        Self::MissingDetails { game: game.into() }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
