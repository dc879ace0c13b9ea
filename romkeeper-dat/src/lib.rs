pub mod catalog;
pub mod error;
pub mod hasher;
pub mod matcher;
pub mod registry;
pub mod similarity;
pub mod source;
pub mod summary;

pub use catalog::{LoadOptions, LoadReport, LoadedCatalog, expected_file_name, load};
pub use error::CatalogError;
pub use matcher::{
    MatchProgress, MatchReport, MemberMatch, MemberOutcome, match_archive, match_member,
    match_package,
};
pub use registry::{
    CloneLinkReport, FileRecord, GameRecord, HashIndex, MemberLocation, MergedValue, ParentRef,
    Registry,
};
pub use source::{DB_DIR, DB_EXPORT_MARKER, find_catalog_archive, load_from_library};
pub use summary::CatalogSummary;
