//! Shared vocabulary for romkeeper: license classes, region tags and the
//! main-region priority rules used when bucketing exported files.

pub mod error;
pub mod license;
pub mod region;
pub mod util;

pub use error::CoreError;
pub use license::License;
pub use region::{
    DEFAULT_REST_OF_WORLD, PRIORITY_REGIONS, UNKNOWN_REGION, WORLD_REGION, main_region,
    parse_region_list, rest_of_world_label,
};
