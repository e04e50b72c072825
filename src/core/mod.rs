pub mod config;
pub mod error;
pub mod types;

pub use config::MatchConfig;
pub use error::{CommandError, ConfigError, ConquestError, GeometryError, Result};
pub use types::{DispatchId, FactionId, GeneralId, GroupId, Millis, ProvinceId, Vec2};
