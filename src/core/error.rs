use thiserror::Error;

use crate::core::types::{FactionId, GeneralId, ProvinceId};

/// Expected failures of a player or AI command
///
/// A command that returns one of these has left the world untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Not enough economy: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("Every general in the pool has already been hired")]
    PoolExhausted,

    #[error("Provinces {from} and {to} are not adjacent")]
    InvalidOrder { from: ProvinceId, to: ProvinceId },

    #[error("Faction {faction} does not own province {province}")]
    NotOwned { faction: FactionId, province: ProvinceId },

    #[error("Province {0} already belongs to the attacking faction")]
    SameFaction(ProvinceId),

    #[error("General {0} cannot lead this order")]
    NoCommander(GeneralId),

    #[error("Not enough grain: need {needed}, have {available}")]
    InsufficientGrain { needed: u32, available: u32 },

    #[error("Province {province} holds {available} troops, order needs {needed}")]
    InsufficientGarrison { province: ProvinceId, needed: u32, available: u32 },

    #[error("Unknown faction: {0}")]
    UnknownFaction(FactionId),

    #[error("Unknown province: {0}")]
    UnknownProvince(ProvinceId),

    #[error("Unknown general: {0}")]
    UnknownGeneral(GeneralId),

    #[error("General {0} is marching")]
    GeneralNotIdle(GeneralId),

    #[error("Faction {0} holds no provinces")]
    FactionDefeated(FactionId),

    #[error("Amount must be positive")]
    InvalidAmount,
}

/// Malformed boundary geometry, fatal before match start
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Dataset contains no code-bearing regions")]
    EmptyDataset,

    #[error("Region {code} has no boundary ring")]
    MissingRing { code: String },

    #[error("Region {code} has a degenerate ring ({points} distinct points)")]
    DegenerateRing { code: String, points: usize },

    #[error("Region code {0} appears more than once")]
    DuplicateCode(String),

    #[error("Region {code} has a non-finite coordinate")]
    NonFiniteCoordinate { code: String },
}

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown province code: {0}")]
    UnknownCode(String),

    #[error("Province {code} is claimed by both {first} and {second}")]
    DoubleClaim { code: String, first: String, second: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum ConquestError {
    #[error("Command failed: {0}")]
    Command(#[from] CommandError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ConquestError>;
