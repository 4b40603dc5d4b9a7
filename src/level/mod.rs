//! Level content loaded from TOML

pub mod definition;
mod loader;

pub use definition::{InitialWells, LevelDefinition};
pub use loader::{load_level, load_levels, parse_level};
