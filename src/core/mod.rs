pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{Result, WellError};
pub use types::{Bounds, Hue, LevelState, SessionMode, WellArray, WELL_COUNT};
