//! Wellspring - deterministic simulation core for a six-well psyche puzzle
//!
//! Six wells sit on a ring, each holding a bounded Amount and Spin. Every tick
//! dispositions push individual wells, equalization spreads any overflow to
//! the ring neighbours, and the Amount x Spin flux of each well drives its
//! Psyche meter. Level objectives are held conditions over those meters.

pub mod breaks;
pub mod core;
pub mod disposition;
pub mod level;
pub mod objective;
pub mod simulation;
