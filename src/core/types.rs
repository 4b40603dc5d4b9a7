//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Number of wells on the ring
pub const WELL_COUNT: usize = 6;

/// One value per well, indexed by hue
pub type WellArray = [f64; WELL_COUNT];

/// Simulation time in seconds since the session started
pub type SimTime = f64;

/// Ring neighbors of a well as `(left, right)` = `(i - 1, i + 1) mod 6`
pub fn neighbors(index: usize) -> (usize, usize) {
    ((index + WELL_COUNT - 1) % WELL_COUNT, (index + 1) % WELL_COUNT)
}

/// Well across the ring
pub fn opposite(index: usize) -> usize {
    (index + WELL_COUNT / 2) % WELL_COUNT
}

/// Angle of a well's center on the ring, in radians, with hue 0 at the top
pub fn well_angle(index: usize) -> f64 {
    index as f64 * TAU / WELL_COUNT as f64 - FRAC_PI_2
}

/// The six emotional hues, one per well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Hue {
    Red = 0,
    Orange = 1,
    Yellow = 2,
    Green = 3,
    Blue = 4,
    Violet = 5,
}

impl Hue {
    pub const ALL: [Hue; WELL_COUNT] = [
        Hue::Red,
        Hue::Orange,
        Hue::Yellow,
        Hue::Green,
        Hue::Blue,
        Hue::Violet,
    ];

    pub fn from_index(index: usize) -> Option<Hue> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Hue::Red => "Red",
            Hue::Orange => "Orange",
            Hue::Yellow => "Yellow",
            Hue::Green => "Green",
            Hue::Blue => "Blue",
            Hue::Violet => "Violet",
        }
    }
}

/// Inclusive bounds of a well scalar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Signed distance outside the bounds: positive above max, negative below min
    pub fn excess(&self, value: f64) -> f64 {
        value - self.clamp(value)
    }

    /// Room left before `value` hits the bound in the direction of `sign`
    pub fn capacity(&self, value: f64, sign: f64) -> f64 {
        if sign > 0.0 {
            (self.max - value).max(0.0)
        } else {
            (value - self.min).max(0.0)
        }
    }
}

/// Outcome state of the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelState {
    Playing,
    Win,
    Lose,
}

impl LevelState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LevelState::Playing)
    }
}

/// Whether the session is in a match or sitting in the lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Lobby,
    Playing,
}
