// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Simulation time and fixed timestep support.
//!
//! This module provides:
//! - [`Time`] - delta and elapsed simulation time, advanced by the host
//! - [`FixedTime`] - accumulator that turns variable frame times into fixed steps
//!
//! # Examples
//!
//! ```
//! use tank_ecs::time::{FixedTime, Time};
//!
//! let mut time = Time::new();
//! let mut fixed = FixedTime::new(50); // 50 Hz
//!
//! // In the host loop:
//! for _ in 0..fixed.tick(0.021) {
//!     time.advance(fixed.timestep_seconds());
//! }
//! assert_eq!(time.frame_count(), 1);
//! ```

/// Simulation clock
///
/// Delta time comes from the host each tick and is used as-is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Time {
    /// Seconds covered by the current tick
    delta_seconds: f32,
    /// Total simulated seconds
    elapsed_seconds: f64,
    /// Ticks advanced so far
    frame_count: u64,
}

impl Time {
    /// Create new Time resource
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tick covering `delta_seconds`
    pub fn advance(&mut self, delta_seconds: f32) {
        self.delta_seconds = delta_seconds;
        self.elapsed_seconds += delta_seconds as f64;
        self.frame_count += 1;
    }

    /// Get delta time in seconds
    pub fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }

    /// Get elapsed time in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Get current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Fixed timestep for deterministic updates
#[derive(Clone, Debug)]
pub struct FixedTime {
    /// Fixed timestep in seconds
    timestep: f32,
    /// Accumulated time from variable frame rate
    accumulator: f32,
}

impl FixedTime {
    /// Create new FixedTime with given frequency (Hz)
    pub fn new(hz: u32) -> Self {
        Self::from_seconds(1.0 / hz.max(1) as f32)
    }

    /// Create with explicit timestep
    pub fn from_seconds(timestep: f32) -> Self {
        Self {
            timestep,
            accumulator: 0.0,
        }
    }

    /// Update accumulator and return number of fixed steps to run
    pub fn tick(&mut self, frame_seconds: f32) -> u32 {
        self.accumulator += frame_seconds;

        let mut steps = 0;
        while self.accumulator >= self.timestep {
            self.accumulator -= self.timestep;
            steps += 1;
        }
        steps
    }

    /// Get timestep in seconds
    pub fn timestep_seconds(&self) -> f32 {
        self.timestep
    }

    /// Leftover time as fraction of timestep (0.0 to 1.0)
    pub fn overstep_fraction(&self) -> f32 {
        if self.timestep > 0.0 {
            self.accumulator / self.timestep
        } else {
            0.0
        }
    }
}

impl Default for FixedTime {
    fn default() -> Self {
        Self::new(60) // 60 Hz default
    }
}
