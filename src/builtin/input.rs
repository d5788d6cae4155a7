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

//! Per-tick input snapshot.
//!
//! Input devices are owned by the host; the simulation only sees the axis
//! values sampled for the current frame.
//!
//! # Examples
//!
//! ```
//! use tank_ecs::builtin::{FrameInput, InputAxes};
//!
//! let input = FrameInput::new(1.0 / 60.0).with_axes(InputAxes::new(1.0, 0.0));
//! assert_eq!(input.axes.horizontal, 1.0);
//! ```

use serde::{Deserialize, Serialize};

/// Movement axes, conventionally in [-1, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputAxes {
    /// Left/right, applied along world X
    pub horizontal: f32,
    /// Forward/back, applied along world Z
    pub vertical: f32,
}

impl InputAxes {
    pub const NEUTRAL: InputAxes = InputAxes {
        horizontal: 0.0,
        vertical: 0.0,
    };

    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.horizontal == 0.0 && self.vertical == 0.0
    }
}

/// Everything the host supplies for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Seconds since the previous tick; used as-is, not sanitized
    pub delta_seconds: f32,
    pub axes: InputAxes,
}

impl FrameInput {
    pub fn new(delta_seconds: f32) -> Self {
        Self {
            delta_seconds,
            axes: InputAxes::NEUTRAL,
        }
    }

    pub fn with_axes(mut self, axes: InputAxes) -> Self {
        self.axes = axes;
        self
    }
}
