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

//! System trait and per-tick context

use crate::builtin::input::InputAxes;
use crate::command::CommandBuffer;
use crate::error::Result;
use crate::render::CameraPose;
use crate::time::Time;
use crate::world::World;

/// System identifier (position in the schedule)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub u32);

/// Everything a system may use besides the world
///
/// Structural changes go through `commands`; they are applied after every
/// system of the tick has run.
pub struct SystemContext<'a> {
    pub time: &'a Time,
    pub input: &'a InputAxes,
    pub commands: &'a mut CommandBuffer,
    /// Camera placement produced this tick, if any
    pub camera: &'a mut Option<CameraPose>,
}

impl SystemContext<'_> {
    /// Shorthand for `time.delta_seconds()`
    pub fn delta_seconds(&self) -> f32 {
        self.time.delta_seconds()
    }
}

/// System trait
pub trait System: Send + Sync {
    /// Get system name
    fn name(&self) -> &'static str;

    /// Run system logic against the world
    fn run(&mut self, world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()>;
}

/// Boxed system
pub type BoxedSystem = Box<dyn System>;
