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

//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use tank_ecs::prelude::*;
//! ```

pub use crate::builtin::{FrameInput, InputAxes, Transform};
pub use crate::command::{CommandBuffer, FlushReport, PendingEntity};
pub use crate::component::{Bundle, Component};
pub use crate::debug::WorldInspector;
pub use crate::entity::EntityId;
pub use crate::error::{EcsError, Result};
pub use crate::executor::{Executor, FrameReport};
pub use crate::game::{PlayerTag, Projectile, SimulationConfig, SimulationSettings, VehicleLinks};
pub use crate::hierarchy::{LinkedEntities, Parent};
pub use crate::query::{Entity, Query, QueryMut};
pub use crate::render::{CameraPose, RenderInstance};
pub use crate::schedule::Schedule;
pub use crate::simulation::Simulation;
pub use crate::system::{System, SystemContext};
pub use crate::template::{TemplateId, Templates};
pub use crate::time::{FixedTime, Time};
pub use crate::world::World;
pub use glam::{Quat, Vec3};
