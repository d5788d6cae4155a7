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

//! Tank ECS - archetype entity component system driving a tank combat sandbox
//!
//! Tanks roam the field on noise-driven headings, the player tank follows
//! input axes and cannonballs fly until they hit the ground plane. Structural
//! changes requested during a tick are recorded in a [`CommandBuffer`] and
//! applied once, after every system ran.

pub mod archetype;
pub mod builtin;
pub mod command;
pub mod component;
pub mod debug;
pub mod entity;
pub mod error;
pub mod executor;
pub mod game;
pub mod hierarchy;
pub mod noise;
pub mod prelude;
pub mod profiling;
pub mod query;
pub mod render;
pub mod schedule;
pub mod simulation;
pub mod system;
pub mod template;
pub mod time;
pub mod world;


pub use archetype::*;
pub use command::*;
pub use component::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use hierarchy::*;
pub use query::*;
pub use render::*;
pub use schedule::*;
pub use simulation::Simulation;
pub use system::*;
pub use template::*;
pub use time::*;
pub use world::*;
