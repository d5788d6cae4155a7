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

//! Tank combat gameplay: components, templates, settings and systems.

pub mod components;
pub mod config;
pub mod systems;
pub mod templates;

pub use components::{PlayerTag, Projectile, VehicleLinks};
pub use config::{LogSettings, SimulationConfig, SimulationSettings};
pub use systems::{default_schedule, PlayerControlSystem, ProjectileSystem, TankSteeringSystem};
pub use templates::{register_default_templates, spawn_cannonball, spawn_tank};
