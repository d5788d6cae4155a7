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

// Per-tick gameplay systems

pub mod player_control;
pub mod projectile;
pub mod tank_steering;

pub use player_control::PlayerControlSystem;
pub use projectile::{integrate_projectile, ProjectileSystem, GRAVITY};
pub use tank_steering::{steering_angle, TankSteeringSystem, TANK_SPEED, TURRET_SPIN_RATE};

use crate::schedule::Schedule;

/// Projectile, then tank steering, then player control
pub fn default_schedule() -> Schedule {
    Schedule::new()
        .with_system(ProjectileSystem)
        .with_system(TankSteeringSystem::new())
        .with_system(PlayerControlSystem)
}
