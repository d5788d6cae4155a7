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

//! Noise-driven tank steering and turret spin.
//!
//! Every non-player tank samples the noise field at its own XZ position,
//! using its slot index as the Y coordinate so that each tank follows a
//! separate slice of the field. Turrets spin at a constant rate regardless
//! of where the hull is heading.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use tracing::trace;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::builtin::transform::Transform;
use crate::entity::EntityId;
use crate::error::Result;
use crate::game::components::{PlayerTag, VehicleLinks};
use crate::noise::gradient_noise_3d;
use crate::query::Entity;
use crate::system::{System, SystemContext};
use crate::world::World;

/// Hull speed in units per second
pub const TANK_SPEED: f32 = 5.0;
/// World units per noise lattice cell
pub const NOISE_SCALE: f32 = 10.0;
/// Turret yaw rate in radians per second
pub const TURRET_SPIN_RATE: f32 = PI;

/// Heading for a tank at `position` with slot `index`
pub fn steering_angle(position: Vec3, index: u32) -> f32 {
    let sample = Vec3::new(position.x, index as f32, position.z) / NOISE_SCALE;
    (0.5 + gradient_noise_3d(sample)) * 4.0 * PI
}

fn steer(entity: EntityId, transform: &mut Transform, dt: f32) {
    let angle = steering_angle(transform.translation, entity.index());
    let dir = Vec3::new(angle.sin(), 0.0, angle.cos());
    transform.translation += dir * dt * TANK_SPEED;
    transform.rotation = Quat::from_rotation_y(angle);
}

/// Steers AI tanks and spins every turret
#[derive(Debug, Default)]
pub struct TankSteeringSystem {
    turrets: Vec<EntityId>,
}

impl TankSteeringSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for TankSteeringSystem {
    fn name(&self) -> &'static str {
        "tank_steering"
    }

    fn run(&mut self, world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("tank_steering_system").entered();

        let dt = ctx.delta_seconds();
        let hulls = world
            .query_mut::<(Entity, &mut Transform)>()
            .with::<VehicleLinks>()
            .without::<PlayerTag>();

        #[cfg(feature = "parallel")]
        hulls.par_for_each(|(entity, transform)| steer(entity, transform, dt));

        #[cfg(not(feature = "parallel"))]
        for (entity, transform) in hulls {
            steer(entity, transform, dt);
        }

        let spin = Quat::from_rotation_y(TURRET_SPIN_RATE * dt);
        self.turrets.clear();
        self.turrets
            .extend(world.query::<&VehicleLinks>().iter().map(|links| links.turret));

        for &turret in &self.turrets {
            match world.try_get_mut::<Transform>(turret) {
                Ok(transform) => transform.rotation = (spin * transform.rotation).normalize(),
                Err(err) => trace!(?turret, %err, "skipping turret spin"),
            }
        }
        Ok(())
    }
}
