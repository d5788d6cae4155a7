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

//! Ballistic projectiles with a flat ground plane at y = 0.

use glam::Vec3;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::builtin::transform::Transform;
use crate::error::Result;
use crate::game::components::Projectile;
use crate::query::Entity;
use crate::system::{System, SystemContext};
use crate::world::World;

/// Gravitational acceleration
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);

/// Advance one projectile by `dt` (explicit Euler).
///
/// Position moves with the velocity from before this step. Returns true if
/// the projectile is at or below the ground; its velocity is then left alone.
pub fn integrate_projectile(transform: &mut Transform, projectile: &mut Projectile, dt: f32) -> bool {
    transform.translation += projectile.velocity * dt;
    if transform.translation.y <= 0.0 {
        return true;
    }
    projectile.velocity += GRAVITY * dt;
    false
}

/// Moves projectiles and queues destruction of grounded ones
#[derive(Debug, Default)]
pub struct ProjectileSystem;

impl System for ProjectileSystem {
    fn name(&self) -> &'static str {
        "projectile"
    }

    fn run(&mut self, world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("projectile_system", entity_count = world.entity_count()).entered();

        let dt = ctx.delta_seconds();
        for (entity, transform, projectile) in world.query_mut::<(Entity, &mut Transform, &mut Projectile)>() {
            if integrate_projectile(transform, projectile, dt) {
                ctx.commands.destroy(entity);
            }
        }
        Ok(())
    }
}
