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

//! Tank and cannonball templates.
//!
//! A tank is three entities: the hull (root), a turret parented to the hull
//! and a cannon parented to the turret. The hull owns both parts through
//! [`LinkedEntities`], so destroying it removes the whole tank.

use glam::Vec3;

use crate::builtin::transform::Transform;
use crate::entity::EntityId;
use crate::error::Result;
use crate::game::components::{Projectile, VehicleLinks};
use crate::hierarchy::{LinkedEntities, Parent};
use crate::template::{TemplateId, Templates};
use crate::world::World;

pub const TANK_TEMPLATE: &str = "tank";
pub const CANNONBALL_TEMPLATE: &str = "cannonball";

/// Turret position relative to the hull
pub const TURRET_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);
/// Cannon position relative to the turret
pub const CANNON_OFFSET: Vec3 = Vec3::new(0.0, 0.25, 0.6);

/// Spawn a tank at the origin and return its hull
pub fn spawn_tank(world: &mut World) -> Result<EntityId> {
    let hull = world.spawn((Transform::default(),))?;
    let turret = world.spawn((Transform::from_translation(TURRET_OFFSET), Parent(hull)))?;
    let cannon = world.spawn((Transform::from_translation(CANNON_OFFSET), Parent(turret)))?;

    world.add_component(hull, VehicleLinks { turret, cannon })?;
    world.add_component(hull, LinkedEntities::from_slice(&[turret, cannon]))?;
    Ok(hull)
}

/// Spawn a resting cannonball at the origin
pub fn spawn_cannonball(world: &mut World) -> Result<EntityId> {
    world.spawn((Transform::default(), Projectile::default()))
}

/// Register the built-in templates; returns (tank, cannonball)
pub fn register_default_templates(templates: &mut Templates) -> (TemplateId, TemplateId) {
    let tank = templates.register(TANK_TEMPLATE, spawn_tank);
    let cannonball = templates.register(CANNONBALL_TEMPLATE, spawn_cannonball);
    (tank, cannonball)
}
