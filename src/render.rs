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

//! Output handed to the rendering collaborator.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::builtin::transform::Transform;
use crate::entity::EntityId;
use crate::hierarchy::world_transform;
use crate::query::Entity;
use crate::world::World;

/// Distance the follow camera keeps behind its target
pub const CAMERA_FOLLOW_DISTANCE: f32 = 10.0;
/// Height of the follow camera above its target
pub const CAMERA_HEIGHT: f32 = 5.0;

/// Follow camera placement for one tick
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Camera behind and above `transform`, looking at it
    pub fn follow(transform: &Transform) -> Self {
        let target = transform.translation;
        Self {
            position: target - CAMERA_FOLLOW_DISTANCE * transform.forward() + Vec3::new(0.0, CAMERA_HEIGHT, 0.0),
            target,
        }
    }

    /// Right-handed view matrix, +Y up
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/// One live entity with its world-space transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderInstance {
    pub entity: EntityId,
    pub transform: Transform,
}

/// World-space transforms of every entity with a `Transform`
pub fn render_snapshot(world: &World) -> Vec<RenderInstance> {
    world
        .query::<(Entity, &Transform)>()
        .iter()
        .filter_map(|(entity, _)| {
            world_transform(world, entity).map(|transform| RenderInstance { entity, transform })
        })
        .collect()
}
