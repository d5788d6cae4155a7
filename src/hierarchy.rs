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

//! Parent links and linked entity groups.
//!
//! `Parent` makes a transform relative to another entity. `LinkedEntities`
//! lists entities that are destroyed together with their owner.

use smallvec::SmallVec;

use crate::builtin::transform::Transform;
use crate::entity::EntityId;
use crate::world::World;

/// Parent chains deeper than this are treated as cycles
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Parent relationship component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub EntityId);

impl Parent {
    pub fn new(parent_id: EntityId) -> Self {
        Self(parent_id)
    }

    pub fn entity_id(&self) -> EntityId {
        self.0
    }
}

/// Entities destroyed together with the owning entity
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkedEntities(SmallVec<[EntityId; 4]>);

impl LinkedEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(entities: &[EntityId]) -> Self {
        Self(SmallVec::from_slice(entities))
    }

    pub fn push(&mut self, entity: EntityId) {
        if !self.0.contains(&entity) {
            self.0.push(entity);
        }
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.0.contains(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compose the world-space transform of `entity` along its `Parent` chain.
///
/// Returns `None` if the entity has no `Transform`. A stale parent ends the
/// chain, as does a chain longer than [`MAX_HIERARCHY_DEPTH`].
pub fn world_transform(world: &World, entity: EntityId) -> Option<Transform> {
    let mut result = *world.get_component::<Transform>(entity)?;
    let mut current = entity;

    for _ in 0..MAX_HIERARCHY_DEPTH {
        let Some(parent) = world.get_component::<Parent>(current) else {
            return Some(result);
        };
        let Some(parent_transform) = world.get_component::<Transform>(parent.0) else {
            return Some(result);
        };
        result = parent_transform.mul_transform(&result);
        current = parent.0;
    }

    tracing::warn!(?entity, "parent chain exceeds {MAX_HIERARCHY_DEPTH} levels");
    Some(result)
}
