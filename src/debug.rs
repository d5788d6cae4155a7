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

use tracing::{debug, info};

use crate::entity::EntityId;
use crate::world::World;

/// World inspector for debugging
pub struct WorldInspector;

impl WorldInspector {
    /// Get total entity count
    pub fn entity_count(world: &World) -> usize {
        world.entity_count()
    }

    /// Get archetype summary (empty archetypes included)
    pub fn archetype_summary(world: &World) -> Vec<ArchetypeInfo> {
        world
            .archetypes()
            .iter()
            .enumerate()
            .map(|(id, archetype)| ArchetypeInfo {
                id,
                components: archetype
                    .component_names()
                    .into_iter()
                    .map(short_type_name)
                    .collect(),
                entity_count: archetype.len(),
            })
            .collect()
    }

    /// Log world summary
    pub fn log_summary(world: &World) {
        info!(
            entities = Self::entity_count(world),
            archetypes = world.archetype_count(),
            "world summary"
        );
        for info in Self::archetype_summary(world) {
            if info.entity_count > 0 {
                info!(
                    "Archetype {}: {} entities [{}]",
                    info.id,
                    info.entity_count,
                    info.components.join(", ")
                );
            }
        }
    }

    /// Log entity details
    pub fn log_entity(world: &World, entity: EntityId) {
        match world.get_entity_location(entity) {
            Some(location) => {
                let components = world
                    .get_archetype(location.archetype_id)
                    .map(|a| a.component_names().into_iter().map(short_type_name).collect::<Vec<_>>())
                    .unwrap_or_default();
                debug!(
                    ?entity,
                    archetype = location.archetype_id,
                    row = location.archetype_row,
                    components = %components.join(", "),
                    "entity"
                );
            }
            None => debug!(?entity, "entity not found"),
        }
    }
}

/// Archetype information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchetypeInfo {
    pub id: usize,
    pub components: Vec<String>,
    pub entity_count: usize,
}

/// `tank_ecs::game::components::Projectile` -> `Projectile`
fn short_type_name(name: &str) -> String {
    let base = name.split('<').next().unwrap_or(name);
    let short = base.rsplit("::").next().unwrap_or(base);
    format!("{short}{}", &name[base.len()..])
}
