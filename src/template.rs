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

//! Named spawn templates.
//!
//! A template is a function that builds one entity (possibly with linked
//! children) and returns its root. Templates are registered by name in the
//! [`Templates`] world resource and referred to by [`TemplateId`] afterwards,
//! which is what the command buffer and `SimulationConfig` store.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use crate::world::World;

/// Handle to a registered template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u32);

impl TemplateId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Spawn routine stored in the registry
pub type SpawnFn = Arc<dyn Fn(&mut World) -> Result<EntityId> + Send + Sync>;

struct TemplateEntry {
    name: String,
    spawn: SpawnFn,
}

/// Template registry (world resource)
#[derive(Default)]
pub struct Templates {
    by_name: AHashMap<String, TemplateId>,
    entries: Vec<TemplateEntry>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spawn` under `name`.
    ///
    /// Registering an existing name replaces its routine and keeps the id.
    pub fn register<F>(&mut self, name: impl Into<String>, spawn: F) -> TemplateId
    where
        F: Fn(&mut World) -> Result<EntityId> + Send + Sync + 'static,
    {
        let name = name.into();
        let spawn: SpawnFn = Arc::new(spawn);

        if let Some(&id) = self.by_name.get(&name) {
            self.entries[id.0 as usize].spawn = spawn;
            debug!(template = %name, "replaced template");
            return id;
        }

        let id = TemplateId(self.entries.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.entries.push(TemplateEntry { name, spawn });
        id
    }

    /// Look up a template by name
    pub fn id(&self, name: &str) -> Result<TemplateId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| EcsError::TemplateNotFound(name.to_string()))
    }

    pub fn name(&self, id: TemplateId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|entry| entry.name.as_str())
    }

    /// Spawn routine for `id`
    pub fn spawner(&self, id: TemplateId) -> Result<SpawnFn> {
        self.entries
            .get(id.0 as usize)
            .map(|entry| Arc::clone(&entry.spawn))
            .ok_or(EcsError::UnknownTemplateId(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Templates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.name))
            .finish()
    }
}

/// Spawn template `id` from the world's [`Templates`] resource
pub fn instantiate(world: &mut World, id: TemplateId) -> Result<EntityId> {
    let spawn = world.try_resource::<Templates>()?.spawner(id)?;
    spawn(world)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u8);

    #[test]
    fn test_register_and_instantiate() -> Result<()> {
        let mut world = World::new();
        let mut templates = Templates::new();
        let id = templates.register("marker", |world: &mut World| world.spawn((Marker(1),)));
        world.insert_resource(templates);

        let entity = instantiate(&mut world, id)?;
        assert_eq!(world.get_component::<Marker>(entity), Some(&Marker(1)));
        Ok(())
    }

    #[test]
    fn test_reregister_keeps_id() {
        let mut templates = Templates::new();
        let first = templates.register("a", |world: &mut World| Ok(world.create()));
        let second = templates.register("a", |world: &mut World| world.spawn((Marker(2),)));
        assert_eq!(first, second);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates.name(first), Some("a"));
    }

    #[test]
    fn test_lookup_errors() {
        let templates = Templates::new();
        assert_eq!(
            templates.id("missing"),
            Err(EcsError::TemplateNotFound("missing".to_string()))
        );
        assert!(matches!(
            templates.spawner(TemplateId(3)),
            Err(EcsError::UnknownTemplateId(TemplateId(3)))
        ));

        let mut world = World::new();
        assert!(matches!(
            instantiate(&mut world, TemplateId(0)),
            Err(EcsError::ResourceNotFound(_))
        ));
    }
}
