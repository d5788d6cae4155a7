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

//! World: central entity and archetype storage

use std::any::{Any, TypeId};

use ahash::AHashMap;
use slotmap::SlotMap;
use tracing::trace;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::{normalize_signature, Archetype, ArchetypeSignature, ComponentColumn, TypedColumn};
use crate::component::{Bundle, Component};
use crate::entity::{EntityId, EntityLocation};
use crate::error::{EcsError, Result};
use crate::hierarchy::LinkedEntities;
use crate::query::{Query, QueryDescriptor, QueryFetch, QueryMut, ReadOnlyFetch};

/// Index of the archetype holding entities without components
const EMPTY_ARCHETYPE: usize = 0;

/// Central ECS world
///
/// Holds every entity, its components (grouped into archetypes) and the
/// typed singleton resources.
pub struct World {
    /// Entity locations keyed by SlotMap IDs
    entity_locations: SlotMap<EntityId, EntityLocation>,

    /// All archetypes in the world
    archetypes: Vec<Archetype>,

    /// Maps component type signatures to archetype indices
    archetype_index: AHashMap<ArchetypeSignature, usize>,

    /// Cache for archetype transitions when adding/removing components
    transitions: AHashMap<(usize, TypeId, bool), usize>,

    /// Typed resources (singletons) for global state
    resources: AHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        let mut world = Self {
            entity_locations: SlotMap::with_key(),
            archetypes: Vec::with_capacity(16),
            archetype_index: AHashMap::with_capacity(16),
            transitions: AHashMap::with_capacity(32),
            resources: AHashMap::new(),
        };

        // Empty archetype is always at index 0
        let empty = world.get_or_create_archetype_with(&ArchetypeSignature::new(), Vec::new);
        debug_assert_eq!(empty, EMPTY_ARCHETYPE);
        world
    }

    /// Create an entity with no components
    pub fn create(&mut self) -> EntityId {
        let id = self.entity_locations.insert(EntityLocation {
            archetype_id: EMPTY_ARCHETYPE,
            archetype_row: usize::MAX,
        });
        let row = self.archetypes[EMPTY_ARCHETYPE].push_entity(id);
        self.entity_locations[id].archetype_row = row;
        id
    }

    /// Spawn a new entity with the given bundle of components.
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if the bundle names the
    /// same component type twice.
    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> Result<EntityId> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.spawn").entered();

        let type_ids = B::type_ids();
        let signature = normalize_signature(type_ids.clone());
        if signature.len() != type_ids.len() {
            let names = B::type_names();
            let duplicate = (0..type_ids.len())
                .find(|&i| type_ids[..i].contains(&type_ids[i]))
                .map_or("<unknown>", |i| names[i]);
            return Err(EcsError::DuplicateComponent(duplicate));
        }

        let archetype_id = self.get_or_create_archetype_with(&signature, B::empty_columns);
        let id = self.entity_locations.insert(EntityLocation {
            archetype_id,
            archetype_row: usize::MAX,
        });

        let archetype = &mut self.archetypes[archetype_id];
        let row = archetype.push_entity(id);
        bundle.push_components(archetype);
        self.entity_locations[id].archetype_row = row;

        Ok(id)
    }

    /// Spawn one entity per bundle
    pub fn spawn_batch<B, I>(&mut self, bundles: I) -> Result<Vec<EntityId>>
    where
        B: Bundle,
        I: IntoIterator<Item = B>,
    {
        let bundles = bundles.into_iter();
        let mut ids = Vec::with_capacity(bundles.size_hint().0);
        for bundle in bundles {
            ids.push(self.spawn(bundle)?);
        }
        Ok(ids)
    }

    /// Check if an entity is alive
    ///
    /// Returns true if the entity handle is valid and the entity exists in the world.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entity_locations.contains_key(entity)
    }

    /// Despawn entity immediately, together with its [`LinkedEntities`].
    ///
    /// Returns [`EcsError::EntityNotFound`] for destroyed or stale ids.
    pub fn despawn(&mut self, entity: EntityId) -> Result<()> {
        let mut destroyed = Vec::new();
        self.despawn_into(entity, &mut destroyed)
    }

    /// Despawn `entity` and its linked group, recording every removed id
    pub fn despawn_into(&mut self, entity: EntityId, destroyed: &mut Vec<EntityId>) -> Result<()> {
        let location = self
            .entity_locations
            .remove(entity)
            .ok_or(EcsError::EntityNotFound)?;

        let archetype = &mut self.archetypes[location.archetype_id];
        let linked = archetype
            .column::<LinkedEntities>()
            .and_then(|column| column.get(location.archetype_row))
            .cloned();

        if let Some(swapped_entity) = archetype.remove_row(location.archetype_row) {
            if let Some(swapped_loc) = self.entity_locations.get_mut(swapped_entity) {
                swapped_loc.archetype_row = location.archetype_row;
            }
        }
        destroyed.push(entity);

        for member in linked.iter().flat_map(LinkedEntities::iter) {
            if let Err(err) = self.despawn_into(member, destroyed) {
                trace!(?entity, ?member, %err, "linked entity already gone");
            }
        }

        Ok(())
    }

    /// Get entity location
    pub fn get_entity_location(&self, entity: EntityId) -> Option<EntityLocation> {
        self.entity_locations.get(entity).copied()
    }

    /// Get immutable reference to a component on an entity
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.try_get(entity).ok()
    }

    /// Get mutable reference to a component on an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.try_get_mut(entity).ok()
    }

    /// Component lookup that tells a stale entity apart from a missing component
    pub fn try_get<T: Component>(&self, entity: EntityId) -> Result<&T> {
        let location = self
            .entity_locations
            .get(entity)
            .ok_or(EcsError::EntityNotFound)?;
        self.archetypes[location.archetype_id]
            .column::<T>()
            .and_then(|column| column.get(location.archetype_row))
            .ok_or(EcsError::ComponentNotFound)
    }

    /// Mutable variant of [`World::try_get`]
    pub fn try_get_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T> {
        let location = *self
            .entity_locations
            .get(entity)
            .ok_or(EcsError::EntityNotFound)?;
        self.archetypes[location.archetype_id]
            .column_mut::<T>()
            .and_then(|column| column.get_mut(location.archetype_row))
            .ok_or(EcsError::ComponentNotFound)
    }

    /// Check if entity has a specific component
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.entity_locations
            .get(entity)
            .is_some_and(|location| self.archetypes[location.archetype_id].has_column(TypeId::of::<T>()))
    }

    /// Add a component to an entity, overwriting an existing value of the same type
    ///
    /// Adding a new type moves the entity to another archetype.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) -> Result<()> {
        let location = *self
            .entity_locations
            .get(entity)
            .ok_or(EcsError::EntityNotFound)?;

        if let Some(slot) = self.archetypes[location.archetype_id]
            .column_mut::<T>()
            .and_then(|column| column.get_mut(location.archetype_row))
        {
            *slot = component;
            return Ok(());
        }

        let target = self.transition_target(location.archetype_id, TypeId::of::<T>(), true, TypedColumn::<T>::boxed);
        self.move_entity(entity, location, target, None);

        if let Some(column) = self.archetypes[target].column_mut::<T>() {
            column.push(component);
        }
        Ok(())
    }

    /// Remove a component from an entity and return it
    ///
    /// This moves the entity to the archetype without `T`.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Result<T> {
        let location = *self
            .entity_locations
            .get(entity)
            .ok_or(EcsError::EntityNotFound)?;

        let type_id = TypeId::of::<T>();
        if !self.archetypes[location.archetype_id].has_column(type_id) {
            return Err(EcsError::ComponentNotFound);
        }

        let target = self.transition_target(location.archetype_id, type_id, false, TypedColumn::<T>::boxed);
        let mut removed = TypedColumn::<T>::new();
        self.move_entity(entity, location, target, Some(&mut removed));

        removed.pop().ok_or(EcsError::ComponentNotFound)
    }

    /// Read-only query
    pub fn query<'w, Q>(&'w self) -> Query<'w, Q>
    where
        Q: ReadOnlyFetch<'w>,
    {
        Query::new(self)
    }

    /// Mutable query
    ///
    /// # Panics
    /// Panics if `Q` names a component mutably more than once.
    pub fn query_mut<'w, Q>(&'w mut self) -> QueryMut<'w, Q>
    where
        Q: QueryFetch<'w>,
    {
        QueryMut::new(self)
    }

    /// Indices of the non-empty archetypes matching `descriptor`
    pub fn matching_archetypes(&self, descriptor: &QueryDescriptor) -> Vec<usize> {
        if descriptor.is_contradictory() {
            return Vec::new();
        }
        self.archetypes
            .iter()
            .enumerate()
            .filter(|(_, archetype)| !archetype.is_empty() && descriptor.matches(archetype))
            .map(|(id, _)| id)
            .collect()
    }

    /// Internal: move an entity into `target`, patching both locations.
    /// `spill` receives a component `target` lacks when its type matches.
    fn move_entity(
        &mut self,
        entity: EntityId,
        old_loc: EntityLocation,
        target: usize,
        spill: Option<&mut dyn ComponentColumn>,
    ) {
        debug_assert_ne!(old_loc.archetype_id, target);

        // Access both archetypes safely using split_at_mut
        let (old_arch, new_arch) = if old_loc.archetype_id < target {
            let (left, right) = self.archetypes.split_at_mut(target);
            (&mut left[old_loc.archetype_id], &mut right[0])
        } else {
            let (left, right) = self.archetypes.split_at_mut(old_loc.archetype_id);
            (&mut right[0], &mut left[target])
        };

        let (new_row, swapped) = old_arch.move_row(old_loc.archetype_row, new_arch, spill);

        if let Some(swapped_entity) = swapped {
            if let Some(swapped_loc) = self.entity_locations.get_mut(swapped_entity) {
                swapped_loc.archetype_row = old_loc.archetype_row;
            }
        }

        if let Some(loc) = self.entity_locations.get_mut(entity) {
            loc.archetype_id = target;
            loc.archetype_row = new_row;
        }
    }

    /// Archetype reached from `from` by adding or removing `type_id`
    fn transition_target<F>(&mut self, from: usize, type_id: TypeId, adding: bool, new_column: F) -> usize
    where
        F: FnOnce() -> Box<dyn ComponentColumn>,
    {
        if let Some(&to) = self.transitions.get(&(from, type_id, adding)) {
            return to;
        }

        let mut columns = self.archetypes[from].empty_columns();
        if adding {
            columns.push((type_id, new_column()));
        } else {
            columns.retain(|(column_type, _)| *column_type != type_id);
        }

        let signature = normalize_signature(columns.iter().map(|(t, _)| *t).collect());
        let to = self.get_or_create_archetype_with(&signature, move || columns);
        self.transitions.insert((from, type_id, adding), to);
        to
    }

    /// Get or create the archetype for a sorted signature
    fn get_or_create_archetype_with<F>(&mut self, signature: &ArchetypeSignature, columns: F) -> usize
    where
        F: FnOnce() -> Vec<(TypeId, Box<dyn ComponentColumn>)>,
    {
        if let Some(&id) = self.archetype_index.get(signature) {
            return id;
        }

        let archetype = Archetype::new(columns());
        debug_assert_eq!(archetype.signature(), signature);

        self.archetypes.push(archetype);
        let id = self.archetypes.len() - 1;
        self.archetype_index.insert(signature.clone(), id);

        trace!(archetype = id, components = signature.len(), "created archetype");
        id
    }

    /// Iterate every live entity id
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entity_locations.keys()
    }

    /// Get archetype by ID
    pub fn get_archetype(&self, id: usize) -> Option<&Archetype> {
        self.archetypes.get(id)
    }

    /// Get all archetypes
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub(crate) fn archetypes_mut(&mut self) -> &mut [Archetype] {
        &mut self.archetypes
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entity_locations.len()
    }

    /// Insert a resource (singleton)
    ///
    /// # Example
    /// ```ignore
    /// world.insert_resource(SimulationConfig::default());
    /// ```
    pub fn insert_resource<R: Send + Sync + 'static>(&mut self, resource: R) {
        self.resources.insert(TypeId::of::<R>(), Box::new(resource));
    }

    /// Get an immutable reference to a resource
    ///
    /// Returns `None` if the resource doesn't exist.
    pub fn resource<R: 'static>(&self) -> Option<&R> {
        self.resources
            .get(&TypeId::of::<R>())
            .and_then(|r| r.downcast_ref())
    }

    /// Get a mutable reference to a resource
    ///
    /// Returns `None` if the resource doesn't exist.
    pub fn resource_mut<R: 'static>(&mut self) -> Option<&mut R> {
        self.resources
            .get_mut(&TypeId::of::<R>())
            .and_then(|r| r.downcast_mut())
    }

    /// Like [`World::resource`], failing with [`EcsError::ResourceNotFound`]
    pub fn try_resource<R: 'static>(&self) -> Result<&R> {
        self.resource::<R>()
            .ok_or(EcsError::ResourceNotFound(std::any::type_name::<R>()))
    }

    /// Check if a resource exists
    pub fn has_resource<R: 'static>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<R>())
    }

    /// Remove a resource and return it
    pub fn remove_resource<R: 'static>(&mut self) -> Option<R> {
        self.resources
            .remove(&TypeId::of::<R>())
            .and_then(|r| r.downcast().ok())
            .map(|boxed| *boxed)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
