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

//! Archetype storage with row allocation and removal
//!
//! Every archetype owns one `Vec<T>` per component type in its signature plus
//! the list of entities occupying its rows. Column `i`, row `r` and
//! `entities[r]` always describe the same entity.

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::component::Component;
use crate::entity::EntityId;

/// Component signature, kept sorted so equal sets hash equally
pub type ArchetypeSignature = SmallVec<[TypeId; 8]>;

/// Build a sorted, de-duplicated signature
pub fn normalize_signature(mut signature: ArchetypeSignature) -> ArchetypeSignature {
    signature.sort_unstable();
    signature.dedup();
    signature
}

/// Type-erased component column
pub trait ComponentColumn: Send + Sync {
    /// Name of the stored component type
    fn type_name(&self) -> &'static str;

    /// Number of stored values
    fn len(&self) -> usize;

    /// Is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh column of the same component type
    fn clone_empty(&self) -> Box<dyn ComponentColumn>;

    /// Swap-remove `row` and drop the value
    fn swap_remove_drop(&mut self, row: usize);

    /// Swap-remove `row` and push the value onto `dst`.
    /// Returns false (moving nothing) if `dst` stores a different type.
    fn swap_remove_into(&mut self, row: usize, dst: &mut dyn ComponentColumn) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Column for component type `T`
pub struct TypedColumn<T: Component> {
    data: Vec<T>,
}

impl<T: Component> TypedColumn<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn boxed() -> Box<dyn ComponentColumn> {
        Box::new(Self::new())
    }

    /// Take the most recently pushed value
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }
}

impl<T: Component> Default for TypedColumn<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentColumn for TypedColumn<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn clone_empty(&self) -> Box<dyn ComponentColumn> {
        Self::boxed()
    }

    fn swap_remove_drop(&mut self, row: usize) {
        if row < self.data.len() {
            self.data.swap_remove(row);
        }
    }

    fn swap_remove_into(&mut self, row: usize, dst: &mut dyn ComponentColumn) -> bool {
        if row >= self.data.len() {
            return false;
        }
        let Some(dst) = dst.as_any_mut().downcast_mut::<Self>() else {
            return false;
        };
        dst.data.push(self.data.swap_remove(row));
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Archetype: Structure of Arrays storage
pub struct Archetype {
    signature: ArchetypeSignature,
    entities: Vec<EntityId>,
    components: Vec<Box<dyn ComponentColumn>>,
    component_indices: FxHashMap<TypeId, usize>,
}

impl Archetype {
    /// Create new archetype from `(type, column)` pairs.
    ///
    /// The signature is derived from the column types.
    pub fn new(columns: Vec<(TypeId, Box<dyn ComponentColumn>)>) -> Self {
        let mut columns = columns;
        columns.sort_by_key(|(type_id, _)| *type_id);
        columns.dedup_by_key(|(type_id, _)| *type_id);

        let mut signature = ArchetypeSignature::new();
        let mut components = Vec::with_capacity(columns.len());
        let mut component_indices = FxHashMap::default();
        for (idx, (type_id, column)) in columns.into_iter().enumerate() {
            signature.push(type_id);
            components.push(column);
            component_indices.insert(type_id, idx);
        }

        Self {
            signature,
            entities: Vec::new(),
            components,
            component_indices,
        }
    }

    /// Get signature
    pub fn signature(&self) -> &ArchetypeSignature {
        &self.signature
    }

    /// Check whether the archetype stores component type `type_id`
    pub fn has_column(&self, type_id: TypeId) -> bool {
        self.component_indices.contains_key(&type_id)
    }

    /// Typed column, immutable
    pub fn column<T: Component>(&self) -> Option<&Vec<T>> {
        let idx = *self.component_indices.get(&TypeId::of::<T>())?;
        self.components[idx]
            .as_any()
            .downcast_ref::<TypedColumn<T>>()
            .map(|column| &column.data)
    }

    /// Typed column, mutable
    pub fn column_mut<T: Component>(&mut self) -> Option<&mut Vec<T>> {
        let idx = *self.component_indices.get(&TypeId::of::<T>())?;
        self.components[idx]
            .as_any_mut()
            .downcast_mut::<TypedColumn<T>>()
            .map(|column| &mut column.data)
    }

    /// Empty copies of every column, keyed by type
    pub fn empty_columns(&self) -> Vec<(TypeId, Box<dyn ComponentColumn>)> {
        self.signature
            .iter()
            .zip(&self.components)
            .map(|(&type_id, column)| (type_id, column.clone_empty()))
            .collect()
    }

    /// Names of the stored component types, in signature order
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.type_name()).collect()
    }

    /// Record a new row for `entity`. Component values must be pushed onto
    /// every column by the caller before the archetype is used again.
    pub(crate) fn push_entity(&mut self, entity: EntityId) -> usize {
        let row = self.entities.len();
        self.entities.push(entity);
        row
    }

    /// Remove a row and drop its components.
    ///
    /// Returns the entity that was swapped into `row`, if any.
    pub fn remove_row(&mut self, row: usize) -> Option<EntityId> {
        if row >= self.entities.len() {
            return None;
        }

        for column in &mut self.components {
            column.swap_remove_drop(row);
        }
        self.entities.swap_remove(row);

        self.entities.get(row).copied()
    }

    /// Move a row into `target`.
    ///
    /// Components `target` does not store are pushed onto `spill` when its type
    /// matches and dropped otherwise. Returns the new row in `target` and the
    /// entity swapped into `row` here. Components `target` stores but this
    /// archetype lacks must be pushed by the caller afterwards.
    pub(crate) fn move_row(
        &mut self,
        row: usize,
        target: &mut Archetype,
        mut spill: Option<&mut dyn ComponentColumn>,
    ) -> (usize, Option<EntityId>) {
        let entity = self.entities[row];

        for (type_id, column) in self.signature.iter().zip(self.components.iter_mut()) {
            match target.component_indices.get(type_id) {
                Some(&dst_idx) => {
                    let moved = column.swap_remove_into(row, target.components[dst_idx].as_mut());
                    debug_assert!(moved, "column type mismatch for {}", column.type_name());
                }
                None => {
                    let spilled = match spill.as_mut() {
                        Some(spill) => column.swap_remove_into(row, &mut **spill),
                        None => false,
                    };
                    if !spilled {
                        column.swap_remove_drop(row);
                    }
                }
            }
        }

        self.entities.swap_remove(row);
        let new_row = target.push_entity(entity);

        (new_row, self.entities.get(row).copied())
    }

    /// Get all entities
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if archetype is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Reserve space for additional rows in the entity list
    pub fn reserve_rows(&mut self, additional: usize) {
        self.entities.reserve(additional);
    }
}
