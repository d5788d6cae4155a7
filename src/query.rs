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

//! Query system with archetype filtering
//!
//! Type-safe component queries with automatic archetype matching.
//!
//! A query is a tuple of fetch terms (`&T`, `&mut T`, [`Entity`]) plus
//! optional `with`/`without` filters. Matching happens per archetype: an
//! archetype matches when its signature contains every required type and
//! none of the excluded ones. All rows of one archetype are yielded before
//! moving to the next.
//!
//! ```ignore
//! for (entity, transform) in world
//!     .query_mut::<(Entity, &mut Transform)>()
//!     .with::<VehicleLinks>()
//!     .without::<PlayerTag>()
//! {
//!     transform.translation.x += 1.0;
//! }
//! ```

use std::any::TypeId;
use std::marker::PhantomData;
use std::ptr::NonNull;

#[cfg(feature = "profiling")]
use tracing::info_span;

use smallvec::SmallVec;

use crate::archetype::Archetype;
use crate::component::Component;
use crate::entity::EntityId;
use crate::world::World;

const MAX_FILTER_COMPONENTS: usize = 8;

/// Rows handed to one rayon task at minimum
#[cfg(feature = "parallel")]
const PAR_MIN_ROWS: usize = 64;

/// Required/excluded component sets of a query, plus the access it performs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
    required: SmallVec<[TypeId; MAX_FILTER_COMPONENTS]>,
    excluded: SmallVec<[TypeId; MAX_FILTER_COMPONENTS]>,
    reads: SmallVec<[TypeId; MAX_FILTER_COMPONENTS]>,
    writes: SmallVec<[TypeId; MAX_FILTER_COMPONENTS]>,
}

impl QueryDescriptor {
    /// Empty descriptor (matches every archetype)
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for the fetch terms of `Q`
    pub fn of<Q: QueryFilter>() -> Self {
        let mut descriptor = Self::new();
        Q::describe(&mut descriptor);
        descriptor
    }

    /// Require component `T`
    pub fn with<T: Component>(mut self) -> Self {
        self.require(TypeId::of::<T>());
        self
    }

    /// Exclude component `T`
    pub fn without<T: Component>(mut self) -> Self {
        self.exclude(TypeId::of::<T>());
        self
    }

    /// Add a required type
    pub fn require(&mut self, type_id: TypeId) {
        if !self.required.contains(&type_id) {
            self.required.push(type_id);
        }
    }

    /// Add an excluded type
    pub fn exclude(&mut self, type_id: TypeId) {
        if !self.excluded.contains(&type_id) {
            self.excluded.push(type_id);
        }
    }

    /// Register shared access to a required type
    pub fn add_read(&mut self, type_id: TypeId) {
        self.require(type_id);
        self.reads.push(type_id);
    }

    /// Register exclusive access to a required type
    pub fn add_write(&mut self, type_id: TypeId) {
        self.require(type_id);
        self.writes.push(type_id);
    }

    pub fn required(&self) -> &[TypeId] {
        &self.required
    }

    pub fn excluded(&self) -> &[TypeId] {
        &self.excluded
    }

    /// True if a type is both required and excluded; such a query matches nothing
    pub fn is_contradictory(&self) -> bool {
        self.required.iter().any(|t| self.excluded.contains(t))
    }

    /// True if a written type is fetched more than once
    pub fn has_conflicting_access(&self) -> bool {
        self.writes.iter().enumerate().any(|(i, written)| {
            self.writes[i + 1..].contains(written) || self.reads.contains(written)
        })
    }

    /// Signature ⊇ required and signature ∩ excluded = ∅
    pub fn matches_signature(&self, signature: &[TypeId]) -> bool {
        self.required.iter().all(|t| signature.contains(t))
            && !self.excluded.iter().any(|t| signature.contains(t))
    }

    /// Check archetype against this descriptor
    pub fn matches(&self, archetype: &Archetype) -> bool {
        self.required.iter().all(|&t| archetype.has_column(t))
            && !self.excluded.iter().any(|&t| archetype.has_column(t))
    }
}

/// Query filter trait for type-level archetype matching
pub trait QueryFilter {
    /// Add this term's required types and access to `descriptor`
    fn describe(descriptor: &mut QueryDescriptor);

    /// Check if archetype matches this query
    fn matches_archetype(archetype: &Archetype) -> bool
    where
        Self: Sized,
    {
        QueryDescriptor::of::<Self>().matches(archetype)
    }
}

/// Trait for fetching component data out of an archetype
///
/// # Safety
/// Implementations must only hand out references to rows of the archetype
/// passed to `prepare`, of the component types registered in `describe`.
pub unsafe trait QueryFetch<'w>: QueryFilter {
    /// The type of data returned by the query
    type Item;
    /// State used to fetch data (column base pointers)
    type State: Copy;

    /// Prepare to fetch from an archetype
    ///
    /// # Safety
    /// `archetype` must be valid for `'w`. Unless `Self: ReadOnlyFetch`, the
    /// caller must hold exclusive access to the world.
    unsafe fn prepare(archetype: NonNull<Archetype>) -> Option<Self::State>;

    /// Fetch data for a specific entity
    ///
    /// # Safety
    /// - `row` must be valid for the archetype used in `prepare`
    /// - Mutable fetches must not be called twice for the same row (aliasing)
    unsafe fn fetch(state: Self::State, row: usize) -> Self::Item;
}

/// Fetch terms that never write
///
/// # Safety
/// `prepare` and `fetch` must only read.
pub unsafe trait ReadOnlyFetch<'w>: QueryFetch<'w> {}

impl<T: Component> QueryFilter for &T {
    fn describe(descriptor: &mut QueryDescriptor) {
        descriptor.add_read(TypeId::of::<T>());
    }
}

unsafe impl<'w, T: Component> QueryFetch<'w> for &'w T {
    type Item = &'w T;
    type State = NonNull<T>;

    unsafe fn prepare(archetype: NonNull<Archetype>) -> Option<Self::State> {
        let archetype = unsafe { archetype.as_ref() };
        archetype
            .column::<T>()
            .map(|column| NonNull::from(column.as_slice()).cast::<T>())
    }

    unsafe fn fetch(state: Self::State, row: usize) -> Self::Item {
        unsafe { &*state.as_ptr().add(row) }
    }
}

unsafe impl<'w, T: Component> ReadOnlyFetch<'w> for &'w T {}

impl<T: Component> QueryFilter for &mut T {
    fn describe(descriptor: &mut QueryDescriptor) {
        descriptor.add_write(TypeId::of::<T>());
    }
}

unsafe impl<'w, T: Component> QueryFetch<'w> for &'w mut T {
    type Item = &'w mut T;
    type State = NonNull<T>;

    unsafe fn prepare(archetype: NonNull<Archetype>) -> Option<Self::State> {
        // SAFETY: caller guarantees exclusive world access for mutable fetches
        let archetype = unsafe { &mut *archetype.as_ptr() };
        archetype
            .column_mut::<T>()
            .map(|column| NonNull::from(column.as_mut_slice()).cast::<T>())
    }

    unsafe fn fetch(state: Self::State, row: usize) -> Self::Item {
        unsafe { &mut *state.as_ptr().add(row) }
    }
}

/// Marker type for fetching EntityId in queries
///
/// Use this to access the entity ID during query iteration:
/// ```ignore
/// for (entity, _) in world.query::<(Entity, &Projectile)>() {
///     commands.destroy(entity);
/// }
/// ```
pub struct Entity;

impl QueryFilter for Entity {
    fn describe(_descriptor: &mut QueryDescriptor) {
        // Every archetype has entities
    }
}

unsafe impl<'w> QueryFetch<'w> for Entity {
    type Item = EntityId;
    type State = NonNull<EntityId>;

    unsafe fn prepare(archetype: NonNull<Archetype>) -> Option<Self::State> {
        let archetype = unsafe { archetype.as_ref() };
        Some(NonNull::from(archetype.entities()).cast::<EntityId>())
    }

    unsafe fn fetch(state: Self::State, row: usize) -> Self::Item {
        unsafe { *state.as_ptr().add(row) }
    }
}

unsafe impl<'w> ReadOnlyFetch<'w> for Entity {}

// Tuple implementations
macro_rules! impl_query_tuple {
    ($($T:ident),*) => {
        impl<$($T: QueryFilter),*> QueryFilter for ($($T,)*) {
            fn describe(descriptor: &mut QueryDescriptor) {
                $($T::describe(descriptor);)*
            }
        }

        #[allow(non_snake_case)]
        unsafe impl<'w, $($T: QueryFetch<'w>),*> QueryFetch<'w> for ($($T,)*) {
            type Item = ($($T::Item,)*);
            type State = ($($T::State,)*);

            unsafe fn prepare(archetype: NonNull<Archetype>) -> Option<Self::State> {
                Some(($(unsafe { $T::prepare(archetype) }?,)*))
            }

            unsafe fn fetch(state: Self::State, row: usize) -> Self::Item {
                let ($($T,)*) = state;
                ($(unsafe { <$T as QueryFetch<'w>>::fetch($T, row) },)*)
            }
        }

        unsafe impl<'w, $($T: ReadOnlyFetch<'w>),*> ReadOnlyFetch<'w> for ($($T,)*) {}
    };
}

impl_query_tuple!(A);
impl_query_tuple!(A, B);
impl_query_tuple!(A, B, C);
impl_query_tuple!(A, B, C, D);
impl_query_tuple!(A, B, C, D, E);
impl_query_tuple!(A, B, C, D, E, F);

/// Query iterator
///
/// Walks the matched archetypes in order, yielding every row of one
/// archetype before moving on.
pub struct QueryIter<'w, Q: QueryFetch<'w>> {
    archetypes: NonNull<Archetype>,
    matched: std::vec::IntoIter<usize>,
    state: Option<Q::State>,
    entity_index: usize,
    archetype_len: usize,
    remaining: usize,
    _phantom: PhantomData<(&'w mut World, fn() -> Q)>,
}

impl<'w, Q: QueryFetch<'w>> QueryIter<'w, Q> {
    /// `archetypes` must point at the first element of `world.archetypes()`
    /// and every index in `matched` must be in bounds.
    fn new(archetypes: NonNull<Archetype>, matched: Vec<usize>, remaining: usize) -> Self {
        Self {
            archetypes,
            matched: matched.into_iter(),
            state: None,
            entity_index: 0,
            archetype_len: 0,
            remaining,
            _phantom: PhantomData,
        }
    }
}

impl<'w, Q: QueryFetch<'w>> Iterator for QueryIter<'w, Q> {
    type Item = Q::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(state) = self.state {
                if self.entity_index < self.archetype_len {
                    let row = self.entity_index;
                    self.entity_index += 1;
                    self.remaining -= 1;
                    // SAFETY: row < archetype_len and each row is yielded once
                    return Some(unsafe { Q::fetch(state, row) });
                }
                self.state = None;
            }

            let index = self.matched.next()?;
            // SAFETY: matched indices come from World::matching_archetypes
            let archetype = unsafe { NonNull::new_unchecked(self.archetypes.as_ptr().add(index)) };
            self.archetype_len = unsafe { archetype.as_ref().len() };
            self.entity_index = 0;
            self.state = unsafe { Q::prepare(archetype) };
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'w, Q: QueryFetch<'w>> ExactSizeIterator for QueryIter<'w, Q> {}

fn matched_rows(world: &World, descriptor: &QueryDescriptor) -> (Vec<usize>, usize) {
    let matched = world.matching_archetypes(descriptor);
    let rows = matched
        .iter()
        .filter_map(|&id| world.get_archetype(id))
        .map(Archetype::len)
        .sum();
    (matched, rows)
}

/// Read-only query over a shared world borrow
pub struct Query<'w, Q> {
    world: &'w World,
    descriptor: QueryDescriptor,
    _phantom: PhantomData<Q>,
}

impl<'w, Q> Query<'w, Q>
where
    Q: ReadOnlyFetch<'w>,
{
    /// Create query
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            descriptor: QueryDescriptor::of::<Q>(),
            _phantom: PhantomData,
        }
    }

    /// Only match archetypes that also store `T`
    pub fn with<T: Component>(mut self) -> Self {
        self.descriptor.require(TypeId::of::<T>());
        self
    }

    /// Skip archetypes that store `T`
    pub fn without<T: Component>(mut self) -> Self {
        self.descriptor.exclude(TypeId::of::<T>());
        self
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Iterate query results; each call re-evaluates the archetype match
    pub fn iter(&self) -> QueryIter<'w, Q> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("query.iter", archetype_count = self.world.archetype_count()).entered();

        let (matched, rows) = matched_rows(self.world, &self.descriptor);
        let base = NonNull::from(self.world.archetypes()).cast::<Archetype>();
        QueryIter::new(base, matched, rows)
    }

    /// Count matching entities
    pub fn count(&self) -> usize {
        matched_rows(self.world, &self.descriptor).1
    }
}

impl<'w, Q> IntoIterator for Query<'w, Q>
where
    Q: ReadOnlyFetch<'w>,
{
    type Item = Q::Item;
    type IntoIter = QueryIter<'w, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable query over an exclusive world borrow
pub struct QueryMut<'w, Q> {
    world: &'w mut World,
    descriptor: QueryDescriptor,
    _phantom: PhantomData<Q>,
}

impl<'w, Q> QueryMut<'w, Q>
where
    Q: QueryFetch<'w>,
{
    /// Create mutable query wrapper
    ///
    /// # Panics
    /// Panics if `Q` fetches a component mutably more than once, e.g.
    /// `(&mut Transform, &Transform)`.
    pub fn new(world: &'w mut World) -> Self {
        let descriptor = QueryDescriptor::of::<Q>();
        assert!(
            !descriptor.has_conflicting_access(),
            "query {} borrows a component mutably more than once",
            std::any::type_name::<Q>()
        );
        Self {
            world,
            descriptor,
            _phantom: PhantomData,
        }
    }

    /// Only match archetypes that also store `T`
    pub fn with<T: Component>(mut self) -> Self {
        self.descriptor.require(TypeId::of::<T>());
        self
    }

    /// Skip archetypes that store `T`
    pub fn without<T: Component>(mut self) -> Self {
        self.descriptor.exclude(TypeId::of::<T>());
        self
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Count matching entities
    pub fn count(&self) -> usize {
        matched_rows(self.world, &self.descriptor).1
    }

    /// Parallel iteration over the rows of each matched archetype
    ///
    /// Archetypes are processed one after another; the rows of one archetype
    /// are split across the rayon pool. Rows are disjoint, so no
    /// synchronization is needed as long as `func` only touches its item.
    #[cfg(feature = "parallel")]
    pub fn par_for_each<F>(self, func: F)
    where
        F: Fn(Q::Item) + Send + Sync,
        Q::Item: Send,
    {
        use rayon::prelude::*;

        #[cfg(feature = "profiling")]
        let _span = info_span!("query.par_for_each").entered();

        let matched = self.world.matching_archetypes(&self.descriptor);
        let base = NonNull::from(self.world.archetypes_mut()).cast::<Archetype>();

        for index in matched {
            // SAFETY: index comes from matching_archetypes; we hold &mut World
            let archetype = unsafe { NonNull::new_unchecked(base.as_ptr().add(index)) };
            let len = unsafe { archetype.as_ref().len() };
            let Some(state) = (unsafe { Q::prepare(archetype) }) else {
                continue;
            };

            let shared = SharedState(state);
            (0..len)
                .into_par_iter()
                .with_min_len(PAR_MIN_ROWS)
                .for_each(|row| {
                    // SAFETY: every row index is visited exactly once
                    func(unsafe { Q::fetch(shared.get(), row) });
                });
        }
    }
}

impl<'w, Q> IntoIterator for QueryMut<'w, Q>
where
    Q: QueryFetch<'w>,
{
    type Item = Q::Item;
    type IntoIter = QueryIter<'w, Q>;

    fn into_iter(self) -> Self::IntoIter {
        #[cfg(feature = "profiling")]
        let _span = info_span!("query_mut.iter", archetype_count = self.world.archetype_count()).entered();

        let (matched, rows) = matched_rows(self.world, &self.descriptor);
        let base = NonNull::from(self.world.archetypes_mut()).cast::<Archetype>();
        QueryIter::new(base, matched, rows)
    }
}

/// Column pointers shared across rayon workers; rows never overlap
#[cfg(feature = "parallel")]
struct SharedState<S>(S);

#[cfg(feature = "parallel")]
unsafe impl<S> Send for SharedState<S> {}
#[cfg(feature = "parallel")]
unsafe impl<S> Sync for SharedState<S> {}

#[cfg(feature = "parallel")]
impl<S: Copy> SharedState<S> {
    fn get(&self) -> S {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct A(u32);
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct B;
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct C;

    #[test]
    fn test_descriptor_matching() {
        let descriptor = QueryDescriptor::new().with::<A>().without::<B>();
        let a = TypeId::of::<A>();
        let b = TypeId::of::<B>();
        let c = TypeId::of::<C>();

        assert!(descriptor.matches_signature(&[a]));
        assert!(descriptor.matches_signature(&[a, c]));
        assert!(!descriptor.matches_signature(&[a, b]));
        assert!(!descriptor.matches_signature(&[c]));
    }

    #[test]
    fn test_conflicting_access_detection() {
        assert!(QueryDescriptor::of::<(&mut A, &A)>().has_conflicting_access());
        assert!(QueryDescriptor::of::<(&mut A, &mut A)>().has_conflicting_access());
        assert!(!QueryDescriptor::of::<(&mut A, &B)>().has_conflicting_access());
        assert!(!QueryDescriptor::of::<(&A, &A)>().has_conflicting_access());
    }

    #[test]
    fn test_query_filters() {
        let mut world = World::new();

        world.spawn((A(1), B)).unwrap();
        world.spawn((A(2),)).unwrap();
        world.spawn((B,)).unwrap();

        assert_eq!(world.query::<&A>().with::<B>().count(), 1);
        assert_eq!(world.query::<&A>().without::<B>().count(), 1);
        assert_eq!(world.query::<&A>().count(), 2);

        let only: Vec<u32> = world.query::<&A>().without::<B>().iter().map(|a| a.0).collect();
        assert_eq!(only, vec![2]);
    }

    #[test]
    fn test_contradictory_query_matches_nothing() {
        let mut world = World::new();
        world.spawn((A(1), B)).unwrap();

        let query = world.query::<&A>().with::<B>().without::<B>();
        assert!(query.descriptor().is_contradictory());
        assert_eq!(query.count(), 0);
    }

    #[test]
    fn test_mutable_query_updates_in_place() {
        let mut world = World::new();
        let e1 = world.spawn((A(1),)).unwrap();
        let e2 = world.spawn((A(10), C)).unwrap();

        for a in world.query_mut::<&mut A>() {
            a.0 += 1;
        }

        assert_eq!(world.get_component::<A>(e1), Some(&A(2)));
        assert_eq!(world.get_component::<A>(e2), Some(&A(11)));
    }

    #[test]
    fn test_rows_of_one_archetype_are_contiguous() {
        let mut world = World::new();
        for i in 0..4 {
            world.spawn((A(i),)).unwrap();
            world.spawn((A(100 + i), C)).unwrap();
        }

        let seen: Vec<bool> = world
            .query::<(&A, Entity)>()
            .iter()
            .map(|(_, entity)| world.has_component::<C>(entity))
            .collect();

        let switches = seen.windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(seen.len(), 8);
        assert_eq!(switches, 1);
    }

    #[test]
    fn test_exact_size() {
        let mut world = World::new();
        for i in 0..5 {
            world.spawn((A(i),)).unwrap();
        }
        let mut iter = world.query::<&A>().iter();
        assert_eq!(iter.len(), 5);
        iter.next();
        assert_eq!(iter.len(), 4);
    }

    #[test]
    #[should_panic(expected = "mutably more than once")]
    fn test_aliasing_query_panics() {
        let mut world = World::new();
        let _ = world.query_mut::<(&mut A, &A)>();
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_for_each_visits_every_row() {
        let mut world = World::new();
        for i in 0..1_000 {
            world.spawn((A(i),)).unwrap();
        }
        for i in 0..300 {
            world.spawn((A(i), B)).unwrap();
        }

        world.query_mut::<&mut A>().par_for_each(|a| a.0 *= 2);

        let sum: u64 = world.query::<&A>().iter().map(|a| a.0 as u64).sum();
        let expected: u64 = (0..1_000u64).map(|i| i * 2).sum::<u64>()
            + (0..300u64).map(|i| i * 2).sum::<u64>();
        assert_eq!(sum, expected);
    }
}
