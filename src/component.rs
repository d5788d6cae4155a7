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

//! Component and Bundle traits
//!
//! Components are data attached to entities.
//! Bundles group multiple components for spawning.

use std::any::TypeId;

use smallvec::{smallvec, SmallVec};

use crate::archetype::{Archetype, ComponentColumn, TypedColumn};

/// Maximum number of components supported by Bundle implementations
pub const MAX_BUNDLE_COMPONENTS: usize = 8;

/// Marker trait for components
///
/// Components must be 'static (no borrowed data)
pub trait Component: 'static + Send + Sync {}

/// Automatically implement Component for all valid types
impl<T: 'static + Send + Sync> Component for T {}

/// Bundle of components
///
/// Allows spawning entities with multiple components at once.
pub trait Bundle: Send + Sync + 'static {
    /// Get type IDs of all components in bundle, in declaration order
    fn type_ids() -> SmallVec<[TypeId; MAX_BUNDLE_COMPONENTS]>
    where
        Self: Sized;

    /// Type names, parallel to `type_ids`
    fn type_names() -> SmallVec<[&'static str; MAX_BUNDLE_COMPONENTS]>
    where
        Self: Sized;

    /// Empty columns for an archetype holding exactly this bundle
    fn empty_columns() -> Vec<(TypeId, Box<dyn ComponentColumn>)>
    where
        Self: Sized;

    /// Push every component onto the matching column of `archetype`
    fn push_components(self, archetype: &mut Archetype);
}

// DO NOT implement Bundle for T: Component
// This conflicts with tuple implementations
// Instead, implement only for tuples

// Macro for tuple Bundle implementations
macro_rules! impl_bundle {
    ($($T:ident),*) => {
        impl<$($T: crate::component::Component),*> Bundle for ($($T,)*) {
            fn type_ids() -> SmallVec<[TypeId; MAX_BUNDLE_COMPONENTS]> {
                smallvec![$(TypeId::of::<$T>()),*]
            }

            fn type_names() -> SmallVec<[&'static str; MAX_BUNDLE_COMPONENTS]> {
                smallvec![$(std::any::type_name::<$T>()),*]
            }

            fn empty_columns() -> Vec<(TypeId, Box<dyn ComponentColumn>)> {
                vec![$((TypeId::of::<$T>(), TypedColumn::<$T>::boxed())),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn push_components(self, archetype: &mut Archetype) {
                let ($($T,)*) = self;
                $(
                    if let Some(column) = archetype.column_mut::<$T>() {
                        column.push($T);
                    }
                )*
            }
        }
    };
}

// Empty bundle backs `World::create`
impl_bundle!();
impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    #![allow(dead_code)]
    use super::*;

    #[test]
    fn test_single_component() {
        #[derive(Debug, Clone, Copy)]
        struct Position {
            x: f32,
            y: f32,
        }

        let type_ids = <(Position,)>::type_ids();
        assert_eq!(type_ids.len(), 1);
        assert_eq!(type_ids[0], TypeId::of::<Position>());
    }

    #[test]
    fn test_multiple_components() {
        #[derive(Debug, Clone, Copy)]
        struct Position {
            x: f32,
        }

        #[derive(Debug, Clone, Copy)]
        struct Velocity {
            x: f32,
        }

        let type_ids = <(Position, Velocity)>::type_ids();
        assert_eq!(type_ids.len(), 2);
        assert_eq!(<(Position, Velocity)>::empty_columns().len(), 2);
    }

    #[test]
    fn test_push_components_into_archetype() {
        let mut archetype = Archetype::new(<(u8, i64)>::empty_columns());
        (3u8, -9i64).push_components(&mut archetype);

        assert_eq!(archetype.column::<u8>().unwrap().as_slice(), &[3]);
        assert_eq!(archetype.column::<i64>().unwrap().as_slice(), &[-9]);
    }

    #[test]
    fn test_empty_bundle() {
        assert!(<()>::type_ids().is_empty());
        assert!(<()>::empty_columns().is_empty());
    }
}
