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

//! Fixed-order system schedule

use crate::system::{BoxedSystem, System, SystemId};

/// Systems in the order they run each tick
#[derive(Default)]
pub struct Schedule {
    pub(crate) systems: Vec<BoxedSystem>,
}

impl Schedule {
    /// Create empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system; it runs after every system added before it
    pub fn add_system(&mut self, system: BoxedSystem) -> SystemId {
        let id = SystemId(self.systems.len() as u32);
        self.systems.push(system);
        id
    }

    /// Builder form of [`Schedule::add_system`]
    pub fn with_system<S: System + 'static>(mut self, system: S) -> Self {
        self.add_system(Box::new(system));
        self
    }

    pub fn system_mut_by_id(&mut self, id: SystemId) -> Option<&mut BoxedSystem> {
        self.systems.get_mut(id.0 as usize)
    }

    /// System names in run order
    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl std::fmt::Debug for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.system_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::system::SystemContext;
    use crate::world::World;

    struct Named(&'static str);

    impl System for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn run(&mut self, _world: &mut World, _ctx: &mut SystemContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_schedule_preserves_order() {
        let schedule = Schedule::new()
            .with_system(Named("first"))
            .with_system(Named("second"))
            .with_system(Named("third"));

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.system_names(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_system_lookup() {
        let mut schedule = Schedule::new();
        let id = schedule.add_system(Box::new(Named("only")));
        assert_eq!(id, SystemId(0));
        assert_eq!(schedule.system_mut_by_id(id).map(|s| s.name()), Some("only"));
        assert!(schedule.system_mut_by_id(SystemId(1)).is_none());
    }
}
