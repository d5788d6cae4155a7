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

//! Deferred command buffer
//!
//! Systems record structural changes here while they iterate; the buffer is
//! flushed against the world once per tick. A flush applies every destroy
//! first, then every template creation, then every component edit, each
//! group in recording order.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::component::Component;
use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use crate::template::{instantiate, TemplateId};
use crate::world::World;

/// Placeholder for an entity created by a pending template command.
///
/// Only meaningful within the buffer that issued it, until its next flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingEntity(u32);

/// Entity a component edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Live(EntityId),
    Pending(PendingEntity),
}

impl From<EntityId> for EditTarget {
    fn from(entity: EntityId) -> Self {
        EditTarget::Live(entity)
    }
}

impl From<PendingEntity> for EditTarget {
    fn from(pending: PendingEntity) -> Self {
        EditTarget::Pending(pending)
    }
}

/// Type alias for component edit closures
pub type EditClosure = Box<dyn FnOnce(&mut World, EntityId) -> Result<()> + Send>;

/// Deferred command for world mutations
pub enum Command {
    /// Destroy entity (and its linked group)
    Destroy(EntityId),

    /// Instantiate a template
    Create {
        template: TemplateId,
        pending: PendingEntity,
    },

    /// Insert or remove a component
    Edit {
        target: EditTarget,
        label: &'static str,
        apply: EditClosure,
    },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Destroy(e) => f.debug_tuple("Destroy").field(e).finish(),
            Command::Create { template, pending } => f
                .debug_struct("Create")
                .field("template", template)
                .field("pending", pending)
                .finish(),
            Command::Edit { target, label, .. } => f
                .debug_struct("Edit")
                .field("target", target)
                .field("label", label)
                .finish(),
        }
    }
}

/// What a flush did to the world
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Every entity removed, linked entities included, in removal order
    pub destroyed: Vec<EntityId>,
    /// Placeholder to real entity mapping, in creation order
    pub created: Vec<(PendingEntity, EntityId)>,
}

impl FlushReport {
    /// Real entity behind a placeholder from the flushed buffer
    pub fn resolve(&self, pending: PendingEntity) -> Option<EntityId> {
        self.created
            .get(pending.0 as usize)
            .filter(|(p, _)| *p == pending)
            .map(|&(_, entity)| entity)
    }

    pub fn is_empty(&self) -> bool {
        self.destroyed.is_empty() && self.created.is_empty()
    }
}

/// Command buffer for deferred operations
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    next_pending: u32,
}

impl CommandBuffer {
    /// Create new command buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            next_pending: 0,
        }
    }

    /// Queue destruction of `entity`
    pub fn destroy(&mut self, entity: EntityId) {
        self.commands.push(Command::Destroy(entity));
    }

    /// Queue instantiation of `template`
    pub fn create_from_template(&mut self, template: TemplateId) -> PendingEntity {
        let pending = PendingEntity(self.next_pending);
        self.next_pending += 1;
        self.commands.push(Command::Create { template, pending });
        pending
    }

    /// Queue add-or-overwrite of a component
    pub fn insert<T: Component>(&mut self, target: impl Into<EditTarget>, component: T) {
        self.commands.push(Command::Edit {
            target: target.into(),
            label: std::any::type_name::<T>(),
            apply: Box::new(move |world: &mut World, entity: EntityId| {
                world.add_component(entity, component)
            }),
        });
    }

    /// Queue removal of a component; a missing component is ignored
    pub fn remove<T: Component>(&mut self, target: impl Into<EditTarget>) {
        self.commands.push(Command::Edit {
            target: target.into(),
            label: std::any::type_name::<T>(),
            apply: Box::new(|world: &mut World, entity: EntityId| {
                match world.remove_component::<T>(entity) {
                    Ok(_) | Err(EcsError::ComponentNotFound) => Ok(()),
                    Err(err) => Err(err),
                }
            }),
        });
    }

    /// Apply all commands to the world and clear the buffer.
    ///
    /// Stale entities are skipped. Any other error aborts the flush; the
    /// remaining commands are discarded.
    pub fn flush(&mut self, world: &mut World) -> Result<FlushReport> {
        let commands = std::mem::take(&mut self.commands);
        self.next_pending = 0;

        let mut report = FlushReport::default();
        if commands.is_empty() {
            return Ok(report);
        }

        let mut creates = Vec::new();
        let mut edits = Vec::new();

        for command in commands {
            match command {
                Command::Destroy(entity) => match world.despawn_into(entity, &mut report.destroyed) {
                    Ok(()) => {}
                    Err(err) if err.is_stale_reference() => {
                        trace!(?entity, "skipping destroy of stale entity");
                    }
                    Err(err) => return Err(err),
                },
                Command::Create { template, pending } => creates.push((template, pending)),
                Command::Edit { target, label, apply } => edits.push((target, label, apply)),
            }
        }

        for (template, pending) in creates {
            let entity = instantiate(world, template)?;
            report.created.push((pending, entity));
        }

        let edit_count = edits.len();
        for (target, label, apply) in edits {
            let entity = match target {
                EditTarget::Live(entity) => entity,
                EditTarget::Pending(pending) => match report.resolve(pending) {
                    Some(entity) => entity,
                    None => {
                        warn!(?pending, component = label, "edit targets an unknown pending entity");
                        continue;
                    }
                },
            };

            match apply(world, entity) {
                Ok(()) => {}
                Err(err) if err.is_stale_reference() => {
                    trace!(?entity, component = label, "skipping edit of stale entity");
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            destroyed = report.destroyed.len(),
            created = report.created.len(),
            edited = edit_count,
            "flushed command buffer"
        );
        Ok(report)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Recorded commands, in recording order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.commands.clear();
        self.next_pending = 0;
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("commands", &self.commands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Templates;
    use slotmap::Key;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Health(u32);

    fn world_with_template() -> (World, TemplateId) {
        let mut world = World::new();
        let mut templates = Templates::new();
        let id = templates.register("unit", |world: &mut World| world.spawn((Health(10),)));
        world.insert_resource(templates);
        (world, id)
    }

    #[test]
    fn test_command_buffer() {
        let mut buffer = CommandBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);

        buffer.destroy(EntityId::null());

        assert!(!buffer.is_empty());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_command_buffer_clear() {
        let mut buffer = CommandBuffer::new();
        buffer.destroy(EntityId::null());
        buffer.clear();
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_empty_flush_is_noop() -> Result<()> {
        let (mut world, _) = world_with_template();
        world.spawn((Health(1),))?;

        let report = CommandBuffer::new().flush(&mut world)?;
        assert!(report.is_empty());
        assert_eq!(world.entity_count(), 1);
        Ok(())
    }

    #[test]
    fn test_destroy_twice_is_skipped() -> Result<()> {
        let (mut world, _) = world_with_template();
        let entity = world.spawn((Health(1),))?;

        let mut buffer = CommandBuffer::new();
        buffer.destroy(entity);
        buffer.destroy(entity);
        let report = buffer.flush(&mut world)?;

        assert_eq!(report.destroyed, vec![entity]);
        assert!(!world.is_alive(entity));
        assert!(buffer.is_empty());
        Ok(())
    }

    #[test]
    fn test_pending_entity_receives_edits() -> Result<()> {
        let (mut world, unit) = world_with_template();

        let mut buffer = CommandBuffer::new();
        let pending = buffer.create_from_template(unit);
        buffer.insert(pending, Health(99));
        let report = buffer.flush(&mut world)?;

        let entity = report.resolve(pending).expect("pending entity resolved");
        assert_eq!(world.get_component::<Health>(entity), Some(&Health(99)));
        Ok(())
    }

    #[test]
    fn test_flush_order_destroy_before_create_before_edit() -> Result<()> {
        let (mut world, unit) = world_with_template();
        let doomed = world.spawn((Health(1),))?;

        let mut buffer = CommandBuffer::new();
        // Recorded edit-first; applied last
        buffer.insert(doomed, Health(5));
        let pending = buffer.create_from_template(unit);
        buffer.destroy(doomed);

        let report = buffer.flush(&mut world)?;

        assert_eq!(report.destroyed, vec![doomed]);
        assert!(!world.is_alive(doomed));
        assert!(report.resolve(pending).is_some());
        assert_eq!(world.entity_count(), 1);
        Ok(())
    }

    #[test]
    fn test_remove_edit_ignores_missing_component() -> Result<()> {
        let (mut world, _) = world_with_template();
        let entity = world.create();

        let mut buffer = CommandBuffer::new();
        buffer.remove::<Health>(entity);
        buffer.flush(&mut world)?;
        assert!(world.is_alive(entity));
        Ok(())
    }

    #[test]
    fn test_unknown_template_aborts_flush() {
        let mut world = World::new();
        world.insert_resource(Templates::new());
        let (_, foreign) = world_with_template();

        let mut buffer = CommandBuffer::new();
        buffer.create_from_template(foreign);
        assert!(matches!(
            buffer.flush(&mut world),
            Err(EcsError::UnknownTemplateId(_))
        ));
        assert!(buffer.is_empty());
    }
}
