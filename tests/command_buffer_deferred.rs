use tank_ecs::prelude::*;
use tank_ecs::game::templates::spawn_tank;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Doomed;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Health(u32);

/// Destroys everything tagged `Doomed` and counts what it can still see
#[derive(Default)]
struct ReaperSystem {
    seen: Vec<usize>,
}

impl System for ReaperSystem {
    fn name(&self) -> &'static str {
        "reaper"
    }

    fn run(&mut self, world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()> {
        let mut seen = 0;
        for entity in world.query::<Entity>().with::<Doomed>().iter() {
            ctx.commands.destroy(entity);
            seen += 1;
        }
        self.seen.push(seen);
        Ok(())
    }
}

fn templates(world: &mut World) -> (TemplateId, TemplateId) {
    let mut templates = Templates::new();
    let ids = tank_ecs::game::register_default_templates(&mut templates);
    world.insert_resource(templates);
    ids
}

#[test]
fn destroyed_entities_are_gone_next_tick() -> Result<()> {
    let mut world = World::new();
    let doomed = world.spawn((Doomed, Health(3)))?;
    let survivor = world.spawn((Health(5),))?;

    let mut executor = Executor::new(Schedule::new().with_system(ReaperSystem::default()));
    let mut time = Time::new();

    time.advance(0.1);
    // Still queryable during the tick that destroys it
    assert_eq!(world.query::<&Health>().count(), 2);
    let report = executor.execute_frame(&mut world, &time, &InputAxes::NEUTRAL)?;
    assert_eq!(report.flush.destroyed, vec![doomed]);

    time.advance(0.1);
    let report = executor.execute_frame(&mut world, &time, &InputAxes::NEUTRAL)?;
    assert!(report.flush.is_empty());

    assert_eq!(world.query::<&Health>().count(), 1);
    assert!(matches!(world.try_get::<Health>(doomed), Err(EcsError::EntityNotFound)));
    assert!(matches!(world.despawn(doomed), Err(EcsError::EntityNotFound)));
    assert_eq!(world.try_get::<Health>(survivor)?, &Health(5));
    Ok(())
}

#[test]
fn empty_flush_is_a_no_op() -> Result<()> {
    let mut world = World::new();
    world.spawn((Health(1),))?;
    let before = world.entity_count();

    let mut commands = CommandBuffer::new();
    let report = commands.flush(&mut world)?;

    assert!(report.is_empty());
    assert_eq!(world.entity_count(), before);
    Ok(())
}

#[test]
fn destroying_twice_in_one_buffer_is_skipped() -> Result<()> {
    let mut world = World::new();
    let entity = world.spawn((Health(1),))?;

    let mut commands = CommandBuffer::new();
    commands.destroy(entity);
    commands.destroy(entity);
    let report = commands.flush(&mut world)?;

    assert_eq!(report.destroyed, vec![entity]);
    assert_eq!(world.entity_count(), 0);
    Ok(())
}

#[test]
fn pending_entities_resolve_after_flush() -> Result<()> {
    let mut world = World::new();
    let (_, cannonball) = templates(&mut world);

    let mut commands = CommandBuffer::new();
    let first = commands.create_from_template(cannonball);
    let second = commands.create_from_template(cannonball);
    commands.insert(first, Projectile::new(Vec3::new(0.0, 4.0, 0.0)));
    commands.insert(second, Health(7));

    let report = commands.flush(&mut world)?;
    let first = report.resolve(first).expect("first cannonball");
    let second = report.resolve(second).expect("second cannonball");

    assert_ne!(first, second);
    assert_eq!(world.try_get::<Projectile>(first)?.velocity.y, 4.0);
    assert_eq!(world.try_get::<Health>(second)?, &Health(7));
    assert!(!world.has_component::<Health>(first));
    Ok(())
}

#[test]
fn edits_on_entities_destroyed_in_same_flush_are_skipped() -> Result<()> {
    let mut world = World::new();
    let doomed = world.spawn((Health(1),))?;
    let other = world.spawn((Health(2),))?;

    let mut commands = CommandBuffer::new();
    commands.insert(doomed, Doomed);
    commands.insert(other, Doomed);
    commands.destroy(doomed);

    let report = commands.flush(&mut world)?;

    assert_eq!(report.destroyed, vec![doomed]);
    assert!(!world.is_alive(doomed));
    assert!(world.has_component::<Doomed>(other));
    Ok(())
}

#[test]
fn removing_a_missing_component_is_ignored() -> Result<()> {
    let mut world = World::new();
    let entity = world.spawn((Health(1),))?;

    let mut commands = CommandBuffer::new();
    commands.remove::<Doomed>(entity);
    commands.remove::<Health>(entity);
    commands.flush(&mut world)?;

    assert!(world.is_alive(entity));
    assert!(!world.has_component::<Health>(entity));
    Ok(())
}

#[test]
fn destroying_a_hull_removes_the_whole_tank() -> Result<()> {
    let mut world = World::new();
    let hull = spawn_tank(&mut world)?;
    let other = spawn_tank(&mut world)?;
    let links = *world.try_get::<VehicleLinks>(hull)?;

    let mut commands = CommandBuffer::new();
    commands.destroy(hull);
    // Already covered by the hull's linked group
    commands.destroy(links.cannon);
    let report = commands.flush(&mut world)?;

    assert_eq!(report.destroyed.len(), 3);
    assert!(report.destroyed.contains(&links.turret));
    assert!(!world.is_alive(links.turret));
    assert!(!world.is_alive(links.cannon));
    assert_eq!(world.entity_count(), 3);
    assert!(world.is_alive(other));
    Ok(())
}

#[test]
fn unknown_template_aborts_flush() -> Result<()> {
    let mut world = World::new();
    let mut other_templates = Templates::new();
    let (tank, _) = tank_ecs::game::register_default_templates(&mut other_templates);

    // No Templates resource in this world
    let mut commands = CommandBuffer::new();
    commands.create_from_template(tank);
    assert!(matches!(
        commands.flush(&mut world),
        Err(EcsError::ResourceNotFound(_))
    ));
    assert!(commands.is_empty());
    assert_eq!(world.entity_count(), 0);
    Ok(())
}
