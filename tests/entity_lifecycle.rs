use tank_ecs::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fuel(f32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Armor(u32);

#[test]
fn recycled_slot_gets_new_generation() -> Result<()> {
    let mut world = World::new();
    let first = world.spawn((Fuel(1.0),))?;
    world.despawn(first)?;

    let second = world.spawn((Fuel(2.0),))?;

    assert_eq!(first.index(), second.index());
    assert_ne!(first.generation(), second.generation());
    assert_ne!(first, second);
    assert!(!world.is_alive(first));
    assert!(matches!(world.try_get::<Fuel>(first), Err(EcsError::EntityNotFound)));
    assert_eq!(world.try_get::<Fuel>(second)?, &Fuel(2.0));
    Ok(())
}

#[test]
fn duplicate_component_in_bundle_is_rejected() {
    let mut world = World::new();
    let result = world.spawn((Fuel(1.0), Armor(2), Fuel(3.0)));

    assert!(matches!(result, Err(EcsError::DuplicateComponent(name)) if name.ends_with("Fuel")));
    assert_eq!(world.entity_count(), 0);
}

#[test]
fn add_and_remove_components_move_between_archetypes() -> Result<()> {
    let mut world = World::new();
    let entity = world.spawn((Fuel(10.0),))?;
    let bystander = world.spawn((Fuel(20.0),))?;

    world.add_component(entity, Armor(3))?;
    assert_eq!(world.try_get::<Armor>(entity)?, &Armor(3));
    assert_eq!(world.try_get::<Fuel>(entity)?, &Fuel(10.0));

    // Overwrites in place
    world.add_component(entity, Armor(4))?;
    assert_eq!(world.try_get::<Armor>(entity)?, &Armor(4));

    assert_eq!(world.remove_component::<Fuel>(entity)?, Fuel(10.0));
    assert!(!world.has_component::<Fuel>(entity));
    assert!(matches!(world.try_get::<Fuel>(entity), Err(EcsError::ComponentNotFound)));
    assert!(matches!(world.remove_component::<Fuel>(entity), Err(EcsError::ComponentNotFound)));

    // Swap-remove patched the bystander's row
    assert_eq!(world.try_get::<Fuel>(bystander)?, &Fuel(20.0));
    Ok(())
}

#[test]
fn despawn_keeps_other_rows_intact() -> Result<()> {
    let mut world = World::new();
    let ids = world.spawn_batch((0..5).map(|i| (Fuel(i as f32), Armor(i))))?;

    world.despawn(ids[1])?;
    world.despawn(ids[3])?;

    for &index in &[0usize, 2, 4] {
        assert_eq!(world.try_get::<Armor>(ids[index])?, &Armor(index as u32));
        assert_eq!(world.try_get::<Fuel>(ids[index])?, &Fuel(index as f32));
    }
    assert_eq!(world.entity_count(), 3);
    Ok(())
}

#[test]
fn empty_entities_can_gain_components() -> Result<()> {
    let mut world = World::new();
    let entity = world.create();
    assert!(world.is_alive(entity));
    assert_eq!(world.query::<&Armor>().count(), 0);

    world.add_component(entity, Armor(9))?;
    assert_eq!(world.query::<&Armor>().count(), 1);
    Ok(())
}

#[test]
fn resources_are_typed_singletons() -> Result<()> {
    let mut world = World::new();
    assert!(matches!(world.try_resource::<Fuel>(), Err(EcsError::ResourceNotFound(_))));

    world.insert_resource(Fuel(1.0));
    world.insert_resource(Fuel(2.0));
    assert_eq!(world.try_resource::<Fuel>()?, &Fuel(2.0));

    if let Some(fuel) = world.resource_mut::<Fuel>() {
        fuel.0 += 1.0;
    }
    assert_eq!(world.remove_resource::<Fuel>(), Some(Fuel(3.0)));
    assert!(!world.has_resource::<Fuel>());
    Ok(())
}
