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

//! Headless tank sandbox.
//!
//! Usage: `tank_demo [settings.json] [seconds]`

use std::time::Instant;

use glam::Vec3;
use tracing::{info, info_span};

use tank_ecs::debug::WorldInspector;
use tank_ecs::game::{default_schedule, VehicleLinks};
use tank_ecs::hierarchy::world_transform;
use tank_ecs::prelude::*;
use tank_ecs::profiling::init_tracing;

const TICK_HZ: u32 = 60;
const MUZZLE_SPEED: f32 = 12.0;

/// Fires every tank's cannon at a fixed interval
struct CannonVolleySystem {
    interval: f32,
    cooldown: f32,
}

impl System for CannonVolleySystem {
    fn name(&self) -> &'static str {
        "cannon_volley"
    }

    fn run(&mut self, world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()> {
        self.cooldown -= ctx.delta_seconds();
        if self.cooldown > 0.0 {
            return Ok(());
        }
        self.cooldown += self.interval;

        let world: &World = world;
        let cannonball = world.try_resource::<SimulationConfig>()?.cannonball_template;
        let muzzles: Vec<Transform> = world
            .query::<&VehicleLinks>()
            .iter()
            .filter_map(|links| world_transform(world, links.cannon))
            .collect();

        for muzzle in &muzzles {
            let velocity = (muzzle.forward() + Vec3::Y).normalize() * MUZZLE_SPEED;
            let pending = ctx.commands.create_from_template(cannonball);
            ctx.commands.insert(pending, Transform::from_translation(muzzle.translation));
            ctx.commands.insert(pending, Projectile::new(velocity));
        }
        Ok(())
    }
}

/// Player drives a slow circle
fn scripted_axes(elapsed: f64) -> InputAxes {
    let phase = (elapsed * 0.5) as f32;
    InputAxes::new(phase.cos(), phase.sin())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => SimulationSettings::load(path)?,
        None => SimulationSettings::default(),
    };
    let seconds: f32 = match args.next() {
        Some(text) => text
            .parse()
            .map_err(|_| EcsError::ConfigError(format!("invalid duration {text:?}")))?,
        None => 10.0,
    };
    let _guard = init_tracing(&settings.log)?;

    let schedule = default_schedule().with_system(CannonVolleySystem {
        interval: 1.5,
        cooldown: 1.5,
    });
    let mut sim = Simulation::with_schedule(&settings, schedule)?;
    sim.spawn_initial_population()?;
    WorldInspector::log_summary(sim.world());

    let mut fixed = FixedTime::new(TICK_HZ);
    let frame_seconds = 1.0 / 30.0;
    let frames = (seconds / frame_seconds).ceil() as u32;
    let mut fired = 0usize;
    let mut landed = 0usize;
    let start = Instant::now();

    {
        let _span = info_span!("run", frames).entered();
        for _ in 0..frames {
            for _ in 0..fixed.tick(frame_seconds) {
                let axes = scripted_axes(sim.time().elapsed_seconds());
                let report = sim.tick(FrameInput::new(fixed.timestep_seconds()).with_axes(axes))?;
                fired += report.flush.created.len();
                landed += report.flush.destroyed.len();
            }
        }
    }

    sim.executor().log_profile();
    WorldInspector::log_summary(sim.world());

    let camera = sim
        .world()
        .query::<&Transform>()
        .with::<PlayerTag>()
        .iter()
        .next()
        .map(CameraPose::follow);
    info!(
        ticks = sim.time().frame_count(),
        simulated = sim.time().elapsed_seconds(),
        wall = ?start.elapsed(),
        fired,
        landed,
        in_flight = sim.world().query::<&Projectile>().count(),
        camera = ?camera,
        "demo finished"
    );
    Ok(())
}
