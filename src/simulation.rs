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

use tracing::{debug, info};

use crate::builtin::input::FrameInput;
use crate::command::FlushReport;
use crate::error::Result;
use crate::executor::{Executor, FrameReport};
use crate::game::components::PlayerTag;
use crate::game::config::{SimulationConfig, SimulationSettings};
use crate::game::systems::default_schedule;
use crate::game::templates::register_default_templates;
use crate::render::{render_snapshot, RenderInstance};
use crate::schedule::Schedule;
use crate::template::Templates;
use crate::time::Time;
use crate::world::World;

/// Simulation driver: owns the world, the executor and the clock
pub struct Simulation {
    world: World,
    executor: Executor,
    time: Time,
}

impl Simulation {
    /// Build a simulation with the default templates and schedule
    pub fn from_settings(settings: &SimulationSettings) -> Result<Self> {
        Self::with_schedule(settings, default_schedule())
    }

    /// Build a simulation that runs `schedule` every tick
    pub fn with_schedule(settings: &SimulationSettings, schedule: Schedule) -> Result<Self> {
        let mut templates = Templates::new();
        register_default_templates(&mut templates);
        let config = settings.resolve(&templates)?;

        let mut world = World::new();
        world.insert_resource(templates);
        world.insert_resource(config);

        info!(
            tank_count = config.tank_count,
            systems = schedule.len(),
            "simulation created"
        );

        Ok(Self {
            world,
            executor: Executor::new(schedule),
            time: Time::new(),
        })
    }

    /// Spawn `tank_count` tanks; the first one becomes the player
    pub fn spawn_initial_population(&mut self) -> Result<FlushReport> {
        let config = *self.config()?;
        let commands = self.executor.commands_mut();
        for index in 0..config.tank_count {
            let pending = commands.create_from_template(config.tank_template);
            if index == 0 {
                commands.insert(pending, PlayerTag);
            }
        }

        let report = self.executor.flush_commands(&mut self.world)?;
        debug!(
            tanks = report.created.len(),
            entities = self.world.entity_count(),
            "spawned initial population"
        );
        Ok(report)
    }

    /// Advance the clock and run one frame
    pub fn tick(&mut self, input: FrameInput) -> Result<FrameReport> {
        self.time.advance(input.delta_seconds);
        self.executor.execute_frame(&mut self.world, &self.time, &input.axes)
    }

    /// World-space transforms for the rendering sink
    pub fn render_snapshot(&self) -> Vec<RenderInstance> {
        render_snapshot(&self.world)
    }

    pub fn config(&self) -> Result<&SimulationConfig> {
        self.world.try_resource::<SimulationConfig>()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut Executor {
        &mut self.executor
    }

    pub fn time(&self) -> &Time {
        &self.time
    }
}
