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

//! Frame executor and system profiling
//!
//! One frame runs every scheduled system once, in order, against the world,
//! then flushes the shared command buffer. That flush is the only point in
//! a frame where entities are created or destroyed.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tracing::info;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::builtin::input::InputAxes;
use crate::command::{CommandBuffer, FlushReport};
use crate::error::Result;
use crate::render::CameraPose;
use crate::schedule::Schedule;
use crate::system::{SystemContext, SystemId};
use crate::time::Time;
use crate::world::World;

/// System execution statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStats {
    pub min: Duration,
    pub max: Duration,
    pub avg: Duration,
    pub call_count: u64,
}

#[derive(Debug, Clone, Copy)]
struct RunningStats {
    min: Duration,
    max: Duration,
    total: Duration,
    call_count: u64,
}

/// System profiler for collecting timing data
#[derive(Debug, Default)]
pub struct SystemProfiler {
    stats: FxHashMap<SystemId, RunningStats>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_execution(&mut self, id: SystemId, duration: Duration) {
        self.stats
            .entry(id)
            .and_modify(|s| {
                s.min = s.min.min(duration);
                s.max = s.max.max(duration);
                s.total += duration;
                s.call_count += 1;
            })
            .or_insert(RunningStats {
                min: duration,
                max: duration,
                total: duration,
                call_count: 1,
            });
    }

    pub fn get_stats(&self, id: SystemId) -> Option<SystemStats> {
        let stats = self.stats.get(&id)?;
        Some(SystemStats {
            min: stats.min,
            max: stats.max,
            avg: stats.total / stats.call_count.max(1) as u32,
            call_count: stats.call_count,
        })
    }

    pub fn clear(&mut self) {
        self.stats.clear();
    }
}

/// Per-system timing data for a single frame
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Execution profile for a frame
#[derive(Debug, Clone, Default)]
pub struct ExecutionProfile {
    pub total_frame_time: Duration,
    pub flush_time: Duration,
    pub system_timings: Vec<SystemTiming>,
}

/// Result of one executed frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Structural changes applied at the end of the frame
    pub flush: FlushReport,
    /// Follow-camera placement, when a player exists
    pub camera: Option<CameraPose>,
    pub profile: ExecutionProfile,
}

/// Frame executor
pub struct Executor {
    pub schedule: Schedule,
    pub profiler: SystemProfiler,
    commands: CommandBuffer,
    last_profile: Option<ExecutionProfile>,
}

impl Executor {
    /// Create new executor
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            profiler: SystemProfiler::new(),
            commands: CommandBuffer::with_capacity(64),
            last_profile: None,
        }
    }

    /// Command buffer flushed at the end of the next frame
    pub fn commands_mut(&mut self) -> &mut CommandBuffer {
        &mut self.commands
    }

    /// Flush pending commands outside of a frame (startup spawning)
    pub fn flush_commands(&mut self, world: &mut World) -> Result<FlushReport> {
        self.commands.flush(world)
    }

    /// Execute one frame
    ///
    /// If a system fails, commands recorded during this frame are discarded
    /// and the error is returned.
    pub fn execute_frame(&mut self, world: &mut World, time: &Time, input: &InputAxes) -> Result<FrameReport> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("execute_frame", frame = time.frame_count()).entered();

        let frame_start = Instant::now();
        let mut system_timings = Vec::with_capacity(self.schedule.len());
        let mut camera = None;

        for (index, system) in self.schedule.systems.iter_mut().enumerate() {
            let system_name = system.name();

            #[cfg(feature = "profiling")]
            let _system_span = info_span!("system", name = system_name).entered();

            let mut ctx = SystemContext {
                time,
                input,
                commands: &mut self.commands,
                camera: &mut camera,
            };

            let start = Instant::now();
            if let Err(err) = system.run(world, &mut ctx) {
                self.commands.clear();
                return Err(err);
            }
            let duration = start.elapsed();

            self.profiler.record_execution(SystemId(index as u32), duration);
            system_timings.push(SystemTiming {
                name: system_name,
                duration,
            });
        }

        let flush_start = Instant::now();
        let flush = self.commands.flush(world)?;
        let flush_time = flush_start.elapsed();

        let profile = ExecutionProfile {
            total_frame_time: frame_start.elapsed(),
            flush_time,
            system_timings,
        };
        self.last_profile = Some(profile.clone());

        Ok(FrameReport {
            flush,
            camera,
            profile,
        })
    }

    /// Get the most recent execution profile
    pub fn profile(&self) -> Option<&ExecutionProfile> {
        self.last_profile.as_ref()
    }

    /// Log profiling information for the last frame
    pub fn log_profile(&self) {
        if let Some(profile) = &self.last_profile {
            info!(
                "Frame time: {:.3?} ({} systems, flush {:.3?})",
                profile.total_frame_time,
                profile.system_timings.len(),
                profile.flush_time
            );
            for (index, timing) in profile.system_timings.iter().enumerate() {
                info!("  {:02}: {:<24} {:?}", index, timing.name, timing.duration);
            }
        } else {
            info!("No profiling data collected yet.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::error::EcsError;
    use crate::system::System;
    use slotmap::Key;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Counter(u32);

    /// Destroys every Counter entity
    struct Reaper;

    impl System for Reaper {
        fn name(&self) -> &'static str {
            "reaper"
        }

        fn run(&mut self, world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()> {
            for (entity, _) in world.query::<(crate::query::Entity, &Counter)>() {
                ctx.commands.destroy(entity);
            }
            Ok(())
        }
    }

    /// Counts Counter entities; sees them even after the reaper ran
    struct Census {
        seen: Arc<AtomicUsize>,
    }

    impl System for Census {
        fn name(&self) -> &'static str {
            "census"
        }

        fn run(&mut self, world: &mut World, _ctx: &mut SystemContext<'_>) -> Result<()> {
            self.seen
                .store(world.query::<&Counter>().count(), Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl System for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run(&mut self, _world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()> {
            ctx.commands.destroy(EntityId::null());
            Err(EcsError::ComponentNotFound)
        }
    }

    #[test]
    fn test_destroys_apply_after_all_systems() -> Result<()> {
        let mut world = World::new();
        for i in 0..3 {
            world.spawn((Counter(i),))?;
        }

        let seen = Arc::new(AtomicUsize::new(0));
        let schedule = Schedule::new()
            .with_system(Reaper)
            .with_system(Census { seen: seen.clone() });
        let mut executor = Executor::new(schedule);

        let report = executor.execute_frame(&mut world, &Time::new(), &InputAxes::default())?;

        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(report.flush.destroyed.len(), 3);
        assert_eq!(world.entity_count(), 0);
        assert_eq!(report.profile.system_timings.len(), 2);
        assert_eq!(report.profile.system_timings[1].name, "census");
        Ok(())
    }

    #[test]
    fn test_profiler_accumulates() -> Result<()> {
        let mut world = World::new();
        let mut executor = Executor::new(Schedule::new().with_system(Census {
            seen: Arc::new(AtomicUsize::new(0)),
        }));

        for _ in 0..3 {
            executor.execute_frame(&mut world, &Time::new(), &InputAxes::default())?;
        }

        let stats = executor.profiler.get_stats(SystemId(0)).expect("stats recorded");
        assert_eq!(stats.call_count, 3);
        assert!(stats.min <= stats.avg && stats.avg <= stats.max);
        assert!(executor.profile().is_some());
        Ok(())
    }

    #[test]
    fn test_system_error_discards_frame_commands() {
        let mut world = World::new();
        let mut executor = Executor::new(Schedule::new().with_system(Failing));

        let result = executor.execute_frame(&mut world, &Time::new(), &InputAxes::default());
        assert_eq!(result.unwrap_err(), EcsError::ComponentNotFound);
        assert!(executor.commands_mut().is_empty());
    }
}
