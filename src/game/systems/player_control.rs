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

use glam::Vec3;
use tracing::warn;

use crate::builtin::transform::Transform;
use crate::error::Result;
use crate::game::components::PlayerTag;
use crate::render::CameraPose;
use crate::system::{System, SystemContext};
use crate::world::World;

/// Moves the player tank by the input axes and places the follow camera
#[derive(Debug, Default)]
pub struct PlayerControlSystem;

impl System for PlayerControlSystem {
    fn name(&self) -> &'static str {
        "player_control"
    }

    fn run(&mut self, world: &mut World, ctx: &mut SystemContext<'_>) -> Result<()> {
        let movement = Vec3::new(ctx.input.horizontal, 0.0, ctx.input.vertical) * ctx.delta_seconds();

        let mut players = 0usize;
        for transform in world.query_mut::<&mut Transform>().with::<PlayerTag>() {
            transform.translation += movement;
            if players == 0 {
                *ctx.camera = Some(CameraPose::follow(transform));
            }
            players += 1;
        }

        if players > 1 {
            warn!(players, "several entities carry PlayerTag; camera follows the first");
        }
        Ok(())
    }
}
