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

//! Gameplay components

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Ballistic projectile; zero velocity by default
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub velocity: Vec3,
}

impl Projectile {
    pub fn new(velocity: Vec3) -> Self {
        Self { velocity }
    }
}

/// Turret and cannon parts of a tank hull
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleLinks {
    pub turret: EntityId,
    pub cannon: EntityId,
}

/// Marks the player-controlled tank
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerTag;
