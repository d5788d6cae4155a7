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

//! Deterministic 3D gradient noise.
//!
//! Each lattice corner gets one of the 12 cube-edge gradients, picked by an
//! integer hash of the corner. Corner contributions are blended with a
//! quintic fade. Output is roughly in [-1, 1] and exactly zero on lattice
//! points.

use glam::Vec3;

const GRADIENTS: [Vec3; 12] = [
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(-1.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, -1.0),
    Vec3::new(-1.0, 0.0, -1.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.0, -1.0, 1.0),
    Vec3::new(0.0, 1.0, -1.0),
    Vec3::new(0.0, -1.0, -1.0),
];

fn hash_corner(i: i32, j: i32, k: i32) -> usize {
    let mut x = (i as u32 as u64).wrapping_mul(0x27d4_eb2d);
    x ^= (j as u32 as u64).wrapping_mul(0x1656_6791_9E37_79F9);
    x ^= (k as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    (x % GRADIENTS.len() as u64) as usize
}

fn fade(t: f32) -> f32 {
    // quintic smoothstep for C2 continuity
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Gradient noise at `p`
pub fn gradient_noise_3d(p: Vec3) -> f32 {
    let cell = p.floor();
    let (xi, yi, zi) = (cell.x as i32, cell.y as i32, cell.z as i32);
    let f = p - cell;

    let corner = |dx: i32, dy: i32, dz: i32| -> f32 {
        let gradient = GRADIENTS[hash_corner(xi + dx, yi + dy, zi + dz)];
        gradient.dot(f - Vec3::new(dx as f32, dy as f32, dz as f32))
    };

    let (u, v, w) = (fade(f.x), fade(f.y), fade(f.z));

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);

    let y0 = lerp(x00, x10, v);
    let y1 = lerp(x01, x11, v);

    lerp(y0, y1, w)
}
