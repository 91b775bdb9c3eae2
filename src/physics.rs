//! Swept-AABB collision resolution and velocity integration
//!
//! Collision is predictive: each tick the displacement is clipped against
//! world tiles before it is applied, so entities never have to be pushed
//! back out of terrain. Callers run this under a fixed-timestep accumulator
//! with substeps capped at [`MAX_TIMESTEP`]; an uncapped step lets a fast
//! entity sweep past a thin tile in one jump.

use bevy_ecs::prelude::World;
use glam::Vec2;
use smallvec::SmallVec;

use crate::entity::{Camera, CollisionBox, Position, Velocity};
use crate::geom::Rect;
use crate::world::{Chunk, ChunkGrid, CHUNK_NO, CHUNK_SIZE};

/// Magnitude of the deceleration impulse, world units per second squared.
pub const VELOCITY_DECEL: f32 = 20.0;

/// Largest substep callers should feed into [`simulate`].
pub const MAX_TIMESTEP: f32 = 1.0 / 60.0;

/// Result of a swept test: entry time in [0, 1] and the surface normal.
/// `entry == 1.0` with a zero normal means no contact this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptHit {
    pub entry: f32,
    pub normal: Vec2,
}

impl SweptHit {
    const MISS: SweptHit = SweptHit {
        entry: 1.0,
        normal: Vec2::ZERO,
    };
}

/// Advance every entity with a velocity by one tick.
///
/// Entities at rest are skipped untouched. Entities with a [`CollisionBox`]
/// get their displacement resolved against world tiles first; the box, the
/// position, and any bound [`Camera`] then move by the clipped displacement.
/// Finally a fixed-magnitude impulse opposite the velocity decelerates the
/// entity, snapping to zero instead of overshooting the sign.
pub fn simulate(registry: &mut World, grid: &ChunkGrid, dt: f32) {
    let mut movers = registry.query::<(
        &mut Velocity,
        &mut Position,
        Option<&mut CollisionBox>,
        Option<&mut Camera>,
    )>();
    for (mut velocity, mut position, collision_box, camera) in movers.iter_mut(registry) {
        if velocity.0.x == 0.0 && velocity.0.y == 0.0 {
            continue;
        }

        let mut displacement = velocity.0 * dt;

        if let Some(mut collision_box) = collision_box {
            resolve_world_collision(&collision_box.0, &mut displacement, grid);
            collision_box.0.x += displacement.x;
            collision_box.0.y += displacement.y;
        }

        position.0 += displacement;
        if let Some(mut camera) = camera {
            camera.center += displacement;
        }

        let speed = velocity.0.length();
        let impulse = VELOCITY_DECEL * dt;
        if impulse >= speed {
            velocity.0 = Vec2::ZERO;
        } else {
            let decel = velocity.0 / speed * impulse;
            velocity.0 -= decel;
        }
    }
}

/// Clip `displacement` against every collidable tile the entity could reach
/// this tick.
///
/// Candidate chunks are the one containing the box plus the neighbors in
/// the displacement's sign direction on each axis (and the diagonal when
/// both axes move). Tiles are tested in row-major order and every hit
/// clips the running displacement before the next test; resolution is
/// sequential, not a simultaneous solve.
pub fn resolve_world_collision(entity_box: &Rect, displacement: &mut Vec2, grid: &ChunkGrid) {
    let center = ChunkGrid::chunk_pos_of(entity_box.x, entity_box.y);
    let step_x = if displacement.x > 0.0 {
        1i64
    } else if displacement.x < 0.0 {
        -1
    } else {
        0
    };
    let step_y = if displacement.y > 0.0 {
        1i64
    } else if displacement.y < 0.0 {
        -1
    } else {
        0
    };

    let mut candidates: SmallVec<[&Chunk; 4]> = SmallVec::new();
    let mut push = |dx: i64, dy: i64| {
        let x = center.x as i64 + dx;
        let y = center.y as i64 + dy;
        if x < 0 || y < 0 || x >= CHUNK_NO as i64 || y >= CHUNK_NO as i64 {
            return;
        }
        if let Some(chunk) = grid.chunk(glam::UVec2::new(x as u32, y as u32)) {
            candidates.push(chunk);
        }
    };
    push(0, 0);
    if step_x != 0 {
        push(step_x, 0);
    }
    if step_y != 0 {
        push(0, step_y);
    }
    if step_x != 0 && step_y != 0 {
        push(step_x, step_y);
    }

    for chunk in candidates {
        resolve_chunk_collision(entity_box, displacement, chunk);
    }
}

fn resolve_chunk_collision(entity_box: &Rect, displacement: &mut Vec2, chunk: &Chunk) {
    for tile_y in 0..CHUNK_SIZE {
        for tile_x in 0..CHUNK_SIZE {
            let Some(tile_box) = chunk.tile(tile_x, tile_y).collision_box else {
                continue;
            };
            let broad = broadphase_rect(entity_box, *displacement);
            if !broad.intersects(&tile_box) {
                continue;
            }
            let hit = collision_time(entity_box, &tile_box, *displacement);
            if hit.entry < 1.0 {
                log::trace!(
                    "clip at t={} normal=({}, {})",
                    hit.entry,
                    hit.normal.x,
                    hit.normal.y
                );
                // Slide: keep the remaining fraction of motion, projected
                // along the surface tangent
                let remaining = 1.0 - hit.entry;
                let along = (displacement.x * hit.normal.y + displacement.y * hit.normal.x)
                    * remaining;
                displacement.x = along * hit.normal.y;
                displacement.y = along * hit.normal.x;
            }
        }
    }
}

/// First time of impact of `moving` against `fixed` over one tick of
/// `displacement`, by the slab method.
///
/// Per axis, entry and exit penetration distances divide by the
/// displacement component, with infinity sentinels on a still axis. Contact
/// exactly at the end of the tick (entry time 1) counts as a miss; so do
/// separations already behind the motion (both entries negative). On equal
/// entry times the x axis supplies the normal.
pub fn collision_time(moving: &Rect, fixed: &Rect, displacement: Vec2) -> SweptHit {
    let (x_entry_dist, x_exit_dist) = if displacement.x > 0.0 {
        (fixed.x - moving.right(), fixed.right() - moving.x)
    } else {
        (fixed.right() - moving.x, fixed.x - moving.right())
    };
    let (y_entry_dist, y_exit_dist) = if displacement.y > 0.0 {
        (fixed.y - moving.bottom(), fixed.bottom() - moving.y)
    } else {
        (fixed.bottom() - moving.y, fixed.y - moving.bottom())
    };

    let (x_entry, x_exit) = if displacement.x == 0.0 {
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        (x_entry_dist / displacement.x, x_exit_dist / displacement.x)
    };
    let (y_entry, y_exit) = if displacement.y == 0.0 {
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        (y_entry_dist / displacement.y, y_exit_dist / displacement.y)
    };

    let entry = x_entry.max(y_entry);
    let exit = x_exit.min(y_exit);

    if entry > exit || (x_entry < 0.0 && y_entry < 0.0) || x_entry > 1.0 || y_entry > 1.0 {
        return SweptHit::MISS;
    }

    let normal = if x_entry >= y_entry {
        if x_entry_dist < 0.0 {
            Vec2::new(1.0, 0.0)
        } else {
            Vec2::new(-1.0, 0.0)
        }
    } else if y_entry_dist < 0.0 {
        Vec2::new(0.0, 1.0)
    } else {
        Vec2::new(0.0, -1.0)
    };

    SweptHit { entry, normal }
}

/// Bounds of the box swept along `displacement`, for cheap rejection before
/// the exact test.
pub fn broadphase_rect(rect: &Rect, displacement: Vec2) -> Rect {
    Rect {
        x: if displacement.x > 0.0 {
            rect.x
        } else {
            rect.x + displacement.x
        },
        y: if displacement.y > 0.0 {
            rect.y
        } else {
            rect.y + displacement.y
        },
        w: if displacement.x > 0.0 {
            rect.w + displacement.x
        } else {
            rect.w - displacement.x
        },
        h: if displacement.y > 0.0 {
            rect.h + displacement.y
        } else {
            rect.h - displacement.y
        },
    }
}
