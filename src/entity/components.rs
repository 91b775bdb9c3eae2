//! Core spatial components consumed by the map and physics

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::geom::Rect;

/// World-space position in world units (tiles are 1x1).
#[derive(Debug, Clone, Copy, PartialEq, Default, Component)]
pub struct Position(pub Vec2);

/// Velocity in world units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Component)]
pub struct Velocity(pub Vec2);

/// World-space collision box, kept in sync with the entity by physics.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct CollisionBox(pub Rect);

/// Marks an entity whose position drives chunk streaming.
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct WorldAnchor;

/// A view bound to an entity; physics moves it with the entity's
/// displacement so the external renderer can follow.
#[derive(Debug, Clone, Copy, PartialEq, Default, Component)]
pub struct Camera {
    pub center: Vec2,
}
