//! Components attached to world entities
//!
//! The registry itself is `bevy_ecs::world::World`; this crate only defines
//! the components it reads and writes.

mod animation;
mod components;

pub use animation::{Animation, Clip};
pub use components::{Camera, CollisionBox, Position, Velocity, WorldAnchor};
