//! Tilescape - chunk-streamed tile world engine
//!
//! An unbounded-feeling world of 32x32 tile chunks, generated on demand
//! around anchor entities, autotiled for visual adjacency, cached per chunk
//! as a composited image, and simulated with swept-AABB collision physics.
//!
//! The windowing, input, and draw loops live outside this crate: a driver
//! calls [`world::Map::simulate_world`] and [`physics::simulate`] each
//! fixed-timestep substep, and presents chunk surfaces from
//! [`world::Chunk::ensure_composited`] each frame.

pub mod entity;
pub mod geom;
pub mod physics;
pub mod render;
pub mod world;

pub use geom::Rect;
