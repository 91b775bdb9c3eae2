//! End-to-end scenarios: streaming, placement, and collision working
//! together on one map.

use glam::{UVec2, Vec2};

use tilescape::entity::{Camera, CollisionBox, Position, Velocity};
use tilescape::geom::Rect;
use tilescape::physics;
use tilescape::world::{ConstantGenerator, Map, OverworldGenerator, TileSet};

const DT: f32 = 1.0 / 60.0;

fn grass_map() -> Map {
    let tileset = TileSet::builtin();
    let grass = tileset.require("grass").unwrap();
    Map::with_generator(tileset, ConstantGenerator::new(grass))
}

#[test]
fn streaming_follows_a_moving_anchor() {
    let mut map = grass_map();
    let anchor = map.spawn_anchor(Vec2::new(100.0, 100.0)); // chunk (3,3)

    map.simulate_world(DT);
    assert_eq!(map.grid.len(), 9);

    // Anchor crosses into chunk (4,3): one new column appears, nothing is
    // unloaded
    map.registry.get_mut::<Position>(anchor).unwrap().0 = Vec2::new(135.0, 100.0);
    map.simulate_world(DT);
    assert_eq!(map.grid.len(), 12);
    for cy in 2..=4 {
        assert!(map.grid.contains(UVec2::new(5, cy)));
    }
}

#[test]
fn moving_entity_stops_against_placed_wall() {
    let mut map = Map::new(TileSet::builtin());
    map.generate_chunk(UVec2::new(3, 3));

    let rock = map.tileset().require("rock").unwrap();
    let tile = map.tileset().make_tile(rock);
    map.place_tile(tile, 100, 100);

    // One tile gap to the wall, moving fast enough to cover it in a tick
    let entity = map.registry.spawn((
        Position(Vec2::new(98.0, 100.0)),
        Velocity(Vec2::new(240.0, 0.0)),
        CollisionBox(Rect::new(98.0, 100.0, 1.0, 1.0)),
    ));
    let entity = entity.id();

    physics::simulate(&mut map.registry, &map.grid, DT);

    let tile_box = map.get_tile(100, 100).unwrap().collision_box.unwrap();
    let entity_box = map.registry.get::<CollisionBox>(entity).unwrap().0;
    assert!(
        entity_box.right() <= tile_box.x + 1e-4,
        "entity box {entity_box:?} overlaps wall {tile_box:?}"
    );

    // Repeated ticks never push it through, even once flush
    for _ in 0..30 {
        map.registry.get_mut::<Velocity>(entity).unwrap().0 = Vec2::new(240.0, 0.0);
        physics::simulate(&mut map.registry, &map.grid, DT);
    }
    let entity_box = map.registry.get::<CollisionBox>(entity).unwrap().0;
    assert!(entity_box.right() <= tile_box.x + 1e-4);
}

#[test]
fn entity_slides_along_a_wall() {
    let mut map = Map::new(TileSet::builtin());
    map.generate_chunk(UVec2::new(3, 3));

    let rock = map.tileset().require("rock").unwrap();
    for world_y in 99..=102 {
        let tile = map.tileset().make_tile(rock);
        map.place_tile(tile, 100, world_y);
    }

    // Flush against the wall, pushing into it and downward
    let entity = map
        .registry
        .spawn((
            Position(Vec2::new(99.0, 100.2)),
            Velocity(Vec2::new(60.0, 30.0)),
            CollisionBox(Rect::new(99.0, 100.2, 1.0, 1.0)),
        ))
        .id();

    physics::simulate(&mut map.registry, &map.grid, DT);

    let entity_box = map.registry.get::<CollisionBox>(entity).unwrap().0;
    assert_eq!(entity_box.x, 99.0, "normal-axis motion must die");
    assert!(entity_box.y > 100.2, "tangential motion must survive");
}

#[test]
fn camera_tracks_entity_displacement() {
    let mut map = grass_map();
    let entity = map
        .registry
        .spawn((
            Position(Vec2::new(100.0, 100.0)),
            Velocity(Vec2::new(30.0, 0.0)),
            Camera {
                center: Vec2::new(100.0, 100.0),
            },
        ))
        .id();

    physics::simulate(&mut map.registry, &map.grid, DT);

    let position = map.registry.get::<Position>(entity).unwrap().0;
    let camera = map.registry.get::<Camera>(entity).unwrap().center;
    assert!(position.x > 100.0);
    assert_eq!(camera, position);
}

#[test]
fn deceleration_brings_entities_to_rest() {
    let mut map = grass_map();
    let entity = map
        .registry
        .spawn((
            Position(Vec2::new(100.0, 100.0)),
            Velocity(Vec2::new(2.0, 0.0)),
        ))
        .id();

    // Decel impulse is 20 units/s^2; two units of speed drain in a second
    for _ in 0..120 {
        physics::simulate(&mut map.registry, &map.grid, DT);
    }
    let velocity = map.registry.get::<Velocity>(entity).unwrap().0;
    assert_eq!(velocity, Vec2::ZERO, "velocity must snap to exactly zero");

    // At rest the fast path leaves the entity untouched
    let before = map.registry.get::<Position>(entity).unwrap().0;
    physics::simulate(&mut map.registry, &map.grid, DT);
    let after = map.registry.get::<Position>(entity).unwrap().0;
    assert_eq!(before, after);
}

#[test]
fn overworld_walkabout_generates_and_draws() {
    let tileset = TileSet::builtin();
    let generator = OverworldGenerator::from_tileset(7, &tileset).unwrap();
    let mut map = Map::with_generator(tileset, generator);

    let anchor = map.spawn_anchor(Vec2::new(16384.0, 16384.0));
    map.registry.entity_mut(anchor).insert((
        Velocity(Vec2::new(64.0, 0.0)),
        Camera {
            center: Vec2::new(16384.0, 16384.0),
        },
    ));

    let atlas = tilescape::render::TileAtlas::debug_colors(map.tileset().len() as u32, 4);
    let tileset = map.tileset().clone();
    for _ in 0..8 {
        map.simulate_world(DT);
        physics::simulate(&mut map.registry, &map.grid, DT);

        // Draw pass over everything streamed in so far
        let dirty: Vec<UVec2> = map
            .grid
            .iter()
            .filter(|(_, chunk)| chunk.is_dirty())
            .map(|(pos, _)| *pos)
            .collect();
        for pos in dirty {
            map.get_chunk_mut(pos)
                .unwrap()
                .ensure_composited(&atlas, &tileset);
        }
    }

    assert!(map.grid.len() >= 9);
    for (_, chunk) in map.grid.iter() {
        assert!(!chunk.is_dirty());
        assert!(chunk.recomposite_count() >= 1);
    }

    let position = map.registry.get::<Position>(anchor).unwrap().0;
    assert!(position.x > 16384.0);
    assert_eq!(map.registry.get::<Camera>(anchor).unwrap().center, position);
}
