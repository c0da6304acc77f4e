//! A small hand-built network to show the fixer at work.
//!
//! ```text
//!   n0 --a-- n1 --b-- n2 --c-- n3        d: n3 -> n4 is elevated
//!                                 \--d-- n4
//! ```
//!
//! `b` already carries a retaining wall. Upgrading `a` to a retaining wall
//! leaves a hole at n1 until the fixer runs. Turning `c` into a quay next to
//! the elevated `d` would grow a pillar at n3.

use bevy::prelude::*;

use composition_fixer::flags::{CompositionFlags, GeneralFlags, SideFlags};
use composition_fixer::net_composition::NetCompositionData;
use composition_fixer::topology::{Composition, ConnectedEdges, Edge};

pub struct DemoNetwork {
    pub a: Entity,
    pub b: Entity,
    pub c: Entity,
    pub d: Entity,
}

fn record(flags: CompositionFlags) -> NetCompositionData {
    NetCompositionData {
        flags,
        height_range: (-0.5, 0.5),
        surface_height: (0.0, 0.0),
        width: 12.0,
        node_offset: 1.0,
        min_lod: 2,
        ..Default::default()
    }
}

fn spawn_edge(
    world: &mut World,
    start: Entity,
    end: Entity,
    edge: CompositionFlags,
    start_node: CompositionFlags,
    end_node: CompositionFlags,
) -> Entity {
    let composition = Composition {
        edge: world.spawn(record(edge)).id(),
        start_node: world.spawn(record(start_node)).id(),
        end_node: world.spawn(record(end_node)).id(),
    };
    let id = world.spawn((Edge { start, end }, composition)).id();
    for node in [start, end] {
        if let Some(mut connected) = world.get_mut::<ConnectedEdges>(node) {
            connected.0.push(id);
        }
    }
    id
}

pub fn spawn_demo_network(world: &mut World) -> DemoNetwork {
    let nodes: Vec<Entity> = (0..5)
        .map(|_| world.spawn(ConnectedEdges::default()).id())
        .collect();

    let wall = CompositionFlags::EMPTY.with_right(SideFlags::LOWERED | SideFlags::LOW_TRANSITION);
    let sidewalk = CompositionFlags::both_sides(SideFlags::SIDEWALK);
    let elevated = sidewalk.with_general(GeneralFlags::ELEVATED);

    let a = spawn_edge(
        world,
        nodes[0],
        nodes[1],
        CompositionFlags::EMPTY,
        CompositionFlags::EMPTY,
        CompositionFlags::EMPTY,
    );
    let b = spawn_edge(world, nodes[1], nodes[2], wall, wall, wall);
    let c = spawn_edge(world, nodes[2], nodes[3], sidewalk, sidewalk, sidewalk);
    let d = spawn_edge(world, nodes[3], nodes[4], elevated, elevated, elevated);

    info!("Demo network: a={a:?} b={b:?} c={c:?} d={d:?}");
    DemoNetwork { a, b, c, d }
}
