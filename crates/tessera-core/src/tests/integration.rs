//! Whole-frame and whole-run scenarios.

use std::time::Duration;

use glam::Vec2;

use super::helpers::{
    spawn_at, spawn_mover, EventLog, NoInput, NullBackend, RecordingBackend, ScriptedInput,
    StepProbe,
};
use crate::backend::InputEvent;
use crate::entity::{EntitySpec, Solidness};
use crate::event::{GameEvent, PointerAction, PointerButton};
use crate::game_loop::{GameLoop, LoopControl};
use crate::world::{World, WorldError};

// =============================================================================
// Capacity
// =============================================================================

#[test]
fn world_holds_exactly_one_thousand_entities() {
    let mut world = World::new();
    let mut ids = Vec::new();
    for i in 0..1000 {
        ids.push(spawn_at(&mut world, "filler", (i % 80) as f32, 0.0));
    }
    assert_eq!(world.len(), 1000);

    // The 1001st insert fails...
    assert_eq!(
        world.spawn(EntitySpec::new("overflow")),
        Err(WorldError::CapacityExceeded(1000))
    );

    // ...until a slot frees up.
    world.remove(ids[500]).unwrap();
    assert!(world.spawn(EntitySpec::new("late")).is_ok());
    assert_eq!(world.len(), 1000);
}

// =============================================================================
// Frame-level movement scenarios
// =============================================================================

#[test]
fn crossing_hard_movers_collide_once_each() {
    let mut world = World::new();
    let mut control = LoopControl::new();

    let (log_a, events_a) = EventLog::new();
    let (log_b, events_b) = EventLog::new();

    let a = world
        .spawn(
            EntitySpec::new("left")
                .position(Vec2::new(1.0, 1.0))
                .velocity(Vec2::new(1.0, 0.0))
                .behavior(log_a),
        )
        .unwrap();
    let b = world
        .spawn(
            EntitySpec::new("right")
                .position(Vec2::new(3.0, 1.0))
                .velocity(Vec2::new(-1.0, 0.0))
                .behavior(log_b),
        )
        .unwrap();

    world.update(&mut control);

    // Live order resolves the left mover first: it reaches (2,1) while the
    // cell is still empty. The right mover then collides with it and stays.
    assert_eq!(world.get(a).unwrap().position(), Vec2::new(2.0, 1.0));
    assert_eq!(world.get(b).unwrap().position(), Vec2::new(3.0, 1.0));

    let collisions = |events: &[GameEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Collision { .. }))
            .count()
    };
    assert_eq!(collisions(&events_a.borrow()), 1);
    assert_eq!(collisions(&events_b.borrow()), 1);
}

#[test]
fn spectral_mover_shares_cell_after_frame() {
    let mut world = World::new();
    let mut control = LoopControl::new();

    let ghost = spawn_mover(
        &mut world,
        "ghost",
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Solidness::Spectral,
    );
    let wall = spawn_at(&mut world, "wall", 2.0, 1.0);

    world.update(&mut control);

    assert_eq!(world.get(ghost).unwrap().position(), Vec2::new(2.0, 1.0));
    assert_eq!(world.get(wall).unwrap().position(), Vec2::new(2.0, 1.0));
}

#[test]
fn boundary_exit_precedes_nothing_else_in_frame() {
    let mut world = World::new();
    let mut control = LoopControl::new();

    let (log, events) = EventLog::new();
    let id = world
        .spawn(
            EntitySpec::new("edge")
                .position(Vec2::new(0.0, 0.0))
                .velocity(Vec2::new(-1.0, 0.0))
                .behavior(log),
        )
        .unwrap();

    // A full frame as the loop would run it: step broadcast, then update.
    world.broadcast(&GameEvent::Step { count: 0 }, &mut control);
    world.update(&mut control);

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], GameEvent::Step { count: 0 }));
    assert!(matches!(events[1], GameEvent::OutOfBounds));
    assert_eq!(world.get(id).unwrap().position(), Vec2::ZERO);
}

#[test]
fn mid_frame_spawn_waits_for_next_movement_pass() {
    use crate::entity::{Behavior, EntityId};
    use crate::world::EngineContext;

    /// Spawns a mover the first time it collides.
    struct Spawner {
        fired: bool,
    }

    impl Behavior for Spawner {
        fn on_event(
            &mut self,
            _me: EntityId,
            event: &GameEvent,
            ctx: &mut EngineContext<'_>,
        ) -> bool {
            if matches!(event, GameEvent::Collision { .. }) && !self.fired {
                self.fired = true;
                ctx.world
                    .spawn(
                        EntitySpec::new("child")
                            .position(Vec2::new(10.0, 10.0))
                            .velocity(Vec2::new(1.0, 0.0)),
                    )
                    .unwrap();
                return true;
            }
            false
        }
    }

    let mut world = World::new();
    let mut control = LoopControl::new();

    let _mover = spawn_mover(
        &mut world,
        "mover",
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Solidness::Hard,
    );
    world
        .spawn(
            EntitySpec::new("trigger")
                .position(Vec2::new(2.0, 1.0))
                .behavior(Spawner { fired: false }),
        )
        .unwrap();

    world.update(&mut control);

    // The child spawned mid-pass exists but has not moved this frame.
    let children = world.handles_of_kind("child");
    assert_eq!(children.len(), 1);
    let child = world.get(children[0]).unwrap();
    assert_eq!(child.position(), Vec2::new(10.0, 10.0));

    // Next frame it moves normally.
    world.update(&mut control);
    let child = world.get(children[0]).unwrap();
    assert_eq!(child.position(), Vec2::new(11.0, 10.0));
}

// =============================================================================
// Full runs
// =============================================================================

#[test]
fn run_delivers_steps_until_game_over() {
    let mut world = World::new();
    let (probe, seen) = StepProbe::new(5);
    world
        .spawn(EntitySpec::new("probe").behavior(probe))
        .unwrap();

    let mut game_loop = GameLoop::with_frame_time(Duration::from_millis(1));
    game_loop.start_up();

    let mut backend = RecordingBackend::new();
    game_loop.run(&mut world, &mut NoInput, &mut backend);

    assert_eq!(seen.get(), 5);
    assert_eq!(game_loop.step_count(), 5);
    // One buffer swap per completed iteration.
    assert_eq!(backend.swaps, 5);
}

#[test]
fn run_without_start_up_is_a_noop() {
    let mut world = World::new();
    let (probe, seen) = StepProbe::new(1);
    world
        .spawn(EntitySpec::new("probe").behavior(probe))
        .unwrap();

    let mut game_loop = GameLoop::new();
    game_loop.run(&mut world, &mut NoInput, &mut NullBackend);

    assert_eq!(seen.get(), 0);
    assert_eq!(game_loop.step_count(), 0);
}

#[test]
fn input_events_arrive_before_the_step_event() {
    let mut world = World::new();
    let (log, events) = EventLog::new();
    world.spawn(EntitySpec::new("log").behavior(log)).unwrap();

    let (probe, _) = StepProbe::new(1);
    world
        .spawn(EntitySpec::new("probe").behavior(probe))
        .unwrap();

    let mut input = ScriptedInput::new(vec![vec![
        InputEvent::Key { code: 13 },
        InputEvent::Pointer {
            action: PointerAction::Pressed,
            button: PointerButton::Left,
            x: 40,
            y: 12,
        },
    ]]);

    let mut game_loop = GameLoop::with_frame_time(Duration::from_millis(1));
    game_loop.start_up();
    game_loop.run(&mut world, &mut input, &mut NullBackend);

    let events = events.borrow();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], GameEvent::Key { code: 13 });
    assert_eq!(
        events[1],
        GameEvent::Pointer {
            action: PointerAction::Pressed,
            button: PointerButton::Left,
            x: 40,
            y: 12,
        }
    );
    assert!(matches!(events[2], GameEvent::Step { count: 0 }));
}

#[test]
fn run_draws_in_altitude_then_id_order() {
    let mut world = World::new();
    let top = world.spawn(EntitySpec::new("top").altitude(9)).unwrap();
    let bottom = world.spawn(EntitySpec::new("bottom").altitude(0)).unwrap();
    let mid_old = world.spawn(EntitySpec::new("mid").altitude(4)).unwrap();
    let mid_new = world.spawn(EntitySpec::new("mid").altitude(4)).unwrap();

    let (probe, _) = StepProbe::new(1);
    world
        .spawn(EntitySpec::new("probe").altitude(-1).behavior(probe))
        .unwrap();
    let probe_id = world.handles_of_kind("probe")[0];

    let mut game_loop = GameLoop::with_frame_time(Duration::from_millis(1));
    game_loop.start_up();

    let mut backend = RecordingBackend::new();
    game_loop.run(&mut world, &mut NoInput, &mut backend);

    assert_eq!(backend.drawn, vec![probe_id, bottom, mid_old, mid_new, top]);
}

#[test]
fn marked_entity_is_gone_by_the_next_step() {
    use crate::entity::{Behavior, EntityId};
    use crate::world::EngineContext;

    /// Marks itself on the first step and ends the run on the second step it
    /// would have seen; a second survivor counts the steps instead.
    struct OneShot;

    impl Behavior for OneShot {
        fn on_event(
            &mut self,
            me: EntityId,
            event: &GameEvent,
            ctx: &mut EngineContext<'_>,
        ) -> bool {
            if matches!(event, GameEvent::Step { .. }) {
                ctx.world.mark_for_delete(me).unwrap();
                return true;
            }
            false
        }
    }

    let mut world = World::new();
    world
        .spawn(EntitySpec::new("oneshot").behavior(OneShot))
        .unwrap();
    let (probe, seen) = StepProbe::new(3);
    world
        .spawn(EntitySpec::new("probe").behavior(probe))
        .unwrap();

    let mut game_loop = GameLoop::with_frame_time(Duration::from_millis(1));
    game_loop.start_up();
    game_loop.run(&mut world, &mut NoInput, &mut NullBackend);

    assert_eq!(seen.get(), 3);
    // Only the probe remains after three frames.
    assert_eq!(world.len(), 1);
    assert!(world.handles_of_kind("oneshot").is_empty());
}
