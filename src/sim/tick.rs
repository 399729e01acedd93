//! Fixed timestep simulation tick
//!
//! Step order: sweep destroyed bodies, sample input (pointer strokes and ink
//! clearing), update and integrate every body (the player is driven from the
//! held keys first), resolve landing, run the collision pass, check terminal
//! conditions, clear input edges.

use super::actors;
use super::arena::BodyArena;
use super::body::Bounds;
use super::collision::ResolveContext;
use super::drawing::StrokeOutcome;
use super::input::{InputState, Key, PointerEvent};
use super::state::{GameEvent, Simulation};
use crate::consts::*;

/// Read-only view of the world handed to each body update
pub struct SimulationContext<'a> {
    /// Live set minus the body being updated
    pub bodies: &'a BodyArena,
    /// Play area
    pub bounds: Bounds,
    pub input: &'a InputState,
    pub dt: f32,
}

/// Advance the simulation by one step of `dt` seconds
pub fn tick(sim: &mut Simulation, input: &mut InputState, dt: f32) {
    sim.bodies.sweep();

    // Latched: nothing moves until a level is (re)loaded
    if sim.terminal.is_some() {
        input.take_pointer_events();
        input.end_step();
        return;
    }

    sim.time_ticks += 1;

    sample_input(sim, input);

    let bounds = sim.play_bounds();
    for id in sim.bodies.ids() {
        let Some(mut body) = sim.bodies.detach(id) else {
            continue;
        };
        if body.active {
            let ctx = SimulationContext {
                bodies: &sim.bodies,
                bounds,
                input: &*input,
                dt,
            };
            if id == sim.player {
                sim.controller.drive(&mut body, ctx.input, dt);
            }
            actors::update_body(&mut body, &ctx, &mut sim.rng);
        }
        sim.bodies.reattach(body);
    }

    sim.controller.resolve_landing(
        sim.player,
        &mut sim.bodies,
        &sim.collisions,
        sim.tuning.play_width,
    );

    let ctx = ResolveContext {
        dt,
        carry_tolerance: sim.tuning.moving_carry_tolerance,
    };
    sim.collisions.run(&mut sim.bodies, &ctx, &mut sim.events);

    if let Some(signal) = check_terminal(sim) {
        log::info!(
            "Level {} ended: {:?} after {} ticks",
            sim.level_index() + 1,
            signal,
            sim.time_ticks
        );
        sim.events.push(signal.clone());
        sim.terminal = Some(signal);
    }

    input.end_step();
}

/// Turn queued pointer samples into strokes and handle the clear key
fn sample_input(sim: &mut Simulation, input: &mut InputState) {
    for event in input.take_pointer_events() {
        match event {
            PointerEvent::Down(at) => {
                sim.drawing.begin_stroke(at);
            }
            PointerEvent::Move(to) => match sim.drawing.extend_stroke(to, &mut sim.bodies) {
                StrokeOutcome::Committed { platform, cost } => {
                    sim.events.push(GameEvent::StrokeCommitted { platform, cost });
                }
                StrokeOutcome::Exhausted { .. } => sim.events.push(GameEvent::InkExhausted),
                StrokeOutcome::Idle | StrokeOutcome::Debounced => {}
            },
            PointerEvent::Up | PointerEvent::Leave => sim.drawing.end_stroke(),
        }
    }

    if input.is_just_pressed(Key::ClearInk) {
        let (count, refund) = sim.drawing.clear_drawn(&mut sim.bodies);
        if count > 0 {
            sim.events.push(GameEvent::PlatformsCleared { count, refund });
        }
    }
}

/// Death (fell below the play area) is checked before the goal
fn check_terminal(sim: &Simulation) -> Option<GameEvent> {
    let player = sim.bodies.get(sim.player)?;
    if player.position.y > sim.tuning.play_height {
        return Some(GameEvent::Died);
    }
    let door = sim.bodies.get(sim.door)?;
    if door.overlaps(player) {
        return Some(GameEvent::ReachedGoal);
    }
    None
}

/// Runs whole [`SIM_DT`] ticks out of variable frame times
#[derive(Debug, Clone, Default)]
pub struct FixedStepper {
    accumulator: f32,
}

impl FixedStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's elapsed time; returns the number of ticks run
    ///
    /// Frame time is clamped to [`MAX_FRAME_DT`] and at most
    /// [`MAX_SUBSTEPS`] ticks run per frame.
    pub fn advance(
        &mut self,
        sim: &mut Simulation,
        input: &mut InputState,
        frame_dt: f32,
    ) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(sim, input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Fraction of a tick left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelSet;
    use crate::sim::body::{Body, BodyId, Tag};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    /// Single-level simulation; the door sits out of the way unless moved
    fn sim_with(start: (f32, f32), platforms: &str, obstacles: &str) -> Simulation {
        let json = format!(
            r#"[{{
                "name": "Test",
                "ink": 100,
                "playerStart": {{ "x": {}, "y": {} }},
                "doorPosition": {{ "x": 400, "y": 0 }},
                "platforms": [{}],
                "obstacles": [{}]
            }}]"#,
            start.0, start.1, platforms, obstacles
        );
        let levels = LevelSet::from_json(&json).unwrap();
        Simulation::new(Tuning::default(), levels, 12345).unwrap()
    }

    const LINE_500: &str = r#"{ "start": { "x": 100, "y": 500 }, "end": { "x": 300, "y": 500 } }"#;

    fn player(sim: &Simulation) -> &Body {
        sim.bodies.get(sim.player).unwrap()
    }

    fn grounded(sim: &Simulation) -> bool {
        player(sim).as_player().unwrap().grounded
    }

    fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    #[test]
    fn test_stroke_through_tick_spends_ink() {
        let mut sim = Simulation::with_builtin_levels(1).unwrap();
        let mut input = InputState::new();
        input.push_pointer(PointerEvent::Down(Vec2::new(100.0, 400.0)));
        input.push_pointer(PointerEvent::Move(Vec2::new(140.0, 400.0)));
        input.push_pointer(PointerEvent::Up);
        tick(&mut sim, &mut input, SIM_DT);

        assert_eq!(sim.drawing.ink.current, 80.0);
        assert!(!sim.drawing.is_drawing());
        assert_eq!(sim.stats().drawn_platforms, 1);
        let events = sim.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::StrokeCommitted { cost, .. }] if *cost == 20.0
        ));
    }

    #[test]
    fn test_unaffordable_stroke_creates_nothing() {
        let mut sim = Simulation::with_builtin_levels(1).unwrap();
        sim.drawing.ink.current = 10.0;
        let platforms = sim.bodies.count_tag(Tag::Platform);
        let mut input = InputState::new();
        input.push_pointer(PointerEvent::Down(Vec2::new(100.0, 400.0)));
        input.push_pointer(PointerEvent::Move(Vec2::new(130.0, 400.0)));
        tick(&mut sim, &mut input, SIM_DT);

        assert_eq!(sim.drawing.ink.current, 10.0);
        assert_eq!(sim.bodies.count_tag(Tag::Platform), platforms);
        assert!(!sim.drawing.is_drawing());
        assert_eq!(sim.drain_events(), vec![GameEvent::InkExhausted]);
    }

    #[test]
    fn test_falling_player_lands_in_one_tick() {
        let mut sim = sim_with((188.0, 458.0), LINE_500, "");
        sim.bodies.get_mut(sim.player).unwrap().velocity.y = 50.0;
        let mut input = InputState::new();
        tick(&mut sim, &mut input, SIM_DT);

        let p = player(&sim);
        assert_eq!(p.bottom(), 500.0);
        assert_eq!(p.velocity.y, 0.0);
        assert!(grounded(&sim));
        assert!(p.as_player().unwrap().can_jump);
    }

    #[test]
    fn test_death_fires_once() {
        let mut sim = sim_with((225.0, 700.0), "", "");
        let mut input = InputState::new();
        let mut events = Vec::new();
        for _ in 0..300 {
            tick(&mut sim, &mut input, SIM_DT);
            events.extend(sim.drain_events());
        }
        assert_eq!(count(&events, &GameEvent::Died), 1);
        assert_eq!(sim.terminal(), Some(&GameEvent::Died));

        // Latched: further ticks do nothing
        let ticks = sim.time_ticks;
        let y = player(&sim).position.y;
        tick(&mut sim, &mut input, SIM_DT);
        assert_eq!(sim.time_ticks, ticks);
        assert_eq!(player(&sim).position.y, y);

        sim.restart_level().unwrap();
        assert!(sim.terminal().is_none());
        assert_eq!(player(&sim).position, Vec2::new(225.0, 700.0));
    }

    #[test]
    fn test_reaching_the_door() {
        let mut sim = sim_with((410.0, 20.0), "", "");
        let mut input = InputState::new();
        tick(&mut sim, &mut input, SIM_DT);
        tick(&mut sim, &mut input, SIM_DT);
        assert_eq!(sim.terminal(), Some(&GameEvent::ReachedGoal));
        assert_eq!(count(&sim.drain_events(), &GameEvent::ReachedGoal), 1);
    }

    #[test]
    fn test_standing_on_segment_is_stable() {
        let mut sim = sim_with((188.0, 468.0), LINE_500, "");
        let mut input = InputState::new();
        for _ in 0..120 {
            tick(&mut sim, &mut input, SIM_DT);
            assert_eq!(player(&sim).bottom(), 500.0);
            assert!(grounded(&sim));
        }
    }

    #[test]
    fn test_jump_and_land_again() {
        let mut sim = sim_with((188.0, 468.0), LINE_500, "");
        let mut input = InputState::new();
        tick(&mut sim, &mut input, SIM_DT);

        input.press(Key::Jump);
        tick(&mut sim, &mut input, SIM_DT);
        let p = player(&sim);
        assert!(p.velocity.y < 0.0);
        assert!(p.bottom() < 500.0);
        assert!(!p.as_player().unwrap().can_jump);

        // Holding the key does not jump again on landing
        for _ in 0..120 {
            tick(&mut sim, &mut input, SIM_DT);
        }
        assert_eq!(player(&sim).bottom(), 500.0);
        assert!(grounded(&sim));
        assert_eq!(player(&sim).velocity.y, 0.0);
    }

    #[test]
    fn test_wall_top_holds_player() {
        let wall = r#"{ "type": "wall", "x": 100, "y": 500, "width": 250, "height": 20 }"#;
        let mut sim = sim_with((200.0, 460.0), "", wall);
        let mut input = InputState::new();
        let mut ticks = 0;
        while !grounded(&sim) {
            tick(&mut sim, &mut input, SIM_DT);
            ticks += 1;
            assert!(ticks < 30, "never landed on the wall");
        }
        for _ in 0..60 {
            tick(&mut sim, &mut input, SIM_DT);
            assert!(grounded(&sim));
            assert_eq!(player(&sim).bottom(), 500.0);
            assert_eq!(player(&sim).velocity.y, 0.0);
        }
        assert!(sim.terminal().is_none());
    }

    #[test]
    fn test_moving_platform_carries_rider() {
        let moving =
            r#"{ "type": "moving", "x": 180, "y": 400, "width": 80, "height": 10, "speed": 60 }"#;
        let mut sim = sim_with((200.0, 368.0), "", moving);
        let platform = sim
            .bodies
            .iter()
            .find(|b| b.tag() == Tag::Platform)
            .map(|b| b.id)
            .unwrap();
        let platform_x = sim.bodies.get(platform).unwrap().position.x;
        let rider_x = player(&sim).position.x;
        let mut input = InputState::new();

        for _ in 0..60 {
            tick(&mut sim, &mut input, SIM_DT);
            assert!(grounded(&sim));
            assert!((player(&sim).bottom() - 400.0).abs() < 1e-3);
        }
        let platform_dx = sim.bodies.get(platform).unwrap().position.x - platform_x;
        let rider_dx = player(&sim).position.x - rider_x;
        assert!(platform_dx > 50.0, "platform moved {platform_dx}");
        assert!(
            (rider_dx - platform_dx).abs() < 0.1,
            "rider {rider_dx} platform {platform_dx}"
        );
    }

    #[test]
    fn test_lands_on_sloped_line() {
        let slope = r#"{ "start": { "x": 100, "y": 420 }, "end": { "x": 300, "y": 580 } }"#;
        // Centre above x = 200, where the line is at y = 500; 30 units clear
        let mut sim = sim_with((188.0, 438.0), slope, "");
        let mut input = InputState::new();
        let mut landed_at = None;
        for i in 0..90 {
            tick(&mut sim, &mut input, SIM_DT);
            if grounded(&sim) && landed_at.is_none() {
                landed_at = Some(i);
            }
            if landed_at.is_some() {
                assert!(grounded(&sim), "slipped off at tick {i}");
            }
            assert!(player(&sim).bottom() <= 500.0);
        }
        assert!(landed_at.is_some());
        assert!(sim.terminal().is_none());
    }

    #[test]
    fn test_fast_fall_overshooting_the_line_still_lands() {
        let mut sim = sim_with((188.0, 500.0 - 0.5 - PLAYER_HEIGHT), LINE_500, "");
        sim.bodies.get_mut(sim.player).unwrap().velocity.y = MAX_FALL_SPEED;
        let mut input = InputState::new();
        tick(&mut sim, &mut input, SIM_DT);

        let p = player(&sim);
        assert_eq!(p.bottom(), 500.0);
        assert_eq!(p.velocity.y, 0.0);
        assert!(grounded(&sim));
    }

    #[test]
    fn test_spike_respawns_without_ending_level() {
        let spike = r#"{ "type": "spike", "x": 0, "y": 770, "width": 450, "height": 20 }"#;
        let mut sim = sim_with((100.0, 700.0), "", spike);
        let mut input = InputState::new();
        let mut events = Vec::new();
        for _ in 0..60 {
            tick(&mut sim, &mut input, SIM_DT);
            events.extend(sim.drain_events());
        }
        assert!(count(&events, &GameEvent::Respawned) >= 1);
        assert_eq!(count(&events, &GameEvent::Died), 0);
        assert!(sim.terminal().is_none());
        assert!(player(&sim).position.y < 770.0);
    }

    #[test]
    fn test_collectible_evicted_on_next_tick() {
        let item = r#"{ "type": "collectible", "x": 104, "y": 470, "item": "bonus" }"#;
        let mut sim = sim_with((100.0, 460.0), "", item);
        let mut input = InputState::new();
        let before = sim.bodies.len();

        tick(&mut sim, &mut input, SIM_DT);
        let events = sim.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Collected { value: 50, .. }
        )));
        assert_eq!(sim.bodies.len(), before);
        assert_eq!(sim.bodies.count_tag(Tag::Collectible), 0);

        tick(&mut sim, &mut input, SIM_DT);
        assert_eq!(sim.bodies.len(), before - 1);
    }

    #[test]
    fn test_clear_ink_key_refunds() {
        let mut sim = Simulation::with_builtin_levels(1).unwrap();
        let mut input = InputState::new();
        input.push_pointer(PointerEvent::Down(Vec2::new(100.0, 300.0)));
        input.push_pointer(PointerEvent::Move(Vec2::new(140.0, 300.0)));
        input.push_pointer(PointerEvent::Move(Vec2::new(180.0, 300.0)));
        input.push_pointer(PointerEvent::Up);
        tick(&mut sim, &mut input, SIM_DT);
        assert_eq!(sim.drawing.ink.current, 60.0);
        sim.drain_events();

        input.press(Key::ClearInk);
        tick(&mut sim, &mut input, SIM_DT);
        assert_eq!(
            sim.drain_events(),
            vec![GameEvent::PlatformsCleared {
                count: 2,
                refund: 20.0
            }]
        );
        assert_eq!(sim.drawing.ink.current, 80.0);
        // Level platform survives
        assert_eq!(sim.bodies.count_tag(Tag::Platform), 1);
    }

    #[test]
    fn test_determinism() {
        let obstacles = r#"
            { "type": "enemy", "x": 50, "y": 100 },
            { "type": "enemy", "x": 300, "y": 400 },
            { "type": "enemy", "x": 200, "y": 600, "behavior": "chaser" },
            { "type": "collectible", "x": 150, "y": 300 },
            { "type": "moving", "x": 180, "y": 350, "width": 80, "height": 10, "speed": -40 }
        "#;
        let mut a = sim_with((188.0, 468.0), LINE_500, obstacles);
        let mut b = sim_with((188.0, 468.0), LINE_500, obstacles);
        let mut input_a = InputState::new();
        let mut input_b = InputState::new();

        for i in 0..300 {
            for input in [&mut input_a, &mut input_b] {
                if i % 50 == 0 {
                    input.press(Key::Right);
                } else if i % 50 == 25 {
                    input.release(Key::Right);
                }
            }
            tick(&mut a, &mut input_a, SIM_DT);
            tick(&mut b, &mut input_b, SIM_DT);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.render_snapshot(), b.render_snapshot());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_fixed_stepper() {
        let mut sim = Simulation::with_builtin_levels(1).unwrap();
        let mut input = InputState::new();
        let mut stepper = FixedStepper::new();

        assert_eq!(stepper.advance(&mut sim, &mut input, 0.04), 2);
        assert_eq!(sim.time_ticks, 2);
        assert!(stepper.alpha() > 0.0 && stepper.alpha() < 1.0);

        // A long stall is clamped to a handful of ticks
        let ran = stepper.advance(&mut sim, &mut input, 5.0);
        assert!((5..=7).contains(&ran), "ran {ran} ticks");

        assert_eq!(stepper.advance(&mut sim, &mut input, f32::NAN), 0);
        assert_eq!(stepper.advance(&mut sim, &mut input, -1.0), 0);
    }

    #[test]
    fn test_destroyed_body_swept_at_next_step() {
        let moving = r#"{ "type": "moving", "x": 180, "y": 350, "width": 80, "height": 10 }"#;
        let mut sim = sim_with((20.0, 100.0), "", moving);
        let id: BodyId = sim
            .bodies
            .iter()
            .find(|b| b.tag() == Tag::Platform)
            .map(|b| b.id)
            .unwrap();
        sim.bodies.get_mut(id).unwrap().destroy();
        let mut input = InputState::new();
        tick(&mut sim, &mut input, SIM_DT);
        assert!(sim.bodies.get(id).is_none());
    }

    proptest! {
        /// Within the tolerance band the player lands in one tick; beyond it,
        /// it keeps falling
        #[test]
        fn landing_band(
            gap in 0.5f32..14.5,
            vy in 0.0f32..=MAX_FALL_SPEED,
            far in 16.0f32..200.0,
        ) {
            let mut near_sim = sim_with((188.0, 500.0 - gap - PLAYER_HEIGHT), LINE_500, "");
            near_sim.bodies.get_mut(near_sim.player).unwrap().velocity.y = vy;
            let mut input = InputState::new();
            tick(&mut near_sim, &mut input, SIM_DT);
            prop_assert!(grounded(&near_sim));
            prop_assert_eq!(player(&near_sim).bottom(), 500.0);
            prop_assert_eq!(player(&near_sim).velocity.y, 0.0);

            let mut far_sim = sim_with((188.0, 500.0 - far - PLAYER_HEIGHT), LINE_500, "");
            tick(&mut far_sim, &mut input, SIM_DT);
            prop_assert!(!grounded(&far_sim));
            prop_assert!(player(&far_sim).bottom() < 500.0);
        }
    }
}
