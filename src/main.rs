//! Draw & Escape - headless native driver
//!
//! Loads a level, plays a short scripted session (a drawn ramp, a walk, a
//! jump, an ink clear) through the fixed-step driver and logs what happens.
//! Run with `RUST_LOG=debug` for per-stroke detail.
//!
//! Usage: `draw-escape [level-number] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use draw_escape::consts::SIM_DT;
    use draw_escape::sim::{FixedStepper, InputState, Key, PointerEvent, Simulation};
    use draw_escape::{LevelSet, Tuning};
    use glam::Vec2;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let level_number: usize = match args.next() {
        Some(arg) => arg.parse()?,
        None => 1,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    let seed = 42;
    let mut sim = Simulation::new(tuning, LevelSet::builtin()?, seed)?;
    sim.load_level(level_number.saturating_sub(1))?;
    log::info!("Draw & Escape (headless) running with seed {}", seed);

    let mut input = InputState::new();
    let mut stepper = FixedStepper::new();
    let spawn = sim
        .bodies
        .get(sim.player)
        .map(|player| player.position)
        .unwrap_or(Vec2::ZERO);

    for frame in 0..600u32 {
        match frame {
            10 => {
                // Ramp up and to the right of the spawn point
                let start = spawn + Vec2::new(30.0, 40.0);
                input.push_pointer(PointerEvent::Down(start));
                for step in 1..=4 {
                    let to = start + Vec2::new(20.0, -12.0) * step as f32;
                    input.push_pointer(PointerEvent::Move(to));
                }
                input.push_pointer(PointerEvent::Up);
            }
            30 => input.press(Key::Right),
            70 => input.release(Key::Right),
            80 => input.press(Key::Jump),
            81 => input.release(Key::Jump),
            300 => input.press(Key::ClearInk),
            301 => input.release(Key::ClearInk),
            _ => {}
        }

        stepper.advance(&mut sim, &mut input, SIM_DT);

        for event in sim.drain_events() {
            log::info!("frame {}: {:?}", frame, event);
        }
        if sim.terminal().is_some() {
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&sim.stats())?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on the web; the host drives `tick` itself
}
