#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Sky Tap experience.
//!
//! Drives one headless round end to end: the session, the spawning system,
//! and the presentation contract are wired exactly as a rendering backend
//! would wire them, with a seeded autoplay policy standing in for the
//! player's finger. Useful as a smoke test and as a reference for backend
//! authors.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skytap_core::{Command, Event, GameMode, Outcome};
use skytap_presentation::{gather_commands, scene, FrameInput, Scene, TapInput};
use skytap_session::{self as session, query, Phase, Session};
use skytap_system_bootstrap::Bootstrap;
use skytap_system_spawning::{Config, Spawning};

/// Drives one headless Sky Tap round from the command line.
#[derive(Debug, Parser)]
#[command(name = "skytap", about = "Headless Sky Tap round driver")]
struct Args {
    /// Mode id to play: standard, speed, or challenge.
    #[arg(long, default_value = "standard")]
    mode: String,

    /// Seed shared by the spawner and the autoplay policy.
    #[arg(long, default_value_t = 0x5eed_cafe)]
    seed: u64,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,

    /// Safety cap on ticks in case a round never terminates.
    #[arg(long, default_value_t = 600)]
    max_ticks: u32,

    /// Chance per tick that the policy taps a visible craft.
    #[arg(long, default_value_t = 0.35)]
    tap_chance: f64,

    /// Chance per tick that the policy taps empty sky.
    #[arg(long, default_value_t = 0.02)]
    miss_chance: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mode = GameMode::lookup(&args.mode)?;

    let mut game = Session::new();
    let bootstrap = Bootstrap::default();
    println!("{}", bootstrap.welcome_banner(&game));
    for entry in bootstrap.mode_catalog() {
        println!("  {:<10} {}", entry.id().as_str(), entry.description());
    }

    let mut spawning = Spawning::new(Config::new(args.seed));
    let mut policy = AutoPolicy::new(args.seed, args.tap_chance, args.miss_chance);

    // One frame of select-overlay input: pick the mode and start.
    let mut commands = Vec::new();
    gather_commands(
        &FrameInput {
            mode_selection: Some(mode.id()),
            start_requested: true,
            ..FrameInput::default()
        },
        &mut commands,
    );

    let mut carried = Vec::new();
    for command in commands.drain(..) {
        session::apply(&mut game, command, &mut carried);
    }
    info!("round started in {} mode", mode.display_name());

    let dt = Duration::from_millis(args.tick_ms);
    for _ in 0..args.max_ticks {
        let outlook = query::spawn_outlook(&game);
        commands.clear();
        spawning.handle(&carried, &outlook, &mut commands);

        let input = policy.frame_input(&scene(&game));
        gather_commands(&input, &mut commands);

        carried.clear();
        for command in commands.drain(..) {
            session::apply(&mut game, command, &mut carried);
        }
        session::apply(&mut game, Command::Tick { dt }, &mut carried);
        report(&carried);

        if matches!(query::phase(&game), Phase::Ended(_)) {
            break;
        }
    }

    match bootstrap.round_summary(&game) {
        Some(summary) => {
            let mode = GameMode::get(summary.mode);
            match summary.outcome {
                Outcome::Won => {
                    println!("Congratulations! You finished {}.", mode.display_name());
                    match summary.target_score {
                        Some(target) => {
                            println!("You caught {}/{} craft.", summary.final_score, target);
                        }
                        None => {
                            println!(
                                "You caught {} craft before time ran out!",
                                summary.final_score
                            );
                        }
                    }
                    println!("Scan the voucher QR code to claim your reward.");
                }
                Outcome::Lost => {
                    println!("{} - better luck next time!", mode.display_name());
                    println!("You caught {} craft.", summary.final_score);
                }
            }
        }
        None => println!("Round still running after {} ticks.", args.max_ticks),
    }

    // Loop back to the idle screen the way the kiosk does.
    let mut reset_events = Vec::new();
    session::apply(&mut game, Command::ResetRound, &mut reset_events);
    debug!("session reset to idle");

    Ok(())
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::ScoreChanged { score, target } => match target {
                Some(target) => info!("score {score}/{target}"),
                None => info!("score {score}"),
            },
            Event::LivesChanged { remaining } => info!("lives {remaining}"),
            Event::TimeChanged { remaining } => info!("time {}s", remaining.as_secs()),
            Event::CraftSpawned { craft, class, .. } => {
                debug!("craft {} enters as {:?}", craft.get(), class);
            }
            Event::CraftRemoved { craft, reason } => {
                debug!("craft {} removed: {:?}", craft.get(), reason);
            }
            Event::RoundEnded {
                outcome,
                final_score,
            } => info!("round ended {outcome:?} with score {final_score}"),
            _ => {}
        }
    }
}

/// Seeded stand-in for the player's finger.
#[derive(Debug)]
struct AutoPolicy {
    rng: ChaCha8Rng,
    tap_chance: f64,
    miss_chance: f64,
}

impl AutoPolicy {
    fn new(seed: u64, tap_chance: f64, miss_chance: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            tap_chance: tap_chance.clamp(0.0, 1.0),
            miss_chance: miss_chance.clamp(0.0, 1.0),
        }
    }

    fn frame_input(&mut self, frame: &Scene) -> FrameInput {
        let mut taps = Vec::new();
        for craft in &frame.crafts {
            if !craft.fading && self.rng.gen_bool(self.tap_chance) {
                taps.push(TapInput {
                    position: Vec2::new(craft.progress, craft.lane_fraction),
                    craft: Some(craft.id),
                });
            }
        }
        if self.rng.gen_bool(self.miss_chance) {
            taps.push(TapInput {
                position: Vec2::new(0.5, 0.9),
                craft: None,
            });
        }

        FrameInput {
            taps,
            ..FrameInput::default()
        }
    }
}
