#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting craft spawn commands.

use std::time::Duration;

use skytap_core::{Command, CraftClass, Event, Heading, Lane, SizePolicy, SpawnOutlook};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Delay window between spawns while a bounded quota remains, in milliseconds.
const PACED_DELAY_MIN_MS: u64 = 500;
const PACED_DELAY_MAX_MS: u64 = 2_000;

/// Delay window between spawns for continuous time-boxed rounds, in milliseconds.
const RUSHED_DELAY_MIN_MS: u64 = 300;
const RUSHED_DELAY_MAX_MS: u64 = 1_100;

/// Base traversal window before the mode speed multiplier, in milliseconds.
const TRAVERSAL_MIN_MS: u64 = 3_000;
const TRAVERSAL_MAX_MS: u64 = 5_000;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that deterministically emits spawn commands while a round runs.
#[derive(Debug)]
pub struct Spawning {
    accumulator: Duration,
    pending_delay: Option<Duration>,
    rng_state: u64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            accumulator: Duration::ZERO,
            pending_delay: None,
            rng_state: config.rng_seed,
        }
    }

    /// Consumes events and the spawn outlook to emit spawn commands.
    ///
    /// A `RoundStarted` event produces one craft immediately; later craft are
    /// paced off accumulated `TimeAdvanced` time with delays drawn from the
    /// mode-appropriate window. An inactive round drains the accumulator so a
    /// stale backlog never bursts into the next round.
    pub fn handle(&mut self, events: &[Event], outlook: &SpawnOutlook, out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        let mut round_started = false;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                Event::RoundStarted { .. } => round_started = true,
                _ => {}
            }
        }

        if !outlook.round_active {
            self.accumulator = Duration::ZERO;
            self.pending_delay = None;
            return;
        }

        let mut budget = outlook.quota.map(|quota| quota.saturating_sub(outlook.spawned));

        if round_started {
            self.accumulator = Duration::ZERO;
            self.pending_delay = None;
            if take_budget(&mut budget) {
                out.push(self.draw_spawn(outlook));
            }
        }

        if accumulated.is_zero() {
            return;
        }
        self.accumulator = self.accumulator.saturating_add(accumulated);

        loop {
            let delay = match self.pending_delay {
                Some(delay) => delay,
                None => {
                    let delay = self.draw_delay(outlook);
                    self.pending_delay = Some(delay);
                    delay
                }
            };

            if self.accumulator < delay || !take_budget(&mut budget) {
                break;
            }

            self.accumulator -= delay;
            self.pending_delay = None;
            out.push(self.draw_spawn(outlook));
        }
    }

    fn draw_delay(&mut self, outlook: &SpawnOutlook) -> Duration {
        let millis = if outlook.quota.is_some() {
            self.draw_range(PACED_DELAY_MIN_MS, PACED_DELAY_MAX_MS)
        } else {
            self.draw_range(RUSHED_DELAY_MIN_MS, RUSHED_DELAY_MAX_MS)
        };
        Duration::from_millis(millis)
    }

    fn draw_spawn(&mut self, outlook: &SpawnOutlook) -> Command {
        let heading = if self.advance_rng() % 2 == 0 {
            Heading::Eastward
        } else {
            Heading::Westward
        };

        let lane = Lane::from_permille(
            self.draw_range(u64::from(Lane::MIN_PERMILLE), u64::from(Lane::MAX_PERMILLE)) as u32,
        );

        let class = match outlook.sizing {
            SizePolicy::Uniform => CraftClass::Scout,
            SizePolicy::Tiered => {
                let index = (self.advance_rng() % CraftClass::ALL.len() as u64) as usize;
                CraftClass::ALL[index]
            }
        };

        let base_millis = self.draw_range(TRAVERSAL_MIN_MS, TRAVERSAL_MAX_MS);
        let traversal_millis = if outlook.speed_multiplier > 0.0 {
            (base_millis as f32 / outlook.speed_multiplier) as u64
        } else {
            base_millis
        };

        Command::SpawnCraft {
            heading,
            lane,
            class,
            traversal: Duration::from_millis(traversal_millis),
        }
    }

    fn draw_range(&mut self, low: u64, high: u64) -> u64 {
        debug_assert!(low <= high, "draw_range requires an ordered window");
        let span = high - low + 1;
        low + self.advance_rng() % span
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }
}

fn take_budget(budget: &mut Option<u32>) -> bool {
    match budget {
        None => true,
        Some(0) => false,
        Some(remaining) => {
            *remaining -= 1;
            true
        }
    }
}
