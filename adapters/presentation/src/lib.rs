#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Sky Tap adapters.
//!
//! Rendering backends capture player input into a [`FrameInput`], translate
//! it into commands with [`gather_commands`], and draw whatever the
//! declarative [`Scene`] built by [`scene`] describes. The session never
//! learns how taps were hit-tested or how craft are drawn; the contract is
//! the entire boundary.

use glam::Vec2;
use skytap_core::{Command, CraftId, GameMode, Heading, ModeId, SizePolicy, TierColor};
use skytap_session::{query, Phase, Session};
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a craft tier tag.
    #[must_use]
    pub const fn from_tier(tier: TierColor) -> Self {
        Self::from_rgb_u8(tier.red(), tier.green(), tier.blue())
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Mode picked on the select overlay during this frame, if any.
    pub mode_selection: Option<ModeId>,
    /// Whether the adapter detected a round-start request on this frame.
    pub start_requested: bool,
    /// Whether the adapter detected a round-reset request on this frame.
    pub reset_requested: bool,
    /// Taps captured during this frame, already hit-tested by the adapter.
    pub taps: Vec<TapInput>,
}

/// Single tap captured by the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapInput {
    /// Position of the tap in the adapter's world units, kept for visual
    /// feedback such as the miss cross; the session never reads it.
    pub position: Vec2,
    /// Craft the tap landed on, or `None` for a tap on empty sky.
    pub craft: Option<CraftId>,
}

/// Translates one frame of captured input into session commands.
pub fn gather_commands(input: &FrameInput, out: &mut Vec<Command>) {
    if input.reset_requested {
        out.push(Command::ResetRound);
    }
    if let Some(mode) = input.mode_selection {
        out.push(Command::ChooseMode { mode });
    }
    if input.start_requested {
        out.push(Command::StartRound);
    }
    for tap in &input.taps {
        match tap.craft {
            Some(craft) => out.push(Command::TapCraft { craft }),
            None => out.push(Command::TapMiss),
        }
    }
}

/// Builds the declarative scene for the session's current state.
#[must_use]
pub fn scene(session: &Session) -> Scene {
    let tiered = query::mode(session)
        .map(|mode| GameMode::get(mode).sizing() == SizePolicy::Tiered)
        .unwrap_or(false);

    let crafts: Vec<CraftPresentation> = query::craft_view(session)
        .iter()
        .map(|snapshot| CraftPresentation {
            id: snapshot.id,
            heading: snapshot.heading,
            lane_fraction: snapshot.lane.fraction(),
            progress: snapshot.progress(),
            scale: snapshot.class.scale(),
            color: Color::from_tier(snapshot.class.tier_color()),
            fading: snapshot.lifecycle == query::CraftLifecycle::Caught,
            health: tiered.then(|| HealthPresentation::of(snapshot.health_fraction())),
        })
        .collect();

    let focus_meter = query::focused_craft(session).and_then(|focused| {
        query::craft_view(session)
            .iter()
            .find(|snapshot| snapshot.id == focused)
            .map(|snapshot| HealthPresentation::of(snapshot.health_fraction()))
    });

    Scene {
        phase: query::phase(session),
        hud: HudPresentation {
            score: query::score(session),
            target: query::target_score(session),
            lives: query::lives(session),
            time_remaining: query::time_remaining(session),
        },
        crafts,
        focus_meter,
        collected: query::caught_count(session) as u32,
    }
}

/// Scene description combining the HUD and the craft crossing the play area.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Lifecycle phase driving which overlay the backend shows.
    pub phase: Phase,
    /// Score, lives, and countdown readouts.
    pub hud: HudPresentation,
    /// Craft currently visible, in deterministic id order.
    pub crafts: Vec<CraftPresentation>,
    /// Shared health meter driven by the focused craft, if any.
    pub focus_meter: Option<HealthPresentation>,
    /// Number of caught craft shown in the collected row.
    pub collected: u32,
}

/// Score, lives, and countdown readouts rendered along the screen edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Craft caught so far this round.
    pub score: u32,
    /// Score required to win, or `None` for time-boxed modes.
    pub target: Option<u32>,
    /// Lives the player still has.
    pub lives: u32,
    /// Time left before the round expires, for time-boxed modes.
    pub time_remaining: Option<Duration>,
}

/// Single craft rendered inside the play area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CraftPresentation {
    /// Identifier the backend reports back on taps.
    pub id: CraftId,
    /// Traversal direction, controlling sprite mirroring and motion.
    pub heading: Heading,
    /// Vertical position as a fraction of the play-area height.
    pub lane_fraction: f32,
    /// Fraction of the traversal completed, controlling horizontal position.
    pub progress: f32,
    /// Display size relative to the largest craft class.
    pub scale: f32,
    /// Tag color of the craft's class.
    pub color: Color,
    /// Whether the craft was caught and is fading out.
    pub fading: bool,
    /// Health bar under the craft, shown only in tiered rounds.
    pub health: Option<HealthPresentation>,
}

/// Remaining-health readout with the band color the original HUD used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthPresentation {
    /// Remaining health as a fraction of the class requirement.
    pub fraction: f32,
    /// Color band the bar should be drawn in.
    pub band: HealthBand,
}

impl HealthPresentation {
    /// Builds a readout for the provided remaining-health fraction.
    #[must_use]
    pub fn of(fraction: f32) -> Self {
        Self {
            fraction,
            band: HealthBand::for_fraction(fraction),
        }
    }
}

/// Color band of a health bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthBand {
    /// More than two thirds remaining; drawn green.
    Fresh,
    /// More than one third remaining; drawn amber.
    Worn,
    /// One third or less remaining; drawn red.
    Critical,
}

impl HealthBand {
    const FRESH_THRESHOLD: f32 = 0.66;
    const WORN_THRESHOLD: f32 = 0.33;

    /// Selects the band for a remaining-health fraction.
    #[must_use]
    pub fn for_fraction(fraction: f32) -> Self {
        if fraction > Self::FRESH_THRESHOLD {
            Self::Fresh
        } else if fraction > Self::WORN_THRESHOLD {
            Self::Worn
        } else {
            Self::Critical
        }
    }
}
