#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sky Tap engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the session executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for
//! systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Sky Tap.";

/// Identifiers of the selectable game modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeId {
    /// Target-gated round with a fixed craft quota.
    Standard,
    /// Time-boxed round with continuous spawning and faster craft.
    Speed,
    /// Target-gated round where craft come in four size tiers.
    Challenge,
}

impl ModeId {
    /// Canonical lowercase identifier used at adapter boundaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Speed => "speed",
            Self::Challenge => "challenge",
        }
    }

    /// Parses a boundary identifier into a typed mode id.
    ///
    /// Unknown identifiers are reported to the caller and never reach the
    /// session.
    pub fn parse(value: &str) -> Result<Self, UnknownModeError> {
        match value {
            "standard" => Ok(Self::Standard),
            "speed" => Ok(Self::Speed),
            "challenge" => Ok(Self::Challenge),
            other => Err(UnknownModeError {
                id: other.to_owned(),
            }),
        }
    }
}

/// Error raised when a boundary mode identifier is not in the fixed set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown game mode id `{id}`")]
pub struct UnknownModeError {
    /// Identifier that failed the registry lookup.
    pub id: String,
}

/// Sizing policy applied to craft spawned during a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizePolicy {
    /// Every craft uses the smallest class and goes down in one tap.
    Uniform,
    /// Craft classes are sampled uniformly from the four size tiers.
    Tiered,
}

/// Rule parameters for a single selectable game mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameMode {
    id: ModeId,
    display_name: &'static str,
    description: &'static str,
    target_score: Option<u32>,
    craft_quota: Option<u32>,
    starting_lives: u32,
    time_limit: Option<Duration>,
    speed_multiplier: f32,
    sizing: SizePolicy,
}

const MODES: [GameMode; 3] = [
    GameMode {
        id: ModeId::Standard,
        display_name: "Standard",
        description: "Catch 6 of 10 craft to win",
        target_score: Some(6),
        craft_quota: Some(10),
        starting_lives: 3,
        time_limit: None,
        speed_multiplier: 1.0,
        sizing: SizePolicy::Uniform,
    },
    GameMode {
        id: ModeId::Speed,
        display_name: "Speed",
        description: "30 seconds, catch as many as you can",
        target_score: None,
        craft_quota: None,
        starting_lives: 3,
        time_limit: Some(Duration::from_secs(30)),
        speed_multiplier: 1.5,
        sizing: SizePolicy::Uniform,
    },
    GameMode {
        id: ModeId::Challenge,
        display_name: "Challenge",
        description: "Craft come in different sizes",
        target_score: Some(6),
        craft_quota: Some(10),
        starting_lives: 3,
        time_limit: None,
        speed_multiplier: 1.0,
        sizing: SizePolicy::Tiered,
    },
];

impl GameMode {
    /// Retrieves the rule parameters for a typed mode id.
    #[must_use]
    pub const fn get(id: ModeId) -> &'static GameMode {
        match id {
            ModeId::Standard => &MODES[0],
            ModeId::Speed => &MODES[1],
            ModeId::Challenge => &MODES[2],
        }
    }

    /// Resolves a boundary identifier into its registered mode.
    pub fn lookup(id: &str) -> Result<&'static GameMode, UnknownModeError> {
        Ok(Self::get(ModeId::parse(id)?))
    }

    /// Enumerates every selectable mode in presentation order.
    #[must_use]
    pub const fn all() -> &'static [GameMode] {
        &MODES
    }

    /// Typed identifier of the mode.
    #[must_use]
    pub const fn id(&self) -> ModeId {
        self.id
    }

    /// Name shown on the mode-select overlay.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// One-line rule description shown on the mode-select overlay.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// Score required to win, or `None` for time-boxed modes.
    #[must_use]
    pub const fn target_score(&self) -> Option<u32> {
        self.target_score
    }

    /// Total craft spawned per round, or `None` for continuous spawning.
    #[must_use]
    pub const fn craft_quota(&self) -> Option<u32> {
        self.craft_quota
    }

    /// Lives the player starts the round with.
    #[must_use]
    pub const fn starting_lives(&self) -> u32 {
        self.starting_lives
    }

    /// Round countdown, or `None` for untimed modes.
    #[must_use]
    pub const fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Multiplier applied to craft traversal speed.
    #[must_use]
    pub const fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Sizing policy applied to spawned craft.
    #[must_use]
    pub const fn sizing(&self) -> SizePolicy {
        self.sizing
    }
}

/// Size tier assigned to a craft when it spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CraftClass {
    /// Smallest silhouette, downed by a single tap.
    Scout,
    /// Mid-size silhouette, downed by two taps.
    Courier,
    /// Large silhouette, downed by three taps.
    Freighter,
    /// Largest silhouette, downed by five taps.
    Titan,
}

impl CraftClass {
    /// Every class in ascending size order, sampled uniformly by spawners.
    pub const ALL: [CraftClass; 4] = [
        CraftClass::Scout,
        CraftClass::Courier,
        CraftClass::Freighter,
        CraftClass::Titan,
    ];

    /// Taps required to bring the craft down.
    #[must_use]
    pub const fn hits_to_down(self) -> u32 {
        match self {
            Self::Scout => 1,
            Self::Courier => 2,
            Self::Freighter => 3,
            Self::Titan => 5,
        }
    }

    /// Display size relative to the largest class.
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::Scout => 0.4,
            Self::Courier => 0.6,
            Self::Freighter => 0.8,
            Self::Titan => 1.0,
        }
    }

    /// Tag color associated with the class.
    #[must_use]
    pub const fn tier_color(self) -> TierColor {
        match self {
            Self::Scout => TierColor::from_rgb(0x4c, 0xaf, 0x50),
            Self::Courier => TierColor::from_rgb(0xff, 0x98, 0x00),
            Self::Freighter => TierColor::from_rgb(0xf4, 0x43, 0x36),
            Self::Titan => TierColor::from_rgb(0x9c, 0x27, 0xb0),
        }
    }
}

/// Tag color applied to a craft class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TierColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TierColor {
    /// Creates a new tag color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Unique identifier assigned to a spawned craft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CraftId(u32);

impl CraftId {
    /// Creates a new craft identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Traversal direction of a craft across the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Enters at the left edge and traverses toward the right.
    Eastward,
    /// Enters at the right edge and traverses toward the left.
    Westward,
}

/// Vertical flight lane expressed in permille of the play-area height.
///
/// Lanes are confined to the middle band of the play area so craft never
/// hug the HUD edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lane(u32);

impl Lane {
    /// Highest lane (closest to the top) a craft may occupy.
    pub const MIN_PERMILLE: u32 = 200;

    /// Lowest lane (closest to the bottom) a craft may occupy.
    pub const MAX_PERMILLE: u32 = 800;

    /// Creates a lane, clamping the value into the permitted band.
    #[must_use]
    pub const fn from_permille(value: u32) -> Self {
        if value < Self::MIN_PERMILLE {
            Self(Self::MIN_PERMILLE)
        } else if value > Self::MAX_PERMILLE {
            Self(Self::MAX_PERMILLE)
        } else {
            Self(value)
        }
    }

    /// Lane position in permille of the play-area height.
    #[must_use]
    pub const fn permille(&self) -> u32 {
        self.0
    }

    /// Lane position as a fraction of the play-area height.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.0 as f32 / 1_000.0
    }
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Records the mode the player picked on the select overlay.
    ChooseMode {
        /// Mode that should drive the next round.
        mode: ModeId,
    },
    /// Starts a round using the previously chosen mode.
    StartRound,
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new craft enter the play area.
    SpawnCraft {
        /// Traversal direction assigned to the craft.
        heading: Heading,
        /// Vertical lane assigned to the craft.
        lane: Lane,
        /// Size tier assigned to the craft.
        class: CraftClass,
        /// Time the craft takes to cross the play area before escaping.
        traversal: Duration,
    },
    /// Routes a tap that landed on a craft.
    TapCraft {
        /// Identifier of the craft that was tapped.
        craft: CraftId,
    },
    /// Routes a tap that landed on empty sky.
    TapMiss,
    /// Returns the session to its pre-start idle configuration.
    ResetRound,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a mode was recorded for the next round.
    ModeChosen {
        /// Mode that will drive the next round.
        mode: ModeId,
    },
    /// Announces that a round began.
    RoundStarted {
        /// Mode driving the round.
        mode: ModeId,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a craft entered the play area.
    CraftSpawned {
        /// Identifier assigned to the craft.
        craft: CraftId,
        /// Traversal direction of the craft.
        heading: Heading,
        /// Vertical lane the craft flies in.
        lane: Lane,
        /// Size tier assigned to the craft.
        class: CraftClass,
    },
    /// Reports a tap that damaged a craft.
    CraftDamaged {
        /// Identifier of the damaged craft.
        craft: CraftId,
        /// Taps absorbed so far, including this one.
        hits_taken: u32,
        /// Taps required to bring the craft down.
        hits_required: u32,
    },
    /// Announces which craft now drives the shared health meter.
    FocusShifted {
        /// Craft owning the meter, or `None` when the meter hides.
        craft: Option<CraftId>,
    },
    /// Confirms that a craft left the play area.
    CraftRemoved {
        /// Identifier of the removed craft.
        craft: CraftId,
        /// Whether the craft was caught or escaped unclaimed.
        reason: RemovalReason,
    },
    /// Reports the score after a craft was caught.
    ScoreChanged {
        /// Craft caught so far this round.
        score: u32,
        /// Score required to win, or `None` for time-boxed modes.
        target: Option<u32>,
    },
    /// Reports the lives remaining after a missed tap.
    LivesChanged {
        /// Lives the player still has.
        remaining: u32,
    },
    /// Reports the countdown after a whole second elapsed.
    TimeChanged {
        /// Time left before the round expires.
        remaining: Duration,
    },
    /// Announces that the round reached a terminal state.
    RoundEnded {
        /// Whether the player won or lost the round.
        outcome: Outcome,
        /// Score held when the round ended.
        final_score: u32,
    },
    /// Confirms that the session returned to its idle configuration.
    RoundReset,
}

/// Reason a craft was removed from the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// The craft absorbed enough taps and finished its fade-out.
    Caught,
    /// The craft reached the far edge unclaimed.
    Escaped,
}

/// Terminal result of a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player met the mode's win condition.
    Won,
    /// The player ran out of lives or craft.
    Lost,
}

/// Read-only view the spawning system consumes to pace craft creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnOutlook {
    /// Whether a round is active and accepting spawn commands.
    pub round_active: bool,
    /// Craft spawned so far this round.
    pub spawned: u32,
    /// Bounded craft quota, or `None` for continuous spawning.
    pub quota: Option<u32>,
    /// Multiplier applied to craft traversal speed.
    pub speed_multiplier: f32,
    /// Sizing policy applied to new craft.
    pub sizing: SizePolicy,
}

impl SpawnOutlook {
    /// Reports whether the bounded quota leaves no room for another craft.
    #[must_use]
    pub fn quota_exhausted(&self) -> bool {
        matches!(self.quota, Some(quota) if self.spawned >= quota)
    }
}
