#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Sky Tap.
//!
//! The session owns everything a round mutates: the lifecycle phase, score,
//! lives, countdown, and the collection of craft currently crossing the play
//! area. Adapters and systems never touch this state directly; they submit
//! [`Command`] values to [`apply`], which executes them deterministically and
//! broadcasts [`Event`] values describing what changed. A terminal
//! `Won`/`Lost` transition gates every later mutating command until the
//! session is reset, so callbacks scheduled before the round ended can never
//! disturb a finished round.

mod hits;

use std::time::Duration;

use skytap_core::{
    Command, CraftClass, CraftId, Event, GameMode, Heading, Lane, ModeId, Outcome, RemovalReason,
    SizePolicy, WELCOME_BANNER,
};

use hits::HitResolution;

const COUNTDOWN_QUANTUM: Duration = Duration::from_secs(1);

/// Lifecycle phase of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No mode chosen; the select overlay is showing.
    Idle,
    /// A mode is recorded and the round can start.
    ModeSelected,
    /// A round is in progress and commands mutate state.
    Active,
    /// The round reached a terminal outcome and awaits a reset.
    Ended(Outcome),
}

/// Rule parameters copied out of the chosen mode when a round starts.
#[derive(Clone, Copy, Debug)]
struct RoundRules {
    target_score: Option<u32>,
    craft_quota: Option<u32>,
    starting_lives: u32,
    time_limit: Option<Duration>,
    speed_multiplier: f32,
    sizing: SizePolicy,
}

impl RoundRules {
    fn of(mode: &GameMode) -> Self {
        Self {
            target_score: mode.target_score(),
            craft_quota: mode.craft_quota(),
            starting_lives: mode.starting_lives(),
            time_limit: mode.time_limit(),
            speed_multiplier: mode.speed_multiplier(),
            sizing: mode.sizing(),
        }
    }
}

/// Represents the authoritative Sky Tap session state.
#[derive(Debug)]
pub struct Session {
    banner: &'static str,
    phase: Phase,
    mode: Option<ModeId>,
    rules: Option<RoundRules>,
    score: u32,
    lives: u32,
    spawned: u32,
    time_remaining: Option<Duration>,
    countdown_accumulator: Duration,
    crafts: Vec<Craft>,
    caught_log: Vec<CraftId>,
    focused: Option<CraftId>,
    next_craft: u32,
}

impl Session {
    /// Creates a new session resting in its idle configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            phase: Phase::Idle,
            mode: None,
            rules: None,
            score: 0,
            lives: 0,
            spawned: 0,
            time_remaining: None,
            countdown_accumulator: Duration::ZERO,
            crafts: Vec::new(),
            caught_log: Vec::new(),
            focused: None,
            next_craft: 0,
        }
    }

    fn craft_index(&self, craft: CraftId) -> Option<usize> {
        self.crafts.iter().position(|candidate| candidate.id == craft)
    }

    fn release_focus(&mut self, craft: CraftId, out_events: &mut Vec<Event>) {
        if self.focused == Some(craft) {
            self.focused = None;
            out_events.push(Event::FocusShifted { craft: None });
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ChooseMode { mode } => {
            if matches!(session.phase, Phase::Idle | Phase::ModeSelected) {
                session.mode = Some(mode);
                session.phase = Phase::ModeSelected;
                out_events.push(Event::ModeChosen { mode });
            }
        }
        Command::StartRound => start_round(session, out_events),
        Command::Tick { dt } => tick(session, dt, out_events),
        Command::SpawnCraft {
            heading,
            lane,
            class,
            traversal,
        } => spawn_craft(session, heading, lane, class, traversal, out_events),
        Command::TapCraft { craft } => tap_craft(session, craft, out_events),
        Command::TapMiss => tap_miss(session, out_events),
        Command::ResetRound => reset_round(session, out_events),
    }
}

fn start_round(session: &mut Session, out_events: &mut Vec<Event>) {
    if session.phase != Phase::ModeSelected {
        return;
    }
    let Some(mode_id) = session.mode else {
        return;
    };

    let rules = RoundRules::of(GameMode::get(mode_id));
    session.score = 0;
    session.lives = rules.starting_lives;
    session.spawned = 0;
    session.time_remaining = rules.time_limit;
    session.countdown_accumulator = Duration::ZERO;
    session.crafts.clear();
    session.caught_log.clear();
    session.focused = None;
    session.next_craft = 0;
    session.rules = Some(rules);
    session.phase = Phase::Active;
    out_events.push(Event::RoundStarted { mode: mode_id });
}

fn tick(session: &mut Session, dt: Duration, out_events: &mut Vec<Event>) {
    out_events.push(Event::TimeAdvanced { dt });

    if session.phase != Phase::Active {
        return;
    }

    advance_countdown(session, dt, out_events);
    if session.phase != Phase::Active {
        return;
    }

    advance_crafts(session, dt, out_events);
}

fn advance_countdown(session: &mut Session, dt: Duration, out_events: &mut Vec<Event>) {
    let Some(mut remaining) = session.time_remaining else {
        return;
    };

    session.countdown_accumulator = session.countdown_accumulator.saturating_add(dt);
    while session.countdown_accumulator >= COUNTDOWN_QUANTUM {
        session.countdown_accumulator = session
            .countdown_accumulator
            .saturating_sub(COUNTDOWN_QUANTUM);
        remaining = remaining.saturating_sub(COUNTDOWN_QUANTUM);
        session.time_remaining = Some(remaining);
        out_events.push(Event::TimeChanged { remaining });

        if remaining.is_zero() {
            // Surviving to the countdown is the win condition for
            // time-boxed modes, whatever the score.
            end_round(session, Outcome::Won, out_events);
            return;
        }
    }
}

fn advance_crafts(session: &mut Session, dt: Duration, out_events: &mut Vec<Event>) {
    let mut escaped: Vec<CraftId> = Vec::new();
    let mut faded: Vec<CraftId> = Vec::new();

    for craft in session.crafts.iter_mut() {
        match craft.state {
            CraftState::Flying => {
                craft.age = craft.age.saturating_add(dt);
                if craft.age >= craft.traversal {
                    escaped.push(craft.id);
                }
            }
            CraftState::Caught { fade_left } => {
                let fade_left = fade_left.saturating_sub(dt);
                if fade_left.is_zero() {
                    faded.push(craft.id);
                } else {
                    craft.state = CraftState::Caught { fade_left };
                }
            }
        }
    }

    for craft in escaped {
        remove_craft(session, craft);
        // Escaping never costs a life; only a tap on empty sky does.
        out_events.push(Event::CraftRemoved {
            craft,
            reason: RemovalReason::Escaped,
        });
        session.release_focus(craft, out_events);
    }

    for craft in faded {
        remove_craft(session, craft);
        out_events.push(Event::CraftRemoved {
            craft,
            reason: RemovalReason::Caught,
        });
    }

    check_exhaustion(session, out_events);
}

fn remove_craft(session: &mut Session, craft: CraftId) {
    if let Some(index) = session.craft_index(craft) {
        let _ = session.crafts.remove(index);
    }
}

fn check_exhaustion(session: &mut Session, out_events: &mut Vec<Event>) {
    if session.phase != Phase::Active {
        return;
    }
    let Some(rules) = session.rules else {
        return;
    };
    let Some(quota) = rules.craft_quota else {
        return;
    };
    let Some(target) = rules.target_score else {
        return;
    };

    if session.spawned >= quota && session.crafts.is_empty() && session.score < target {
        end_round(session, Outcome::Lost, out_events);
    }
}

fn spawn_craft(
    session: &mut Session,
    heading: Heading,
    lane: Lane,
    class: CraftClass,
    traversal: Duration,
    out_events: &mut Vec<Event>,
) {
    if session.phase != Phase::Active {
        return;
    }
    let Some(rules) = session.rules else {
        return;
    };
    if matches!(rules.craft_quota, Some(quota) if session.spawned >= quota) {
        return;
    }

    let craft = CraftId::new(session.next_craft);
    session.next_craft = session.next_craft.saturating_add(1);
    session.spawned = session.spawned.saturating_add(1);
    session.crafts.push(Craft {
        id: craft,
        heading,
        lane,
        class,
        hits_taken: 0,
        traversal,
        age: Duration::ZERO,
        state: CraftState::Flying,
    });
    out_events.push(Event::CraftSpawned {
        craft,
        heading,
        lane,
        class,
    });
}

fn tap_craft(session: &mut Session, craft: CraftId, out_events: &mut Vec<Event>) {
    if session.phase != Phase::Active {
        return;
    }
    let Some(rules) = session.rules else {
        return;
    };
    let Some(index) = session.craft_index(craft) else {
        return;
    };

    match hits::resolve_tap(&mut session.crafts[index]) {
        HitResolution::AlreadyResolved => {}
        HitResolution::Damaged {
            hits_taken,
            hits_required,
        } => {
            out_events.push(Event::CraftDamaged {
                craft,
                hits_taken,
                hits_required,
            });
            // The first tap on an undamaged craft claims the shared
            // health meter if nothing else holds it.
            if rules.sizing == SizePolicy::Tiered
                && hits_taken == 1
                && session.focused.is_none()
            {
                session.focused = Some(craft);
                out_events.push(Event::FocusShifted { craft: Some(craft) });
            }
        }
        HitResolution::Downed { hits_required } => {
            out_events.push(Event::CraftDamaged {
                craft,
                hits_taken: hits_required,
                hits_required,
            });
            session.score = session.score.saturating_add(1);
            session.caught_log.push(craft);
            out_events.push(Event::ScoreChanged {
                score: session.score,
                target: rules.target_score,
            });
            session.release_focus(craft, out_events);

            // Time-boxed modes leave the win decision to the countdown.
            if matches!(rules.target_score, Some(target) if session.score >= target) {
                end_round(session, Outcome::Won, out_events);
            }
        }
    }
}

fn tap_miss(session: &mut Session, out_events: &mut Vec<Event>) {
    if session.phase != Phase::Active {
        return;
    }

    session.lives = session.lives.saturating_sub(1);
    out_events.push(Event::LivesChanged {
        remaining: session.lives,
    });

    if session.lives == 0 {
        end_round(session, Outcome::Lost, out_events);
    }
}

fn end_round(session: &mut Session, outcome: Outcome, out_events: &mut Vec<Event>) {
    session.phase = Phase::Ended(outcome);
    // Drop the countdown eagerly so a stray tick can never fire after
    // the round ends.
    session.time_remaining = None;
    session.countdown_accumulator = Duration::ZERO;
    out_events.push(Event::RoundEnded {
        outcome,
        final_score: session.score,
    });
}

fn reset_round(session: &mut Session, out_events: &mut Vec<Event>) {
    session.phase = Phase::Idle;
    session.mode = None;
    session.rules = None;
    session.score = 0;
    session.lives = 0;
    session.spawned = 0;
    session.time_remaining = None;
    session.countdown_accumulator = Duration::ZERO;
    session.crafts.clear();
    session.caught_log.clear();
    session.focused = None;
    session.next_craft = 0;
    out_events.push(Event::RoundReset);
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use super::{CraftState, Phase, Session};
    use skytap_core::{CraftClass, CraftId, Heading, Lane, ModeId, SizePolicy, SpawnOutlook};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(session: &Session) -> &'static str {
        session.banner
    }

    /// Current lifecycle phase of the session.
    #[must_use]
    pub fn phase(session: &Session) -> Phase {
        session.phase
    }

    /// Mode recorded for the current or next round, if any.
    #[must_use]
    pub fn mode(session: &Session) -> Option<ModeId> {
        session.mode
    }

    /// Craft caught so far this round.
    #[must_use]
    pub fn score(session: &Session) -> u32 {
        session.score
    }

    /// Score required to win the current round, if the mode is target-gated.
    #[must_use]
    pub fn target_score(session: &Session) -> Option<u32> {
        session.rules.and_then(|rules| rules.target_score)
    }

    /// Lives the player still has.
    #[must_use]
    pub fn lives(session: &Session) -> u32 {
        session.lives
    }

    /// Time left before the round expires, for time-boxed modes.
    #[must_use]
    pub fn time_remaining(session: &Session) -> Option<Duration> {
        session.time_remaining
    }

    /// Number of craft caught and logged for the collected row.
    #[must_use]
    pub fn caught_count(session: &Session) -> usize {
        session.caught_log.len()
    }

    /// Craft currently driving the shared health meter, if any.
    #[must_use]
    pub fn focused_craft(session: &Session) -> Option<CraftId> {
        session.focused
    }

    /// Captures a read-only view of the craft crossing the play area.
    #[must_use]
    pub fn craft_view(session: &Session) -> CraftView {
        let mut snapshots: Vec<CraftSnapshot> = session
            .crafts
            .iter()
            .map(|craft| CraftSnapshot {
                id: craft.id,
                heading: craft.heading,
                lane: craft.lane,
                class: craft.class,
                hits_taken: craft.hits_taken,
                hits_required: craft.class.hits_to_down(),
                lifecycle: match craft.state {
                    CraftState::Flying => CraftLifecycle::Flying,
                    CraftState::Caught { .. } => CraftLifecycle::Caught,
                },
                age: craft.age,
                traversal: craft.traversal,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        CraftView { snapshots }
    }

    /// Exposes the view the spawning system consumes to pace craft creation.
    #[must_use]
    pub fn spawn_outlook(session: &Session) -> SpawnOutlook {
        match (session.phase, session.rules) {
            (Phase::Active, Some(rules)) => SpawnOutlook {
                round_active: true,
                spawned: session.spawned,
                quota: rules.craft_quota,
                speed_multiplier: rules.speed_multiplier,
                sizing: rules.sizing,
            },
            _ => SpawnOutlook {
                round_active: false,
                spawned: session.spawned,
                quota: None,
                speed_multiplier: 1.0,
                sizing: SizePolicy::Uniform,
            },
        }
    }

    /// Read-only snapshot describing all craft within the play area.
    #[derive(Clone, Debug)]
    pub struct CraftView {
        snapshots: Vec<CraftSnapshot>,
    }

    impl CraftView {
        /// Iterator over the captured craft snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &CraftSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<CraftSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single craft's state used for queries.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CraftSnapshot {
        /// Unique identifier assigned to the craft.
        pub id: CraftId,
        /// Traversal direction of the craft.
        pub heading: Heading,
        /// Vertical lane the craft flies in.
        pub lane: Lane,
        /// Size tier assigned to the craft.
        pub class: CraftClass,
        /// Taps the craft absorbed so far.
        pub hits_taken: u32,
        /// Taps required to bring the craft down.
        pub hits_required: u32,
        /// Whether the craft is flying or fading out after a catch.
        pub lifecycle: CraftLifecycle,
        /// Time the craft has spent crossing the play area.
        pub age: Duration,
        /// Time the craft takes to cross the play area.
        pub traversal: Duration,
    }

    impl CraftSnapshot {
        /// Remaining health as a fraction of the class requirement.
        #[must_use]
        pub fn health_fraction(&self) -> f32 {
            if self.hits_required == 0 {
                return 0.0;
            }
            self.hits_required.saturating_sub(self.hits_taken) as f32 / self.hits_required as f32
        }

        /// Fraction of the traversal the craft has completed.
        #[must_use]
        pub fn progress(&self) -> f32 {
            if self.traversal.is_zero() {
                return 1.0;
            }
            (self.age.as_secs_f32() / self.traversal.as_secs_f32()).clamp(0.0, 1.0)
        }
    }

    /// Observable lifecycle state of a craft still in the collection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum CraftLifecycle {
        /// The craft is crossing the play area and can be tapped.
        Flying,
        /// The craft was caught and is fading out.
        Caught,
    }
}

#[derive(Clone, Debug)]
struct Craft {
    id: CraftId,
    heading: Heading,
    lane: Lane,
    class: CraftClass,
    hits_taken: u32,
    traversal: Duration,
    age: Duration,
    state: CraftState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CraftState {
    Flying,
    Caught { fade_left: Duration },
}
