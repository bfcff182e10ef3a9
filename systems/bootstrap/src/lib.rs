#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Sky Tap experience.

use skytap_core::{GameMode, ModeId, Outcome};
use skytap_session::{query, Phase, Session};

/// Produces data required to greet the player and wrap up a round.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'session>(&self, session: &'session Session) -> &'session str {
        query::welcome_banner(session)
    }

    /// Exposes the selectable modes for the mode-select overlay.
    #[must_use]
    pub fn mode_catalog(&self) -> &'static [GameMode] {
        GameMode::all()
    }

    /// Summarizes a finished round for the reward and rating flow.
    ///
    /// Returns `None` while no round has reached a terminal outcome.
    #[must_use]
    pub fn round_summary(&self, session: &Session) -> Option<RoundSummary> {
        match query::phase(session) {
            Phase::Ended(outcome) => Some(RoundSummary {
                mode: query::mode(session)?,
                outcome,
                final_score: query::score(session),
                target_score: query::target_score(session),
                caught: query::caught_count(session) as u32,
            }),
            _ => None,
        }
    }
}

/// Wrap-up data handed to the reward flow once a round finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    /// Mode that drove the finished round.
    pub mode: ModeId,
    /// Whether the player won or lost.
    pub outcome: Outcome,
    /// Score held when the round ended.
    pub final_score: u32,
    /// Score that was required to win, for target-gated modes.
    pub target_score: Option<u32>,
    /// Craft logged in the collected row.
    pub caught: u32,
}

#[cfg(test)]
mod tests {
    use super::Bootstrap;
    use skytap_core::{Command, ModeId, Outcome};
    use skytap_session::{self as session, Session};

    #[test]
    fn no_summary_is_offered_before_a_round_ends() {
        let bootstrap = Bootstrap::default();
        let mut game = Session::new();
        assert!(bootstrap.round_summary(&game).is_none());

        let mut events = Vec::new();
        session::apply(
            &mut game,
            Command::ChooseMode {
                mode: ModeId::Standard,
            },
            &mut events,
        );
        session::apply(&mut game, Command::StartRound, &mut events);
        assert!(bootstrap.round_summary(&game).is_none());
    }

    #[test]
    fn summaries_capture_the_terminal_outcome() {
        let bootstrap = Bootstrap::default();
        let mut game = Session::new();
        let mut events = Vec::new();
        session::apply(
            &mut game,
            Command::ChooseMode {
                mode: ModeId::Standard,
            },
            &mut events,
        );
        session::apply(&mut game, Command::StartRound, &mut events);
        for _ in 0..3 {
            session::apply(&mut game, Command::TapMiss, &mut events);
        }

        let summary = bootstrap
            .round_summary(&game)
            .expect("finished rounds produce a summary");
        assert_eq!(summary.mode, ModeId::Standard);
        assert_eq!(summary.outcome, Outcome::Lost);
        assert_eq!(summary.final_score, 0);
        assert_eq!(summary.target_score, Some(6));
        assert_eq!(summary.caught, 0);
    }
}
