use std::time::Duration;

use skytap_core::{
    Command, CraftClass, CraftId, Event, Heading, Lane, ModeId, Outcome, RemovalReason,
};
use skytap_session::{apply, query, Phase, Session};

fn drive(session: &mut Session, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(session, command, &mut events);
    events
}

fn started(mode: ModeId) -> Session {
    let mut session = Session::new();
    let _ = drive(&mut session, Command::ChooseMode { mode });
    let events = drive(&mut session, Command::StartRound);
    assert_eq!(events, vec![Event::RoundStarted { mode }]);
    session
}

fn spawn_craft(session: &mut Session, class: CraftClass, traversal: Duration) -> CraftId {
    let events = drive(
        session,
        Command::SpawnCraft {
            heading: Heading::Eastward,
            lane: Lane::from_permille(500),
            class,
            traversal,
        },
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::CraftSpawned { craft, .. } => Some(*craft),
            _ => None,
        })
        .expect("spawn accepted while the round is active")
}

#[test]
fn standard_round_is_won_the_moment_the_target_is_reached() {
    let mut session = started(ModeId::Standard);

    for catch in 1..=6 {
        let craft = spawn_craft(&mut session, CraftClass::Scout, Duration::from_secs(4));
        let events = drive(&mut session, Command::TapCraft { craft });

        assert!(events.contains(&Event::ScoreChanged {
            score: catch,
            target: Some(6)
        }));
        if catch < 6 {
            assert_eq!(query::phase(&session), Phase::Active);
        } else {
            assert!(events.contains(&Event::RoundEnded {
                outcome: Outcome::Won,
                final_score: 6
            }));
        }
    }

    assert_eq!(query::phase(&session), Phase::Ended(Outcome::Won));
    assert_eq!(query::score(&session), 6);
}

#[test]
fn three_misses_lose_the_round_regardless_of_score() {
    let mut session = started(ModeId::Standard);

    let craft = spawn_craft(&mut session, CraftClass::Scout, Duration::from_secs(4));
    let _ = drive(&mut session, Command::TapCraft { craft });
    assert_eq!(query::score(&session), 1);

    let _ = drive(&mut session, Command::TapMiss);
    let _ = drive(&mut session, Command::TapMiss);
    let events = drive(&mut session, Command::TapMiss);

    assert!(events.contains(&Event::RoundEnded {
        outcome: Outcome::Lost,
        final_score: 1
    }));
    assert_eq!(query::phase(&session), Phase::Ended(Outcome::Lost));
}

#[test]
fn surviving_the_speed_countdown_wins_even_with_no_catches() {
    let mut session = started(ModeId::Speed);
    assert_eq!(
        query::time_remaining(&session),
        Some(Duration::from_secs(30))
    );

    for second in 1..=30 {
        let events = drive(
            &mut session,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
        );
        assert!(events.contains(&Event::TimeChanged {
            remaining: Duration::from_secs(30 - second)
        }));
    }

    assert_eq!(query::phase(&session), Phase::Ended(Outcome::Won));
    assert_eq!(query::score(&session), 0);
}

#[test]
fn tiered_craft_drains_health_and_scores_a_single_point() {
    let mut session = started(ModeId::Challenge);
    let craft = spawn_craft(&mut session, CraftClass::Freighter, Duration::from_secs(5));

    let events = drive(&mut session, Command::TapCraft { craft });
    assert!(events.contains(&Event::CraftDamaged {
        craft,
        hits_taken: 1,
        hits_required: 3
    }));
    assert!(events.contains(&Event::FocusShifted { craft: Some(craft) }));
    let snapshot = query::craft_view(&session)
        .into_vec()
        .into_iter()
        .find(|snapshot| snapshot.id == craft)
        .expect("craft still in play");
    assert!((snapshot.health_fraction() - 2.0 / 3.0).abs() < 1e-6);

    let _ = drive(&mut session, Command::TapCraft { craft });
    let snapshot = query::craft_view(&session)
        .into_vec()
        .into_iter()
        .find(|snapshot| snapshot.id == craft)
        .expect("craft still in play");
    assert!((snapshot.health_fraction() - 1.0 / 3.0).abs() < 1e-6);

    let events = drive(&mut session, Command::TapCraft { craft });
    assert!(events.contains(&Event::ScoreChanged {
        score: 1,
        target: Some(6)
    }));
    assert!(events.contains(&Event::FocusShifted { craft: None }));
    assert_eq!(query::score(&session), 1);
}

#[test]
fn exhausting_the_quota_with_escapes_loses_the_round() {
    let mut session = started(ModeId::Standard);

    for _ in 0..10 {
        let _ = spawn_craft(&mut session, CraftClass::Scout, Duration::from_secs(3));
    }

    let events = drive(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(3),
        },
    );

    let escapes = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::CraftRemoved {
                    reason: RemovalReason::Escaped,
                    ..
                }
            )
        })
        .count();
    assert_eq!(escapes, 10);
    assert!(events.contains(&Event::RoundEnded {
        outcome: Outcome::Lost,
        final_score: 0
    }));
    // Escapes cost craft, never lives.
    assert_eq!(query::lives(&session), 3);
}

#[test]
fn catching_the_final_craft_short_of_the_target_still_loses() {
    let mut session = started(ModeId::Standard);

    let mut crafts = Vec::new();
    for _ in 0..10 {
        crafts.push(spawn_craft(
            &mut session,
            CraftClass::Scout,
            Duration::from_secs(3),
        ));
    }

    let caught = crafts[0];
    let _ = drive(&mut session, Command::TapCraft { craft: caught });
    assert_eq!(query::score(&session), 1);

    // Nine escape at the three-second mark and the caught craft finishes
    // its fade-out well before that, emptying the collection.
    let events = drive(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(3),
        },
    );

    assert!(events.contains(&Event::CraftRemoved {
        craft: caught,
        reason: RemovalReason::Caught
    }));
    assert!(events.contains(&Event::RoundEnded {
        outcome: Outcome::Lost,
        final_score: 1
    }));
}

#[test]
fn taps_on_a_caught_craft_never_score_twice() {
    let mut session = started(ModeId::Standard);
    let craft = spawn_craft(&mut session, CraftClass::Scout, Duration::from_secs(4));

    let _ = drive(&mut session, Command::TapCraft { craft });
    assert_eq!(query::score(&session), 1);

    // The craft stays in the collection while its fade-out plays; taps
    // racing with removal must change nothing.
    let events = drive(&mut session, Command::TapCraft { craft });
    assert!(events.is_empty());
    assert_eq!(query::score(&session), 1);

    let _ = drive(
        &mut session,
        Command::Tick {
            dt: Duration::from_millis(500),
        },
    );
    let events = drive(&mut session, Command::TapCraft { craft });
    assert!(events.is_empty());
    assert_eq!(query::score(&session), 1);
}

#[test]
fn focus_is_released_when_the_focused_craft_escapes() {
    let mut session = started(ModeId::Challenge);
    let craft = spawn_craft(&mut session, CraftClass::Courier, Duration::from_secs(1));

    let _ = drive(&mut session, Command::TapCraft { craft });
    assert_eq!(query::focused_craft(&session), Some(craft));

    let events = drive(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
    );
    assert!(events.contains(&Event::CraftRemoved {
        craft,
        reason: RemovalReason::Escaped
    }));
    assert!(events.contains(&Event::FocusShifted { craft: None }));
    assert_eq!(query::focused_craft(&session), None);
}

#[test]
fn focus_stays_with_the_first_damaged_craft() {
    let mut session = started(ModeId::Challenge);
    let first = spawn_craft(&mut session, CraftClass::Courier, Duration::from_secs(5));
    let second = spawn_craft(&mut session, CraftClass::Titan, Duration::from_secs(5));

    let _ = drive(&mut session, Command::TapCraft { craft: first });
    assert_eq!(query::focused_craft(&session), Some(first));

    let events = drive(&mut session, Command::TapCraft { craft: second });
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::FocusShifted { .. })));
    assert_eq!(query::focused_craft(&session), Some(first));
}

#[test]
fn a_finished_round_suppresses_every_later_mutation() {
    let mut session = started(ModeId::Standard);
    let craft = spawn_craft(&mut session, CraftClass::Scout, Duration::from_secs(4));

    let _ = drive(&mut session, Command::TapMiss);
    let _ = drive(&mut session, Command::TapMiss);
    let _ = drive(&mut session, Command::TapMiss);
    assert_eq!(query::phase(&session), Phase::Ended(Outcome::Lost));

    let events = drive(&mut session, Command::TapCraft { craft });
    assert!(events.is_empty());

    let events = drive(&mut session, Command::TapMiss);
    assert!(events.is_empty());

    let events = drive(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(5),
        },
    );
    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            dt: Duration::from_secs(5)
        }]
    );
    assert_eq!(query::score(&session), 0);
}

#[test]
fn the_countdown_never_ticks_after_the_round_ends() {
    let mut session = started(ModeId::Speed);

    for _ in 0..30 {
        let _ = drive(
            &mut session,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
        );
    }
    assert_eq!(query::phase(&session), Phase::Ended(Outcome::Won));

    let events = drive(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
    );
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::TimeChanged { .. })));
    assert_eq!(query::time_remaining(&session), None);
}

#[test]
fn reset_then_restart_produces_a_pristine_round() {
    let mut session = started(ModeId::Speed);
    let _ = spawn_craft(&mut session, CraftClass::Scout, Duration::from_secs(2));
    let _ = drive(&mut session, Command::TapMiss);

    let _ = drive(&mut session, Command::ResetRound);
    assert_eq!(query::phase(&session), Phase::Idle);

    let _ = drive(
        &mut session,
        Command::ChooseMode {
            mode: ModeId::Challenge,
        },
    );
    let _ = drive(&mut session, Command::StartRound);

    assert_eq!(query::phase(&session), Phase::Active);
    assert_eq!(query::mode(&session), Some(ModeId::Challenge));
    assert_eq!(query::score(&session), 0);
    assert_eq!(query::lives(&session), 3);
    assert_eq!(query::time_remaining(&session), None);
    assert!(query::craft_view(&session).into_vec().is_empty());
    assert_eq!(query::caught_count(&session), 0);

    // Identifiers restart as well, so a fresh round owns its id space.
    let craft = spawn_craft(&mut session, CraftClass::Scout, Duration::from_secs(4));
    assert_eq!(craft, CraftId::new(0));
}
