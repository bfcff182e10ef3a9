//! Tap accounting for craft under fire.
//!
//! Input delivery may race with craft removal, so every resolution is
//! idempotent: taps landing on a craft that already settled report
//! [`HitResolution::AlreadyResolved`] and change nothing.

use std::time::Duration;

use crate::{Craft, CraftState};

/// Time a caught craft stays in the collection while its fade-out plays.
pub(crate) const CATCH_FADE: Duration = Duration::from_millis(500);

/// Outcome of routing a single tap to a craft.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitResolution {
    /// The craft had already settled; the tap is a benign no-op.
    AlreadyResolved,
    /// The craft absorbed the tap but is still flying.
    Damaged {
        hits_taken: u32,
        hits_required: u32,
    },
    /// The tap met the class requirement and the craft is down.
    Downed { hits_required: u32 },
}

/// Applies one tap to the craft, transitioning it to caught exactly once.
pub(crate) fn resolve_tap(craft: &mut Craft) -> HitResolution {
    if craft.state != CraftState::Flying {
        return HitResolution::AlreadyResolved;
    }

    let hits_required = craft.class.hits_to_down();
    craft.hits_taken = craft.hits_taken.saturating_add(1).min(hits_required);

    if craft.hits_taken < hits_required {
        HitResolution::Damaged {
            hits_taken: craft.hits_taken,
            hits_required,
        }
    } else {
        craft.state = CraftState::Caught {
            fade_left: CATCH_FADE,
        };
        HitResolution::Downed { hits_required }
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_tap, HitResolution, CATCH_FADE};
    use crate::{Craft, CraftState};
    use skytap_core::{CraftClass, CraftId, Heading, Lane};
    use std::time::Duration;

    fn craft(class: CraftClass) -> Craft {
        Craft {
            id: CraftId::new(7),
            heading: Heading::Westward,
            lane: Lane::from_permille(400),
            class,
            hits_taken: 0,
            traversal: Duration::from_secs(4),
            age: Duration::ZERO,
            state: CraftState::Flying,
        }
    }

    #[test]
    fn single_hit_craft_goes_down_immediately() {
        let mut craft = craft(CraftClass::Scout);
        let resolution = resolve_tap(&mut craft);
        assert_eq!(resolution, HitResolution::Downed { hits_required: 1 });
        assert_eq!(
            craft.state,
            CraftState::Caught {
                fade_left: CATCH_FADE
            }
        );
    }

    #[test]
    fn tiered_craft_reports_partial_damage_until_the_requirement() {
        let mut craft = craft(CraftClass::Freighter);

        assert_eq!(
            resolve_tap(&mut craft),
            HitResolution::Damaged {
                hits_taken: 1,
                hits_required: 3
            }
        );
        assert_eq!(
            resolve_tap(&mut craft),
            HitResolution::Damaged {
                hits_taken: 2,
                hits_required: 3
            }
        );
        assert_eq!(
            resolve_tap(&mut craft),
            HitResolution::Downed { hits_required: 3 }
        );
    }

    #[test]
    fn taps_after_the_catch_are_ignored() {
        let mut craft = craft(CraftClass::Scout);
        assert_eq!(
            resolve_tap(&mut craft),
            HitResolution::Downed { hits_required: 1 }
        );

        for _ in 0..3 {
            assert_eq!(resolve_tap(&mut craft), HitResolution::AlreadyResolved);
        }
        assert_eq!(craft.hits_taken, 1);
    }
}
