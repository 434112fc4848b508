use std::time::Duration;

use engine::{Debounce, Registry, SubscriptionSet};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Tick,
    Tap,
    Level,
}

fn topic(i: u8) -> Topic {
    match i % 3 {
        0 => Topic::Tick,
        1 => Topic::Tap,
        _ => Topic::Level,
    }
}

proptest! {
    #[test]
    fn disposing_a_set_leaves_only_outside_subscriptions(
        inside in prop::collection::vec(any::<u8>(), 0..20),
        outside in prop::collection::vec(any::<u8>(), 0..20),
    ) {
        let mut registry = Registry::new();
        let mut set = SubscriptionSet::new("round");
        let mut kept = Vec::new();

        // Interleave registrations so set members are not contiguous.
        let longest = inside.len().max(outside.len());
        for i in 0..longest {
            if let Some(t) = inside.get(i) {
                set.subscribe(&mut registry, topic(*t));
            }
            if let Some(t) = outside.get(i) {
                kept.push(registry.subscribe(topic(*t)).id);
            }
        }
        let members: Vec<_> = set.ids().collect();

        prop_assert_eq!(set.dispose(&mut registry), inside.len());
        prop_assert_eq!(registry.live_count(), outside.len());
        for id in members {
            prop_assert!(!registry.is_live(id));
        }
        for id in kept {
            prop_assert!(registry.is_live(id));
        }
    }

    #[test]
    fn debounce_emits_latest_value_once_per_burst(
        gaps in prop::collection::vec(0u64..999, 1..30),
    ) {
        let quiet = Duration::from_millis(1000);
        let mut debounce = Debounce::new(quiet);
        let mut now = Duration::ZERO;
        for (value, gap) in gaps.iter().enumerate() {
            now += Duration::from_millis(*gap);
            prop_assert_eq!(debounce.poll(now), None);
            debounce.push(value, now);
        }
        prop_assert_eq!(debounce.poll(now + quiet - Duration::from_millis(1)), None);
        prop_assert_eq!(debounce.poll(now + quiet), Some(gaps.len() - 1));
        prop_assert_eq!(debounce.poll(now + quiet * 5), None);
    }
}

#[test]
fn a_fresh_set_can_be_built_after_dispose() {
    let mut registry = Registry::new();
    let mut set = SubscriptionSet::new("round");
    for t in [Topic::Level, Topic::Tick, Topic::Tap] {
        set.subscribe(&mut registry, t);
    }
    set.dispose(&mut registry);
    for t in [Topic::Level, Topic::Tick, Topic::Tap] {
        set.subscribe(&mut registry, t);
    }
    assert_eq!(set.len(), 3);
    assert_eq!(registry.live_count(), 3);
    assert!(registry.has_handler(Topic::Tap));
    assert_eq!(set.label(), "round");
}
