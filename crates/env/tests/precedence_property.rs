//! Property tests for source precedence

use std::sync::Arc;

use nebula_env::{MapPropertySource, PropertyResolver, PropertySource};
use proptest::prelude::*;

/// Sources as (order, value) pairs, each one holding `shared.key`
fn arb_sources() -> impl Strategy<Value = Vec<(i32, i64)>> {
    proptest::collection::vec((-5i32..5, any::<i64>()), 1..8)
}

fn resolver_for(sources: &[(i32, i64)]) -> PropertyResolver {
    let mut resolver = PropertyResolver::new();
    for (index, (order, value)) in sources.iter().enumerate() {
        let source = MapPropertySource::new(format!("s{index}"), *order).with_entry("shared.key", *value);
        resolver.add_source(Arc::new(source) as Arc<dyn PropertySource>);
    }
    resolver
}

proptest! {
    /// The winner is the highest order; among equal orders, the last registered.
    #[test]
    fn highest_order_then_latest_wins(sources in arb_sources()) {
        let resolver = resolver_for(&sources);

        let max_order = sources.iter().map(|(order, _)| *order).max().unwrap();
        let expected = sources
            .iter()
            .rev()
            .find(|(order, _)| *order == max_order)
            .map(|(_, value)| *value);

        prop_assert_eq!(resolver.resolve::<i64>("shared.key").unwrap(), expected);
    }

    /// Repeated resolution is stable.
    #[test]
    fn resolution_is_stable(sources in arb_sources()) {
        let resolver = resolver_for(&sources);
        let first = resolver.resolve::<i64>("SHARED_KEY").unwrap();
        for _ in 0..3 {
            prop_assert_eq!(resolver.resolve::<i64>("shared-key").unwrap(), first);
        }
    }

    /// Sources are always listed by descending order.
    #[test]
    fn sources_are_sorted_by_order(sources in arb_sources()) {
        let resolver = resolver_for(&sources);
        let orders: Vec<_> = resolver.sources().iter().map(|s| s.order()).collect();
        prop_assert!(orders.windows(2).all(|w| w[0] >= w[1]), "{:?}", orders);
    }
}
