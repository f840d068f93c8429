//! `proptest` strategies for sheet configurations.

use bsheet_core::TargetHeight;
use proptest::prelude::*;

/// Default container used by the strategies.
pub const CONTAINER_WIDTH: f64 = 400.0;
pub const CONTAINER_HEIGHT: f64 = 800.0;

/// One to five whole-unit heights inside the default container.
pub fn fixed_heights() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1u32..=800).prop_map(f64::from), 1..=5)
}

/// Two distinct whole-unit heights, ascending.
pub fn height_pair() -> impl Strategy<Value = (f64, f64)> {
    (1u32..=700, 1u32..=100).prop_map(|(low, gap)| (f64::from(low), f64::from(low + gap)))
}

/// Target lists mixing fixed heights with the automatic sentinel.
pub fn targets() -> impl Strategy<Value = Vec<TargetHeight>> {
    prop::collection::vec(
        prop_oneof![
            4 => (1u32..=800).prop_map(|h| TargetHeight::Fixed(f64::from(h))),
            1 => Just(TargetHeight::AUTOMATIC),
        ],
        1..=5,
    )
}

/// A sequence of drag deltas, in layout units.
pub fn drag_deltas() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-300.0f64..300.0, 1..20)
}
