//! Property-based invariant tests for the accordion allocator.
//!
//! 1. Bounds: every size lies within its region's [min, max]
//! 2. Sum: sizes add up to the extent whenever the extent is satisfiable
//! 3. Offsets: allocations tile the axis in display order without gaps
//! 4. Determinism: laying out the same state twice gives the same result
//! 5. Mid-animation: bounds hold on every frame of a state transition
//! 6. Zero weight: groups with nothing to proportion by still fill the extent

use perfui_core::Animatable;
use perfui_layout::{AccordionLayout, Allocation, Direction, RegionSpec, SizingState};
use proptest::prelude::*;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy)]
struct RegionCase {
    min: u32,
    max: u32,
    preferred: u32,
    state: SizingState,
}

// ── Strategies ──────────────────────────────────────────────────────────

fn state_strategy() -> impl Strategy<Value = SizingState> {
    prop_oneof![
        Just(SizingState::Minimize),
        Just(SizingState::Maximize),
        Just(SizingState::Preferred),
    ]
}

fn region_strategy() -> impl Strategy<Value = RegionCase> {
    (0u32..100, 1u32..400, 0u32..300, state_strategy()).prop_map(
        |(min, span, preferred, state)| RegionCase {
            min,
            max: min + span,
            preferred,
            state,
        },
    )
}

fn regions_strategy() -> impl Strategy<Value = Vec<RegionCase>> {
    prop::collection::vec(region_strategy(), 1..8)
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn build(cases: &[RegionCase]) -> AccordionLayout {
    let mut layout = AccordionLayout::new(Direction::Vertical);
    for case in cases {
        let id = layout.add_region(RegionSpec::new(case.min, case.max, case.preferred));
        layout.set_state(id, case.state).unwrap();
    }
    layout
}

fn settle(layout: &mut AccordionLayout) {
    let mut frames = 0;
    while layout.is_animating() {
        assert!(frames < 10_000, "layout never settled");
        layout.animate(FRAME);
        frames += 1;
    }
}

/// Smallest and largest extents a settled layout can fill exactly.
fn satisfiable_extents(cases: &[RegionCase]) -> (u32, u32) {
    let lower = cases.iter().map(|c| c.min).sum();
    let upper = cases
        .iter()
        .map(|c| match c.state {
            SizingState::Minimize => c.min,
            _ => c.max,
        })
        .sum();
    (lower, upper)
}

fn assert_within_bounds(cases: &[RegionCase], allocations: &[Allocation]) {
    assert_eq!(cases.len(), allocations.len());
    for (case, alloc) in cases.iter().zip(allocations) {
        assert!(
            alloc.size >= case.min && alloc.size <= case.max,
            "size {} outside [{}, {}]",
            alloc.size,
            case.min,
            case.max
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Bounds hold for any extent
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sizes_stay_within_bounds(
        cases in regions_strategy(),
        extent in 0u32..5_000,
    ) {
        let mut layout = build(&cases);
        settle(&mut layout);
        assert_within_bounds(&cases, &layout.layout(extent));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Sizes fill a satisfiable extent exactly
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sizes_sum_to_satisfiable_extent(
        cases in regions_strategy(),
        t in 0.0f64..=1.0,
    ) {
        let (lower, upper) = satisfiable_extents(&cases);
        let extent = lower + ((f64::from(upper - lower)) * t).round() as u32;

        let mut layout = build(&cases);
        settle(&mut layout);
        let allocations = layout.layout(extent);

        let total: u32 = allocations.iter().map(|a| a.size).sum();
        prop_assert_eq!(total, extent, "allocations {:?}", allocations);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Offsets tile the axis
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offsets_are_contiguous(
        cases in regions_strategy(),
        extent in 0u32..5_000,
    ) {
        let mut layout = build(&cases);
        let allocations = layout.layout(extent);
        let ids: Vec<_> = layout.region_ids().collect();

        let mut offset = 0;
        for (alloc, id) in allocations.iter().zip(&ids) {
            prop_assert_eq!(alloc.id, *id);
            prop_assert_eq!(alloc.offset, offset);
            offset += alloc.size;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Determinism
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_layout_is_stable(
        cases in regions_strategy(),
        extent in 0u32..5_000,
    ) {
        let mut layout = build(&cases);
        settle(&mut layout);
        let first = layout.layout(extent);
        let second = layout.layout(extent);
        prop_assert_eq!(first, second);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Bounds hold mid-animation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn transitions_respect_bounds_every_frame(
        cases in regions_strategy(),
        next in prop::collection::vec(state_strategy(), 8),
        extent in 0u32..3_000,
        frames in 1usize..60,
    ) {
        let mut layout = build(&cases);
        settle(&mut layout);

        let ids: Vec<_> = layout.region_ids().collect();
        for (id, state) in ids.iter().zip(&next) {
            layout.set_state(*id, *state).unwrap();
        }
        let cases: Vec<_> = cases
            .iter()
            .zip(&next)
            .map(|(case, state)| RegionCase { state: *state, ..*case })
            .collect();

        for _ in 0..frames {
            layout.animate(FRAME);
            assert_within_bounds(&cases, &layout.layout(extent));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Groups with no weight still fill the extent
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zero_weight_groups_fill_satisfiable_extent(
        cases in regions_strategy(),
        t in 0.0f64..=1.0,
    ) {
        let cases: Vec<_> = cases
            .into_iter()
            .map(|case| RegionCase { preferred: 0, ..case })
            .collect();
        let (lower, upper) = satisfiable_extents(&cases);
        let extent = lower + ((f64::from(upper - lower)) * t).round() as u32;

        let mut layout = build(&cases);
        settle(&mut layout);
        let allocations = layout.layout(extent);

        assert_within_bounds(&cases, &allocations);
        let total: u32 = allocations.iter().map(|a| a.size).sum();
        prop_assert_eq!(total, extent, "allocations {:?}", allocations);
    }
}
