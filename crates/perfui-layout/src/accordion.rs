#![forbid(unsafe_code)]

//! Accordion layout: animated proportional space allocation.
//!
//! An [`AccordionLayout`] stacks regions along one axis. Each region is in
//! one of three [`SizingState`]s:
//!
//! - **Minimize**: collapses to its minimum extent.
//! - **Maximize**: grows toward its maximum extent, sharing space with other
//!   maximized regions in proportion to their current extents.
//! - **Preferred**: shares whatever is left in proportion to current extents.
//!
//! State changes do not jump. Every frame, [`Animatable::animate`] glides
//! each region's current extent toward its state's target (min, max, or
//! preferred), and [`AccordionLayout::layout`] distributes the container's
//! extent using those current extents as weights.
//!
//! # Distribution
//!
//! 1. Minimized regions take their current extent, rounded and clamped into
//!    their bounds.
//! 2. The Maximize group, then the Preferred group, split the remaining
//!    extent by weight. While resolving the Maximize group, the minimum
//!    extents of Preferred regions stay reserved.
//! 3. Any member whose share falls outside `[min, max]` is pinned to that
//!    bound and removed from the pool; the rest of the group is then
//!    re-proportioned. When shares violate in both directions, the direction
//!    with the larger total violation is pinned first. The loop runs over a
//!    shrinking unresolved set and ends when a pass pins nothing.
//! 4. A group with zero total weight starts every member at its minimum,
//!    unpinned, so the rounding step below can grow it.
//! 5. Sizes are rounded to whole pixels. The first region that was never
//!    pinned (resolution order: Maximize, Minimize, Preferred; insertion
//!    order within a group) absorbs the rounding remainder. Excess that
//!    would push it out of its bounds spills to the next unpinned region.
//!
//! # Invariants
//!
//! 1. Every size lies within the region's `[min, max]`.
//! 2. Sizes sum to the container extent whenever the extent is between the
//!    sum of lower and the sum of upper bounds.
//! 3. Which region absorbs the remainder depends only on states and
//!    insertion order, so it is stable across frames.
//!
//! # Failure Modes
//!
//! - `min > max`: contract violation. Debug builds assert; release builds
//!   treat `max` as `min`.
//! - Extent smaller than the sum of minimums: regions keep their minimums
//!   and the sum exceeds the extent. Sizes are never negative.

use std::fmt;
use std::time::Duration;

use perfui_core::{Animatable, LerpConfig};

use crate::error::LayoutError;
use crate::{Direction, Rect};

/// Stable identity of a region within one [`AccordionLayout`].
///
/// Ids are assigned in insertion order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u64);

impl RegionId {
    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a region takes part in space distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizingState {
    /// Collapse to the minimum extent.
    Minimize,
    /// Grow toward the maximum extent.
    Maximize,
    /// Share leftover space by preferred extent.
    #[default]
    Preferred,
}

impl SizingState {
    /// Position of this state's group in resolution order.
    const fn rank(self) -> u8 {
        match self {
            Self::Maximize => 0,
            Self::Minimize => 1,
            Self::Preferred => 2,
        }
    }
}

/// Size hints for a new region, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSpec {
    pub min_extent: u32,
    pub max_extent: u32,
    pub preferred_extent: u32,
}

impl RegionSpec {
    #[must_use]
    pub const fn new(min_extent: u32, max_extent: u32, preferred_extent: u32) -> Self {
        Self {
            min_extent,
            max_extent,
            preferred_extent,
        }
    }

    /// A region with a lower bound and no upper bound.
    #[must_use]
    pub const fn flexible(min_extent: u32, preferred_extent: u32) -> Self {
        Self::new(min_extent, u32::MAX, preferred_extent)
    }

    /// A region that is always exactly `extent` pixels.
    #[must_use]
    pub const fn fixed(extent: u32) -> Self {
        Self::new(extent, extent, extent)
    }
}

/// The resolved placement of one region along the layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub id: RegionId,
    /// Distance from the start of the container.
    pub offset: u32,
    pub size: u32,
}

/// Per-group totals re-derived after every animate pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupTotals {
    /// Sum of current extents of maximized regions.
    pub maximize_weight: f64,
    /// Sum of current extents of preferred regions.
    pub preferred_weight: f64,
    /// Space permanently reserved by minimized regions.
    pub minimized_extent: f64,
}

#[derive(Debug, Clone)]
struct Region {
    id: RegionId,
    state: SizingState,
    current_extent: f64,
    min_extent: u32,
    max_extent: u32,
    preferred_extent: u32,
    /// Size from the most recent layout pass.
    rendered: Option<u32>,
}

impl Region {
    fn bounds(&self) -> (f64, f64) {
        let lo = f64::from(self.min_extent);
        (lo, f64::from(self.max_extent).max(lo))
    }

    fn int_bounds(&self) -> (i64, i64) {
        let lo = i64::from(self.min_extent);
        (lo, i64::from(self.max_extent).max(lo))
    }

    fn target_extent(&self) -> f64 {
        let (lo, hi) = self.bounds();
        match self.state {
            SizingState::Minimize => lo,
            SizingState::Maximize => hi,
            SizingState::Preferred => f64::from(self.preferred_extent),
        }
    }

    fn weight(&self) -> f64 {
        self.current_extent.max(0.0)
    }

    fn minimized_size(&self) -> f64 {
        let (lo, hi) = self.bounds();
        self.current_extent.round().clamp(lo, hi)
    }
}

/// Stacks regions along one axis and animates their share of the extent.
#[derive(Debug, Clone)]
pub struct AccordionLayout {
    direction: Direction,
    regions: Vec<Region>,
    lerp: LerpConfig,
    totals: GroupTotals,
    allocations: Vec<Allocation>,
    next_id: u64,
}

impl AccordionLayout {
    /// Create an empty layout along `direction`.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            regions: Vec::new(),
            lerp: LerpConfig::LAYOUT,
            totals: GroupTotals::default(),
            allocations: Vec::new(),
            next_id: 0,
        }
    }

    /// Create a new vertical accordion.
    #[must_use]
    pub fn vertical() -> Self {
        Self::new(Direction::Vertical)
    }

    /// Create a new horizontal accordion.
    #[must_use]
    pub fn horizontal() -> Self {
        Self::new(Direction::Horizontal)
    }

    /// Set the convergence config (builder pattern).
    #[must_use]
    pub fn with_lerp(mut self, lerp: LerpConfig) -> Self {
        self.lerp = lerp;
        self
    }

    /// The axis regions are stacked along.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the layout has no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region ids in display order.
    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.iter().map(|r| r.id)
    }

    /// Totals consumed by the next [`layout`](Self::layout) pass.
    #[must_use]
    pub fn totals(&self) -> GroupTotals {
        self.totals
    }

    /// Whether any region is still gliding toward its target extent.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.regions
            .iter()
            .any(|r| r.current_extent != r.target_extent())
    }

    // --- Region management -------------------------------------------------

    /// Append a region in the Preferred state.
    pub fn add_region(&mut self, spec: RegionSpec) -> RegionId {
        debug_assert!(
            spec.min_extent <= spec.max_extent,
            "region min_extent {} exceeds max_extent {}",
            spec.min_extent,
            spec.max_extent
        );
        let id = RegionId(self.next_id);
        self.next_id += 1;
        self.regions.push(Region {
            id,
            state: SizingState::Preferred,
            current_extent: f64::from(spec.preferred_extent),
            min_extent: spec.min_extent,
            max_extent: spec.max_extent,
            preferred_extent: spec.preferred_extent,
            rendered: None,
        });
        self.refresh_totals();
        id
    }

    /// Detach a region.
    pub fn remove_region(&mut self, id: RegionId) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        self.regions.remove(index);
        self.allocations.retain(|a| a.id != id);
        self.refresh_totals();
        Ok(())
    }

    /// Replace a region's bounds, typically after its content changed.
    pub fn set_bounds(
        &mut self,
        id: RegionId,
        min_extent: u32,
        max_extent: u32,
    ) -> Result<(), LayoutError> {
        debug_assert!(
            min_extent <= max_extent,
            "region min_extent {min_extent} exceeds max_extent {max_extent}"
        );
        let index = self.index_of(id)?;
        let region = &mut self.regions[index];
        region.min_extent = min_extent;
        region.max_extent = max_extent;
        self.refresh_totals();
        Ok(())
    }

    /// Replace a region's preferred extent.
    pub fn set_preferred(&mut self, id: RegionId, extent: u32) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        self.regions[index].preferred_extent = extent;
        Ok(())
    }

    #[must_use = "returns the state without changing it"]
    pub fn state(&self, id: RegionId) -> Result<SizingState, LayoutError> {
        Ok(self.regions[self.index_of(id)?].state)
    }

    /// The extent a region is currently weighted by.
    pub fn current_extent(&self, id: RegionId) -> Result<f64, LayoutError> {
        Ok(self.regions[self.index_of(id)?].current_extent)
    }

    /// Move a region into a new sizing group.
    ///
    /// A region leaving Minimize restarts from the size it was last laid out
    /// at, so it grows out of what is on screen.
    pub fn set_state(&mut self, id: RegionId, state: SizingState) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        let region = &mut self.regions[index];
        if region.state == state {
            return Ok(());
        }

        if region.state == SizingState::Minimize {
            if let Some(rendered) = region.rendered {
                region.current_extent = f64::from(rendered);
            }
        }
        tracing::debug!(region = %id, from = ?region.state, to = ?state, "region sizing state changed");
        region.state = state;
        self.refresh_totals();
        Ok(())
    }

    /// Maximize a region, or return it to Preferred if already maximized.
    pub fn toggle_maximize(&mut self, id: RegionId) -> Result<SizingState, LayoutError> {
        self.toggle(id, SizingState::Maximize)
    }

    /// Minimize a region, or return it to Preferred if already minimized.
    pub fn toggle_minimize(&mut self, id: RegionId) -> Result<SizingState, LayoutError> {
        self.toggle(id, SizingState::Minimize)
    }

    fn toggle(&mut self, id: RegionId, state: SizingState) -> Result<SizingState, LayoutError> {
        let next = if self.state(id)? == state {
            SizingState::Preferred
        } else {
            state
        };
        self.set_state(id, next)?;
        Ok(next)
    }

    fn index_of(&self, id: RegionId) -> Result<usize, LayoutError> {
        self.regions
            .iter()
            .position(|r| r.id == id)
            .ok_or(LayoutError::UnknownRegion(id))
    }

    fn refresh_totals(&mut self) {
        let mut totals = GroupTotals::default();
        for region in &self.regions {
            match region.state {
                SizingState::Maximize => totals.maximize_weight += region.weight(),
                SizingState::Preferred => totals.preferred_weight += region.weight(),
                SizingState::Minimize => totals.minimized_extent += region.minimized_size(),
            }
        }
        self.totals = totals;
    }

    // --- Layout ------------------------------------------------------------

    /// Allocations from the most recent layout pass, in display order.
    #[must_use]
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// The most recent allocation of one region.
    #[must_use]
    pub fn allocation(&self, id: RegionId) -> Option<Allocation> {
        self.allocations.iter().copied().find(|a| a.id == id)
    }

    /// Distribute `extent` pixels among the regions.
    ///
    /// Returns one allocation per region in display (insertion) order.
    pub fn layout(&mut self, extent: u32) -> Vec<Allocation> {
        let n = self.regions.len();
        let mut sizes = vec![0.0f64; n];
        let mut pinned = vec![false; n];
        let order = self.resolution_order();

        // 1. Minimized regions are literal.
        for &i in &order {
            let region = &self.regions[i];
            if region.state == SizingState::Minimize {
                sizes[i] = region.minimized_size();
                pinned[i] = true;
            }
        }

        let maximize = self.group_members(&order, SizingState::Maximize);
        let preferred = self.group_members(&order, SizingState::Preferred);
        let preferred_floor: f64 = preferred.iter().map(|&i| self.regions[i].bounds().0).sum();

        // 2-4. Maximize first, then whatever is left for Preferred.
        let available = f64::from(extent) - self.totals.minimized_extent;
        let used = self.resolve_group(
            &maximize,
            self.totals.maximize_weight,
            available - preferred_floor,
            &mut sizes,
            &mut pinned,
        );
        self.resolve_group(
            &preferred,
            self.totals.preferred_weight,
            available - used,
            &mut sizes,
            &mut pinned,
        );

        // 5. Whole pixels.
        let rounded = self.absorb_remainder(extent, &order, &sizes, &pinned);

        let mut offset = 0u32;
        let mut allocations = Vec::with_capacity(n);
        for (region, &size) in self.regions.iter_mut().zip(&rounded) {
            region.rendered = Some(size);
            allocations.push(Allocation {
                id: region.id,
                offset,
                size,
            });
            offset = offset.saturating_add(size);
        }
        self.allocations.clone_from(&allocations);
        allocations
    }

    /// Split `area` along the layout direction.
    pub fn split(&mut self, area: Rect) -> Vec<(RegionId, Rect)> {
        let direction = self.direction;
        self.layout(area.extent(direction))
            .into_iter()
            .map(|a| {
                let rect = match direction {
                    Direction::Horizontal => {
                        Rect::new(area.x.saturating_add(a.offset), area.y, a.size, area.height)
                    }
                    Direction::Vertical => {
                        Rect::new(area.x, area.y.saturating_add(a.offset), area.width, a.size)
                    }
                };
                (a.id, rect)
            })
            .collect()
    }

    /// Region indices grouped Maximize, Minimize, Preferred; insertion order
    /// within each group.
    fn resolution_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.regions.len()).collect();
        order.sort_by_key(|&i| self.regions[i].state.rank());
        order
    }

    fn group_members(&self, order: &[usize], state: SizingState) -> Vec<usize> {
        order
            .iter()
            .copied()
            .filter(|&i| self.regions[i].state == state)
            .collect()
    }

    /// Split `available` among `members` by weight, pinning out-of-bounds
    /// shares until a pass pins nothing. Returns the extent consumed.
    fn resolve_group(
        &self,
        members: &[usize],
        total_weight: f64,
        available: f64,
        sizes: &mut [f64],
        pinned: &mut [bool],
    ) -> f64 {
        if members.is_empty() {
            return 0.0;
        }

        // Nothing to proportion by: start at the minimum and leave the
        // members unpinned so remainder absorption can grow them.
        if total_weight <= 0.0 {
            let mut used = 0.0;
            for &i in members {
                let lo = self.regions[i].bounds().0;
                sizes[i] = lo;
                used += lo;
            }
            return used;
        }

        let mut unresolved = members.to_vec();
        let mut weight = total_weight;
        let mut remaining = available;
        let mut consumed = 0.0;

        while !unresolved.is_empty() {
            let share = if weight > 0.0 {
                remaining.max(0.0) / weight
            } else {
                0.0
            };

            let mut proposals = Vec::with_capacity(unresolved.len());
            let mut violation = 0.0;
            for &i in &unresolved {
                let region = &self.regions[i];
                let (lo, hi) = region.bounds();
                let proposed = share * region.weight();
                let clamped = proposed.clamp(lo, hi);
                violation += clamped - proposed;
                proposals.push((i, proposed, clamped));
            }

            let mut next = Vec::with_capacity(unresolved.len());
            for (i, proposed, clamped) in proposals {
                let pin = if violation > 0.0 {
                    clamped > proposed
                } else if violation < 0.0 {
                    clamped < proposed
                } else {
                    clamped != proposed
                };
                if pin {
                    tracing::trace!(
                        region = %self.regions[i].id,
                        proposed,
                        size = clamped,
                        "pinned region to bound; re-proportioning group"
                    );
                    sizes[i] = clamped;
                    pinned[i] = true;
                    remaining -= clamped;
                    consumed += clamped;
                } else {
                    sizes[i] = proposed;
                    next.push(i);
                }
            }

            if next.len() == unresolved.len() {
                consumed += next.iter().map(|&i| sizes[i]).sum::<f64>();
                break;
            }
            weight = next.iter().map(|&i| self.regions[i].weight()).sum();
            unresolved = next;
        }

        consumed
    }

    fn absorb_remainder(
        &self,
        extent: u32,
        order: &[usize],
        sizes: &[f64],
        pinned: &[bool],
    ) -> Vec<u32> {
        let mut rounded: Vec<i64> = sizes.iter().map(|s| s.round() as i64).collect();
        let mut remainder = i64::from(extent) - rounded.iter().sum::<i64>();

        for &i in order {
            if remainder == 0 {
                break;
            }
            if pinned[i] {
                continue;
            }
            let (lo, hi) = self.regions[i].int_bounds();
            let adjusted = (rounded[i] + remainder).clamp(lo, hi);
            remainder -= adjusted - rounded[i];
            rounded[i] = adjusted;
        }

        rounded
            .into_iter()
            .map(|s| u32::try_from(s.max(0)).unwrap_or(u32::MAX))
            .collect()
    }
}

impl Default for AccordionLayout {
    fn default() -> Self {
        Self::vertical()
    }
}

impl Animatable for AccordionLayout {
    fn animate(&mut self, frame_length: Duration) {
        let lerp = self.lerp;
        for region in &mut self.regions {
            let target = region.target_extent();
            if region.current_extent != target {
                region.current_extent = lerp.step(region.current_extent, target, frame_length);
            }
        }
        self.refresh_totals();
    }

    /// Return every region to Preferred at its preferred extent.
    fn reset(&mut self) {
        for region in &mut self.regions {
            region.state = SizingState::Preferred;
            region.current_extent = f64::from(region.preferred_extent);
        }
        self.refresh_totals();
    }

    fn configure_lerp(&mut self, config: LerpConfig) {
        self.lerp = config;
    }
}
