//! Flip middleware: moves the floating element to another placement when
//! the requested one overflows its clipping boundary.
//!
//! Candidates are the initial placement followed by the fallbacks. Each visit
//! measures overflow for the live placement and records it in the flip
//! history. A visit with no positive overflow settles. Otherwise the next
//! untried candidate is requested through a reset. When every candidate has
//! been tried, the fallback strategy picks the final placement.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::placement::{alignment_sides, Placement};
use crate::platform::Platform;
use crate::position::{detect_overflow, DetectOverflowOptions, PositionError};

use super::{Middleware, MiddlewareReturn, MiddlewareState, Reset};

const NAME: &str = "flip";

/// What to settle on when no candidate fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStrategy {
    /// The tried placement with the least total positive overflow
    #[default]
    BestFit,
    /// The placement originally asked for
    InitialPlacement,
}

/// Options for [`Flip`]
#[derive(Debug, Clone, PartialEq)]
pub struct FlipOptions<E> {
    /// Check overflow on the side the element is attached to
    pub main_axis: bool,
    /// Check overflow on the two sides alignment can push towards
    pub cross_axis: bool,
    /// Explicit candidates tried after the initial placement
    pub fallback_placements: Option<Vec<Placement>>,
    pub fallback_strategy: FallbackStrategy,
    /// Also try the opposite alignment when deriving fallbacks
    pub flip_alignment: bool,
    pub detect_overflow: DetectOverflowOptions<E>,
}

impl<E> Default for FlipOptions<E> {
    fn default() -> Self {
        Self {
            main_axis: true,
            cross_axis: true,
            fallback_placements: None,
            fallback_strategy: FallbackStrategy::BestFit,
            flip_alignment: true,
            detect_overflow: DetectOverflowOptions::default(),
        }
    }
}

impl<E> FlipOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_main_axis(mut self, check: bool) -> Self {
        self.main_axis = check;
        self
    }

    pub fn with_cross_axis(mut self, check: bool) -> Self {
        self.cross_axis = check;
        self
    }

    pub fn with_fallback_placements(mut self, placements: Vec<Placement>) -> Self {
        self.fallback_placements = Some(placements);
        self
    }

    pub fn with_fallback_strategy(mut self, strategy: FallbackStrategy) -> Self {
        self.fallback_strategy = strategy;
        self
    }

    pub fn with_flip_alignment(mut self, flip_alignment: bool) -> Self {
        self.flip_alignment = flip_alignment;
        self
    }

    pub fn with_detect_overflow(mut self, options: DetectOverflowOptions<E>) -> Self {
        self.detect_overflow = options;
        self
    }
}

/// Overflow measured for one visited placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementOverflow {
    pub placement: Placement,
    pub overflows: Vec<f64>,
}

impl PlacementOverflow {
    /// Sum of the overflowing (positive) amounts
    pub fn total_overflow(&self) -> f64 {
        self.overflows.iter().filter(|o| **o > 0.0).sum()
    }

    pub fn fits(&self) -> bool {
        self.overflows.iter().all(|o| *o <= 0.0)
    }
}

/// History stored under `"flip"`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipData {
    /// Index of the candidate currently being tried
    pub index: usize,
    pub overflows: Vec<PlacementOverflow>,
}

/// Changes placement to one that fits when the requested one does not
#[derive(Debug, Clone, PartialEq)]
pub struct Flip<E> {
    options: FlipOptions<E>,
}

impl<E> Flip<E> {
    pub fn new(options: FlipOptions<E>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FlipOptions<E> {
        &self.options
    }

    /// Candidate placements in the order they are tried.
    ///
    /// Without explicit fallbacks an unaligned placement only tries its
    /// opposite; an aligned one also tries the opposite alignment on both
    /// sides unless `flip_alignment` is off.
    pub fn candidates(&self, initial: Placement) -> Vec<Placement> {
        let fallbacks = match &self.options.fallback_placements {
            Some(placements) => placements.clone(),
            None if initial.alignment.is_none() || !self.options.flip_alignment => {
                vec![initial.opposite()]
            }
            None => initial.expanded_fallbacks().to_vec(),
        };

        std::iter::once(initial).chain(fallbacks).collect()
    }
}

impl<E> Default for Flip<E> {
    fn default() -> Self {
        Self::new(FlipOptions::default())
    }
}

/// Flip with default options
pub fn flip<E>() -> Flip<E> {
    Flip::default()
}

/// The tried placement with the least positive overflow; the first one wins ties
fn best_fit(history: &[PlacementOverflow]) -> Option<Placement> {
    history
        .iter()
        .min_by(|a, b| a.total_overflow().total_cmp(&b.total_overflow()))
        .map(|entry| entry.placement)
}

impl<P: Platform> Middleware<P> for Flip<P::Element> {
    fn name(&self) -> &str {
        NAME
    }

    fn compute(&self, state: &MiddlewareState<'_, P>) -> Result<MiddlewareReturn, PositionError> {
        let options = &self.options;
        let placement = state.placement;
        let candidates = self.candidates(state.initial_placement);

        let overflow = detect_overflow(state, &options.detect_overflow)?;
        let previous: FlipData = state.middleware_data.get_as(NAME)?.unwrap_or_default();

        let mut overflows = Vec::new();
        if options.main_axis {
            overflows.push(overflow.get(placement.side));
        }
        if options.cross_axis {
            let length = placement.main_axis().length();
            let sides = alignment_sides(
                placement,
                state.rects.reference.length(length),
                state.rects.floating.length(length),
                state.rtl,
            );
            overflows.push(overflow.get(sides.main));
            overflows.push(overflow.get(sides.cross));
        }

        let visit = PlacementOverflow {
            placement,
            overflows,
        };
        let fits = visit.fits();
        let mut history = previous.overflows;
        history.push(visit);

        if fits {
            return MiddlewareReturn::default().with_data(&FlipData {
                index: previous.index,
                overflows: history,
            });
        }

        let next_index = previous.index + 1;
        if let Some(next) = candidates.get(next_index) {
            debug!("{} overflows, trying {}", placement, next);
            return Ok(MiddlewareReturn::default()
                .with_data(&FlipData {
                    index: next_index,
                    overflows: history,
                })?
                .with_reset(Reset::placement(*next)));
        }

        let settled = match options.fallback_strategy {
            FallbackStrategy::BestFit => best_fit(&history).unwrap_or(state.initial_placement),
            FallbackStrategy::InitialPlacement => state.initial_placement,
        };

        let result = MiddlewareReturn::default().with_data(&FlipData {
            index: previous.index,
            overflows: history,
        })?;
        if settled == placement {
            return Ok(result);
        }

        debug!("no placement fits, settling on {}", settled);
        Ok(result.with_reset(Reset::placement(settled)))
    }
}
