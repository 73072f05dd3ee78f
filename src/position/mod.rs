//! Positioning engine: base coordinates, overflow measurement and the
//! middleware pipeline that refines them.
//!
//! ## Pipeline
//!
//! 1. Measure both elements through the platform and solve base coordinates
//!    for the requested placement.
//! 2. Run every middleware in order, applying returned coordinates and
//!    merging returned data under the middleware's name.
//! 3. A middleware may request a reset: the placement and/or rectangles are
//!    replaced, coordinates re-solved and the pass restarts from the first
//!    middleware. At most [`MAX_RESETS`] resets are honored; later requests
//!    are logged and ignored so a misbehaving middleware cannot loop forever.

pub mod config;
pub mod error;
pub mod overflow;
pub mod solver;

pub use config::ComputeConfig;
pub use error::PositionError;
pub use overflow::{detect_overflow, DetectOverflowOptions, ElementContext};
pub use solver::compute_coords_from_placement;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::geometry::Coords;
use crate::middleware::{MiddlewareData, MiddlewareState, ResetRects};
use crate::placement::Placement;
use crate::platform::{Elements, Platform, Strategy};

/// Upper bound on honored resets per call
pub const MAX_RESETS: usize = 50;

/// Final position of the floating element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedPosition {
    pub x: f64,
    pub y: f64,
    pub placement: Placement,
    pub strategy: Strategy,
    pub middleware_data: MiddlewareData,
    /// Number of resets that were honored
    pub resets: usize,
}

impl ComputedPosition {
    pub fn coords(&self) -> Coords {
        Coords::new(self.x, self.y)
    }
}

/// Compute coordinates placing `floating` next to `reference`.
///
/// The platform is only read; neither element is modified. Platform and
/// middleware failures abort the computation and are returned as-is.
pub fn compute_position<P: Platform>(
    reference: &P::Element,
    floating: &P::Element,
    config: ComputeConfig<'_, P>,
) -> Result<ComputedPosition, PositionError> {
    let ComputeConfig {
        placement,
        strategy,
        middleware,
        platform,
    } = config;
    let middleware: Vec<_> = middleware.into_iter().flatten().collect();

    let rtl = platform.is_rtl(floating)?;
    let elements = Elements {
        reference,
        floating,
    };
    let mut rects = platform.get_element_rects(reference, floating, strategy)?;
    let mut coords = compute_coords_from_placement(&rects, placement, rtl);
    let mut current_placement = placement;
    let mut middleware_data = MiddlewareData::default();
    let mut resets = 0;

    'pass: loop {
        for step in &middleware {
            let state = MiddlewareState {
                x: coords.x,
                y: coords.y,
                initial_placement: placement,
                placement: current_placement,
                strategy,
                rtl,
                rects: &rects,
                middleware_data: &middleware_data,
                elements,
                platform,
            };
            let result = step.compute(&state)?;
            trace!("middleware '{}' returned {:?}", step.name(), result);

            coords = Coords::new(result.x.unwrap_or(coords.x), result.y.unwrap_or(coords.y));
            if let Some(data) = result.data {
                middleware_data = middleware_data.merged(step.name(), data);
            }

            let Some(reset) = result.reset else {
                continue;
            };
            if resets >= MAX_RESETS {
                warn!(
                    "middleware '{}' requested a reset after {} resets; ignoring it",
                    step.name(),
                    resets
                );
                continue;
            }

            resets += 1;
            if let Some(next) = reset.placement {
                current_placement = next;
            }
            match reset.rects {
                Some(ResetRects::Recompute) => {
                    rects = platform.get_element_rects(reference, floating, strategy)?;
                }
                Some(ResetRects::Use(supplied)) => rects = supplied,
                None => {}
            }
            coords = compute_coords_from_placement(&rects, current_placement, rtl);
            debug!(
                "reset {} by '{}': placement {} at ({}, {})",
                resets,
                step.name(),
                current_placement,
                coords.x,
                coords.y
            );
            continue 'pass;
        }
        break;
    }

    Ok(ComputedPosition {
        x: coords.x,
        y: coords.y,
        placement: current_placement,
        strategy,
        middleware_data,
        resets,
    })
}
