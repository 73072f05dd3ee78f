//! Offset middleware: displaces the floating element from its reference

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Coords;
use crate::placement::{Alignment, Axis, Placement, Side};
use crate::platform::{Platform, Strategy};
use crate::position::PositionError;

use super::{Middleware, MiddlewareReturn, MiddlewareState};

/// Distances along each axis.
///
/// `main_axis` moves away from (positive) or towards (negative) the
/// reference; `cross_axis` slides along the attached side. For aligned
/// placements a set `alignment_axis` replaces `cross_axis` and is mirrored
/// for `end` alignment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetAxes {
    pub main_axis: f64,
    pub cross_axis: f64,
    pub alignment_axis: Option<f64>,
}

/// A plain main-axis distance or per-axis distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OffsetValue {
    MainAxis(f64),
    Axes(OffsetAxes),
}

impl From<f64> for OffsetValue {
    fn from(value: f64) -> Self {
        OffsetValue::MainAxis(value)
    }
}

impl From<OffsetAxes> for OffsetValue {
    fn from(axes: OffsetAxes) -> Self {
        OffsetValue::Axes(axes)
    }
}

/// Position facts available to a derived offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetContext {
    pub x: f64,
    pub y: f64,
    pub placement: Placement,
    pub strategy: Strategy,
    pub rtl: bool,
}

enum OffsetSource {
    Value(OffsetValue),
    Derived(Box<dyn Fn(&OffsetContext) -> OffsetValue>),
}

/// Applied displacement, stored under `"offset"`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OffsetData {
    pub x: f64,
    pub y: f64,
}

/// Displaces the floating element along the main and cross axes.
///
/// Never requests a reset.
pub struct Offset {
    source: OffsetSource,
}

impl Offset {
    pub fn new(value: impl Into<OffsetValue>) -> Self {
        Self {
            source: OffsetSource::Value(value.into()),
        }
    }

    /// Offset computed from the position being adjusted, e.g. to depend on
    /// the placement a flip settled on
    pub fn derived(f: impl Fn(&OffsetContext) -> OffsetValue + 'static) -> Self {
        Self {
            source: OffsetSource::Derived(Box::new(f)),
        }
    }

    fn value(&self, context: &OffsetContext) -> OffsetValue {
        match &self.source {
            OffsetSource::Value(value) => *value,
            OffsetSource::Derived(f) => f(context),
        }
    }
}

/// Shorthand for [`Offset::new`]
pub fn offset(value: impl Into<OffsetValue>) -> Offset {
    Offset::new(value)
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            OffsetSource::Value(value) => f.debug_tuple("Offset").field(value).finish(),
            OffsetSource::Derived(_) => f.write_str("Offset(<derived>)"),
        }
    }
}

/// Translate an offset value into an x/y delta for a placement
pub fn convert_value_to_coords(placement: Placement, rtl: bool, value: OffsetValue) -> Coords {
    let is_vertical = placement.main_axis() == Axis::X;
    let main_multiplier = match placement.side {
        Side::Left | Side::Top => -1.0,
        Side::Right | Side::Bottom => 1.0,
    };
    let cross_multiplier = if rtl && is_vertical { -1.0 } else { 1.0 };

    let (main_axis, mut cross_axis, alignment_axis) = match value {
        OffsetValue::MainAxis(distance) => (distance, 0.0, None),
        OffsetValue::Axes(axes) => (axes.main_axis, axes.cross_axis, axes.alignment_axis),
    };

    if let (Some(alignment), Some(distance)) = (placement.alignment, alignment_axis) {
        cross_axis = match alignment {
            Alignment::End => -distance,
            Alignment::Start => distance,
        };
    }

    if is_vertical {
        Coords::new(cross_axis * cross_multiplier, main_axis * main_multiplier)
    } else {
        Coords::new(main_axis * main_multiplier, cross_axis * cross_multiplier)
    }
}

impl<P: Platform> Middleware<P> for Offset {
    fn name(&self) -> &str {
        "offset"
    }

    fn compute(&self, state: &MiddlewareState<'_, P>) -> Result<MiddlewareReturn, PositionError> {
        let context = OffsetContext {
            x: state.x,
            y: state.y,
            placement: state.placement,
            strategy: state.strategy,
            rtl: state.rtl,
        };
        let delta = convert_value_to_coords(state.placement, state.rtl, self.value(&context));

        MiddlewareReturn::coords(state.x + delta.x, state.y + delta.y).with_data(&OffsetData {
            x: delta.x,
            y: delta.y,
        })
    }
}
