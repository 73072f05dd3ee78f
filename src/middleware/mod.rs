//! Composable adjustments applied after the base position is solved.
//!
//! A middleware sees the in-progress position as a [`MiddlewareState`] and
//! answers with a [`MiddlewareReturn`]: new coordinates, data to merge into
//! its own entry of [`MiddlewareData`], and optionally a [`Reset`] asking the
//! pipeline to start over with a different placement or fresh rectangles.

pub mod flip;
pub mod offset;

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::geometry::{Coords, ElementRects, Overflow};
use crate::placement::Placement;
use crate::platform::{Elements, Platform, Strategy};
use crate::position::error::PositionError;
use crate::position::overflow::{detect_overflow, DetectOverflowOptions};

pub use flip::{flip, FallbackStrategy, Flip, FlipData, FlipOptions, PlacementOverflow};
pub use offset::{offset, Offset, OffsetAxes, OffsetContext, OffsetData, OffsetValue};

/// Everything a middleware can inspect during one step of the pipeline
pub struct MiddlewareState<'a, P: Platform> {
    pub x: f64,
    pub y: f64,
    /// The placement the caller asked for; never changes during a solve
    pub initial_placement: Placement,
    /// The live placement, possibly replaced by a reset
    pub placement: Placement,
    pub strategy: Strategy,
    pub rtl: bool,
    pub rects: &'a ElementRects,
    pub middleware_data: &'a MiddlewareData,
    pub elements: Elements<'a, P::Element>,
    pub platform: &'a P,
}

impl<P: Platform> MiddlewareState<'_, P> {
    pub fn coords(&self) -> Coords {
        Coords::new(self.x, self.y)
    }

    /// Measure overflow of the current position against a clipping boundary
    pub fn detect_overflow(
        &self,
        options: &DetectOverflowOptions<P::Element>,
    ) -> Result<Overflow, PositionError> {
        detect_overflow(self, options)
    }
}

/// How to refresh the element rectangles on reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResetRects {
    /// Measure both elements again through the platform
    Recompute,
    /// Use these rectangles verbatim
    Use(ElementRects),
}

/// Request to restart the pipeline from the first middleware.
///
/// Coordinates are always recomputed from the (possibly new) placement and
/// rectangles before the restart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reset {
    pub placement: Option<Placement>,
    pub rects: Option<ResetRects>,
}

impl Reset {
    /// Restart with a new placement
    pub fn placement(placement: Placement) -> Self {
        Self {
            placement: Some(placement),
            rects: None,
        }
    }

    /// Restart with freshly measured rectangles and the current placement
    pub fn recompute() -> Self {
        Self {
            placement: None,
            rects: Some(ResetRects::Recompute),
        }
    }

    pub fn with_rects(mut self, rects: ResetRects) -> Self {
        self.rects = Some(rects);
        self
    }
}

/// Result of one middleware step. Absent fields leave the state unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MiddlewareReturn {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub data: Option<Map<String, Value>>,
    pub reset: Option<Reset>,
}

impl MiddlewareReturn {
    pub fn coords(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Attach data; it must serialize to a JSON object
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Result<Self, PositionError> {
        match serde_json::to_value(data)? {
            Value::Object(map) => {
                self.data = Some(map);
                Ok(self)
            }
            other => Err(PositionError::DataNotAnObject {
                found: other.to_string(),
            }),
        }
    }

    pub fn with_reset(mut self, reset: Reset) -> Self {
        self.reset = Some(reset);
        self
    }
}

/// Data accumulated by each middleware, keyed by middleware name.
///
/// Entries are merged key by key across pipeline passes, so a middleware
/// can build up history (flip keeps every placement it tried).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MiddlewareData(BTreeMap<String, Map<String, Value>>);

impl MiddlewareData {
    pub fn get(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name)
    }

    /// Read a middleware's entry back into a typed structure
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, PositionError> {
        self.0
            .get(name)
            .map(|map| {
                serde_json::from_value(Value::Object(map.clone())).map_err(|source| {
                    PositionError::InvalidData {
                        name: name.to_string(),
                        source,
                    }
                })
            })
            .transpose()
    }

    /// A copy of this data with `data` shallow-merged into `name`'s entry
    pub fn merged(&self, name: &str, data: Map<String, Value>) -> Self {
        let mut next = self.0.clone();
        next.entry(name.to_string()).or_default().extend(data);
        Self(next)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for MiddlewareData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A named adjustment step of the positioning pipeline
pub trait Middleware<P: Platform> {
    /// Key under which this middleware's data is stored
    fn name(&self) -> &str;

    fn compute(&self, state: &MiddlewareState<'_, P>) -> Result<MiddlewareReturn, PositionError>;
}

/// Middleware backed by a closure, see [`from_fn`]
pub struct FnMiddleware<P, F> {
    name: String,
    f: F,
    _platform: PhantomData<fn(&P)>,
}

/// Build a middleware from a name and a closure
pub fn from_fn<P, F>(name: impl Into<String>, f: F) -> FnMiddleware<P, F>
where
    P: Platform,
    F: Fn(&MiddlewareState<'_, P>) -> Result<MiddlewareReturn, PositionError>,
{
    FnMiddleware {
        name: name.into(),
        f,
        _platform: PhantomData,
    }
}

impl<P, F> Middleware<P> for FnMiddleware<P, F>
where
    P: Platform,
    F: Fn(&MiddlewareState<'_, P>) -> Result<MiddlewareReturn, PositionError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, state: &MiddlewareState<'_, P>) -> Result<MiddlewareReturn, PositionError> {
        (self.f)(state)
    }
}
