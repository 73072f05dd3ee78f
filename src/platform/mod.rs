//! The measurement capabilities the positioning engine needs from its host.
//!
//! All geometry math in [`crate::position`] goes through a [`Platform`];
//! nothing in the engine knows how rectangles are actually measured. The
//! [`scene`] module provides an in-memory host for documents described as
//! data.

pub mod scene;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Dimensions, ElementRects, Rect};

pub use scene::{
    Direction, DocumentMetrics, ElementSpec, NodeId, OverflowMode, Position, Scene, SceneBuilder,
    SceneError, SceneNode, SceneSpec, Viewport,
};

/// Positioning scheme of the floating element.
///
/// Passed through to the platform; the solver never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Absolute,
    Fixed,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Absolute => f.write_str("absolute"),
            Strategy::Fixed => f.write_str("fixed"),
        }
    }
}

/// Area an element is clipped against before the root boundary
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Boundary<E> {
    /// Every overflow-clipping ancestor of the element
    #[default]
    ClippingAncestors,
    /// Explicitly chosen clipping elements
    Elements(Vec<E>),
}

/// Outermost clipping area
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootBoundary {
    #[default]
    Viewport,
    /// The whole scrollable document
    Document,
    Rect(Rect),
}

/// The box the floating element is positioned against
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetParent<E> {
    Element(E),
    /// The host window / initial containing block
    Window,
}

/// Both elements taking part in a positioning pass
#[derive(Debug)]
pub struct Elements<'a, E> {
    pub reference: &'a E,
    pub floating: &'a E,
}

impl<E> Clone for Elements<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Elements<'_, E> {}

/// Errors reported by a platform while measuring
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlatformError {
    /// The element handle does not belong to this platform
    #[error("unknown element '{id}'")]
    UnknownElement { id: String },

    /// The host could not produce a measurement
    #[error("measurement failed: {reason}")]
    Measurement { reason: String },
}

impl PlatformError {
    pub fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownElement { id: id.into() }
    }

    pub fn measurement(reason: impl Into<String>) -> Self {
        Self::Measurement {
            reason: reason.into(),
        }
    }
}

/// Environment-specific measurement used by the positioning engine
pub trait Platform {
    /// Handle to an element of the host
    type Element: Clone;

    /// Reference rectangle relative to the floating element's offset parent,
    /// plus the floating element's size at the origin
    fn get_element_rects(
        &self,
        reference: &Self::Element,
        floating: &Self::Element,
        strategy: Strategy,
    ) -> Result<ElementRects, PlatformError>;

    /// Viewport-relative area `element` is visible in
    fn get_clipping_rect(
        &self,
        element: &Self::Element,
        boundary: &Boundary<Self::Element>,
        root_boundary: &RootBoundary,
        strategy: Strategy,
    ) -> Result<Rect, PlatformError>;

    fn get_dimensions(&self, element: &Self::Element) -> Result<Dimensions, PlatformError>;

    fn get_offset_parent(
        &self,
        element: &Self::Element,
    ) -> Result<OffsetParent<Self::Element>, PlatformError>;

    /// Hosts whose offset-parent space already is viewport space can keep
    /// the default, which returns `rect` unchanged.
    fn convert_offset_parent_relative_rect_to_viewport_relative_rect(
        &self,
        rect: Rect,
        _offset_parent: &OffsetParent<Self::Element>,
        _strategy: Strategy,
    ) -> Result<Rect, PlatformError> {
        Ok(rect)
    }

    fn is_rtl(&self, _element: &Self::Element) -> Result<bool, PlatformError> {
        Ok(false)
    }
}
