//! Floating Anchor - position floating elements next to reference elements
//!
//! Given a reference element and a floating element (a tooltip, menu or
//! popover), the engine computes coordinates that place the floating element
//! on the requested side of the reference with the requested alignment.
//! A pipeline of middleware then refines the result: [`middleware::offset`]
//! adds spacing and [`middleware::flip`] moves to another placement when the
//! floating element would overflow its clipping boundary.
//!
//! All measurement goes through a [`Platform`]; the crate ships an in-memory
//! [`Scene`] platform for documents described as data.
//!
//! # Example
//!
//! ```rust
//! use floating_anchor::geometry::Rect;
//! use floating_anchor::middleware::{flip, offset};
//! use floating_anchor::platform::{SceneBuilder, SceneNode};
//! use floating_anchor::{compute_position, ComputeConfig, Placement};
//!
//! let mut builder = SceneBuilder::new(800.0, 600.0);
//! let button = builder.add(SceneNode::new("button", Rect::new(20.0, 10.0, 80.0, 30.0)));
//! let menu = builder.add(SceneNode::new("menu", Rect::new(0.0, 0.0, 160.0, 120.0)));
//! let scene = builder.build().unwrap();
//!
//! let config = ComputeConfig::new(&scene)
//!     .with_placement(Placement::TOP)
//!     .with_middleware(offset(8.0))
//!     .with_middleware(flip());
//! let position = compute_position(&button, &menu, config).unwrap();
//!
//! // No room above the button, so the menu flips below it
//! assert_eq!(position.placement, Placement::BOTTOM);
//! assert_eq!(position.y, 48.0);
//! ```

pub mod error;
pub mod geometry;
pub mod middleware;
pub mod placement;
pub mod platform;
pub mod position;
pub mod request;

pub use error::PlacementError;
pub use geometry::{ElementRects, Overflow, Rect};
pub use middleware::{Middleware, MiddlewareData, MiddlewareReturn, MiddlewareState, Reset};
pub use placement::{Alignment, Placement, Side};
pub use platform::{Platform, PlatformError, Scene, Strategy};
pub use position::{
    compute_position, detect_overflow, ComputeConfig, ComputedPosition, PositionError,
};
pub use request::{PositionRequest, RequestError};

/// Compute a position from a TOML request
///
/// # Example
///
/// ```rust
/// let position = floating_anchor::compute_request(r#"
///     [[element]]
///     id = "anchor"
///     rect = { x = 100, y = 100, width = 40, height = 20 }
///
///     [[element]]
///     id = "tip"
///     rect = { x = 0, y = 0, width = 60, height = 10 }
///
///     [position]
///     reference = "anchor"
///     floating = "tip"
///     placement = "right"
/// "#).unwrap();
///
/// assert_eq!((position.x, position.y), (140.0, 105.0));
/// ```
pub fn compute_request(source: &str) -> Result<ComputedPosition, RequestError> {
    PositionRequest::from_str(source)?.compute()
}
