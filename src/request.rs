//! Position requests: a scene plus what to position in it, loaded from TOML
//!
//! ```toml
//! [viewport]
//! width = 800
//! height = 600
//!
//! [[element]]
//! id = "button"
//! rect = { x = 20, y = 10, width = 80, height = 30 }
//!
//! [[element]]
//! id = "menu"
//! rect = { x = 0, y = 0, width = 160, height = 120 }
//! position = "absolute"
//!
//! [position]
//! reference = "button"
//! floating = "menu"
//! placement = "top-start"
//!
//! [[position.middleware]]
//! type = "offset"
//! main_axis = 8
//!
//! [[position.middleware]]
//! type = "flip"
//! padding = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Padding;
use crate::middleware::{FallbackStrategy, Flip, FlipOptions, Offset, OffsetAxes, OffsetValue};
use crate::placement::Placement;
use crate::platform::{Boundary, NodeId, RootBoundary, Scene, SceneError, SceneSpec, Strategy};
use crate::position::{
    compute_position, ComputeConfig, ComputedPosition, DetectOverflowOptions, ElementContext,
    PositionError,
};

/// Errors that can occur when loading or running a request
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to read request file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse request TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),
    #[error("Positioning failed: {0}")]
    Position(#[from] PositionError),
}

/// A scene and the positioning to perform in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRequest {
    #[serde(flatten)]
    pub scene: SceneSpec,
    pub position: PositionSpec,
}

/// Which elements to position and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSpec {
    pub reference: String,
    pub floating: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub middleware: Vec<MiddlewareSpec>,
}

/// A middleware entry of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MiddlewareSpec {
    Offset(OffsetSpec),
    Flip(FlipSpec),
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetSpec {
    /// Disabled entries stay in the list but are skipped
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub main_axis: f64,
    #[serde(default)]
    pub cross_axis: f64,
    #[serde(default)]
    pub alignment_axis: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipSpec {
    pub enabled: bool,
    pub main_axis: bool,
    pub cross_axis: bool,
    pub fallback_placements: Option<Vec<Placement>>,
    pub fallback_strategy: FallbackStrategy,
    pub flip_alignment: bool,
    /// Element ids clipping the floating element; clipping ancestors if unset
    pub boundary: Option<Vec<String>>,
    pub root_boundary: RootBoundary,
    pub element_context: ElementContext,
    pub alt_boundary: bool,
    pub padding: Padding,
}

impl Default for FlipSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            main_axis: true,
            cross_axis: true,
            fallback_placements: None,
            fallback_strategy: FallbackStrategy::BestFit,
            flip_alignment: true,
            boundary: None,
            root_boundary: RootBoundary::Viewport,
            element_context: ElementContext::Floating,
            alt_boundary: false,
            padding: Padding::All(0.0),
        }
    }
}

impl OffsetSpec {
    fn to_middleware(&self) -> Option<Offset> {
        self.enabled.then(|| {
            Offset::new(OffsetValue::Axes(OffsetAxes {
                main_axis: self.main_axis,
                cross_axis: self.cross_axis,
                alignment_axis: self.alignment_axis,
            }))
        })
    }
}

impl FlipSpec {
    fn to_middleware(&self, scene: &Scene) -> Result<Option<Flip<NodeId>>, SceneError> {
        if !self.enabled {
            return Ok(None);
        }

        let boundary = match &self.boundary {
            Some(ids) => Boundary::Elements(
                ids.iter()
                    .map(|id| scene.require(id))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => Boundary::ClippingAncestors,
        };

        let mut options = FlipOptions::new()
            .with_main_axis(self.main_axis)
            .with_cross_axis(self.cross_axis)
            .with_fallback_strategy(self.fallback_strategy)
            .with_flip_alignment(self.flip_alignment)
            .with_detect_overflow(
                DetectOverflowOptions::new()
                    .with_boundary(boundary)
                    .with_root_boundary(self.root_boundary)
                    .with_element_context(self.element_context)
                    .with_alt_boundary(self.alt_boundary)
                    .with_padding(self.padding),
            );
        if let Some(placements) = &self.fallback_placements {
            options = options.with_fallback_placements(placements.clone());
        }

        Ok(Some(Flip::new(options)))
    }
}

impl PositionRequest {
    /// Load a request from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RequestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a request from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, RequestError> {
        Ok(toml::from_str(content)?)
    }

    /// Override the requested placement
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.position.placement = placement;
        self
    }

    /// Override the positioning strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.position.strategy = strategy;
        self
    }

    /// Build the scene and run the positioning pipeline
    pub fn compute(&self) -> Result<ComputedPosition, RequestError> {
        let scene = self.scene.build()?;
        let reference = scene.require(&self.position.reference)?;
        let floating = scene.require(&self.position.floating)?;

        let mut config = ComputeConfig::new(&scene)
            .with_placement(self.position.placement)
            .with_strategy(self.position.strategy);
        for spec in &self.position.middleware {
            config = match spec {
                MiddlewareSpec::Offset(offset) => {
                    config.with_optional_middleware(offset.to_middleware())
                }
                MiddlewareSpec::Flip(flip) => {
                    config.with_optional_middleware(flip.to_middleware(&scene)?)
                }
            };
        }

        Ok(compute_position(&reference, &floating, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = r#"
[viewport]
width = 800
height = 600

[[element]]
id = "button"
rect = { x = 20, y = 10, width = 80, height = 30 }

[[element]]
id = "menu"
rect = { x = 0, y = 0, width = 160, height = 120 }
position = "absolute"

[position]
reference = "button"
floating = "menu"
placement = "top-start"

[[position.middleware]]
type = "offset"
main_axis = 8

[[position.middleware]]
type = "flip"
padding = 4
"#;

    #[test]
    fn test_parse_request() {
        let request = PositionRequest::from_str(REQUEST).unwrap();
        assert_eq!(request.scene.viewport.width, 800.0);
        assert_eq!(request.scene.elements.len(), 2);
        assert_eq!(request.position.placement, Placement::TOP_START);
        assert_eq!(request.position.strategy, Strategy::Absolute);
        assert_eq!(request.position.middleware.len(), 2);
        assert!(matches!(
            &request.position.middleware[1],
            MiddlewareSpec::Flip(FlipSpec {
                padding: Padding::All(p),
                enabled: true,
                ..
            }) if *p == 4.0
        ));
    }

    #[test]
    fn test_invalid_placement_is_a_parse_error() {
        let source = REQUEST.replace("top-start", "top-middle");
        let err = PositionRequest::from_str(&source).unwrap_err();
        assert!(matches!(err, RequestError::ParseError(_)));
        assert!(err.to_string().contains("Unexpected word 'middle'"));
    }

    #[test]
    fn test_unknown_reference_is_a_scene_error() {
        let source = REQUEST.replace("reference = \"button\"", "reference = \"nope\"");
        let err = PositionRequest::from_str(&source)
            .unwrap()
            .compute()
            .unwrap_err();
        assert!(matches!(
            err,
            RequestError::Scene(SceneError::UnknownElement { .. })
        ));
    }

    #[test]
    fn test_compute_flips_below_the_button() {
        let position = PositionRequest::from_str(REQUEST)
            .unwrap()
            .compute()
            .unwrap();
        assert_eq!(position.placement, Placement::BOTTOM_START);
        assert_eq!(position.x, 20.0);
        assert_eq!(position.y, 48.0);
    }
}
