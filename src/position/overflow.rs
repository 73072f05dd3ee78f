//! Overflow of an element against its clipping boundary

use serde::{Deserialize, Serialize};

use crate::geometry::{Overflow, Padding};
use crate::middleware::MiddlewareState;
use crate::platform::{Boundary, Platform, RootBoundary};

use super::error::PositionError;

/// Which element's overflow is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementContext {
    #[default]
    Floating,
    Reference,
}

impl ElementContext {
    /// The other element
    pub fn alt(self) -> ElementContext {
        match self {
            ElementContext::Floating => ElementContext::Reference,
            ElementContext::Reference => ElementContext::Floating,
        }
    }
}

/// Options for [`detect_overflow`]
#[derive(Debug, Clone, PartialEq)]
pub struct DetectOverflowOptions<E> {
    pub boundary: Boundary<E>,
    pub root_boundary: RootBoundary,
    pub element_context: ElementContext,
    /// Clip against the other element's boundary instead of its own
    pub alt_boundary: bool,
    pub padding: Padding,
}

impl<E> Default for DetectOverflowOptions<E> {
    fn default() -> Self {
        Self {
            boundary: Boundary::ClippingAncestors,
            root_boundary: RootBoundary::Viewport,
            element_context: ElementContext::Floating,
            alt_boundary: false,
            padding: Padding::All(0.0),
        }
    }
}

impl<E> DetectOverflowOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boundary(mut self, boundary: Boundary<E>) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_root_boundary(mut self, root_boundary: RootBoundary) -> Self {
        self.root_boundary = root_boundary;
        self
    }

    pub fn with_element_context(mut self, element_context: ElementContext) -> Self {
        self.element_context = element_context;
        self
    }

    pub fn with_alt_boundary(mut self, alt_boundary: bool) -> Self {
        self.alt_boundary = alt_boundary;
        self
    }

    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }
}

/// How far the element overflows its clipping boundary on each side.
///
/// Positive values overflow by that many pixels, negative values are the
/// room left before overflowing, zero lies flush. Padding shrinks the
/// boundary, so it is added to every side.
pub fn detect_overflow<P: Platform>(
    state: &MiddlewareState<'_, P>,
    options: &DetectOverflowOptions<P::Element>,
) -> Result<Overflow, PositionError> {
    let padding = options.padding.to_side_object();
    let clipping_context = if options.alt_boundary {
        options.element_context.alt()
    } else {
        options.element_context
    };
    let clipping_element = match clipping_context {
        ElementContext::Floating => state.elements.floating,
        ElementContext::Reference => state.elements.reference,
    };

    let clipping_rect = state
        .platform
        .get_clipping_rect(
            clipping_element,
            &options.boundary,
            &options.root_boundary,
            state.strategy,
        )?
        .to_client_rect();

    let rect = match options.element_context {
        ElementContext::Floating => state.rects.floating.with_origin(state.coords()),
        ElementContext::Reference => state.rects.reference,
    };
    let offset_parent = state.platform.get_offset_parent(state.elements.floating)?;
    let element_rect = state
        .platform
        .convert_offset_parent_relative_rect_to_viewport_relative_rect(
            rect,
            &offset_parent,
            state.strategy,
        )?
        .to_client_rect();

    Ok(Overflow {
        top: clipping_rect.top - element_rect.top + padding.top,
        right: element_rect.right - clipping_rect.right + padding.right,
        bottom: element_rect.bottom - clipping_rect.bottom + padding.bottom,
        left: clipping_rect.left - element_rect.left + padding.left,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{PartialSides, Rect};
    use crate::middleware::MiddlewareData;
    use crate::placement::Placement;
    use crate::platform::{
        Elements, NodeId, OverflowMode, Scene, SceneBuilder, SceneNode, Strategy,
    };

    struct Fixture {
        scene: Scene,
        reference: NodeId,
        floating: NodeId,
    }

    fn fixture() -> Fixture {
        let mut builder = SceneBuilder::new(400.0, 300.0);
        let reference = builder.add(SceneNode::new("ref", Rect::new(10.0, 10.0, 50.0, 20.0)));
        let floating = builder.add(SceneNode::new("pop", Rect::new(0.0, 0.0, 100.0, 60.0)));
        Fixture {
            scene: builder.build().unwrap(),
            reference,
            floating,
        }
    }

    fn overflow_at(
        fixture: &Fixture,
        x: f64,
        y: f64,
        options: &DetectOverflowOptions<NodeId>,
    ) -> Overflow {
        let rects = fixture
            .scene
            .get_element_rects(&fixture.reference, &fixture.floating, Strategy::Absolute)
            .unwrap();
        let data = MiddlewareData::default();
        let state = MiddlewareState {
            x,
            y,
            initial_placement: Placement::TOP,
            placement: Placement::TOP,
            strategy: Strategy::Absolute,
            rtl: false,
            rects: &rects,
            middleware_data: &data,
            elements: Elements {
                reference: &fixture.reference,
                floating: &fixture.floating,
            },
            platform: &fixture.scene,
        };
        detect_overflow(&state, options).unwrap()
    }

    #[test]
    fn test_floating_overflow_is_signed_per_side() {
        let fixture = fixture();
        let overflow = overflow_at(&fixture, -15.0, -50.0, &DetectOverflowOptions::new());
        assert_eq!(overflow.top, 50.0);
        assert_eq!(overflow.left, 15.0);
        assert_eq!(overflow.right, 100.0 - 15.0 - 400.0);
        assert_eq!(overflow.bottom, 10.0 - 300.0);
    }

    #[test]
    fn test_padding_is_added_to_each_side() {
        let fixture = fixture();
        let options = DetectOverflowOptions::new().with_padding(PartialSides {
            top: Some(5.0),
            left: Some(2.0),
            ..Default::default()
        });
        let overflow = overflow_at(&fixture, 0.0, 0.0, &options);
        assert_eq!(overflow.top, 5.0);
        assert_eq!(overflow.left, 2.0);
        assert_eq!(overflow.right, -300.0);
        assert_eq!(overflow.bottom, -240.0);
    }

    #[test]
    fn test_reference_context_ignores_floating_coords() {
        let fixture = fixture();
        let options = DetectOverflowOptions::new()
            .with_element_context(ElementContext::Reference)
            .with_root_boundary(RootBoundary::Rect(Rect::new(20.0, 0.0, 100.0, 100.0)));
        let overflow = overflow_at(&fixture, 999.0, 999.0, &options);
        assert_eq!(overflow.left, 10.0);
        assert_eq!(overflow.top, -10.0);
    }

    #[test]
    fn test_alt_boundary_clips_against_the_reference_ancestors() {
        let mut builder = SceneBuilder::new(800.0, 600.0);
        let panel = builder.add(
            SceneNode::new("panel", Rect::new(0.0, 0.0, 100.0, 100.0))
                .with_overflow(OverflowMode::Hidden),
        );
        let reference =
            builder.add_child(panel, SceneNode::new("ref", Rect::new(10.0, 10.0, 20.0, 20.0)));
        let floating = builder.add(SceneNode::new("pop", Rect::new(0.0, 0.0, 50.0, 50.0)));
        let fixture = Fixture {
            scene: builder.build().unwrap(),
            reference,
            floating,
        };

        let own = overflow_at(&fixture, 80.0, 0.0, &DetectOverflowOptions::new());
        assert_eq!(own.right, 130.0 - 800.0);

        let alt = overflow_at(
            &fixture,
            80.0,
            0.0,
            &DetectOverflowOptions::new().with_alt_boundary(true),
        );
        assert_eq!(alt.right, 30.0);
        assert_eq!(alt.bottom, -50.0);
    }

    #[test]
    fn test_element_context_alt() {
        assert_eq!(ElementContext::Floating.alt(), ElementContext::Reference);
        assert_eq!(ElementContext::Reference.alt(), ElementContext::Floating);
    }

    #[test]
    fn test_default_options() {
        let options: DetectOverflowOptions<u32> = DetectOverflowOptions::default();
        assert_eq!(options.boundary, Boundary::ClippingAncestors);
        assert_eq!(options.root_boundary, RootBoundary::Viewport);
        assert_eq!(options.padding, Padding::All(0.0));
        assert!(!options.alt_boundary);
    }
}
