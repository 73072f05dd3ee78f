//! Integration tests for the positioning pipeline.
//!
//! Covers base coordinates for every side, alignment, offsets, and the
//! reset protocol middleware use to restart the pipeline.

use std::cell::Cell;

use floating_anchor::geometry::{Dimensions, ElementRects, Rect};
use floating_anchor::middleware::{from_fn, offset, Offset, OffsetData, ResetRects};
use floating_anchor::platform::{
    Boundary, Direction, NodeId, OffsetParent, RootBoundary, SceneBuilder, SceneNode,
};
use floating_anchor::position::MAX_RESETS;
use floating_anchor::{
    compute_position, ComputeConfig, MiddlewareReturn, Placement, Platform, PlatformError,
    PositionError, Reset, Scene, Strategy,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// A 50x20 reference at (100, 100) and an 80x30 floating element
fn fixture(direction: Direction) -> (Scene, NodeId, NodeId) {
    let mut builder = SceneBuilder::new(800.0, 600.0);
    let reference = builder.add(SceneNode::new(
        "reference",
        Rect::new(100.0, 100.0, 50.0, 20.0),
    ));
    let floating = builder.add(
        SceneNode::new("floating", Rect::new(0.0, 0.0, 80.0, 30.0)).with_direction(direction),
    );
    (builder.build().unwrap(), reference, floating)
}

fn position_of(placement: Placement) -> (f64, f64) {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let config = ComputeConfig::new(&scene).with_placement(placement);
    let position = compute_position(&reference, &floating, config).unwrap();
    assert_eq!(position.placement, placement);
    (position.x, position.y)
}

#[test]
fn test_centered_placements() {
    assert_eq!(position_of(Placement::TOP), (85.0, 70.0));
    assert_eq!(position_of(Placement::BOTTOM), (85.0, 120.0));
    assert_eq!(position_of(Placement::LEFT), (20.0, 95.0));
    assert_eq!(position_of(Placement::RIGHT), (150.0, 95.0));
}

#[test]
fn test_centered_placement_shares_the_reference_center() {
    let (x, _) = position_of(Placement::BOTTOM);
    assert_eq!(x + 80.0 / 2.0, 100.0 + 50.0 / 2.0);

    let (_, y) = position_of(Placement::RIGHT);
    assert_eq!(y + 30.0 / 2.0, 100.0 + 20.0 / 2.0);
}

#[test]
fn test_aligned_placements_shift_by_half_the_length_difference() {
    let (centered, _) = position_of(Placement::BOTTOM);
    let (start, _) = position_of(Placement::BOTTOM_START);
    let (end, _) = position_of(Placement::BOTTOM_END);

    // Start edges line up, end edges line up
    assert_eq!(start, 100.0);
    assert_eq!(end + 80.0, 150.0);
    assert_eq!((start - centered).abs(), (50.0_f64 / 2.0 - 80.0 / 2.0).abs());
    assert_eq!((end - centered).abs(), (50.0_f64 / 2.0 - 80.0 / 2.0).abs());

    let (_, top) = position_of(Placement::RIGHT_START);
    assert_eq!(top, 100.0);
    let (_, end) = position_of(Placement::LEFT_END);
    assert_eq!(end + 30.0, 120.0);
}

#[test]
fn test_rtl_swaps_alignment_on_vertical_placements() {
    let (scene, reference, floating) = fixture(Direction::Rtl);

    let start = compute_position(
        &reference,
        &floating,
        ComputeConfig::new(&scene).with_placement(Placement::BOTTOM_START),
    )
    .unwrap();
    assert_eq!(start.x + 80.0, 150.0);

    // Horizontal placements are unaffected
    let right = compute_position(
        &reference,
        &floating,
        ComputeConfig::new(&scene).with_placement(Placement::RIGHT_START),
    )
    .unwrap();
    assert_eq!(right.y, 100.0);
}

#[test]
fn test_offset_moves_away_from_the_reference() {
    let (scene, reference, floating) = fixture(Direction::Ltr);

    for (placement, expected) in [
        (Placement::BOTTOM, (85.0, 130.0)),
        (Placement::TOP, (85.0, 60.0)),
        (Placement::RIGHT, (160.0, 95.0)),
        (Placement::LEFT, (10.0, 95.0)),
    ] {
        let config = ComputeConfig::new(&scene)
            .with_placement(placement)
            .with_middleware(offset(10.0));
        let position = compute_position(&reference, &floating, config).unwrap();
        assert_eq!((position.x, position.y), expected, "{}", placement);
    }
}

#[test]
fn test_offset_records_its_delta() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let config = ComputeConfig::new(&scene)
        .with_placement(Placement::TOP)
        .with_middleware(offset(6.0));
    let position = compute_position(&reference, &floating, config).unwrap();

    let data: OffsetData = position.middleware_data.get_as("offset").unwrap().unwrap();
    assert_eq!(data, OffsetData { x: 0.0, y: -6.0 });
}

#[test]
fn test_absent_middleware_is_skipped() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let config = ComputeConfig::new(&scene)
        .with_optional_middleware(None::<Offset>)
        .with_middleware(offset(4.0))
        .with_optional_middleware(None::<Offset>);
    let position = compute_position(&reference, &floating, config).unwrap();

    assert_eq!((position.x, position.y), (85.0, 124.0));
    assert_eq!(position.middleware_data.names().collect::<Vec<_>>(), vec!["offset"]);
}

#[test]
fn test_compute_is_idempotent() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let run = || {
        let config = ComputeConfig::new(&scene)
            .with_placement(Placement::LEFT_START)
            .with_middleware(offset(3.0));
        compute_position(&reference, &floating, config).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_strategy_is_reported() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let config = ComputeConfig::new(&scene).with_strategy(Strategy::Fixed);
    let position = compute_position(&reference, &floating, config).unwrap();
    assert_eq!(position.strategy, Strategy::Fixed);
}

#[test]
fn test_resets_are_capped() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let calls = Cell::new(0);
    let config = ComputeConfig::new(&scene).with_middleware(from_fn::<Scene, _>("restless", |state| {
        calls.set(calls.get() + 1);
        Ok(MiddlewareReturn::default().with_reset(Reset::placement(state.placement)))
    }));

    let position = compute_position(&reference, &floating, config).unwrap();

    assert_eq!(position.resets, MAX_RESETS);
    assert_eq!(calls.get(), MAX_RESETS + 1);
    assert_eq!((position.x, position.y), (85.0, 120.0));
}

#[test]
fn test_reset_restarts_from_the_first_middleware() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let first = Cell::new(0);
    let config = ComputeConfig::new(&scene)
        .with_middleware(from_fn::<Scene, _>("first", |_| {
            first.set(first.get() + 1);
            Ok(MiddlewareReturn::default())
        }))
        .with_middleware(from_fn::<Scene, _>("once", |state| {
            if state.middleware_data.get("once").is_some() {
                return Ok(MiddlewareReturn::default());
            }
            MiddlewareReturn::default()
                .with_data(&json!({ "reset": true }))
                .map(|result| result.with_reset(Reset::placement(Placement::RIGHT)))
        }));

    let position = compute_position(&reference, &floating, config).unwrap();

    assert_eq!(first.get(), 2);
    assert_eq!(position.resets, 1);
    assert_eq!(position.placement, Placement::RIGHT);
    assert_eq!((position.x, position.y), (150.0, 95.0));
}

#[test]
fn test_data_merges_across_resets() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let config = ComputeConfig::new(&scene).with_middleware(from_fn::<Scene, _>("probe", |state| {
        match state.middleware_data.get("probe") {
            None => MiddlewareReturn::default()
                .with_data(&json!({ "first": 1 }))
                .map(|result| result.with_reset(Reset::recompute())),
            Some(_) => MiddlewareReturn::default().with_data(&json!({ "second": 2 })),
        }
    }));

    let position = compute_position(&reference, &floating, config).unwrap();

    assert_eq!(
        serde_json::to_value(&position.middleware_data).unwrap(),
        json!({ "probe": { "first": 1, "second": 2 } })
    );
}

#[test]
fn test_reset_with_supplied_rects() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let supplied = ElementRects {
        reference: Rect::new(0.0, 0.0, 10.0, 10.0),
        floating: Rect::new(0.0, 0.0, 4.0, 4.0),
    };
    let config = ComputeConfig::new(&scene).with_middleware(from_fn::<Scene, _>("resize", move |state| {
        if state.rects == &supplied {
            return Ok(MiddlewareReturn::default());
        }
        Ok(MiddlewareReturn::default()
            .with_reset(Reset::default().with_rects(ResetRects::Use(supplied))))
    }));

    let position = compute_position(&reference, &floating, config).unwrap();

    assert_eq!(position.resets, 1);
    assert_eq!((position.x, position.y), (3.0, 10.0));
}

#[test]
fn test_middleware_coordinates_apply_in_order() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let config = ComputeConfig::new(&scene)
        .with_middleware(from_fn::<Scene, _>("pin", |_| Ok(MiddlewareReturn::coords(1.0, 2.0))))
        .with_middleware(from_fn::<Scene, _>("partial", |state| {
            Ok(MiddlewareReturn {
                x: Some(state.x + 1.0),
                ..MiddlewareReturn::default()
            })
        }));

    let position = compute_position(&reference, &floating, config).unwrap();
    assert_eq!((position.x, position.y), (2.0, 2.0));
}

#[test]
fn test_middleware_error_aborts() {
    let (scene, reference, floating) = fixture(Direction::Ltr);
    let config = ComputeConfig::new(&scene)
        .with_middleware(from_fn::<Scene, _>("broken", |_| {
            Err(PositionError::middleware("broken", "no anchor"))
        }));

    let err = compute_position(&reference, &floating, config).unwrap_err();
    assert!(matches!(err, PositionError::Middleware { ref name, .. } if name == "broken"));
}

/// A host that only knows the elements named `reference` and `floating`.
///
/// The reference moves 10px right every time the rects are measured.
#[derive(Default)]
struct Drifting {
    measured: Cell<usize>,
}

impl Platform for Drifting {
    type Element = &'static str;

    fn get_element_rects(
        &self,
        reference: &&'static str,
        floating: &&'static str,
        _strategy: Strategy,
    ) -> Result<ElementRects, PlatformError> {
        let drift = 10.0 * self.measured.get() as f64;
        self.measured.set(self.measured.get() + 1);
        Ok(ElementRects {
            reference: self.rect(reference)?.translate(drift, 0.0),
            floating: Rect::from_dimensions(self.get_dimensions(floating)?),
        })
    }

    fn get_clipping_rect(
        &self,
        _element: &&'static str,
        _boundary: &Boundary<&'static str>,
        _root_boundary: &RootBoundary,
        _strategy: Strategy,
    ) -> Result<Rect, PlatformError> {
        Ok(Rect::new(0.0, 0.0, 300.0, 300.0))
    }

    fn get_dimensions(&self, element: &&'static str) -> Result<Dimensions, PlatformError> {
        Ok(self.rect(element)?.dimensions())
    }

    fn get_offset_parent(
        &self,
        _element: &&'static str,
    ) -> Result<OffsetParent<&'static str>, PlatformError> {
        Ok(OffsetParent::Window)
    }
}

impl Drifting {
    fn rect(&self, element: &str) -> Result<Rect, PlatformError> {
        match element {
            "reference" => Ok(Rect::new(10.0, 10.0, 20.0, 20.0)),
            "floating" => Ok(Rect::new(50.0, 50.0, 10.0, 10.0)),
            other => Err(PlatformError::unknown(other)),
        }
    }
}

#[test]
fn test_custom_platform_uses_trait_defaults() {
    let platform = Drifting::default();
    let position = compute_position(
        &"reference",
        &"floating",
        ComputeConfig::new(&platform).with_placement(Placement::RIGHT),
    )
    .unwrap();
    assert_eq!((position.x, position.y), (30.0, 15.0));
    assert_eq!(platform.measured.get(), 1);
}

#[test]
fn test_recompute_reset_measures_again() {
    let platform = Drifting::default();
    let config = ComputeConfig::new(&platform).with_middleware(from_fn::<Drifting, _>(
        "remeasure",
        |state| {
            if state.middleware_data.get("remeasure").is_some() {
                return Ok(MiddlewareReturn::default());
            }
            MiddlewareReturn::default()
                .with_data(&json!({ "done": true }))
                .map(|result| result.with_reset(Reset::recompute()))
        },
    ));

    let position = compute_position(&"reference", &"floating", config).unwrap();

    assert_eq!(platform.measured.get(), 2);
    assert_eq!(position.resets, 1);
    // Centered under the reference after it moved from x = 10 to x = 20
    assert_eq!((position.x, position.y), (25.0, 30.0));
}

#[test]
fn test_placement_reset_keeps_measured_rects() {
    let platform = Drifting::default();
    let config = ComputeConfig::new(&platform).with_middleware(from_fn::<Drifting, _>(
        "move",
        |state| {
            if state.placement == Placement::TOP {
                return Ok(MiddlewareReturn::default());
            }
            Ok(MiddlewareReturn::default().with_reset(Reset::placement(Placement::TOP)))
        },
    ));

    let position = compute_position(&"reference", &"floating", config).unwrap();

    assert_eq!(platform.measured.get(), 1);
    assert_eq!((position.x, position.y), (15.0, 0.0));
}

#[test]
fn test_platform_error_propagates() {
    let platform = Drifting::default();
    let err = compute_position(&"reference", &"ghost", ComputeConfig::new(&platform)).unwrap_err();
    assert!(matches!(
        err,
        PositionError::Platform(PlatformError::UnknownElement { ref id }) if id == "ghost"
    ));
}
