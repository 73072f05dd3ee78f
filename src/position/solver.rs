//! Base coordinates of the floating element for a placement

use crate::geometry::{Coords, ElementRects};
use crate::placement::{Alignment, Axis, Placement, Side};

/// Coordinates that attach the floating element to the requested side of
/// the reference, centered or aligned along the other axis.
///
/// Alignment shifts by half the length difference of the two elements;
/// in right-to-left contexts start and end swap for top/bottom placements.
pub fn compute_coords_from_placement(
    rects: &ElementRects,
    placement: Placement,
    rtl: bool,
) -> Coords {
    let reference = &rects.reference;
    let floating = &rects.floating;

    let common_x = reference.x + reference.width / 2.0 - floating.width / 2.0;
    let common_y = reference.y + reference.height / 2.0 - floating.height / 2.0;
    let main_axis = placement.main_axis();
    let length = main_axis.length();
    let common_align = reference.length(length) / 2.0 - floating.length(length) / 2.0;

    let mut coords = match placement.side {
        Side::Top => Coords::new(common_x, reference.y - floating.height),
        Side::Bottom => Coords::new(common_x, reference.bottom()),
        Side::Right => Coords::new(reference.right(), common_y),
        Side::Left => Coords::new(reference.x - floating.width, common_y),
    };

    let direction = if rtl && main_axis == Axis::X { -1.0 } else { 1.0 };
    match placement.alignment {
        Some(Alignment::Start) => *coords.get_mut(main_axis) -= common_align * direction,
        Some(Alignment::End) => *coords.get_mut(main_axis) += common_align * direction,
        None => {}
    }

    coords
}
