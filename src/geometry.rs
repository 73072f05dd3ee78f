//! Core geometry types shared by the solver, the overflow detector and platforms

use serde::{Deserialize, Serialize};

use crate::placement::{Axis, Length, Side};

/// A 2D coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }
}

/// Width and height of an element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
///
/// Whether it is relative to an offset parent or to the viewport depends on
/// where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle of the given size at the origin
    pub fn from_dimensions(dimensions: Dimensions) -> Self {
        Self::new(0.0, 0.0, dimensions.width, dimensions.height)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn length(&self, length: Length) -> f64 {
        match length {
            Length::Width => self.width,
            Length::Height => self.height,
        }
    }

    pub fn with_origin(self, coords: Coords) -> Self {
        Self::new(coords.x, coords.y, self.width, self.height)
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Edge representation of this rectangle
    pub fn to_client_rect(&self) -> ClientRect {
        ClientRect {
            top: self.y,
            right: self.right(),
            bottom: self.bottom(),
            left: self.x,
        }
    }
}

/// Rectangle expressed by its four edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ClientRect {
    /// The area shared with another rectangle.
    ///
    /// Disjoint rectangles produce negative width or height rather than an
    /// error; callers measuring overflow get the correspondingly large value.
    pub fn intersect(&self, other: &ClientRect) -> ClientRect {
        ClientRect {
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
            left: self.left.max(other.left),
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
        )
    }
}

/// Rectangles of the two elements taking part in a positioning pass.
///
/// `reference` is relative to the floating element's offset parent;
/// `floating` only carries a size and sits at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRects {
    pub reference: Rect,
    pub floating: Rect,
}

/// One value per side: overflow amounts, padding insets
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SideObject {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl SideObject {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

/// Signed overflow per side: positive overflows the boundary, negative is
/// remaining room, zero lies flush.
pub type Overflow = SideObject;

/// Sides given explicitly in a per-side padding; missing sides are zero
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialSides {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

/// Inset applied to a clipping boundary before measuring overflow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Padding {
    All(f64),
    Sides(PartialSides),
}

impl Padding {
    pub fn to_side_object(&self) -> SideObject {
        match *self {
            Padding::All(value) => SideObject::uniform(value),
            Padding::Sides(sides) => SideObject {
                top: sides.top.unwrap_or(0.0),
                right: sides.right.unwrap_or(0.0),
                bottom: sides.bottom.unwrap_or(0.0),
                left: sides.left.unwrap_or(0.0),
            },
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::All(0.0)
    }
}

impl From<f64> for Padding {
    fn from(value: f64) -> Self {
        Padding::All(value)
    }
}

impl From<PartialSides> for Padding {
    fn from(sides: PartialSides) -> Self {
        Padding::Sides(sides)
    }
}
