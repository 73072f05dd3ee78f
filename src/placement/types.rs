//! Placement algebra: sides, alignments and the axes they act on

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PlacementError;

/// The side of the reference element the floating element is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// top <-> bottom, left <-> right
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Axis used for alignment when attached to this side.
    ///
    /// Top/bottom placements align along `x`, left/right along `y`.
    pub fn main_axis(self) -> Axis {
        match self {
            Side::Top | Side::Bottom => Axis::X,
            Side::Left | Side::Right => Axis::Y,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alignment of the floating element along the side it is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Start,
    End,
}

impl Alignment {
    pub fn opposite(self) -> Alignment {
        match self {
            Alignment::Start => Alignment::End,
            Alignment::End => Alignment::Start,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Start => "start",
            Alignment::End => "end",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The rectangle dimension measured along this axis
    pub fn length(self) -> Length {
        match self {
            Axis::X => Length::Width,
            Axis::Y => Length::Height,
        }
    }
}

/// A rectangle dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Length {
    Width,
    Height,
}

/// Desired position of the floating element relative to the reference:
/// a side plus an optional alignment, written `side` or `side-alignment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub side: Side,
    pub alignment: Option<Alignment>,
}

impl Placement {
    pub const TOP: Placement = Placement::new(Side::Top, None);
    pub const TOP_START: Placement = Placement::new(Side::Top, Some(Alignment::Start));
    pub const TOP_END: Placement = Placement::new(Side::Top, Some(Alignment::End));
    pub const RIGHT: Placement = Placement::new(Side::Right, None);
    pub const RIGHT_START: Placement = Placement::new(Side::Right, Some(Alignment::Start));
    pub const RIGHT_END: Placement = Placement::new(Side::Right, Some(Alignment::End));
    pub const BOTTOM: Placement = Placement::new(Side::Bottom, None);
    pub const BOTTOM_START: Placement = Placement::new(Side::Bottom, Some(Alignment::Start));
    pub const BOTTOM_END: Placement = Placement::new(Side::Bottom, Some(Alignment::End));
    pub const LEFT: Placement = Placement::new(Side::Left, None);
    pub const LEFT_START: Placement = Placement::new(Side::Left, Some(Alignment::Start));
    pub const LEFT_END: Placement = Placement::new(Side::Left, Some(Alignment::End));

    /// Every valid placement
    pub const ALL: [Placement; 12] = [
        Placement::TOP,
        Placement::TOP_START,
        Placement::TOP_END,
        Placement::RIGHT,
        Placement::RIGHT_START,
        Placement::RIGHT_END,
        Placement::BOTTOM,
        Placement::BOTTOM_START,
        Placement::BOTTOM_END,
        Placement::LEFT,
        Placement::LEFT_START,
        Placement::LEFT_END,
    ];

    pub const fn new(side: Side, alignment: Option<Alignment>) -> Self {
        Self { side, alignment }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }

    /// `x` for top/bottom placements, `y` for left/right
    pub fn main_axis(&self) -> Axis {
        self.side.main_axis()
    }

    /// Same placement on the opposite side, alignment untouched
    pub fn opposite(&self) -> Placement {
        Placement::new(self.side.opposite(), self.alignment)
    }

    /// Same side with start/end swapped; unaligned placements are unchanged
    pub fn opposite_alignment(&self) -> Placement {
        Placement::new(self.side, self.alignment.map(Alignment::opposite))
    }

    /// The next-best placements to try when this one does not fit
    pub fn expanded_fallbacks(&self) -> [Placement; 3] {
        let opposite = self.opposite();
        [
            self.opposite_alignment(),
            opposite,
            opposite.opposite_alignment(),
        ]
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::BOTTOM
    }
}

impl From<Side> for Placement {
    fn from(side: Side) -> Self {
        Placement::new(side, None)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alignment {
            Some(alignment) => write!(f, "{}-{}", self.side, alignment),
            None => write!(f, "{}", self.side),
        }
    }
}

impl FromStr for Placement {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parse(s)
    }
}

impl Serialize for Placement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The sides checked for cross-axis overflow of an aligned placement.
///
/// `main` is the side the floating element grows towards because of its
/// alignment, `cross` its opposite. When the reference is longer than the
/// floating element along the alignment axis the pair is swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentSides {
    pub main: Side,
    pub cross: Side,
}

pub fn alignment_sides(
    placement: Placement,
    reference_length: f64,
    floating_length: f64,
    rtl: bool,
) -> AlignmentSides {
    let start_side = if rtl { Alignment::End } else { Alignment::Start };
    let mut main = match placement.main_axis() {
        Axis::X if placement.alignment == Some(start_side) => Side::Right,
        Axis::X => Side::Left,
        Axis::Y if placement.alignment == Some(Alignment::Start) => Side::Bottom,
        Axis::Y => Side::Top,
    };

    if reference_length > floating_length {
        main = main.opposite();
    }

    AlignmentSides {
        main,
        cross: main.opposite(),
    }
}
