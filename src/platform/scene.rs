//! In-memory host platform.
//!
//! A [`Scene`] describes an already laid-out document: a viewport, the
//! scrollable document behind it and a tree of boxes with their viewport
//! rectangles, scroll offsets and the few CSS facts that decide offset
//! parents and clipping (`position`, `overflow`, containing blocks and
//! writing direction). It answers every [`Platform`] query from that data,
//! which makes the engine usable outside a browser and easy to test.
//!
//! ## Coordinate spaces
//!
//! - Node rectangles are viewport-relative border boxes.
//! - With the `absolute` strategy and no positioned ancestor, offset-parent
//!   space is document space (viewport + document scroll).
//! - With a positioned ancestor it is that ancestor's padding box, shifted
//!   by the ancestor's own scroll offsets.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{ClientRect, Coords, Dimensions, ElementRects, Rect};

use super::{Boundary, OffsetParent, Platform, PlatformError, RootBoundary, Strategy};

/// Handle to a node in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// CSS `position` of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

/// CSS `overflow` of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowMode {
    #[default]
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
}

impl OverflowMode {
    /// Whether content overflowing the node is cut off
    pub fn clips(self) -> bool {
        !matches!(self, OverflowMode::Visible)
    }
}

/// Writing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// The visual viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Offset of the visual viewport inside the layout viewport (pinch zoom)
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Size and scroll state of the whole document
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetrics {
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub direction: Direction,
}

/// A laid-out box
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Name used in error messages and scene descriptions
    pub id: String,
    pub parent: Option<NodeId>,
    /// Border box, viewport-relative
    pub rect: Rect,
    /// Border widths on the left and top
    pub client_left: f64,
    pub client_top: f64,
    /// Padding box size; `None` means the border box size
    pub client_width: Option<f64>,
    pub client_height: Option<f64>,
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub position: Position,
    pub overflow: OverflowMode,
    /// Establishes a containing block for positioned descendants without
    /// being positioned itself (transform, perspective, filter, contain...)
    pub containing_block: bool,
    /// `None` inherits from the parent, then the document
    pub direction: Option<Direction>,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            parent: None,
            rect,
            client_left: 0.0,
            client_top: 0.0,
            client_width: None,
            client_height: None,
            scroll_left: 0.0,
            scroll_top: 0.0,
            position: Position::Static,
            overflow: OverflowMode::Visible,
            containing_block: false,
            direction: None,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowMode) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_scroll(mut self, left: f64, top: f64) -> Self {
        self.scroll_left = left;
        self.scroll_top = top;
        self
    }

    /// Set border insets and the padding box size
    pub fn with_client(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.client_left = left;
        self.client_top = top;
        self.client_width = Some(width);
        self.client_height = Some(height);
        self
    }

    pub fn with_containing_block(mut self, containing_block: bool) -> Self {
        self.containing_block = containing_block;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Viewport-relative padding box, excluding borders and scrollbars
    pub fn inner_client_rect(&self) -> Rect {
        Rect::new(
            self.rect.x + self.client_left,
            self.rect.y + self.client_top,
            self.client_width.unwrap_or(self.rect.width),
            self.client_height.unwrap_or(self.rect.height),
        )
    }
}

/// Errors in a scene description
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("duplicate element id '{id}'")]
    DuplicateId { id: String },

    /// Parents must be declared before their children
    #[error("element '{id}' has unknown parent '{parent}'")]
    UnknownParent { id: String, parent: String },

    #[error("no element named '{id}' in the scene")]
    UnknownElement { id: String },
}

/// Builds a [`Scene`] node by node
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    viewport: Viewport,
    document: DocumentMetrics,
    nodes: Vec<SceneNode>,
}

impl SceneBuilder {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport: Viewport {
                width: viewport_width,
                height: viewport_height,
                ..Viewport::default()
            },
            ..Self::default()
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_document(mut self, document: DocumentMetrics) -> Self {
        self.document = document;
        self
    }

    /// Add a node without a parent
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        self.push(None, node)
    }

    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        self.push(Some(parent), node)
    }

    fn push(&mut self, parent: Option<NodeId>, mut node: SceneNode) -> NodeId {
        node.parent = parent;
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn build(self) -> Result<Scene, SceneError> {
        let mut by_id = HashMap::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent.0 >= index {
                    return Err(SceneError::UnknownParent {
                        id: node.id.clone(),
                        parent: parent.to_string(),
                    });
                }
            }
            if by_id.insert(node.id.clone(), NodeId(index)).is_some() {
                return Err(SceneError::DuplicateId {
                    id: node.id.clone(),
                });
            }
        }

        Ok(Scene {
            viewport: self.viewport,
            document: self.document,
            nodes: self.nodes,
            by_id,
        })
    }
}

/// Serializable scene description, as found in request files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub viewport: Viewport,
    pub document: DocumentMetrics,
    #[serde(rename = "element")]
    pub elements: Vec<ElementSpec>,
}

/// One element of a [`SceneSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub rect: Rect,
    #[serde(default)]
    pub client_left: f64,
    #[serde(default)]
    pub client_top: f64,
    #[serde(default)]
    pub client_width: Option<f64>,
    #[serde(default)]
    pub client_height: Option<f64>,
    #[serde(default)]
    pub scroll_left: f64,
    #[serde(default)]
    pub scroll_top: f64,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub overflow: OverflowMode,
    #[serde(default)]
    pub containing_block: bool,
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl SceneSpec {
    pub fn build(&self) -> Result<Scene, SceneError> {
        let mut builder = SceneBuilder::default()
            .with_viewport(self.viewport)
            .with_document(self.document);
        let mut ids: HashMap<&str, NodeId> = HashMap::new();

        for spec in &self.elements {
            let parent = match &spec.parent {
                Some(parent) => Some(*ids.get(parent.as_str()).ok_or_else(|| {
                    SceneError::UnknownParent {
                        id: spec.id.clone(),
                        parent: parent.clone(),
                    }
                })?),
                None => None,
            };

            let node = SceneNode {
                id: spec.id.clone(),
                parent: None,
                rect: spec.rect,
                client_left: spec.client_left,
                client_top: spec.client_top,
                client_width: spec.client_width,
                client_height: spec.client_height,
                scroll_left: spec.scroll_left,
                scroll_top: spec.scroll_top,
                position: spec.position,
                overflow: spec.overflow,
                containing_block: spec.containing_block,
                direction: spec.direction,
            };
            let id = match parent {
                Some(parent) => builder.add_child(parent, node),
                None => builder.add(node),
            };
            ids.insert(spec.id.as_str(), id);
        }

        builder.build()
    }
}

/// Sources whose rectangles are intersected into a clipping rect
#[derive(Debug, Clone, Copy)]
enum ClipSource {
    Element(NodeId),
    Root(RootBoundary),
}

/// A laid-out document answering [`Platform`] queries
#[derive(Debug, Clone)]
pub struct Scene {
    viewport: Viewport,
    document: DocumentMetrics,
    nodes: Vec<SceneNode>,
    by_id: HashMap<String, NodeId>,
}

impl Scene {
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn document(&self) -> &DocumentMetrics {
        &self.document
    }

    /// Look up a node by its name
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    /// Look up a node by its name, failing with a scene error
    pub fn require(&self, id: &str) -> Result<NodeId, SceneError> {
        self.find(id)
            .ok_or_else(|| SceneError::UnknownElement { id: id.to_string() })
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, PlatformError> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| PlatformError::unknown(id.to_string()))
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.nodes.get(id.0).and_then(|n| n.parent);
        std::iter::successors(first, move |current| {
            self.nodes.get(current.0).and_then(|n| n.parent)
        })
    }

    /// Writing direction of a node after inheritance
    pub fn direction(&self, id: NodeId) -> Result<Direction, PlatformError> {
        let node = self.node(id)?;
        let inherited = node.direction.or_else(|| {
            self.ancestors(id)
                .filter_map(|a| self.nodes.get(a.0))
                .find_map(|a| a.direction)
        });
        Ok(inherited.unwrap_or(self.document.direction))
    }

    /// Rectangle of the visual viewport
    pub fn viewport_rect(&self) -> Rect {
        Rect::new(
            self.viewport.offset_x,
            self.viewport.offset_y,
            self.viewport.width,
            self.viewport.height,
        )
    }

    /// Rectangle of the whole scrollable document, viewport-relative.
    ///
    /// In RTL documents horizontal overflow extends to the left.
    pub fn document_rect(&self) -> Rect {
        let width = self.document.scroll_width.max(self.viewport.width);
        let height = self.document.scroll_height.max(self.viewport.height);
        let mut x = -self.document.scroll_left;
        let y = -self.document.scroll_top;

        if self.document.direction == Direction::Rtl {
            x += self.viewport.width - width;
        }

        Rect::new(x, y, width, height)
    }

    /// Overflow-clipping ancestors that actually clip `element`.
    ///
    /// A static ancestor without its own containing block does not clip
    /// descendants whose containing-block chain is absolutely or fixed
    /// positioned above it, so it is dropped.
    pub fn clipping_element_ancestors(&self, element: NodeId) -> Result<Vec<NodeId>, PlatformError> {
        self.node(element)?;

        let mut result: Vec<NodeId> = self
            .ancestors(element)
            .filter(|a| self.nodes[a.0].overflow.clips())
            .collect();

        let mut containing_position: Option<Position> = None;
        let mut current = Some(element);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            let escapes = matches!(
                containing_position,
                Some(Position::Absolute) | Some(Position::Fixed)
            );
            if node.position == Position::Static && escapes && !node.containing_block {
                result.retain(|a| *a != id);
            } else {
                containing_position = Some(node.position);
            }
            current = node.parent;
        }

        Ok(result)
    }

    fn clip_source_rect(&self, source: ClipSource) -> Result<ClientRect, PlatformError> {
        let rect = match source {
            ClipSource::Element(id) => self.node(id)?.inner_client_rect(),
            ClipSource::Root(RootBoundary::Viewport) => self.viewport_rect(),
            ClipSource::Root(RootBoundary::Document) => self.document_rect(),
            ClipSource::Root(RootBoundary::Rect(rect)) => rect,
        };
        Ok(rect.to_client_rect())
    }

    /// Scroll offsets and client origin of an offset parent
    fn offset_parent_translation(
        &self,
        offset_parent: &OffsetParent<NodeId>,
        strategy: Strategy,
    ) -> Result<(Coords, Coords), PlatformError> {
        match offset_parent {
            OffsetParent::Element(id) => {
                let parent = self.node(*id)?;
                let scroll = Coords::new(parent.scroll_left, parent.scroll_top);
                let origin = Coords::new(
                    parent.rect.x + parent.client_left,
                    parent.rect.y + parent.client_top,
                );
                Ok((scroll, origin))
            }
            OffsetParent::Window if strategy == Strategy::Fixed => {
                Ok((Coords::default(), Coords::default()))
            }
            OffsetParent::Window => Ok((
                Coords::new(self.document.scroll_left, self.document.scroll_top),
                Coords::default(),
            )),
        }
    }

    /// Rectangle of `element` in the coordinate space of `offset_parent`
    pub fn rect_relative_to_offset_parent(
        &self,
        element: NodeId,
        offset_parent: &OffsetParent<NodeId>,
        strategy: Strategy,
    ) -> Result<Rect, PlatformError> {
        let rect = self.node(element)?.rect;
        let (scroll, origin) = self.offset_parent_translation(offset_parent, strategy)?;
        Ok(rect.translate(scroll.x - origin.x, scroll.y - origin.y))
    }
}

impl Platform for Scene {
    type Element = NodeId;

    fn get_element_rects(
        &self,
        reference: &NodeId,
        floating: &NodeId,
        strategy: Strategy,
    ) -> Result<ElementRects, PlatformError> {
        let offset_parent = self.get_offset_parent(floating)?;
        Ok(ElementRects {
            reference: self.rect_relative_to_offset_parent(*reference, &offset_parent, strategy)?,
            floating: Rect::from_dimensions(self.get_dimensions(floating)?),
        })
    }

    fn get_clipping_rect(
        &self,
        element: &NodeId,
        boundary: &Boundary<NodeId>,
        root_boundary: &RootBoundary,
        _strategy: Strategy,
    ) -> Result<Rect, PlatformError> {
        let mut sources: Vec<ClipSource> = match boundary {
            Boundary::ClippingAncestors => self
                .clipping_element_ancestors(*element)?
                .into_iter()
                .map(ClipSource::Element)
                .collect(),
            Boundary::Elements(elements) => {
                elements.iter().copied().map(ClipSource::Element).collect()
            }
        };
        sources.push(ClipSource::Root(*root_boundary));

        let mut clipping = self.clip_source_rect(sources[0])?;
        for source in &sources[1..] {
            clipping = clipping.intersect(&self.clip_source_rect(*source)?);
        }

        Ok(clipping.to_rect())
    }

    fn get_dimensions(&self, element: &NodeId) -> Result<Dimensions, PlatformError> {
        Ok(self.node(*element)?.rect.dimensions())
    }

    fn get_offset_parent(&self, element: &NodeId) -> Result<OffsetParent<NodeId>, PlatformError> {
        let node = self.node(*element)?;

        if node.position != Position::Fixed {
            let positioned = self
                .ancestors(*element)
                .find(|a| self.nodes[a.0].position != Position::Static);
            if let Some(parent) = positioned {
                return Ok(OffsetParent::Element(parent));
            }
        }

        let containing_block = self
            .ancestors(*element)
            .find(|a| self.nodes[a.0].containing_block);
        Ok(containing_block.map_or(OffsetParent::Window, OffsetParent::Element))
    }

    fn convert_offset_parent_relative_rect_to_viewport_relative_rect(
        &self,
        rect: Rect,
        offset_parent: &OffsetParent<NodeId>,
        strategy: Strategy,
    ) -> Result<Rect, PlatformError> {
        let (scroll, origin) = self.offset_parent_translation(offset_parent, strategy)?;
        Ok(rect.translate(origin.x - scroll.x, origin.y - scroll.y))
    }

    fn is_rtl(&self, element: &NodeId) -> Result<bool, PlatformError> {
        Ok(self.direction(*element)? == Direction::Rtl)
    }
}
