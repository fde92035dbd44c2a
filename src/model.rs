use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offset applied to a duplicated node so it doesn't sit on the original.
const DUPLICATE_OFFSET: Point = Point { x: 32.0, y: 32.0 };

// ── Default node sizes at creation ──────────────────────────────────
const PROMPT_DEFAULT_SIZE: Size = Size {
    width: 260.0,
    height: 180.0,
};
const TEMPLATE_DEFAULT_SIZE: Size = Size {
    width: 260.0,
    height: 200.0,
};
const GROUP_DEFAULT_SIZE: Size = Size {
    width: 420.0,
    height: 320.0,
};
const IMAGE_DEFAULT_SIZE: Size = Size {
    width: 220.0,
    height: 220.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned bounding box, used for containment tests and the
/// viewport-refit signal returned by auto-layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_node(position: Point, size: Size) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    Slate,
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Purple,
    Pink,
}

/// The full palette, in picker order.
pub const PALETTE: [NodeColor; 9] = [
    NodeColor::Slate,
    NodeColor::Red,
    NodeColor::Orange,
    NodeColor::Yellow,
    NodeColor::Green,
    NodeColor::Teal,
    NodeColor::Blue,
    NodeColor::Purple,
    NodeColor::Pink,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorPoint {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum NodeKind {
    Prompt {
        content: String,
    },
    Template {
        template: String,
        values: BTreeMap<String, String>,
    },
    Group {
        edit_mode: bool,
    },
    Image {
        src: String,
        thumbnail: String,
        attached_to: Option<String>,
        anchor_point: AnchorPoint,
        opacity: f32,
        show_border: bool,
    },
}

impl NodeKind {
    pub fn is_group(&self) -> bool {
        matches!(self, NodeKind::Group { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, NodeKind::Image { .. })
    }

    fn default_title(&self) -> &'static str {
        match self {
            NodeKind::Prompt { .. } => "Prompt",
            NodeKind::Template { .. } => "Template",
            NodeKind::Group { .. } => "Group",
            NodeKind::Image { .. } => "Image",
        }
    }

    fn default_size(&self) -> Size {
        match self {
            NodeKind::Prompt { .. } => PROMPT_DEFAULT_SIZE,
            NodeKind::Template { .. } => TEMPLATE_DEFAULT_SIZE,
            NodeKind::Group { .. } => GROUP_DEFAULT_SIZE,
            NodeKind::Image { .. } => IMAGE_DEFAULT_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub title: String,
    pub position: Point,
    pub size: Size,
    pub color: NodeColor,
    pub expanded: bool,
    /// Group container this node belongs to. Only non-Group nodes may carry
    /// one; when set, `position` is relative to the parent's origin.
    pub parent_group_id: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn bounds(&self) -> Rect {
        Rect::from_node(self.position, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub color: NodeColor,
    pub active: bool,
}

/// Partial-field merge for `Sheet::update_node`. Kind-specific fields apply
/// only when the node's kind matches; everything else is ignored.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub title: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub color: Option<NodeColor>,
    pub expanded: Option<bool>,
    /// `Some(None)` clears the parent, `Some(Some(id))` reparents.
    pub parent_group_id: Option<Option<String>>,
    pub content: Option<String>,
    pub template: Option<String>,
    pub values: Option<BTreeMap<String, String>>,
    pub edit_mode: Option<bool>,
    pub attached_to: Option<Option<String>>,
    pub anchor_point: Option<AnchorPoint>,
    pub opacity: Option<f32>,
    pub show_border: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Children of a group, in list order. Derived, never stored.
    pub fn children_of(&self, group_id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_group_id.as_deref() == Some(group_id))
            .collect()
    }

    pub fn create_node(&mut self, kind: NodeKind, position: Point, color: NodeColor) -> &Node {
        let node = Node {
            id: new_id(),
            title: kind.default_title().to_string(),
            position,
            size: kind.default_size(),
            color,
            expanded: true,
            parent_group_id: None,
            kind,
        };
        self.nodes.push(node);
        &self.nodes[self.nodes.len() - 1]
    }

    /// Merges the set fields of `patch` into the node. Unknown ids and
    /// kind-mismatched fields are ignored.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) {
        // Reparenting is validated against the rest of the sheet before the
        // mutable borrow: only non-Group nodes may gain a parent, and the
        // parent must be an existing Group.
        let parent_change = match patch.parent_group_id {
            Some(Some(ref pid)) => {
                let target_is_group = self.node(id).map(|n| n.kind.is_group()).unwrap_or(false);
                let parent_is_group = self.node(pid).map(|n| n.kind.is_group()).unwrap_or(false);
                if !target_is_group && parent_is_group {
                    Some(Some(pid.clone()))
                } else {
                    None
                }
            }
            Some(None) => Some(None),
            None => None,
        };

        let Some(node) = self.node_mut(id) else {
            return;
        };
        if let Some(title) = patch.title {
            node.title = title;
        }
        if let Some(position) = patch.position {
            node.position = position;
        }
        if let Some(size) = patch.size {
            node.size = size;
        }
        if let Some(color) = patch.color {
            node.color = color;
        }
        if let Some(expanded) = patch.expanded {
            node.expanded = expanded;
        }
        if let Some(parent) = parent_change {
            node.parent_group_id = parent;
        }
        match &mut node.kind {
            NodeKind::Prompt { content } => {
                if let Some(v) = patch.content {
                    *content = v;
                }
            }
            NodeKind::Template { template, values } => {
                if let Some(v) = patch.template {
                    *template = v;
                }
                if let Some(v) = patch.values {
                    *values = v;
                }
            }
            NodeKind::Group { edit_mode } => {
                if let Some(v) = patch.edit_mode {
                    *edit_mode = v;
                }
            }
            NodeKind::Image {
                attached_to,
                anchor_point,
                opacity,
                show_border,
                ..
            } => {
                if let Some(v) = patch.attached_to {
                    *attached_to = v;
                }
                if let Some(v) = patch.anchor_point {
                    *anchor_point = v;
                }
                if let Some(v) = patch.opacity {
                    *opacity = v;
                }
                if let Some(v) = patch.show_border {
                    *show_border = v;
                }
            }
        }
    }

    /// Removes a node and cascades: edges touching it are dropped, former
    /// children are re-anchored to absolute coordinates, and image
    /// attachments pointing at it are cleared.
    pub fn delete_node(&mut self, id: &str) {
        let Some(removed_origin) = self.node(id).map(|n| n.position) else {
            return;
        };
        self.nodes.retain(|n| n.id != id);
        self.edges
            .retain(|e| e.source_node_id != id && e.target_node_id != id);
        for node in &mut self.nodes {
            if node.parent_group_id.as_deref() == Some(id) {
                node.position = removed_origin.offset(node.position);
                node.parent_group_id = None;
            }
            if let NodeKind::Image { attached_to, .. } = &mut node.kind {
                if attached_to.as_deref() == Some(id) {
                    *attached_to = None;
                }
            }
        }
    }

    /// Connects two nodes. No-op `None` when either endpoint is absent. The
    /// new edge takes the source node's color and becomes active only when
    /// the target has no active incoming edge yet.
    pub fn create_edge(&mut self, source_id: &str, target_id: &str) -> Option<&Edge> {
        let color = self.node(source_id)?.color;
        if self.node(target_id).is_none() {
            return None;
        }
        let active = !self
            .edges
            .iter()
            .any(|e| e.target_node_id == target_id && e.active);
        self.edges.push(Edge {
            id: new_id(),
            source_node_id: source_id.to_string(),
            target_node_id: target_id.to_string(),
            color,
            active,
        });
        Some(&self.edges[self.edges.len() - 1])
    }

    pub fn delete_edge(&mut self, id: &str) {
        self.edges.retain(|e| e.id != id);
    }

    /// Clones a node under a fresh id, offset from the original and recolored
    /// at random from the rest of the palette. Every edge touching the
    /// original is duplicated with the touched endpoint remapped; copies of
    /// outgoing edges start inactive so an existing target never gains a
    /// second active incoming edge.
    pub fn duplicate_node(&mut self, id: &str) -> Option<&Node> {
        let original = self.node(id)?.clone();
        let mut dup = original.clone();
        dup.id = new_id();
        dup.position = dup.position.offset(DUPLICATE_OFFSET);
        dup.color = random_color_excluding(original.color);

        let touching: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| e.source_node_id == id || e.target_node_id == id)
            .cloned()
            .collect();
        for edge in touching {
            let incoming = edge.target_node_id == id;
            self.edges.push(Edge {
                id: new_id(),
                source_node_id: if edge.source_node_id == id {
                    dup.id.clone()
                } else {
                    edge.source_node_id
                },
                target_node_id: if incoming {
                    dup.id.clone()
                } else {
                    edge.target_node_id
                },
                color: dup.color,
                active: if incoming { edge.active } else { false },
            });
        }

        self.nodes.push(dup);
        Some(&self.nodes[self.nodes.len() - 1])
    }
}

fn random_color_excluding(exclude: NodeColor) -> NodeColor {
    use rand::Rng;
    let candidates: Vec<NodeColor> = PALETTE.iter().copied().filter(|c| *c != exclude).collect();
    let idx = rand::thread_rng().gen_range(0..candidates.len());
    candidates[idx]
}

/// All sheets plus the active selection; this is the whole persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub sheets: Vec<Sheet>,
    pub active_sheet_id: Option<String>,
}

impl Workspace {
    pub fn new() -> Self {
        let sheet = Sheet::new("Sheet 1");
        let active = sheet.id.clone();
        Self {
            sheets: vec![sheet],
            active_sheet_id: Some(active),
        }
    }

    pub fn add_sheet(&mut self, name: impl Into<String>) -> &Sheet {
        let sheet = Sheet::new(name);
        self.active_sheet_id = Some(sheet.id.clone());
        self.sheets.push(sheet);
        &self.sheets[self.sheets.len() - 1]
    }

    pub fn remove_sheet(&mut self, id: &str) {
        self.sheets.retain(|s| s.id != id);
        if self.active_sheet_id.as_deref() == Some(id) {
            self.active_sheet_id = self.sheets.first().map(|s| s.id.clone());
        }
    }

    pub fn set_active_sheet(&mut self, id: &str) {
        if self.sheets.iter().any(|s| s.id == id) {
            self.active_sheet_id = Some(id.to_string());
        }
    }

    pub fn active_sheet(&self) -> Option<&Sheet> {
        let id = self.active_sheet_id.as_deref()?;
        self.sheets.iter().find(|s| s.id == id)
    }

    pub fn active_sheet_mut(&mut self) -> Option<&mut Sheet> {
        let id = self.active_sheet_id.clone()?;
        self.sheets.iter_mut().find(|s| s.id == id)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
