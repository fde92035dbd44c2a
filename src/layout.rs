use std::collections::{HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::model::{NodeKind, Point, Rect, Sheet};

/// Recomputes every node's position and size in place: free nodes are ranked
/// into rows by a single layering pass over all edges (active or not), each
/// row is centered on the canvas axis, and groups land in their own rows
/// beneath. Child nodes keep their relative positions and ride with their
/// parent. Returns the bounding box of the result so the host can refit the
/// viewport.
pub fn auto_layout(sheet: &mut Sheet, expand: bool, config: &LayoutConfig) -> Rect {
    apply_sizes(sheet, expand, config);

    let free_ids: Vec<String> = sheet
        .nodes
        .iter()
        .filter(|n| n.parent_group_id.is_none() && !n.kind.is_group())
        .map(|n| n.id.clone())
        .collect();
    let group_ids: Vec<String> = sheet
        .nodes
        .iter()
        .filter(|n| n.kind.is_group())
        .map(|n| n.id.clone())
        .collect();

    let rows = layer_rows(sheet, &free_ids);

    let mut y = config.start_y;
    for row in &rows {
        y = place_row(sheet, row, y, config);
    }
    for group_id in &group_ids {
        y = place_row(sheet, std::slice::from_ref(group_id), y, config);
    }

    bounds(sheet)
}

fn apply_sizes(sheet: &mut Sheet, expand: bool, config: &LayoutConfig) {
    for node in &mut sheet.nodes {
        node.expanded = expand;
        node.size = if expand {
            match node.kind {
                NodeKind::Prompt { .. } => config.prompt_expanded_size,
                NodeKind::Template { .. } => config.template_expanded_size,
                NodeKind::Group { .. } => config.group_expanded_size,
                // Image extents are content-defined; only the pill is forced.
                NodeKind::Image { .. } => node.size,
            }
        } else {
            config.collapsed_size
        };
    }
}

/// Rank assignment over the free nodes. Row 0 holds the nodes with no
/// incoming edge; a node joins a later row the first time every one of its
/// incoming sources is already placed. Nodes that never qualify (cycle
/// members, nodes fed only by cycles) each get a singleton trailing row.
fn layer_rows(sheet: &Sheet, free_ids: &[String]) -> Vec<Vec<String>> {
    let free_set: HashSet<&str> = free_ids.iter().map(|s| s.as_str()).collect();
    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    for id in free_ids {
        incoming.insert(id.as_str(), Vec::new());
    }
    for edge in &sheet.edges {
        let source = edge.source_node_id.as_str();
        let target = edge.target_node_id.as_str();
        if free_set.contains(source) && free_set.contains(target) {
            if let Some(sources) = incoming.get_mut(target) {
                sources.push(source);
            }
        }
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut placed: HashSet<String> = HashSet::new();

    let roots: Vec<String> = free_ids
        .iter()
        .filter(|id| incoming[id.as_str()].is_empty())
        .cloned()
        .collect();
    if !roots.is_empty() {
        placed.extend(roots.iter().cloned());
        rows.push(roots);
    }

    loop {
        let admitted: Vec<String> = free_ids
            .iter()
            .filter(|id| {
                let sources = &incoming[id.as_str()];
                !placed.contains(id.as_str())
                    && !sources.is_empty()
                    && sources.iter().all(|s| placed.contains(*s))
            })
            .cloned()
            .collect();
        if admitted.is_empty() {
            break;
        }
        placed.extend(admitted.iter().cloned());
        rows.push(admitted);
    }

    for id in free_ids {
        if !placed.contains(id.as_str()) {
            rows.push(vec![id.clone()]);
        }
    }
    rows
}

/// Lays one row left to right, centered on the canvas axis. Returns the y
/// coordinate for the next row.
fn place_row(sheet: &mut Sheet, row: &[String], y: f32, config: &LayoutConfig) -> f32 {
    let sizes: Vec<(f32, f32)> = row
        .iter()
        .filter_map(|id| sheet.node(id))
        .map(|n| (n.size.width, n.size.height))
        .collect();
    if sizes.is_empty() {
        return y;
    }
    let total_width: f32 = sizes.iter().map(|(w, _)| w).sum::<f32>()
        + config.h_padding * (sizes.len() - 1) as f32;
    let row_height = sizes.iter().map(|(_, h)| *h).fold(0.0, f32::max);

    let mut x = config.canvas_center_x - total_width / 2.0;
    for id in row {
        if let Some(node) = sheet.node_mut(id) {
            let width = node.size.width;
            node.position = Point::new(x, y);
            x += width + config.h_padding;
        }
    }
    y + row_height + config.v_padding
}

/// Bounding box over every node, children resolved to absolute coordinates.
pub fn bounds(sheet: &Sheet) -> Rect {
    let mut acc: Option<Rect> = None;
    for node in &sheet.nodes {
        let origin = match node.parent_group_id.as_deref().and_then(|p| sheet.node(p)) {
            Some(parent) => parent.position.offset(node.position),
            None => node.position,
        };
        let rect = Rect::from_node(origin, node.size);
        acc = Some(match acc {
            Some(current) => current.union(&rect),
            None => rect,
        });
    }
    acc.unwrap_or(Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    })
}
