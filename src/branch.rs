use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{NodeKind, Sheet};
use crate::template;

/// Makes the named edge the sole active edge into its target: every sibling
/// sharing the target is deactivated. Unknown ids are a no-op.
pub fn set_active(sheet: &mut Sheet, edge_id: &str) {
    let Some(target) = sheet
        .edge(edge_id)
        .map(|e| e.target_node_id.clone())
    else {
        return;
    };
    for edge in &mut sheet.edges {
        if edge.target_node_id == target {
            edge.active = edge.id == edge_id;
        }
    }
}

/// Turns a single edge off. Never disturbs siblings.
pub fn deactivate(sheet: &mut Sheet, edge_id: &str) {
    if let Some(edge) = sheet.edges.iter_mut().find(|e| e.id == edge_id) {
        edge.active = false;
    }
}

/// Traversal seeds: non-Group nodes with at least one outgoing active edge
/// and no incoming active edge, in node-list order.
pub fn active_roots(sheet: &Sheet) -> Vec<&str> {
    let mut has_outgoing: HashSet<&str> = HashSet::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for edge in sheet.edges.iter().filter(|e| e.active) {
        has_outgoing.insert(edge.source_node_id.as_str());
        has_incoming.insert(edge.target_node_id.as_str());
    }
    sheet
        .nodes
        .iter()
        .filter(|n| {
            !n.kind.is_group()
                && has_outgoing.contains(n.id.as_str())
                && !has_incoming.contains(n.id.as_str())
        })
        .map(|n| n.id.as_str())
        .collect()
}

/// Breadth-first walk over the active-edge subgraph, collecting each visited
/// node's text. Prompt nodes contribute their content, Template nodes their
/// rendered template; Group and Image nodes contribute nothing. Non-empty
/// pieces are joined with a blank line, in visitation order. A visited set
/// keeps cycles from re-emitting or looping.
pub fn compute_active_path_text(sheet: &Sheet, start_node_id: Option<&str>) -> String {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in sheet.edges.iter().filter(|e| e.active) {
        adjacency
            .entry(edge.source_node_id.as_str())
            .or_default()
            .push(edge.target_node_id.as_str());
    }

    let seeds: Vec<&str> = match start_node_id {
        Some(id) => vec![id],
        None => active_roots(sheet),
    };

    let mut queue: VecDeque<&str> = seeds.into_iter().collect();
    let mut visited: HashSet<&str> = queue.iter().copied().collect();
    let mut pieces: Vec<String> = Vec::new();

    while let Some(id) = queue.pop_front() {
        if let Some(node) = sheet.node(id) {
            match &node.kind {
                NodeKind::Prompt { content } => {
                    if !content.is_empty() {
                        pieces.push(content.clone());
                    }
                }
                NodeKind::Template { template, values } => {
                    let rendered = template::render(template, values);
                    if !rendered.is_empty() {
                        pieces.push(rendered);
                    }
                }
                NodeKind::Group { .. } | NodeKind::Image { .. } => {}
            }
        }
        if let Some(next) = adjacency.get(id) {
            for &target in next {
                if visited.insert(target) {
                    queue.push_back(target);
                }
            }
        }
    }

    pieces.join("\n\n")
}
