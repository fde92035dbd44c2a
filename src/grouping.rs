use crate::config::GroupingConfig;
use crate::model::{NodeKind, Point, Sheet};

/// Drag-out rule, applied when a drag on a child node ends: once the child
/// overhangs its parent's bounds by more than the escape margin on any side,
/// it leaves the group and its position becomes absolute. Returns true when
/// the node was released.
pub fn release_dragged_child(sheet: &mut Sheet, node_id: &str, config: &GroupingConfig) -> bool {
    let Some((parent_origin, parent_size)) = sheet
        .node(node_id)
        .and_then(|n| n.parent_group_id.as_deref())
        .and_then(|pid| sheet.node(pid))
        .map(|p| (p.position, p.size))
    else {
        return false;
    };
    let Some(node) = sheet.node(node_id) else {
        return false;
    };

    let margin = config.escape_margin;
    let escaped = node.position.x + node.size.width < -margin
        || node.position.y + node.size.height < -margin
        || node.position.x > parent_size.width + margin
        || node.position.y > parent_size.height + margin;
    if !escaped {
        return false;
    }

    if let Some(node) = sheet.node_mut(node_id) {
        node.position = parent_origin.offset(node.position);
        node.parent_group_id = None;
    }
    true
}

/// Drag-in rule, applied when a drag on a free node ends: if its bounding
/// box intersects exactly one group, the group adopts it. The stored position
/// becomes relative to the group origin, clamped below the header band, and
/// a collapsed group pops open. Groups themselves are never captured; a drop
/// over zero or several groups changes nothing. Returns the adopting group's
/// id.
pub fn capture_dropped_node(
    sheet: &mut Sheet,
    node_id: &str,
    config: &GroupingConfig,
) -> Option<String> {
    let node_rect = {
        let node = sheet.node(node_id)?;
        if node.kind.is_group() || node.parent_group_id.is_some() {
            return None;
        }
        node.bounds()
    };

    let mut hits = sheet.nodes.iter().filter(|n| {
        n.kind.is_group() && n.id != node_id && n.bounds().intersects(&node_rect)
    });
    let group = hits.next()?;
    if hits.next().is_some() {
        return None;
    }
    let group_id = group.id.clone();
    let group_origin = group.position;
    let group_collapsed = !group.expanded;

    if let Some(node) = sheet.node_mut(node_id) {
        node.parent_group_id = Some(group_id.clone());
        node.position = Point::new(
            (node.position.x - group_origin.x).max(config.header_inset_x),
            (node.position.y - group_origin.y).max(config.header_inset_y),
        );
    }
    if group_collapsed {
        if let Some(group) = sheet.node_mut(&group_id) {
            group.expanded = true;
        }
    }
    Some(group_id)
}

/// Edit mode is pure interactivity state: the container stops acting as a
/// unit and its children come to the front. No geometry changes.
pub fn set_group_edit_mode(sheet: &mut Sheet, group_id: &str, edit: bool) {
    if let Some(node) = sheet.node_mut(group_id) {
        if let NodeKind::Group { edit_mode } = &mut node.kind {
            *edit_mode = edit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeColor, NodePatch};

    fn sheet_with_group() -> (Sheet, String, String) {
        let mut sheet = Sheet::new("test");
        let g = sheet
            .create_node(
                NodeKind::Group { edit_mode: false },
                Point::new(100.0, 100.0),
                NodeColor::Slate,
            )
            .id
            .clone();
        let p = sheet
            .create_node(
                NodeKind::Prompt {
                    content: "p".to_string(),
                },
                Point::new(0.0, 0.0),
                NodeColor::Blue,
            )
            .id
            .clone();
        (sheet, g, p)
    }

    #[test]
    fn child_inside_bounds_stays() {
        let (mut sheet, g, p) = sheet_with_group();
        sheet.update_node(
            &p,
            NodePatch {
                parent_group_id: Some(Some(g.clone())),
                position: Some(Point::new(40.0, 60.0)),
                ..NodePatch::default()
            },
        );
        assert!(!release_dragged_child(&mut sheet, &p, &GroupingConfig::default()));
        assert_eq!(sheet.node(&p).unwrap().parent_group_id.as_deref(), Some(g.as_str()));
    }

    #[test]
    fn child_dragged_past_margin_is_released_absolute() {
        let (mut sheet, g, p) = sheet_with_group();
        sheet.update_node(
            &p,
            NodePatch {
                parent_group_id: Some(Some(g.clone())),
                // Group default width is 420; anything past 420 + margin escapes.
                position: Some(Point::new(460.0, 20.0)),
                ..NodePatch::default()
            },
        );
        assert!(release_dragged_child(&mut sheet, &p, &GroupingConfig::default()));
        let node = sheet.node(&p).unwrap();
        assert_eq!(node.parent_group_id, None);
        assert_eq!(node.position, Point::new(560.0, 120.0));
    }

    #[test]
    fn drop_over_single_group_captures_with_header_clamp() {
        let (mut sheet, g, p) = sheet_with_group();
        // Overlapping the group's top-left corner: the relative position
        // would land inside the header band and gets clamped below it.
        sheet.update_node(
            &p,
            NodePatch {
                position: Some(Point::new(110.0, 105.0)),
                ..NodePatch::default()
            },
        );
        let adopted = capture_dropped_node(&mut sheet, &p, &GroupingConfig::default());
        assert_eq!(adopted.as_deref(), Some(g.as_str()));
        let node = sheet.node(&p).unwrap();
        assert_eq!(node.parent_group_id.as_deref(), Some(g.as_str()));
        assert_eq!(node.position, Point::new(12.0, 44.0));
    }

    #[test]
    fn drop_over_two_groups_is_ambiguous() {
        let (mut sheet, _g, p) = sheet_with_group();
        sheet.create_node(
            NodeKind::Group { edit_mode: false },
            Point::new(150.0, 150.0),
            NodeColor::Slate,
        );
        sheet.update_node(
            &p,
            NodePatch {
                position: Some(Point::new(200.0, 200.0)),
                ..NodePatch::default()
            },
        );
        assert!(capture_dropped_node(&mut sheet, &p, &GroupingConfig::default()).is_none());
        assert_eq!(sheet.node(&p).unwrap().parent_group_id, None);
    }

    #[test]
    fn groups_are_never_captured() {
        let (mut sheet, g, _p) = sheet_with_group();
        let other = sheet
            .create_node(
                NodeKind::Group { edit_mode: false },
                Point::new(120.0, 140.0),
                NodeColor::Slate,
            )
            .id
            .clone();
        assert!(capture_dropped_node(&mut sheet, &other, &GroupingConfig::default()).is_none());
        assert_eq!(sheet.node(&other).unwrap().parent_group_id, None);
        assert_eq!(sheet.node(&g).unwrap().parent_group_id, None);
    }

    #[test]
    fn capture_expands_collapsed_group() {
        let (mut sheet, g, p) = sheet_with_group();
        sheet.update_node(
            &g,
            NodePatch {
                expanded: Some(false),
                ..NodePatch::default()
            },
        );
        sheet.update_node(
            &p,
            NodePatch {
                position: Some(Point::new(200.0, 250.0)),
                ..NodePatch::default()
            },
        );
        capture_dropped_node(&mut sheet, &p, &GroupingConfig::default());
        assert!(sheet.node(&g).unwrap().expanded);
    }

    #[test]
    fn edit_mode_flips_without_geometry() {
        let (mut sheet, g, _p) = sheet_with_group();
        let before = sheet.node(&g).unwrap().position;
        set_group_edit_mode(&mut sheet, &g, true);
        let node = sheet.node(&g).unwrap();
        assert_eq!(node.position, before);
        assert!(matches!(node.kind, NodeKind::Group { edit_mode: true }));
    }
}
