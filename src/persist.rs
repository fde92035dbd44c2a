use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Edge, Node, Sheet, Workspace, new_id};

/// Key the whole-workspace snapshot lives under in the host's store.
pub const SNAPSHOT_KEY: &str = "prompt-canvas/workspace";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("input is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("import is missing a `nodes` array")]
    MissingNodes,
    #[error("import is missing an `edges` array")]
    MissingEdges,
}

/// Single-sheet interchange shape: `{ nodes, edges, exportedAt }`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetFile {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(default)]
    exported_at: Option<DateTime<Utc>>,
}

pub fn export_sheet(sheet: &Sheet) -> serde_json::Result<String> {
    let file = SheetFile {
        nodes: sheet.nodes.clone(),
        edges: sheet.edges.clone(),
        exported_at: Some(Utc::now()),
    };
    serde_json::to_string_pretty(&file)
}

/// Parses an exported sheet into a fresh sheet (new sheet id, imported node
/// and edge ids kept). Any failure leaves the caller's state untouched
/// because nothing is mutated until parsing has fully succeeded.
pub fn import_sheet(json: &str, name: impl Into<String>) -> Result<Sheet, ImportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("nodes").map(|v| v.is_array()) != Some(true) {
        return Err(ImportError::MissingNodes);
    }
    if value.get("edges").map(|v| v.is_array()) != Some(true) {
        return Err(ImportError::MissingEdges);
    }
    let file: SheetFile = serde_json::from_value(value)?;
    Ok(Sheet {
        id: new_id(),
        name: name.into(),
        nodes: file.nodes,
        edges: file.edges,
    })
}

/// Whole-state snapshot store contract: string keys, string values, no
/// partial writes. The host debounces; writes here are last-write-wins.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

pub fn save_workspace(store: &mut dyn KvStore, workspace: &Workspace) -> serde_json::Result<()> {
    let snapshot = serde_json::to_string(workspace)?;
    store.set(SNAPSHOT_KEY, snapshot);
    Ok(())
}

/// `Ok(None)` when no snapshot exists; a corrupt snapshot is an error and the
/// caller keeps whatever state it already has.
pub fn load_workspace(store: &dyn KvStore) -> Result<Option<Workspace>, ImportError> {
    let Some(snapshot) = store.get(SNAPSHOT_KEY) else {
        return Ok(None);
    };
    let workspace: Workspace = serde_json::from_str(&snapshot)?;
    Ok(Some(workspace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeColor, NodeKind, Point};
    use std::collections::HashMap;

    struct MemStore(HashMap<String, String>);

    impl KvStore for MemStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
        fn set(&mut self, key: &str, value: String) {
            self.0.insert(key.to_string(), value);
        }
    }

    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new("sample");
        let a = sheet
            .create_node(
                NodeKind::Prompt {
                    content: "Hello".to_string(),
                },
                Point::new(0.0, 0.0),
                NodeColor::Blue,
            )
            .id
            .clone();
        let b = sheet
            .create_node(
                NodeKind::Prompt {
                    content: "World".to_string(),
                },
                Point::new(0.0, 260.0),
                NodeColor::Green,
            )
            .id
            .clone();
        sheet.create_edge(&a, &b);
        sheet
    }

    #[test]
    fn export_import_round_trip() {
        let sheet = sample_sheet();
        let json = export_sheet(&sheet).unwrap();
        let imported = import_sheet(&json, "copy").unwrap();
        assert_ne!(imported.id, sheet.id);
        assert_eq!(imported.nodes, sheet.nodes);
        assert_eq!(imported.edges, sheet.edges);
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(matches!(
            import_sheet("not json at all", "x"),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn import_rejects_missing_collections() {
        assert!(matches!(
            import_sheet(r#"{"edges": []}"#, "x"),
            Err(ImportError::MissingNodes)
        ));
        assert!(matches!(
            import_sheet(r#"{"nodes": []}"#, "x"),
            Err(ImportError::MissingEdges)
        ));
    }

    #[test]
    fn workspace_snapshot_round_trip() {
        let mut store = MemStore(HashMap::new());
        assert!(load_workspace(&store).unwrap().is_none());

        let mut workspace = Workspace::new();
        workspace.sheets[0] = sample_sheet();
        workspace.active_sheet_id = Some(workspace.sheets[0].id.clone());
        save_workspace(&mut store, &workspace).unwrap();

        let loaded = load_workspace(&store).unwrap().unwrap();
        assert_eq!(loaded, workspace);
    }

    #[test]
    fn corrupt_snapshot_surfaces_error() {
        let mut store = MemStore(HashMap::new());
        store.set(SNAPSHOT_KEY, "{broken".to_string());
        assert!(load_workspace(&store).is_err());
    }
}
