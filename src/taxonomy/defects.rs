use serde::Serialize;

use super::NodeId;
use super::kind::Kind;
use super::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "defect", rename_all = "snake_case")]
pub enum Defect {
    MissingCode,
    MissingStatement,
    InvalidGrades { grades: Vec<String> },
    Orphan { parent_reference_id: String },
    UnexpectedParentKind { parent_kind: Kind },
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeDefect {
    pub reference_id: String,
    pub kind: Kind,
    pub document: String,
    #[serde(flatten)]
    pub defect: Defect,
}

/// Lists every defect of every legitimate node. Run after linking.
pub fn scan_defects(registry: &Registry) -> Vec<NodeDefect> {
    registry
        .all()
        .filter(|(_, node)| !node.is_illegitimate())
        .flat_map(|(id, node)| {
            node_defects(registry, id)
                .into_iter()
                .map(move |defect| NodeDefect {
                    reference_id: node.reference_id().to_string(),
                    kind: node.kind(),
                    document: registry
                        .document_name(node.document())
                        .unwrap_or_default()
                        .to_string(),
                    defect,
                })
        })
        .collect()
}

pub fn node_defects(registry: &Registry, id: NodeId) -> Vec<Defect> {
    let Some(node) = registry.node(id) else {
        return Vec::new();
    };

    let mut defects = Vec::new();
    if node.code().is_err() {
        defects.push(Defect::MissingCode);
    }
    if node.statement().is_err() {
        defects.push(Defect::MissingStatement);
    }
    if !node.valid_grades() {
        defects.push(Defect::InvalidGrades {
            grades: node.grades().iter().cloned().collect(),
        });
    }
    if node.is_orphan() {
        defects.push(Defect::Orphan {
            parent_reference_id: node
                .resolved_parent_reference_id()
                .unwrap_or_default()
                .to_string(),
        });
    }
    if let Some(parent) = registry.parent_of(id) {
        if !node.kind().allowed_parents().contains(&parent.kind()) {
            defects.push(Defect::UnexpectedParentKind {
                parent_kind: parent.kind(),
            });
        }
    }
    defects
}

pub fn is_valid(registry: &Registry, id: NodeId) -> bool {
    registry
        .node(id)
        .is_some_and(|node| node.is_illegitimate() || node_defects(registry, id).is_empty())
}
