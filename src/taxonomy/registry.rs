use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use super::corrector::{DuplicateIdCorrector, Owner};
use super::error::{Result, TaxonomyError};
use super::kind::Kind;
use super::node::Node;
use super::{DocumentId, NodeId};

/// Every node loaded so far, indexed by corrected reference id and by kind.
///
/// The registry owns the corrector so ids issued across load calls stay
/// unique until [`Registry::reset`].
#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<Node>,
    by_reference_id: HashMap<String, NodeId>,
    by_kind: BTreeMap<Kind, BTreeMap<String, NodeId>>,
    documents: Vec<String>,
    corrector: DuplicateIdCorrector,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    pub linked: usize,
    pub roots: usize,
    pub deliberately_unlinked: usize,
    pub orphans: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every node, document and correction.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.by_reference_id.clear();
        self.by_kind.clear();
        self.documents.clear();
        self.corrector.reset();
    }

    pub fn add_document(&mut self, name: &str) -> DocumentId {
        self.documents.push(name.to_string());
        DocumentId(self.documents.len() - 1)
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn document_name(&self, document: DocumentId) -> Option<&str> {
        self.documents.get(document.0).map(String::as_str)
    }

    /// Identity for the next node built for `document`.
    pub fn next_owner(&self, document: DocumentId) -> Owner {
        Owner {
            node: NodeId(self.nodes.len()),
            document,
        }
    }

    pub fn corrector(&self) -> &DuplicateIdCorrector {
        &self.corrector
    }

    pub fn corrector_mut(&mut self) -> &mut DuplicateIdCorrector {
        &mut self.corrector
    }

    pub fn register(&mut self, node: Node) -> Result<NodeId> {
        let reference_id = node.reference_id().to_string();
        if self.by_reference_id.contains_key(&reference_id) {
            return Err(TaxonomyError::DuplicateRegistration(reference_id));
        }

        let id = NodeId(self.nodes.len());
        self.by_kind
            .entry(node.kind())
            .or_default()
            .insert(reference_id.clone(), id);
        self.by_reference_id.insert(reference_id, id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Resolves every node's parent reference against the whole registry.
    ///
    /// Safe to repeat after further loads: child maps are keyed by id, so
    /// earlier edges are rewritten rather than duplicated.
    pub fn link_all(&mut self) -> LinkSummary {
        let mut summary = LinkSummary::default();

        for index in 0..self.nodes.len() {
            let child = NodeId(index);
            let Some(parent_reference) = self.nodes[index]
                .parent_reference_id(&mut self.corrector)
                .map(ToOwned::to_owned)
            else {
                summary.roots += 1;
                continue;
            };

            match self.by_reference_id.get(&parent_reference).copied() {
                Some(parent) if parent != child => {
                    let child_reference = self.nodes[index].reference_id().to_string();
                    self.nodes[parent.0].add_child(child_reference, child);
                    self.nodes[index].set_parent(parent);
                    summary.linked += 1;
                }
                _ if self.nodes[index].is_deliberately_unlinked() => {
                    summary.deliberately_unlinked += 1;
                }
                _ => {
                    debug!(
                        reference_id = %self.nodes[index].reference_id(),
                        parent_reference = %parent_reference,
                        "parent reference does not resolve"
                    );
                    summary.orphans += 1;
                }
            }
        }

        summary
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn id_of(&self, reference_id: &str) -> Option<NodeId> {
        self.by_reference_id.get(reference_id).copied()
    }

    pub fn get(&self, reference_id: &str) -> Option<&Node> {
        self.id_of(reference_id).and_then(|id| self.node(id))
    }

    /// Nodes of every kind in registration order.
    pub fn all(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Nodes of one kind ordered by reference id.
    pub fn by_kind(&self, kind: Kind) -> impl Iterator<Item = (NodeId, &Node)> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|ids| ids.values())
            .map(|id| (*id, &self.nodes[id.0]))
    }

    pub fn count_by_kind(&self) -> BTreeMap<Kind, usize> {
        Kind::ALL
            .into_iter()
            .map(|kind| (kind, self.by_kind.get(&kind).map_or(0, BTreeMap::len)))
            .collect()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        self.node(id)
            .and_then(Node::parent)
            .and_then(|parent| self.node(parent))
    }

    pub fn children_of(&self, id: NodeId) -> Vec<&Node> {
        self.node(id)
            .map(|node| {
                node.children()
                    .values()
                    .filter_map(|child| self.node(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn orphans(&self) -> Vec<NodeId> {
        self.all()
            .filter(|(_, node)| node.is_orphan())
            .map(|(id, _)| id)
            .collect()
    }
}
