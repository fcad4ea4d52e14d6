use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::error::{Result, TaxonomyError};
use super::kind::Kind;
use super::node::Node;
use super::registry::{LinkSummary, Registry};
use super::xml::{self, Element, XmlNode};
use super::{DocumentId, NodeId};

pub const LEVEL_PATHS: [&str; 2] = [
    "StandardHierarchyLevel/description",
    "StandardHierarchyLevel/Description",
];

/// A fragment that could not be ingested. The rest of its document still loads.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFragment {
    pub document: String,
    pub position: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub documents: usize,
    pub fragments: usize,
    pub registered: usize,
    pub skipped: Vec<SkippedFragment>,
    pub link: LinkSummary,
}

/// Feeds documents into a registry. Loads are cumulative: every call links
/// the whole registry, so parents and children may arrive in any order.
pub struct Loader<'a> {
    registry: &'a mut Registry,
}

impl<'a> Loader<'a> {
    pub fn new(registry: &'a mut Registry) -> Self {
        Self { registry }
    }

    pub fn load_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for path in paths {
            let path = path.as_ref();
            let entries = xml::read_entries(path)?;
            self.ingest_document(&path.display().to_string(), entries, &mut report)?;
        }
        Ok(self.finish(report))
    }

    /// Loads `(name, text)` pairs already held in memory.
    #[cfg(test)]
    pub fn load_documents(&mut self, documents: &[(&str, &str)]) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for (name, text) in documents {
            let entries = xml::parse_entries(name, text)?;
            self.ingest_document(name, entries, &mut report)?;
        }
        Ok(self.finish(report))
    }

    fn ingest_document(
        &mut self,
        name: &str,
        entries: Vec<Element>,
        report: &mut LoadReport,
    ) -> Result<()> {
        let document = self.registry.add_document(name);
        report.documents += 1;
        report.fragments += entries.len();

        for (position, entry) in entries.into_iter().enumerate() {
            match self.ingest_fragment(document, entry) {
                Ok(_) => report.registered += 1,
                Err(err) if err.is_fragment_local() => {
                    warn!(document = %name, position, error = %err, "skipped fragment");
                    report.skipped.push(SkippedFragment {
                        document: name.to_string(),
                        position,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        info!(document = %name, nodes = self.registry.len(), "loaded document");
        Ok(())
    }

    fn ingest_fragment(&mut self, document: DocumentId, entry: Element) -> Result<NodeId> {
        let kind = classify(&entry)?;
        let owner = self.registry.next_owner(document);
        let node = Node::new(owner, kind, entry, self.registry.corrector_mut())?;
        self.registry.register(node)
    }

    fn finish(&mut self, mut report: LoadReport) -> LoadReport {
        report.link = self.registry.link_all();
        info!(
            documents = report.documents,
            registered = report.registered,
            skipped = report.skipped.len(),
            linked = report.link.linked,
            orphans = report.link.orphans,
            "load complete"
        );
        report
    }
}

/// Reads the declared hierarchy level, new schema spelling first.
pub fn classify(entry: &Element) -> Result<Kind> {
    let level = LEVEL_PATHS
        .iter()
        .find_map(|path| entry.first_text(path))
        .ok_or_else(|| TaxonomyError::MissingField(LEVEL_PATHS[0].to_string()))?;
    Kind::classify(&level)
}
