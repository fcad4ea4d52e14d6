use std::collections::BTreeMap;

use serde::Serialize;

use crate::taxonomy::loader::SkippedFragment;
use crate::taxonomy::{LinkSummary, NodeDefect};

#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    pub path: String,
    pub size_bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub patterns: Vec<String>,
    pub document_count: usize,
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub report_version: u32,
    pub generated_at: String,
    pub patterns: Vec<String>,
    pub document_count: usize,
    pub node_count: usize,
    pub valid_node_count: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub duplicate_ids_corrected: usize,
    pub link: LinkSummary,
    pub skipped_fragments: Vec<SkippedFragment>,
    pub defect_count: usize,
    pub defects: Vec<NodeDefect>,
}
