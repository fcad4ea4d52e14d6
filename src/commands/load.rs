use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::LoadArgs;
use crate::taxonomy::{Kind, LoadReport, Loader, Registry};
use crate::util::expand_patterns;

pub fn run(args: LoadArgs) -> Result<()> {
    let mut registry = Registry::new();

    let first = load_batch(&mut registry, &args.patterns)?;
    log_report("initial", &first);

    if !args.then_patterns.is_empty() {
        if args.isolated {
            registry.reset();
            info!("registry cleared before second pass");
        }
        let second = load_batch(&mut registry, &args.then_patterns)?;
        log_report(if args.isolated { "isolated" } else { "cumulative" }, &second);
    }

    if registry.is_empty() {
        warn!("no nodes were registered");
    }

    for (kind, count) in registry.count_by_kind() {
        info!(kind = %kind, count, "nodes by kind");
    }

    for (_, node) in registry.all() {
        if node.raw_reference_id() != node.reference_id() {
            debug!(
                raw = %node.raw_reference_id(),
                corrected = %node.reference_id(),
                "duplicate reference id renamed"
            );
        }
    }

    for (id, root) in registry.by_kind(Kind::SubjectGrade) {
        info!(node = %root, children = registry.children_of(id).len(), "grade root");
    }

    for id in registry.orphans() {
        if let Some(node) = registry.node(id) {
            warn!(node = %node, "orphaned node");
        }
    }

    for reference_id in &args.show {
        show_node(&registry, reference_id);
    }

    info!(
        documents = registry.documents().len(),
        nodes = registry.len(),
        duplicate_ids_corrected = registry.corrector().collision_count(),
        "registry ready"
    );

    Ok(())
}

pub fn load_batch(registry: &mut Registry, patterns: &[String]) -> Result<LoadReport> {
    let paths = expand_patterns(patterns)?;
    info!(documents = paths.len(), "loading documents");

    Loader::new(registry)
        .load_paths(&paths)
        .with_context(|| format!("failed to load documents matching {}", patterns.join(", ")))
}

fn show_node(registry: &Registry, reference_id: &str) {
    let Some(node) = registry.get(reference_id) else {
        warn!(reference_id, "no node registered under this id");
        return;
    };

    let parent = node
        .parent()
        .and_then(|parent| registry.node(parent))
        .map(ToString::to_string)
        .unwrap_or_default();
    info!(node = %node, parent = %parent, children = node.children().len(), "node");
    for child in node.children().keys() {
        info!(reference_id = %child, "child");
    }
}

fn log_report(pass: &str, report: &LoadReport) {
    info!(
        pass,
        documents = report.documents,
        fragments = report.fragments,
        registered = report.registered,
        skipped = report.skipped.len(),
        linked = report.link.linked,
        roots = report.link.roots,
        deliberately_unlinked = report.link.deliberately_unlinked,
        orphans = report.link.orphans,
        "load pass finished"
    );
}
