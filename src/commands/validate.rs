use std::collections::BTreeMap;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::ValidateArgs;
use crate::commands::load::load_batch;
use crate::model::ValidationReport;
use crate::taxonomy::defects::is_valid;
use crate::taxonomy::{LoadReport, Registry, scan_defects};
use crate::util::{now_utc_string, write_json_pretty};

pub fn run(args: ValidateArgs) -> Result<()> {
    let mut registry = Registry::new();
    let load = load_batch(&mut registry, &args.patterns)?;
    let report = build_report(&registry, load, &args.patterns);

    for skipped in &report.skipped_fragments {
        warn!(
            document = %skipped.document,
            position = skipped.position,
            reason = %skipped.reason,
            "fragment not ingested"
        );
    }
    for defect in &report.defects {
        warn!(
            reference_id = %defect.reference_id,
            kind = %defect.kind,
            document = %defect.document,
            defect = ?defect.defect,
            "node defect"
        );
    }

    if let Some(path) = &args.report_path {
        write_json_pretty(path, &report)?;
        info!(path = %path.display(), "wrote validation report");
    }

    info!(
        nodes = report.node_count,
        defects = report.defect_count,
        skipped = report.skipped_fragments.len(),
        "validation completed"
    );

    if args.strict && (report.defect_count > 0 || !report.skipped_fragments.is_empty()) {
        bail!(
            "{} defects and {} skipped fragments found",
            report.defect_count,
            report.skipped_fragments.len()
        );
    }

    Ok(())
}

pub fn build_report(
    registry: &Registry,
    load: LoadReport,
    patterns: &[String],
) -> ValidationReport {
    let defects = scan_defects(registry);
    let valid_node_count = registry
        .all()
        .filter(|(id, _)| is_valid(registry, *id))
        .count();
    let nodes_by_kind = registry
        .count_by_kind()
        .into_iter()
        .map(|(kind, count)| (kind.as_str().to_string(), count))
        .collect::<BTreeMap<String, usize>>();

    ValidationReport {
        report_version: 1,
        generated_at: now_utc_string(),
        patterns: patterns.to_vec(),
        document_count: registry.documents().len(),
        node_count: registry.len(),
        valid_node_count,
        nodes_by_kind,
        duplicate_ids_corrected: registry.corrector().collision_count(),
        link: load.link,
        skipped_fragments: load.skipped,
        defect_count: defects.len(),
        defects,
    }
}
