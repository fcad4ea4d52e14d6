use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::InventoryArgs;
use crate::model::{DocumentEntry, DocumentInventoryManifest};
use crate::util::{expand_patterns, now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.patterns)?;

    if args.dry_run {
        info!(
            document_count = manifest.document_count,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    write_json_pretty(&args.manifest_path, &manifest)?;
    info!(path = %args.manifest_path.display(), "wrote inventory manifest");
    info!(document_count = manifest.document_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(patterns: &[String]) -> Result<DocumentInventoryManifest> {
    let paths = expand_patterns(patterns)?;
    if paths.is_empty() {
        bail!("no XML documents match {}", patterns.join(", "));
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        documents.push(describe_document(&path)?);
    }

    Ok(DocumentInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        patterns: patterns.to_vec(),
        document_count: documents.len(),
        documents,
    })
}

fn describe_document(path: &Path) -> Result<DocumentEntry> {
    let size_bytes = path
        .metadata()
        .with_context(|| format!("failed to inspect {}", path.display()))?
        .len();

    Ok(DocumentEntry {
        path: path.display().to_string(),
        size_bytes,
        sha256: sha256_file(path)?,
    })
}
