use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::ConvertRunManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.out_dir.join("manifests");

    info!(out_dir = %args.out_dir.display(), "status requested");

    let Some(manifest_path) = latest_run_manifest(&manifest_dir)? else {
        warn!(path = %manifest_dir.display(), "no convert run manifest found");
        return Ok(());
    };

    let raw = fs::read(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let manifest: ConvertRunManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

    info!(
        path = %manifest_path.display(),
        run_id = %manifest.run_id,
        status = %manifest.status,
        format = %manifest.format,
        started_at = %manifest.started_at,
        updated_at = %manifest.updated_at,
        jobs = manifest.jobs.len(),
        "loaded convert run manifest"
    );

    for job in &manifest.jobs {
        if job.status == "failed" {
            warn!(
                doc_id = %job.doc_id,
                source = %job.source_file,
                reason = %job.failure_reason.as_deref().unwrap_or_default(),
                "document failed"
            );
            continue;
        }

        info!(
            doc_id = %job.doc_id,
            source = %job.source_file,
            nodes = job.node_count,
            edges = job.edge_count,
            discarded_preamble_lines = job.discarded_preamble_lines,
            fallback_sub_items = job.fallback_sub_item_count,
            "document converted"
        );
    }

    for warning in &manifest.warnings {
        warn!(warning = %warning, "run warning");
    }

    Ok(())
}

fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.is_dir() {
        return Ok(None);
    }

    let mut candidates = Vec::new();
    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();
        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("convert_run_") && name.ends_with(".json"))
            .unwrap_or(false);
        if is_run_manifest {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.pop())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::latest_run_manifest;

    #[test]
    fn latest_run_manifest_picks_newest_stamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "convert_run_20250101T000000Z.json",
            "convert_run_20250301T120000Z.json",
            "notes.json",
        ] {
            fs::write(dir.path().join(name), "{}").expect("write manifest");
        }

        let latest = latest_run_manifest(dir.path())
            .expect("scan manifests")
            .expect("manifest present");
        assert!(latest.ends_with("convert_run_20250301T120000Z.json"));
    }

    #[test]
    fn latest_run_manifest_handles_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("manifests");
        assert!(latest_run_manifest(&missing).expect("scan").is_none());
    }
}
