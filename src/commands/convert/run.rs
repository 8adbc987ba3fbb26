use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use super::pages::load_pages;
use super::records::{build_document_meta, build_search_record};
use crate::cli::{ConvertArgs, OutputFormat};
use crate::model::{ConvertRunManifest, JobReport, JobsManifest};
use crate::provision::{
    DocumentJob, JobContext, ParseRules, ParsedDocument, SUB_ITEM_FALLBACK_CODE, parse_pages,
};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
    write_jsonl,
};

pub fn run(args: ConvertArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    ensure_directory(&args.out_dir)?;
    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        args.out_dir.join("manifests").join(format!(
            "convert_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    let jobs_manifest = load_jobs_manifest(&args.jobs)?;
    let jobs_base = args
        .jobs
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    info!(
        run_id = %run_id,
        jobs = jobs_manifest.jobs.len(),
        out_dir = %args.out_dir.display(),
        format = args.format.as_str(),
        "starting convert"
    );

    let rules = ParseRules::new()?;
    let mut reports = Vec::with_capacity(jobs_manifest.jobs.len());
    let mut warnings = Vec::new();

    for job in &jobs_manifest.jobs {
        info!(doc_id = %job.doc_id, source = %job.source.display(), "processing document");

        let report = match convert_job(job, &jobs_base, &rules, &args) {
            Ok(report) => report,
            Err(err) => {
                error!(doc_id = %job.doc_id, error = %format!("{err:#}"), "document job failed");
                failed_report(job, &err)
            }
        };

        if report.fallback_sub_item_count > 0 {
            warnings.push(format!(
                "{}: {} sub-item markers mapped to fallback code {}",
                report.doc_id, report.fallback_sub_item_count, SUB_ITEM_FALLBACK_CODE
            ));
        }
        reports.push(report);
    }

    let failed = reports
        .iter()
        .filter(|report| report.status == "failed")
        .count();

    let manifest = ConvertRunManifest {
        manifest_version: 1,
        run_id,
        status: if failed == 0 {
            "completed".to_string()
        } else {
            "completed_with_failures".to_string()
        },
        started_at,
        updated_at: now_utc_string(),
        command: render_convert_command(&args),
        jobs_manifest_path: args.jobs.display().to_string(),
        out_dir: args.out_dir.display().to_string(),
        format: args.format.as_str().to_string(),
        jobs: reports,
        warnings,
    };

    write_json_pretty(&run_manifest_path, &manifest)?;
    info!(path = %run_manifest_path.display(), "wrote convert run manifest");

    if failed > 0 {
        bail!(
            "{failed} of {} document jobs failed; see {}",
            manifest.jobs.len(),
            run_manifest_path.display()
        );
    }

    info!(documents = manifest.jobs.len(), "convert completed");
    Ok(())
}

pub(super) fn load_jobs_manifest(path: &Path) -> Result<JobsManifest> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: JobsManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if manifest.jobs.is_empty() {
        bail!("no document jobs listed in {}", path.display());
    }

    let mut seen = BTreeSet::new();
    for job in &manifest.jobs {
        let doc_id = job.doc_id.trim().to_string();
        if !seen.insert(doc_id.clone()) {
            bail!(
                "doc_id {doc_id} is listed more than once in {}; its output files would collide",
                path.display()
            );
        }
    }

    Ok(manifest)
}

pub(super) fn resolve_source(source: &Path, jobs_base: &Path) -> PathBuf {
    if source.is_relative() {
        jobs_base.join(source)
    } else {
        source.to_path_buf()
    }
}

pub(super) fn convert_job(
    job: &DocumentJob,
    jobs_base: &Path,
    rules: &ParseRules,
    args: &ConvertArgs,
) -> Result<JobReport> {
    let context = JobContext::from_job(job)?;
    let source_path = resolve_source(&job.source, jobs_base);
    if !source_path.is_file() {
        bail!("source file not found: {}", source_path.display());
    }

    let source_sha256 = sha256_file(&source_path)?;
    let pages = load_pages(&source_path, args.max_pages)?;
    let parsed = parse_pages(&context, rules, &pages)
        .with_context(|| format!("failed to parse {}", source_path.display()))?;

    if args.strict_sub_items && parsed.fallback_sub_item_count > 0 {
        bail!(
            "{} sub-item markers in {} are outside the sub-item table",
            parsed.fallback_sub_item_count,
            context.doc_id
        );
    }

    let outputs = write_outputs(&context, &parsed, &source_sha256, args)?;

    info!(
        doc_id = %context.doc_id,
        pages = pages.len(),
        nodes = parsed.nodes.len(),
        edges = parsed.edges.len(),
        "document converted"
    );

    Ok(JobReport {
        doc_id: context.doc_id,
        source_file: context.file_name,
        source_sha256: Some(source_sha256),
        status: "completed".to_string(),
        node_count: parsed.nodes.len(),
        edge_count: parsed.edges.len(),
        discarded_preamble_lines: parsed.discarded_preamble_lines,
        fallback_sub_item_count: parsed.fallback_sub_item_count,
        outputs: outputs
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
        failure_reason: None,
    })
}

fn write_outputs(
    context: &JobContext,
    parsed: &ParsedDocument,
    source_sha256: &str,
    args: &ConvertArgs,
) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::new();
    if let Err(err) = stage_outputs(context, parsed, source_sha256, args, &mut staged) {
        discard_staged(&staged);
        return Err(err);
    }

    let mut outputs = Vec::with_capacity(staged.len());
    for (index, (partial, path)) in staged.iter().enumerate() {
        if let Err(err) = fs::rename(partial, path) {
            discard_staged(&staged[index..]);
            return Err(err).with_context(|| format!("failed to publish {}", path.display()));
        }
        info!(path = %path.display(), "wrote output");
        outputs.push(path.clone());
    }

    Ok(outputs)
}

fn stage_outputs(
    context: &JobContext,
    parsed: &ParsedDocument,
    source_sha256: &str,
    args: &ConvertArgs,
    staged: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<()> {
    match args.format {
        OutputFormat::Provisions => {
            let provisions_path = args
                .out_dir
                .join(format!("{}_provisions.jsonl", context.doc_id));
            stage_jsonl(provisions_path, &parsed.nodes, staged)?;

            let documents_path = args
                .out_dir
                .join(format!("{}_documents.jsonl", context.doc_id));
            stage_jsonl(
                documents_path,
                &[build_document_meta(context, source_sha256)],
                staged,
            )?;

            if context.emit_edges && !parsed.edges.is_empty() {
                let edges_path = args.out_dir.join(format!("{}_edges.jsonl", context.doc_id));
                stage_jsonl(edges_path, &parsed.edges, staged)?;
            } else {
                info!(
                    doc_id = %context.doc_id,
                    emit_edges = context.emit_edges,
                    candidates = parsed.edges.len(),
                    "edges file not written"
                );
            }
        }
        OutputFormat::SearchIndex => {
            let max_id_len = usize::try_from(args.max_id_len)
                .context("max id length does not fit this platform")?;
            let records = parsed
                .nodes
                .iter()
                .map(|node| build_search_record(node, context, max_id_len))
                .collect::<Vec<_>>();
            let search_path = args.out_dir.join(format!("search_{}.jsonl", context.doc_id));
            stage_jsonl(search_path, &records, staged)?;
        }
    }

    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

fn stage_jsonl<T: Serialize>(
    path: PathBuf,
    rows: &[T],
    staged: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<()> {
    let partial = partial_path(&path);
    if let Err(err) = write_jsonl(&partial, rows) {
        discard_staged(&[(partial, path)]);
        return Err(err);
    }
    staged.push((partial, path));
    Ok(())
}

fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (partial, _) in staged {
        if partial.is_file()
            && let Err(err) = fs::remove_file(partial)
        {
            warn!(path = %partial.display(), error = %err, "failed to remove partial output");
        }
    }
}

fn failed_report(job: &DocumentJob, err: &anyhow::Error) -> JobReport {
    let source_file = job
        .source
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    JobReport {
        doc_id: job.doc_id.clone(),
        source_file,
        source_sha256: None,
        status: "failed".to_string(),
        node_count: 0,
        edge_count: 0,
        discarded_preamble_lines: 0,
        fallback_sub_item_count: 0,
        outputs: Vec::new(),
        failure_reason: Some(format!("{err:#}")),
    }
}

fn render_convert_command(args: &ConvertArgs) -> String {
    let mut parts = vec![
        "lawnodes".to_string(),
        "convert".to_string(),
        "--jobs".to_string(),
        args.jobs.display().to_string(),
        "--out-dir".to_string(),
        args.out_dir.display().to_string(),
        "--format".to_string(),
        args.format.as_str().to_string(),
        "--max-id-len".to_string(),
        args.max_id_len.to_string(),
    ];

    if args.strict_sub_items {
        parts.push("--strict-sub-items".to_string());
    }
    if let Some(max_pages) = args.max_pages {
        parts.push("--max-pages".to_string());
        parts.push(max_pages.to_string());
    }
    if let Some(path) = &args.run_manifest_path {
        parts.push("--run-manifest-path".to_string());
        parts.push(path.display().to_string());
    }

    parts.join(" ")
}
