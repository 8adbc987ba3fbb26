use serde::{Deserialize, Serialize};

use crate::provision::DocumentJob;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsManifest {
    pub jobs: Vec<DocumentJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFileEntry {
    pub file_name: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub doc_id: String,
    pub doc_type: String,
    pub official_name_ko: String,
    pub abbrev: Option<String>,
    pub issuer: Option<String>,
    pub promulgation_no: Option<String>,
    pub promulgation_date: Option<String>,
    pub enforcement_date: Option<String>,
    pub source_files: Vec<SourceFileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndexRecord {
    pub id: String,
    #[serde(rename = "structData")]
    pub struct_data: SearchStructData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStructData {
    pub title: String,
    pub text: String,
    pub uri: String,
    pub law_name_ko: String,
    pub doc_type: String,
    pub level: String,
    pub path_display: String,
    pub version_date: String,
    pub doc_id: String,
    pub abbrev: Option<String>,
    pub path_norm: Vec<String>,
    pub article_no: Option<u32>,
    pub chapter_no: Option<u32>,
    pub section_no: Option<u32>,
    pub effective_from: String,
    pub promulgation_date: Option<String>,
    pub enforcement_date: String,
    pub source_file: String,
    pub page_range: [usize; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub doc_id: String,
    pub source_file: String,
    pub source_sha256: Option<String>,
    pub status: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub discarded_preamble_lines: usize,
    pub fallback_sub_item_count: usize,
    pub outputs: Vec<String>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub jobs_manifest_path: String,
    pub out_dir: String,
    pub format: String,
    pub jobs: Vec<JobReport>,
    pub warnings: Vec<String>,
}
