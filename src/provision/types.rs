use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    Document,
    Chapter,
    Section,
    Article,
    Paragraph,
    Item,
    SubItem,
    SubSubItem,
}

impl HierarchyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            HierarchyLevel::Document => "document",
            HierarchyLevel::Chapter => "chapter",
            HierarchyLevel::Section => "section",
            HierarchyLevel::Article => "article",
            HierarchyLevel::Paragraph => "paragraph",
            HierarchyLevel::Item => "item",
            HierarchyLevel::SubItem => "sub_item",
            HierarchyLevel::SubSubItem => "sub_sub_item",
        }
    }

    pub fn is_structural(self) -> bool {
        matches!(
            self,
            HierarchyLevel::Chapter | HierarchyLevel::Section | HierarchyLevel::Article
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleNo {
    pub number: u32,
    pub branch: Option<u32>,
}

impl ArticleNo {
    pub fn display(self) -> String {
        match self.branch {
            Some(branch) => format!("제{}조의{}", self.number, branch),
            None => format!("제{}조", self.number),
        }
    }

    pub fn norm(self) -> String {
        match self.branch {
            Some(branch) => format!("{}-{}", self.number, branch),
            None => self.number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubItemLabel {
    pub syllable: char,
    pub code: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJob {
    #[serde(alias = "pdf")]
    pub source: PathBuf,
    pub doc_id: String,
    pub doc_type: String,
    #[serde(alias = "official_name")]
    pub official_name_ko: String,
    #[serde(default)]
    pub abbrev: Option<String>,
    #[serde(default)]
    pub promulgation_date: Option<String>,
    #[serde(default)]
    pub enforcement_date: Option<String>,
    #[serde(default)]
    pub emit_edges: bool,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JobContext {
    pub doc_id: String,
    pub doc_type: String,
    pub official_name_ko: String,
    pub abbrev: Option<String>,
    pub promulgation_date: Option<String>,
    pub enforcement_date: String,
    pub enforcement_compact: String,
    pub file_name: String,
    pub emit_edges: bool,
    pub uri: Option<String>,
}

impl JobContext {
    pub fn from_job(job: &DocumentJob) -> Result<Self> {
        for (field, value) in [
            ("doc_id", &job.doc_id),
            ("doc_type", &job.doc_type),
            ("official_name_ko", &job.official_name_ko),
        ] {
            if value.trim().is_empty() {
                bail!("document job is missing required field {field}");
            }
        }

        let doc_id = job.doc_id.trim();
        if !is_file_safe_doc_id(doc_id) {
            bail!(
                "doc_id {doc_id:?} may only contain A-Z, a-z, 0-9, '_', '.', '-' and must not contain '..'"
            );
        }

        let enforcement_raw = job
            .enforcement_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .with_context(|| format!("document job {} is missing enforcement_date", job.doc_id))?;
        let enforcement = parse_iso_date(enforcement_raw)
            .with_context(|| format!("invalid enforcement_date for {}", job.doc_id))?;

        let promulgation_date = match job.promulgation_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let parsed = parse_iso_date(raw)
                    .with_context(|| format!("invalid promulgation_date for {}", job.doc_id))?;
                Some(parsed.format("%Y-%m-%d").to_string())
            }
            _ => None,
        };

        let file_name = job
            .source
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid source file name: {}", job.source.display()))?;

        Ok(Self {
            doc_id: doc_id.to_string(),
            doc_type: job.doc_type.trim().to_string(),
            official_name_ko: job.official_name_ko.trim().to_string(),
            abbrev: job
                .abbrev
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned),
            promulgation_date,
            enforcement_date: enforcement.format("%Y-%m-%d").to_string(),
            enforcement_compact: enforcement.format("%Y%m%d").to_string(),
            file_name,
            emit_edges: job.emit_edges,
            uri: job.uri.clone(),
        })
    }
}

fn is_file_safe_doc_id(doc_id: &str) -> bool {
    !doc_id.contains("..")
        && doc_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("expected YYYY-MM-DD, got {raw:?}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitIndex {
    pub hang: Option<u32>,
    pub ho: Option<u32>,
    pub mok: Option<String>,
    pub semok: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMeta {
    pub file_name: String,
    pub page_range: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionNode {
    pub id: String,
    pub doc_id: String,
    pub doc_type: String,
    pub law_name_ko: String,
    pub abbrev: Option<String>,
    pub title: Option<String>,
    pub level: HierarchyLevel,
    pub path_display: Vec<String>,
    pub path_norm: Vec<String>,
    pub label_display: Option<String>,
    pub label_norm: Option<String>,
    pub text_raw: String,
    pub text_clean: String,
    pub parent_ids: Vec<String>,
    pub article_no: Option<u32>,
    pub chapter_no: Option<u32>,
    pub section_no: Option<u32>,
    pub unit_index: UnitIndex,
    pub effective_from: String,
    pub effective_to: Option<String>,
    pub is_current: bool,
    pub promulgation_date: Option<String>,
    pub enforcement_date: String,
    pub source: SourceMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Delegation,
    Elaboration,
    MutatisMutandis,
    CrossReference,
}

impl EdgeType {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Delegation => "delegation",
            EdgeType::Elaboration => "elaboration",
            EdgeType::MutatisMutandis => "mutatis_mutandis",
            EdgeType::CrossReference => "cross_reference",
        }
    }

    pub fn confidence(self) -> f64 {
        match self {
            EdgeType::CrossReference => 0.55,
            EdgeType::Delegation | EdgeType::Elaboration | EdgeType::MutatisMutandis => 0.70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeCandidate {
    pub edge_id: String,
    pub edge_type: EdgeType,
    pub from_id: String,
    pub to_id: Option<String>,
    pub anchors: Vec<String>,
    pub match_confidence: f64,
}
