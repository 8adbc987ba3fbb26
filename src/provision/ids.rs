use super::labels::norm_sub_sub_item;
use super::types::{HierarchyLevel, ProvisionNode};
use crate::util::sha256_hex;

pub const DEFAULT_SEARCH_ID_MAX_LEN: usize = 120;
pub const MIN_SEARCH_ID_LEN: usize = 16;

const IDENTITY_LEVELS: [HierarchyLevel; 5] = [
    HierarchyLevel::Article,
    HierarchyLevel::Paragraph,
    HierarchyLevel::Item,
    HierarchyLevel::SubItem,
    HierarchyLevel::SubSubItem,
];

fn id_parts(doc_id: &str, segments: &[(HierarchyLevel, String)], date_compact: &str) -> Vec<String> {
    let mut parts = vec![doc_id.to_string()];
    for level in IDENTITY_LEVELS {
        if let Some((_, value)) = segments.iter().find(|(candidate, _)| *candidate == level) {
            parts.push(value.clone());
        }
    }
    parts.push(date_compact.to_string());
    parts
}

pub fn provision_id(
    doc_id: &str,
    segments: &[(HierarchyLevel, String)],
    date_compact: &str,
) -> String {
    id_parts(doc_id, segments, date_compact).join(":")
}

pub fn search_index_id(
    doc_id: &str,
    segments: &[(HierarchyLevel, String)],
    date_compact: &str,
    max_len: usize,
) -> String {
    sanitize_search_id(&id_parts(doc_id, segments, date_compact).join("_"), max_len)
}

pub fn sanitize_search_id(raw: &str, max_len: usize) -> String {
    let max_len = max_len.max(MIN_SEARCH_ID_LEN);
    let mut safe = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            ch
        } else {
            '_'
        };
        if mapped == '_' && safe.ends_with('_') {
            continue;
        }
        safe.push(mapped);
    }
    let mut safe = safe.trim_matches('_').to_string();

    if safe.len() > max_len {
        let hash = short_hash(raw);
        let keep = max_len.saturating_sub(hash.len() + 1);
        safe = format!("{}_{}", safe[..keep].trim_end_matches('_'), hash);
        safe = safe.trim_matches('_').to_string();
    }

    if safe.is_empty() {
        return format!("doc_{}", short_hash(raw));
    }

    safe
}

impl ProvisionNode {
    pub fn identity_segments(&self) -> Vec<(HierarchyLevel, String)> {
        let mut segments = Vec::new();
        if let Some(article) = self
            .path_norm
            .iter()
            .find_map(|segment| segment.strip_prefix("jo:"))
        {
            segments.push((HierarchyLevel::Article, article.to_string()));
        }
        if let Some(hang) = self.unit_index.hang {
            segments.push((HierarchyLevel::Paragraph, hang.to_string()));
        }
        if let Some(ho) = self.unit_index.ho {
            segments.push((HierarchyLevel::Item, ho.to_string()));
        }
        if let Some(mok) = &self.unit_index.mok {
            segments.push((HierarchyLevel::SubItem, mok.clone()));
        }
        if let Some(semok) = self.unit_index.semok {
            segments.push((HierarchyLevel::SubSubItem, norm_sub_sub_item(semok)));
        }
        segments
    }

    pub fn enforcement_compact(&self) -> String {
        self.enforcement_date.replace('-', "")
    }

    pub fn search_index_id(&self, max_len: usize) -> String {
        search_index_id(
            &self.doc_id,
            &self.identity_segments(),
            &self.enforcement_compact(),
            max_len,
        )
    }
}

fn short_hash(value: &str) -> String {
    sha256_hex(value.as_bytes())[..8].to_string()
}
