use super::cursor::ParseCursor;
use super::ids::provision_id;
use super::types::{HierarchyLevel, JobContext, ProvisionNode, SourceMeta, UnitIndex};

pub fn build_node(cursor: &ParseCursor, job: &JobContext) -> Option<ProvisionNode> {
    if !cursor.has_buffer() {
        return None;
    }

    let level = cursor.current_level();
    if level == HierarchyLevel::Document {
        return None;
    }

    let text_raw = cursor.buffer.join("\n").trim().to_string();
    if text_raw.is_empty() {
        return None;
    }
    let text_clean = collapse_whitespace(&text_raw);

    let (label_display, label_norm) = match cursor.self_label() {
        Some((display, norm)) => (Some(display), Some(norm)),
        None => (None, None),
    };

    let start_page = cursor.start_page.unwrap_or(0);
    let end_page = cursor.end_page.unwrap_or(start_page);

    Some(ProvisionNode {
        id: current_id(cursor, job),
        doc_id: job.doc_id.clone(),
        doc_type: job.doc_type.clone(),
        law_name_ko: job.official_name_ko.clone(),
        abbrev: job.abbrev.clone(),
        title: cursor.article_heading(),
        level,
        path_display: cursor.path_display(),
        path_norm: cursor.path_norm(),
        label_display,
        label_norm,
        text_raw,
        text_clean,
        parent_ids: Vec::new(),
        article_no: cursor.article.map(|article| article.number),
        chapter_no: cursor.chapter,
        section_no: cursor.section,
        unit_index: UnitIndex {
            hang: cursor.paragraph,
            ho: cursor.item,
            mok: cursor.sub_item.map(|label| label.code.to_string()),
            semok: cursor.sub_sub_item,
        },
        effective_from: job.enforcement_date.clone(),
        effective_to: None,
        is_current: true,
        promulgation_date: job.promulgation_date.clone(),
        enforcement_date: job.enforcement_date.clone(),
        source: SourceMeta {
            file_name: job.file_name.clone(),
            page_range: [start_page + 1, end_page + 1],
        },
    })
}

pub fn current_id(cursor: &ParseCursor, job: &JobContext) -> String {
    provision_id(&job.doc_id, &cursor.segments(), &job.enforcement_compact)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}
