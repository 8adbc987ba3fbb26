use crate::model::{DocumentMeta, SearchIndexRecord, SearchStructData, SourceFileEntry};
use crate::provision::{JobContext, ProvisionNode, display_paragraph};

pub(super) fn build_document_meta(job: &JobContext, source_sha256: &str) -> DocumentMeta {
    DocumentMeta {
        doc_id: job.doc_id.clone(),
        doc_type: job.doc_type.clone(),
        official_name_ko: job.official_name_ko.clone(),
        abbrev: job.abbrev.clone(),
        issuer: None,
        promulgation_no: None,
        promulgation_date: job.promulgation_date.clone(),
        enforcement_date: Some(job.enforcement_date.clone()),
        source_files: vec![SourceFileEntry {
            file_name: job.file_name.clone(),
            sha256: source_sha256.to_string(),
        }],
    }
}

pub(super) fn build_search_record(
    node: &ProvisionNode,
    job: &JobContext,
    max_id_len: usize,
) -> SearchIndexRecord {
    SearchIndexRecord {
        id: node.search_index_id(max_id_len),
        struct_data: SearchStructData {
            title: search_title(node, job),
            text: node.text_clean.clone(),
            uri: job.uri.clone().unwrap_or_else(|| job.file_name.clone()),
            law_name_ko: node.law_name_ko.clone(),
            doc_type: node.doc_type.clone(),
            level: node.level.as_str().to_string(),
            path_display: node.path_display.join(" > "),
            version_date: node.enforcement_date.clone(),
            doc_id: node.doc_id.clone(),
            abbrev: node.abbrev.clone(),
            path_norm: node.path_norm.clone(),
            article_no: node.article_no,
            chapter_no: node.chapter_no,
            section_no: node.section_no,
            effective_from: node.effective_from.clone(),
            promulgation_date: node.promulgation_date.clone(),
            enforcement_date: node.enforcement_date.clone(),
            source_file: node.source.file_name.clone(),
            page_range: node.source.page_range,
        },
    }
}

pub(super) fn search_title(node: &ProvisionNode, job: &JobContext) -> String {
    let paragraph_suffix = node
        .unit_index
        .hang
        .map(|hang| format!(" {}", display_paragraph(hang)))
        .unwrap_or_default();

    if let Some(heading) = &node.title {
        return format!("{} {}{}", job.official_name_ko, heading, paragraph_suffix);
    }

    if node.article_no.is_some() {
        let index = usize::from(node.chapter_no.is_some()) + usize::from(node.section_no.is_some());
        if let Some(article) = node.path_display.get(index) {
            return format!("{} {}{}", job.official_name_ko, article, paragraph_suffix);
        }
    }

    if node.path_display.is_empty() {
        return job.official_name_ko.clone();
    }

    format!("{} {}", job.official_name_ko, node.path_display.join(" > "))
}
