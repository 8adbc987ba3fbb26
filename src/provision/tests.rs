use std::path::PathBuf;

use super::builder::build_node;
use super::cursor::ParseCursor;
use super::ids::{MIN_SEARCH_ID_LEN, provision_id, sanitize_search_id, search_index_id};
use super::labels::{circled_ordinal, display_paragraph, sub_item_label};
use super::markers::{Marker, MarkerClassifier, MarkerMatch};
use super::types::{ArticleNo, EdgeCandidate, EdgeType, HierarchyLevel};
use super::*;

fn job_with(emit_edges: bool) -> JobContext {
    JobContext::from_job(&DocumentJob {
        source: PathBuf::from("laws/산업안전보건법_20251001.pdf"),
        doc_id: "kr-osh-act".to_string(),
        doc_type: "법률".to_string(),
        official_name_ko: "산업안전보건법".to_string(),
        abbrev: Some("산안법".to_string()),
        promulgation_date: Some("2024-12-31".to_string()),
        enforcement_date: Some("2025-10-01".to_string()),
        emit_edges,
        uri: None,
    })
    .expect("valid job")
}

fn parse_lines(lines: &[&str], emit_edges: bool) -> ParsedDocument {
    let job = job_with(emit_edges);
    let rules = ParseRules::new().expect("rules");
    let pages = vec![lines.join("\n")];
    parse_pages(&job, &rules, &pages).expect("parse")
}

#[test]
fn opening_scenario_builds_paragraph_item_and_sub_item_nodes() {
    let parsed = parse_lines(
        &[
            "제1장 총칙",
            "제1조(목적) 이 법은",
            "① 이 법은 안전을 목적으로 한다",
            "1. 첫째",
            "가. 세부",
        ],
        false,
    );

    let levels = parsed
        .nodes
        .iter()
        .map(|node| node.level)
        .collect::<Vec<_>>();
    assert_eq!(
        levels,
        vec![
            HierarchyLevel::Paragraph,
            HierarchyLevel::Item,
            HierarchyLevel::SubItem
        ]
    );

    let deepest = parsed.nodes.last().expect("sub-item node");
    assert_eq!(deepest.id, "kr-osh-act:1:1:1:a:20251001");
    assert!(deepest.id.ends_with(":1:1:a:20251001"));
    assert_eq!(
        deepest.path_norm,
        vec!["jang:1", "jo:1", "hang:1", "ho:1", "mok:a"]
    );
    assert_eq!(
        deepest.path_display,
        vec!["제1장", "제1조", "①", "1.", "가."]
    );
    assert_eq!(deepest.label_display.as_deref(), Some("가."));
    assert_eq!(deepest.label_norm.as_deref(), Some("a"));
    assert_eq!(deepest.text_raw, "세부");

    let paragraph = &parsed.nodes[0];
    assert_eq!(paragraph.title.as_deref(), Some("제1조(목적)"));
    assert_eq!(paragraph.text_raw, "이 법은 안전을 목적으로 한다");
    assert_eq!(paragraph.chapter_no, Some(1));
    assert_eq!(paragraph.article_no, Some(1));
    assert!(paragraph.parent_ids.is_empty());
    assert_eq!(paragraph.effective_from, "2025-10-01");
    assert!(paragraph.effective_to.is_none());
    assert!(paragraph.is_current);
    assert_eq!(paragraph.source.file_name, "산업안전보건법_20251001.pdf");
}

#[test]
fn preamble_before_first_marker_is_discarded() {
    let parsed = parse_lines(
        &[
            "산업안전보건법",
            "[시행 2025. 10. 1.] [법률 제20000호]",
            "제1장 총칙",
            "제1조(목적)",
            "① 본문",
        ],
        false,
    );

    assert_eq!(parsed.nodes.len(), 1);
    assert_eq!(parsed.discarded_preamble_lines, 2);
    assert_eq!(parsed.nodes[0].text_raw, "본문");
}

#[test]
fn preamble_only_input_produces_no_nodes() {
    let parsed = parse_lines(&["법령 머리말", "1. 번호가 있는 서문"], true);
    assert!(parsed.nodes.is_empty());
    assert!(parsed.edges.is_empty());
    assert_eq!(parsed.discarded_preamble_lines, 2);
}

#[test]
fn item_markers_need_an_open_article() {
    let parsed = parse_lines(&["제1장 총칙", "1. 장 아래 번호", "제1조", "1. 조 아래 번호"], false);

    assert_eq!(parsed.nodes.len(), 2);
    assert_eq!(parsed.nodes[0].level, HierarchyLevel::Chapter);
    assert_eq!(parsed.nodes[0].text_raw, "1. 장 아래 번호");
    assert_eq!(parsed.nodes[0].id, "kr-osh-act:20251001");
    assert_eq!(parsed.nodes[1].level, HierarchyLevel::Item);
    assert_eq!(parsed.nodes[1].text_raw, "조 아래 번호");
}

#[test]
fn article_body_without_paragraph_becomes_article_node() {
    let parsed = parse_lines(
        &["제2조(정의)", "이 법에서 사용하는 용어의 뜻은", "다음과 같다."],
        false,
    );

    assert_eq!(parsed.nodes.len(), 1);
    let node = &parsed.nodes[0];
    assert_eq!(node.level, HierarchyLevel::Article);
    assert_eq!(node.id, "kr-osh-act:2:20251001");
    assert!(node.label_display.is_none());
    assert!(node.label_norm.is_none());
    assert_eq!(node.text_raw, "이 법에서 사용하는 용어의 뜻은\n다음과 같다.");
    assert_eq!(node.text_clean, "이 법에서 사용하는 용어의 뜻은 다음과 같다.");
}

#[test]
fn body_text_reconstructs_from_emitted_nodes() {
    let lines = [
        "머리말",
        "제1장 총칙",
        "제1조(목적) 무시되는 꼬리",
        "① 첫 항 본문",
        "이어지는 줄",
        "1. 호 본문",
        "가. 목 본문",
        "1) 세목 본문",
        "② 둘째 항",
        "제2조",
        "조 본문",
    ];
    let parsed = parse_lines(&lines, false);

    let emitted = parsed
        .nodes
        .iter()
        .map(|node| node.text_raw.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let expected = [
        "첫 항 본문",
        "이어지는 줄",
        "호 본문",
        "목 본문",
        "세목 본문",
        "둘째 항",
        "조 본문",
    ]
    .join("\n");

    assert_eq!(emitted, expected);
}

#[test]
fn empty_flush_does_not_emit_twice() {
    let parsed = parse_lines(&["제1조", "① 첫째", "②", "③ 셋째"], false);

    let labels = parsed
        .nodes
        .iter()
        .map(|node| node.label_norm.clone().unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["1", "3"]);

    let job = job_with(false);
    let mut cursor = ParseCursor::default();
    cursor.open(Marker::Article(ArticleNo {
        number: 4,
        branch: None,
    }));
    cursor.push_body("본문", 0);
    assert!(build_node(&cursor, &job).is_some());
    cursor.clear_buffer();
    assert!(build_node(&cursor, &job).is_none());
    assert!(cursor.start_page.is_none());
    assert!(cursor.end_page.is_none());
}

#[test]
fn identical_input_produces_identical_ids() {
    let lines = ["제1장 총칙", "제3조(정의)", "① 항", "1. 호", "가. 목", "1) 세목"];
    let first = parse_lines(&lines, true);
    let second = parse_lines(&lines, true);

    let first_ids = first.nodes.iter().map(|node| &node.id).collect::<Vec<_>>();
    let second_ids = second.nodes.iter().map(|node| &node.id).collect::<Vec<_>>();
    assert_eq!(first_ids, second_ids);
    assert_eq!(
        first_ids.last().map(|id| id.as_str()),
        Some("kr-osh-act:3:1:1:a:1p:20251001")
    );
}

#[test]
fn opening_section_keeps_chapter_and_clears_lower_levels() {
    let mut cursor = ParseCursor::default();
    cursor.open(Marker::Chapter(2));
    cursor.open(Marker::Section(1));
    cursor.open(Marker::Article(ArticleNo {
        number: 10,
        branch: None,
    }));
    cursor.article_title = Some("적용 범위".to_string());
    cursor.open(Marker::Paragraph(1));
    cursor.open(Marker::Item(2));
    cursor.open(Marker::SubItem(sub_item_label('나')));
    cursor.open(Marker::SubSubItem(3));
    cursor.push_body("세목", 0);

    cursor.open(Marker::Section(2));

    assert_eq!(cursor.chapter, Some(2));
    assert_eq!(cursor.section, Some(2));
    assert!(cursor.article.is_none());
    assert!(cursor.article_title.is_none());
    assert!(cursor.paragraph.is_none());
    assert!(cursor.item.is_none());
    assert!(cursor.sub_item.is_none());
    assert!(cursor.sub_sub_item.is_none());
    assert!(!cursor.has_buffer());
    assert_eq!(cursor.current_level(), HierarchyLevel::Section);
}

#[test]
fn opening_article_keeps_chapter_and_section() {
    let mut cursor = ParseCursor::default();
    cursor.open(Marker::Chapter(1));
    cursor.open(Marker::Section(3));
    cursor.open(Marker::Article(ArticleNo {
        number: 7,
        branch: None,
    }));
    cursor.article_title = Some("목적".to_string());
    cursor.open(Marker::Paragraph(2));
    cursor.open(Marker::Item(1));

    cursor.open(Marker::Article(ArticleNo {
        number: 8,
        branch: None,
    }));

    assert_eq!(cursor.chapter, Some(1));
    assert_eq!(cursor.section, Some(3));
    assert_eq!(cursor.article.map(|article| article.number), Some(8));
    assert!(cursor.article_title.is_none());
    assert!(cursor.paragraph.is_none());
    assert!(cursor.item.is_none());
    assert_eq!(cursor.current_level(), HierarchyLevel::Article);
}

#[test]
fn sibling_item_closes_previous_item() {
    let parsed = parse_lines(&["제1조", "1. 첫째", "둘째 줄", "2. 둘째"], false);

    assert_eq!(parsed.nodes.len(), 2);
    assert_eq!(parsed.nodes[0].text_raw, "첫째\n둘째 줄");
    assert_eq!(parsed.nodes[0].id, "kr-osh-act:1:1:20251001");
    assert_eq!(parsed.nodes[1].id, "kr-osh-act:1:2:20251001");
}

#[test]
fn page_range_spans_pages_and_is_one_based() {
    let job = job_with(false);
    let rules = ParseRules::new().expect("rules");
    let pages = vec![
        "제1조(목적)\n① 첫 페이지에서 시작하여".to_string(),
        "\n둘째 페이지로 이어진다\n".to_string(),
        "② 셋째 페이지".to_string(),
    ];
    let parsed = parse_pages(&job, &rules, &pages).expect("parse");

    assert_eq!(parsed.nodes.len(), 2);
    assert_eq!(parsed.nodes[0].source.page_range, [1, 2]);
    assert_eq!(parsed.nodes[1].source.page_range, [3, 3]);
}

#[test]
fn branch_article_keeps_distinct_identity() {
    let parsed = parse_lines(&["제5조(정의)", "본조", "제5조의2(적용 제외)", "가지조"], false);

    assert_eq!(parsed.nodes.len(), 2);
    let branch = &parsed.nodes[1];
    assert_eq!(branch.id, "kr-osh-act:5-2:20251001");
    assert_eq!(branch.article_no, Some(5));
    assert_eq!(branch.path_display, vec!["제5조의2"]);
    assert_eq!(branch.path_norm, vec!["jo:5-2"]);
    assert_eq!(branch.title.as_deref(), Some("제5조의2(적용 제외)"));
    assert_ne!(parsed.nodes[0].id, branch.id);
}

#[test]
fn unknown_sub_item_syllable_uses_fallback_code() {
    let parsed = parse_lines(&["제1조", "1. 호", "거. 표에 없는 목"], false);

    assert_eq!(parsed.fallback_sub_item_count, 1);
    let node = parsed.nodes.last().expect("sub-item node");
    assert_eq!(node.unit_index.mok.as_deref(), Some(SUB_ITEM_FALLBACK_CODE));
    assert_eq!(node.label_display.as_deref(), Some("거."));
    assert_eq!(node.id, "kr-osh-act:1:1:zz:20251001");
}

#[test]
fn sub_sub_item_is_suffixed_in_identifier_only() {
    let parsed = parse_lines(&["제9조", "① 항", "1. 호", "가. 목", "3) 세목"], false);

    let node = parsed.nodes.last().expect("sub-sub-item node");
    assert_eq!(node.level, HierarchyLevel::SubSubItem);
    assert_eq!(node.label_display.as_deref(), Some("3)"));
    assert_eq!(node.label_norm.as_deref(), Some("3p"));
    assert_eq!(node.path_norm.last().map(String::as_str), Some("semok:3"));
    assert_eq!(node.unit_index.semok, Some(3));
    assert!(node.id.ends_with(":a:3p:20251001"));
}

#[test]
fn oversized_marker_numeral_fails_the_document() {
    let job = job_with(false);
    let rules = ParseRules::new().expect("rules");
    let pages = vec!["제1조\n99999999999. 범위를 넘는 호".to_string()];

    let err = parse_pages(&job, &rules, &pages).expect_err("overflow should fail");
    let message = format!("{err:#}");
    assert!(message.contains("page 1"));
    assert!(message.contains("item numeral"));
}

#[test]
fn delegation_edge_anchors_to_open_article() {
    let parsed = parse_lines(
        &["제2조(위임)", "그 밖에 필요한 사항은 대통령령으로 정한다."],
        true,
    );

    assert_eq!(parsed.edges.len(), 1);
    let edge = &parsed.edges[0];
    assert_eq!(edge.edge_type, EdgeType::Delegation);
    assert_eq!(edge.edge_id, "e-000001");
    assert_eq!(edge.from_id, "kr-osh-act:2:20251001");
    assert_eq!(edge.from_id, parsed.nodes[0].id);
    assert!(edge.to_id.is_none());
    assert_eq!(edge.anchors, vec!["그 밖에 필요한 사항은 대통령령으로 정한다."]);
    assert!((edge.match_confidence - 0.70).abs() < f64::EPSILON);
}

#[test]
fn edge_rules_are_independent_and_numbered_in_order() {
    let parsed = parse_lines(
        &[
            "제3조",
            "① 제5조에 따른다. 그 절차는 고용노동부령으로 정한다.",
            "② 제7조를 준용한다.",
        ],
        true,
    );

    let kinds = parsed
        .edges
        .iter()
        .map(|edge| (edge.edge_id.as_str(), edge.edge_type, edge.from_id.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            ("e-000001", EdgeType::Elaboration, "kr-osh-act:3:1:20251001"),
            ("e-000002", EdgeType::CrossReference, "kr-osh-act:3:1:20251001"),
            ("e-000003", EdgeType::MutatisMutandis, "kr-osh-act:3:2:20251001"),
        ]
    );
    assert!((parsed.edges[1].match_confidence - 0.55).abs() < f64::EPSILON);
}

#[test]
fn edges_stay_off_when_job_disables_them() {
    let parsed = parse_lines(&["제2조", "대통령령으로 정한다."], false);
    assert_eq!(parsed.nodes.len(), 1);
    assert!(parsed.edges.is_empty());
}

#[test]
fn edge_anchor_is_truncated() {
    let long_line = format!("{} 대통령령으로 정한다.", "가".repeat(200));
    let parsed = parse_lines(&["제1조", &long_line], true);

    assert_eq!(parsed.edges.len(), 1);
    assert_eq!(parsed.edges[0].anchors[0].chars().count(), 120);
    assert_eq!(parsed.nodes[0].text_raw, long_line);
}

#[test]
fn body_line_with_article_heading_replaces_title() {
    let parsed = parse_lines(&["제3조(목적)", "① 제7조(벌칙) 조항을 본다"], false);

    assert_eq!(parsed.nodes[0].title.as_deref(), Some("제3조(벌칙)"));
}

#[test]
fn classifier_prefers_higher_levels_and_strips_markers() {
    let classifier = MarkerClassifier::new().expect("classifier");

    match classifier.classify("제 12 조 (정의) 본문", false).expect("classify") {
        MarkerMatch::Matched {
            marker,
            residual,
            title,
        } => {
            assert_eq!(
                marker,
                Marker::Article(ArticleNo {
                    number: 12,
                    branch: None
                })
            );
            assert_eq!(title, Some("정의"));
            assert_eq!(residual, "(정의) 본문");
        }
        MarkerMatch::NoMatch => panic!("expected article marker"),
    }

    match classifier.classify("⑳ 스무째 항", false).expect("classify") {
        MarkerMatch::Matched {
            marker, residual, ..
        } => {
            assert_eq!(marker, Marker::Paragraph(20));
            assert_eq!(residual, "스무째 항");
        }
        MarkerMatch::NoMatch => panic!("expected paragraph marker"),
    }

    assert_eq!(
        classifier.classify("2) 세목", false).expect("classify"),
        MarkerMatch::NoMatch
    );
    assert_eq!(
        classifier.classify("일반 본문", true).expect("classify"),
        MarkerMatch::NoMatch
    );
}

#[test]
fn label_tables_cover_documented_ranges() {
    assert_eq!(circled_ordinal('①'), Some(1));
    assert_eq!(circled_ordinal('⑳'), Some(20));
    assert_eq!(circled_ordinal('1'), None);
    assert_eq!(display_paragraph(3), "③");
    assert_eq!(display_paragraph(21), "(21)");
    assert_eq!(sub_item_label('가').code, "a");
    assert_eq!(sub_item_label('하').code, "n");
    assert_eq!(sub_item_label('거').code, SUB_ITEM_FALLBACK_CODE);
}

#[test]
fn provision_id_orders_segments_and_skips_outer_levels() {
    let segments = vec![
        (HierarchyLevel::SubItem, "b".to_string()),
        (HierarchyLevel::Chapter, "1".to_string()),
        (HierarchyLevel::Article, "4".to_string()),
        (HierarchyLevel::Section, "2".to_string()),
        (HierarchyLevel::Item, "3".to_string()),
    ];

    assert_eq!(
        provision_id("kr-osh-dec", &segments, "20250621"),
        "kr-osh-dec:4:3:b:20250621"
    );
    assert_eq!(provision_id("kr-osh-dec", &[], "20250621"), "kr-osh-dec:20250621");
}

#[test]
fn search_index_id_is_sanitized_and_bounded() {
    let segments = vec![
        (HierarchyLevel::Article, "5-2".to_string()),
        (HierarchyLevel::Paragraph, "1".to_string()),
    ];
    assert_eq!(
        search_index_id("kr osh/act", &segments, "20251001", 120),
        "kr_osh_act_5-2_1_20251001"
    );

    assert_eq!(sanitize_search_id("__법령__기준__", 120).len(), 12);
    assert!(sanitize_search_id("__법령__기준__", 120).starts_with("doc_"));
    assert_eq!(sanitize_search_id("a//b::c", 120), "a_b_c");

    let prefix = "x".repeat(200);
    let first = sanitize_search_id(&format!("{prefix}_first"), 40);
    let second = sanitize_search_id(&format!("{prefix}_second"), 40);
    assert!(first.len() <= 40);
    assert!(second.len() <= 40);
    assert_ne!(first, second);
    assert_eq!(&first[..30], &second[..30]);

    let clamped = sanitize_search_id(&"y".repeat(50), 4);
    assert_eq!(clamped.len(), MIN_SEARCH_ID_LEN);
    assert!(clamped.starts_with("yyyyyyy_"));

    for max_len in [16, 24, 64, 120] {
        let id = sanitize_search_id(&"가-나_다".repeat(80), max_len);
        assert!(id.len() <= max_len, "{id} exceeds {max_len}");
        assert!(
            id.chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        );
    }
}

#[test]
fn node_identity_can_be_rebuilt_from_record() {
    let parsed = parse_lines(
        &["제1장 총칙", "제5조의2", "① 항", "1. 호", "다. 목", "2) 세목"],
        false,
    );

    for node in &parsed.nodes {
        let rebuilt = provision_id(
            &node.doc_id,
            &node.identity_segments(),
            &node.enforcement_compact(),
        );
        assert_eq!(rebuilt, node.id);
    }

    let deepest = parsed.nodes.last().expect("node");
    assert_eq!(deepest.search_index_id(120), "kr-osh-act_5-2_1_1_c_2p_20251001");
}

#[test]
fn job_without_enforcement_date_is_rejected() {
    let mut job = DocumentJob {
        source: PathBuf::from("rule.txt"),
        doc_id: "kr-osh-rul".to_string(),
        doc_type: "시행규칙".to_string(),
        official_name_ko: "산업안전보건법 시행규칙".to_string(),
        abbrev: None,
        promulgation_date: None,
        enforcement_date: None,
        emit_edges: false,
        uri: None,
    };
    let err = JobContext::from_job(&job).expect_err("missing date");
    assert!(format!("{err:#}").contains("enforcement_date"));

    job.enforcement_date = Some("2025/07/01".to_string());
    assert!(JobContext::from_job(&job).is_err());

    job.enforcement_date = Some("2025-07-01".to_string());
    let context = JobContext::from_job(&job).expect("valid job");
    assert_eq!(context.enforcement_compact, "20250701");
    assert!(context.promulgation_date.is_none());
}

#[test]
fn node_serializes_with_record_field_names() {
    let parsed = parse_lines(&["제1조(목적)", "① 가", "1. 나", "가. 다"], false);
    let value = serde_json::to_value(parsed.nodes.last().expect("node")).expect("serialize");

    assert_eq!(value["level"], "sub_item");
    assert_eq!(value["law_name_ko"], "산업안전보건법");
    assert_eq!(value["abbrev"], "산안법");
    assert_eq!(value["unit_index"]["mok"], "a");
    assert_eq!(value["unit_index"]["hang"], 1);
    assert!(value["unit_index"]["semok"].is_null());
    assert!(value["effective_to"].is_null());
    assert_eq!(value["source"]["page_range"], serde_json::json!([1, 1]));
    assert_eq!(value["parent_ids"], serde_json::json!([]));

    let edge = EdgeCandidate {
        edge_id: "e-000001".to_string(),
        edge_type: EdgeType::MutatisMutandis,
        from_id: "kr-osh-act:1:20251001".to_string(),
        to_id: None,
        anchors: vec!["준용한다".to_string()],
        match_confidence: 0.7,
    };
    let value = serde_json::to_value(&edge).expect("serialize edge");
    assert_eq!(value["edge_type"], "mutatis_mutandis");
    assert!(value["to_id"].is_null());
}

#[test]
fn doc_id_must_be_a_plain_file_name_stem() {
    let mut job = DocumentJob {
        source: PathBuf::from("act.txt"),
        doc_id: "kr-osh-act.v2".to_string(),
        doc_type: "법률".to_string(),
        official_name_ko: "산업안전보건법".to_string(),
        abbrev: None,
        promulgation_date: None,
        enforcement_date: Some("2025-10-01".to_string()),
        emit_edges: false,
        uri: None,
    };
    assert!(JobContext::from_job(&job).is_ok());

    for doc_id in ["../escaped", "laws/act", "laws\\act", "kr..act", "산안법", "kr osh"] {
        job.doc_id = doc_id.to_string();
        let err = JobContext::from_job(&job).expect_err("unsafe doc_id");
        assert!(format!("{err:#}").contains("doc_id"), "{doc_id}");
    }
}

#[test]
fn shared_rules_number_edges_per_document() {
    let job = job_with(true);
    let rules = ParseRules::new().expect("rules");
    let pages = vec!["제1조\n① 대통령령으로 정한다.\n② 준용한다.".to_string()];

    for _ in 0..2 {
        let parsed = parse_pages(&job, &rules, &pages).expect("parse");
        let ids: Vec<&str> = parsed.edges.iter().map(|edge| edge.edge_id.as_str()).collect();
        assert_eq!(ids, vec!["e-000001", "e-000002"]);
    }
}
