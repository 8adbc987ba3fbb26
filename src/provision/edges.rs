use anyhow::{Context, Result};
use regex::Regex;

use super::types::{EdgeCandidate, EdgeType};

const ANCHOR_MAX_CHARS: usize = 120;

#[derive(Debug)]
pub struct EdgeExtractor {
    rules: Vec<(EdgeType, Regex)>,
}

impl EdgeExtractor {
    pub fn new() -> Result<Self> {
        let patterns = [
            (
                EdgeType::Delegation,
                r"(?:대통령령|시행령)으로\s*정(?:한다|하는)",
            ),
            (
                EdgeType::Elaboration,
                r"(?:시행규칙|규칙|총리령|[가-힣]+부령)으로\s*정(?:한다|하는)",
            ),
            (EdgeType::MutatisMutandis, r"준용한다"),
            (
                EdgeType::CrossReference,
                r"제\d+조(?:의\d+)?(?:제\d+항)?(?:제\d+호)?(?:에|를)?\s*(?:참조|따른다)",
            ),
        ];

        let mut rules = Vec::with_capacity(patterns.len());
        for (edge_type, pattern) in patterns {
            let regex = Regex::new(pattern).with_context(|| {
                format!("failed to compile {} edge rule", edge_type.as_str())
            })?;
            rules.push((edge_type, regex));
        }

        Ok(Self { rules })
    }

    pub fn scan_line(&self, line: &str, from_id: &str, out: &mut Vec<EdgeCandidate>) {
        for (edge_type, regex) in &self.rules {
            if !regex.is_match(line) {
                continue;
            }

            out.push(EdgeCandidate {
                edge_id: format!("e-{:06}", out.len() + 1),
                edge_type: *edge_type,
                from_id: from_id.to_string(),
                to_id: None,
                anchors: vec![anchor_excerpt(line)],
                match_confidence: edge_type.confidence(),
            });
        }
    }
}

fn anchor_excerpt(line: &str) -> String {
    line.chars().take(ANCHOR_MAX_CHARS).collect()
}
