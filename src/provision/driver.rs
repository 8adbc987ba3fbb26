use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::builder::{build_node, current_id};
use super::cursor::ParseCursor;
use super::edges::EdgeExtractor;
use super::labels::SUB_ITEM_FALLBACK_CODE;
use super::markers::{Marker, MarkerClassifier, MarkerMatch};
use super::types::{EdgeCandidate, HierarchyLevel, JobContext, ProvisionNode};

#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub nodes: Vec<ProvisionNode>,
    pub edges: Vec<EdgeCandidate>,
    pub discarded_preamble_lines: usize,
    pub fallback_sub_item_count: usize,
}

#[derive(Debug)]
pub struct ParseRules {
    pub classifier: MarkerClassifier,
    pub edges: Option<EdgeExtractor>,
}

impl ParseRules {
    pub fn new() -> Result<Self> {
        let classifier = MarkerClassifier::new()?;
        let edges = match EdgeExtractor::new() {
            Ok(extractor) => Some(extractor),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "edge extraction disabled for this run");
                None
            }
        };

        Ok(Self { classifier, edges })
    }
}

#[derive(Debug)]
pub struct DocumentParser<'a> {
    job: &'a JobContext,
    classifier: &'a MarkerClassifier,
    edges: Option<&'a EdgeExtractor>,
    cursor: ParseCursor,
    output: ParsedDocument,
}

impl<'a> DocumentParser<'a> {
    pub fn new(job: &'a JobContext, rules: &'a ParseRules) -> Self {
        let edges = if job.emit_edges {
            rules.edges.as_ref()
        } else {
            None
        };

        Self {
            job,
            classifier: &rules.classifier,
            edges,
            cursor: ParseCursor::default(),
            output: ParsedDocument::default(),
        }
    }

    pub fn feed_line(&mut self, page_index: usize, raw_line: &str) -> Result<()> {
        let line = raw_line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let classified = self
            .classifier
            .classify(line, self.cursor.article_open())
            .with_context(|| format!("page {}: {}", page_index + 1, line))?;

        let body = match classified {
            MarkerMatch::NoMatch => line,
            MarkerMatch::Matched {
                marker,
                residual,
                title,
            } => {
                self.open(marker, title);
                if marker.level().is_structural() {
                    return Ok(());
                }
                residual
            }
        };

        if !body.is_empty() {
            self.accumulate(body, page_index);
        }

        Ok(())
    }

    pub fn feed_page(&mut self, page_index: usize, page_text: &str) -> Result<()> {
        for line in page_text.lines() {
            self.feed_line(page_index, line)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> ParsedDocument {
        self.flush();
        self.output
    }

    fn open(&mut self, marker: Marker, title: Option<&str>) {
        self.flush();
        self.cursor.open(marker);

        if let Marker::SubItem(label) = marker
            && label.code == SUB_ITEM_FALLBACK_CODE
        {
            self.output.fallback_sub_item_count += 1;
            warn!(
                doc_id = %self.job.doc_id,
                syllable = %label.syllable,
                code = SUB_ITEM_FALLBACK_CODE,
                "sub-item syllable outside the lookup table"
            );
        }

        if let Some(title) = title {
            self.cursor.article_title = Some(title.to_string());
        }
    }

    fn accumulate(&mut self, line: &str, page_index: usize) {
        self.cursor.push_body(line, page_index);

        if self.cursor.article_open()
            && let Some(title) = self.classifier.article_title(line)
        {
            self.cursor.article_title = Some(title.to_string());
        }

        if self.cursor.current_level() == HierarchyLevel::Document {
            return;
        }

        if let Some(extractor) = self.edges {
            let from_id = current_id(&self.cursor, self.job);
            extractor.scan_line(line, &from_id, &mut self.output.edges);
        }
    }

    fn flush(&mut self) {
        match build_node(&self.cursor, self.job) {
            Some(node) => self.output.nodes.push(node),
            None if self.cursor.has_buffer() => {
                self.output.discarded_preamble_lines += self.cursor.buffer.len();
                debug!(
                    doc_id = %self.job.doc_id,
                    lines = self.cursor.buffer.len(),
                    "discarded preamble text"
                );
            }
            None => {}
        }
        self.cursor.clear_buffer();
    }
}

pub fn parse_pages(job: &JobContext, rules: &ParseRules, pages: &[String]) -> Result<ParsedDocument> {
    let mut parser = DocumentParser::new(job, rules);
    for (page_index, page_text) in pages.iter().enumerate() {
        parser.feed_page(page_index, page_text)?;
    }
    Ok(parser.finish())
}
