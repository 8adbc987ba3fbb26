use anyhow::{Context, Result};
use regex::{Captures, Regex};

use super::labels::{circled_ordinal, sub_item_label};
use super::types::{ArticleNo, HierarchyLevel, SubItemLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Chapter(u32),
    Section(u32),
    Article(ArticleNo),
    Paragraph(u32),
    Item(u32),
    SubItem(SubItemLabel),
    SubSubItem(u32),
}

impl Marker {
    pub fn level(self) -> HierarchyLevel {
        match self {
            Marker::Chapter(_) => HierarchyLevel::Chapter,
            Marker::Section(_) => HierarchyLevel::Section,
            Marker::Article(_) => HierarchyLevel::Article,
            Marker::Paragraph(_) => HierarchyLevel::Paragraph,
            Marker::Item(_) => HierarchyLevel::Item,
            Marker::SubItem(_) => HierarchyLevel::SubItem,
            Marker::SubSubItem(_) => HierarchyLevel::SubSubItem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerMatch<'a> {
    NoMatch,
    Matched {
        marker: Marker,
        residual: &'a str,
        title: Option<&'a str>,
    },
}

#[derive(Debug)]
pub struct MarkerClassifier {
    chapter: Regex,
    section: Regex,
    article: Regex,
    article_title: Regex,
    item: Regex,
    sub_item: Regex,
    sub_sub_item: Regex,
}

impl MarkerClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            chapter: Regex::new(r"^제\s*([0-9]+)\s*장")
                .context("failed to compile chapter marker regex")?,
            section: Regex::new(r"^제\s*([0-9]+)\s*절")
                .context("failed to compile section marker regex")?,
            article: Regex::new(r"^제\s*([0-9]+)\s*조(?:\s*의\s*([0-9]+))?")
                .context("failed to compile article marker regex")?,
            article_title: Regex::new(r"^제\s*[0-9]+\s*조(?:\s*의\s*[0-9]+)?\s*\(([^)]+)\)")
                .context("failed to compile article title regex")?,
            item: Regex::new(r"^([0-9]+)\.").context("failed to compile item marker regex")?,
            sub_item: Regex::new(r"^([가-힣])\.")
                .context("failed to compile sub-item marker regex")?,
            sub_sub_item: Regex::new(r"^([0-9]+)\)")
                .context("failed to compile sub-sub-item marker regex")?,
        })
    }

    pub fn classify<'a>(&self, line: &'a str, article_open: bool) -> Result<MarkerMatch<'a>> {
        if let Some(captures) = self.chapter.captures(line) {
            let number = parse_numeral(&captures, 1, "chapter")?;
            return Ok(matched(Marker::Chapter(number), line, &captures, None));
        }

        if let Some(captures) = self.section.captures(line) {
            let number = parse_numeral(&captures, 1, "section")?;
            return Ok(matched(Marker::Section(number), line, &captures, None));
        }

        if let Some(captures) = self.article.captures(line) {
            let number = parse_numeral(&captures, 1, "article")?;
            let branch = match captures.get(2) {
                Some(_) => Some(parse_numeral(&captures, 2, "article branch")?),
                None => None,
            };
            let title = self.article_title(line);
            return Ok(matched(
                Marker::Article(ArticleNo { number, branch }),
                line,
                &captures,
                title,
            ));
        }

        if let Some(first) = line.chars().next()
            && let Some(ordinal) = circled_ordinal(first)
        {
            return Ok(MarkerMatch::Matched {
                marker: Marker::Paragraph(ordinal),
                residual: line[first.len_utf8()..].trim(),
                title: None,
            });
        }

        if !article_open {
            return Ok(MarkerMatch::NoMatch);
        }

        if let Some(captures) = self.item.captures(line) {
            let number = parse_numeral(&captures, 1, "item")?;
            return Ok(matched(Marker::Item(number), line, &captures, None));
        }

        if let Some(captures) = self.sub_item.captures(line) {
            let syllable = captures
                .get(1)
                .and_then(|value| value.as_str().chars().next())
                .context("missing sub-item capture")?;
            let marker = Marker::SubItem(sub_item_label(syllable));
            return Ok(matched(marker, line, &captures, None));
        }

        if let Some(captures) = self.sub_sub_item.captures(line) {
            let number = parse_numeral(&captures, 1, "sub-sub-item")?;
            return Ok(matched(Marker::SubSubItem(number), line, &captures, None));
        }

        Ok(MarkerMatch::NoMatch)
    }

    pub fn article_title<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.article_title
            .captures(line)
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().trim())
            .filter(|value| !value.is_empty())
    }
}

fn matched<'a>(
    marker: Marker,
    line: &'a str,
    captures: &Captures<'a>,
    title: Option<&'a str>,
) -> MarkerMatch<'a> {
    let end = captures.get(0).map(|value| value.end()).unwrap_or(0);
    MarkerMatch::Matched {
        marker,
        residual: line[end..].trim(),
        title,
    }
}

fn parse_numeral(captures: &Captures<'_>, group: usize, kind: &str) -> Result<u32> {
    let raw = captures
        .get(group)
        .map(|value| value.as_str())
        .with_context(|| format!("missing {kind} numeral capture"))?;

    raw.parse::<u32>()
        .with_context(|| format!("unparsable {kind} numeral: {raw}"))
}
