use super::labels::{
    display_item, display_paragraph, display_sub_item, display_sub_sub_item, norm_sub_sub_item,
};
use super::markers::Marker;
use super::types::{ArticleNo, HierarchyLevel, SubItemLabel};

#[derive(Debug, Default, Clone)]
pub struct ParseCursor {
    pub chapter: Option<u32>,
    pub section: Option<u32>,
    pub article: Option<ArticleNo>,
    pub article_title: Option<String>,
    pub paragraph: Option<u32>,
    pub item: Option<u32>,
    pub sub_item: Option<SubItemLabel>,
    pub sub_sub_item: Option<u32>,
    pub buffer: Vec<String>,
    pub start_page: Option<usize>,
    pub end_page: Option<usize>,
}

impl ParseCursor {
    pub fn article_open(&self) -> bool {
        self.article.is_some()
    }

    pub fn has_buffer(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn current_level(&self) -> HierarchyLevel {
        if self.sub_sub_item.is_some() {
            HierarchyLevel::SubSubItem
        } else if self.sub_item.is_some() {
            HierarchyLevel::SubItem
        } else if self.item.is_some() {
            HierarchyLevel::Item
        } else if self.paragraph.is_some() {
            HierarchyLevel::Paragraph
        } else if self.article.is_some() {
            HierarchyLevel::Article
        } else if self.section.is_some() {
            HierarchyLevel::Section
        } else if self.chapter.is_some() {
            HierarchyLevel::Chapter
        } else {
            HierarchyLevel::Document
        }
    }

    pub fn reset_from(&mut self, level: HierarchyLevel) {
        if level <= HierarchyLevel::Chapter {
            self.chapter = None;
        }
        if level <= HierarchyLevel::Section {
            self.section = None;
        }
        if level <= HierarchyLevel::Article {
            self.article = None;
            self.article_title = None;
        }
        if level <= HierarchyLevel::Paragraph {
            self.paragraph = None;
        }
        if level <= HierarchyLevel::Item {
            self.item = None;
        }
        if level <= HierarchyLevel::SubItem {
            self.sub_item = None;
        }
        if level <= HierarchyLevel::SubSubItem {
            self.sub_sub_item = None;
        }
        self.clear_buffer();
    }

    pub fn open(&mut self, marker: Marker) {
        self.reset_from(marker.level());
        match marker {
            Marker::Chapter(number) => self.chapter = Some(number),
            Marker::Section(number) => self.section = Some(number),
            Marker::Article(article) => self.article = Some(article),
            Marker::Paragraph(ordinal) => self.paragraph = Some(ordinal),
            Marker::Item(ordinal) => self.item = Some(ordinal),
            Marker::SubItem(label) => self.sub_item = Some(label),
            Marker::SubSubItem(ordinal) => self.sub_sub_item = Some(ordinal),
        }
    }

    pub fn push_body(&mut self, line: &str, page_index: usize) {
        if self.buffer.is_empty() {
            self.start_page = Some(page_index);
        }
        self.end_page = Some(page_index);
        self.buffer.push(line.to_string());
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.start_page = None;
        self.end_page = None;
    }

    pub fn segments(&self) -> Vec<(HierarchyLevel, String)> {
        let mut segments = Vec::new();
        if let Some(chapter) = self.chapter {
            segments.push((HierarchyLevel::Chapter, chapter.to_string()));
        }
        if let Some(section) = self.section {
            segments.push((HierarchyLevel::Section, section.to_string()));
        }
        if let Some(article) = self.article {
            segments.push((HierarchyLevel::Article, article.norm()));
        }
        if let Some(paragraph) = self.paragraph {
            segments.push((HierarchyLevel::Paragraph, paragraph.to_string()));
        }
        if let Some(item) = self.item {
            segments.push((HierarchyLevel::Item, item.to_string()));
        }
        if let Some(label) = self.sub_item {
            segments.push((HierarchyLevel::SubItem, label.code.to_string()));
        }
        if let Some(ordinal) = self.sub_sub_item {
            segments.push((HierarchyLevel::SubSubItem, norm_sub_sub_item(ordinal)));
        }
        segments
    }

    pub fn path_display(&self) -> Vec<String> {
        let mut path = Vec::new();
        if let Some(chapter) = self.chapter {
            path.push(format!("제{chapter}장"));
        }
        if let Some(section) = self.section {
            path.push(format!("제{section}절"));
        }
        if let Some(article) = self.article {
            path.push(article.display());
        }
        if let Some(paragraph) = self.paragraph {
            path.push(display_paragraph(paragraph));
        }
        if let Some(item) = self.item {
            path.push(display_item(item));
        }
        if let Some(label) = self.sub_item {
            path.push(display_sub_item(label));
        }
        if let Some(ordinal) = self.sub_sub_item {
            path.push(display_sub_sub_item(ordinal));
        }
        path
    }

    pub fn path_norm(&self) -> Vec<String> {
        let mut path = Vec::new();
        if let Some(chapter) = self.chapter {
            path.push(format!("jang:{chapter}"));
        }
        if let Some(section) = self.section {
            path.push(format!("jeol:{section}"));
        }
        if let Some(article) = self.article {
            path.push(format!("jo:{}", article.norm()));
        }
        if let Some(paragraph) = self.paragraph {
            path.push(format!("hang:{paragraph}"));
        }
        if let Some(item) = self.item {
            path.push(format!("ho:{item}"));
        }
        if let Some(label) = self.sub_item {
            path.push(format!("mok:{}", label.code));
        }
        if let Some(ordinal) = self.sub_sub_item {
            path.push(format!("semok:{ordinal}"));
        }
        path
    }

    pub fn self_label(&self) -> Option<(String, String)> {
        match self.current_level() {
            HierarchyLevel::Paragraph => self
                .paragraph
                .map(|ordinal| (display_paragraph(ordinal), ordinal.to_string())),
            HierarchyLevel::Item => self
                .item
                .map(|ordinal| (display_item(ordinal), ordinal.to_string())),
            HierarchyLevel::SubItem => self
                .sub_item
                .map(|label| (display_sub_item(label), label.code.to_string())),
            HierarchyLevel::SubSubItem => self
                .sub_sub_item
                .map(|ordinal| (display_sub_sub_item(ordinal), norm_sub_sub_item(ordinal))),
            _ => None,
        }
    }

    pub fn article_heading(&self) -> Option<String> {
        let article = self.article?;
        let title = self.article_title.as_deref()?;
        Some(format!("{}({})", article.display(), title))
    }
}
