//! Turning extracted page content into analyzable chunks.

use serde::{Deserialize, Serialize};

use super::types::{ChunkKind, ContentChunk};

/// Headings this short (trimmed) or shorter are skipped.
pub const MIN_HEADING_CHARS: usize = 5;

/// Paragraphs this short (trimmed) or shorter are skipped.
pub const MIN_PARAGRAPH_CHARS: usize = 20;

/// Only the first paragraphs of the body are used.
pub const MAX_PARAGRAPHS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqPair {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Text already extracted from a page (headings, main body, FAQ entries).
pub struct PageContent {
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub faqs: Vec<FaqPair>,
}

impl PageContent {
    /// Chunks in document order: headings, then body paragraphs, then FAQ questions and answers.
    ///
    /// Body paragraphs are separated by blank lines.
    pub fn to_chunks(&self) -> Vec<ContentChunk> {
        let mut chunks = Vec::new();

        for heading in &self.headings {
            let heading = heading.trim();
            if heading.chars().count() > MIN_HEADING_CHARS {
                chunks.push(ContentChunk::new(heading, ChunkKind::Heading));
            }
        }

        if let Some(body) = &self.body {
            let body = body.replace("\r\n", "\n");
            chunks.extend(
                body.split("\n\n")
                    .map(str::trim)
                    .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
                    .take(MAX_PARAGRAPHS)
                    .map(|p| ContentChunk::new(p, ChunkKind::Paragraph)),
            );
        }

        for faq in &self.faqs {
            if !faq.question.trim().is_empty() {
                chunks.push(ContentChunk::new(faq.question.trim(), ChunkKind::FaqQuestion));
            }
            if !faq.answer.trim().is_empty() {
                chunks.push(ContentChunk::new(faq.answer.trim(), ChunkKind::FaqAnswer));
            }
        }

        chunks
    }
}
