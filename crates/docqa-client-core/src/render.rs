//! Text rendered into the page areas.

use crate::backend::{AnswerResult, DocumentSummary, StatusSummary};

pub const NO_DOCUMENTS_STATUS: &str = "No documents uploaded";
pub const EMPTY_DOCUMENT_LIST: &str = "No documents uploaded yet";
pub const STATUS_ERROR_TEXT: &str = "Error fetching status";
pub const DOCUMENTS_ERROR_TEXT: &str = "Error fetching documents";

#[must_use]
pub fn status_line(summary: &StatusSummary) -> String {
    if summary.documents == 0 {
        return NO_DOCUMENTS_STATUS.to_string();
    }
    format!(
        "System ready with {} {} ({} {})",
        summary.documents,
        pluralize(summary.documents, "document", "documents"),
        summary.chunks,
        pluralize(summary.chunks, "chunk", "chunks"),
    )
}

fn pluralize(count: u64, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 { singular } else { plural }
}

#[must_use]
pub fn document_line(document: &DocumentSummary) -> String {
    format!(
        "{} ({} chunks, Processed: {})",
        document.source,
        document.chunks,
        if document.processed { "Yes" } else { "No" }
    )
}

#[must_use]
pub fn document_lines(documents: &[DocumentSummary]) -> Vec<String> {
    if documents.is_empty() {
        return vec![EMPTY_DOCUMENT_LIST.to_string()];
    }
    documents.iter().map(document_line).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerPanel {
    Answer {
        answer: String,
        sources: String,
        model: String,
    },
    Error(String),
}

impl AnswerPanel {
    #[must_use]
    pub fn from_result(result: &AnswerResult) -> Self {
        Self::Answer {
            answer: result.answer.clone(),
            sources: result.sources.join(", "),
            model: result.llm_used.clone(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// `(label, value)` rows in display order. Error panels carry no label.
    #[must_use]
    pub fn rows(&self) -> Vec<(Option<&'static str>, String)> {
        match self {
            Self::Answer {
                answer,
                sources,
                model,
            } => vec![
                (Some("Answer:"), answer.clone()),
                (Some("Sources:"), sources.clone()),
                (Some("LLM Used:"), model.clone()),
            ],
            Self::Error(message) => vec![(None, format!("Error: {message}"))],
        }
    }
}

pub fn sign_in_failed_text(reason: &impl std::fmt::Display) -> String {
    format!("Failed to sign in: {reason}")
}

pub fn sign_out_failed_text(reason: &impl std::fmt::Display) -> String {
    format!("Failed to sign out: {reason}")
}

pub fn upload_failed_text(reason: &impl std::fmt::Display) -> String {
    format!("Failed to upload files: {reason}")
}

pub fn clear_failed_text(reason: &impl std::fmt::Display) -> String {
    format!("Failed to clear documents: {reason}")
}
