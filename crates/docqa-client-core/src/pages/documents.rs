use tracing::{debug, info, warn};

use super::{InFlight, Page, PageSurface, Slot};
use crate::backend::{BackendClient, UploadOutcome};
use crate::identity::{IdentityAdapter, Session};
use crate::render::{DOCUMENTS_ERROR_TEXT, clear_failed_text, document_lines, upload_failed_text};
use crate::transport::HttpTransport;

pub struct DocumentsController<I, T, S> {
    backend: BackendClient<I, T>,
    surface: S,
    uploading: InFlight,
    clearing: InFlight,
}

impl<I, T, S> DocumentsController<I, T, S>
where
    I: IdentityAdapter,
    T: HttpTransport,
    S: PageSurface,
{
    pub fn new(backend: BackendClient<I, T>, surface: S) -> Self {
        Self {
            backend,
            surface,
            uploading: InFlight::default(),
            clearing: InFlight::default(),
        }
    }

    pub async fn on_session(&self, session: Option<Session>) {
        let Some(session) = session else {
            self.surface.navigate(Page::Landing);
            return;
        };
        self.surface.set_text(Slot::UserName, session.display_label());
        self.refresh_documents().await;
    }

    pub async fn refresh_documents(&self) {
        let lines = match self.backend.list_documents().await {
            Ok(documents) => document_lines(&documents),
            Err(error) => {
                warn!(%error, "document listing failed");
                vec![DOCUMENTS_ERROR_TEXT.to_string()]
            }
        };
        self.surface.set_list(Slot::DocumentList, &lines);
    }

    /// A rejected batch still refreshes the listing since the backend may have
    /// stored part of it. Failures before any response leave the list alone.
    pub async fn upload_selected(&self) {
        if self.surface.selected_file_count() == 0 {
            return;
        }
        let Some(_pending) = self.uploading.begin() else {
            debug!("upload already in flight");
            return;
        };
        let files = match self.surface.read_selected_files().await {
            Ok(files) => files,
            Err(message) => {
                warn!(%message, "reading selected files failed");
                self.surface.alert(&upload_failed_text(&message));
                return;
            }
        };
        match self.backend.upload_files(&files).await {
            Ok(UploadOutcome::Skipped) => {}
            Ok(UploadOutcome::Uploaded) => {
                info!(count = files.len(), "files uploaded");
                self.refresh_documents().await;
            }
            Ok(UploadOutcome::Rejected { detail, .. }) => {
                self.surface.alert(&upload_failed_text(&detail));
                self.refresh_documents().await;
            }
            Err(error) => {
                warn!(%error, "upload failed");
                self.surface.alert(&upload_failed_text(&error));
            }
        }
    }

    pub async fn clear_documents(&self) {
        let Some(_pending) = self.clearing.begin() else {
            debug!("clear already in flight");
            return;
        };
        match self.backend.clear_documents().await {
            Ok(()) => self.refresh_documents().await,
            Err(error) => {
                warn!(%error, "clearing documents failed");
                self.surface.alert(&clear_failed_text(&error));
            }
        }
    }

    pub fn back_to_chat(&self) {
        self.surface.navigate(Page::Chat);
    }
}
