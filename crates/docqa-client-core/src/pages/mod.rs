//! Page controllers shared by every front-end.
//!
//! Each controller owns one page's behavior and talks to the outside world only
//! through [`PageSurface`], the identity adapter, and the backend client.

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;

use crate::render::AnswerPanel;
use crate::transport::UploadFile;

mod chat;
mod documents;
mod landing;

pub use chat::ChatController;
pub use documents::DocumentsController;
pub use landing::LandingController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Chat,
    Documents,
}

impl Page {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "index.html",
            Self::Chat => "chat.html",
            Self::Documents => "documents.html",
        }
    }
}

/// Named areas of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    UserName,
    SignInError,
    Status,
    Response,
    QuestionInput,
    DocumentList,
}

#[async_trait(?Send)]
pub trait PageSurface {
    fn set_text(&self, slot: Slot, text: &str);
    fn set_list(&self, slot: Slot, items: &[String]);
    fn render_answer(&self, panel: &AnswerPanel);
    fn input_value(&self, slot: Slot) -> String;
    fn clear_input(&self, slot: Slot);
    fn selected_file_count(&self) -> usize;
    async fn read_selected_files(&self) -> Result<Vec<UploadFile>, String>;
    fn alert(&self, message: &str);
    fn navigate(&self, page: Page);
}

#[async_trait(?Send)]
impl<S: PageSurface + ?Sized> PageSurface for Rc<S> {
    fn set_text(&self, slot: Slot, text: &str) {
        (**self).set_text(slot, text);
    }

    fn set_list(&self, slot: Slot, items: &[String]) {
        (**self).set_list(slot, items);
    }

    fn render_answer(&self, panel: &AnswerPanel) {
        (**self).render_answer(panel);
    }

    fn input_value(&self, slot: Slot) -> String {
        (**self).input_value(slot)
    }

    fn clear_input(&self, slot: Slot) {
        (**self).clear_input(slot);
    }

    fn selected_file_count(&self) -> usize {
        (**self).selected_file_count()
    }

    async fn read_selected_files(&self) -> Result<Vec<UploadFile>, String> {
        (**self).read_selected_files().await
    }

    fn alert(&self, message: &str) {
        (**self).alert(message);
    }

    fn navigate(&self, page: Page) {
        (**self).navigate(page);
    }
}

/// Marks one user action as pending. A second trigger while the first is still
/// running gets `None` and is dropped.
#[derive(Debug, Default)]
pub(crate) struct InFlight(Cell<bool>);

impl InFlight {
    pub(crate) fn begin(&self) -> Option<InFlightGuard<'_>> {
        if self.0.replace(true) {
            return None;
        }
        Some(InFlightGuard(&self.0))
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.0.get()
    }
}

pub(crate) struct InFlightGuard<'a>(&'a Cell<bool>);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
