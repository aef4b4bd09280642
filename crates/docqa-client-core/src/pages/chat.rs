use std::rc::Rc;

use tracing::{debug, warn};

use super::{InFlight, Page, PageSurface, Slot};
use crate::backend::BackendClient;
use crate::identity::{IdentityAdapter, Session};
use crate::render::{AnswerPanel, STATUS_ERROR_TEXT, sign_out_failed_text, status_line};
use crate::transport::HttpTransport;

pub struct ChatController<I, T, S> {
    identity: Rc<I>,
    backend: BackendClient<I, T>,
    surface: S,
    asking: InFlight,
    signing_out: InFlight,
}

impl<I, T, S> ChatController<I, T, S>
where
    I: IdentityAdapter,
    T: HttpTransport,
    S: PageSurface,
{
    pub fn new(identity: Rc<I>, backend: BackendClient<I, T>, surface: S) -> Self {
        Self {
            identity,
            backend,
            surface,
            asking: InFlight::default(),
            signing_out: InFlight::default(),
        }
    }

    pub async fn on_session(&self, session: Option<Session>) {
        let Some(session) = session else {
            self.surface.navigate(Page::Landing);
            return;
        };
        self.surface.set_text(Slot::UserName, session.display_label());
        self.refresh_status().await;
    }

    pub async fn refresh_status(&self) {
        let line = match self.backend.status_summary().await {
            Ok(summary) => status_line(&summary),
            Err(error) => {
                warn!(%error, "status refresh failed");
                STATUS_ERROR_TEXT.to_string()
            }
        };
        self.surface.set_text(Slot::Status, &line);
    }

    /// Only the empty string short-circuits here; whitespace reaches the
    /// backend client, which rejects it locally.
    pub async fn submit_question(&self) {
        let question = self.surface.input_value(Slot::QuestionInput);
        if question.is_empty() {
            return;
        }
        let Some(_pending) = self.asking.begin() else {
            debug!("question already in flight");
            return;
        };
        match self.backend.ask_question(&question).await {
            Ok(result) => {
                self.surface.render_answer(&AnswerPanel::from_result(&result));
                self.surface.clear_input(Slot::QuestionInput);
            }
            Err(error) => {
                warn!(%error, "ask failed");
                self.surface
                    .render_answer(&AnswerPanel::error(error.to_string()));
            }
        }
    }

    pub fn open_documents(&self) {
        self.surface.navigate(Page::Documents);
    }

    pub async fn sign_out(&self) {
        let Some(_pending) = self.signing_out.begin() else {
            return;
        };
        match self.identity.sign_out().await {
            Ok(()) => self.surface.navigate(Page::Landing),
            Err(error) => {
                warn!(%error, "sign-out failed");
                self.surface.alert(&sign_out_failed_text(&error));
            }
        }
    }
}
