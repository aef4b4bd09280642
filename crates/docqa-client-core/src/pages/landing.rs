use std::rc::Rc;

use tracing::{debug, info, warn};

use super::{InFlight, Page, PageSurface, Slot};
use crate::identity::{IdentityAdapter, Session};
use crate::render::sign_in_failed_text;

pub struct LandingController<I, S> {
    identity: Rc<I>,
    surface: S,
    signing_in: InFlight,
}

impl<I, S> LandingController<I, S>
where
    I: IdentityAdapter,
    S: PageSurface,
{
    pub fn new(identity: Rc<I>, surface: S) -> Self {
        Self {
            identity,
            surface,
            signing_in: InFlight::default(),
        }
    }

    /// Any session, existing or fresh, sends the user on to the chat page.
    pub fn on_session(&self, session: Option<&Session>) {
        if let Some(session) = session {
            debug!(uid = %session.uid, "session present on landing page");
            self.surface.navigate(Page::Chat);
        }
    }

    /// The redirect after success comes from the session observer.
    pub async fn sign_in(&self) {
        let Some(_pending) = self.signing_in.begin() else {
            debug!("sign-in already in progress");
            return;
        };
        match self.identity.sign_in().await {
            Ok(session) => info!(uid = %session.uid, "signed in"),
            Err(error) => {
                warn!(%error, "sign-in failed");
                self.surface
                    .set_text(Slot::SignInError, &sign_in_failed_text(&error));
            }
        }
    }
}
