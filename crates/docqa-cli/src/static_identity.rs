use std::cell::RefCell;

use async_trait::async_trait;
use docqa_client_core::identity::{
    BearerCredential, IdentityAdapter, IdentityError, Session, SessionHub, SessionObserver,
};

pub const CLI_SESSION_UID: &str = "cli";

/// Identity backed by an ID token obtained elsewhere. There is no interactive
/// flow in a terminal, so a session exists exactly while a token is held.
pub struct StaticTokenIdentity {
    token: RefCell<Option<BearerCredential>>,
    hub: SessionHub,
}

impl StaticTokenIdentity {
    pub fn new(token: Option<&str>) -> Self {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(BearerCredential::new);
        let session = token.as_ref().map(|_| Session {
            uid: CLI_SESSION_UID.to_string(),
            display_name: None,
            email: None,
        });
        Self {
            token: RefCell::new(token),
            hub: SessionHub::new(session),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.hub.current()
    }
}

#[async_trait(?Send)]
impl IdentityAdapter for StaticTokenIdentity {
    async fn sign_in(&self) -> Result<Session, IdentityError> {
        Err(IdentityError::provider(
            "interactive sign-in is not available here; pass --token or set DOCQA_ID_TOKEN",
        ))
    }

    fn observe_session(&self, observer: SessionObserver) {
        self.hub.subscribe(observer);
    }

    async fn credential(&self) -> Result<BearerCredential, IdentityError> {
        self.token
            .borrow()
            .clone()
            .ok_or(IdentityError::Unauthenticated)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.token.borrow_mut().take();
        self.hub.publish(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn blank_token_means_no_session() {
        assert_eq!(StaticTokenIdentity::new(None).session(), None);
        assert_eq!(StaticTokenIdentity::new(Some("   ")).session(), None);
        assert_eq!(
            StaticTokenIdentity::new(Some("abc"))
                .session()
                .map(|session| session.uid),
            Some(CLI_SESSION_UID.to_string())
        );
    }

    #[tokio::test]
    async fn credential_is_the_trimmed_token() {
        let identity = StaticTokenIdentity::new(Some("  id-token  "));
        let credential = identity.credential().await.expect("credential");
        assert_eq!(credential.as_str(), "id-token");
    }

    #[tokio::test]
    async fn missing_token_is_unauthenticated() {
        let identity = StaticTokenIdentity::new(None);
        assert_eq!(
            identity.credential().await,
            Err(IdentityError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn sign_in_is_unsupported() {
        let identity = StaticTokenIdentity::new(None);
        assert!(matches!(
            identity.sign_in().await,
            Err(IdentityError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn sign_out_drops_the_token_and_notifies() {
        let identity = StaticTokenIdentity::new(Some("id-token"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        identity.observe_session(Box::new(move |session| {
            sink.borrow_mut().push(session.is_some());
        }));

        identity.sign_out().await.expect("sign out");

        assert_eq!(*seen.borrow(), vec![true, false]);
        assert_eq!(
            identity.credential().await,
            Err(IdentityError::Unauthenticated)
        );
    }
}
