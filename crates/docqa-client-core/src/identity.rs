use std::cell::{Cell, RefCell};
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("no active session")]
    Unauthenticated,
    #[error("{message}")]
    Provider { message: String },
}

impl IdentityError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

/// Signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    #[serde(default, alias = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

/// Short-lived bearer token. Fetch one per request and drop it afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential(<redacted>)")
    }
}

pub type SessionObserver = Box<dyn FnMut(Option<Session>)>;

/// Contract every identity provider binding implements.
///
/// Futures are `?Send` because the browser binding resolves JavaScript promises
/// on the page's single thread.
#[async_trait(?Send)]
pub trait IdentityAdapter {
    /// Runs the provider's interactive sign-in flow.
    async fn sign_in(&self) -> Result<Session, IdentityError>;

    /// Registers `observer`; it is called immediately with the current state and
    /// again on every sign-in or sign-out.
    fn observe_session(&self, observer: SessionObserver);

    /// Returns a fresh credential for the active session.
    async fn credential(&self) -> Result<BearerCredential, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Observer registry shared by adapters.
#[derive(Default)]
pub struct SessionHub {
    current: RefCell<Option<Session>>,
    observers: RefCell<Vec<SessionObserver>>,
}

impl SessionHub {
    #[must_use]
    pub fn new(initial: Option<Session>) -> Self {
        Self {
            current: RefCell::new(initial),
            observers: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self, mut observer: SessionObserver) {
        observer(self.current());
        self.observers.borrow_mut().push(observer);
    }

    pub fn publish(&self, session: Option<Session>) {
        *self.current.borrow_mut() = session.clone();
        // Observers registered from inside a callback land after this pass.
        let mut observers = std::mem::take(&mut *self.observers.borrow_mut());
        for observer in &mut observers {
            observer(session.clone());
        }
        let mut slot = self.observers.borrow_mut();
        observers.append(&mut slot);
        *slot = observers;
    }
}

/// Session registry for providers that report the signed-in state
/// asynchronously. Observers registered before the first report wait for it
/// instead of seeing a premature `None`.
#[derive(Default)]
pub struct DeferredSessionHub {
    hub: SessionHub,
    resolved: Cell<bool>,
    waiting: RefCell<Vec<SessionObserver>>,
}

impl DeferredSessionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.hub.current()
    }

    pub fn subscribe(&self, observer: SessionObserver) {
        if self.resolved.get() {
            self.hub.subscribe(observer);
        } else {
            self.waiting.borrow_mut().push(observer);
        }
    }

    pub fn publish(&self, session: Option<Session>) {
        self.hub.publish(session);
        if self.resolved.replace(true) {
            return;
        }
        let waiting = std::mem::take(&mut *self.waiting.borrow_mut());
        for observer in waiting {
            self.hub.subscribe(observer);
        }
    }
}
