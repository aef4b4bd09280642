//! Platform-neutral core of the DocQA client: identity contract, backend
//! client, rendering rules, and the page controllers every front-end drives.

pub mod backend;
pub mod config;
pub mod identity;
pub mod pages;
pub mod render;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use backend::{
    AnswerResult, BackendClient, BackendError, DocumentSummary, HealthReport, StatusReport,
    StatusSummary, UploadOutcome,
};
pub use identity::{
    BearerCredential, DeferredSessionHub, IdentityAdapter, IdentityError, Session, SessionHub,
};
pub use pages::{ChatController, DocumentsController, LandingController, Page, PageSurface, Slot};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, UploadFile};
