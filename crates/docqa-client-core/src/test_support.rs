use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;

use crate::identity::{
    BearerCredential, IdentityAdapter, IdentityError, Session, SessionHub, SessionObserver,
};
use crate::pages::{Page, PageSurface, Slot};
use crate::render::AnswerPanel;
use crate::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError, UploadFile,
};

pub(crate) fn ada() -> Session {
    Session {
        uid: "uid-ada".to_string(),
        display_name: Some("Ada".to_string()),
        email: Some("ada@example.com".to_string()),
    }
}

pub(crate) fn signed_in_identity() -> Rc<MockIdentity> {
    Rc::new(MockIdentity::signed_in(ada()))
}

pub(crate) struct MockIdentity {
    hub: SessionHub,
    credential_calls: Cell<usize>,
    sign_in_result: RefCell<Result<Session, IdentityError>>,
    sign_out_error: RefCell<Option<IdentityError>>,
}

impl MockIdentity {
    pub(crate) fn signed_in(session: Session) -> Self {
        Self {
            hub: SessionHub::new(Some(session.clone())),
            credential_calls: Cell::new(0),
            sign_in_result: RefCell::new(Ok(session)),
            sign_out_error: RefCell::new(None),
        }
    }

    pub(crate) fn signed_out() -> Self {
        Self {
            hub: SessionHub::new(None),
            credential_calls: Cell::new(0),
            sign_in_result: RefCell::new(Ok(ada())),
            sign_out_error: RefCell::new(None),
        }
    }

    pub(crate) fn fail_sign_in(&self, message: &str) {
        *self.sign_in_result.borrow_mut() = Err(IdentityError::provider(message));
    }

    pub(crate) fn fail_sign_out(&self, message: &str) {
        *self.sign_out_error.borrow_mut() = Some(IdentityError::provider(message));
    }

    pub(crate) fn credential_calls(&self) -> usize {
        self.credential_calls.get()
    }

    pub(crate) fn current(&self) -> Option<Session> {
        self.hub.current()
    }
}

#[async_trait(?Send)]
impl IdentityAdapter for MockIdentity {
    async fn sign_in(&self) -> Result<Session, IdentityError> {
        let result = self.sign_in_result.borrow().clone();
        if let Ok(session) = &result {
            self.hub.publish(Some(session.clone()));
        }
        result
    }

    fn observe_session(&self, observer: SessionObserver) {
        self.hub.subscribe(observer);
    }

    async fn credential(&self) -> Result<BearerCredential, IdentityError> {
        if self.hub.current().is_none() {
            return Err(IdentityError::Unauthenticated);
        }
        let next = self.credential_calls.get() + 1;
        self.credential_calls.set(next);
        Ok(BearerCredential::new(format!("token-{next}")))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(error) = self.sign_out_error.borrow().clone() {
            return Err(error);
        }
        self.hub.publish(None);
        Ok(())
    }
}

type Route = (HttpMethod, String);

/// Canned responses per route. The last queued response for a route is
/// replayed once the queue is down to one entry.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: RefCell<HashMap<Route, VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn respond_json(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            Ok(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
        );
    }

    pub(crate) fn fail(&self, method: HttpMethod, path: &str, message: &str) {
        self.push(
            method,
            path,
            Err(TransportError::Network {
                message: message.to_string(),
            }),
        );
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn calls(&self, method: HttpMethod, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method == method && route_path(&request.url) == path)
            .count()
    }

    fn push(&self, method: HttpMethod, path: &str, response: Result<HttpResponse, TransportError>) {
        self.routes
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }
}

fn route_path(url: &str) -> &str {
    url.split_once("://")
        .and_then(|(_, rest)| rest.find('/').map(|index| &rest[index..]))
        .unwrap_or("/")
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method, route_path(&request.url).to_string());
        self.requests.borrow_mut().push(request);
        let mut routes = self.routes.borrow_mut();
        let Some(queue) = routes.get_mut(&key) else {
            return Ok(HttpResponse {
                status: 404,
                body: br#"{"detail":"Not Found"}"#.to_vec(),
            });
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| {
                Err(TransportError::Network {
                    message: "empty queue".to_string(),
                })
            })
        } else {
            queue.front().cloned().unwrap_or_else(|| {
                Err(TransportError::Network {
                    message: "empty queue".to_string(),
                })
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SurfaceEvent {
    Text(Slot, String),
    List(Slot, Vec<String>),
    Answer(AnswerPanel),
    ClearInput(Slot),
    Alert(String),
    Navigate(Page),
}

#[derive(Default)]
pub(crate) struct MockSurface {
    events: RefCell<Vec<SurfaceEvent>>,
    inputs: RefCell<HashMap<Slot, String>>,
    files: RefCell<Vec<UploadFile>>,
    file_read_error: RefCell<Option<String>>,
}

impl MockSurface {
    pub(crate) fn with_input(self, slot: Slot, value: &str) -> Self {
        self.inputs.borrow_mut().insert(slot, value.to_string());
        self
    }

    pub(crate) fn with_files(self, files: Vec<UploadFile>) -> Self {
        *self.files.borrow_mut() = files;
        self
    }

    pub(crate) fn fail_file_read(&self, message: &str) {
        *self.file_read_error.borrow_mut() = Some(message.to_string());
    }

    pub(crate) fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    pub(crate) fn input(&self, slot: Slot) -> String {
        self.inputs.borrow().get(&slot).cloned().unwrap_or_default()
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Alert(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn lists(&self, slot: Slot) -> Vec<Vec<String>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::List(list_slot, items) if *list_slot == slot => Some(items.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SurfaceEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[async_trait(?Send)]
impl PageSurface for MockSurface {
    fn set_text(&self, slot: Slot, text: &str) {
        self.record(SurfaceEvent::Text(slot, text.to_string()));
    }

    fn set_list(&self, slot: Slot, items: &[String]) {
        self.record(SurfaceEvent::List(slot, items.to_vec()));
    }

    fn render_answer(&self, panel: &AnswerPanel) {
        self.record(SurfaceEvent::Answer(panel.clone()));
    }

    fn input_value(&self, slot: Slot) -> String {
        self.input(slot)
    }

    fn clear_input(&self, slot: Slot) {
        self.inputs.borrow_mut().remove(&slot);
        self.record(SurfaceEvent::ClearInput(slot));
    }

    fn selected_file_count(&self) -> usize {
        self.files.borrow().len()
    }

    async fn read_selected_files(&self) -> Result<Vec<UploadFile>, String> {
        if let Some(message) = self.file_read_error.borrow().clone() {
            return Err(message);
        }
        Ok(self.files.borrow().clone())
    }

    fn alert(&self, message: &str) {
        self.record(SurfaceEvent::Alert(message.to_string()));
    }

    fn navigate(&self, page: Page) {
        self.record(SurfaceEvent::Navigate(page));
    }
}
