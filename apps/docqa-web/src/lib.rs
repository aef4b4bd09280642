#[cfg(any(target_arch = "wasm32", test))]
mod web_config;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::future::Future;
    use std::rc::Rc;

    use async_trait::async_trait;
    use docqa_client_core::backend::BackendClient;
    use docqa_client_core::config::IdentityProviderConfig;
    use docqa_client_core::identity::{
        BearerCredential, DeferredSessionHub, IdentityAdapter, IdentityError, Session,
        SessionObserver,
    };
    use docqa_client_core::pages::{
        ChatController, DocumentsController, LandingController, Page, PageSurface, Slot,
    };
    use docqa_client_core::render::AnswerPanel;
    use docqa_client_core::transport::{
        HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError,
        UploadFile,
    };
    use gloo_net::http::Request;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{Blob, BlobPropertyBag, Element, File, FormData, HtmlInputElement};

    use crate::web_config::*;

    mod dom;
    mod identity;
    mod network;

    use dom::{DomSurface, bind_click};
    use identity::FirebaseIdentity;
    use network::GlooTransport;

    type WebBackend = BackendClient<FirebaseIdentity, GlooTransport>;

    thread_local! {
        static CLICK_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
    }

    #[wasm_bindgen]
    pub fn start_landing() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        init_console_logging();
        let identity = connect_identity()?;
        let surface = Rc::new(DomSurface::current().map_err(startup_error)?);
        let controller = Rc::new(LandingController::new(Rc::clone(&identity), surface));

        let observer = Rc::clone(&controller);
        identity.observe_session(Box::new(move |session| {
            observer.on_session(session.as_ref());
        }));

        on_click(SIGN_IN_BUTTON_ID, &controller, |controller| async move {
            controller.sign_in().await;
        })
    }

    #[wasm_bindgen]
    pub fn start_chat() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        init_console_logging();
        let identity = connect_identity()?;
        let backend = connect_backend(&identity)?;
        let surface = Rc::new(DomSurface::current().map_err(startup_error)?);
        let controller = Rc::new(ChatController::new(
            Rc::clone(&identity),
            backend,
            surface,
        ));

        let observer = Rc::clone(&controller);
        identity.observe_session(Box::new(move |session| {
            let controller = Rc::clone(&observer);
            spawn_local(async move { controller.on_session(session).await });
        }));

        on_click(SEND_BUTTON_ID, &controller, |controller| async move {
            controller.submit_question().await;
        })?;
        on_click(MANAGE_DOCS_BUTTON_ID, &controller, |controller| async move {
            controller.open_documents();
        })?;
        on_click(SIGN_OUT_BUTTON_ID, &controller, |controller| async move {
            controller.sign_out().await;
        })
    }

    #[wasm_bindgen]
    pub fn start_documents() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        init_console_logging();
        let identity = connect_identity()?;
        let backend = connect_backend(&identity)?;
        let surface = Rc::new(DomSurface::current().map_err(startup_error)?);
        let controller = Rc::new(DocumentsController::new(backend, surface));

        let observer = Rc::clone(&controller);
        identity.observe_session(Box::new(move |session| {
            let controller = Rc::clone(&observer);
            spawn_local(async move { controller.on_session(session).await });
        }));

        on_click(UPLOAD_BUTTON_ID, &controller, |controller| async move {
            controller.upload_selected().await;
        })?;
        on_click(CLEAR_BUTTON_ID, &controller, |controller| async move {
            controller.clear_documents().await;
        })?;
        on_click(BACK_TO_CHAT_BUTTON_ID, &controller, |controller| async move {
            controller.back_to_chat();
        })
    }

    #[wasm_bindgen]
    pub fn config_diagnostics_json() -> String {
        diagnostics_json()
    }

    /// Routes `tracing` events to the browser console. Later calls are no-ops.
    fn init_console_logging() {
        let console = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .without_time()
            .with_writer(tracing_web::MakeWebConsoleWriter::new());
        let _ = tracing_subscriber::registry()
            .with(console)
            .with(console_log_level(BUILD_LOG_LEVEL))
            .try_init();
    }

    fn connect_identity() -> Result<Rc<FirebaseIdentity>, JsValue> {
        let config = build_identity_config().map_err(startup_error)?;
        FirebaseIdentity::connect(&config).map_err(startup_error)
    }

    fn connect_backend(identity: &Rc<FirebaseIdentity>) -> Result<WebBackend, JsValue> {
        let base_url = build_backend_base_url().map_err(startup_error)?;
        BackendClient::new(&base_url, Rc::clone(identity), GlooTransport).map_err(startup_error)
    }

    fn on_click<C, F, Fut>(id: &str, controller: &Rc<C>, action: F) -> Result<(), JsValue>
    where
        C: 'static,
        F: Fn(Rc<C>) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let controller = Rc::clone(controller);
        bind_click(id, move || spawn_local(action(Rc::clone(&controller))))
    }

    fn startup_error(error: impl std::fmt::Display) -> JsValue {
        let message = error.to_string();
        log_error("startup", &message);
        JsValue::from_str(&message)
    }

    fn log_error(context: &str, message: &str) {
        web_sys::console::error_1(&JsValue::from_str(&format!("docqa {context}: {message}")));
    }

    fn js_error_message(value: &JsValue) -> String {
        if let Some(error) = value.dyn_ref::<js_sys::Error>() {
            return String::from(error.message());
        }
        value
            .as_string()
            .unwrap_or_else(|| "unknown browser error".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::config_diagnostics_json;

#[cfg(not(target_arch = "wasm32"))]
pub fn config_diagnostics_json() -> String {
    "{\"errors\":[\"page controllers only run on wasm\"]}".to_string()
}
