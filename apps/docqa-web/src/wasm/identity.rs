use super::*;

#[wasm_bindgen(module = "/js/identity.js")]
extern "C" {
    #[wasm_bindgen(js_name = initIdentity, catch)]
    fn init_identity(config_json: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = signInWithGoogle, catch)]
    async fn sign_in_with_google() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = onSessionChanged, catch)]
    fn on_session_changed(callback: &Closure<dyn FnMut(JsValue)>) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = currentIdToken, catch)]
    async fn current_id_token() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = signOutCurrent, catch)]
    async fn sign_out_current() -> Result<JsValue, JsValue>;
}

/// Google sign-in through the Firebase JS SDK.
pub(super) struct FirebaseIdentity {
    sessions: Rc<DeferredSessionHub>,
    _listener: Closure<dyn FnMut(JsValue)>,
}

impl FirebaseIdentity {
    pub(super) fn connect(config: &IdentityProviderConfig) -> Result<Rc<Self>, IdentityError> {
        let config_json = serde_json::to_string(config).map_err(|error| {
            IdentityError::provider(format!("failed to encode identity config: {error}"))
        })?;
        init_identity(&config_json).map_err(js_identity_error)?;

        let sessions = Rc::new(DeferredSessionHub::new());
        let sink = Rc::clone(&sessions);
        let listener = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |value: JsValue| {
            match session_from_js(&value) {
                Ok(session) => sink.publish(session),
                Err(error) => log_error("session update", &error),
            }
        }));
        on_session_changed(&listener).map_err(js_identity_error)?;

        Ok(Rc::new(Self {
            sessions,
            _listener: listener,
        }))
    }
}

#[async_trait(?Send)]
impl IdentityAdapter for FirebaseIdentity {
    async fn sign_in(&self) -> Result<Session, IdentityError> {
        let value = sign_in_with_google().await.map_err(js_identity_error)?;
        session_from_js(&value)?
            .ok_or_else(|| IdentityError::provider("sign-in completed without a user"))
    }

    fn observe_session(&self, observer: SessionObserver) {
        self.sessions.subscribe(observer);
    }

    async fn credential(&self) -> Result<BearerCredential, IdentityError> {
        let token = current_id_token().await.map_err(js_identity_error)?;
        token
            .as_string()
            .filter(|token| !token.is_empty())
            .map(BearerCredential::new)
            .ok_or(IdentityError::Unauthenticated)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        sign_out_current().await.map_err(js_identity_error)?;
        Ok(())
    }
}

fn session_from_js(value: &JsValue) -> Result<Option<Session>, IdentityError> {
    let Some(raw) = value.as_string() else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|error| IdentityError::provider(format!("invalid session payload: {error}")))
}

fn js_identity_error(value: JsValue) -> IdentityError {
    IdentityError::provider(js_error_message(&value))
}
