use super::*;

/// Browser `fetch` transport. No timeout is applied.
pub(super) struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
            HttpMethod::Delete => Request::delete(&request.url),
        };
        if let Some(bearer) = &request.bearer {
            builder = builder.header("authorization", &bearer.authorization_value());
        }

        let prepared = match request.body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(payload) => builder
                .header("content-type", "application/json")
                .body(payload.to_string()),
            RequestBody::Multipart { field, files } => builder.body(form_data(field, &files)?),
        }
        .map_err(|error| TransportError::Build {
            message: error.to_string(),
        })?;

        let response = prepared.send().await.map_err(map_network_error)?;
        let status = response.status();
        let body = response
            .binary()
            .await
            .map_err(|error| TransportError::Read {
                message: error.to_string(),
            })?;
        Ok(HttpResponse { status, body })
    }
}

fn map_network_error(error: gloo_net::Error) -> TransportError {
    TransportError::Network {
        message: error.to_string(),
    }
}

fn form_data(field: &str, files: &[UploadFile]) -> Result<FormData, TransportError> {
    let build_error = |value: JsValue| TransportError::Build {
        message: js_error_message(&value),
    };
    let form = FormData::new().map_err(build_error)?;
    for file in files {
        let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::of1(&bytes);
        let options = BlobPropertyBag::new();
        if let Some(content_type) = &file.content_type {
            options.set_type(content_type);
        }
        let blob =
            Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(build_error)?;
        form.append_with_blob_and_filename(field, &blob, &file.file_name)
            .map_err(build_error)?;
    }
    Ok(form)
}
