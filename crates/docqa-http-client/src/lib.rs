use std::time::Duration;

use async_trait::async_trait;
use docqa_client_core::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError, UploadFile,
};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const MIN_TIMEOUT_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    pub timeout_ms: u64,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Native transport. Each request gets its own timeout and `x-request-id`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Duration,
    http: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(config: ReqwestTransportConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, config: ReqwestTransportConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms.max(MIN_TIMEOUT_MS)),
            http,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request_id = format!("req_{}", Uuid::new_v4().simple());
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            %request_id,
            "dispatching request"
        );

        let mut builder = self
            .http
            .request(reqwest_method(request.method), request.url.as_str())
            .header("x-request-id", request_id)
            .timeout(self.timeout);
        if let Some(bearer) = &request.bearer {
            builder = builder.header(AUTHORIZATION, bearer.authorization_value());
        }

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(payload) => builder.json(&payload),
            RequestBody::Multipart { field, files } => builder.multipart(build_form(field, files)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::Network {
                message: error.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| TransportError::Read {
                message: error.to_string(),
            })?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn build_form(field: &'static str, files: Vec<UploadFile>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for file in files {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|error| TransportError::Build {
                    message: format!("invalid content type `{content_type}`: {error}"),
                })?;
        }
        form = form.part(field, part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_client_core::identity::BearerCredential;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts one connection, answers with `status` and `body`, and hands back
    /// the raw request text.
    async fn one_shot_server(
        status: u16,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut raw = Vec::new();
            let mut buffer = [0_u8; 4096];
            loop {
                let read = socket.read(&mut buffer).await.expect("read");
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&buffer[..read]);
                if request_complete(&raw) {
                    break;
                }
            }
            let reply = format!(
                "HTTP/1.1 {status} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.expect("write");
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{address}"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        if text[..header_end]
            .to_ascii_lowercase()
            .contains("transfer-encoding: chunked")
        {
            return text.ends_with("0\r\n\r\n");
        }
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn request(method: HttpMethod, url: String, body: RequestBody) -> HttpRequest {
        HttpRequest {
            method,
            url,
            bearer: Some(BearerCredential::new("id-token-123")),
            body,
        }
    }

    #[test]
    fn timeout_has_a_floor() {
        let transport = ReqwestTransport::new(ReqwestTransportConfig { timeout_ms: 10 });
        assert_eq!(transport.timeout(), Duration::from_millis(MIN_TIMEOUT_MS));

        let transport = ReqwestTransport::new(ReqwestTransportConfig::default());
        assert_eq!(transport.timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(reqwest_method(HttpMethod::Post), reqwest::Method::POST);
        assert_eq!(reqwest_method(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn invalid_content_type_is_a_build_error() {
        let result = build_form(
            "files",
            vec![UploadFile {
                file_name: "a.pdf".to_string(),
                content_type: Some("not a mime".to_string()),
                bytes: Vec::new(),
            }],
        );
        assert!(matches!(result, Err(TransportError::Build { .. })));
    }

    #[tokio::test]
    async fn json_request_carries_bearer_and_body() {
        let (base_url, server) = one_shot_server(200, r#"{"answer":"ok"}"#).await;
        let transport = ReqwestTransport::new(ReqwestTransportConfig::default());

        let response = transport
            .send(request(
                HttpMethod::Post,
                format!("{base_url}/ask"),
                RequestBody::Json(serde_json::json!({"question": "why?"})),
            ))
            .await
            .expect("response");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"answer":"ok"}"#.to_vec());

        let raw = server.await.expect("server task").to_ascii_lowercase();
        assert!(raw.starts_with("post /ask http/1.1"));
        assert!(raw.contains("authorization: bearer id-token-123"));
        assert!(raw.contains("x-request-id: req_"));
        assert!(raw.contains(r#"{"question":"why?"}"#));
    }

    #[tokio::test]
    async fn multipart_repeats_the_files_field() {
        let (base_url, server) = one_shot_server(200, "{}").await;
        let transport = ReqwestTransport::new(ReqwestTransportConfig::default());

        transport
            .send(request(
                HttpMethod::Post,
                format!("{base_url}/upload"),
                RequestBody::Multipart {
                    field: "files",
                    files: vec![
                        UploadFile {
                            file_name: "a.txt".to_string(),
                            content_type: Some("text/plain".to_string()),
                            bytes: b"alpha".to_vec(),
                        },
                        UploadFile {
                            file_name: "b.md".to_string(),
                            content_type: None,
                            bytes: b"beta".to_vec(),
                        },
                    ],
                },
            ))
            .await
            .expect("response");

        let raw = server.await.expect("server task").to_ascii_lowercase();
        assert!(raw.contains("multipart/form-data; boundary="));
        assert_eq!(
            raw.matches(r#"content-disposition: form-data; name="files""#)
                .count(),
            2
        );
        assert!(raw.contains(r#"filename="a.txt""#));
        assert!(raw.contains(r#"filename="b.md""#));
        assert!(raw.contains("alpha"));
        assert!(raw.contains("beta"));
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let (base_url, server) = one_shot_server(500, r#"{"detail":"boom"}"#).await;
        let transport = ReqwestTransport::new(ReqwestTransportConfig::default());

        let response = transport
            .send(request(
                HttpMethod::Delete,
                format!("{base_url}/documents"),
                RequestBody::Empty,
            ))
            .await
            .expect("response");
        assert_eq!(response.status, 500);
        assert!(!response.is_success());

        let raw = server.await.expect("server task");
        assert!(raw.starts_with("DELETE /documents HTTP/1.1"));
    }

    #[tokio::test]
    async fn anonymous_request_omits_authorization() {
        let (base_url, server) = one_shot_server(200, r#"{"status":"healthy"}"#).await;
        let transport = ReqwestTransport::new(ReqwestTransportConfig::default());

        let mut anonymous = request(
            HttpMethod::Get,
            format!("{base_url}/health"),
            RequestBody::Empty,
        );
        anonymous.bearer = None;
        let response = transport.send(anonymous).await.expect("response");
        assert_eq!(response.status, 200);

        let raw = server.await.expect("server task").to_ascii_lowercase();
        assert!(raw.starts_with("get /health http/1.1"));
        assert!(!raw.contains("authorization:"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        drop(listener);

        let transport = ReqwestTransport::new(ReqwestTransportConfig { timeout_ms: 2_000 });
        let error = transport
            .send(request(
                HttpMethod::Get,
                format!("http://{address}/status"),
                RequestBody::Empty,
            ))
            .await
            .expect_err("connection refused");
        assert!(matches!(error, TransportError::Network { .. }));
    }
}
