use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use docqa_client_core::backend::{BackendClient, UploadOutcome};
use docqa_client_core::config::{normalize_base_url, resolve_backend_base_url};
use docqa_client_core::identity::IdentityAdapter;
use docqa_client_core::render::{AnswerPanel, document_lines, status_line, upload_failed_text};
use docqa_client_core::transport::{HttpTransport, UploadFile};
use docqa_http_client::{DEFAULT_TIMEOUT_MS, ReqwestTransport, ReqwestTransportConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod static_identity;

pub use static_identity::StaticTokenIdentity;

pub const ENV_ID_TOKEN: &str = "DOCQA_ID_TOKEN";
pub const DEFAULT_LOG_FILTER: &str = "warn";
pub const BACKEND_URL_SOURCE_FLAG: &str = "flag";

/// Extensions the backend ingests. Anything else is still sent, with a warning.
pub const SUPPORTED_UPLOAD_EXTENSIONS: [&str; 5] = ["pdf", "txt", "docx", "doc", "md"];

#[derive(Debug, Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about your uploaded documents")]
pub struct DocqaCli {
    /// Backend base URL (falls back to DOCQA_BACKEND_URL, then http://localhost:8000)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// ID token sent as the bearer credential
    #[arg(long, env = "DOCQA_ID_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    pub timeout_ms: u64,

    /// Tracing filter directive, e.g. `debug` or `docqa_client_core=debug`
    #[arg(long, env = "DOCQA_LOG", default_value = DEFAULT_LOG_FILTER, global = true)]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how many documents and chunks are indexed
    Status,
    /// List uploaded documents
    Documents,
    /// Ask a question about the uploaded documents
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Upload one or more files
    Upload {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
    /// Delete every uploaded document
    Clear,
    /// Show backend health and available models
    Health,
}

impl Commands {
    /// Health is served without a session; everything else needs a token.
    #[must_use]
    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Health)
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = DocqaCli::parse();
    init_tracing(&cli.log_filter);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(execute(cli, &mut out))
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn execute(cli: DocqaCli, out: &mut impl Write) -> anyhow::Result<()> {
    let (base_url, source) = resolve_base_url(cli.backend_url.as_deref())?;
    info!(%base_url, source, "using backend");

    let identity = Rc::new(StaticTokenIdentity::new(cli.token.as_deref()));
    ensure_session(&cli.command, identity.as_ref())?;
    let transport = ReqwestTransport::new(ReqwestTransportConfig {
        timeout_ms: cli.timeout_ms,
    });
    let backend = BackendClient::new(&base_url, identity, transport)?;
    run_command(&backend, cli.command, out).await
}

pub fn ensure_session(command: &Commands, identity: &StaticTokenIdentity) -> anyhow::Result<()> {
    if command.requires_session() && identity.session().is_none() {
        bail!("no ID token available; pass --token or set {ENV_ID_TOKEN}");
    }
    Ok(())
}

pub fn resolve_base_url(flag: Option<&str>) -> anyhow::Result<(String, &'static str)> {
    if let Some(raw) = flag {
        let normalized = normalize_base_url(raw).context("invalid --backend-url")?;
        return Ok((normalized, BACKEND_URL_SOURCE_FLAG));
    }
    resolve_backend_base_url().context("invalid backend url in environment")
}

pub async fn run_command<I, T>(
    backend: &BackendClient<I, T>,
    command: Commands,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    I: IdentityAdapter,
    T: HttpTransport,
{
    match command {
        Commands::Status => {
            let summary = backend
                .status_summary()
                .await
                .context("failed to fetch status")?;
            writeln!(out, "{}", status_line(&summary))?;
        }
        Commands::Documents => {
            let documents = backend
                .list_documents()
                .await
                .context("failed to list documents")?;
            for line in document_lines(&documents) {
                writeln!(out, "{line}")?;
            }
        }
        Commands::Ask { question } => {
            let question = question.join(" ");
            let result = backend
                .ask_question(&question)
                .await
                .context("failed to get an answer")?;
            for (label, value) in AnswerPanel::from_result(&result).rows() {
                match label {
                    Some(label) => writeln!(out, "{label} {value}")?,
                    None => writeln!(out, "{value}")?,
                }
            }
        }
        Commands::Upload { paths } => {
            let files = read_upload_files(&paths).await?;
            match backend.upload_files(&files).await.context("upload failed")? {
                UploadOutcome::Skipped => writeln!(out, "No files to upload")?,
                UploadOutcome::Uploaded => writeln!(out, "Uploaded {} file(s)", files.len())?,
                UploadOutcome::Rejected { status, detail } => {
                    bail!("{} (status {status})", upload_failed_text(&detail))
                }
            }
        }
        Commands::Clear => {
            backend
                .clear_documents()
                .await
                .context("failed to clear documents")?;
            writeln!(out, "All documents cleared")?;
        }
        Commands::Health => {
            let report = backend.health().await.context("health check failed")?;
            let models = if report.llms_available.is_empty() {
                "none".to_string()
            } else {
                report.llms_available.join(", ")
            };
            writeln!(out, "Status: {}", report.status)?;
            writeln!(out, "LLMs available: {models}")?;
        }
    }
    Ok(())
}

async fn read_upload_files(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(file_name) = path.file_name().map(|name| name.to_string_lossy().to_string())
        else {
            bail!("{} does not name a file", path.display());
        };
        if !is_supported_upload(path) {
            warn!(
                file = %path.display(),
                supported = %SUPPORTED_UPLOAD_EXTENSIONS.join(", "),
                "file type is not in the backend's supported set"
            );
        }
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        files.push(UploadFile {
            file_name,
            content_type: content_type_for(path).map(str::to_string),
            bytes,
        });
    }
    Ok(files)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
}

pub fn is_supported_upload(path: &Path) -> bool {
    extension(path).is_some_and(|extension| SUPPORTED_UPLOAD_EXTENSIONS.contains(&extension.as_str()))
}

pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let content_type = match extension(path)?.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };
    Some(content_type)
}
