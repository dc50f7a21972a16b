// crates/transfer-intake-server/src/server.rs
// ============================================================================
// Module: Intake HTTP Server
// Description: axum JSON API for submission creation and patching.
// Purpose: Expose the lifecycle controller with structured errors.
// Dependencies: transfer-intake-core, transfer-intake-config, axum, tokio
// ============================================================================

//! ## Overview
//! The HTTP server exposes three endpoints: `POST /submissions` creates a
//! record and returns its identifier, `PATCH /submissions/{id}` merge-patches
//! an existing record, and `GET /healthz` probes store readiness. Every
//! response carries a per-request trace identifier; error bodies use stable
//! machine-readable codes and never leak internals. Request bodies are
//! size-capped before parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::USER_AGENT;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::signal;
use tracing::info;
use transfer_intake_config::AuditSinkKind;
use transfer_intake_config::IntakeConfig;
use transfer_intake_config::StoreType;
use transfer_intake_core::ClientInfo;
use transfer_intake_core::CounterCache;
use transfer_intake_core::CreateSubmission;
use transfer_intake_core::EventSink;
use transfer_intake_core::FormMode;
use transfer_intake_core::InMemoryRateLimitStore;
use transfer_intake_core::InMemorySubmissionStore;
use transfer_intake_core::IntakeError;
use transfer_intake_core::ModeTableValidator;
use transfer_intake_core::NotificationDispatcher;
use transfer_intake_core::RateLimiter;
use transfer_intake_core::SharedRateLimitStore;
use transfer_intake_core::SharedSubmissionStore;
use transfer_intake_core::SubmissionController;
use transfer_intake_core::SubmissionId;
use transfer_intake_core::SubmissionPatch;
use transfer_intake_core::SubmissionReceipt;
use transfer_intake_core::TraceId;
use transfer_intake_core::UNKNOWN_CLIENT_IP;
use transfer_intake_core::unix_millis;
use transfer_intake_store_sqlite::SqliteIntakeStore;
use transfer_intake_store_sqlite::SqliteStoreConfig;

use crate::audit::AuditOutcome;
use crate::audit::FileAuditSink;
use crate::audit::IntakeAuditEvent;
use crate::audit::IntakeAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::notify::NoopNotifier;
use crate::notify::WebhookNotifier;
use crate::tasks::TokioCounterWriteQueue;
use crate::tasks::TokioNotificationQueue;

// ============================================================================
// SECTION: HTTP Server
// ============================================================================

/// Intake HTTP server instance.
pub struct HttpServer {
    /// Bind address.
    bind: String,
    /// Shared handler state.
    state: Arc<ServerState>,
}

/// Shared server state for request handlers.
struct ServerState {
    /// Lifecycle controller.
    controller: SubmissionController,
    /// Audit sink for request events.
    audit: Arc<dyn IntakeAuditSink>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

impl HttpServer {
    /// Builds an HTTP server from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when initialization fails.
    pub fn from_config(config: IntakeConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let secret =
            config.hashing.secret().map_err(|err| ServerError::Config(err.to_string()))?;

        let (audit, events) = build_sinks(&config)?;
        let (submissions, counters) = build_stores(&config)?;

        let counter_queue =
            Arc::new(TokioCounterWriteQueue::new(counters.clone(), events.clone()));
        let limiter = RateLimiter::new(
            config.rate_limit.settings(),
            secret.clone(),
            CounterCache::new(config.rate_limit.cache_ttl(), config.rate_limit.max_cache_entries),
            counters,
            counter_queue,
            events.clone(),
        );

        let dispatcher: Arc<dyn NotificationDispatcher> = if config.notifier.enabled {
            let endpoint = config
                .notifier
                .endpoint
                .clone()
                .ok_or_else(|| ServerError::Config("notifier endpoint required".to_string()))?;
            Arc::new(
                WebhookNotifier::new(endpoint, config.notifier.timeout_ms)
                    .map_err(|err| ServerError::Init(err.to_string()))?,
            )
        } else {
            Arc::new(NoopNotifier)
        };
        let notifications =
            Arc::new(TokioNotificationQueue::new(dispatcher, events.clone()));

        let controller = SubmissionController::new(
            limiter,
            submissions,
            Arc::new(ModeTableValidator::new(config.validation.patch_policy)),
            notifications,
            events,
            secret,
        );

        Ok(Self {
            bind: config.server.bind.clone(),
            state: Arc::new(ServerState {
                controller,
                audit,
                max_body_bytes: config.server.max_body_bytes,
            }),
        })
    }

    /// Serves requests until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .bind
            .parse()
            .map_err(|_| ServerError::Config("invalid bind address".to_string()))?;
        let app = Router::new()
            .route("/submissions", post(handle_create))
            .route("/submissions/{id}", patch(handle_patch))
            .route("/healthz", get(handle_health))
            .with_state(self.state);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        info!("intake server listening on {addr}");
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

/// Builds the audit sink pair (request audit + core events) from config.
fn build_sinks(
    config: &IntakeConfig,
) -> Result<(Arc<dyn IntakeAuditSink>, Arc<dyn EventSink>), ServerError> {
    match config.audit.sink {
        AuditSinkKind::Stderr => {
            let sink = Arc::new(StderrAuditSink);
            Ok((sink.clone(), sink))
        }
        AuditSinkKind::File => {
            let path = config
                .audit
                .path
                .as_ref()
                .ok_or_else(|| ServerError::Config("audit path required".to_string()))?;
            let sink = Arc::new(
                FileAuditSink::new(path).map_err(|err| ServerError::Init(err.to_string()))?,
            );
            Ok((sink.clone(), sink))
        }
        AuditSinkKind::None => {
            let sink = Arc::new(NoopAuditSink);
            Ok((sink.clone(), sink))
        }
    }
}

/// Builds the submission and counter stores from config.
fn build_stores(
    config: &IntakeConfig,
) -> Result<(SharedSubmissionStore, SharedRateLimitStore), ServerError> {
    match config.store.store_type {
        StoreType::Memory => Ok((
            SharedSubmissionStore::from_store(InMemorySubmissionStore::new()),
            SharedRateLimitStore::from_store(InMemoryRateLimitStore::new()),
        )),
        StoreType::Sqlite => {
            let path = config
                .store
                .path
                .clone()
                .ok_or_else(|| ServerError::Config("sqlite store requires path".to_string()))?;
            let store = SqliteIntakeStore::new(SqliteStoreConfig {
                path,
                busy_timeout_ms: config.store.busy_timeout_ms,
                journal_mode: config.store.journal_mode,
                sync_mode: config.store.sync_mode,
            })
            .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok((
                SharedSubmissionStore::from_store(store.clone()),
                SharedRateLimitStore::from_store(store),
            ))
        }
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `POST /submissions`.
async fn handle_create(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> (StatusCode, axum::Json<Value>) {
    let trace = TraceId::generate(unix_millis());
    if bytes.len() > state.max_body_bytes {
        return finish(&state, &trace, "create", bytes.len(), too_large(&trace));
    }
    let (mode, fields) = match parse_create_body(&bytes) {
        Ok(parsed) => parsed,
        Err(message) => {
            return finish(&state, &trace, "create", bytes.len(), invalid_body(&trace, &message));
        }
    };
    let client = client_info(&headers, Some(peer.ip()));
    let request = CreateSubmission {
        mode,
        fields,
        client,
    };
    let result = call_blocking(|| state.controller.create(&trace, request));
    let response = match result {
        Ok(receipt) => success(&trace, &receipt, StatusCode::CREATED),
        Err(error) => error_response(&trace, &error),
    };
    finish(&state, &trace, "create", bytes.len(), response)
}

/// Handles `PATCH /submissions/{id}`.
async fn handle_patch(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> (StatusCode, axum::Json<Value>) {
    let trace = TraceId::generate(unix_millis());
    if bytes.len() > state.max_body_bytes {
        return finish(&state, &trace, "patch", bytes.len(), too_large(&trace));
    }
    let patch: SubmissionPatch = match serde_json::from_slice(&bytes) {
        Ok(patch) => patch,
        Err(err) => {
            return finish(
                &state,
                &trace,
                "patch",
                bytes.len(),
                invalid_body(&trace, &err.to_string()),
            );
        }
    };
    let client = client_info(&headers, Some(peer.ip()));
    let submission_id = SubmissionId::from(id);
    let result = call_blocking(|| state.controller.patch(&trace, &submission_id, &patch, &client));
    let response = match result {
        Ok(receipt) => success(&trace, &receipt, StatusCode::OK),
        Err(error) => error_response(&trace, &error),
    };
    finish(&state, &trace, "patch", bytes.len(), response)
}

/// Handles `GET /healthz`.
async fn handle_health(State(state): State<Arc<ServerState>>) -> (StatusCode, axum::Json<Value>) {
    match call_blocking(|| state.controller.readiness()) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "status": "ok" }))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            axum::Json(json!({ "status": "unavailable" })),
        ),
    }
}

/// Runs controller work in a blocking-friendly context.
fn call_blocking<T>(work: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}

// ============================================================================
// SECTION: Request Parsing
// ============================================================================

/// Parses a creation body into its mode and first-step fields.
fn parse_create_body(bytes: &[u8]) -> Result<(FormMode, SubmissionPatch), String> {
    let mut value: Value =
        serde_json::from_slice(bytes).map_err(|err| format!("invalid json body: {err}"))?;
    let Some(object) = value.as_object_mut() else {
        return Err("body must be a json object".to_string());
    };
    let Some(mode_value) = object.remove("formMode") else {
        return Err("formMode is required".to_string());
    };
    let mode: FormMode = serde_json::from_value(mode_value)
        .map_err(|_| "formMode must be one of initial, partial, full".to_string())?;
    let patch: SubmissionPatch =
        serde_json::from_value(value).map_err(|err| err.to_string())?;
    Ok((mode, patch))
}

/// Extracts client attribution from headers and the peer address.
fn client_info(headers: &HeaderMap, peer: Option<IpAddr>) -> ClientInfo {
    ClientInfo {
        ip: client_ip(headers, peer),
        user_agent: headers.get(USER_AGENT).and_then(|value| value.to_str().ok()).map(str::to_string),
    }
}

/// Resolves the client IP: `x-forwarded-for` (first entry), then
/// `x-real-ip`, then the peer address, then the unknown sentinel.
fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    if let Some(value) = headers.get("x-forwarded-for").and_then(|value| value.to_str().ok())
        && let Some(first) = value.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if let Some(value) = headers.get("x-real-ip").and_then(|value| value.to_str().ok()) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    peer.map_or_else(|| UNKNOWN_CLIENT_IP.to_string(), |ip| ip.to_string())
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Builds a success response body.
fn success(
    trace: &TraceId,
    receipt: &SubmissionReceipt,
    status: StatusCode,
) -> (StatusCode, Value) {
    (
        status,
        json!({
            "success": true,
            "id": receipt.id.as_str(),
            "traceId": trace.as_str(),
        }),
    )
}

/// Maps a controller error onto a structured HTTP response.
fn error_response(trace: &TraceId, error: &IntakeError) -> (StatusCode, Value) {
    match error {
        IntakeError::RateLimitExceeded {
            retry_after_ms,
        } => (
            StatusCode::TOO_MANY_REQUESTS,
            json!({
                "code": error.code(),
                "message": "Too many requests. Please try again later.",
                "traceId": trace.as_str(),
                "retryAfter": retry_after_ms,
            }),
        ),
        IntakeError::ValidationFailed {
            errors,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "code": error.code(),
                "message": "Invalid form data",
                "errors": errors,
                "traceId": trace.as_str(),
            }),
        ),
        IntakeError::NotFound => (
            StatusCode::NOT_FOUND,
            json!({
                "code": error.code(),
                "message": "Submission not found",
                "traceId": trace.as_str(),
            }),
        ),
        IntakeError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "code": error.code(),
                "message": "Failed to process submission. Please try again.",
                "traceId": trace.as_str(),
            }),
        ),
    }
}

/// Builds the payload-too-large response.
fn too_large(trace: &TraceId) -> (StatusCode, Value) {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        json!({
            "code": "PAYLOAD_TOO_LARGE",
            "message": "request body too large",
            "traceId": trace.as_str(),
        }),
    )
}

/// Builds the unparseable-body response.
fn invalid_body(trace: &TraceId, message: &str) -> (StatusCode, Value) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({
            "code": "VALIDATION_ERROR",
            "message": message,
            "traceId": trace.as_str(),
        }),
    )
}

/// Records the audit line and finalizes the handler response.
fn finish(
    state: &ServerState,
    trace: &TraceId,
    endpoint: &'static str,
    request_bytes: usize,
    response: (StatusCode, Value),
) -> (StatusCode, axum::Json<Value>) {
    let (status, body) = response;
    let outcome = if status.is_success() {
        AuditOutcome::Success
    } else if status.is_client_error() {
        AuditOutcome::ClientError
    } else {
        AuditOutcome::ServerError
    };
    let error_code = body.get("code").and_then(Value::as_str).map(|code| match code {
        "RATE_LIMIT_EXCEEDED" => "RATE_LIMIT_EXCEEDED",
        "VALIDATION_ERROR" => "VALIDATION_ERROR",
        "NOT_FOUND" => "NOT_FOUND",
        "PAYLOAD_TOO_LARGE" => "PAYLOAD_TOO_LARGE",
        _ => "INTERNAL_ERROR",
    });
    state.audit.record(&IntakeAuditEvent::new(
        trace.as_str().to_string(),
        endpoint,
        outcome,
        status.as_u16(),
        error_code,
        request_bytes,
    ));
    (status, axum::Json(body))
}

// ============================================================================
// SECTION: Shutdown
// ============================================================================

/// Completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Intake server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
