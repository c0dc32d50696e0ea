use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        body::Body,
        extract::{FromRequest, Multipart, Request, State},
        http::{Method, StatusCode, header, request::Parts},
        response::{IntoResponse, Json, Response},
    },
    tokio::{net::TcpListener, sync::oneshot, task::JoinHandle},
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{info, warn},
};

use smsgate_sms::{ReportBus, report::log_reports};

use crate::{
    dispatch::{Outcome, dispatch},
    envelope::Envelope,
    state::GatewayState,
};

/// Cap on request bodies. Far above any real send request; guards the
/// unbounded read in the fallback handler.
const BODY_LIMIT: usize = 1024 * 1024;

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct AppState {
    gateway: Arc<GatewayState>,
}

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
///
/// The send path is runtime configuration, so routing happens inside a
/// single fallback handler instead of static routes.
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(dispatch_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { gateway: state })
}

// ── Handler ──────────────────────────────────────────────────────────────────

fn respond(status: StatusCode, envelope: Envelope) -> Response {
    (status, Json(envelope)).into_response()
}

fn internal(message: impl Into<String>) -> Response {
    respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        Envelope::internal(message),
    )
}

/// Handle one request end to end. Always produces an envelope: parse
/// failures map to 500, everything else goes through [`dispatch`].
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    // Query-string parameters first; body parameters override on collision.
    let query = parts.uri.query().unwrap_or("");
    let mut params: HashMap<String, String> = match serde_urlencoded::from_str(query) {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, "failed to parse query string");
            return internal(e.to_string());
        },
    };

    // The body is only consulted for POST, like the original gateway —
    // and parsed before routing, so a malformed POST body is a 500 on
    // every path.
    if method == Method::POST {
        match read_body_params(parts, body).await {
            Ok(form) => params.extend(form),
            Err(text) => {
                warn!(error = %text, "failed to parse request body");
                return internal(text);
            },
        }
    }

    let config = state.gateway.config().await;
    match dispatch(&config, &method, &path, &params) {
        Outcome::Dispatched { phone, message } => {
            let sender = state.gateway.sender();
            // Fire-and-forget: the response does not wait on the transport,
            // and transport errors are logged only.
            tokio::spawn(async move {
                if let Err(e) = sender.send(&phone, &message).await {
                    warn!(phone = %phone, error = %e, "transport send failed");
                }
            });
            respond(StatusCode::OK, Envelope::sent())
        },
        Outcome::Welcome => respond(StatusCode::OK, Envelope::welcome()),
        Outcome::Forbidden => respond(StatusCode::FORBIDDEN, Envelope::forbidden()),
        Outcome::NotFound => respond(StatusCode::NOT_FOUND, Envelope::not_found()),
    }
}

/// Extract POST body parameters: multipart/form-data when the content type
/// says so, form-urlencoded otherwise. Errors carry the parser's text,
/// which ends up in the 500 envelope.
async fn read_body_params(parts: Parts, body: Body) -> Result<HashMap<String, String>, String> {
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("multipart/form-data") {
        return read_multipart_params(Request::from_parts(parts, body)).await;
    }

    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| e.to_string())?;
    let text = std::str::from_utf8(&bytes).map_err(|e| e.to_string())?;
    serde_urlencoded::from_str(text).map_err(|e| e.to_string())
}

/// Collect multipart fields into a parameter map. Unnamed fields are
/// skipped; file parts are read as text like any other field.
async fn read_multipart_params(request: Request) -> Result<HashMap<String, String>, String> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| e.body_text())?;

    let mut params = HashMap::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field.text().await.map_err(|e| e.body_text())?;
                params.insert(name, value);
            },
            Ok(None) => return Ok(params),
            Err(e) => return Err(e.body_text()),
        }
    }
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// A running gateway: listener plus the delivery-report logger.
///
/// Start order: subscribe the report bus, then bind and serve — no report
/// can arrive before its logger exists. Stop order: drop the subscription,
/// then shut the listener down. A restarted gateway takes a fresh
/// [`ReportBus`], so subscriptions never leak across restarts.
pub struct Gateway {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<()>,
    reports: JoinHandle<()>,
}

impl Gateway {
    /// Bind and serve using the bind/port from the state's current config.
    pub async fn start(state: Arc<GatewayState>, bus: &ReportBus) -> anyhow::Result<Self> {
        let config = state.config().await;

        // Subscribe before accepting connections.
        let rx = bus.subscribe()?;
        let reports = tokio::spawn(log_reports(rx));

        let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                reports.abort();
                return Err(e.into());
            },
        };
        let addr = listener.local_addr()?;

        // Startup banner.
        let gate = if config.password.required {
            "password required"
        } else {
            "open"
        };
        let lines = [
            format!("smsgate gateway v{}", env!("CARGO_PKG_VERSION")),
            format!("listening on {addr}"),
            format!(
                "send endpoint: {} {} ({gate})",
                config.method.as_str(),
                config.path
            ),
        ];
        let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
        info!("┌{}┐", "─".repeat(width));
        for line in &lines {
            info!("│  {:<w$}│", line, w = width - 2);
        }
        info!("└{}┘", "─".repeat(width));

        let app = build_gateway_app(state);
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                warn!(error = %e, "gateway server error");
            }
        });

        Ok(Self {
            addr,
            shutdown,
            server,
            reports,
        })
    }

    /// The bound address (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop the report logger, then shut the listener down.
    pub async fn stop(self) {
        self.reports.abort();
        let _ = self.shutdown.send(());
        let _ = self.server.await;
    }
}
