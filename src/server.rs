/// HTTP endpoint for working-time calculations
/// `GET /<any>?days=N&hours=N&date=ISO` plus `/`, `/health`, `/metrics` and `/debug/holidays`

use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::CalcError;
use crate::metrics::{RequestMetrics, RequestStats};
use crate::service::{CalculationRequest, Calculator};

/// Timeout for reading HTTP request (prevents slow-loris attacks)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest request head we read
const MAX_REQUEST_BYTES: usize = 8 * 1024;

/// Largest accepted `days` or `hours`; the calculation runs inline on the connection task
pub const MAX_AMOUNT: u32 = 100_000;

/// Everything a connection task needs
pub struct AppState {
    pub calculator: Calculator,
    pub metrics: RequestMetrics,
    pub port: u16,
}

impl AppState {
    pub fn new(calculator: Calculator, port: u16) -> Self {
        Self {
            calculator,
            metrics: RequestMetrics::new(),
            port,
        }
    }
}

/// A complete response, written once and then the connection is closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self::internal_error()
            }
        }
    }

    fn text(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    fn error(status: u16, error: &'static str, message: impl Into<String>) -> Self {
        Self::json(
            status,
            &ErrorBody {
                error,
                message: message.into(),
            },
        )
    }

    fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::error(400, "InvalidParameters", message)
    }

    fn internal_error() -> Self {
        Self {
            status: 500,
            content_type: "application/json",
            body: r#"{"error":"InternalServerError","message":"An error occurred processing your request"}"#
                .to_string(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct HolidayListBody {
    count: usize,
    holidays: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    timezone: String,
    holidays: usize,
    requests_succeeded: u64,
    requests_rejected: u64,
    requests_failed: u64,
}

/// Bind to `0.0.0.0:port` and serve until cancelled
pub async fn run_server(
    port: u16,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server running on http://0.0.0.0:{}", port);
    serve(listener, state, cancel_token).await;
    Ok(())
}

/// Accept loop over an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>, cancel_token: CancellationToken) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((mut socket, peer_addr)) => {
                        let state = state.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(&mut socket, &state).await {
                                debug!("Error handling request from {}: {}", peer_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("Server shutting down");
                break;
            }
        }
    }
}

async fn handle_connection(socket: &mut TcpStream, state: &AppState) -> std::io::Result<()> {
    let mut buf = vec![0u8; MAX_REQUEST_BYTES];

    let n = match timeout(REQUEST_TIMEOUT, socket.read(&mut buf)).await {
        Ok(result) => result?,
        Err(_) => {
            debug!("Request timeout after {:?}", REQUEST_TIMEOUT);
            return Ok(());
        }
    };

    if n == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buf[..n]);

    // Request line: METHOD TARGET VERSION
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");

    let response = route(method, target, state);
    debug!("{} {} -> {}", method, target, response.status);

    socket.write_all(response.to_http().as_bytes()).await?;
    socket.flush().await?;

    Ok(())
}

/// Dispatch one request; pure apart from the metrics counters
pub fn route(method: &str, target: &str, state: &AppState) -> HttpResponse {
    if method != "GET" {
        return HttpResponse::error(405, "MethodNotAllowed", "Only GET is supported");
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    let params = parse_query(query);

    match path {
        "/" if !params.contains_key("days") && !params.contains_key("hours") => {
            build_banner_response(state)
        }
        "/debug/holidays" => {
            let holidays = state.calculator.holidays().snapshot();
            HttpResponse::json(
                200,
                &HolidayListBody {
                    count: holidays.len(),
                    holidays: holidays.sorted(),
                },
            )
        }
        "/health" | "/healthz" | "/health/" => build_health_response(state),
        "/metrics" => build_metrics_response(&state.metrics.stats()),
        _ => handle_calculation(&params, state),
    }
}

fn handle_calculation(params: &HashMap<String, String>, state: &AppState) -> HttpResponse {
    let request = match parse_calculation_params(params) {
        Ok(request) => request,
        Err(message) => {
            state.metrics.record_rejected();
            return HttpResponse::invalid_parameters(message);
        }
    };

    match state.calculator.calculate(&request) {
        Ok(result) => {
            state.metrics.record_success();
            HttpResponse::json(200, &result)
        }
        Err(e @ (CalcError::InvalidTimestamp(_) | CalcError::OutOfRange(_))) => {
            state.metrics.record_rejected();
            HttpResponse::invalid_parameters(e.to_string())
        }
        Err(e) => {
            error!("Calculation failed for {:?}: {}", request, e);
            state.metrics.record_failure();
            HttpResponse::internal_error()
        }
    }
}

/// Split `a=1&b=2` into decoded pairs. The first occurrence of a key wins.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.entry(decode(key)).or_insert_with(|| decode(value));
    }
    params
}

fn decode(s: &str) -> String {
    let s = s.replace('+', " ");
    let decoded = urlencoding::decode(&s).map(|d| d.into_owned());
    decoded.unwrap_or(s)
}

/// Validate `days`, `hours` and `date`. Empty values count as absent.
pub fn parse_calculation_params(params: &HashMap<String, String>) -> Result<CalculationRequest, String> {
    let get = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

    let days = get("days");
    let hours = get("hours");
    let date = get("date");

    if days.is_none() && hours.is_none() {
        return Err(r#"At least one of "days" or "hours" parameters is required"#.to_string());
    }

    let days = match days {
        Some(v) => parse_amount("days", v)?,
        None => 0,
    };
    let hours = match hours {
        Some(v) => parse_amount("hours", v)?,
        None => 0,
    };

    if let Some(date) = date {
        if !date.ends_with('Z') || !date.contains('T') {
            return Err(
                r#"Parameter "date" must be in ISO 8601 format with Z suffix (e.g., 2025-04-10T15:00:00.000Z)"#
                    .to_string(),
            );
        }
    }

    Ok(CalculationRequest {
        days,
        hours,
        start: date.map(str::to_string),
    })
}

fn parse_amount(key: &str, v: &str) -> Result<u32, String> {
    let n = parse_count(v).ok_or_else(|| format!(r#"Parameter "{}" must be a non-negative integer"#, key))?;
    if n > MAX_AMOUNT {
        return Err(format!(r#"Parameter "{}" must be at most {}"#, key, MAX_AMOUNT));
    }
    Ok(n)
}

fn parse_count(v: &str) -> Option<u32> {
    if v.bytes().all(|b| b.is_ascii_digit()) {
        v.parse().ok()
    } else {
        None
    }
}

fn build_banner_response(state: &AppState) -> HttpResponse {
    let holidays = state.calculator.holidays().snapshot();
    HttpResponse::text(
        200,
        "text/plain; charset=utf-8",
        format!(
            "Loaded {} holidays\nServer running on port {}\nTimezone: {}\nReady to accept requests\n",
            holidays.len(),
            state.port,
            state.calculator.gateway().timezone()
        ),
    )
}

fn build_health_response(state: &AppState) -> HttpResponse {
    let stats = state.metrics.stats();
    HttpResponse::json(
        200,
        &HealthBody {
            status: "healthy",
            timezone: state.calculator.gateway().timezone().to_string(),
            holidays: state.calculator.holidays().snapshot().len(),
            requests_succeeded: stats.succeeded,
            requests_rejected: stats.rejected,
            requests_failed: stats.failed,
        },
    )
}

fn build_metrics_response(stats: &RequestStats) -> HttpResponse {
    // Prometheus-compatible metrics format
    let body = format!(
        "# HELP workclock_calculations_total Calculation requests by outcome\n\
         # TYPE workclock_calculations_total counter\n\
         workclock_calculations_total{{result=\"success\"}} {}\n\
         workclock_calculations_total{{result=\"rejected\"}} {}\n\
         workclock_calculations_total{{result=\"failure\"}} {}\n",
        stats.succeeded, stats.rejected, stats.failed
    );
    HttpResponse::text(200, "text/plain; version=0.0.4", body)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Query parsing never panics, whatever the bytes
        #[test]
        fn parse_query_never_panics(q in ".*") {
            let _ = parse_query(&q);
        }

        /// Decimal amounts are accepted exactly up to the cap
        #[test]
        fn counts_parse(n in any::<u32>()) {
            let mut p = HashMap::new();
            p.insert("hours".to_string(), n.to_string());
            match parse_calculation_params(&p) {
                Ok(req) => {
                    prop_assert!(n <= MAX_AMOUNT);
                    prop_assert_eq!(req.hours, n);
                }
                Err(_) => prop_assert!(n > MAX_AMOUNT),
            }
        }
    }
}
