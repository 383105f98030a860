//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: reads the form body when one is
//! posted, resolves the route, checks the method and hands off to a handler.
//! Each request is bounded by `performance.request_timeout`.

use crate::config::AppState;
use crate::error::WikiError;
use crate::handler::{pages, static_files};
use crate::http::{self, form, FormValues};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Route};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::http::request::Parts;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let timeout_secs = state.config.performance.request_timeout;
    let served = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        respond(&parts, body, &state),
    )
    .await;
    let mut response = served.unwrap_or_else(|_| {
        let err = WikiError::Timeout(timeout_secs);
        logger::log_warning(&format!("{} {}: {}", parts.method, parts.uri.path(), err));
        http::build_error_response(err.status(), &err.to_string())
    });
    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(header::SERVER, value);
    }

    if state.access_log() {
        log_access(&parts, &response, peer_addr, started, &state);
    }
    Ok(response)
}

/// Read the body, then dispatch
async fn respond<B>(parts: &Parts, body: B, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match read_form_body(parts, body, state.config.http.max_body_size).await {
        Ok(form_body) => dispatch(parts, form_body.as_deref(), state).await,
        Err(err) => {
            logger::log_warning(&format!("{} {}: {}", parts.method, parts.uri.path(), err));
            http::build_error_response(err.status(), &err.detail())
        }
    }
}

/// Resolve the route and run its handler
pub async fn dispatch(
    parts: &Parts,
    form_body: Option<&[u8]>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let Some(route) = routing::match_route(parts.uri.path()) else {
        let err = WikiError::RouteMismatch(parts.uri.path().to_string());
        return http::build_error_response(err.status(), &err.to_string());
    };

    if parts.method == Method::OPTIONS {
        return http::build_options_response(&route.allow_header());
    }
    if !route.allows(&parts.method) {
        logger::log_warning(&format!(
            "Method not allowed: {} {}",
            parts.method,
            parts.uri.path()
        ));
        return http::build_405_response(&route.allow_header());
    }

    let is_head = parts.method == Method::HEAD;
    let route_name = route.name();
    let result = match route {
        Route::Index => pages::index(state, is_head).await,
        Route::View(title) => pages::view(state, &title, is_head).await,
        Route::Edit(title) => pages::edit(state, &title, is_head).await,
        Route::Save(title) => match form_body {
            Some(body) => {
                let form = FormValues::new(parts.uri.query(), Some(body));
                pages::save(state, title, &form).await
            }
            None => Err(WikiError::UnsupportedMediaType(
                header_str(parts, "content-type").unwrap_or("none").to_string(),
            )),
        },
        Route::New => {
            let form = FormValues::new(parts.uri.query(), form_body);
            Ok(pages::new_page(&form))
        }
        Route::Asset(relative) => {
            let if_none_match = header_str(parts, "if-none-match");
            return static_files::serve_asset(
                &state.config.storage.assets_dir,
                &relative,
                if_none_match,
                is_head,
            )
            .await;
        }
    };

    result.unwrap_or_else(|err| {
        let status = err.status();
        let detail = err.detail();
        logger::log_handler_error(route_name, status, &detail);
        http::build_error_response(status, &detail)
    })
}

/// Collect a urlencoded POST body, bounded by `max_body_size`
///
/// Other requests yield `None` without touching the body.
async fn read_form_body<B>(
    parts: &Parts,
    body: B,
    max_body_size: u64,
) -> Result<Option<Bytes>, WikiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if parts.method != Method::POST || !form::is_form_content_type(header_str(parts, "content-type"))
    {
        return Ok(None);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(Some(collected.to_bytes())),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(WikiError::BodyTooLarge(max_body_size))
        }
        Err(e) => Err(WikiError::BadRequest(e.to_string())),
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_access(
    parts: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = match parts.version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(parts, "referer").map(ToString::to_string);
    entry.user_agent = header_str(parts, "user-agent").map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}
