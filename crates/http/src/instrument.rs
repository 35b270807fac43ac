use std::net::SocketAddr;

use http::{Request, StatusCode};
use tracing::{field::Empty, Span};

/// Which part of the server answered a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Secret,
    Health,
    Unmatched,
}

impl Route {
    /// Matches a request path; the query string plays no part.
    pub fn resolve(path: &str) -> Route {
        match path {
            crate::SECRET_ROUTE => Route::Secret,
            crate::HEALTH_ROUTE => Route::Health,
            _ => Route::Unmatched,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Secret => crate::SECRET_ROUTE,
            Route::Health => crate::HEALTH_ROUTE,
            Route::Unmatched => "",
        }
    }
}

/// The span covering one request. Route and status are filled in by
/// [`record_response`].
pub(crate) fn request_span<B>(request: &Request<B>, client_addr: SocketAddr) -> Span {
    tracing::info_span!(
        "secret_demo_http.request",
        otel.kind = "server",
        http.request.method = %request.method(),
        url.path = request.uri().path(),
        client.address = %client_addr.ip(),
        http.route = Empty,
        http.response.status_code = Empty,
    )
}

pub(crate) fn record_response(route: Route, status: StatusCode) {
    let span = Span::current();
    if route != Route::Unmatched {
        span.record("http.route", route.as_str());
    }
    span.record("http.response.status_code", status.as_u16());
    tracing::info!("Request finished with status {status}");
}
