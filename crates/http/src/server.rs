use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use http::{header, Method, Request, Response, StatusCode};
use hyper::{
    body::{Bytes, Incoming},
    server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    task,
};
use tracing::Instrument;

use crate::{
    body,
    instrument::{record_response, request_span},
    Body, Route, SecretEndpoint, SECRET_ROUTE,
};

/// An HTTP server hosting the secret endpoint.
pub struct HttpServer {
    /// The address the server is listening on.
    listen_addr: SocketAddr,
    endpoint: SecretEndpoint,
}

impl HttpServer {
    /// Create a new [`HttpServer`].
    pub fn new(listen_addr: SocketAddr, endpoint: SecretEndpoint) -> Self {
        Self {
            listen_addr,
            endpoint,
        }
    }

    /// Binds the configured address and serves requests until the task is
    /// dropped.
    pub async fn serve(self: Arc<Self>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.listen_addr).await.with_context(|| {
            format!(
                "Unable to listen on {listen_addr}",
                listen_addr = self.listen_addr
            )
        })?;
        self.serve_listener(listener).await
    }

    /// Serve incoming requests over the provided [`TcpListener`].
    pub async fn serve_listener(self: Arc<Self>, listener: TcpListener) -> anyhow::Result<()> {
        let local_addr = listener.local_addr()?;
        println!("Serving http://{local_addr}{SECRET_ROUTE}");
        tracing::info!("Serving http://{local_addr}");
        loop {
            let (stream, client_addr) = listener.accept().await?;
            self.clone().serve_connection(stream, client_addr);
        }
    }

    /// Routes a request.
    ///
    /// The request body and query are never read.
    pub async fn handle<B>(&self, req: Request<B>) -> anyhow::Result<Response<Body>> {
        let route = Route::resolve(req.uri().path());
        let response = match route {
            Route::Health => Response::new(body::full(Bytes::from_static(b"OK"))),
            Route::Secret if req.method() == Method::GET => self.endpoint.respond().await?,
            Route::Secret => Self::method_not_allowed()?,
            Route::Unmatched => Self::not_found()?,
        };
        record_response(route, response.status());
        Ok(response)
    }

    /// Creates an HTTP 404 response.
    fn not_found() -> anyhow::Result<Response<Body>> {
        Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(body::empty())?)
    }

    /// Creates an HTTP 405 response.
    fn method_not_allowed() -> anyhow::Result<Response<Body>> {
        Ok(Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(header::ALLOW, "GET")
            .body(body::empty())?)
    }

    fn serve_connection<S: AsyncRead + AsyncWrite + Unpin + Send + 'static>(
        self: Arc<Self>,
        stream: S,
        client_addr: SocketAddr,
    ) {
        task::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(
                    TokioIo::new(stream),
                    service_fn(move |request| self.clone().serve_request(client_addr, request)),
                )
                .await
            {
                tracing::warn!("Error serving HTTP connection: {err:?}");
            }
        });
    }

    async fn serve_request(
        self: Arc<Self>,
        client_addr: SocketAddr,
        request: Request<Incoming>,
    ) -> anyhow::Result<Response<Body>> {
        let span = request_span(&request, client_addr);
        async {
            self.handle(request).await.inspect_err(|err| {
                tracing::error!("Error handling request: {err:?}");
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use secret_demo_identity::StaticTokenCredential;
    use secret_demo_key_vault::key_vault_connector;

    use super::*;
    use crate::EndpointConfig;

    fn server(vault_url: Option<&str>) -> HttpServer {
        HttpServer::new(
            "127.0.0.1:0".parse().unwrap(),
            SecretEndpoint::new(
                EndpointConfig::new(vault_url.map(String::from)),
                key_vault_connector(Arc::new(StaticTokenCredential::new("token"))),
            ),
        )
    }

    async fn body_bytes(response: Response<Body>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn health_check() -> anyhow::Result<()> {
        let response = server(None)
            .handle(Request::get("/.well-known/secret-demo/health").body(())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, "OK");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() -> anyhow::Result<()> {
        for path in ["/", "/api/GetSecrets", "/api/GetSecret/extra", "/.well-known/secret-demo/info"] {
            let response = server(None).handle(Request::get(path).body(())?).await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn only_get_is_allowed() -> anyhow::Result<()> {
        let response = server(None)
            .handle(Request::post(SECRET_ROUTE).body("payload")?)
            .await?;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
        Ok(())
    }

    #[tokio::test]
    async fn missing_vault_url_is_a_server_error() -> anyhow::Result<()> {
        let response = server(None)
            .handle(Request::get(SECRET_ROUTE).body(())?)
            .await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_bytes(response).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn query_string_is_ignored() -> anyhow::Result<()> {
        let response = server(Some(""))
            .handle(Request::get("/api/GetSecret?name=OtherSecret").body(())?)
            .await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
