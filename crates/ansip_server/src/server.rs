//! HTTP serving loop.

use crate::handler::RequestHandler;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn, Instrument};

/// Largest request body read before answering 400.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(5);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// The SIP008 server.
///
/// Owns one [`RequestHandler`] shared by every connection. State lives in
/// memory only and is lost when the server is dropped.
///
/// # Example
///
/// ```no_run
/// use ansip_server::Sip008Server;
/// use tokio::net::TcpListener;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let listener = TcpListener::bind("127.0.0.1:8080").await?;
/// Sip008Server::new().serve(listener, None).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sip008Server {
    handler: Arc<RequestHandler>,
}

impl Sip008Server {
    /// Creates a server with empty stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a server around an existing handler.
    pub fn with_handler(handler: Arc<RequestHandler>) -> Self {
        Self { handler }
    }

    /// Returns the shared request handler.
    pub fn handler(&self) -> &Arc<RequestHandler> {
        &self.handler
    }

    /// Serves connections from `listener` forever.
    pub async fn serve(&self, listener: TcpListener, tls: Option<TlsAcceptor>) {
        self.serve_with_shutdown(listener, tls, std::future::pending())
            .await
    }

    /// Serves connections from `listener` until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve_with_shutdown<F>(
        &self,
        listener: TcpListener,
        tls: Option<TlsAcceptor>,
        shutdown: F,
    ) where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, tls = tls.is_some(), "listening");
        }

        tokio::pin!(shutdown);
        let mut backoff = None;
        loop {
            let accepted = tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down");
                    return;
                }
                accepted = listener.accept() => accepted,
            };

            let (stream, remote) = match accepted {
                Ok(pair) => {
                    backoff = None;
                    pair
                }
                Err(e) => {
                    // Usually fd exhaustion.
                    let delay = next_backoff(backoff);
                    backoff = Some(delay);
                    warn!(error = %e, ?delay, "accept failed");
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("shutting down");
                            return;
                        }
                        _ = tokio::time::sleep(delay) => continue,
                    }
                }
            };

            let handler = Arc::clone(&self.handler);
            let tls = tls.clone();
            tokio::spawn(async move {
                match tls {
                    Some(acceptor) => match acceptor.accept(stream).await {
                        Ok(stream) => serve_connection(handler, stream, remote).await,
                        Err(e) => warn!(%remote, error = %e, "tls handshake failed"),
                    },
                    None => serve_connection(handler, stream, remote).await,
                }
            });
        }
    }
}

async fn serve_connection<S>(handler: Arc<RequestHandler>, stream: S, remote: SocketAddr)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |request: Request<Incoming>| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, Infallible>(handle_request(&handler, request, remote).await) }
    });

    if let Err(e) = http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .await
    {
        debug!(%remote, error = %e, "connection closed with error");
    }
}

async fn handle_request<B>(
    handler: &RequestHandler,
    request: Request<B>,
    remote: SocketAddr,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let span = tracing::debug_span!("request", %remote);
    let (parts, body) = request.into_parts();

    let body = match read_body(body, MAX_BODY_BYTES).instrument(span.clone()).await {
        Ok(body) => body,
        Err(e) => {
            span.in_scope(|| {
                if e.is::<LengthLimitError>() {
                    warn!(limit = MAX_BODY_BYTES, "request body too large");
                } else {
                    warn!(error = %e, "failed to read request body");
                }
            });
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return response;
        }
    };

    span.in_scope(|| handler.handle(Request::from_parts(parts, body)))
        .map(Full::new)
}

fn next_backoff(current: Option<Duration>) -> Duration {
    match current {
        None => ACCEPT_BACKOFF_MIN,
        Some(delay) => (delay * 2).min(ACCEPT_BACKOFF_MAX),
    }
}

/// Collects `body`, failing once more than `limit` bytes have arrived.
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, Box<dyn StdError + Send + Sync>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    Ok(Limited::new(body, limit).collect().await?.to_bytes())
}
