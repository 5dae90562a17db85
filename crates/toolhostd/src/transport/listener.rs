//! TCP listener and the serial accept loop.

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream, lookup_host};
use tracing::{debug, info, warn};

use super::{HttpService, ListenerError, TRANSPORT_TARGET};

const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Bound HTTP listener.
#[derive(Debug)]
pub struct HttpListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HttpListener {
    /// Resolves `host` and binds the first address it yields.
    ///
    /// Port zero binds an ephemeral port; see [`Self::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when resolution or binding fails.
    pub async fn bind(host: &str, port: u16) -> Result<Self, ListenerError> {
        let mut addrs = lookup_host((host, port))
            .await
            .map_err(|source| ListenerError::Resolve {
                host: host.to_owned(),
                port,
                source,
            })?;
        let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts and serves connections one at a time until `shutdown`
    /// resolves.
    ///
    /// Each connection carries a single request and is served to completion
    /// before the next accept. A connection still in flight when `shutdown`
    /// resolves is dropped.
    pub async fn serve<F>(self, service: HttpService, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            target: TRANSPORT_TARGET,
            addr = %self.local_addr,
            "http listener active"
        );
        tokio::pin!(shutdown);
        let mut last_error = None::<io::ErrorKind>;
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        last_error = None;
                        tokio::select! {
                            () = &mut shutdown => {
                                debug!(
                                    target: TRANSPORT_TARGET,
                                    peer = %peer,
                                    "dropping in-flight connection"
                                );
                                break;
                            }
                            () = serve_connection(stream, peer, &service) => {}
                        }
                    }
                    Err(error) => {
                        let kind = error.kind();
                        if last_error != Some(kind) {
                            warn!(
                                target: TRANSPORT_TARGET,
                                error = %error,
                                "accept error"
                            );
                        }
                        last_error = Some(kind);
                        tokio::time::sleep(ERROR_BACKOFF).await;
                    }
                },
            }
        }
        info!(target: TRANSPORT_TARGET, "http listener stopped");
    }
}

async fn serve_connection(stream: TcpStream, peer: SocketAddr, service: &HttpService) {
    let handler = service_fn(move |request: Request<Incoming>| async move {
        Ok::<_, Infallible>(service.respond(request).await)
    });
    let connection = http1::Builder::new()
        .keep_alive(false)
        .serve_connection(TokioIo::new(stream), handler);
    if let Err(error) = connection.await {
        debug!(
            target: TRANSPORT_TARGET,
            peer = %peer,
            error = %error,
            "connection ended with error"
        );
    }
}
