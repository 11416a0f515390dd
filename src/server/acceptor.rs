use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

use crate::server::session::run_session;
use crate::server::tls::server_acceptor;
use crate::server::{AppState, ServerConfig, ServerError, SharedState, Transport};

/// Pause after a failed accept so a persistent failure does not spin
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound listener ready to accept connections
pub struct Server {
    listener: TcpListener,
    state: SharedState,
    tls: Option<TlsAcceptor>,
    max_message_bytes: usize,
}

impl Server {
    /// Bind the listening socket and prepare TLS if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate or key cannot be loaded or the
    /// address cannot be bound.
    pub async fn bind(config: &ServerConfig, state: SharedState) -> Result<Self, ServerError> {
        let tls = match &config.transport {
            Transport::Tls { cert, key } => {
                let acceptor = server_acceptor(cert, key)?;
                info!("TLS configured with certificate {}", cert.display());
                Some(acceptor)
            }
            Transport::Plaintext => {
                warn!("Serving without TLS; traffic is unencrypted");
                None
            }
        };

        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;

        Ok(Self {
            listener,
            state,
            tls,
            max_message_bytes: config.max_message_bytes,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` completes.
    ///
    /// Sessions already running are not interrupted.
    pub async fn serve_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        match self.listener.local_addr() {
            Ok(addr) => info!("Genomic server listening on {addr}"),
            Err(e) => warn!("Listening on an unknown address: {e}"),
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested; no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => {
                        error!("Error accepting client connection: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let state = Arc::clone(&self.state);
        let tls = self.tls.clone();
        let max_message_bytes = self.max_message_bytes;

        tokio::spawn(async move {
            info!("Client connected from: {peer}");
            match tls {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls_stream) => run_session(tls_stream, state, max_message_bytes, peer).await,
                    Err(e) => warn!("TLS handshake with {peer} failed: {e}"),
                },
                None => run_session(stream, state, max_message_bytes, peer).await,
            }
        });
    }
}

/// Load state, bind, and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if startup fails. Errors inside sessions are handled there.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::open(config.paths.clone(), config.replay)?);
    let server = Server::bind(&config, Arc::clone(&state)).await?;

    #[cfg(unix)]
    reload_catalog_on_hangup(state);

    server.serve_until(ctrl_c()).await;
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C, running until killed: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
fn reload_catalog_on_hangup(state: SharedState) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("SIGHUP catalog reload unavailable: {e}");
            return;
        }
    };

    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!("SIGHUP received; reloading disease catalog");
            let reload_state = Arc::clone(&state);
            match tokio::task::spawn_blocking(move || reload_state.reload_catalog()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => error!("Catalog reload failed, keeping previous catalog: {e}"),
                Err(e) => error!("Catalog reload task failed: {e}"),
            }
        }
    });
}
