use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper::body::Incoming;
use hyper::header;
use hyper::server::conn::http1;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::database::utils::get_timestamp;
use crate::handlers::http::routes::{Router, shared_router};
use crate::handlers::http::utils::ClientAddr;
use crate::tower_middle::TimeoutLayer;

/// Accept connections on `listener` until `shutdown` resolves, then let
/// in-flight connections finish (bounded by the request timeout).
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let (max_connections, request_timeout) = {
        let cfg = state.config.read().await;
        (
            cfg.server.max_connections,
            Duration::from_secs(cfg.server.request_timeout_secs),
        )
    };

    let router = shared_router();
    let permits = Arc::new(Semaphore::new(max_connections));
    let (stop_tx, stop_rx) = watch::channel(false);

    info!(
        "Listening on http://{}",
        listener.local_addr().context("Listener has no local address")?
    );

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };

                let Ok(permit) = permits.clone().try_acquire_owned() else {
                    warn!("Connection limit reached, dropping {}", peer);
                    continue;
                };

                let svc = ServiceBuilder::new()
                    .layer(SetSensitiveHeadersLayer::new([
                        header::AUTHORIZATION,
                        header::COOKIE,
                        header::SET_COOKIE,
                    ]))
                    .layer(TimeoutLayer::new(request_timeout))
                    .service(RouterService {
                        router: router.clone(),
                        state: state.clone(),
                        peer: ClientAddr(peer),
                    });

                let mut stop = stop_rx.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let conn = http1::Builder::new()
                        .timer(TokioTimer::new())
                        .header_read_timeout(request_timeout)
                        .serve_connection(TokioIo::new(stream), TowerToHyperService::new(svc));
                    tokio::pin!(conn);

                    let result = tokio::select! {
                        res = conn.as_mut() => res,
                        _ = stop.changed() => {
                            conn.as_mut().graceful_shutdown();
                            conn.await
                        }
                    };

                    if let Err(err) = result {
                        debug!("Error serving connection from {}: {:?}", peer, err);
                    }
                });
            }
        }
    }

    let _ = stop_tx.send(true);

    // Every live connection holds a permit; getting them all back means the
    // last one has closed.
    let drained = tokio::time::timeout(
        request_timeout,
        permits.acquire_many(max_connections as u32),
    )
    .await;
    match drained {
        Ok(_) => info!("All connections closed"),
        Err(_) => warn!("Timed out waiting for connections to close"),
    }

    Ok(())
}

/// Per-connection service: tags the request with the peer address and hands
/// it to the router.
#[derive(Clone)]
struct RouterService {
    router: Arc<Router>,
    state: AppState,
    peer: ClientAddr,
}

impl tower::Service<Request<Incoming>> for RouterService {
    type Response = crate::handlers::http::HttpResponse;
    type Error = Infallible;
    type Future = std::pin::Pin<
        Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: Request<Incoming>) -> Self::Future {
        req.extensions_mut().insert(self.peer);
        let router = self.router.clone();
        let state = self.state.clone();
        Box::pin(async move { Ok(router.dispatch(req, state).await) })
    }
}

/// Start the background sweeps: expired revocation entries and elapsed
/// login-limit windows.
pub fn spawn_sweepers(
    state: &AppState,
    revocation_every: Duration,
    limiter_every: Duration,
) -> Vec<JoinHandle<()>> {
    let revocations = state.validator.revocations().clone();
    let revocation_task = tokio::spawn(async move {
        let mut tick = tokio::time::interval(revocation_every.max(Duration::from_secs(1)));
        loop {
            tick.tick().await;
            let removed = revocations.sweep(get_timestamp()).await;
            if removed > 0 {
                debug!("Swept {} expired revocation entries", removed);
            }
        }
    });

    let limiter = state.verifier.limiter().clone();
    let limiter_task = tokio::spawn(async move {
        let mut tick = tokio::time::interval(limiter_every.max(Duration::from_secs(1)));
        loop {
            tick.tick().await;
            let removed = limiter.cleanup().await;
            if removed > 0 {
                debug!("Dropped {} elapsed login windows", removed);
            }
        }
    });

    vec![revocation_task, limiter_task]
}
