use crate::reddit_logic::config::Config;
use crate::reddit_logic::routes::health_handler;
use crate::reddit_logic::session::handle_socket;
use crate::reddit_logic::state::AppState;
use anyhow::Context;
use axum::{
    Router,
    extract::{State, ws::WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

/// WebSocket listener. Every accepted connection gets its own polling session.
pub struct BroadcastServer {
    listener: TcpListener,
}

impl BroadcastServer {
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(ws_handler))
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .with_state(state)
    }

    /// Accepts connections until `shutdown` resolves, then drops the listener.
    /// Sessions already upgraded run on until their clients disconnect.
    pub async fn serve<F>(self, state: AppState, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, Self::router(state))
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Serves on a background task.
    pub fn start(self, state: AppState) -> io::Result<ServerHandle> {
        let local_addr = self.local_addr()?;
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(self.serve(state, async move {
            stop_rx.await.ok();
        }));

        Ok(ServerHandle {
            local_addr,
            stop_tx,
            task,
        })
    }
}

pub struct ServerHandle {
    local_addr: SocketAddr,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Closes the listener and waits for it to be released.
    pub async fn stop(self) -> io::Result<()> {
        let _ = self.stop_tx.send(());
        self.task.await.map_err(io::Error::other)?
    }
}

pub async fn run(config: Config, state: AppState, mut shutdown: broadcast::Receiver<()>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.ws_port()));
    let server = BroadcastServer::bind(addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {addr}"))?;
    let handle = server.start(state)?;
    log::info!("WebSocket server listening on {}", handle.local_addr());

    shutdown.recv().await.ok();
    log::info!("WebSocket listener shutting down.");
    handle.stop().await?;
    Ok(())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}
