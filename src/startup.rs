//! Application startup and server initialization.
//!
//! Constructing a [`Server`] only builds the router; no socket is touched
//! until [`Server::listen`] is called. Tests rely on this to bind an
//! ephemeral port instead of the configured one.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::routes;

/// An HTTP server bound to its request handler but not yet listening.
#[derive(Clone)]
pub struct Server {
    router: Router,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Self {
        Server {
            router: routes::create_router(),
        }
    }

    /// The request handler, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Binds `addr` and starts accepting connections in a background task.
    ///
    /// # Errors
    ///
    /// Returns the bind error, e.g. when the address is already in use.
    pub async fn listen(self, addr: impl ToSocketAddrs) -> io::Result<RunningServer> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, self.router)
                .with_graceful_shutdown(async {
                    // Fires on close() and when the handle is dropped.
                    let _ = shutdown_rx.await;
                })
                .await
        });

        debug!(address = %local_addr, "Listener bound");

        Ok(RunningServer {
            local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Handle to a listening server. Dropping it stops the server.
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<io::Result<()>>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for the listener to be released.
    /// In-flight connections are allowed to finish.
    pub async fn close(mut self) -> io::Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.join().await
    }

    /// Serves until the server task ends.
    pub async fn wait(mut self) -> io::Result<()> {
        self.join().await
    }

    async fn join(&mut self) -> io::Result<()> {
        match self.task.take() {
            Some(task) => task.await.map_err(io::Error::other)?,
            None => Ok(()),
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Whether the binary should bind and serve. A test harness sets
/// `APP_ENV=test` so it can build and bind servers itself.
pub fn should_listen(config: &ServerConfig) -> bool {
    !config.is_test_env()
}

/// Initializes and runs the application server.
///
/// Binds to the address from the configuration, announces the port on
/// stdout and serves until the process is terminated.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = config.bind_address();
    info!("Starting server on {}", bind_address);

    let server = Server::new().listen(bind_address).await?;
    println!("🚀 Server is running on port {}", server.local_addr().port());

    server.wait().await?;
    Ok(())
}
