// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get to finish after shutdown
pub const DRAIN_WINDOW: Duration = Duration::from_secs(5);

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept and serve connections until `shutdown` resolves.
///
/// `shutdown` yields the name of whatever stopped the server, for the log.
/// Once it fires the listener is closed and open connections are given
/// `drain_window` to complete. Returns the number still open afterwards.
pub async fn run_server<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
    drain_window: Duration,
) -> usize
where
    S: Future<Output = &'static str>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            signal = &mut shutdown => {
                logger::log_shutdown_requested(signal);
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&state, drain_window).await
}

/// Wait for active connections to reach zero, up to `window`
async fn drain_connections(state: &AppState, window: Duration) -> usize {
    let deadline = Instant::now() + window;

    loop {
        let active = state.active_connections.load(Ordering::SeqCst);
        if active == 0 || Instant::now() >= deadline {
            logger::log_shutdown_complete(active);
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::routing::{site_router, CHAT_WEBHOOK_URL};
    use crate::server::{create_reusable_listener, LISTEN_BACKLOG};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let templates = tempfile::tempdir().unwrap();
        std::fs::write(templates.path().join("index.html"), "<main>home</main>").unwrap();

        let mut config = Config::load_from("does-not-exist/portal").unwrap();
        config.logging.access_log = false;
        config.site.templates_dir = templates.path().to_str().unwrap().to_string();
        let state = Arc::new(AppState::new(config, site_router().unwrap()));

        let listener =
            create_reusable_listener("127.0.0.1:0".parse().unwrap(), LISTEN_BACKLOG).unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(run_server(
            listener,
            Arc::clone(&state),
            async move {
                let _ = stop_rx.await;
                "test"
            },
            Duration::from_secs(2),
        ));

        let response = raw_request(
            addr,
            "GET / HTTP/1.1\r\nHost: portal\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains("<main>home</main>"));

        let response = raw_request(
            addr,
            "GET /s1q HTTP/1.1\r\nHost: portal\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 302 Found"), "{response}");
        assert!(response.contains(CHAT_WEBHOOK_URL));

        stop_tx.send(()).unwrap();
        let remaining = server.await.unwrap();
        assert_eq!(remaining, 0);
        assert!(TcpStream::connect(addr).await.is_err());
    }
}
