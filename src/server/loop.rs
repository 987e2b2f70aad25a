// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` completes.
///
/// Connections already being served keep running in their own tasks; they
/// end with the runtime.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_shutdown();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use crate::storage::testing::FailingStore;
    use crate::storage::{DiskStore, FileStore, MemoryStore};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    struct TestServer {
        addr: SocketAddr,
        stop: oneshot::Sender<()>,
        task: JoinHandle<()>,
    }

    impl TestServer {
        fn start(store: Arc<dyn FileStore>) -> Self {
            let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
            let addr = listener.local_addr().unwrap();
            let state = Arc::new(AppState::new(Config::default(), store));
            let (stop, stop_rx) = oneshot::channel::<()>();
            let task = tokio::spawn(start_server_loop(listener, state, async move {
                let _ = stop_rx.await;
            }));
            Self { addr, stop, task }
        }

        /// Send raw request bytes and read until the server closes the connection
        async fn exchange(&self, raw: &[u8]) -> String {
            let mut stream = TcpStream::connect(self.addr).await.unwrap();
            stream.write_all(raw).await.unwrap();

            let mut received = Vec::new();
            let mut chunk = [0u8; 4096];
            let read_all = async {
                loop {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => received.extend_from_slice(&chunk[..n]),
                    }
                }
            };
            tokio::time::timeout(Duration::from_secs(5), read_all)
                .await
                .expect("server kept the connection open");
            String::from_utf8_lossy(&received).into_owned()
        }

        async fn stop(self) {
            self.stop.send(()).unwrap();
            self.task.await.unwrap();
        }
    }

    const LIST_AND_CLOSE: &str = "GET /files HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n";

    #[tokio::test]
    async fn test_serves_requests_until_shutdown() {
        let server = TestServer::start(Arc::new(MemoryStore::new()));

        let text = server
            .exchange(b"PUT /files/a.txt HTTP/1.1\r\nHost: test\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello")
            .await;
        assert!(text.starts_with("HTTP/1.1 201"), "got: {text}");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_get_directory_on_disk_aborts_connection() {
        let tmp = tempfile::tempdir().unwrap();
        // An entry keeps the directory size non-zero on every filesystem
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("sub").join("inner.txt"), b"x").unwrap();
        let server = TestServer::start(Arc::new(DiskStore::new(tmp.path())));

        let request = format!(
            "HEAD /files/sub HTTP/1.1\r\nHost: test\r\n\r\n\
             GET /files/sub HTTP/1.1\r\nHost: test\r\n\r\n\
             {LIST_AND_CLOSE}"
        );
        let text = server.exchange(request.as_bytes()).await.to_lowercase();

        assert!(text.starts_with("http/1.1 200"), "got: {text}");
        assert!(!text.contains("content-length: 0\r\n"), "got: {text}");
        // The GET never completes, so the listing queued behind it is never answered
        assert!(!text.contains("application/json"), "got: {text}");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_read_failure_midway_aborts_connection() {
        let store = FailingStore {
            fail_read: true,
            ..FailingStore::default()
        };
        let mut writer = store.inner.create("a.txt").await.unwrap();
        writer.write_all(b"0123456789").await.unwrap();
        writer.shutdown().await.unwrap();
        let server = TestServer::start(Arc::new(store));

        let request =
            format!("GET /files/a.txt HTTP/1.1\r\nHost: test\r\n\r\n{LIST_AND_CLOSE}");
        let text = server.exchange(request.as_bytes()).await;

        assert!(!text.contains("0123456789"), "got: {text}");
        assert!(!text.contains("application/json"), "got: {text}");

        server.stop().await;
    }
}
