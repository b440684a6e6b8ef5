use std::sync::{Arc, Mutex, Once};

use noisemap_rs::{GeoPoint, Record};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

fn initialize_logger_once() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub mod shared {
    use super::*;

    /// Installs the test logger and loads `.env` if there is one.
    #[allow(dead_code)]
    pub fn setup() {
        initialize_logger_once();
        dotenvy::dotenv().ok();
    }

    #[allow(dead_code)]
    pub fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).expect("test coordinates are valid")
    }

    #[allow(dead_code)]
    pub fn restaurant(id: &str, lat: f64, lon: f64, noise: f64) -> Record {
        Record::new(id, format!("Restaurant {}", id), point(lat, lon), noise)
    }

    /// Writes `contents` to a uniquely named file in the temp dir.
    #[allow(dead_code)]
    pub fn write_temp_file(base: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}.json", base, Uuid::new_v4().simple()));
        std::fs::write(&path, contents).expect("Failed to write temp file");
        path
    }

    /// Requests received by a [`spawn_mock_server`] server, as raw request heads.
    pub type SeenRequests = Arc<Mutex<Vec<String>>>;

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }

    /// Starts a one-request-per-connection HTTP server on localhost.
    ///
    /// `handler` receives the request head (request line and headers) and returns
    /// the status code and JSON body. Returns the base URL and the request log.
    #[allow(dead_code)]
    pub async fn spawn_mock_server<F>(handler: F) -> (String, SeenRequests)
    where
        F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Mock server has no address");
        let seen: SeenRequests = Arc::new(Mutex::new(Vec::new()));
        let seen_by_server = seen.clone();
        let handler = Arc::new(handler);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let handler = handler.clone();
                let seen = seen_by_server.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buf).to_string();
                    seen.lock().unwrap().push(head.clone());
                    let (status, body) = handler(&head);
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason(status),
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), seen)
    }

    /// Reads an integer query parameter out of a request head.
    #[allow(dead_code)]
    pub fn query_param(head: &str, name: &str) -> Option<usize> {
        let request_line = head.lines().next()?;
        let query = request_line.split_whitespace().nth(1)?.split('?').nth(1)?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == name)
            .and_then(|(_, v)| v.parse().ok())
    }
}
