use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};

/// One multipart field as seen by the stub server.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    received: Arc<Mutex<Vec<ReceivedPart>>>,
}

pub struct StubServer {
    pub addr: SocketAddr,
    pub received: Arc<Mutex<Vec<ReceivedPart>>>,
}

impl StubServer {
    pub fn url(&self) -> String {
        format!("http://{}/submit", self.addr)
    }

    pub fn parts(&self) -> Vec<ReceivedPart> {
        self.received.lock().unwrap().clone()
    }
}

/// Serve `/submit` on an ephemeral port, answering every upload with
/// `status` and `body`. The server runs on its own runtime thread so the
/// blocking client can be driven from the test thread.
pub fn spawn_stub(status: u16, body: &'static str) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        received: Arc::clone(&received),
    };

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new()
                .route("/submit", post(submit))
                .with_state(state);
            axum::serve(listener, app).await.unwrap();
        });
    });

    StubServer { addr, received }
}

async fn submit(
    State(state): State<StubState>,
    mut multipart: Multipart,
) -> (StatusCode, &'static str) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.received.lock().unwrap().push(ReceivedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
    (state.status, state.body)
}

/// Accept one connection and never answer it.
pub fn spawn_stalling() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            std::thread::sleep(Duration::from_secs(10));
            drop(stream);
        }
    });
    format!("http://{}/submit", addr)
}

/// Accept one connection, read the request and reply with `raw` bytes
/// that are not a valid HTTP response.
pub fn spawn_raw(raw: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 64 * 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(raw);
            let _ = stream.flush();
            std::thread::sleep(Duration::from_millis(500));
        }
    });
    format!("http://{}/submit", addr)
}

/// Writer whose every write fails, standing in for a closed stdout.
pub struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A URL on a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/submit", addr)
}

pub fn write_sample(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
