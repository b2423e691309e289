//! A minimal HTTP/1.1 server for exercising the OCR services without the network.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

enum Behaviour {
    Respond { status: u16, body: String },
    Stall(Duration),
    /// Status line and headers promising `length` bytes, then silence.
    HeadersThenStall {
        status: u16,
        length: usize,
        delay: Duration,
    },
}

pub struct FakeServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeServer {
    /// Answers every request with `status` and `body`.
    pub fn respond(status: u16, body: impl Into<String>) -> Self {
        Self::start(Behaviour::Respond {
            status,
            body: body.into(),
        })
    }

    /// Reads the request, then says nothing for `delay`.
    pub fn stalled(delay: Duration) -> Self {
        Self::start(Behaviour::Stall(delay))
    }

    /// Sends `status` with a `Content-Length` of `length`, then never sends the body.
    pub fn headers_then_stall(status: u16, length: usize, delay: Duration) -> Self {
        Self::start(Behaviour::HeadersThenStall {
            status,
            length,
            delay,
        })
    }

    fn start(behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake server");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let (recorded, counter) = (requests.clone(), connections.clone());
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                handle(stream, &behaviour, &recorded);
            }
        });

        Self {
            port,
            requests,
            connections,
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn handle(stream: TcpStream, behaviour: &Behaviour, recorded: &Mutex<Vec<RecordedRequest>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_owned());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    let _ = reader.read_exact(&mut body);

    recorded.lock().unwrap().push(RecordedRequest {
        method,
        target,
        headers,
        body,
    });

    let mut stream = stream;
    match behaviour {
        Behaviour::Stall(delay) => std::thread::sleep(*delay),
        Behaviour::HeadersThenStall {
            status,
            length,
            delay,
        } => {
            let _ = write!(
                stream,
                "HTTP/1.1 {status} Error\r\nContent-Type: application/json\r\nContent-Length: {length}\r\n\r\n"
            );
            let _ = stream.flush();
            std::thread::sleep(*delay);
        }
        Behaviour::Respond { status, body } => {
            let reason = if (200..300).contains(status) { "OK" } else { "Error" };
            let _ = write!(
                stream,
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.flush();
        }
    }
}

/// Writes `content` to a fresh temporary file and returns its path.
pub fn image_file(dir: &tempfile::TempDir, content: &[u8]) -> PathBuf {
    let path = dir.path().join("check.jpg");
    std::fs::write(&path, content).expect("Failed to write test image");
    path
}

/// A port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn init_logging() {
    let _ = pretty_env_logger::formatted_builder()
        .is_test(true)
        .try_init();
}
