//! Cache contract coverage for the remote backends, driven against a
//! minimal in-process HTTP server: absent entries come back as `None`,
//! stored bytes come back verbatim, and a failing service is an error.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use tidycache::cache::kv::KvStore;
use tidycache::cache::object_store::ObjectStore;
use tidycache::cache::{CacheError, CacheStore};
use tidycache::config::{KvConfig, ObjectStoreConfig};
use tidycache::fingerprint::Fingerprint;

/// Blob keyspace served over HTTP. Keys are taken from the `name`
/// query parameter when present (media uploads) and from the last path
/// segment otherwise, which covers both remote backends' URL shapes.
struct BlobServer {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    always_fail: bool,
}

impl BlobServer {
    fn start(always_fail: bool) -> (String, Arc<BlobServer>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = Arc::new(BlobServer {
            entries: Mutex::new(HashMap::new()),
            always_fail,
        });

        let handler = Arc::clone(&server);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                handler.handle(&mut stream);
            }
        });
        (url, server)
    }

    fn handle(&self, stream: &mut TcpStream) {
        let Some((method, key, body)) = read_request(stream) else {
            return;
        };

        let response: (&str, Vec<u8>) = if self.always_fail {
            ("500 Internal Server Error", Vec::new())
        } else {
            match method.as_str() {
                "GET" => match self.entries.lock().unwrap().get(&key) {
                    Some(content) => ("200 OK", content.clone()),
                    None => ("404 Not Found", Vec::new()),
                },
                "PUT" | "POST" => {
                    self.entries.lock().unwrap().insert(key, body);
                    ("200 OK", Vec::new())
                }
                _ => ("405 Method Not Allowed", Vec::new()),
            }
        };

        let (status, content) = response;
        let _ = write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            content.len(),
        );
        let _ = stream.write_all(&content);
    }
}

/// Read one HTTP request; returns the method, the storage key, and the
/// request body.
fn read_request(stream: &mut TcpStream) -> Option<(String, String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let key = query
        .split('&')
        .find_map(|param| param.strip_prefix("name="))
        .or_else(|| path.rsplit('/').next())?
        .to_string();
    Some((method, key, body))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn fingerprint(byte: u8) -> Fingerprint {
    Fingerprint::from_bytes([byte; 32])
}

fn kv_store(url: &str) -> KvStore {
    KvStore::new(KvConfig {
        url: url.into(),
        password: None,
        namespace: None,
    })
}

fn object_store(url: &str) -> ObjectStore {
    ObjectStore::new(ObjectStoreConfig {
        url: Some(url.into()),
        bucket: "tidy-results".into(),
        token: None,
    })
}

#[tokio::test]
async fn kv_find_absent_is_none_not_error() {
    let (url, _server) = BlobServer::start(false);
    let store = kv_store(&url);
    assert_eq!(store.find(&fingerprint(0x11)).await.unwrap(), None);
}

#[tokio::test]
async fn kv_roundtrip_preserves_exact_bytes() {
    let (url, _server) = BlobServer::start(false);
    let store = kv_store(&url);
    let fp = fingerprint(0x22);
    let content = b"- DiagnosticName: readability-magic-numbers\n".to_vec();

    store.save(&fp, &content).await.unwrap();
    assert_eq!(store.find(&fp).await.unwrap(), Some(content));
}

#[tokio::test]
async fn kv_save_overwrites_existing_entry() {
    let (url, _server) = BlobServer::start(false);
    let store = kv_store(&url);
    let fp = fingerprint(0x33);

    store.save(&fp, b"old").await.unwrap();
    store.save(&fp, b"new").await.unwrap();
    assert_eq!(store.find(&fp).await.unwrap(), Some(b"new".to_vec()));
}

#[tokio::test]
async fn kv_failing_service_is_an_error_not_absent() {
    let (url, _server) = BlobServer::start(true);
    let store = kv_store(&url);

    let result = store.find(&fingerprint(0x44)).await;
    assert!(matches!(
        result,
        Err(CacheError::UnexpectedStatus { status, .. }) if status.as_u16() == 500
    ));
    assert!(store.save(&fingerprint(0x44), b"x").await.is_err());
}

#[tokio::test]
async fn object_store_find_absent_is_none_not_error() {
    let (url, _server) = BlobServer::start(false);
    let store = object_store(&url);
    assert_eq!(store.find(&fingerprint(0x55)).await.unwrap(), None);
}

#[tokio::test]
async fn object_store_roundtrip_preserves_exact_bytes() {
    let (url, _server) = BlobServer::start(false);
    let store = object_store(&url);
    let fp = fingerprint(0x66);
    let content = b"- DiagnosticName: bugprone-sizeof-expression\n".to_vec();

    store.save(&fp, &content).await.unwrap();
    assert_eq!(store.find(&fp).await.unwrap(), Some(content));
}

#[tokio::test]
async fn object_store_roundtrip_empty_content() {
    let (url, _server) = BlobServer::start(false);
    let store = object_store(&url);
    let fp = fingerprint(0x77);

    store.save(&fp, &[]).await.unwrap();
    assert_eq!(store.find(&fp).await.unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn object_store_failing_service_is_an_error_not_absent() {
    let (url, _server) = BlobServer::start(true);
    let store = object_store(&url);

    let result = store.find(&fingerprint(0x88)).await;
    assert!(matches!(
        result,
        Err(CacheError::UnexpectedStatus { status, .. }) if status.as_u16() == 500
    ));
    assert!(store.save(&fingerprint(0x88), b"x").await.is_err());
}
