//! End-to-end scenarios from spec.md §8, driven against real loopback
//! `TcpListener` servers rather than mocked connections, in the same spirit
//! as the teacher's runnable `examples/*.rs` that exercise the client
//! against a live socket instead of a unit-level fake.

use flate2::Compression;
use flate2::write::GzEncoder;
use hyperflow::{Manager, Request, RequestBody, http, http_lbs, http_lbs_redirect, http_redirect};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Binds an ephemeral loopback listener and runs `handler` once per accepted
/// connection on a background thread, up to `accept_n` connections.
fn spawn_server(accept_n: usize, handler: impl Fn(TcpStream) + Send + Sync + 'static) -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let accepted_clone = accepted.clone();
    let handler = Arc::new(handler);

    thread::spawn(move || {
        for stream in listener.incoming().take(accept_n) {
            let stream = stream.unwrap();
            accepted_clone.fetch_add(1, Ordering::SeqCst);
            handler(stream);
        }
    });

    (port, accepted)
}

/// Reads and discards bytes up to and including the request's terminating
/// `\r\n\r\n`, returning the bytes read so far (callers that need the body
/// know its length from `Content-Length` and can read the rest themselves).
fn drain_request_headers(stream: &mut TcpStream) {
    let mut buf = [0u8; 1];
    let mut seen = Vec::new();
    loop {
        let n = stream.read(&mut buf).unwrap();
        assert!(n > 0, "connection closed before headers ended");
        seen.push(buf[0]);
        if seen.ends_with(b"\r\n\r\n") {
            return;
        }
    }
}

#[test]
fn plain_get_with_content_length() -> anyhow::Result<()> {
    let (port, _) = spawn_server(1, |mut stream| {
        drain_request_headers(&mut stream);
        stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello").unwrap();
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false);
    let response = http_lbs(&request, &manager)?;

    assert_eq!(200, response.status_code);
    assert_eq!(b"hello".to_vec(), response.body);
    Ok(())
}

#[test]
fn chunked_body_without_gzip() -> anyhow::Result<()> {
    let (port, _) = spawn_server(1, |mut stream| {
        drain_request_headers(&mut stream);
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n")
            .unwrap();
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false);
    let response = http_lbs(&request, &manager)?;

    assert_eq!(b"hello world".to_vec(), response.body);
    Ok(())
}

#[test]
fn gzip_and_chunked_layering() -> anyhow::Result<()> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"abc").unwrap();
    let compressed = encoder.finish().unwrap();

    let (port, _) = spawn_server(1, move |mut stream| {
        drain_request_headers(&mut stream);
        let mut chunked_body = Vec::new();
        chunked_body.extend_from_slice(format!("{:x}\r\n", compressed.len()).as_bytes());
        chunked_body.extend_from_slice(&compressed);
        chunked_body.extend_from_slice(b"\r\n0\r\n\r\n");

        stream
            .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Encoding: gzip\r\n\r\n")
            .unwrap();
        stream.write_all(&chunked_body).unwrap();
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false);
    let response = http_lbs(&request, &manager)?;

    assert_eq!(b"abc".to_vec(), response.body);
    Ok(())
}

#[test]
fn head_request_never_reads_body() -> anyhow::Result<()> {
    let (port, _) = spawn_server(1, |mut stream| {
        drain_request_headers(&mut stream);
        stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n").unwrap();
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false).with_method("HEAD");
    let (status, body_len) = http(&request, &manager, |status, _headers, body: &mut dyn Read| {
        let mut buf = Vec::new();
        body.read_to_end(&mut buf)?;
        Ok::<_, std::io::Error>((status, buf.len()))
    })?;

    assert_eq!(200, status);
    assert_eq!(0, body_len);
    Ok(())
}

/// Reads one request's headers off `stream` (already-open, possibly reused
/// connection) and returns the request line plus the parsed header block as
/// text. Returns `None` on a clean EOF (peer closed the connection).
fn read_one_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(0) if buf.is_empty() => return None,
            Ok(0) => panic!("connection closed mid-request"),
            Ok(_) => {
                buf.push(byte[0]);
                if buf.ends_with(b"\r\n\r\n") {
                    return Some(String::from_utf8_lossy(&buf).into_owned());
                }
            }
            Err(_) => return None,
        }
    }
}

fn header_value<'a>(request_text: &'a str, name: &str) -> Option<&'a str> {
    request_text.lines().find_map(|l| {
        let (k, v) = l.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

#[test]
fn redirect_to_relative_location_preserves_method() -> anyhow::Result<()> {
    // A redirect to the same host replays over the *same* pooled connection,
    // so the server here answers two requests on one accepted socket.
    let seen_paths = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_paths_clone = seen_paths.clone();

    let (port, _) = spawn_server(1, move |mut stream| {
        while let Some(request_text) = read_one_request(&mut stream) {
            let path = request_text.split_whitespace().nth(1).unwrap().to_string();
            let is_first = seen_paths_clone.lock().unwrap().is_empty();
            seen_paths_clone.lock().unwrap().push(path);

            let wrote = if is_first {
                stream.write_all(b"HTTP/1.1 302 Found\r\nLocation: /b\r\nContent-Length: 0\r\n\r\n")
            } else {
                stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
            };
            if wrote.is_err() {
                return;
            }
        }
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false).with_path("/a");
    let response = http_lbs_redirect(&request, &manager)?;

    assert_eq!(200, response.status_code);
    assert_eq!(b"ok".to_vec(), response.body);
    assert_eq!(vec!["/a".to_string(), "/b".to_string()], *seen_paths.lock().unwrap());
    Ok(())
}

#[test]
fn redirect_303_coerces_method_to_get() -> anyhow::Result<()> {
    let methods_seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let methods_seen_clone = methods_seen.clone();
    // (method, declared Content-Length, actual body bytes read) for each hop.
    let requests_seen: Arc<std::sync::Mutex<Vec<(String, usize, Vec<u8>)>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
    let requests_seen_clone = requests_seen.clone();

    let (port, _) = spawn_server(1, move |mut stream| {
        while let Some(request_text) = read_one_request(&mut stream) {
            let method = request_text.split_whitespace().next().unwrap().to_string();
            let is_first = methods_seen_clone.lock().unwrap().is_empty();
            methods_seen_clone.lock().unwrap().push(method.clone());

            let content_length: usize =
                header_value(&request_text, "Content-Length").and_then(|v| v.parse().ok()).unwrap_or(0);
            let mut body = vec![0u8; content_length];
            if stream.read_exact(&mut body).is_err() {
                return;
            }
            requests_seen_clone.lock().unwrap().push((method, content_length, body));

            let wrote = if is_first {
                stream.write_all(b"HTTP/1.1 303 See Other\r\nLocation: /x\r\nContent-Length: 0\r\n\r\n")
            } else {
                stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
            };
            if wrote.is_err() {
                return;
            }
        }
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false)
        .with_method("POST")
        .with_body(RequestBody::Bytes(b"payload".to_vec()));
    let response = http_lbs_redirect(&request, &manager)?;

    assert_eq!(200, response.status_code);
    assert_eq!(vec!["POST".to_string(), "GET".to_string()], *methods_seen.lock().unwrap());

    let requests = requests_seen.lock().unwrap();
    assert_eq!(2, requests.len());
    let (first_method, first_len, first_body) = &requests[0];
    assert_eq!("POST", first_method);
    assert_eq!(7, *first_len);
    assert_eq!(b"payload".to_vec(), *first_body);

    let (second_method, second_len, second_body) = &requests[1];
    assert_eq!("GET", second_method);
    assert_eq!(0, *second_len, "303 follow-up must declare Content-Length: 0");
    assert!(second_body.is_empty(), "303 follow-up must not carry the original body");
    Ok(())
}

#[test]
fn redirect_budget_is_exhausted_after_eleven_requests() {
    // Every hop targets the same host, so the whole chain replays over one
    // pooled connection rather than opening eleven sockets.
    let request_count = Arc::new(AtomicUsize::new(0));
    let request_count_clone = request_count.clone();

    let (port, _) = spawn_server(1, move |mut stream| {
        while let Some(_request_text) = read_one_request(&mut stream) {
            request_count_clone.fetch_add(1, Ordering::SeqCst);
            if stream.write_all(b"HTTP/1.1 302 Found\r\nLocation: /next\r\nContent-Length: 0\r\n\r\n").is_err() {
                return;
            }
        }
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false);
    let err = http_redirect(&request, &manager, hyperflow::response::collect_to_bytes)
        .err()
        .expect("expected TooManyRedirects");

    assert!(matches!(err, hyperflow::HttpError::TooManyRedirects));
    assert_eq!(11, request_count.load(Ordering::SeqCst));
}

#[test]
fn pool_reuses_a_single_socket_across_two_requests() -> anyhow::Result<()> {
    let (port, accepted) = spawn_server(1, |mut stream| loop {
        let mut buf = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match stream.read(&mut byte) {
                Ok(0) => return,
                Ok(_) => {
                    buf.push(byte[0]);
                    if buf.ends_with(b"\r\n\r\n") {
                        break;
                    }
                }
                Err(_) => return,
            }
        }
        if stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok").is_err() {
            return;
        }
    });

    let manager = Manager::new();
    let request = Request::new("127.0.0.1", port, false);

    let first = http_lbs(&request, &manager)?;
    let second = http_lbs(&request, &manager)?;

    assert_eq!(b"ok".to_vec(), first.body);
    assert_eq!(b"ok".to_vec(), second.body);
    assert_eq!(1, accepted.load(Ordering::SeqCst));

    manager.close();
    Ok(())
}
