//! Minimal HTTP/1.1 server for integration tests.
//!
//! One thread per connection, `Connection: close` on every response. Routes:
//! - `/ok` and `/ok/<anything>`: 200 with body `hello`
//! - `/echo`: 200, body `<METHOD> <request body>`, `X-Echo` copied back
//! - `/status/<code>`: that status, empty body
//! - `/redirect`: 302 to `/ok`
//! - `/slow`: 200 with body `slow` after 300 ms

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// Starts the server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the process exits.
pub fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A URL on a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/nothing-here", port)
}

struct Incoming {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

fn handle(mut stream: TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    let path = req.path.split('?').next().unwrap_or("").to_string();
    let (status, extra, body): (&str, String, Vec<u8>) = if path == "/ok" || path.starts_with("/ok/") {
        ("200 OK", String::new(), b"hello".to_vec())
    } else if path == "/echo" {
        let mut body = format!("{} ", req.method).into_bytes();
        body.extend_from_slice(&req.body);
        let echo = req
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("x-echo"))
            .map(|(_, v)| format!("X-Echo: {}\r\n", v))
            .unwrap_or_default();
        ("200 OK", echo, body)
    } else if let Some(code) = path.strip_prefix("/status/") {
        let line = match code {
            "404" => "404 Not Found",
            "500" => "500 Internal Server Error",
            _ => "204 No Content",
        };
        (line, String::new(), Vec::new())
    } else if path == "/redirect" {
        ("302 Found", "Location: /ok\r\n".to_string(), b"moved".to_vec())
    } else if path == "/slow" {
        thread::sleep(Duration::from_millis(300));
        ("200 OK", String::new(), b"slow".to_vec())
    } else {
        ("404 Not Found", String::new(), Vec::new())
    };

    let send_body = req.method != "HEAD";
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra
    );
    let _ = stream.write_all(head.as_bytes());
    if send_body {
        let _ = stream.write_all(&body);
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Incoming> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Some(Incoming {
        method,
        path,
        headers,
        body,
    })
}
