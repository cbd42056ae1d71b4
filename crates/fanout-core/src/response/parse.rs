//! Build a [`Response`] from collected header lines and body bytes.

use super::{Response, ResponseError};

/// Builds the response from the header lines of the final response.
///
/// `lines` starts with the status line; blank lines are ignored.
pub fn build(lines: &[String], body: Vec<u8>) -> Result<Response, ResponseError> {
    let mut iter = lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty());
    let status_line = iter.next().ok_or(ResponseError::MissingStatusLine)?;
    let (version, status, reason) = parse_status_line(status_line)?;

    let mut headers = Vec::new();
    for line in iter {
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    Ok(Response {
        version,
        status,
        reason,
        headers,
        body,
    })
}

/// Splits `HTTP/1.1 200 OK` into version, code and reason. The reason may be
/// absent (HTTP/2 sends none).
fn parse_status_line(line: &str) -> Result<(String, u16, String), ResponseError> {
    let malformed = || ResponseError::MalformedStatusLine(line.to_string());
    if !line.starts_with("HTTP/") {
        return Err(malformed());
    }
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().ok_or_else(malformed)?;
    let status = parts
        .next()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .filter(|s| (100..1000).contains(s))
        .ok_or_else(malformed)?;
    let reason = parts.next().unwrap_or("").trim();
    Ok((version.to_string(), status, reason.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn build_status_headers_and_body() {
        let r = build(
            &lines(&["HTTP/1.1 201 Created", "Location: /items/1", "X-A: b: c", ""]),
            b"ok".to_vec(),
        )
        .unwrap();
        assert_eq!(r.version(), "HTTP/1.1");
        assert_eq!(r.status(), 201);
        assert_eq!(r.reason(), "Created");
        assert_eq!(r.header("location"), Some("/items/1"));
        assert_eq!(r.header("x-a"), Some("b: c"));
        assert_eq!(r.body(), b"ok");
    }

    #[test]
    fn http2_status_line_without_reason() {
        let r = build(&lines(&["HTTP/2 204"]), Vec::new()).unwrap();
        assert_eq!(r.version(), "HTTP/2");
        assert_eq!(r.status(), 204);
        assert_eq!(r.reason(), "");
    }

    #[test]
    fn missing_status_line_is_an_error() {
        assert_eq!(
            build(&lines(&["", "  "]), Vec::new()),
            Err(ResponseError::MissingStatusLine)
        );
    }

    #[test]
    fn garbage_status_line_is_an_error() {
        assert!(matches!(
            build(&lines(&["Content-Length: 3"]), Vec::new()),
            Err(ResponseError::MalformedStatusLine(_))
        ));
        assert!(matches!(
            build(&lines(&["HTTP/1.1 abc Nope"]), Vec::new()),
            Err(ResponseError::MalformedStatusLine(_))
        ));
    }
}
