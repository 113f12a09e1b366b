//! Minimal STOMP 1.2 frame codec (text frames over a WebSocket).
//!
//! Layout: `COMMAND\nheader:value\n...\n\nbody\0`. Header values are escaped
//! except in `CONNECT` / `CONNECTED` frames.

/// Codec failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("missing command line")]
    MissingCommand,
    #[error("malformed header line '{0}'")]
    MalformedHeader(String),
    #[error("invalid escape sequence in '{0}'")]
    InvalidEscape(String),
    #[error("frame is not NUL-terminated")]
    MissingTerminator,
    #[error("content-length {0} does not match the body")]
    BodyLength(usize),
}

/// One STOMP frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header (repeated headers: the first one wins)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    // ── Client frames ────────────────────────────────────

    /// Handshake; heart-beating disabled
    pub fn connect(host: &str) -> Self {
        Self::new("CONNECT")
            .header("accept-version", "1.2")
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new("SUBSCRIBE")
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto")
    }

    pub fn send(destination: &str, json: String) -> Self {
        Self::new("SEND")
            .header("destination", destination)
            .header("content-type", "application/json")
            .header("content-length", json.len().to_string())
            .with_body(json)
    }

    pub fn disconnect() -> Self {
        Self::new("DISCONNECT")
    }

    fn escapes_headers(&self) -> bool {
        self.command != "CONNECT" && self.command != "CONNECTED"
    }

    // ── Codec ────────────────────────────────────────────

    pub fn encode(&self) -> String {
        let escape = self.escapes_headers();
        let mut out = String::with_capacity(self.body.len() + 64);
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parse one frame. `Ok(None)` for a bare heart-beat (only EOLs).
    pub fn parse(input: &str) -> Result<Option<Frame>, FrameError> {
        let input = input.trim_start_matches(['\n', '\r']);
        if input.is_empty() {
            return Ok(None);
        }

        let (head, rest) = split_head(input).ok_or(FrameError::MissingCommand)?;
        let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
        let command = lines
            .next()
            .filter(|c| !c.is_empty())
            .ok_or(FrameError::MissingCommand)?
            .to_string();
        let escaped = command != "CONNECT" && command != "CONNECTED";

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;
            if escaped {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let mut frame = Frame {
            command,
            headers,
            body: String::new(),
        };

        let body = match frame.get("content-length").and_then(|v| v.parse::<usize>().ok()) {
            Some(len) => {
                let body = rest.get(..len).ok_or(FrameError::BodyLength(len))?;
                if !rest[len..].starts_with('\0') {
                    return Err(FrameError::BodyLength(len));
                }
                body
            }
            None => {
                let end = rest.find('\0').ok_or(FrameError::MissingTerminator)?;
                &rest[..end]
            }
        };
        frame.body = body.to_string();
        Ok(Some(frame))
    }
}

/// Split at the blank line ending the headers
fn split_head(input: &str) -> Option<(&str, &str)> {
    let lf = input.find("\n\n").map(|i| (i, 2));
    let crlf = input.find("\r\n\r\n").map(|i| (i, 4));
    let (at, sep) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 < b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        // Command only, no headers: "COMMAND\n\0"
        (None, None) => {
            let nl = input.find('\n')?;
            return Some((&input[..nl], &input[nl + 1..]));
        }
    };
    Some((&input[..at], &input[at + sep..]))
}

fn escape_header(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_header(s: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::InvalidEscape(s.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_connect() {
        let encoded = Frame::connect("localhost").encode();
        assert_eq!(
            encoded,
            "CONNECT\naccept-version:1.2\nhost:localhost\nheart-beat:0,0\n\n\0"
        );
    }

    #[test]
    fn test_encode_send_with_body() {
        let encoded = Frame::send("/app/draw", r#"{"x1":1}"#.to_string()).encode();
        assert!(encoded.starts_with("SEND\ndestination:/app/draw\n"));
        assert!(encoded.contains("content-length:8\n"));
        assert!(encoded.ends_with("\n\n{\"x1\":1}\0"));
    }

    #[test]
    fn test_parse_message() {
        let raw = "MESSAGE\ndestination:/topic/drawings\nsubscription:sub-0\nmessage-id:1\n\n[{\"x\":1,\"y\":2}]\0";
        let frame = Frame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.command, "MESSAGE");
        assert_eq!(frame.get("destination"), Some("/topic/drawings"));
        assert_eq!(frame.body, "[{\"x\":1,\"y\":2}]");
    }

    #[test]
    fn test_parse_heartbeat() {
        assert_eq!(Frame::parse("\n").unwrap(), None);
        assert_eq!(Frame::parse("\r\n\n").unwrap(), None);
    }

    #[test]
    fn test_parse_connected_crlf() {
        let raw = "CONNECTED\r\nversion:1.2\r\nheart-beat:0,0\r\n\r\n\0";
        let frame = Frame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.command, "CONNECTED");
        assert_eq!(frame.get("version"), Some("1.2"));
        assert!(frame.body.is_empty());
    }

    #[test]
    fn test_escaped_headers_survive() {
        let frame = Frame::new("SEND")
            .header("destination", "/app/draw")
            .header("note", "a:b\\c\nd\re")
            .with_body("{}");
        let encoded = frame.encode();
        assert!(encoded.contains("note:a\\cb\\\\c\\nd\\re\n"));
        assert_eq!(Frame::parse(&encoded).unwrap(), Some(frame));
    }

    #[test]
    fn test_connect_headers_not_escaped() {
        let frame = Frame::new("CONNECTED").header("server", "geo:1.0");
        let encoded = frame.encode();
        assert!(encoded.contains("server:geo:1.0\n"));
        assert_eq!(Frame::parse(&encoded).unwrap(), Some(frame));
    }

    #[test]
    fn test_repeated_header_first_wins() {
        let raw = "MESSAGE\nfoo:1\nfoo:2\n\n\0";
        let frame = Frame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.get("foo"), Some("1"));
    }

    #[test]
    fn test_body_with_nul_uses_content_length() {
        let raw = "MESSAGE\ncontent-length:3\n\na\0b\0";
        let frame = Frame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.body, "a\0b");
    }

    // --- Errors ---

    #[test]
    fn test_missing_terminator() {
        assert_eq!(
            Frame::parse("MESSAGE\n\nbody").unwrap_err(),
            FrameError::MissingTerminator
        );
    }

    #[test]
    fn test_bad_content_length() {
        assert_eq!(
            Frame::parse("MESSAGE\ncontent-length:10\n\nabc\0").unwrap_err(),
            FrameError::BodyLength(10)
        );
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            Frame::parse("MESSAGE\nno-colon\n\n\0").unwrap_err(),
            FrameError::MalformedHeader(_)
        ));
    }

    #[test]
    fn test_invalid_escape() {
        assert!(matches!(
            Frame::parse("MESSAGE\nfoo:bad\\t\n\n\0").unwrap_err(),
            FrameError::InvalidEscape(_)
        ));
    }

    #[test]
    fn test_error_frame() {
        let frame = Frame::parse("ERROR\nmessage:Bad\\cthing\n\ndetails\0").unwrap().unwrap();
        assert_eq!(frame.command, "ERROR");
        assert_eq!(frame.get("message"), Some("Bad:thing"));
        assert_eq!(frame.body, "details");
    }
}
