//! Newline framing over an arbitrary chunked byte stream.

/// Splits incoming chunks into complete lines, carrying the trailing
/// partial line over to the next chunk.
///
/// Works on bytes rather than decoded text: `\n` never occurs inside a
/// multi-byte UTF-8 sequence, so a character split across two chunks is
/// reassembled before it is decoded.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line completed by it, without the
    /// terminator (`\n` or `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            lines.push(decode_line(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }

    /// Returns the unterminated remainder, if any, and clears the buffer.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }

    /// Bytes currently held back waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Returns the payload of an SSE `data:` record.
///
/// `event:`, `id:`, `retry:`, comments (`:`) and blank lines yield `None`.
/// One space after the colon is part of the field syntax and is removed.
pub fn parse_sse_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("data:")?;
    let payload = rest.strip_prefix(' ').unwrap_or(rest);
    if payload.trim().is_empty() {
        None
    } else {
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_partial_line_between_pushes() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: {\"del").is_empty());
        assert_eq!(buf.pending_len(), 11);
        let lines = buf.push(b"ta\":\"hi\"}\n\ndata: [DO");
        assert_eq!(lines, vec!["data: {\"delta\":\"hi\"}".to_string(), String::new()]);
        assert_eq!(buf.push(b"NE]\r\n"), vec!["data: [DONE]".to_string()]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn reassembles_split_utf8() {
        let text = "data: {\"delta\":\"héllo ✓\"}\n".as_bytes();
        // split inside the three-byte check mark
        let cut = text.iter().position(|b| *b == 0xE2).unwrap() + 1;
        let mut buf = LineBuffer::new();
        assert!(buf.push(&text[..cut]).is_empty());
        assert_eq!(buf.push(&text[cut..]), vec!["data: {\"delta\":\"héllo ✓\"}".to_string()]);
    }

    #[test]
    fn finish_returns_unterminated_tail() {
        let mut buf = LineBuffer::new();
        buf.push(b"data: {}\ndata: [DONE]");
        assert_eq!(buf.finish().as_deref(), Some("data: [DONE]"));
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn sse_fields() {
        assert_eq!(parse_sse_line("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_line("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_line("data: [DONE]"), Some("[DONE]"));
        assert_eq!(parse_sse_line("data: "), None);
        assert_eq!(parse_sse_line("event: response.output_text.delta"), None);
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line(""), None);
    }
}
