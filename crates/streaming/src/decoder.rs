//! Incremental decoder for the newline-delimited `data: <json>` reply stream.
//!
//! Bytes are buffered until a full line is available, so both JSON events and
//! UTF-8 code points may be split arbitrarily across network reads.

use thiserror::Error;

use crate::protocol::StreamEvent;

/// Prefix of every event line.
pub const DATA_PREFIX: &str = "data:";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("event line is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("event payload is not a valid event: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of decoding one complete line.
#[derive(Debug)]
pub enum Decoded {
    Event(StreamEvent),
    Malformed { line: String, error: DecodeError },
}

/// Line-buffering decoder.
///
/// Ordering contract:
/// - decoded items are returned in the order their lines appear in the byte stream.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
    // Bytes of `buf` already known to contain no newline.
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network read; returns the items of every line it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Decoded> {
        self.buf.extend_from_slice(bytes);

        let mut out = Vec::new();
        let mut start = 0usize;
        let mut i = self.scanned;
        while i < self.buf.len() {
            if self.buf[i] == b'\n' {
                if let Some(item) = decode_line(&self.buf[start..i]) {
                    out.push(item);
                }
                start = i + 1;
            }
            i += 1;
        }

        self.buf.drain(..start);
        self.scanned = self.buf.len();
        out
    }

    /// Flushes a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<Decoded> {
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        if rest.is_empty() {
            return None;
        }
        decode_line(&rest)
    }
}

/// Decodes a single line (without its `\n`).
///
/// Blank lines and lines without the `data:` prefix carry no event and yield `None`.
pub fn decode_line(raw: &[u8]) -> Option<Decoded> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => {
            return Some(Decoded::Malformed {
                line: String::from_utf8_lossy(raw).into_owned(),
                error: err.into(),
            });
        }
    };

    let text = text.strip_suffix('\r').unwrap_or(text);
    let payload = text.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    if payload.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(Decoded::Event(event)),
        Err(err) => Some(Decoded::Malformed {
            line: text.to_string(),
            error: err.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, Decoded, LineDecoder, decode_line};
    use crate::protocol::StreamEvent;

    fn chunk_text(d: &Decoded) -> &str {
        match d {
            Decoded::Event(StreamEvent::Chunk { chunk }) => chunk,
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn decodes_complete_lines_and_keeps_partial_tail() {
        let mut dec = LineDecoder::new();
        let out = dec.push(b"data: {\"type\":\"chunk\",\"chunk\":\"Hi\"}\n\ndata: {\"type\":\"chu");
        assert_eq!(out.len(), 1);
        assert_eq!(chunk_text(&out[0]), "Hi");

        let out = dec.push(b"nk\",\"chunk\":\" there\"}\n\n");
        assert_eq!(out.len(), 1);
        assert_eq!(chunk_text(&out[0]), " there");
        assert!(dec.finish().is_none());
    }

    #[test]
    fn reassembles_utf8_split_across_reads() {
        let line = "data: {\"type\":\"chunk\",\"chunk\":\"café\"}\n".as_bytes();
        // Split inside the two-byte 'é'.
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut dec = LineDecoder::new();
        assert!(dec.push(&line[..split]).is_empty());
        let out = dec.push(&line[split..]);
        assert_eq!(chunk_text(&out[0]), "café");
    }

    #[test]
    fn malformed_line_is_reported_without_losing_neighbors() {
        let mut dec = LineDecoder::new();
        let out = dec.push(
            b"data: {\"type\":\"chunk\",\"chunk\":\"a\"}\n\
              data: {not json\n\
              data: {\"type\":\"chunk\",\"chunk\":\"b\"}\n",
        );
        assert_eq!(out.len(), 3);
        assert_eq!(chunk_text(&out[0]), "a");
        assert!(matches!(
            out[1],
            Decoded::Malformed {
                error: DecodeError::Json(_),
                ..
            }
        ));
        assert_eq!(chunk_text(&out[2]), "b");
    }

    #[test]
    fn skips_blank_and_non_data_lines_and_handles_crlf() {
        assert!(decode_line(b"").is_none());
        assert!(decode_line(b": keepalive").is_none());
        assert!(decode_line(b"event: message").is_none());
        assert!(decode_line(b"data:").is_none());

        let d = decode_line(b"data:{\"type\":\"chunk\",\"chunk\":\"x\"}\r").unwrap();
        assert_eq!(chunk_text(&d), "x");
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let d = decode_line(b"data: \xff\xfe").unwrap();
        assert!(matches!(
            d,
            Decoded::Malformed {
                error: DecodeError::Utf8(_),
                ..
            }
        ));
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut dec = LineDecoder::new();
        assert!(dec.push(b"data: {\"type\":\"final\"}").is_empty());
        let last = dec.finish().unwrap();
        assert!(matches!(last, Decoded::Event(StreamEvent::Final { .. })));
        assert!(dec.finish().is_none());
    }
}
