//! Frame Codec
//!
//! Wire format for client-server traffic: one plain-text frame per transport
//! message, a kind tag and a payload separated by a pipe.
//!
//! # Frame Format
//!
//! ```text
//! +----------+-----+---------------------------+
//! | KIND     | `|` | payload (free text)       |
//! +----------+-----+---------------------------+
//! ```
//!
//! There is no length prefix and no binary mode. A frame without a delimiter
//! is a bare kind with an empty payload. There is no escaping either: the
//! payload is everything after the FIRST delimiter, verbatim, so payload text
//! may itself contain pipes.

/// Delimiter between the kind tag and the payload.
pub const DELIMITER: char = '|';

/// Kinds of outbound frames the client produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboundKind {
    /// A chat turn from the user (`USER|...`). The server answers with a
    /// stream of `CHUNK` frames followed by one `FINAL` frame.
    User,
    /// A request to produce a structured JSON spec for a piece of text
    /// (`SPEC|...`). The server answers with one `SPEC` frame.
    Spec,
}

impl OutboundKind {
    /// Wire tag of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Spec => "SPEC",
        }
    }
}

/// Encode one outbound frame.
#[must_use]
pub fn encode(kind: OutboundKind, text: &str) -> String {
    format!("{}{DELIMITER}{text}", kind.as_str())
}

/// Decode one inbound frame into `(kind, payload)`.
///
/// Splits at the first delimiter; a frame without one decodes as
/// `(frame, "")`. Total over any input string: unknown kinds are returned
/// as-is and left to the dispatcher to classify.
#[must_use]
pub fn decode(wire: &str) -> (&str, &str) {
    match wire.split_once(DELIMITER) {
        Some((kind, payload)) => (kind, payload),
        None => (wire, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_user() {
        assert_eq!(encode(OutboundKind::User, "hi"), "USER|hi");
    }

    #[test]
    fn test_encode_spec() {
        assert_eq!(encode(OutboundKind::Spec, "a red chair"), "SPEC|a red chair");
    }

    #[test]
    fn test_encode_empty_payload() {
        assert_eq!(encode(OutboundKind::User, ""), "USER|");
    }

    #[test]
    fn test_decode_simple() {
        assert_eq!(decode("CHUNK|Hello"), ("CHUNK", "Hello"));
    }

    #[test]
    fn test_decode_splits_at_first_delimiter_only() {
        assert_eq!(decode("CHUNK|a|b|c"), ("CHUNK", "a|b|c"));
    }

    #[test]
    fn test_decode_no_delimiter() {
        assert_eq!(decode("PING"), ("PING", ""));
    }

    #[test]
    fn test_decode_delimiter_with_empty_payload() {
        assert_eq!(decode("FINAL|"), ("FINAL", ""));
    }

    #[test]
    fn test_decode_empty_string() {
        assert_eq!(decode(""), ("", ""));
    }

    #[test]
    fn test_decode_preserves_case() {
        assert_eq!(decode("chunk|x"), ("chunk", "x"));
    }

    #[test]
    fn test_roundtrip_without_delimiter_in_payload() {
        for kind in [OutboundKind::User, OutboundKind::Spec] {
            for payload in ["", "hi", "white space", "{\"a\":1}"] {
                let wire = encode(kind, payload);
                assert_eq!(decode(&wire), (kind.as_str(), payload));
            }
        }
    }

    #[test]
    fn test_roundtrip_with_delimiter_in_payload() {
        // No escaping: extra pipes survive inside the payload.
        let wire = encode(OutboundKind::User, "a|b");
        assert_eq!(decode(&wire), ("USER", "a|b"));
    }
}
