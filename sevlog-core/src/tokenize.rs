//! In-place splitting of a rendered record into per-line segments.
//!
//! A single call whose payload spans several lines is re-emitted as
//! several fully decorated records, so sinks never see an embedded raw
//! newline.

/// Rewrites every line terminator in `bytes` with NUL bytes, in one
/// forward pass: `\r\n` consumes two bytes, a lone `\n` one byte, and
/// a lone `\r` is ordinary payload.
pub fn tokenize_crlf(bytes: &mut [u8]) {
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\r' && i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
            bytes[i] = 0;
            bytes[i + 1] = 0;
            i += 2;
        } else if bytes[i] == b'\n' {
            bytes[i] = 0;
            i += 1;
        } else {
            i += 1;
        }
    }
}

/// Iterates the non-empty zero-terminated segments of a tokenized
/// buffer, in buffer order. Empty runs from adjacent terminators are
/// skipped.
pub fn tokens(bytes: &[u8]) -> impl Iterator<Item = &str> {
    bytes
        .split(|&b| b == 0)
        .filter(|run| !run.is_empty())
        .filter_map(|run| std::str::from_utf8(run).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenized(input: &str) -> Vec<String> {
        let mut bytes = input.as_bytes().to_vec();
        tokenize_crlf(&mut bytes);
        tokens(&bytes).map(str::to_string).collect()
    }

    #[test]
    fn splits_on_lf_and_crlf() {
        assert_eq!(tokenized("line1\nline2\r\nline3"), ["line1", "line2", "line3"]);
    }

    #[test]
    fn lone_carriage_return_is_payload() {
        assert_eq!(tokenized("before\rafter"), ["before\rafter"]);
    }

    #[test]
    fn adjacent_terminators_yield_no_empty_tokens() {
        assert_eq!(tokenized("a\n\n\r\nb"), ["a", "b"]);
    }

    #[test]
    fn trailing_terminator_is_consumed() {
        assert_eq!(tokenized("only line\r\n"), ["only line"]);
    }

    #[test]
    fn carriage_return_at_end_is_kept() {
        assert_eq!(tokenized("dangling\r"), ["dangling\r"]);
    }
}
