//! Token grammar for the replay stream.
//!
//! The stream is a sequence of ASCII decimal tokens, each followed by a
//! single space, with raw binary regions embedded inline:
//!
//! ```text
//! <token> ' ' <token> ' ' ... <raw bytes> <token> ' ' ...
//! ```
//!
//! Readers skip any run of ASCII whitespace before a token and stop at,
//! without consuming, the first whitespace byte after it. A token that
//! ends at end of stream instead is truncated and rejected, as is one
//! longer than [`MAX_TOKEN_LEN`]. Stopping at the delimiter leaves
//! the delimiter in place so a raw region can be entered with
//! [`TokenReader::skip_delimiter`] followed by [`TokenReader::read_raw`].
//!
//! `f32` values use the shortest decimal form that parses back to the
//! same bits, so finite values and infinities survive a round trip
//! exactly.

use std::fmt::Display;
use std::io::{BufRead, Read, Write};
use std::str::FromStr;

use crate::error::FormatError;

/// Longest token a reader accepts. The widest value written is a
/// small subnormal `f32` in plain decimal, around 50 bytes.
pub const MAX_TOKEN_LEN: usize = 64;

/// Writes tokens and raw regions to any `Write` sink.
pub struct TokenWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> TokenWriter<W> {
    /// Wrap a sink.
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    fn write_token<T: Display>(&mut self, value: T) -> Result<(), FormatError> {
        let text = format!("{value} ");
        self.inner.write_all(text.as_bytes())?;
        self.written += text.len() as u64;
        Ok(())
    }

    /// Write a signed 32-bit integer token.
    pub fn write_i32(&mut self, v: i32) -> Result<(), FormatError> {
        self.write_token(v)
    }

    /// Write an unsigned 32-bit integer token.
    pub fn write_u32(&mut self, v: u32) -> Result<(), FormatError> {
        self.write_token(v)
    }

    /// Write an unsigned 64-bit integer token.
    pub fn write_u64(&mut self, v: u64) -> Result<(), FormatError> {
        self.write_token(v)
    }

    /// Write an element count.
    pub fn write_len(&mut self, len: usize) -> Result<(), FormatError> {
        self.write_token(len)
    }

    /// Write an `f32` token in shortest round-trip form.
    pub fn write_f32(&mut self, v: f32) -> Result<(), FormatError> {
        self.write_token(v)
    }

    /// Write a boolean as `0` or `1`.
    pub fn write_bool(&mut self, v: bool) -> Result<(), FormatError> {
        self.write_token(u8::from(v))
    }

    /// Write a raw byte region with no delimiter.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<(), FormatError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads tokens and raw regions from any `BufRead` source.
///
/// End of stream in the middle of a value is reported as
/// [`FormatError::UnexpectedEof`]; nothing is ever zero-filled.
pub struct TokenReader<R: BufRead> {
    inner: R,
    offset: u64,
    token: Vec<u8>,
}

impl<R: BufRead> TokenReader<R> {
    /// Wrap a source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            token: Vec::with_capacity(24),
        }
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next whitespace-delimited token into `self.token`.
    ///
    /// Returns the offset of the token's first byte.
    fn next_token(&mut self, expected: &'static str) -> Result<u64, FormatError> {
        self.token.clear();

        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                return Err(FormatError::UnexpectedEof {
                    expected,
                    offset: self.offset,
                });
            }
            let available = buf.len();
            let skipped = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            self.inner.consume(skipped);
            self.offset += skipped as u64;
            if skipped < available {
                break;
            }
        }

        let start = self.offset;
        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                // Every token is written with a trailing delimiter; one
                // that runs into the end of the stream was cut short.
                return Err(FormatError::UnexpectedEof {
                    expected,
                    offset: self.offset,
                });
            }
            let available = buf.len();
            let taken = buf.iter().take_while(|b| !b.is_ascii_whitespace()).count();
            if self.token.len() + taken > MAX_TOKEN_LEN {
                let keep = MAX_TOKEN_LEN.saturating_sub(self.token.len()).min(taken);
                self.token.extend_from_slice(&buf[..keep]);
                return Err(FormatError::InvalidToken {
                    expected,
                    token: format!("{}...", String::from_utf8_lossy(&self.token)),
                    offset: start,
                });
            }
            self.token.extend_from_slice(&buf[..taken]);
            self.inner.consume(taken);
            self.offset += taken as u64;
            if taken < available {
                return Ok(start);
            }
        }
    }

    fn read_parsed<T: FromStr>(&mut self, expected: &'static str) -> Result<T, FormatError> {
        let start = self.next_token(expected)?;
        std::str::from_utf8(&self.token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| FormatError::InvalidToken {
                expected,
                token: String::from_utf8_lossy(&self.token).into_owned(),
                offset: start,
            })
    }

    /// Read a signed 32-bit integer.
    pub fn read_i32(&mut self, expected: &'static str) -> Result<i32, FormatError> {
        self.read_parsed(expected)
    }

    /// Read an unsigned 32-bit integer.
    pub fn read_u32(&mut self, expected: &'static str) -> Result<u32, FormatError> {
        self.read_parsed(expected)
    }

    /// Read an unsigned 64-bit integer.
    pub fn read_u64(&mut self, expected: &'static str) -> Result<u64, FormatError> {
        self.read_parsed(expected)
    }

    /// Read an element count.
    pub fn read_len(&mut self, expected: &'static str) -> Result<usize, FormatError> {
        self.read_parsed(expected)
    }

    /// Read an `f32`.
    pub fn read_f32(&mut self, expected: &'static str) -> Result<f32, FormatError> {
        self.read_parsed(expected)
    }

    /// Read a boolean written as `0` or `1`.
    pub fn read_bool(&mut self, expected: &'static str) -> Result<bool, FormatError> {
        let start = self.next_token(expected)?;
        match self.token.as_slice() {
            b"0" => Ok(false),
            b"1" => Ok(true),
            other => Err(FormatError::InvalidToken {
                expected,
                token: String::from_utf8_lossy(other).into_owned(),
                offset: start,
            }),
        }
    }

    /// Consume exactly one delimiter byte, whatever its value.
    pub fn skip_delimiter(&mut self) -> Result<(), FormatError> {
        let buf = self.inner.fill_buf()?;
        if buf.is_empty() {
            return Err(FormatError::UnexpectedEof {
                expected: "delimiter",
                offset: self.offset,
            });
        }
        self.inner.consume(1);
        self.offset += 1;
        Ok(())
    }

    /// Read exactly `len` raw bytes.
    pub fn read_raw(&mut self, len: usize, expected: &'static str) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::with_capacity(len);
        let got = (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        self.offset += got as u64;
        if got < len {
            return Err(FormatError::UnexpectedEof {
                expected,
                offset: self.offset,
            });
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reader(bytes: &[u8]) -> TokenReader<&[u8]> {
        TokenReader::new(bytes)
    }

    #[test]
    fn tokens_are_space_terminated() {
        let mut w = TokenWriter::new(Vec::new());
        w.write_i32(-7).unwrap();
        w.write_u32(3).unwrap();
        w.write_bool(true).unwrap();
        assert_eq!(w.bytes_written(), 7);
        assert_eq!(w.into_inner(), b"-7 3 1 ");
    }

    #[test]
    fn reader_skips_whitespace_runs() {
        let mut r = reader(b"  12\n\t-4   9\n");
        assert_eq!(r.read_i32("a").unwrap(), 12);
        assert_eq!(r.read_i32("b").unwrap(), -4);
        assert_eq!(r.read_u64("c").unwrap(), 9);
    }

    #[test]
    fn delimiter_then_raw_region() {
        // Raw region may itself contain whitespace and digits.
        let mut r = reader(b"2 3 \x20\x09\x00AB7 ");
        assert_eq!(r.read_i32("w").unwrap(), 2);
        assert_eq!(r.read_i32("h").unwrap(), 3);
        r.skip_delimiter().unwrap();
        assert_eq!(r.read_raw(5, "map").unwrap(), b"\x20\x09\x00AB");
        assert_eq!(r.read_len("count").unwrap(), 7);
        assert_eq!(r.offset(), 10);
    }

    #[test]
    fn eof_before_token_is_reported() {
        let mut r = reader(b"5   ");
        r.read_i32("first").unwrap();
        let err = r.read_i32("second").unwrap_err();
        assert!(matches!(
            err,
            FormatError::UnexpectedEof {
                expected: "second",
                offset: 4
            }
        ));
    }

    #[test]
    fn token_cut_by_end_of_stream_is_eof() {
        let mut r = reader(b"3 4567");
        assert_eq!(r.read_i32("key").unwrap(), 3);
        assert!(matches!(
            r.read_i32("value"),
            Err(FormatError::UnexpectedEof {
                expected: "value",
                offset: 6
            })
        ));
    }

    #[test]
    fn oversized_token_is_rejected_without_buffering_it() {
        let mut bytes = vec![b'7'; 1 << 20];
        bytes.push(b' ');
        let mut r = reader(&bytes);
        match r.read_u64("count").unwrap_err() {
            FormatError::InvalidToken { token, offset, .. } => {
                assert_eq!(offset, 0);
                assert_eq!(token.len(), MAX_TOKEN_LEN + 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(r.token.capacity() < 4 * MAX_TOKEN_LEN);
    }

    #[test]
    fn widest_f32_fits_token_limit() {
        for v in [f32::from_bits(1), -f32::MIN_POSITIVE, f32::MIN, -1.1754942e-38] {
            assert!(v.to_string().len() < MAX_TOKEN_LEN, "{v}");
        }
    }

    #[test]
    fn short_raw_region_is_eof_not_zero_fill() {
        let mut r = reader(b"abc");
        let err = r.read_raw(8, "map").unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedEof { expected: "map", .. }));
    }

    #[test]
    fn bad_token_carries_offset() {
        let mut r = reader(b"1 x2 ");
        r.read_i32("a").unwrap();
        match r.read_i32("b").unwrap_err() {
            FormatError::InvalidToken { token, offset, .. } => {
                assert_eq!(token, "x2");
                assert_eq!(offset, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_count_is_invalid_token() {
        let mut r = reader(b"-1 ");
        assert!(matches!(
            r.read_len("count"),
            Err(FormatError::InvalidToken { .. })
        ));
    }

    #[test]
    fn bool_rejects_other_digits() {
        let mut r = reader(b"2 ");
        assert!(r.read_bool("flag").is_err());
    }

    proptest! {
        #[test]
        fn f32_survives_text_form(bits in any::<u32>()) {
            let v = f32::from_bits(bits);
            prop_assume!(!v.is_nan());
            let mut w = TokenWriter::new(Vec::new());
            w.write_f32(v).unwrap();
            let buf = w.into_inner();
            let got = reader(&buf).read_f32("f").unwrap();
            prop_assert_eq!(got.to_bits(), bits);
        }

        #[test]
        fn i32_survives_text_form(v in any::<i32>()) {
            let mut w = TokenWriter::new(Vec::new());
            w.write_i32(v).unwrap();
            let buf = w.into_inner();
            prop_assert_eq!(reader(&buf).read_i32("i").unwrap(), v);
        }
    }
}
