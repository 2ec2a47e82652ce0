//! NDJSON 코덱: 청크 경계와 무관한 줄 단위 프레임 복원
//!
//! [`NdjsonCodec`]은 `tokio_util::codec::Decoder`를 구현합니다. 줄 분리는
//! 바이트 `\n` 기준이므로 청크 사이에 나뉜 멀티바이트 UTF-8 문자도 줄이
//! 완성된 뒤에 한 번에 디코딩됩니다.
//!
//! - `\r\n` 줄 끝을 허용합니다.
//! - 공백뿐인 줄은 건너뜁니다.
//! - 스트림 종료 시 개행 없이 남은 줄도 마지막 프레임으로 파싱합니다.
//! - 최대 길이를 넘는 줄은 버퍼를 무한히 키우지 않고 [`ScanError::FrameTooLarge`]로 실패합니다.

use std::cmp;

use adminscan_core::metrics as m;
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::frame::Frame;

/// 기본 최대 프레임 길이 (1 MiB)
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// NDJSON 프레임 디코더
#[derive(Debug, Clone)]
pub struct NdjsonCodec {
    /// 다음 `\n` 탐색을 시작할 버퍼 오프셋 (이미 검사한 바이트는 다시 보지 않음)
    next_index: usize,
    max_length: usize,
}

impl NdjsonCodec {
    /// 기본 최대 길이로 코덱을 생성합니다.
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_FRAME_LENGTH)
    }

    /// 줄 하나의 최대 길이(개행 제외)를 지정하여 코덱을 생성합니다.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            next_index: 0,
            max_length,
        }
    }

    /// 최대 줄 길이
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for NdjsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NdjsonCodec {
    type Item = Frame;
    type Error = ScanError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, ScanError> {
        loop {
            // 개행 문자 1바이트까지 포함해서 탐색
            let read_to = cmp::min(self.max_length.saturating_add(1), buf.len());
            let newline = buf[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n');

            match newline {
                Some(offset) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let line = buf.split_to(end + 1);
                    let line = trim_line_ending(&line[..end]);
                    if is_blank(line) {
                        continue;
                    }
                    return decode_line(line).map(Some);
                }
                None if buf.len() > self.max_length => {
                    warn!(
                        buffered = buf.len(),
                        limit = self.max_length,
                        "stream line exceeds maximum frame length"
                    );
                    metrics::counter!(m::STREAM_MALFORMED_FRAMES_TOTAL).increment(1);
                    return Err(ScanError::FrameTooLarge {
                        limit: self.max_length,
                    });
                }
                None => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, ScanError> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        if buf.is_empty() {
            return Ok(None);
        }

        // 스트림 종료 시 개행 없이 남은 줄
        self.next_index = 0;
        let rest = buf.split_to(buf.len());
        let line = trim_line_ending(&rest);
        if is_blank(line) {
            return Ok(None);
        }
        debug!(len = line.len(), "parsing unterminated trailing line");
        decode_line(line).map(Some)
    }
}

fn decode_line(line: &[u8]) -> Result<Frame, ScanError> {
    let result = std::str::from_utf8(line)
        .map_err(|e| ScanError::malformed(line, e.to_string()))
        .and_then(Frame::parse);

    match &result {
        Ok(frame) => {
            metrics::counter!(m::STREAM_FRAMES_DECODED_TOTAL).increment(1);
            debug!(kind = frame.kind(), "decoded stream frame");
        }
        Err(e) => {
            metrics::counter!(m::STREAM_MALFORMED_FRAMES_TOTAL).increment(1);
            warn!(error = %e, "malformed stream frame");
        }
    }
    result
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::LogFrame;

    fn log(message: &str) -> Frame {
        Frame::Log(LogFrame {
            message: Some(message.to_owned()),
            result: None,
            progress: None,
        })
    }

    #[test]
    fn decodes_complete_lines_and_keeps_partial_tail() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(
            &b"{\"type\":\"log\",\"message\":\"a\"}\n{\"type\":\"log\",\"mess"[..],
        );

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(log("a")));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"age\":\"b\"}\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(log("b")));
        assert!(buf.is_empty());
    }

    #[test]
    fn skips_blank_lines_and_accepts_crlf() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"\n  \r\n{\"type\":\"log\",\"message\":\"a\"}\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(log("a")));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn reassembles_utf8_split_across_chunks() {
        let line = "{\"type\":\"log\",\"message\":\"관리자 페이지\"}\n".as_bytes();
        // 멀티바이트 문자 중간에서 분할
        let split = line.iter().position(|b| *b >= 0x80).unwrap() + 1;

        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&line[..split]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(&line[split..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(log("관리자 페이지")));
    }

    #[test]
    fn eof_parses_unterminated_trailing_line() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"log\",\"message\":\"tail\"}"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some(log("tail")));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn eof_ignores_blank_tail() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"   "[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn eof_with_malformed_tail_fails() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":"[..]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(ScanError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn malformed_line_carries_raw_text() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"not json\n"[..]);
        match codec.decode(&mut buf) {
            Err(ScanError::MalformedFrame { line, .. }) => assert_eq!(line, "not json"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"message\":\"\xff\"}\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ScanError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn oversized_line_fails_without_newline() {
        let mut codec = NdjsonCodec::with_max_length(16);
        let mut buf = BytesMut::from(&[b'x'; 17][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ScanError::FrameTooLarge { limit: 16 })
        ));
    }

    #[test]
    fn line_at_exact_limit_is_accepted() {
        let line = br#"{"message":"ok"}"#;
        let mut codec = NdjsonCodec::with_max_length(line.len());
        let mut buf = BytesMut::from(&line[..]);
        buf.extend_from_slice(b"\n");
        assert!(codec.decode(&mut buf).unwrap().is_some());
    }

    #[test]
    fn resumes_scan_offset_after_partial_read() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"message\":"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.next_index, buf.len());
        buf.extend_from_slice(b"\"x\"}\n");
        assert!(codec.decode(&mut buf).unwrap().is_some());
        assert_eq!(codec.next_index, 0);
    }

    // Property-based tests using proptest
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const DOCUMENT: &str = concat!(
            "{\"type\":\"log\",\"message\":\"checking /admin\",",
            "\"result\":\"OK\",\"progress\":10}\n",
            "\r\n",
            "{\"type\":\"log\",\"message\":\"checking /관리자\",",
            "\"result\":\"NO\",\"progress\":55.5}\r\n",
            "{\"type\":\"status\",\"message\":\"halfway\"}\n",
            "\n",
            "{\"type\":\"complete\",\"found_panels\":[{\"url\":\"https://x/admin\"}]}",
        );

        /// 청크 목록을 순서대로 코덱에 넣고 나온 프레임을 모두 모읍니다.
        fn decode_chunks(chunks: &[&[u8]]) -> Vec<Frame> {
            let mut codec = NdjsonCodec::new();
            let mut buf = BytesMut::new();
            let mut frames = Vec::new();
            for chunk in chunks {
                buf.extend_from_slice(chunk);
                while let Some(frame) = codec.decode(&mut buf).unwrap() {
                    frames.push(frame);
                }
            }
            while let Some(frame) = codec.decode_eof(&mut buf).unwrap() {
                frames.push(frame);
            }
            frames
        }

        fn split_at_points(bytes: &[u8], mut points: Vec<usize>) -> Vec<&[u8]> {
            points.sort_unstable();
            points.dedup();
            let mut chunks = Vec::new();
            let mut start = 0;
            for point in points {
                let point = point.min(bytes.len());
                chunks.push(&bytes[start..point]);
                start = point;
            }
            chunks.push(&bytes[start..]);
            chunks
        }

        proptest! {
            #[test]
            fn rechunking_yields_identical_frames(
                points in prop::collection::vec(0usize..DOCUMENT.len(), 0..12)
            ) {
                let bytes = DOCUMENT.as_bytes();
                let whole = decode_chunks(&[bytes]);
                let rechunked = decode_chunks(&split_at_points(bytes, points));
                prop_assert_eq!(whole.len(), 4);
                prop_assert_eq!(rechunked, whole);
            }

            #[test]
            fn arbitrary_bytes_do_not_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
                let mut codec = NdjsonCodec::with_max_length(128);
                let mut buf = BytesMut::from(&bytes[..]);
                while let Ok(Some(_)) = codec.decode(&mut buf) {}
            }
        }
    }
}
