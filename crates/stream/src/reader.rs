//! 스트림 리더: 바이트 청크 스트림을 프레임 시퀀스로 변환
//!
//! 청크마다 취소 토큰을 확인하므로 `stop` 요청은 다음 청크 읽기 시점에
//! 관찰됩니다. 이미 수신한 프레임의 처리 도중에는 끼어들지 않습니다.
//! 끝에 도달하거나 실패한 리더는 다시 시작할 수 없습니다.

use futures::StreamExt;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use bytes::Bytes;

use crate::codec::NdjsonCodec;
use crate::error::ScanError;
use crate::frame::Frame;
use crate::transport::ByteStream;

/// NDJSON 프레임 리더
pub struct FrameReader {
    inner: FramedRead<StreamReader<ByteStream, Bytes>, NdjsonCodec>,
    finished: bool,
}

impl FrameReader {
    /// 기본 코덱으로 리더를 생성합니다.
    pub fn new(body: ByteStream) -> Self {
        Self::with_codec(body, NdjsonCodec::new())
    }

    /// 지정한 코덱으로 리더를 생성합니다.
    pub fn with_codec(body: ByteStream, codec: NdjsonCodec) -> Self {
        Self {
            inner: FramedRead::new(StreamReader::new(body), codec),
            finished: false,
        }
    }

    /// 다음 프레임을 읽습니다.
    ///
    /// 스트림이 끝나면 `None`을 반환합니다. 취소되면 `Err(ScanError::Cancelled)`를
    /// 한 번 반환하고, 이후 에러가 나면 더 이상 프레임을 내보내지 않습니다.
    pub async fn next(&mut self, cancel: &CancellationToken) -> Option<Result<Frame, ScanError>> {
        if self.finished {
            return None;
        }

        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => Some(Err(ScanError::Cancelled)),
            item = self.inner.next() => item,
        };

        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn body(chunks: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|chunk| Ok::<_, std::io::Error>(Bytes::from_static(chunk))),
        ))
    }

    /// 남은 프레임을 모두 읽어 수집합니다. 첫 에러에서 멈춥니다.
    async fn collect(mut reader: FrameReader) -> Result<Vec<Frame>, ScanError> {
        let cancel = CancellationToken::new();
        let mut frames = Vec::new();
        while let Some(frame) = reader.next(&cancel).await {
            frames.push(frame?);
        }
        Ok(frames)
    }

    #[tokio::test]
    async fn yields_frames_in_arrival_order() {
        let reader = FrameReader::new(body(vec![
            b"{\"type\":\"log\",\"message\":\"one\"}\n{\"ty",
            b"pe\":\"log\",\"message\":\"two\"}\n",
            b"{\"message\":\"three\"}",
        ]));
        let frames = collect(reader).await.unwrap();
        let kinds: Vec<_> = frames.iter().map(Frame::kind).collect();
        assert_eq!(kinds, vec!["log", "log", "other"]);
    }

    #[tokio::test]
    async fn empty_body_yields_nothing() {
        let reader = FrameReader::new(body(vec![]));
        let frames = collect(reader).await.unwrap();
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_next_chunk() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut reader = FrameReader::new(body(vec![b"{\"message\":\"x\"}\n"]));
        assert!(matches!(
            reader.next(&cancel).await,
            Some(Err(ScanError::Cancelled))
        ));
        assert!(reader.next(&cancel).await.is_none());
    }

    #[tokio::test]
    async fn transport_error_fails_stream_once() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"message\":\"a\"}\n")),
            Err(std::io::Error::other("connection reset")),
        ];
        let mut reader = FrameReader::new(Box::pin(stream::iter(chunks)));
        let cancel = CancellationToken::new();

        assert!(matches!(reader.next(&cancel).await, Some(Ok(_))));
        assert!(matches!(
            reader.next(&cancel).await,
            Some(Err(ScanError::Transport(_)))
        ));
        assert!(reader.next(&cancel).await.is_none());
    }

    #[tokio::test]
    async fn malformed_line_ends_stream() {
        let mut reader = FrameReader::new(body(vec![b"oops\n{\"message\":\"after\"}\n"]));
        let cancel = CancellationToken::new();
        assert!(matches!(
            reader.next(&cancel).await,
            Some(Err(ScanError::MalformedFrame { .. }))
        ));
        assert!(reader.next(&cancel).await.is_none());
    }
}
