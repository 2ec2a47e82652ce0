#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`frame`]: NDJSON 프레임 모델 (`log`, `complete`, 그 외)
//! - [`codec`]: 줄 단위 프레임 디코더 (`tokio_util::codec::Decoder`)
//! - [`reader`]: 취소 가능한 프레임 리더
//! - [`transport`]: 스캔 요청 전송 trait과 HTTP 구현
//! - [`session`]: 스캔 세션 상태 머신과 프레임별 렌더링
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! ScanTransport -> ByteStream -> NdjsonCodec -> FrameReader -> ScanEvent -> ScanController
//!      |                              |               |                          |
//!  HTTP POST                  line reassembly   CancellationToken      OutputSink rendering
//! ```

pub mod codec;
pub mod error;
pub mod frame;
pub mod reader;
pub mod session;
pub mod transport;

// --- 주요 타입 re-export ---

// 세션
pub use session::{ScanController, ScanEvent, ScanState};

// 에러
pub use error::ScanError;

// 프레임 / 코덱
pub use codec::{DEFAULT_MAX_FRAME_LENGTH, NdjsonCodec};
pub use frame::Frame;
pub use reader::FrameReader;

// 전송
pub use transport::{ByteStream, DynScanTransport, HttpTransport, ScanRequest, ScanTransport};
