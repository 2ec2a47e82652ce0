//! 스캔 스트림 에러 타입
//!
//! [`ScanError`]는 전송, 프레임 디코딩, 세션 생명주기에서 발생하는 모든 에러를
//! 표현합니다. `From<ScanError> for AdminscanError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use adminscan_core::error::AdminscanError;

/// 스캔 세션 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// JSON 객체로 해석할 수 없는 줄
    #[error("malformed frame: {reason}: {line}")]
    MalformedFrame {
        /// 문제가 된 원본 줄
        line: String,
        /// 실패 사유
        reason: String,
    },

    /// 최대 프레임 길이 초과
    #[error("frame exceeds maximum length of {limit} bytes")]
    FrameTooLarge {
        /// 허용 최대 길이 (바이트)
        limit: usize,
    },

    /// 성공이 아닌 HTTP 상태 코드
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// 네트워크/전송 계층 장애
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// 사용자 요청에 의한 취소
    #[error("scan cancelled")]
    Cancelled,

    /// 이미 진행 중인 스캔이 있음
    #[error("a scan of {target} is already running; use \"stop\" first")]
    AlreadyRunning {
        /// 진행 중인 스캔 대상
        target: String,
    },
}

impl ScanError {
    /// 사용자 취소인지 여부
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) fn malformed(line: &[u8], reason: impl Into<String>) -> Self {
        Self::MalformedFrame {
            line: String::from_utf8_lossy(line).into_owned(),
            reason: reason.into(),
        }
    }
}

impl From<ScanError> for AdminscanError {
    fn from(err: ScanError) -> Self {
        AdminscanError::Scan(Box::new(err))
    }
}
