//! 스트림 프레임 모델
//!
//! 백엔드는 줄마다 하나의 JSON 객체를 보내며, `type` 필드로 프레임 종류를 구분합니다.
//!
//! | `type` | 필드 |
//! |---|---|
//! | `log` | `message`, `result` (선택), `progress` (선택, 숫자) |
//! | `complete` | `found_panels` (결과 레코드 배열) |
//! | 그 외 / 없음 | `message` |

use adminscan_core::types::ResultRecord;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ScanError;

/// 성공을 나타내는 `log` 프레임의 결과 토큰
pub const RESULT_OK: &str = "OK";

/// 파싱된 스트림 프레임
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// 진행 로그
    Log(LogFrame),
    /// 스캔 완료와 발견된 패널 목록
    Complete(CompleteFrame),
    /// 알 수 없는 유형 (스타일 없이 메시지만 출력)
    Other(OtherFrame),
}

/// `log` 프레임
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogFrame {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
}

impl LogFrame {
    /// 결과 토큰이 정확히 `"OK"`인지 여부
    pub fn is_ok(&self) -> bool {
        self.result.as_deref() == Some(RESULT_OK)
    }
}

/// `complete` 프레임
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompleteFrame {
    pub found_panels: Vec<ResultRecord>,
}

/// 그 외 유형의 프레임
#[derive(Debug, Clone, PartialEq)]
pub struct OtherFrame {
    /// `type` 필드 값 (없거나 문자열이 아니면 `None`)
    pub kind: Option<String>,
    pub message: Option<String>,
}

impl Frame {
    /// 한 줄의 JSON 텍스트를 프레임으로 파싱합니다.
    pub fn parse(line: &str) -> Result<Self, ScanError> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| ScanError::malformed(line.as_bytes(), e.to_string()))?;
        Self::from_value(value).map_err(|reason| ScanError::malformed(line.as_bytes(), reason))
    }

    /// JSON 값을 프레임으로 변환합니다.
    ///
    /// 최상위 값이 객체가 아니거나, `log`/`complete` 프레임의 필드 타입이
    /// 맞지 않으면 실패 사유를 반환합니다.
    pub fn from_value(value: Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err("frame is not a JSON object".to_owned());
        }

        match value.get("type").and_then(Value::as_str) {
            Some("log") => serde_json::from_value(value)
                .map(Frame::Log)
                .map_err(|e| format!("invalid log frame: {e}")),
            Some("complete") => serde_json::from_value(value)
                .map(Frame::Complete)
                .map_err(|e| format!("invalid complete frame: {e}")),
            kind => {
                let kind = kind.map(str::to_owned);
                let message = match value.get("message") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(text)) => Some(text.clone()),
                    Some(other) => Some(other.to_string()),
                };
                Ok(Frame::Other(OtherFrame { kind, message }))
            }
        }
    }

    /// 프레임 종류 이름 (로그 필드용)
    pub fn kind(&self) -> &str {
        match self {
            Frame::Log(_) => "log",
            Frame::Complete(_) => "complete",
            Frame::Other(other) => other.kind.as_deref().unwrap_or("other"),
        }
    }
}
