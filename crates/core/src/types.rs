//! 도메인 타입: 스캔 결과 레코드

use serde::{Deserialize, Serialize};

/// 발견된 관리자 패널 하나를 나타내는 결과 레코드
///
/// 백엔드가 보낸 JSON 객체를 그대로 보존합니다. 최소한 `url` 필드를
/// 가지며, 동일성은 구조적으로 판단합니다 (별도의 중복 제거 키 없음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(serde_json::Map<String, serde_json::Value>);

impl ResultRecord {
    /// JSON 객체로부터 레코드를 생성합니다.
    pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(fields)
    }

    /// 패널 URL
    pub fn url(&self) -> Option<&str> {
        self.0.get("url").and_then(serde_json::Value::as_str)
    }

    /// 임의 필드 조회
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }

    /// 원본 JSON 객체
    pub fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ResultRecord {
    fn from(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self::new(fields)
    }
}
