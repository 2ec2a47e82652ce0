//! 스캔 옵션 저장소: 스키마 기반 타입 지정 키/값 레지스트리
//!
//! [`ScanOptions`]는 스캔 요청의 `config` 필드로 전송되는 옵션을 관리합니다.
//! 각 옵션의 타입은 [`OPTION_SCHEMA`]에 미리 선언되며, 쓰기 시
//! 원시 텍스트를 선언된 타입으로 변환합니다.
//!
//! # 불변 조건
//! - 키 집합은 런타임에 늘거나 줄지 않습니다.
//! - 알 수 없는 키 쓰기는 저장소를 변경하지 않고 실패합니다.
//! - 변환 실패 시 부분 변경은 일어나지 않습니다.
//!
//! # 사용 예시
//! ```
//! use adminscan_core::options::{OptionValue, ScanOptions};
//!
//! let mut options = ScanOptions::default();
//! let committed = options.set("threads", "20").unwrap();
//! assert_eq!(committed, OptionValue::Number(20.0));
//! assert_eq!(committed.to_string(), "20");
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::OptionError;

/// 옵션 값의 선언 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// 불리언 (`"true"` 대소문자 무시 비교)
    Bool,
    /// 10진수 숫자
    Number,
    /// 임의 문자열
    Text,
}

impl OptionKind {
    /// 에러 메시지에 쓰이는 타입 이름
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::Text => "string",
        }
    }

    /// 원시 텍스트를 이 타입의 값으로 변환합니다.
    ///
    /// 선언 타입과 입력 텍스트만으로 결과가 결정되는 순수 함수입니다.
    pub fn coerce(self, raw: &str) -> Option<OptionValue> {
        match self {
            Self::Bool => Some(OptionValue::Bool(raw.eq_ignore_ascii_case("true"))),
            Self::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(OptionValue::Number),
            Self::Text => Some(OptionValue::Text(raw.to_owned())),
        }
    }
}

/// 옵션 값
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// 값의 타입
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Number(_) => OptionKind::Number,
            Self::Text(_) => OptionKind::Text,
        }
    }

    /// 불리언 값을 반환합니다. 다른 타입이면 `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 숫자 값을 반환합니다. 다른 타입이면 `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 문자열 값을 반환합니다. 다른 타입이면 `None`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON 값으로 변환합니다. 정수로 표현 가능한 숫자는 정수로 직렬화됩니다.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => match integral(*n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => match integral(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// 소수부가 없고 i64 범위 안인 숫자를 정수로 변환합니다.
fn integral(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Some(n as i64)
    } else {
        None
    }
}

/// 옵션 스키마 엔트리
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// 옵션 이름 (`set <name> <value>`에서 사용)
    pub name: &'static str,
    /// 선언 타입
    pub kind: OptionKind,
    /// 기본값 (텍스트, 선언 타입으로 변환 가능해야 함)
    pub default: &'static str,
}

impl OptionSpec {
    pub const fn new(name: &'static str, kind: OptionKind, default: &'static str) -> Self {
        Self {
            name,
            kind,
            default,
        }
    }
}

/// 기본 옵션 스키마. 순서가 표시 순서이자 요청 본문의 키 순서입니다.
pub const OPTION_SCHEMA: &[OptionSpec] = &[
    OptionSpec::new("scanDelay", OptionKind::Number, "100"),
    OptionSpec::new("maxRetries", OptionKind::Number, "3"),
    OptionSpec::new("timeout", OptionKind::Number, "5000"),
    OptionSpec::new("userAgent", OptionKind::Text, "AdminScanner/2.0"),
    OptionSpec::new("verbose", OptionKind::Bool, "false"),
    OptionSpec::new("maxDepth", OptionKind::Number, "3"),
    OptionSpec::new("threads", OptionKind::Number, "5"),
    OptionSpec::new("saveResults", OptionKind::Bool, "true"),
];

/// 상세 출력 옵션 키
pub const VERBOSE: &str = "verbose";

/// User-Agent 옵션 키
pub const USER_AGENT: &str = "userAgent";

/// 스캔 옵션 저장소
///
/// 값은 [`OPTION_SCHEMA`]와 같은 순서의 슬롯에 저장됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    values: Vec<OptionValue>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            values: OPTION_SCHEMA.iter().map(default_value).collect(),
        }
    }
}

fn default_value(spec: &OptionSpec) -> OptionValue {
    // 스키마 기본값은 선언 타입으로 항상 변환 가능합니다 (schema_defaults_coerce 테스트).
    spec.kind
        .coerce(spec.default)
        .unwrap_or_else(|| OptionValue::Text(spec.default.to_owned()))
}

impl ScanOptions {
    fn index_of(&self, key: &str) -> Result<usize, OptionError> {
        OPTION_SCHEMA
            .iter()
            .position(|spec| spec.name == key)
            .ok_or_else(|| OptionError::UnknownOption {
                name: key.to_owned(),
            })
    }

    /// 옵션 값을 조회합니다.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.index_of(key).ok().map(|i| &self.values[i])
    }

    /// 원시 텍스트를 옵션의 선언 타입으로 변환하여 저장하고, 저장된 값을 반환합니다.
    ///
    /// # Errors
    ///
    /// - `OptionError::UnknownOption`: 스키마에 없는 키
    /// - `OptionError::InvalidValue`: 숫자 옵션에 숫자가 아닌 입력
    pub fn set(&mut self, key: &str, raw: &str) -> Result<OptionValue, OptionError> {
        let index = self.index_of(key)?;
        let spec = &OPTION_SCHEMA[index];
        let value = spec
            .kind
            .coerce(raw)
            .ok_or_else(|| OptionError::InvalidValue {
                name: key.to_owned(),
                value: raw.to_owned(),
                expected: spec.kind.name(),
            })?;

        tracing::debug!(option = key, value = %value, "option updated");
        self.values[index] = value.clone();
        Ok(value)
    }

    /// 불리언 옵션을 반전하고 새 값을 반환합니다.
    ///
    /// # Errors
    ///
    /// 불리언이 아닌 옵션이면 `OptionError::InvalidValue`.
    pub fn toggle(&mut self, key: &str) -> Result<bool, OptionError> {
        let index = self.index_of(key)?;
        let current = match &self.values[index] {
            OptionValue::Bool(b) => *b,
            other => {
                return Err(OptionError::InvalidValue {
                    name: key.to_owned(),
                    value: other.to_string(),
                    expected: OptionKind::Bool.name(),
                });
            }
        };
        self.values[index] = OptionValue::Bool(!current);
        Ok(!current)
    }

    /// 모든 옵션을 기본값으로 되돌립니다.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 스키마 순서의 (이름, 값) 목록을 반환합니다.
    pub fn snapshot(&self) -> Vec<(&'static str, &OptionValue)> {
        OPTION_SCHEMA
            .iter()
            .map(|spec| spec.name)
            .zip(self.values.iter())
            .collect()
    }

    /// 스캔 요청 본문의 `config` 객체를 생성합니다.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .snapshot()
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// 상세 출력 모드 여부
    pub fn verbose(&self) -> bool {
        self.get(VERBOSE)
            .and_then(OptionValue::as_bool)
            .unwrap_or(false)
    }

    /// 스캔 요청에 사용할 User-Agent
    pub fn user_agent(&self) -> &str {
        self.get(USER_AGENT)
            .and_then(OptionValue::as_text)
            .unwrap_or("AdminScanner/2.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defaults_coerce() {
        for spec in OPTION_SCHEMA {
            let value = spec.kind.coerce(spec.default);
            assert!(value.is_some(), "default of {} must coerce", spec.name);
            assert_eq!(value.map(|v| v.kind()), Some(spec.kind));
        }
    }

    #[test]
    fn defaults_match_schema() {
        let options = ScanOptions::default();
        assert_eq!(options.get("scanDelay"), Some(&OptionValue::Number(100.0)));
        assert_eq!(options.get("timeout"), Some(&OptionValue::Number(5000.0)));
        assert_eq!(
            options.get("userAgent"),
            Some(&OptionValue::Text("AdminScanner/2.0".to_owned()))
        );
        assert_eq!(options.get("verbose"), Some(&OptionValue::Bool(false)));
        assert_eq!(options.get("saveResults"), Some(&OptionValue::Bool(true)));
        assert!(!options.verbose());
    }

    #[test]
    fn set_number_coerces() {
        let mut options = ScanOptions::default();
        let value = options.set("threads", "12").unwrap();
        assert_eq!(value, OptionValue::Number(12.0));
        assert_eq!(options.get("threads"), Some(&OptionValue::Number(12.0)));
    }

    #[test]
    fn set_number_accepts_fraction() {
        let mut options = ScanOptions::default();
        let value = options.set("scanDelay", "12.5").unwrap();
        assert_eq!(value.to_string(), "12.5");
    }

    #[test]
    fn set_number_rejects_text_without_mutation() {
        let mut options = ScanOptions::default();
        let before = options.clone();
        let err = options.set("timeout", "forever").unwrap_err();
        assert!(matches!(err, OptionError::InvalidValue { .. }));
        assert_eq!(options, before);
    }

    #[test]
    fn set_number_rejects_non_finite() {
        let mut options = ScanOptions::default();
        assert!(options.set("timeout", "NaN").is_err());
        assert!(options.set("timeout", "inf").is_err());
        assert!(options.set("timeout", "").is_err());
    }

    #[test]
    fn set_bool_is_case_insensitive_true() {
        let mut options = ScanOptions::default();
        assert_eq!(options.set("verbose", "TRUE").unwrap(), OptionValue::Bool(true));
        assert_eq!(options.set("verbose", "yes").unwrap(), OptionValue::Bool(false));
        assert_eq!(options.set("verbose", "True").unwrap(), OptionValue::Bool(true));
    }

    #[test]
    fn set_text_is_verbatim() {
        let mut options = ScanOptions::default();
        options.set("userAgent", "Probe/1.0").unwrap();
        assert_eq!(options.user_agent(), "Probe/1.0");
    }

    #[test]
    fn set_unknown_key_fails_without_mutation() {
        let mut options = ScanOptions::default();
        let before = options.clone();
        let err = options.set("colour", "red").unwrap_err();
        assert_eq!(
            err,
            OptionError::UnknownOption {
                name: "colour".to_owned()
            }
        );
        assert_eq!(options, before);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let mut options = ScanOptions::default();
        assert!(options.set("ScanDelay", "1").is_err());
    }

    #[test]
    fn toggle_flips_bool() {
        let mut options = ScanOptions::default();
        assert!(options.toggle("verbose").unwrap());
        assert!(options.verbose());
        assert!(!options.toggle("verbose").unwrap());
    }

    #[test]
    fn toggle_rejects_non_bool() {
        let mut options = ScanOptions::default();
        assert!(options.toggle("threads").is_err());
        assert_eq!(options.get("threads"), Some(&OptionValue::Number(5.0)));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut options = ScanOptions::default();
        options.set("threads", "40").unwrap();
        options.set("userAgent", "x").unwrap();
        options.toggle("saveResults").unwrap();
        options.reset();
        assert_eq!(options, ScanOptions::default());
    }

    #[test]
    fn snapshot_keeps_schema_order() {
        let options = ScanOptions::default();
        let names: Vec<&str> = options.snapshot().into_iter().map(|(n, _)| n).collect();
        let expected: Vec<&str> = OPTION_SCHEMA.iter().map(|s| s.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn to_json_uses_integers_for_integral_numbers() {
        let options = ScanOptions::default();
        let json = options.to_json();
        assert_eq!(json["timeout"], serde_json::json!(5000));
        assert_eq!(json["verbose"], serde_json::json!(false));
        assert_eq!(json["userAgent"], serde_json::json!("AdminScanner/2.0"));
        let rendered = serde_json::to_string(&json).unwrap();
        assert!(rendered.starts_with(r#"{"scanDelay":100,"maxRetries":3"#));
    }

    #[test]
    fn display_formats_numbers_like_input() {
        assert_eq!(OptionValue::Number(100.0).to_string(), "100");
        assert_eq!(OptionValue::Number(-2.0).to_string(), "-2");
        assert_eq!(OptionValue::Number(0.25).to_string(), "0.25");
        assert_eq!(OptionValue::Bool(true).to_string(), "true");
    }
}
