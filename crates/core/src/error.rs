//! 에러 타입: 도메인별 에러 정의

/// AdminScan 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AdminscanError {
    /// 설정 파일 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 옵션 저장소 에러
    #[error("option error: {0}")]
    Option(#[from] OptionError),

    /// 명령 디스패치 에러
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// 스캔 세션 에러 (전송, 프레임 파싱, 취소). 원본 에러를 `source()`로 보존합니다.
    #[error("scan error: {0}")]
    Scan(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 파일 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 옵션 저장소 에러
///
/// 실패 시 저장소는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptionError {
    /// 스키마에 없는 옵션
    #[error("unknown option: {name}")]
    UnknownOption { name: String },

    /// 선언된 타입으로 변환할 수 없는 값
    #[error("invalid value for '{name}': '{value}' is not a valid {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
}

/// 명령 디스패치 에러
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// 등록되지 않은 명령
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// 인자 개수/형식 오류. 메시지는 그대로 사용법 안내로 출력됩니다.
    #[error("{0}")]
    Usage(String),

    /// 옵션 저장소 에러
    #[error(transparent)]
    Option(#[from] OptionError),

    /// 핸들러 실행 중 실패 (내보내기 I/O 등)
    #[error("{0}")]
    Failed(String),
}

impl CommandError {
    /// 일반 상태 텍스트로 출력해야 하는 에러인지 여부
    ///
    /// 사용법 오류와 옵션 오류는 세션을 중단시키지 않는 안내 메시지이고,
    /// 나머지는 에러 스타일로 출력됩니다.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::Option(_))
    }
}
