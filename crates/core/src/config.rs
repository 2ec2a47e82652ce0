//! 설정 관리: adminscan.toml 파싱 및 런타임 설정
//!
//! [`AdminscanConfig`]는 콘솔 프로세스의 설정을 담는 최상위 구조체입니다.
//! 스캔 요청과 함께 전송되는 옵션은 [`crate::options`]에서 별도로 관리합니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`ADMINSCAN_BACKEND_ENDPOINT=http://...` 형식)
//! 3. 설정 파일 (`adminscan.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), adminscan_core::error::AdminscanError> {
//! use adminscan_core::config::AdminscanConfig;
//!
//! // 파일이 없으면 기본값 + 환경변수 오버라이드
//! let config = AdminscanConfig::load_or_default("adminscan.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = AdminscanConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AdminscanError, ConfigError};

/// AdminScan 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminscanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 백엔드 설정
    #[serde(default)]
    pub backend: BackendConfig,
    /// 콘솔 설정
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl AdminscanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AdminscanError> {
        let mut config = Self::read(path.as_ref()).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// [`load`](Self::load)와 같지만, 파일이 없으면 기본값에서 시작합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, AdminscanError> {
        let config = Self::load_unvalidated(path).await?;
        config.validate()?;
        Ok(config)
    }

    /// 파일(없으면 기본값)과 환경변수 오버라이드까지만 적용하고 검증은 하지 않습니다.
    ///
    /// CLI 인자처럼 더 높은 우선순위의 값을 덮어쓴 뒤 호출자가
    /// [`validate`](Self::validate)를 직접 호출해야 합니다.
    pub async fn load_unvalidated(path: impl AsRef<Path>) -> Result<Self, AdminscanError> {
        let path = path.as_ref();
        let mut config = match Self::read(path).await {
            Err(AdminscanError::Config(ConfigError::FileNotFound { .. })) => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            other => other?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AdminscanError> {
        let config = Self::read(path.as_ref()).await?;
        config.validate()?;
        Ok(config)
    }

    async fn read(path: &Path) -> Result<Self, AdminscanError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AdminscanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AdminscanError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, AdminscanError> {
        toml::from_str(toml_str).map_err(|e| {
            AdminscanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `ADMINSCAN_{SECTION}_{FIELD}`
    /// 예: `ADMINSCAN_CONSOLE_EXPORT_DIR=/tmp/results`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "ADMINSCAN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "ADMINSCAN_GENERAL_LOG_FORMAT");

        // Backend
        override_string(&mut self.backend.endpoint, "ADMINSCAN_BACKEND_ENDPOINT");
        override_u64(
            &mut self.backend.connect_timeout_secs,
            "ADMINSCAN_BACKEND_CONNECT_TIMEOUT_SECS",
        );

        // Console
        override_string(&mut self.console.prompt, "ADMINSCAN_CONSOLE_PROMPT");
        override_bool(&mut self.console.show_intro, "ADMINSCAN_CONSOLE_SHOW_INTRO");
        override_u64(
            &mut self.console.type_delay_ms,
            "ADMINSCAN_CONSOLE_TYPE_DELAY_MS",
        );
        override_u64(
            &mut self.console.line_delay_ms,
            "ADMINSCAN_CONSOLE_LINE_DELAY_MS",
        );
        override_string(&mut self.console.export_dir, "ADMINSCAN_CONSOLE_EXPORT_DIR");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AdminscanError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // endpoint 검증
        let endpoint = self.backend.endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "backend.endpoint".to_owned(),
                reason: "must be an http:// or https:// URL".to_owned(),
            }
            .into());
        }

        if self.backend.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.connect_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.console.prompt.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "console.prompt".to_owned(),
                reason: "prompt must not be empty".to_owned(),
            }
            .into());
        }

        if self.console.export_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "console.export_dir".to_owned(),
                reason: "export directory must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 스캔 백엔드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// 스캔 요청을 보낼 엔드포인트
    pub endpoint: String,
    /// 연결 타임아웃 (초). 전체 스캔 시간은 제한하지 않습니다.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/scan".to_owned(),
            connect_timeout_secs: 10,
        }
    }
}

/// 콘솔 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// 입력 프롬프트
    pub prompt: String,
    /// 시작 배너 표시 여부
    pub show_intro: bool,
    /// 배너 문자 단위 출력 지연 (밀리초)
    pub type_delay_ms: u64,
    /// 배너 줄 사이 지연 (밀리초)
    pub line_delay_ms: u64,
    /// `export` 결과 파일을 저장할 디렉토리
    pub export_dir: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_owned(),
            show_intro: true,
            type_delay_ms: 50,
            line_delay_ms: 200,
            export_dir: ".".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
