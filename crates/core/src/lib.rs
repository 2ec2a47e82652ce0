#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod options;
pub mod render;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{AdminscanError, CommandError, ConfigError, OptionError};

// 설정
pub use config::AdminscanConfig;

// 스캔 옵션
pub use options::{OptionKind, OptionValue, ScanOptions};

// 히스토리
pub use history::{History, Recall, SharedHistory};

// 렌더링
pub use render::{Line, OutputSink, Tone, Transcript, render_fault};

// 도메인 타입
pub use types::ResultRecord;
