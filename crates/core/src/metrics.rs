//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다. 스트림 크레이트는 이 상수로
//! `metrics::counter!()` 매크로를 호출합니다. 콘솔은 익스포터를 설치하지
//! 않으므로 기본적으로 기록은 무시되며, 임베딩하는 쪽에서 레코더를 설치할 수 있습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `adminscan_`
//! - 접미어: `_total` (counter)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (completed, cancelled, failed)
pub const LABEL_RESULT: &str = "result";

// ─── Scan Session 메트릭 ───────────────────────────────────────────

/// 시작된 스캔 세션 수 (counter)
pub const SCAN_SESSIONS_STARTED_TOTAL: &str = "adminscan_scan_sessions_started_total";

/// 거부된 스캔 시작 요청 수 (이미 진행 중인 세션 존재) (counter)
pub const SCAN_SESSIONS_REJECTED_TOTAL: &str = "adminscan_scan_sessions_rejected_total";

/// 종료된 스캔 세션 수 (counter, label: result)
pub const SCAN_SESSIONS_FINISHED_TOTAL: &str = "adminscan_scan_sessions_finished_total";

// ─── Stream Reader 메트릭 ──────────────────────────────────────────

/// 디코딩된 프레임 수 (counter)
pub const STREAM_FRAMES_DECODED_TOTAL: &str = "adminscan_stream_frames_decoded_total";

/// 잘못된 프레임 수 (counter)
pub const STREAM_MALFORMED_FRAMES_TOTAL: &str = "adminscan_stream_malformed_frames_total";

/// 누적된 결과 레코드 수 (counter)
pub const SCAN_RESULTS_RECORDED_TOTAL: &str = "adminscan_scan_results_recorded_total";
