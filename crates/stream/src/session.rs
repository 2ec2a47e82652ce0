//! 스캔 세션 컨트롤러
//!
//! 한 번에 하나의 스캔만 진행합니다. 상태 전이는 다음과 같습니다.
//!
//! ```text
//! Idle -> Starting -> Streaming -> { Completed | Cancelled | Failed }
//! ```
//!
//! 전송과 스트림 읽기는 별도 태스크에서 실행되고 [`ScanEvent`]를 채널로
//! 보냅니다. 컨트롤러를 소유한 쪽은 [`ScanController::next_event`]로 이벤트를
//! 받아 [`ScanController::apply`]로 도착 순서대로 하나씩 반영합니다.
//! 렌더링과 상태 변경은 이벤트 하나 단위로 원자적입니다.

use std::fmt;
use std::sync::Arc;

use adminscan_core::metrics as m;
use adminscan_core::options::ScanOptions;
use adminscan_core::render::{OutputSink, Tone, render_fault};
use adminscan_core::types::ResultRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::codec::{DEFAULT_MAX_FRAME_LENGTH, NdjsonCodec};
use crate::error::ScanError;
use crate::frame::{CompleteFrame, Frame, LogFrame, OtherFrame};
use crate::reader::FrameReader;
use crate::transport::{DynScanTransport, ScanRequest};

/// 스캔 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// 진행 중인 스캔 없음
    Idle,
    /// 요청 전송, 응답 헤더 대기 중
    Starting,
    /// 프레임 수신 중
    Streaming,
    /// 스트림이 정상 종료됨
    Completed,
    /// 사용자가 중단함
    Cancelled,
    /// 전송 장애 또는 잘못된 프레임
    Failed,
}

impl ScanState {
    /// 스캔이 진행 중인지 여부
    pub fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Streaming)
    }

    /// 종료 상태인지 여부
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 스캔 태스크가 컨트롤러로 보내는 이벤트
#[derive(Debug)]
pub enum ScanEvent {
    /// 성공 응답 헤더 수신
    Connected,
    /// 프레임 하나 수신
    Frame(Frame),
    /// 스캔 종료 (`Ok` = 스트림 정상 종료)
    Finished(Result<(), ScanError>),
}

struct ActiveScan {
    id: Uuid,
    target: String,
    state: ScanState,
    cancel: CancellationToken,
    events: mpsc::UnboundedReceiver<ScanEvent>,
    task: JoinHandle<()>,
}

/// 스캔 세션 컨트롤러
pub struct ScanController {
    transport: Arc<dyn DynScanTransport>,
    active: Option<ActiveScan>,
    results: Vec<ResultRecord>,
    last_state: ScanState,
    max_frame_length: usize,
}

impl ScanController {
    /// 전송 구현으로 컨트롤러를 생성합니다.
    pub fn new(transport: Arc<dyn DynScanTransport>) -> Self {
        Self {
            transport,
            active: None,
            results: Vec::new(),
            last_state: ScanState::Idle,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }

    /// 스트림 줄 하나의 최대 길이를 지정합니다.
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// 현재 상태. 진행 중인 스캔이 없으면 마지막 종료 상태를 반환합니다.
    pub fn state(&self) -> ScanState {
        self.active
            .as_ref()
            .map_or(self.last_state, |active| active.state)
    }

    /// 스캔이 진행 중인지 여부
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// 진행 중인 스캔의 대상 URL
    pub fn target(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.target.as_str())
    }

    /// 진행 중인 스캔의 세션 ID
    pub fn session_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|active| active.id)
    }

    /// 누적된 결과 레코드 (도착 순서)
    ///
    /// 세션이 끝나도 다음 스캔이 스트리밍을 시작할 때까지 유지됩니다.
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// 새 스캔을 시작합니다.
    ///
    /// 이미 진행 중인 스캔이 있으면 [`ScanError::AlreadyRunning`]으로 거부하며,
    /// 진행 중인 세션에는 손대지 않습니다. tokio 런타임 안에서 호출해야 합니다.
    pub fn start(&mut self, url: &str, options: &ScanOptions) -> Result<Uuid, ScanError> {
        if let Some(active) = &self.active {
            metrics::counter!(m::SCAN_SESSIONS_REJECTED_TOTAL).increment(1);
            warn!(
                scan_id = %active.id,
                target = %active.target,
                rejected = url,
                "scan already running, rejecting new scan"
            );
            return Err(ScanError::AlreadyRunning {
                target: active.target.clone(),
            });
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (tx, events) = mpsc::unbounded_channel();
        let request = ScanRequest::new(url, options);
        let span = info_span!("scan", scan_id = %id, target = url);

        let task = tokio::spawn(
            drive(
                Arc::clone(&self.transport),
                request,
                cancel.clone(),
                tx,
                NdjsonCodec::with_max_length(self.max_frame_length),
            )
            .instrument(span),
        );

        metrics::counter!(m::SCAN_SESSIONS_STARTED_TOTAL).increment(1);
        info!(scan_id = %id, target = url, state = %ScanState::Starting, "scan started");

        self.active = Some(ActiveScan {
            id,
            target: url.to_owned(),
            state: ScanState::Starting,
            cancel,
            events,
            task,
        });
        Ok(id)
    }

    /// 진행 중인 스캔의 취소를 요청합니다.
    ///
    /// 스캔 태스크는 다음 청크 읽기에서 취소를 관찰하고 `Finished(Cancelled)`를
    /// 보냅니다. 진행 중인 스캔이 없으면 `false`를 반환합니다.
    pub fn stop(&mut self) -> bool {
        match &self.active {
            Some(active) => {
                info!(scan_id = %active.id, target = %active.target, "scan stop requested");
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// 다음 스캔 이벤트를 기다립니다.
    ///
    /// 진행 중인 스캔이 없으면 영원히 대기하므로 `tokio::select!`의 한 갈래로
    /// 사용할 수 있습니다. 취소 안전(cancel-safe)합니다.
    pub async fn next_event(&mut self) -> ScanEvent {
        match self.active.as_mut() {
            Some(active) => active.events.recv().await.unwrap_or_else(|| {
                ScanEvent::Finished(Err(ScanError::Transport(std::io::Error::other(
                    "scan task ended without reporting an outcome",
                ))))
            }),
            None => std::future::pending().await,
        }
    }

    /// 이벤트 하나를 반영하고 렌더링합니다.
    pub fn apply(&mut self, event: ScanEvent, sink: &mut dyn OutputSink, options: &ScanOptions) {
        let Some(active) = self.active.as_mut() else {
            debug!(?event, "dropping scan event with no active session");
            return;
        };

        match event {
            ScanEvent::Connected => {
                active.state = ScanState::Streaming;
                info!(
                    scan_id = %active.id,
                    target = %active.target,
                    state = %ScanState::Streaming,
                    "scan streaming"
                );
                sink.line(Tone::Info, &format!("Starting scan for {}...", active.target));
                if options.verbose() {
                    let config = serde_json::to_string_pretty(&options.to_json())
                        .unwrap_or_else(|_| options.to_json().to_string());
                    sink.line(Tone::Debug, &format!("Configuration: {config}"));
                }
                self.results.clear();
                sink.progress(0.0);
            }
            ScanEvent::Frame(frame) => {
                debug!(scan_id = %active.id, kind = frame.kind(), "applying frame");
                match frame {
                    Frame::Log(log) => render_log(&log, sink),
                    Frame::Complete(complete) => self.accept_complete(complete, sink),
                    Frame::Other(other) => render_other(&other, sink),
                }
            }
            ScanEvent::Finished(outcome) => self.finish(outcome, sink, options),
        }
    }

    /// 진행 중인 스캔이 끝날 때까지 이벤트를 반영합니다.
    pub async fn wait_until_idle(&mut self, sink: &mut dyn OutputSink, options: &ScanOptions) {
        while self.is_active() {
            let event = self.next_event().await;
            self.apply(event, sink, options);
        }
    }

    fn accept_complete(&mut self, complete: CompleteFrame, sink: &mut dyn OutputSink) {
        let found = complete.found_panels;
        sink.line(
            Tone::Success,
            &format!("Scan completed. Found {} admin panels.", found.len()),
        );
        for record in found {
            sink.line(
                Tone::Success,
                &format!("Found: {}", record.url().unwrap_or_default()),
            );
            metrics::counter!(m::SCAN_RESULTS_RECORDED_TOTAL).increment(1);
            self.results.push(record);
        }
    }

    fn finish(
        &mut self,
        outcome: Result<(), ScanError>,
        sink: &mut dyn OutputSink,
        options: &ScanOptions,
    ) {
        let Some(active) = self.active.take() else {
            return;
        };

        let state = match &outcome {
            Ok(()) => ScanState::Completed,
            Err(ScanError::Cancelled) => ScanState::Cancelled,
            Err(_) => ScanState::Failed,
        };

        match outcome {
            Ok(()) => {}
            Err(ScanError::Cancelled) => sink.line(Tone::Warning, "Scan was stopped."),
            Err(err) => {
                warn!(scan_id = %active.id, error = %err, "scan failed");
                render_fault(sink, "Error occurred during scan", &err, options.verbose());
            }
        }

        sink.detach_progress();
        metrics::counter!(m::SCAN_SESSIONS_FINISHED_TOTAL, m::LABEL_RESULT => state.to_string())
            .increment(1);
        info!(
            scan_id = %active.id,
            target = %active.target,
            state = %state,
            results = self.results.len(),
            "scan finished"
        );
        self.last_state = state;
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            active.task.abort();
        }
    }
}

fn render_log(log: &LogFrame, sink: &mut dyn OutputSink) {
    if let Some(message) = &log.message {
        let tone = if log.is_ok() { Tone::Success } else { Tone::Error };
        sink.line(tone, message.trim());
    }
    if let Some(progress) = log.progress {
        sink.progress(clamp_progress(progress));
    }
}

fn render_other(other: &OtherFrame, sink: &mut dyn OutputSink) {
    if let Some(message) = &other.message {
        sink.line(Tone::Plain, message.trim());
    }
}

/// 진행률을 0~100으로 제한합니다. NaN은 0으로 취급합니다.
fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 100.0)
    }
}

async fn drive(
    transport: Arc<dyn DynScanTransport>,
    request: ScanRequest,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<ScanEvent>,
    codec: NdjsonCodec,
) {
    let outcome = stream_frames(transport.as_ref(), request, &cancel, &tx, codec).await;
    debug!(ok = outcome.is_ok(), "scan task finished");
    // 컨트롤러가 이미 사라졌으면 보낼 곳이 없음
    let _ = tx.send(ScanEvent::Finished(outcome));
}

async fn stream_frames(
    transport: &dyn DynScanTransport,
    request: ScanRequest,
    cancel: &CancellationToken,
    tx: &mpsc::UnboundedSender<ScanEvent>,
    codec: NdjsonCodec,
) -> Result<(), ScanError> {
    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ScanError::Cancelled),
        opened = transport.open(request) => opened?,
    };

    if tx.send(ScanEvent::Connected).is_err() {
        return Ok(());
    }

    let mut reader = FrameReader::with_codec(body, codec);
    while let Some(frame) = reader.next(cancel).await {
        if tx.send(ScanEvent::Frame(frame?)).is_err() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_progress_bounds() {
        assert_eq!(clamp_progress(-5.0), 0.0);
        assert_eq!(clamp_progress(42.5), 42.5);
        assert_eq!(clamp_progress(250.0), 100.0);
        assert_eq!(clamp_progress(f64::NAN), 0.0);
    }

    #[test]
    fn state_predicates() {
        assert!(ScanState::Starting.is_active());
        assert!(ScanState::Streaming.is_active());
        assert!(!ScanState::Idle.is_active());
        assert!(ScanState::Failed.is_terminal());
        assert!(!ScanState::Streaming.is_terminal());
        assert_eq!(ScanState::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn log_without_message_renders_only_progress() {
        let mut sink = adminscan_core::render::Transcript::new();
        render_log(
            &LogFrame {
                message: None,
                result: None,
                progress: Some(0.0),
            },
            &mut sink,
        );
        assert!(sink.lines().is_empty());
        assert_eq!(sink.progress_updates(), &[0.0]);
    }

    #[test]
    fn log_message_is_trimmed_and_styled_by_result() {
        let mut sink = adminscan_core::render::Transcript::new();
        render_log(
            &LogFrame {
                message: Some("  /admin found \n".to_owned()),
                result: Some("OK".to_owned()),
                progress: None,
            },
            &mut sink,
        );
        render_log(
            &LogFrame {
                message: Some("/login".to_owned()),
                result: Some("NO".to_owned()),
                progress: None,
            },
            &mut sink,
        );
        assert_eq!(sink.texts(Tone::Success), vec!["/admin found"]);
        assert_eq!(sink.texts(Tone::Error), vec!["/login"]);
    }
}
