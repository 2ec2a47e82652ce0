//! 렌더링 표면 계약
//!
//! 코어는 의미 태그가 달린 라인만 내보내고, 레이아웃이나 색상은
//! [`OutputSink`] 구현(터미널, JSON 라인 등)이 결정합니다.

use std::error::Error;

use serde::Serialize;

/// 출력 라인의 의미 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// 스타일 없는 일반 텍스트
    Plain,
    /// 입력된 명령의 에코
    Echo,
    /// 정보
    Info,
    /// 성공
    Success,
    /// 경고 (사용자가 의도한 중단 등)
    Warning,
    /// 에러
    Error,
    /// 상세 모드 진단
    Debug,
}

/// 렌더링된 한 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub tone: Tone,
    pub text: String,
}

impl Line {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

/// 렌더링 표면 (외부 협력자)
pub trait OutputSink {
    /// 태그 달린 라인을 출력합니다.
    fn line(&mut self, tone: Tone, text: &str);

    /// 지금까지의 출력을 지웁니다.
    fn clear(&mut self);

    /// 진행률 표시기를 갱신합니다 (0.0 ~ 100.0). 분리된 상태면 다시 붙입니다.
    fn progress(&mut self, percent: f64);

    /// 진행률 표시기를 화면에서 분리합니다.
    fn detach_progress(&mut self);
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn line(&mut self, tone: Tone, text: &str) {
        (**self).line(tone, text);
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn progress(&mut self, percent: f64) {
        (**self).progress(percent);
    }

    fn detach_progress(&mut self) {
        (**self).detach_progress();
    }
}

/// 공용 에러 렌더러
///
/// `headline: err` 형태의 에러 라인을 출력하고, `diagnostic`이 참이면
/// 에러의 Debug 표현과 원인 체인을 진단 라인으로 덧붙입니다.
pub fn render_fault(
    sink: &mut dyn OutputSink,
    headline: &str,
    err: &(dyn Error + 'static),
    diagnostic: bool,
) {
    sink.line(Tone::Error, &format!("{headline}: {err}"));
    if !diagnostic {
        return;
    }

    sink.line(Tone::Debug, &format!("Diagnostic: {err:?}"));
    let mut source = err.source();
    while let Some(cause) = source {
        sink.line(Tone::Debug, &format!("  caused by: {cause}"));
        source = cause.source();
    }
}

/// 메모리에 출력을 기록하는 싱크
///
/// 비대화형 실행 결과 수집과 테스트에서 사용합니다.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    lines: Vec<Line>,
    progress: Vec<f64>,
    progress_attached: bool,
    clears: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기록된 라인
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// 특정 태그의 라인 텍스트
    pub fn texts(&self, tone: Tone) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|line| line.tone == tone)
            .map(|line| line.text.as_str())
            .collect()
    }

    /// 특정 태그의 라인 수
    pub fn count(&self, tone: Tone) -> usize {
        self.lines.iter().filter(|line| line.tone == tone).count()
    }

    /// 어떤 라인이든 `needle`을 포함하는지 확인합니다.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }

    /// 진행률 갱신 기록
    pub fn progress_updates(&self) -> &[f64] {
        &self.progress
    }

    /// 진행률 표시기가 현재 붙어 있는지 여부
    pub fn progress_attached(&self) -> bool {
        self.progress_attached
    }

    /// `clear` 호출 횟수
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl OutputSink for Transcript {
    fn line(&mut self, tone: Tone, text: &str) {
        self.lines.push(Line::new(tone, text));
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.clears += 1;
    }

    fn progress(&mut self, percent: f64) {
        self.progress.push(percent);
        self.progress_attached = true;
    }

    fn detach_progress(&mut self) {
        self.progress_attached = false;
    }
}
