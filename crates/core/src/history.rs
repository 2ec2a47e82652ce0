//! 명령 히스토리: 제출된 명령 줄의 추가 전용 기록
//!
//! 엔트리 0이 가장 오래된 명령입니다. 탐색 커서는 가장 최근 엔트리로부터의
//! 거리를 나타내며, `None`은 탐색 중이 아님을 뜻합니다.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 커서 이동 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall<'a> {
    /// 새 커서 위치의 엔트리로 입력을 교체
    Entry(&'a str),
    /// 입력을 비움
    Clear,
    /// 경계에 도달하여 입력을 그대로 둠
    Unchanged,
}

/// 명령 히스토리 원장
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl History {
    /// 빈 히스토리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 명령 줄을 기록하고 탐색 커서를 초기화합니다.
    ///
    /// 중복이나 이전에 불러온 줄도 그대로 추가됩니다.
    pub fn record(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.cursor = None;
    }

    /// 한 단계 더 오래된 엔트리로 이동합니다.
    ///
    /// 가장 오래된 엔트리에서는 아무 것도 바꾸지 않습니다.
    pub fn recall_older(&mut self) -> Recall<'_> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.entries.len() {
            return Recall::Unchanged;
        }
        self.cursor = Some(next);
        Recall::Entry(&self.entries[self.entries.len() - 1 - next])
    }

    /// 한 단계 더 최근 엔트리로 이동합니다.
    ///
    /// 가장 최근 엔트리를 지나거나 탐색 중이 아니면 입력을 비웁니다.
    pub fn recall_newer(&mut self) -> Recall<'_> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                Recall::Entry(&self.entries[self.entries.len() - c])
            }
            _ => {
                self.cursor = None;
                Recall::Clear
            }
        }
    }

    /// 탐색 커서 (가장 최근 엔트리로부터의 거리)
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// (1부터 시작하는 번호, 명령) 목록을 제출 순서로 반환합니다.
    pub fn list(&self) -> Vec<(usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i + 1, entry.as_str()))
            .collect()
    }

    /// 기록된 엔트리 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 기록이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 라인 편집기 스레드와 공유되는 히스토리 핸들
///
/// 라인 편집기는 블로킹 스레드에서 위/아래 키로 히스토리를 탐색하므로
/// 인터프리터와 편집기가 같은 원장을 봐야 합니다.
#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    inner: Arc<Mutex<History>>,
}

impl SharedHistory {
    /// 빈 공유 히스토리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 원장을 잠급니다. 잠금이 오염되어도 원장 자체는 유효하므로 그대로 사용합니다.
    pub fn lock(&self) -> MutexGuard<'_, History> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(lines: &[&str]) -> History {
        let mut history = History::new();
        for line in lines {
            history.record(*line);
        }
        history
    }

    #[test]
    fn list_is_one_indexed_in_submission_order() {
        let history = history_of(&["help", "config"]);
        assert_eq!(history.list(), vec![(1, "help"), (2, "config")]);
    }

    #[test]
    fn record_keeps_duplicates() {
        let history = history_of(&["help", "help"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn recall_older_walks_back_then_clamps() {
        let mut history = history_of(&["a", "b", "c"]);
        assert_eq!(history.recall_older(), Recall::Entry("c"));
        assert_eq!(history.recall_older(), Recall::Entry("b"));
        assert_eq!(history.recall_older(), Recall::Entry("a"));
        assert_eq!(history.recall_older(), Recall::Unchanged);
        assert_eq!(history.cursor(), Some(2));
    }

    #[test]
    fn recall_newer_walks_forward_then_clears() {
        let mut history = history_of(&["a", "b", "c"]);
        history.recall_older();
        history.recall_older();
        history.recall_older();
        assert_eq!(history.recall_newer(), Recall::Entry("b"));
        assert_eq!(history.recall_newer(), Recall::Entry("c"));
        assert_eq!(history.recall_newer(), Recall::Clear);
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn recall_newer_when_not_browsing_clears() {
        let mut history = history_of(&["a"]);
        assert_eq!(history.recall_newer(), Recall::Clear);
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn recall_on_empty_history() {
        let mut history = History::new();
        assert_eq!(history.recall_older(), Recall::Unchanged);
        assert_eq!(history.recall_newer(), Recall::Clear);
    }

    #[test]
    fn record_resets_cursor() {
        let mut history = history_of(&["a", "b"]);
        history.recall_older();
        history.record("b");
        assert_eq!(history.cursor(), None);
        assert_eq!(history.recall_older(), Recall::Entry("b"));
    }

    #[test]
    fn shared_history_sees_same_entries() {
        let shared = SharedHistory::new();
        let editor_side = shared.clone();
        shared.lock().record("scan http://x");
        assert_eq!(editor_side.lock().recall_older(), Recall::Entry("scan http://x"));
    }
}
