//! Event Types - 라이프사이클 이벤트 타입 정의
//!
//! 호스트 에디터가 방송하는 문서/에디터 상태 전환을 정의합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Event ID
// ============================================================================

/// 이벤트 고유 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// 새 이벤트 ID 생성
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Lifecycle Event Kind
// ============================================================================

/// 라이프사이클 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleEventKind {
    /// 문서 로드 완료 (payload: 문서 헤더)
    DocumentLoaded,
    /// 새 문서 시작
    NewDocumentStarted,
    /// 노드 에디터 열림
    EditorOpened,
    /// 노드 저장됨
    SavedNode,
    /// 미리보기 모드 진입
    InPreviewMode,
    /// 애플리케이션 준비 완료 (한 번만 발생)
    ApplicationReady,
    /// 설정 패널 열림
    SettingsOpened,
}

impl LifecycleEventKind {
    /// 모든 종류
    pub const ALL: [LifecycleEventKind; 7] = [
        Self::DocumentLoaded,
        Self::NewDocumentStarted,
        Self::EditorOpened,
        Self::SavedNode,
        Self::InPreviewMode,
        Self::ApplicationReady,
        Self::SettingsOpened,
    ];

    /// 이벤트 이름 반환
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentLoaded => "documentLoaded",
            Self::NewDocumentStarted => "newDocumentStarted",
            Self::EditorOpened => "editorOpened",
            Self::SavedNode => "savedNode",
            Self::InPreviewMode => "inPreviewMode",
            Self::ApplicationReady => "applicationReady",
            Self::SettingsOpened => "settingsOpened",
        }
    }
}

impl std::fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleEventKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("Unknown lifecycle event: {}", s)))
    }
}

// ============================================================================
// LifecycleEvent
// ============================================================================

/// 라이프사이클 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// 이벤트 ID
    pub id: EventId,

    /// 이벤트 종류
    pub kind: LifecycleEventKind,

    /// 이벤트 데이터
    pub payload: Value,

    /// 이벤트 발생 시간
    pub timestamp: DateTime<Utc>,

    /// 이벤트 소스
    pub source: String,
}

impl LifecycleEvent {
    /// 새 이벤트 생성
    pub fn new(kind: LifecycleEventKind) -> Self {
        Self {
            id: EventId::new(),
            kind,
            payload: Value::Null,
            timestamp: Utc::now(),
            source: "host".to_string(),
        }
    }

    /// 데이터 설정
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// 소스 설정
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    // ========================================================================
    // 사전 정의된 이벤트
    // ========================================================================

    pub fn document_loaded(header: Value) -> Self {
        Self::new(LifecycleEventKind::DocumentLoaded).with_payload(header)
    }

    pub fn new_document_started() -> Self {
        Self::new(LifecycleEventKind::NewDocumentStarted)
    }

    pub fn editor_opened(state: Value) -> Self {
        Self::new(LifecycleEventKind::EditorOpened).with_payload(state)
    }

    pub fn saved_node(state: Value) -> Self {
        Self::new(LifecycleEventKind::SavedNode).with_payload(state)
    }

    pub fn in_preview_mode(state: Value) -> Self {
        Self::new(LifecycleEventKind::InPreviewMode).with_payload(state)
    }

    pub fn application_ready() -> Self {
        Self::new(LifecycleEventKind::ApplicationReady)
    }

    pub fn settings_opened() -> Self {
        Self::new(LifecycleEventKind::SettingsOpened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in LifecycleEventKind::ALL {
            let parsed: LifecycleEventKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);

            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::json!(kind.as_str()));
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert!("yarnLoadedData".parse::<LifecycleEventKind>().is_err());
    }

    #[test]
    fn test_constructors() {
        let event = LifecycleEvent::document_loaded(serde_json::json!({ "title": "x" }));
        assert_eq!(event.kind, LifecycleEventKind::DocumentLoaded);
        assert_eq!(event.payload["title"], "x");
        assert_eq!(event.source, "host");

        let event = LifecycleEvent::settings_opened().with_source("test");
        assert!(event.payload.is_null());
        assert_eq!(event.source, "test");
    }
}
