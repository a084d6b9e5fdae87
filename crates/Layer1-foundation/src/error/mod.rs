//! Error types for Loom
//!
//! 플러그인 호스트 전체의 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Loom 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 / 저장소
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // 플러그인 관련
    // ========================================================================
    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Plugin not ready: {0}")]
    PluginNotReady(String),

    #[error("Plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("Unknown command '{command}' for plugin {plugin}")]
    UnknownCommand { plugin: String, command: String },

    // ========================================================================
    // UI 트리 관련
    // ========================================================================
    /// 부착 대상 컨테이너가 없음 (복구하지 않고 호스트까지 전파)
    #[error("Missing element: {0}")]
    MissingElement(String),

    // ========================================================================
    // 이벤트 디스패치
    // ========================================================================
    #[error("Dispatch of {event} failed in {} listener(s): {}", failures.len(), summarize(failures))]
    Dispatch { event: String, failures: Vec<Error> },

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 플러그인이 아직 레지스트리에 없어서 실패했는지 확인
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::PluginNotReady(_))
    }

    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::InvalidInput(_)
                | Error::Validation(_)
                | Error::PluginNotReady(_)
        )
    }

    /// 알 수 없는 커맨드 에러 생성 헬퍼
    pub fn unknown_command(plugin: impl Into<String>, command: impl Into<String>) -> Self {
        Error::UnknownCommand {
            plugin: plugin.into(),
            command: command.into(),
        }
    }

    /// 디스패치 실패 묶음 생성 헬퍼
    pub fn dispatch(event: impl Into<String>, failures: Vec<Error>) -> Self {
        Error::Dispatch {
            event: event.into(),
            failures,
        }
    }
}

fn summarize(failures: &[Error]) -> String {
    failures
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_message() {
        let err = Error::dispatch(
            "settingsOpened",
            vec![Error::MissingElement("settingsColumnC".into())],
        );

        let msg = err.to_string();
        assert!(msg.contains("settingsOpened"));
        assert!(msg.contains("1 listener(s)"));
        assert!(msg.contains("settingsColumnC"));
    }

    #[test]
    fn test_classification() {
        assert!(Error::PluginNotReady("Runner".into()).is_not_ready());
        assert!(!Error::MissingElement("toolbar".into()).is_user_facing());
        assert!(Error::Validation("empty title".into()).is_user_facing());
    }
}
