//! Plugin traits - 핵심 플러그인 인터페이스

use super::capabilities::Capabilities;
use crate::ui::UiEvent;
use loom_foundation::{Error, Result};
use std::any::Any;
use std::sync::Arc;

// ============================================================================
// Command - 플러그인이 노출하는 명령
// ============================================================================

/// 플러그인 명령 핸들
///
/// 버튼은 메서드 이름 문자열 대신 이 핸들을 들고 있습니다.
/// 플러그인은 보통 상수로 선언합니다.
///
/// ```ignore
/// pub const EXECUTE: Command = Command::new("execute");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    name: &'static str,
}

impl Command {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Plugin Trait - 모든 플러그인이 구현해야 하는 인터페이스
// ============================================================================

/// 플러그인 트레이트
///
/// 생성자는 `Capabilities` 를 받아 버튼, 설정, 라이프사이클 리스너를
/// 등록할 수 있습니다. 레지스트리 등록은 `applicationReady` 이후입니다.
pub trait Plugin: Send + Sync {
    /// 플러그인 이름 (레지스트리 키, 저장소 네임스페이스)
    fn name(&self) -> &str;

    /// 플러그인이 처리하는 명령 목록
    fn commands(&self) -> Vec<Command> {
        vec![]
    }

    /// 명령 실행
    fn invoke(&self, command: Command, _event: &UiEvent) -> Result<()> {
        Err(Error::unknown_command(self.name(), command.name()))
    }

    /// 타입 캐스팅을 위한 헬퍼 (다운캐스팅 지원)
    fn as_any(&self) -> &dyn Any;
}

/// 플러그인 생성자
pub type PluginConstructor = fn(&Capabilities) -> Result<Arc<dyn Plugin>>;
