//! UI 상호작용 이벤트

use loom_foundation::Result;
use std::sync::Arc;

/// 상호작용 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    Click,
    PointerDown,
    DoubleClick,
    Change,
}

impl UiEventKind {
    /// DOM 이벤트 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::PointerDown => "pointerdown",
            Self::DoubleClick => "dblclick",
            Self::Change => "change",
        }
    }
}

impl std::fmt::Display for UiEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UiEventKind {
    type Err = loom_foundation::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "click" => Ok(Self::Click),
            "pointerdown" => Ok(Self::PointerDown),
            "dblclick" => Ok(Self::DoubleClick),
            "change" => Ok(Self::Change),
            other => Err(loom_foundation::Error::InvalidInput(format!(
                "Unknown UI event: {}",
                other
            ))),
        }
    }
}

/// UI 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    /// 상호작용 종류
    pub kind: UiEventKind,

    /// 대상 요소 id
    pub target: String,

    /// 입력 값 (change 이벤트)
    pub value: Option<String>,
}

impl UiEvent {
    pub fn new(kind: UiEventKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            value: None,
        }
    }

    pub fn click(target: impl Into<String>) -> Self {
        Self::new(UiEventKind::Click, target)
    }

    pub fn change(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(UiEventKind::Change, target).with_value(value)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// 요소에 붙는 이벤트 핸들러
pub type UiHandler = Arc<dyn Fn(&UiEvent) -> Result<()> + Send + Sync>;
