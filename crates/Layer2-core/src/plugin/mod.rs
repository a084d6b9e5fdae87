//! # Plugin System
//!
//! 문서 편집기 호스트를 위한 플러그인 시스템
//!
//! ## 개요
//!
//! 플러그인은 생성자에서 `Capabilities` 를 받아 호스트를 확장합니다:
//! - 툴바 버튼 추가 (`create_button`)
//! - 설정 항목 추가 (`add_settings_item`)
//! - 문서별 영속 저장소 (`storage`, `get_plugin_store`, `set_plugin_store`)
//! - 라이프사이클 이벤트 구독 (`on_document_loaded`, `on_load`, ...)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PluginHost                            │
//! │  ┌───────────────────────────────────────────────────────┐ │
//! │  │                   PluginRegistry                       │ │
//! │  │  ┌────────────┬────────────┬────────────────────┐    │ │
//! │  │  │ Runner     │ VarStore   │ ...                │    │ │
//! │  │  └────────────┴────────────┴────────────────────┘    │ │
//! │  │         (applicationReady 이후에만 채워짐)              │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! │                          │                                  │
//! │  ┌───────────────────────┼───────────────────────────────┐ │
//! │  │     Capabilities      │                               │ │
//! │  │  - UiButtonFactory    │  ──▶ UiTree (toolbar)         │ │
//! │  │  - SettingsRegistrar  │  ──▶ UiTree (settingsColumnX) │ │
//! │  │  - PluginStorage      │  ──▶ DocumentHeader           │ │
//! │  │  - LifecycleEventBus  │                               │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! const EXECUTE: Command = Command::new("execute");
//!
//! struct Runner;
//!
//! impl Plugin for Runner {
//!     fn name(&self) -> &str { "Runner" }
//!     fn commands(&self) -> Vec<Command> { vec![EXECUTE] }
//!     fn invoke(&self, command: Command, event: &UiEvent) -> Result<()> { ... }
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! fn runner(caps: &Capabilities) -> Result<Arc<dyn Plugin>> {
//!     caps.create_button("Runner", &ButtonDescriptor::new(TOOLBAR)
//!         .id("run-btn")
//!         .name("Run")
//!         .on_click(EXECUTE))?;
//!     Ok(Arc::new(Runner))
//! }
//!
//! let host = PluginHost::new(config, ui, settings_storage)?;
//! host.start(&[runner]);
//! host.application_ready();
//! ```

mod button;
mod capabilities;
mod host;
mod registry;
mod settings;
mod storage;
mod traits;

pub use button::{ButtonDescriptor, UiButtonFactory, DEFAULT_ICON};
pub use capabilities::Capabilities;
pub use host::{PluginHost, StartReport};
pub use registry::PluginRegistry;
pub use settings::{
    SetterInput, SettingHandle, SettingSetter, SettingsColumn, SettingsItem, SettingsOption,
    SettingsRegistrar,
};
pub use storage::{PluginStorageManager, ScopedStorage};
pub use traits::{Command, Plugin, PluginConstructor};
