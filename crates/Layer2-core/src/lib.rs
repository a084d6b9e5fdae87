//! loom-core: Plugin runtime for Loom
//!
//! Layer2 - 플러그인 호스트 레이어
//!
//! # 주요 모듈
//!
//! - `document`: 문서 헤더와 플러그인 저장소 맵 (`pluginStorage`)
//! - `ui`: 메모리 내 요소 트리 (툴바, 설정 컬럼)
//! - `plugin`: 플러그인 호스트, 레지스트리, 버튼/설정/저장소 기능
//!
//! # 사용 예시
//!
//! ```ignore
//! use loom_core::{PluginHost, UiTree, SettingsColumn, TOOLBAR};
//!
//! let mut containers = SettingsColumn::container_ids();
//! containers.push(TOOLBAR.to_string());
//! let ui = Arc::new(UiTree::with_containers(containers));
//!
//! let host = PluginHost::new(HostConfig::load()?, ui, settings_storage)?;
//! host.start(&[my_plugin]);
//!
//! host.load_document(&header)?;
//! host.application_ready();
//! host.click("run-btn")?;
//!
//! host.save_document(&mut header);
//! ```

pub mod document;
pub mod plugin;
pub mod ui;

// Re-exports: Document
pub use document::{Document, DocumentHeader, PluginStorageMap, PluginStore, PLUGIN_STORAGE_KEY};

// Re-exports: UI
pub use ui::{Element, UiEvent, UiEventKind, UiHandler, UiTree, TOOLBAR};

// Re-exports: Plugin
pub use plugin::{
    ButtonDescriptor,
    // Capabilities
    Capabilities,
    // Traits
    Command,
    Plugin,
    PluginConstructor,
    // Host
    PluginHost,
    // Registry
    PluginRegistry,
    // Storage
    PluginStorageManager,
    ScopedStorage,
    // Settings
    SetterInput,
    SettingHandle,
    SettingSetter,
    SettingsColumn,
    SettingsItem,
    SettingsOption,
    SettingsRegistrar,
    StartReport,
    // Buttons
    UiButtonFactory,
};

// Layer1 re-exports
pub use loom_foundation::{
    DispatchReport, Error, HostConfig, LifecycleEvent, LifecycleEventBus, LifecycleEventKind,
    MemorySettingsStorage, Result, SettingsStorage,
};

/// Layer2 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_layout() {
        let ui = UiTree::with_containers(SettingsColumn::container_ids());
        ui.add_container(TOOLBAR).unwrap();

        assert!(ui.contains("settingsColumnA"));
        assert!(ui.contains("settingsColumnC"));
        assert!(ui.contains(TOOLBAR));
    }
}
