//! Capabilities - 플러그인 생성자에 전달되는 기능 묶음
//!
//! 모든 플러그인이 같은 호스트 상태를 공유합니다.
//! 라이프사이클 구독은 해제할 수 없습니다 (플러그인은 프로세스와 수명이 같음).
//!
//! 레지스트리는 `applicationReady` 에서 채워지므로, 다른 플러그인 조회는
//! 생성자 안에서가 아니라 `on_load` 이후에 해야 합니다.

use super::button::{ButtonDescriptor, UiButtonFactory};
use super::registry::PluginRegistry;
use super::settings::{SettingHandle, SettingsItem, SettingsRegistrar};
use super::storage::{PluginStorageManager, ScopedStorage};
use super::traits::Plugin;
use crate::document::PluginStore;
use loom_foundation::{EventListener, LifecycleEventBus, Result};
use serde_json::Value;
use std::sync::Arc;

/// 플러그인 기능 묶음
#[derive(Clone)]
pub struct Capabilities {
    buttons: Arc<UiButtonFactory>,
    storage: Arc<PluginStorageManager>,
    settings: Arc<SettingsRegistrar>,
    bus: Arc<LifecycleEventBus>,
    registry: Arc<PluginRegistry>,
}

impl Capabilities {
    pub fn new(
        buttons: Arc<UiButtonFactory>,
        storage: Arc<PluginStorageManager>,
        settings: Arc<SettingsRegistrar>,
        bus: Arc<LifecycleEventBus>,
        registry: Arc<PluginRegistry>,
    ) -> Self {
        Self {
            buttons,
            storage,
            settings,
            bus,
            registry,
        }
    }

    // ========================================================================
    // Registry (읽기 전용)
    // ========================================================================

    /// 등록된 플러그인 조회 (`applicationReady` 전에는 없을 수 있음)
    pub fn plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.registry.get(name)
    }

    /// 등록된 플러그인 이름 (등록 순서)
    pub fn plugin_names(&self) -> Vec<String> {
        self.registry.names()
    }

    // ========================================================================
    // UI
    // ========================================================================

    /// 버튼 생성 (같은 id 는 한 번만)
    pub fn create_button(
        &self,
        plugin: &str,
        descriptor: &ButtonDescriptor,
    ) -> Result<Option<String>> {
        self.buttons.create_button(plugin, descriptor)
    }

    /// 설정 항목 등록
    pub fn add_settings_item(&self, item: SettingsItem) -> Result<SettingHandle> {
        self.settings.add_settings_item(item)
    }

    // ========================================================================
    // Storage
    // ========================================================================

    pub fn get_plugin_store(&self, plugin: &str) -> Arc<PluginStore> {
        self.storage.get_plugin_store(plugin)
    }

    pub fn set_plugin_store(&self, plugin: &str, key: &str, value: Value) {
        self.storage.set_plugin_store(plugin, key, value);
    }

    /// 플러그인 네임스페이스 핸들
    pub fn storage(&self, plugin: impl Into<String>) -> ScopedStorage {
        self.storage.scoped(plugin)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn on_document_loaded(&self, listener: impl EventListener + 'static) {
        self.bus.on_document_loaded(listener);
    }

    pub fn on_editor_opened(&self, listener: impl EventListener + 'static) {
        self.bus.on_editor_opened(listener);
    }

    pub fn on_in_preview_mode(&self, listener: impl EventListener + 'static) {
        self.bus.on_in_preview_mode(listener);
    }

    pub fn on_saved_node(&self, listener: impl EventListener + 'static) {
        self.bus.on_saved_node(listener);
    }

    /// `applicationReady` 구독
    pub fn on_load(&self, listener: impl EventListener + 'static) {
        self.bus.on_application_ready(listener);
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("settings", &self.settings.len())
            .field("listeners", &self.bus.listener_count())
            .field("plugins", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::registry::PluginRegistry;
    use crate::plugin::settings::SettingsColumn;
    use crate::ui::UiTree;
    use loom_foundation::{LifecycleEvent, LifecycleEventKind, MemorySettingsStorage};
    use parking_lot::Mutex;
    use serde_json::json;

    fn capabilities() -> (Capabilities, Arc<LifecycleEventBus>, Arc<PluginRegistry>) {
        let mut containers = SettingsColumn::container_ids();
        containers.push("toolbar".to_string());
        let ui = Arc::new(UiTree::with_containers(containers));
        let bus = Arc::new(LifecycleEventBus::new());
        let registry = Arc::new(PluginRegistry::new());

        let caps = Capabilities::new(
            Arc::new(UiButtonFactory::new(Arc::clone(&ui), Arc::clone(&registry))),
            Arc::new(PluginStorageManager::new()),
            Arc::new(SettingsRegistrar::new(
                Arc::new(MemorySettingsStorage::new()),
                ui,
                SettingsColumn::A,
            )),
            Arc::clone(&bus),
            Arc::clone(&registry),
        );
        (caps, bus, registry)
    }

    #[test]
    fn test_hooks_subscribe_to_their_own_events() {
        let (caps, bus, _) = capabilities();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        caps.on_in_preview_mode(move |_: &LifecycleEvent| -> Result<()> {
            s.lock().push("preview");
            Ok(())
        });
        let s = Arc::clone(&seen);
        caps.on_saved_node(move |_: &LifecycleEvent| -> Result<()> {
            s.lock().push("saved");
            Ok(())
        });

        bus.emit(LifecycleEvent::in_preview_mode(json!({})));
        assert_eq!(*seen.lock(), vec!["preview"]);

        bus.emit(LifecycleEvent::saved_node(json!({})));
        assert_eq!(*seen.lock(), vec!["preview", "saved"]);
    }

    #[test]
    fn test_on_load_is_application_ready() {
        let (caps, bus, _) = capabilities();
        caps.on_load(|_: &LifecycleEvent| -> Result<()> { Ok(()) });

        assert_eq!(bus.listener_count_for(LifecycleEventKind::ApplicationReady), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let (caps, _, _) = capabilities();
        let other = caps.clone();

        caps.set_plugin_store("Runner", "x", json!(1));
        assert_eq!(other.get_plugin_store("Runner")["x"], 1);
        assert_eq!(other.storage("Runner").get_key("x"), Some(json!(1)));
    }

    struct Named;

    impl Plugin for Named {
        fn name(&self) -> &str {
            "Named"
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_registry_is_visible_once_registered() {
        let (caps, _, registry) = capabilities();
        assert!(caps.plugin("Named").is_none());

        registry.register(Arc::new(Named)).unwrap();

        assert_eq!(caps.plugin("Named").unwrap().name(), "Named");
        assert_eq!(caps.plugin_names(), vec!["Named"]);
    }
}
