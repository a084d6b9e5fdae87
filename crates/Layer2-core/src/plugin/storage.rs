//! Plugin Storage - 플러그인별 영속 키/값 저장소
//!
//! 전체 맵이 하나의 `ReactiveCell` 에 들어 있고, 모든 변경은 맵 전체 교체입니다.
//! 그래서 호스트는 셀 하나만 구독하면 모든 플러그인 저장소 변경을 알 수 있습니다.
//!
//! 문서 경계에서 동기화됩니다:
//! - `documentLoaded`: 헤더에 `pluginStorage` 가 있으면 셀 전체를 그것으로 교체
//! - `newDocumentStarted`: 빈 맵으로 리셋

use crate::document::{DocumentHeader, PluginStorageMap, PluginStore};
use loom_foundation::{
    LifecycleEvent, LifecycleEventBus, ListenerId, ReactiveCell, Result, SubscriptionId,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// PluginStorageManager
// ============================================================================

/// 플러그인 저장소 관리자
pub struct PluginStorageManager {
    cell: ReactiveCell<PluginStorageMap>,
}

impl PluginStorageManager {
    pub fn new() -> Self {
        Self {
            cell: ReactiveCell::new(PluginStorageMap::new()),
        }
    }

    /// 문서 라이프사이클 이벤트 구독
    pub fn attach(&self, bus: &LifecycleEventBus) -> [ListenerId; 2] {
        let cell = self.cell.clone();
        let loaded = bus.on_document_loaded(move |event: &LifecycleEvent| -> Result<()> {
            if let Some(header) = DocumentHeader::from_payload(&event.payload)? {
                hydrate(&cell, &header)?;
            }
            Ok(())
        });

        let cell = self.cell.clone();
        let reset = bus.on_new_document_started(move |_: &LifecycleEvent| -> Result<()> {
            debug!("Resetting plugin storage for new document");
            cell.set(PluginStorageMap::new());
            Ok(())
        });

        [loaded, reset]
    }

    // ========================================================================
    // 조회 / 기록
    // ========================================================================

    /// 플러그인 저장소 조회
    ///
    /// 없으면 먼저 빈 저장소를 만들어 넣습니다.
    pub fn get_plugin_store(&self, plugin: &str) -> Arc<PluginStore> {
        if let Some(store) = self.cell.with(|map| map.get(plugin).cloned()) {
            return store;
        }

        let map = self.cell.update(|map| {
            if map.contains(plugin) {
                map.clone()
            } else {
                map.with_store(plugin, PluginStore::new())
            }
        });

        debug!(plugin, "Materialized empty plugin store");
        map.get(plugin).cloned().unwrap_or_default()
    }

    /// 플러그인 저장소의 한 항목 교체
    ///
    /// 읽기-수정-쓰기가 셀의 원자적 갱신 하나로 끝납니다.
    pub fn set_plugin_store(&self, plugin: &str, key: &str, value: Value) {
        debug!(plugin, key, "Writing plugin store entry");
        self.cell.update(|map| map.with_entry(plugin, key, value));
    }

    /// 현재 맵 스냅샷
    pub fn snapshot(&self) -> PluginStorageMap {
        self.cell.get()
    }

    /// 맵 전체 교체
    pub fn replace(&self, map: PluginStorageMap) {
        self.cell.set(map);
    }

    /// 빈 맵으로 리셋
    pub fn reset(&self) {
        self.cell.set(PluginStorageMap::new());
    }

    /// 변경 구독 (영속화 지점)
    pub fn subscribe(
        &self,
        listener: impl Fn(&PluginStorageMap) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.cell.subscribe(listener)
    }

    /// 내부 셀 (신뢰 경계: 다른 플러그인 저장소도 보임)
    pub fn cell(&self) -> &ReactiveCell<PluginStorageMap> {
        &self.cell
    }

    // ========================================================================
    // 문서 헤더 동기화
    // ========================================================================

    /// 헤더로부터 로드
    ///
    /// 헤더에 `pluginStorage` 가 없으면 아무것도 하지 않고 `false`.
    pub fn hydrate_from_header(&self, header: &DocumentHeader) -> Result<bool> {
        hydrate(&self.cell, header)
    }

    /// 헤더에 기록
    ///
    /// 맵이 비어 있고 헤더에도 필드가 없었으면 필드를 만들지 않습니다.
    pub fn write_to_header(&self, header: &mut DocumentHeader) {
        let snapshot = self.snapshot();
        if snapshot.is_empty() && !header.has_plugin_storage() {
            return;
        }
        header.set_plugin_storage(&snapshot);
    }

    /// 플러그인 범위 접근자
    pub fn scoped(self: &Arc<Self>, plugin: impl Into<String>) -> ScopedStorage {
        ScopedStorage {
            plugin: plugin.into(),
            manager: Arc::clone(self),
        }
    }
}

impl Default for PluginStorageManager {
    fn default() -> Self {
        Self::new()
    }
}

fn hydrate(cell: &ReactiveCell<PluginStorageMap>, header: &DocumentHeader) -> Result<bool> {
    match header.plugin_storage()? {
        Some(storage) => {
            info!(plugins = storage.len(), "Loaded plugin storage from document");
            cell.set(storage);
            Ok(true)
        }
        None => Ok(false),
    }
}

// ============================================================================
// ScopedStorage
// ============================================================================

/// 한 플러그인의 네임스페이스만 다루는 접근자
#[derive(Clone)]
pub struct ScopedStorage {
    plugin: String,
    manager: Arc<PluginStorageManager>,
}

impl ScopedStorage {
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    /// 전체 저장소
    pub fn get(&self) -> Arc<PluginStore> {
        self.manager.get_plugin_store(&self.plugin)
    }

    /// 한 항목
    pub fn get_key(&self, key: &str) -> Option<Value> {
        self.get().get(key).cloned()
    }

    /// 항목 기록
    pub fn set(&self, key: &str, value: Value) {
        self.manager.set_plugin_store(&self.plugin, key, value);
    }
}

impl std::fmt::Debug for ScopedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedStorage")
            .field("plugin", &self.plugin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_get_materializes_empty_store() {
        let manager = PluginStorageManager::new();

        let store = manager.get_plugin_store("VarStore");
        assert!(store.is_empty());
        assert!(manager.snapshot().contains("VarStore"));
    }

    #[test]
    fn test_last_write_wins_without_leakage() {
        let manager = PluginStorageManager::new();
        manager.set_plugin_store("B", "keep", json!("untouched"));

        manager.set_plugin_store("A", "x", json!(1));
        manager.set_plugin_store("A", "y", json!(2));
        manager.set_plugin_store("A", "x", json!(3));

        let a = manager.get_plugin_store("A");
        assert_eq!(a["x"], 3);
        assert_eq!(a["y"], 2);

        let b = manager.get_plugin_store("B");
        assert_eq!(b.len(), 1);
        assert_eq!(b["keep"], "untouched");
    }

    #[test]
    fn test_every_write_replaces_whole_map() {
        let manager = PluginStorageManager::new();
        let versions = Arc::new(Mutex::new(Vec::new()));

        let v = Arc::clone(&versions);
        manager.subscribe(move |map| v.lock().push(map.len()));

        manager.set_plugin_store("A", "x", json!(1));
        manager.set_plugin_store("B", "y", json!(2));

        assert_eq!(*versions.lock(), vec![1, 2]);
    }

    #[test]
    fn test_document_loaded_replaces_state() {
        let bus = LifecycleEventBus::new();
        let manager = PluginStorageManager::new();
        manager.attach(&bus);

        manager.set_plugin_store("Other", "stale", json!(true));

        let report = bus.emit(LifecycleEvent::document_loaded(
            json!({ "pluginStorage": { "A": { "x": 1 } } }),
        ));
        assert!(report.is_ok());

        assert_eq!(*manager.get_plugin_store("A"), *json!({ "x": 1 }).as_object().unwrap());
        assert!(manager.get_plugin_store("Other").is_empty());
    }

    #[test]
    fn test_document_without_plugin_storage_keeps_state() {
        let bus = LifecycleEventBus::new();
        let manager = PluginStorageManager::new();
        manager.attach(&bus);
        manager.set_plugin_store("A", "x", json!(1));

        bus.emit(LifecycleEvent::document_loaded(json!({ "title": "x" })));
        bus.emit(LifecycleEvent::document_loaded(Value::Null));

        assert_eq!(manager.get_plugin_store("A")["x"], 1);
    }

    #[test]
    fn test_invalid_header_is_reported() {
        let bus = LifecycleEventBus::new();
        let manager = PluginStorageManager::new();
        manager.attach(&bus);

        let report = bus.emit(LifecycleEvent::document_loaded(
            json!({ "pluginStorage": "nope" }),
        ));
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_new_document_resets_everything() {
        let bus = LifecycleEventBus::new();
        let manager = PluginStorageManager::new();
        manager.attach(&bus);

        manager.set_plugin_store("A", "x", json!(1));
        manager.set_plugin_store("B", "y", json!(2));

        bus.emit(LifecycleEvent::new_document_started());

        assert!(manager.snapshot().is_empty());
        assert!(manager.get_plugin_store("A").is_empty());
        assert!(manager.get_plugin_store("NeverTouched").is_empty());
    }

    #[test]
    fn test_write_to_header() {
        let manager = PluginStorageManager::new();

        let mut header = DocumentHeader::new();
        manager.write_to_header(&mut header);
        assert!(!header.has_plugin_storage());

        manager.set_plugin_store("Runner", "lastRun", json!("start"));
        manager.write_to_header(&mut header);

        let saved = header.plugin_storage().unwrap().unwrap();
        assert_eq!(saved.get("Runner").unwrap()["lastRun"], "start");

        let restored = PluginStorageManager::new();
        assert!(restored.hydrate_from_header(&header).unwrap());
        assert_eq!(restored.snapshot(), manager.snapshot());
    }

    #[test]
    fn test_scoped_storage() {
        let manager = Arc::new(PluginStorageManager::new());
        let runner = manager.scoped("Runner");
        let vars = manager.scoped("VarStore");

        runner.set("speed", json!(2));
        vars.set("speed", json!(9));

        assert_eq!(runner.get_key("speed"), Some(json!(2)));
        assert_eq!(vars.get_key("speed"), Some(json!(9)));
        assert_eq!(runner.get_key("missing"), None);
        assert_eq!(runner.plugin_name(), "Runner");
    }
}
