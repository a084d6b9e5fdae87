//! PluginStorageMap - 플러그인 이름 → 키/값 저장소
//!
//! 두 단계 모두 copy-on-write 입니다. 항목 하나를 바꾸면 새 맵이 만들어지고,
//! 바뀌지 않은 플러그인 저장소는 `Arc` 로 공유됩니다.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// 한 플러그인의 키/값 저장소
pub type PluginStore = Map<String, Value>;

/// 플러그인별 저장소 맵 (키 순서 보존)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginStorageMap(IndexMap<String, Arc<PluginStore>>);

impl PluginStorageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 플러그인 저장소 조회
    pub fn get(&self, plugin: &str) -> Option<&Arc<PluginStore>> {
        self.0.get(plugin)
    }

    pub fn contains(&self, plugin: &str) -> bool {
        self.0.contains_key(plugin)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 플러그인 이름 목록 (삽입 순서)
    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<PluginStore>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON 값으로 변환 (키 순서 유지)
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(plugin, store)| (plugin.clone(), Value::Object(PluginStore::clone(store))))
                .collect(),
        )
    }

    /// 플러그인 저장소를 교체한 새 맵
    pub fn with_store(&self, plugin: &str, store: PluginStore) -> Self {
        let mut next = self.0.clone();
        next.insert(plugin.to_string(), Arc::new(store));
        Self(next)
    }

    /// 플러그인 저장소의 한 항목을 교체한 새 맵
    pub fn with_entry(&self, plugin: &str, key: &str, value: Value) -> Self {
        let mut store = self
            .0
            .get(plugin)
            .map(|s| PluginStore::clone(s))
            .unwrap_or_default();
        store.insert(key.to_string(), value);
        self.with_store(plugin, store)
    }
}

impl<K: Into<String>> FromIterator<(K, PluginStore)> for PluginStorageMap {
    fn from_iter<I: IntoIterator<Item = (K, PluginStore)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Arc::new(v)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(value: Value) -> PluginStore {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_with_entry_leaves_original_untouched() {
        let base: PluginStorageMap = [("A", store(json!({ "x": 1 })))].into_iter().collect();
        let next = base.with_entry("A", "x", json!(2));

        assert_eq!(base.get("A").unwrap()["x"], 1);
        assert_eq!(next.get("A").unwrap()["x"], 2);
    }

    #[test]
    fn test_other_stores_are_shared() {
        let base: PluginStorageMap = [
            ("A", store(json!({ "x": 1 }))),
            ("B", store(json!({ "y": 2 }))),
        ]
        .into_iter()
        .collect();

        let next = base.with_entry("A", "z", json!(true));

        assert!(Arc::ptr_eq(base.get("B").unwrap(), next.get("B").unwrap()));
        assert!(!Arc::ptr_eq(base.get("A").unwrap(), next.get("A").unwrap()));
    }

    #[test]
    fn test_insertion_order_kept() {
        let map = PluginStorageMap::new()
            .with_store("zeta", PluginStore::new())
            .with_store("alpha", PluginStore::new());

        assert_eq!(map.plugins().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }
}
