//! Settings Storage - 설정 값의 영속 저장소
//!
//! 문자열 키 → 문자열 값. 설정 셀의 초기값을 읽고, 값이 바뀔 때마다
//! 다시 기록하는 데 사용합니다.

use super::json::JsonStore;
use crate::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

/// 설정 파일명 기본값
pub const SETTINGS_FILE: &str = "settings.json";

/// 영속 설정 저장소 trait
pub trait SettingsStorage: Send + Sync {
    /// 값 조회
    fn get_item(&self, key: &str) -> Option<String>;

    /// 값 저장
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// 값 삭제
    fn remove_item(&self, key: &str) -> Result<()>;
}

// ============================================================================
// MemorySettingsStorage
// ============================================================================

/// 메모리 저장소 (테스트, 임시 세션용)
#[derive(Debug, Default)]
pub struct MemorySettingsStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemorySettingsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 값과 함께 생성
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: RwLock::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl SettingsStorage for MemorySettingsStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

// ============================================================================
// JsonSettingsStorage
// ============================================================================

/// JSON 파일 저장소
///
/// 열 때 전체 파일을 읽고, 쓸 때마다 전체 파일을 다시 기록합니다.
#[derive(Debug)]
pub struct JsonSettingsStorage {
    store: JsonStore,
    filename: String,
    items: RwLock<BTreeMap<String, String>>,
}

impl JsonSettingsStorage {
    /// 저장소 열기 (파일이 없으면 빈 상태)
    pub fn open(store: JsonStore, filename: impl Into<String>) -> Result<Self> {
        let filename = filename.into();
        let items: BTreeMap<String, String> =
            store.load_optional(&filename)?.unwrap_or_default();

        debug!(
            path = %store.file_path(&filename).display(),
            count = items.len(),
            "Opened settings storage"
        );

        Ok(Self {
            store,
            filename,
            items: RwLock::new(items),
        })
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<()> {
        self.store.save(&self.filename, items)
    }
}

impl SettingsStorage for JsonSettingsStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write();
        items.insert(key.to_string(), value.to_string());
        self.flush(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write();
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }
}
