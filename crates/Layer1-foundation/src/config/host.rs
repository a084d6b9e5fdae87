//! Host Config - 플러그인 호스트 설정
//!
//! 글로벌(~/.config/loom/host.json) + 프로젝트(.loom/host.json) 병합

use crate::event::EventBusConfig;
use crate::storage::{JsonStore, SETTINGS_FILE};
use crate::Result;
use serde::{Deserialize, Serialize};

/// 설정 파일명
pub const HOST_CONFIG_FILE: &str = "host.json";

// ============================================================================
// Host Config
// ============================================================================

/// 플러그인 호스트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 이벤트 히스토리 보관 개수
    #[serde(default = "default_history_size")]
    pub event_history_size: usize,

    /// 모든 이벤트 전달을 trace 로그로 남김
    #[serde(default)]
    pub debug_events: bool,

    /// 설정 항목이 컬럼을 지정하지 않았을 때 사용할 컬럼
    #[serde(default = "default_settings_column")]
    pub default_settings_column: String,

    /// 설정 값 영속 파일명
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            event_history_size: default_history_size(),
            debug_events: false,
            default_settings_column: default_settings_column(),
            settings_file: default_settings_file(),
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            config.merge_from(&global)?;
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            config.merge_from(&project)?;
        }

        Ok(config)
    }

    /// 특정 저장소의 설정을 덮어씀 (파일이 없으면 그대로)
    pub fn merge_from(&mut self, store: &JsonStore) -> Result<()> {
        if let Some(other) = store.load_optional::<HostConfig>(HOST_CONFIG_FILE)? {
            self.merge(other);
        }
        Ok(())
    }

    /// 저장
    pub fn save(&self, store: &JsonStore) -> Result<()> {
        store.save(HOST_CONFIG_FILE, self)
    }

    /// 다른 설정 병합 (기본값이 아닌 값만 덮어씀)
    pub fn merge(&mut self, other: HostConfig) {
        self.version = other.version;
        if other.event_history_size != default_history_size() {
            self.event_history_size = other.event_history_size;
        }
        self.debug_events = self.debug_events || other.debug_events;
        if other.default_settings_column != default_settings_column() {
            self.default_settings_column = other.default_settings_column;
        }
        if other.settings_file != default_settings_file() {
            self.settings_file = other.settings_file;
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn debug_events(mut self, enabled: bool) -> Self {
        self.debug_events = enabled;
        self
    }

    pub fn default_settings_column(mut self, column: impl Into<String>) -> Self {
        self.default_settings_column = column.into();
        self
    }

    pub fn event_history_size(mut self, size: usize) -> Self {
        self.event_history_size = size;
        self
    }

    /// 이벤트 버스 설정으로 변환
    pub fn event_bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            history_size: self.event_history_size,
            debug_mode: self.debug_events,
            ..Default::default()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_history_size() -> usize {
    100
}

fn default_settings_column() -> String {
    "A".to_string()
}

fn default_settings_file() -> String {
    SETTINGS_FILE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_config_default() {
        let config = HostConfig::new();
        assert_eq!(config.version, 1);
        assert_eq!(config.default_settings_column, "A");
        assert_eq!(config.settings_file, "settings.json");
        assert!(!config.debug_events);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: HostConfig =
            serde_json::from_str(r#"{ "debugEvents": true, "defaultSettingsColumn": "B" }"#)
                .unwrap();

        assert!(config.debug_events);
        assert_eq!(config.default_settings_column, "B");
        assert_eq!(config.event_history_size, 100);
    }

    #[test]
    fn test_config_merge() {
        let mut base = HostConfig::new().event_history_size(10);
        let overlay = HostConfig::new().default_settings_column("C");

        base.merge(overlay);

        assert_eq!(base.event_history_size, 10);
        assert_eq!(base.default_settings_column, "C");
    }

    #[test]
    fn test_merge_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::project(dir.path());
        HostConfig::new().debug_events(true).save(&store).unwrap();

        let mut config = HostConfig::new();
        config.merge_from(&store).unwrap();
        assert!(config.debug_events);
        assert!(config.event_bus_config().debug_mode);
    }
}
