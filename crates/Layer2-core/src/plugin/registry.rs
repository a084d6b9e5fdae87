//! Plugin Registry - 호스트에 공개된 플러그인 목록
//!
//! 추가만 가능합니다. 제거 경로는 없습니다.

use super::traits::{Command, Plugin};
use crate::ui::UiEvent;
use loom_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 플러그인 정보
struct PluginInfo {
    /// 플러그인 인스턴스
    plugin: Arc<dyn Plugin>,

    /// 등록 순서
    load_order: usize,
}

/// 플러그인 레지스트리
pub struct PluginRegistry {
    /// 플러그인 저장소 (이름 -> PluginInfo)
    plugins: RwLock<HashMap<String, PluginInfo>>,
}

impl PluginRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
        }
    }

    /// 플러그인 등록
    ///
    /// 이미 같은 이름이 있으면 `Error::DuplicatePlugin`, 기존 항목은 유지됩니다.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();
        let mut plugins = self.plugins.write();

        if plugins.contains_key(&name) {
            warn!("Plugin {} is already registered", name);
            return Err(Error::DuplicatePlugin(name));
        }

        let load_order = plugins.len() + 1;
        plugins.insert(name.clone(), PluginInfo { plugin, load_order });

        info!("Registered plugin: {} (#{})", name, load_order);
        Ok(())
    }

    /// 플러그인 조회
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins
            .read()
            .get(name)
            .map(|info| Arc::clone(&info.plugin))
    }

    /// 플러그인 존재 여부 확인
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.read().contains_key(name)
    }

    /// 등록 순서대로 플러그인 이름
    pub fn names(&self) -> Vec<String> {
        let plugins = self.plugins.read();
        let mut ordered: Vec<_> = plugins.iter().collect();
        ordered.sort_by_key(|(_, info)| info.load_order);
        ordered.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// 등록 순서대로 플러그인 인스턴스
    pub fn list(&self) -> Vec<Arc<dyn Plugin>> {
        let plugins = self.plugins.read();
        let mut ordered: Vec<_> = plugins.values().collect();
        ordered.sort_by_key(|info| info.load_order);
        ordered
            .into_iter()
            .map(|info| Arc::clone(&info.plugin))
            .collect()
    }

    /// 플러그인 수
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// 명령 실행
    ///
    /// 플러그인은 이벤트 시점에 조회합니다. 아직 등록되지 않았으면
    /// `Error::PluginNotReady`, 선언하지 않은 명령이면 `Error::UnknownCommand`.
    pub fn invoke(&self, plugin_name: &str, command: Command, event: &UiEvent) -> Result<()> {
        let plugin = self
            .get(plugin_name)
            .ok_or_else(|| Error::PluginNotReady(plugin_name.to_string()))?;

        if !plugin.commands().contains(&command) {
            return Err(Error::unknown_command(plugin_name, command.name()));
        }

        debug!(plugin = plugin_name, command = %command, "Invoking plugin command");
        plugin.invoke(command, event)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
