//! Plugin Host - 플러그인 라이프사이클 관리
//!
//! 호스트는 공유 상태(버스, 저장소, 설정, UI, 레지스트리)를 만들고
//! 플러그인을 한 번씩 생성합니다. 생성된 플러그인은 `applicationReady`
//! 이후에만 레지스트리에 공개됩니다.

use super::button::UiButtonFactory;
use super::capabilities::Capabilities;
use super::registry::PluginRegistry;
use super::settings::{SettingsColumn, SettingsRegistrar};
use super::storage::PluginStorageManager;
use super::traits::{Plugin, PluginConstructor};
use crate::document::DocumentHeader;
use crate::ui::{UiEvent, UiEventKind, UiTree};
use loom_foundation::{
    DispatchReport, Error, HostConfig, LifecycleEvent, LifecycleEventBus, Result,
    SettingsStorage,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// 플러그인 생성 결과
#[derive(Debug, Default)]
pub struct StartReport {
    /// 생성된 플러그인 이름 (생성 순서)
    pub constructed: Vec<String>,

    /// 생성 또는 즉시 등록에 실패한 에러
    pub failures: Vec<Error>,
}

impl StartReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 플러그인 호스트
pub struct PluginHost {
    config: HostConfig,
    ui: Arc<UiTree>,
    bus: Arc<LifecycleEventBus>,
    storage: Arc<PluginStorageManager>,
    settings: Arc<SettingsRegistrar>,
    registry: Arc<PluginRegistry>,
    capabilities: Capabilities,
    ready: AtomicBool,
}

impl PluginHost {
    /// 새 호스트 생성
    ///
    /// `default_settings_column` 이 A/B/C 가 아니면 `Error::Config`.
    pub fn new(
        config: HostConfig,
        ui: Arc<UiTree>,
        settings_storage: Arc<dyn SettingsStorage>,
    ) -> Result<Self> {
        let column: SettingsColumn = config.default_settings_column.parse().map_err(|_| {
            Error::Config(format!(
                "Invalid default settings column: {}",
                config.default_settings_column
            ))
        })?;

        let bus = Arc::new(LifecycleEventBus::with_config(config.event_bus_config()));
        let registry = Arc::new(PluginRegistry::new());

        let storage = Arc::new(PluginStorageManager::new());
        storage.attach(&bus);

        let settings = Arc::new(SettingsRegistrar::new(
            settings_storage,
            Arc::clone(&ui),
            column,
        ));
        settings.attach(&bus);

        let buttons = Arc::new(UiButtonFactory::new(Arc::clone(&ui), Arc::clone(&registry)));

        let capabilities = Capabilities::new(
            buttons,
            Arc::clone(&storage),
            Arc::clone(&settings),
            Arc::clone(&bus),
            Arc::clone(&registry),
        );

        debug!(column = column.letter(), "Plugin host created");

        Ok(Self {
            config,
            ui,
            bus,
            storage,
            settings,
            registry,
            capabilities,
            ready: AtomicBool::new(false),
        })
    }

    // ========================================================================
    // 플러그인 생성
    // ========================================================================

    /// 모든 플러그인 생성
    ///
    /// 생성자 하나가 실패해도 나머지는 계속 생성됩니다.
    pub fn start(&self, constructors: &[PluginConstructor]) -> StartReport {
        let mut report = StartReport::default();

        for (index, constructor) in constructors.iter().enumerate() {
            let plugin = match constructor(&self.capabilities) {
                Ok(plugin) => plugin,
                Err(e) => {
                    error!("Plugin constructor #{} failed: {}", index + 1, e);
                    report.failures.push(e);
                    continue;
                }
            };

            let name = plugin.name().to_string();
            debug!(plugin = %name, "Constructed plugin");

            if self.is_ready() {
                if let Err(e) = self.registry.register(plugin) {
                    error!(plugin = %name, "Failed to register plugin: {}", e);
                    report.failures.push(e);
                    continue;
                }
            } else {
                self.defer_registration(plugin);
            }

            report.constructed.push(name);
        }

        info!(
            constructed = report.constructed.len(),
            failed = report.failures.len(),
            "Plugins started"
        );
        report
    }

    fn defer_registration(&self, plugin: Arc<dyn Plugin>) {
        let registry = Arc::clone(&self.registry);
        self.bus
            .on_application_ready(move |_: &LifecycleEvent| -> Result<()> {
                registry.register(Arc::clone(&plugin))
            });
    }

    // ========================================================================
    // 라이프사이클 이벤트
    // ========================================================================

    /// 문서 로드 (`documentLoaded`)
    pub fn load_document(&self, header: &DocumentHeader) -> Result<DispatchReport> {
        let payload = header.to_payload()?;
        Ok(self.emit(LifecycleEvent::document_loaded(payload)))
    }

    /// 새 문서 (`newDocumentStarted`)
    pub fn new_document(&self) -> DispatchReport {
        self.emit(LifecycleEvent::new_document_started())
    }

    /// 설정 패널 열림 (`settingsOpened`)
    pub fn open_settings(&self) -> DispatchReport {
        self.emit(LifecycleEvent::settings_opened())
    }

    /// 애플리케이션 준비 완료 (`applicationReady`)
    ///
    /// 처음 호출만 이벤트를 발행하고, 이후 호출은 `None`.
    pub fn application_ready(&self) -> Option<DispatchReport> {
        if self.ready.swap(true, Ordering::SeqCst) {
            debug!("Application already ready, ignoring");
            return None;
        }

        let report = self.emit(LifecycleEvent::application_ready());
        info!(plugins = self.registry.len(), "Application ready");
        Some(report)
    }

    pub fn editor_opened(&self, state: Value) -> DispatchReport {
        self.emit(LifecycleEvent::editor_opened(state))
    }

    pub fn saved_node(&self, state: Value) -> DispatchReport {
        self.emit(LifecycleEvent::saved_node(state))
    }

    pub fn in_preview_mode(&self, state: Value) -> DispatchReport {
        self.emit(LifecycleEvent::in_preview_mode(state))
    }

    /// 이벤트 발행 (실패는 error 로그)
    pub fn emit(&self, event: LifecycleEvent) -> DispatchReport {
        let report = self.bus.emit(event.with_source("host"));
        for (listener_id, e) in &report.failures {
            error!(
                event = %report.kind,
                listener_id = %listener_id,
                "Lifecycle listener failed: {}", e
            );
        }
        report
    }

    // ========================================================================
    // 문서 / UI
    // ========================================================================

    /// 플러그인 저장소를 문서 헤더에 기록
    pub fn save_document(&self, header: &mut DocumentHeader) {
        self.storage.write_to_header(header);
    }

    /// UI 상호작용 전달
    ///
    /// 핸들러가 없으면 `Ok(false)`. 실패는 error 로그 후 그대로 반환.
    pub fn dispatch(
        &self,
        element_id: &str,
        kind: UiEventKind,
        value: Option<String>,
    ) -> Result<bool> {
        let mut event = UiEvent::new(kind, element_id);
        event.value = value;

        self.ui.dispatch(&event).map_err(|e| {
            error!(element = element_id, kind = %kind, "UI interaction failed: {}", e);
            e
        })
    }

    /// 클릭 전달
    pub fn click(&self, element_id: &str) -> Result<bool> {
        self.dispatch(element_id, UiEventKind::Click, None)
    }

    // ========================================================================
    // 조회
    // ========================================================================

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// 레지스트리에 공개된 플러그인
    pub fn plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.registry.get(name)
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<LifecycleEventBus> {
        &self.bus
    }

    pub fn storage(&self) -> &Arc<PluginStorageManager> {
        &self.storage
    }

    pub fn settings(&self) -> &Arc<SettingsRegistrar> {
        &self.settings
    }

    pub fn ui(&self) -> &Arc<UiTree> {
        &self.ui
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}
