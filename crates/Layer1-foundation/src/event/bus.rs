//! Event Bus - 라이프사이클 이벤트 발행/구독
//!
//! 동기식 발행/구독 시스템입니다. 한 번의 발행 안에서 리스너는
//! 등록 순서대로 끝까지 실행됩니다.

use super::types::{EventId, LifecycleEvent, LifecycleEventKind};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

// ============================================================================
// EventListener Trait
// ============================================================================

/// 이벤트 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 이벤트 리스너 trait
///
/// 클로저 `Fn(&LifecycleEvent) -> Result<()>` 는 자동으로 구현됩니다.
pub trait EventListener: Send + Sync {
    /// 리스너 이름 (디버깅용)
    fn name(&self) -> &str {
        "anonymous"
    }

    /// 이벤트 처리
    fn on_event(&self, event: &LifecycleEvent) -> Result<()>;
}

impl<F> EventListener for F
where
    F: Fn(&LifecycleEvent) -> Result<()> + Send + Sync,
{
    fn on_event(&self, event: &LifecycleEvent) -> Result<()> {
        self(event)
    }
}

// ============================================================================
// DispatchReport
// ============================================================================

/// 한 번의 발행 결과
///
/// 리스너 하나가 실패해도 나머지 리스너는 계속 호출되며,
/// 실패는 여기 모입니다.
#[derive(Debug)]
pub struct DispatchReport {
    /// 발행된 이벤트 ID
    pub event_id: EventId,

    /// 이벤트 종류
    pub kind: LifecycleEventKind,

    /// 호출된 리스너 수
    pub delivered: usize,

    /// 실패한 리스너와 에러
    pub failures: Vec<(ListenerId, Error)>,
}

impl DispatchReport {
    /// 모든 리스너가 성공했는지
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// 실패가 있으면 `Error::Dispatch` 로 변환
    pub fn into_result(self) -> Result<usize> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(Error::dispatch(
                self.kind.as_str(),
                self.failures.into_iter().map(|(_, e)| e).collect(),
            ))
        }
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// 이벤트 버스 설정
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// 브로드캐스트 채널 용량
    pub channel_capacity: usize,

    /// 이벤트 히스토리 보관 개수
    pub history_size: usize,

    /// 디버그 모드 (모든 전달 로깅)
    pub debug_mode: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            history_size: 100,
            debug_mode: false,
        }
    }
}

/// 등록된 리스너 정보
struct RegisteredListener {
    id: ListenerId,
    kind: LifecycleEventKind,
    listener: Arc<dyn EventListener>,
}

/// 라이프사이클 이벤트 버스
///
/// 전역 인스턴스 없이 생성해서 필요한 컴포넌트에 주입합니다.
///
/// ## 사용법
///
/// ```ignore
/// use loom_foundation::event::{LifecycleEventBus, LifecycleEvent, LifecycleEventKind};
///
/// let bus = LifecycleEventBus::new();
///
/// let id = bus.subscribe(LifecycleEventKind::SettingsOpened, |event: &LifecycleEvent| -> Result<()> {
///     println!("opened at {}", event.timestamp);
///     Ok(())
/// });
///
/// let report = bus.emit(LifecycleEvent::settings_opened());
/// assert!(report.is_ok());
///
/// bus.unsubscribe(id);
/// ```
pub struct LifecycleEventBus {
    /// 설정
    config: EventBusConfig,

    /// 비동기 관찰자용 브로드캐스트 송신자
    sender: broadcast::Sender<LifecycleEvent>,

    /// 등록된 리스너 (등록 순서 유지)
    listeners: RwLock<Vec<RegisteredListener>>,

    /// 리스너 ID 카운터
    listener_counter: AtomicU64,

    /// 이벤트 히스토리
    history: RwLock<VecDeque<LifecycleEvent>>,

    /// 발행된 이벤트 수
    event_count: AtomicU64,
}

impl LifecycleEventBus {
    /// 기본 설정으로 이벤트 버스 생성
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// 커스텀 설정으로 이벤트 버스 생성
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));

        Self {
            config,
            sender,
            listeners: RwLock::new(Vec::new()),
            listener_counter: AtomicU64::new(0),
            history: RwLock::new(VecDeque::new()),
            event_count: AtomicU64::new(0),
        }
    }

    /// 리스너 등록
    pub fn subscribe(
        &self,
        kind: LifecycleEventKind,
        listener: impl EventListener + 'static,
    ) -> ListenerId {
        self.subscribe_arc(kind, Arc::new(listener))
    }

    /// 공유 리스너 등록
    pub fn subscribe_arc(
        &self,
        kind: LifecycleEventKind,
        listener: Arc<dyn EventListener>,
    ) -> ListenerId {
        let id = ListenerId::new(self.listener_counter.fetch_add(1, Ordering::SeqCst));

        debug!(
            listener_name = listener.name(),
            listener_id = %id,
            event = %kind,
            "Registering lifecycle listener"
        );

        self.listeners
            .write()
            .push(RegisteredListener { id, kind, listener });

        id
    }

    /// 리스너 해제
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = listeners.len() != before;

        if removed {
            debug!(listener_id = %id, "Unregistered lifecycle listener");
        }

        removed
    }

    // ========================================================================
    // 종류별 구독 헬퍼
    // ========================================================================

    pub fn on_document_loaded(&self, listener: impl EventListener + 'static) -> ListenerId {
        self.subscribe(LifecycleEventKind::DocumentLoaded, listener)
    }

    pub fn on_new_document_started(&self, listener: impl EventListener + 'static) -> ListenerId {
        self.subscribe(LifecycleEventKind::NewDocumentStarted, listener)
    }

    pub fn on_editor_opened(&self, listener: impl EventListener + 'static) -> ListenerId {
        self.subscribe(LifecycleEventKind::EditorOpened, listener)
    }

    pub fn on_saved_node(&self, listener: impl EventListener + 'static) -> ListenerId {
        self.subscribe(LifecycleEventKind::SavedNode, listener)
    }

    pub fn on_in_preview_mode(&self, listener: impl EventListener + 'static) -> ListenerId {
        self.subscribe(LifecycleEventKind::InPreviewMode, listener)
    }

    pub fn on_application_ready(&self, listener: impl EventListener + 'static) -> ListenerId {
        self.subscribe(LifecycleEventKind::ApplicationReady, listener)
    }

    pub fn on_settings_opened(&self, listener: impl EventListener + 'static) -> ListenerId {
        self.subscribe(LifecycleEventKind::SettingsOpened, listener)
    }

    // ========================================================================
    // 발행
    // ========================================================================

    /// 이벤트 발행
    ///
    /// 발행 시점의 리스너 목록을 복사한 뒤 잠금 없이 호출합니다.
    /// 발행 도중 새로 등록된 리스너는 이번 발행에서 호출되지 않습니다.
    pub fn emit(&self, event: LifecycleEvent) -> DispatchReport {
        let event_count = self.event_count.fetch_add(1, Ordering::SeqCst);

        if self.config.debug_mode {
            trace!(
                event_id = %event.id,
                event = %event.kind,
                "Emitting event #{}", event_count + 1
            );
        }

        {
            let mut history = self.history.write();
            history.push_back(event.clone());
            while history.len() > self.config.history_size {
                history.pop_front();
            }
        }

        // 구독자가 없어도 OK
        let _ = self.sender.send(event.clone());

        let targets: Vec<(ListenerId, Arc<dyn EventListener>)> = self
            .listeners
            .read()
            .iter()
            .filter(|l| l.kind == event.kind)
            .map(|l| (l.id, Arc::clone(&l.listener)))
            .collect();

        let mut report = DispatchReport {
            event_id: event.id.clone(),
            kind: event.kind,
            delivered: 0,
            failures: Vec::new(),
        };

        for (id, listener) in targets {
            if self.config.debug_mode {
                trace!(
                    listener_id = %id,
                    listener_name = listener.name(),
                    event = %event.kind,
                    "Delivering event to listener"
                );
            }

            report.delivered += 1;
            if let Err(e) = listener.on_event(&event) {
                warn!(
                    listener_id = %id,
                    listener_name = listener.name(),
                    event = %event.kind,
                    "Listener failed: {}", e
                );
                report.failures.push((id, e));
            }
        }

        report
    }

    /// 브로드캐스트 수신자 생성 (스트림 방식)
    pub fn receiver(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// 최근 이벤트 히스토리 조회 (최신순)
    pub fn history(&self, limit: Option<usize>) -> Vec<LifecycleEvent> {
        let history = self.history.read();
        let limit = limit.unwrap_or(history.len());
        history.iter().rev().take(limit).cloned().collect()
    }

    /// 종류별 히스토리
    pub fn history_by_kind(&self, kind: LifecycleEventKind) -> Vec<LifecycleEvent> {
        self.history
            .read()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// 등록된 리스너 수
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// 특정 종류의 리스너 수
    pub fn listener_count_for(&self, kind: LifecycleEventKind) -> usize {
        self.listeners.read().iter().filter(|l| l.kind == kind).count()
    }

    /// 총 발행된 이벤트 수
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::SeqCst)
    }

    /// 히스토리 클리어
    pub fn clear_history(&self) {
        self.history.write().clear();
    }
}

impl Default for LifecycleEventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> impl EventListener + 'static {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        move |event: &LifecycleEvent| -> Result<()> {
            log.lock().push(format!("{}:{}", tag, event.kind));
            Ok(())
        }
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let bus = LifecycleEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on_settings_opened(recorder(&log, "first"));
        bus.on_document_loaded(recorder(&log, "other"));
        bus.on_settings_opened(recorder(&log, "second"));

        let report = bus.emit(LifecycleEvent::settings_opened());

        assert_eq!(report.delivered, 2);
        assert_eq!(
            *log.lock(),
            vec!["first:settingsOpened", "second:settingsOpened"]
        );
    }

    #[test]
    fn test_failure_does_not_stop_dispatch() {
        let bus = LifecycleEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on_settings_opened(|_: &LifecycleEvent| -> Result<()> {
            Err(Error::MissingElement("settingsColumnA".into()))
        });
        bus.on_settings_opened(recorder(&log, "after"));

        let report = bus.emit(LifecycleEvent::settings_opened());

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(log.lock().len(), 1);

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, Error::Dispatch { .. }));
    }

    #[test]
    fn test_unsubscribe() {
        let bus = LifecycleEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let id = bus.on_saved_node(recorder(&log, "a"));
        assert_eq!(bus.listener_count(), 1);

        bus.emit(LifecycleEvent::saved_node(serde_json::Value::Null));
        assert!(bus.unsubscribe(id));
        bus.emit(LifecycleEvent::saved_node(serde_json::Value::Null));

        assert_eq!(log.lock().len(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_preview_and_saved_node_are_distinct() {
        let bus = LifecycleEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on_in_preview_mode(recorder(&log, "preview"));
        bus.on_saved_node(recorder(&log, "saved"));

        bus.emit(LifecycleEvent::in_preview_mode(serde_json::Value::Null));

        assert_eq!(*log.lock(), vec!["preview:inPreviewMode"]);
    }

    #[test]
    fn test_listener_added_during_dispatch_waits_for_next() {
        let bus = Arc::new(LifecycleEventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = Arc::clone(&bus);
        let inner_log = Arc::clone(&log);
        bus.on_editor_opened(move |_: &LifecycleEvent| -> Result<()> {
            inner_bus.on_editor_opened(recorder(&inner_log, "late"));
            Ok(())
        });

        let first = bus.emit(LifecycleEvent::editor_opened(serde_json::Value::Null));
        assert_eq!(first.delivered, 1);
        assert!(log.lock().is_empty());

        bus.emit(LifecycleEvent::editor_opened(serde_json::Value::Null));
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_event_history() {
        let config = EventBusConfig {
            history_size: 3,
            ..Default::default()
        };
        let bus = LifecycleEventBus::with_config(config);

        for _ in 0..5 {
            bus.emit(LifecycleEvent::new_document_started());
        }
        bus.emit(LifecycleEvent::application_ready());

        assert_eq!(bus.event_count(), 6);
        let history = bus.history(None);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].kind, LifecycleEventKind::ApplicationReady);
        assert_eq!(bus.history_by_kind(LifecycleEventKind::NewDocumentStarted).len(), 2);
    }

    #[tokio::test]
    async fn test_receiver_observes_events() {
        let bus = LifecycleEventBus::new();
        let mut receiver = bus.receiver();

        bus.emit(LifecycleEvent::application_ready());

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.kind, LifecycleEventKind::ApplicationReady);
    }
}
