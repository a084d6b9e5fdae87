//! # loom-foundation
//!
//! Foundation layer for Loom:
//! - Error: 중앙 에러 타입
//! - Reactive: 관찰 가능한 값 셀 (설정 값, 플러그인 저장소 맵)
//! - Event: 라이프사이클 이벤트 버스
//! - Storage: JsonStore (범용), SettingsStorage (설정 영속화)
//! - Config: 호스트 설정 (HostConfig)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  PluginHost (loom-core)                                  │
//! │     │                    │                    │         │
//! │     ▼                    ▼                    ▼         │
//! │  LifecycleEventBus   ReactiveCell      SettingsStorage  │
//! │  (emit / subscribe)  (get/set/update)  (memory / json)  │
//! │                                               │         │
//! │                                          JsonStore      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod reactive;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{HostConfig, HOST_CONFIG_FILE};

// ============================================================================
// Event (라이프사이클 이벤트)
// ============================================================================
pub use event::{
    DispatchReport, EventBusConfig, EventId, EventListener, LifecycleEvent, LifecycleEventBus,
    LifecycleEventKind, ListenerId,
};

// ============================================================================
// Reactive
// ============================================================================
pub use reactive::{CellListener, ReactiveCell, SubscriptionId};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{
    JsonSettingsStorage, JsonStore, MemorySettingsStorage, SettingsStorage, SETTINGS_FILE,
};
