//! Event System - 라이프사이클 이벤트 발행/구독
//!
//! 호스트가 방송하는 문서/에디터 상태 전환을 플러그인과 호스트 내부
//! 컴포넌트에 전달합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    LifecycleEventBus                         │
//! │  emit(event) ─────────────────────────────────────────┐     │
//! │         │ (동기, 등록 순서)                              │     │
//! │         ▼                                              │     │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │     │
//! │  │ StorageMgr   │  │ Settings     │  │ Plugin hooks │  │     │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  │     │
//! │                                      broadcast ◄───────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bus;
pub mod types;

pub use bus::{DispatchReport, EventBusConfig, EventListener, LifecycleEventBus, ListenerId};
pub use types::{EventId, LifecycleEvent, LifecycleEventKind};
