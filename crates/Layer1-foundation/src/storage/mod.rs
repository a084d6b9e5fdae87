//! Storage module for Loom
//!
//! - `json`: JSON - 범용 파일 저장/로드
//! - `settings`: 설정 값 영속 저장소 (메모리 / JSON 파일)

mod json;
mod settings;

// JSON Storage (범용)
pub use json::JsonStore;

// Settings Storage
pub use settings::{JsonSettingsStorage, MemorySettingsStorage, SettingsStorage, SETTINGS_FILE};
