//! Config - 호스트 설정 관리
//!
//! - `host.rs` - HostConfig 통합 설정

mod host;

pub use host::{HostConfig, HOST_CONFIG_FILE};
