//! UI - 호스트 요소 트리
//!
//! 플러그인이 버튼과 설정 컨트롤을 붙이는 대상입니다.
//! 실제 렌더링은 호스트 쪽 관심사이고, 여기서는 구조와 핸들러 전달만 다룹니다.

mod event;
mod tree;

pub use event::{UiEvent, UiEventKind, UiHandler};
pub use tree::{Element, UiTree};

/// 기본 툴바 컨테이너 id
pub const TOOLBAR: &str = "toolbar";
