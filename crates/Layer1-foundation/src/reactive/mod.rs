//! Reactive - 관찰 가능한 값 셀
//!
//! 설정 값과 플러그인 저장소 맵을 담는 `ReactiveCell` 을 제공합니다.
//!
//! ## 사용법
//!
//! ```ignore
//! use loom_foundation::reactive::ReactiveCell;
//!
//! let cell = ReactiveCell::new(1);
//! let id = cell.subscribe(|v| println!("changed: {}", v));
//!
//! cell.set(2);
//! cell.update(|v| v + 1);
//! assert_eq!(cell.get(), 3);
//!
//! cell.unsubscribe(id);
//! ```

mod cell;

pub use cell::{CellListener, ReactiveCell, SubscriptionId};
