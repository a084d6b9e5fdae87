//! ReactiveCell - 읽기/교체/구독을 지원하는 값 홀더

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// 셀 구독 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

/// 값 변경 리스너
pub type CellListener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct CellInner<T> {
    value: RwLock<T>,
    listeners: RwLock<Vec<(SubscriptionId, CellListener<T>)>>,
    counter: AtomicU64,
}

/// 반응형 셀
///
/// 복제본은 같은 값을 공유합니다. 쓰기는 항상 전체 값 교체이며,
/// 리스너는 잠금이 해제된 뒤 등록 순서대로 호출되므로
/// 리스너 안에서 다시 셀을 읽거나 써도 됩니다.
pub struct ReactiveCell<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> Clone for ReactiveCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ReactiveCell<T> {
    /// 새 셀 생성
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(CellInner {
                value: RwLock::new(value),
                listeners: RwLock::new(Vec::new()),
                counter: AtomicU64::new(0),
            }),
        }
    }

    /// 현재 값 (복제)
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// 복제 없이 현재 값 참조
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// 값 교체
    pub fn set(&self, value: T) {
        let snapshot = {
            let mut current = self.inner.value.write();
            *current = value;
            current.clone()
        };
        self.notify(&snapshot);
    }

    /// 원자적 갱신
    ///
    /// 현재 값으로부터 새 값을 계산해 하나의 쓰기 잠금 안에서 교체합니다.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> T {
        let snapshot = {
            let mut current = self.inner.value.write();
            let next = f(&current);
            *current = next;
            current.clone()
        };
        self.notify(&snapshot);
        snapshot
    }

    /// 값 변경 구독
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.counter.fetch_add(1, Ordering::SeqCst));
        self.inner.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// 구독 해제
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// 구독자 수
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    fn notify(&self, value: &T) {
        let listeners: Vec<_> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(id, l)| (*id, Arc::clone(l)))
            .collect();

        for (id, listener) in listeners {
            trace!(subscription = %id, "Notifying cell subscriber");
            listener(value);
        }
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for ReactiveCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + std::fmt::Debug + Send + Sync + 'static> std::fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveCell")
            .field("value", &*self.inner.value.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
