//! 标识符类型
//!
//! 指向环境所持 arena 的句柄。

use std::fmt;
use std::marker::PhantomData;

/// 组件句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

/// 资源句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub usize);

/// 组件队列句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(pub usize);

/// 带类型的 `State<T>` 句柄
pub struct StateId<T> {
    pub(crate) index: usize,
    _ty: PhantomData<fn() -> T>,
}

impl<T> StateId<T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _ty: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

// 手动实现：derive 会要求 `T: Clone` 等约束
impl<T> Clone for StateId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StateId<T> {}

impl<T> PartialEq for StateId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for StateId<T> {}

impl<T> fmt::Debug for StateId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({})", self.index)
    }
}
