//! 调度条目
//!
//! 定义环境调度队列中的唤醒条目及其排序。

use std::cmp::{Ordering, Reverse};

use super::time::TickTime;
use crate::component::ComponentId;

/// 某个组件的一次待处理唤醒
#[derive(Debug, Clone, Copy)]
pub struct ScheduledEvent {
    pub(crate) at: TickTime,
    pub(crate) priority: i32,
    pub(crate) seq: u64,
    pub(crate) component: ComponentId,
}

impl ScheduledEvent {
    fn key(&self) -> (TickTime, Reverse<i32>, u64) {
        (self.at, Reverse(self.priority), self.seq)
    }
}

// 存放在 `BTreeSet` 中，自然顺序即执行顺序：
// 时间最早优先，其次优先级最高，再次插入序号最小。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}
