//! 组件队列实现
//!
//! 有序的成员列表，附带队列长度与停留时长统计。

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::component::ComponentId;
use crate::monitor::{LevelMonitor, LevelStats, TallyMonitor, TallyStats};
use crate::sim::TickTime;

/// `ComponentQueue` 的成员排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrder {
    #[default]
    Fifo,
    /// 高优先级在前，同优先级 FIFO
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Member {
    component: ComponentId,
    priority: i32,
    entered: TickTime,
}

/// 导出的统计数据，结构与 `queue statistics` JSON 文档一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub queue_length: LevelStats,
    pub length_of_stay: TallyStats,
}

#[derive(Debug)]
pub struct ComponentQueue {
    name: String,
    order: QueueOrder,
    members: Vec<Member>,
    queue_length: LevelMonitor,
    length_of_stay: TallyMonitor,
}

impl ComponentQueue {
    pub fn new(name: impl Into<String>, order: QueueOrder, now: TickTime) -> Self {
        Self {
            name: name.into(),
            order,
            members: Vec::new(),
            queue_length: LevelMonitor::new(0.0, now),
            length_of_stay: TallyMonitor::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, c: ComponentId) -> bool {
        self.members.iter().any(|m| m.component == c)
    }

    pub fn members(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.members.iter().map(|m| m.component)
    }

    pub fn head(&self) -> Option<ComponentId> {
        self.members.first().map(|m| m.component)
    }

    /// 加入 `c`；已是成员时返回 `false`
    pub fn enter(&mut self, c: ComponentId, priority: i32, now: TickTime) -> bool {
        if self.contains(c) {
            return false;
        }
        let member = Member {
            component: c,
            priority,
            entered: now,
        };
        let pos = match self.order {
            QueueOrder::Fifo => self.members.len(),
            QueueOrder::Priority => self
                .members
                .iter()
                .position(|m| m.priority < priority)
                .unwrap_or(self.members.len()),
        };
        self.members.insert(pos, member);
        trace!(queue = %self.name, len = self.members.len(), "加入队列");
        self.queue_length.record(now, self.members.len() as f64);
        true
    }

    /// 把 `c` 放到队首，忽略配置的排序
    pub fn enter_at_head(&mut self, c: ComponentId, priority: i32, now: TickTime) -> bool {
        if self.contains(c) {
            return false;
        }
        self.members.insert(
            0,
            Member {
                component: c,
                priority,
                entered: now,
            },
        );
        self.queue_length.record(now, self.members.len() as f64);
        true
    }

    /// 移除 `c` 并记录停留时长；不在队列中时返回 `false`
    pub fn leave(&mut self, c: ComponentId, now: TickTime) -> bool {
        match self.members.iter().position(|m| m.component == c) {
            Some(pos) => {
                self.remove_at(pos, now);
                true
            }
            None => false,
        }
    }

    pub fn pop(&mut self, now: TickTime) -> Option<ComponentId> {
        if self.members.is_empty() {
            return None;
        }
        Some(self.remove_at(0, now))
    }

    fn remove_at(&mut self, pos: usize, now: TickTime) -> ComponentId {
        let m = self.members.remove(pos);
        self.length_of_stay.add(now - m.entered);
        self.queue_length.record(now, self.members.len() as f64);
        trace!(queue = %self.name, len = self.members.len(), "离开队列");
        m.component
    }

    pub fn queue_length_monitor(&self) -> &LevelMonitor {
        &self.queue_length
    }

    pub fn length_of_stay_monitor(&self) -> &TallyMonitor {
        &self.length_of_stay
    }

    pub fn set_queue_length_enabled(&mut self, enabled: bool, now: TickTime) {
        self.queue_length.set_enabled(now, enabled);
    }

    pub fn set_length_of_stay_enabled(&mut self, enabled: bool) {
        self.length_of_stay.set_enabled(enabled);
    }

    pub fn stats(&self, now: TickTime) -> QueueStats {
        QueueStats {
            name: self.name.clone(),
            ty: "queue statistics".to_string(),
            queue_length: self.queue_length.stats(now),
            length_of_stay: self.length_of_stay.stats(),
        }
    }
}
