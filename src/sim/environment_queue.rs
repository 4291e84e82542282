//! 组件队列

use super::environment::Environment;
use crate::component::{ComponentId, QueueId};
use crate::error::{SimError, SimResult};
use crate::queue::{ComponentQueue, QueueOrder, QueueStats};

impl Environment {
    pub fn new_queue(&mut self, name: Option<&str>, order: QueueOrder) -> QueueId {
        let name = match name {
            Some(n) => n.to_string(),
            None => self.context_mut().next_name("ComponentQueue"),
        };
        let now = self.now();
        self.queues.push(ComponentQueue::new(name, order, now));
        QueueId(self.queues.len() - 1)
    }

    pub fn queue(&self, q: QueueId) -> SimResult<&ComponentQueue> {
        self.queues.get(q.0).ok_or(SimError::UnknownEntity {
            kind: "queue",
            index: q.0,
        })
    }

    fn queue_mut(&mut self, q: QueueId) -> SimResult<&mut ComponentQueue> {
        self.queues.get_mut(q.0).ok_or(SimError::UnknownEntity {
            kind: "queue",
            index: q.0,
        })
    }

    /// 按队列顺序加入 `c`（使用组件自身的优先级）；重复加入报错
    pub fn enter(&mut self, q: QueueId, c: ComponentId) -> SimResult<()> {
        let priority = self.component(c)?.priority();
        let now = self.now();
        if !self.queue_mut(q)?.enter(c, priority, now) {
            return Err(self.illegal(c, format!("already in queue '{}'", self.queues[q.0].name())));
        }
        Ok(())
    }

    pub fn enter_at_head(&mut self, q: QueueId, c: ComponentId) -> SimResult<()> {
        let priority = self.component(c)?.priority();
        let now = self.now();
        if !self.queue_mut(q)?.enter_at_head(c, priority, now) {
            return Err(self.illegal(c, format!("already in queue '{}'", self.queues[q.0].name())));
        }
        Ok(())
    }

    pub fn leave(&mut self, q: QueueId, c: ComponentId) -> SimResult<()> {
        self.component(c)?;
        let now = self.now();
        if !self.queue_mut(q)?.leave(c, now) {
            return Err(self.illegal(c, format!("not in queue '{}'", self.queues[q.0].name())));
        }
        Ok(())
    }

    /// 取出并返回 `q` 的队首
    pub fn pop(&mut self, q: QueueId) -> SimResult<Option<ComponentId>> {
        let now = self.now();
        Ok(self.queue_mut(q)?.pop(now))
    }

    pub fn queue_stats(&self, q: QueueId) -> SimResult<QueueStats> {
        Ok(self.queue(q)?.stats(self.now()))
    }

    /// 队列长度监视器开关；重复设置相同值不产生影响
    pub fn set_queue_length_monitor_enabled(&mut self, q: QueueId, enabled: bool) -> SimResult<()> {
        let now = self.now();
        self.queue_mut(q)?.set_queue_length_enabled(enabled, now);
        Ok(())
    }

    /// 停留时长监视器开关，例如排队者中途离开时不计入停留时长
    pub fn set_length_of_stay_monitor_enabled(&mut self, q: QueueId, enabled: bool) -> SimResult<()> {
        self.queue_mut(q)?.set_length_of_stay_enabled(enabled);
        Ok(())
    }

    /// 同时切换两个监视器
    pub fn set_queue_monitors_enabled(&mut self, q: QueueId, enabled: bool) -> SimResult<()> {
        self.set_queue_length_monitor_enabled(q, enabled)?;
        self.set_length_of_stay_monitor_enabled(q, enabled)
    }
}
