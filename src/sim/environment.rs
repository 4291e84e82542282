//! 仿真环境
//!
//! 持有时钟、唤醒队列、各类实体的 arena 以及事件总线。
//! 任一时刻至多一个组件处于 current；运行中的进程对其他组件的操作
//! 都经由调度队列生效，不会重入其他组件。

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use super::config::EnvironmentConfig;
use super::context::SimContext;
use super::event::Event;
use super::listener::{EventListener, ListenerId, ListenerPolicy};
use super::scheduled_event::ScheduledEvent;
use super::time::TickTime;
use crate::component::{Component, ComponentId, ComponentState};
use crate::error::{SimError, SimResult};
use crate::queue::ComponentQueue;
use crate::resource::Resource;
use crate::state::AnyState;

pub struct Environment {
    now: TickTime,
    next_seq: u64,
    q: BTreeSet<ScheduledEvent>,
    current: Option<ComponentId>,
    pub(crate) components: Vec<Component>,
    pub(crate) resources: Vec<Resource>,
    pub(crate) states: Vec<Box<dyn AnyState>>,
    pub(crate) queues: Vec<ComponentQueue>,
    pub(crate) standby: Vec<ComponentId>,
    pub(crate) claim_seq: u64,
    listeners: Vec<(ListenerId, Box<dyn EventListener>)>,
    next_listener: usize,
    context: SimContext,
    config: EnvironmentConfig,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(EnvironmentConfig::default())
    }
}

impl Environment {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            now: TickTime::ZERO,
            next_seq: 0,
            q: BTreeSet::new(),
            current: None,
            components: Vec::new(),
            resources: Vec::new(),
            states: Vec::new(),
            queues: Vec::new(),
            standby: Vec::new(),
            claim_seq: 0,
            listeners: Vec::new(),
            next_listener: 0,
            context: SimContext::default(),
            config,
        }
    }

    /// 获取当前仿真时间
    pub fn now(&self) -> TickTime {
        self.now
    }

    /// 正在执行进程的组件
    pub fn current(&self) -> Option<ComponentId> {
        self.current
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn context(&self) -> &SimContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.context
    }

    /// 待处理的唤醒条目数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 最早唤醒条目的时间
    pub fn peek_next(&self) -> Option<TickTime> {
        self.q.first().map(|e| e.at)
    }

    /// 按配置的 tick 单位换算墙钟时长
    pub fn to_ticks(&self, d: Duration) -> SimResult<f64> {
        self.config
            .tick_unit
            .map(|u| u.to_ticks(d))
            .ok_or_else(|| SimError::Config("no tick unit configured".to_string()))
    }

    pub fn to_duration(&self, ticks: f64) -> SimResult<Duration> {
        let unit = self
            .config
            .tick_unit
            .ok_or_else(|| SimError::Config("no tick unit configured".to_string()))?;
        unit.to_duration(ticks).ok_or_else(|| SimError::InvalidDuration {
            entity: "clock".to_string(),
            duration: ticks,
            time: self.now,
        })
    }

    // ---- 调度 ---------------------------------------------------------

    /// 为 `c` 安排唤醒条目，替换已有条目
    #[tracing::instrument(skip(self), fields(now = %self.now))]
    pub(crate) fn schedule(&mut self, c: ComponentId, at: TickTime, priority: i32) {
        self.cancel_wake(c);
        let entry = ScheduledEvent {
            at,
            priority,
            seq: self.next_seq,
            component: c,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.insert(entry);
        self.components[c.0].wake = Some(entry);
        trace!(queue_size = self.q.len(), "唤醒条目已加入队列");
    }

    pub(crate) fn cancel_wake(&mut self, c: ComponentId) {
        if let Some(entry) = self.components[c.0].wake.take() {
            self.q.remove(&entry);
        }
    }

    /// 检查 `at` 不早于当前时间
    pub(crate) fn future_time(&self, c: ComponentId, at: TickTime) -> SimResult<TickTime> {
        if at.value().is_nan() || at < self.now {
            return Err(SimError::InvalidDuration {
                entity: self.components[c.0].name.clone(),
                duration: at - self.now,
                time: self.now,
            });
        }
        Ok(at)
    }

    pub(crate) fn set_status(&mut self, c: ComponentId, status: ComponentState) {
        let now = self.now;
        let comp = &mut self.components[c.0];
        if comp.status != status {
            debug!(component = %comp.name, from = ?comp.status, to = ?status, now = %now, "状态变化");
        }
        comp.status = status;
        comp.status_timeline.record(now, status);
    }

    // ---- 主循环 -------------------------------------------------------------

    /// 运行直到唤醒队列为空
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> SimResult<()> {
        info!(now = %self.now, queue_size = self.q.len(), "▶️  开始运行仿真");
        let mut event_count = 0_u64;
        while self.step()? {
            event_count += 1;
        }
        info!(total_events = event_count, final_time = %self.now, "✅ 仿真完成");
        Ok(())
    }

    /// 执行所有早于 `until` 的唤醒条目，然后把时钟推进到 `until`。
    /// 恰好位于 `until` 的条目留给下一次调用。
    #[tracing::instrument(skip(self))]
    pub fn run_until(&mut self, until: TickTime) -> SimResult<()> {
        debug!(now = %self.now, queue_size = self.q.len(), "初始状态");
        while let Some(top) = self.q.first() {
            if top.at >= until {
                break;
            }
            self.step()?;
        }
        self.now = self.now.max(until);
        Ok(())
    }

    /// 等价于 `run_until(now + duration)`
    pub fn run_for(&mut self, duration: f64) -> SimResult<()> {
        if duration.is_nan() || duration < 0.0 {
            return Err(SimError::InvalidDuration {
                entity: "environment".to_string(),
                duration,
                time: self.now,
            });
        }
        self.run_until(self.now + duration)
    }

    /// 恢复最早的组件；队列为空时返回 `false`
    pub fn step(&mut self) -> SimResult<bool> {
        let Some(entry) = self.q.pop_first() else {
            return Ok(false);
        };
        self.now = entry.at;
        let c = entry.component;
        self.components[c.0].wake = None;

        // standby 组件在其后的下一个事件处理完后恢复
        let standby = std::mem::take(&mut self.standby);

        trace!(
            now = %self.now,
            seq = entry.seq,
            component = %self.components[c.0].name,
            remaining_queue = self.q.len(),
            "执行事件"
        );
        if let Err(e) = self.dispatch(c) {
            // 出错时放回 standby 列表，保证之后还能继续 step
            let added = std::mem::replace(&mut self.standby, standby);
            self.standby.extend(added);
            return Err(e);
        }

        for s in standby {
            if self.components[s.0].status == ComponentState::Standby {
                let priority = self.components[s.0].priority;
                self.schedule(s, self.now, priority);
                self.set_status(s, ComponentState::Scheduled);
            }
        }
        Ok(true)
    }

    /// 让 `c` 成为 current，并执行其进程直到下一次挂起
    fn dispatch(&mut self, c: ComponentId) -> SimResult<()> {
        match self.components[c.0].status {
            // 请求或等待先到达了失败时间
            ComponentState::Requesting => {
                self.withdraw_requests(c);
                self.components[c.0].failed = true;
                self.log_event(Some(c), "request failed", None)?;
            }
            ComponentState::Waiting => {
                self.withdraw_wait(c);
                self.components[c.0].failed = true;
                self.log_event(Some(c), "wait failed", None)?;
            }
            _ => {}
        }

        let Some(mut process) = self.components[c.0].process.take() else {
            return Err(self.illegal(c, "scheduled component has no process"));
        };
        self.set_status(c, ComponentState::Current);
        self.current = Some(c);

        let result = process.step(self, c);

        self.current = None;
        self.components[c.0].process = Some(process);
        let suspend = result?;
        trace!(component = %self.components[c.0].name, suspend = suspend.label(), "进程挂起");
        self.apply(c, suspend)
    }

    // ---- 事件总线 ------------------------------------------------------------

    pub fn add_listener(&mut self, listener: impl EventListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn EventListener>> {
        let pos = self.listeners.iter().position(|(l, _)| *l == id)?;
        Some(self.listeners.remove(pos).1)
    }

    /// 按注册顺序把 `event` 分发给所有监听器
    pub fn publish_event(&mut self, event: Event) -> SimResult<()> {
        let policy = self.config.listener_policy;
        for (_, listener) in self.listeners.iter_mut() {
            if let Err(source) = listener.consume(&event) {
                match policy {
                    ListenerPolicy::Abort => {
                        return Err(SimError::SimulationAbort {
                            listener: listener.name().to_string(),
                            time: event.time,
                            source,
                        });
                    }
                    ListenerPolicy::Isolate => {
                        warn!(listener = listener.name(), error = %source, "监听器出错，继续运行");
                    }
                }
            }
        }
        Ok(())
    }

    /// 发布以 `source` 为主体的用户事件
    pub fn log_event(
        &mut self,
        source: Option<ComponentId>,
        action: impl Into<String>,
        details: Option<String>,
    ) -> SimResult<()> {
        let source = source.map(|c| self.components[c.0].name.clone());
        let event = Event::interaction(self.now, self.current_name(), source, action, details);
        self.publish_event(event)
    }

    /// 发布内核状态迁移事件（关闭核心追踪时跳过）
    pub(crate) fn trace_interaction(
        &mut self,
        source: impl FnOnce(&Self) -> String,
        action: impl FnOnce() -> String,
        details: Option<String>,
    ) -> SimResult<()> {
        if !self.config.trace_core_interactions || self.listeners.is_empty() {
            return Ok(());
        }
        let source = source(self);
        let event = Event::interaction(self.now, self.current_name(), Some(source), action(), details);
        self.publish_event(event)
    }

    pub(crate) fn current_name(&self) -> Option<String> {
        self.current.map(|c| self.components[c.0].name.clone())
    }

    pub(crate) fn illegal(&self, c: ComponentId, reason: impl Into<String>) -> SimError {
        SimError::IllegalStateTransition {
            entity: self.components[c.0].name.clone(),
            reason: reason.into(),
            time: self.now,
        }
    }
}
