use std::collections::{BTreeMap, BTreeSet};

use super::id::{ComponentId, ResourceId};
use super::process::{Process, ResourceRequest};
use super::status::ComponentState;
use crate::monitor::CategoryTimeline;
use crate::sim::{ScheduledEvent, TickTime};

/// `Environment::spawn_with` 的构造选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentOptions {
    /// 缺省时自动命名为 `Component.N`
    pub name: Option<String>,
    pub priority: i32,
    /// 首次激活时间，默认为当前时刻
    pub at: Option<TickTime>,
    /// 以 PASSIVE 启动，不安排进程执行
    pub passive: bool,
}

impl ComponentOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn at(mut self, at: TickTime) -> Self {
        self.at = Some(at);
        self
    }

    pub fn passive(mut self) -> Self {
        self.passive = true;
        self
    }
}

/// `interrupt` 保存、`resume` 恢复的状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Interruption {
    pub(crate) prior: ComponentState,
    pub(crate) remaining: Option<f64>,
    pub(crate) priority: i32,
}

/// 组件的调度记录；终止后仍可查询
pub struct Component {
    pub(crate) name: String,
    pub(crate) priority: i32,
    pub(crate) status: ComponentState,
    pub(crate) process: Option<Box<dyn Process>>,
    pub(crate) wake: Option<ScheduledEvent>,
    pub(crate) requests: Vec<ResourceRequest>,
    pub(crate) one_of: bool,
    pub(crate) claims: BTreeMap<ResourceId, f64>,
    pub(crate) bumped: BTreeSet<ResourceId>,
    pub(crate) waiting_on: Option<usize>,
    pub(crate) failed: bool,
    pub(crate) interruption: Option<Interruption>,
    pub(crate) creation_time: TickTime,
    pub(crate) status_timeline: CategoryTimeline<ComponentState>,
}

impl Component {
    pub(crate) fn new(
        name: String,
        priority: i32,
        process: Option<Box<dyn Process>>,
        now: TickTime,
    ) -> Self {
        Self {
            name,
            priority,
            status: ComponentState::Data,
            process,
            wake: None,
            requests: Vec::new(),
            one_of: false,
            claims: BTreeMap::new(),
            bumped: BTreeSet::new(),
            waiting_on: None,
            failed: false,
            interruption: None,
            creation_time: now,
            status_timeline: CategoryTimeline::new(ComponentState::Data, now),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn status(&self) -> ComponentState {
        self.status
    }

    pub fn creation_time(&self) -> TickTime {
        self.creation_time
    }

    /// 待处理唤醒条目的时间
    pub fn scheduled_time(&self) -> Option<TickTime> {
        self.wake.map(|w| w.at)
    }

    pub fn claims(&self) -> &BTreeMap<ResourceId, f64> {
        &self.claims
    }

    pub fn requests(&self) -> &[ResourceRequest] {
        &self.requests
    }

    pub fn status_timeline(&self) -> &CategoryTimeline<ComponentState> {
        &self.status_timeline
    }

    pub fn is_data(&self) -> bool {
        self.status == ComponentState::Data
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == ComponentState::Scheduled
    }

    pub fn is_current(&self) -> bool {
        self.status == ComponentState::Current
    }

    pub fn is_passive(&self) -> bool {
        self.status == ComponentState::Passive
    }

    pub fn is_requesting(&self) -> bool {
        self.status == ComponentState::Requesting
    }

    pub fn is_waiting(&self) -> bool {
        self.status == ComponentState::Waiting
    }

    pub fn is_standby(&self) -> bool {
        self.status == ComponentState::Standby
    }

    pub fn is_interrupted(&self) -> bool {
        self.status == ComponentState::Interrupted
    }

    pub fn is_claiming(&self, r: ResourceId) -> bool {
        self.claims.contains_key(&r)
    }

    pub fn claimed_amount(&self, r: ResourceId) -> f64 {
        self.claims.get(&r).copied().unwrap_or(0.0)
    }

    /// 对 `r` 的占用被抢占后为真；下一次请求 `r` 时清除
    pub fn is_bumped(&self, r: ResourceId) -> bool {
        self.bumped.contains(&r)
    }

    /// 上一次请求或等待因超时结束时为真
    pub fn request_failed(&self) -> bool {
        self.failed
    }

    pub fn has_process(&self) -> bool {
        self.process.is_some()
    }
}
