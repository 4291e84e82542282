use std::cmp::Reverse;

use crate::component::ComponentId;
use crate::monitor::LevelMonitor;
use crate::sim::TickTime;

/// `Environment::new_resource` 的构造选项
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOptions {
    /// 缺省时自动命名为 `Resource.N`
    pub name: Option<String>,
    pub capacity: f64,
    pub preemptive: bool,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            name: None,
            capacity: 1.0,
            preemptive: false,
        }
    }
}

impl ResourceOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn preemptive(mut self, preemptive: bool) -> Self {
        self.preemptive = preemptive;
        self
    }
}

/// 某个组件排队中的请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Requester {
    pub component: ComponentId,
    pub amount: f64,
    pub priority: Option<i32>,
    pub seq: u64,
}

/// 某个组件当前持有的数量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Claim {
    pub component: ComponentId,
    pub amount: f64,
    pub priority: Option<i32>,
    pub seq: u64,
}

#[derive(Debug)]
pub struct Resource {
    name: String,
    capacity: f64,
    claimed: f64,
    preemptive: bool,
    /// 优先级降序，到达顺序升序
    requesters: Vec<Requester>,
    /// 按占用顺序
    claimers: Vec<Claim>,
    claimed_monitor: LevelMonitor,
    requesters_monitor: LevelMonitor,
}

impl Resource {
    pub(crate) fn new(name: String, capacity: f64, preemptive: bool, now: TickTime) -> Self {
        Self {
            name,
            capacity,
            claimed: 0.0,
            preemptive,
            requesters: Vec::new(),
            claimers: Vec::new(),
            claimed_monitor: LevelMonitor::new(0.0, now),
            requesters_monitor: LevelMonitor::new(0.0, now),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn claimed(&self) -> f64 {
        self.claimed
    }

    /// 剩余容量；缩容后旧占用超出容量时为零
    pub fn available(&self) -> f64 {
        (self.capacity - self.claimed).max(0.0)
    }

    /// 已占用比例；容量为零时为 `None`
    pub fn occupancy(&self) -> Option<f64> {
        (self.capacity > 0.0).then(|| self.claimed / self.capacity)
    }

    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    pub fn requesters(&self) -> &[Requester] {
        &self.requesters
    }

    pub fn claimers(&self) -> &[Claim] {
        &self.claimers
    }

    pub fn claimed_monitor(&self) -> &LevelMonitor {
        &self.claimed_monitor
    }

    pub fn requesters_monitor(&self) -> &LevelMonitor {
        &self.requesters_monitor
    }

    pub(crate) fn claimed_monitor_mut(&mut self) -> &mut LevelMonitor {
        &mut self.claimed_monitor
    }

    pub(crate) fn requesters_monitor_mut(&mut self) -> &mut LevelMonitor {
        &mut self.requesters_monitor
    }

    pub fn is_claimer(&self, c: ComponentId) -> bool {
        self.claimers.iter().any(|cl| cl.component == c)
    }

    pub fn is_requester(&self, c: ComponentId) -> bool {
        self.requesters.iter().any(|r| r.component == c)
    }

    pub(crate) fn set_capacity(&mut self, capacity: f64) {
        self.capacity = capacity;
    }

    /// 插入到所有优先级不低于它的请求者之后
    pub(crate) fn insert_requester(&mut self, req: Requester, now: TickTime) {
        let pos = self
            .requesters
            .iter()
            .position(|r| r.priority < req.priority)
            .unwrap_or(self.requesters.len());
        self.requesters.insert(pos, req);
        self.requesters_monitor
            .record(now, self.requesters.len() as f64);
    }

    pub(crate) fn remove_requester(&mut self, c: ComponentId, now: TickTime) -> Option<Requester> {
        let pos = self.requesters.iter().position(|r| r.component == c)?;
        let req = self.requesters.remove(pos);
        self.requesters_monitor
            .record(now, self.requesters.len() as f64);
        Some(req)
    }

    pub(crate) fn add_claim(&mut self, claim: Claim, now: TickTime) {
        self.claimed += claim.amount;
        match self
            .claimers
            .iter_mut()
            .find(|cl| cl.component == claim.component)
        {
            Some(existing) => {
                existing.amount += claim.amount;
                existing.priority = claim.priority;
            }
            None => self.claimers.push(claim),
        }
        self.claimed_monitor.record(now, self.claimed);
    }

    /// 缩减（或移除）`c` 的占用，返回释放量；
    /// `c` 持有量不足 `amount` 时返回 `None`
    pub(crate) fn take_claim(&mut self, c: ComponentId, amount: Option<f64>, now: TickTime) -> Option<f64> {
        let pos = self.claimers.iter().position(|cl| cl.component == c)?;
        let held = self.claimers[pos].amount;
        let released = amount.unwrap_or(held);
        if released > held + super::EPSILON {
            return None;
        }
        if held - released <= super::EPSILON {
            self.claimers.remove(pos);
            self.claimed -= held;
        } else {
            self.claimers[pos].amount -= released;
            self.claimed -= released;
        }
        if self.claimed.abs() <= super::EPSILON {
            self.claimed = 0.0;
        }
        self.claimed_monitor.record(now, self.claimed);
        Some(released.min(held))
    }

    /// 优先级为 `priority` 的请求可抢占的占用：优先级严格更低（`None` 最低），
    /// 低优先级在前，同优先级时最近的占用在前。`None` 请求者不能抢占任何人。
    pub(crate) fn bump_candidates(&self, priority: Option<i32>) -> Vec<Claim> {
        if priority.is_none() {
            return Vec::new();
        }
        let mut victims: Vec<Claim> = self
            .claimers
            .iter()
            .filter(|cl| cl.priority < priority)
            .copied()
            .collect();
        victims.sort_by_key(|cl| (cl.priority, Reverse(cl.seq)));
        victims
    }
}
