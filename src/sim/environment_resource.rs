//! 资源分配
//!
//! 请求、授予、抢占与释放。

use tracing::debug;

use super::environment::Environment;
use super::event::{Event, EventKind, ResourceEventType};
use crate::component::{ComponentId, ComponentState, RequestSpec, ResourceId, ResourceRequest};
use crate::error::{SimError, SimResult};
use crate::resource::{Claim, EPSILON, Requester, Resource, ResourceOptions};

impl Environment {
    pub fn new_resource(&mut self, opts: ResourceOptions) -> SimResult<ResourceId> {
        if opts.capacity.is_nan() || opts.capacity < 0.0 {
            return Err(SimError::InvalidAmount {
                entity: opts.name.unwrap_or_else(|| "resource".to_string()),
                amount: opts.capacity,
                time: self.now(),
            });
        }
        let name = match opts.name {
            Some(n) => n,
            None => self.context_mut().next_name("Resource"),
        };
        let id = ResourceId(self.resources.len());
        let now = self.now();
        self.resources
            .push(Resource::new(name, opts.capacity, opts.preemptive, now));
        Ok(id)
    }

    pub fn resource(&self, r: ResourceId) -> SimResult<&Resource> {
        self.resources.get(r.0).ok_or(SimError::UnknownEntity {
            kind: "resource",
            index: r.0,
        })
    }

    /// 修改容量。扩容会重新执行授予规则；缩容不会驱逐已有占用
    pub fn set_capacity(&mut self, r: ResourceId, capacity: f64) -> SimResult<()> {
        let old = self.resource(r)?.capacity();
        if capacity.is_nan() || capacity < 0.0 {
            return Err(SimError::InvalidAmount {
                entity: self.resources[r.0].name().to_string(),
                amount: capacity,
                time: self.now(),
            });
        }
        self.resources[r.0].set_capacity(capacity);
        debug!(resource = %self.resources[r.0].name(), old, capacity, "容量已修改");
        if capacity > old {
            self.grant_waiting(r)?;
        }
        Ok(())
    }

    /// 占用量监视器开关
    pub fn set_claimed_monitor_enabled(&mut self, r: ResourceId, enabled: bool) -> SimResult<()> {
        self.resource(r)?;
        let now = self.now();
        self.resources[r.0].claimed_monitor_mut().set_enabled(now, enabled);
        Ok(())
    }

    /// 请求者数量监视器开关
    pub fn set_requesters_monitor_enabled(&mut self, r: ResourceId, enabled: bool) -> SimResult<()> {
        self.resource(r)?;
        let now = self.now();
        self.resources[r.0].requesters_monitor_mut().set_enabled(now, enabled);
        Ok(())
    }

    /// 释放 `c` 在 `r` 上的 `amount`（默认全部），
    /// 并按顺序把空出的容量交给排队的请求者
    pub fn release(&mut self, c: ComponentId, r: ResourceId, amount: Option<f64>) -> SimResult<()> {
        self.component(c)?;
        self.resource(r)?;
        if let Some(a) = amount {
            if a.is_nan() || a <= 0.0 {
                return Err(SimError::InvalidAmount {
                    entity: self.components[c.0].name.clone(),
                    amount: a,
                    time: self.now(),
                });
            }
        }
        let now = self.now();
        let Some(released) = self.resources[r.0].take_claim(c, amount, now) else {
            return Err(self.illegal(
                c,
                format!("release of {amount:?} from '{}' exceeds its claim", self.resources[r.0].name()),
            ));
        };
        let comp = &mut self.components[c.0];
        if let Some(held) = comp.claims.get_mut(&r) {
            *held -= released;
            if *held <= EPSILON {
                comp.claims.remove(&r);
            }
        }
        self.resource_event(c, r, ResourceEventType::Released, released)?;
        self.grant_waiting(r)
    }

    /// 释放 `c` 的全部占用
    pub fn release_all(&mut self, c: ComponentId) -> SimResult<()> {
        let held: Vec<ResourceId> = self.component(c)?.claims.keys().copied().collect();
        for r in held {
            self.release(c, r, None)?;
        }
        Ok(())
    }

    /// 把当前组件的请求加入队列，能满足时立即授予；
    /// 抢占式资源上可以先挤掉低优先级的占用
    pub(crate) fn start_request(&mut self, c: ComponentId, spec: RequestSpec) -> SimResult<()> {
        let now = self.now();
        if spec.items.is_empty() {
            return Err(self.illegal(c, "empty request"));
        }
        let mut items: Vec<ResourceRequest> = Vec::with_capacity(spec.items.len());
        for item in spec.items {
            let res = self.resource(item.resource)?;
            if item.amount.is_nan() || item.amount <= 0.0 {
                return Err(SimError::InvalidAmount {
                    entity: self.components[c.0].name.clone(),
                    amount: item.amount,
                    time: now,
                });
            }
            // 容量为零视为关闭而非不足：请求排队等待扩容
            if res.capacity() > 0.0 && item.amount > res.capacity() + EPSILON {
                return Err(SimError::OverCapacity {
                    component: self.components[c.0].name.clone(),
                    resource: res.name().to_string(),
                    amount: item.amount,
                    capacity: res.capacity(),
                    time: now,
                });
            }
            match items.iter_mut().find(|i| i.resource == item.resource) {
                Some(existing) => existing.amount += item.amount,
                None => items.push(item),
            }
        }
        let fail_at = match spec.fail {
            Some(w) => Some(self.future_time(c, w.resolve(now))?),
            None => None,
        };

        let comp = &mut self.components[c.0];
        comp.failed = false;
        for item in &items {
            comp.bumped.remove(&item.resource);
        }
        comp.requests = items.clone();
        comp.one_of = spec.one_of;
        for item in &items {
            let seq = self.claim_seq;
            self.claim_seq += 1;
            self.resources[item.resource.0].insert_requester(
                Requester {
                    component: c,
                    amount: item.amount,
                    priority: item.priority,
                    seq,
                },
                now,
            );
        }
        self.set_status(c, ComponentState::Requesting);
        self.trace_interaction(
            |env| env.components[c.0].name.clone(),
            || "request".to_string(),
            Some(describe_items(&self.resources, &items)),
        )?;

        if self.try_grant(c, true)? {
            return Ok(());
        }
        if let Some(at) = fail_at {
            let priority = self.components[c.0].priority;
            self.schedule(c, at, priority);
        }
        Ok(())
    }

    /// 容量允许时授予 `c` 的未决请求。
    /// `allow_bump` 为真时，抢占式资源可先撤销低优先级占用
    fn try_grant(&mut self, c: ComponentId, allow_bump: bool) -> SimResult<bool> {
        let reqs = self.components[c.0].requests.clone();
        if reqs.is_empty() {
            return Ok(false);
        }
        let one_of = self.components[c.0].one_of;

        if allow_bump {
            for (victim, r) in self.bump_plan(c, &reqs, one_of) {
                self.bump(victim, r)?;
            }
        }

        let honored: Vec<ResourceRequest> = if one_of {
            reqs.iter().find(|i| self.fits(i)).copied().into_iter().collect()
        } else if reqs.iter().all(|i| self.fits(i)) {
            reqs.clone()
        } else {
            Vec::new()
        };
        if honored.is_empty() {
            return Ok(false);
        }

        let now = self.now();
        for item in &reqs {
            self.resources[item.resource.0].remove_requester(c, now);
        }
        for item in &honored {
            let seq = self.claim_seq;
            self.claim_seq += 1;
            self.resources[item.resource.0].add_claim(
                Claim {
                    component: c,
                    amount: item.amount,
                    priority: item.priority,
                    seq,
                },
                now,
            );
            *self.components[c.0].claims.entry(item.resource).or_insert(0.0) += item.amount;
            debug!(
                component = %self.components[c.0].name,
                resource = %self.resources[item.resource.0].name(),
                amount = item.amount,
                now = %now,
                "占用已授予"
            );
            self.resource_event(c, item.resource, ResourceEventType::Claimed, item.amount)?;
        }
        self.components[c.0].requests.clear();
        let priority = self.components[c.0].priority;
        self.schedule(c, now, priority);
        self.set_status(c, ComponentState::Scheduled);
        Ok(true)
    }

    fn fits(&self, item: &ResourceRequest) -> bool {
        self.resources[item.resource.0].available() + EPSILON >= item.amount
    }

    /// 抢占计划
    ///
    /// 为授予 `c` 的请求需要撤销的占用。请求已能满足或无法满足时为空：
    /// all-of 请求只有在每一项都能满足时才抢占，
    /// one-of 请求只为第一个可满足的项抢占。
    fn bump_plan(&self, c: ComponentId, reqs: &[ResourceRequest], one_of: bool) -> Vec<(ComponentId, ResourceId)> {
        if one_of {
            if reqs.iter().any(|i| self.fits(i)) {
                return Vec::new();
            }
            return reqs
                .iter()
                .find_map(|item| {
                    self.bump_victims(c, item)
                        .map(|vs| vs.into_iter().map(|v| (v, item.resource)).collect::<Vec<_>>())
                })
                .unwrap_or_default();
        }
        let mut plan = Vec::new();
        for item in reqs.iter().filter(|i| !self.fits(i)) {
            match self.bump_victims(c, item) {
                Some(vs) => plan.extend(vs.into_iter().map(|v| (v, item.resource))),
                None => return Vec::new(),
            }
        }
        plan
    }

    /// 抢占式资源上能为 `item` 腾出足够容量的严格低优先级占用者；
    /// 即使撤销全部候选也不够时返回 `None`
    fn bump_victims(&self, c: ComponentId, item: &ResourceRequest) -> Option<Vec<ComponentId>> {
        let res = &self.resources[item.resource.0];
        if !res.is_preemptive() {
            return None;
        }
        let mut freed = res.available();
        let mut victims = Vec::new();
        for claim in res.bump_candidates(item.priority) {
            if freed + EPSILON >= item.amount {
                break;
            }
            if claim.component == c {
                continue;
            }
            freed += claim.amount;
            victims.push(claim.component);
        }
        if victims.is_empty() || freed + EPSILON < item.amount {
            return None;
        }
        Some(victims)
    }

    /// 收回 `victim` 对 `r` 的占用，标记为被抢占并立即恢复它
    fn bump(&mut self, victim: ComponentId, r: ResourceId) -> SimResult<()> {
        let now = self.now();
        let amount = self.resources[r.0].take_claim(victim, None, now).unwrap_or(0.0);
        let comp = &mut self.components[victim.0];
        comp.claims.remove(&r);
        comp.bumped.insert(r);
        debug!(
            victim = %comp.name,
            resource = %self.resources[r.0].name(),
            amount,
            now = %now,
            "占用被抢占"
        );
        self.resource_event(victim, r, ResourceEventType::Bumped, amount)?;
        self.wake_now(victim);
        Ok(())
    }

    /// 按队列顺序对 `r` 的请求者重新执行授予规则
    pub(crate) fn grant_waiting(&mut self, r: ResourceId) -> SimResult<()> {
        let queued: Vec<ComponentId> = self.resources[r.0]
            .requesters()
            .iter()
            .map(|q| q.component)
            .collect();
        for c in queued {
            if self.resources[r.0].is_requester(c)
                && self.components[c.0].status == ComponentState::Requesting
            {
                self.try_grant(c, false)?;
            }
        }
        Ok(())
    }

    /// 把 `c` 从所有请求队列中移除
    pub(crate) fn withdraw_requests(&mut self, c: ComponentId) {
        let now = self.now();
        let reqs = std::mem::take(&mut self.components[c.0].requests);
        for item in reqs {
            self.resources[item.resource.0].remove_requester(c, now);
        }
    }

    fn resource_event(
        &mut self,
        c: ComponentId,
        r: ResourceId,
        ty: ResourceEventType,
        amount: f64,
    ) -> SimResult<()> {
        if !self.config().trace_core_interactions {
            return Ok(());
        }
        let res = &self.resources[r.0];
        let action = match ty {
            ResourceEventType::Claimed => format!("claimed {amount} from '{}'", res.name()),
            ResourceEventType::Released => format!("released {amount} to '{}'", res.name()),
            ResourceEventType::Bumped => format!("bumped from '{}'", res.name()),
        };
        let event = Event {
            time: self.now(),
            current: self.current_name(),
            source: Some(self.components[c.0].name.clone()),
            action,
            details: None,
            kind: EventKind::Resource {
                resource: res.name().to_string(),
                ty,
                amount,
                capacity: res.capacity(),
                claimed: res.claimed(),
                requesters: res.requesters().len(),
                claimers: res.claimers().len(),
            },
        };
        self.publish_event(event)
    }
}

fn describe_items(resources: &[Resource], items: &[ResourceRequest]) -> String {
    items
        .iter()
        .map(|i| match i.priority {
            Some(p) => format!("{} x{} (priority {p})", resources[i.resource.0].name(), i.amount),
            None => format!("{} x{}", resources[i.resource.0].name(), i.amount),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
