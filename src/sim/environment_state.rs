//! 可观察状态
//!
//! 状态值及等待该状态的组件。

use tracing::debug;

use super::environment::Environment;
use crate::component::{ComponentId, ComponentState, StateId, WaitSpec};
use crate::error::{SimError, SimResult};
use crate::state::State;

impl Environment {
    /// 创建状态，并启用按时间加权的取值时间线
    pub fn new_state<T>(&mut self, name: Option<&str>, value: T) -> StateId<T>
    where
        T: Clone + PartialEq + 'static,
    {
        let name = match name {
            Some(n) => n.to_string(),
            None => self.context_mut().next_name("State"),
        };
        let mut state = State::new(name, value);
        state.enable_timeline(self.now());
        self.states.push(Box::new(state));
        StateId::new(self.states.len() - 1)
    }

    pub fn state<T: 'static>(&self, id: StateId<T>) -> SimResult<&State<T>> {
        self.states
            .get(id.index)
            .and_then(|s| s.as_any().downcast_ref::<State<T>>())
            .ok_or(SimError::UnknownEntity {
                kind: "state",
                index: id.index,
            })
    }

    fn state_mut<T: 'static>(&mut self, id: StateId<T>) -> SimResult<&mut State<T>> {
        self.states
            .get_mut(id.index)
            .and_then(|s| s.as_any_mut().downcast_mut::<State<T>>())
            .ok_or(SimError::UnknownEntity {
                kind: "state",
                index: id.index,
            })
    }

    pub fn state_value<T: Clone + 'static>(&self, id: StateId<T>) -> SimResult<T> {
        Ok(self.state(id)?.value().clone())
    }

    /// 设置新值，并按注册顺序恢复谓词成立的等待者
    pub fn set_state<T>(&mut self, id: StateId<T>, value: T) -> SimResult<()>
    where
        T: Clone + PartialEq + 'static,
    {
        let now = self.now();
        let (_, honored) = self.state_mut(id)?.replace(value, now);
        self.honor_waiters(id.index, honored)
    }

    /// 设置新值并让等待者响应，随后恢复旧值
    pub fn trigger_state<T>(&mut self, id: StateId<T>, value: T) -> SimResult<()>
    where
        T: Clone + PartialEq + 'static,
    {
        let now = self.now();
        let (old, honored) = self.state_mut(id)?.replace(value, now);
        self.honor_waiters(id.index, honored)?;
        self.state_mut(id)?.restore(old, now);
        Ok(())
    }

    fn honor_waiters(&mut self, state: usize, honored: Vec<ComponentId>) -> SimResult<()> {
        let now = self.now();
        let state_name = self.states[state].name().to_string();
        debug!(state = %state_name, honored = honored.len(), now = %now, "状态值已修改");
        for c in honored {
            let comp = &self.components[c.0];
            if comp.status != ComponentState::Waiting || comp.waiting_on != Some(state) {
                continue;
            }
            self.components[c.0].waiting_on = None;
            let priority = self.components[c.0].priority;
            self.schedule(c, now, priority);
            self.set_status(c, ComponentState::Scheduled);
            self.trace_interaction(
                |env| env.components[c.0].name.clone(),
                || format!("wait on '{state_name}' honored"),
                None,
            )?;
        }
        Ok(())
    }

    /// 登记当前组件的等待；谓词已成立时立即恢复
    pub(crate) fn start_wait(&mut self, c: ComponentId, spec: WaitSpec) -> SimResult<()> {
        let now = self.now();
        let fail_at = match spec.fail {
            Some(w) => Some(self.future_time(c, w.resolve(now))?),
            None => None,
        };
        let Some(cell) = self.states.get_mut(spec.state) else {
            return Err(SimError::UnknownEntity {
                kind: "state",
                index: spec.state,
            });
        };
        let state_name = cell.name().to_string();
        let Some(satisfied) = (spec.register)(&mut **cell, c) else {
            return Err(self.illegal(c, format!("state '{state_name}' has a different value type")));
        };
        self.components[c.0].failed = false;
        let priority = self.components[c.0].priority;
        if satisfied {
            self.schedule(c, now, priority);
            self.set_status(c, ComponentState::Scheduled);
            return Ok(());
        }
        self.components[c.0].waiting_on = Some(spec.state);
        self.set_status(c, ComponentState::Waiting);
        if let Some(at) = fail_at {
            self.schedule(c, at, priority);
        }
        self.trace_interaction(
            |env| env.components[c.0].name.clone(),
            || format!("wait on '{state_name}'"),
            None,
        )
    }

    /// 把 `c` 从其所在的等待列表中移除
    pub(crate) fn withdraw_wait(&mut self, c: ComponentId) {
        if let Some(state) = self.components[c.0].waiting_on.take() {
            self.states[state].remove_waiter(c);
        }
    }
}
