//! 组件生命周期
//! 创建组件、处理挂起结果，以及由其他组件或模型驱动方触发的状态迁移。

use tracing::debug;

use super::environment::Environment;
use super::time::TickTime;
use crate::component::{
    Component, ComponentGenerator, ComponentId, ComponentOptions, ComponentState, Interruption,
    Process, Suspend,
};
use crate::error::{SimError, SimResult};

impl Environment {
    /// 创建运行 `process` 的组件，并安排在当前时刻执行
    pub fn spawn(&mut self, name: &str, process: impl Process) -> SimResult<ComponentId> {
        self.spawn_with(ComponentOptions::named(name), process)
    }

    pub fn spawn_with(&mut self, opts: ComponentOptions, process: impl Process) -> SimResult<ComponentId> {
        self.create(opts, Some(Box::new(process)))
    }

    /// 创建没有进程的组件；在以新入口激活之前保持 DATA
    pub fn add_data_component(&mut self, name: Option<&str>) -> SimResult<ComponentId> {
        let opts = ComponentOptions {
            name: name.map(str::to_string),
            ..ComponentOptions::default()
        };
        self.create(opts, None)
    }

    /// 注册生成器；首次到达发生在其 `from` 时间
    pub fn spawn_generator(&mut self, generator: ComponentGenerator) -> SimResult<ComponentId> {
        let opts = ComponentOptions {
            name: Some(self.context_mut().next_name("ComponentGenerator")),
            at: Some(generator.from),
            ..ComponentOptions::default()
        };
        self.create(opts, Some(Box::new(generator)))
    }

    fn create(&mut self, opts: ComponentOptions, process: Option<Box<dyn Process>>) -> SimResult<ComponentId> {
        let name = match opts.name {
            Some(n) => n,
            None => self.context_mut().next_name("Component"),
        };
        let id = ComponentId(self.components.len());
        let has_process = process.is_some();
        let now = self.now();
        self.components
            .push(Component::new(name, opts.priority, process, now));
        debug!(component = %self.components[id.0].name, now = %now, "组件已创建");
        self.trace_interaction(|env| env.components[id.0].name.clone(), || "create".to_string(), None)?;

        if !has_process {
            return Ok(id);
        }
        if opts.passive {
            self.set_status(id, ComponentState::Passive);
        } else {
            let at = self.future_time(id, opts.at.unwrap_or(now))?;
            self.schedule(id, at, opts.priority);
            self.set_status(id, ComponentState::Scheduled);
        }
        Ok(id)
    }

    pub fn component(&self, c: ComponentId) -> SimResult<&Component> {
        self.components.get(c.0).ok_or(SimError::UnknownEntity {
            kind: "component",
            index: c.0,
        })
    }

    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> + '_ {
        self.components
            .iter()
            .enumerate()
            .map(|(i, c)| (ComponentId(i), c))
    }

    /// 通过 `Process::as_any` 取得 `c` 的具体进程类型；
    /// `c` 处于 current 时返回 `None`
    pub fn process_ref<P: 'static>(&self, c: ComponentId) -> Option<&P> {
        self.components
            .get(c.0)?
            .process
            .as_ref()?
            .as_any()?
            .downcast_ref::<P>()
    }

    pub fn set_priority(&mut self, c: ComponentId, priority: i32) -> SimResult<()> {
        self.component(c)?;
        self.components[c.0].priority = priority;
        Ok(())
    }

    /// `c` 截至当前处于 `state` 的总时长
    pub fn time_in_state(&self, c: ComponentId, state: ComponentState) -> SimResult<f64> {
        Ok(self.component(c)?.status_timeline.total(&state, self.now()))
    }

    // ---- 挂起 -----------------------------------------------------------

    /// 应用当前组件单步返回的挂起指令
    pub(crate) fn apply(&mut self, c: ComponentId, suspend: Suspend) -> SimResult<()> {
        let now = self.now();
        match suspend {
            Suspend::Hold { wake, priority } => {
                let at = self.future_time(c, wake.resolve(now))?;
                let priority = priority.unwrap_or(self.components[c.0].priority);
                self.schedule(c, at, priority);
                self.set_status(c, ComponentState::Scheduled);
                self.trace_interaction(
                    |env| env.components[c.0].name.clone(),
                    || format!("hold +{}", at - now),
                    Some(format!("scheduled for {at}")),
                )
            }
            Suspend::Passivate => {
                self.set_status(c, ComponentState::Passive);
                self.trace_interaction(|env| env.components[c.0].name.clone(), || "passivate".to_string(), None)
            }
            Suspend::Standby => {
                self.set_status(c, ComponentState::Standby);
                self.standby.push(c);
                self.trace_interaction(|env| env.components[c.0].name.clone(), || "standby".to_string(), None)
            }
            Suspend::Request(spec) => self.start_request(c, spec),
            Suspend::Wait(spec) => self.start_wait(c, spec),
            Suspend::Activate { at, process } => {
                if let Some(p) = process {
                    self.components[c.0].process = Some(p);
                }
                let at = self.future_time(c, at.unwrap_or(now))?;
                let priority = self.components[c.0].priority;
                self.schedule(c, at, priority);
                self.set_status(c, ComponentState::Scheduled);
                self.trace_interaction(
                    |env| env.components[c.0].name.clone(),
                    || "activate".to_string(),
                    Some(format!("scheduled for {at}")),
                )
            }
            Suspend::Done => self.terminate(c),
        }
    }

    /// 结束 `c` 的进程：丢弃待处理的唤醒、请求与等待，
    /// 并释放所有占用
    pub(crate) fn terminate(&mut self, c: ComponentId) -> SimResult<()> {
        self.clear_pending(c);
        self.release_all(c)?;
        self.set_status(c, ComponentState::Data);
        self.trace_interaction(|env| env.components[c.0].name.clone(), || "ended".to_string(), None)
    }

    /// 清除所有可能自行恢复 `c` 的条目
    pub(crate) fn clear_pending(&mut self, c: ComponentId) {
        self.cancel_wake(c);
        self.withdraw_requests(c);
        self.withdraw_wait(c);
        self.standby.retain(|s| *s != c);
        self.components[c.0].interruption = None;
    }

    /// 放弃 `c` 当前所做的事，安排其在当前时刻恢复
    pub(crate) fn wake_now(&mut self, c: ComponentId) {
        self.clear_pending(c);
        let (now, priority) = (self.now(), self.components[c.0].priority);
        self.schedule(c, now, priority);
        self.set_status(c, ComponentState::Scheduled);
    }

    fn not_current(&self, c: ComponentId, what: &str) -> SimResult<()> {
        if self.component(c)?.status == ComponentState::Current {
            return Err(self.illegal(c, format!("cannot {what} the current component; return a Suspend instead")));
        }
        Ok(())
    }

    // ---- 外部迁移 -------------------------------------------------

    /// 安排 `c` 在 `at`（默认当前时刻）执行，
    /// 取消其待处理的唤醒、请求或等待
    pub fn activate(&mut self, c: ComponentId, at: Option<TickTime>) -> SimResult<()> {
        self.not_current(c, "activate")?;
        if self.components[c.0].process.is_none() {
            return Err(self.illegal(c, "activate without a process"));
        }
        let at = self.future_time(c, at.unwrap_or(self.now()))?;
        self.clear_pending(c);
        let priority = self.components[c.0].priority;
        self.schedule(c, at, priority);
        self.set_status(c, ComponentState::Scheduled);
        self.trace_interaction(
            |env| env.components[c.0].name.clone(),
            || "activate".to_string(),
            Some(format!("scheduled for {at}")),
        )
    }

    /// 与 `activate` 相同，但以新入口重新开始
    pub fn activate_with(&mut self, c: ComponentId, at: Option<TickTime>, process: impl Process) -> SimResult<()> {
        self.not_current(c, "activate")?;
        self.components[c.0].process = Some(Box::new(process));
        self.activate(c, at)
    }

    pub fn passivate(&mut self, c: ComponentId) -> SimResult<()> {
        self.not_current(c, "passivate")?;
        if self.components[c.0].status == ComponentState::Data {
            return Err(self.illegal(c, "passivate a DATA component"));
        }
        self.clear_pending(c);
        self.set_status(c, ComponentState::Passive);
        self.trace_interaction(|env| env.components[c.0].name.clone(), || "passivate".to_string(), None)
    }

    /// 从外部终止 `c`
    pub fn cancel(&mut self, c: ComponentId) -> SimResult<()> {
        self.not_current(c, "cancel")?;
        self.terminate(c)
    }

    /// 中断处于 SCHEDULED 或 PASSIVE 的组件，并记住剩余的 hold 时间
    pub fn interrupt(&mut self, c: ComponentId) -> SimResult<()> {
        self.not_current(c, "interrupt")?;
        let now = self.now();
        let comp = &self.components[c.0];
        let interruption = match comp.status {
            ComponentState::Scheduled => Interruption {
                prior: ComponentState::Scheduled,
                remaining: comp.wake.map(|w| w.at - now),
                priority: comp.wake.map_or(comp.priority, |w| w.priority),
            },
            ComponentState::Passive => Interruption {
                prior: ComponentState::Passive,
                remaining: None,
                priority: comp.priority,
            },
            other => return Err(self.illegal(c, format!("cannot interrupt a {other:?} component"))),
        };
        self.cancel_wake(c);
        self.components[c.0].interruption = Some(interruption);
        self.set_status(c, ComponentState::Interrupted);
        self.trace_interaction(|env| env.components[c.0].name.clone(), || "interrupt".to_string(), None)
    }

    /// 撤销 `interrupt`：原先 SCHEDULED 的组件继续剩余的 hold
    pub fn resume(&mut self, c: ComponentId) -> SimResult<()> {
        let Some(int) = self.component(c)?.interruption else {
            return Err(self.illegal(c, "resume a component that is not interrupted"));
        };
        self.components[c.0].interruption = None;
        match (int.prior, int.remaining) {
            (ComponentState::Scheduled, Some(remaining)) => {
                let at = self.now() + remaining;
                self.schedule(c, at, int.priority);
                self.set_status(c, ComponentState::Scheduled);
            }
            _ => self.set_status(c, ComponentState::Passive),
        }
        self.trace_interaction(|env| env.components[c.0].name.clone(), || "resume".to_string(), None)
    }
}
