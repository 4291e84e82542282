//! 进程
//!
//! 进程体及其交还给调度器的挂起指令。

use std::any::Any;
use std::fmt;

use super::id::{ComponentId, ResourceId, StateId};
use crate::error::SimResult;
use crate::sim::{Environment, TickTime};
use crate::state::{AnyState, State};

/// 可恢复执行的进程
///
/// 所属组件每次恢复时，环境都会调用 `step`。
/// 需要跨步保留的状态放在实现者的字段中。
pub trait Process: 'static {
    fn step(&mut self, env: &mut Environment, me: ComponentId) -> SimResult<Suspend>;

    /// 供 `Environment::process_ref` 访问具体进程类型
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

impl<F> Process for F
where
    F: FnMut(&mut Environment, ComponentId) -> SimResult<Suspend> + 'static,
{
    fn step(&mut self, env: &mut Environment, me: ComponentId) -> SimResult<Suspend> {
        self(env, me)
    }
}

/// 仿真时间点：绝对时间或相对当前时刻
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wake {
    After(f64),
    At(TickTime),
}

impl Wake {
    pub(crate) fn resolve(self, now: TickTime) -> TickTime {
        match self {
            Wake::After(d) => now + d,
            Wake::At(t) => t,
        }
    }
}

/// 请求中的单个资源项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceRequest {
    pub resource: ResourceId,
    pub amount: f64,
    /// `None` 不会抢占任何人；任何 `Some` 都高于 `None`
    pub priority: Option<i32>,
}

impl ResourceRequest {
    pub fn new(resource: ResourceId) -> Self {
        Self {
            resource,
            amount: 1.0,
            priority: None,
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl From<ResourceId> for ResourceRequest {
    fn from(resource: ResourceId) -> Self {
        ResourceRequest::new(resource)
    }
}

/// （可能涉及多个资源的）请求
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub items: Vec<ResourceRequest>,
    /// 满足任意一项即可，而非全部
    pub one_of: bool,
    /// 到此时间放弃；组件恢复时 `request_failed` 为真
    pub fail: Option<Wake>,
}

impl RequestSpec {
    pub fn new(items: impl IntoIterator<Item = ResourceRequest>) -> Self {
        Self {
            items: items.into_iter().collect(),
            one_of: false,
            fail: None,
        }
    }

    pub fn one_of(mut self) -> Self {
        self.one_of = true;
        self
    }

    pub fn fail_at(mut self, at: TickTime) -> Self {
        self.fail = Some(Wake::At(at));
        self
    }

    pub fn fail_delay(mut self, delay: f64) -> Self {
        self.fail = Some(Wake::After(delay));
        self
    }
}

type Register = Box<dyn FnOnce(&mut dyn AnyState, ComponentId) -> Option<bool>>;

/// 等待 `State<T>` 的值满足谓词
pub struct WaitSpec {
    pub(crate) state: usize,
    pub(crate) register: Register,
    pub(crate) fail: Option<Wake>,
}

impl WaitSpec {
    pub fn new<T: 'static>(state: StateId<T>, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        let register: Register = Box::new(move |cell, who| {
            let state = cell.as_any_mut().downcast_mut::<State<T>>()?;
            Some(state.check_or_enqueue(who, Box::new(predicate)))
        });
        Self {
            state: state.index(),
            register,
            fail: None,
        }
    }

    pub fn fail_at(mut self, at: TickTime) -> Self {
        self.fail = Some(Wake::At(at));
        self
    }

    pub fn fail_delay(mut self, delay: f64) -> Self {
        self.fail = Some(Wake::After(delay));
        self
    }
}

impl fmt::Debug for WaitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitSpec")
            .field("state", &self.state)
            .field("fail", &self.fail)
            .finish()
    }
}

/// 进程单步结束后交给调度器的指令
pub enum Suspend {
    /// 休眠后恢复；负时长报错。未指定优先级时使用组件自身优先级
    Hold { wake: Wake, priority: Option<i32> },
    /// 休眠直到被其他组件激活
    Passivate,
    /// 下一个事件处理完后恢复
    Standby,
    Request(RequestSpec),
    Wait(WaitSpec),
    /// 重新调度本组件，可替换入口
    Activate {
        at: Option<TickTime>,
        process: Option<Box<dyn Process>>,
    },
    /// 终止：释放占用并撤回请求
    Done,
}

impl Suspend {
    pub fn hold(duration: f64) -> Self {
        Suspend::Hold {
            wake: Wake::After(duration),
            priority: None,
        }
    }

    pub fn hold_till(till: TickTime) -> Self {
        Suspend::Hold {
            wake: Wake::At(till),
            priority: None,
        }
    }

    pub fn hold_with_priority(duration: f64, priority: i32) -> Self {
        Suspend::Hold {
            wake: Wake::After(duration),
            priority: Some(priority),
        }
    }

    pub fn request(req: impl Into<ResourceRequest>) -> Self {
        Suspend::Request(RequestSpec::new([req.into()]))
    }

    pub fn wait<T: 'static>(state: StateId<T>, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Suspend::Wait(WaitSpec::new(state, predicate))
    }

    pub fn activate_with(process: impl Process) -> Self {
        Suspend::Activate {
            at: None,
            process: Some(Box::new(process)),
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Suspend::Hold { .. } => "hold",
            Suspend::Passivate => "passivate",
            Suspend::Standby => "standby",
            Suspend::Request(_) => "request",
            Suspend::Wait(_) => "wait",
            Suspend::Activate { .. } => "activate",
            Suspend::Done => "done",
        }
    }
}

impl fmt::Debug for Suspend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suspend::Hold { wake, priority } => f
                .debug_struct("Hold")
                .field("wake", wake)
                .field("priority", priority)
                .finish(),
            Suspend::Request(spec) => f.debug_tuple("Request").field(spec).finish(),
            Suspend::Wait(spec) => f.debug_tuple("Wait").field(spec).finish(),
            Suspend::Activate { at, process } => f
                .debug_struct("Activate")
                .field("at", at)
                .field("new_process", &process.is_some())
                .finish(),
            other => f.write_str(other.label()),
        }
    }
}
