//! 状态
//!
//! 带监视的取值，以及基于谓词的等待者。

use std::any::Any;

use crate::component::ComponentId;
use crate::monitor::CategoryTimeline;
use crate::sim::TickTime;

pub(crate) type Predicate<T> = Box<dyn Fn(&T) -> bool>;

/// 可被组件等待的值
///
/// 每次 `set` 都按注册顺序重新评估所有等待者；
/// 谓词成立者离开等待列表，并在当前时刻恢复。
pub struct State<T> {
    name: String,
    value: T,
    waiters: Vec<(ComponentId, Predicate<T>)>,
    timeline: Option<CategoryTimeline<T>>,
}

impl<T: 'static> State<T> {
    pub(crate) fn new(name: String, value: T) -> Self {
        Self {
            name,
            value,
            waiters: Vec::new(),
            timeline: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// 当前的等待组件，按注册顺序
    pub fn waiters(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.waiters.iter().map(|(c, _)| *c)
    }

    pub fn timeline(&self) -> Option<&CategoryTimeline<T>> {
        self.timeline.as_ref()
    }

    /// `predicate` 已成立时返回 `true`；否则 `who` 加入等待列表
    pub(crate) fn check_or_enqueue(&mut self, who: ComponentId, predicate: Predicate<T>) -> bool {
        if predicate(&self.value) {
            return true;
        }
        self.waiters.push((who, predicate));
        false
    }

    /// 替换取值，按顺序返回被满足的等待者
    pub(crate) fn replace(&mut self, value: T, now: TickTime) -> (T, Vec<ComponentId>)
    where
        T: Clone + PartialEq,
    {
        if let Some(tl) = self.timeline.as_mut() {
            tl.record(now, value.clone());
        }
        let old = std::mem::replace(&mut self.value, value);
        let mut honored = Vec::new();
        let current = &self.value;
        self.waiters.retain(|(c, pred)| {
            if pred(current) {
                honored.push(*c);
                false
            } else {
                true
            }
        });
        (old, honored)
    }

    /// 放回旧值，不评估等待者
    pub(crate) fn restore(&mut self, value: T, now: TickTime)
    where
        T: Clone + PartialEq,
    {
        if let Some(tl) = self.timeline.as_mut() {
            tl.record(now, value.clone());
        }
        self.value = value;
    }

    pub(crate) fn enable_timeline(&mut self, now: TickTime)
    where
        T: Clone + PartialEq,
    {
        if self.timeline.is_none() {
            self.timeline = Some(CategoryTimeline::new(self.value.clone(), now));
        }
    }
}

/// 环境 arena 中 `State<T>` 的类型擦除视图
pub trait AnyState {
    fn name(&self) -> &str;
    fn remove_waiter(&mut self, who: ComponentId) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AnyState for State<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn remove_waiter(&mut self, who: ComponentId) -> bool {
        let before = self.waiters.len();
        self.waiters.retain(|(c, _)| *c != who);
        before != self.waiters.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
