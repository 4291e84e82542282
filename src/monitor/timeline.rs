//! 时间加权的分类监视器

use crate::sim::TickTime;

/// 跟踪取值随时间所处的类别，例如组件的调度状态
/// 或 `State<T>` 的值。
#[derive(Debug, Clone)]
pub struct CategoryTimeline<T> {
    enabled: bool,
    current: T,
    points: Vec<(TickTime, Option<T>)>,
}

impl<T: Clone + PartialEq> CategoryTimeline<T> {
    pub fn new(initial: T, now: TickTime) -> Self {
        Self {
            enabled: true,
            current: initial.clone(),
            points: vec![(now, Some(initial))],
        }
    }

    pub fn record(&mut self, now: TickTime, value: T) {
        if self.enabled {
            self.points.push((now, Some(value.clone())));
        }
        self.current = value;
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn set_enabled(&mut self, now: TickTime, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        let marker = enabled.then(|| self.current.clone());
        self.points.push((now, marker));
    }

    /// 截至 `now` 处于 `category` 的总时长，不含禁用区间
    pub fn total(&self, category: &T, now: TickTime) -> f64 {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, (_, v))| v.as_ref() == Some(category))
            .map(|(i, (t, _))| {
                let end = self.points.get(i + 1).map_or(now, |(next, _)| *next);
                (end - *t).max(0.0)
            })
            .sum()
    }

    /// 已记录的变化点，按时间先后
    pub fn history(&self) -> impl Iterator<Item = (TickTime, &T)> + '_ {
        self.points
            .iter()
            .filter_map(|(t, v)| v.as_ref().map(|v| (*t, v)))
    }
}
