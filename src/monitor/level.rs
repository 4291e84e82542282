//! 时间加权的数值监视器

use super::summary::{LevelStats, LevelSummary};
use crate::sim::TickTime;

/// 记录数值随仿真时间的变化（如队列长度、占用量）。
///
/// 每个变化点为 `(time, Some(level))`；禁用时插入 `(time, None)`，
/// 禁用区间不计入统计。
#[derive(Debug, Clone)]
pub struct LevelMonitor {
    enabled: bool,
    current: f64,
    points: Vec<(TickTime, Option<f64>)>,
}

impl LevelMonitor {
    pub fn new(initial: f64, now: TickTime) -> Self {
        Self {
            enabled: true,
            current: initial,
            points: vec![(now, Some(initial))],
        }
    }

    pub fn record(&mut self, now: TickTime, value: f64) {
        self.current = value;
        if self.enabled {
            self.points.push((now, Some(value)));
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, now: TickTime, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.points
            .push((now, if enabled { Some(self.current) } else { None }));
    }

    /// 已记录的变化点数（含禁用标记）
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 截至 `now` 每个长度为正的启用区间的 `(level, duration)`
    pub fn segments(&self, now: TickTime) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().enumerate().filter_map(move |(i, (t, v))| {
            let end = self.points.get(i + 1).map_or(now, |(next, _)| *next);
            let w = end - *t;
            match v {
                Some(v) if w > 0.0 => Some((*v, w)),
                _ => None,
            }
        })
    }

    pub fn stats(&self, now: TickTime) -> LevelStats {
        LevelStats {
            all: LevelSummary::from_segments(self.segments(now)),
            excl_zeros: LevelSummary::from_segments(self.segments(now).filter(|(v, _)| *v != 0.0)),
        }
    }
}
