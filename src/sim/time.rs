//! 仿真时间类型
//!
//! 标量仿真时钟，以及可选的墙钟时间单位换算。

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 以 tick 计的仿真时间
///
/// 包装 `f64`，通过 `f64::total_cmp` 实现全序，
/// 可直接作为调度队列的键。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickTime(pub f64);

impl TickTime {
    pub const ZERO: TickTime = TickTime(0.0);
    pub const MAX: TickTime = TickTime(f64::MAX);

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn max(self, other: TickTime) -> TickTime {
        if self >= other { self } else { other }
    }
}

impl PartialEq for TickTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TickTime {}

impl Ord for TickTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for TickTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<f64> for TickTime {
    type Output = TickTime;

    fn add(self, rhs: f64) -> TickTime {
        TickTime(self.0 + rhs)
    }
}

impl Sub for TickTime {
    type Output = f64;

    fn sub(self, rhs: TickTime) -> f64 {
        self.0 - rhs.0
    }
}

impl From<f64> for TickTime {
    fn from(v: f64) -> Self {
        TickTime(v)
    }
}

impl fmt::Display for TickTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// 一个 tick 代表的墙钟时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn secs_per_tick(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Days => 86_400.0,
        }
    }

    /// 把墙钟时长换算为 tick 数
    pub fn to_ticks(self, d: Duration) -> f64 {
        d.as_secs_f64() / self.secs_per_tick()
    }

    /// 把 tick 数换算为时长；负数截断为零，NaN 或超出 `Duration` 范围时返回 `None`
    pub fn to_duration(self, ticks: f64) -> Option<Duration> {
        if ticks.is_nan() {
            return None;
        }
        Duration::try_from_secs_f64((ticks * self.secs_per_tick()).max(0.0)).ok()
    }
}
