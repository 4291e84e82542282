//! 仿真环境配置

use serde::{Deserialize, Serialize};

use super::listener::ListenerPolicy;
use super::time::TimeUnit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// 一个 tick 对应的墙钟时间单位（可选）
    #[serde(default)]
    pub tick_unit: Option<TimeUnit>,
    #[serde(default)]
    pub listener_policy: ListenerPolicy,
    /// 是否发布内核自身的状态迁移事件（activate、hold、claim 等）
    #[serde(default = "default_true")]
    pub trace_core_interactions: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            tick_unit: None,
            listener_policy: ListenerPolicy::Abort,
            trace_core_interactions: true,
        }
    }
}
