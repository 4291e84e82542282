//! 事件记录
//!
//! 每次状态迁移时发布到事件总线上的不可变记录。
//! 由监听器保存，内核本身不保留。

use serde::{Deserialize, Serialize};

use super::time::TickTime;

/// [`EventKind::Resource`] 携带的资源交互类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceEventType {
    Claimed,
    Released,
    Bumped,
}

/// 事件负载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// 一般状态变化（由 `action` / `details` 描述）
    Interaction,
    /// 资源占用发生变化
    Resource {
        resource: String,
        #[serde(rename = "type")]
        ty: ResourceEventType,
        amount: f64,
        capacity: f64,
        claimed: f64,
        requesters: usize,
        claimers: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: TickTime,
    /// 事件产生时处于 current 的组件
    pub current: Option<String>,
    /// 状态发生变化的实体
    pub source: Option<String>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn interaction(
        time: TickTime,
        current: Option<String>,
        source: Option<String>,
        action: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            time,
            current,
            source,
            action: action.into(),
            details,
            kind: EventKind::Interaction,
        }
    }
}
