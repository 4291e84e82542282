use serde::{Deserialize, Serialize};

/// 组件的调度状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentState {
    /// 尚未启动或已终止
    Data,
    /// 有待处理的唤醒条目
    Scheduled,
    /// 正在执行
    Current,
    /// 挂起，直到被激活
    Passive,
    /// 阻塞于一个或多个资源
    Requesting,
    /// 阻塞于状态谓词
    Waiting,
    /// 下一个事件之后恢复，与其时间无关
    Standby,
    /// 被 `interrupt` 挂起；`resume` 恢复原状态
    Interrupted,
}
