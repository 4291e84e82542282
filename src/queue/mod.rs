//! 组件队列
//!
//! 带统计信息的组件成员队列。

mod component_queue;

pub use component_queue::{ComponentQueue, QueueOrder, QueueStats};
