//! 组件
//!
//! 面向进程的实体：标识符、调度状态、进程体以及生成器。
//! 状态迁移本身由 `sim::Environment` 驱动。

mod component;
mod generator;
mod id;
mod process;
mod status;

pub use component::{Component, ComponentOptions};
pub(crate) use component::Interruption;
pub use generator::{Builder, ComponentGenerator};
pub use id::{ComponentId, QueueId, ResourceId, StateId};
pub use process::{Process, RequestSpec, ResourceRequest, Suspend, WaitSpec, Wake};
pub use status::ComponentState;
