//! 资源
//!
//! 可占用的有限容量池。需要调度器参与的分配逻辑（授予、抢占、释放）
//! 位于 `sim::environment_resource`；本模块负责记账与排序规则。

mod resource;

pub use resource::{Claim, Requester, Resource, ResourceOptions};

/// 浮点容量比较的容差
pub const EPSILON: f64 = 1e-9;
