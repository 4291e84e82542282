//! 仿真核心模块
//!
//! 仿真环境（时钟、唤醒队列、实体 arena）、仿真时间、
//! 事件总线与监听器，以及运行配置。

mod config;
mod context;
mod environment;
mod environment_component;
mod environment_queue;
mod environment_resource;
mod environment_state;
mod event;
mod listener;
mod scheduled_event;
mod time;

pub use config::EnvironmentConfig;
pub use context::SimContext;
pub use environment::Environment;
pub use event::{Event, EventKind, ResourceEventType};
pub use listener::{
    EventListener, JsonLinesTrace, ListenerId, ListenerPolicy, TraceCollector, TracingTraceLogger,
};
pub use scheduled_event::ScheduledEvent;
pub use time::{TickTime, TimeUnit};
