//! 事件监听器

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::event::Event;
use crate::error::ListenerError;

/// 已发布事件的消费者
pub trait EventListener {
    fn consume(&mut self, event: &Event) -> Result<(), ListenerError>;

    /// 用于 `SimulationAbort` 错误与诊断信息的名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// `Environment::add_listener` 返回的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub usize);

/// 监听器出错时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerPolicy {
    /// 以 `SimError::SimulationAbort` 终止运行
    #[default]
    Abort,
    /// 用 `tracing::warn!` 记录错误并继续运行
    Isolate,
}

/// 把所有事件收集到共享的 Vec 中
#[derive(Debug, Default, Clone)]
pub struct TraceCollector {
    events: Arc<Mutex<Vec<Event>>>,
}

impl TraceCollector {
    /// 已收集事件的共享视图；收集器交给环境之后依然有效
    pub fn handle(&self) -> Arc<Mutex<Vec<Event>>> {
        Arc::clone(&self.events)
    }
}

impl EventListener for TraceCollector {
    fn consume(&mut self, event: &Event) -> Result<(), ListenerError> {
        self.events
            .lock()
            .map_err(|_| "trace collector lock poisoned")?
            .push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "trace-collector"
    }
}

/// 以 info 级别把事件转发给 `tracing`
#[derive(Debug, Default)]
pub struct TracingTraceLogger;

impl EventListener for TracingTraceLogger {
    fn consume(&mut self, event: &Event) -> Result<(), ListenerError> {
        info!(
            time = %event.time,
            current = event.current.as_deref().unwrap_or(""),
            source = event.source.as_deref().unwrap_or(""),
            details = event.details.as_deref().unwrap_or(""),
            "{}",
            event.action
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing-trace-logger"
    }
}

/// 每个事件写成一行 JSON 对象
pub struct JsonLinesTrace<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventListener for JsonLinesTrace<W> {
    fn consume(&mut self, event: &Event) -> Result<(), ListenerError> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json-lines-trace"
    }
}
