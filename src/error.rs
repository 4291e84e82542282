//! 仿真错误类型
//!
//! 每个变体都带有出错实体的名称和检测到错误时的仿真时间。
//! 进程单步中产生的错误会从 `Environment::run*` 返回并结束本次运行。

use thiserror::Error;

use crate::sim::TickTime;

pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid duration {duration} for '{entity}' at t={time}")]
    InvalidDuration {
        entity: String,
        duration: f64,
        time: TickTime,
    },

    #[error("'{component}' requested {amount} from '{resource}' (capacity {capacity}) at t={time}")]
    OverCapacity {
        component: String,
        resource: String,
        amount: f64,
        capacity: f64,
        time: TickTime,
    },

    #[error("invalid amount {amount} for '{entity}' at t={time}")]
    InvalidAmount {
        entity: String,
        amount: f64,
        time: TickTime,
    },

    #[error("illegal state transition of '{entity}' at t={time}: {reason}")]
    IllegalStateTransition {
        entity: String,
        reason: String,
        time: TickTime,
    },

    #[error("listener '{listener}' failed at t={time}, simulation aborted")]
    SimulationAbort {
        listener: String,
        time: TickTime,
        #[source]
        source: ListenerError,
    },

    #[error("unknown {kind} handle #{index}")]
    UnknownEntity { kind: &'static str, index: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type SimResult<T> = Result<T, SimError>;
