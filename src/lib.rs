pub mod component;
pub mod demo;
pub mod dist;
pub mod error;
pub mod monitor;
pub mod queue;
pub mod resource;
pub mod sim;
pub mod state;

pub use component::{
    ComponentGenerator, ComponentId, ComponentOptions, ComponentState, Process, QueueId,
    RequestSpec, ResourceId, ResourceRequest, StateId, Suspend,
};
pub use error::{SimError, SimResult};
pub use sim::{Environment, EnvironmentConfig, TickTime};

#[cfg(test)]
mod test;
