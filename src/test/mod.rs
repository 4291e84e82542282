mod generator;
mod queue_stats;
mod simulator;
mod state_wait;
