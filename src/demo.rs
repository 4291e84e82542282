//! 演示模型
//!
//! 银行网点：顾客由生成器产生，进入等待队列，
//! 由空闲时处于 passive 状态的柜员逐个服务。

use std::fs;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::component::{ComponentGenerator, ComponentId, ComponentOptions, Process, QueueId, Suspend};
use crate::dist::{Constant, Distribution};
use crate::error::{SimError, SimResult};
use crate::queue::{QueueOrder, QueueStats};
use crate::sim::{Environment, TickTime};

/// 银行模型参数，可从 JSON 加载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    pub seed: u64,
    pub clerks: usize,
    /// 到达间隔在 `[iat_min, iat_max]` 内均匀分布
    pub iat_min: f64,
    pub iat_max: f64,
    pub service_time: f64,
    pub until: f64,
    pub queue_order: QueueOrder,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            clerks: 1,
            iat_min: 5.0,
            iat_max: 15.0,
            service_time: 30.0,
            until: 50.0,
            queue_order: QueueOrder::Fifo,
        }
    }
}

impl BankConfig {
    pub fn from_json_file(path: &Path) -> SimResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&raw).map_err(|e| SimError::Config(format!("parse {}: {e}", path.display())))
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.clerks == 0 {
            return Err(SimError::Config("at least one clerk is required".to_string()));
        }
        if !(self.iat_min >= 0.0 && self.iat_max >= self.iat_min) {
            return Err(SimError::Config(format!(
                "invalid inter-arrival range [{}, {}]",
                self.iat_min, self.iat_max
            )));
        }
        if self.service_time.is_nan() || self.service_time < 0.0 {
            return Err(SimError::Config(format!("invalid service time {}", self.service_time)));
        }
        if self.until.is_nan() || self.until < 0.0 {
            return Err(SimError::Config(format!("invalid run length {}", self.until)));
        }
        Ok(())
    }
}

/// 已构建银行的句柄；同时注册到仿真上下文，
/// 顾客据此找到等待队列与柜员。
#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    pub waiting_line: QueueId,
    pub clerks: Vec<ComponentId>,
    pub generator: ComponentId,
}

/// `bank` 程序输出的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankReport {
    pub until: f64,
    pub customers: u64,
    pub waiting_line: QueueStats,
}

fn bank(env: &Environment) -> SimResult<Bank> {
    env.context()
        .get::<Bank>()
        .cloned()
        .ok_or_else(|| SimError::Config("bank is not registered in the context".to_string()))
}

/// 顾客：进入等待队列，唤醒空闲柜员，然后等待服务结束
#[derive(Debug, Default)]
pub struct Customer {
    queued: bool,
}

impl Process for Customer {
    fn step(&mut self, env: &mut Environment, me: ComponentId) -> SimResult<Suspend> {
        if self.queued {
            return Ok(Suspend::Done);
        }
        self.queued = true;
        let bank = bank(env)?;
        env.enter(bank.waiting_line, me)?;
        let idle = bank
            .clerks
            .iter()
            .copied()
            .find(|c| env.component(*c).is_ok_and(|c| c.is_passive()));
        if let Some(clerk) = idle {
            env.activate(clerk, None)?;
        }
        Ok(Suspend::Passivate)
    }
}

/// 柜员：服务队首顾客；队列为空时进入 passive
pub struct Clerk {
    waiting_line: QueueId,
    service: Box<dyn Distribution>,
    serving: Option<ComponentId>,
    served: u64,
}

impl Clerk {
    pub fn new(waiting_line: QueueId, service: impl Distribution + 'static) -> Self {
        Self {
            waiting_line,
            service: Box::new(service),
            serving: None,
            served: 0,
        }
    }

    pub fn served(&self) -> u64 {
        self.served
    }
}

impl Process for Clerk {
    fn step(&mut self, env: &mut Environment, _me: ComponentId) -> SimResult<Suspend> {
        if let Some(customer) = self.serving.take() {
            self.served += 1;
            env.activate(customer, None)?;
        }
        match env.pop(self.waiting_line)? {
            Some(customer) => {
                self.serving = Some(customer);
                Ok(Suspend::hold(self.service.sample()))
            }
            None => Ok(Suspend::Passivate),
        }
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }
}

/// 构建银行模型
///
/// 柜员先于生成器创建，保证同一时刻第一位顾客到达时
/// 空闲柜员已经处于 passive 状态。
pub fn build_bank(
    env: &mut Environment,
    cfg: &BankConfig,
    iat: impl Distribution + 'static,
) -> SimResult<Bank> {
    cfg.validate()?;
    let waiting_line = env.new_queue(Some("waiting line"), cfg.queue_order);
    let mut clerks = Vec::with_capacity(cfg.clerks);
    for i in 0..cfg.clerks {
        let clerk = env.spawn(
            &format!("Clerk.{}", i + 1),
            Clerk::new(waiting_line, Constant(cfg.service_time)),
        )?;
        clerks.push(clerk);
    }
    let generator = env.spawn_generator(ComponentGenerator::new(iat, |env: &mut Environment| {
        let name = env.context_mut().next_name("Customer");
        env.spawn_with(ComponentOptions::named(name), Customer::default())
    }))?;
    let bank = Bank {
        waiting_line,
        clerks,
        generator,
    };
    env.context_mut().add(bank.clone());
    Ok(bank)
}

/// 基于带种子 ChaCha 随机流的 `[min, max]` 均匀分布
#[derive(Debug, Clone)]
pub struct SeededUniform {
    rng: ChaCha8Rng,
    min: f64,
    max: f64,
}

impl SeededUniform {
    pub fn new(seed: u64, min: f64, max: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            min,
            max,
        }
    }
}

impl Distribution for SeededUniform {
    fn sample(&mut self) -> f64 {
        if self.min >= self.max {
            return self.min;
        }
        self.rng.gen_range(self.min..=self.max)
    }
}

/// 按 `cfg` 构建银行、运行并汇总结果
pub fn run_bank(env: &mut Environment, cfg: &BankConfig) -> SimResult<BankReport> {
    let bank = build_bank(env, cfg, SeededUniform::new(cfg.seed, cfg.iat_min, cfg.iat_max))?;
    info!(clerks = cfg.clerks, until = cfg.until, seed = cfg.seed, "🏦 银行模型已构建");
    env.run_until(TickTime(cfg.until))?;
    let customers = env
        .process_ref::<ComponentGenerator>(bank.generator)
        .map_or(0, ComponentGenerator::produced);
    Ok(BankReport {
        until: cfg.until,
        customers,
        waiting_line: env.queue_stats(bank.waiting_line)?,
    })
}
