//! 组件生成器
//!
//! 按采样得到的到达间隔不断创建新组件。

use std::any::Any;

use tracing::debug;

use super::id::ComponentId;
use super::process::{Process, Suspend};
use crate::dist::Distribution;
use crate::error::{SimError, SimResult};
use crate::sim::{Environment, TickTime};

pub type Builder = Box<dyn FnMut(&mut Environment) -> SimResult<ComponentId>>;

pub struct ComponentGenerator {
    pub(crate) from: TickTime,
    till: TickTime,
    total: Option<u64>,
    produced: u64,
    iat: Box<dyn Distribution>,
    builder: Builder,
    last: Option<ComponentId>,
}

impl ComponentGenerator {
    pub fn new(
        iat: impl Distribution + 'static,
        builder: impl FnMut(&mut Environment) -> SimResult<ComponentId> + 'static,
    ) -> Self {
        Self {
            from: TickTime::ZERO,
            till: TickTime::MAX,
            total: None,
            produced: 0,
            iat: Box::new(iat),
            builder: Box::new(builder),
            last: None,
        }
    }

    /// 首次到达时间
    pub fn from(mut self, from: TickTime) -> Self {
        self.from = from;
        self
    }

    /// `till` 之后不再产生到达
    pub fn till(mut self, till: TickTime) -> Self {
        self.till = till;
        self
    }

    /// 创建 `total` 个组件后停止
    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }

    pub fn last_produced(&self) -> Option<ComponentId> {
        self.last
    }
}

impl Process for ComponentGenerator {
    fn step(&mut self, env: &mut Environment, me: ComponentId) -> SimResult<Suspend> {
        if self.total == Some(0) {
            return Ok(Suspend::Done);
        }
        let built = (self.builder)(env)?;
        self.produced += 1;
        self.last = Some(built);
        debug!(produced = self.produced, now = %env.now(), "已生成组件");

        if self.total.is_some_and(|t| self.produced >= t) {
            return Ok(Suspend::Done);
        }

        let gap = self.iat.sample();
        if gap.is_nan() || gap < 0.0 {
            return Err(SimError::InvalidDuration {
                entity: env.component(me)?.name().to_string(),
                duration: gap,
                time: env.now(),
            });
        }
        if env.now() + gap > self.till {
            env.log_event(Some(me), "till reached", None)?;
            return Ok(Suspend::Done);
        }
        Ok(Suspend::hold(gap))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}
