//! 逐样本数值监视器

use super::summary::{TallyStats, TallySummary};

/// 收集单个观测值（如停留时长、等待时间）
#[derive(Debug, Clone)]
pub struct TallyMonitor {
    enabled: bool,
    values: Vec<f64>,
}

impl Default for TallyMonitor {
    fn default() -> Self {
        Self {
            enabled: true,
            values: Vec::new(),
        }
    }
}

impl TallyMonitor {
    pub fn add(&mut self, value: f64) {
        if self.enabled {
            self.values.push(value);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn stats(&self) -> TallyStats {
        TallyStats {
            all: TallySummary::from_values(self.values.iter()),
            excl_zeros: TallySummary::from_values(self.values.iter().filter(|v| **v != 0.0)),
        }
    }
}
