//! 可序列化的统计摘要

use serde::{Deserialize, Serialize};

/// 数值监视器某个分桶的时间加权摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub duration: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub standard_deviation: Option<f64>,
}

impl LevelSummary {
    /// 由权重为正的 `(value, weight)` 区段构建摘要
    pub(crate) fn from_segments(segments: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut duration = 0.0;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        for (v, w) in segments {
            duration += w;
            sum += v * w;
            sum_sq += v * v * w;
            min = Some(min.map_or(v, |m| m.min(v)));
            max = Some(max.map_or(v, |m| m.max(v)));
        }
        if duration <= 0.0 {
            return Self::default();
        }
        let mean = sum / duration;
        let var = (sum_sq / duration - mean * mean).max(0.0);
        Self {
            duration,
            min,
            max,
            mean: Some(mean),
            standard_deviation: Some(var.sqrt()),
        }
    }
}

/// 数值监视器的 `all` 与 `excl_zeros` 分桶
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    pub all: LevelSummary,
    pub excl_zeros: LevelSummary,
}

/// 逐样本监视器某个分桶的摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TallySummary {
    pub entries: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// 样本标准差（分母为 n - 1）
    pub standard_deviation: Option<f64>,
}

impl TallySummary {
    pub(crate) fn from_values<'a>(values: impl Iterator<Item = &'a f64>) -> Self {
        let values: Vec<f64> = values.copied().collect();
        let entries = values.len();
        if entries == 0 {
            return Self::default();
        }
        let n = entries as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sd = if entries > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Self {
            entries,
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
            mean: Some(mean),
            standard_deviation: Some(sd),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TallyStats {
    pub all: TallySummary,
    pub excl_zeros: TallySummary,
}
