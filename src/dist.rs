//! 采样分布
//!
//! 生成器与模型使用的采样接口。具体的概率分布由模型提供，
//! 任何能按需产出 `f64` 的类型都可以（包括捕获了带种子 RNG 的闭包）。

/// 实数样本来源
pub trait Distribution {
    fn sample(&mut self) -> f64;
}

impl<F: FnMut() -> f64> Distribution for F {
    fn sample(&mut self) -> f64 {
        self()
    }
}

/// 常量分布：总是返回同一个值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Distribution for Constant {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

/// 循环回放一组固定的值
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    values: Vec<f64>,
    next: usize,
}

impl Cycle {
    /// `values` 为空时 panic
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values.into();
        assert!(!values.is_empty(), "Cycle needs at least one value");
        Self { values, next: 0 }
    }
}

impl Distribution for Cycle {
    fn sample(&mut self) -> f64 {
        let v = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        v
    }
}
