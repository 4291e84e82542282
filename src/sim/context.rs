//! 仿真上下文
//!
//! 每个环境独有的类型化依赖注册表与自动命名计数器。

use std::any::{Any, TypeId};
use std::collections::HashMap;

#[derive(Default)]
pub struct SimContext {
    registry: HashMap<TypeId, Box<dyn Any>>,
    name_counters: HashMap<String, u64>,
}

impl SimContext {
    /// 注册 `value` 作为其类型的唯一实例，覆盖已有实例
    pub fn add<T: Any>(&mut self, value: T) -> Option<T> {
        self.registry
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// 若该类型尚未注册，则注册 `factory` 产出的值
    pub fn add_with<T: Any>(&mut self, factory: impl FnOnce() -> T) -> &mut T {
        self.registry
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(factory()))
            .downcast_mut::<T>()
            .expect("registry entry keyed by its own TypeId")
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.registry.get(&TypeId::of::<T>())?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.registry.get_mut(&TypeId::of::<T>())?.downcast_mut()
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.registry.contains_key(&TypeId::of::<T>())
    }

    /// 为 `prefix` 生成下一个自动名称：`"{prefix}.1"`、`"{prefix}.2"` 依次递增
    pub fn next_name(&mut self, prefix: &str) -> String {
        let n = self.name_counters.entry(prefix.to_string()).or_insert(0);
        *n += 1;
        format!("{prefix}.{n}")
    }
}
