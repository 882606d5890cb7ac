//! 插件注册模块：按配置选择并构造缓存存储后端。
//!
//! A [`PluginRegistry`] maps plugin ids to store constructors. It is built at
//! setup time and passed in explicitly, so independently configured caches can
//! live in one process.

mod registry;

pub use registry::{PluginRegistry, StoreFactory};
