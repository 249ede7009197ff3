//! 运行时装配
//!
//! 根据配置创建各协作方并组装任务执行器。

pub mod startup;

pub use startup::{StartupContext, prepare_startup};
