//! # 工具函数模块
//!
//! 提供美化输出、进度条、日志初始化与拟合对比图等工具。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `batch/`, `commands/` 模块使用
//! - 子模块: logging, output, plot, progress

pub mod logging;
pub mod output;
pub mod plot;
pub mod progress;
