//! # 解析器模块
//!
//! 外部程序输出格式的解析器。
//!
//! ## 依赖关系
//! - 被 `cosmo/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: cosmo_tab

pub mod cosmo_tab;
