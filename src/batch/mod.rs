//! # 批量处理模块
//!
//! 对溶质数据库逐个运行 COSMOtherm 作业并汇总溶剂化热力学量。
//!
//! ## 功能
//! - 溶质 + 溶剂混合物的三温度作业
//! - 中心差分估计 ΔS 与 ΔH
//! - 单项失败跳过、致命错误中止
//! - 进度反馈与失败汇总
//!
//! ## 依赖关系
//! - 被 `commands/solvate.rs` 使用
//! - 使用 `indicatif` 显示进度

pub mod driver;

pub use driver::{compute_solvation_thermo, SoluteOutcome, SolventMixture, ThermoSettings};
