//! # LSER 回归拟合
//!
//! 三种策略（线性回归 LR、最小二乘细化 LS、模拟退火 DA）拟合同一线性模型，
//! 取平均绝对残差最小者。
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs` 使用
//! - 使用 `nalgebra`, `levenberg-marquardt`, `rand`
//! - 子模块: linear, lser

pub mod linear;
pub mod lser;

pub use lser::{fit_solute_parameters, fit_solvent_parameters, Parity};
