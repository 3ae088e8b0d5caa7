//! # 数据模型模块
//!
//! 定义物种记录与 COSMOtherm 计算结果数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`database/` 和 `commands/` 使用
//! - 子模块: species, output

pub mod output;
pub mod species;

pub use output::{CosmoOutput, OutputKind};
pub use species::{CosmoSpecies, Solute, Solvent};
