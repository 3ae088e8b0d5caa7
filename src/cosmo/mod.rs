//! # COSMOtherm 作业封装
//!
//! 生成输入文件、调用外部引擎、解析表格输出。
//!
//! ## 依赖关系
//! - 被 `batch/` 和 `commands/` 使用
//! - 使用 `parsers/cosmo_tab.rs`, `models/`, `config.rs`
//! - 子模块: engine, job, scratch

pub mod engine;
pub mod job;
pub mod scratch;

pub use engine::{CosmothermEngine, EngineRunner};
pub use job::{CosmoJob, DEFAULT_LEVEL};
