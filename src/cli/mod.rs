//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `henry`: 运行单个 COSMOtherm 作业（Henry 常数 / Gsolv / 闪点）
//! - `solvate`: 批量计算溶质在溶剂混合物中的 ΔG/ΔH/ΔS
//! - `fit`: LSER 参数拟合（嵌套子命令）
//!   - `solvent`: 拟合溶剂参数
//!   - `solute`: 拟合溶质描述符
//! - `turbomole`: TURBOMOLE COSMO 计算并生成物种条目
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: henry, solvate, fit, turbomole

pub mod fit;
pub mod henry;
pub mod solvate;
pub mod turbomole;

use crate::config::{COSMOTHERM_EXE_ENV, COSMOTHERM_PATH_ENV};
use crate::cosmo::DEFAULT_LEVEL;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cosmosolv - COSMOtherm 溶剂化计算与 LSER 拟合工具
#[derive(Parser)]
#[command(name = "cosmosolv")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "COSMOtherm/TURBOMOLE solvation workflows and LSER parameter fitting",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Run one COSMOtherm job and print Henry/Gsolv/flash-point results
    Henry(henry::HenryArgs),

    /// Compute dGsolv/dHsolv/dSsolv for every species in a solvent mixture
    Solvate(solvate::SolvateArgs),

    /// Fit LSER parameters to solvation data
    Fit(fit::FitArgs),

    /// Run TURBOMOLE COSMO/energy calculations for one molecule
    Turbomole(turbomole::TurbomoleArgs),
}

// ─────────────────────────────────────────────────────────────
// 共用的 COSMOtherm 引擎参数
// ─────────────────────────────────────────────────────────────

/// COSMOtherm 安装与参数化
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// COSMOtherm installation directory
    #[arg(long, env = COSMOTHERM_PATH_ENV)]
    pub cosmotherm_path: Option<PathBuf>,

    /// COSMOtherm executable
    #[arg(long, env = COSMOTHERM_EXE_ENV)]
    pub cosmotherm_exe: Option<PathBuf>,

    /// COSMOtherm parameterization (without .ctd)
    #[arg(long, default_value = DEFAULT_LEVEL)]
    pub level: String,
}
