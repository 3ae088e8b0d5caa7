//! # fit 子命令 CLI 定义
//!
//! 拟合功能统一入口，包含两个子命令：
//! - `solvent`: 由溶质描述符与 ΔG/ΔH 拟合溶剂参数
//! - `solute`: 由溶剂参数与 ΔG 拟合溶质描述符
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fit.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Fit 主命令
// ─────────────────────────────────────────────────────────────

/// fit 主命令参数
#[derive(Args, Debug)]
pub struct FitArgs {
    #[command(subcommand)]
    pub command: FitCommands,
}

/// fit 子命令
#[derive(Subcommand, Debug)]
pub enum FitCommands {
    /// Fit solvent LSER parameters (e, s, a, b, l, c for dG and dH)
    Solvent(FitSolventArgs),

    /// Fit solute Abraham descriptors (E, S, A, B, L)
    Solute(FitSoluteArgs),
}

// ─────────────────────────────────────────────────────────────
// 溶剂参数拟合
// ─────────────────────────────────────────────────────────────

/// fit solvent 参数
#[derive(Args, Debug)]
pub struct FitSolventArgs {
    /// Solute CSV (smiles, inchi, E, S, A, B, L)
    #[arg(long)]
    pub solute_csv: PathBuf,

    /// Solvation data CSV keyed by solute InChI (inchi, dGsolv, dHsolv) in J/mol
    #[arg(long)]
    pub data_csv: PathBuf,

    /// Temperature in K
    #[arg(long, default_value_t = 298.15)]
    pub temperature: f64,

    /// Write fitted parameters to this CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Parity plot of dGsolv (PNG or SVG by extension)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Parity plot of dHsolv (PNG or SVG by extension)
    #[arg(long)]
    pub plot_enthalpy: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// 溶质描述符拟合
// ─────────────────────────────────────────────────────────────

/// fit solute 参数
#[derive(Args, Debug)]
pub struct FitSoluteArgs {
    /// Solvent CSV (name, smiles, inchi, c_g..l_g, c_h..l_h)
    #[arg(long)]
    pub solvent_csv: PathBuf,

    /// Solvation data CSV keyed by solvent InChI (inchi, dGsolv) in J/mol
    #[arg(long)]
    pub data_csv: PathBuf,

    /// Temperature in K
    #[arg(long, default_value_t = 298.15)]
    pub temperature: f64,

    /// Write fitted descriptors to this CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Parity plot (PNG or SVG by extension)
    #[arg(long)]
    pub plot: Option<PathBuf>,
}
