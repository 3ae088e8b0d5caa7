//! # solvate 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/solvate.rs`

use super::EngineArgs;

use clap::Args;
use std::path::PathBuf;

/// solvate 子命令参数
#[derive(Args, Debug)]
pub struct SolvateArgs {
    /// Species CSV holding the solutes
    #[arg(long)]
    pub species_csv: PathBuf,

    /// Species CSV holding the solvents (defaults to --species-csv)
    #[arg(long)]
    pub solvent_csv: Option<PathBuf>,

    /// Solvent species, by cosmo name (comma-separated)
    #[arg(long, required = true, value_delimiter = ',')]
    pub solvent: Vec<String>,

    /// Solvent mole fractions in --solvent order; optional for a pure solvent
    #[arg(long, value_delimiter = ',')]
    pub fractions: Vec<f64>,

    /// Temperature in K
    #[arg(long, default_value_t = 298.15)]
    pub temperature: f64,

    /// Temperature step for the finite-difference entropy, in K
    #[arg(long, default_value_t = 5.0)]
    pub delta_t: f64,

    /// Directory for COSMOtherm job files
    #[arg(long, default_value = "solvation_jobs")]
    pub work_dir: PathBuf,

    /// Output CSV (inchi, dGsolv, dHsolv, dSsolv)
    #[arg(long, default_value = "solvation_data.csv")]
    pub output_csv: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}
