//! # turbomole 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/turbomole.rs`

use crate::turbomole::{DEFAULT_COSMO_LEVEL, DEFAULT_ENERGY_LEVEL};

use clap::Args;
use std::path::PathBuf;

/// turbomole 子命令参数
#[derive(Args, Debug)]
pub struct TurbomoleArgs {
    /// Molecule name (used for all file names)
    #[arg(long)]
    pub name: String,

    /// Input geometry (.xyz, single conformer)
    #[arg(long)]
    pub xyz: PathBuf,

    /// Total charge
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub charge: i32,

    /// Spin multiplicity
    #[arg(long, default_value_t = 1)]
    pub multiplicity: u32,

    /// Working directory for the calculation
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// TURBOMOLE `calculate` executable
    #[arg(long, default_value = "calculate")]
    pub calculate: PathBuf,

    /// COSMO single-point level
    #[arg(long, default_value = DEFAULT_COSMO_LEVEL)]
    pub cosmo_level: String,

    /// Gas-phase energy level
    #[arg(long, default_value = DEFAULT_ENERGY_LEVEL)]
    pub energy_level: String,

    /// SMILES of the molecule
    #[arg(long)]
    pub smiles: Option<String>,

    /// InChI of the molecule (derived from --smiles via Open Babel when omitted)
    #[arg(long)]
    pub inchi: Option<String>,

    /// Open Babel executable used for SMILES -> InChI
    #[arg(long, default_value = "obabel")]
    pub obabel: String,

    /// Append the resulting species row to this CSV file
    #[arg(long)]
    pub species_csv: Option<PathBuf>,
}
