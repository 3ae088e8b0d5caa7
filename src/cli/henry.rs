//! # henry 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/henry.rs`

use super::EngineArgs;
use crate::models::OutputKind;

use clap::Args;
use std::path::PathBuf;

/// henry 子命令参数
#[derive(Args, Debug)]
pub struct HenryArgs {
    /// Species CSV (cosmo name, inchi, smiles, number of conformers, file path)
    #[arg(long)]
    pub species_csv: PathBuf,

    /// Species to include, by cosmo name (comma-separated)
    #[arg(long, required = true, value_delimiter = ',')]
    pub species: Vec<String>,

    /// Mole fractions in species order; optional for a single species
    #[arg(long, value_delimiter = ',')]
    pub fractions: Vec<f64>,

    /// Requested outputs: gsolv, henry, flashpoint
    #[arg(long, value_delimiter = ',', default_value = "gsolv")]
    pub outputs: Vec<OutputKind>,

    /// Temperatures in K for Henry/Gsolv outputs
    #[arg(long, value_delimiter = ',', default_value = "298.15")]
    pub temperatures: Vec<f64>,

    /// Path prefix for the COSMOtherm input/output files
    #[arg(long, default_value = "cosmo_job/job")]
    pub prefix: PathBuf,

    /// Write per-species results to this CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}
