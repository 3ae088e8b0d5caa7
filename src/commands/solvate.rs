//! # solvate 子命令实现
//!
//! 对物种表中的每个溶质运行三温度 COSMOtherm 作业，写出 ΔG/ΔH/ΔS 数据表。
//!
//! ## 依赖关系
//! - 使用 `cli/solvate.rs` 定义的参数
//! - 使用 `batch/driver.rs`, `database/`
//! - 使用 `utils/output.rs`

use super::{engine_config, fractions_map, select_species};
use crate::batch::{compute_solvation_thermo, SoluteOutcome, SolventMixture, ThermoSettings};
use crate::cli::solvate::SolvateArgs;
use crate::cosmo::CosmothermEngine;
use crate::database::{load_species_csv, write_solvation_data_csv};
use crate::error::Result;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 结果表格行
#[derive(Debug, Clone, Tabled)]
struct ThermoRow {
    #[tabled(rename = "Species")]
    name: String,
    #[tabled(rename = "ΔG (kJ/mol)")]
    dgsolv: String,
    #[tabled(rename = "ΔH (kJ/mol)")]
    dhsolv: String,
    #[tabled(rename = "ΔS (J/mol/K)")]
    dssolv: String,
}

/// 执行 solvate 命令
pub fn execute(args: SolvateArgs) -> Result<()> {
    output::print_header("Solvation Thermochemistry");

    let config = engine_config(&args.engine)?;
    let solutes = load_species_csv(&args.species_csv)?;
    let solvent_db = match &args.solvent_csv {
        Some(path) => load_species_csv(path)?,
        None => solutes.clone(),
    };

    let solvent_species = select_species(&solvent_db, &args.solvent)?;
    let fractions = fractions_map(&solvent_species, &args.fractions)?;
    let mixture = SolventMixture::new(solvent_species, fractions)?;

    let solvent_names: Vec<&str> = mixture.species().iter().map(|s| s.name.as_str()).collect();
    output::print_info(&format!(
        "{} solute(s) in {} at {} K (dT = {} K)",
        solutes.len(),
        solvent_names.join(" + "),
        args.temperature,
        args.delta_t
    ));

    let settings = ThermoSettings {
        temperature: args.temperature,
        delta_t: args.delta_t,
        level: args.engine.level.clone(),
        work_dir: args.work_dir.clone(),
    };
    let engine = CosmothermEngine::new(config);
    let report = compute_solvation_thermo(&solutes, &mixture, &settings, &engine)?;

    let rows: Vec<ThermoRow> = report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            SoluteOutcome::Computed {
                name,
                dgsolv,
                dhsolv,
                dssolv,
                ..
            } => Some(ThermoRow {
                name: name.clone(),
                dgsolv: format!("{:.3}", dgsolv / 1000.0),
                dhsolv: format!("{:.3}", dhsolv / 1000.0),
                dssolv: format!("{:.2}", dssolv),
            }),
            SoluteOutcome::Failed { .. } => None,
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }

    for (inchi, reason) in report.failures() {
        output::print_warning(&format!("{}: {}", inchi, reason));
    }

    write_solvation_data_csv(&args.output_csv, &report.rows())?;
    output::print_success(&format!(
        "Solvation data saved to '{}'",
        args.output_csv.display()
    ));

    output::print_separator();
    output::print_done(&format!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failures().len()
    ));
    Ok(())
}
