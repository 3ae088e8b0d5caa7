//! # henry 子命令实现
//!
//! 运行单个 COSMOtherm 作业并输出 Henry 常数、活度系数、蒸气压、
//! Gsolv 以及闪点结果。
//!
//! ## 依赖关系
//! - 使用 `cli/henry.rs` 定义的参数
//! - 使用 `cosmo/`, `database/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use super::{engine_config, fractions_map, select_species};
use crate::cli::henry::HenryArgs;
use crate::cosmo::{CosmoJob, CosmothermEngine};
use crate::database::load_species_csv;
use crate::error::{CosmosolvError, Result};
use crate::models::CosmoOutput;
use crate::utils::{output, progress};

use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// 终端表格行
#[derive(Debug, Clone, Tabled)]
struct HenryRow {
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "x")]
    fraction: String,
    #[tabled(rename = "H (Pa)")]
    henry: String,
    #[tabled(rename = "ln γ")]
    ln_gamma: String,
    #[tabled(rename = "Pvap (Pa)")]
    pvap: String,
    #[tabled(rename = "Gsolv (J/mol)")]
    gsolv: String,
}

/// CSV 输出行
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    temperature: Option<f64>,
    species: &'a str,
    mole_fraction: Option<f64>,
    henry_pa: Option<f64>,
    ln_gamma: Option<f64>,
    vapor_pressure_pa: Option<f64>,
    gsolv_j_mol: Option<f64>,
    flash_point_k: Option<f64>,
    saturation_pressure_pa: Option<f64>,
}

/// 执行 henry 命令
pub fn execute(args: HenryArgs) -> Result<()> {
    output::print_header("COSMOtherm Job");

    let config = engine_config(&args.engine)?;
    let db = load_species_csv(&args.species_csv)?;
    output::print_info(&format!(
        "Loaded {} species from '{}'",
        db.len(),
        args.species_csv.display()
    ));

    let species = select_species(&db, &args.species)?;
    let fractions = fractions_map(&species, &args.fractions)?;

    let mut job = CosmoJob::new(
        species,
        fractions,
        &args.outputs,
        args.temperatures.clone(),
        &args.prefix,
        args.engine.level.as_str(),
    )?;

    let engine = CosmothermEngine::new(config);
    let spinner = progress::create_spinner(&format!("Running {}", job.prefix().display()));
    let result = job.run(&engine);
    spinner.finish_and_clear();
    let results = result?;

    if results.is_empty() {
        return Err(CosmosolvError::UnexpectedResults {
            species: args.species.join(","),
            reason: "COSMOtherm output contained no recognised blocks".to_string(),
        });
    }

    for result in results {
        print_result(result);
    }

    if let Some(path) = &args.output_csv {
        save_results_csv(results, path)?;
        output::print_success(&format!("Results saved to '{}'", path.display()));
    }

    output::print_done(&format!("{} result block(s)", results.len()));
    Ok(())
}

fn fmt_value(map: &Option<std::collections::BTreeMap<String, f64>>, key: &str) -> String {
    map.as_ref()
        .and_then(|m| m.get(key))
        .map(|v| format!("{:.6e}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_result(result: &CosmoOutput) {
    if result.is_flash_point() {
        output::print_header("Flash Point");
        if let Some(t) = result.flash_point {
            output::print_info(&format!("T_flash = {:.2} K", t));
        }
        if let Some(p) = result.saturation_pressure {
            output::print_info(&format!("P_sat   = {:.2} Pa", p));
        }
        return;
    }

    let title = match result.temperature {
        Some(t) => format!("Henry Law Coefficients at {} K", t),
        None => "Henry Law Coefficients".to_string(),
    };
    output::print_header(&title);

    let rows: Vec<HenryRow> = result
        .mole_fractions
        .iter()
        .filter(|(name, _)| result.henry.as_ref().map_or(false, |h| h.contains_key(*name)))
        .map(|(name, x)| HenryRow {
            species: name.clone(),
            fraction: format!("{:.4}", x),
            henry: fmt_value(&result.henry, name),
            ln_gamma: fmt_value(&result.ln_gamma, name),
            pvap: fmt_value(&result.vapor_pressure, name),
            gsolv: result
                .gsolv_of(name)
                .map(|g| format!("{:.1}", g))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!("{}", Table::new(&rows));
}

/// 保存结果到 CSV
fn save_results_csv(results: &[CosmoOutput], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for result in results {
        if result.is_flash_point() {
            wtr.serialize(ResultRecord {
                temperature: None,
                species: "",
                mole_fraction: None,
                henry_pa: None,
                ln_gamma: None,
                vapor_pressure_pa: None,
                gsolv_j_mol: None,
                flash_point_k: result.flash_point,
                saturation_pressure_pa: result.saturation_pressure,
            })?;
            continue;
        }

        for (name, x) in &result.mole_fractions {
            let get = |m: &Option<std::collections::BTreeMap<String, f64>>| {
                m.as_ref().and_then(|m| m.get(name)).copied()
            };
            wtr.serialize(ResultRecord {
                temperature: result.temperature,
                species: name,
                mole_fraction: Some(*x),
                henry_pa: get(&result.henry),
                ln_gamma: get(&result.ln_gamma),
                vapor_pressure_pa: get(&result.vapor_pressure),
                gsolv_j_mol: get(&result.gsolv),
                flash_point_k: None,
                saturation_pressure_pa: None,
            })?;
        }
    }

    wtr.flush().map_err(|e| CosmosolvError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
