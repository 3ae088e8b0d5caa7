//! # fit 子命令实现
//!
//! 拟合 LSER 溶剂参数或溶质描述符，输出参数表、误差与可选的对比图。
//!
//! ## 依赖关系
//! - 使用 `cli/fit.rs` 定义的参数
//! - 使用 `fitting/`, `database/`
//! - 使用 `utils/output.rs`, `utils/plot.rs`

use crate::cli::fit::{FitArgs, FitCommands, FitSoluteArgs, FitSolventArgs};
use crate::database::{
    load_solutes_csv, load_solvation_data_csv, load_solvents_csv, SolvationData,
};
use crate::error::{CosmosolvError, Result};
use crate::fitting::{fit_solute_parameters, fit_solvent_parameters};
use crate::utils::{output, plot};

use std::path::Path;
use tabled::{Table, Tabled};

/// 参数表格行
#[derive(Debug, Clone, Tabled)]
struct ParameterRow {
    #[tabled(rename = "Parameter")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// 执行 fit 命令
pub fn execute(args: FitArgs) -> Result<()> {
    match args.command {
        FitCommands::Solvent(args) => fit_solvent(args),
        FitCommands::Solute(args) => fit_solute(args),
    }
}

fn fit_solvent(args: FitSolventArgs) -> Result<()> {
    output::print_header("Solvent LSER Fit");

    let solutes = load_solutes_csv(&args.solute_csv)?;
    let data = load_solvation_data_csv(&args.data_csv)?;
    ensure_data(&data, &args.data_csv)?;
    output::print_info(&format!(
        "{} solutes in database, {} data points",
        solutes.len(),
        data.len()
    ));

    let fit = fit_solvent_parameters(&solutes, &data.dgsolv, &data.dhsolv, args.temperature)?;
    let params = fit.params.named();
    print_parameters(&params);

    output::print_metric("MAE dGsolv", fit.mae_dgsolv, "J/mol", &fit.gibbs_method.to_string());
    output::print_metric("MAE dHsolv", fit.mae_dhsolv, "J/mol", &fit.enthalpy_method.to_string());

    if let Some(path) = &args.output_csv {
        save_parameters_csv(&params, path)?;
        output::print_success(&format!("Parameters saved to '{}'", path.display()));
    }

    if let Some(path) = &args.plot {
        plot::generate_parity_plot(&fit.gibbs_parity, path, "Solvation free energy")?;
        output::print_success(&format!("Parity plot saved to '{}'", path.display()));
    }

    if let Some(path) = &args.plot_enthalpy {
        plot::generate_parity_plot(&fit.enthalpy_parity, path, "Solvation enthalpy")?;
        output::print_success(&format!("Enthalpy parity plot saved to '{}'", path.display()));
    }

    Ok(())
}

fn fit_solute(args: FitSoluteArgs) -> Result<()> {
    output::print_header("Solute LSER Fit");

    let solvents = load_solvents_csv(&args.solvent_csv)?;
    let data = load_solvation_data_csv(&args.data_csv)?;
    ensure_data(&data, &args.data_csv)?;
    output::print_info(&format!(
        "{} solvents in database, {} data points",
        solvents.len(),
        data.len()
    ));

    let fit = fit_solute_parameters(&solvents, &data.dgsolv, args.temperature)?;
    if fit.samples < data.len() {
        output::print_skip(&format!(
            "{} solvent(s) without c_g excluded",
            data.len() - fit.samples
        ));
    }

    let params = fit.params.named();
    print_parameters(&params);
    output::print_metric(
        "MAE dGsolv",
        fit.mae_dgsolv,
        "J/mol",
        &format!("{}, {} solvents", fit.method, fit.samples),
    );

    if let Some(path) = &args.output_csv {
        save_parameters_csv(&params, path)?;
        output::print_success(&format!("Descriptors saved to '{}'", path.display()));
    }

    if let Some(path) = &args.plot {
        plot::generate_parity_plot(&fit.parity, path, "Solute descriptor fit")?;
        output::print_success(&format!("Parity plot saved to '{}'", path.display()));
    }

    Ok(())
}

/// 空数据表无法拟合
fn ensure_data(data: &SolvationData, path: &Path) -> Result<()> {
    if data.is_empty() {
        return Err(CosmosolvError::FitError(format!(
            "no solvation data rows in '{}'",
            path.display()
        )));
    }
    Ok(())
}

fn print_parameters(params: &[(&str, f64)]) {
    let rows: Vec<ParameterRow> = params
        .iter()
        .map(|(name, value)| ParameterRow {
            name: name.to_string(),
            value: format!("{:.4}", value),
        })
        .collect();
    println!("{}", Table::new(&rows));
}

/// 保存参数到 CSV
fn save_parameters_csv(params: &[(&str, f64)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(["parameter", "value"])?;
    for (name, value) in params {
        wtr.write_record([name.to_string(), format!("{:.10}", value)])?;
    }
    wtr.flush().map_err(|e| CosmosolvError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_ensure_data() {
        let path = Path::new("data.csv");
        let err = ensure_data(&SolvationData::default(), path).unwrap_err();
        assert!(matches!(err, CosmosolvError::FitError(ref m) if m.contains("data.csv")));

        let data = SolvationData {
            dgsolv: BTreeMap::from([("InChI=1S/H2O/h1H2".to_string(), -26000.0)]),
            dhsolv: BTreeMap::new(),
        };
        assert!(ensure_data(&data, path).is_ok());
    }
}
