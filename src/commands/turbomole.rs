//! # turbomole 子命令实现
//!
//! 运行 TURBOMOLE `calculate`，整理输出文件，并可将结果追加到物种表。
//!
//! ## 依赖关系
//! - 使用 `cli/turbomole.rs` 定义的参数
//! - 使用 `turbomole/`, `database/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::turbomole::TurbomoleArgs;
use crate::database::{append_species_csv, InchiResolver, ObabelResolver};
use crate::error::{CosmosolvError, Result};
use crate::turbomole::TurbomoleJob;
use crate::utils::{output, progress};

/// 执行 turbomole 命令
pub fn execute(args: TurbomoleArgs) -> Result<()> {
    output::print_header("TURBOMOLE COSMO Calculation");

    let job = TurbomoleJob::from_xyz_file(
        args.name.as_str(),
        &args.xyz,
        args.charge,
        args.multiplicity,
        &args.work_dir,
    )?
    .with_levels(args.cosmo_level.as_str(), args.energy_level.as_str());

    output::print_info(&format!(
        "{}: {} atoms, charge {}, multiplicity {}",
        job.name(),
        job.num_atoms(),
        args.charge,
        args.multiplicity
    ));

    let spinner = progress::create_spinner(&format!("Running calculate for {}", job.name()));
    let result = job.execute(&args.calculate);
    spinner.finish_and_clear();
    result?;

    output::print_conversion(
        &format!("{}.xyz", job.name()),
        &job.cosmo_file().display().to_string(),
    );
    output::print_conversion(
        &format!("{}.xyz", job.name()),
        &job.energy_file().display().to_string(),
    );

    let smiles = args.smiles.clone().unwrap_or_default();
    let inchi = match (&args.inchi, &args.smiles) {
        (Some(inchi), _) => Some(inchi.clone()),
        (None, Some(smiles)) => {
            let resolver = ObabelResolver::new(args.obabel.as_str());
            Some(resolver.smiles_to_inchi(smiles)?)
        }
        (None, None) => None,
    };

    if let Some(path) = &args.species_csv {
        let inchi = inchi.ok_or_else(|| {
            CosmosolvError::InvalidArgument(
                "--species-csv needs --inchi or --smiles to key the species".to_string(),
            )
        })?;
        let species = job.to_species(inchi, smiles);
        append_species_csv(path, &species)?;
        output::print_success(&format!(
            "Appended {} to '{}'",
            species.name,
            path.display()
        ));
    } else if let Some(inchi) = inchi {
        output::print_info(&format!("InChI: {}", inchi));
    }

    output::print_done(job.name());
    Ok(())
}
