//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `cosmo/`, `database/`, `fitting/`, `batch/`, `utils/`
//! - 子模块: henry, solvate, fit, turbomole

pub mod fit;
pub mod henry;
pub mod solvate;
pub mod turbomole;

use crate::cli::{Commands, EngineArgs};
use crate::config::EngineConfig;
use crate::database::InchiKeyedDatabase;
use crate::error::{CosmosolvError, Result};
use crate::models::CosmoSpecies;

use std::collections::BTreeMap;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Henry(args) => henry::execute(args),
        Commands::Solvate(args) => solvate::execute(args),
        Commands::Fit(args) => fit::execute(args),
        Commands::Turbomole(args) => turbomole::execute(args),
    }
}

/// 由命令行/环境变量构造引擎配置
fn engine_config(args: &EngineArgs) -> Result<EngineConfig> {
    EngineConfig::new(args.cosmotherm_path.clone(), args.cosmotherm_exe.clone())
}

/// 按 cosmo name 从物种表中取出物种，保持给定顺序
fn select_species(
    db: &InchiKeyedDatabase<CosmoSpecies>,
    names: &[String],
) -> Result<Vec<CosmoSpecies>> {
    names
        .iter()
        .map(|name| {
            db.iter()
                .find(|s| &s.name == name)
                .cloned()
                .ok_or_else(|| CosmosolvError::SpeciesNotFound(name.clone()))
        })
        .collect()
}

/// 将按物种顺序给出的摩尔分数转为映射；未给出时返回 None
fn fractions_map(
    species: &[CosmoSpecies],
    fractions: &[f64],
) -> Result<Option<BTreeMap<String, f64>>> {
    if fractions.is_empty() {
        return Ok(None);
    }
    if fractions.len() != species.len() {
        return Err(CosmosolvError::InvalidArgument(format!(
            "{} mole fraction(s) given for {} species",
            fractions.len(),
            species.len()
        )));
    }
    Ok(Some(
        species
            .iter()
            .zip(fractions)
            .map(|(s, x)| (s.name.clone(), *x))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> InchiKeyedDatabase<CosmoSpecies> {
        InchiKeyedDatabase::new(vec![
            CosmoSpecies::new("h2o", "InChI=1S/H2O/h1H2", "O", 1, "/data/h2o"),
            CosmoSpecies::new(
                "ethanol",
                "InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3",
                "CCO",
                2,
                "/data/ethanol",
            ),
        ])
    }

    #[test]
    fn test_select_species_keeps_order() {
        let names = vec!["ethanol".to_string(), "h2o".to_string()];
        let species = select_species(&db(), &names).unwrap();
        assert_eq!(species[0].name, "ethanol");
        assert_eq!(species[1].name, "h2o");

        let missing = select_species(&db(), &["benzene".to_string()]);
        assert!(matches!(missing, Err(CosmosolvError::SpeciesNotFound(n)) if n == "benzene"));
    }

    #[test]
    fn test_fractions_map() {
        let species: Vec<CosmoSpecies> = db().iter().cloned().collect();
        assert_eq!(fractions_map(&species, &[]).unwrap(), None);

        let map = fractions_map(&species, &[0.9, 0.1]).unwrap().unwrap();
        assert_eq!(map["h2o"], 0.9);
        assert_eq!(map["ethanol"], 0.1);

        assert!(fractions_map(&species, &[1.0]).is_err());
    }
}
