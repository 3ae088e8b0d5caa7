//! # 溶剂化热力学批量计算
//!
//! 对数据库中的每个溶质，与固定溶剂混合物组成 COSMOtherm 作业，
//! 在 T−dT, T, T+dT 三个温度下计算 Gsolv，再由中心差分估计：
//! - ΔG = G(T)
//! - ΔS = −(G(T+dT) − G(T−dT)) / (2·dT)
//! - ΔH = ΔG + T·ΔS
//!
//! 单个溶质失败时记录并跳过；配置错误（缺少可执行文件等）中止整个批次。
//!
//! ## 依赖关系
//! - 被 `commands/solvate.rs` 调用
//! - 使用 `cosmo/`, `database/`
//! - 使用 `utils/progress.rs` 创建进度条

use crate::cosmo::{CosmoJob, EngineRunner, DEFAULT_LEVEL};
use crate::database::{InchiKeyedDatabase, SolvationRow};
use crate::error::{CosmosolvError, Result};
use crate::models::{CosmoSpecies, OutputKind};
use crate::utils::progress;

use std::collections::BTreeMap;
use std::path::PathBuf;

/// 溶剂混合物（单一溶剂时摩尔分数默认为 1.0）
#[derive(Debug, Clone)]
pub struct SolventMixture {
    species: Vec<CosmoSpecies>,
    fractions: BTreeMap<String, f64>,
}

impl SolventMixture {
    pub fn new(
        species: Vec<CosmoSpecies>,
        fractions: Option<BTreeMap<String, f64>>,
    ) -> Result<Self> {
        if species.is_empty() {
            return Err(CosmosolvError::InvalidArgument(
                "solvent mixture is empty".to_string(),
            ));
        }
        let fractions = match fractions {
            Some(f) => {
                if let Some(missing) = species.iter().find(|s| !f.contains_key(&s.name)) {
                    return Err(CosmosolvError::MoleFractionMissing {
                        species: missing.name.clone(),
                    });
                }
                f
            }
            None if species.len() == 1 => BTreeMap::from([(species[0].name.clone(), 1.0)]),
            None => return Err(CosmosolvError::MissingMoleFractions),
        };
        Ok(SolventMixture { species, fractions })
    }

    pub fn species(&self) -> &[CosmoSpecies] {
        &self.species
    }

    /// 溶质与混合物组成的物种列表与摩尔分数
    ///
    /// 溶质不在混合物中时以 x = 0（无限稀释）加入列表首位。
    fn with_solute(&self, solute: &CosmoSpecies) -> (Vec<CosmoSpecies>, BTreeMap<String, f64>) {
        if self.species.iter().any(|s| s.name == solute.name) {
            return (self.species.clone(), self.fractions.clone());
        }
        let mut species = Vec::with_capacity(self.species.len() + 1);
        species.push(solute.clone());
        species.extend(self.species.iter().cloned());
        let mut fractions = self.fractions.clone();
        fractions.insert(solute.name.clone(), 0.0);
        (species, fractions)
    }
}

/// 批量计算设置
#[derive(Debug, Clone)]
pub struct ThermoSettings {
    /// 温度 (K)
    pub temperature: f64,
    /// 差分步长 (K)
    pub delta_t: f64,
    /// COSMOtherm 参数化
    pub level: String,
    /// 作业文件目录
    pub work_dir: PathBuf,
}

impl Default for ThermoSettings {
    fn default() -> Self {
        ThermoSettings {
            temperature: 298.15,
            delta_t: 5.0,
            level: DEFAULT_LEVEL.to_string(),
            work_dir: PathBuf::from("."),
        }
    }
}

impl ThermoSettings {
    fn temperatures(&self) -> Vec<f64> {
        vec![
            self.temperature - self.delta_t,
            self.temperature,
            self.temperature + self.delta_t,
        ]
    }
}

/// 单个溶质的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum SoluteOutcome {
    /// 计算成功（J/mol, J/mol/K）
    Computed {
        inchi: String,
        name: String,
        dgsolv: f64,
        dhsolv: f64,
        dssolv: f64,
    },
    /// 计算失败
    Failed { inchi: String, reason: String },
}

/// 批量计算结果
#[derive(Debug, Default)]
pub struct SolvationReport {
    pub outcomes: Vec<SoluteOutcome>,
}

impl SolvationReport {
    /// 失败的 (InChI, 原因)
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SoluteOutcome::Failed { inchi, reason } => Some((inchi.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn succeeded(&self) -> usize {
        self.computed().count()
    }

    /// 转为溶剂化数据表的行
    pub fn rows(&self) -> Vec<SolvationRow> {
        self.computed()
            .map(|(inchi, dg, dh, ds)| SolvationRow {
                inchi: inchi.to_string(),
                dgsolv: dg,
                dhsolv: Some(dh),
                dssolv: Some(ds),
            })
            .collect()
    }

    fn computed(&self) -> impl Iterator<Item = (&str, f64, f64, f64)> {
        self.outcomes.iter().filter_map(|o| match o {
            SoluteOutcome::Computed {
                inchi,
                dgsolv,
                dhsolv,
                dssolv,
                ..
            } => Some((inchi.as_str(), *dgsolv, *dhsolv, *dssolv)),
            SoluteOutcome::Failed { .. } => None,
        })
    }
}

/// 对一个溶质运行三温度作业，返回 (ΔG, ΔH, ΔS)
fn solvation_thermo(
    solute: &CosmoSpecies,
    mixture: &SolventMixture,
    settings: &ThermoSettings,
    engine: &dyn EngineRunner,
) -> Result<(f64, f64, f64)> {
    let (species, fractions) = mixture.with_solute(solute);
    let mut job = CosmoJob::new(
        species,
        Some(fractions),
        &[OutputKind::GsolvHenry],
        settings.temperatures(),
        settings.work_dir.join(&solute.name),
        settings.level.as_str(),
    )?;

    let results = job.run(engine)?;
    if results.len() != 3 {
        return Err(CosmosolvError::UnexpectedResults {
            species: solute.name.clone(),
            reason: format!("expected 3 Henry blocks, found {}", results.len()),
        });
    }

    let mut g = [0.0; 3];
    for (slot, output) in g.iter_mut().zip(results) {
        *slot = output
            .gsolv_of(&solute.name)
            .ok_or_else(|| CosmosolvError::UnexpectedResults {
                species: solute.name.clone(),
                reason: "no Gsolv column in the COSMOtherm output".to_string(),
            })?;
    }

    let t = settings.temperature;
    let dg = g[1];
    let ds = -(g[2] - g[0]) / (2.0 * settings.delta_t);
    let dh = dg + t * ds;
    Ok((dg, dh, ds))
}

/// 批量计算数据库中全部溶质的 ΔG/ΔH/ΔS
///
/// 返回 `Err` 仅当遇到致命错误（见 [`CosmosolvError::is_fatal`]）。
pub fn compute_solvation_thermo(
    solutes: &InchiKeyedDatabase<CosmoSpecies>,
    mixture: &SolventMixture,
    settings: &ThermoSettings,
    engine: &dyn EngineRunner,
) -> Result<SolvationReport> {
    if settings.delta_t <= 0.0 || settings.delta_t >= settings.temperature {
        return Err(CosmosolvError::InvalidArgument(format!(
            "temperature step must lie in (0, {}) K, got {}",
            settings.temperature, settings.delta_t
        )));
    }

    let pb = progress::create_progress_bar(solutes.len() as u64, "Solvating");
    let mut report = SolvationReport::default();

    for solute in solutes {
        pb.set_message(solute.name.clone());
        let outcome = match solvation_thermo(solute, mixture, settings, engine) {
            Ok((dgsolv, dhsolv, dssolv)) => {
                tracing::debug!(
                    "{}: dG = {:.1} J/mol, dH = {:.1} J/mol",
                    solute.name,
                    dgsolv,
                    dhsolv
                );
                SoluteOutcome::Computed {
                    inchi: solute.inchi.clone(),
                    name: solute.name.clone(),
                    dgsolv,
                    dhsolv,
                    dssolv,
                }
            }
            Err(e) if e.is_fatal() => {
                pb.abandon();
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Skipping {} ({}): {}", solute.name, solute.inchi, e);
                SoluteOutcome::Failed {
                    inchi: solute.inchi.clone(),
                    reason: e.to_string(),
                }
            }
        };
        report.outcomes.push(outcome);
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(report)
}
