//! # COSMOtherm 作业
//!
//! 由物种列表与摩尔分数构造输入文件，调用引擎并解析 .tab 输出。
//! 作业只能运行一次：运行成功后引擎文件即被删除。
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `commands/henry.rs` 使用
//! - 使用 `cosmo/engine.rs`, `cosmo/scratch.rs`, `parsers/cosmo_tab.rs`

use super::engine::EngineRunner;
use super::scratch::ScratchFiles;
use crate::config::EngineConfig;
use crate::error::{CosmosolvError, Result};
use crate::models::{CosmoOutput, CosmoSpecies, OutputKind};
use crate::parsers::cosmo_tab::{parse_tab_file, TabContext};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认 COSMOtherm 参数化
pub const DEFAULT_LEVEL: &str = "BP_TZVPD_FINE_21";

/// COSMOtherm 作业
#[derive(Debug, Clone)]
pub struct CosmoJob {
    species: Vec<CosmoSpecies>,
    mole_fractions: BTreeMap<String, f64>,
    outputs: Vec<OutputKind>,
    temperatures: Vec<f64>,
    /// 输出前缀，如 `/dir/H2O` 对应 `/dir/H2O.inp`、`/dir/H2O.tab`
    prefix: PathBuf,
    level: String,
    results: Vec<CosmoOutput>,
    completed: bool,
}

impl CosmoJob {
    /// 创建作业并校验参数
    ///
    /// 单物种作业未给出摩尔分数时默认为 1.0；多物种作业必须显式给出，
    /// 且须覆盖每个物种。
    pub fn new(
        species: Vec<CosmoSpecies>,
        mole_fractions: Option<BTreeMap<String, f64>>,
        outputs: &[OutputKind],
        temperatures: Vec<f64>,
        prefix: impl Into<PathBuf>,
        level: impl Into<String>,
    ) -> Result<Self> {
        if species.is_empty() {
            return Err(CosmosolvError::InvalidArgument(
                "a COSMOtherm job needs at least one species".to_string(),
            ));
        }

        let mole_fractions = match mole_fractions {
            Some(fractions) => {
                if let Some(missing) = species.iter().find(|s| !fractions.contains_key(&s.name)) {
                    return Err(CosmosolvError::MoleFractionMissing {
                        species: missing.name.clone(),
                    });
                }
                fractions
            }
            None if species.len() == 1 => BTreeMap::from([(species[0].name.clone(), 1.0)]),
            None => return Err(CosmosolvError::MissingMoleFractions),
        };

        let mut outputs = outputs.to_vec();
        outputs.sort();
        outputs.dedup();
        if outputs.is_empty() {
            return Err(CosmosolvError::InvalidArgument(
                "no outputs requested".to_string(),
            ));
        }

        let wants_henry = outputs
            .iter()
            .any(|o| matches!(o, OutputKind::GsolvHenry | OutputKind::Henry));
        if wants_henry && temperatures.is_empty() {
            return Err(CosmosolvError::InvalidArgument(
                "Henry/Gsolv outputs need at least one temperature".to_string(),
            ));
        }

        Ok(CosmoJob {
            species,
            mole_fractions,
            outputs,
            temperatures,
            prefix: prefix.into(),
            level: level.into(),
            results: Vec::new(),
            completed: false,
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// 按物种顺序排列的摩尔分数
    fn fractions_in_order(&self) -> String {
        self.species
            .iter()
            .map(|s| format!("{:?}", self.mole_fractions[&s.name]))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 生成 COSMOtherm 输入文件内容
    pub fn generate_input(&self, config: &EngineConfig) -> String {
        let mut lines = Vec::new();

        // 文件头
        lines.push(format!(
            "ctd = {}.ctd cdir = \"{}\" ldir = \"{}\"",
            self.level,
            config.ctdata_dir().display(),
            config.license_dir().display()
        ));
        lines.push("notempty wtln ehfile".to_string());
        lines.push("!! generated by cosmosolv !!".to_string());

        // 物种与构象
        for spc in &self.species {
            let fdir = spc.dir().display();
            if spc.n_conf <= 1 {
                lines.push(format!(
                    "f = \"{}\" fdir=\"{}\" VPfile",
                    spc.conformer_file(0),
                    fdir
                ));
            } else {
                for i in 0..spc.n_conf {
                    let file = spc.conformer_file(i);
                    let line = if i == 0 {
                        format!(
                            "f = \"{}\" fdir=\"{}\" Comp = \"{}\" [ VPfile",
                            file, fdir, spc.name
                        )
                    } else if i + 1 == spc.n_conf {
                        format!("f = \"{}\" fdir=\"{}\" ]", file, fdir)
                    } else {
                        format!("f = \"{}\" fdir=\"{}\"", file, fdir)
                    };
                    lines.push(line);
                }
            }
        }

        // 计算指令
        let fractions = self.fractions_in_order();
        let gsolv = self.outputs.contains(&OutputKind::GsolvHenry);
        if gsolv || self.outputs.contains(&OutputKind::Henry) {
            for t in &self.temperatures {
                let mut line = format!("henry  xh={{ {} }} tk={}", fractions, t);
                if gsolv {
                    line.push_str(" GSOLV");
                }
                lines.push(line);
            }
        }
        if self.outputs.contains(&OutputKind::FlashPoint) {
            lines.push(format!("flashpoint  xf={{ {} }}", fractions));
        }

        let mut deck = lines.join("\n");
        deck.push('\n');
        deck
    }

    /// 写入输入文件
    pub fn write_input(&self, config: &EngineConfig, path: &Path) -> Result<()> {
        fs::write(path, self.generate_input(config)).map_err(|e| {
            CosmosolvError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            }
        })
    }

    /// 运行作业：写输入、执行引擎、解析输出
    ///
    /// 只有解析成功后才删除引擎文件；失败时文件保留在磁盘上。
    pub fn run(&mut self, engine: &dyn EngineRunner) -> Result<&[CosmoOutput]> {
        if self.completed {
            return Err(CosmosolvError::JobAlreadyRun {
                name: self.prefix.display().to_string(),
            });
        }

        if let Some(dir) = self.prefix.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| CosmosolvError::FileWriteError {
                path: dir.display().to_string(),
                source: e,
            })?;
        }

        let scratch = ScratchFiles::for_prefix(&self.prefix);
        self.write_input(engine.config(), scratch.input())?;
        engine.execute(scratch.input())?;

        let names: Vec<String> = self.species.iter().map(|s| s.name.clone()).collect();
        let ctx = TabContext {
            species: &names,
            temperatures: &self.temperatures,
            mole_fractions: &self.mole_fractions,
        };
        let outputs = parse_tab_file(scratch.table(), ctx)?;
        scratch.release();

        tracing::debug!(
            "Job {} produced {} result block(s)",
            self.prefix.display(),
            outputs.len()
        );
        self.results.extend(outputs);
        self.completed = true;
        Ok(&self.results)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;

    pub(crate) fn test_config() -> EngineConfig {
        EngineConfig::new(
            Some(PathBuf::from("/opt/ct")),
            Some(PathBuf::from("/opt/ct/BIN-LINUX/cosmotherm")),
        )
        .unwrap()
    }

    /// 把固定 .tab 内容写到输入文件旁边的引擎
    struct TableEngine {
        config: EngineConfig,
        table: String,
        calls: Cell<usize>,
    }

    impl EngineRunner for TableEngine {
        fn config(&self) -> &EngineConfig {
            &self.config
        }

        fn execute(&self, input: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            fs::write(input.with_extension("tab"), &self.table).unwrap();
            fs::write(input.with_extension("log"), "done").unwrap();
            Ok(())
        }
    }

    fn ethanol() -> CosmoSpecies {
        CosmoSpecies::new("ethanol", "InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3", "CCO", 1, "/data/ethanol")
    }

    fn water(n_conf: usize) -> CosmoSpecies {
        CosmoSpecies::new("h2o", "InChI=1S/H2O/h1H2", "O", n_conf, "/data/h2o")
    }

    #[test]
    fn test_single_species_deck() {
        let job = CosmoJob::new(
            vec![ethanol()],
            None,
            &[OutputKind::GsolvHenry],
            vec![298.15],
            "/tmp/ethanol",
            DEFAULT_LEVEL,
        )
        .unwrap();

        let deck = job.generate_input(&test_config());
        let species_lines: Vec<_> = deck.lines().filter(|l| l.starts_with("f = ")).collect();
        let henry_lines: Vec<_> = deck.lines().filter(|l| l.starts_with("henry")).collect();

        assert_eq!(species_lines.len(), 1);
        assert_eq!(henry_lines.len(), 1);
        assert!(henry_lines[0].contains("xh={ 1.0 }"));
        assert!(henry_lines[0].contains("tk=298.15"));
        assert!(henry_lines[0].ends_with("GSOLV"));
        assert!(deck.starts_with("ctd = BP_TZVPD_FINE_21.ctd cdir = \"/opt/ct/CTDATA-FILES\""));
        assert!(!deck.contains("flashpoint"));
    }

    #[test]
    fn test_multi_conformer_and_flash_point_deck() {
        let fractions = BTreeMap::from([("ethanol".to_string(), 0.25), ("h2o".to_string(), 0.75)]);
        let job = CosmoJob::new(
            vec![ethanol(), water(3)],
            Some(fractions),
            &[OutputKind::Henry, OutputKind::FlashPoint],
            vec![298.15, 308.15],
            "/tmp/mix",
            DEFAULT_LEVEL,
        )
        .unwrap();

        let deck = job.generate_input(&test_config());
        let lines: Vec<&str> = deck.lines().collect();
        assert!(lines.contains(&"f = \"h2o_c0.cosmo\" fdir=\"/data/h2o\" Comp = \"h2o\" [ VPfile"));
        assert!(lines.contains(&"f = \"h2o_c1.cosmo\" fdir=\"/data/h2o\""));
        assert!(lines.contains(&"f = \"h2o_c2.cosmo\" fdir=\"/data/h2o\" ]"));
        assert!(lines.contains(&"henry  xh={ 0.25 0.75 } tk=298.15"));
        assert!(lines.contains(&"henry  xh={ 0.25 0.75 } tk=308.15"));
        assert_eq!(lines.last(), Some(&"flashpoint  xf={ 0.25 0.75 }"));
    }

    #[test]
    fn test_validation() {
        let result = CosmoJob::new(
            vec![ethanol(), water(1)],
            None,
            &[OutputKind::GsolvHenry],
            vec![298.15],
            "/tmp/mix",
            DEFAULT_LEVEL,
        );
        assert!(matches!(result, Err(CosmosolvError::MissingMoleFractions)));

        let partial = BTreeMap::from([("ethanol".to_string(), 1.0)]);
        let result = CosmoJob::new(
            vec![ethanol(), water(1)],
            Some(partial),
            &[OutputKind::GsolvHenry],
            vec![298.15],
            "/tmp/mix",
            DEFAULT_LEVEL,
        );
        assert!(matches!(
            result,
            Err(CosmosolvError::MoleFractionMissing { species }) if species == "h2o"
        ));

        let result = CosmoJob::new(
            vec![ethanol()],
            None,
            &[OutputKind::Henry],
            vec![],
            "/tmp/ethanol",
            DEFAULT_LEVEL,
        );
        assert!(matches!(result, Err(CosmosolvError::InvalidArgument(_))));
    }

    #[test]
    fn test_run_parses_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("ethanol");
        let engine = TableEngine {
            config: test_config(),
            table: "Property  job 1 : Henry law coefficients  ; T= 298.15 K ;\n   \
                    1 ethanol   0.5E-02   -0.3   0.78E-01   -4.5\n"
                .to_string(),
            calls: Cell::new(0),
        };

        let mut job = CosmoJob::new(
            vec![ethanol()],
            None,
            &[OutputKind::GsolvHenry],
            vec![298.15],
            &prefix,
            DEFAULT_LEVEL,
        )
        .unwrap();

        let results = job.run(&engine).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].gsolv_of("ethanol"), Some(-4.5 * 4184.0));
        assert_eq!(engine.calls.get(), 1);

        for ext in ["inp", "tab", "log", "status"] {
            assert!(!dir.path().join(format!("ethanol.{}", ext)).exists());
        }

        assert!(matches!(
            job.run(&engine),
            Err(CosmosolvError::JobAlreadyRun { .. })
        ));
        assert_eq!(engine.calls.get(), 1);
    }

    #[test]
    fn test_failed_parse_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("broken");
        let engine = TableEngine {
            config: test_config(),
            table: "Property  job 1 : Henry law coefficients  ; T= 298.15 K ;\n".to_string(),
            calls: Cell::new(0),
        };

        let mut job = CosmoJob::new(
            vec![ethanol()],
            None,
            &[OutputKind::GsolvHenry],
            vec![298.15],
            &prefix,
            DEFAULT_LEVEL,
        )
        .unwrap();

        assert!(matches!(
            job.run(&engine),
            Err(CosmosolvError::ParseError { .. })
        ));
        assert!(dir.path().join("broken.inp").exists());
        assert!(dir.path().join("broken.tab").exists());

        // 失败的作业可以重新运行
        assert!(matches!(
            job.run(&engine),
            Err(CosmosolvError::ParseError { .. })
        ));
        assert_eq!(engine.calls.get(), 2);
    }
}
