//! # TURBOMOLE COSMO 计算
//!
//! 为单个分子准备 `calculate` 输入、依次运行 COSMO 与气相能量两个级别，
//! 并把生成的 `.cosmo`/`.energy` 文件整理为 COSMOtherm 所需的
//! `<name>_c0.*` 命名。
//!
//! 目录布局（`path` 下）：
//! - `<name>.txt`: `name charge multiplicity`
//! - `xyz/<name>.xyz`: 坐标
//! - `Cosmofiles<level>/<name>.cosmo`, `Energyfiles<level>/<name>.energy`: calculate 输出
//!
//! `.cosmo` 与 `.energy` 都取自 COSMO 级别的输出目录，保证两者来自同一次计算。
//!
//! ## 依赖关系
//! - 被 `commands/turbomole.rs` 使用
//! - 使用 `models/species.rs`

use crate::error::{CosmosolvError, Result};
use crate::models::CosmoSpecies;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 默认 COSMO 计算级别
pub const DEFAULT_COSMO_LEVEL: &str = "BP-TZVPD-FINE-COSMO-SP";

/// 默认气相能量计算级别
pub const DEFAULT_ENERGY_LEVEL: &str = "BP-TZVPD-GAS-SP";

/// 单个分子的 TURBOMOLE 作业
#[derive(Debug, Clone)]
pub struct TurbomoleJob {
    name: String,
    /// 原子坐标行（不含原子数与注释行）
    xyz: Vec<String>,
    charge: i32,
    multiplicity: u32,
    path: PathBuf,
    cosmo_level: String,
    energy_level: String,
}

impl TurbomoleJob {
    pub fn new(
        name: impl Into<String>,
        xyz: &str,
        charge: i32,
        multiplicity: u32,
        path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CosmosolvError::InvalidArgument(format!(
                "invalid molecule name '{}'",
                name
            )));
        }
        if multiplicity == 0 {
            return Err(CosmosolvError::InvalidArgument(
                "multiplicity must be at least 1".to_string(),
            ));
        }

        let xyz = atom_lines(xyz)?;
        Ok(TurbomoleJob {
            name,
            xyz,
            charge,
            multiplicity,
            path: path.into(),
            cosmo_level: DEFAULT_COSMO_LEVEL.to_string(),
            energy_level: DEFAULT_ENERGY_LEVEL.to_string(),
        })
    }

    /// 从 .xyz 文件创建作业
    pub fn from_xyz_file(
        name: impl Into<String>,
        xyz_path: &Path,
        charge: i32,
        multiplicity: u32,
        path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let content = fs::read_to_string(xyz_path).map_err(|e| CosmosolvError::FileReadError {
            path: xyz_path.display().to_string(),
            source: e,
        })?;
        Self::new(name, &content, charge, multiplicity, path)
    }

    /// 设置计算级别
    pub fn with_levels(
        mut self,
        cosmo_level: impl Into<String>,
        energy_level: impl Into<String>,
    ) -> Self {
        self.cosmo_level = cosmo_level.into();
        self.energy_level = energy_level.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_atoms(&self) -> usize {
        self.xyz.len()
    }

    fn input_file(&self) -> PathBuf {
        self.path.join(format!("{}.txt", self.name))
    }

    fn xyz_dir(&self) -> PathBuf {
        self.path.join("xyz")
    }

    fn xyz_file(&self) -> PathBuf {
        self.xyz_dir().join(format!("{}.xyz", self.name))
    }

    /// 最终的 .cosmo 文件路径
    pub fn cosmo_file(&self) -> PathBuf {
        self.path.join(format!("{}_c0.cosmo", self.name))
    }

    /// 最终的 .energy 文件路径
    pub fn energy_file(&self) -> PathBuf {
        self.path.join(format!("{}_c0.energy", self.name))
    }

    /// 写出 `<name>.txt` 与 `xyz/<name>.xyz`
    pub fn generate_input_file(&self) -> Result<()> {
        fs::create_dir_all(self.xyz_dir()).map_err(|e| CosmosolvError::FileWriteError {
            path: self.xyz_dir().display().to_string(),
            source: e,
        })?;

        write_file(
            &self.input_file(),
            &format!("{} {} {}\n", self.name, self.charge, self.multiplicity),
        )?;

        let mut xyz = format!("{}\n\n", self.num_atoms());
        for line in &self.xyz {
            xyz.push_str(line);
            xyz.push('\n');
        }
        write_file(&self.xyz_file(), &xyz)
    }

    /// 依次运行 COSMO 与能量级别，stdout 写入 `<name>.log`
    pub fn run(&self, calculate: &Path) -> Result<()> {
        let log_path = self.path.join(format!("{}.log", self.name));
        let log = File::create(&log_path).map_err(|e| CosmosolvError::FileWriteError {
            path: log_path.display().to_string(),
            source: e,
        })?;

        for level in [&self.cosmo_level, &self.energy_level] {
            let stdout = log.try_clone().map_err(|e| CosmosolvError::FileWriteError {
                path: log_path.display().to_string(),
                source: e,
            })?;
            tracing::info!("Running {} at level {}", self.name, level);

            let output = Command::new(calculate)
                .current_dir(&self.path)
                .arg("-l")
                .arg(format!("{}.txt", self.name))
                .args(["-m", level.as_str()])
                .args(["-f", "xyz", "-din", "xyz"])
                .stdout(Stdio::from(stdout))
                .stderr(Stdio::piped())
                .output()
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        CosmosolvError::CommandNotFound {
                            command: calculate.display().to_string(),
                        }
                    } else {
                        CosmosolvError::CommandFailed {
                            command: calculate.display().to_string(),
                            stderr: e.to_string(),
                        }
                    }
                })?;

            if !output.status.success() {
                return Err(CosmosolvError::CommandFailed {
                    command: format!("{} -m {}", calculate.display(), level),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                });
            }
        }
        Ok(())
    }

    /// 重命名 calculate 输出并删除输入文件
    pub fn process_output(&self) -> Result<()> {
        let cosmo = self
            .path
            .join(format!("Cosmofiles{}", self.cosmo_level))
            .join(format!("{}.cosmo", self.name));
        let energy = self
            .path
            .join(format!("Energyfiles{}", self.cosmo_level))
            .join(format!("{}.energy", self.name));

        move_file(&cosmo, &self.cosmo_file())?;
        move_file(&energy, &self.energy_file())?;

        for input in [self.input_file(), self.xyz_file()] {
            if let Err(e) = fs::remove_file(&input) {
                tracing::warn!("Could not remove {}: {}", input.display(), e);
            }
        }
        // 目录非空时保留
        let _ = fs::remove_dir(self.xyz_dir());
        Ok(())
    }

    /// 生成输入、运行并整理输出
    pub fn execute(&self, calculate: &Path) -> Result<()> {
        self.generate_input_file()?;
        self.run(calculate)?;
        self.process_output()
    }

    /// 转为单构象的 COSMOtherm 物种
    pub fn to_species(&self, inchi: impl Into<String>, smiles: impl Into<String>) -> CosmoSpecies {
        CosmoSpecies::new(self.name.clone(), inchi, smiles, 1, self.path.clone())
    }
}

/// 提取原子坐标行；带原子数头时只接受单个结构
fn atom_lines(xyz: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = xyz.lines().collect();
    let first = lines.first().map(|l| l.trim()).unwrap_or("");

    let atoms: Vec<String> = match first.parse::<usize>() {
        Ok(n) => {
            let body: Vec<&str> = lines.iter().skip(2).copied().collect();
            let atoms: Vec<String> = body
                .iter()
                .take(n)
                .map(|l| l.trim().to_string())
                .collect();
            if body.iter().skip(n).any(|l| !l.trim().is_empty()) {
                return Err(CosmosolvError::InvalidArgument(
                    "xyz input holds more than one conformer; only single conformers are supported"
                        .to_string(),
                ));
            }
            if atoms.len() != n {
                return Err(CosmosolvError::ParseError {
                    format: "XYZ".to_string(),
                    path: "<input>".to_string(),
                    reason: format!("expected {} atoms, found {}", n, atoms.len()),
                });
            }
            atoms
        }
        Err(_) => lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
    };

    if atoms.is_empty() {
        return Err(CosmosolvError::InvalidArgument(
            "xyz input contains no atoms".to_string(),
        ));
    }
    Ok(atoms)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path).map_err(|e| CosmosolvError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    file.write_all(content.as_bytes())
        .map_err(|e| CosmosolvError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(CosmosolvError::FileNotFound {
            path: from.display().to_string(),
        });
    }
    fs::rename(from, to).map_err(|e| CosmosolvError::FileWriteError {
        path: to.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER_XYZ: &str = concat!(
        "3\nwater\n",
        "O 0.000 0.000 0.117\n",
        "H 0.000 0.757 -0.467\n",
        "H 0.000 -0.757 -0.467\n",
    );

    #[test]
    fn test_generate_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let job = TurbomoleJob::new("h2o", WATER_XYZ, 0, 1, dir.path()).unwrap();
        assert_eq!(job.num_atoms(), 3);

        job.generate_input_file().unwrap();
        let txt = fs::read_to_string(dir.path().join("h2o.txt")).unwrap();
        assert_eq!(txt, "h2o 0 1\n");

        let xyz = fs::read_to_string(dir.path().join("xyz/h2o.xyz")).unwrap();
        let lines: Vec<&str> = xyz.lines().collect();
        assert_eq!(lines[0], "3");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "O 0.000 0.000 0.117");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_bare_coordinates() {
        let job = TurbomoleJob::new("hcl", "H 0 0 0\nCl 0 0 1.27\n\n", 0, 1, "/tmp").unwrap();
        assert_eq!(job.num_atoms(), 2);
    }

    #[test]
    fn test_multiple_conformers_rejected() {
        let two = format!("{}{}", WATER_XYZ, WATER_XYZ);
        let result = TurbomoleJob::new("h2o", &two, 0, 1, "/tmp");
        assert!(matches!(result, Err(CosmosolvError::InvalidArgument(_))));

        assert!(TurbomoleJob::new("h2o", "", 0, 1, "/tmp").is_err());
        assert!(TurbomoleJob::new("h2o", WATER_XYZ, 0, 0, "/tmp").is_err());
    }

    #[test]
    fn test_process_output() {
        let dir = tempfile::tempdir().unwrap();
        let job = TurbomoleJob::new("h2o", WATER_XYZ, 0, 1, dir.path()).unwrap();
        job.generate_input_file().unwrap();

        let cosmo_dir = dir.path().join(format!("Cosmofiles{}", DEFAULT_COSMO_LEVEL));
        let energy_dir = dir.path().join(format!("Energyfiles{}", DEFAULT_COSMO_LEVEL));
        let gas_dir = dir.path().join(format!("Energyfiles{}", DEFAULT_ENERGY_LEVEL));
        for d in [&cosmo_dir, &energy_dir, &gas_dir] {
            fs::create_dir_all(d).unwrap();
        }
        fs::write(cosmo_dir.join("h2o.cosmo"), "cosmo").unwrap();
        fs::write(energy_dir.join("h2o.energy"), "cosmo-level energy").unwrap();
        fs::write(gas_dir.join("h2o.energy"), "gas-level energy").unwrap();

        job.process_output().unwrap();
        assert_eq!(fs::read_to_string(job.cosmo_file()).unwrap(), "cosmo");
        assert_eq!(
            fs::read_to_string(job.energy_file()).unwrap(),
            "cosmo-level energy"
        );
        assert!(gas_dir.join("h2o.energy").exists());
        assert!(!dir.path().join("h2o.txt").exists());
        assert!(!dir.path().join("xyz").exists());

        let spc = job.to_species("InChI=1S/H2O/h1H2", "O");
        assert_eq!(spc.n_conf, 1);
        assert_eq!(spc.conformer_file(0), "h2o_c0.cosmo");
        assert_eq!(spc.dir(), dir.path());
    }

    #[test]
    fn test_custom_levels_select_output_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let job = TurbomoleJob::new("h2o", WATER_XYZ, 0, 1, dir.path())
            .unwrap()
            .with_levels("TZVP-COSMO", "TZVP-GAS");

        let cosmo_dir = dir.path().join("CosmofilesTZVP-COSMO");
        let energy_dir = dir.path().join("EnergyfilesTZVP-COSMO");
        fs::create_dir_all(&cosmo_dir).unwrap();
        fs::create_dir_all(&energy_dir).unwrap();
        fs::write(cosmo_dir.join("h2o.cosmo"), "c").unwrap();
        fs::write(energy_dir.join("h2o.energy"), "e").unwrap();

        job.process_output().unwrap();
        assert_eq!(fs::read_to_string(job.energy_file()).unwrap(), "e");
    }

    #[test]
    fn test_missing_output_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let job = TurbomoleJob::new("h2o", WATER_XYZ, 0, 1, dir.path()).unwrap();
        assert!(matches!(
            job.process_output(),
            Err(CosmosolvError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_calculate_binary() {
        let dir = tempfile::tempdir().unwrap();
        let job = TurbomoleJob::new("h2o", WATER_XYZ, 0, 1, dir.path()).unwrap();
        job.generate_input_file().unwrap();
        let err = job
            .run(Path::new("/nonexistent/bin/calculate-does-not-exist"))
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
