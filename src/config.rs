//! # COSMOtherm 引擎配置
//!
//! 显式的引擎配置对象：安装目录与可执行文件路径。
//! 构造时立即校验，缺失项给出带提示的错误。
//!
//! ## 依赖关系
//! - 被 `cosmo/`, `batch/`, `commands/` 使用
//! - 使用 `error.rs`

use crate::error::{CosmosolvError, Result};
use std::path::{Path, PathBuf};

/// 安装目录环境变量
pub const COSMOTHERM_PATH_ENV: &str = "COSMOTHERM_PATH";

/// 可执行文件环境变量
pub const COSMOTHERM_EXE_ENV: &str = "COSMOTHERM_EXECUTABLE";

/// COSMOtherm 引擎配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// 安装目录（包含 CTDATA-FILES 与 licensefiles）
    cosmotherm_dir: PathBuf,
    /// cosmotherm 可执行文件
    executable: PathBuf,
}

impl EngineConfig {
    /// 从可选值构造并校验
    pub fn new(cosmotherm_dir: Option<PathBuf>, executable: Option<PathBuf>) -> Result<Self> {
        let cosmotherm_dir = cosmotherm_dir.ok_or_else(|| CosmosolvError::MissingConfig {
            key: COSMOTHERM_PATH_ENV.to_string(),
            hint: "set it to the COSMOtherm installation directory, e.g. \
                   /opt/COSMOlogic/COSMOthermX21/COSMOtherm"
                .to_string(),
        })?;
        let executable = executable.ok_or_else(|| CosmosolvError::MissingConfig {
            key: COSMOTHERM_EXE_ENV.to_string(),
            hint: "set it to the cosmotherm binary, e.g. \
                   /opt/COSMOlogic/COSMOthermX21/COSMOtherm/BIN-LINUX/cosmotherm"
                .to_string(),
        })?;

        Ok(Self {
            cosmotherm_dir,
            executable,
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// 参数化数据目录
    pub fn ctdata_dir(&self) -> PathBuf {
        self.cosmotherm_dir.join("CTDATA-FILES")
    }

    /// 许可证目录
    pub fn license_dir(&self) -> PathBuf {
        self.cosmotherm_dir.join("licensefiles")
    }
}
