//! # 统一错误处理模块
//!
//! 定义 cosmosolv 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// cosmosolv 统一错误类型
#[derive(Error, Debug)]
pub enum CosmosolvError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Missing configuration value '{key}': {hint}")]
    MissingConfig { key: String, hint: String },

    // ─────────────────────────────────────────────────────────────
    // 作业参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported output kind: '{0}' (expected one of: gsolv, henry, flashpoint)")]
    UnsupportedOutput(String),

    #[error("Mole fractions must be given for jobs with more than one species")]
    MissingMoleFractions,

    #[error("No mole fraction given for species '{species}'")]
    MoleFractionMissing { species: String },

    #[error("Job '{name}' has already been run; its engine files were consumed")]
    JobAlreadyRun { name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 数据库查询错误
    // ─────────────────────────────────────────────────────────────
    #[error("Species not found in database: {0}")]
    SpeciesNotFound(String),

    #[error("Unexpected results for '{species}': {reason}")]
    UnexpectedResults { species: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 拟合错误
    // ─────────────────────────────────────────────────────────────
    #[error("Regression failed: {0}")]
    FitError(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl CosmosolvError {
    /// 是否应中止整个批处理（配置缺失、可执行文件不存在）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CosmosolvError::MissingConfig { .. } | CosmosolvError::CommandNotFound { .. }
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CosmosolvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let config = CosmosolvError::MissingConfig {
            key: "COSMOTHERM_PATH".to_string(),
            hint: "set it".to_string(),
        };
        assert!(config.is_fatal());
        assert!(CosmosolvError::CommandNotFound {
            command: "cosmotherm".to_string()
        }
        .is_fatal());
        assert!(!CosmosolvError::Other("boom".to_string()).is_fatal());
        assert!(!CosmosolvError::UnexpectedResults {
            species: "water".to_string(),
            reason: "no rows".to_string(),
        }
        .is_fatal());
    }
}
