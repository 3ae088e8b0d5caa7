//! # SMILES → InChI 转换
//!
//! 通过外部化学信息学工具规范化结构字符串。默认使用 Open Babel，
//! 输出包含固定氢层 (FixedH) 的标准 InChI。
//!
//! ## 依赖关系
//! - 被 `database/mod.rs` 使用

use crate::error::{CosmosolvError, Result};
use std::process::Command;

/// SMILES → InChI 转换器
pub trait InchiResolver {
    fn smiles_to_inchi(&self, smiles: &str) -> Result<String>;
}

/// 调用 `obabel` 的转换器
#[derive(Debug, Clone)]
pub struct ObabelResolver {
    executable: String,
}

impl Default for ObabelResolver {
    fn default() -> Self {
        ObabelResolver {
            executable: "obabel".to_string(),
        }
    }
}

impl ObabelResolver {
    pub fn new(executable: impl Into<String>) -> Self {
        ObabelResolver {
            executable: executable.into(),
        }
    }
}

impl InchiResolver for ObabelResolver {
    fn smiles_to_inchi(&self, smiles: &str) -> Result<String> {
        // -xF: 包含固定氢层
        let output = Command::new(&self.executable)
            .arg(format!("-:{}", smiles))
            .args(["-oinchi", "-xF"])
            .output()
            .map_err(|e| spawn_error(&self.executable, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        extract_inchi(&stdout).ok_or_else(|| CosmosolvError::CommandFailed {
            command: format!("{} -:{} -oinchi -xF", self.executable, smiles),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// 仅可执行文件不存在时视为致命错误
fn spawn_error(executable: &str, e: std::io::Error) -> CosmosolvError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CosmosolvError::CommandNotFound {
            command: executable.to_string(),
        }
    } else {
        CosmosolvError::CommandFailed {
            command: executable.to_string(),
            stderr: e.to_string(),
        }
    }
}

/// 从工具输出中取出第一行 InChI
fn extract_inchi(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| l.starts_with("InChI="))
        .map(|l| l.split_whitespace().next().unwrap_or(l).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_inchi() {
        let out = "InChI=1/CH4O/c1-2/h2H,1H3\n1 molecule converted\n";
        assert_eq!(
            extract_inchi(out),
            Some("InChI=1/CH4O/c1-2/h2H,1H3".to_string())
        );
        assert_eq!(extract_inchi("0 molecules converted\n"), None);
    }

    #[test]
    fn test_spawn_error_kinds() {
        let missing = ObabelResolver::new("/nonexistent/bin/obabel-does-not-exist");
        let err = missing.smiles_to_inchi("C").unwrap_err();
        assert!(matches!(err, CosmosolvError::CommandNotFound { .. }));
        assert!(err.is_fatal());

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = spawn_error("obabel", denied);
        assert!(matches!(err, CosmosolvError::CommandFailed { .. }));
        assert!(!err.is_fatal());
    }
}
