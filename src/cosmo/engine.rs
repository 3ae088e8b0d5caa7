//! # COSMOtherm 引擎调用
//!
//! `EngineRunner` 抽象“对一个输入文件执行引擎”这一步，
//! 默认实现 `CosmothermEngine` 同步启动外部进程（无超时、无重试）。
//!
//! ## 依赖关系
//! - 被 `cosmo/job.rs`, `batch/driver.rs`, `commands/` 使用
//! - 使用 `config.rs`

use crate::config::EngineConfig;
use crate::error::{CosmosolvError, Result};
use std::path::Path;
use std::process::Command;

/// 执行 COSMOtherm 输入文件的引擎
pub trait EngineRunner {
    /// 引擎配置（用于生成输入文件头）
    fn config(&self) -> &EngineConfig;

    /// 执行输入文件，阻塞直至完成
    fn execute(&self, input: &Path) -> Result<()>;
}

/// 调用本地 cosmotherm 可执行文件
#[derive(Debug, Clone)]
pub struct CosmothermEngine {
    config: EngineConfig,
}

impl CosmothermEngine {
    pub fn new(config: EngineConfig) -> Self {
        CosmothermEngine { config }
    }
}

impl EngineRunner for CosmothermEngine {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(&self, input: &Path) -> Result<()> {
        let exe = self.config.executable();
        tracing::debug!("Running {} {}", exe.display(), input.display());

        // cosmotherm 在当前目录写出与输入同名的 .tab/.log 等文件
        let mut cmd = Command::new(exe);
        match (
            input.parent().filter(|d| !d.as_os_str().is_empty()),
            input.file_name(),
        ) {
            (Some(dir), Some(name)) => {
                cmd.current_dir(dir).arg(name);
            }
            _ => {
                cmd.arg(input);
            }
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CosmosolvError::CommandNotFound {
                    command: exe.display().to_string(),
                }
            } else {
                CosmosolvError::CommandFailed {
                    command: exe.display().to_string(),
                    stderr: e.to_string(),
                }
            }
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CosmosolvError::CommandFailed {
                command: format!("{} {}", exe.display(), input.display()),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_executable_is_fatal() {
        let config = EngineConfig::new(
            Some(PathBuf::from("/nonexistent")),
            Some(PathBuf::from("/nonexistent/bin/cosmotherm-does-not-exist")),
        )
        .unwrap();
        let engine = CosmothermEngine::new(config);
        let err = engine.execute(Path::new("job.inp")).unwrap_err();
        assert!(err.is_fatal());
    }
}
