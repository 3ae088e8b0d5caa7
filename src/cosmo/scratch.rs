//! # 引擎临时文件生命周期
//!
//! 以输出前缀命名的四个 COSMOtherm 文件（.inp / .tab / .log / .status）。
//! 仅在解析成功后调用 `release` 删除；未释放即被丢弃时保留在磁盘上
//! 以便排查，并记录警告。
//!
//! ## 依赖关系
//! - 被 `cosmo/job.rs` 使用

use std::path::{Path, PathBuf};

/// 引擎临时文件
#[derive(Debug)]
pub struct ScratchFiles {
    input: PathBuf,
    table: PathBuf,
    log: PathBuf,
    status: PathBuf,
    released: bool,
}

impl ScratchFiles {
    /// 由输出前缀推导文件名：`/dir/h2o` -> `/dir/h2o.inp` 等
    pub fn for_prefix(prefix: &Path) -> Self {
        let with_ext = |ext: &str| {
            let mut name = prefix.as_os_str().to_owned();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        };
        ScratchFiles {
            input: with_ext("inp"),
            table: with_ext("tab"),
            log: with_ext("log"),
            status: with_ext("status"),
            released: false,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn table(&self) -> &Path {
        &self.table
    }

    fn all(&self) -> [&Path; 4] {
        [&self.input, &self.table, &self.log, &self.status]
    }

    /// 解析成功后删除全部文件；不存在的文件忽略
    pub fn release(mut self) {
        for path in self.all() {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::trace!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        self.released = true;
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                "COSMOtherm files kept for inspection: {}",
                self.input.with_extension("*").display()
            );
        }
    }
}
