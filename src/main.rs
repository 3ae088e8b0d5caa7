//! # cosmosolv - COSMOtherm 溶剂化计算与 LSER 拟合工具
//!
//! 生成 COSMOtherm 输入、调用引擎并解析 .tab 输出，批量计算溶剂化
//! 自由能/焓，再用三种回归策略拟合 Abraham LSER 参数。
//!
//! ## 子命令
//! - `henry`     - 单个 COSMOtherm 作业 (Henry 常数 / Gsolv / 闪点)
//! - `solvate`   - 批量计算 ΔG/ΔH/ΔS
//! - `fit`       - LSER 参数拟合
//!   - `solvent` - 溶剂参数
//!   - `solute`  - 溶质描述符
//! - `turbomole` - TURBOMOLE COSMO 计算
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── cosmo/     (COSMOtherm 作业与引擎)
//!   │     │     └── parsers/ (.tab 解析器)
//!   │     ├── batch/     (批量溶剂化计算)
//!   │     ├── fitting/   (LSER 回归)
//!   │     ├── turbomole/ (TURBOMOLE 作业)
//!   │     ├── database/  (CSV 数据表与 InChI 查找)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (引擎配置)
//!   ├── utils/      (输出、进度条、日志、作图)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod cosmo;
mod database;
mod error;
mod fitting;
mod models;
mod parsers;
mod turbomole;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = utils::logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }

    if let Err(e) = commands::run(cli.command) {
        tracing::debug!("Command failed: {:?}", e);
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
