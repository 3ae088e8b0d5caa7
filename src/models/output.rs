//! # COSMOtherm 计算结果数据模型
//!
//! 存储从 .tab 文件解析出的结果。目前支持 Henry 定律（含 GSOLV）
//! 与闪点两类计算。
//!
//! ## 依赖关系
//! - 被 `parsers/cosmo_tab.rs` 构造
//! - 被 `cosmo/`, `batch/`, `commands/` 使用

use crate::error::CosmosolvError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// 支持的输出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// 经由 Henry 系数的溶剂化自由能 (GSOLV)
    GsolvHenry,
    /// Henry 定律系数
    Henry,
    /// 闪点
    FlashPoint,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::GsolvHenry => write!(f, "gsolv"),
            OutputKind::Henry => write!(f, "henry"),
            OutputKind::FlashPoint => write!(f, "flashpoint"),
        }
    }
}

impl FromStr for OutputKind {
    type Err = CosmosolvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gsolv" | "gsolvhenry" | "gsolv-henry" => Ok(OutputKind::GsolvHenry),
            "henry" => Ok(OutputKind::Henry),
            "flashpoint" | "flash-point" => Ok(OutputKind::FlashPoint),
            _ => Err(CosmosolvError::UnsupportedOutput(s.to_string())),
        }
    }
}

/// 单个结果块
///
/// Henry 块填充按物种索引的四个映射与温度；闪点块只填充
/// `flash_point` 与 `saturation_pressure`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosmoOutput {
    /// 作业的摩尔分数
    pub mole_fractions: BTreeMap<String, f64>,
    /// Henry 系数 (Pa)
    pub henry: Option<BTreeMap<String, f64>>,
    /// ln(γ)
    pub ln_gamma: Option<BTreeMap<String, f64>>,
    /// 蒸气压 (Pa)
    pub vapor_pressure: Option<BTreeMap<String, f64>>,
    /// 溶剂化自由能 (J/mol)
    pub gsolv: Option<BTreeMap<String, f64>>,
    /// 温度 (K)
    pub temperature: Option<f64>,
    /// 闪点 (K)
    pub flash_point: Option<f64>,
    /// 饱和蒸气压 (Pa)
    pub saturation_pressure: Option<f64>,
}

impl CosmoOutput {
    pub fn new(mole_fractions: BTreeMap<String, f64>) -> Self {
        CosmoOutput {
            mole_fractions,
            ..Default::default()
        }
    }

    /// 某物种的溶剂化自由能
    pub fn gsolv_of(&self, species: &str) -> Option<f64> {
        self.gsolv.as_ref()?.get(species).copied()
    }

    pub fn is_flash_point(&self) -> bool {
        self.flash_point.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_from_str() {
        assert_eq!("gsolv".parse::<OutputKind>().unwrap(), OutputKind::GsolvHenry);
        assert_eq!("Henry".parse::<OutputKind>().unwrap(), OutputKind::Henry);
        assert_eq!(
            "flashpoint".parse::<OutputKind>().unwrap(),
            OutputKind::FlashPoint
        );
        assert!(matches!(
            "boiling".parse::<OutputKind>(),
            Err(CosmosolvError::UnsupportedOutput(_))
        ));
    }

    #[test]
    fn test_gsolv_lookup() {
        let mut out = CosmoOutput::new(BTreeMap::new());
        assert_eq!(out.gsolv_of("water"), None);
        out.gsolv = Some(BTreeMap::from([("water".to_string(), -26_000.0)]));
        assert_eq!(out.gsolv_of("water"), Some(-26_000.0));
    }
}
