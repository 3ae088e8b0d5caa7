//! # 物种数据模型
//!
//! COSMO 物种、溶质（Abraham 描述符）与溶剂（LSER 系数）记录。
//! 载入后不可变。
//!
//! ## 依赖关系
//! - 被 `database/`, `cosmo/`, `fitting/`, `batch/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 含预计算 .cosmo 文件的物种
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmoSpecies {
    #[serde(rename = "cosmo name")]
    pub name: String,
    #[serde(rename = "inchi")]
    pub inchi: String,
    #[serde(rename = "smiles")]
    pub smiles: String,
    #[serde(rename = "number of conformers")]
    pub n_conf: usize,
    /// .cosmo 文件所在目录
    #[serde(rename = "file path")]
    pub path: PathBuf,
}

impl CosmoSpecies {
    pub fn new(
        name: impl Into<String>,
        inchi: impl Into<String>,
        smiles: impl Into<String>,
        n_conf: usize,
        path: impl Into<PathBuf>,
    ) -> Self {
        CosmoSpecies {
            name: name.into(),
            inchi: inchi.into(),
            smiles: smiles.into(),
            n_conf,
            path: path.into(),
        }
    }

    /// 第 i 个构象的 .cosmo 文件名，如 `h2o_c0.cosmo`
    pub fn conformer_file(&self, i: usize) -> String {
        format!("{}_c{}.cosmo", self.name, i)
    }

    pub fn dir(&self) -> &Path {
        &self.path
    }
}

/// 溶质及其 Abraham 描述符
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solute {
    pub smiles: String,
    pub inchi: String,
    #[serde(rename = "E")]
    pub e: f64,
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "B")]
    pub b: f64,
    #[serde(rename = "L")]
    pub l: f64,
}

impl Solute {
    /// 描述符向量 [E, S, A, B, L]
    pub fn descriptors(&self) -> [f64; 5] {
        [self.e, self.s, self.a, self.b, self.l]
    }
}

/// 一组 LSER 系数 (c, e, s, a, b, l)，任一项可缺失
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LserCoefficients {
    pub c: Option<f64>,
    pub e: Option<f64>,
    pub s: Option<f64>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub l: Option<f64>,
}

impl LserCoefficients {
    /// 完整的斜率项 [e, s, a, b, l]；任一缺失时返回 None
    pub fn slopes(&self) -> Option<[f64; 5]> {
        Some([self.e?, self.s?, self.a?, self.b?, self.l?])
    }
}

/// 溶剂：自由能 (g) 与焓 (h) 两套 LSER 系数
#[derive(Debug, Clone, PartialEq)]
pub struct Solvent {
    pub name: String,
    pub smiles: String,
    pub inchi: String,
    pub gibbs: LserCoefficients,
    pub enthalpy: LserCoefficients,
}

/// 溶剂 CSV 行
#[derive(Debug, Deserialize)]
pub(crate) struct SolventRow {
    name: String,
    smiles: String,
    inchi: String,
    c_g: Option<f64>,
    e_g: Option<f64>,
    s_g: Option<f64>,
    a_g: Option<f64>,
    b_g: Option<f64>,
    l_g: Option<f64>,
    c_h: Option<f64>,
    e_h: Option<f64>,
    s_h: Option<f64>,
    a_h: Option<f64>,
    b_h: Option<f64>,
    l_h: Option<f64>,
}

impl From<SolventRow> for Solvent {
    fn from(row: SolventRow) -> Self {
        Solvent {
            name: row.name,
            smiles: row.smiles,
            inchi: row.inchi,
            gibbs: LserCoefficients {
                c: row.c_g,
                e: row.e_g,
                s: row.s_g,
                a: row.a_g,
                b: row.b_g,
                l: row.l_g,
            },
            enthalpy: LserCoefficients {
                c: row.c_h,
                e: row.e_h,
                s: row.s_h,
                a: row.a_h,
                b: row.b_h,
                l: row.l_h,
            },
        }
    }
}
