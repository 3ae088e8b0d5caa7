//! # InChI 索引数据库
//!
//! 有序记录集合，支持按 InChI 精确查找（线性扫描，返回第一个匹配）
//! 以及经由 SMILES → InChI 转换的查找。载入后只读。
//!
//! ## 依赖关系
//! - 被 `fitting/`, `batch/`, `commands/` 使用
//! - 使用 `models/species.rs`
//! - 子模块: loader, resolver

pub mod loader;
pub mod resolver;

pub use loader::{
    append_species_csv, load_solutes_csv, load_solvation_data_csv, load_solvents_csv,
    load_species_csv, write_solvation_data_csv, SolvationData, SolvationRow,
};
pub use resolver::{InchiResolver, ObabelResolver};

use crate::error::Result;
use crate::models::{CosmoSpecies, Solute, Solvent};

/// 带 InChI 标识的记录
pub trait InchiKeyed {
    fn inchi(&self) -> &str;
}

impl InchiKeyed for CosmoSpecies {
    fn inchi(&self) -> &str {
        &self.inchi
    }
}

impl InchiKeyed for Solute {
    fn inchi(&self) -> &str {
        &self.inchi
    }
}

impl InchiKeyed for Solvent {
    fn inchi(&self) -> &str {
        &self.inchi
    }
}

/// 按 InChI 索引的有序记录集合
#[derive(Debug, Clone, Default)]
pub struct InchiKeyedDatabase<T> {
    records: Vec<T>,
}

impl<T: InchiKeyed> InchiKeyedDatabase<T> {
    pub fn new(records: Vec<T>) -> Self {
        InchiKeyedDatabase { records }
    }

    /// 按 InChI 精确查找，返回第一个匹配
    pub fn get_by_inchi(&self, inchi: &str) -> Option<&T> {
        self.records.iter().find(|r| r.inchi() == inchi)
    }

    /// 先将 SMILES 转为 InChI，再按 InChI 查找
    pub fn get_by_smiles(&self, smiles: &str, resolver: &dyn InchiResolver) -> Result<Option<&T>> {
        let inchi = resolver.smiles_to_inchi(smiles)?;
        Ok(self.get_by_inchi(&inchi))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a InchiKeyedDatabase<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
