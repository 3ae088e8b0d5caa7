//! # CSV 数据表读写
//!
//! 物种、溶质、溶剂数据表以及溶剂化数据 (ΔG/ΔH) 表。
//!
//! 列名：
//! - 物种: `cosmo name, inchi, smiles, number of conformers, file path`
//! - 溶质: `smiles, inchi, E, S, A, B, L`
//! - 溶剂: `name, smiles, inchi, c_g, e_g, s_g, a_g, b_g, l_g, c_h, e_h, s_h, a_h, b_h, l_h`
//! - 溶剂化数据: `inchi, dGsolv, dHsolv[, dSsolv]`（J/mol, J/mol/K）
//!
//! ## 依赖关系
//! - 被 `database/mod.rs`, `commands/` 使用
//! - 使用 `models/species.rs`

use super::InchiKeyedDatabase;
use crate::error::{CosmosolvError, Result};
use crate::models::species::SolventRow;
use crate::models::{CosmoSpecies, Solute, Solvent};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::Path;

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(CosmosolvError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    tracing::debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// 载入物种表
pub fn load_species_csv(path: &Path) -> Result<InchiKeyedDatabase<CosmoSpecies>> {
    Ok(InchiKeyedDatabase::new(read_rows(path)?))
}

/// 载入溶质表
pub fn load_solutes_csv(path: &Path) -> Result<InchiKeyedDatabase<Solute>> {
    Ok(InchiKeyedDatabase::new(read_rows(path)?))
}

/// 载入溶剂表
pub fn load_solvents_csv(path: &Path) -> Result<InchiKeyedDatabase<Solvent>> {
    let rows: Vec<SolventRow> = read_rows(path)?;
    Ok(InchiKeyedDatabase::new(
        rows.into_iter().map(Solvent::from).collect(),
    ))
}

/// 向物种表追加一行；文件不存在时写入表头
pub fn append_species_csv(path: &Path, species: &CosmoSpecies) -> Result<()> {
    let exists = path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CosmosolvError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!exists)
        .from_writer(file);
    wtr.serialize(species)?;
    wtr.flush().map_err(|e| CosmosolvError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 溶剂化数据行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvationRow {
    pub inchi: String,
    #[serde(rename = "dGsolv")]
    pub dgsolv: f64,
    #[serde(rename = "dHsolv", default)]
    pub dhsolv: Option<f64>,
    #[serde(rename = "dSsolv", default)]
    pub dssolv: Option<f64>,
}

/// 按 InChI 索引的 ΔG / ΔH (J/mol)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolvationData {
    pub dgsolv: BTreeMap<String, f64>,
    pub dhsolv: BTreeMap<String, f64>,
}

impl SolvationData {
    pub fn from_rows(rows: impl IntoIterator<Item = SolvationRow>) -> Self {
        let mut data = SolvationData::default();
        for row in rows {
            if let Some(dh) = row.dhsolv {
                data.dhsolv.insert(row.inchi.clone(), dh);
            }
            data.dgsolv.insert(row.inchi, row.dgsolv);
        }
        data
    }

    pub fn len(&self) -> usize {
        self.dgsolv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dgsolv.is_empty()
    }
}

/// 载入溶剂化数据表
pub fn load_solvation_data_csv(path: &Path) -> Result<SolvationData> {
    let rows: Vec<SolvationRow> = read_rows(path)?;
    Ok(SolvationData::from_rows(rows))
}

/// 写出溶剂化数据表
pub fn write_solvation_data_csv(path: &Path, rows: &[SolvationRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| CosmosolvError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
