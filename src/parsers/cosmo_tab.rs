//! # COSMOtherm .tab 输出解析器
//!
//! 逐行扫描 COSMOtherm 表格输出，按 `Property` 块提取 Henry 定律
//! 与闪点结果。
//!
//! 解析器是显式的有限状态机：
//! - `Idle`: 未识别的块，忽略数据行
//! - `InHenryBlock`: 累积 Henry 数据行，遇到下一个 `Property` 或文件
//!   结束时生成一条结果；温度取自已完成 Henry 块的计数
//! - `InFlashPointBlock`: 第一条数值行立即生成一条结果
//!
//! 单位换算：H 与 pv 从 bar 转为 Pa (×1e5)，Gsolv 从 kcal/mol 转为
//! J/mol (×4184)，饱和蒸气压从 mbar 转为 Pa (×100)。
//!
//! ## 依赖关系
//! - 被 `cosmo/job.rs` 使用
//! - 使用 `models/output.rs`

use crate::error::{CosmosolvError, Result};
use crate::models::CosmoOutput;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

const BAR_TO_PA: f64 = 1.0e5;
const KCAL_TO_J: f64 = 4184.0;
const MBAR_TO_PA: f64 = 100.0;

const HENRY_JOB: &str = "Henry law coefficients";
const FLASH_POINT_JOB: &str = "Flash point temperature";

/// 解析所需的作业上下文
#[derive(Debug, Clone, Copy)]
pub struct TabContext<'a> {
    /// 物种名，顺序与 .tab 中的行序号一致
    pub species: &'a [String],
    /// 请求的温度，顺序与 Henry 块一致
    pub temperatures: &'a [f64],
    pub mole_fractions: &'a BTreeMap<String, f64>,
}

/// Henry 块累积的数据行
#[derive(Debug, Default)]
struct HenryBlock {
    h: Vec<f64>,
    ln_gamma: Vec<f64>,
    pvap: Vec<f64>,
    gsolv: Vec<Option<f64>>,
}

impl HenryBlock {
    fn clear(&mut self) {
        self.h.clear();
        self.ln_gamma.clear();
        self.pvap.clear();
        self.gsolv.clear();
    }

    fn len(&self) -> usize {
        self.h.len()
    }
}

#[derive(Debug)]
enum ParseState {
    Idle,
    InHenryBlock(HenryBlock),
    InFlashPointBlock { recorded: bool },
}

/// 状态机
struct TabParser<'a> {
    ctx: TabContext<'a>,
    source: &'a str,
    state: ParseState,
    henry_blocks: usize,
    outputs: Vec<CosmoOutput>,
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*Property\s+job\s+\d+\s*:\s*([^;]+)").expect("valid regex literal")
    })
}

/// 解析 .tab 文件
pub fn parse_tab_file(path: &Path, ctx: TabContext<'_>) -> Result<Vec<CosmoOutput>> {
    let content = std::fs::read_to_string(path).map_err(|e| CosmosolvError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_tab_content(&content, &path.display().to_string(), ctx)
}

/// 解析 .tab 文本内容
pub fn parse_tab_content(
    content: &str,
    source: &str,
    ctx: TabContext<'_>,
) -> Result<Vec<CosmoOutput>> {
    let mut parser = TabParser {
        ctx,
        source,
        state: ParseState::Idle,
        henry_blocks: 0,
        outputs: Vec::new(),
    };

    let mut last_line = 0;
    for (lineno, line) in content.lines().enumerate() {
        last_line = lineno + 1;
        parser.feed(line, last_line)?;
    }
    parser.finish(last_line)
}

fn tab_error(source: &str, reason: String) -> CosmosolvError {
    CosmosolvError::ParseError {
        format: "COSMOtherm .tab".to_string(),
        path: source.to_string(),
        reason,
    }
}

impl<'a> TabParser<'a> {
    fn feed(&mut self, line: &str, lineno: usize) -> Result<()> {
        if line.trim_start().starts_with("Property") {
            self.finalize(lineno)?;
            self.state = match header_regex().captures(line) {
                Some(caps) => {
                    let job_type = caps[1].trim();
                    if job_type.starts_with(HENRY_JOB) {
                        ParseState::InHenryBlock(HenryBlock::default())
                    } else if job_type.starts_with(FLASH_POINT_JOB) {
                        ParseState::InFlashPointBlock { recorded: false }
                    } else {
                        tracing::debug!("Skipping unsupported property block: {}", job_type);
                        ParseState::Idle
                    }
                }
                None => ParseState::Idle,
            };
            return Ok(());
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(());
        }

        match &mut self.state {
            ParseState::Idle => Ok(()),
            ParseState::InHenryBlock(block) => {
                let index = match tokens[0].parse::<usize>() {
                    Ok(i) if i > 0 => i,
                    _ => return Ok(()),
                };
                if index == 1 {
                    block.clear();
                }
                if tokens.len() < 5 {
                    return Err(tab_error(
                        self.source,
                        format!(
                            "line {}: expected at least 5 columns in Henry row, found {}",
                            lineno,
                            tokens.len()
                        ),
                    ));
                }
                let h = parse_number(tokens[2]);
                let ln_gamma = parse_number(tokens[3]);
                let pvap = parse_number(tokens[4]);
                let gsolv = tokens.get(5).map(|t| parse_number(t));
                match (h, ln_gamma, pvap, gsolv) {
                    (Some(h), Some(ln_gamma), Some(pvap), None | Some(Some(_))) => {
                        block.h.push(h * BAR_TO_PA);
                        block.ln_gamma.push(ln_gamma);
                        block.pvap.push(pvap * BAR_TO_PA);
                        block
                            .gsolv
                            .push(gsolv.flatten().map(|g| g * KCAL_TO_J));
                        Ok(())
                    }
                    _ => Err(tab_error(
                        self.source,
                        format!(
                            "line {}: non-numeric value in Henry row '{}'",
                            lineno,
                            line.trim()
                        ),
                    )),
                }
            }
            ParseState::InFlashPointBlock { recorded } => {
                if *recorded || tokens.len() < 2 {
                    return Ok(());
                }
                if let (Some(t_flash), Some(p_sat)) =
                    (parse_number(tokens[0]), parse_number(tokens[1]))
                {
                    *recorded = true;
                    let mut output = CosmoOutput::new(self.ctx.mole_fractions.clone());
                    output.flash_point = Some(t_flash);
                    output.saturation_pressure = Some(p_sat * MBAR_TO_PA);
                    self.outputs.push(output);
                }
                Ok(())
            }
        }
    }

    /// 结束当前块；Henry 块生成一条结果
    fn finalize(&mut self, lineno: usize) -> Result<()> {
        let state = std::mem::replace(&mut self.state, ParseState::Idle);
        let block = match state {
            ParseState::InHenryBlock(block) => block,
            ParseState::InFlashPointBlock { recorded: false } => {
                tracing::warn!(
                    "Flash point block ending at line {} of {} contained no data",
                    lineno,
                    self.source
                );
                return Ok(());
            }
            _ => return Ok(()),
        };

        if block.h.is_empty() {
            return Err(tab_error(
                self.source,
                format!("Henry block ending at line {} contains no data rows", lineno),
            ));
        }
        if block.len() != self.ctx.species.len() {
            return Err(tab_error(
                self.source,
                format!(
                    "Henry block has {} rows but the job has {} species",
                    block.len(),
                    self.ctx.species.len()
                ),
            ));
        }
        let temperature = *self.ctx.temperatures.get(self.henry_blocks).ok_or_else(|| {
            tab_error(self.source, format!(
                "found Henry block #{} but only {} temperature(s) were requested",
                self.henry_blocks + 1,
                self.ctx.temperatures.len()
            ))
        })?;

        let keyed = |values: &[f64]| -> BTreeMap<String, f64> {
            self.ctx
                .species
                .iter()
                .zip(values)
                .map(|(s, v)| (s.clone(), *v))
                .collect()
        };

        let mut output = CosmoOutput::new(self.ctx.mole_fractions.clone());
        output.henry = Some(keyed(&block.h));
        output.ln_gamma = Some(keyed(&block.ln_gamma));
        output.vapor_pressure = Some(keyed(&block.pvap));
        if block.gsolv.iter().all(Option::is_some) {
            let gsolv: Vec<f64> = block.gsolv.iter().flatten().copied().collect();
            output.gsolv = Some(keyed(&gsolv));
        }
        output.temperature = Some(temperature);

        self.henry_blocks += 1;
        self.outputs.push(output);
        Ok(())
    }

    fn finish(mut self, last_line: usize) -> Result<Vec<CosmoOutput>> {
        self.finalize(last_line)?;
        Ok(self.outputs)
    }
}

/// 解析数值，兼容 Fortran 风格的 `D` 指数
fn parse_number(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TEMPERATURES: &str = r#"
COSMOtherm Version 21.0.0  (Revision 5493)
Property  job 1 : Henry law coefficients  ; T= 298.15 K ;
Settings  job 1 : T= 298.15 K ; x(1)=   0.0000 x(2)=   1.0000 ;
  Nr Compound                 H               ln(gamma)      pv              Gsolv
                              [bar]                          [bar]           [kcal/mol]
   1 ethanol             0.48410775E-02   -0.32147120    0.77918845E-01   -4.50000
   2 h2o                 0.21000000E-01    0.00000000    0.31690000E-01   -6.30000
Property  job 2 : Henry law coefficients  ; T= 308.15 K ;
Settings  job 2 : T= 308.15 K ; x(1)=   0.0000 x(2)=   1.0000 ;
  Nr Compound                 H               ln(gamma)      pv              Gsolv
   1 ethanol             0.80000000E-02   -0.30000000    0.13000000       -4.40000
   2 h2o                 0.35000000E-01    0.00000000    0.56000000E-01   -6.20000
"#;

    const FLASH_POINT: &str = r#"
Property  job 1 : Flash point temperature ;
Settings  job 1 : x(1)=   1.0000 ;
       T_flash         p_sat
        [K]            [mbar]
     285.12500        12.50000
     999.00000        99.00000
"#;

    fn species() -> Vec<String> {
        vec!["ethanol".to_string(), "h2o".to_string()]
    }

    fn fractions() -> BTreeMap<String, f64> {
        BTreeMap::from([("ethanol".to_string(), 0.0), ("h2o".to_string(), 1.0)])
    }

    #[test]
    fn test_parse_two_henry_blocks() {
        let species = species();
        let fractions = fractions();
        let temperatures = [298.15, 308.15];
        let ctx = TabContext {
            species: &species,
            temperatures: &temperatures,
            mole_fractions: &fractions,
        };

        let outputs = parse_tab_content(TWO_TEMPERATURES, "test.tab", ctx).unwrap();
        assert_eq!(outputs.len(), 2);

        assert_eq!(outputs[0].temperature, Some(298.15));
        assert_eq!(outputs[1].temperature, Some(308.15));

        let h = outputs[0].henry.as_ref().unwrap();
        assert!((h["ethanol"] - 0.48410775e-2 * 1e5).abs() < 1e-6);
        let pv = outputs[0].vapor_pressure.as_ref().unwrap();
        assert!((pv["h2o"] - 0.3169e-1 * 1e5).abs() < 1e-6);
        assert!((outputs[0].gsolv_of("ethanol").unwrap() - (-4.5 * 4184.0)).abs() < 1e-6);
        assert!((outputs[1].gsolv_of("h2o").unwrap() - (-6.2 * 4184.0)).abs() < 1e-6);
        assert_eq!(outputs[1].ln_gamma.as_ref().unwrap()["ethanol"], -0.3);
        assert_eq!(outputs[0].mole_fractions, fractions);
    }

    #[test]
    fn test_parse_flash_point() {
        let species = vec!["ethanol".to_string()];
        let fractions = BTreeMap::from([("ethanol".to_string(), 1.0)]);
        let ctx = TabContext {
            species: &species,
            temperatures: &[],
            mole_fractions: &fractions,
        };

        let outputs = parse_tab_content(FLASH_POINT, "flash.tab", ctx).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].flash_point, Some(285.125));
        assert!((outputs[0].saturation_pressure.unwrap() - 1250.0).abs() < 1e-9);
        assert!(outputs[0].henry.is_none());
    }

    #[test]
    fn test_henry_then_flash_point() {
        let content = format!(
            "{}\n{}",
            TWO_TEMPERATURES.split("Property  job 2").next().unwrap(),
            FLASH_POINT
        );
        let species = species();
        let fractions = fractions();
        let ctx = TabContext {
            species: &species,
            temperatures: &[298.15],
            mole_fractions: &fractions,
        };

        let outputs = parse_tab_content(&content, "mixed.tab", ctx).unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].temperature, Some(298.15));
        assert!(outputs[1].is_flash_point());
    }

    #[test]
    fn test_more_blocks_than_temperatures() {
        let species = species();
        let fractions = fractions();
        let ctx = TabContext {
            species: &species,
            temperatures: &[298.15],
            mole_fractions: &fractions,
        };

        let result = parse_tab_content(TWO_TEMPERATURES, "test.tab", ctx);
        assert!(matches!(result, Err(CosmosolvError::ParseError { .. })));
    }

    #[test]
    fn test_henry_block_row_count_must_match_species() {
        let content = r#"
Property  job 1 : Henry law coefficients  ; T= 298.15 K ;
   1 ethanol             0.50000000E-02   -0.32000000    0.78000000E-01   -4.50000
"#;
        let species = species();
        let fractions = fractions();
        let ctx = TabContext {
            species: &species,
            temperatures: &[298.15],
            mole_fractions: &fractions,
        };

        let result = parse_tab_content(content, "short.tab", ctx);
        assert!(matches!(
            result,
            Err(CosmosolvError::ParseError { ref reason, .. }) if reason.contains("1 rows")
        ));
    }

    #[test]
    fn test_henry_without_gsolv_column() {
        let content = r#"
Property  job 1 : Henry law coefficients  ; T= 298.15 K ;
   1 ethanol             0.50000000E-02   -0.32000000    0.78000000E-01
"#;
        let species = vec!["ethanol".to_string()];
        let fractions = BTreeMap::from([("ethanol".to_string(), 1.0)]);
        let ctx = TabContext {
            species: &species,
            temperatures: &[298.15],
            mole_fractions: &fractions,
        };

        let outputs = parse_tab_content(content, "nogsolv.tab", ctx).unwrap();
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].gsolv.is_none());
        assert!((outputs[0].henry.as_ref().unwrap()["ethanol"] - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_row_index_one_resets_block() {
        let content = r#"
Property  job 1 : Henry law coefficients  ; T= 298.15 K ;
   1 ethanol             1.0   0.0   1.0   -1.0
   1 ethanol             2.0   0.0   2.0   -2.0
"#;
        let species = vec!["ethanol".to_string()];
        let fractions = BTreeMap::from([("ethanol".to_string(), 1.0)]);
        let ctx = TabContext {
            species: &species,
            temperatures: &[298.15],
            mole_fractions: &fractions,
        };

        let outputs = parse_tab_content(content, "reset.tab", ctx).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].gsolv_of("ethanol"), Some(-2.0 * 4184.0));
    }

    #[test]
    fn test_malformed_henry_row() {
        let content = r#"
Property  job 1 : Henry law coefficients  ; T= 298.15 K ;
   1 ethanol             abc   0.0   1.0   -1.0
"#;
        let species = vec!["ethanol".to_string()];
        let fractions = BTreeMap::new();
        let ctx = TabContext {
            species: &species,
            temperatures: &[298.15],
            mole_fractions: &fractions,
        };

        assert!(parse_tab_content(content, "bad.tab", ctx).is_err());
    }

    #[test]
    fn test_fortran_exponent() {
        assert_eq!(parse_number("1.5D+02"), Some(150.0));
        assert_eq!(parse_number("-2.0"), Some(-2.0));
        assert_eq!(parse_number("ethanol"), None);
    }
}
