//! # LSER 参数拟合
//!
//! 由计算得到的溶剂化自由能/焓拟合 Abraham 模型参数：
//! - 溶剂参数：log10 K = c + eE + sS + aA + bB + lL（以及 ΔH 的同型模型）
//! - 溶质参数：已知溶剂系数时反推 E, S, A, B, L
//!
//! 溶剂化数据以 InChI 为键，单位 J/mol。
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs` 使用
//! - 使用 `fitting/linear.rs`, `database/`

use super::linear::{linear_fit, FitMethod, SOLUTE_BOUNDS, SOLVENT_BOUNDS};
use crate::database::InchiKeyedDatabase;
use crate::error::{CosmosolvError, Result};
use crate::models::{Solute, Solvent};

use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use std::f64::consts::LN_10;

/// 气体常数 J/(mol·K)
pub const GAS_CONSTANT: f64 = 8.314;

/// 拟合值与目标值（J/mol），用于作图
#[derive(Debug, Clone, Default)]
pub struct Parity {
    pub observed: Vec<f64>,
    pub fitted: Vec<f64>,
}

/// 溶剂 LSER 参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolventParameters {
    pub e_g: f64,
    pub s_g: f64,
    pub a_g: f64,
    pub b_g: f64,
    pub l_g: f64,
    pub c_g: f64,
    pub e_h: f64,
    pub s_h: f64,
    pub a_h: f64,
    pub b_h: f64,
    pub l_h: f64,
    pub c_h: f64,
}

impl SolventParameters {
    fn from_vectors(g: &DVector<f64>, h: &DVector<f64>) -> Self {
        SolventParameters {
            e_g: g[0],
            s_g: g[1],
            a_g: g[2],
            b_g: g[3],
            l_g: g[4],
            c_g: g[5],
            e_h: h[0],
            s_h: h[1],
            a_h: h[2],
            b_h: h[3],
            l_h: h[4],
            c_h: h[5],
        }
    }

    /// 带名称的参数列表
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("e_g", self.e_g),
            ("s_g", self.s_g),
            ("a_g", self.a_g),
            ("b_g", self.b_g),
            ("l_g", self.l_g),
            ("c_g", self.c_g),
            ("e_h", self.e_h),
            ("s_h", self.s_h),
            ("a_h", self.a_h),
            ("b_h", self.b_h),
            ("l_h", self.l_h),
            ("c_h", self.c_h),
        ]
    }
}

/// 溶剂拟合结果
#[derive(Debug, Clone)]
pub struct SolventFit {
    pub params: SolventParameters,
    /// ΔG 平均绝对误差 (J/mol)
    pub mae_dgsolv: f64,
    /// ΔH 平均绝对误差 (J/mol)
    pub mae_dhsolv: f64,
    pub gibbs_method: FitMethod,
    pub enthalpy_method: FitMethod,
    pub gibbs_parity: Parity,
    pub enthalpy_parity: Parity,
}

/// 溶质 Abraham 描述符
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoluteParameters {
    pub e: f64,
    pub s: f64,
    pub a: f64,
    pub b: f64,
    pub l: f64,
}

impl SoluteParameters {
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("E", self.e),
            ("S", self.s),
            ("A", self.a),
            ("B", self.b),
            ("L", self.l),
        ]
    }
}

/// 溶质拟合结果
#[derive(Debug, Clone)]
pub struct SoluteFit {
    pub params: SoluteParameters,
    /// ΔG 平均绝对误差 (J/mol)
    pub mae_dgsolv: f64,
    pub method: FitMethod,
    /// 参与拟合的溶剂数
    pub samples: usize,
    pub parity: Parity,
}

fn rt_ln10(temperature: f64) -> f64 {
    LN_10 * GAS_CONSTANT * temperature
}

/// 拟合溶剂参数
///
/// `dgsolv` / `dhsolv` 将溶质 InChI 映射到 ΔG / ΔH (J/mol)，
/// 每个溶质都必须存在于 `solute_db` 中。
pub fn fit_solvent_parameters(
    solute_db: &InchiKeyedDatabase<Solute>,
    dgsolv: &BTreeMap<String, f64>,
    dhsolv: &BTreeMap<String, f64>,
    temperature: f64,
) -> Result<SolventFit> {
    let rt = rt_ln10(temperature);
    let n = dgsolv.len();

    let mut features = Vec::with_capacity(n * 6);
    let mut log10k = Vec::with_capacity(n);
    let mut dh_kj = Vec::with_capacity(n);

    for (inchi, dg) in dgsolv {
        let solute = solute_db
            .get_by_inchi(inchi)
            .ok_or_else(|| CosmosolvError::SpeciesNotFound(inchi.clone()))?;
        let dh = dhsolv.get(inchi).ok_or_else(|| {
            CosmosolvError::FitError(format!("no dHsolv value for {}", inchi))
        })?;

        features.extend_from_slice(&solute.descriptors());
        features.push(1.0);
        log10k.push(-dg / rt);
        dh_kj.push(dh / 1000.0);
    }

    let a = DMatrix::from_row_slice(n, 6, &features);
    let log10k = DVector::from_vec(log10k);
    let dh_kj = DVector::from_vec(dh_kj);

    let gibbs = linear_fit(&a, &log10k, &SOLVENT_BOUNDS)?;
    let enthalpy = linear_fit(&a, &dh_kj, &SOLVENT_BOUNDS)?;
    tracing::info!(
        "Solvent fit: dG via {}, dH via {} ({} solutes)",
        gibbs.method,
        enthalpy.method,
        n
    );

    let gibbs_fitted = &a * &gibbs.params;
    let enthalpy_fitted = &a * &enthalpy.params;

    Ok(SolventFit {
        params: SolventParameters::from_vectors(&gibbs.params, &enthalpy.params),
        mae_dgsolv: gibbs.mae * rt,
        mae_dhsolv: enthalpy.mae * 1000.0,
        gibbs_method: gibbs.method,
        enthalpy_method: enthalpy.method,
        gibbs_parity: Parity {
            observed: log10k.iter().map(|k| -k * rt).collect(),
            fitted: gibbs_fitted.iter().map(|k| -k * rt).collect(),
        },
        enthalpy_parity: Parity {
            observed: dh_kj.iter().map(|h| h * 1000.0).collect(),
            fitted: enthalpy_fitted.iter().map(|h| h * 1000.0).collect(),
        },
    })
}

/// 拟合溶质参数
///
/// `dgsolv` 将溶剂 InChI 映射到该溶质在其中的 ΔG (J/mol)。
/// 只使用自由能截距 c_g 已知的溶剂。
pub fn fit_solute_parameters(
    solvent_db: &InchiKeyedDatabase<Solvent>,
    dgsolv: &BTreeMap<String, f64>,
    temperature: f64,
) -> Result<SoluteFit> {
    let rt = rt_ln10(temperature);
    let scale = rt / 1000.0;

    let mut features = Vec::new();
    let mut target = Vec::new();

    for (inchi, dg) in dgsolv {
        let solvent = solvent_db
            .get_by_inchi(inchi)
            .ok_or_else(|| CosmosolvError::SpeciesNotFound(inchi.clone()))?;
        let Some(c_g) = solvent.gibbs.c else {
            tracing::debug!("Skipping solvent {}: no c_g", solvent.name);
            continue;
        };
        let Some(slopes) = solvent.gibbs.slopes() else {
            tracing::warn!("Skipping solvent {}: incomplete e_g..l_g", solvent.name);
            continue;
        };

        tracing::debug!("Using solvent {} ({})", solvent.name, solvent.smiles);
        features.extend(slopes.iter().map(|v| v * scale));
        target.push((-dg / rt - c_g) * scale);
    }

    let samples = target.len();
    if samples == 0 {
        return Err(CosmosolvError::FitError(
            "no solvent with a defined c_g among the data".to_string(),
        ));
    }

    let a = DMatrix::from_row_slice(samples, 5, &features);
    let b = DVector::from_vec(target);
    let fit = linear_fit(&a, &b, &SOLUTE_BOUNDS)?;
    tracing::info!("Solute fit via {} ({} solvents)", fit.method, samples);

    let fitted = &a * &fit.params;
    let p = &fit.params;

    Ok(SoluteFit {
        params: SoluteParameters {
            e: p[0],
            s: p[1],
            a: p[2],
            b: p[3],
            l: p[4],
        },
        mae_dgsolv: fit.mae * 1000.0,
        method: fit.method,
        samples,
        parity: Parity {
            observed: b.iter().map(|v| v * 1000.0).collect(),
            fitted: fitted.iter().map(|v| v * 1000.0).collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::species::LserCoefficients;

    const SOLUTES: [[f64; 5]; 10] = [
        [0.000, 0.00, 0.00, 0.00, -0.323],
        [0.246, 0.42, 0.37, 0.48, 1.485],
        [0.610, 0.52, 0.00, 0.14, 2.786],
        [0.000, 0.45, 0.82, 0.35, 0.260],
        [0.179, 0.70, 0.04, 0.49, 1.696],
        [0.820, 0.60, 0.00, 0.10, 3.939],
        [0.212, 0.42, 0.37, 0.48, 2.601],
        [0.605, 1.11, 0.26, 0.28, 3.573],
        [0.403, 0.62, 0.00, 0.47, 2.314],
        [0.805, 0.89, 0.60, 0.30, 3.766],
    ];

    fn solute_db() -> InchiKeyedDatabase<Solute> {
        InchiKeyedDatabase::new(
            SOLUTES
                .iter()
                .enumerate()
                .map(|(i, d)| Solute {
                    smiles: String::new(),
                    inchi: format!("InChI=solute{}", i),
                    e: d[0],
                    s: d[1],
                    a: d[2],
                    b: d[3],
                    l: d[4],
                })
                .collect(),
        )
    }

    #[test]
    fn test_fit_solvent_parameters_noise_free() {
        let g = [0.2, 1.1, 3.5, 4.3, -0.2, -1.2];
        let h = [-5.0, -8.0, -30.0, -40.0, -2.0, -5.0];
        let t = 298.15;

        let mut dgsolv = BTreeMap::new();
        let mut dhsolv = BTreeMap::new();
        for (i, d) in SOLUTES.iter().enumerate() {
            let lin = |p: &[f64; 6]| p[5] + (0..5).map(|k| p[k] * d[k]).sum::<f64>();
            dgsolv.insert(format!("InChI=solute{}", i), -lin(&g) * rt_ln10(t));
            dhsolv.insert(format!("InChI=solute{}", i), lin(&h) * 1000.0);
        }

        let fit = fit_solvent_parameters(&solute_db(), &dgsolv, &dhsolv, t).unwrap();
        assert!(fit.mae_dgsolv < 1e-4, "dG MAE {}", fit.mae_dgsolv);
        assert!(fit.mae_dhsolv < 1e-4, "dH MAE {}", fit.mae_dhsolv);
        assert!((fit.params.s_g - 1.1).abs() < 1e-6);
        assert!((fit.params.c_g + 1.2).abs() < 1e-6);
        assert!((fit.params.b_h + 40.0).abs() < 1e-6);
        assert_eq!(fit.params.named().len(), 12);
        assert_eq!(fit.gibbs_parity.observed.len(), SOLUTES.len());

        let dh0 = dhsolv["InChI=solute0"];
        assert!((fit.enthalpy_parity.observed[0] - dh0).abs() < 1e-6);
        assert!((fit.enthalpy_parity.fitted[0] - dh0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_solvent_unknown_solute() {
        let dgsolv = BTreeMap::from([("InChI=unknown".to_string(), -1000.0)]);
        let dhsolv = dgsolv.clone();
        let result = fit_solvent_parameters(&solute_db(), &dgsolv, &dhsolv, 298.15);
        assert!(matches!(result, Err(CosmosolvError::SpeciesNotFound(_))));
    }

    fn solvent(i: usize, c_g: Option<f64>, slopes: [f64; 5]) -> Solvent {
        Solvent {
            name: format!("solvent{}", i),
            smiles: String::new(),
            inchi: format!("InChI=solvent{}", i),
            gibbs: LserCoefficients {
                c: c_g,
                e: Some(slopes[0]),
                s: Some(slopes[1]),
                a: Some(slopes[2]),
                b: Some(slopes[3]),
                l: Some(slopes[4]),
            },
            enthalpy: LserCoefficients::default(),
        }
    }

    #[test]
    fn test_fit_solute_parameters_noise_free() {
        let solvents = [
            (Some(0.238), [-0.325, 1.139, 0.916, 4.757, -0.107]),
            (Some(-0.088), [0.562, 0.766, 0.011, 0.214, 0.861]),
            (Some(0.324), [0.151, 0.617, 0.683, 4.046, 0.209]),
            (Some(0.147), [0.265, -0.056, 0.322, -0.045, 0.939]),
            (Some(0.329), [0.299, 0.671, 3.499, 4.961, 0.174]),
            (Some(-0.230), [-0.079, 0.324, 3.720, 4.612, 0.742]),
            (Some(0.011), [0.183, 0.953, 2.106, 0.921, 0.898]),
            (None, [1.0, 1.0, 1.0, 1.0, 1.0]),
        ];
        let db = InchiKeyedDatabase::new(
            solvents
                .iter()
                .enumerate()
                .map(|(i, (c, s))| solvent(i, *c, *s))
                .collect(),
        );

        let descriptors = [0.5, 0.8, 0.3, 0.6, 3.0];
        let t = 298.15;
        let dgsolv: BTreeMap<String, f64> = solvents
            .iter()
            .enumerate()
            .map(|(i, (c, s))| {
                let log10k = c.unwrap_or(0.0)
                    + s.iter().zip(descriptors.iter()).map(|(x, y)| x * y).sum::<f64>();
                (format!("InChI=solvent{}", i), -log10k * rt_ln10(t))
            })
            .collect();

        let fit = fit_solute_parameters(&db, &dgsolv, t).unwrap();
        assert_eq!(fit.samples, 7);
        assert!(fit.mae_dgsolv < 1e-4, "MAE {}", fit.mae_dgsolv);
        for ((_, got), want) in fit.params.named().iter().zip(descriptors.iter()) {
            assert!((got - want).abs() < 1e-6, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_fit_solute_requires_intercepts() {
        let db = InchiKeyedDatabase::new(vec![solvent(0, None, [1.0; 5])]);
        let dgsolv = BTreeMap::from([("InChI=solvent0".to_string(), -1000.0)]);
        let result = fit_solute_parameters(&db, &dgsolv, 298.15);
        assert!(matches!(result, Err(CosmosolvError::FitError(_))));
    }
}
