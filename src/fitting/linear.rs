//! # 线性模型拟合
//!
//! 求 x 使 |Ax - b| 的平均绝对残差最小。依次尝试三种方法，
//! 返回残差最小者：
//! - `LR`: SVD 最小二乘（闭式解）
//! - `LS`: 以 LR 结果为初值的 Levenberg-Marquardt 局部优化
//!   （平滑化的绝对残差目标）
//! - `DA`: 有界模拟退火（随机初值）+ 局部优化
//!
//! ## 依赖关系
//! - 被 `fitting/lser.rs` 使用
//! - 使用 `nalgebra`, `levenberg-marquardt`, `rand`

use crate::error::{CosmosolvError, Result};

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 溶剂参数 (e, s, a, b, l, c) 的搜索区间
pub const SOLVENT_BOUNDS: [(f64, f64); 6] = [
    (-5.0, 10.0),
    (-8.0, 10.0),
    (-2.0, 12.0),
    (-2.0, 25.0),
    (-1.0, 3.0),
    (-6.0, 6.0),
];

/// 溶质描述符 (E, S, A, B, L) 的搜索区间
pub const SOLUTE_BOUNDS: [(f64, f64); 5] = [
    (-1.0, 5.0),
    (-1.0, 6.0),
    (0.0, 3.0),
    (0.0, 4.0),
    (-1.0, 30.0),
];

/// 平滑绝对值 sqrt(e² + ε²) 中的 ε²
const SMOOTHING: f64 = 1.0e-12;

/// 拟合方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    LinearRegression,
    LeastSquares,
    Annealing,
}

impl std::fmt::Display for FitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitMethod::LinearRegression => write!(f, "LR"),
            FitMethod::LeastSquares => write!(f, "LS"),
            FitMethod::Annealing => write!(f, "DA"),
        }
    }
}

/// 拟合结果
#[derive(Debug, Clone)]
pub struct LinearFit {
    pub params: DVector<f64>,
    /// 平均绝对残差
    pub mae: f64,
    pub method: FitMethod,
}

/// 退火参数
#[derive(Debug, Clone)]
pub struct AnnealingOptions {
    pub max_iter: usize,
    /// 初始温度相对初始残差的比例
    pub initial_temp_ratio: f64,
    /// 末温度 / 初温度
    pub final_temp_ratio: f64,
    pub seed: u64,
}

impl Default for AnnealingOptions {
    fn default() -> Self {
        AnnealingOptions {
            max_iter: 20_000,
            initial_temp_ratio: 1.0,
            final_temp_ratio: 1.0e-6,
            seed: 42,
        }
    }
}

/// 平均绝对残差 mean(|Ax - b|)
pub fn mean_absolute_residual(x: &DVector<f64>, a: &DMatrix<f64>, b: &DVector<f64>) -> f64 {
    (a * x - b).abs().mean()
}

/// 使用默认退火参数拟合
pub fn linear_fit(a: &DMatrix<f64>, b: &DVector<f64>, bounds: &[(f64, f64)]) -> Result<LinearFit> {
    linear_fit_with(a, b, bounds, &AnnealingOptions::default())
}

/// 三种方法拟合并返回平均绝对残差最小者
pub fn linear_fit_with(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    bounds: &[(f64, f64)],
    options: &AnnealingOptions,
) -> Result<LinearFit> {
    if a.nrows() == 0 || a.ncols() == 0 {
        return Err(CosmosolvError::FitError("no samples to fit".to_string()));
    }
    if a.nrows() != b.len() {
        return Err(CosmosolvError::FitError(format!(
            "feature matrix has {} rows but target has {} values",
            a.nrows(),
            b.len()
        )));
    }
    if bounds.len() != a.ncols() {
        return Err(CosmosolvError::FitError(format!(
            "{} bounds given for {} parameters",
            bounds.len(),
            a.ncols()
        )));
    }

    let lr = least_squares_solve(a, b)?;
    let mut candidates = vec![(FitMethod::LinearRegression, lr.clone())];

    if let Some(ls) = refine(a, b, lr) {
        candidates.push((FitMethod::LeastSquares, ls));
    }

    let annealed = anneal(a, b, bounds, options);
    let da = refine(a, b, annealed.clone())
        .map(|x| clamp(x, bounds))
        .filter(|x| mean_absolute_residual(x, a, b) <= mean_absolute_residual(&annealed, a, b))
        .unwrap_or(annealed);
    candidates.push((FitMethod::Annealing, da));

    let mut best: Option<LinearFit> = None;
    for (method, params) in candidates {
        let mae = mean_absolute_residual(&params, a, b);
        tracing::debug!("{} candidate: MAE = {:.6e}", method, mae);
        if !mae.is_finite() {
            continue;
        }
        if best.as_ref().map_or(true, |current| mae < current.mae) {
            best = Some(LinearFit {
                params,
                mae,
                method,
            });
        }
    }

    best.ok_or_else(|| CosmosolvError::FitError("all fitting methods diverged".to_string()))
}

/// SVD 最小二乘
fn least_squares_solve(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    a.clone()
        .svd(true, true)
        .solve(b, 1.0e-12)
        .map_err(|e| CosmosolvError::FitError(format!("SVD solve failed: {}", e)))
}

/// 平滑绝对残差的最小二乘问题：r_i = (e_i² + ε²)^(1/4)，
/// 使 Σ r_i² = Σ sqrt(e_i² + ε²) ≈ Σ |e_i|
struct AbsoluteResidualProblem<'a> {
    a: &'a DMatrix<f64>,
    b: &'a DVector<f64>,
    x: DVector<f64>,
}

impl AbsoluteResidualProblem<'_> {
    fn errors(&self) -> DVector<f64> {
        self.a * &self.x - self.b
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for AbsoluteResidualProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.x.copy_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.x.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        Some(self.errors().map(|e| (e * e + SMOOTHING).powf(0.25)))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let errors = self.errors();
        let mut jac = self.a.clone();
        for (i, e) in errors.iter().enumerate() {
            let weight = 0.5 * e * (e * e + SMOOTHING).powf(-0.75);
            jac.row_mut(i).scale_mut(weight);
        }
        Some(jac)
    }
}

/// Levenberg-Marquardt 局部优化；样本数少于参数数时跳过
fn refine(a: &DMatrix<f64>, b: &DVector<f64>, start: DVector<f64>) -> Option<DVector<f64>> {
    if a.nrows() < a.ncols() {
        return None;
    }
    let problem = AbsoluteResidualProblem { a, b, x: start };
    let (problem, report) = LevenbergMarquardt::new().minimize(problem);
    tracing::trace!("Levenberg-Marquardt terminated: {:?}", report.termination);
    if problem.x.iter().all(|v| v.is_finite()) {
        Some(problem.x)
    } else {
        None
    }
}

fn clamp(mut x: DVector<f64>, bounds: &[(f64, f64)]) -> DVector<f64> {
    for (v, &(lo, hi)) in x.iter_mut().zip(bounds) {
        *v = v.clamp(lo, hi);
    }
    x
}

/// 有界模拟退火，逐坐标扰动，Metropolis 接受准则
fn anneal(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    bounds: &[(f64, f64)],
    options: &AnnealingOptions,
) -> DVector<f64> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let n = bounds.len();

    let mut current = DVector::from_iterator(
        n,
        bounds.iter().map(|&(lo, hi)| rng.gen_range(lo..=hi)),
    );
    let mut current_loss = mean_absolute_residual(&current, a, b);
    let mut best = current.clone();
    let mut best_loss = current_loss;

    let t0 = (options.initial_temp_ratio * current_loss).max(f64::EPSILON);
    let iters = options.max_iter.max(1);
    let cooling = options.final_temp_ratio.powf(1.0 / iters as f64);
    let mut temp = t0;

    for k in 0..iters {
        let j = k % n;
        let (lo, hi) = bounds[j];
        // 步长随温度收缩
        let scale = (temp / t0).sqrt().max(1.0e-4);
        let step = rng.gen_range(-1.0_f64..=1.0) * (hi - lo) * 0.5 * scale;

        let old = current[j];
        current[j] = (old + step).clamp(lo, hi);
        let loss = mean_absolute_residual(&current, a, b);
        let delta = loss - current_loss;

        if delta <= 0.0 || rng.gen::<f64>() < (-delta / temp).exp() {
            current_loss = loss;
            if loss < best_loss {
                best_loss = loss;
                best.copy_from(&current);
            }
        } else {
            current[j] = old;
        }

        temp *= cooling;
    }

    tracing::trace!("Annealing finished: best MAE = {:.6e}", best_loss);
    best
}
