//! # 拟合对比图 (parity plot)
//!
//! 以计算值为横轴、拟合值为纵轴绘制散点，并画出 y = x 参考线。
//! 输出格式由扩展名决定：`.svg` 为 SVG，其余为 PNG。
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs` 调用
//! - 使用 `fitting/lser.rs` 的 Parity 结构
//! - 使用 `plotters` 渲染图表

use crate::error::{CosmosolvError, Result};
use crate::fitting::Parity;

use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 800;

/// 生成 parity plot
pub fn generate_parity_plot(parity: &Parity, output_path: &Path, title: &str) -> Result<()> {
    let (lo, hi) = axis_range(parity)?;

    let is_svg = output_path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if is_svg {
        let root = SVGBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_parity_chart(&root, parity, title, lo, hi)?;
        root.present()
            .map_err(|e| CosmosolvError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_parity_chart(&root, parity, title, lo, hi)?;
        root.present()
            .map_err(|e| CosmosolvError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 两轴共用的范围（kJ/mol），两端留 5% 余量
fn axis_range(parity: &Parity) -> Result<(f64, f64)> {
    if parity.observed.is_empty() || parity.observed.len() != parity.fitted.len() {
        return Err(CosmosolvError::Other("No data to plot".to_string()));
    }

    let values = parity.observed.iter().chain(parity.fitted.iter()).map(|v| v / 1000.0);
    let lo = values.clone().fold(f64::INFINITY, f64::min);
    let hi = values.fold(f64::NEG_INFINITY, f64::max);
    let margin = ((hi - lo).abs() * 0.05).max(0.5);
    Ok((lo - margin, hi + margin))
}

fn draw_parity_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    parity: &Parity,
    title: &str,
    lo: f64,
    hi: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| CosmosolvError::Other(format!("{:?}", e)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, lo..hi)
        .map_err(|e| CosmosolvError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("COSMOtherm (kJ/mol)")
        .y_desc("LSER fit (kJ/mol)")
        .draw()
        .map_err(|e| CosmosolvError::Other(format!("{:?}", e)))?;

    chart
        .draw_series(LineSeries::new(vec![(lo, lo), (hi, hi)], BLACK.stroke_width(1)))
        .map_err(|e| CosmosolvError::Other(format!("{:?}", e)))?;

    let point_color = RGBColor(0, 102, 204);
    chart
        .draw_series(
            parity
                .observed
                .iter()
                .zip(&parity.fitted)
                .map(|(x, y)| Circle::new((x / 1000.0, y / 1000.0), 4, point_color.filled())),
        )
        .map_err(|e| CosmosolvError::Other(format!("{:?}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range() {
        let parity = Parity {
            observed: vec![-20000.0, -10000.0],
            fitted: vec![-21000.0, -9000.0],
        };
        let (lo, hi) = axis_range(&parity).unwrap();
        assert!(lo < -21.0);
        assert!(hi > -9.0);
        assert!((lo + 21.6).abs() < 1e-9);

        let empty = Parity::default();
        assert!(axis_range(&empty).is_err());
    }
}
