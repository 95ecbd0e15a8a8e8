//! Numeric helpers shared by the aggregation catalog
//!
//! Every statistic that is undefined for short input returns `None` rather
//! than NaN: mean needs at least one value, sample std-dev and correlation
//! need at least two. Callers render `None` as "N/A".

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linearly interpolated quantile, `q` in [0, 1]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Sample standard deviation (n - 1 denominator); undefined below two values
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Pearson correlation; undefined below two pairs or when either side has
/// zero variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Eight-number summary in the shape of pandas `describe()`
#[derive(Debug, Clone, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

pub fn describe(values: &[f64]) -> Describe {
    Describe {
        count: values.len(),
        mean: mean(values),
        std: std_dev(values),
        min: values.iter().copied().reduce(f64::min),
        q1: quantile(values, 0.25),
        median: quantile(values, 0.5),
        q3: quantile(values, 0.75),
        max: values.iter().copied().reduce(f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        let vals = [5.0, 6.0, 10.0, 20.0, 4.0];
        assert_eq!(mean(&vals), Some(9.0));
        assert_eq!(median(&vals), Some(6.0));
    }

    #[test]
    fn test_median_even_count_interpolates() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn test_empty_input_is_none_not_nan() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_std_dev_single_value_undefined() {
        assert_eq!(std_dev(&[7.0]), None);
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138).abs() < 0.01);
    }

    #[test]
    fn test_pearson_bounds_and_symmetry() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 8.0, 7.0, 3.0];
        let r = pearson(&x, &y).unwrap();
        assert!((-1.0..=1.0).contains(&r));
        assert!(r < 0.0);
        let r2 = pearson(&y, &x).unwrap();
        assert!((r - r2).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined_cases() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        // zero variance on one side
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[2.0, 3.0, 4.0]), None);
    }

    #[test]
    fn test_describe_quartiles() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(d.count, 5);
        assert_eq!(d.q1, Some(2.0));
        assert_eq!(d.median, Some(3.0));
        assert_eq!(d.q3, Some(4.0));
        assert_eq!(d.min, Some(1.0));
        assert_eq!(d.max, Some(5.0));
    }
}
