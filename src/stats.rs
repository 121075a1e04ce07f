//! Small numeric helpers for trend lines

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson correlation coefficient.
/// Undefined for fewer than two points or a constant series.
pub fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Least-squares line `y = slope * x + intercept`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

/// Coefficient of determination of the least-squares line
pub fn r_squared(xs: &[f64], ys: &[f64]) -> Option<f64> {
    correlation(xs, ys).map(|r| r * r)
}

/// `n` evenly spaced values over `[start, end]`
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// `n` values evenly spaced on a log10 scale over `[start, end]`
pub fn logspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    linspace(start.log10(), end.log10(), n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_close(correlation(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0);
        assert_close(correlation(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0);
        assert_eq!(correlation(&xs, &[1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(correlation(&[1.0], &[1.0]), None);
        assert_eq!(correlation(&xs, &[1.0, 2.0]), None);
    }

    #[test]
    fn test_linear_fit() {
        let fit = linear_fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert_close(fit.slope, 2.0);
        assert_close(fit.intercept, 1.0);
        assert_close(fit.eval(10.0), 21.0);
        assert_eq!(linear_fit(&[2.0, 2.0], &[1.0, 3.0]), None);
    }

    #[test]
    fn test_r_squared_on_noisy_data() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.1, 3.9, 6.2, 7.8, 10.1];
        let r2 = r_squared(&xs, &ys).unwrap();
        assert!(r2 > 0.99 && r2 < 1.0);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 0), Vec::<f64>::new());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_logspace() {
        let values = logspace(0.01, 100.0, 5);
        let expected = [0.01, 0.1, 1.0, 10.0, 100.0];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() / e < 1e-9);
        }
    }
}
