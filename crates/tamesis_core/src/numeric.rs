use anyhow::{anyhow, bail, Result};
use nalgebra::{DMatrix, DVector};

/// `count` evenly spaced values over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn mean_squared_error(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        bail!("Length mismatch: {} vs {}.", a.len(), b.len());
    }
    let squared: Vec<f64> = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).collect();
    Ok(mean(&squared))
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Index of the smallest value; the first one wins on ties.
pub fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Least-squares polynomial fit. Coefficients are returned highest power first.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        bail!("polyfit needs x and y of equal length ({} vs {}).", x.len(), y.len());
    }
    if x.len() <= degree {
        bail!("polyfit of degree {degree} needs more than {degree} points, got {}.", x.len());
    }
    let cols = degree + 1;
    let vandermonde = DMatrix::from_fn(x.len(), cols, |r, c| x[r].powi((degree - c) as i32));
    let rhs = DVector::from_column_slice(y);
    let svd = vandermonde.svd(true, true);
    let solution = svd
        .solve(&rhs, 1e-12)
        .map_err(|err| anyhow!("polyfit least-squares solve failed: {err}"))?;
    Ok(solution.iter().copied().collect())
}

pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Discrete convolution trimmed to the length of the longer input and centred
/// on the full convolution.
pub fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }
    let full_len = signal.len() + kernel.len() - 1;
    let mut full = vec![0.0; full_len];
    for (i, &s) in signal.iter().enumerate() {
        for (j, &k) in kernel.iter().enumerate() {
            full[i + j] += s * k;
        }
    }
    let out_len = signal.len().max(kernel.len());
    let offset = (signal.len().min(kernel.len()) - 1) / 2;
    full[offset..offset + out_len].to_vec()
}

/// Boxcar smoothing of width `window`, same length as the input.
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return signal.to_vec();
    }
    let kernel = vec![1.0 / window as f64; window];
    convolve_same(signal, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        let values = linspace(0.0, 0.5, 20);
        assert_eq!(values.len(), 20);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[19], 0.5);
        assert!(linspace(1.0, 2.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn mean_and_mse() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        let mse = mean_squared_error(&[1.0, 2.0], &[2.0, 4.0]).expect("equal lengths");
        assert!((mse - 2.5).abs() < 1e-12);
        assert!(mean_squared_error(&[1.0], &[]).is_err());
    }

    #[test]
    fn argmin_prefers_first_minimum() {
        assert_eq!(argmin(&[3.0, 1.0, 1.0, 2.0]), Some(1));
        assert_eq!(argmin(&[]), None);
        assert_eq!(min(&[3.0, -1.0]), Some(-1.0));
        assert_eq!(max(&[3.0, -1.0]), Some(3.0));
    }

    #[test]
    fn polyfit_recovers_exact_quadratic() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v * v - 3.0 * v + 1.0).collect();
        let coeffs = polyfit(&x, &y, 2).expect("fit");
        assert!((coeffs[0] - 2.0).abs() < 1e-8);
        assert!((coeffs[1] + 3.0).abs() < 1e-8);
        assert!((coeffs[2] - 1.0).abs() < 1e-8);
        assert!((polyval(&coeffs, 4.0) - 21.0).abs() < 1e-6);
        assert!(polyfit(&x[..2], &y[..2], 2).is_err());
    }

    #[test]
    fn convolve_same_centres_output() {
        let out = convolve_same(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]);
        // Full convolution is [0, 1, 2.5, 4, 1.5]; the centred slice starts at 1.
        assert_eq!(out, vec![1.0, 2.5, 4.0]);
    }

    #[test]
    fn moving_average_of_constant_interior() {
        let signal = vec![1.0; 30];
        let smooth = moving_average(&signal, 10);
        assert_eq!(smooth.len(), 30);
        for value in &smooth[5..25] {
            assert!((value - 1.0).abs() < 1e-12);
        }
        assert!(smooth[0] < 1.0);
    }
}
