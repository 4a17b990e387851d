//! One-dimensional spectral helpers built on `rustfft`.
//!
//! Frequencies follow the usual DFT convention for unit sample spacing:
//! bin `k` maps to `k / n` for the first half and `(k - n) / n` for the rest.

use anyhow::{bail, Result};
use num_complex::Complex;
use rustfft::FftPlanner;

pub fn fft(signal: &[f64]) -> Result<Vec<Complex<f64>>> {
    if signal.is_empty() {
        bail!("Cannot transform an empty signal.");
    }
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(buffer.len()).process(&mut buffer);
    Ok(buffer)
}

/// Inverse transform, normalized by `1 / n`.
pub fn ifft(spectrum: &[Complex<f64>]) -> Result<Vec<Complex<f64>>> {
    if spectrum.is_empty() {
        bail!("Cannot transform an empty spectrum.");
    }
    let mut buffer = spectrum.to_vec();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(buffer.len()).process(&mut buffer);
    let scale = 1.0 / buffer.len() as f64;
    for value in &mut buffer {
        *value *= scale;
    }
    Ok(buffer)
}

pub fn fftfreq(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let nf = n as f64;
    let positive = (n - 1) / 2 + 1;
    (0..n)
        .map(|k| {
            if k < positive {
                k as f64 / nf
            } else {
                (k as f64 - nf) / nf
            }
        })
        .collect()
}

/// Index of the frequency closest to `target`. The first match wins on ties.
pub fn nearest_bin(freqs: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &f) in freqs.iter().enumerate() {
        let distance = (f - target).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

/// Magnitude of the spectrum at the bin nearest `target_freq`.
pub fn resonance_amplitude(signal: &[f64], target_freq: f64) -> Result<f64> {
    if !target_freq.is_finite() {
        bail!("Target frequency must be finite.");
    }
    let spectrum = fft(signal)?;
    let freqs = fftfreq(signal.len());
    match nearest_bin(&freqs, target_freq) {
        Some(idx) => Ok(spectrum[idx].norm()),
        None => bail!("Signal has no frequency bins."),
    }
}

/// Keeps only bins whose magnitude is at least `keep_fraction` of the peak
/// magnitude and returns the real part of the inverse transform.
pub fn threshold_filter(signal: &[f64], keep_fraction: f64) -> Result<Vec<f64>> {
    if !(0.0..=1.0).contains(&keep_fraction) {
        bail!("keep_fraction must lie in [0, 1], got {keep_fraction}.");
    }
    let mut spectrum = fft(signal)?;
    let peak = spectrum.iter().map(|c| c.norm()).fold(0.0, f64::max);
    let threshold = peak * keep_fraction;
    for value in &mut spectrum {
        if value.norm() < threshold {
            *value = Complex::new(0.0, 0.0);
        }
    }
    Ok(ifft(&spectrum)?.into_iter().map(|c| c.re).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fftfreq_matches_standard_layout() {
        let even = fftfreq(4);
        assert_eq!(even, vec![0.0, 0.25, -0.5, -0.25]);
        let odd = fftfreq(5);
        let expected = [0.0, 0.2, 0.4, -0.4, -0.2];
        for (a, b) in odd.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(fftfreq(0).is_empty());
    }

    #[test]
    fn inverse_recovers_signal() {
        let signal = [1.0, 2.0, 3.0, 4.0, 0.5, -1.0, 2.5];
        let restored = ifft(&fft(&signal).expect("fft")).expect("ifft");
        for (a, b) in signal.iter().zip(restored.iter()) {
            assert!((a - b.re).abs() < 1e-10);
            assert!(b.im.abs() < 1e-10);
        }
    }

    #[test]
    fn dc_bin_is_signal_sum() {
        let signal = [1.0, 2.0, 3.0, 4.0];
        let spectrum = fft(&signal).expect("fft");
        assert!((spectrum[0].re - 10.0).abs() < 1e-12);
        let dc = resonance_amplitude(&signal, 0.0).expect("resonance");
        assert!((dc - 10.0).abs() < 1e-12);
    }

    #[test]
    fn resonance_peaks_at_signal_frequency() {
        let n = 64;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 8.0 * i as f64 / n as f64).cos())
            .collect();
        let on_peak = resonance_amplitude(&signal, 8.0 / n as f64).expect("resonance");
        let off_peak = resonance_amplitude(&signal, 3.0 / n as f64).expect("resonance");
        assert!((on_peak - n as f64 / 2.0).abs() < 1e-9);
        assert!(off_peak < 1e-9);
    }

    #[test]
    fn nearest_bin_prefers_first_on_tie() {
        assert_eq!(nearest_bin(&[0.0, 0.5, -0.5], 0.25), Some(0));
        assert_eq!(nearest_bin(&[], 0.1), None);
    }

    #[test]
    fn threshold_filter_removes_small_components() {
        let n = 128;
        let signal: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                (2.0 * std::f64::consts::PI * 4.0 * t).sin()
                    + 0.01 * (2.0 * std::f64::consts::PI * 30.0 * t).sin()
            })
            .collect();
        let filtered = threshold_filter(&signal, 0.1).expect("filter");
        for (i, value) in filtered.iter().enumerate() {
            let clean = (2.0 * std::f64::consts::PI * 4.0 * i as f64 / n as f64).sin();
            assert!((value - clean).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_empty_input() {
        assert!(fft(&[]).is_err());
        assert!(resonance_amplitude(&[], 0.1).is_err());
        assert!(threshold_filter(&[1.0], 1.5).is_err());
    }
}
