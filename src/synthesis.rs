//! Spectrum synthesis
//!
//! A hallucinated spectrum is the sum of
//!  - one Gaussian peak per element of the composition, scaled by the element fraction,
//!  - a broad Gaussian background,
//!
//! each one with its own additive Gaussian noise.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::{Composition, Error, PeakTable, Result};

/// Standard deviation of the background center around the middle of the grid,
/// when the center is not given
pub const BACKGROUND_CENTER_SPREAD: f64 = 200.;

/// Returns `n` evenly spaced values from `min` to `max`, both included
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![min],
        _ => {
            let step = (max - min) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { max } else { min + i as f64 * step })
                .collect()
        }
    }
}

/// Unnormalized Gaussian `height * exp(-(x - center)^2 / (2 * width^2))`
pub fn gaussian(x: f64, center: f64, height: f64, width: f64) -> f64 {
    height * (-(x - center).powi(2) / (2. * width * width)).exp()
}

/// Synthesis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// Standard deviation of the element peaks
    pub peak_width: f64,
    /// Standard deviation of the additive noise
    pub noise_level: f64,
    /// Center of the background, drawn at random if `None`
    pub background_center: Option<f64>,
    /// Height of the background
    pub background_level: f64,
    /// Standard deviation of the background
    pub background_width: f64,
}
impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            peak_width: 0.5,
            noise_level: 0.05,
            background_center: None,
            background_level: 0.01,
            background_width: 100.,
        }
    }
}
impl SynthesisParams {
    /// Checks that the widths are positive and that the noise level is not negative
    pub fn validate(&self) -> Result<()> {
        if !(self.peak_width > 0.) {
            return Err(Error::invalid("peak_width", self.peak_width));
        }
        if !(self.background_width > 0.) {
            return Err(Error::invalid("background_width", self.background_width));
        }
        if !(self.noise_level.is_finite() && self.noise_level >= 0.) {
            return Err(Error::invalid("noise_level", self.noise_level));
        }
        Ok(())
    }
    fn noise(&self) -> Result<Normal<f64>> {
        Normal::new(0., self.noise_level)
            .map_err(|_| Error::invalid("noise_level", self.noise_level))
    }
}

/// Synthesizes the spectrum of a composition over the wavelength grid
///
/// The elements of the composition are processed in rank order; elements without an
/// entry in the peak table are skipped. For each element, the noise is drawn
/// sample by sample, after which the background center is drawn (if not given)
/// followed by the background noise.
/// Amplitudes are not clipped and may be negative.
pub fn synthesize<R: Rng + ?Sized>(
    wavelengths: &[f64],
    composition: &Composition,
    peak_table: &PeakTable,
    params: &SynthesisParams,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if wavelengths.is_empty() {
        return Err(Error::ShapeMismatch("the wavelength grid is empty".into()));
    }
    params.validate()?;
    let noise = params.noise()?;

    let mut amplitudes = vec![0f64; wavelengths.len()];
    for (element, fraction) in composition.iter() {
        let Some(peak) = peak_table.peak(element) else {
            continue;
        };
        for (a, &w) in amplitudes.iter_mut().zip(wavelengths) {
            let amplitude =
                gaussian(w, peak.center, peak.amplitude, params.peak_width) + noise.sample(rng);
            *a += fraction * amplitude;
        }
    }

    let background_center = match params.background_center {
        Some(center) => center,
        None => {
            let mean = wavelengths.iter().sum::<f64>() / wavelengths.len() as f64;
            Normal::new(mean, BACKGROUND_CENTER_SPREAD)
                .map_err(|_| Error::invalid("background_center", mean))?
                .sample(rng)
        }
    };
    for (a, &w) in amplitudes.iter_mut().zip(wavelengths) {
        *a += gaussian(
            w,
            background_center,
            params.background_level,
            params.background_width,
        ) + noise.sample(rng);
    }
    Ok(amplitudes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rng, Element::*};

    fn noiseless() -> SynthesisParams {
        SynthesisParams {
            peak_width: 100.,
            noise_level: 0.,
            background_center: Some(500.),
            background_level: 2.,
            background_width: 1000.,
        }
    }

    #[test]
    fn grid() {
        assert_eq!(linspace(300., 1100., 5), vec![300., 500., 700., 900., 1100.]);
        assert_eq!(linspace(1., 2., 1), vec![1.]);
        assert!(linspace(1., 2., 0).is_empty());
        let grid = linspace(300., 1100., 1000);
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[999], 1100.);
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn hydrogen_helium() {
        let wavelengths = linspace(300., 1100., 5);
        let peak_table = PeakTable::from([(H, (656.3, 1.)), (He, (587.6, 1.))]);
        let composition = Composition::from([(H, 0.5), (He, 0.5)]);
        let amplitudes = synthesize(
            &wavelengths,
            &composition,
            &peak_table,
            &noiseless(),
            &mut rng::seeded(Some(42)),
        )
        .unwrap();
        let expected = [
            1.9692687494597727,
            2.4880680981129544,
            2.6807103438065765,
            1.8756972671092706,
            1.6705679635067683,
        ];
        amplitudes
            .iter()
            .zip(expected)
            .for_each(|(a, e)| assert!((a - e).abs() < 1e-12, "{a} != {e}"));
    }

    #[test]
    fn analytic_at_zero_noise() {
        let wavelengths = linspace(300., 1100., 257);
        let peak_table = PeakTable::generate(Some(1), None, 200.).unwrap();
        let composition = Composition::from([(C, 0.2), (N, 0.3), (O, 0.5)]);
        let params = noiseless();
        let amplitudes = synthesize(
            &wavelengths,
            &composition,
            &peak_table,
            &params,
            &mut rng::seeded(None),
        )
        .unwrap();
        for (a, &w) in amplitudes.iter().zip(&wavelengths) {
            let expected = composition
                .iter()
                .map(|(e, f)| {
                    let peak = peak_table[e];
                    f * gaussian(w, peak.center, peak.amplitude, params.peak_width)
                })
                .sum::<f64>()
                + gaussian(w, 500., 2., 1000.);
            assert!((a - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn shape() {
        let peak_table = PeakTable::generate(Some(0), None, 200.).unwrap();
        let composition = Composition::from([(Fe, 1.)]);
        let mut rng = rng::seeded(Some(0));
        for n in [1, 2, 10, 1000] {
            let wavelengths = linspace(300., 1100., n);
            let amplitudes = synthesize(
                &wavelengths,
                &composition,
                &peak_table,
                &SynthesisParams::default(),
                &mut rng,
            )
            .unwrap();
            assert_eq!(amplitudes.len(), n);
        }
    }

    #[test]
    fn reproducible() {
        let wavelengths = linspace(300., 1100., 100);
        let peak_table = PeakTable::generate(Some(0), None, 200.).unwrap();
        let composition = Composition::from([(Fe, 0.4), (Ni, 0.6)]);
        let params = SynthesisParams::default();
        let a = synthesize(&wavelengths, &composition, &peak_table, &params, &mut rng::seeded(Some(9)));
        let b = synthesize(&wavelengths, &composition, &peak_table, &params, &mut rng::seeded(Some(9)));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn missing_peak_contributes_nothing() {
        let wavelengths = linspace(300., 1100., 50);
        let peak_table = PeakTable::from([(H, (656.3, 1.)), (He, (587.6, 1.))]);
        let with_li = Composition::from([(H, 0.25), (He, 0.25), (Li, 0.5)]);
        let without_li = with_li.without(&Li);
        let params = SynthesisParams {
            noise_level: 0.1,
            ..noiseless()
        };
        let a = synthesize(&wavelengths, &with_li, &peak_table, &params, &mut rng::seeded(Some(1)));
        let b = synthesize(&wavelengths, &without_li, &peak_table, &params, &mut rng::seeded(Some(1)));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn random_background_center() {
        let wavelengths = linspace(300., 1100., 50);
        let params = SynthesisParams {
            background_center: None,
            ..noiseless()
        };
        let a = synthesize(
            &wavelengths,
            &Composition::default(),
            &PeakTable::default(),
            &params,
            &mut rng::seeded(Some(2)),
        )
        .unwrap();
        let mean = wavelengths.iter().sum::<f64>() / wavelengths.len() as f64;
        let mut rng = rng::seeded(Some(2));
        let center = Normal::new(mean, BACKGROUND_CENTER_SPREAD)
            .unwrap()
            .sample(&mut rng);
        a.iter()
            .zip(&wavelengths)
            .for_each(|(a, &w)| assert!((a - gaussian(w, center, 2., 1000.)).abs() < 1e-12));
    }

    #[test]
    fn errors() {
        let peak_table = PeakTable::default();
        let composition = Composition::default();
        let mut rng = rng::seeded(Some(0));
        let params = SynthesisParams {
            peak_width: 0.,
            ..Default::default()
        };
        assert!(matches!(
            synthesize(&[1., 2.], &composition, &peak_table, &params, &mut rng),
            Err(Error::InvalidParameter { name: "peak_width", .. })
        ));
        let params = SynthesisParams {
            background_width: -1.,
            ..Default::default()
        };
        assert!(matches!(
            synthesize(&[1., 2.], &composition, &peak_table, &params, &mut rng),
            Err(Error::InvalidParameter { name: "background_width", .. })
        ));
        for noise_level in [-0.1, f64::NAN] {
            let params = SynthesisParams {
                noise_level,
                ..Default::default()
            };
            assert!(matches!(
                synthesize(&[1., 2.], &composition, &peak_table, &params, &mut rng),
                Err(Error::InvalidParameter {
                    name: "noise_level",
                    ..
                })
            ));
        }
        assert!(matches!(
            synthesize(&[], &composition, &peak_table, &Default::default(), &mut rng),
            Err(Error::ShapeMismatch(_))
        ));
    }
}
