use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    ops::Deref,
    path::Path,
};

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    error::PersistError, rng, Element, Error, Result, LOWER_WAVELENGTH_RANGE,
    UPPER_WAVELENGTH_RANGE,
};

/// Mean of the peak amplitudes
pub const AMPLITUDE_MEAN: f64 = 10.;
/// Standard deviation of the peak amplitudes
pub const AMPLITUDE_SPREAD: f64 = 3.;

/// Element peak: position and height
///
/// Serialized as a `[center, amplitude]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Peak {
    pub center: f64,
    pub amplitude: f64,
}
impl Peak {
    pub fn new(center: f64, amplitude: f64) -> Self {
        Self { center, amplitude }
    }
}
impl From<(f64, f64)> for Peak {
    fn from((center, amplitude): (f64, f64)) -> Self {
        Self { center, amplitude }
    }
}
impl From<Peak> for (f64, f64) {
    fn from(peak: Peak) -> Self {
        (peak.center, peak.amplitude)
    }
}

/// Element to [Peak] mapping
///
/// Elements missing from the table do not contribute to the spectra.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeakTable(BTreeMap<Element, Peak>);
impl Deref for PeakTable {
    type Target = BTreeMap<Element, Peak>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl FromIterator<(Element, Peak)> for PeakTable {
    fn from_iter<T: IntoIterator<Item = (Element, Peak)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl<const N: usize> From<[(Element, (f64, f64)); N]> for PeakTable {
    fn from(peaks: [(Element, (f64, f64)); N]) -> Self {
        peaks
            .into_iter()
            .map(|(element, peak)| (element, peak.into()))
            .collect()
    }
}
impl PeakTable {
    /// Generates the peak table of all the elements
    ///
    /// The peak centers are normally distributed around `peak_mean`, defaulting to the
    /// middle of the wavelength range, with a standard deviation of `peak_spread`.
    /// The peak amplitudes are normally distributed around [AMPLITUDE_MEAN] with a
    /// standard deviation of [AMPLITUDE_SPREAD].
    /// Without a seed, the table is drawn from the OS entropy.
    pub fn generate(seed: Option<u64>, peak_mean: Option<f64>, peak_spread: f64) -> Result<Self> {
        Self::generate_with(&mut rng::seeded(seed), peak_mean, peak_spread)
    }
    /// Generates the peak table drawing from the given generator
    ///
    /// The centers of all the elements are drawn first, in rank order, followed by
    /// the amplitudes, again in rank order.
    pub fn generate_with<R: Rng + ?Sized>(
        rng: &mut R,
        peak_mean: Option<f64>,
        peak_spread: f64,
    ) -> Result<Self> {
        let peak_mean =
            peak_mean.unwrap_or((UPPER_WAVELENGTH_RANGE + LOWER_WAVELENGTH_RANGE) / 2.);
        if !peak_mean.is_finite() {
            return Err(Error::invalid("peak_mean", peak_mean));
        }
        if !(peak_spread.is_finite() && peak_spread >= 0.) {
            return Err(Error::invalid("peak_position_spread", peak_spread));
        }
        let centers = Normal::new(peak_mean, peak_spread)
            .map_err(|_| Error::invalid("peak_position_spread", peak_spread))?;
        let amplitudes = Normal::new(AMPLITUDE_MEAN, AMPLITUDE_SPREAD)
            .map_err(|_| Error::invalid("amplitude_spread", AMPLITUDE_SPREAD))?;
        let centers: Vec<f64> = Element::iter().map(|_| centers.sample(rng)).collect();
        Ok(Element::iter()
            .zip(centers)
            .map(|(element, center)| (element, Peak::new(center, amplitudes.sample(rng))))
            .collect())
    }
    /// Returns the peak of an element, if any
    pub fn peak(&self, element: &Element) -> Option<&Peak> {
        self.0.get(element)
    }
    /// Loads a peak table from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
    /// Saves the peak table into a JSON file
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
