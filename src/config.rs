use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::PersistError, linspace, CompositionSampler, Element, Error, Result, SynthesisParams,
    LOWER_WAVELENGTH_RANGE, UPPER_WAVELENGTH_RANGE,
};

/// Dataset generation configuration
///
/// Missing entries of a configuration file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub num_spectra: usize,
    pub wavelength_min: f64,
    pub wavelength_max: f64,
    pub num_points: usize,
    pub elements: Vec<Element>,
    pub max_fraction: f64,
    pub min_elements: usize,
    pub max_elements: Option<usize>,
    pub peak_position_spread: f64,
    /// Mean of the peak positions, the middle of the wavelength range if `None`
    pub peak_mean: Option<f64>,
    pub peak_width: f64,
    pub background_width: f64,
    pub background_center: Option<f64>,
    pub background_level: f64,
    pub noise_level: f64,
    pub seed: Option<u64>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            num_spectra: 1000,
            wavelength_min: LOWER_WAVELENGTH_RANGE,
            wavelength_max: UPPER_WAVELENGTH_RANGE,
            num_points: 1000,
            elements: Element::all(),
            max_fraction: 1.,
            min_elements: 1,
            max_elements: Some(4),
            peak_position_spread: 200.,
            peak_mean: None,
            peak_width: 20.,
            background_width: 1000.,
            background_center: Some(500.),
            background_level: 2.,
            noise_level: 0.1,
            seed: None,
        }
    }
}
impl Config {
    /// Loads and validates a configuration from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        let this: Self = serde_json::from_reader(BufReader::new(file))?;
        this.validate()?;
        Ok(this)
    }
    /// Saves the configuration into a JSON file
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
    /// Checks the consistency of the configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_points < 1 {
            return Err(Error::ShapeMismatch(
                "the wavelength grid must have at least one point".into(),
            ));
        }
        if !self.wavelength_min.is_finite() {
            return Err(Error::invalid("wavelength_min", self.wavelength_min));
        }
        if !(self.wavelength_max.is_finite() && self.wavelength_max > self.wavelength_min) {
            return Err(Error::invalid("wavelength_max", self.wavelength_max));
        }
        if !(self.peak_position_spread.is_finite() && self.peak_position_spread >= 0.) {
            return Err(Error::invalid(
                "peak_position_spread",
                self.peak_position_spread,
            ));
        }
        self.sampler()?;
        self.synthesis_params().validate()
    }
    /// Wavelength grid
    pub fn wavelengths(&self) -> Vec<f64> {
        linspace(self.wavelength_min, self.wavelength_max, self.num_points)
    }
    /// Composition sampler
    pub fn sampler(&self) -> Result<CompositionSampler> {
        CompositionSampler::new(&self.elements)
            .max_fraction(self.max_fraction)
            .min_elements(self.min_elements)
            .max_elements(self.max_elements)
            .build()
    }
    /// Synthesis parameters
    pub fn synthesis_params(&self) -> SynthesisParams {
        SynthesisParams {
            peak_width: self.peak_width,
            noise_level: self.noise_level,
            background_center: self.background_center,
            background_level: self.background_level,
            background_width: self.background_width,
        }
    }
}
