//! Dataset of hallucinated spectra
//!
//! All the spectra of a dataset share the same wavelength grid and peak table.
//! On disk, a dataset is a folder with:
//!  - `spectra_{i}.json`: the spectra,
//!  - `hallucination_parameters.json`: the [Config] used to generate them,
//!  - `mapping.json`: the [PeakTable].

use std::{fs, path::Path, time::Instant};

use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;

use crate::{
    error::PersistError,
    rng::{self, Stream},
    synthesize, CompositionSampler, Config, PeakTable, Result, Spectrum, SynthesisParams,
};

pub const PARAMETERS_FILE: &str = "hallucination_parameters.json";
pub const MAPPING_FILE: &str = "mapping.json";

/// Name of the file of spectrum # `index`
pub fn spectrum_file_name(index: usize) -> String {
    format!("spectra_{}.json", index)
}

/// Hallucinated spectra generator
#[derive(Debug, Clone)]
pub struct Dataset {
    config: Config,
    wavelengths: Vec<f64>,
    peak_table: PeakTable,
    sampler: CompositionSampler,
    params: SynthesisParams,
}
impl Dataset {
    /// Creates a dataset generator, drawing the peak table from the configuration seed
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let peak_table = PeakTable::generate_with(
            &mut rng::stream(config.seed, Stream::PeakTable, 0),
            config.peak_mean,
            config.peak_position_spread,
        )?;
        Self::with_peak_table(config, peak_table)
    }
    /// Creates a dataset generator with a given peak table
    pub fn with_peak_table(config: Config, peak_table: PeakTable) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            wavelengths: config.wavelengths(),
            sampler: config.sampler()?,
            params: config.synthesis_params(),
            peak_table,
            config,
        })
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn peak_table(&self) -> &PeakTable {
        &self.peak_table
    }
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }
    /// Number of spectra
    pub fn len(&self) -> usize {
        self.config.num_spectra
    }
    pub fn is_empty(&self) -> bool {
        self.config.num_spectra == 0
    }
    /// Returns spectrum # `index`
    ///
    /// The composition and the noise of the spectrum are drawn from streams seeded
    /// with the dataset seed and `index`, so a spectrum does not depend on the others.
    pub fn spectrum(&self, index: usize) -> Result<Spectrum> {
        let seed = self.config.seed;
        let composition = self
            .sampler
            .sample(&mut rng::stream(seed, Stream::Composition, index as u64))?;
        let amplitude = synthesize(
            &self.wavelengths,
            &composition,
            &self.peak_table,
            &self.params,
            &mut rng::stream(seed, Stream::Synthesis, index as u64),
        )?;
        Spectrum::new(seed, composition, self.wavelengths.clone(), amplitude)
    }
    /// Generates all the spectra
    pub fn generate(&self) -> Result<Vec<Spectrum>> {
        self.generate_with_progress(ProgressBar::hidden())
    }
    /// Generates all the spectra, reporting progress to `pb`
    pub fn generate_with_progress(&self, pb: ProgressBar) -> Result<Vec<Spectrum>> {
        (0..self.len())
            .into_par_iter()
            .progress_with(pb)
            .map(|i| self.spectrum(i))
            .collect()
    }
    /// Generates and writes the spectra, the configuration and the peak table into `path`
    pub fn save<P: AsRef<Path>>(&self, path: P, pb: ProgressBar) -> Result<()> {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        let now = Instant::now();
        log::info!("Generating {} hallucinated spectra", self.len());
        (0..self.len())
            .into_par_iter()
            .progress_with(pb)
            .map(|i| self.spectrum(i)?.to_path(path.join(spectrum_file_name(i))))
            .collect::<Result<Vec<()>>>()?;
        log::info!("... generated in {:}s", now.elapsed().as_secs());
        self.config.to_path(path.join(PARAMETERS_FILE))?;
        self.peak_table.to_path(path.join(MAPPING_FILE))?;
        log::info!("Saved hallucinated spectra to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Element::{self, *};
    use std::env;

    fn config() -> Config {
        Config {
            num_spectra: 16,
            num_points: 64,
            elements: vec![H, He, Li, Be, B, C, N, O],
            min_elements: 2,
            max_elements: Some(3),
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn reproducible() {
        let a = Dataset::new(config()).unwrap().generate().unwrap();
        let b = Dataset::new(config()).unwrap().generate().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        a.iter().for_each(|spectrum| {
            assert_eq!(spectrum.len(), 64);
            assert!((2..=3).contains(&spectrum.composition.len()));
            assert!((spectrum.composition.total() - 1.).abs() < 1e-9);
            assert_eq!(spectrum.seed, Some(42));
        });
    }

    #[test]
    fn parallel_matches_serial() {
        let dataset = Dataset::new(config()).unwrap();
        let parallel = dataset.generate().unwrap();
        let serial: Vec<_> = (0..dataset.len())
            .rev()
            .map(|i| dataset.spectrum(i).unwrap())
            .collect();
        assert!(parallel.iter().eq(serial.iter().rev()));
    }

    #[test]
    fn seeded_peak_table() {
        let dataset = Dataset::new(config()).unwrap();
        assert_eq!(
            dataset.peak_table(),
            &PeakTable::generate(Some(42), None, 200.).unwrap()
        );
        assert_eq!(dataset.peak_table().len(), Element::count());
    }

    #[test]
    fn save() {
        let dir = env::temp_dir().join("hallucinator-dataset-save");
        let _ = fs::remove_dir_all(&dir);
        let dataset = Dataset::new(Config {
            num_spectra: 3,
            ..config()
        })
        .unwrap();
        dataset.save(&dir, ProgressBar::hidden()).unwrap();
        for i in 0..3 {
            let spectrum = Spectrum::from_path(dir.join(spectrum_file_name(i))).unwrap();
            assert_eq!(spectrum, dataset.spectrum(i).unwrap());
        }
        assert_eq!(
            &Config::from_path(dir.join(PARAMETERS_FILE)).unwrap(),
            dataset.config()
        );
        assert_eq!(
            &PeakTable::from_path(dir.join(MAPPING_FILE)).unwrap(),
            dataset.peak_table()
        );
    }
}
