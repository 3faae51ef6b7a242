use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::PersistError,
    rng::{self, Stream},
    synthesize, Composition, Config, Element, Error, PeakTable, Result,
};

/// Hallucinated spectrum record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Seed of the dataset the spectrum belongs to
    #[serde(alias = "random_seed")]
    pub seed: Option<u64>,
    pub composition: Composition,
    /// Composition label, see [Composition::label]
    pub label: String,
    /// Wavelengths [nm]
    pub wavelength: Vec<f64>,
    pub amplitude: Vec<f64>,
}
impl Spectrum {
    /// Creates a spectrum record, labelled after its composition
    pub fn new(
        seed: Option<u64>,
        composition: Composition,
        wavelength: Vec<f64>,
        amplitude: Vec<f64>,
    ) -> Result<Self> {
        if wavelength.len() != amplitude.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} wavelengths for {} amplitudes",
                wavelength.len(),
                amplitude.len()
            )));
        }
        Ok(Self {
            seed,
            label: composition.label(),
            composition,
            wavelength,
            amplitude,
        })
    }
    /// Synthesizes the spectrum of a given composition
    ///
    /// The wavelength grid and the synthesis parameters are those of `config`,
    /// the noise is drawn from the synthesis stream of `seed`.
    pub fn from_composition(
        config: &Config,
        composition: Composition,
        peak_table: &PeakTable,
        seed: Option<u64>,
    ) -> Result<Self> {
        config.validate()?;
        let wavelength = config.wavelengths();
        let mut rng = rng::stream(seed, Stream::Synthesis, 0);
        let amplitude = synthesize(
            &wavelength,
            &composition,
            peak_table,
            &config.synthesis_params(),
            &mut rng,
        )?;
        Self::new(seed, composition, wavelength, amplitude)
    }
    /// Number of samples
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }
    /// Returns true if all the `elements` are part of the composition
    pub fn contains_all(&self, elements: &[Element]) -> bool {
        elements.iter().all(|e| self.composition.contains_key(e))
    }
    /// Wavelength range
    pub fn wavelength_range(&self) -> (f64, f64) {
        minmax(&self.wavelength)
    }
    /// Amplitude range
    pub fn amplitude_range(&self) -> (f64, f64) {
        minmax(&self.amplitude)
    }
    /// Loads a spectrum from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        let this: Self = serde_json::from_reader(BufReader::new(file))?;
        if this.wavelength.len() != this.amplitude.len() {
            return Err(Error::ShapeMismatch(format!(
                "{:?}: {} wavelengths for {} amplitudes",
                path,
                this.wavelength.len(),
                this.amplitude.len()
            )));
        }
        Ok(this)
    }
    /// Saves the spectrum into a JSON file
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
    /// Saves the wavelengths and amplitudes into a CSV file
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["wavelength", "amplitude"])?;
        for (w, a) in self.wavelength.iter().zip(&self.amplitude) {
            wtr.write_record(&[w.to_string(), a.to_string()])?;
        }
        wtr.flush()
            .map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        Ok(())
    }
}

fn minmax(x: &[f64]) -> (f64, f64) {
    (
        x.iter().cloned().fold(f64::INFINITY, f64::min),
        x.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{linspace, Element::*};
    use std::{env, fs};

    fn spectrum() -> Spectrum {
        let peak_table = PeakTable::from([(H, (656.3, 1.)), (He, (587.6, 1.))]);
        let config = Config {
            num_points: 11,
            ..Default::default()
        };
        Spectrum::from_composition(
            &config,
            Composition::from([(H, 0.5), (He, 0.5)]),
            &peak_table,
            Some(42),
        )
        .unwrap()
    }

    #[test]
    fn record() {
        let spectrum = spectrum();
        assert_eq!(spectrum.len(), 11);
        assert_eq!(spectrum.label, "${H}_{0.50} {He}_{0.50}$");
        assert!(spectrum.contains_all(&[H]));
        assert!(!spectrum.contains_all(&[H, Li]));
        assert_eq!(spectrum.wavelength_range(), (300., 1100.));
        let json = serde_json::to_value(&spectrum).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["composition"]["He"], 0.5);
    }

    #[test]
    fn random_seed_alias() {
        let json = r#"{"random_seed": null, "composition": {"O": 1.0}, "label": "${O}_{1.00}$",
            "wavelength": [1.0, 2.0], "amplitude": [0.5, 0.25]}"#;
        let spectrum: Spectrum = serde_json::from_str(json).unwrap();
        assert_eq!(spectrum.seed, None);
        assert_eq!(spectrum.composition[&O], 1.);
    }

    #[test]
    fn from_composition() {
        let config = Config {
            num_points: 11,
            ..Default::default()
        };
        let spectrum = spectrum();
        let expected = synthesize(
            &linspace(300., 1100., 11),
            &spectrum.composition,
            &PeakTable::from([(H, (656.3, 1.)), (He, (587.6, 1.))]),
            &config.synthesis_params(),
            &mut rng::stream(Some(42), Stream::Synthesis, 0),
        )
        .unwrap();
        assert_eq!(spectrum.amplitude, expected);
        let config = Config {
            noise_level: -1.,
            ..config
        };
        assert!(matches!(
            Spectrum::from_composition(
                &config,
                Composition::from([(H, 1.)]),
                &PeakTable::default(),
                None
            ),
            Err(Error::InvalidParameter {
                name: "noise_level",
                ..
            })
        ));
    }

    #[test]
    fn mismatch() {
        assert!(matches!(
            Spectrum::new(None, Composition::default(), vec![1., 2.], vec![1.]),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn files() {
        let dir = env::temp_dir().join("hallucinator-spectrum-files");
        fs::create_dir_all(&dir).unwrap();
        let spectrum = spectrum();
        spectrum.to_path(dir.join("spectrum.json")).unwrap();
        assert_eq!(Spectrum::from_path(dir.join("spectrum.json")).unwrap(), spectrum);
        spectrum.to_csv(dir.join("spectrum.csv")).unwrap();
        let csv = fs::read_to_string(dir.join("spectrum.csv")).unwrap();
        assert_eq!(csv.lines().count(), 12);
        assert!(csv.starts_with("wavelength,amplitude\n300,"));
        assert!(matches!(
            Spectrum::from_path(dir.join("missing.json")),
            Err(Error::Persist(PersistError::Io(..)))
        ));
    }
}
