//! Hallucinated spectra
//!
//! Synthetic spectra for arbitrary elemental compositions, made of one Gaussian peak per
//! element, a Gaussian background and additive Gaussian noise.
//!
//! A dataset is generated in three steps:
//!  1. a [PeakTable] gives the position and height of the peak of each [Element],
//!  2. a [CompositionSampler] draws the [Composition] of each spectrum,
//!  3. [synthesize] computes the spectrum of a composition over a wavelength grid.
//!
//! ```no_run
//! use hallucinator::{linspace, sample_composition, synthesize, Element, PeakTable, SynthesisParams};
//!
//! let peak_table = PeakTable::generate(Some(42), None, 200.)?;
//! let composition = sample_composition(&Element::all(), 1., 1, Some(4), Some(42))?;
//! let wavelengths = linspace(300., 1100., 1000);
//! let amplitudes = synthesize(
//!     &wavelengths,
//!     &composition,
//!     &peak_table,
//!     &SynthesisParams::default(),
//!     &mut hallucinator::rng::seeded(Some(42)),
//! )?;
//! assert_eq!(amplitudes.len(), wavelengths.len());
//! # Ok::<(), hallucinator::Error>(())
//! ```

/// Lower bound of the default wavelength range [nm]
pub const LOWER_WAVELENGTH_RANGE: f64 = 300.;
/// Upper bound of the default wavelength range [nm]
pub const UPPER_WAVELENGTH_RANGE: f64 = 1100.;

mod composition;
mod config;
pub mod dataset;
mod element;
mod error;
mod peak_table;
#[cfg(feature = "plot")]
pub mod plot;
pub mod rng;
mod spectrum;
mod synthesis;

pub use composition::{
    sample_composition, Composition, CompositionSampler, CompositionSamplerBuilder,
};
pub use config::Config;
pub use dataset::Dataset;
pub use element::Element;
pub use error::{Error, PersistError, Result};
pub use peak_table::{Peak, PeakTable, AMPLITUDE_MEAN, AMPLITUDE_SPREAD};
pub use spectrum::Spectrum;
pub use synthesis::{gaussian, linspace, synthesize, SynthesisParams, BACKGROUND_CENTER_SPREAD};
