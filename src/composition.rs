use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{BufReader, BufWriter},
    ops::Deref,
    path::Path,
};

use itertools::Itertools;
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    error::PersistError,
    rng::{self, Stream},
    Element, Error, Result,
};

/// Element fractions of a spectrum
///
/// The elements are iterated in rank order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition(BTreeMap<Element, f64>);
impl Deref for Composition {
    type Target = BTreeMap<Element, f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl FromIterator<(Element, f64)> for Composition {
    fn from_iter<T: IntoIterator<Item = (Element, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl<const N: usize> From<[(Element, f64); N]> for Composition {
    fn from(fractions: [(Element, f64); N]) -> Self {
        fractions.into_iter().collect()
    }
}
impl Composition {
    /// Sum of the fractions
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
    /// Returns the composition without `element`
    pub fn without(&self, element: &Element) -> Self {
        self.iter()
            .filter(|(e, _)| *e != element)
            .map(|(e, f)| (*e, *f))
            .collect()
    }
    /// Returns the composition with the fractions divided by their sum
    pub fn normalized(&self) -> Result<Self> {
        let total = self.total();
        if total == 0. {
            return Err(Error::DegenerateComposition);
        }
        Ok(self.iter().map(|(e, f)| (*e, f / total)).collect())
    }
    /// Composition label
    ///
    /// The `(symbol, fraction)` pairs, with the fractions rounded to 2 decimals, are
    /// sorted as strings and rendered like `${H}_{0.50} {He}_{0.50}$`
    pub fn label(&self) -> String {
        let body = self
            .iter()
            .map(|(element, fraction)| (element.symbol(), format!("{:.2}", fraction)))
            .sorted()
            .map(|(symbol, fraction)| format!("{{{}}}_{{{}}}", symbol, fraction))
            .join(" ");
        format!("${}$", body)
    }
    /// Loads a composition from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
    /// Saves the composition into a JSON file
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PersistError::Io(e, path.to_path_buf()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Random [Composition] sampler
#[derive(Debug, Clone)]
pub struct CompositionSampler {
    elements: Vec<Element>,
    max_fraction: f64,
    min_elements: usize,
    max_elements: usize,
}
impl CompositionSampler {
    /// Returns a builder of samplers of compositions picked from `elements`
    ///
    /// Duplicated elements are collapsed.
    pub fn new(elements: &[Element]) -> CompositionSamplerBuilder {
        CompositionSamplerBuilder {
            elements: elements.iter().copied().unique().collect(),
            ..Default::default()
        }
    }
    /// Eligible elements
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
    /// Inclusive range of the number of elements in a composition
    pub fn element_range(&self) -> (usize, usize) {
        (self.min_elements, self.max_elements)
    }
    /// Draws a composition
    ///
    /// Draws, in that order, the number of elements, the elements and the fractions.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Composition> {
        let n = rng.gen_range(self.min_elements..=self.max_elements);
        let picked: Vec<Element> = index::sample(rng, self.elements.len(), n)
            .into_iter()
            .map(|i| self.elements[i])
            .collect();
        let fractions: Vec<f64> = (0..n)
            .map(|_| self.max_fraction * rng.gen::<f64>())
            .collect();
        let total: f64 = fractions.iter().sum();
        if total == 0. {
            return Err(Error::DegenerateComposition);
        }
        Ok(picked
            .into_iter()
            .zip(fractions)
            .map(|(element, fraction)| (element, fraction / total))
            .collect())
    }
}

/// [CompositionSampler] builder
///
/// Defaults to a maximum fraction of 1 and to compositions of 1 to all the
/// eligible elements.
#[derive(Debug, Clone)]
pub struct CompositionSamplerBuilder {
    elements: Vec<Element>,
    max_fraction: f64,
    min_elements: usize,
    max_elements: Option<usize>,
}
impl Default for CompositionSamplerBuilder {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            max_fraction: 1.,
            min_elements: 1,
            max_elements: None,
        }
    }
}
impl CompositionSamplerBuilder {
    /// Upper bound of the fractions drawn before normalization
    pub fn max_fraction(self, max_fraction: f64) -> Self {
        Self {
            max_fraction,
            ..self
        }
    }
    pub fn min_elements(self, min_elements: usize) -> Self {
        Self {
            min_elements,
            ..self
        }
    }
    /// Maximum number of elements, clamped to the number of eligible elements
    pub fn max_elements(self, max_elements: Option<usize>) -> Self {
        Self {
            max_elements,
            ..self
        }
    }
    /// Validates the ranges and returns the sampler
    ///
    /// Each element is given a fraction uniformly drawn in `[0, max_fraction)`
    /// before normalization.
    pub fn build(self) -> Result<CompositionSampler> {
        let max_elements = self
            .max_elements
            .filter(|&n| n <= self.elements.len())
            .unwrap_or(self.elements.len());
        if self.min_elements < 1 || self.min_elements > max_elements {
            return Err(Error::InvalidRange {
                min: self.min_elements,
                max: max_elements,
            });
        }
        if !(self.max_fraction.is_finite() && self.max_fraction >= 0.) {
            return Err(Error::invalid("max_fraction", self.max_fraction));
        }
        Ok(CompositionSampler {
            elements: self.elements,
            max_fraction: self.max_fraction,
            min_elements: self.min_elements,
            max_elements,
        })
    }
}

/// Draws a random composition
///
/// The composition is drawn from the composition stream of `seed`, or from the OS
/// entropy without a seed.
/// See [CompositionSamplerBuilder] for the meaning of the other arguments.
pub fn sample_composition(
    elements: &[Element],
    max_fraction: f64,
    min_elements: usize,
    max_elements: Option<usize>,
    seed: Option<u64>,
) -> Result<Composition> {
    CompositionSampler::new(elements)
        .max_fraction(max_fraction)
        .min_elements(min_elements)
        .max_elements(max_elements)
        .build()?
        .sample(&mut rng::stream(seed, Stream::Composition, 0))
}
