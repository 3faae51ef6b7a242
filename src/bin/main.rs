use std::path::{Path, PathBuf};

use anyhow::Context;
use hallucinator::{Composition, Config, Dataset, Element, PeakTable, Spectrum};
use indicatif::{ProgressBar, ProgressStyle};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "hallucinator", about = "Generate hallucinated spectra")]
struct Opt {
    /// Enable verbose logging
    #[structopt(short, long, global = true)]
    verbose: bool,
    /// Disable all logging
    #[structopt(short, long, global = true)]
    quiet: bool,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Generate a dataset of hallucinated spectra
    ///
    /// Each spectrum is the sum of one Gaussian peak per element of a random composition,
    /// of a Gaussian background and of Gaussian noise.
    Generate(GenerateOpt),
    /// Hallucinate the spectrum of a composition file
    Hallucinate {
        /// JSON file with the element fractions
        #[structopt(parse(from_os_str))]
        composition_file: PathBuf,
        /// JSON file with the element peaks, generated if missing
        #[structopt(long, parse(from_os_str))]
        mapping: Option<PathBuf>,
        /// JSON configuration file
        #[structopt(long, parse(from_os_str))]
        config: Option<PathBuf>,
        /// Output JSON file
        #[structopt(long, default_value = "output/hallucinated_spectra.json", parse(from_os_str))]
        output: PathBuf,
        /// Also write the spectrum into a CSV file
        #[structopt(long, parse(from_os_str))]
        csv: Option<PathBuf>,
        /// Divide the element fractions by their sum
        #[structopt(long)]
        normalize: bool,
    },
    /// Plot side by side spectra from different files
    Compare {
        /// Spectra files, at least two
        #[structopt(parse(from_os_str))]
        files: Vec<PathBuf>,
        /// Output image
        #[structopt(long, default_value = "comparison.png", parse(from_os_str))]
        output: PathBuf,
    },
    /// Plot hallucinated spectra
    Plot {
        /// Folder with the spectra
        #[structopt(default_value = "output/hallucinated_spectra", parse(from_os_str))]
        folder: PathBuf,
        /// Spectra files, overrides the folder
        #[structopt(long = "file", parse(from_os_str))]
        files: Vec<PathBuf>,
        /// Only plot the spectra with all these elements
        #[structopt(short, long = "element")]
        elements: Vec<Element>,
        /// Output image
        #[structopt(long, default_value = "spectra.png", parse(from_os_str))]
        output: PathBuf,
    },
}

#[derive(Debug, StructOpt)]
struct GenerateOpt {
    /// Output directory
    #[structopt(long, default_value = "output/hallucinated_spectra", parse(from_os_str))]
    output: PathBuf,
    /// Configuration file, replaces all the other options
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Number of spectra to generate
    #[structopt(short, long = "num")]
    num_spectra: Option<usize>,
    /// Minimum wavelength
    #[structopt(long)]
    wavelength_min: Option<f64>,
    /// Maximum wavelength
    #[structopt(long)]
    wavelength_max: Option<f64>,
    /// Number of points per spectrum
    #[structopt(long, alias = "resolution")]
    num_points: Option<usize>,
    /// Elements to use
    #[structopt(short, long = "element")]
    elements: Vec<Element>,
    /// Maximum fraction of any element
    #[structopt(long)]
    max_fraction: Option<f64>,
    /// Minimum number of elements
    #[structopt(long, alias = "min-elem")]
    min_elements: Option<usize>,
    /// Maximum number of elements
    #[structopt(long, alias = "max-elem")]
    max_elements: Option<usize>,
    /// Spread of the peak positions
    #[structopt(long = "peak-spread")]
    peak_position_spread: Option<f64>,
    /// Mean of the peak positions
    #[structopt(long)]
    peak_mean: Option<f64>,
    /// Standard deviation of the element peaks
    #[structopt(long)]
    peak_width: Option<f64>,
    /// Width of the background
    #[structopt(long)]
    background_width: Option<f64>,
    /// Center of the background
    #[structopt(long)]
    background_center: Option<f64>,
    /// Level of the background
    #[structopt(long)]
    background_level: Option<f64>,
    /// Level of noise
    #[structopt(long = "noise")]
    noise_level: Option<f64>,
    /// Random seed
    #[structopt(long)]
    seed: Option<u64>,
}
impl GenerateOpt {
    fn config(&self) -> anyhow::Result<Config> {
        if let Some(path) = &self.config {
            log::info!(
                "Reading configuration from {:?}, ignoring all other options",
                path
            );
            return Config::from_path(path).with_context(|| format!("loading {:?}", path));
        }
        let default = Config::default();
        Ok(Config {
            num_spectra: self.num_spectra.unwrap_or(default.num_spectra),
            wavelength_min: self.wavelength_min.unwrap_or(default.wavelength_min),
            wavelength_max: self.wavelength_max.unwrap_or(default.wavelength_max),
            num_points: self.num_points.unwrap_or(default.num_points),
            elements: if self.elements.is_empty() {
                default.elements
            } else {
                self.elements.clone()
            },
            max_fraction: self.max_fraction.unwrap_or(default.max_fraction),
            min_elements: self.min_elements.unwrap_or(default.min_elements),
            max_elements: self.max_elements.or(default.max_elements),
            peak_position_spread: self
                .peak_position_spread
                .unwrap_or(default.peak_position_spread),
            peak_mean: self.peak_mean.or(default.peak_mean),
            peak_width: self.peak_width.unwrap_or(default.peak_width),
            background_width: self.background_width.unwrap_or(default.background_width),
            background_center: self.background_center.or(default.background_center),
            background_level: self.background_level.unwrap_or(default.background_level),
            noise_level: self.noise_level.unwrap_or(default.noise_level),
            seed: self.seed,
        })
    }
}

fn progress_bar(len: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("Generating spectra {wide_bar} {pos}/{len} [{eta}]")
    {
        pb.set_style(style);
    }
    pb
}

/// Keeps the existing files, sorted, requiring at least two of them
fn comparison_files(files: Vec<PathBuf>) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<_> = files.into_iter().filter(|path| path.exists()).collect();
    files.sort();
    if files.len() < 2 {
        anyhow::bail!("Please provide at least two files to compare");
    }
    Ok(files)
}

/// Chart title: the name of the folder of the spectrum file and the spectrum label
fn comparison_title(path: &Path, spectrum: &Spectrum) -> String {
    match path
        .parent()
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy())
    {
        Some(folder) => format!("{}: {}", folder, spectrum.label),
        None => spectrum.label.clone(),
    }
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if opt.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    } else if opt.quiet {
        logger.filter_level(log::LevelFilter::Error);
    }
    logger.init();

    match opt.cmd {
        Command::Generate(generate) => {
            let config = generate.config()?;
            if let Some(seed) = config.seed {
                log::debug!("Random seed: {}", seed);
            }
            let dataset = Dataset::new(config)?;
            dataset.save(
                &generate.output,
                progress_bar(dataset.len(), opt.quiet),
            )?;
            log::info!(
                "Run `hallucinator plot {}` to plot the hallucinated spectra",
                generate.output.display()
            );
        }
        Command::Hallucinate {
            composition_file,
            mapping,
            config,
            output,
            csv,
            normalize,
        } => {
            let mut composition = Composition::from_path(&composition_file)
                .with_context(|| format!("loading {:?}", composition_file))?;
            if normalize {
                composition = composition.normalized()?;
            }
            let config = match config {
                Some(path) => Config::from_path(&path)?,
                None => Config::default(),
            };
            let peak_table = match mapping.filter(|path| path.exists()) {
                Some(path) => PeakTable::from_path(&path)?,
                None => {
                    log::info!("Generating the peak table");
                    PeakTable::generate(
                        config.seed,
                        config.peak_mean,
                        config.peak_position_spread,
                    )?
                }
            };
            let spectrum =
                Spectrum::from_composition(&config, composition, &peak_table, config.seed)?;
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            spectrum.to_path(&output)?;
            if let Some(path) = csv {
                spectrum.to_csv(path)?;
            }
            log::info!(
                "Generated hallucinated spectrum for {}",
                spectrum.composition
            );
            log::info!("Output written to {:?}", output);
        }
        Command::Plot {
            folder,
            files,
            elements,
            output,
        } => {
            let files = if files.is_empty() {
                let pattern = folder.join("spectra_*.json");
                let mut files = glob::glob(&pattern.to_string_lossy())?
                    .collect::<Result<Vec<PathBuf>, glob::GlobError>>()?;
                files.sort();
                files
            } else {
                files
            };
            log::info!("Found {} spectra files", files.len());
            let spectra = files
                .iter()
                .map(Spectrum::from_path)
                .filter(|spectrum| {
                    spectrum
                        .as_ref()
                        .map_or(true, |spectrum| spectrum.contains_all(&elements))
                })
                .collect::<hallucinator::Result<Vec<Spectrum>>>()?;
            if !elements.is_empty() {
                log::info!(
                    "Found {} spectra with {}",
                    spectra.len(),
                    elements
                        .iter()
                        .map(|e| e.symbol())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            #[cfg(feature = "plot")]
            {
                hallucinator::plot::plot_grid(&spectra, &output)?;
                log::info!("Spectra plotted into {:?}", output);
            }
            #[cfg(not(feature = "plot"))]
            anyhow::bail!(
                "cannot plot {} spectra into {:?}: hallucinator was built without the `plot` feature",
                spectra.len(),
                output
            );
        }
        Command::Compare { files, output } => {
            let files = comparison_files(files)?;
            let panels = files
                .iter()
                .map(|path| {
                    Spectrum::from_path(path)
                        .map(|spectrum| (comparison_title(path, &spectrum), spectrum))
                })
                .collect::<hallucinator::Result<Vec<(String, Spectrum)>>>()?;
            #[cfg(feature = "plot")]
            {
                let panels: Vec<_> = panels.iter().map(|(title, s)| (title.clone(), s)).collect();
                hallucinator::plot::plot_titled_grid(&panels, &output)?;
                log::info!("Comparison plotted into {:?}", output);
            }
            #[cfg(not(feature = "plot"))]
            anyhow::bail!(
                "cannot compare {} spectra into {:?}: hallucinator was built without the `plot` feature",
                panels.len(),
                output
            );
        }
    }

    Ok(())
}
