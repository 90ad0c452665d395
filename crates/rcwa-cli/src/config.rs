//! TOML configuration deserialisation for solve jobs.
//!
//! ```toml
//! [device]
//! periods = [450.0, 450.0]
//! harmonics = [3, 3]
//! grid = [48, 48]
//! reflection = [1.0, 0.0]
//! transmission = "SiO2"
//! transmission_permeability = [1.0, 0.0]
//!
//! [[layer]]
//! thickness = 145.0
//! background = [1.0, 0.0]
//!
//! [[layer.shape]]
//! type = "circle"
//! centre = [225.0, 225.0]
//! radius = 115.0
//! material = "Si"
//!
//! [source]
//! wavelength = 700.0
//! p_te = 1.0
//!
//! [solver]
//! precision = "high"
//! ```

use anyhow::{Context, Result};
use num_complex::Complex64;
use rcwa_core::precision::PrecisionProfile;
use rcwa_core::solver::rcwa::SolverOptions;
use rcwa_geometry::primitives::Primitive;
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub device: DeviceConfig,
    #[serde(default, rename = "layer")]
    pub layers: Vec<LayerConfig>,
    pub source: SourceConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Lattice, truncation and half-spaces.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// Lattice periods `[period_x, period_y]` in nm.
    pub periods: [f64; 2],
    /// Truncation orders `[p, q]`.
    pub harmonics: [usize; 2],
    /// Pixel resolution `[rows, cols]` shared by every layer.
    #[serde(default = "default_grid")]
    pub grid: [usize; 2],
    #[serde(default = "default_air")]
    pub reflection: MaterialRef,
    #[serde(default = "default_air")]
    pub transmission: MaterialRef,
    /// `[re, im]` relative permeability of the reflection half-space.
    #[serde(default = "default_non_magnetic")]
    pub reflection_permeability: [f64; 2],
    /// `[re, im]` relative permeability of the transmission half-space.
    #[serde(default = "default_non_magnetic")]
    pub transmission_permeability: [f64; 2],
}

fn default_grid() -> [usize; 2] {
    [64, 64]
}

fn default_air() -> MaterialRef {
    MaterialRef::Permittivity([1.0, 0.0])
}

fn default_non_magnetic() -> [f64; 2] {
    [1.0, 0.0]
}

/// A material: either a literal complex permittivity or a built-in
/// identifier resolved at the source wavelength.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MaterialRef {
    /// `[re, im]` relative permittivity.
    Permittivity([f64; 2]),
    /// Identifier understood by `rcwa_materials::lookup`.
    Named(String),
}

impl MaterialRef {
    /// Relative permittivity at `wavelength_nm`.
    pub fn permittivity(&self, wavelength_nm: f64) -> Result<Complex64> {
        match self {
            MaterialRef::Permittivity([re, im]) => Ok(Complex64::new(*re, *im)),
            MaterialRef::Named(id) => {
                let model = rcwa_materials::lookup(id)?;
                model
                    .permittivity(wavelength_nm)
                    .with_context(|| format!("material '{id}' at {wavelength_nm:.1} nm"))
            }
        }
    }
}

/// One patterned layer.
#[derive(Debug, Deserialize)]
pub struct LayerConfig {
    /// Thickness in nm.
    pub thickness: f64,
    #[serde(default = "default_air")]
    pub background: MaterialRef,
    /// Shapes painted over the background in order; later shapes win.
    #[serde(default, rename = "shape")]
    pub shapes: Vec<ShapeConfig>,
}

/// A primitive plus the material painted inside it.
#[derive(Debug, Deserialize)]
pub struct ShapeConfig {
    pub material: MaterialRef,
    #[serde(flatten)]
    pub primitive: Primitive,
}

/// TE/TM amplitude: a real number or `[re, im]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amplitude {
    Real(f64),
    Complex([f64; 2]),
}

impl From<Amplitude> for Complex64 {
    fn from(a: Amplitude) -> Self {
        match a {
            Amplitude::Real(re) => Complex64::new(re, 0.0),
            Amplitude::Complex([re, im]) => Complex64::new(re, im),
        }
    }
}

/// Incident plane wave.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// Free-space wavelength in nm.
    pub wavelength: f64,
    /// Polar angle in radians.
    #[serde(default)]
    pub theta: f64,
    /// Azimuthal angle in radians.
    #[serde(default)]
    pub phi: f64,
    #[serde(default = "default_te")]
    pub p_te: Amplitude,
    #[serde(default = "default_tm")]
    pub p_tm: Amplitude,
}

fn default_te() -> Amplitude {
    Amplitude::Real(1.0)
}

fn default_tm() -> Amplitude {
    Amplitude::Real(0.0)
}

/// Solver options plus the precision profile to dispatch on.
#[derive(Debug, Default, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub precision: PrecisionProfile,
    #[serde(flatten)]
    pub options: SolverOptions,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to write per-order efficiencies as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_orders: bool,
    /// Whether to also write the full result as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_orders: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Parse a job from TOML text.
pub fn parse_config(content: &str) -> Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading job file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing job file {}", path.display()))
}
