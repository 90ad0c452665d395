//! Job runner: ties together geometry, materials, and solver.

use std::path::Path;

use anyhow::{Context, Result};
use num_complex::Complex64;
use serde::Serialize;

use rcwa_core::precision::{Double, Precision, PrecisionProfile, Single};
use rcwa_core::solver::rcwa::RcwaSolver;
use rcwa_core::types::{Device, HalfSpace, Layer, SolveResult, Source};
use rcwa_geometry::raster::{paint, uniform_grid, PixelGrid};

use crate::config::{JobConfig, LayerConfig, MaterialRef};

/// One diffraction order of a finished solve.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub m: i64,
    pub n: i64,
    pub reflectance: f64,
    pub transmittance: f64,
}

/// Precision-independent summary of a solve, ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutput {
    pub precision: PrecisionProfile,
    pub wavelength_nm: f64,
    pub total_reflectance: f64,
    pub total_transmittance: f64,
    pub renormalized: bool,
    pub orders: Vec<OrderRow>,
}

impl JobOutput {
    fn from_result<P: Precision>(result: &SolveResult<P>, wavelength_nm: f64) -> Self {
        let orders = result
            .orders
            .iter()
            .zip(result.reflectance.iter().zip(&result.transmittance))
            .map(|(&(m, n), (&r, &t))| OrderRow {
                m: P::index_to_i64(m),
                n: P::index_to_i64(n),
                reflectance: P::to_f64(r),
                transmittance: P::to_f64(t),
            })
            .collect();
        Self {
            precision: P::PROFILE,
            wavelength_nm,
            total_reflectance: P::to_f64(result.total_reflectance),
            total_transmittance: P::to_f64(result.total_transmittance),
            renormalized: result.renormalized,
            orders,
        }
    }
}

/// Build the incident source.
pub fn build_source(job: &JobConfig) -> Result<Source> {
    let s = &job.source;
    Source::new(s.theta, s.phi, s.wavelength, Complex64::from(s.p_te), Complex64::from(s.p_tm))
        .context("invalid [source]")
}

/// Build the device, resolving every material at the source wavelength.
pub fn build_device(job: &JobConfig) -> Result<Device> {
    let wavelength = job.source.wavelength;
    let [rows, cols] = job.device.grid;
    let [period_x, period_y] = job.device.periods;
    let pixels = PixelGrid::new(rows, cols, period_x, period_y).context("invalid [device] grid")?;

    let layers = job
        .layers
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            build_layer(layer, &pixels, wavelength).with_context(|| format!("layer {index}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let half_space = |permittivity: &MaterialRef, [mu_re, mu_im]: [f64; 2]| -> Result<HalfSpace> {
        Ok(HalfSpace::new(
            permittivity.permittivity(wavelength)?,
            Complex64::new(mu_re, mu_im),
        ))
    };
    let d = &job.device;
    let reflection =
        half_space(&d.reflection, d.reflection_permeability).context("reflection medium")?;
    let transmission =
        half_space(&d.transmission, d.transmission_permeability).context("transmission medium")?;
    let [p, q] = d.harmonics;

    Device::new(
        period_x,
        period_y,
        reflection,
        transmission,
        p,
        q,
        layers,
    )
    .context("invalid [device]")
}

fn build_layer(layer: &LayerConfig, pixels: &PixelGrid, wavelength: f64) -> Result<Layer> {
    let background = layer.background.permittivity(wavelength)?;
    let mut grid = uniform_grid(pixels.rows, pixels.cols, background);
    for (index, shape) in layer.shapes.iter().enumerate() {
        let value = shape.material.permittivity(wavelength)?;
        let painted = paint(&mut grid, pixels, &shape.primitive, value)
            .with_context(|| format!("shape {index}"))?;
        log::debug!("shape {index}: {painted} pixels painted with eps = {value}");
    }
    Ok(Layer::plain(grid, layer.thickness))
}

/// Run one solve, dispatching on the configured precision profile.
pub fn run_job(job: &JobConfig) -> Result<JobOutput> {
    let device = build_device(job)?;
    let source = build_source(job)?;
    let solver = RcwaSolver::new(job.solver.options)?;

    println!(
        "  {} layers, p={}, q={}, λ={:.1} nm, precision={:?}",
        device.layers().len(),
        device.p(),
        device.q(),
        source.wavelength(),
        job.solver.precision
    );

    let output = match job.solver.precision {
        PrecisionProfile::Low => {
            let result = solver.solve::<Single>(&device, &source)?;
            JobOutput::from_result(&result, source.wavelength())
        }
        PrecisionProfile::High => {
            let result = solver.solve::<Double>(&device, &source)?;
            JobOutput::from_result(&result, source.wavelength())
        }
    };

    println!(
        "  {} orders: R={:.6}, T={:.6}, R+T={:.6}",
        output.orders.len(),
        output.total_reflectance,
        output.total_transmittance,
        output.total_reflectance + output.total_transmittance
    );
    Ok(output)
}

/// Write per-order efficiencies to a CSV file with a metadata header.
pub fn write_orders_csv(output: &JobOutput, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writeln!(file, "# RCWA diffraction efficiencies")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# wavelength_nm: {}", output.wavelength_nm)?;
    writeln!(file, "# precision: {:?}", output.precision)?;
    writeln!(file, "# renormalized: {}", output.renormalized)?;
    writeln!(file, "#")?;
    writeln!(file, "m,n,reflectance,transmittance")?;

    for row in &output.orders {
        writeln!(
            file,
            "{},{},{:.9e},{:.9e}",
            row.m, row.n, row.reflectance, row.transmittance
        )?;
    }

    println!("Orders written to: {}", path.display());
    Ok(())
}

/// Write the full result to a JSON file.
pub fn write_result_json(output: &JobOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(output)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Result (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const GLASS_AIR: &str = r#"
        [device]
        periods = [900.0, 900.0]
        harmonics = [2, 2]
        grid = [16, 16]
        reflection = [2.088025, 0.0]

        [[layer]]
        thickness = 21.0

        [source]
        wavelength = 700.0

        [solver]
        precision = "high"
        renormalize = false
    "#;

    #[test]
    fn test_build_device_paints_shapes() {
        let job = parse_config(
            r#"
            [device]
            periods = [400.0, 400.0]
            harmonics = [1, 1]
            grid = [8, 8]

            [[layer]]
            thickness = 50.0
            background = [1.0, 0.0]

            [[layer.shape]]
            type = "rectangle"
            centre = [200.0, 200.0]
            half_extents = [100.0, 200.0]
            material = [4.0, 0.0]

            [source]
            wavelength = 600.0
            "#,
        )
        .unwrap();
        let device = build_device(&job).unwrap();
        let grid = device.layers()[0].permittivity();
        assert_eq!(grid.dim(), (8, 8));
        let filled = grid.iter().filter(|&&v| v == Complex64::new(4.0, 0.0)).count();
        // Columns 2..=5 in every row.
        assert_eq!(filled, 32);
    }

    #[test]
    fn test_run_job_glass_air() {
        let job = parse_config(GLASS_AIR).unwrap();
        let output = run_job(&job).unwrap();
        assert_eq!(output.precision, PrecisionProfile::High);
        assert!(!output.renormalized);
        // Fresnel reflectance of the glass/air interface.
        let (n1, n2) = (2.088025_f64.sqrt(), 1.0);
        let expected = ((n1 - n2) / (n1 + n2)).powi(2);
        assert!((output.total_reflectance - expected).abs() < 1e-6);
        let zeroth = output.orders.iter().find(|o| o.m == 0 && o.n == 0).unwrap();
        assert!((zeroth.reflectance - expected).abs() < 1e-6);
    }

    #[test]
    fn test_half_space_permeability_reaches_the_solver() {
        // Matched impedance (eps = mu) makes the interface reflectionless
        // even though the index differs from air.
        let job = parse_config(&GLASS_AIR.replace(
            "reflection = [2.088025, 0.0]",
            "reflection = [2.088025, 0.0]\nreflection_permeability = [2.088025, 0.0]",
        ))
        .unwrap();
        let device = build_device(&job).unwrap();
        assert_eq!(device.reflection().permeability, Complex64::new(2.088025, 0.0));
        assert_eq!(device.transmission().permeability, Complex64::new(1.0, 0.0));

        let job = parse_config(
            r#"
            [device]
            periods = [900.0, 900.0]
            harmonics = [1, 1]
            grid = [8, 8]
            transmission = [2.25, 0.0]
            transmission_permeability = [2.25, 0.0]

            [source]
            wavelength = 700.0

            [solver]
            precision = "high"
            renormalize = false
            "#,
        )
        .unwrap();
        let output = run_job(&job).unwrap();
        assert!(output.total_reflectance.abs() < 1e-10);
        assert!((output.total_transmittance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_precision_dispatch() {
        let job = parse_config(&GLASS_AIR.replace("\"high\"", "\"low\"")).unwrap();
        let output = run_job(&job).unwrap();
        assert_eq!(output.precision, PrecisionProfile::Low);
        assert!((output.total_reflectance + output.total_transmittance - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_demo_jobs_build() {
        for demo in [
            include_str!("../../../demos/glass_air_film.toml"),
            include_str!("../../../demos/silicon_disks.toml"),
            include_str!("../../../demos/oblique_grating.toml"),
        ] {
            let job = parse_config(demo).unwrap();
            let device = build_device(&job).unwrap();
            assert_eq!(device.layers().len(), job.layers.len());
            build_source(&job).unwrap();
        }
    }

    #[test]
    fn test_nv_request_fails() {
        let job = parse_config(&GLASS_AIR.replace("renormalize = false", "apply_nv = true")).unwrap();
        assert!(run_job(&job).is_err());
    }

    #[test]
    fn test_outputs_are_written() {
        let job = parse_config(GLASS_AIR).unwrap();
        let output = run_job(&job).unwrap();
        let dir = std::env::temp_dir().join(format!("rcwa-cli-test-{}", std::process::id()));
        write_orders_csv(&output, &dir.join("orders.csv")).unwrap();
        write_result_json(&output, &dir.join("result.json")).unwrap();

        let csv = std::fs::read_to_string(dir.join("orders.csv")).unwrap();
        let data_lines = csv.lines().filter(|l| !l.starts_with('#')).count();
        assert_eq!(data_lines, output.orders.len() + 1);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("result.json")).unwrap()).unwrap();
        assert_eq!(json["orders"].as_array().unwrap().len(), output.orders.len());
        std::fs::remove_dir_all(&dir).ok();
    }
}
