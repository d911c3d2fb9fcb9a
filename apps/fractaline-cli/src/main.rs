use anyhow::Context;
use clap::{Parser, Subcommand};
use fractaline_common::{
    BufferRole, ColorMode, GeometryBuffer, LayoutGeneration, Rgba, SCHEMA_VERSION,
};
use fractaline_render::{
    DebugTextStage, PlanRequest, ReferenceStage, RenderConfig, ShadingStage,
};
use glam::Vec3;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fractaline", about = "Color and buffer-layout tooling for fractal figures")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the buffer slot table of every layout generation
    Slots,
    /// Evaluate the configured gradient
    Resolve {
        /// Render config (.yaml, .yml or .json)
        #[arg(short, long)]
        config: PathBuf,
        /// Positions to evaluate; repeatable
        #[arg(long = "at")]
        at: Vec<f32>,
        /// Evenly spaced samples over [0, 1] when no --at is given
        #[arg(short, long, default_value = "11")]
        samples: usize,
    },
    /// Build and print the binding plan for a figure
    Plan {
        /// Render config (.yaml, .yml or .json)
        #[arg(short, long)]
        config: PathBuf,
        /// Points in the synthetic helix used when no geometry is given
        #[arg(short, long, default_value = "1000")]
        points: usize,
        /// Geometry JSON: {"stride": 2|3, "data": [...], "colors": [[r,g,b,a], ...]}
        #[arg(short, long)]
        geometry: Option<PathBuf>,
        /// Resolve the gradient on the CPU and plan per-vertex colors instead
        #[arg(long)]
        bake: bool,
    },
}

#[derive(Deserialize)]
struct GeometryFile {
    #[serde(default = "default_stride")]
    stride: usize,
    data: Vec<f32>,
    #[serde(default)]
    colors: Option<Vec<Rgba>>,
}

fn default_stride() -> usize {
    3
}

fn load_geometry(path: &Path) -> anyhow::Result<GeometryBuffer> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading geometry {}", path.display()))?;
    let file: GeometryFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing geometry {}", path.display()))?;
    let geometry = GeometryBuffer::from_flat(&file.data, file.stride)?;
    Ok(match file.colors {
        Some(colors) => geometry.with_colors(colors)?,
        None => geometry,
    })
}

/// Helix standing in for generator output.
fn helix(points: usize) -> GeometryBuffer {
    GeometryBuffer::new(
        (0..points)
            .map(|i| {
                let t = i as f32 * 0.05;
                Vec3::new(t.cos() * 2.0, t.sin() * 2.0, t * 0.1 - 2.0)
            })
            .collect(),
    )
}

fn print_slots() {
    println!("schema v{SCHEMA_VERSION}");
    println!("{:<22}{:>8}{:>10}", "role", "legacy", "extended");
    for role in BufferRole::ALL {
        let cell = |generation: LayoutGeneration| {
            generation
                .slot(role)
                .map_or_else(|| "-".to_string(), |s| s.to_string())
        };
        println!(
            "{:<22}{:>8}{:>10}",
            role.name(),
            cell(LayoutGeneration::Legacy),
            cell(LayoutGeneration::Extended)
        );
    }
    println!();
    for mode in ColorMode::ALL {
        println!("{} = {}", mode.wgsl_const_name(), mode.gpu_code());
    }
}

fn fmt_rgba(c: Rgba) -> String {
    format!("({:.4}, {:.4}, {:.4}, {:.4})", c.r, c.g, c.b, c.a)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("fractaline v{}", env!("CARGO_PKG_VERSION"));
            println!("schema: v{SCHEMA_VERSION}");
            println!("common: {}", fractaline_common::crate_info());
            println!("gradient: {}", fractaline_gradient::crate_info());
            println!("render: {}", fractaline_render::crate_info());
        }
        Commands::Slots => print_slots(),
        Commands::Resolve {
            config,
            at,
            samples,
        } => {
            let config = RenderConfig::load(&config)?;
            let gradient = config.gradient()?;
            let positions: Vec<f32> = if at.is_empty() {
                (0..samples)
                    .map(|i| fractaline_common::gradient_position(i, samples))
                    .collect()
            } else {
                at
            };
            let colors = gradient.resolve_many(&positions)?;
            println!(
                "Gradient: {} stops, space={:?}",
                gradient.len(),
                gradient.space()
            );
            for (p, c) in positions.iter().zip(colors) {
                println!("  {p:>8.4} -> {}", fmt_rgba(c));
            }
        }
        Commands::Plan {
            config,
            points,
            geometry,
            bake,
        } => {
            let config = RenderConfig::load(&config)?;
            let geometry = match geometry {
                Some(path) => load_geometry(&path)?,
                None => helix(points),
            };
            let gradient = config.gradient()?;
            let uniforms = config.view.uniforms()?;

            let baked;
            let request = if bake && config.color_mode == ColorMode::Gradient {
                baked = gradient.resolve_many(&geometry.gradient_positions())?;
                tracing::info!(points = baked.len(), "baked gradient into per-vertex colors");
                PlanRequest {
                    mode: ColorMode::PerVertex,
                    point_count: geometry.len(),
                    gradient: None,
                    flat_color: None,
                    per_vertex_colors: Some(baked.as_slice()),
                    point_size: config.point_size,
                }
            } else {
                if bake {
                    tracing::warn!(
                        mode = %config.color_mode,
                        "--bake only applies to gradient mode"
                    );
                }
                config.plan_request(geometry.len(), &gradient, geometry.colors())
            };

            let plan = request.plan()?;
            print!("{}", DebugTextStage::new().submit(&plan, &uniforms));
            println!("Primitive: {:?}", config.primitive);
            if let Some((lo, hi)) = geometry.bounds() {
                println!(
                    "Bounds: ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
                    lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
                );
            }

            let colors = ReferenceStage::new().submit(&plan, &uniforms)?;
            if let (Some(first), Some(last)) = (colors.first(), colors.last()) {
                println!("First vertex color: {}", fmt_rgba(*first));
                println!("Last vertex color:  {}", fmt_rgba(*last));
            }
        }
    }

    Ok(())
}
