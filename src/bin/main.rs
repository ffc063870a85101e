//! gridmarch CLI
//!
//! `convert` runs the offline mesh-to-atlas pipeline, `render` sphere
//! traces an atlas (or a built-in demo scene) to a PNG, `info` prints
//! atlas metadata.
//!
//! Author: Pierre Vandel

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;

use gridmarch::grid::{self, GridConfig, SampleFilter};
use gridmarch::mesh::load_obj;
use gridmarch::raycast::{
    render_color, CameraConfig, FrameConfig, ShadingMode,
};
use gridmarch::SdfNode;

#[derive(Parser)]
#[command(name = "gridmarch")]
#[command(version = gridmarch::VERSION)]
#[command(about = "Mesh-to-SDF conversion and grid-based ray march rendering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a mesh into a distance grid atlas (PNG + sidecar metadata)
    Convert {
        /// Input mesh (.obj)
        input: PathBuf,
        /// Output atlas image (.png)
        #[arg(short, long)]
        output: PathBuf,
        /// Cells along the longest bounding-box axis
        #[arg(short, long, default_value = "64")]
        resolution: u32,
        /// Padding margin as a fraction of the longest axis
        #[arg(short, long, default_value = "0.125")]
        padding: f32,
    },

    /// Render an atlas (or the demo scene) to a PNG
    Render {
        /// Input atlas image; omit to render the demo scene
        atlas: Option<PathBuf>,
        /// Output image
        #[arg(short, long, default_value = "render.png")]
        output: PathBuf,
        /// Image width in pixels
        #[arg(long, default_value = "512")]
        width: u32,
        /// Image height in pixels
        #[arg(long, default_value = "512")]
        height: u32,
        /// Shading mode
        #[arg(long, value_enum, default_value = "lambert")]
        mode: ModeArg,
        /// Frame configuration JSON (camera, march budget, material);
        /// overrides the flags above except the output size
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Display atlas metadata
    Info {
        /// Atlas image path (the sidecar .meta.json is read next to it)
        atlas: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Flat,
    Lambert,
    Blinn,
}

impl From<ModeArg> for ShadingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Flat => ShadingMode::Flat,
            ModeArg::Lambert => ShadingMode::Lambert,
            ModeArg::Blinn => ShadingMode::Blinn,
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            input,
            output,
            resolution,
            padding,
        } => cmd_convert(input, output, resolution, padding),
        Commands::Render {
            atlas,
            output,
            width,
            height,
            mode,
            config,
        } => cmd_render(atlas, output, width, height, mode, config),
        Commands::Info { atlas } => cmd_info(atlas),
    }
}

fn cmd_convert(input: PathBuf, output: PathBuf, resolution: u32, padding: f32) {
    let mesh = match load_obj(&input) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input.display(), e);
            std::process::exit(1);
        }
    };
    println!(
        "Loaded {}: {} vertices, {} triangles",
        input.display(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );

    let config = GridConfig {
        resolution,
        padding,
    };
    let start = std::time::Instant::now();
    let grid = match grid::generate(&mesh, &config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Conversion failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    match grid::save_atlas(&grid, &output) {
        Ok(meta) => {
            println!(
                "Wrote {} ({}x{}x{} cells, range [{:.4}, {:.4}], {:.1}ms)",
                output.display(),
                meta.dims[0],
                meta.dims[1],
                meta.dims[2],
                meta.range[0],
                meta.range[1],
                elapsed.as_secs_f64() * 1000.0
            );
        }
        Err(e) => {
            eprintln!("Failed to write atlas: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_render(
    atlas: Option<PathBuf>,
    output: PathBuf,
    width: u32,
    height: u32,
    mode: ModeArg,
    config_path: Option<PathBuf>,
) {
    // Scene: decoded grid, or the demo blend if no atlas was given
    let (scene, focus, extent) = match &atlas {
        Some(path) => match grid::load_atlas(path) {
            Ok(grid) => {
                let bounds = grid.bounds();
                let (center, extent) = (bounds.center(), bounds.size().max_element());
                (
                    SdfNode::grid(grid, SampleFilter::Trilinear),
                    center,
                    extent,
                )
            }
            Err(e) => {
                eprintln!("Failed to load atlas {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let scene = SdfNode::sphere(Vec3::new(-1.5, 0.0, 0.0), 1.0)
                .smooth_union(SdfNode::sphere(Vec3::new(1.5, 0.0, 0.0), 1.0), 0.5);
            (scene, Vec3::ZERO, 5.0)
        }
    };

    let frame = match config_path {
        Some(path) => {
            let json = match std::fs::read_to_string(&path) {
                Ok(j) => j,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            };
            match serde_json::from_str::<FrameConfig>(&json) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Bad frame config {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            let eye = focus + Vec3::new(0.6, 0.45, 1.0).normalize() * extent * 1.6;
            FrameConfig {
                camera: CameraConfig::look_at(eye, focus, std::f32::consts::FRAC_PI_4),
                mode: mode.into(),
                ..Default::default()
            }
        }
    };

    let start = std::time::Instant::now();
    let pixels = render_color(&scene, &frame, width, height);
    let elapsed = start.elapsed();

    let raw: Vec<u8> = pixels.into_iter().flatten().collect();
    let img = match image::RgbImage::from_raw(width, height, raw) {
        Some(img) => img,
        None => {
            eprintln!("Internal error: pixel buffer size mismatch");
            std::process::exit(1);
        }
    };
    if let Err(e) = img.save_with_format(&output, image::ImageFormat::Png) {
        eprintln!("Failed to write {}: {}", output.display(), e);
        std::process::exit(1);
    }

    println!(
        "Rendered {}x{} to {} in {:.1}ms",
        width,
        height,
        output.display(),
        elapsed.as_secs_f64() * 1000.0
    );
}

fn cmd_info(atlas: PathBuf) {
    let meta_file = grid::atlas::meta_path(&atlas);
    let json = match std::fs::read_to_string(&meta_file) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Failed to read {}: {}", meta_file.display(), e);
            std::process::exit(1);
        }
    };
    let meta: gridmarch::grid::AtlasMeta = match serde_json::from_str(&json) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Bad metadata in {}: {}", meta_file.display(), e);
            std::process::exit(1);
        }
    };

    println!("Atlas: {}", atlas.display());
    println!(
        "  dims:      {} x {} x {}",
        meta.dims[0], meta.dims[1], meta.dims[2]
    );
    println!("  cell size: {}", meta.cell_size);
    println!(
        "  origin:    ({}, {}, {})",
        meta.origin.x, meta.origin.y, meta.origin.z
    );
    println!("  range:     [{}, {}]", meta.range[0], meta.range[1]);
    println!("  step:      {}", meta.quantization_step());
}
