use clap::{Parser, Subcommand};
use cli::SceneFile;
use color_eyre::eyre::Result;
use fusion::{
    contour::CanvasRaster,
    pipeline::{Pipeline, SceneInput},
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a scene file and print the fused element set
    Analyze {
        /// Path to the scene file (.json or .toml)
        #[arg(short, long)]
        scene: PathBuf,
        /// Optional canvas raster image for contour extraction
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Write the analyzed scene JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export the result as GeoJSON
        #[arg(short, long)]
        geojson: Option<PathBuf>,
    },
    /// Print the JSON schema for scene files
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze {
            scene,
            image,
            output,
            geojson,
        } => {
            analyze(scene, image.as_deref(), output.as_deref(), geojson.as_deref())?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(SceneFile);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn analyze(
    scene_path: &Path,
    image_path: Option<&Path>,
    output_path: Option<&Path>,
    geojson_path: Option<&Path>,
) -> Result<()> {
    let scene_file = SceneFile::from_file(scene_path)?;
    info!(
        strokes = scene_file.strokes.len(),
        "loaded scene from {scene_path:?}"
    );

    let raster = match image_path {
        Some(path) => {
            let image = image::open(path)?.to_rgba8();
            let (width, height) = image.dimensions();
            info!(width, height, "loaded canvas raster from {path:?}");
            Some(CanvasRaster::from_rgba(image.into_raw(), width, height)?)
        }
        None => None,
    };

    let input = SceneInput {
        strokes: scene_file.strokes,
        detections: scene_file.detections,
        raster,
        canvas: scene_file.canvas,
    };

    let pipeline = Pipeline::builder().build();
    let analyzed = pipeline.process(&input)?;
    info!(elements = analyzed.elements.len(), "analysis complete");

    let json = serde_json::to_string_pretty(&analyzed)?;
    match output_path {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }

    if let Some(path) = geojson_path {
        analyzed.save_geojson(&path.to_string_lossy())?;
        info!("wrote GeoJSON to {path:?}");
    }

    Ok(())
}
