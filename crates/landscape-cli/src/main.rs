//! landscape CLI - permaculture drafting tools
//!
//! Runs one drafting operation against a JSON drawing document. External
//! data is replayed from a recorded JSON file; no network access is made.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use landscape::{
    annual_rainfall_average, calibrate_scale, draw_contours, label_precipitation,
    seasonal_shadows, set_geo_reference, site_boundary, structure_information, GeoReference,
    Layer, MemoryDocument, Settings, SiteMetadata,
};
use landscape_math::LatLon;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod recorded;

use recorded::{RecordedData, RecordedFetcher};

#[derive(Parser)]
#[command(name = "landscape")]
#[command(about = "Permaculture drafting tools for landscape documents", long_about = None)]
struct Cli {
    /// Log debug detail (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// Document JSON file, rewritten in place
    #[arg(short, long)]
    document: PathBuf,
    /// Settings TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Recorded external data (JSON)
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the geodetic center of the page
    Geo {
        #[command(flatten)]
        common: Common,
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Base map zoom level
        #[arg(long, default_value_t = 18)]
        zoom: u8,
        /// Average annual rainfall in mm
        #[arg(long)]
        rainfall: Option<f64>,
    },
    /// Calibrate the scale from a reference line or path
    Scale {
        #[command(flatten)]
        common: Common,
        /// Id of the reference shape
        selection: String,
        /// Real-world length of the reference in meters
        meters: f64,
        /// Replace an existing scale factor
        #[arg(long = "override")]
        override_existing: bool,
    },
    /// Outline the site with the selected closed path
    Site {
        #[command(flatten)]
        common: Common,
        /// Id of the site outline
        selection: String,
    },
    /// Label closed paths on the Precipitation layer with rainfall volumes
    Precipitation {
        #[command(flatten)]
        common: Common,
    },
    /// Annotate a structure with its area and rainfall
    Structure {
        #[command(flatten)]
        common: Common,
        /// Id of the structure outline
        selection: String,
    },
    /// Average historical rainfall into the document metadata
    Rainfall {
        #[command(flatten)]
        common: Common,
        /// Last day of the history (default: today)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Years of history (default: from settings)
        #[arg(long)]
        years: Option<u32>,
    },
    /// Draw elevation contours over the page
    Elevation {
        #[command(flatten)]
        common: Common,
    },
    /// Draw winter and summer shadows of a structure
    Shadow {
        #[command(flatten)]
        common: Common,
        /// Id of the structure footprint
        selection: String,
        /// Structure height in meters
        height: f64,
        /// Year of the solstices (default: settings, then current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Display metadata and layers of a document
    Info {
        /// Document JSON file
        #[arg(short, long)]
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Geo {
            common,
            latitude,
            longitude,
            zoom,
            rainfall,
        } => {
            let geo = GeoReference {
                center: LatLon::new(latitude, longitude),
                zoom,
                annual_rainfall_avg: rainfall,
            };
            let mut doc = load_document(&common.document)?;
            set_geo_reference(&mut doc, &geo)?;
            save_document(&common.document, &doc)?;
            print_report(&geo)?;
        }
        Commands::Scale {
            common,
            selection,
            meters,
            override_existing,
        } => {
            let mut doc = load_document(&common.document)?;
            let report = calibrate_scale(&mut doc, Some(&selection), meters, override_existing)?;
            save_document(&common.document, &doc)?;
            print_report(&report)?;
        }
        Commands::Site { common, selection } => {
            let mut doc = load_document(&common.document)?;
            let report = site_boundary(&mut doc, Some(&selection))?;
            save_document(&common.document, &doc)?;
            print_report(&report)?;
        }
        Commands::Precipitation { common } => {
            let mut doc = load_document(&common.document)?;
            let report = label_precipitation(&mut doc)?;
            save_document(&common.document, &doc)?;
            print_report(&report)?;
        }
        Commands::Structure { common, selection } => {
            let mut doc = load_document(&common.document)?;
            let report = structure_information(&mut doc, Some(&selection))?;
            save_document(&common.document, &doc)?;
            print_report(&report)?;
        }
        Commands::Rainfall { common, end, years } => {
            let settings = load_settings(common.config.as_deref())?;
            let mut fetcher = load_fetcher(common.data.as_deref())?;
            let mut doc = load_document(&common.document)?;
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            let years = years.unwrap_or(settings.rainfall.history_years);
            let report = annual_rainfall_average(&mut doc, &mut fetcher, end, years)?;
            save_document(&common.document, &doc)?;
            print_report(&report)?;
        }
        Commands::Elevation { common } => {
            let settings = load_settings(common.config.as_deref())?;
            let mut fetcher = load_fetcher(common.data.as_deref())?;
            let mut doc = load_document(&common.document)?;
            let report = draw_contours(&mut doc, &mut fetcher, &settings.contour.to_contour_settings())?;
            save_document(&common.document, &doc)?;
            print_report(&report)?;
        }
        Commands::Shadow {
            common,
            selection,
            height,
            year,
        } => {
            let settings = load_settings(common.config.as_deref())?;
            let mut fetcher = load_fetcher(common.data.as_deref())?;
            let mut doc = load_document(&common.document)?;
            let year = year
                .or(settings.shadow.year)
                .unwrap_or_else(|| Local::now().year());
            let report = seasonal_shadows(
                &mut doc,
                Some(&selection),
                height,
                &mut fetcher,
                &settings.shadow,
                year,
            )?;
            save_document(&common.document, &doc)?;
            print_report(&report)?;
        }
        Commands::Info { document } => {
            show_info(&document)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_document(path: &Path) -> Result<MemoryDocument> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading document {}", path.display()))?;
    MemoryDocument::from_json(&json).with_context(|| format!("parsing document {}", path.display()))
}

fn save_document(path: &Path, doc: &MemoryDocument) -> Result<()> {
    fs::write(path, doc.to_json()?).with_context(|| format!("writing document {}", path.display()))
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    Ok(Settings::from_toml(&source)?)
}

fn load_fetcher(path: Option<&Path>) -> Result<RecordedFetcher> {
    let data = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading recorded data {}", path.display()))?;
            RecordedData::from_json(&json)
                .with_context(|| format!("parsing recorded data {}", path.display()))?
        }
        None => RecordedData::default(),
    };
    Ok(RecordedFetcher::new(data))
}

fn print_report<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let doc = load_document(path)?;
    let meta = SiteMetadata::load(&doc)?;

    println!("Document: {}", path.display());
    println!("Page: {} x {}", doc.width, doc.height);
    println!();

    let show = |name: &str, value: Option<String>| {
        println!("  {:<20} {}", name, value.unwrap_or_else(|| "-".to_string()));
    };
    println!("Metadata:");
    show("scale factor", meta.scale_factor.map(|v| format!("{v} units/m")));
    show("latitude", meta.latitude.map(|v| v.to_string()));
    show("longitude", meta.longitude.map(|v| v.to_string()));
    show("zoom", meta.zoom.map(|v| v.to_string()));
    show(
        "annual rainfall",
        meta.annual_rainfall_avg.map(|v| format!("{v:.1} mm")),
    );

    println!();
    println!("Layers:");
    if doc.root.drawables.is_empty() && doc.root.layers.is_empty() {
        println!("  (empty)");
    }
    if !doc.root.drawables.is_empty() {
        println!("  (root): {} shapes", doc.root.drawables.len());
    }
    for layer in &doc.root.layers {
        print_layer(layer, 1);
    }

    Ok(())
}

fn print_layer(layer: &Layer, depth: usize) {
    println!(
        "{}{}: {} shapes",
        "  ".repeat(depth),
        layer.label,
        layer.drawables.len()
    );
    for sub in &layer.layers {
        print_layer(sub, depth + 1);
    }
}
