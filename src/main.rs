//! Terrasom CLI - SOM-based regionalization of geospatial features.
//!
//! Reads a GeoJSON feature collection, clusters it with a self-organizing
//! map, and writes three artifacts: labeled features, a cluster raster and a
//! smoothed heatmap.

use clap::{Parser, ValueEnum};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::error;
use std::path::PathBuf;
use std::time::Instant;
use terrasom::{
    cluster, BinaryRasterStore, Config, FeatureStore, FillPolicy, GeoJsonStore, GridRasterizer,
    NormalizeConfig, RasterConfig, RasterStore, Result, SmoothConfig, Som, SomConfig, SomTrainer,
    SurfaceSmoother, VectorNormalizer,
};
use terrasom::feature::{ops, Epsg};

#[derive(Parser)]
#[command(name = "terrasom")]
#[command(version)]
#[command(about = "Cluster geospatial features with a Self-Organizing Map", long_about = None)]
struct Cli {
    /// Path to the input GeoJSON feature collection
    input_file: PathBuf,

    /// Base path for the output files
    output_base: String,

    /// Comma-separated list of attribute names to include in the analysis
    #[arg(long, value_delimiter = ',', required = true)]
    attributes: Vec<String>,

    /// Sigma for the Gaussian filter in heatmap generation
    #[arg(long, default_value = "1.0")]
    sigma: f64,

    /// Cell size for the output raster
    #[arg(long = "cell_size", default_value = "0.001")]
    cell_size: f64,

    /// Width of the SOM grid
    #[arg(long = "som_x", default_value = "5")]
    som_x: usize,

    /// Height of the SOM grid
    #[arg(long = "som_y", default_value = "5")]
    som_y: usize,

    /// Number of iterations for the SOM algorithm
    #[arg(long = "num_iterations", default_value = "1000")]
    num_iterations: usize,

    /// EPSG code the input features must already be in
    #[arg(long, default_value = "3763")]
    crs: u32,

    /// Weight to apply to geographic coordinates during normalization
    #[arg(long = "geo_weight", default_value = "1.0")]
    geo_weight: f64,

    /// SOM neighborhood radius at the start of training
    #[arg(long = "som_sigma", default_value = "0.3")]
    som_sigma: f64,

    /// SOM learning rate at the start of training
    #[arg(long = "learning_rate", default_value = "0.5")]
    learning_rate: f64,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Fill convention for cells no geometry touches
    #[arg(long = "fill_policy", value_enum, default_value = "sentinel")]
    fill_policy: FillPolicyArg,

    /// Ceiling on the number of raster cells
    #[arg(long = "max_cells", default_value = "10000000")]
    max_cells: u64,

    /// Geometry simplification tolerance; 0 disables simplification
    #[arg(long = "simplify_tolerance", default_value = "0.001")]
    simplify_tolerance: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FillPolicyArg {
    Zero,
    Sentinel,
}

impl From<FillPolicyArg> for FillPolicy {
    fn from(arg: FillPolicyArg) -> Self {
        match arg {
            FillPolicyArg::Zero => FillPolicy::Zero,
            FillPolicyArg::Sentinel => FillPolicy::Sentinel,
        }
    }
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            attributes: self.attributes.clone(),
            crs: self.crs,
            simplify_tolerance: (self.simplify_tolerance > 0.0).then_some(self.simplify_tolerance),
            normalize: NormalizeConfig {
                include_geography: true,
                geo_weight: self.geo_weight,
            },
            som: SomConfig {
                som_x: self.som_x,
                som_y: self.som_y,
                iterations: self.num_iterations,
                sigma: self.som_sigma,
                learning_rate: self.learning_rate,
                seed: self.seed,
            },
            raster: RasterConfig {
                cell_size: self.cell_size,
                max_cells: self.max_cells,
                fill: self.fill_policy.into(),
            },
            smooth: SmoothConfig { sigma: self.sigma },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let start_time = Instant::now();
    let config = cli.to_config();

    println!("Terrasom");
    println!("   Clustering features from: {}", cli.input_file.display());
    println!();

    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap();
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
        .unwrap();

    // Step 1: Load and prepare features
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style.clone());
    pb.set_message("Loading features...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let store = GeoJsonStore;
    let mut collection = store.load(&cli.input_file)?;
    if collection.is_empty() {
        return Err(terrasom::TerrasomError::Config(format!(
            "no features in {}",
            cli.input_file.display()
        )));
    }
    ops::reproject(&mut collection, Epsg(config.crs))?;
    if let Some(tolerance) = config.simplify_tolerance {
        for feature in &mut collection.features {
            feature.geometry = ops::simplify(&feature.geometry, tolerance);
        }
    }

    pb.finish_and_clear();
    println!("✓ Loaded {} features ({})", collection.len(), Epsg(config.crs));

    // Step 2: Normalize attributes
    let normalizer = VectorNormalizer::new(config.normalize.clone());
    let normalized = normalizer.build(&collection.features, &config.attributes)?;
    println!(
        "✓ Normalized {} vectors ({} dimensions)",
        normalized.vectors.len(),
        normalized.dim()
    );

    // Step 3: Train SOM
    let mut som = Som::new(&config.som, normalized.dim());
    let mut trainer = SomTrainer::new(config.som.clone());

    let pb = ProgressBar::new(config.som.iterations as u64);
    pb.set_style(bar_style);
    trainer.train_with_progress(&mut som, &normalized.vectors, |_| pb.inc(1))?;
    pb.finish_and_clear();
    println!(
        "✓ Trained {}x{} SOM for {} iterations",
        config.som.som_x, config.som.som_y, config.som.iterations
    );

    // Step 4: Label features and save clusters
    let crs = collection.crs.unwrap_or(Epsg(config.crs));
    let labeled = cluster::label_features(collection.features, normalized, &som, crs)?;

    let clusters_path = PathBuf::from(format!("{}.clusters.geojson", cli.output_base));
    store.save(&labeled, &clusters_path)?;
    println!("✓ Wrote {}", clusters_path.display());

    // Step 5: Rasterize
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style.clone());
    pb.set_message("Rasterizing clusters...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let grid = GridRasterizer::new(config.raster.clone()).rasterize(&labeled)?;
    let raster_store = BinaryRasterStore;
    let raster_path = PathBuf::from(format!("{}.raster.tsr", cli.output_base));
    raster_store.save(&grid, &raster_path)?;

    pb.finish_and_clear();
    println!(
        "✓ Wrote {} ({} x {} cells)",
        raster_path.display(),
        grid.width(),
        grid.height()
    );

    // Step 6: Smooth into a heatmap
    let smoother = SurfaceSmoother::new(config.smooth.clone(), config.raster.fill);
    let heatmap = smoother.smooth(&grid);
    let heatmap_path = PathBuf::from(format!("{}.heatmap.tsr", cli.output_base));
    raster_store.save(&heatmap, &heatmap_path)?;
    println!("✓ Wrote {}", heatmap_path.display());

    println!();
    println!("Done in {}", HumanDuration(start_time.elapsed()));
    Ok(())
}
