use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use ndvimap::{build_feature_collection, setup_map, MapConfig, NdviResponse, OverlayLayer, PresenterOptions, SvgMap};

#[derive(Debug, Parser)]
#[command(name = "ndvimap", version, about = "Render NDVI field polygons on a satellite map")]
struct Args {
    /// Map configuration file to use (.toml).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: PathBuf,
    /// NDVI response to render (.json).
    #[arg(short = 'd', long = "data", value_name = "FILE")]
    data: PathBuf,
    /// Access token for the base map tiles, overrides the configuration.
    #[arg(short = 't', long = "access-token", value_name = "TOKEN")]
    access_token: Option<String>,
    /// Also write the field FeatureCollection to this file.
    #[arg(long = "geojson", value_name = "FILE")]
    geojson: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = MapConfig::from_path(&args.config)
        .with_context(|| format!("Unable to load configuration file: {}", args.config.display()))?;
    let access_token = match args.access_token.or_else(|| config.access_token.clone()) {
        Some(token) => token,
        None => bail!("No access token given, use --access-token or map.access_token"),
    };

    let file = File::open(&args.data)
        .with_context(|| format!("Unable to open NDVI response: {}", args.data.display()))?;
    let response = NdviResponse::from_reader(BufReader::new(file))
        .with_context(|| format!("Unable to decode NDVI response: {}", args.data.display()))?;
    let collection = build_feature_collection(&response);
    info!("{} fields read from {}", collection.features.len(), args.data.display());

    if let Some(ref path) = args.geojson {
        let out = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        serde_json::to_writer(out, &collection)?;
        info!("FeatureCollection written to {}", path.display());
    }

    let overlay = OverlayLayer::new(collection, config.style.clone());
    let mut map = SvgMap::from_config(&config);
    setup_map(&mut map, &overlay, &access_token, &PresenterOptions::from(&config))?;
    map.save(&config.output)
        .with_context(|| format!("Unable to write map to {}", config.output.display()))?;
    info!("Map saved to {}", config.output.display());
    Ok(())
}
