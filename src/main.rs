use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use geo_providers::{
    config::Config,
    feature::geojson::{collection_to_geojson, feature_to_geojson, write_geojson},
    QueryParameters, ResultType,
};

/// Query a configured feature collection and print it as GeoJSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input config file.
    #[arg(short, long)]
    config_filepath: PathBuf,

    /// Collection to query, as named in the config file.
    #[arg(long)]
    collection: String,

    /// Fetch a single feature instead of a page.
    #[arg(short, long)]
    identifier: Option<String>,

    #[arg(long, default_value_t = 0)]
    startindex: usize,

    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// `results` or `hits`.
    #[arg(long, default_value = "results")]
    resulttype: ResultType,

    /// Comma separated property names to return.
    #[arg(long, value_delimiter = ',')]
    select_properties: Vec<String>,

    #[arg(long)]
    skip_geometry: bool,

    /// Write the GeoJSON document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::try_parse()?;
    let config = Config::from_file(&args.config_filepath)?;
    let provider = config.provider(&args.collection)?;

    let geojson_contents = match &args.identifier {
        Some(identifier) => {
            log::info!("Fetching {} from {}", identifier, args.collection);
            match provider.get(identifier)? {
                Some(feature) => feature_to_geojson(feature),
                None => {
                    log::warn!("Feature {} not found in {}", identifier, args.collection);
                    return Err(anyhow!("Feature {} not found", identifier));
                }
            }
        }
        None => {
            let params = QueryParameters::default()
                .with_window(args.startindex, args.limit)
                .with_resulttype(args.resulttype)
                .with_select_properties(args.select_properties.clone())
                .with_skip_geometry(args.skip_geometry);
            let collection = provider.query(&params)?;
            log::info!(
                "Queried {}: {:?} returned, {:?} matched",
                args.collection,
                collection.number_returned(),
                collection.number_matched()
            );
            collection_to_geojson(collection)
        }
    };

    match &args.output {
        Some(output_filepath) => {
            log::info!("Writing GeoJSON to {:?}", output_filepath);
            write_geojson(&geojson_contents, output_filepath)?;
        }
        None => println!("{}", geojson_contents),
    }
    Ok(())
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
