//! Boundary dataset inspector.
//!
//! Loads a dataset the same way the server does, reports the records that
//! were excluded, prints index statistics and resolves ad-hoc points.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use url::Url;

use precinct::pip::JurisdictionIndex;
use precinct::store::CoordinateOrder;
use precinct::{
    BoundarySource, GeoPoint, JurisdictionService, JurisdictionType, LoadOptions,
    ResolvedJurisdiction,
};

#[derive(Parser, Debug)]
#[command(name = "inspect")]
#[command(about = "Validate a jurisdiction boundary dataset and resolve test points")]
struct Args {
    /// GeoJSON dataset on disk
    #[arg(short, long, conflicts_with = "url", required_unless_present = "url")]
    file: Option<PathBuf>,

    /// GeoJSON dataset behind HTTP(S)
    #[arg(long)]
    url: Option<Url>,

    /// Dataset positions are [lat, lon] instead of [lon, lat]
    #[arg(long)]
    lat_lon: bool,

    /// Reject rings that are not explicitly closed
    #[arg(long)]
    strict_closure: bool,

    /// List every valid boundary with its type and extent
    #[arg(short, long)]
    list: bool,

    /// Point to resolve as "lat,lon" (repeatable)
    #[arg(short, long = "point", value_parser = parse_point)]
    points: Vec<GeoPoint>,

    /// Debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_point(input: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = input
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got \"{}\"", input))?;
    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad latitude \"{}\": {}", lat, e))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad longitude \"{}\": {}", lon, e))?;
    Ok(GeoPoint::new(latitude, longitude))
}

/// One line per boundary, sorted by id: id, type, name and bbox
fn listing(index: &JurisdictionIndex) -> Vec<String> {
    let mut boundaries: Vec<_> = index.boundaries().collect();
    boundaries.sort_by(|a, b| a.id.cmp(&b.id));

    boundaries
        .into_iter()
        .map(|boundary| {
            let extent = match boundary.bbox() {
                Some((west, south, east, north)) => {
                    format!("[{}, {}, {}, {}]", west, south, east, north)
                }
                None => "-".to_string(),
            };
            format!(
                "{}\t{}\t{}\t{}{}",
                boundary.id,
                boundary.jurisdiction_type,
                boundary.name,
                extent,
                if boundary.has_shape() { "" } else { " (extent only)" }
            )
        })
        .collect()
}

#[derive(Serialize)]
struct Resolution {
    point: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    jurisdictions: Vec<ResolvedJurisdiction>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    precinct::logging::init(args.verbose)?;

    let source = match (args.file, args.url) {
        (Some(path), _) => BoundarySource::File(path),
        (None, Some(url)) => BoundarySource::Url(url),
        (None, None) => anyhow::bail!("Either --file or --url is required"),
    };
    let options = LoadOptions {
        coordinate_order: if args.lat_lon {
            CoordinateOrder::LatLon
        } else {
            CoordinateOrder::LonLat
        },
        strict_closure: args.strict_closure,
    };

    let store = source
        .load(&options)
        .await
        .with_context(|| format!("Failed to load boundaries from {}", source))?;

    println!("Source: {}", source);
    println!(
        "Valid boundaries: {}, rejected: {}",
        store.len(),
        store.rejected().len()
    );
    for rejection in store.rejected() {
        println!("  {}", rejection);
    }

    let index = JurisdictionIndex::build(store.into_boundaries());
    println!("Index entries: {}", index.entries());
    for jurisdiction_type in JurisdictionType::all() {
        let count = index.boundaries_of_type(*jurisdiction_type).len();
        if count > 0 {
            println!("  {}: {}", jurisdiction_type, count);
        }
    }

    if args.list {
        for line in listing(&index) {
            println!("{}", line);
        }
    }

    if args.points.is_empty() {
        return Ok(());
    }

    let service = JurisdictionService::new(index);
    let resolutions: Vec<Resolution> = args
        .points
        .into_iter()
        .map(|point| match service.resolve(point) {
            Ok(jurisdictions) => Resolution {
                point,
                error: None,
                jurisdictions,
            },
            Err(e) => Resolution {
                point,
                error: Some(e.to_string()),
                jurisdictions: Vec::new(),
            },
        })
        .collect();

    info!("Resolved {} points", resolutions.len());
    println!("{}", serde_json::to_string_pretty(&resolutions)?);

    Ok(())
}
