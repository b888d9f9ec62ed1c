//! Builds the area proximity edge table consumed by the pooling core.
//!
//! Reads a `name,lat,lon` CSV of named areas, computes pairwise haversine
//! distances, and writes every pair within the distance threshold as an
//! `area1,area2,distance_km` row. The core loads that table once and
//! treats each row as a bidirectional "near enough to match" edge.

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use pool_core::proximity::LocationEdge;

/// Earth radius in km.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Parser)]
#[command(about = "Build the area proximity edge table from a location CSV")]
struct Args {
    /// CSV of named areas: name,lat,lon (with header).
    #[arg(long, env = "POOL_LOCATIONS_CSV", default_value = "locations.csv")]
    input: PathBuf,

    /// Output CSV for the edge table: area1,area2,distance_km.
    #[arg(long, env = "POOL_EDGES_CSV", default_value = "edges.csv")]
    output: PathBuf,

    /// Maximum distance in km for two areas to count as near.
    #[arg(long, default_value_t = 4.0)]
    max_distance_km: f64,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    name: String,
    lat: f64,
    lon: f64,
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

fn read_locations(path: &PathBuf) -> Result<Vec<LocationRow>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let mut locations = Vec::new();
    for row in reader.deserialize() {
        let location: LocationRow = row?;
        locations.push(location);
    }
    Ok(locations)
}

fn build_edges(locations: &[LocationRow], max_distance_km: f64) -> Vec<LocationEdge> {
    let mut edges = Vec::new();
    for (i, a) in locations.iter().enumerate() {
        for b in locations.iter().skip(i + 1) {
            let distance_km = haversine_km(a.lat, a.lon, b.lat, b.lon);
            if distance_km <= max_distance_km {
                edges.push(LocationEdge {
                    area1: a.name.clone(),
                    area2: b.name.clone(),
                    distance_km,
                });
            }
        }
    }
    edges
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let locations = read_locations(&args.input)?;
    println!("Loaded {} locations from {}", locations.len(), args.input.display());

    let edges = build_edges(&locations, args.max_distance_km);

    let mut writer = csv::Writer::from_writer(File::create(&args.output)?);
    for edge in &edges {
        writer.serialize(edge)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} edges within {} km to {}",
        edges.len(),
        args.max_distance_km,
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
