mod harness;
mod logging;

use std::path::PathBuf;

use clap::Parser;

use crate::harness::{BuiltinExtension, ConnectionOptions, DistanceExtension, DynamicExtension, Session};

/// Smoke-tests the OLC distance functions against a transient in-memory
/// database and prints the three reference distances.
#[derive(Parser)]
#[command(name = "liteolc", version)]
struct Args {
  /// Load a compiled extension module from this path instead of the
  /// built-in functions.
  #[arg(long, value_name = "PATH")]
  extension: Option<PathBuf>,

  /// Enable debug logging.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  logging::init(args.verbose);

  let options = ConnectionOptions {
    allow_extension_loading: args.extension.is_some(),
  };
  let session = Session::open_in_memory(options)?;

  let extension: Box<dyn DistanceExtension> = match args.extension {
    Some(path) => Box::new(DynamicExtension::new(path)),
    None => Box::new(BuiltinExtension),
  };
  session.install(extension.as_ref())?;

  let report = harness::run_smoke(&session)?;
  println!("{} meters", report.olc_distance);
  println!("{} meters", report.geo_distance);
  println!("{} meters", report.olc_geo_distance);

  session.close()?;
  return Ok(());
}
