use clap::Parser;
use tracing::error;

use rectus::cli::Args;
use rectus::db::{open_datastore, DatabaseConfig};
use rectus::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.log_level.as_deref())?;

    let config = DatabaseConfig::resolve(args.database_url.as_deref(), args.config.as_deref())?;
    let db = open_datastore(&config).inspect_err(|e| error!(error = %e, "cannot open datastore"))?;

    let output = args.command.run(db.as_ref(), args.format)?;
    println!("{}", output.text);
    if !output.success {
        std::process::exit(1);
    }
    Ok(())
}
