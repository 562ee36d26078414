use clap::Parser;
use std::process;
use tracing::info;
use treecp::cli::args::{CLIArgs, Invocation};
use treecp::core::batch::copy_all;
use treecp::core::copy::copy;
use treecp::error::CliResult;

fn main() {
    let args = CLIArgs::parse();
    let invocation = match args.validate() {
        Ok(validated) => validated,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Scoped to this run; the library never installs a subscriber itself.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(invocation.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || run(&invocation));

    if let Err(e) = result {
        eprintln!("Error copying: {}", e);
        process::exit(1);
    }
}

fn run(invocation: &Invocation) -> CliResult<()> {
    info!("treecp v{}", env!("CARGO_PKG_VERSION"));
    info!("Destination: {}", invocation.destination.display());

    match invocation.sources.as_slice() {
        [source] if !invocation.batch => {
            info!("Source: {}", source.display());
            copy(source, &invocation.destination, &invocation.options)?;
        }
        sources => {
            info!("Sources: {}", sources.len());
            copy_all(sources, &invocation.destination, &invocation.options)?;
        }
    }

    info!("Copy completed");
    Ok(())
}
