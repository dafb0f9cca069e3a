//! Main entry point for the csq2tsv CLI.

use clap::{error::ErrorKind, Parser};
use csq2tsv::{common, flatten};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Flatten VEP CSQ annotations and first-sample genotypes from VCF into TSV"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// Arguments for flattening
    #[command(flatten)]
    args: flatten::Args,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // Usage errors exit with 1 rather than clap's default of 2.
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    // Build a tracing subscriber according to the configuration in `cli.common`.  Logs go to
    // stderr as stdout may carry the TSV output.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(common::level_filter(&cli.common.verbose))
        .compact()
        .finish();

    tracing::subscriber::with_default(collector, || {
        tracing::info!("csq2tsv {} startup", common::version());

        flatten::run(&cli.common, &cli.args)?;

        tracing::info!("All done. Have a nice day!");

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        super::Cli::command().debug_assert();
    }
}
