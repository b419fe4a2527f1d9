use clap::Parser;
use tracing_subscriber::FmtSubscriber;
use ucp_cli::{Cli, Commands, UcpConfig};

mod commands;

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = UcpConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Solve(args) => commands::solve::handle(&args, config),
        Commands::Validate(args) => commands::validate::handle(&args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
