use std::error::Error as _;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use sprint_metrics::cli::{Cli, Commands};
use sprint_metrics::client::JiraClient;
use sprint_metrics::{commands, output, Config, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    setup_logging(verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");

        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    output::set_json_output(cli.json);

    match cli.command {
        // Commands that don't require config/client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sprint-metrics", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run(cli.config.as_deref())?;
        }
        Commands::Stages(args) => {
            commands::stages::run(args)?;
        }
        Commands::Build(args) => {
            let config = Config::load(cli.config.as_deref())?;
            commands::build::run(&config, args)?;
        }
        // Commands that talk to Jira
        command => {
            let config = Config::load(cli.config.as_deref())?;
            let client = JiraClient::new(&config)?;

            match command {
                Commands::Sprint(args) => {
                    commands::sprint::extract(&client, &config, args).await?;
                }
                Commands::Pbis(args) => {
                    commands::pbis::list(&client, &config, args).await?;
                }
                Commands::Sprints { board, state } => {
                    commands::sprints::list(&client, &config, board, &state).await?;
                }
                Commands::Completions { .. }
                | Commands::Init
                | Commands::Stages(_)
                | Commands::Build(_) => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
