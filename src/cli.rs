use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::client::OPEN_SPRINT_STATES;

#[derive(Parser)]
#[command(name = "sprint-metrics")]
#[command(about = "Sprint backlog extraction and cycle-time metrics for Jira", version)]
#[command(after_help = "EXAMPLES:
    sprint-metrics sprint --sprint \"Sprint 12\"     Extract backlogs with subtask durations
    sprint-metrics stages output.json              Stage timings per PBI
    sprint-metrics pbis --label team-a             List the sprint's PBIs
    sprint-metrics sprints                         List active and future sprints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Show debug logging and detailed errors
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Config file (default: platform config dir, sprint-metrics/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a sprint's issues and write backlogs with subtask durations
    #[command(after_help = "EXAMPLES:
    sprint-metrics sprint
    sprint-metrics sprint --sprint \"Sprint 12\" --label team-a --output sprint12.json
    sprint-metrics sprint --dump-issues debug.json")]
    Sprint(SprintArgs),
    /// Fetch a sprint's PBIs (no subtasks, no timing)
    #[command(after_help = "EXAMPLES:
    sprint-metrics pbis --sprint \"Sprint 12\" --label team-a")]
    Pbis(PbiArgs),
    /// Build backlogs from a saved search response instead of the API
    #[command(after_help = "EXAMPLES:
    sprint-metrics build debug.json --output backlogs.json")]
    Build(BuildArgs),
    /// Aggregate subtask times per development stage
    #[command(after_help = "EXAMPLES:
    sprint-metrics stages backlogs.json
    sprint-metrics stages backlogs.json --output-file stages.json")]
    Stages(StagesArgs),
    /// List a board's sprints
    #[command(after_help = "EXAMPLES:
    sprint-metrics sprints
    sprint-metrics sprints --board 42 --state active,closed")]
    Sprints {
        /// Board id (uses board_id from config if not specified)
        #[arg(long)]
        board: Option<u64>,

        /// Comma-separated sprint states
        #[arg(long, default_value = OPEN_SPRINT_STATES)]
        state: String,
    },
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    sprint-metrics completions bash > ~/.bash_completion.d/sprint-metrics
    sprint-metrics completions zsh > ~/.zfunc/_sprint-metrics")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    Init,
}

#[derive(Args, Clone)]
pub struct SprintArgs {
    /// Sprint name (uses sprint_name from config if not specified)
    #[arg(long)]
    pub sprint: Option<String>,

    /// Team label to filter issues by
    #[arg(long)]
    pub label: Option<String>,

    /// Board id used to look up sprint dates
    #[arg(long)]
    pub board: Option<u64>,

    /// Where to write the extract (default: output_file from config, then output.json)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also save the raw search response
    #[arg(long)]
    pub dump_issues: Option<PathBuf>,

    /// Skip the sprint lookup and omit metaData
    #[arg(long)]
    pub no_meta: bool,
}

#[derive(Args, Clone)]
pub struct PbiArgs {
    /// Sprint name (uses sprint_name from config if not specified)
    #[arg(long)]
    pub sprint: Option<String>,

    /// Team label to filter issues by
    #[arg(long)]
    pub label: Option<String>,

    /// Where to write the PBI list (default: output_file from config, then pbis.json)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct BuildArgs {
    /// Saved search response (`{"issues": [...]}` or a bare array)
    pub input: PathBuf,

    /// Where to write the extract
    #[arg(long, default_value = "output.json")]
    pub output: PathBuf,
}

#[derive(Args, Clone)]
pub struct StagesArgs {
    /// Sprint extract with a `backlogs` array
    pub input_file: PathBuf,

    /// Where to write the stage report
    #[arg(long, default_value = "output.json")]
    pub output_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_stages_with_defaults() {
        let cli = Cli::try_parse_from(["sprint-metrics", "stages", "in.json"]).unwrap();
        match cli.command {
            Commands::Stages(args) => {
                assert_eq!(args.input_file, PathBuf::from("in.json"));
                assert_eq!(args.output_file, PathBuf::from("output.json"));
            }
            _ => panic!("expected stages"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sprint-metrics",
            "sprint",
            "--sprint",
            "Sprint 12",
            "--json",
            "-v",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        match cli.command {
            Commands::Sprint(args) => assert_eq!(args.sprint.as_deref(), Some("Sprint 12")),
            _ => panic!("expected sprint"),
        }
    }
}
