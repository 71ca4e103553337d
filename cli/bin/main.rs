use std::path::PathBuf;

use clap::Parser;
use time::OffsetDateTime;

use stepgen_cli::cli::{self, Source};
use stepgen_cli::logger;
use stepgen_codegen::{GenerationOptions, UnresolvedPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "stepgen",
    about = "Generates ladder and SCL step activation code",
    version
)]
struct Args {
    /// Turn on verbose logging. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write the log to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// JSON array of phase rows.
    #[arg(long, short)]
    input: PathBuf,

    /// Configuration document. The built-in configuration when absent.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Activation conditions by step and activation.
    #[arg(long)]
    conditions: Option<PathBuf>,

    /// Only use the rows of this phase.
    #[arg(long)]
    phase: Option<i32>,
}

impl SourceArgs {
    fn source(self) -> Source {
        Source {
            rows: self.input,
            config: self.config,
            conditions: self.conditions,
            phase: self.phase,
        }
    }
}

#[derive(clap::Args, Debug)]
struct OptionArgs {
    /// Fail when a record's type code is not mapped instead of skipping it.
    #[arg(long)]
    strict: bool,

    /// Program name in the L5X document.
    #[arg(long)]
    program: Option<String>,

    /// Prefix of the per-step routine names.
    #[arg(long)]
    routine: Option<String>,

    /// Controller name in the L5X document.
    #[arg(long)]
    controller: Option<String>,

    /// Do not quote tag names in SCL assignments.
    #[arg(long)]
    no_quote: bool,

    /// Stamp the artifacts with the current time.
    #[arg(long)]
    timestamp: bool,
}

impl OptionArgs {
    fn options(self) -> GenerationOptions {
        let defaults = GenerationOptions::default();
        GenerationOptions {
            unresolved: if self.strict {
                UnresolvedPolicy::Abort
            } else {
                UnresolvedPolicy::Skip
            },
            program_name: self.program.unwrap_or(defaults.program_name),
            routine_prefix: self.routine.unwrap_or(defaults.routine_prefix),
            controller_name: self.controller.unwrap_or(defaults.controller_name),
            quote_scl_tags: !self.no_quote,
            export_date: self.timestamp.then(|| {
                OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
            }),
            ..defaults
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Generate the ladder listing, L5X and SCL files.
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        options: OptionArgs,

        /// Directory the artifacts are written to.
        #[arg(long, short, default_value = "output")]
        output: PathBuf,
    },
    /// Print the resolved activations per step as JSON.
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        /// Fail when a record's type code is not mapped.
        #[arg(long)]
        strict: bool,
    },
    /// Show or edit a configuration document.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Describe a problem code, or list every code.
    Explain { code: Option<String> },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the configuration.
    Show { config: Option<PathBuf> },
    /// Write the built-in configuration to a file.
    Init {
        config: PathBuf,
        #[arg(long)]
        force: bool,
    },
    /// Check that a configuration loads.
    Check { config: PathBuf },
    /// Map a type code to a type name.
    SetType {
        config: PathBuf,
        #[arg(allow_negative_numbers = true)]
        code: i32,
        name: String,
    },
    /// Remove the mapping of a type code.
    RemoveType {
        config: PathBuf,
        #[arg(allow_negative_numbers = true)]
        code: i32,
    },
    /// Set the suffix of a type name.
    SetSuffix {
        config: PathBuf,
        name: String,
        suffix: String,
    },
    /// Remove the suffix of a type name, so its tags get no suffix.
    RemoveSuffix { config: PathBuf, name: String },
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    logger::configure(args.verbose, args.log_file.as_deref())?;

    match args.action {
        Action::Generate {
            source,
            options,
            output,
        } => cli::generate(&source.source(), &output, &options.options()),
        Action::Preview { source, strict } => {
            let options = if strict {
                GenerationOptions::strict()
            } else {
                GenerationOptions::default()
            };
            cli::preview(&source.source(), &options)
        }
        Action::Config { action } => match action {
            ConfigAction::Show { config } => cli::config_show(config.as_deref()),
            ConfigAction::Init { config, force } => cli::config_init(&config, force),
            ConfigAction::Check { config } => cli::config_check(&config),
            ConfigAction::SetType { config, code, name } => {
                cli::config_set_type(&config, code, &name)
            }
            ConfigAction::RemoveType { config, code } => cli::config_remove_type(&config, code),
            ConfigAction::SetSuffix {
                config,
                name,
                suffix,
            } => cli::config_set_suffix(&config, &name, &suffix),
            ConfigAction::RemoveSuffix { config, name } => {
                cli::config_remove_suffix(&config, &name)
            }
        },
        Action::Explain { code } => cli::explain(code.as_deref()),
    }
}
