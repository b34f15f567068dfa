use anyhow::Result;
use clap::{Parser, Subcommand};
use interfacer::commands::{
    implement_command, inspect_command, list_command, load_config, ImplementArgs,
};
use interfacer::init_logging;

/// Add a method to a Go interface and stub it into every implementing type.
///
/// This CLI is a thin wrapper around `interfacer-core`. Log output goes to
/// stderr and is controlled with `INTERFACER_LOG` (e.g. `INTERFACER_LOG=debug`).
#[derive(Parser, Debug)]
#[command(
    name = "interfacer",
    version,
    about = "Add a method to a Go interface and stub it into every implementer",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a method to an interface and append stubs to every implementing type.
    ///
    /// Settings come from `interfacer.yaml` (or `--config`); flags override them.
    Implement {
        /// YAML config file. Defaults to `interfacer.yaml` when it exists.
        #[arg(long)]
        config: Option<String>,

        /// Root directory of the Go module.
        #[arg(long)]
        project_dir: Option<String>,

        /// Module path of the project root, e.g. `example.com/app`.
        #[arg(long)]
        project_module: Option<String>,

        /// Fully-qualified interface, e.g. `example.com/app/store.Store`.
        #[arg(long)]
        interface: Option<String>,

        /// Method to add, e.g. `Close(ctx context.Context) error`.
        #[arg(long)]
        method: Option<String>,

        /// Comma-separated values returned by the stubs, e.g. `nil`.
        #[arg(long)]
        returns: Option<String>,

        /// Extra directory names to skip (repeatable).
        #[arg(long)]
        exclude: Vec<String>,

        /// Report the changes without writing any file.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan a tree and show an interface with its implementers.
    Inspect {
        /// Root directory of the Go module.
        #[arg(long, default_value = ".")]
        project_dir: String,

        /// Module path of the project root.
        #[arg(long)]
        project_module: String,

        /// Fully-qualified interface name.
        #[arg(long)]
        interface: String,

        /// Extra directory names to skip (repeatable).
        #[arg(long)]
        exclude: Vec<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan a tree and list every struct and interface.
    List {
        /// Root directory of the Go module.
        #[arg(long, default_value = ".")]
        project_dir: String,

        /// Module path of the project root.
        #[arg(long)]
        project_module: String,

        /// Extra directory names to skip (repeatable).
        #[arg(long)]
        exclude: Vec<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Implement {
            config,
            project_dir,
            project_module,
            interface,
            method,
            returns,
            exclude,
            dry_run,
            json,
        } => {
            let file_config = load_config(config.as_deref())?;
            init_logging(file_config.enable_debug, file_config.enable_record);
            let args = ImplementArgs {
                project_dir,
                project_module,
                interface,
                method,
                returns,
                exclude,
                dry_run,
                json,
            };
            implement_command(file_config, &args)?
        }
        Command::Inspect { project_dir, project_module, interface, exclude, json } => {
            init_logging(false, false);
            inspect_command(&project_dir, &project_module, &interface, &exclude, json)?
        }
        Command::List { project_dir, project_module, exclude, json } => {
            init_logging(false, false);
            list_command(&project_dir, &project_module, &exclude, json)?
        }
    }

    Ok(())
}
