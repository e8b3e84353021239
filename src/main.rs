use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod bell;
mod format;
mod kubectl;
mod tui;

use bell::BellFilter;
use format::ContextFormatter;

const PROMPT_LABEL: &str = "kubectl config get-contexts";

/// Interactive kubectl context switcher.
#[derive(Parser)]
#[command(name = "kubectl-select", version, about, long_about = None, disable_help_subcommand = true)]
struct Cli {
    /// kubectl binary to invoke.
    #[arg(long, default_value = "kubectl")]
    kubectl: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "kubectl-select", &mut io::stdout());
        }
        None => run(&cli.kubectl),
    }
}

fn run(tool: &str) {
    if let Err(e) = run_inner(tool) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_inner(tool: &str) -> Result<(), String> {
    let config = kubectl::view(tool).map_err(|e| e.to_string())?;
    let formatter = ContextFormatter::new(&config.current_context);

    // Stray bells from list redraws go nowhere; everything else reaches
    // stdout untouched.
    let mut out = BellFilter::new(io::stdout());

    let picked = tui::select(
        PROMPT_LABEL,
        &config.contexts,
        &formatter,
        config.current_index(),
        &mut out,
    )?;

    match picked {
        Some(index) => {
            let output = kubectl::use_context(tool, &config.contexts[index].name)
                .map_err(|e| e.to_string())?;
            print!("{output}");
        }
        None => println!("Cancelled, keeping the current context."),
    }
    Ok(())
}
