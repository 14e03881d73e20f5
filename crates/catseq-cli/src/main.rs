//! CLI for catseq — an algebraic compiler for cycle-accurate RWG hardware
//! control sequences.

mod commands;

use catseq_core::demo;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "catseq")]
#[command(about = "catseq — compile algebraic control sequences into cycle-accurate hardware instructions")]
#[command(version = catseq_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in demonstration scenarios
    Scenarios,

    /// Compile a scenario through the five-pass pipeline and print the
    /// resulting per-board instruction streams as JSON
    Compile {
        /// Scenario name (see `catseq scenarios`)
        scenario: String,

        /// Skip Pass 3 pipelining; emit every flexible op at its original timestamp
        #[arg(long)]
        no_pipelining: bool,

        /// Use a calibrated per-opcode cost table instead of the zero-cost oracle
        #[arg(long)]
        calibrated: bool,

        /// Write the compiled plan to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Start an HTTP compile server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8420")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Use a calibrated per-opcode cost table instead of the zero-cost oracle
        #[arg(long)]
        calibrated: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scenarios => {
            for name in demo::names() {
                println!("{name}");
            }
        }
        Commands::Compile {
            scenario,
            no_pipelining,
            calibrated,
            output,
        } => commands::compile::run(commands::compile::CompileCommandConfig {
            scenario: &scenario,
            no_pipelining,
            calibrated,
            output: output.as_deref(),
        }),
        Commands::Serve { port, host, calibrated } => commands::serve::run(&host, port, calibrated),
    }
}
