//! Entry point for the command-line interface.

use progdep::args::{parse_cli, Commands};
use progdep::output::GraphKind;
use progdep::run::{run_graphs, run_info};

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    match cli.command {
        Commands::Cfg(args) => run_graphs(GraphKind::Cfg, args),
        Commands::Pdg(args) => run_graphs(GraphKind::Pdg, args),
        Commands::Info(args) => run_info(args),
    }
}
