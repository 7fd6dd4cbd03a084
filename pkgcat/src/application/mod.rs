pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use pkgcat_core::Result;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Genpkglist(args) => handlers::handle_genpkglist(args),
        Commands::Gensrclist(args) => handlers::handle_gensrclist(args),
        Commands::Query { format, catalogs } => handlers::handle_query(format, catalogs),
        Commands::Verify { catalog } => handlers::handle_verify(catalog),
    }
}
