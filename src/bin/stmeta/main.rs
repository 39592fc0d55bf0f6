//! stmeta CLI - dependency graphs and metadata manifests for stylesheet modules

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use stmeta::builder::MetadataError;
use stmeta::util::diagnostic;
use stmeta::util::GlobalContext;

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("stmeta=debug")
    } else {
        EnvFilter::new("stmeta=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = match GlobalContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color && std::io::stderr().is_terminal());

    if let Err(e) = run(cli.command, &ctx) {
        report(&e, &ctx);
        std::process::exit(1);
    }
}

fn run(command: Commands, ctx: &GlobalContext) -> Result<()> {
    match command {
        Commands::Build(args) => commands::build::execute(args, ctx),
        Commands::Deps(args) => commands::deps::execute(args, ctx),
        Commands::Variants(args) => commands::variants::execute(args, ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, as a full diagnostic when it carries a `MetadataError`.
fn report(err: &anyhow::Error, ctx: &GlobalContext) {
    let metadata_err = err.chain().find_map(|e| e.downcast_ref::<MetadataError>());

    match metadata_err {
        Some(metadata_err) => {
            let mut diag = metadata_err.to_diagnostic();
            if err.chain().count() > 1 {
                diag = diag.with_context(err.to_string());
            }
            diagnostic::emit(&diag, ctx.color());
        }
        None if ctx.is_verbose() => eprintln!("error: {:?}", err),
        None => eprintln!("error: {:#}", err),
    }
}
