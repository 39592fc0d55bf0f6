//! `stmeta variants` command

use anyhow::Result;

use crate::cli::VariantsArgs;
use stmeta::builder::scan_variants;
use stmeta::util::fs::{path_key, relative_path, RealFs};
use stmeta::util::GlobalContext;

pub fn execute(args: VariantsArgs, ctx: &GlobalContext) -> Result<()> {
    let component_dir = ctx.resolve_path(&args.component_dir);

    let variants = scan_variants(
        &RealFs,
        &component_dir,
        &args.variants_path,
        &args.suffix,
        &args.namespace,
        args.depth,
    )?;

    if variants.is_empty() {
        eprintln!("no variants found");
    }

    for variant in variants {
        println!(
            "{}\t{}",
            variant.meta.namespace,
            path_key(&relative_path(&component_dir, &variant.path))
        );
    }

    Ok(())
}
