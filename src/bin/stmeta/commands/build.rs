//! `stmeta build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use stmeta::core::ModuleInventory;
use stmeta::ops::{MetadataOptions, MetadataPass};
use stmeta::resolver::InventoryResolver;
use stmeta::util::diagnostic::{self, Diagnostic};
use stmeta::util::fs::{write_string, RealFs};
use stmeta::util::GlobalContext;

pub fn execute(args: BuildArgs, ctx: &GlobalContext) -> Result<()> {
    let inventory = ModuleInventory::load(&ctx.resolve_path(&args.inventory))?;

    // Defaults < config (global + project) < CLI
    let mut options = MetadataOptions::default();
    ctx.config().apply(&mut options);

    if let Some(name) = args.name {
        options.name = name;
    }
    if let Some(version) = args.manifest_version {
        options.version = version;
    }
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    if args.editable_only {
        options.only_include_editable_components = true;
    }
    if args.content_hash {
        options.use_content_hash_file_name = true;
    }
    if let Some(len) = args.hash_length {
        options.content_hash_length = len;
    }
    if let Some(context) = args.context {
        options.context = Some(ctx.resolve_path(&context));
    }

    let suffix = options.variant_suffix.clone();
    let resolver = InventoryResolver::new(&inventory).with_style_suffix(&suffix);

    let mut pass = MetadataPass::new(options, resolver, RealFs, inventory.context());
    for module in inventory.modules() {
        pass.on_module_discovered(module.clone());
    }

    let Some(asset) = pass.on_build_finalize()? else {
        let warning = Diagnostic::warning("no source belongs to a package; no metadata written")
            .with_suggestion("Add a `package.json` at the project root");
        diagnostic::emit(&warning, ctx.color());
        return Ok(());
    };

    if args.stdout {
        println!("{}", asset.content);
        return Ok(());
    }

    let out_dir = args
        .out_dir
        .map(|dir| ctx.resolve_path(&dir))
        .unwrap_or_else(|| ctx.cwd().to_path_buf());
    let path = out_dir.join(&asset.file_name);
    write_string(&path, &asset.content)?;

    eprintln!("    Finished `{}` -> {}", asset.file_name, path.display());

    Ok(())
}
