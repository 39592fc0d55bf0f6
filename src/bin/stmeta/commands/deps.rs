//! `stmeta deps` command

use anyhow::{bail, Result};

use crate::cli::DepsArgs;
use stmeta::core::ModuleInventory;
use stmeta::resolver::{collect, InventoryResolver};
use stmeta::util::fs::{normalize_lexically, path_key, relative_path};
use stmeta::util::GlobalContext;

pub fn execute(args: DepsArgs, ctx: &GlobalContext) -> Result<()> {
    let inventory = ModuleInventory::load(&ctx.resolve_path(&args.inventory))?;
    let module = normalize_lexically(&ctx.resolve_path(&args.module));

    let Some(root) = inventory.find(&module) else {
        bail!(
            "module `{}` is not in the inventory\n\
             help: paths are relative to the current directory",
            module.display()
        );
    };

    let resolver = InventoryResolver::new(&inventory);
    let graph = collect(&resolver, &root.module);

    let display = |path: &std::path::Path| path_key(&relative_path(inventory.context(), path));

    for (module, edges) in graph.iter() {
        println!("{} ({})", display(module.source_path()), module.namespace());
        for edge in edges {
            let target = match edge.resolution.style_module() {
                Some(target) => format!("style {}", display(target.source_path())),
                None => edge.resolution.to_string(),
            };
            println!("├── {} -> {}", edge.declaration.request(), target);
        }
    }

    Ok(())
}
