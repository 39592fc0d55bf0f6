//! Dependency collection - the flattened import graph of stylesheet modules.
//!
//! Starting from a root module, every declaration is resolved and followed
//! into the stylesheet it targets. Declarations that exist only to forward
//! names from elsewhere (every named import is an alias, nothing is bound to
//! the root) are transparent: the importer gets no edge, and the forwarding
//! module instead records edges to what it forwards.
//!
//! Each module is visited at most once. A module is reserved with an empty
//! edge list before any of its declarations are followed, so a cycle back to
//! it stops at the reservation.

use std::collections::HashMap;
use std::path::Path;

use crate::core::module::{Declaration, ModuleRef, Resolution};
use crate::resolver::ImportResolver;

/// A declaration together with what it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub declaration: Declaration,
    pub resolution: Resolution,
}

#[derive(Debug, Clone)]
struct Node {
    module: ModuleRef,
    edges: Vec<Edge>,
}

/// Module -> ordered edge list, keyed by module identity (source path).
///
/// Nodes live in an arena in first-reservation order, so iteration is
/// deterministic for identical inputs.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<std::path::PathBuf, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a module keys the graph.
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    /// Edges recorded for a module.
    pub fn edges(&self, path: &Path) -> Option<&[Edge]> {
        self.index
            .get(path)
            .map(|&idx| self.nodes[idx].edges.as_slice())
    }

    /// Modules keying the graph, in reservation order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRef> {
        self.nodes.iter().map(|n| &n.module)
    }

    /// Iterate over every module with its edges.
    pub fn iter(&self) -> impl Iterator<Item = (&ModuleRef, &[Edge])> {
        self.nodes.iter().map(|n| (&n.module, n.edges.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Arena slot for `module`, created empty if absent.
    fn reserve(&mut self, module: &ModuleRef) -> usize {
        if let Some(&idx) = self.index.get(module.source_path()) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node {
            module: module.clone(),
            edges: Vec::new(),
        });
        self.index.insert(module.source_path().to_path_buf(), idx);
        idx
    }

    fn push_edge(&mut self, slot: usize, edge: Edge) {
        self.nodes[slot].edges.push(edge);
    }

    /// Push unless the slot already holds an edge for the same declaration.
    fn push_edge_once(&mut self, slot: usize, edge: Edge) {
        let edges = &mut self.nodes[slot].edges;
        if !edges.iter().any(|e| e.declaration == edge.declaration) {
            edges.push(edge);
        }
    }
}

/// Collect the dependency graph reachable from `root`.
pub fn collect<R>(resolver: &R, root: &ModuleRef) -> DependencyGraph
where
    R: ImportResolver + ?Sized,
{
    let mut graph = DependencyGraph::new();
    collect_into(resolver, root, &mut graph);
    graph
}

/// Collect into an existing graph, skipping every module it already holds.
///
/// Reusing one graph across several roots avoids re-walking shared
/// dependencies.
pub fn collect_into<R>(resolver: &R, root: &ModuleRef, graph: &mut DependencyGraph)
where
    R: ImportResolver + ?Sized,
{
    visit(resolver, root, graph);
}

fn visit<R>(resolver: &R, module: &ModuleRef, graph: &mut DependencyGraph)
where
    R: ImportResolver + ?Sized,
{
    if graph.contains(module.source_path()) {
        return;
    }

    let slot = graph.reserve(module);
    tracing::debug!("collecting {}", module.source_path().display());

    for declaration in module.declarations() {
        let forwarded: Vec<Declaration> = declaration
            .named()
            .iter()
            .filter_map(|named| {
                resolver
                    .resolve(declaration, Some(&named.imported))
                    .forwarded_declaration()
                    .cloned()
            })
            .collect();

        let named_count = declaration.named().len();
        let direct = declaration.has_default_target()
            || named_count == 0
            || forwarded.len() < named_count;

        if direct {
            let resolution = resolver.resolve(declaration, None);
            let target = resolution.style_module().cloned();
            graph.push_edge(
                slot,
                Edge {
                    declaration: declaration.clone(),
                    resolution,
                },
            );
            if let Some(target) = target {
                visit(resolver, &target, graph);
            }
            continue;
        }

        match resolver.resolve(declaration, None) {
            Resolution::Style {
                module: forwarder, ..
            } => {
                tracing::debug!(
                    "{} re-exports through {}",
                    module.source_path().display(),
                    forwarder.source_path().display()
                );
                let forwarder_slot = graph.reserve(&forwarder);

                for owning in forwarded {
                    let resolution = resolver.resolve(&owning, None);
                    let target = resolution.style_module().cloned();
                    graph.push_edge_once(
                        forwarder_slot,
                        Edge {
                            declaration: owning,
                            resolution,
                        },
                    );
                    if let Some(target) = target {
                        visit(resolver, &target, graph);
                    }
                }
            }
            Resolution::Code { .. } | Resolution::Unresolved => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    use crate::core::inventory::{HostModule, ModuleInventory};
    use crate::core::module::ModuleMeta;
    use crate::resolver::InventoryResolver;

    fn build(modules: Vec<ModuleMeta>) -> ModuleInventory {
        let mut inventory = ModuleInventory::new("/p");
        for module in modules {
            inventory.add_module(HostModule::new(module.into_ref(), 0));
        }
        inventory
    }

    fn module(inventory: &ModuleInventory, path: &str) -> ModuleRef {
        inventory.find(Path::new(path)).unwrap().module.clone()
    }

    fn keys(graph: &DependencyGraph) -> Vec<PathBuf> {
        graph
            .modules()
            .map(|m| m.source_path().to_path_buf())
            .collect()
    }

    /// Counts how often each module's declarations are walked.
    struct CountingResolver<'a> {
        inner: InventoryResolver<'a>,
        root_lookups: RefCell<HashMap<PathBuf, usize>>,
    }

    impl ImportResolver for CountingResolver<'_> {
        fn resolve(&self, declaration: &Declaration, name: Option<&str>) -> Resolution {
            if name.is_none() {
                *self
                    .root_lookups
                    .borrow_mut()
                    .entry(declaration.owner().to_path_buf())
                    .or_default() += 1;
            }
            self.inner.resolve(declaration, name)
        }
    }

    #[test]
    fn test_direct_default_import() {
        let inventory = build(vec![
            ModuleMeta::new("/p/a.st.css", "a")
                .with_declaration(Declaration::new("", "./b.st.css").with_default("B")),
            ModuleMeta::new("/p/b.st.css", "b"),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/a.st.css"));

        assert_eq!(
            keys(&graph),
            vec![PathBuf::from("/p/a.st.css"), PathBuf::from("/p/b.st.css")]
        );
        let edges = graph.edges(Path::new("/p/a.st.css")).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].resolution.style_module().unwrap().source_path(),
            Path::new("/p/b.st.css")
        );
        assert!(graph.edges(Path::new("/p/b.st.css")).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_visits_each_module_once() {
        let inventory = build(vec![
            ModuleMeta::new("/p/a.st.css", "a")
                .with_declaration(Declaration::new("", "./b.st.css").with_default("B")),
            ModuleMeta::new("/p/b.st.css", "b")
                .with_declaration(Declaration::new("", "./a.st.css").with_default("A")),
        ]);
        let resolver = CountingResolver {
            inner: InventoryResolver::new(&inventory),
            root_lookups: RefCell::new(HashMap::new()),
        };

        let graph = collect(&resolver, &module(&inventory, "/p/a.st.css"));

        assert_eq!(graph.len(), 2);
        let lookups = resolver.root_lookups.borrow();
        assert_eq!(lookups[Path::new("/p/a.st.css")], 1);
        assert_eq!(lookups[Path::new("/p/b.st.css")], 1);
        assert_eq!(graph.edges(Path::new("/p/b.st.css")).unwrap().len(), 1);
    }

    #[test]
    fn test_self_import_terminates() {
        let inventory = build(vec![ModuleMeta::new("/p/a.st.css", "a")
            .with_declaration(Declaration::new("", "./a.st.css").with_default("Me"))]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/a.st.css"));

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.edges(Path::new("/p/a.st.css")).unwrap().len(), 1);
    }

    #[test]
    fn test_pure_reexport_is_transparent() {
        // app -> barrel { Button } where barrel forwards Button from button
        let inventory = build(vec![
            ModuleMeta::new("/p/app.st.css", "app")
                .with_declaration(Declaration::new("", "./barrel.st.css").with_named("Button", "Button")),
            ModuleMeta::new("/p/barrel.st.css", "barrel")
                .with_declaration(Declaration::new("", "./button.st.css").with_named("Button", "root"))
                .with_declaration(Declaration::new("", "./unused.st.css").with_named("Unused", "root")),
            ModuleMeta::new("/p/button.st.css", "button").with_local("root"),
            ModuleMeta::new("/p/unused.st.css", "unused").with_local("root"),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/app.st.css"));

        assert!(graph.edges(Path::new("/p/app.st.css")).unwrap().is_empty());

        let barrel_edges = graph.edges(Path::new("/p/barrel.st.css")).unwrap();
        assert_eq!(barrel_edges.len(), 1);
        assert_eq!(barrel_edges[0].declaration.request(), "./button.st.css");
        assert_eq!(
            barrel_edges[0].resolution.style_module().unwrap().source_path(),
            Path::new("/p/button.st.css")
        );

        assert!(graph.contains(Path::new("/p/button.st.css")));
        assert!(!graph.contains(Path::new("/p/unused.st.css")));
    }

    #[test]
    fn test_mixed_named_import_is_direct() {
        let inventory = build(vec![
            ModuleMeta::new("/p/app.st.css", "app").with_declaration(
                Declaration::new("", "./barrel.st.css")
                    .with_named("Button", "Button")
                    .with_named("Own", "own"),
            ),
            ModuleMeta::new("/p/barrel.st.css", "barrel")
                .with_local("own")
                .with_declaration(Declaration::new("", "./button.st.css").with_named("Button", "root")),
            ModuleMeta::new("/p/button.st.css", "button").with_local("root"),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/app.st.css"));

        let edges = graph.edges(Path::new("/p/app.st.css")).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].declaration.request(), "./barrel.st.css");
        // the barrel is walked normally
        assert_eq!(graph.edges(Path::new("/p/barrel.st.css")).unwrap().len(), 1);
        assert!(graph.contains(Path::new("/p/button.st.css")));
    }

    #[test]
    fn test_default_with_aliases_is_direct() {
        let inventory = build(vec![
            ModuleMeta::new("/p/app.st.css", "app").with_declaration(
                Declaration::new("", "./barrel.st.css")
                    .with_default("Barrel")
                    .with_named("Button", "Button"),
            ),
            ModuleMeta::new("/p/barrel.st.css", "barrel")
                .with_declaration(Declaration::new("", "./button.st.css").with_named("Button", "root")),
            ModuleMeta::new("/p/button.st.css", "button").with_local("root"),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/app.st.css"));

        assert_eq!(graph.edges(Path::new("/p/app.st.css")).unwrap().len(), 1);
    }

    #[test]
    fn test_bare_declaration_is_direct() {
        let inventory = build(vec![
            ModuleMeta::new("/p/app.st.css", "app")
                .with_declaration(Declaration::new("", "./side-effect.st.css")),
            ModuleMeta::new("/p/side-effect.st.css", "side"),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/app.st.css"));

        assert_eq!(graph.edges(Path::new("/p/app.st.css")).unwrap().len(), 1);
        assert!(graph.contains(Path::new("/p/side-effect.st.css")));
    }

    #[test]
    fn test_unresolved_declaration_is_leaf_edge() {
        let inventory = build(vec![ModuleMeta::new("/p/app.st.css", "app")
            .with_declaration(Declaration::new("", "./gone.st.css").with_default("Gone"))
            .with_declaration(Declaration::new("", "./logic.js").with_default("logic"))]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/app.st.css"));

        let edges = graph.edges(Path::new("/p/app.st.css")).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].resolution, Resolution::Unresolved);
        assert_eq!(edges[1].resolution.kind(), "code");
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_mutual_forwarding_terminates() {
        // a forwards X from b, b forwards Y from a; root imports both
        let inventory = build(vec![
            ModuleMeta::new("/p/root.st.css", "root")
                .with_declaration(Declaration::new("", "./a.st.css").with_named("X", "X"))
                .with_declaration(Declaration::new("", "./b.st.css").with_named("Y", "Y")),
            ModuleMeta::new("/p/a.st.css", "a")
                .with_declaration(Declaration::new("", "./b.st.css").with_named("X", "X")),
            ModuleMeta::new("/p/b.st.css", "b")
                .with_declaration(Declaration::new("", "./a.st.css").with_named("Y", "Y")),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/root.st.css"));

        assert!(graph.edges(Path::new("/p/root.st.css")).unwrap().is_empty());
        assert!(graph.contains(Path::new("/p/a.st.css")));
        assert!(graph.contains(Path::new("/p/b.st.css")));
        assert_eq!(graph.edges(Path::new("/p/a.st.css")).unwrap().len(), 1);
        assert_eq!(graph.edges(Path::new("/p/b.st.css")).unwrap().len(), 1);
    }

    #[test]
    fn test_shared_accumulator_skips_known_modules() {
        let inventory = build(vec![
            ModuleMeta::new("/p/one.st.css", "one")
                .with_declaration(Declaration::new("", "./shared.st.css").with_default("S")),
            ModuleMeta::new("/p/two.st.css", "two")
                .with_declaration(Declaration::new("", "./shared.st.css").with_default("S")),
            ModuleMeta::new("/p/shared.st.css", "shared")
                .with_declaration(Declaration::new("", "./leaf.st.css").with_default("L")),
            ModuleMeta::new("/p/leaf.st.css", "leaf"),
        ]);
        let resolver = CountingResolver {
            inner: InventoryResolver::new(&inventory),
            root_lookups: RefCell::new(HashMap::new()),
        };

        let mut graph = DependencyGraph::new();
        collect_into(&resolver, &module(&inventory, "/p/one.st.css"), &mut graph);
        collect_into(&resolver, &module(&inventory, "/p/two.st.css"), &mut graph);

        assert_eq!(graph.len(), 4);
        assert_eq!(resolver.root_lookups.borrow()[Path::new("/p/shared.st.css")], 1);
    }

    #[test]
    fn test_deterministic_order() {
        let inventory = build(vec![
            ModuleMeta::new("/p/a.st.css", "a")
                .with_declaration(Declaration::new("", "./c.st.css").with_default("C"))
                .with_declaration(Declaration::new("", "./b.st.css").with_default("B")),
            ModuleMeta::new("/p/b.st.css", "b"),
            ModuleMeta::new("/p/c.st.css", "c"),
        ]);
        let resolver = InventoryResolver::new(&inventory);
        let root = module(&inventory, "/p/a.st.css");

        let first = keys(&collect(&resolver, &root));
        let second = keys(&collect(&resolver, &root));

        assert_eq!(first, second);
        assert_eq!(first[1], PathBuf::from("/p/c.st.css"));
    }

    #[test]
    fn test_aliases_sharing_a_declaration_add_one_edge() {
        // app { Btn, Icon } -> barrel, which forwards both from one import of button
        let inventory = build(vec![
            ModuleMeta::new("/p/app.st.css", "app").with_declaration(
                Declaration::new("", "./barrel.st.css")
                    .with_named("Btn", "Btn")
                    .with_named("Icon", "Icon"),
            ),
            ModuleMeta::new("/p/barrel.st.css", "barrel").with_declaration(
                Declaration::new("", "./button.st.css")
                    .with_named("Btn", "root")
                    .with_named("Icon", "icon"),
            ),
            ModuleMeta::new("/p/button.st.css", "button")
                .with_local("root")
                .with_local("icon"),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/app.st.css"));

        assert!(graph.edges(Path::new("/p/app.st.css")).unwrap().is_empty());
        let barrel_edges = graph.edges(Path::new("/p/barrel.st.css")).unwrap();
        assert_eq!(barrel_edges.len(), 1);
        assert_eq!(barrel_edges[0].declaration.request(), "./button.st.css");
        assert!(graph.contains(Path::new("/p/button.st.css")));
    }

    #[test]
    fn test_forwarder_walked_directly_keeps_its_edges() {
        // app imports barrel's root first, then forwards Button through it
        let inventory = build(vec![
            ModuleMeta::new("/p/app.st.css", "app")
                .with_declaration(Declaration::new("", "./barrel.st.css").with_default("Barrel"))
                .with_declaration(Declaration::new("", "./barrel.st.css").with_named("Button", "Button")),
            ModuleMeta::new("/p/barrel.st.css", "barrel")
                .with_declaration(Declaration::new("", "./button.st.css").with_named("Button", "root")),
            ModuleMeta::new("/p/button.st.css", "button").with_local("root"),
        ]);
        let resolver = InventoryResolver::new(&inventory);

        let graph = collect(&resolver, &module(&inventory, "/p/app.st.css"));

        assert_eq!(
            keys(&graph),
            vec![
                PathBuf::from("/p/app.st.css"),
                PathBuf::from("/p/barrel.st.css"),
                PathBuf::from("/p/button.st.css"),
            ]
        );
        assert_eq!(graph.edges(Path::new("/p/app.st.css")).unwrap().len(), 1);
        // the direct walk already recorded the owning declaration
        let barrel_edges = graph.edges(Path::new("/p/barrel.st.css")).unwrap();
        assert_eq!(barrel_edges.len(), 1);
        assert_eq!(
            barrel_edges[0].resolution.style_module().unwrap().source_path(),
            Path::new("/p/button.st.css")
        );
    }
}
