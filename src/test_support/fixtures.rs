//! Test fixtures for common test scenarios.
//!
//! A [`ProjectFixture`] keeps an in-memory project tree and the matching
//! host inventory in step, so a test can describe stylesheets once and
//! feed both the filesystem and the resolver from them.

use std::path::PathBuf;

use crate::core::component::{descriptor_path, DEFAULT_DESCRIPTOR_EXTENSION};
use crate::core::inventory::{HostModule, ModuleInventory};
use crate::core::module::{Declaration, ModuleMeta};

use super::MockFileSystem;

/// An in-memory project with its compiled-module inventory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    pub root: PathBuf,
    pub fs: MockFileSystem,
    pub inventory: ModuleInventory,
}

impl ProjectFixture {
    /// Create a project rooted at `root` with a `package.json` naming it.
    pub fn new(root: impl Into<PathBuf>, package_name: &str) -> Self {
        let root = root.into();
        let mut fs = MockFileSystem::new();
        fs.add_file(
            root.join("package.json"),
            format!(r#"{{ "name": "{}", "version": "1.0.0" }}"#, package_name),
        );

        ProjectFixture {
            inventory: ModuleInventory::new(&root),
            root,
            fs,
        }
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Add a plain file.
    pub fn add_file(&mut self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        self.fs.add_file(&path, content);
        path
    }

    /// Add a compiled stylesheet. `build` adds declarations and locals to
    /// the module before it is registered.
    pub fn add_stylesheet(
        &mut self,
        rel: &str,
        namespace: &str,
        depth: u32,
        build: impl FnOnce(ModuleMeta) -> ModuleMeta,
    ) -> PathBuf {
        let path = self.add_file(rel, &format!(".root {{ /* {} */ }}", namespace));
        let meta = build(ModuleMeta::new(&path, namespace));
        self.inventory.add_module(HostModule::new(meta.into_ref(), depth));
        path
    }

    /// Attach a code module and its descriptor to an existing stylesheet.
    pub fn add_component(&mut self, stylesheet_rel: &str, code_rel: &str, descriptor: &str) {
        let code = self.add_file(code_rel, "export default function Component() {}");
        self.fs.add_file(
            descriptor_path(&code, DEFAULT_DESCRIPTOR_EXTENSION),
            descriptor,
        );

        let stylesheet = self.path(stylesheet_rel);
        let host = self
            .inventory
            .find(&stylesheet)
            .cloned()
            .unwrap_or_else(|| panic!("no stylesheet at {}", stylesheet.display()))
            .with_component(code);
        self.inventory.add_module(host);
    }

    /// Host modules in discovery order.
    pub fn discovered(&self) -> Vec<HostModule> {
        self.inventory.modules().to_vec()
    }

    pub fn module(&self, rel: &str) -> &HostModule {
        let path = self.path(rel);
        self.inventory
            .find(&path)
            .unwrap_or_else(|| panic!("no module at {}", path.display()))
    }
}

/// The canonical single-component project: `src/index.st.css` (namespace
/// `o0`, depth 4) backing component `Index` with two variants.
pub fn indexed_component_project() -> ProjectFixture {
    indexed_component_project_at("/test")
}

/// [`indexed_component_project`] checked out at `root`.
pub fn indexed_component_project_at(root: &str) -> ProjectFixture {
    let mut project = ProjectFixture::new(root, "test");

    project.add_stylesheet("src/index.st.css", "o0", 4, |m| m);
    project.add_component(
        "src/index.st.css",
        "src/index.js",
        r#"{ "id": "Index", "variantsPath": "./variants" }"#,
    );
    project.add_file("src/variants/v.st.css", ".root { color: red; }");
    project.add_file("src/variants/v1/v1.st.css", ".root { color: blue; }");

    project
}

/// A project where only part of the module set is reachable from the
/// single component: `button` is imported by the component stylesheet,
/// `orphan` is not imported by anything.
pub fn editable_project() -> ProjectFixture {
    let mut project = ProjectFixture::new("/app", "app");

    project.add_stylesheet("src/button.st.css", "button", 2, |m| m.with_local("root"));
    project.add_stylesheet("src/orphan.st.css", "orphan", 1, |m| m);
    project.add_stylesheet("src/card.st.css", "card", 1, |m| {
        m.with_declaration(Declaration::new("", "./button.st.css").with_default("Button"))
    });
    project.add_component("src/card.st.css", "src/card.js", r#"{ "id": "Card" }"#);

    project
}
