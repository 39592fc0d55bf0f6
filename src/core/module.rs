//! Compiled stylesheet modules, their import declarations, and what those
//! declarations resolve to.
//!
//! Modules are produced once per build by the stylesheet compiler and are
//! read-only here. They are shared behind [`Arc`] so a resolver can hand the
//! same module out many times without re-reading it, and identity is the
//! module's source path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to a compiled module.
pub type ModuleRef = Arc<ModuleMeta>;

/// One named import inside a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedImport {
    /// Binding introduced in the importing module
    pub local: String,
    /// Name looked up in the target module
    pub imported: String,
}

/// An import statement inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    /// Source path of the module that owns this declaration
    from: PathBuf,
    /// Opaque target specifier, as written
    request: String,
    /// Local name bound to the target's root, if any
    default_name: Option<String>,
    /// Named imports, in declaration order
    named: Vec<NamedImport>,
}

impl Declaration {
    /// Create a declaration owned by the module at `from`.
    pub fn new(from: impl Into<PathBuf>, request: impl Into<String>) -> Self {
        Declaration {
            from: from.into(),
            request: request.into(),
            default_name: None,
            named: Vec::new(),
        }
    }

    /// Bind the target's root to `name`.
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    /// Add a named import.
    pub fn with_named(mut self, local: impl Into<String>, imported: impl Into<String>) -> Self {
        self.named.push(NamedImport {
            local: local.into(),
            imported: imported.into(),
        });
        self
    }

    pub fn owner(&self) -> &Path {
        &self.from
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Whether the declaration binds the target's root.
    pub fn has_default_target(&self) -> bool {
        self.default_name.is_some()
    }

    pub fn named(&self) -> &[NamedImport] {
        &self.named
    }

    /// Whether this declaration introduces `name` into its owning module.
    pub fn binds(&self, name: &str) -> bool {
        self.default_name.as_deref() == Some(name) || self.named.iter().any(|n| n.local == name)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.request)
    }
}

/// A compiled stylesheet module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMeta {
    source_path: PathBuf,
    namespace: String,
    declarations: Vec<Declaration>,
    /// Symbols defined by the module itself
    locals: Vec<String>,
}

impl ModuleMeta {
    pub fn new(source_path: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        ModuleMeta {
            source_path: source_path.into(),
            namespace: namespace.into(),
            declarations: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Append an import declaration. The declaration is re-owned by this
    /// module regardless of the `from` it was built with.
    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        let declaration = Declaration {
            from: self.source_path.clone(),
            ..declaration
        };
        self.declarations.push(declaration);
        self
    }

    /// Record a locally defined symbol.
    pub fn with_local(mut self, name: impl Into<String>) -> Self {
        self.locals.push(name.into());
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn defines(&self, name: &str) -> bool {
        self.locals.iter().any(|l| l == name)
    }

    /// The declaration that introduces `name`, if the name is imported.
    pub fn binding_of(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.binds(name))
    }

    pub fn into_ref(self) -> ModuleRef {
        Arc::new(self)
    }
}

/// What a resolved name refers to inside its target module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolDescriptor {
    /// The module itself, as bound by a default import.
    Root,
    /// A symbol defined in the target module.
    Local { name: String },
    /// A name the target module itself imports from elsewhere.
    Alias { owning_declaration: Declaration },
}

/// Outcome of resolving a declaration, or one of its names.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Resolved into a compiled stylesheet module.
    Style {
        module: ModuleRef,
        symbol: SymbolDescriptor,
    },
    /// Resolved into a code module.
    Code { value: String },
    Unresolved,
}

impl Resolution {
    /// The stylesheet module this resolution lands in, if any.
    pub fn style_module(&self) -> Option<&ModuleRef> {
        match self {
            Resolution::Style { module, .. } => Some(module),
            Resolution::Code { .. } | Resolution::Unresolved => None,
        }
    }

    /// The declaration being re-exported, when this resolution is an alias.
    pub fn forwarded_declaration(&self) -> Option<&Declaration> {
        match self {
            Resolution::Style {
                symbol: SymbolDescriptor::Alias { owning_declaration },
                ..
            } => Some(owning_declaration),
            Resolution::Style { .. } | Resolution::Code { .. } | Resolution::Unresolved => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Style { .. } => "style",
            Resolution::Code { .. } => "code",
            Resolution::Unresolved => "unresolved",
        }
    }
}

impl PartialEq for Resolution {
    /// Style resolutions compare by module identity, not structure.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Resolution::Style { module: a, symbol: sa },
                Resolution::Style { module: b, symbol: sb },
            ) => a.source_path() == b.source_path() && sa == sb,
            (Resolution::Code { value: a }, Resolution::Code { value: b }) => a == b,
            (Resolution::Unresolved, Resolution::Unresolved) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Style { module, .. } => {
                write!(f, "style {}", module.source_path().display())
            }
            Resolution::Code { value } => write!(f, "code {}", value),
            Resolution::Unresolved => write!(f, "unresolved"),
        }
    }
}
