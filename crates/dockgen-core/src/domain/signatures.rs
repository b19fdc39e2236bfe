//! Project signature and framework registries.
//!
//! Every stack the classifier understands is described exactly once by a
//! [`ProjectSignature`] in [`SIGNATURES`]; every framework by a
//! [`FrameworkDef`] in [`FRAMEWORK_REGISTRY`]. Classification, dependency
//! parsing and framework inference are table lookups over these registries.
//!
//! # Priority
//!
//! [`SIGNATURES`] is ordered. When one directory holds markers for more than
//! one stack, the entry that appears first wins. Manifest markers always
//! outrank the source-extension heuristic.
//!
//! # Adding a New Stack
//!
//! 1. Add a variant to `Stack` in `value_objects.rs`
//! 2. Add one [`ProjectSignature`] entry to [`SIGNATURES`]
//! 3. If it needs a new manifest format, add a [`ManifestFormat`] variant and
//!    its parser in `manifest.rs`

use crate::domain::value_objects::{Framework, Stack};

// ── Markers ──────────────────────────────────────────────────────────────────

/// How a marker file is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Exact file name, e.g. `package.json`.
    FileName(&'static str),
    /// File extension without the dot, e.g. `csproj`.
    Extension(&'static str),
}

impl Marker {
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::FileName(name) => file_name == *name,
            Self::Extension(ext) => file_name
                .rsplit_once('.')
                .is_some_and(|(stem, e)| !stem.is_empty() && e.eq_ignore_ascii_case(ext)),
        }
    }
}

/// Dependency manifest formats with a dedicated parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestFormat {
    PackageJson,
    Requirements,
    PyProject,
    Pipfile,
    SetupPy,
    PomXml,
    Gradle,
    GoMod,
    MsBuildProject,
    Gemfile,
    CargoToml,
    ComposerJson,
}

/// A marker file plus the parser for the dependencies it declares.
#[derive(Debug, Clone, Copy)]
pub struct ManifestMarker {
    pub marker: Marker,
    pub format: ManifestFormat,
}

const fn manifest(name: &'static str, format: ManifestFormat) -> ManifestMarker {
    ManifestMarker {
        marker: Marker::FileName(name),
        format,
    }
}

const fn manifest_ext(ext: &'static str, format: ManifestFormat) -> ManifestMarker {
    ManifestMarker {
        marker: Marker::Extension(ext),
        format,
    }
}

// ── Project signatures ───────────────────────────────────────────────────────

/// Everything the classifier needs to know about one stack.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSignature {
    /// The stack this signature identifies.
    pub stack: Stack,

    /// Manifest markers, authoritative for detection.
    pub manifests: &'static [ManifestMarker],

    /// Source file extensions used by the fallback heuristic.
    pub source_extensions: &'static [&'static str],

    /// File names that usually start the application.
    pub entry_files: &'static [&'static str],

    /// File-name suffixes that usually start the application.
    pub entry_suffixes: &'static [&'static str],
}

/// Single source of truth for stack detection, in priority order.
pub static SIGNATURES: &[ProjectSignature] = &[
    ProjectSignature {
        stack: Stack::Node,
        manifests: &[manifest("package.json", ManifestFormat::PackageJson)],
        source_extensions: &["js", "mjs", "cjs", "jsx", "ts", "tsx"],
        entry_files: &["server.js", "index.js", "app.js", "main.ts"],
        entry_suffixes: &[],
    },
    ProjectSignature {
        stack: Stack::Python,
        manifests: &[
            manifest("requirements.txt", ManifestFormat::Requirements),
            manifest("pyproject.toml", ManifestFormat::PyProject),
            manifest("Pipfile", ManifestFormat::Pipfile),
            manifest("setup.py", ManifestFormat::SetupPy),
        ],
        source_extensions: &["py"],
        entry_files: &["app.py", "main.py", "manage.py", "wsgi.py", "asgi.py"],
        entry_suffixes: &[],
    },
    ProjectSignature {
        stack: Stack::Java,
        manifests: &[
            manifest("pom.xml", ManifestFormat::PomXml),
            manifest("build.gradle", ManifestFormat::Gradle),
            manifest("build.gradle.kts", ManifestFormat::Gradle),
        ],
        source_extensions: &["java", "kt"],
        entry_files: &["Main.java"],
        entry_suffixes: &["Application.java"],
    },
    ProjectSignature {
        stack: Stack::Go,
        manifests: &[manifest("go.mod", ManifestFormat::GoMod)],
        source_extensions: &["go"],
        entry_files: &["main.go"],
        entry_suffixes: &[],
    },
    ProjectSignature {
        stack: Stack::DotNet,
        manifests: &[
            manifest_ext("csproj", ManifestFormat::MsBuildProject),
            manifest_ext("fsproj", ManifestFormat::MsBuildProject),
        ],
        source_extensions: &["cs", "fs"],
        entry_files: &["Program.cs", "Program.fs"],
        entry_suffixes: &[],
    },
    ProjectSignature {
        stack: Stack::Ruby,
        manifests: &[manifest("Gemfile", ManifestFormat::Gemfile)],
        source_extensions: &["rb"],
        entry_files: &["config.ru", "app.rb"],
        entry_suffixes: &[],
    },
    ProjectSignature {
        stack: Stack::Rust,
        manifests: &[manifest("Cargo.toml", ManifestFormat::CargoToml)],
        source_extensions: &["rs"],
        entry_files: &["main.rs"],
        entry_suffixes: &[],
    },
    ProjectSignature {
        stack: Stack::Php,
        manifests: &[manifest("composer.json", ManifestFormat::ComposerJson)],
        source_extensions: &["php"],
        entry_files: &["index.php", "artisan"],
        entry_suffixes: &[],
    },
];

/// Directories never worth descending into.
pub static DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "venv",
    ".venv",
    "__pycache__",
    ".idea",
    ".vscode",
    ".tox",
    "target",
    "vendor",
];

/// Default walk depth below the project root.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Look up the signature for a stack.
pub fn find_signature(stack: Stack) -> Option<&'static ProjectSignature> {
    SIGNATURES.iter().find(|sig| sig.stack == stack)
}

/// The manifest format a file name represents for the given signature, if any.
pub fn manifest_format(sig: &ProjectSignature, file_name: &str) -> Option<ManifestFormat> {
    sig.manifests
        .iter()
        .find(|m| m.marker.matches(file_name))
        .map(|m| m.format)
}

/// The first signature, in priority order, whose source extensions include `ext`.
pub fn stack_for_extension(ext: &str) -> Option<Stack> {
    SIGNATURES
        .iter()
        .find(|sig| {
            sig.source_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
        .map(|sig| sig.stack)
}

// ── Framework definitions ────────────────────────────────────────────────────

/// How a dependency name identifies a framework.
#[derive(Debug, Clone, Copy)]
pub enum DependencyPattern {
    Exact(&'static str),
    Prefix(&'static str),
}

impl DependencyPattern {
    pub fn matches(&self, dependency: &str) -> bool {
        match self {
            Self::Exact(name) => dependency.eq_ignore_ascii_case(name),
            Self::Prefix(prefix) => dependency
                .to_ascii_lowercase()
                .starts_with(&prefix.to_ascii_lowercase()),
        }
    }
}

/// Describes one framework and how to recognise it.
#[derive(Debug, Clone, Copy)]
pub struct FrameworkDef {
    pub framework: Framework,
    pub stack: Stack,
    pub patterns: &'static [DependencyPattern],
    /// Port the framework listens on when nothing else is configured.
    pub default_port: Option<u16>,
    /// Extra guidance appended to the Dockerfile prompt.
    pub prompt_hint: Option<&'static str>,
}

use DependencyPattern::{Exact, Prefix};

/// Single source of truth for framework inference.
pub static FRAMEWORK_REGISTRY: &[FrameworkDef] = &[
    // ── Node.js ──────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::Express,
        stack: Stack::Node,
        patterns: &[Exact("express")],
        default_port: Some(3000),
        prompt_hint: Some("Apply Node.js with Express best practices."),
    },
    FrameworkDef {
        framework: Framework::React,
        stack: Stack::Node,
        patterns: &[Exact("react")],
        default_port: Some(3000),
        prompt_hint: Some("Build the static bundle in a builder stage and serve it from a slim web server image."),
    },
    FrameworkDef {
        framework: Framework::NextJs,
        stack: Stack::Node,
        patterns: &[Exact("next")],
        default_port: Some(3000),
        prompt_hint: Some("Use the Next.js standalone output in the runtime stage."),
    },
    FrameworkDef {
        framework: Framework::NestJs,
        stack: Stack::Node,
        patterns: &[Exact("@nestjs/core")],
        default_port: Some(3000),
        prompt_hint: None,
    },
    FrameworkDef {
        framework: Framework::Fastify,
        stack: Stack::Node,
        patterns: &[Exact("fastify")],
        default_port: Some(3000),
        prompt_hint: None,
    },
    // ── Python ───────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::Django,
        stack: Stack::Python,
        patterns: &[Exact("django")],
        default_port: Some(8000),
        prompt_hint: Some("Collect static files at build time and serve with gunicorn."),
    },
    FrameworkDef {
        framework: Framework::Flask,
        stack: Stack::Python,
        patterns: &[Exact("flask")],
        default_port: Some(5000),
        prompt_hint: Some("Serve the Flask app with gunicorn, not the development server."),
    },
    FrameworkDef {
        framework: Framework::FastApi,
        stack: Stack::Python,
        patterns: &[Exact("fastapi")],
        default_port: Some(8000),
        prompt_hint: Some("Serve the FastAPI app with uvicorn."),
    },
    // ── Java ─────────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::SpringBoot,
        stack: Stack::Java,
        patterns: &[Prefix("spring-boot")],
        default_port: Some(8080),
        prompt_hint: Some("Use a JRE-only runtime image and run the packaged jar."),
    },
    // ── Go ───────────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::Gin,
        stack: Stack::Go,
        patterns: &[Prefix("github.com/gin-gonic/gin")],
        default_port: Some(8080),
        prompt_hint: None,
    },
    FrameworkDef {
        framework: Framework::Echo,
        stack: Stack::Go,
        patterns: &[Prefix("github.com/labstack/echo")],
        default_port: Some(1323),
        prompt_hint: None,
    },
    FrameworkDef {
        framework: Framework::Fiber,
        stack: Stack::Go,
        patterns: &[Prefix("github.com/gofiber/fiber")],
        default_port: Some(3000),
        prompt_hint: None,
    },
    // ── Ruby ─────────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::Rails,
        stack: Stack::Ruby,
        patterns: &[Exact("rails")],
        default_port: Some(3000),
        prompt_hint: Some("Precompile assets in the builder stage."),
    },
    FrameworkDef {
        framework: Framework::Sinatra,
        stack: Stack::Ruby,
        patterns: &[Exact("sinatra")],
        default_port: Some(4567),
        prompt_hint: None,
    },
    // ── .NET ─────────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::AspNetCore,
        stack: Stack::DotNet,
        patterns: &[Prefix("Microsoft.AspNetCore")],
        default_port: Some(5000),
        prompt_hint: Some("Publish with dotnet publish and run on the aspnet runtime image."),
    },
    // ── Rust ─────────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::Axum,
        stack: Stack::Rust,
        patterns: &[Exact("axum")],
        default_port: None,
        prompt_hint: None,
    },
    FrameworkDef {
        framework: Framework::ActixWeb,
        stack: Stack::Rust,
        patterns: &[Exact("actix-web")],
        default_port: Some(8080),
        prompt_hint: None,
    },
    // ── PHP ──────────────────────────────────────────────────────────────────
    FrameworkDef {
        framework: Framework::Laravel,
        stack: Stack::Php,
        patterns: &[Exact("laravel/framework")],
        default_port: Some(8000),
        prompt_hint: None,
    },
];

/// Frameworks of `stack` named by any of the given dependency names, in
/// registry order and without duplicates.
pub fn frameworks_for<'a, I>(stack: Stack, dependency_names: I) -> Vec<Framework>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = dependency_names.into_iter().collect();
    FRAMEWORK_REGISTRY
        .iter()
        .filter(|def| def.stack == stack)
        .filter(|def| {
            names
                .iter()
                .any(|name| def.patterns.iter().any(|p| p.matches(name)))
        })
        .map(|def| def.framework)
        .collect()
}

/// Look up the registry entry for a framework.
pub fn find_framework(framework: Framework) -> Option<&'static FrameworkDef> {
    FRAMEWORK_REGISTRY
        .iter()
        .find(|def| def.framework == framework)
}

// ── Integrity tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_stack_has_exactly_one_signature() {
        let mut seen = HashSet::new();
        for sig in SIGNATURES {
            assert!(seen.insert(sig.stack), "duplicate signature for {}", sig.stack);
            assert!(!sig.manifests.is_empty(), "{} has no manifests", sig.stack);
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn node_outranks_python() {
        let node = SIGNATURES.iter().position(|s| s.stack == Stack::Node);
        let python = SIGNATURES.iter().position(|s| s.stack == Stack::Python);
        assert!(node < python);
    }

    #[test]
    fn extension_marker_requires_stem() {
        let marker = Marker::Extension("csproj");
        assert!(marker.matches("Api.csproj"));
        assert!(marker.matches("API.CSPROJ"));
        assert!(!marker.matches(".csproj"));
        assert!(!marker.matches("csproj"));
    }

    #[test]
    fn manifest_format_lookup() {
        let python = find_signature(Stack::Python).unwrap();
        assert_eq!(
            manifest_format(python, "pyproject.toml"),
            Some(ManifestFormat::PyProject)
        );
        assert_eq!(manifest_format(python, "package.json"), None);
    }

    #[test]
    fn extension_heuristic_prefers_table_order() {
        assert_eq!(stack_for_extension("ts"), Some(Stack::Node));
        assert_eq!(stack_for_extension("PY"), Some(Stack::Python));
        assert_eq!(stack_for_extension("txt"), None);
    }

    #[test]
    fn frameworks_are_scoped_to_stack() {
        let found = frameworks_for(Stack::Node, ["express", "react", "django"]);
        assert_eq!(found, vec![Framework::Express, Framework::React]);

        let found = frameworks_for(Stack::Go, ["github.com/labstack/echo/v4"]);
        assert_eq!(found, vec![Framework::Echo]);
    }

    #[test]
    fn every_framework_registered_once() {
        let mut seen = HashSet::new();
        for def in FRAMEWORK_REGISTRY {
            assert!(seen.insert(def.framework), "duplicate {}", def.framework);
            assert!(find_signature(def.stack).is_some());
        }
    }
}
