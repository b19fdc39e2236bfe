//! Domain value objects: Stack, Framework, Severity, ArtifactKind, Layout.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! They hold NO detection logic. Marker files, manifest formats and framework
//! lookups live in `signatures.rs`. This file's only job is to define the
//! types, their string representations, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` / `label` arms and the `FromStr` arm here
//! 3. Add a signature or framework entry in `signatures.rs`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Stack ────────────────────────────────────────────────────────────────────

/// A technology stack the classifier can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    Node,
    Python,
    Java,
    Go,
    DotNet,
    Ruby,
    Rust,
    Php,
}

impl Stack {
    /// Stable machine identifier (`node`, `python`, …).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Python => "python",
            Self::Java => "java",
            Self::Go => "go",
            Self::DotNet => "dotnet",
            Self::Ruby => "ruby",
            Self::Rust => "rust",
            Self::Php => "php",
        }
    }

    /// Human-facing stack label, as used in prompts and reports.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Node => "Node.js",
            Self::Python => "Python",
            Self::Java => "Java",
            Self::Go => "Go",
            Self::DotNet => ".NET",
            Self::Ruby => "Ruby",
            Self::Rust => "Rust",
            Self::Php => "PHP",
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stack {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node" | "nodejs" | "node.js" | "javascript" | "js" => Ok(Self::Node),
            "python" | "py" => Ok(Self::Python),
            "java" | "jvm" => Ok(Self::Java),
            "go" | "golang" => Ok(Self::Go),
            "dotnet" | ".net" | "csharp" | "c#" => Ok(Self::DotNet),
            "ruby" | "rb" => Ok(Self::Ruby),
            "rust" | "rs" => Ok(Self::Rust),
            "php" => Ok(Self::Php),
            other => Err(DomainError::UnknownStack(other.to_owned())),
        }
    }
}

// ── Framework ─────────────────────────────────────────────────────────────────

/// A framework recognised from a component's declared dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    Express,
    React,
    NextJs,
    NestJs,
    Fastify,
    Django,
    Flask,
    FastApi,
    SpringBoot,
    Gin,
    Echo,
    Fiber,
    Rails,
    Sinatra,
    AspNetCore,
    Axum,
    ActixWeb,
    Laravel,
}

impl Framework {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Express => "express",
            Self::React => "react",
            Self::NextJs => "next",
            Self::NestJs => "nestjs",
            Self::Fastify => "fastify",
            Self::Django => "django",
            Self::Flask => "flask",
            Self::FastApi => "fastapi",
            Self::SpringBoot => "spring-boot",
            Self::Gin => "gin",
            Self::Echo => "echo",
            Self::Fiber => "fiber",
            Self::Rails => "rails",
            Self::Sinatra => "sinatra",
            Self::AspNetCore => "aspnetcore",
            Self::Axum => "axum",
            Self::ActixWeb => "actix-web",
            Self::Laravel => "laravel",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Severity ──────────────────────────────────────────────────────────────────

/// How serious a failed checklist rule is.
///
/// Ordering is by seriousness, so `Severity::Error > Severity::Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ArtifactKind ──────────────────────────────────────────────────────────────

/// A document the generation service is asked to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Dockerfile,
    Compose,
    Readme,
}

impl ArtifactKind {
    /// File name the artifact is written under.
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Dockerfile => "Dockerfile",
            Self::Compose => "docker-compose.yml",
            Self::Readme => "dockerreadme.md",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dockerfile => "dockerfile",
            Self::Compose => "compose",
            Self::Readme => "readme",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Whether a project is one deployable unit or several sibling services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Single,
    Microservices,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Microservices => f.write_str("microservices"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_labels_are_human_readable() {
        assert_eq!(Stack::Node.label(), "Node.js");
        assert_eq!(Stack::DotNet.to_string(), ".NET");
        assert_eq!(Stack::Python.as_str(), "python");
    }

    #[test]
    fn stack_parses_aliases() {
        assert_eq!("golang".parse::<Stack>().unwrap(), Stack::Go);
        assert_eq!("Node.js".parse::<Stack>().unwrap(), Stack::Node);
        assert_eq!("C#".parse::<Stack>().unwrap(), Stack::DotNet);
    }

    #[test]
    fn unknown_stack_is_error() {
        assert!(matches!(
            "cobol".parse::<Stack>(),
            Err(DomainError::UnknownStack(_))
        ));
    }

    #[test]
    fn severity_orders_by_seriousness() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn artifact_file_names() {
        assert_eq!(ArtifactKind::Dockerfile.file_name(), "Dockerfile");
        assert_eq!(ArtifactKind::Compose.file_name(), "docker-compose.yml");
        assert_eq!(ArtifactKind::Readme.file_name(), "dockerreadme.md");
    }
}
