//! Prompt templates for the generation service.
//!
//! One [`GenerationRequest`] is built per artifact. Only variable *names* from
//! `.env` files ever reach a prompt.

use serde::Serialize;
use std::fmt::Write as _;

use crate::domain::entities::{DetectionResult, ProjectAnalysis};
use crate::domain::signatures::find_framework;
use crate::domain::value_objects::ArtifactKind;

/// Maximum dependency names listed in a Dockerfile prompt.
pub const MAX_PROMPT_DEPENDENCIES: usize = 30;

const DOCKERFILE_ROLE: &str = "You are a senior DevOps engineer creating production Dockerfiles.";
const COMPOSE_ROLE: &str = "You are a Docker expert creating production compose files.";
const README_ROLE: &str = "You are a DevOps documentation expert.";

/// A prompt ready to be sent to the generation port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub artifact: ArtifactKind,
    /// Component the request is for, `None` for project-wide artifacts.
    pub component: Option<String>,
    pub system: String,
    pub user: String,
}

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "none detected".to_owned();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Dockerfile prompt for one component.
pub fn dockerfile_request(component: &DetectionResult) -> GenerationRequest {
    let mut frameworks = list(&component.frameworks);
    for hint in component
        .frameworks
        .iter()
        .filter_map(|fw| find_framework(*fw).and_then(|def| def.prompt_hint))
    {
        frameworks.push(' ');
        frameworks.push_str(hint);
    }

    let mut deps = component.dependency_names();
    let omitted = deps.len().saturating_sub(MAX_PROMPT_DEPENDENCIES);
    deps.truncate(MAX_PROMPT_DEPENDENCIES);

    let mut user = String::new();
    let _ = writeln!(user, "Create a production Dockerfile for a {} project.", component.stack);
    if !component.is_root() {
        let _ = writeln!(
            user,
            "The service lives in the '{}' directory and is built with that directory as context.",
            component.path.display()
        );
    }
    let _ = writeln!(user, "Frameworks: {frameworks}");
    let _ = writeln!(user, "Entry points: {}", list(&component.entry_points));
    let _ = writeln!(user, "Ports: {}", list(&component.ports));
    let _ = write!(user, "Dependencies: {}", list(&deps));
    if omitted > 0 {
        let _ = write!(user, " (and {omitted} more)");
    }
    user.push('\n');
    let _ = writeln!(user, "Environment variables: {}", list(&component.env_vars));
    user.push_str(
        "\nRequirements:\n\
         - Multi-stage build\n\
         - Non-root user\n\
         - Security best practices\n\
         - Production optimizations\n\
         - Health checks\n\
         - Base images pinned to a specific version tag\n\
         \n\
         Provide ONLY the Dockerfile content.\n",
    );

    GenerationRequest {
        artifact: ArtifactKind::Dockerfile,
        component: Some(component.name.clone()),
        system: DOCKERFILE_ROLE.to_owned(),
        user,
    }
}

/// Compose prompt for the whole project.
pub fn compose_request(analysis: &ProjectAnalysis) -> GenerationRequest {
    let services: Vec<String> = analysis
        .components
        .iter()
        .map(|c| {
            if c.is_root() {
                format!("{} ({}, build context .)", c.name, c.stack)
            } else {
                format!("{} ({}, build context ./{})", c.name, c.stack, c.path.display())
            }
        })
        .collect();

    let mut user = String::new();
    let _ = writeln!(
        user,
        "Create a docker-compose.yml for a {} project.",
        project_label(analysis)
    );
    let _ = writeln!(user, "Services: {}", list(&services));
    let _ = writeln!(user, "Ports: {}", list(&analysis.all_ports()));
    let _ = writeln!(user, "Environment variables: {}", list(&analysis.all_env_vars()));
    user.push_str(
        "\nRequirements:\n\
         - Network isolation\n\
         - Resource constraints (deploy.resources.limits)\n\
         - Volume management\n\
         - Health checks\n\
         - Secrets passed through ${VAR} interpolation, never literal values\n\
         - Production-grade settings\n\
         \n\
         Provide ONLY valid YAML.\n",
    );

    GenerationRequest {
        artifact: ArtifactKind::Compose,
        component: None,
        system: COMPOSE_ROLE.to_owned(),
        user,
    }
}

/// README prompt documenting the container setup.
pub fn readme_request(analysis: &ProjectAnalysis) -> GenerationRequest {
    let frameworks: Vec<String> = analysis
        .components
        .iter()
        .flat_map(|c| c.frameworks.iter().map(ToString::to_string))
        .collect();
    let services: Vec<&str> = analysis.components.iter().map(|c| c.name.as_str()).collect();
    let entry_points: Vec<&str> = analysis
        .components
        .iter()
        .flat_map(|c| c.entry_points.iter().map(String::as_str))
        .collect();

    let mut user = String::new();
    let _ = writeln!(
        user,
        "Generate Docker README documentation for a {} project with the following details:",
        project_label(analysis)
    );
    let _ = writeln!(user, "- Detected frameworks: {}", list(&frameworks));
    let _ = writeln!(user, "- Services: {}", list(&services));
    let _ = writeln!(user, "- Entry points: {}", list(&entry_points));
    let _ = writeln!(user, "- Ports: {}", list(&analysis.all_ports()));
    let _ = writeln!(user, "- Environment variables: {}", list(&analysis.all_env_vars()));
    user.push_str(
        "\nInclude instructions on how to build and run the containers, best practices, \
         and troubleshooting tips.\n\
         \n\
         Provide ONLY the markdown content.\n",
    );

    GenerationRequest {
        artifact: ArtifactKind::Readme,
        component: None,
        system: README_ROLE.to_owned(),
        user,
    }
}

fn project_label(analysis: &ProjectAnalysis) -> String {
    let mut stacks: Vec<String> = Vec::new();
    for c in &analysis.components {
        let label = c.stack.to_string();
        if !stacks.contains(&label) {
            stacks.push(label);
        }
    }
    if analysis.is_microservices() {
        format!("{} microservices", stacks.join(" + "))
    } else {
        stacks.join(" + ")
    }
}

/// Strip a wrapping Markdown code fence and end the text with one newline.
pub fn normalize_response(raw: &str) -> String {
    let trimmed = raw.trim();

    let body = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Drop the info string (```dockerfile) along with the fence line.
            let rest = rest.split_once('\n').map_or("", |(_, body)| body);
            rest.trim_end().strip_suffix("```").unwrap_or(rest)
        }
        None => trimmed,
    };

    let mut text = body.trim_end().to_owned();
    text.push('\n');
    text
}
