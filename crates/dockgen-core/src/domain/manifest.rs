//! Dependency parsers, one per [`ManifestFormat`].
//!
//! Structured formats (JSON, TOML) go through `serde_json` / `toml` and fail
//! with [`DomainError::ManifestParse`] when malformed. Line-oriented and XML
//! formats are scanned with regexes and never fail; an unreadable file simply
//! yields no dependencies.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::domain::entities::Dependency;
use crate::domain::error::DomainError;
use crate::domain::signatures::ManifestFormat;

/// Parse the dependencies declared by a manifest.
pub fn parse_dependencies(
    format: ManifestFormat,
    path: &Path,
    content: &str,
) -> Result<Vec<Dependency>, DomainError> {
    let parse_err = |reason: String| DomainError::ManifestParse {
        path: path.to_path_buf(),
        reason,
    };

    let deps = match format {
        ManifestFormat::PackageJson => json_object_keys(content, "dependencies", |_| true)
            .map_err(parse_err)?,
        ManifestFormat::ComposerJson => json_object_keys(content, "require", |name| {
            name != "php" && !name.starts_with("ext-")
        })
        .map_err(parse_err)?,
        ManifestFormat::Requirements => content.lines().filter_map(requirement).collect(),
        ManifestFormat::PyProject => pyproject(content).map_err(parse_err)?,
        ManifestFormat::Pipfile => toml_table_keys(content, &["packages"], |_| true)
            .map_err(parse_err)?,
        ManifestFormat::CargoToml => toml_table_keys(content, &["dependencies"], |_| true)
            .map_err(parse_err)?,
        ManifestFormat::SetupPy => setup_py(content),
        ManifestFormat::PomXml => pom_xml(content),
        ManifestFormat::Gradle => gradle(content),
        ManifestFormat::GoMod => go_mod(content),
        ManifestFormat::MsBuildProject => msbuild(content),
        ManifestFormat::Gemfile => gemfile(content),
    };

    Ok(deps)
}

// ── JSON ─────────────────────────────────────────────────────────────────────

fn json_object_keys(
    content: &str,
    key: &str,
    keep: impl Fn(&str) -> bool,
) -> Result<Vec<Dependency>, String> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let Some(map) = value.get(key).and_then(|v| v.as_object()) else {
        return Ok(Vec::new());
    };

    Ok(map
        .iter()
        .filter(|(name, _)| keep(name))
        .map(|(name, version)| {
            let dep = Dependency::new(name.as_str());
            match version.as_str() {
                Some(v) => dep.with_version(v),
                None => dep,
            }
        })
        .collect())
}

// ── TOML ─────────────────────────────────────────────────────────────────────

fn toml_dependency(name: &str, value: &toml::Value) -> Dependency {
    let dep = Dependency::new(name);
    let version = match value {
        toml::Value::String(v) if v != "*" => Some(v.as_str()),
        toml::Value::Table(t) => t.get("version").and_then(|v| v.as_str()),
        _ => None,
    };
    match version {
        Some(v) => dep.with_version(v),
        None => dep,
    }
}

fn toml_table_keys(
    content: &str,
    table_path: &[&str],
    keep: impl Fn(&str) -> bool,
) -> Result<Vec<Dependency>, String> {
    let doc: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;

    let mut current = &doc;
    for segment in table_path {
        match current.get(*segment).and_then(|v| v.as_table()) {
            Some(next) => current = next,
            None => return Ok(Vec::new()),
        }
    }

    Ok(current
        .iter()
        .filter(|(name, _)| keep(name))
        .map(|(name, value)| toml_dependency(name, value))
        .collect())
}

fn pyproject(content: &str) -> Result<Vec<Dependency>, String> {
    let doc: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;

    let mut deps: Vec<Dependency> = doc
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .filter_map(requirement)
                .collect()
        })
        .unwrap_or_default();

    deps.extend(toml_table_keys(
        content,
        &["tool", "poetry", "dependencies"],
        |name| name != "python",
    )?);

    Ok(deps)
}

// ── Python requirement strings ───────────────────────────────────────────────

/// Parse one PEP 508 style requirement (`flask[async]>=2.0 ; python_version > "3"`).
fn requirement(line: &str) -> Option<Dependency> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() || line.starts_with('-') || (line.contains("://") && !line.contains(" @ ")) {
        return None;
    }

    let name_end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut rest = line[name_end..].trim_start();
    if rest.starts_with('[') {
        rest = rest.find(']').map_or("", |i| rest[i + 1..].trim_start());
    }
    let spec = rest.split(';').next().unwrap_or_default().trim();

    let dep = Dependency::new(name);
    Some(if spec.starts_with('@') {
        dep
    } else {
        dep.with_version(spec)
    })
}

static SETUP_REQUIRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)install_requires\s*=\s*\[(.*?)\]").expect("valid install_requires regex")
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid quoted-string regex"));

fn setup_py(content: &str) -> Vec<Dependency> {
    SETUP_REQUIRES
        .captures(content)
        .map(|caps| {
            QUOTED
                .captures_iter(&caps[1])
                .filter_map(|c| requirement(&c[1]))
                .collect()
        })
        .unwrap_or_default()
}

// ── JVM ──────────────────────────────────────────────────────────────────────

static POM_DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<dependency>(.*?)</dependency>").expect("valid pom dependency regex")
});

static POM_ARTIFACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<artifactId>\s*([^<\s]+)\s*</artifactId>").expect("valid artifactId regex")
});

static POM_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<version>\s*([^<\s]+)\s*</version>").expect("valid version regex")
});

fn pom_xml(content: &str) -> Vec<Dependency> {
    POM_DEPENDENCY
        .captures_iter(content)
        .filter_map(|block| {
            let body = block.get(1)?.as_str();
            let artifact = POM_ARTIFACT.captures(body)?;
            let dep = Dependency::new(&artifact[1]);
            Some(match POM_VERSION.captures(body) {
                Some(v) => dep.with_version(&v[1]),
                None => dep,
            })
        })
        .collect()
}

static GRADLE_DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^\s*(?:implementation|api|compile|runtimeOnly|compileOnly)\s*\(?\s*["']([^"':\s]+):([^"':\s]+)(?::([^"'\s]+))?["']"#,
    )
    .expect("valid gradle dependency regex")
});

fn gradle(content: &str) -> Vec<Dependency> {
    GRADLE_DEPENDENCY
        .captures_iter(content)
        .map(|caps| {
            let dep = Dependency::new(&caps[2]);
            match caps.get(3) {
                Some(v) => dep.with_version(v.as_str()),
                None => dep,
            }
        })
        .collect()
}

// ── Go ───────────────────────────────────────────────────────────────────────

fn go_mod(content: &str) -> Vec<Dependency> {
    fn module(spec: &str) -> Option<Dependency> {
        let mut parts = spec.split_whitespace();
        let name = parts.next()?;
        let dep = Dependency::new(name);
        Some(match parts.next() {
            Some(v) => dep.with_version(v),
            None => dep,
        })
    }

    let mut deps = Vec::new();
    let mut in_block = false;

    for raw in content.lines() {
        let line = raw.split("//").next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        if in_block {
            if line == ")" {
                in_block = false;
            } else {
                deps.extend(module(line));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("require") {
            if !(rest.starts_with(char::is_whitespace) || rest.starts_with('(')) {
                continue;
            }
            match rest.trim() {
                "(" => in_block = true,
                single => deps.extend(module(single)),
            }
        }
    }

    deps
}

// ── .NET ─────────────────────────────────────────────────────────────────────

static PACKAGE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<PackageReference\s+Include="([^"]+)"(?:\s+Version="([^"]+)")?"#)
        .expect("valid PackageReference regex")
});

fn msbuild(content: &str) -> Vec<Dependency> {
    PACKAGE_REFERENCE
        .captures_iter(content)
        .map(|caps| {
            let dep = Dependency::new(&caps[1]);
            match caps.get(2) {
                Some(v) => dep.with_version(v.as_str()),
                None => dep,
            }
        })
        .collect()
}

// ── Ruby ─────────────────────────────────────────────────────────────────────

static GEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*gem\s+["']([^"']+)["'](?:\s*,\s*["']([^"']+)["'])?"#)
        .expect("valid gem regex")
});

fn gemfile(content: &str) -> Vec<Dependency> {
    GEM.captures_iter(content)
        .map(|caps| {
            let dep = Dependency::new(&caps[1]);
            match caps.get(2) {
                Some(v) => dep.with_version(v.as_str()),
                None => dep,
            }
        })
        .collect()
}
