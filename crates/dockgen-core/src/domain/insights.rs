//! Text scanners for the extra facts a prompt benefits from: `.env` variable
//! names, candidate ports and entry points.
//!
//! All functions are pure; the classifier feeds them file contents.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::signatures::ProjectSignature;

/// Extensions whose contents are scanned for listening ports.
pub const PORT_SCAN_EXTENSIONS: &[&str] = &["js", "ts", "py", "java", "go", "cs", "rb", "rs", "php"];

/// `.env` files whose variable names are collected.
pub const ENV_FILES: &[&str] = &[".env", ".env.example"];

// ── .env ─────────────────────────────────────────────────────────────────────

/// Iterate `(key, value)` pairs of a dotenv file. Comments and blank lines are
/// skipped, an `export ` prefix is dropped and quotes around values stripped.
fn env_pairs(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        Some((key, value))
    })
}

/// Variable names declared in a dotenv file, in file order.
pub fn env_names(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (key, _) in env_pairs(content) {
        if !names.iter().any(|n| n == key) {
            names.push(key.to_owned());
        }
    }
    names
}

/// The `PORT` value of a dotenv file, if it is a valid port.
pub fn env_port(content: &str) -> Option<u16> {
    env_pairs(content)
        .filter(|(key, _)| *key == "PORT")
        .find_map(|(_, value)| valid_port(value))
}

// ── Ports ────────────────────────────────────────────────────────────────────

static SOURCE_PORT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\.listen\(.*?(\d{4,5})",
        r"PORT\s*[:=]\s*(\d+)",
        r"port:\s*(\d+)",
        r"\bport\s*=\s*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid port regex"))
    .collect()
});

static EXPOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*EXPOSE\s+(.+)$").expect("valid EXPOSE regex")
});

fn valid_port(raw: &str) -> Option<u16> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|p| (1..=65535).contains(p))
        .and_then(|p| u16::try_from(p).ok())
}

/// Ports mentioned by listen calls and port assignments in source code.
pub fn source_ports(content: &str) -> Vec<u16> {
    SOURCE_PORT_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| valid_port(&caps[1]))
        .collect()
}

/// Ports published by `EXPOSE` instructions (`EXPOSE 80 443/tcp`).
pub fn exposed_ports(dockerfile: &str) -> Vec<u16> {
    EXPOSE
        .captures_iter(dockerfile)
        .flat_map(|caps| {
            caps[1]
                .split_whitespace()
                .filter_map(|token| valid_port(token.split('/').next().unwrap_or(token)))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Sort, de-duplicate and range-check a set of candidate ports.
pub fn normalize_ports(mut ports: Vec<u16>) -> Vec<u16> {
    ports.retain(|p| *p > 0);
    ports.sort_unstable();
    ports.dedup();
    ports
}

// ── Entry points ─────────────────────────────────────────────────────────────

/// `main` and `scripts.start` of a `package.json`. Malformed files yield none.
pub fn node_entry_points(package_json: &str) -> Vec<String> {
    let Ok(pkg) = serde_json::from_str::<serde_json::Value>(package_json) else {
        return Vec::new();
    };

    let main = pkg.get("main").and_then(|v| v.as_str());
    let start = pkg
        .get("scripts")
        .and_then(|s| s.get("start"))
        .and_then(|v| v.as_str());

    [main, start]
        .into_iter()
        .flatten()
        .map(str::to_owned)
        .collect()
}

/// Whether a file name looks like an entry point for the given stack.
pub fn is_entry_file(signature: &ProjectSignature, file_name: &str) -> bool {
    signature.entry_files.contains(&file_name)
        || signature
            .entry_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix))
}
