//! Checklist rule table for generated Dockerfiles and compose files.
//!
//! [`RULES`] is evaluated in declaration order by
//! [`ArtifactValidator`](crate::domain::ArtifactValidator). Each predicate is a
//! plain `fn(&str) -> Result<(), String>`; the error string becomes the
//! report message.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::domain::value_objects::Severity;

/// Which artifact a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    Dockerfile,
    Compose,
}

impl fmt::Display for RuleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dockerfile => "dockerfile",
            Self::Compose => "compose",
        })
    }
}

pub type RuleCheck = fn(&str) -> Result<(), String>;

/// One checklist rule.
#[derive(Clone, Copy)]
pub struct RuleDef {
    pub id: &'static str,
    pub target: RuleTarget,
    pub severity: Severity,
    pub description: &'static str,
    pub check: RuleCheck,
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDef")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// The default rule table, in evaluation order.
pub static RULES: &[RuleDef] = &[
    RuleDef {
        id: "dockerfile.has-from",
        target: RuleTarget::Dockerfile,
        severity: Severity::Error,
        description: "Dockerfile declares at least one FROM instruction",
        check: has_from,
    },
    RuleDef {
        id: "dockerfile.pinned-base-image",
        target: RuleTarget::Dockerfile,
        severity: Severity::Warning,
        description: "Base images are pinned to a tag or digest other than latest",
        check: pinned_base_image,
    },
    RuleDef {
        id: "dockerfile.non-root-user",
        target: RuleTarget::Dockerfile,
        severity: Severity::Error,
        description: "Final stage runs as a non-root USER",
        check: non_root_user,
    },
    RuleDef {
        id: "dockerfile.no-hardcoded-secrets",
        target: RuleTarget::Dockerfile,
        severity: Severity::Error,
        description: "No credentials baked into ENV/ARG or the image text",
        check: dockerfile_no_secrets,
    },
    RuleDef {
        id: "dockerfile.healthcheck",
        target: RuleTarget::Dockerfile,
        severity: Severity::Warning,
        description: "A HEALTHCHECK instruction is defined",
        check: dockerfile_healthcheck,
    },
    RuleDef {
        id: "dockerfile.prefer-copy",
        target: RuleTarget::Dockerfile,
        severity: Severity::Warning,
        description: "COPY is used instead of ADD",
        check: prefer_copy,
    },
    RuleDef {
        id: "dockerfile.no-curl-pipe-shell",
        target: RuleTarget::Dockerfile,
        severity: Severity::Error,
        description: "No remote script is piped straight into a shell",
        check: no_curl_pipe_shell,
    },
    RuleDef {
        id: "dockerfile.apk-no-cache",
        target: RuleTarget::Dockerfile,
        severity: Severity::Info,
        description: "apk add uses --no-cache",
        check: apk_no_cache,
    },
    RuleDef {
        id: "dockerfile.multi-stage",
        target: RuleTarget::Dockerfile,
        severity: Severity::Info,
        description: "Build uses multiple stages",
        check: multi_stage,
    },
    RuleDef {
        id: "compose.valid-yaml",
        target: RuleTarget::Compose,
        severity: Severity::Error,
        description: "Compose file is valid YAML with a services mapping",
        check: compose_valid_yaml,
    },
    RuleDef {
        id: "compose.healthcheck",
        target: RuleTarget::Compose,
        severity: Severity::Warning,
        description: "Every service declares a healthcheck",
        check: compose_healthcheck,
    },
    RuleDef {
        id: "compose.no-hardcoded-secrets",
        target: RuleTarget::Compose,
        severity: Severity::Error,
        description: "Secret-like environment values use ${VAR} interpolation",
        check: compose_no_secrets,
    },
    RuleDef {
        id: "compose.resource-limits",
        target: RuleTarget::Compose,
        severity: Severity::Info,
        description: "Every service sets deploy.resources.limits",
        check: compose_resource_limits,
    },
];

pub fn find_rule(id: &str) -> Option<&'static RuleDef> {
    RULES.iter().find(|rule| rule.id == id)
}

// ── Dockerfile instruction scanner ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Instruction {
    keyword: String,
    args: String,
    line: usize,
}

/// Split Dockerfile text into instructions, joining `\` continuations and
/// dropping comments.
fn instructions(text: &str) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.starts_with('#') || (trimmed.is_empty() && pending.is_none()) {
            continue;
        }

        let (continues, body) = match trimmed.strip_suffix('\\') {
            Some(body) => (true, body.trim_end()),
            None => (false, trimmed),
        };

        let (start, mut joined) = pending.take().unwrap_or((idx + 1, String::new()));
        if !joined.is_empty() && !body.is_empty() {
            joined.push(' ');
        }
        joined.push_str(body);

        if continues {
            pending = Some((start, joined));
            continue;
        }

        if let Some(instr) = split_instruction(&joined, start) {
            out.push(instr);
        }
    }

    if let Some((start, joined)) = pending {
        out.extend(split_instruction(&joined, start));
    }

    out
}

fn split_instruction(joined: &str, line: usize) -> Option<Instruction> {
    let joined = joined.trim();
    if joined.is_empty() {
        return None;
    }
    let (keyword, args) = joined.split_once(char::is_whitespace).unwrap_or((joined, ""));
    Some(Instruction {
        keyword: keyword.to_ascii_uppercase(),
        args: args.trim().to_owned(),
        line,
    })
}

fn with_keyword<'a>(all: &'a [Instruction], keyword: &'a str) -> impl Iterator<Item = &'a Instruction> {
    all.iter().filter(move |i| i.keyword == keyword)
}

/// Instructions of the last build stage, starting at its `FROM`.
fn final_stage(all: &[Instruction]) -> &[Instruction] {
    let start = all.iter().rposition(|i| i.keyword == "FROM").unwrap_or(0);
    &all[start..]
}

// ── Dockerfile rules ─────────────────────────────────────────────────────────

fn has_from(text: &str) -> Result<(), String> {
    let all = instructions(text);
    match with_keyword(&all, "FROM").next() {
        Some(_) => Ok(()),
        None => Err("no FROM instruction found".into()),
    }
}

/// Image reference and optional stage alias of a `FROM` line.
fn from_parts(args: &str) -> (Option<&str>, Option<&str>) {
    let mut tokens = args.split_whitespace().filter(|t| !t.starts_with("--"));
    let image = tokens.next();
    let alias = match (tokens.next(), tokens.next()) {
        (Some(kw), Some(name)) if kw.eq_ignore_ascii_case("as") => Some(name),
        _ => None,
    };
    (image, alias)
}

fn is_pinned(image: &str) -> bool {
    if image.contains('@') {
        return true;
    }
    let name = image.rsplit('/').next().unwrap_or(image);
    match name.rsplit_once(':') {
        Some((_, tag)) => !tag.is_empty() && !tag.eq_ignore_ascii_case("latest"),
        None => false,
    }
}

fn pinned_base_image(text: &str) -> Result<(), String> {
    let all = instructions(text);
    let mut stages: Vec<String> = Vec::new();
    let mut unpinned: Vec<String> = Vec::new();

    for from in with_keyword(&all, "FROM") {
        let (image, alias) = from_parts(&from.args);
        if let Some(image) = image {
            let internal = image.eq_ignore_ascii_case("scratch")
                || image.contains('$')
                || stages.iter().any(|s| s.eq_ignore_ascii_case(image));
            if !internal && !is_pinned(image) {
                unpinned.push(format!("{image} (line {})", from.line));
            }
        }
        if let Some(alias) = alias {
            stages.push(alias.to_owned());
        }
    }

    if unpinned.is_empty() {
        Ok(())
    } else {
        Err(format!("unpinned base image: {}", unpinned.join(", ")))
    }
}

fn non_root_user(text: &str) -> Result<(), String> {
    let all = instructions(text);
    let Some(last) = with_keyword(final_stage(&all), "USER").last() else {
        return Err("no USER instruction in the final stage; the container runs as root".into());
    };

    let user = last
        .args
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default();

    match user {
        "" => Err(format!("USER on line {} names no user", last.line)),
        "root" | "0" => Err(format!("final USER on line {} is root", last.line)),
        _ => Ok(()),
    }
}

static SECRET_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(password|passwd|secret|token|api_?key|access_?key|private_?key|credential)")
        .expect("valid secret-key regex")
});

static TOKEN_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("AWS access key", r"AKIA[0-9A-Z]{16}"),
        ("GitHub token", r"gh[pousr]_[A-Za-z0-9]{36}"),
        ("OpenAI key", r"sk-[A-Za-z0-9_-]{20,}"),
        ("Slack token", r"xox[baprs]-[A-Za-z0-9-]{10,}"),
        ("private key", r"-----BEGIN [A-Z ]*PRIVATE KEY-----"),
    ]
    .into_iter()
    .map(|(name, p)| (name, Regex::new(p).expect("valid token regex")))
    .collect()
});

fn is_secret_key(key: &str) -> bool {
    SECRET_KEY.is_match(key)
}

/// A literal value, as opposed to empty or a `$VAR` / `${VAR}` reference.
fn is_literal(value: &str) -> bool {
    let value = value.trim().trim_matches('"').trim_matches('\'');
    !value.is_empty() && !value.starts_with('$')
}

/// `KEY=VALUE` pairs of an ENV/ARG instruction, including the legacy
/// `ENV KEY VALUE` form.
fn assignments(args: &str) -> Vec<(&str, &str)> {
    if !args.contains('=') {
        return match args.split_once(char::is_whitespace) {
            Some((key, value)) => vec![(key, value.trim())],
            None => vec![(args, "")],
        };
    }
    args.split_whitespace()
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

fn token_findings(text: &str) -> Vec<String> {
    TOKEN_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(name, _)| format!("{name} pattern found"))
        .collect()
}

fn dockerfile_no_secrets(text: &str) -> Result<(), String> {
    let all = instructions(text);
    let mut findings: Vec<String> = all
        .iter()
        .filter(|i| i.keyword == "ENV" || i.keyword == "ARG")
        .flat_map(|i| {
            assignments(&i.args)
                .into_iter()
                .filter(|(key, value)| is_secret_key(key) && is_literal(value))
                .map(move |(key, _)| format!("{} {key} on line {}", i.keyword, i.line))
                .collect::<Vec<_>>()
        })
        .collect();
    findings.extend(token_findings(text));

    if findings.is_empty() {
        Ok(())
    } else {
        Err(format!("hard-coded secret: {}", findings.join("; ")))
    }
}

fn dockerfile_healthcheck(text: &str) -> Result<(), String> {
    let all = instructions(text);
    match with_keyword(&all, "HEALTHCHECK").last() {
        Some(hc) if hc.args.eq_ignore_ascii_case("none") => {
            Err(format!("HEALTHCHECK NONE on line {} disables the check", hc.line))
        }
        Some(_) => Ok(()),
        None => Err("no HEALTHCHECK instruction".into()),
    }
}

fn prefer_copy(text: &str) -> Result<(), String> {
    let all = instructions(text);
    let lines: Vec<String> = with_keyword(&all, "ADD").map(|i| i.line.to_string()).collect();
    if lines.is_empty() {
        Ok(())
    } else {
        Err(format!("ADD used on line {}; prefer COPY", lines.join(", ")))
    }
}

static CURL_PIPE_SHELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(curl|wget)\b[^|;&]*\|\s*(sudo\s+)?(ba|z|da|k)?sh\b")
        .expect("valid curl-pipe regex")
});

fn no_curl_pipe_shell(text: &str) -> Result<(), String> {
    let all = instructions(text);
    match with_keyword(&all, "RUN").find(|i| CURL_PIPE_SHELL.is_match(&i.args)) {
        Some(run) => Err(format!("remote script piped into a shell on line {}", run.line)),
        None => Ok(()),
    }
}

static APK_ADD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bapk\s+add\b([^&;|]*)").expect("valid apk regex")
});

fn apk_no_cache(text: &str) -> Result<(), String> {
    let all = instructions(text);
    let offending: Vec<String> = with_keyword(&all, "RUN")
        .filter(|i| {
            APK_ADD
                .captures_iter(&i.args)
                .any(|caps| !caps[1].split_whitespace().any(|t| t == "--no-cache"))
        })
        .map(|i| i.line.to_string())
        .collect();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(format!("apk add without --no-cache on line {}", offending.join(", ")))
    }
}

fn multi_stage(text: &str) -> Result<(), String> {
    let all = instructions(text);
    match with_keyword(&all, "FROM").count() {
        n if n >= 2 => Ok(()),
        n => Err(format!("{n} build stage(s); use a builder stage to slim the image")),
    }
}

// ── Compose rules ────────────────────────────────────────────────────────────

fn services(text: &str) -> Result<serde_yaml::Mapping, String> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| format!("not valid YAML: {e}"))?;
    match doc.get("services") {
        Some(serde_yaml::Value::Mapping(map)) => Ok(map.clone()),
        Some(_) => Err("'services' is not a mapping".into()),
        None => Err("no top-level 'services' mapping".into()),
    }
}

fn service_name(key: &serde_yaml::Value) -> String {
    key.as_str().map_or_else(|| format!("{key:?}"), str::to_owned)
}

/// Names of services for which `ok` returns false.
fn services_failing(
    text: &str,
    ok: impl Fn(&serde_yaml::Value) -> bool,
) -> Result<Vec<String>, String> {
    Ok(services(text)?
        .iter()
        .filter(|(_, svc)| !ok(svc))
        .map(|(name, _)| service_name(name))
        .collect())
}

fn compose_valid_yaml(text: &str) -> Result<(), String> {
    services(text).map(|_| ())
}

fn compose_healthcheck(text: &str) -> Result<(), String> {
    let missing = services_failing(text, |svc| match svc.get("healthcheck") {
        Some(hc) => !hc.get("disable").and_then(|d| d.as_bool()).unwrap_or(false),
        None => false,
    })?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("no healthcheck for: {}", missing.join(", ")))
    }
}

/// Secret-like environment entries of one service that carry a literal value.
fn literal_secrets(svc: &serde_yaml::Value) -> Vec<String> {
    let interpolated = |v: &str| v.contains("${") || v.trim().is_empty();

    match svc.get("environment") {
        Some(serde_yaml::Value::Mapping(env)) => env
            .iter()
            .filter_map(|(k, v)| {
                let key = k.as_str()?;
                let value = match v {
                    serde_yaml::Value::Null => return None,
                    serde_yaml::Value::String(s) => s.clone(),
                    other => serde_yaml::to_string(other).unwrap_or_default(),
                };
                (is_secret_key(key) && !interpolated(&value)).then(|| key.to_owned())
            })
            .collect(),
        Some(serde_yaml::Value::Sequence(entries)) => entries
            .iter()
            .filter_map(|e| e.as_str())
            .filter_map(|e| e.split_once('='))
            .filter(|(key, value)| is_secret_key(key) && !interpolated(value))
            .map(|(key, _)| key.to_owned())
            .collect(),
        _ => Vec::new(),
    }
}

fn compose_no_secrets(text: &str) -> Result<(), String> {
    let found: Vec<String> = services(text)?
        .iter()
        .flat_map(|(name, svc)| {
            let name = service_name(name);
            literal_secrets(svc)
                .into_iter()
                .map(move |key| format!("{name}.{key}"))
        })
        .chain(token_findings(text))
        .collect();

    if found.is_empty() {
        Ok(())
    } else {
        Err(format!("hard-coded secret: {}", found.join(", ")))
    }
}

fn compose_resource_limits(text: &str) -> Result<(), String> {
    let missing = services_failing(text, |svc| {
        svc.get("deploy")
            .and_then(|d| d.get("resources"))
            .and_then(|r| r.get("limits"))
            .is_some_and(|l| l.is_mapping())
    })?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("no resource limits for: {}", missing.join(", ")))
    }
}
