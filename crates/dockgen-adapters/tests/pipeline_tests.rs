//! Pipeline tests: the core services wired to `MemoryFilesystem` and a
//! scripted generation client, so nothing touches disk or network.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dockgen_adapters::MemoryFilesystem;
use dockgen_core::{
    application::{ApplicationError, ports::*},
    domain::{RuleStatus, Severity},
    error::{DockgenError, ErrorCategory},
    prelude::*,
};

// -----------------------------------------------------------------------------
// Test doubles
// -----------------------------------------------------------------------------

/// Answers by artifact kind and records every call.
struct ScriptedClient {
    dockerfile: String,
    compose: String,
    calls: Mutex<Vec<GenerationRequest>>,
    rate_limits_left: Mutex<u32>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self {
            dockerfile: GOOD_DOCKERFILE.to_string(),
            compose: GOOD_COMPOSE.to_string(),
            calls: Mutex::new(Vec::new()),
            rate_limits_left: Mutex::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl GenerationClient for ScriptedClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(request.clone());
        {
            let mut left = self.rate_limits_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(GenerationError::RateLimited { retry_after: None });
            }
        }
        Ok(match request.artifact {
            ArtifactKind::Dockerfile => format!("```dockerfile\n{}```", self.dockerfile),
            ArtifactKind::Compose => self.compose.clone(),
            ArtifactKind::Readme => "# Running with Docker\n".to_string(),
        })
    }
}

/// Where a `BrokenDisk` refuses to cooperate.
enum Fault {
    /// `write_file` to any path containing the needle.
    Write(&'static str),
    /// The first `rename` onto exactly this path.
    RenameOnto(&'static str),
}

/// `MemoryFilesystem` with one injected failure.
struct BrokenDisk {
    inner: MemoryFilesystem,
    fault: Fault,
    tripped: AtomicBool,
}

impl BrokenDisk {
    fn new(inner: MemoryFilesystem, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            tripped: AtomicBool::new(false),
        }
    }

    fn refuse(path: &Path) -> DockgenError {
        ApplicationError::filesystem(path, "disk full").into()
    }
}

impl Filesystem for BrokenDisk {
    fn list_files(&self, root: &Path, options: &WalkOptions) -> DockgenResult<Vec<PathBuf>> {
        self.inner.list_files(root, options)
    }

    fn read_to_string(&self, path: &Path) -> DockgenResult<String> {
        self.inner.read_to_string(path)
    }

    fn create_dir_all(&self, path: &Path) -> DockgenResult<()> {
        self.inner.create_dir_all(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> DockgenResult<()> {
        match self.fault {
            Fault::Write(needle) if path.to_string_lossy().contains(needle) => {
                Err(Self::refuse(path))
            }
            _ => self.inner.write_file(path, content),
        }
    }

    fn remove_file(&self, path: &Path) -> DockgenResult<()> {
        self.inner.remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> DockgenResult<()> {
        match self.fault {
            Fault::RenameOnto(target)
                if to == Path::new(target) && !self.tripped.swap(true, Ordering::SeqCst) =>
            {
                Err(Self::refuse(to))
            }
            _ => self.inner.rename(from, to),
        }
    }

    fn canonicalize(&self, path: &Path) -> DockgenResult<PathBuf> {
        self.inner.canonicalize(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
}

const GOOD_DOCKERFILE: &str = "\
FROM node:20-alpine AS build
WORKDIR /app
COPY package.json .
RUN npm ci
COPY . .

FROM node:20-alpine
WORKDIR /app
COPY --from=build /app .
USER node
EXPOSE 3000
HEALTHCHECK CMD wget -qO- http://localhost:3000/health || exit 1
CMD [\"node\", \"index.js\"]
";

const GOOD_COMPOSE: &str = "\
services:
  app:
    build: .
    ports:
      - \"3000:3000\"
    healthcheck:
      test: [\"CMD\", \"wget\", \"-qO-\", \"http://localhost:3000/health\"]
    deploy:
      resources:
        limits:
          memory: 256M
";

fn node_project() -> MemoryFilesystem {
    MemoryFilesystem::new()
        .with_file(
            "/work/shop/package.json",
            r#"{"name":"shop","main":"index.js","dependencies":{"express":"^4.18.0"}}"#,
        )
        .with_file("/work/shop/index.js", "app.listen(3000);")
        .with_file("/work/shop/.env", "PORT=3000\nDATABASE_URL=postgres://x\n")
        .with_file("/work/shop/node_modules/express/package.json", "{}")
}

fn service(filesystem: Arc<dyn Filesystem>, client: Arc<ScriptedClient>) -> DockerizeService {
    let policy = RetryPolicy {
        max_retries: 2,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    };
    DockerizeService::new(
        ProjectClassifier::new(Arc::clone(&filesystem), WalkOptions::default()),
        GenerationService::new(client, policy).with_sleeper(|_| {}),
        ArtifactValidator::default(),
        filesystem,
    )
}

fn read(fs: &MemoryFilesystem, path: &str) -> Option<String> {
    fs.read_file(Path::new(path))
}

/// Paths under `dir`, hidden scratch files included.
fn files_under(fs: &MemoryFilesystem, dir: &str) -> Vec<PathBuf> {
    fs.paths()
        .into_iter()
        .filter(|p| p.starts_with(dir))
        .collect()
}

// -----------------------------------------------------------------------------
// Classification
// -----------------------------------------------------------------------------

#[test]
fn test_classify_node_project() {
    let fs: Arc<dyn Filesystem> = Arc::new(node_project());
    let classifier = ProjectClassifier::new(fs, WalkOptions::default());

    let analysis = classifier.classify(Path::new("/work/shop")).unwrap();

    assert_eq!(analysis.layout, Layout::Single);
    assert_eq!(analysis.components.len(), 1);
    let app = &analysis.components[0];
    assert_eq!(app.name, "shop");
    assert_eq!(app.stack, Stack::Node);
    assert!(app.uses_framework(Framework::Express));
    assert_eq!(app.ports, vec![3000]);
    assert!(app.env_vars.contains(&"DATABASE_URL".to_string()));
    assert!(app.entry_points.contains(&"index.js".to_string()));
    // node_modules is never walked
    assert_eq!(app.manifests, vec![PathBuf::from("package.json")]);
}

#[test]
fn test_classify_microservices() {
    let fs: Arc<dyn Filesystem> = Arc::new(
        MemoryFilesystem::new()
            .with_file("/repo/api/package.json", r#"{"dependencies":{"fastify":"4"}}"#)
            .with_file(
                "/repo/worker/go.mod",
                "module worker\n\nrequire github.com/gin-gonic/gin v1.9.1\n",
            )
            .with_file("/repo/README.md", "# repo"),
    );
    let classifier = ProjectClassifier::new(fs, WalkOptions::default());

    let analysis = classifier.classify(Path::new("/repo")).unwrap();

    assert_eq!(analysis.layout, Layout::Microservices);
    let names: Vec<_> = analysis.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["api", "worker"]);
    assert_eq!(analysis.components[1].stack, Stack::Go);
    assert!(analysis.components[1].uses_framework(Framework::Gin));
}

#[test]
fn test_classify_missing_and_unknown() {
    let fs: Arc<dyn Filesystem> =
        Arc::new(MemoryFilesystem::new().with_file("/docs/notes.txt", "hi"));
    let classifier = ProjectClassifier::new(fs, WalkOptions::default());

    let missing = classifier.classify(Path::new("/nowhere")).unwrap_err();
    assert_eq!(missing.category(), ErrorCategory::NotFound);

    let unknown = classifier.classify(Path::new("/docs")).unwrap_err();
    assert_eq!(unknown.category(), ErrorCategory::NotFound);
    assert!(unknown.to_string().contains("No recognizable project signature"));
}

// -----------------------------------------------------------------------------
// Dockerize pipeline
// -----------------------------------------------------------------------------

#[test]
fn test_full_dockerize_workflow() {
    let fs = node_project();
    let client = Arc::new(ScriptedClient::new());
    let svc = service(Arc::new(fs.clone()), Arc::clone(&client));

    let outcome = svc
        .run(&DockerizeRequest::new("/work/shop", "/work/shop"))
        .unwrap();

    assert_eq!(client.call_count(), 2);
    assert_eq!(
        outcome.written,
        vec![
            PathBuf::from("/work/shop/Dockerfile"),
            PathBuf::from("/work/shop/docker-compose.yml")
        ]
    );
    assert_eq!(read(&fs, "/work/shop/Dockerfile").unwrap(), GOOD_DOCKERFILE);
    assert_eq!(read(&fs, "/work/shop/docker-compose.yml").unwrap(), GOOD_COMPOSE);

    assert_eq!(outcome.reports.len(), 1);
    let report = &outcome.reports[0];
    assert_eq!(report.len(), 13);
    assert!(report.is_clean(), "unexpected failures: {:?}", report);
    assert_eq!(outcome.failure_count(), 0);
}

#[test]
fn test_microservices_write_per_component() {
    let fs = MemoryFilesystem::new()
        .with_file("/repo/api/package.json", r#"{"dependencies":{"express":"4"}}"#)
        .with_file("/repo/worker/go.mod", "module worker\n");
    let client = Arc::new(ScriptedClient::new());
    let svc = service(Arc::new(fs.clone()), Arc::clone(&client));

    let outcome = svc.run(&DockerizeRequest::new("/repo", "/out")).unwrap();

    assert_eq!(client.call_count(), 3);
    assert_eq!(outcome.reports.len(), 2);
    assert_eq!(
        files_under(&fs, "/out"),
        vec![
            PathBuf::from("/out/api/Dockerfile"),
            PathBuf::from("/out/docker-compose.yml"),
            PathBuf::from("/out/worker/Dockerfile"),
        ]
    );
}

#[test]
fn test_conflict_is_reported_before_generation() {
    let fs = node_project().with_file("/work/shop/Dockerfile", "FROM old\n");
    let client = Arc::new(ScriptedClient::new());
    let svc = service(Arc::new(fs.clone()), Arc::clone(&client));

    let err = svc
        .run(&DockerizeRequest::new("/work/shop", "/work/shop"))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(client.call_count(), 0);
    assert_eq!(read(&fs, "/work/shop/Dockerfile").unwrap(), "FROM old\n");
}

#[test]
fn test_output_path_must_not_be_a_file() {
    let client = Arc::new(ScriptedClient::new());
    let svc = service(Arc::new(node_project()), Arc::clone(&client));

    let err = svc
        .run(&DockerizeRequest::new("/work/shop", "/work/shop/index.js"))
        .unwrap_err();

    assert!(matches!(
        err,
        DockgenError::Application(ApplicationError::InvalidRequest(_))
    ));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(client.call_count(), 0);
}

#[test]
fn test_force_overwrites() {
    let fs = node_project().with_file("/work/shop/Dockerfile", "FROM old\n");
    let svc = service(Arc::new(fs.clone()), Arc::new(ScriptedClient::new()));

    let mut request = DockerizeRequest::new("/work/shop", "/work/shop");
    request.force = true;
    svc.run(&request).unwrap();

    assert_eq!(read(&fs, "/work/shop/Dockerfile").unwrap(), GOOD_DOCKERFILE);
    let scratch: Vec<_> = fs
        .paths()
        .into_iter()
        .filter(|p| p.to_string_lossy().contains(".dockgen-"))
        .collect();
    assert!(scratch.is_empty(), "leftover scratch files: {scratch:?}");
}

#[test]
fn test_dry_run_writes_nothing() {
    let fs = node_project();
    let svc = service(Arc::new(fs.clone()), Arc::new(ScriptedClient::new()));

    let mut request = DockerizeRequest::new("/work/shop", "/out");
    request.dry_run = true;
    request.readme = true;
    let outcome = svc.run(&request).unwrap();

    assert!(outcome.written.is_empty());
    assert_eq!(outcome.artifacts.len(), 3);
    assert!(files_under(&fs, "/out").is_empty());
}

#[test]
fn test_rate_limit_is_retried_then_succeeds() {
    let client = Arc::new(ScriptedClient::new());
    *client.rate_limits_left.lock().unwrap() = 2;
    let svc = service(Arc::new(node_project()), Arc::clone(&client));

    let mut request = DockerizeRequest::new("/work/shop", "/out");
    request.dry_run = true;
    svc.run(&request).unwrap();

    // two rejected calls plus one per artifact
    assert_eq!(client.call_count(), 4);
}

#[test]
fn test_rate_limit_exhaustion_writes_nothing() {
    let fs = node_project();
    let client = Arc::new(ScriptedClient::new());
    *client.rate_limits_left.lock().unwrap() = 10;
    let svc = service(Arc::new(fs.clone()), Arc::clone(&client));

    let err = svc
        .run(&DockerizeRequest::new("/work/shop", "/out"))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Service);
    assert!(matches!(
        err,
        DockgenError::Application(ApplicationError::ServiceFailed { attempts: 3, .. })
    ));
    assert_eq!(client.call_count(), 3);
    assert!(files_under(&fs, "/out").is_empty());
}

#[test]
fn test_failed_write_leaves_no_files() {
    let fs = node_project();
    let disk = BrokenDisk::new(fs.clone(), Fault::Write("docker-compose.yml"));
    let svc = service(Arc::new(disk), Arc::new(ScriptedClient::new()));

    let err = svc
        .run(&DockerizeRequest::new("/work/shop", "/out"))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Internal);
    assert!(
        files_under(&fs, "/out").is_empty(),
        "nothing may remain: {:?}",
        files_under(&fs, "/out")
    );
}

#[test]
fn test_failed_forced_write_keeps_previous_files() {
    let fs = node_project()
        .with_file("/work/shop/Dockerfile", "FROM old\n")
        .with_file("/work/shop/docker-compose.yml", "services: {}\n");
    let disk = BrokenDisk::new(fs.clone(), Fault::Write("docker-compose.yml"));
    let svc = service(Arc::new(disk), Arc::new(ScriptedClient::new()));

    let mut request = DockerizeRequest::new("/work/shop", "/work/shop");
    request.force = true;
    svc.run(&request).unwrap_err();

    assert_eq!(read(&fs, "/work/shop/Dockerfile").unwrap(), "FROM old\n");
    assert_eq!(read(&fs, "/work/shop/docker-compose.yml").unwrap(), "services: {}\n");
}

#[test]
fn test_failed_replace_restores_previous_files() {
    let fs = MemoryFilesystem::new()
        .with_file("/work/shop/package.json", r#"{"name":"shop"}"#)
        .with_file("/out/Dockerfile", "FROM old\n")
        .with_file("/out/docker-compose.yml", "services: {}\n");
    let disk = BrokenDisk::new(fs.clone(), Fault::RenameOnto("/out/docker-compose.yml"));
    let svc = service(Arc::new(disk), Arc::new(ScriptedClient::new()));

    let mut request = DockerizeRequest::new("/work/shop", "/out");
    request.force = true;
    let err = svc.run(&request).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Internal);
    assert_eq!(read(&fs, "/out/Dockerfile").unwrap(), "FROM old\n");
    assert_eq!(read(&fs, "/out/docker-compose.yml").unwrap(), "services: {}\n");
    assert_eq!(
        files_under(&fs, "/out"),
        vec![
            PathBuf::from("/out/Dockerfile"),
            PathBuf::from("/out/docker-compose.yml"),
        ]
    );
}

#[test]
fn test_findings_are_reported_not_fatal() {
    let fs = node_project();
    let mut client = ScriptedClient::new();
    client.dockerfile = "FROM node\nADD . /app\nENV API_KEY=abc123\n".to_string();
    let svc = service(Arc::new(fs.clone()), Arc::new(client));

    let outcome = svc
        .run(&DockerizeRequest::new("/work/shop", "/out"))
        .unwrap();

    let report = &outcome.reports[0];
    assert_eq!(
        report.outcome("dockerfile.pinned-base-image").unwrap().status,
        RuleStatus::Fail
    );
    assert_eq!(
        report.outcome("dockerfile.no-hardcoded-secrets").unwrap().status,
        RuleStatus::Fail
    );
    assert_eq!(report.worst_failure(), Some(Severity::Error));
    assert!(read(&fs, "/out/Dockerfile").is_some());
}
