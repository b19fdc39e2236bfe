//! Shared fixtures for the binary tests: a stub chat-completions server and
//! a `dockgen` command with a hermetic environment.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use assert_cmd::Command;

pub const API_KEY_VAR: &str = "DOCKGEN_TEST_API_KEY";

pub const GOOD_DOCKERFILE: &str = "\
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

pub const GOOD_COMPOSE: &str = "\
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

/// How the stub answers every request.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Reply with an artifact matching the prompt.
    Artifacts,
    /// Always reply with this status and `Retry-After: 0`.
    Status(u16),
}

/// A chat-completions endpoint on an ephemeral localhost port.
pub struct StubServer {
    port: u16,
    requests: Arc<AtomicUsize>,
}

impl StubServer {
    pub fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = serve(stream, script);
            }
        });

        Self { port, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/v1", self.port)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn serve(stream: TcpStream, script: Script) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    let body = String::from_utf8_lossy(&body);

    let (status, extra, payload) = match script {
        Script::Status(code) => (
            code,
            "Retry-After: 0\r\n",
            serde_json::json!({"error": {"message": "slow down"}}).to_string(),
        ),
        Script::Artifacts => (200, "", completion(reply_for(&body))),
    };

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{extra}Connection: close\r\n\r\n{payload}",
        payload.len()
    )?;
    stream.flush()
}

fn reply_for(body: &str) -> &'static str {
    if body.contains("Generate Docker README") {
        "# Running with Docker\n\n```sh\ndocker compose up\n```\n"
    } else if body.contains("Create a docker-compose.yml for") {
        GOOD_COMPOSE
    } else {
        GOOD_DOCKERFILE
    }
}

fn completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-stub",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// Minimal Node project: one manifest, one entry file.
pub fn node_project(root: &Path) {
    std::fs::write(
        root.join("package.json"),
        r#"{"name":"shop","main":"index.js","dependencies":{"express":"^4.18.0"}}"#,
    )
    .unwrap();
    std::fs::write(root.join("index.js"), "app.listen(3000);\n").unwrap();
}

/// `dockgen` with no user config, no log file, no proxies and fast retries.
///
/// `cwd` keeps a stray `.env` in the repository from leaking in.
pub fn dockgen(cwd: &Path, base_url: Option<&str>) -> Command {
    let mut cmd = Command::cargo_bin("dockgen").unwrap();
    cmd.current_dir(cwd)
        .env("DOCKGEN_LOGGING__FILE", "false")
        .env("DOCKGEN_GENERATION__API_KEY_ENV", API_KEY_VAR)
        .env("DOCKGEN_RETRY__INITIAL_BACKOFF_MS", "1")
        .env("DOCKGEN_RETRY__MAX_BACKOFF_MS", "5")
        .env("NO_PROXY", "127.0.0.1,localhost")
        .env("XDG_CONFIG_HOME", cwd.join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove(API_KEY_VAR)
        .env_remove("RUST_LOG");
    for var in ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY", "http_proxy", "https_proxy", "all_proxy"] {
        cmd.env_remove(var);
    }
    if let Some(url) = base_url {
        cmd.env("DOCKGEN_GENERATION__BASE_URL", url);
    }
    cmd
}
