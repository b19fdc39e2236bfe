//! Spinner feedback while the generation service is working.
//!
//! [`SpinnerClient`] decorates any [`GenerationClient`] so every call shows
//! an `indicatif` spinner on stderr. Disabled spinners cost nothing.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use dockgen_core::{
    application::ports::{GenerationClient, GenerationError},
    domain::GenerationRequest,
};

pub struct SpinnerClient {
    inner: Arc<dyn GenerationClient>,
    enabled: bool,
}

impl SpinnerClient {
    pub fn new(inner: Arc<dyn GenerationClient>, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    fn spinner(&self, request: &GenerationRequest) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");
        pb.set_style(style);
        pb.set_message(spinner_message(request));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

impl GenerationClient for SpinnerClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let pb = self.spinner(request);
        let result = self.inner.generate(request);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        result
    }
}

fn spinner_message(request: &GenerationRequest) -> String {
    match &request.component {
        Some(component) => format!("Generating {} for {component}...", request.artifact),
        None => format!("Generating {}...", request.artifact),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockgen_core::domain::ArtifactKind;

    struct Echo;

    impl GenerationClient for Echo {
        fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(request.user.clone())
        }
    }

    fn request(component: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            artifact: ArtifactKind::Dockerfile,
            component: component.map(str::to_owned),
            system: String::new(),
            user: "FROM a:1".into(),
        }
    }

    #[test]
    fn passes_results_through() {
        let client = SpinnerClient::new(Arc::new(Echo), false);
        assert_eq!(client.generate(&request(None)).unwrap(), "FROM a:1");
    }

    #[test]
    fn message_names_component() {
        assert_eq!(
            spinner_message(&request(Some("api"))),
            "Generating Dockerfile for api..."
        );
        assert_eq!(spinner_message(&request(None)), "Generating Dockerfile...");
    }
}
