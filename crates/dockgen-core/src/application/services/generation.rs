//! Generation Service - the retrying wrapper around [`GenerationClient`].

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{GenerationClient, GenerationError},
    },
    domain::{GenerationRequest, normalize_response},
    error::DockgenResult,
};

/// Exponential backoff settings for rate-limited or timed-out calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first call, so at most `max_retries + 1` calls.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// Doubles from `initial_backoff`; a server hint replaces the computed
    /// value. Either way the result never exceeds `max_backoff`.
    pub fn backoff(&self, retry: u32, hint: Option<Duration>) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        let computed = self.initial_backoff.saturating_mul(factor);
        hint.unwrap_or(computed).min(self.max_backoff)
    }
}

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

pub struct GenerationService {
    client: Arc<dyn GenerationClient>,
    policy: RetryPolicy,
    sleep: Sleeper,
}

impl GenerationService {
    pub fn new(client: Arc<dyn GenerationClient>, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace the blocking sleep, e.g. to record delays in tests.
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate one artifact, retrying rate limits and timeouts.
    ///
    /// The returned text is normalised (code fence stripped, single trailing
    /// newline). An empty answer is treated as an invalid response.
    #[instrument(skip_all, fields(artifact = %request.artifact, component = ?request.component))]
    pub fn generate(&self, request: &GenerationRequest) -> DockgenResult<String> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(attempt, "Calling generation service");

            let error = match self.client.generate(request) {
                Ok(raw) => {
                    let text = normalize_response(&raw);
                    if !text.trim().is_empty() {
                        info!(attempt, bytes = text.len(), "Artifact generated");
                        return Ok(text);
                    }
                    GenerationError::InvalidResponse {
                        message: "empty completion".into(),
                    }
                }
                Err(e) => e,
            };

            if !error.is_retryable() || attempt > self.policy.max_retries {
                warn!(attempt, error = %error, "Generation failed");
                return Err(ApplicationError::ServiceFailed {
                    attempts: attempt,
                    error,
                }
                .into());
            }

            let delay = self.policy.backoff(attempt, error.retry_after());
            warn!(
                attempt,
                error = %error,
                delay_ms = delay.as_millis() as u64,
                "Retryable generation error, backing off"
            );
            (self.sleep)(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockGenerationClient;
    use crate::domain::ArtifactKind;
    use crate::error::{DockgenError, ErrorCategory};
    use std::sync::Mutex;

    fn request() -> GenerationRequest {
        GenerationRequest {
            artifact: ArtifactKind::Dockerfile,
            component: Some("api".into()),
            system: "system".into(),
            user: "user".into(),
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
        }
    }

    fn service(mock: MockGenerationClient, max_retries: u32) -> (GenerationService, Arc<Mutex<Vec<Duration>>>) {
        let delays = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&delays);
        let svc = GenerationService::new(Arc::new(mock), policy(max_retries))
            .with_sleeper(move |d| recorded.lock().unwrap().push(d));
        (svc, delays)
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy(5);
        assert_eq!(p.backoff(1, None), Duration::from_millis(100));
        assert_eq!(p.backoff(2, None), Duration::from_millis(200));
        assert_eq!(p.backoff(3, None), Duration::from_millis(250));
        assert_eq!(
            p.backoff(1, Some(Duration::from_secs(60))),
            Duration::from_millis(250)
        );
        assert_eq!(p.max_attempts(), 6);
    }

    #[test]
    fn success_is_normalised() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Ok("```dockerfile\nFROM node:20\n```".into()));

        let (svc, delays) = service(mock, 3);
        assert_eq!(svc.generate(&request()).unwrap(), "FROM node:20\n");
        assert!(delays.lock().unwrap().is_empty());
    }

    #[test]
    fn rate_limit_retries_exactly_max_retries_times() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(4)
            .returning(|_| Err(GenerationError::RateLimited { retry_after: None }));

        let (svc, delays) = service(mock, 3);
        let err = svc.generate(&request()).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Service);
        assert!(matches!(
            err,
            DockgenError::Application(ApplicationError::ServiceFailed { attempts: 4, .. })
        ));
        assert_eq!(
            *delays.lock().unwrap(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(250)
            ]
        );
    }

    #[test]
    fn retry_after_hint_is_used() {
        let mut mock = MockGenerationClient::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(GenerationError::RateLimited {
                    retry_after: Some(Duration::from_millis(150)),
                })
            });
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("FROM a:1".into()));

        let (svc, delays) = service(mock, 3);
        assert_eq!(svc.generate(&request()).unwrap(), "FROM a:1\n");
        assert_eq!(*delays.lock().unwrap(), vec![Duration::from_millis(150)]);
    }

    #[test]
    fn authentication_is_not_retried() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(GenerationError::Authentication { status: 401 }));

        let (svc, _) = service(mock, 3);
        let err = svc.generate(&request()).unwrap_err();
        assert!(matches!(
            err,
            DockgenError::Application(ApplicationError::ServiceFailed { attempts: 1, .. })
        ));
    }

    #[test]
    fn timeout_is_retried() {
        let mut mock = MockGenerationClient::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(GenerationError::Timeout {
                    message: "deadline".into(),
                })
            });
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("services: {}".into()));

        let (svc, _) = service(mock, 1);
        assert_eq!(svc.generate(&request()).unwrap(), "services: {}\n");
    }

    #[test]
    fn empty_answer_is_invalid_response() {
        let mut mock = MockGenerationClient::new();
        mock.expect_generate().times(1).returning(|_| Ok("```\n```".into()));

        let (svc, _) = service(mock, 3);
        let err = svc.generate(&request()).unwrap_err();
        assert!(matches!(
            err,
            DockgenError::Application(ApplicationError::ServiceFailed {
                error: GenerationError::InvalidResponse { .. },
                ..
            })
        ));
    }
}
