use image::RgbImage;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use std::future::Future;
use std::time::Instant;

use crate::codec;
use crate::config::{PollSchedule, TryonConfig};
use crate::error::{Result, TryonError};
use crate::request::{resolve_seed, TryonRequest};
use crate::types::*;

/// Bodies longer than this are cut before logging.
const LOG_BODY_LIMIT: usize = 200;

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(LOG_BODY_LIMIT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// A timeout after the connection was established. Connect timeouts are
/// ordinary transport failures.
fn is_read_timeout(err: &reqwest::Error) -> bool {
    err.is_timeout() && !err.is_connect()
}

enum ReadError {
    Timeout,
    Other(String),
}

/// Read a response body as a [`ServiceEnvelope`].
async fn read_envelope(resp: Response) -> std::result::Result<ServiceEnvelope, ReadError> {
    let text = resp.text().await.map_err(|e| {
        if is_read_timeout(&e) {
            ReadError::Timeout
        } else {
            ReadError::Other(e.to_string())
        }
    })?;
    serde_json::from_str(&text)
        .map_err(|e| ReadError::Other(format!("{} (body: {})", e, truncate(&text))))
}

/// Drive the fixed polling schedule.
///
/// `query` is called at most `schedule.max_attempts` times. The loop stops on
/// [`PollAttempt::Completed`] or [`PollAttempt::Rejected`]; every other
/// attempt is recorded and polling continues after `schedule.retry_delay`.
pub(crate) async fn poll_job<F, Fut>(schedule: &PollSchedule, mut query: F) -> PollOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PollAttempt>,
{
    let mut message = MSG_BUSY.to_string();

    for attempt in 1..=schedule.max_attempts {
        match query(attempt).await {
            PollAttempt::Completed(image) => return PollOutcome::Completed(image),
            PollAttempt::Rejected => return PollOutcome::Rejected,
            PollAttempt::Pending(status) => {
                log::debug!("attempt {}: job still {}", attempt, status);
            }
            PollAttempt::HttpStatus(code) => {
                log::warn!("attempt {}: query returned HTTP {}", attempt, code);
                message = MSG_URL_ERROR.to_string();
            }
            PollAttempt::TimedOut => {
                log::warn!("attempt {}: query timed out", attempt);
                message = MSG_BUSY.to_string();
            }
            PollAttempt::Failed(err) => {
                log::warn!("attempt {}: {}", attempt, err);
            }
        }

        if attempt < schedule.max_attempts {
            tokio::time::sleep(schedule.retry_delay).await;
        }
    }

    PollOutcome::Exhausted { message }
}

/// Async client for the remote try-on service.
///
/// Offers two flows: [`try_on`](Self::try_on) submits a job and polls for
/// the result, [`start_try_on`](Self::start_try_on) calls the synchronous
/// endpoint once. Both return a [`TryonOutcome`] for every expected service
/// behaviour and reserve `Err` for fatal conditions.
///
/// # Example
/// ```no_run
/// use tryon_client::{TryonClient, TryonConfig};
/// use tryon_client::codec::load_image;
/// use std::path::Path;
///
/// # async fn example() -> tryon_client::Result<()> {
/// let client = TryonClient::new(TryonConfig::from_env()?)?;
/// let person = load_image(Path::new("person.jpg"))?;
/// let garment = load_image(Path::new("garment.jpg"))?;
///
/// let outcome = client.try_on(Some(&person), Some(&garment), 0, true).await?;
/// println!("{} (seed {:?})", outcome.message, outcome.seed_used);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TryonClient {
    http: Client,
    base_url: String,
    headers: HeaderMap,
    schedule: PollSchedule,
}

impl TryonClient {
    /// Create a client from a loaded configuration.
    ///
    /// Fails if a credential cannot be used as a header value.
    pub fn new(config: TryonConfig) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: config.base_url(),
            headers: config.credentials.header_map()?,
            schedule: config.schedule,
        })
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the base URL all endpoints are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeouts and polling schedule in use.
    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    fn submit_url(&self) -> String {
        format!("{}Submit", self.base_url)
    }

    fn query_url(&self) -> String {
        format!("{}Query", self.base_url)
    }

    // ── Submit and poll ─────────────────────────────────────────────

    /// Submit a job and poll until it completes, fails, or the attempt
    /// budget runs out.
    ///
    /// Returns `Ok` with an "Empty image" outcome, and makes no request, when
    /// either image is missing. Returns [`TryonError::Busy`] when the
    /// submission fails or the service rejects the job while polling.
    pub async fn try_on(
        &self,
        person: Option<&RgbImage>,
        garment: Option<&RgbImage>,
        seed: u32,
        randomize_seed: bool,
    ) -> Result<TryonOutcome> {
        let (Some(person), Some(garment)) = (person, garment) else {
            return Ok(TryonOutcome::empty_input());
        };

        let seed = resolve_seed(seed, randomize_seed)?;
        let request = TryonRequest::new(person, garment, seed)?;

        let post_start = Instant::now();
        let job = self.submit(&request).await?;
        log::info!("post time used: {:?}", post_start.elapsed());

        let get_start = Instant::now();
        tokio::time::sleep(self.schedule.initial_delay).await;
        let outcome = poll_job(&self.schedule, |_| self.query(&job)).await;
        log::info!("get time used: {:?}", get_start.elapsed());

        match outcome {
            PollOutcome::Completed(image) => Ok(TryonOutcome::new(Some(image), seed, MSG_SUCCESS)),
            PollOutcome::Rejected => Err(TryonError::busy(format!(
                "service reported an error for job {}",
                job
            ))),
            PollOutcome::Exhausted { message } => Ok(TryonOutcome::new(None, seed, message)),
        }
    }

    /// POST a job to the submission endpoint and return its handle.
    ///
    /// Every failure maps to [`TryonError::Busy`]; the POST is not retried.
    pub async fn submit(&self, request: &TryonRequest) -> Result<JobHandle> {
        let resp = self
            .http
            .post(self.submit_url())
            .headers(self.headers.clone())
            .timeout(self.schedule.submit_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("submission failed: {}", e);
                TryonError::busy(format!("submission request failed: {}", e))
            })?;

        let status = resp.status();
        log::info!("post response code {}", status.as_u16());
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("submission body: {}", truncate(&body));
            return Err(TryonError::busy(format!(
                "submission returned HTTP {}",
                status.as_u16()
            )));
        }

        let envelope = read_envelope(resp).await.map_err(|e| match e {
            ReadError::Timeout => TryonError::busy("submission response timed out"),
            ReadError::Other(msg) => {
                log::error!("unreadable submission response: {}", msg);
                TryonError::busy(format!("unreadable submission response: {}", msg))
            }
        })?;

        match (envelope.result.job_status(), envelope.result.payload()) {
            (JobStatus::Success, Some(id)) => {
                log::debug!("submitted job {}", id);
                Ok(JobHandle::new(id))
            }
            (JobStatus::Success, None) => Err(TryonError::busy("submission response has no job id")),
            (status, _) => Err(TryonError::busy(format!(
                "submission status was {}",
                status
            ))),
        }
    }

    /// Query a job's status once. Never fails; the outcome is classified
    /// into a [`PollAttempt`].
    pub async fn query(&self, job: &JobHandle) -> PollAttempt {
        let resp = match self
            .http
            .get(self.query_url())
            .query(&[("taskId", job.as_str())])
            .headers(self.headers.clone())
            .timeout(self.schedule.query_timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if is_read_timeout(&e) => return PollAttempt::TimedOut,
            Err(e) => return PollAttempt::Failed(format!("query request failed: {}", e)),
        };

        let status = resp.status();
        log::info!("get response code {}", status.as_u16());
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("query body: {}", truncate(&body));
            return PollAttempt::HttpStatus(status.as_u16());
        }

        let envelope = match read_envelope(resp).await {
            Ok(env) => env,
            Err(ReadError::Timeout) => return PollAttempt::TimedOut,
            Err(ReadError::Other(msg)) => {
                return PollAttempt::Failed(format!("unreadable query response: {}", msg))
            }
        };

        match envelope.result.job_status() {
            JobStatus::Success => match envelope.result.payload().map(codec::decode) {
                Some(Ok(image)) => PollAttempt::Completed(image),
                Some(Err(e)) => PollAttempt::Failed(format!("undecodable result image: {}", e)),
                None => PollAttempt::Failed("success response without an image".into()),
            },
            JobStatus::Error => PollAttempt::Rejected,
            JobStatus::Pending(raw) => PollAttempt::Pending(raw),
        }
    }

    // ── Submit and wait ─────────────────────────────────────────────

    /// Call the synchronous endpoint and read the result inline.
    ///
    /// Same input and seed rules as [`try_on`](Self::try_on). A timeout is
    /// fatal ([`TryonError::Busy`]); every other failure is reported through
    /// the outcome's message.
    pub async fn start_try_on(
        &self,
        person: Option<&RgbImage>,
        garment: Option<&RgbImage>,
        seed: u32,
        randomize_seed: bool,
    ) -> Result<TryonOutcome> {
        let (Some(person), Some(garment)) = (person, garment) else {
            return Ok(TryonOutcome::empty_input());
        };

        let seed = resolve_seed(seed, randomize_seed)?;
        let request = TryonRequest::new(person, garment, seed)?;

        let start = Instant::now();
        let result = self.call_sync(&request).await;
        log::info!("time used: {:?}", start.elapsed());

        let (image, message) = result?;
        Ok(TryonOutcome::new(image, seed, message))
    }

    async fn call_sync(&self, request: &TryonRequest) -> Result<(Option<RgbImage>, &'static str)> {
        let resp = match self
            .http
            .post(&self.base_url)
            .headers(self.headers.clone())
            .timeout(self.schedule.sync_timeout)
            .json(request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if is_read_timeout(&e) => {
                log::warn!("synchronous try-on timed out");
                return Err(TryonError::busy("synchronous request timed out"));
            }
            Err(e) => {
                log::error!("synchronous try-on failed: {}", e);
                return Ok((None, MSG_ERROR));
            }
        };

        let status = resp.status();
        log::info!("response code {}", status.as_u16());
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("response body: {}", truncate(&body));
            return Ok((None, MSG_URL_ERROR));
        }

        let envelope = match read_envelope(resp).await {
            Ok(env) => env,
            Err(ReadError::Timeout) => {
                log::warn!("synchronous try-on timed out reading the response");
                return Err(TryonError::busy("synchronous response timed out"));
            }
            Err(ReadError::Other(msg)) => {
                log::error!("unreadable response: {}", msg);
                return Ok((None, MSG_ERROR));
            }
        };

        match envelope.result.job_status() {
            JobStatus::Success => match envelope.result.payload().map(codec::decode) {
                Some(Ok(image)) => Ok((Some(image), MSG_SUCCESS)),
                Some(Err(e)) => {
                    log::error!("undecodable result image: {}", e);
                    Ok((None, MSG_ERROR))
                }
                None => {
                    log::error!("success response without an image");
                    Ok((None, MSG_ERROR))
                }
            },
            other => {
                log::info!("synchronous try-on status {}", other);
                Ok((None, MSG_TRY_AGAIN))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    fn fast_schedule() -> PollSchedule {
        PollSchedule::default()
            .with_initial_delay(Duration::ZERO)
            .with_retry_delay(Duration::ZERO)
    }

    /// Replays a fixed list of attempts and counts how many were consumed.
    struct Script {
        attempts: Mutex<VecDeque<PollAttempt>>,
        calls: Mutex<u32>,
    }

    impl Script {
        fn new(attempts: Vec<PollAttempt>) -> Self {
            Self {
                attempts: Mutex::new(attempts.into()),
                calls: Mutex::new(0),
            }
        }

        async fn next(&self) -> PollAttempt {
            *self.calls.lock().unwrap() += 1;
            self.attempts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| PollAttempt::Pending("running".into()))
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    fn pending() -> PollAttempt {
        PollAttempt::Pending("running".into())
    }

    #[tokio::test]
    async fn test_poll_stops_on_third_attempt_success() {
        let script = Script::new(vec![
            pending(),
            pending(),
            PollAttempt::Completed(RgbImage::new(3, 2)),
        ]);
        let outcome = poll_job(&fast_schedule(), |_| script.next()).await;
        assert!(matches!(outcome, PollOutcome::Completed(ref img) if img.dimensions() == (3, 2)));
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test]
    async fn test_poll_never_exceeds_budget() {
        let script = Script::new(vec![]);
        let outcome = poll_job(&fast_schedule(), |_| script.next()).await;
        match outcome {
            PollOutcome::Exhausted { message } => assert_eq!(message, MSG_BUSY),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(script.calls(), 10);
    }

    #[tokio::test]
    async fn test_poll_stops_immediately_on_rejection() {
        let script = Script::new(vec![pending(), PollAttempt::Rejected, pending()]);
        let outcome = poll_job(&fast_schedule(), |_| script.next()).await;
        assert!(matches!(outcome, PollOutcome::Rejected));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test]
    async fn test_poll_keeps_last_recorded_message() {
        let script = Script::new(vec![
            PollAttempt::TimedOut,
            PollAttempt::HttpStatus(502),
            PollAttempt::Failed("connection reset".into()),
            pending(),
        ]);
        let schedule = fast_schedule().with_max_attempts(4);
        let outcome = poll_job(&schedule, |_| script.next()).await;
        match outcome {
            PollOutcome::Exhausted { message } => assert_eq!(message, MSG_URL_ERROR),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test]
    async fn test_poll_timeout_overrides_url_error() {
        let script = Script::new(vec![PollAttempt::HttpStatus(500), PollAttempt::TimedOut]);
        let schedule = fast_schedule().with_max_attempts(2);
        match poll_job(&schedule, |_| script.next()).await {
            PollOutcome::Exhausted { message } => assert_eq!(message, MSG_BUSY),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_passes_attempt_numbers() {
        let seen = Mutex::new(Vec::new());
        let schedule = fast_schedule().with_max_attempts(3);
        poll_job(&schedule, |n| {
            seen.lock().unwrap().push(n);
            async { pending() }
        })
        .await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_poll_zero_budget_makes_no_queries() {
        let script = Script::new(vec![]);
        let schedule = fast_schedule().with_max_attempts(0);
        let outcome = poll_job(&schedule, |_| script.next()).await;
        assert!(matches!(outcome, PollOutcome::Exhausted { .. }));
        assert_eq!(script.calls(), 0);
    }

    #[test]
    fn test_truncate() {
        let long = "x".repeat(500);
        assert_eq!(truncate(&long).len(), LOG_BODY_LIMIT);
        assert_eq!(truncate("short"), "short");
        let wide = "é".repeat(300);
        assert_eq!(truncate(&wide).chars().count(), LOG_BODY_LIMIT);
    }

    #[test]
    fn test_endpoint_urls() {
        let config = TryonConfig::new("host:9000/api/", Credentials::new("t", "c", "r"));
        let client = TryonClient::new(config).unwrap();
        assert_eq!(client.base_url(), "http://host:9000/api/");
        assert_eq!(client.submit_url(), "http://host:9000/api/Submit");
        assert_eq!(client.query_url(), "http://host:9000/api/Query");
        assert_eq!(client.schedule(), &PollSchedule::default());
    }

    #[test]
    fn test_client_debug_hides_credentials() {
        let config = TryonConfig::new("host/", Credentials::new("hunter2-token", "sid=xyz", "r"));
        let client = TryonClient::new(config).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("hunter2-token"));
        assert!(!debug.contains("sid=xyz"));
    }
}
