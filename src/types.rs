use image::RgbImage;
use serde::Deserialize;
use std::fmt;

/// Status message for a completed try-on.
pub const MSG_SUCCESS: &str = "Success";
/// Status message when an input image is missing.
pub const MSG_EMPTY_IMAGE: &str = "Empty image";
/// Status message for overload and timeouts.
pub const MSG_BUSY: &str = "Too many users, please try again later";
/// Status message for a non-200 response.
pub const MSG_URL_ERROR: &str = "URL error, please contact the admin";
/// Status message when the synchronous endpoint reports a non-success status.
pub const MSG_TRY_AGAIN: &str = "Try again later";
/// Status message for unexpected failures on the synchronous endpoint.
pub const MSG_ERROR: &str = "Error, please contact the admin";

/// Opaque identifier of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Success,
    Error,
    /// Anything else, kept verbatim.
    Pending(String),
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "success" => JobStatus::Success,
            "error" => JobStatus::Error,
            other => JobStatus::Pending(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Success => f.write_str("success"),
            JobStatus::Error => f.write_str("error"),
            JobStatus::Pending(raw) => f.write_str(raw),
        }
    }
}

/// `{"result": {"status": ..., "result": ...}}`, the shape of every service
/// response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServiceEnvelope {
    pub result: ServiceResult,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServiceResult {
    pub status: String,
    /// Job id on submission, base64 image on completion.
    #[serde(default)]
    pub result: Option<String>,
}

impl ServiceResult {
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from(self.status.as_str())
    }

    /// The `result` field, if present and non-empty.
    pub fn payload(&self) -> Option<&str> {
        self.result.as_deref().filter(|s| !s.is_empty())
    }
}

/// Result of a single status query.
#[derive(Debug, Clone)]
pub enum PollAttempt {
    /// The job finished and its image decoded.
    Completed(RgbImage),
    /// The service reported `"error"` for the job.
    Rejected,
    /// The job is still running.
    Pending(String),
    /// The query returned a non-200 status.
    HttpStatus(u16),
    /// The query timed out.
    TimedOut,
    /// Transport failure, unparsable body, or an undecodable image.
    Failed(String),
}

/// How a polling run ended.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Completed(RgbImage),
    /// The service rejected the job; polling stopped early.
    Rejected,
    /// The attempt budget ran out. `message` is the last recorded status.
    Exhausted { message: String },
}

/// Final result handed back to the caller.
#[derive(Debug, Clone)]
pub struct TryonOutcome {
    pub image: Option<RgbImage>,
    /// `None` only when the request never got as far as choosing a seed.
    pub seed_used: Option<u32>,
    pub message: String,
}

impl TryonOutcome {
    /// Outcome for a call with a missing person or garment image.
    pub fn empty_input() -> Self {
        Self {
            image: None,
            seed_used: None,
            message: MSG_EMPTY_IMAGE.to_string(),
        }
    }

    pub(crate) fn new(image: Option<RgbImage>, seed: u32, message: impl Into<String>) -> Self {
        Self {
            image,
            seed_used: Some(seed),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_parsing() {
        assert_eq!(JobStatus::from("success"), JobStatus::Success);
        assert_eq!(JobStatus::from("error"), JobStatus::Error);
        assert_eq!(
            JobStatus::from("running"),
            JobStatus::Pending("running".into())
        );
        assert_eq!(JobStatus::from("Success"), JobStatus::Pending("Success".into()));
    }

    #[test]
    fn test_parse_submit_response() {
        let env: ServiceEnvelope =
            serde_json::from_str(r#"{"result": {"status": "success", "result": "job-123"}}"#)
                .unwrap();
        assert_eq!(env.result.job_status(), JobStatus::Success);
        assert_eq!(env.result.payload(), Some("job-123"));
    }

    #[test]
    fn test_parse_response_without_payload() {
        let env: ServiceEnvelope =
            serde_json::from_str(r#"{"result": {"status": "running"}}"#).unwrap();
        assert_eq!(env.result.job_status(), JobStatus::Pending("running".into()));
        assert_eq!(env.result.payload(), None);
    }

    #[test]
    fn test_empty_payload_is_none() {
        let env: ServiceEnvelope =
            serde_json::from_str(r#"{"result": {"status": "success", "result": ""}}"#).unwrap();
        assert_eq!(env.result.payload(), None);
    }

    #[test]
    fn test_missing_result_object_fails() {
        let parsed = serde_json::from_str::<ServiceEnvelope>(r#"{"status": "success"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_empty_input_outcome() {
        let outcome = TryonOutcome::empty_input();
        assert!(outcome.image.is_none());
        assert!(outcome.seed_used.is_none());
        assert_eq!(outcome.message, "Empty image");
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_job_handle_display() {
        let job = JobHandle::new("abc-123");
        assert_eq!(job.to_string(), "abc-123");
        assert_eq!(job.as_str(), "abc-123");
    }
}
