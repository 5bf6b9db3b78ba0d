use std::sync::Arc;

use anyhow::Context;
use reqwest::{multipart, Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ParsedResume, ResumeId, WizardStep},
    error::ApiErrorBody,
    protocol::{
        CoverLetterRequest, CoverLetterResponse, GenerationHistoryResponse, ImproveResumeRequest,
        ImproveResumeResponse, ResumeRecordResponse, UploadResumeResponse,
    },
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use url::Url;

pub mod export;

#[cfg(test)]
mod tests;

const UPLOAD_FALLBACK_ERROR: &str = "Error uploading resume";
const IMPROVE_FALLBACK_ERROR: &str = "Error improving resume";
const COVER_LETTER_FALLBACK_ERROR: &str = "Error generating cover letter";
const FETCH_RESUME_FALLBACK_ERROR: &str = "Error retrieving resume";
const FETCH_HISTORY_FALLBACK_ERROR: &str = "Error retrieving AI responses";
const MISSING_COVER_LETTER_FIELDS: &str =
    "Please fill in job title and company name for cover letter generation";
/// Sent in place of an empty job description on cover-letter requests; the
/// backend requires the field.
const DEFAULT_JOB_DESCRIPTION: &str = "No specific job description provided";

/// A file the user picked for upload. `None` at the call site means no
/// file was selected, which the wizard treats as a no-op.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// User-entered targeting information. Freely editable between actions;
/// `job_title` and `company_name` become mandatory only when generating a
/// cover letter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobContext {
    pub job_title: String,
    pub job_description: String,
    pub company_name: String,
}

/// Read-only view of the wizard at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardSnapshot {
    pub step: WizardStep,
    pub resume_id: Option<ResumeId>,
    pub parsed: Option<ParsedResume>,
    pub job: JobContext,
    pub improved_resume: String,
    pub cover_letter: String,
    pub is_loading: bool,
    pub error_message: String,
}

#[derive(Debug, Default)]
struct WizardState {
    step: WizardStep,
    resume_id: Option<ResumeId>,
    parsed: Option<ParsedResume>,
    job: JobContext,
    improved_resume: String,
    cover_letter: String,
    is_loading: bool,
    error_message: String,
    /// Bumped by `reset()`. A response carrying an older generation is
    /// discarded instead of repopulating the fresh session.
    generation: u64,
}

impl WizardState {
    fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            step: self.step,
            resume_id: self.resume_id.clone(),
            parsed: self.parsed.clone(),
            job: self.job.clone(),
            improved_resume: self.improved_resume.clone(),
            cover_letter: self.cover_letter.clone(),
            is_loading: self.is_loading,
            error_message: self.error_message.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum WizardEvent {
    StepChanged(WizardStep),
    ResumeParsed { resume_id: ResumeId },
    ResumeImproved,
    CoverLetterGenerated,
    Error(String),
}

#[derive(Debug, Error)]
pub enum WizardError {
    /// A network operation failed; the message is what the wizard shows
    /// the user (backend `detail` when present, a fixed fallback
    /// otherwise).
    #[error("{0}")]
    Backend(String),
    /// Client-side validation rejected the action before any network
    /// attempt.
    #[error("{0}")]
    MissingFields(String),
    /// The response arrived for a session that was reset while the
    /// request was in flight; state was left untouched.
    #[error("response discarded: session was reset while request was in flight")]
    Stale,
}

enum RequestFailure {
    /// The backend answered with a non-success status.
    Api {
        status: StatusCode,
        detail: Option<String>,
    },
    /// The request never produced a decodable backend response.
    Transport(reqwest::Error),
}

impl RequestFailure {
    fn into_user_message(self, fallback: &str) -> String {
        match self {
            RequestFailure::Api {
                detail: Some(detail),
                ..
            } => detail,
            RequestFailure::Api {
                status,
                detail: None,
            } => {
                warn!(status = status.as_u16(), "backend error without detail body");
                fallback.to_string()
            }
            RequestFailure::Transport(err) => {
                warn!("request failed without a backend response: {err}");
                fallback.to_string()
            }
        }
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RequestFailure> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .map(|body| body.detail);
        return Err(RequestFailure::Api { status, detail });
    }
    response.json::<T>().await.map_err(RequestFailure::Transport)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The step-wizard workflow controller. Owns every piece of mutable
/// client state and sequences the three backend operations; one request
/// is outstanding at a time because callers serialize actions while
/// `is_loading` is set.
pub struct WizardClient {
    http: Client,
    server_url: String,
    inner: Mutex<WizardState>,
    events: broadcast::Sender<WizardEvent>,
}

impl WizardClient {
    pub fn new(server_url: impl AsRef<str>) -> anyhow::Result<Arc<Self>> {
        let server_url = server_url.as_ref().trim_end_matches('/').to_string();
        Url::parse(&server_url)
            .with_context(|| format!("invalid backend server URL: {server_url}"))?;
        let (events, _) = broadcast::channel(64);
        Ok(Arc::new(Self {
            http: Client::new(),
            server_url,
            inner: Mutex::new(WizardState::default()),
            events,
        }))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn set_job_title(&self, value: impl Into<String>) {
        self.inner.lock().await.job.job_title = value.into();
    }

    pub async fn set_job_description(&self, value: impl Into<String>) {
        self.inner.lock().await.job.job_description = value.into();
    }

    pub async fn set_company_name(&self, value: impl Into<String>) {
        self.inner.lock().await.job.company_name = value.into();
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{path}", self.server_url)
    }

    /// Uploads the résumé and, on success, advances the wizard to the
    /// review step. A `None` file is a no-op, not an error.
    pub async fn upload_resume(&self, file: Option<ResumeFile>) -> Result<(), WizardError> {
        let Some(file) = file else {
            info!("wizard: upload skipped, no file selected");
            return Ok(());
        };

        let generation = {
            let mut state = self.inner.lock().await;
            state.is_loading = true;
            state.error_message.clear();
            state.generation
        };

        info!(
            filename = %file.filename,
            size_bytes = file.bytes.len(),
            "wizard: uploading resume"
        );

        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(file.bytes).file_name(file.filename),
        );
        let outcome = async {
            let response = self
                .http
                .post(self.endpoint("/resume/upload"))
                .multipart(form)
                .send()
                .await
                .map_err(RequestFailure::Transport)?;
            decode_response::<UploadResumeResponse>(response).await
        }
        .await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            warn!("wizard: discarding upload response for a reset session");
            return Err(WizardError::Stale);
        }
        state.is_loading = false;
        match outcome {
            Ok(body) => {
                info!(resume_id = %body.resume_id, "wizard: resume uploaded and parsed");
                state.resume_id = Some(body.resume_id.clone());
                state.parsed = Some(body.parsed_data);
                state.step = WizardStep::Review;
                drop(state);
                let _ = self.events.send(WizardEvent::ResumeParsed {
                    resume_id: body.resume_id,
                });
                let _ = self.events.send(WizardEvent::StepChanged(WizardStep::Review));
                Ok(())
            }
            Err(failure) => Err(self.record_failure(&mut state, failure, UPLOAD_FALLBACK_ERROR)),
        }
    }

    /// Requests the AI-improved résumé for the current session and, on
    /// success, advances the wizard to the results step. Without an
    /// uploaded résumé this is a no-op. Empty job fields are normalized
    /// to `null` on the wire, never sent as empty strings.
    pub async fn improve_resume(&self) -> Result<(), WizardError> {
        let (generation, request) = {
            let mut state = self.inner.lock().await;
            let Some(resume_id) = state.resume_id.clone() else {
                info!("wizard: improve skipped, no resume uploaded yet");
                return Ok(());
            };
            state.is_loading = true;
            state.error_message.clear();
            (
                state.generation,
                ImproveResumeRequest {
                    resume_id,
                    job_title: non_empty(&state.job.job_title),
                    job_description: non_empty(&state.job.job_description),
                },
            )
        };

        info!(
            resume_id = %request.resume_id,
            tailored = request.job_title.is_some(),
            "wizard: requesting improved resume"
        );

        let outcome = async {
            let response = self
                .http
                .post(self.endpoint("/resume/improve"))
                .json(&request)
                .send()
                .await
                .map_err(RequestFailure::Transport)?;
            decode_response::<ImproveResumeResponse>(response).await
        }
        .await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            warn!("wizard: discarding improve response for a reset session");
            return Err(WizardError::Stale);
        }
        state.is_loading = false;
        match outcome {
            Ok(body) => {
                info!(resume_id = %body.resume_id, "wizard: improved resume received");
                state.improved_resume = body.improved_resume;
                state.step = WizardStep::Results;
                drop(state);
                let _ = self.events.send(WizardEvent::ResumeImproved);
                let _ = self
                    .events
                    .send(WizardEvent::StepChanged(WizardStep::Results));
                Ok(())
            }
            Err(failure) => Err(self.record_failure(&mut state, failure, IMPROVE_FALLBACK_ERROR)),
        }
    }

    /// Generates a cover letter for the current session. Validates that a
    /// résumé was uploaded and that job title and company name are filled
    /// in before any network attempt; the wizard step never changes here.
    pub async fn generate_cover_letter(&self) -> Result<(), WizardError> {
        let (generation, request) = {
            let mut state = self.inner.lock().await;
            let resume_id = match state.resume_id.clone() {
                Some(id) if !state.job.job_title.is_empty() && !state.job.company_name.is_empty() => {
                    id
                }
                _ => {
                    state.error_message = MISSING_COVER_LETTER_FIELDS.to_string();
                    drop(state);
                    let _ = self
                        .events
                        .send(WizardEvent::Error(MISSING_COVER_LETTER_FIELDS.to_string()));
                    return Err(WizardError::MissingFields(
                        MISSING_COVER_LETTER_FIELDS.to_string(),
                    ));
                }
            };
            state.is_loading = true;
            state.error_message.clear();
            let job_description = if state.job.job_description.is_empty() {
                DEFAULT_JOB_DESCRIPTION.to_string()
            } else {
                state.job.job_description.clone()
            };
            (
                state.generation,
                CoverLetterRequest {
                    resume_id,
                    job_title: state.job.job_title.clone(),
                    job_description,
                    company_name: state.job.company_name.clone(),
                },
            )
        };

        info!(
            resume_id = %request.resume_id,
            company = %request.company_name,
            "wizard: requesting cover letter"
        );

        let outcome = async {
            let response = self
                .http
                .post(self.endpoint("/cover-letter/generate"))
                .json(&request)
                .send()
                .await
                .map_err(RequestFailure::Transport)?;
            decode_response::<CoverLetterResponse>(response).await
        }
        .await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            warn!("wizard: discarding cover letter response for a reset session");
            return Err(WizardError::Stale);
        }
        state.is_loading = false;
        match outcome {
            Ok(body) => {
                info!(resume_id = %body.resume_id, "wizard: cover letter received");
                state.cover_letter = body.cover_letter;
                drop(state);
                let _ = self.events.send(WizardEvent::CoverLetterGenerated);
                Ok(())
            }
            Err(failure) => {
                Err(self.record_failure(&mut state, failure, COVER_LETTER_FALLBACK_ERROR))
            }
        }
    }

    /// Restores every field to its initial value and returns the wizard
    /// to the upload step. Does not abort an in-flight request; bumping
    /// the generation makes a late response inert instead.
    pub async fn reset(&self) {
        {
            let mut state = self.inner.lock().await;
            let generation = state.generation + 1;
            *state = WizardState {
                generation,
                ..WizardState::default()
            };
        }
        info!("wizard: session reset");
        let _ = self.events.send(WizardEvent::StepChanged(WizardStep::Upload));
    }

    /// Fetches the stored record for a previously uploaded résumé. Pure
    /// read; wizard state is not touched.
    pub async fn fetch_resume(
        &self,
        resume_id: &ResumeId,
    ) -> Result<ResumeRecordResponse, WizardError> {
        self.get_json(
            &format!("/resume/{resume_id}"),
            FETCH_RESUME_FALLBACK_ERROR,
        )
        .await
    }

    /// Fetches prior AI outputs generated for a résumé. Pure read; wizard
    /// state is not touched.
    pub async fn fetch_generation_history(
        &self,
        resume_id: &ResumeId,
    ) -> Result<GenerationHistoryResponse, WizardError> {
        self.get_json(
            &format!("/ai-responses/{resume_id}"),
            FETCH_HISTORY_FALLBACK_ERROR,
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, WizardError> {
        let outcome = async {
            let response = self
                .http
                .get(self.endpoint(path))
                .send()
                .await
                .map_err(RequestFailure::Transport)?;
            decode_response::<T>(response).await
        }
        .await;
        outcome.map_err(|failure| WizardError::Backend(failure.into_user_message(fallback)))
    }

    fn record_failure(
        &self,
        state: &mut WizardState,
        failure: RequestFailure,
        fallback: &str,
    ) -> WizardError {
        let message = failure.into_user_message(fallback);
        state.error_message = message.clone();
        let _ = self.events.send(WizardEvent::Error(message.clone()));
        WizardError::Backend(message)
    }
}
