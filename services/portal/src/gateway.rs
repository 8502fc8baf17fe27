//! API gateway: the only place that knows how operations map to HTTP
//!
//! Every other component goes through [`Gateway`]. Calls are single round
//! trips: no retries and no caching.

use std::sync::Arc;

use auth::SessionStore;
use auth::models::{AccountKind, LoginCredentials, SignupRequest, TokenResponse};
use common::config::ClientConfig;
use reqwest::{Client, Method, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::models::{
    Application, ApplicationList, ApplyRequest, JobDetails, JobEnvelope, JobFields, JobList,
    JobPosting, Profile,
};

/// Every operation the remote API offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    UserSignup,
    UserSignin,
    AdminSignup,
    AdminSignin,
    GetProfile,
    UpdateProfile,
    ListJobs,
    JobDetails { job_id: String },
    ApplyToJob,
    ListApplications,
    WithdrawApplication { application_id: String },
    AdminListJobs,
    AdminCreateJob,
    AdminGetJob { job_id: String },
    AdminUpdateJob { job_id: String },
    AdminDeleteJob { job_id: String },
}

impl Operation {
    pub fn signup(kind: AccountKind) -> Self {
        match kind {
            AccountKind::User => Operation::UserSignup,
            AccountKind::Admin => Operation::AdminSignup,
        }
    }

    pub fn signin(kind: AccountKind) -> Self {
        match kind {
            AccountKind::User => Operation::UserSignin,
            AccountKind::Admin => Operation::AdminSignin,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::UserSignup => "user_signup",
            Operation::UserSignin => "user_signin",
            Operation::AdminSignup => "admin_signup",
            Operation::AdminSignin => "admin_signin",
            Operation::GetProfile => "get_profile",
            Operation::UpdateProfile => "update_profile",
            Operation::ListJobs => "list_jobs",
            Operation::JobDetails { .. } => "job_details",
            Operation::ApplyToJob => "apply_to_job",
            Operation::ListApplications => "list_applications",
            Operation::WithdrawApplication { .. } => "withdraw_application",
            Operation::AdminListJobs => "admin_list_jobs",
            Operation::AdminCreateJob => "admin_create_job",
            Operation::AdminGetJob { .. } => "admin_get_job",
            Operation::AdminUpdateJob { .. } => "admin_update_job",
            Operation::AdminDeleteJob { .. } => "admin_delete_job",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::UserSignup
            | Operation::UserSignin
            | Operation::AdminSignup
            | Operation::AdminSignin
            | Operation::ApplyToJob
            | Operation::AdminCreateJob => Method::POST,
            Operation::UpdateProfile | Operation::AdminUpdateJob { .. } => Method::PUT,
            Operation::WithdrawApplication { .. } | Operation::AdminDeleteJob { .. } => {
                Method::DELETE
            }
            Operation::GetProfile
            | Operation::ListJobs
            | Operation::JobDetails { .. }
            | Operation::ListApplications
            | Operation::AdminListJobs
            | Operation::AdminGetJob { .. } => Method::GET,
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Operation::UserSignup
                | Operation::UserSignin
                | Operation::AdminSignup
                | Operation::AdminSignin
        )
    }

    /// Path segments relative to the base URL; ids are single segments
    fn segments(&self) -> Vec<&str> {
        match self {
            Operation::UserSignup => vec!["user", "signup"],
            Operation::UserSignin => vec!["user", "signin"],
            Operation::AdminSignup => vec!["admin", "signup"],
            Operation::AdminSignin => vec!["admin", "signin"],
            Operation::GetProfile | Operation::UpdateProfile => vec!["user", "profile"],
            Operation::ListJobs => vec!["user", "jobs"],
            Operation::JobDetails { job_id } => vec!["user", "jobs", job_id.as_str()],
            Operation::ApplyToJob => vec!["jobApplication", "apply"],
            Operation::ListApplications => vec!["jobApplication", ""],
            Operation::WithdrawApplication { application_id } => {
                vec!["jobApplication", application_id.as_str()]
            }
            Operation::AdminListJobs | Operation::AdminCreateJob => vec!["admin", "jobs"],
            Operation::AdminGetJob { job_id } => vec!["admin", "job", job_id.as_str()],
            Operation::AdminUpdateJob { job_id } | Operation::AdminDeleteJob { job_id } => {
                vec!["admin", "jobs", job_id.as_str()]
            }
        }
    }

    /// Path as documented, for logs
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }
}

/// HTTP client bound to one base URL and the session store
#[derive(Clone)]
pub struct Gateway {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl Gateway {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ClientError::RequestFailed)?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    fn url_for(&self, operation: &Operation) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(operation.segments());
        Ok(url)
    }

    /// Perform one operation and decode its JSON answer
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        operation: Operation,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let url = self.url_for(&operation)?;
        let mut request = self.http.request(operation.method(), url);

        if operation.requires_auth() {
            let token = self.session.token().ok_or_else(|| {
                warn!("{} needs a session but none is active", operation.name());
                ClientError::AuthRequired
            })?;
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!(
            "Sending {} ({} {})",
            operation.name(),
            operation.method(),
            operation.path()
        );

        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("{} could not reach the server: {}", operation.name(), e);
                ClientError::RequestFailed(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(ClientError::RequestFailed)?;

        if !status.is_success() {
            let message = error_message(&text);
            warn!(
                "{} rejected with {}: {}",
                operation.name(),
                status,
                message.as_deref().unwrap_or("<no message>")
            );
            return Err(ClientError::RequestRejected {
                status: status.as_u16(),
                message,
            });
        }

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                ClientError::InvalidResponse(format!("{} returned malformed JSON: {}", operation.name(), e))
            })?
        };

        serde_json::from_value(value).map_err(|e| {
            ClientError::InvalidResponse(format!("{} returned an unexpected shape: {}", operation.name(), e))
        })
    }

    async fn invoke_with<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: Operation,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body).map_err(|e| {
            ClientError::InvalidResponse(format!("could not encode {} body: {}", operation.name(), e))
        })?;
        self.invoke(operation, Some(body)).await
    }

    pub async fn sign_up(&self, kind: AccountKind, request: &SignupRequest) -> ClientResult<()> {
        let _: Value = self.invoke_with(Operation::signup(kind), request).await?;
        Ok(())
    }

    pub async fn sign_in(
        &self,
        kind: AccountKind,
        credentials: &LoginCredentials,
    ) -> ClientResult<TokenResponse> {
        self.invoke_with(Operation::signin(kind), credentials).await
    }

    pub async fn get_profile(&self) -> ClientResult<Profile> {
        self.invoke(Operation::GetProfile, None).await
    }

    pub async fn update_profile(&self, profile: &Profile) -> ClientResult<Profile> {
        self.invoke_with(Operation::UpdateProfile, profile).await
    }

    pub async fn list_jobs(&self) -> ClientResult<Vec<JobPosting>> {
        let list: JobList = self.invoke(Operation::ListJobs, None).await?;
        Ok(list.jobs)
    }

    pub async fn job_details(&self, job_id: &str) -> ClientResult<JobDetails> {
        self.invoke(
            Operation::JobDetails {
                job_id: job_id.to_string(),
            },
            None,
        )
        .await
    }

    pub async fn apply(&self, job_id: &str) -> ClientResult<()> {
        let request = ApplyRequest {
            job_id: job_id.to_string(),
        };
        let _: Value = self.invoke_with(Operation::ApplyToJob, &request).await?;
        Ok(())
    }

    pub async fn list_applications(&self) -> ClientResult<Vec<Application>> {
        let list: ApplicationList = self.invoke(Operation::ListApplications, None).await?;
        Ok(list.applications)
    }

    pub async fn withdraw_application(&self, application_id: &str) -> ClientResult<()> {
        let _: Value = self
            .invoke(
                Operation::WithdrawApplication {
                    application_id: application_id.to_string(),
                },
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn admin_list_jobs(&self) -> ClientResult<Vec<JobPosting>> {
        let list: JobList = self.invoke(Operation::AdminListJobs, None).await?;
        Ok(list.jobs)
    }

    pub async fn admin_create_job(&self, fields: &JobFields) -> ClientResult<()> {
        let _: Value = self.invoke_with(Operation::AdminCreateJob, fields).await?;
        Ok(())
    }

    pub async fn admin_get_job(&self, job_id: &str) -> ClientResult<JobPosting> {
        let envelope: JobEnvelope = self
            .invoke(
                Operation::AdminGetJob {
                    job_id: job_id.to_string(),
                },
                None,
            )
            .await?;
        Ok(envelope.job)
    }

    pub async fn admin_update_job(&self, job_id: &str, fields: &JobFields) -> ClientResult<()> {
        let operation = Operation::AdminUpdateJob {
            job_id: job_id.to_string(),
        };
        let _: Value = self.invoke_with(operation, fields).await?;
        Ok(())
    }

    pub async fn admin_delete_job(&self, job_id: &str) -> ClientResult<()> {
        let _: Value = self
            .invoke(
                Operation::AdminDeleteJob {
                    job_id: job_id.to_string(),
                },
                None,
            )
            .await?;
        Ok(())
    }
}

/// Pull `message` (or `error`) out of an error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
