//! Job application models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::lenient_list;

/// Body of `POST /jobApplication/apply`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: String,
}

/// Job data embedded in an application at fetch time
///
/// This is a denormalized copy, every field may be missing and none of it is
/// guaranteed to match the live posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub company_logo_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub package_per_annum: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

/// One application of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "reference_id")]
    pub job_id: String,
    #[serde(default, deserialize_with = "reference_id")]
    pub user_id: String,
    #[serde(default, alias = "createdAt")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub job: Option<JobSnapshot>,
}

impl Application {
    /// The posting this application refers to, taken from the snapshot when
    /// the reference itself was not sent
    pub fn job_ref(&self) -> Option<&str> {
        if !self.job_id.is_empty() {
            return Some(&self.job_id);
        }
        self.job.as_ref().and_then(|job| job.id.as_deref())
    }

    pub fn title(&self) -> &str {
        self.job
            .as_ref()
            .and_then(|job| job.title.as_deref())
            .unwrap_or("Job Title Not Available")
    }
}

/// `{applications: [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub applications: Vec<Application>,
}

/// References arrive either as a bare id or as a populated document
fn reference_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reference {
        Id(String),
        Document {
            #[serde(rename = "_id", alias = "id")]
            id: String,
        },
    }

    Ok(match Option::<Reference>::deserialize(deserializer)? {
        Some(Reference::Id(id)) | Some(Reference::Document { id }) => id,
        None => String::new(),
    })
}
