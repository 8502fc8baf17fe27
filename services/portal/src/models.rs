//! Payloads exchanged with the job portal API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub mod application;
pub mod job;
pub mod profile;

pub use application::{Application, ApplicationList, ApplyRequest, JobSnapshot};
pub use job::{EmploymentType, JobDetails, JobEnvelope, JobFields, JobList, JobPosting};
pub use profile::Profile;

/// Decode a list entry by entry, dropping the ones that do not fit
///
/// One malformed posting must not hide the rest of the collection.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = items.len();

    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Skipping malformed list entry: {}", e);
                None
            }
        })
        .collect();

    if decoded.len() < total {
        warn!("Kept {} of {} list entries", decoded.len(), total);
    }
    Ok(decoded)
}

/// `null` reads as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
