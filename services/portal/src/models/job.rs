//! Job posting models

use serde::{Deserialize, Serialize};

use super::{lenient_list, null_as_default};
use std::fmt;
use std::str::FromStr;

/// Kind of employment a posting offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full Time", alias = "FULLTIME", alias = "FullTime")]
    FullTime,
    #[serde(rename = "Part Time", alias = "PARTTIME", alias = "PartTime")]
    PartTime,
    #[serde(alias = "FREELANCE")]
    Freelance,
    #[serde(alias = "INTERNSHIP")]
    Internship,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 4] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Freelance,
        EmploymentType::Internship,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full Time",
            EmploymentType::PartTime => "Part Time",
            EmploymentType::Freelance => "Freelance",
            EmploymentType::Internship => "Internship",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmploymentType {
    type Err = String;

    /// Accepts the wire labels and loose spellings such as `full-time`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "fulltime" => Ok(EmploymentType::FullTime),
            "parttime" => Ok(EmploymentType::PartTime),
            "freelance" => Ok(EmploymentType::Freelance),
            "internship" => Ok(EmploymentType::Internship),
            _ => Err(format!(
                "Employment type must be one of: {}",
                EmploymentType::ALL.map(|t| t.label()).join(", ")
            )),
        }
    }
}

/// A posting as the API returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default)]
    pub company_logo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    pub employment_type: EmploymentType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub package_per_annum: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_description: String,
    #[serde(default, alias = "adminId", alias = "createdBy")]
    pub owner_admin_id: Option<String>,
}

/// Validated create/update body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFields {
    pub title: String,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo_url: Option<String>,
    pub location: String,
    pub employment_type: EmploymentType,
    pub package_per_annum: String,
    pub job_description: String,
}

/// `{jobs: [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct JobList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub jobs: Vec<JobPosting>,
}

/// `{job, hasApplied}` from the user-facing details endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub job: JobPosting,
    #[serde(default)]
    pub has_applied: bool,
}

/// `{job}` from the admin endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct JobEnvelope {
    pub job: JobPosting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_employment_type_wire_labels() {
        assert_eq!(
            serde_json::to_value(EmploymentType::FullTime).unwrap(),
            json!("Full Time")
        );
        assert_eq!(
            serde_json::from_value::<EmploymentType>(json!("INTERNSHIP")).unwrap(),
            EmploymentType::Internship
        );
    }

    #[test]
    fn test_employment_type_loose_parsing() {
        assert_eq!("full-time".parse::<EmploymentType>(), Ok(EmploymentType::FullTime));
        assert_eq!("Part Time".parse::<EmploymentType>(), Ok(EmploymentType::PartTime));
        assert_eq!("freelance".parse::<EmploymentType>(), Ok(EmploymentType::Freelance));
        assert!("contract".parse::<EmploymentType>().is_err());
    }

    #[test]
    fn test_posting_from_backend_shape() {
        let posting: JobPosting = serde_json::from_value(json!({
            "_id": "65f1",
            "title": "Senior Developer",
            "rating": 4.2,
            "companyLogoUrl": "https://cdn.example.com/logo.png",
            "location": "Pune",
            "employmentType": "Full Time",
            "packagePerAnnum": "12 - 18 LPA",
            "jobDescription": "Build things",
            "adminId": "a1",
            "__v": 0
        }))
        .unwrap();

        assert_eq!(posting.id, "65f1");
        assert_eq!(posting.employment_type, EmploymentType::FullTime);
        assert_eq!(posting.owner_admin_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_malformed_posting_skipped_not_fatal() {
        let list: JobList = serde_json::from_value(json!({
            "jobs": [
                {"_id": "1", "title": "Kept", "employmentType": "Full Time", "packagePerAnnum": "9 LPA"},
                {"_id": "2", "title": "Odd type", "employmentType": "Contract"},
                {"_id": "3", "title": "Nulls", "employmentType": "Freelance", "rating": null, "location": null},
                {"title": "No id", "employmentType": "Internship"}
            ]
        }))
        .unwrap();

        let ids: Vec<_> = list.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(list.jobs[1].rating, 0.0);
        assert_eq!(list.jobs[1].location, "");
    }

    #[test]
    fn test_missing_or_null_list_is_empty() {
        let list: JobList = serde_json::from_value(json!({})).unwrap();
        assert!(list.jobs.is_empty());
        let list: JobList = serde_json::from_value(json!({"jobs": null})).unwrap();
        assert!(list.jobs.is_empty());
    }

    #[test]
    fn test_fields_omit_missing_logo() {
        let fields = JobFields {
            title: "Intern".to_string(),
            rating: 3.0,
            company_logo_url: None,
            location: "Remote".to_string(),
            employment_type: EmploymentType::Internship,
            package_per_annum: "2 LPA".to_string(),
            job_description: "Learn".to_string(),
        };
        let body = serde_json::to_value(&fields).unwrap();
        assert_eq!(body["employmentType"], "Internship");
        assert_eq!(body["packagePerAnnum"], "2 LPA");
        assert!(body.get("companyLogoUrl").is_none());
    }
}
