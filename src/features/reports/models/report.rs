use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::catalog::models::ItemCategory;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Lost,
    Found,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Lost => "lost",
            ReportStatus::Found => "found",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" => Ok(ReportStatus::Lost),
            "found" => Ok(ReportStatus::Found),
            other => Err(format!("Status must be 'lost' or 'found', got '{}'", other)),
        }
    }
}

/// Database model for a lost/found report
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: i64,
    pub item_name: String,
    pub category: ItemCategory,
    pub status: ReportStatus,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub contact: String,
    pub phone: Option<String>,
    pub student_id: Option<String>,
    pub program: Option<String>,
    pub department: Option<String>,
    pub reported_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Personal fields, shaped by whether the item was lost or found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDetails {
    /// The owner reports; their student id is required
    Lost {
        student_id: String,
        phone: Option<String>,
    },
    /// The finder reports; a phone number to reach them is required
    Found {
        phone: String,
        student_id: Option<String>,
    },
}

impl ReportDetails {
    pub fn status(&self) -> ReportStatus {
        match self {
            ReportDetails::Lost { .. } => ReportStatus::Lost,
            ReportDetails::Found { .. } => ReportStatus::Found,
        }
    }

    /// `(phone, student_id)` as stored
    pub fn contact_columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            ReportDetails::Lost { student_id, phone } => {
                (phone.as_deref(), Some(student_id.as_str()))
            }
            ReportDetails::Found { phone, student_id } => {
                (Some(phone.as_str()), student_id.as_deref())
            }
        }
    }
}

/// A validated report submission. The category is not part of it; it is copied
/// from the catalog item at insert time.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub item_name: String,
    pub details: ReportDetails,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub contact: String,
    pub program: Option<String>,
    pub department: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("LOST".parse::<ReportStatus>(), Ok(ReportStatus::Lost));
        assert_eq!("found".parse::<ReportStatus>(), Ok(ReportStatus::Found));
        assert!("stolen".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn test_details_columns() {
        let lost = ReportDetails::Lost {
            student_id: "21-001".into(),
            phone: None,
        };
        assert_eq!(lost.status(), ReportStatus::Lost);
        assert_eq!(lost.contact_columns(), (None, Some("21-001")));

        let found = ReportDetails::Found {
            phone: "01700000000".into(),
            student_id: None,
        };
        assert_eq!(found.status(), ReportStatus::Found);
        assert_eq!(found.contact_columns(), (Some("01700000000"), None));
    }
}
