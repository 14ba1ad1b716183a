use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::catalog::models::ItemCategory;
use crate::features::reports::models::{CreateReport, Report, ReportDetails, ReportStatus};
use crate::shared::types::{non_empty, FieldError};
use crate::shared::validation::{field_errors, parse_date};

/// Request DTO for a lost or found report (JSON body or the report form).
///
/// `form_type` selects which personal field is mandatory: a lost report needs the
/// owner's `student_id`, a found report needs the finder's `phone`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReportRequestDto {
    /// `lost` (default) or `found`
    #[serde(default, alias = "status")]
    pub form_type: String,

    /// Name of an existing catalog item
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Item name is required"))]
    pub item_name: String,

    /// `YYYY-MM-DD`, not in the future
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Location is required (at most 200 characters)"))]
    pub location: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 120, message = "Contact is required (at most 120 characters)"))]
    pub contact: String,

    #[serde(default)]
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "Student ID must be at most 50 characters"))]
    pub student_id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Program must be at most 100 characters"))]
    pub program: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,
}

impl ReportRequestDto {
    fn trimmed(&self) -> Self {
        Self {
            form_type: self.form_type.trim().to_ascii_lowercase(),
            item_name: self.item_name.trim().to_string(),
            date: self.date.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            contact: self.contact.trim().to_string(),
            phone: non_empty(self.phone.clone()),
            student_id: non_empty(self.student_id.clone()),
            program: non_empty(self.program.clone()),
            department: non_empty(self.department.clone()),
        }
    }

    pub fn into_create(self) -> Result<CreateReport, AppError> {
        self.into_create_as_of(Utc::now().date_naive())
    }

    /// Validate once against `today`. Every problem is reported in one error.
    pub fn into_create_as_of(self, today: NaiveDate) -> Result<CreateReport, AppError> {
        let dto = self.trimmed();
        let mut errors = match dto.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };

        let status = if dto.form_type.is_empty() {
            Some(ReportStatus::Lost)
        } else {
            match dto.form_type.parse::<ReportStatus>() {
                Ok(s) => Some(s),
                Err(msg) => {
                    errors.push(FieldError::new("form_type", msg));
                    None
                }
            }
        };

        let date = if dto.date.is_empty() {
            errors.push(FieldError::new("date", "Date is required"));
            None
        } else {
            match parse_date("date", &dto.date) {
                Ok(d) if d > today => {
                    errors.push(FieldError::new("date", "Date cannot be in the future"));
                    None
                }
                Ok(d) => Some(d),
                Err(e) => {
                    errors.push(e);
                    None
                }
            }
        };

        let details = match status {
            Some(ReportStatus::Lost) => match dto.student_id.clone() {
                Some(student_id) => Some(ReportDetails::Lost {
                    student_id,
                    phone: dto.phone.clone(),
                }),
                None => {
                    errors.push(FieldError::new(
                        "student_id",
                        "Student ID is required when reporting a lost item",
                    ));
                    None
                }
            },
            Some(ReportStatus::Found) => match dto.phone.clone() {
                Some(phone) => Some(ReportDetails::Found {
                    phone,
                    student_id: dto.student_id.clone(),
                }),
                None => {
                    errors.push(FieldError::new(
                        "phone",
                        "Phone is required when reporting a found item",
                    ));
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(AppError::InvalidFields(errors));
        }

        match (details, date) {
            (Some(details), Some(date)) => Ok(CreateReport {
                item_name: dto.item_name,
                details,
                date,
                location: dto.location,
                description: dto.description,
                contact: dto.contact,
                program: dto.program,
                department: dto.department,
            }),
            _ => Err(AppError::Validation("Report is incomplete".to_string())),
        }
    }
}

/// Response DTO for a report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: i64,
    pub item_name: String,
    pub category: ItemCategory,
    pub icon: String,
    pub status: ReportStatus,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub contact: String,
    pub phone: Option<String>,
    pub student_id: Option<String>,
    pub program: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(report: Report) -> Self {
        Self {
            icon: report.category.icon().to_string(),
            id: report.id,
            item_name: report.item_name,
            category: report.category,
            status: report.status,
            date: report.date,
            location: report.location,
            description: report.description,
            contact: report.contact,
            phone: report.phone,
            student_id: report.student_id,
            program: report.program,
            department: report.department,
            created_at: report.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn lost_umbrella() -> ReportRequestDto {
        ReportRequestDto {
            form_type: "lost".into(),
            item_name: "Black Umbrella".into(),
            date: "2024-03-01".into(),
            location: "Main Library".into(),
            description: "left near the entrance".into(),
            contact: "alice@x.com".into(),
            student_id: Some("21-001".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_lost_report_requires_student_id() {
        let report = lost_umbrella().into_create_as_of(today()).unwrap();
        assert_eq!(report.details.status(), ReportStatus::Lost);

        let dto = ReportRequestDto {
            student_id: Some("  ".into()),
            ..lost_umbrella()
        };
        let err = dto.into_create_as_of(today()).unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "student_id");
    }

    #[test]
    fn test_found_report_requires_phone() {
        let dto = ReportRequestDto {
            form_type: "found".into(),
            student_id: None,
            ..lost_umbrella()
        };
        let err = dto.clone().into_create_as_of(today()).unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "phone");

        let dto = ReportRequestDto {
            phone: Some("01700000000".into()),
            ..dto
        };
        let report = dto.into_create_as_of(today()).unwrap();
        assert_eq!(
            report.details,
            ReportDetails::Found {
                phone: "01700000000".into(),
                student_id: None
            }
        );
    }

    #[test]
    fn test_blank_form_type_means_lost() {
        let dto = ReportRequestDto {
            form_type: String::new(),
            ..lost_umbrella()
        };
        assert_eq!(
            dto.into_create_as_of(today()).unwrap().details.status(),
            ReportStatus::Lost
        );
    }

    #[test]
    fn test_malformed_and_future_dates_are_validation_errors() {
        let dto = ReportRequestDto {
            date: "yesterday".into(),
            ..lost_umbrella()
        };
        let err = dto.into_create_as_of(today()).unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let dto = ReportRequestDto {
            date: "2024-03-11".into(),
            ..lost_umbrella()
        };
        let err = dto.into_create_as_of(today()).unwrap_err();
        assert_eq!(
            err.field_errors().unwrap()[0].message,
            "Date cannot be in the future"
        );
    }

    #[test]
    fn test_unknown_form_type() {
        let dto = ReportRequestDto {
            form_type: "stolen".into(),
            ..lost_umbrella()
        };
        let err = dto.into_create_as_of(today()).unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "form_type");
    }
}
