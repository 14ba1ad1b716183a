use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::error::AppError;
use crate::features::catalog::models::ItemCategory;
use crate::features::reports::models::ReportStatus;
use crate::shared::types::{non_empty, FieldError};
use crate::shared::validation::parse_date;

/// Fixed set of result orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum SortKey {
    #[default]
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "date-asc")]
    DateAsc,
    #[serde(rename = "name-asc")]
    NameAsc,
    #[serde(rename = "name-desc")]
    NameDesc,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "status")]
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::Category,
        SortKey::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::Category => "category",
            SortKey::Status => "status",
        }
    }

    /// Unknown or missing keys fall back to newest first
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .and_then(|v| SortKey::ALL.into_iter().find(|k| k.as_str() == v))
            .unwrap_or_default()
    }

    /// ORDER BY clause; every ordering ends on the id so equal keys stay stable
    pub fn order_clause(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "r.date DESC, r.id DESC",
            SortKey::DateAsc => "r.date ASC, r.id ASC",
            SortKey::NameAsc => "r.item_name ASC, r.id ASC",
            SortKey::NameDesc => "r.item_name DESC, r.id DESC",
            SortKey::Category => "r.category::text ASC, r.id ASC",
            SortKey::Status => "r.status::text ASC, r.id ASC",
        }
    }
}

/// Raw query string of `/search` and `/api/search`
#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQueryDto {
    /// Free text matched against item name, description and location
    pub q: Option<String>,
    pub category: Option<String>,
    /// `lost` or `found`
    pub status: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    pub date_from: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    pub date_to: Option<String>,
    /// Substring of the location
    pub location: Option<String>,
    /// date-desc, date-asc, name-asc, name-desc, category or status
    pub sort: Option<String>,
}

/// Typed search filters. Absent fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchFilters {
    pub term: Option<String>,
    pub category: Option<ItemCategory>,
    pub status: Option<ReportStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub location: Option<String>,
    pub sort: SortKey,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.term.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.location.is_none()
    }
}

impl TryFrom<SearchQueryDto> for SearchFilters {
    type Error = AppError;

    fn try_from(query: SearchQueryDto) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let category = non_empty(query.category).and_then(|c| {
            c.parse::<ItemCategory>()
                .map_err(|msg| errors.push(FieldError::new("category", msg)))
                .ok()
        });
        let status = non_empty(query.status).and_then(|s| {
            s.parse::<ReportStatus>()
                .map_err(|msg| errors.push(FieldError::new("status", msg)))
                .ok()
        });
        let date_from = non_empty(query.date_from)
            .and_then(|d| parse_date("date_from", &d).map_err(|e| errors.push(e)).ok());
        let date_to = non_empty(query.date_to)
            .and_then(|d| parse_date("date_to", &d).map_err(|e| errors.push(e)).ok());

        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                errors.push(FieldError::new(
                    "date_from",
                    "Date from must not be after date to",
                ));
            }
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        Ok(SearchFilters {
            term: non_empty(query.q),
            category,
            status,
            date_from,
            date_to,
            location: non_empty(query.location),
            sort: SortKey::parse_or_default(query.sort.as_deref()),
        })
    }
}
