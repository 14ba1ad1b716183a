use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::catalog::models::{
    CatalogItem, CreateCatalogItem, ItemCategory, UpdateCatalogItem,
};
use crate::features::reports::dtos::ReportResponseDto;
use crate::shared::constants::MAX_ITEM_VALUE;
use crate::shared::types::{non_empty, optional_decimal, FieldError, NumberInput};
use crate::shared::validation::{field_errors, parse_date};

/// Request DTO for creating a catalog item (JSON body or the create-item form)
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCatalogItemDto {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Item name is required (at most 200 characters)"))]
    pub name: String,

    #[serde(default)]
    pub category: String,

    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,

    #[serde(default, skip_serializing)]
    #[schema(value_type = Option<String>)]
    pub value: Option<NumberInput>,
}

/// Request DTO for updating a catalog item. The name is the key and cannot change.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCatalogItemDto {
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,

    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub value: Option<NumberInput>,
}

/// Fields shared by create and update, parsed after trimming
struct ParsedFields {
    category: Option<ItemCategory>,
    date: Option<NaiveDate>,
    value: Option<Decimal>,
}

fn parse_shared(
    category: &str,
    date: &str,
    value: Option<NumberInput>,
    errors: &mut Vec<FieldError>,
) -> ParsedFields {
    let category = if category.trim().is_empty() {
        errors.push(FieldError::new("category", "Category is required"));
        None
    } else {
        match category.parse::<ItemCategory>() {
            Ok(c) => Some(c),
            Err(msg) => {
                errors.push(FieldError::new("category", msg));
                None
            }
        }
    };

    let date = if date.trim().is_empty() {
        errors.push(FieldError::new("date", "Date is required"));
        None
    } else {
        match parse_date("date", date) {
            Ok(d) => Some(d),
            Err(e) => {
                errors.push(e);
                None
            }
        }
    };

    let value = match optional_decimal(value, "value") {
        Ok(Some(v)) if v.is_sign_negative() => {
            errors.push(FieldError::new("value", "Value must not be negative"));
            None
        }
        Ok(Some(v)) if v.round_dp(2) != v => {
            errors.push(FieldError::new("value", "Value can have at most 2 decimal places"));
            None
        }
        Ok(Some(v)) if v > MAX_ITEM_VALUE => {
            errors.push(FieldError::new(
                "value",
                format!("Value must be at most {}", MAX_ITEM_VALUE),
            ));
            None
        }
        Ok(v) => v,
        Err(e) => {
            errors.push(e);
            None
        }
    };

    ParsedFields {
        category,
        date,
        value,
    }
}

fn finish(mut errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Err(AppError::InvalidFields(errors))
    }
}

impl CreateCatalogItemDto {
    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            date: self.date.trim().to_string(),
            description: self.description.trim().to_string(),
            color: non_empty(self.color.clone()),
            brand: non_empty(self.brand.clone()),
            value: self.value.clone(),
        }
    }

    /// Validate every field at once and produce the insert data
    pub fn into_create(self, created_by: Option<Uuid>) -> Result<CreateCatalogItem, AppError> {
        let dto = self.trimmed();
        let mut errors = match dto.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };
        let parsed = parse_shared(&dto.category, &dto.date, dto.value, &mut errors);
        finish(errors)?;

        match (parsed.category, parsed.date) {
            (Some(category), Some(date)) => Ok(CreateCatalogItem {
                name: dto.name,
                category,
                date,
                description: dto.description,
                color: dto.color,
                brand: dto.brand,
                value: parsed.value,
                created_by,
            }),
            _ => Err(AppError::Validation("Category and date are required".to_string())),
        }
    }
}

impl UpdateCatalogItemDto {
    pub fn into_update(self) -> Result<UpdateCatalogItem, AppError> {
        let dto = Self {
            category: self.category.trim().to_string(),
            date: self.date.trim().to_string(),
            description: self.description.trim().to_string(),
            color: non_empty(self.color),
            brand: non_empty(self.brand),
            value: self.value,
        };
        let mut errors = match dto.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };
        let parsed = parse_shared(&dto.category, &dto.date, dto.value, &mut errors);
        finish(errors)?;

        match (parsed.category, parsed.date) {
            (Some(category), Some(date)) => Ok(UpdateCatalogItem {
                category,
                date,
                description: dto.description,
                color: dto.color,
                brand: dto.brand,
                value: parsed.value,
            }),
            _ => Err(AppError::Validation("Category and date are required".to_string())),
        }
    }
}

/// Response DTO for a catalog item
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogItemResponseDto {
    pub name: String,
    pub category: ItemCategory,
    pub icon: String,
    pub date: NaiveDate,
    pub description: String,
    pub color: Option<String>,
    pub brand: Option<String>,
    #[schema(value_type = Option<String>)]
    pub value: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogItem> for CatalogItemResponseDto {
    fn from(item: CatalogItem) -> Self {
        Self {
            icon: item.category.icon().to_string(),
            name: item.name,
            category: item.category,
            date: item.date,
            description: item.description,
            color: item.color,
            brand: item.brand,
            value: item.value,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// A catalog item together with every report that references it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogItemDetailDto {
    pub item: CatalogItemResponseDto,
    pub reports: Vec<ReportResponseDto>,
}
