use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Item category enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "item_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Electronics,
    Jewelry,
    Clothing,
    Documents,
    Keys,
    Books,
    Bags,
    Watches,
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 9] = [
        ItemCategory::Electronics,
        ItemCategory::Jewelry,
        ItemCategory::Clothing,
        ItemCategory::Documents,
        ItemCategory::Keys,
        ItemCategory::Books,
        ItemCategory::Bags,
        ItemCategory::Watches,
        ItemCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "electronics",
            ItemCategory::Jewelry => "jewelry",
            ItemCategory::Clothing => "clothing",
            ItemCategory::Documents => "documents",
            ItemCategory::Keys => "keys",
            ItemCategory::Books => "books",
            ItemCategory::Bags => "bags",
            ItemCategory::Watches => "watches",
            ItemCategory::Other => "other",
        }
    }

    /// FontAwesome class shown next to items of this category
    pub fn icon(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "fas fa-laptop",
            ItemCategory::Jewelry => "fas fa-gem",
            ItemCategory::Clothing => "fas fa-tshirt",
            ItemCategory::Documents => "fas fa-file-alt",
            ItemCategory::Keys => "fas fa-key",
            ItemCategory::Books => "fas fa-book",
            ItemCategory::Bags => "fas fa-briefcase",
            ItemCategory::Watches => "fas fa-clock",
            ItemCategory::Other => "fas fa-question-circle",
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ItemCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category '{}'", s.trim()))
    }
}

/// Database model for a catalog item; `name` is the primary key
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogItem {
    pub name: String,
    pub category: ItemCategory,
    pub date: NaiveDate,
    pub description: String,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub value: Option<Decimal>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog item with the number of reports pointing at it
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogItemSummary {
    pub name: String,
    pub category: ItemCategory,
    pub date: NaiveDate,
    pub report_count: i64,
}

/// Validated data for creating a catalog item
#[derive(Debug, Clone)]
pub struct CreateCatalogItem {
    pub name: String,
    pub category: ItemCategory,
    pub date: NaiveDate,
    pub description: String,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub value: Option<Decimal>,
    pub created_by: Option<Uuid>,
}

/// Validated data for updating the non-key fields of a catalog item
#[derive(Debug, Clone)]
pub struct UpdateCatalogItem {
    pub category: ItemCategory,
    pub date: NaiveDate,
    pub description: String,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub value: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Keys".parse::<ItemCategory>(), Ok(ItemCategory::Keys));
        assert_eq!(" other ".parse::<ItemCategory>(), Ok(ItemCategory::Other));
        assert!("umbrellas".parse::<ItemCategory>().is_err());
    }

    #[test]
    fn test_every_category_round_trips_through_its_name() {
        for category in ItemCategory::ALL {
            assert_eq!(category.as_str().parse::<ItemCategory>(), Ok(category));
            assert!(category.icon().starts_with("fas fa-"));
        }
    }

    #[test]
    fn test_serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&ItemCategory::Electronics).unwrap(),
            "\"electronics\""
        );
    }
}
