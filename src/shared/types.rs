use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

/// A single problem attached to one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<FieldError>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

/// Trim a submitted value and turn blank input into `None`.
///
/// HTML forms send empty strings for untouched inputs, so every optional
/// field goes through here before validation.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Deserialize a checkbox-like flag from either a JSON bool or a form value
/// (`on`, `true`, `1`, `yes`).
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        ),
        None => false,
    })
}

/// A numeric input that may arrive as a JSON number, a numeric string, or an empty form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(Decimal),
    Text(String),
}

impl NumberInput {
    /// `None` for blank input, an error naming `field` for anything non-numeric
    pub fn into_decimal(self, field: &str) -> Result<Option<Decimal>, FieldError> {
        match self {
            NumberInput::Number(n) => Ok(Some(n)),
            NumberInput::Text(text) if text.trim().is_empty() => Ok(None),
            NumberInput::Text(text) => text.trim().parse::<Decimal>().map(Some).map_err(|_| {
                FieldError::new(
                    field,
                    format!("{} must be a number", crate::shared::validation::label(field)),
                )
            }),
        }
    }
}

/// Decimal value of an optional numeric input
pub fn optional_decimal(
    input: Option<NumberInput>,
    field: &str,
) -> Result<Option<Decimal>, FieldError> {
    match input {
        Some(input) => input.into_decimal(field),
        None => Ok(None),
    }
}
