use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::{Capability, Principal};
use crate::shared::types::deserialize_flag;
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for user registration (JSON body or the register form)
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[serde(default)]
    #[validate(
        length(min = 3, max = 80, message = "Username must be between 3 and 80 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may contain letters, digits, underscores and dots, and must not start with a digit")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(
        email(message = "Valid email address is required"),
        length(max = 120, message = "Email must be at most 120 characters")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default, rename = "confirmPassword", alias = "confirm_password")]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Request DTO for login. `username` accepts either the username or the email address.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[serde(default, alias = "username_or_email", alias = "email")]
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(
        default,
        rename = "rememberMe",
        alias = "remember_me",
        alias = "remember",
        deserialize_with = "deserialize_flag"
    )]
    pub remember_me: bool,
}

/// Signed-in account as returned by the JSON API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub capabilities: Vec<Capability>,
}

impl From<&Principal> for AuthUserDto {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            username: principal.username.clone(),
            email: principal.email.clone(),
            is_admin: principal.is_admin,
            capabilities: principal.capabilities().iter().collect(),
        }
    }
}

/// Response DTO for JSON login and registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    pub user: AuthUserDto,
    /// Where a browser client should go next
    pub redirect: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::field_errors;
    use fake::faker::internet::en::{Password, SafeEmail};
    use fake::Fake;

    fn valid() -> RegisterRequestDto {
        RegisterRequestDto {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_generated_credentials_validate() {
        for _ in 0..20 {
            let password: String = Password(6..30).fake();
            let dto = RegisterRequestDto {
                email: SafeEmail().fake(),
                confirm_password: password.clone(),
                password,
                ..valid()
            };
            assert!(dto.validate().is_ok(), "{:?}", dto);
        }
    }

    #[test]
    fn test_every_violation_is_reported() {
        let dto = RegisterRequestDto {
            username: "1a".into(),
            email: "nope".into(),
            password: "123".into(),
            confirm_password: "1234".into(),
        };
        let errors = field_errors(&dto.validate().unwrap_err());
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"username"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
        assert!(fields.contains(&"confirm_password"));
    }

    #[test]
    fn test_register_form_field_names() {
        let dto: RegisterRequestDto = serde_json::from_str(
            r#"{"username":"bob","email":"bob@x.com","password":"secret1","confirmPassword":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(dto.confirm_password, "secret1");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_login_aliases_and_remember_flag() {
        let dto: LoginRequestDto = serde_json::from_str(
            r#"{"username_or_email":"alice@x.com","password":"secret1","rememberMe":true}"#,
        )
        .unwrap();
        assert_eq!(dto.username, "alice@x.com");
        assert!(dto.remember_me);

        let dto: LoginRequestDto =
            serde_json::from_str(r#"{"username":"alice","password":"secret1"}"#).unwrap();
        assert!(!dto.remember_me);
    }

    #[test]
    fn test_login_requires_both_fields() {
        let dto = LoginRequestDto::default();
        let errors = field_errors(&dto.validate().unwrap_err());
        assert_eq!(errors.len(), 2);
    }
}
