//! One-shot notices carried across a redirect in a short-lived cookie.
//!
//! A handler that redirects calls [`push`]; the page that renders next calls
//! [`take`], which reads the notice and expires the cookie in the same response.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

const FLASH_COOKIE: &str = "lostfound_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            "warning" => Some(FlashLevel::Warning),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    fn encode(&self) -> String {
        format!(
            "{}:{}",
            self.level.as_str(),
            urlencoding::encode(&self.message)
        )
    }

    fn decode(raw: &str) -> Option<Self> {
        let (level, message) = raw.split_once(':')?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: urlencoding::decode(message).ok()?.into_owned(),
        })
    }
}

/// Attach a notice to the response.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Read the pending notice, if any, and expire it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::decode(c.value()));
    match flash {
        Some(flash) => (
            jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/")),
            Some(flash),
        ),
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_take() {
        let jar = push(
            CookieJar::new(),
            Flash::success("Item reported successfully!"),
        );
        let (_, flash) = take(jar);
        assert_eq!(flash, Some(Flash::success("Item reported successfully!")));
    }

    #[test]
    fn test_message_with_separator_survives() {
        let jar = push(CookieJar::new(), Flash::info("Goodbye alice: see you; soon"));
        let (_, flash) = take(jar);
        assert_eq!(flash.unwrap().message, "Goodbye alice: see you; soon");
    }

    #[test]
    fn test_take_expires_cookie() {
        let jar = push(CookieJar::new(), Flash::warning("Please login"));
        let (jar, first) = take(jar);
        assert!(first.is_some());
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "nonsense"));
        let (_, flash) = take(jar);
        assert!(flash.is_none());
    }
}
