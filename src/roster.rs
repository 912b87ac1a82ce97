//! The user roster: GitHub logins mapped to Wrike credentials.
//!
//! Supplied as a single base64-encoded JSON array in the `USERS` secret,
//! so one repository secret covers the whole team:
//!
//! ```json
//! [{"github_username": "ada", "wrike_email": "ada@example.com",
//!   "wrike_token": "..."}]
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// One roster entry.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub github_username: String,
    pub wrike_email: String,
    pub wrike_token: String,
}

/// Errors from decoding the roster or looking up a user.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to decode the roster secret: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to parse the roster: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no credentials found for GitHub user '{0}'")]
    UnknownUser(String),
}

/// Decode the roster and resolve the acting GitHub login to a user.
pub fn resolve(encoded: &str, login: &str) -> Result<User, RosterError> {
    let json = STANDARD.decode(encoded.trim())?;
    let users: Vec<User> = serde_json::from_slice(&json)?;
    users
        .into_iter()
        .find(|u| u.github_username == login)
        .ok_or_else(|| RosterError::UnknownUser(login.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_roster() -> String {
        STANDARD.encode(
            r#"[
                {"github_username": "ada", "wrike_email": "ada@example.com",
                 "wrike_token": "token-a"},
                {"github_username": "brian", "wrike_email": "brian@example.com",
                 "wrike_token": "token-b"}
            ]"#,
        )
    }

    #[test]
    fn resolves_a_known_login() {
        let user = resolve(&encoded_roster(), "brian").unwrap();
        assert_eq!(user.wrike_email, "brian@example.com");
        assert_eq!(user.wrike_token, "token-b");
    }

    #[test]
    fn unknown_login_is_an_error() {
        let err = resolve(&encoded_roster(), "mallory").unwrap_err();
        assert!(matches!(err, RosterError::UnknownUser(login) if login == "mallory"));
    }

    #[test]
    fn garbage_base64_is_an_error() {
        assert!(matches!(
            resolve("not base64!!!", "ada"),
            Err(RosterError::Decode(_))
        ));
    }

    #[test]
    fn valid_base64_of_invalid_json_is_an_error() {
        let encoded = STANDARD.encode("{not json");
        assert!(matches!(resolve(&encoded, "ada"), Err(RosterError::Json(_))));
    }
}
