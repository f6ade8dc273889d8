//! Current-user session, persisted as JSON under the `user` key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserType {
    #[default]
    Employee,
    Admin,
}

/// The logged-in user as stored by the login page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub user_type: UserType,
}

/// Session handed to page components at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    /// Bearer token for the remote store, when logged in against a real API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

impl Session {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user: User {
                email: email.into(),
                user_type: UserType::Employee,
            },
            jwt: None,
        }
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

/// Read the session file. A missing file means nobody is logged in.
pub fn load_session(path: &Path) -> Result<Session, SessionError> {
    if !path.exists() {
        return Err(SessionError::NoUser);
    }
    let s = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

pub fn save_session(path: &Path, session: &Session) -> Result<(), SessionError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(session)?;
    fs::write(path, json)?;
    Ok(())
}

/// Remove the session file; logging out twice is not an error.
pub fn clear_session(path: &Path) -> Result<(), SessionError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");

        assert!(matches!(load_session(&path), Err(SessionError::NoUser)));

        let session = Session::employee("employee@test.tld");
        save_session(&path, &session).unwrap();
        assert_eq!(load_session(&path).unwrap(), session);

        clear_session(&path).unwrap();
        clear_session(&path).unwrap();
        assert!(matches!(load_session(&path), Err(SessionError::NoUser)));
    }

    #[test]
    fn test_reads_login_page_shape() {
        let raw = r#"{"user":{"type":"Employee","email":"employee@test.tld"}}"#;
        let s: Session = serde_json::from_str(raw).unwrap();
        assert_eq!(s.email(), "employee@test.tld");
        assert_eq!(s.user.user_type, UserType::Employee);
        assert!(s.jwt.is_none());
    }

    #[test]
    fn test_user_without_email() {
        let u: User = serde_json::from_str(r#"{"type":"Employee"}"#).unwrap();
        assert_eq!(u.email, "");
    }
}
