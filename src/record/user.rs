use crate::prelude::*;
use std::str::FromStr;

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books and attends appointments.
    Patient,
    /// Owns the daily session slots appointments are booked into.
    Dentist,
    /// Manages users and sees every appointment.
    Admin,
}

impl Role {
    /// Lowercase role name, as stored on disk.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Dentist => "dentist",
            Role::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patient" => Ok(Role::Patient),
            "dentist" => Ok(Role::Dentist),
            "admin" => Ok(Role::Admin),
            other => Err(Error::validation(format!("unknown role {:?}", other))),
        }
    }
}

/// Registered account.
///
/// Users are never physically removed, `is_deleted` marks deactivated
/// accounts so appointments keep resolving their dentist and patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique login name, the ordering key of the user index.
    pub username: String,
    /// Password hash, opaque to the index layer.
    #[serde(rename = "password")]
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact number, set for patients only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<u64>,
    /// Soft-delete flag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_deleted: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl User {
    /// Creates an active user without a mobile number.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            role,
            first_name: first_name.into(),
            last_name: last_name.into(),
            mobile_number: None,
            is_deleted: false,
        }
    }

    /// Sets the mobile number.
    #[must_use]
    pub fn with_mobile_number(mut self, mobile_number: u64) -> Self {
        self.mobile_number = Some(mobile_number);
        self
    }

    /// Checks the role is dentist.
    #[must_use]
    pub fn is_dentist(&self) -> bool {
        self.role == Role::Dentist
    }

    /// Checks the role is patient.
    #[must_use]
    pub fn is_patient(&self) -> bool {
        self.role == Role::Patient
    }

    /// "First Last" display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_layout_matches_user_file() {
        let user = User::new("amy01", "hash", Role::Patient, "Amy", "Tan").with_mobile_number(91234567);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "amy01");
        assert_eq!(json["password"], "hash");
        assert_eq!(json["role"], "patient");
        assert_eq!(json["firstName"], "Amy");
        assert_eq!(json["mobileNumber"], 91234567);
        assert!(json.get("isDeleted").is_none());
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let raw = r#"{"username":"drlee","password":"x","role":"dentist","firstName":"Lee","lastName":"Wong"}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert!(user.is_dentist());
        assert!(!user.is_patient());
        assert_eq!(user.mobile_number, None);
        assert!(!user.is_deleted);
    }

    #[test]
    fn role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("nurse".parse::<Role>().is_err());
    }
}
