use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::bson_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Voter,
    Candidate,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Voter => "voter",
            Role::Candidate => "candidate",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub username: String,
    pub email: String,
    /// Argon2 encoded hash, never exposed through the API layer.
    pub password: String,
    pub role: Role,
    pub profile_image: String,
    pub id_number: String,
    #[serde(default)]
    pub cv_path: String,
    #[serde(with = "bson_datetime")]
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    pub phone_number: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_approved: bool,
    /// Election id (hex) -> true once a vote has been cast there.
    #[serde(default)]
    pub has_voted: HashMap<String, bool>,
    #[serde(default)]
    pub bookmarked_elections: Vec<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_bson_datetime"
    )]
    pub reset_password_expire: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_update_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_bson_datetime"
    )]
    pub profile_update_expire: Option<DateTime<Utc>>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

pub(crate) mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson::DateTime as BsonDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        date.map(|d| BsonDateTime::from_millis(d.timestamp_millis()))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<BsonDateTime>::deserialize(deserializer)?
            .and_then(|bson_dt| DateTime::from_timestamp_millis(bson_dt.timestamp_millis())))
    }
}

/// Registration-time format checks, applied before anything touches the
/// database.
pub fn validate_id_number(id_number: &str) -> bool {
    id_number.len() == 14 && id_number.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_phone_number(phone: &str) -> bool {
    let len = phone.chars().count();
    (8..=20).contains(&len)
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '(' | ')' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_number_must_be_fourteen_digits() {
        assert!(validate_id_number("12345678901234"));
        assert!(!validate_id_number("1234567890123"));
        assert!(!validate_id_number("1234567890123a"));
        assert!(!validate_id_number(""));
    }

    #[test]
    fn phone_number_accepts_common_punctuation() {
        assert!(validate_phone_number("+20 (100) 123-4567"));
        assert!(validate_phone_number("01001234567"));
        assert!(!validate_phone_number("1234567"));
        assert!(!validate_phone_number("not a phone"));
    }
}
