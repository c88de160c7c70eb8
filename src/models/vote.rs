use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::bson_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Yes => "yes",
            Choice::No => "no",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's single, immutable choice in one election. Exactly one of the
/// type-specific fields is set, enforced at cast time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub election: ObjectId,
    pub voter: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_image_id: Option<ObjectId>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(election: ObjectId, voter: ObjectId) -> Self {
        Vote {
            id: None,
            election,
            voter,
            candidate: None,
            choice: None,
            rating_value: None,
            selected_image_id: None,
            created_at: Utc::now(),
        }
    }
}
