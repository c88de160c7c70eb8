use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::bson_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionType {
    #[serde(rename = "candidate-based")]
    CandidateBased,
    #[serde(rename = "yes-no")]
    YesNo,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "image-based")]
    ImageBased,
}

impl ElectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionType::CandidateBased => "candidate-based",
            ElectionType::YesNo => "yes-no",
            ElectionType::Rating => "rating",
            ElectionType::ImageBased => "image-based",
        }
    }
}

impl fmt::Display for ElectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl ElectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionStatus::Pending => "pending",
            ElectionStatus::Active => "active",
            ElectionStatus::Completed => "completed",
            ElectionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingOptions {
    pub min: i32,
    pub max: i32,
}

impl Default for RatingOptions {
    fn default() -> Self {
        RatingOptions { min: 1, max: 5 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingScale {
    #[serde(flatten)]
    pub range: RatingOptions,
    #[serde(default = "RatingScale::default_label_min")]
    pub label_min: String,
    #[serde(default = "RatingScale::default_label_max")]
    pub label_max: String,
}

impl RatingScale {
    fn default_label_min() -> String {
        "Poor".into()
    }

    fn default_label_max() -> String {
        "Excellent".into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// One ballot entry: an approved candidate for candidate-based elections or
/// an image option for image-based ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_label: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub application_description: String,
    #[serde(default)]
    pub cv_path: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub plan_points: Vec<String>,
    #[serde(default)]
    pub social_media: SocialMedia,
}

impl BallotEntry {
    /// Image options are addressed by their generated image id, falling back
    /// to the subdocument id for entries created before the image id existed.
    pub fn matches_image(&self, selected: &ObjectId) -> bool {
        self.image_id.as_ref() == Some(selected) || self.entry_id.as_ref() == Some(selected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

/// A candidate's request to appear on the ballot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub candidate_id: ObjectId,
    /// Free-form payload: either a plain summary string or a structured
    /// object with fullName / summary / planPoints / socialMedia.
    pub description: serde_json::Value,
    pub cv_path: String,
    pub status: ApplicationStatus,
    #[serde(with = "bson_datetime")]
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub election_type: ElectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_options: Option<RatingScale>,
    #[serde(default = "Election::default_thumbnail")]
    pub thumbnail: String,
    #[serde(with = "bson_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "bson_datetime")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub candidates: Vec<BallotEntry>,
    #[serde(default)]
    pub applications: Vec<Application>,
    pub status: ElectionStatus,
    /// Set whenever an admin picks a status explicitly; the background sweep
    /// leaves such elections alone.
    #[serde(default)]
    pub manual_status: bool,
    pub created_by: ObjectId,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Election {
    fn default_thumbnail() -> String {
        "no-thumbnail.jpg".into()
    }

    /// Status a freshly created election starts in. Candidate-based elections
    /// open in `pending` to collect applications first; the other types go
    /// straight to `active` (or `completed` when created after their window).
    pub fn initial_status(
        election_type: ElectionType,
        requested: Option<ElectionStatus>,
        now: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> ElectionStatus {
        if let Some(status) = requested {
            if matches!(
                status,
                ElectionStatus::Cancelled | ElectionStatus::Active | ElectionStatus::Completed
            ) {
                return status;
            }
        }
        match election_type {
            ElectionType::CandidateBased => ElectionStatus::Pending,
            _ if now > end_date => ElectionStatus::Completed,
            _ => ElectionStatus::Active,
        }
    }

    pub fn is_window_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_date && now <= self.end_date
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn application_of(&self, candidate_id: &ObjectId) -> Option<usize> {
        self.applications
            .iter()
            .position(|app| &app.candidate_id == candidate_id)
    }

    pub fn has_candidate(&self, candidate_id: &ObjectId) -> bool {
        self.candidates
            .iter()
            .any(|entry| entry.candidate_id.as_ref() == Some(candidate_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn candidate_based_elections_start_pending() {
        let now = Utc::now();
        let status =
            Election::initial_status(ElectionType::CandidateBased, None, now, now + Duration::days(1));
        assert_eq!(status, ElectionStatus::Pending);
    }

    #[test]
    fn simple_elections_start_active_inside_window() {
        let now = Utc::now();
        for ty in [ElectionType::YesNo, ElectionType::Rating, ElectionType::ImageBased] {
            let status = Election::initial_status(ty, None, now, now + Duration::days(1));
            assert_eq!(status, ElectionStatus::Active);
        }
    }

    #[test]
    fn simple_elections_created_after_end_are_completed() {
        let now = Utc::now();
        let status =
            Election::initial_status(ElectionType::YesNo, None, now, now - Duration::hours(1));
        assert_eq!(status, ElectionStatus::Completed);
    }

    #[test]
    fn explicit_status_overrides_defaults() {
        let now = Utc::now();
        let status = Election::initial_status(
            ElectionType::CandidateBased,
            Some(ElectionStatus::Cancelled),
            now,
            now + Duration::days(1),
        );
        assert_eq!(status, ElectionStatus::Cancelled);
    }
}
