pub mod admin_controller;
pub mod auth_controller;
pub mod election_controller;
pub mod stats_controller;
pub mod vote_controller;

use mongodb::bson::oid::ObjectId;

use crate::error::AppError;

/// Path ids arrive as strings; anything that is not a 24-char hex ObjectId is
/// a validation failure, not a 404.
pub(crate) fn parse_object_id(value: &str, what: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value).map_err(|_| AppError::Validation(format!("Invalid {what} id")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_hex_ids() {
        assert!(parse_object_id("not-an-id", "election").is_err());
        assert!(parse_object_id("65f1a2b3c4d5e6f7a8b9c0d1", "election").is_ok());
    }
}
