pub mod election;
pub mod user;
pub mod vote;

/// Chrono datetimes stored as native BSON dates so range queries work on the
/// raw collections.
pub mod bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson::DateTime as BsonDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        BsonDateTime::from_millis(date.timestamp_millis()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BsonDateTime::deserialize(deserializer).map(|bson_dt| {
            DateTime::from_timestamp_millis(bson_dt.timestamp_millis()).unwrap_or_default()
        })
    }
}
