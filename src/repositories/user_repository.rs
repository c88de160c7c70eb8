use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime};
use mongodb::{Collection, Database};

use crate::error::AppError;
use crate::models::user::{Role, User};

#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        let collection = db.collection::<User>("users");
        Self { collection }
    }

    pub async fn insert(&self, user: &User) -> Result<ObjectId, AppError> {
        let result = self.collection.insert_one(user).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Database("inserted _id was not an ObjectId".into()))
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    /// Case-insensitive exact username lookup, matching how the face service
    /// reports usernames back.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let pattern = format!("^{}$", regex_escape(username));
        let filter = doc! { "username": { "$regex": pattern, "$options": "i" } };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.collection.find(doc! {}).await?.try_collect().await?)
    }

    pub async fn find_pending(&self) -> Result<Vec<User>, AppError> {
        Ok(self
            .collection
            .find(doc! { "isApproved": false })
            .await?
            .try_collect()
            .await?)
    }

    pub async fn set_approved(&self, id: &ObjectId) -> Result<(), AppError> {
        self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "isApproved": true } })
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), AppError> {
        self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    pub async fn update_fields(
        &self,
        id: &ObjectId,
        fields: mongodb::bson::Document,
    ) -> Result<(), AppError> {
        self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(())
    }

    pub async fn set_password(&self, id: &ObjectId, password_hash: &str) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": { "password": password_hash },
                    "$unset": { "resetPasswordToken": "", "resetPasswordExpire": "" },
                },
            )
            .await?;
        Ok(())
    }

    pub async fn set_reset_token(
        &self,
        id: &ObjectId,
        digest: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "resetPasswordToken": digest,
                    "resetPasswordExpire": BsonDateTime::from_millis(expires.timestamp_millis()),
                } },
            )
            .await?;
        Ok(())
    }

    pub async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>, AppError> {
        let now = BsonDateTime::from_millis(Utc::now().timestamp_millis());
        let filter = doc! {
            "resetPasswordToken": digest,
            "resetPasswordExpire": { "$gt": now },
        };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn set_profile_update_token(
        &self,
        id: &ObjectId,
        digest: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "profileUpdateToken": digest,
                    "profileUpdateExpire": BsonDateTime::from_millis(expires.timestamp_millis()),
                } },
            )
            .await?;
        Ok(())
    }

    /// Consumes a live profile-update token for the given user, applying the
    /// whitelisted field updates only when the digest matches and has not
    /// expired.
    pub async fn apply_profile_update(
        &self,
        id: &ObjectId,
        digest: &str,
        fields: mongodb::bson::Document,
    ) -> Result<Option<User>, AppError> {
        let now = BsonDateTime::from_millis(Utc::now().timestamp_millis());
        let filter = doc! {
            "_id": id,
            "profileUpdateToken": digest,
            "profileUpdateExpire": { "$gt": now },
        };
        let update = doc! {
            "$set": fields,
            "$unset": { "profileUpdateToken": "", "profileUpdateExpire": "" },
        };
        Ok(self
            .collection
            .find_one_and_update(filter, update)
            .return_document(mongodb::options::ReturnDocument::After)
            .await?)
    }

    pub async fn push_bookmark(
        &self,
        user_id: &ObjectId,
        election_id: &ObjectId,
    ) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$push": { "bookmarkedElections": election_id } },
            )
            .await?;
        Ok(())
    }

    pub async fn pull_bookmark(
        &self,
        user_id: &ObjectId,
        election_id: &ObjectId,
    ) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "bookmarkedElections": election_id } },
            )
            .await?;
        Ok(())
    }

    pub async fn set_has_voted(
        &self,
        user_id: &ObjectId,
        election_hex: &str,
    ) -> Result<(), AppError> {
        let key = format!("hasVoted.{election_hex}");
        self.collection
            .update_one(doc! { "_id": user_id }, doc! { "$set": { key: true } })
            .await?;
        Ok(())
    }

    pub async fn unset_has_voted(
        &self,
        user_id: &ObjectId,
        election_hex: &str,
    ) -> Result<(), AppError> {
        let key = format!("hasVoted.{election_hex}");
        self.collection
            .update_one(doc! { "_id": user_id }, doc! { "$unset": { key: "" } })
            .await?;
        Ok(())
    }

    pub async fn unset_has_voted_many(
        &self,
        voter_ids: &[ObjectId],
        election_hex: &str,
    ) -> Result<(), AppError> {
        if voter_ids.is_empty() {
            return Ok(());
        }
        let key = format!("hasVoted.{election_hex}");
        let ids: Vec<Bson> = voter_ids.iter().map(|id| Bson::ObjectId(*id)).collect();
        self.collection
            .update_many(
                doc! { "_id": { "$in": ids } },
                doc! { "$unset": { key: "" } },
            )
            .await?;
        Ok(())
    }

    pub async fn count_all(&self) -> Result<u64, AppError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "role": role.as_str() })
            .await?)
    }
}

fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::regex_escape;

    #[test]
    fn regex_metacharacters_are_escaped() {
        assert_eq!(regex_escape("plain_name"), "plain_name");
        assert_eq!(regex_escape("a.b+c"), "a\\.b\\+c");
    }
}
