use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime as BsonDateTime};
use mongodb::{Collection, Database};

use crate::error::AppError;
use crate::models::election::{Election, ElectionStatus};

#[derive(Clone)]
pub struct ElectionRepository {
    collection: Collection<Election>,
}

impl ElectionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        let collection = db.collection::<Election>("elections");
        Self { collection }
    }

    pub async fn insert(&self, election: &Election) -> Result<ObjectId, AppError> {
        let result = self.collection.insert_one(election).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Database("inserted _id was not an ObjectId".into()))
    }

    pub async fn find_all(&self) -> Result<Vec<Election>, AppError> {
        Ok(self.collection.find(doc! {}).await?.try_collect().await?)
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Election>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Election>, AppError> {
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

    /// Full-document save, used by the load-mutate-store flows (applications,
    /// candidate changes) that touch embedded arrays.
    pub async fn replace(&self, id: &ObjectId, election: &Election) -> Result<(), AppError> {
        self.collection
            .replace_one(doc! { "_id": id }, election)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), AppError> {
        self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        id: &ObjectId,
        status: ElectionStatus,
        manual: bool,
    ) -> Result<Option<Election>, AppError> {
        let update = doc! { "$set": {
            "status": to_bson(&status).map_err(|e| AppError::Database(e.to_string()))?,
            "manualStatus": manual,
        } };
        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(mongodb::options::ReturnDocument::After)
            .await?)
    }

    /// Elections the candidate is involved in, either as applicant or as an
    /// approved ballot entry.
    pub async fn find_involving_candidate(
        &self,
        candidate_id: &ObjectId,
    ) -> Result<Vec<Election>, AppError> {
        let filter = doc! { "$or": [
            { "applications.candidateId": candidate_id },
            { "candidates.candidateId": candidate_id },
        ] };
        Ok(self.collection.find(filter).await?.try_collect().await?)
    }

    pub async fn count_all(&self) -> Result<u64, AppError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    pub async fn count_by_status(&self, status: ElectionStatus) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "status": status.as_str() })
            .await?)
    }

    /// Total applications sitting on pending elections, for the admin
    /// dashboard.
    pub async fn count_pending_applications(&self) -> Result<u64, AppError> {
        let pending: Vec<Election> = self
            .collection
            .find(doc! { "status": ElectionStatus::Pending.as_str() })
            .await?
            .try_collect()
            .await?;
        Ok(pending
            .iter()
            .map(|election| election.applications.len() as u64)
            .sum())
    }

    pub async fn count_with_applicant(&self, candidate_id: &ObjectId) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "applications.candidateId": candidate_id })
            .await?)
    }

    pub async fn count_with_candidate(&self, candidate_id: &ObjectId) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "candidates.candidateId": candidate_id })
            .await?)
    }

    pub async fn count_active_with_candidate(
        &self,
        candidate_id: &ObjectId,
    ) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! {
                "candidates.candidateId": candidate_id,
                "status": ElectionStatus::Active.as_str(),
            })
            .await?)
    }

    /// Opens elections whose window has started. Manually pinned statuses are
    /// left untouched.
    pub async fn activate_due(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let now = BsonDateTime::from_millis(now.timestamp_millis());
        let result = self
            .collection
            .update_many(
                doc! {
                    "startDate": { "$lte": now },
                    "endDate": { "$gt": now },
                    "status": ElectionStatus::Pending.as_str(),
                    "manualStatus": { "$ne": true },
                },
                doc! { "$set": { "status": ElectionStatus::Active.as_str() } },
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Completes active elections whose window has closed.
    pub async fn complete_due(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let now = BsonDateTime::from_millis(now.timestamp_millis());
        let result = self
            .collection
            .update_many(
                doc! {
                    "endDate": { "$lte": now },
                    "status": ElectionStatus::Active.as_str(),
                    "manualStatus": { "$ne": true },
                },
                doc! { "$set": { "status": ElectionStatus::Completed.as_str() } },
            )
            .await?;
        Ok(result.modified_count)
    }
}
