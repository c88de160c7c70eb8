use std::sync::Arc;

use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::error::AppError;
use crate::models::vote::Vote;

#[derive(Clone)]
pub struct VoteRepository {
    collection: Collection<Vote>,
}

impl VoteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        let collection = db.collection::<Vote>("votes");
        Self { collection }
    }

    /// One ballot per voter per election, enforced at the database level so
    /// concurrent submissions cannot both land.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! { "election": 1, "voter": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Returns the raw driver error so the caller can distinguish a duplicate
    /// key (the voter already voted) from other failures.
    pub async fn insert(&self, vote: &Vote) -> Result<Option<ObjectId>, mongodb::error::Error> {
        let result = self.collection.insert_one(vote).await?;
        Ok(result.inserted_id.as_object_id())
    }

    pub async fn find_by_election_and_voter(
        &self,
        election: &ObjectId,
        voter: &ObjectId,
    ) -> Result<Option<Vote>, AppError> {
        Ok(self
            .collection
            .find_one(doc! { "election": election, "voter": voter })
            .await?)
    }

    pub async fn find_by_election(&self, election: &ObjectId) -> Result<Vec<Vote>, AppError> {
        Ok(self
            .collection
            .find(doc! { "election": election })
            .await?
            .try_collect()
            .await?)
    }

    pub async fn find_by_voter(&self, voter: &ObjectId) -> Result<Vec<Vote>, AppError> {
        Ok(self
            .collection
            .find(doc! { "voter": voter })
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?)
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), AppError> {
        self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    pub async fn delete_by_election(&self, election: &ObjectId) -> Result<u64, AppError> {
        let result = self
            .collection
            .delete_many(doc! { "election": election })
            .await?;
        Ok(result.deleted_count)
    }

    pub async fn delete_for_candidate(
        &self,
        election: &ObjectId,
        candidate_id: &ObjectId,
    ) -> Result<u64, AppError> {
        let result = self
            .collection
            .delete_many(doc! { "election": election, "candidate": candidate_id })
            .await?;
        Ok(result.deleted_count)
    }

    pub async fn count_for_candidate(&self, candidate_id: &ObjectId) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "candidate": candidate_id })
            .await?)
    }
}
