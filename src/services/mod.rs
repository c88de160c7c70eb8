pub mod face_client;
pub mod scheduler;
pub mod tally;
