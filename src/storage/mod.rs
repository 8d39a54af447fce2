//! Persistence seams: the question table and the attachment blob store.
//!
//! Services only see the traits, so the Postgres table and the local upload
//! directory can be swapped for in-memory versions in tests.

pub mod blobs;
pub mod questions;

pub use blobs::{BlobStore, LocalBlobStore};
pub use questions::{PgQuestionStore, QuestionStore};
