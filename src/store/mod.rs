pub mod client;
pub mod memory;

pub use client::RestStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::records::types::{
    DescriptionOption, IstRow, IstScores, PapikostickRow, PapikostickScores, PersonalInfo,
    PersonalRecord, TestReport,
};
use crate::scoring::Band;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request to {table} failed: {source}")]
    Http {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{table} returned HTTP {status}: {message}")]
    Status {
        table: &'static str,
        status: u16,
        message: String,
    },

    #[error("session rejected by the store (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("could not decode {table} response: {message}")]
    Decode {
        table: &'static str,
        message: String,
    },

    #[error("{table} insert returned no row")]
    EmptyInsert { table: &'static str },

    #[error("invalid store URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("{0}")]
    Backend(String),
}

/// Table-oriented access to the managed backend.
///
/// The store does not cascade: callers delete child rows before the
/// parent (see `records::delete_record`).
#[async_trait]
pub trait Store: Send + Sync {
    /// Number of `personal_info` rows.
    async fn count_personal(&self) -> Result<u64, StoreError>;

    /// Insert a personal record and return it with its generated id.
    async fn insert_personal(&self, info: &PersonalInfo) -> Result<PersonalRecord, StoreError>;

    async fn insert_ist(&self, row: &IstRow) -> Result<(), StoreError>;

    async fn insert_papikostick(&self, row: &PapikostickRow) -> Result<(), StoreError>;

    /// A personal record with its nested children, or `None` if absent.
    async fn fetch_report(&self, id: &str) -> Result<Option<TestReport>, StoreError>;

    async fn fetch_ist_for(&self, personal_id: &str) -> Result<Option<IstScores>, StoreError>;

    async fn fetch_papikostick_for(
        &self,
        personal_id: &str,
    ) -> Result<Option<PapikostickScores>, StoreError>;

    /// Personal records, newest first.
    async fn list_personal(&self, limit: Option<usize>) -> Result<Vec<PersonalRecord>, StoreError>;

    /// Every record with its children, newest first.
    async fn list_reports(&self) -> Result<Vec<TestReport>, StoreError>;

    async fn delete_ist_for(&self, personal_id: &str) -> Result<(), StoreError>;

    async fn delete_papikostick_for(&self, personal_id: &str) -> Result<(), StoreError>;

    async fn delete_personal(&self, id: &str) -> Result<(), StoreError>;

    /// Every catalog row of one band.
    async fn descriptions_in(&self, band: Band) -> Result<Vec<DescriptionOption>, StoreError>;

    /// One catalog row of `band` chosen uniformly at random. The same seed
    /// over the same rows picks the same row.
    async fn random_description(
        &self,
        band: Band,
        seed: u64,
    ) -> Result<Option<DescriptionOption>, StoreError> {
        let options = self.descriptions_in(band).await?;
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(options.choose(&mut rng).cloned())
    }
}
