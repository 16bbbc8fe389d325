use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Store, StoreError};
use crate::records::types::{
    DescriptionOption, IstRow, IstScores, PapikostickRow, PapikostickScores, PersonalInfo,
    PersonalRecord, TestReport, DESCRIPTION_TABLE, IST_TABLE, PAPIKOSTICK_TABLE, PERSONAL_TABLE,
};
use crate::scoring::Band;

/// In-process store with the same table semantics as the backend: no
/// cascading deletes, ids assigned on insert, `created_at` strictly
/// increasing in insertion order.
///
/// Used for offline runs and tests. Individual tables can be switched to
/// fail so partial-write handling can be exercised.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryData>>,
}

struct MemoryData {
    next_id: u64,
    clock: DateTime<Utc>,
    personal: Vec<PersonalRecord>,
    ist: Vec<IstRow>,
    papikostick: Vec<PapikostickRow>,
    descriptions: Vec<(Band, DescriptionOption)>,
    failing: HashSet<&'static str>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryData {
                next_id: 1,
                clock: Utc::now(),
                personal: Vec::new(),
                ist: Vec::new(),
                papikostick: Vec::new(),
                descriptions: Vec::new(),
                failing: HashSet::new(),
            })),
        }
    }

    /// Add a catalog row for `band`.
    pub fn add_description(&self, band: Band, option: DescriptionOption) -> Result<(), StoreError> {
        self.data()?.descriptions.push((band, option));
        Ok(())
    }

    /// Make every operation on `table` fail until `heal` is called.
    pub fn fail_table(&self, table: &'static str) -> Result<(), StoreError> {
        self.data()?.failing.insert(table);
        Ok(())
    }

    pub fn heal(&self) -> Result<(), StoreError> {
        self.data()?.failing.clear();
        Ok(())
    }

    /// Row counts of (personal_info, ist, papikostick).
    pub fn row_counts(&self) -> Result<(usize, usize, usize), StoreError> {
        let data = self.data()?;
        Ok((data.personal.len(), data.ist.len(), data.papikostick.len()))
    }

    fn data(&self) -> Result<MutexGuard<'_, MemoryData>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl MemoryData {
    fn check(&self, table: &'static str) -> Result<(), StoreError> {
        if self.failing.contains(table) {
            Err(StoreError::Backend(format!("simulated failure on {}", table)))
        } else {
            Ok(())
        }
    }

    fn report_for(&self, record: &PersonalRecord) -> TestReport {
        TestReport {
            personal: record.clone(),
            ist: self
                .ist
                .iter()
                .find(|row| row.personal_info_id == record.id)
                .map(|row| row.scores.clone()),
            papikostick: self
                .papikostick
                .iter()
                .find(|row| row.personal_info_id == record.id)
                .map(|row| row.scores.clone()),
        }
    }

    fn newest_first(&self) -> Vec<&PersonalRecord> {
        let mut records: Vec<&PersonalRecord> = self.personal.iter().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn count_personal(&self) -> Result<u64, StoreError> {
        let data = self.data()?;
        data.check(PERSONAL_TABLE)?;
        Ok(data.personal.len() as u64)
    }

    async fn insert_personal(&self, info: &PersonalInfo) -> Result<PersonalRecord, StoreError> {
        let mut data = self.data()?;
        data.check(PERSONAL_TABLE)?;
        let id = data.next_id;
        data.next_id += 1;
        let record = PersonalRecord {
            id: id.to_string(),
            created_at: Some(data.clock + Duration::seconds(id as i64)),
            info: info.clone(),
        };
        data.personal.push(record.clone());
        Ok(record)
    }

    async fn insert_ist(&self, row: &IstRow) -> Result<(), StoreError> {
        let mut data = self.data()?;
        data.check(IST_TABLE)?;
        data.ist.push(row.clone());
        Ok(())
    }

    async fn insert_papikostick(&self, row: &PapikostickRow) -> Result<(), StoreError> {
        let mut data = self.data()?;
        data.check(PAPIKOSTICK_TABLE)?;
        data.papikostick.push(row.clone());
        Ok(())
    }

    async fn fetch_report(&self, id: &str) -> Result<Option<TestReport>, StoreError> {
        let data = self.data()?;
        data.check(PERSONAL_TABLE)?;
        Ok(data
            .personal
            .iter()
            .find(|record| record.id == id)
            .map(|record| data.report_for(record)))
    }

    async fn fetch_ist_for(&self, personal_id: &str) -> Result<Option<IstScores>, StoreError> {
        let data = self.data()?;
        data.check(IST_TABLE)?;
        Ok(data
            .ist
            .iter()
            .find(|row| row.personal_info_id == personal_id)
            .map(|row| row.scores.clone()))
    }

    async fn fetch_papikostick_for(
        &self,
        personal_id: &str,
    ) -> Result<Option<PapikostickScores>, StoreError> {
        let data = self.data()?;
        data.check(PAPIKOSTICK_TABLE)?;
        Ok(data
            .papikostick
            .iter()
            .find(|row| row.personal_info_id == personal_id)
            .map(|row| row.scores.clone()))
    }

    async fn list_personal(&self, limit: Option<usize>) -> Result<Vec<PersonalRecord>, StoreError> {
        let data = self.data()?;
        data.check(PERSONAL_TABLE)?;
        let records = data.newest_first().into_iter().cloned();
        Ok(match limit {
            Some(n) => records.take(n).collect(),
            None => records.collect(),
        })
    }

    async fn list_reports(&self) -> Result<Vec<TestReport>, StoreError> {
        let data = self.data()?;
        data.check(PERSONAL_TABLE)?;
        Ok(data
            .newest_first()
            .into_iter()
            .map(|record| data.report_for(record))
            .collect())
    }

    async fn delete_ist_for(&self, personal_id: &str) -> Result<(), StoreError> {
        let mut data = self.data()?;
        data.check(IST_TABLE)?;
        data.ist.retain(|row| row.personal_info_id != personal_id);
        Ok(())
    }

    async fn delete_papikostick_for(&self, personal_id: &str) -> Result<(), StoreError> {
        let mut data = self.data()?;
        data.check(PAPIKOSTICK_TABLE)?;
        data.papikostick.retain(|row| row.personal_info_id != personal_id);
        Ok(())
    }

    async fn delete_personal(&self, id: &str) -> Result<(), StoreError> {
        let mut data = self.data()?;
        data.check(PERSONAL_TABLE)?;
        data.personal.retain(|record| record.id != id);
        Ok(())
    }

    async fn descriptions_in(&self, band: Band) -> Result<Vec<DescriptionOption>, StoreError> {
        let data = self.data()?;
        data.check(DESCRIPTION_TABLE)?;
        Ok(data
            .descriptions
            .iter()
            .filter(|(b, _)| *b == band)
            .map(|(_, option)| option.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::types::{IstInput, Salutation, Sex};
    use chrono::NaiveDate;

    fn info(name: &str) -> PersonalInfo {
        PersonalInfo {
            no_tes: format!("TES-2026-{}", name),
            nama_peserta: name.to_string(),
            tanggal_lahir: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            nama_pt: None,
            sdr_sdri: Salutation::Sdr,
            jenis_kelamin: Sex::Male,
            tanggal_tes: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            phq: None,
            keterangan_phq: None,
        }
    }

    fn option(text: &str) -> DescriptionOption {
        DescriptionOption {
            description: text.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_counts() {
        let store = MemoryStore::new();
        let a = store.insert_personal(&info("a")).await.unwrap();
        let b = store.insert_personal(&info("b")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.created_at < b.created_at);
        assert_eq!(store.count_personal().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.insert_personal(&info(name)).await.unwrap();
        }
        let all = store.list_personal(None).await.unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.info.nama_peserta.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
        assert_eq!(store.list_personal(Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_report_nests_children() {
        let store = MemoryStore::new();
        let parent = store.insert_personal(&info("a")).await.unwrap();
        let scores = crate::scoring::score_ist(IstInput {
            wa_verbal: 100.0,
            ..Default::default()
        });
        store
            .insert_ist(&IstRow {
                personal_info_id: parent.id.clone(),
                scores: scores.clone(),
            })
            .await
            .unwrap();

        let report = store.fetch_report(&parent.id).await.unwrap().unwrap();
        assert_eq!(report.ist, Some(scores));
        assert!(report.papikostick.is_none());
        assert!(store.fetch_report("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_parent_does_not_cascade() {
        let store = MemoryStore::new();
        let parent = store.insert_personal(&info("a")).await.unwrap();
        store
            .insert_ist(&IstRow {
                personal_info_id: parent.id.clone(),
                scores: crate::scoring::score_ist(IstInput::default()),
            })
            .await
            .unwrap();
        store.delete_personal(&parent.id).await.unwrap();
        assert_eq!(store.row_counts().unwrap(), (0, 1, 0));
    }

    #[tokio::test]
    async fn test_failing_table() {
        let store = MemoryStore::new();
        store.fail_table(PERSONAL_TABLE).unwrap();
        let err = store.insert_personal(&info("a")).await.unwrap_err();
        assert!(err.to_string().contains("personal_info"));
        store.heal().unwrap();
        assert!(store.insert_personal(&info("a")).await.is_ok());
    }

    #[tokio::test]
    async fn test_random_description_filters_band() {
        let store = MemoryStore::new();
        store.add_description(Band::Low, option("low-1")).unwrap();
        store.add_description(Band::Low, option("low-2")).unwrap();
        store.add_description(Band::High, option("high-1")).unwrap();

        for seed in 0..20 {
            let picked = store.random_description(Band::Low, seed).await.unwrap().unwrap();
            assert!(picked.description.starts_with("low-"));
        }
        let high = store.random_description(Band::High, 7).await.unwrap().unwrap();
        assert_eq!(high.description, "high-1");
        assert!(store.random_description(Band::Good, 7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_random_description_same_seed_same_row() {
        let store = MemoryStore::new();
        for i in 0..10 {
            store
                .add_description(Band::Sufficient, option(&format!("c-{}", i)))
                .unwrap();
        }
        let first = store.random_description(Band::Sufficient, 42).await.unwrap();
        let second = store.random_description(Band::Sufficient, 42).await.unwrap();
        assert_eq!(first, second);
    }
}
