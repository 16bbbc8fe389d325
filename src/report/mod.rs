pub mod competency;
pub mod describe;
pub mod formatter;

pub use competency::{evaluate, CompetencyLine, COMPETENCIES};
pub use describe::{sample_descriptions, DescriptionSet};
pub use formatter::{
    format_band_tables, format_dashboard, format_date, format_record_table, format_report,
    should_use_colors,
};

use crate::error::AppError;
use crate::records::types::{PersonalRecord, TestReport};
use crate::store::Store;

/// Records shown on the dashboard.
pub const RECENT_LIMIT: usize = 5;

/// A single report view: the record plus the descriptions sampled for it.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub report: TestReport,
    pub descriptions: DescriptionSet,
}

/// Fetch a record and sample its descriptions with `seed`.
pub async fn load_report_view(
    store: &dyn Store,
    id: &str,
    seed: u64,
) -> Result<ReportView, AppError> {
    let report = store
        .fetch_report(id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;
    let descriptions = sample_descriptions(store, seed).await;
    Ok(ReportView {
        report,
        descriptions,
    })
}

/// Dashboard data: total count and the most recent records.
pub async fn load_dashboard(store: &dyn Store) -> Result<(u64, Vec<PersonalRecord>), AppError> {
    let total = store.count_personal().await?;
    let recent = store.list_personal(Some(RECENT_LIMIT)).await?;
    Ok((total, recent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_load_missing_report() {
        let store = MemoryStore::new();
        let err = load_report_view(&store, "x", 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(id) if id == "x"));
    }

    #[tokio::test]
    async fn test_dashboard_limits_recent() {
        let store = MemoryStore::new();
        let report = crate::export::columns::tests::sample_report(false);
        for _ in 0..7 {
            store.insert_personal(&report.personal.info).await.unwrap();
        }
        let (total, recent) = load_dashboard(&store).await.unwrap();
        assert_eq!(total, 7);
        assert_eq!(recent.len(), RECENT_LIMIT);
    }
}
