use crate::error::AppError;
use crate::scoring::{score_ist, score_papikostick};
use crate::store::{Store, StoreError};

use super::types::{
    IstRow, PapikostickRow, PersonalInfo, PersonalRecord, IST_TABLE, PAPIKOSTICK_TABLE,
};
use super::validation::ValidSubmission;

/// Test number for the next record: `TES-<year>-<existing+1, 4 digits>`.
///
/// Derived from the current row count, so two concurrent submissions can
/// receive the same number.
pub fn test_number(year: i32, existing: u64) -> String {
    format!("TES-{}-{:04}", year, existing + 1)
}

/// Score a validated submission and write it: the personal record first,
/// then the IST row, then the PAPIKOSTICK row.
///
/// If a child insert fails, rows already written for this submission are
/// deleted again before the error is returned.
pub async fn submit(
    store: &dyn Store,
    submission: ValidSubmission,
    year: i32,
) -> Result<PersonalRecord, AppError> {
    let existing = store.count_personal().await?;
    let no_tes = test_number(year, existing);
    tracing::debug!(%no_tes, existing, "assigning test number");

    let personal = submission.personal;
    let info = PersonalInfo {
        no_tes,
        nama_peserta: personal.nama_peserta,
        tanggal_lahir: personal.tanggal_lahir,
        nama_pt: personal.nama_pt,
        sdr_sdri: personal.sdr_sdri,
        jenis_kelamin: personal.jenis_kelamin,
        tanggal_tes: personal.tanggal_tes,
        phq: personal.phq,
        keterangan_phq: personal.keterangan_phq,
    };

    let record = store.insert_personal(&info).await?;
    tracing::info!(id = %record.id, no_tes = %record.info.no_tes, "personal record saved");

    let ist = IstRow {
        personal_info_id: record.id.clone(),
        scores: score_ist(submission.ist),
    };
    if let Err(source) = store.insert_ist(&ist).await {
        return Err(compensate(store, &record.id, IST_TABLE, source, false).await);
    }

    let papikostick = PapikostickRow {
        personal_info_id: record.id.clone(),
        scores: score_papikostick(submission.papikostick),
    };
    if let Err(source) = store.insert_papikostick(&papikostick).await {
        return Err(compensate(store, &record.id, PAPIKOSTICK_TABLE, source, true).await);
    }

    Ok(record)
}

/// Undo a partially written submission and build the error describing it.
async fn compensate(
    store: &dyn Store,
    personal_id: &str,
    table: &'static str,
    source: StoreError,
    ist_written: bool,
) -> AppError {
    if let StoreError::Unauthorized { .. } = source {
        // Cleanup would be rejected the same way.
        tracing::warn!(personal_id, table, "session rejected mid-submission, rows left in place");
        return AppError::SessionExpired;
    }

    tracing::warn!(personal_id, table, error = %source, "child insert failed, removing written rows");
    let mut compensation = Vec::new();

    if ist_written {
        if let Err(e) = store.delete_ist_for(personal_id).await {
            tracing::error!(personal_id, error = %e, "failed to remove ist row");
            compensation.push(e);
        }
    }
    if let Err(e) = store.delete_personal(personal_id).await {
        tracing::error!(personal_id, error = %e, "failed to remove personal record");
        compensation.push(e);
    }

    AppError::PartialWrite {
        table,
        source,
        compensation,
    }
}

/// Delete a record and its children. The store does not cascade, so the
/// children go first.
pub async fn delete_record(store: &dyn Store, id: &str) -> Result<(), AppError> {
    if store.fetch_report(id).await?.is_none() {
        return Err(AppError::NotFound(id.to_string()));
    }

    store.delete_ist_for(id).await?;
    store.delete_papikostick_for(id).await?;
    store.delete_personal(id).await?;
    tracing::info!(id, "record deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::types::{IstInput, PapikostickInput, Salutation, Sex};
    use crate::records::validation::ValidPersonal;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn submission(name: &str) -> ValidSubmission {
        ValidSubmission {
            personal: ValidPersonal {
                nama_peserta: name.to_string(),
                tanggal_lahir: NaiveDate::from_ymd_opt(1995, 4, 12).unwrap(),
                nama_pt: Some("PT Maju".to_string()),
                sdr_sdri: Salutation::Sdr,
                jenis_kelamin: Sex::Male,
                tanggal_tes: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                phq: Some("7".to_string()),
                keterangan_phq: Some("Mild".to_string()),
            },
            ist: IstInput {
                se_konkrit_praktis: 100.0,
                wa_verbal: 100.0,
                an_fleksibilitas_pikir: 100.0,
                ge_daya_abstraksi_verbal: 120.0,
                ra_berpikir_praktis: 100.0,
            },
            papikostick: PapikostickInput {
                n: 3.0,
                g: 5.0,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_test_number_padding() {
        assert_eq!(test_number(2026, 0), "TES-2026-0001");
        assert_eq!(test_number(2026, 41), "TES-2026-0042");
        assert_eq!(test_number(2025, 9999), "TES-2025-10000");
    }

    #[tokio::test]
    async fn test_first_submission_gets_0001() {
        let store = MemoryStore::new();
        let record = submit(&store, submission("Budi"), 2026).await.unwrap();
        assert_eq!(record.info.no_tes, "TES-2026-0001");

        let report = store.fetch_report(&record.id).await.unwrap().unwrap();
        let ist = report.ist.unwrap();
        assert!((ist.iq - 104.0).abs() < 1e-9);
        assert!((ist.wa_ge - 110.0).abs() < 1e-9);
        assert!((report.papikostick.unwrap().composites.ng - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_number_follows_count() {
        let store = MemoryStore::new();
        for i in 0..41 {
            submit(&store, submission(&format!("Peserta {}", i)), 2026)
                .await
                .unwrap();
        }
        let record = submit(&store, submission("Budi"), 2026).await.unwrap();
        assert_eq!(record.info.no_tes, "TES-2026-0042");
    }

    #[tokio::test]
    async fn test_ist_failure_removes_parent() {
        let store = MemoryStore::new();
        store.fail_table(IST_TABLE).unwrap();

        let err = submit(&store, submission("Budi"), 2026).await.unwrap_err();
        match err {
            AppError::PartialWrite {
                table,
                compensation,
                ..
            } => {
                assert_eq!(table, IST_TABLE);
                assert!(compensation.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.row_counts().unwrap(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_papikostick_failure_removes_parent_and_ist() {
        let store = MemoryStore::new();
        store.fail_table(PAPIKOSTICK_TABLE).unwrap();

        let err = submit(&store, submission("Budi"), 2026).await.unwrap_err();
        assert!(matches!(err, AppError::PartialWrite { table, .. } if table == PAPIKOSTICK_TABLE));
        assert_eq!(store.row_counts().unwrap(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_count_failure_writes_nothing() {
        let store = MemoryStore::new();
        store
            .fail_table(crate::records::types::PERSONAL_TABLE)
            .unwrap();
        let err = submit(&store, submission("Budi"), 2026).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(store.row_counts().unwrap(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_delete_removes_children() {
        let store = MemoryStore::new();
        let keep = submit(&store, submission("Keep"), 2026).await.unwrap();
        let gone = submit(&store, submission("Gone"), 2026).await.unwrap();
        assert_eq!(store.row_counts().unwrap(), (2, 2, 2));

        delete_record(&store, &gone.id).await.unwrap();
        assert_eq!(store.row_counts().unwrap(), (1, 1, 1));
        assert!(store.fetch_ist_for(&gone.id).await.unwrap().is_none());
        assert!(store.fetch_papikostick_for(&gone.id).await.unwrap().is_none());
        assert!(store.fetch_report(&keep.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let store = MemoryStore::new();
        let err = delete_record(&store, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(id) if id == "nope"));
    }
}
