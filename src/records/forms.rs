use serde::{Deserialize, Serialize};

use super::types::{IstInput, PapikostickInput};

/// Data-entry form as read from a submission file.
///
/// Example YAML:
/// ```yaml
/// personal:
///   nama_peserta: "Budi Santoso"
///   tanggal_lahir: "1995-04-12"
///   sdr_sdri: SDR
///   jenis_kelamin: Laki-laki
///   tanggal_tes: "2026-10-01"
///   phq: "7"
/// ist:
///   se_konkrit_praktis: 100
///   wa_verbal: 110
/// papikostick:
///   n: 3
///   g: 5
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SubmissionForm {
    #[serde(default)]
    pub personal: PersonalForm,
    #[serde(default)]
    pub ist: IstInput,
    #[serde(default)]
    pub papikostick: PapikostickInput,
}

/// Personal fields are kept as text until validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PersonalForm {
    #[serde(default)]
    pub nama_peserta: Option<String>,
    #[serde(default)]
    pub tanggal_lahir: Option<String>,
    #[serde(default)]
    pub nama_pt: Option<String>,
    /// Defaults to SDR when omitted.
    #[serde(default)]
    pub sdr_sdri: Option<String>,
    /// Defaults to Laki-laki when omitted.
    #[serde(default)]
    pub jenis_kelamin: Option<String>,
    #[serde(default)]
    pub tanggal_tes: Option<String>,
    #[serde(default)]
    pub phq: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_submission() {
        let yaml = r#"
personal:
  nama_peserta: "Budi Santoso"
  tanggal_lahir: "1995-04-12"
  nama_pt: "PT Maju"
  sdr_sdri: "SDR"
  jenis_kelamin: "Laki-laki"
  tanggal_tes: "2026-10-01"
  phq: "7"
ist:
  se_konkrit_praktis: 100
  wa_verbal: 110
  an_fleksibilitas_pikir: 95
  ge_daya_abstraksi_verbal: 120
  ra_berpikir_praktis: 105
papikostick:
  n: 3
  g: 5
  w: 9
"#;
        let form: SubmissionForm = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(form.personal.nama_peserta.as_deref(), Some("Budi Santoso"));
        assert_eq!(form.personal.phq.as_deref(), Some("7"));
        assert_eq!(form.ist.wa_verbal, 110.0);
        assert_eq!(form.papikostick.g, 5.0);
        assert_eq!(form.papikostick.w, 9.0);
        assert_eq!(form.papikostick.a, 0.0);
    }

    #[test]
    fn test_empty_submission_uses_defaults() {
        let form: SubmissionForm = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(form, SubmissionForm::default());
        assert_eq!(form.ist, IstInput::default());
    }

    #[test]
    fn test_unknown_trait_rejected() {
        let yaml = r#"
papikostick:
  q: 3
"#;
        let result: Result<SubmissionForm, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_ist_field_rejected() {
        let yaml = r#"
ist:
  wa_verbal: 110
  wa_verbl: 90
"#;
        let result: Result<SubmissionForm, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_null_score_reads_as_zero() {
        let yaml = r#"
ist:
  wa_verbal: ~
papikostick:
  n: 2
"#;
        let form: SubmissionForm = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(form.ist.wa_verbal, 0.0);
        assert_eq!(form.papikostick.n, 2.0);
    }
}
