use chrono::NaiveDate;

use crate::error::ValidationErrors;
use crate::scoring::phq_label;

use super::forms::SubmissionForm;
use super::types::{IstInput, PapikostickInput, Salutation, Sex};

const MIN_NAME_CHARS: usize = 3;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Personal fields after validation, still without a test number.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPersonal {
    pub nama_peserta: String,
    pub tanggal_lahir: NaiveDate,
    pub nama_pt: Option<String>,
    pub sdr_sdri: Salutation,
    pub jenis_kelamin: Sex,
    pub tanggal_tes: NaiveDate,
    pub phq: Option<String>,
    pub keterangan_phq: Option<String>,
}

/// A submission that passed every field check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub personal: ValidPersonal,
    pub ist: IstInput,
    pub papikostick: PapikostickInput,
}

/// Validate all three forms. Returns every field error at once so the user
/// can fix the whole submission in one pass.
pub fn validate_submission(form: &SubmissionForm) -> Result<ValidSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let personal = &form.personal;

    let nama_peserta = non_empty(&personal.nama_peserta);
    match nama_peserta {
        Some(name) if name.chars().count() >= MIN_NAME_CHARS => {}
        _ => errors.push(
            "nama_peserta",
            format!("participant name is required (at least {} characters)", MIN_NAME_CHARS),
        ),
    }

    let tanggal_lahir = required_date(&mut errors, "tanggal_lahir", "birth date", &personal.tanggal_lahir);
    let tanggal_tes = required_date(&mut errors, "tanggal_tes", "test date", &personal.tanggal_tes);

    let sdr_sdri = match non_empty(&personal.sdr_sdri) {
        None => Some(Salutation::default()),
        Some(raw) => {
            let parsed = Salutation::parse(raw);
            if parsed.is_none() {
                errors.push("sdr_sdri", format!("must be SDR or SDRI, got '{}'", raw));
            }
            parsed
        }
    };

    let jenis_kelamin = match non_empty(&personal.jenis_kelamin) {
        None => Some(Sex::default()),
        Some(raw) => {
            let parsed = Sex::parse(raw);
            if parsed.is_none() {
                errors.push(
                    "jenis_kelamin",
                    format!("must be Laki-laki or Perempuan, got '{}'", raw),
                );
            }
            parsed
        }
    };

    for (field, value) in form.ist.fields() {
        check_score(&mut errors, &format!("ist.{}", field), value);
    }

    let papikostick = form.papikostick;
    for (letter, value) in papikostick.letters() {
        check_score(
            &mut errors,
            &format!("papikostick.{}", letter.to_ascii_lowercase()),
            value,
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every Option below is Some once no error was recorded.
    match (nama_peserta, tanggal_lahir, tanggal_tes, sdr_sdri, jenis_kelamin) {
        (Some(name), Some(lahir), Some(tes), Some(sdr_sdri), Some(jenis_kelamin)) => {
            let phq = non_empty(&personal.phq).map(str::to_string);
            let keterangan_phq = phq
                .as_deref()
                .and_then(phq_label)
                .map(|severity| severity.label().to_string());

            Ok(ValidSubmission {
                personal: ValidPersonal {
                    nama_peserta: name.to_string(),
                    tanggal_lahir: lahir,
                    nama_pt: non_empty(&personal.nama_pt).map(str::to_string),
                    sdr_sdri,
                    jenis_kelamin,
                    tanggal_tes: tes,
                    phq,
                    keterangan_phq,
                },
                ist: form.ist,
                papikostick,
            })
        }
        _ => Err(errors),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn required_date(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: &Option<String>,
) -> Option<NaiveDate> {
    match non_empty(value) {
        None => {
            errors.push(field, format!("{} is required", label));
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(field, format!("{} must be a date in YYYY-MM-DD form, got '{}'", label, raw));
                None
            }
        },
    }
}

fn check_score(errors: &mut ValidationErrors, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(field, "score must be a number");
    } else if value < 0.0 {
        errors.push(field, "score must not be negative");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::forms::PersonalForm;

    fn valid_form() -> SubmissionForm {
        SubmissionForm {
            personal: PersonalForm {
                nama_peserta: Some("Budi Santoso".to_string()),
                tanggal_lahir: Some("1995-04-12".to_string()),
                nama_pt: None,
                sdr_sdri: None,
                jenis_kelamin: None,
                tanggal_tes: Some("2026-10-01".to_string()),
                phq: Some("12".to_string()),
            },
            ist: IstInput {
                se_konkrit_praktis: 100.0,
                wa_verbal: 110.0,
                an_fleksibilitas_pikir: 95.0,
                ge_daya_abstraksi_verbal: 120.0,
                ra_berpikir_praktis: 105.0,
            },
            papikostick: PapikostickInput {
                n: 3.0,
                g: 5.0,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_valid_submission() {
        let valid = validate_submission(&valid_form()).unwrap();
        assert_eq!(valid.personal.nama_peserta, "Budi Santoso");
        assert_eq!(valid.personal.sdr_sdri, Salutation::Sdr);
        assert_eq!(valid.personal.jenis_kelamin, Sex::Male);
        assert_eq!(
            valid.personal.tanggal_lahir,
            NaiveDate::from_ymd_opt(1995, 4, 12).unwrap()
        );
        assert_eq!(valid.personal.keterangan_phq.as_deref(), Some("Moderate"));
        assert_eq!(valid.ist.wa_verbal, 110.0);
        assert_eq!(valid.papikostick.g, 5.0);
    }

    #[test]
    fn test_phq_without_number_has_no_label() {
        let mut form = valid_form();
        form.personal.phq = Some("not taken".to_string());
        let valid = validate_submission(&form).unwrap();
        assert_eq!(valid.personal.phq.as_deref(), Some("not taken"));
        assert_eq!(valid.personal.keterangan_phq, None);
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let mut form = valid_form();
        form.personal.phq = Some("  ".to_string());
        form.personal.nama_pt = Some(String::new());
        let valid = validate_submission(&form).unwrap();
        assert_eq!(valid.personal.phq, None);
        assert_eq!(valid.personal.keterangan_phq, None);
        assert_eq!(valid.personal.nama_pt, None);
    }

    #[test]
    fn test_short_name_rejected() {
        let mut form = valid_form();
        form.personal.nama_peserta = Some("Bu".to_string());
        let errors = validate_submission(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.for_field("nama_peserta").is_some());
    }

    #[test]
    fn test_missing_dates_rejected() {
        let mut form = valid_form();
        form.personal.tanggal_lahir = None;
        form.personal.tanggal_tes = Some("01/10/2026".to_string());
        let errors = validate_submission(&form).unwrap_err();
        assert!(errors
            .for_field("tanggal_lahir")
            .unwrap()
            .message
            .contains("required"));
        assert!(errors
            .for_field("tanggal_tes")
            .unwrap()
            .message
            .contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_invalid_enums_rejected() {
        let mut form = valid_form();
        form.personal.sdr_sdri = Some("MR".to_string());
        form.personal.jenis_kelamin = Some("other".to_string());
        let errors = validate_submission(&form).unwrap_err();
        assert!(errors.for_field("sdr_sdri").is_some());
        assert!(errors.for_field("jenis_kelamin").is_some());
    }

    #[test]
    fn test_explicit_enums_accepted() {
        let mut form = valid_form();
        form.personal.sdr_sdri = Some("SDRI".to_string());
        form.personal.jenis_kelamin = Some("Perempuan".to_string());
        let valid = validate_submission(&form).unwrap();
        assert_eq!(valid.personal.sdr_sdri, Salutation::Sdri);
        assert_eq!(valid.personal.jenis_kelamin, Sex::Female);
    }

    #[test]
    fn test_negative_scores_rejected() {
        let mut form = valid_form();
        form.ist.wa_verbal = -1.0;
        form.papikostick.k = -0.5;
        let errors = validate_submission(&form).unwrap_err();
        assert!(errors.for_field("ist.wa_verbal").is_some());
        assert!(errors.for_field("papikostick.k").is_some());
    }

    #[test]
    fn test_nan_score_rejected() {
        let mut form = valid_form();
        form.ist.ra_berpikir_praktis = f64::NAN;
        let errors = validate_submission(&form).unwrap_err();
        assert_eq!(
            errors.for_field("ist.ra_berpikir_praktis").unwrap().message,
            "score must be a number"
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let form = SubmissionForm::default();
        let errors = validate_submission(&form).unwrap_err();
        // name, birth date and test date
        assert_eq!(errors.len(), 3);
    }
}
