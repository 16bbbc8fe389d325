use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const PERSONAL_TABLE: &str = "personal_info";
pub const IST_TABLE: &str = "ist";
pub const PAPIKOSTICK_TABLE: &str = "papikostick";
pub const DESCRIPTION_TABLE: &str = "description_options";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Salutation {
    #[default]
    #[serde(rename = "SDR")]
    Sdr,
    #[serde(rename = "SDRI")]
    Sdri,
}

impl Salutation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Salutation::Sdr => "SDR",
            Salutation::Sdri => "SDRI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "SDR" => Some(Salutation::Sdr),
            "SDRI" => Some(Salutation::Sdri),
            _ => None,
        }
    }
}

impl fmt::Display for Salutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    #[serde(rename = "Laki-laki")]
    Male,
    #[serde(rename = "Perempuan")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Laki-laki",
            Sex::Female => "Perempuan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Laki-laki" => Some(Sex::Male),
            "Perempuan" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Personal information as written to `personal_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub no_tes: String,
    pub nama_peserta: String,
    pub tanggal_lahir: NaiveDate,
    #[serde(default)]
    pub nama_pt: Option<String>,
    pub sdr_sdri: Salutation,
    pub jenis_kelamin: Sex,
    pub tanggal_tes: NaiveDate,
    #[serde(default)]
    pub phq: Option<String>,
    #[serde(default)]
    pub keterangan_phq: Option<String>,
}

/// A stored `personal_info` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub info: PersonalInfo,
}

/// Raw IST sub-test scores. Omitted or null scores read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IstInput {
    #[serde(deserialize_with = "null_as_zero")]
    pub se_konkrit_praktis: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub wa_verbal: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub an_fleksibilitas_pikir: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub ge_daya_abstraksi_verbal: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub ra_berpikir_praktis: f64,
}

impl IstInput {
    /// Sub-test field names paired with their scores.
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("se_konkrit_praktis", self.se_konkrit_praktis),
            ("wa_verbal", self.wa_verbal),
            ("an_fleksibilitas_pikir", self.an_fleksibilitas_pikir),
            ("ge_daya_abstraksi_verbal", self.ge_daya_abstraksi_verbal),
            ("ra_berpikir_praktis", self.ra_berpikir_praktis),
        ]
    }
}

/// IST scores with the derived IQ fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IstScores {
    #[serde(flatten)]
    pub raw: IstInput,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub iq: f64,
    #[serde(default)]
    pub iq_classification: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub wa_ge: f64,
}

/// Raw PAPIKOSTICK trait scores, one per letter. Omitted or null scores
/// read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PapikostickInput {
    #[serde(deserialize_with = "null_as_zero")]
    pub n: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub g: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub a: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub l: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub p: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub i: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub t: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub v: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub s: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub b: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub o: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub c: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub d: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub r: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub z: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub e: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub k: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub f: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub w: f64,
}

impl PapikostickInput {
    /// Trait letters paired with their scores, in inventory order.
    pub fn letters(&self) -> [(&'static str, f64); 20] {
        [
            ("N", self.n),
            ("G", self.g),
            ("A", self.a),
            ("L", self.l),
            ("P", self.p),
            ("I", self.i),
            ("T", self.t),
            ("V", self.v),
            ("S", self.s),
            ("B", self.b),
            ("O", self.o),
            ("X", self.x),
            ("C", self.c),
            ("D", self.d),
            ("R", self.r),
            ("Z", self.z),
            ("E", self.e),
            ("K", self.k),
            ("F", self.f),
            ("W", self.w),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PapikostickComposites {
    #[serde(deserialize_with = "null_as_zero")]
    pub ng: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub cdr: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub tv: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub pi: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub bs: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub zk: f64,
}

impl PapikostickComposites {
    pub fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("NG", self.ng),
            ("CDR", self.cdr),
            ("TV", self.tv),
            ("PI", self.pi),
            ("BS", self.bs),
            ("ZK", self.zk),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PapikostickScores {
    #[serde(flatten)]
    pub raw: PapikostickInput,
    #[serde(flatten)]
    pub composites: PapikostickComposites,
}

/// Child row keyed by the parent `personal_info` id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRow<T> {
    pub personal_info_id: String,
    #[serde(flatten)]
    pub scores: T,
}

pub type IstRow = ChildRow<IstScores>;
pub type PapikostickRow = ChildRow<PapikostickScores>;

/// A personal record with its nested test results, as read for reports
/// and exports. Either child may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    #[serde(flatten)]
    pub personal: PersonalRecord,
    #[serde(default, deserialize_with = "one_or_none")]
    pub ist: Option<IstScores>,
    #[serde(default, deserialize_with = "one_or_none")]
    pub papikostick: Option<PapikostickScores>,
}

/// A catalog row of descriptive text for one band.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DescriptionOption {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub kompetensi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hasil_evaluasi: String,
}

/// Embedded one-to-one relations come back either as an object or as a
/// one-element array depending on how the foreign key is declared.
fn one_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        },
        Some(other) => other,
    };
    serde_json::from_value(value)
        .map(Some)
        .map_err(D::Error::custom)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}
