use serde::{Deserialize, Serialize};
use std::fmt;

use super::bands::{BandTable, Threshold};

/// IQ classification on the mean of the five IST sub-tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IqClass {
    IntellectualDisability,
    Borderline,
    BelowAverage,
    Average,
    AboveAverage,
    Superior,
    VerySuperior,
}

impl IqClass {
    pub fn label(&self) -> &'static str {
        match self {
            IqClass::IntellectualDisability => "Intellectual Disability",
            IqClass::Borderline => "Borderline",
            IqClass::BelowAverage => "Below Average",
            IqClass::Average => "Average",
            IqClass::AboveAverage => "Above Average",
            IqClass::Superior => "Superior",
            IqClass::VerySuperior => "Very Superior",
        }
    }
}

impl fmt::Display for IqClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub static IQ_TABLE: BandTable<IqClass> = BandTable {
    rows: &[
        (Threshold::Below(70.0), IqClass::IntellectualDisability),
        (Threshold::Below(80.0), IqClass::Borderline),
        (Threshold::Below(90.0), IqClass::BelowAverage),
        (Threshold::Below(110.0), IqClass::Average),
        (Threshold::Below(120.0), IqClass::AboveAverage),
        (Threshold::Below(130.0), IqClass::Superior),
    ],
    fallback: IqClass::VerySuperior,
};

pub fn classify_iq(iq: f64) -> IqClass {
    IQ_TABLE.classify(iq)
}

/// Severity of the PHQ self-report depression screening score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhqSeverity {
    None,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl PhqSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            PhqSeverity::None => "None",
            PhqSeverity::Mild => "Mild",
            PhqSeverity::Moderate => "Moderate",
            PhqSeverity::ModeratelySevere => "Moderately Severe",
            PhqSeverity::Severe => "Severe",
        }
    }
}

impl fmt::Display for PhqSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// The `<28` row and the fallback both yield Severe; the table keeps both so
// the top band saturates exactly as the scoring sheet does.
pub static PHQ_TABLE: BandTable<PhqSeverity> = BandTable {
    rows: &[
        (Threshold::Below(5.0), PhqSeverity::None),
        (Threshold::Below(10.0), PhqSeverity::Mild),
        (Threshold::Below(15.0), PhqSeverity::Moderate),
        (Threshold::Below(20.0), PhqSeverity::ModeratelySevere),
        (Threshold::Below(28.0), PhqSeverity::Severe),
    ],
    fallback: PhqSeverity::Severe,
};

pub fn classify_phq(score: f64) -> PhqSeverity {
    PHQ_TABLE.classify(score)
}

/// Derive the PHQ label from the free-text PHQ field.
///
/// Only a leading integer is read (`"12"`, `" 7 pts"`, `"3.9"` -> 3); text
/// without one yields `None` and the label stays empty.
pub fn phq_label(raw: &str) -> Option<PhqSeverity> {
    parse_leading_int(raw).map(|n| classify_phq(n as f64))
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Digit runs too long for i64 saturate instead of failing.
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(sign * magnitude)
}

/// The five generic qualitative bands shared by competency and trait scores.
/// The single-letter code keys the `description_options` catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "R")]
    Low,
    #[serde(rename = "K")]
    Lacking,
    #[serde(rename = "C")]
    Sufficient,
    #[serde(rename = "B")]
    Good,
    #[serde(rename = "T")]
    High,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::Low, Band::Lacking, Band::Sufficient, Band::Good, Band::High];

    pub fn code(&self) -> &'static str {
        match self {
            Band::Low => "R",
            Band::Lacking => "K",
            Band::Sufficient => "C",
            Band::Good => "B",
            Band::High => "T",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Low => "Low",
            Band::Lacking => "Lacking",
            Band::Sufficient => "Sufficient",
            Band::Good => "Good",
            Band::High => "High",
        }
    }

    pub fn from_code(code: &str) -> Option<Band> {
        Band::ALL.into_iter().find(|b| b.code() == code)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// PAPIKOSTICK raw traits and composites sit on a 0-9 scale. A zero score
// skips every `<` row, and so does anything above 9; both end on Sufficient.
pub static TRAIT_TABLE: BandTable<Band> = BandTable {
    rows: &[
        (Threshold::BelowNonZero(2.0), Band::Low),
        (Threshold::BelowNonZero(4.0), Band::Lacking),
        (Threshold::BelowNonZero(6.0), Band::Sufficient),
        (Threshold::BelowNonZero(9.0), Band::Good),
        (Threshold::Exactly(9.0), Band::High),
    ],
    fallback: Band::Sufficient,
};

pub fn classify_trait(score: f64) -> Band {
    TRAIT_TABLE.classify(score)
}

// IST-scale ability scores (RA, AN, SE and the WA/GE composite). A zero
// score skips every row and lands on High.
pub static ABILITY_TABLE: BandTable<Band> = BandTable {
    rows: &[
        (Threshold::BelowNonZero(80.0), Band::Low),
        (Threshold::BelowNonZero(100.0), Band::Lacking),
        (Threshold::BelowNonZero(120.0), Band::Sufficient),
        (Threshold::BelowNonZero(140.0), Band::Good),
    ],
    fallback: Band::High,
};

pub fn classify_ability(score: f64) -> Band {
    ABILITY_TABLE.classify(score)
}
