use crate::records::types::TestReport;
use crate::scoring::{classify_ability, classify_trait, Band};

use super::describe::DescriptionSet;

/// Which banding a competency uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// IST-scale scores around 100.
    Ability,
    /// PAPIKOSTICK 0-9 scores.
    Trait,
}

/// Source score of a competency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Ra,
    An,
    WaGe,
    Se,
    Cdr,
    Ng,
    Tv,
    A,
    Pi,
    Bs,
    E,
    W,
    Zk,
}

impl Source {
    /// Score read from the report; a missing child reads as 0.
    pub fn value(&self, report: &TestReport) -> f64 {
        let ist = report.ist.as_ref();
        let papi = report.papikostick.as_ref();
        let value = match self {
            Source::Ra => ist.map(|s| s.raw.ra_berpikir_praktis),
            Source::An => ist.map(|s| s.raw.an_fleksibilitas_pikir),
            Source::WaGe => ist.map(|s| s.wa_ge),
            Source::Se => ist.map(|s| s.raw.se_konkrit_praktis),
            Source::Cdr => papi.map(|p| p.composites.cdr),
            Source::Ng => papi.map(|p| p.composites.ng),
            Source::Tv => papi.map(|p| p.composites.tv),
            Source::A => papi.map(|p| p.raw.a),
            Source::Pi => papi.map(|p| p.composites.pi),
            Source::Bs => papi.map(|p| p.composites.bs),
            Source::E => papi.map(|p| p.raw.e),
            Source::W => papi.map(|p| p.raw.w),
            Source::Zk => papi.map(|p| p.composites.zk),
        };
        value.unwrap_or(0.0)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Source::Ra => "RA",
            Source::An => "AN",
            Source::WaGe => "WA GE",
            Source::Se => "SE",
            Source::Cdr => "CDR",
            Source::Ng => "NG",
            Source::Tv => "TV",
            Source::A => "A",
            Source::Pi => "PI",
            Source::Bs => "BS",
            Source::E => "E",
            Source::W => "W",
            Source::Zk => "ZK",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Competency {
    pub name: &'static str,
    pub source: Source,
    pub scale: Scale,
}

pub const COMPETENCIES: [Competency; 13] = [
    Competency { name: "Logika Berpikir", source: Source::Ra, scale: Scale::Ability },
    Competency { name: "Daya Analisa", source: Source::An, scale: Scale::Ability },
    Competency { name: "Kemampuan Verbal", source: Source::WaGe, scale: Scale::Ability },
    Competency { name: "Kemampuan Numerik", source: Source::Se, scale: Scale::Ability },
    Competency { name: "Sistematika Kerja", source: Source::Cdr, scale: Scale::Trait },
    Competency { name: "Orientasi Hasil", source: Source::Ng, scale: Scale::Trait },
    Competency { name: "Fleksibilitas", source: Source::Tv, scale: Scale::Trait },
    Competency { name: "Motivasi Berprestasi", source: Source::A, scale: Scale::Trait },
    Competency { name: "Kerjasama", source: Source::Pi, scale: Scale::Trait },
    Competency { name: "Keterampilan Interpersonal", source: Source::Bs, scale: Scale::Trait },
    Competency { name: "Stabilitas Emosi", source: Source::E, scale: Scale::Trait },
    Competency { name: "Pengembangan Diri", source: Source::W, scale: Scale::Trait },
    Competency { name: "Mengelola Perubahan", source: Source::Zk, scale: Scale::Trait },
];

/// One rendered line of the competency section.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetencyLine {
    pub name: &'static str,
    pub source: &'static str,
    pub score: f64,
    pub band: Band,
    pub description: String,
}

impl CompetencyLine {
    /// `<band> - <description>`
    pub fn summary(&self) -> String {
        format!("{} - {}", self.band.label(), self.description)
    }
}

pub fn evaluate(report: &TestReport, descriptions: &DescriptionSet) -> Vec<CompetencyLine> {
    COMPETENCIES
        .iter()
        .map(|c| {
            let score = c.source.value(report);
            let band = match c.scale {
                Scale::Ability => classify_ability(score),
                Scale::Trait => classify_trait(score),
            };
            CompetencyLine {
                name: c.name,
                source: c.source.code(),
                score,
                band,
                description: descriptions.text(band),
            }
        })
        .collect()
}
