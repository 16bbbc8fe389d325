pub mod bands;
pub mod classify;
pub mod engine;

pub use bands::{BandTable, Threshold};
pub use classify::{
    classify_ability, classify_iq, classify_phq, classify_trait, phq_label, Band, IqClass,
    PhqSeverity, ABILITY_TABLE, IQ_TABLE, PHQ_TABLE, TRAIT_TABLE,
};
pub use engine::{composites, iq, mean, score_ist, score_papikostick, verbal_composite};
