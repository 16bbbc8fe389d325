use crate::records::types::{
    IstInput, IstScores, PapikostickComposites, PapikostickInput, PapikostickScores,
};

use super::classify::classify_iq;

/// Arithmetic mean; an empty slice averages to 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// IQ is the plain mean of the five IST sub-tests.
pub fn iq(ist: &IstInput) -> f64 {
    mean(&[
        ist.se_konkrit_praktis,
        ist.wa_verbal,
        ist.an_fleksibilitas_pikir,
        ist.ge_daya_abstraksi_verbal,
        ist.ra_berpikir_praktis,
    ])
}

/// WA GE: mean of the verbal and verbal-abstraction sub-tests.
pub fn verbal_composite(ist: &IstInput) -> f64 {
    mean(&[ist.wa_verbal, ist.ge_daya_abstraksi_verbal])
}

pub fn composites(p: &PapikostickInput) -> PapikostickComposites {
    PapikostickComposites {
        ng: mean(&[p.n, p.g]),
        cdr: mean(&[p.c, p.d, p.r]),
        tv: mean(&[p.t, p.v]),
        pi: mean(&[p.p, p.i]),
        bs: mean(&[p.b, p.s]),
        zk: mean(&[p.z, p.k]),
    }
}

/// Attach IQ, its classification and WA GE to raw IST scores.
pub fn score_ist(raw: IstInput) -> IstScores {
    let iq = iq(&raw);
    IstScores {
        raw,
        iq,
        iq_classification: Some(classify_iq(iq).label().to_string()),
        wa_ge: verbal_composite(&raw),
    }
}

pub fn score_papikostick(raw: PapikostickInput) -> PapikostickScores {
    PapikostickScores {
        raw,
        composites: composites(&raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn ist(se: f64, wa: f64, an: f64, ge: f64, ra: f64) -> IstInput {
        IstInput {
            se_konkrit_praktis: se,
            wa_verbal: wa,
            an_fleksibilitas_pikir: an,
            ge_daya_abstraksi_verbal: ge,
            ra_berpikir_praktis: ra,
        }
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_iq_is_mean_of_five() {
        let samples = [
            ist(100.0, 110.0, 95.0, 120.0, 105.0),
            ist(0.0, 0.0, 0.0, 0.0, 0.0),
            ist(1.0, 2.0, 3.0, 4.0, 5.0),
            ist(87.5, 91.25, 133.0, 64.0, 101.0),
        ];
        for s in samples {
            let expected = (s.se_konkrit_praktis
                + s.wa_verbal
                + s.an_fleksibilitas_pikir
                + s.ge_daya_abstraksi_verbal
                + s.ra_berpikir_praktis)
                / 5.0;
            assert!((iq(&s) - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_verbal_composite() {
        let s = ist(0.0, 100.0, 0.0, 120.0, 0.0);
        assert!((verbal_composite(&s) - 110.0).abs() < EPS);
    }

    #[test]
    fn test_pair_composite() {
        let p = PapikostickInput {
            n: 3.0,
            g: 5.0,
            ..Default::default()
        };
        assert!((composites(&p).ng - 4.0).abs() < EPS);
    }

    #[test]
    fn test_all_composites_are_means() {
        let p = PapikostickInput {
            n: 1.0,
            g: 2.0,
            c: 3.0,
            d: 4.0,
            r: 8.0,
            t: 6.0,
            v: 7.0,
            p: 9.0,
            i: 0.0,
            b: 2.0,
            s: 5.0,
            z: 4.0,
            k: 4.0,
            ..Default::default()
        };
        let c = composites(&p);
        assert!((c.ng - 1.5).abs() < EPS);
        assert!((c.cdr - 5.0).abs() < EPS);
        assert!((c.tv - 6.5).abs() < EPS);
        assert!((c.pi - 4.5).abs() < EPS);
        assert!((c.bs - 3.5).abs() < EPS);
        assert!((c.zk - 4.0).abs() < EPS);
    }

    #[test]
    fn test_score_ist_attaches_classification() {
        let scored = score_ist(ist(100.0, 100.0, 100.0, 100.0, 100.0));
        assert!((scored.iq - 100.0).abs() < EPS);
        assert_eq!(scored.iq_classification.as_deref(), Some("Average"));
        assert!((scored.wa_ge - 100.0).abs() < EPS);
    }

    #[test]
    fn test_score_ist_all_zero() {
        let scored = score_ist(IstInput::default());
        assert_eq!(scored.iq, 0.0);
        assert_eq!(
            scored.iq_classification.as_deref(),
            Some("Intellectual Disability")
        );
    }

    #[test]
    fn test_score_papikostick_keeps_raw() {
        let raw = PapikostickInput {
            w: 6.0,
            ..Default::default()
        };
        let scored = score_papikostick(raw);
        assert_eq!(scored.raw, raw);
        assert_eq!(scored.composites.ng, 0.0);
    }
}
