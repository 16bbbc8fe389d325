use std::fmt;

/// A single comparison in a banding table.
///
/// `BelowNonZero` mirrors threshold chains whose guard treats a zero score
/// as "no value": the row only matches non-zero scores under the limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Below(f64),
    BelowNonZero(f64),
    Exactly(f64),
}

impl Threshold {
    pub fn matches(&self, value: f64) -> bool {
        match self {
            Threshold::Below(n) => value < *n,
            Threshold::BelowNonZero(n) => value != 0.0 && value < *n,
            Threshold::Exactly(n) => value == *n,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Below(n) => write!(f, "<{}", n),
            Threshold::BelowNonZero(n) => write!(f, "<{} (non-zero)", n),
            Threshold::Exactly(n) => write!(f, "={}", n),
        }
    }
}

/// Ordered threshold table. Rows are tried top to bottom and the first match
/// wins; `fallback` catches everything else (including NaN).
#[derive(Debug)]
pub struct BandTable<B: 'static> {
    pub rows: &'static [(Threshold, B)],
    pub fallback: B,
}

impl<B: Copy> BandTable<B> {
    pub fn classify(&self, value: f64) -> B {
        self.rows
            .iter()
            .find(|(threshold, _)| threshold.matches(value))
            .map(|(_, band)| *band)
            .unwrap_or(self.fallback)
    }
}
