use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;

use crate::records::types::DescriptionOption;
use crate::scoring::Band;
use crate::store::Store;

/// One sampled catalog row per band, fixed for the lifetime of a report view.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionSet {
    pub seed: u64,
    entries: HashMap<Band, DescriptionOption>,
}

impl DescriptionSet {
    /// Every band falls back to its own label.
    pub fn fallback(seed: u64) -> Self {
        Self {
            seed,
            entries: Band::ALL.iter().map(|b| (*b, fallback_for(*b))).collect(),
        }
    }

    pub fn get(&self, band: Band) -> DescriptionOption {
        self.entries
            .get(&band)
            .cloned()
            .unwrap_or_else(|| fallback_for(band))
    }

    /// Description text for `band`, never empty.
    pub fn text(&self, band: Band) -> String {
        let option = self.get(band);
        if option.description.trim().is_empty() {
            band.label().to_string()
        } else {
            option.description
        }
    }
}

fn fallback_for(band: Band) -> DescriptionOption {
    DescriptionOption {
        description: band.label().to_string(),
        kompetensi: String::new(),
        hasil_evaluasi: String::new(),
    }
}

/// Seed for one band, spread from the view seed so bands do not share a
/// random sequence.
fn band_seed(view_seed: u64, band: Band) -> u64 {
    let index = Band::ALL.iter().position(|b| *b == band).unwrap_or(0) as u64;
    // splitmix64 finalizer
    let mut z = view_seed.wrapping_add((index + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Sample one description per band, all bands concurrently.
///
/// A failed or empty lookup falls back to the band label; the failure is
/// logged and never returned.
pub async fn sample_descriptions(store: &dyn Store, view_seed: u64) -> DescriptionSet {
    let mut set = DescriptionSet::fallback(view_seed);

    let mut futures = FuturesUnordered::new();
    for band in Band::ALL {
        futures.push(async move {
            let result = store.random_description(band, band_seed(view_seed, band)).await;
            (band, result)
        });
    }

    while let Some((band, result)) = futures.next().await {
        match result {
            Ok(Some(option)) => {
                set.entries.insert(band, option);
            }
            Ok(None) => {
                tracing::debug!(band = band.code(), "no description in catalog");
            }
            Err(e) => {
                tracing::warn!(band = band.code(), error = %e, "description lookup failed");
            }
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn option(text: &str) -> DescriptionOption {
        DescriptionOption {
            description: text.to_string(),
            kompetensi: format!("{} kompetensi", text),
            hasil_evaluasi: format!("{} evaluasi", text),
        }
    }

    #[test]
    fn test_band_seeds_differ() {
        let seeds: std::collections::HashSet<u64> =
            Band::ALL.iter().map(|b| band_seed(7, *b)).collect();
        assert_eq!(seeds.len(), 5);
    }

    #[tokio::test]
    async fn test_sample_uses_catalog_and_falls_back() {
        let store = MemoryStore::new();
        store.add_description(Band::Good, option("Baik sekali")).unwrap();

        let set = sample_descriptions(&store, 1).await;
        assert_eq!(set.get(Band::Good), option("Baik sekali"));
        assert_eq!(set.text(Band::Low), "Low");
        assert_eq!(set.get(Band::Low).kompetensi, "");
    }

    #[tokio::test]
    async fn test_sample_failure_falls_back() {
        let store = MemoryStore::new();
        store.add_description(Band::High, option("Tinggi")).unwrap();
        store
            .fail_table(crate::records::types::DESCRIPTION_TABLE)
            .unwrap();

        let set = sample_descriptions(&store, 1).await;
        assert_eq!(set, DescriptionSet::fallback(1));
    }

    #[tokio::test]
    async fn test_same_seed_same_sample() {
        let store = MemoryStore::new();
        for i in 0..8 {
            store
                .add_description(Band::Sufficient, option(&format!("c{}", i)))
                .unwrap();
        }
        let a = sample_descriptions(&store, 99).await;
        let b = sample_descriptions(&store, 99).await;
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_description_uses_label() {
        let mut set = DescriptionSet::fallback(0);
        set.entries.insert(Band::Good, option("  "));
        assert_eq!(set.text(Band::Good), "Good");
    }
}
