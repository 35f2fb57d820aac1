//! Live/historical merge with live precedence.

use std::collections::HashSet;

use super::observation::RoundObservation;

/// Bounds applied to a single merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeLimits {
    /// Maximum historical entries contributed to the output.
    pub max_historical: usize,
    /// Maximum historical entries examined.
    pub historical_scan: usize,
    /// Maximum live entries examined, counted from the newest.
    pub live_scan: usize,
}

impl Default for MergeLimits {
    fn default() -> Self {
        Self {
            max_historical: 30,
            historical_scan: 500,
            live_scan: 100,
        }
    }
}

/// Combines live and historical observations into one deduplicated list.
///
/// Live entries (expected oldest-first) come first, in input order; only the
/// newest `live_scan` of them are examined. Historical entries (expected
/// most-recent-first) follow, skipping any id already present. Repeated
/// ids within one input keep their first occurrence. The output depends
/// only on input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeDeduplicator {
    limits: MergeLimits,
}

impl MergeDeduplicator {
    #[must_use]
    pub fn new(limits: MergeLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> MergeLimits {
        self.limits
    }

    #[must_use]
    pub fn merge(
        &self,
        live: &[RoundObservation],
        historical: &[RoundObservation],
    ) -> Vec<RoundObservation> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        let skip = live.len().saturating_sub(self.limits.live_scan);
        for obs in &live[skip..] {
            if seen.insert(&obs.entity_id) {
                merged.push(obs.clone());
            }
        }

        let mut contributed = 0;
        for obs in historical.iter().take(self.limits.historical_scan) {
            if contributed >= self.limits.max_historical {
                break;
            }
            if seen.insert(&obs.entity_id) {
                merged.push(obs.clone());
                contributed += 1;
            }
        }

        merged
    }
}
