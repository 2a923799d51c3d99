//! Writing computed shares back onto supply-point records.
//!
//! Two behaviors exist for what a recalculation does to user-entered shares;
//! `RecalcMode` selects one. The default keeps manual overrides.

use std::collections::{BTreeMap, HashMap};

use super::shares::FaucetShare;
use crate::model::{Dataset, FarmerShare, SupplyPointId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecalcMode {
    /// Keep each recorded `share`; store the computed value in `computed` only.
    /// Farmers new to the supply point get `share = computed`.
    #[default]
    PreserveManual,
    /// Replace recorded `share` with the computed value.
    Overwrite,
}

/// New snapshot with `computed` applied to matching supply points.
///
/// - Supply points without an entry in `computed` are left unchanged.
/// - Computed farmers come first, in computed order; recorded farmers with no
///   computed share follow in their recorded order with `computed` cleared
///   (`PreserveManual`) or are removed (`Overwrite`).
pub fn apply_computed_shares(
    dataset: &Dataset,
    computed: &BTreeMap<SupplyPointId, Vec<FaucetShare>>,
    mode: RecalcMode,
) -> Dataset {
    let mut next = dataset.clone();
    for sp in &mut next.supply_points {
        let Some(list) = computed.get(&sp.id) else {
            continue;
        };
        let mut recorded: HashMap<_, _> = sp
            .shares
            .iter()
            .map(|s| (s.farmer_id.clone(), s.clone()))
            .collect();
        let mut shares: Vec<FarmerShare> = list
            .iter()
            .map(|c| {
                let existing = recorded.remove(&c.farmer);
                let share = match (mode, existing) {
                    (RecalcMode::PreserveManual, Some(e)) => e.share,
                    _ => c.share,
                };
                FarmerShare {
                    farmer_id: c.farmer.clone(),
                    share,
                    computed: Some(c.share),
                }
            })
            .collect();
        if mode == RecalcMode::PreserveManual {
            shares.extend(
                sp.shares
                    .iter()
                    .filter(|s| recorded.contains_key(&s.farmer_id))
                    .map(|s| FarmerShare {
                        computed: None,
                        ..s.clone()
                    }),
            );
        }
        sp.shares = shares;
    }
    next
}
