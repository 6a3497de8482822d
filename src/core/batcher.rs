//! Groups resolved per-ad-unit demand into one batch per outbound bidder call.
//!
//! Ad units are visited in declared order and, inside each unit, bids in
//! resolved order. A demand joins an existing batch only when both ends sit at
//! an ad-unit boundary: the batch's latest entry was the trailing demand of its
//! ad unit, and the new demand is the trailing demand of the current one.
//! Every other demand opens a fresh batch at the end of the list, so the same
//! bidder code may own several batches.
//!
//! A batch is "open" while its latest entry is a trailing demand. A non-trailing
//! demand for the same bidder code opens its own batch and closes the chain,
//! so later trailing demands cannot jump back over it.

use crate::domain::model::{AdUnitDemand, BidderBatch, ResolvedAdUnit};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct BidderBatcher {
    batches: Vec<BidderBatch>,
    // bidder code -> index of the batch still open for carry-over
    open: HashMap<String, usize>,
}

impl BidderBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ad_unit(&mut self, ad_unit: ResolvedAdUnit) {
        let last = ad_unit.bids.len().saturating_sub(1);

        for (index, bid) in ad_unit.bids.into_iter().enumerate() {
            let trailing = index == last;
            let demand = AdUnitDemand {
                ad_unit_code: ad_unit.code.clone(),
                sizes: ad_unit.sizes.clone(),
                bid_id: bid.bid_id,
                params: bid.params,
            };

            let carried = if trailing {
                self.open.get(&bid.bidder_code).copied()
            } else {
                None
            };

            let batch_index = match carried {
                Some(batch_index) => {
                    self.batches[batch_index].ad_units.push(demand);
                    batch_index
                }
                None => {
                    self.batches.push(BidderBatch {
                        bidder_code: bid.bidder_code.clone(),
                        ad_units: vec![demand],
                    });
                    self.batches.len() - 1
                }
            };

            if trailing {
                self.open.insert(bid.bidder_code, batch_index);
            } else {
                self.open.remove(&bid.bidder_code);
            }
        }
    }

    pub fn finish(self) -> Vec<BidderBatch> {
        self.batches
    }
}

/// Batches a sequence of resolved ad units in order.
pub fn batch_bidders<I>(ad_units: I) -> Vec<BidderBatch>
where
    I: IntoIterator<Item = ResolvedAdUnit>,
{
    let mut batcher = BidderBatcher::new();
    for ad_unit in ad_units {
        batcher.push_ad_unit(ad_unit);
    }
    batcher.finish()
}
