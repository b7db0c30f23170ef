// Builder for owner reward scenarios used by the integration tests.
// Produces the same normalized records the reader hands to the estimator.

use limitless_client::floor_price::FloorPriceInputs;
use limitless_client::reader::NftRewardRecord;
use limitless_client::units::Amount;

use super::{ONE_TOKEN, ONE_USDC};

/// Distribution timestamp used for NFTs that have been distributed to.
const DISTRIBUTED_AT: u64 = 1_700_000_000;

pub struct RewardScenarioBuilder {
    records: Vec<NftRewardRecord>,
    next_token_id: u64,
}

#[allow(dead_code)]
impl RewardScenarioBuilder {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_token_id: 1,
        }
    }

    /// Active NFT that has been distributed to, holding `pending` whole tokens.
    pub fn accruing_nft(self, pending: f64) -> Self {
        self.push(true, pending, DISTRIBUTED_AT)
    }

    /// Active NFT that has not been distributed to yet.
    pub fn new_nft(self) -> Self {
        self.push(true, 0.0, 0)
    }

    /// Deactivated NFT that still reports `pending` tokens.
    pub fn inactive_nft(self, pending: f64) -> Self {
        self.push(false, pending, DISTRIBUTED_AT)
    }

    fn push(mut self, is_active: bool, pending: f64, last_distribution_time: u64) -> Self {
        let raw = (pending * ONE_TOKEN as f64) as u128;
        self.records.push(NftRewardRecord {
            is_active,
            pending: Amount::tokens(raw),
            last_distribution_time,
            ..NftRewardRecord::unavailable(self.next_token_id)
        });
        self.next_token_id += 1;
        self
    }

    pub fn build(self) -> Vec<NftRewardRecord> {
        self.records
    }
}

/// Floor-price inputs with a zero vault price, `backing` whole USDC and
/// `active_nfts` active NFTs.
#[allow(dead_code)]
pub fn stale_vault(backing: u128, active_nfts: u64) -> FloorPriceInputs {
    FloorPriceInputs {
        authoritative: Amount::zero(6),
        total_backing: Amount::new(backing * ONE_USDC, 6),
        accrued_tokens: Amount::tokens(0),
        active_nfts,
        max_supply: Amount::tokens(1_000_000_000 * ONE_TOKEN),
    }
}
