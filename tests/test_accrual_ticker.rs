//! # Accrual Ticker Tests
//!
//! Drives the pending-rewards ticker on tokio's paused clock.
//!
//! ## Test Overview
//!
//! | Test | Description | Expected Outcome |
//! |------|-------------|------------------|
//! | `test_two_nfts_half_day` | Two accruing NFTs, 12h without refresh | 2.0 grows to 3.0 |
//! | `test_estimate_is_monotonic_between_refreshes` | Sample every minute | Never decreases |
//! | `test_refresh_overrides_estimate` | Lower authoritative value arrives | Estimate equals it exactly |
//! | `test_no_active_nfts` | Only inactive NFTs | Pinned at 0 at every tick |
//! | `test_new_nfts_hold_base_credit` | Never-distributed NFTs | Base credit, no growth |
//! | `test_stop_freezes_published_value` | Stop, then wait | Published value unchanged |

mod helpers;

use helpers::test_builder::RewardScenarioBuilder;
use limitless_client::accrual::AccrualTicker;
use limitless_client::config::AccrualSettings;
use tokio::time::{sleep, Duration};

fn ticker() -> AccrualTicker {
    AccrualTicker::new(AccrualSettings::default(), Duration::from_secs(1))
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Two NFTs accrue one token per day each.
///
/// # Expected Outcome
///
/// After 43,200 seconds the estimate is `2 + 2 * 0.5 = 3.0`.
#[tokio::test(start_paused = true)]
async fn test_two_nfts_half_day() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ticker = ticker();
    ticker.reconcile(&RewardScenarioBuilder::new().accruing_nft(1.0).accruing_nft(1.0).build());
    ticker.start();
    assert_eq!(ticker.current().estimate, 2.0);

    sleep(Duration::from_secs(43_200)).await;
    settle().await;

    let estimate = ticker.current().estimate;
    assert!((estimate - 3.0).abs() < 1e-4, "estimate after 12h: {estimate}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_estimate_is_monotonic_between_refreshes() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ticker = ticker();
    ticker.reconcile(&RewardScenarioBuilder::new().accruing_nft(0.25).new_nft().build());
    ticker.start();

    let mut last = ticker.current().estimate;
    for _ in 0..120 {
        sleep(Duration::from_secs(60)).await;
        settle().await;
        let next = ticker.current().estimate;
        assert!(next >= last, "estimate went from {last} to {next}");
        last = next;
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_refresh_overrides_estimate() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ticker = ticker();
    ticker.reconcile(&RewardScenarioBuilder::new().accruing_nft(10.0).build());
    ticker.start();
    sleep(Duration::from_secs(7_200)).await;
    settle().await;
    assert!(ticker.current().estimate > 10.0);

    ticker.reconcile(&RewardScenarioBuilder::new().accruing_nft(0.5).build());
    settle().await;

    assert_eq!(ticker.current().estimate, 0.5);
    assert_eq!(ticker.current().authoritative, 0.5);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_no_active_nfts() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ticker = ticker();
    ticker.reconcile(&RewardScenarioBuilder::new().inactive_nft(3.0).build());
    ticker.start();

    let mut updates = ticker.subscribe();
    for _ in 0..5 {
        updates.changed().await?;
        assert_eq!(updates.borrow_and_update().estimate, 0.0);
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_new_nfts_hold_base_credit() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ticker = ticker();
    ticker.reconcile(&RewardScenarioBuilder::new().new_nft().new_nft().new_nft().build());
    ticker.start();

    sleep(Duration::from_secs(86_400)).await;
    settle().await;

    let state = ticker.current();
    assert_eq!(state.estimate, 3.0);
    assert_eq!(state.accruing, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_freezes_published_value() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ticker = ticker();
    ticker.reconcile(&RewardScenarioBuilder::new().accruing_nft(1.0).build());
    ticker.start();
    sleep(Duration::from_secs(600)).await;
    settle().await;

    ticker.stop();
    settle().await;
    let updates = ticker.subscribe();
    let frozen = *updates.borrow();

    sleep(Duration::from_secs(86_400)).await;
    settle().await;

    assert_eq!(*updates.borrow(), frozen);
    assert!(!updates.has_changed()?);
    Ok(())
}
