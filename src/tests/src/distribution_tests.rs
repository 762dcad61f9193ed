//! Tests for balance distribution.

use ethers::{
    signers::LocalWallet,
    types::{Address, U256},
};
use workflow::memory::{FailureMode, InMemoryToken};
use workflow::{distribute, snapshot_balances, ChainError, Wallet, WorkflowError};

fn wallet(label: &str) -> Wallet {
    Wallet::from_signer(label, LocalWallet::new(&mut rand::thread_rng()))
}

fn token() -> InMemoryToken {
    InMemoryToken::new(Address::repeat_byte(0x11), "tango0", "TNG0").unwrap()
}

/// Tests the split of a balance between the source and three recipients.
#[tokio::test]
async fn test_distribute_four_ways() {
    let token = token();
    let source = wallet("acc1");
    let recipients: Vec<Address> = (0..3).map(|i| wallet(&format!("acc{}", i + 2)).address()).collect();
    token.mint(source.address(), U256::from(1000));

    let outcome = distribute(&token, &source, &recipients).await.unwrap();

    assert_eq!(outcome.plan.share, U256::from(250));
    assert_eq!(outcome.receipts.len(), 3);
    for recipient in &recipients {
        assert_eq!(token.balance(*recipient), U256::from(250));
    }
    assert_eq!(token.balance(source.address()), U256::from(250));

    // Submitted in recipient order with consecutive nonces
    let nonces: Vec<U256> = (0..3u64).map(U256::from).collect();
    assert_eq!(token.mined_nonces(source.address()), nonces);
    let receivers: Vec<Address> = outcome.receipts.iter().map(|receipt| receipt.to).collect();
    assert_eq!(receivers, recipients);
}

/// Tests that the total balance is preserved.
#[tokio::test]
async fn test_distribute_preserves_total() {
    let token = token();
    let source = wallet("acc1");
    let recipients: Vec<Address> = (0..18).map(|i| wallet(&format!("r{}", i)).address()).collect();
    token.mint(source.address(), U256::from(1_000_003));

    let outcome = distribute(&token, &source, &recipients).await.unwrap();
    assert_eq!(outcome.plan.share, U256::from(1_000_003 / 19));

    let mut everyone = recipients.clone();
    everyone.push(source.address());
    let snapshots = snapshot_balances(&token, &everyone).await.unwrap();
    let total = snapshots
        .iter()
        .fold(U256::zero(), |total, snapshot| total + snapshot.amount);
    assert_eq!(total, U256::from(1_000_003));
    assert_eq!(snapshots[18].amount, outcome.plan.retained);
}

/// Tests distributing an empty balance.
#[tokio::test]
async fn test_distribute_zero_balance() {
    let token = token();
    let source = wallet("acc1");
    let recipients = vec![wallet("acc2").address(), wallet("acc3").address()];

    let outcome = distribute(&token, &source, &recipients).await.unwrap();

    assert_eq!(outcome.plan.share, U256::zero());
    assert_eq!(outcome.receipts.len(), 2);
    assert_eq!(token.balance(recipients[0]), U256::zero());
}

/// Tests that a rejected share aborts the distribution and the lane recovers.
#[tokio::test]
async fn test_rejected_share_aborts_distribution() {
    let token = token();
    let source = wallet("acc1");
    let recipients: Vec<Address> = (0..3).map(|i| wallet(&format!("acc{}", i + 2)).address()).collect();
    token.mint(source.address(), U256::from(1000));
    token.fail_transfer_at(source.address(), 1, FailureMode::Reject);

    let err = distribute(&token, &source, &recipients).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Chain(ChainError::Execution(_))));
    assert_eq!(token.balance(recipients[0]), U256::from(250));
    assert_eq!(token.balance(recipients[1]), U256::zero());
    assert_eq!(token.balance(recipients[2]), U256::zero());

    // The nonce is re-read from the chain after the failure
    let receipt = source
        .send_and_confirm(&token, recipients[1], U256::from(250))
        .await
        .unwrap();
    assert_eq!(receipt.nonce, U256::one());
}

/// Tests that a reverted share fails the distribution after all were sent.
#[tokio::test]
async fn test_reverted_share_fails_distribution() {
    let token = token();
    let source = wallet("acc1");
    let recipients: Vec<Address> = (0..3).map(|i| wallet(&format!("acc{}", i + 2)).address()).collect();
    token.mint(source.address(), U256::from(1000));
    token.fail_transfer_at(source.address(), 1, FailureMode::Revert);

    let err = distribute(&token, &source, &recipients).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Chain(ChainError::Reverted(_))));

    assert_eq!(token.mined_nonces(source.address()).len(), 3);
    assert_eq!(token.balance(recipients[0]), U256::from(250));
    assert_eq!(token.balance(recipients[1]), U256::zero());
    assert_eq!(token.balance(recipients[2]), U256::from(250));
}

/// Tests distributing with no recipients.
#[tokio::test]
async fn test_distribute_without_recipients() {
    let token = token();
    let source = wallet("acc1");
    token.mint(source.address(), U256::from(1000));

    let err = distribute(&token, &source, &[]).await.unwrap_err();
    assert_eq!(err, WorkflowError::NoRecipients);
    assert!(token.mined_order().is_empty());
}
