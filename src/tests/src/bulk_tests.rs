//! Tests for concurrent bulk transfers.

use cli::commands::bulk::ensure_complete;
use cli::CliError;
use ethers::{
    signers::LocalWallet,
    types::{Address, U256},
};
use std::collections::HashMap;
use workflow::memory::{FailureMode, InMemoryToken};
use workflow::{bulk_transfer, distribute, BulkTransferConfig, ChainError, Wallet, WorkflowError};

fn wallets(count: usize) -> Vec<Wallet> {
    (0..count)
        .map(|i| Wallet::from_signer(format!("acc{}", i + 1), LocalWallet::new(&mut rand::thread_rng())))
        .collect()
}

fn token() -> InMemoryToken {
    InMemoryToken::new(Address::repeat_byte(0x22), "tango1", "TNG1").unwrap()
}

/// Tests that every wallet keeps its own gapless nonce sequence.
#[tokio::test]
async fn test_concurrent_wallets_keep_nonce_order() {
    let token = token();
    let senders = wallets(4);
    let destination = Address::repeat_byte(0x90);
    for sender in &senders {
        token.mint(sender.address(), U256::from(100));
    }

    let config = BulkTransferConfig {
        destination,
        amount: U256::from(2),
        repeat: 10,
    };
    let report = bulk_transfer(&token, &senders, &config).await;

    assert!(report.is_complete());
    assert_eq!(report.total_confirmed(), 40);
    assert!(ensure_complete(&report).is_ok());
    assert_eq!(token.balance(destination), U256::from(80));

    let expected: Vec<U256> = (0..10u64).map(U256::from).collect();
    for sender in &senders {
        assert_eq!(token.mined_nonces(sender.address()), expected);
        assert_eq!(token.balance(sender.address()), U256::from(80));
    }

    // Each receipt matches its own sender and nonce
    for run in &report.runs {
        for (i, receipt) in run.receipts.iter().enumerate() {
            assert_eq!(receipt.from, run.wallet);
            assert_eq!(receipt.nonce, U256::from(i));
        }
    }
}

/// Tests that one wallet at most has one transfer in flight.
#[tokio::test]
async fn test_one_transfer_in_flight_per_wallet() {
    let token = token();
    let senders = wallets(3);
    let destination = Address::repeat_byte(0x90);
    for sender in &senders {
        token.mint(sender.address(), U256::from(10));
    }

    let config = BulkTransferConfig {
        destination,
        amount: U256::one(),
        repeat: 5,
    };
    let report = bulk_transfer(&token, &senders, &config).await;
    assert!(report.is_complete());

    // Mining order per sender is strictly increasing in nonce
    let mut last: HashMap<Address, U256> = HashMap::new();
    for (from, nonce) in token.mined_order() {
        if let Some(previous) = last.insert(from, nonce) {
            assert_eq!(nonce, previous + 1);
        }
    }
    assert_eq!(last.len(), 3);
}

/// Tests that a reverted transfer stops only its own wallet.
#[tokio::test]
async fn test_reverted_transfer_stops_its_wallet() {
    let token = token();
    let senders = wallets(3);
    let destination = Address::repeat_byte(0x90);
    for sender in &senders {
        token.mint(sender.address(), U256::from(100));
    }
    token.fail_transfer_at(senders[1].address(), 3, FailureMode::Revert);

    let config = BulkTransferConfig {
        destination,
        amount: U256::from(5),
        repeat: 6,
    };
    let report = bulk_transfer(&token, &senders, &config).await;

    assert!(!report.is_complete());
    assert_eq!(report.total_confirmed(), 6 + 3 + 6);
    let failed: Vec<&str> = report.failures().map(|run| run.label.as_str()).collect();
    assert_eq!(failed, vec!["acc2"]);
    match &report.runs[1].error {
        Some(WorkflowError::Transfer { wallet, index, source }) => {
            assert_eq!(*wallet, senders[1].address());
            assert_eq!(*index, 3);
            assert!(matches!(source, ChainError::Reverted(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The reverted transaction consumed a nonce
    assert_eq!(token.mined_nonces(senders[1].address()).len(), 4);
    assert_eq!(token.balance(destination), U256::from(75));

    match ensure_complete(&report) {
        Err(CliError::BulkIncomplete { failed, total }) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Tests a run that is not funded.
#[tokio::test]
async fn test_unfunded_wallet_fails_first_transfer() {
    let token = token();
    let senders = wallets(2);
    token.mint(senders[0].address(), U256::from(10));

    let config = BulkTransferConfig {
        destination: Address::repeat_byte(0x90),
        amount: U256::one(),
        repeat: 3,
    };
    let report = bulk_transfer(&token, &senders, &config).await;

    assert_eq!(report.runs[0].receipts.len(), 3);
    assert!(report.runs[1].receipts.is_empty());
    assert!(matches!(
        report.runs[1].error,
        Some(WorkflowError::Transfer { index: 0, .. })
    ));
}

/// Tests funding the senders from the first one before the run.
#[tokio::test]
async fn test_distribute_then_bulk() {
    let token = token();
    let senders = wallets(4);
    let destination = Address::repeat_byte(0x90);
    token.mint(senders[0].address(), U256::from(1000));

    let recipients: Vec<Address> = senders[1..].iter().map(Wallet::address).collect();
    let outcome = distribute(&token, &senders[0], &recipients).await.unwrap();
    assert_eq!(outcome.plan.share, U256::from(250));

    let config = BulkTransferConfig {
        destination,
        amount: U256::from(10),
        repeat: 5,
    };
    let report = bulk_transfer(&token, &senders, &config).await;

    assert!(report.is_complete());
    assert_eq!(token.balance(destination), U256::from(200));
    // The cached lane continues after the distribution
    let nonces: Vec<U256> = (0..8u64).map(U256::from).collect();
    assert_eq!(token.mined_nonces(senders[0].address()), nonces);
    assert_eq!(token.balance(senders[0].address()), U256::from(200));
}
