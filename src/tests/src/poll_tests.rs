//! Tests for scheduled token polling.

use ethers::{
    signers::LocalWallet,
    types::{Address, U256},
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use workflow::memory::{InMemoryChain, InMemoryToken};
use workflow::{
    poll_once, Heartbeat, ManualClock, PeriodicTask, PollOptions, PollReport, Schedule, Wallet,
    WorkflowError,
};

const INTERVAL: Duration = Duration::from_secs(5);

fn wallet(label: &str) -> Wallet {
    Wallet::from_signer(label, LocalWallet::new(&mut rand::thread_rng()))
}

/// Starts a task polling every token on each tick and forwarding the reports.
fn start_polling(
    clock: Arc<ManualClock>,
    tokens: Arc<Vec<InMemoryToken>>,
    options: PollOptions,
) -> (PeriodicTask, mpsc::UnboundedReceiver<Vec<Result<PollReport, WorkflowError>>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let options = Arc::new(options);

    let task = PeriodicTask::start(clock, Schedule::every(INTERVAL), move |_| {
        let tokens = tokens.clone();
        let options = options.clone();
        let tx = tx.clone();
        async move {
            let reports = join_all(tokens.iter().map(|token| poll_once(token, options.as_ref()))).await;
            let failed = reports.iter().filter(|report| report.is_err()).count();
            let _ = tx.send(reports);
            if failed == 0 {
                Ok(())
            } else {
                Err(format!("{} polls failed", failed))
            }
        }
    });

    (task, rx)
}

/// Tests that each tick reads every token and sees new transfers.
#[tokio::test]
async fn test_ticks_poll_every_token() {
    let sender = wallet("acc1");
    let tokens = Arc::new(vec![
        InMemoryToken::new(Address::repeat_byte(1), "tango0", "TNG0").unwrap(),
        InMemoryToken::new(Address::repeat_byte(2), "tango1", "TNG1").unwrap(),
    ]);
    tokens[0].mint(sender.address(), U256::from(500));
    tokens[1].mint(sender.address(), U256::from(700));

    let clock = Arc::new(ManualClock::new());
    let (task, mut rx) = start_polling(clock.clone(), tokens.clone(), PollOptions::default());

    clock.advance(INTERVAL);
    let first = rx.recv().await.unwrap();
    let symbols: Vec<String> = first
        .iter()
        .map(|report| report.as_ref().unwrap().summary.symbol.clone())
        .collect();
    assert_eq!(symbols, vec!["TNG0", "TNG1"]);
    assert!(first[0].as_ref().unwrap().events.is_empty());

    sender
        .send_and_confirm(&tokens[1], Address::repeat_byte(9), U256::from(7))
        .await
        .unwrap();

    clock.advance(INTERVAL);
    let second = rx.recv().await.unwrap();
    assert!(second[0].as_ref().unwrap().events.is_empty());
    let report = second[1].as_ref().unwrap();
    assert_eq!(report.summary.total_supply, U256::from(700));
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].amount, U256::from(7));

    assert_eq!(task.stop().await, 2);
}

/// Tests that an unreachable token does not stop the other polls or later ticks.
#[tokio::test]
async fn test_offline_token_is_retried_next_tick() {
    let tokens = Arc::new(vec![
        InMemoryToken::new(Address::repeat_byte(1), "tango0", "TNG0").unwrap(),
        InMemoryToken::new(Address::repeat_byte(2), "tango1", "TNG1").unwrap(),
    ]);
    tokens[0].set_offline(true);

    let clock = Arc::new(ManualClock::new());
    let (task, mut rx) = start_polling(clock.clone(), tokens.clone(), PollOptions::default());

    clock.advance(INTERVAL);
    let first = rx.recv().await.unwrap();
    assert!(first[0].is_err());
    assert!(first[1].is_ok());

    tokens[0].set_offline(false);
    clock.advance(INTERVAL);
    let second = rx.recv().await.unwrap();
    assert!(second.iter().all(Result::is_ok));

    assert_eq!(task.stop().await, 2);
}

/// Tests that a missed interval is skipped rather than replayed.
#[tokio::test]
async fn test_missed_ticks_are_skipped() {
    let tokens = Arc::new(vec![
        InMemoryToken::new(Address::repeat_byte(1), "tango0", "TNG0").unwrap(),
    ]);

    let clock = Arc::new(ManualClock::new());
    let (task, mut rx) = start_polling(clock.clone(), tokens, PollOptions::default());

    clock.advance(INTERVAL * 3);
    rx.recv().await.unwrap();

    clock.advance(INTERVAL);
    rx.recv().await.unwrap();

    assert_eq!(task.stop().await, 2);
    assert!(rx.try_recv().is_err());
}

/// Tests the heartbeat transfer sent on each tick.
#[tokio::test]
async fn test_heartbeat_on_every_tick() {
    let sender = wallet("acc1");
    let recipient = Address::repeat_byte(0x42);
    let tokens = Arc::new(vec![
        InMemoryToken::new(Address::repeat_byte(1), "tango0", "TNG0").unwrap(),
    ]);
    tokens[0].mint(sender.address(), U256::from(100));

    let options = PollOptions {
        lookback: 0,
        heartbeat: Some(Heartbeat {
            wallet: sender.clone(),
            to: recipient,
            amount: U256::from(10),
        }),
    };

    let clock = Arc::new(ManualClock::new());
    let (task, mut rx) = start_polling(clock.clone(), tokens.clone(), options);

    for expected in 1..=3u64 {
        clock.advance(INTERVAL);
        let reports = rx.recv().await.unwrap();
        let report = reports[0].as_ref().unwrap();
        assert_eq!(report.heartbeat_balance, Some(U256::from(10 * expected)));
        // The heartbeat was mined in the latest block
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].to, recipient);
    }

    assert_eq!(task.stop().await, 3);
    assert_eq!(tokens[0].mined_nonces(sender.address()).len(), 3);
}

/// Tests heartbeats on several tokens of one chain from a single wallet.
#[tokio::test]
async fn test_heartbeat_across_tokens_shares_nonces() {
    let sender = wallet("acc1");
    let recipient = Address::repeat_byte(0x42);
    let chain = InMemoryChain::new();
    let tokens = Arc::new(vec![
        chain.token(Address::repeat_byte(1), "tango0", "TNG0").unwrap(),
        chain.token(Address::repeat_byte(2), "tango1", "TNG1").unwrap(),
    ]);
    for token in tokens.iter() {
        token.mint(sender.address(), U256::from(100));
    }

    let options = PollOptions {
        lookback: 1,
        heartbeat: Some(Heartbeat {
            wallet: sender.clone(),
            to: recipient,
            amount: U256::from(10),
        }),
    };

    let clock = Arc::new(ManualClock::new());
    let (task, mut rx) = start_polling(clock.clone(), tokens.clone(), options);

    for expected in 1..=2u64 {
        clock.advance(INTERVAL);
        let reports = rx.recv().await.unwrap();
        for report in &reports {
            let report = report.as_ref().unwrap();
            assert_eq!(report.heartbeat_balance, Some(U256::from(10 * expected)));
        }
    }

    assert_eq!(task.stop().await, 2);
    // One nonce sequence across both tokens
    let nonces: Vec<U256> = (0..4u64).map(U256::from).collect();
    assert_eq!(chain.mined_nonces(sender.address()), nonces);
    assert_eq!(tokens[0].mined_nonces(sender.address()).len(), 2);
    assert_eq!(tokens[1].mined_nonces(sender.address()).len(), 2);
    assert_eq!(chain.block_number(), 4);
}
