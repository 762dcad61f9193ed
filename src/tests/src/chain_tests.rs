//! Tests against a local development node.
//!
//! They expect a hardhat node on 127.0.0.1:8545 with its default accounts
//! and the contract artifacts built under `contracts/artifacts`.

use chain::deploy::{deploy_all, new_deploy_client};
use chain::{Artifact, EthTokenClient};
use cli::{OpsConfig, WalletSet};
use ethers::types::{Address, U256};
use serial_test::serial;
use tokio::runtime::Runtime;
use workflow::{
    bulk_transfer, distribute, poll_once, read_summary, BulkTransferConfig, PollOptions, TokenClient,
    TokenHandle,
};

const RPC_URL: &str = "http://127.0.0.1:8545";

/// Deploys two fresh tokens and returns their addresses.
async fn deploy_tokens(config: &OpsConfig, wallets: &WalletSet) -> Vec<Address> {
    let token_artifact = Artifact::load(&config.artifacts.token).unwrap();
    let swap_artifact = Artifact::load(&config.artifacts.swap).unwrap();
    let client = new_deploy_client(RPC_URL, wallets.get(0).unwrap()).await.unwrap();
    let deployment = deploy_all(client, &token_artifact, &swap_artifact, 2).await.unwrap();
    deployment.tokens.iter().map(|token| token.address).collect()
}

/// Tests reading a deployed token.
#[test]
#[serial]
#[ignore] // Requires a local Ethereum node
fn test_read_deployed_token() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let config = OpsConfig::default();
        let wallets = WalletSet::from_config(&config.wallets).unwrap();
        let tokens = deploy_tokens(&config, &wallets).await;

        let client = EthTokenClient::connect(RPC_URL, TokenHandle::erc20(tokens[0]).unwrap(), 1)
            .await
            .unwrap();
        let summary = read_summary(&client).await.unwrap();
        assert_eq!(summary.name, "tango0");
        assert_eq!(summary.symbol, "TNG0");
        assert!(!summary.total_supply.is_zero());
    });
}

/// Tests distribution and a short bulk run on a live chain.
#[test]
#[serial]
#[ignore] // Requires a local Ethereum node
fn test_distribute_and_bulk_transfer() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let config = OpsConfig::default();
        let wallets = WalletSet::from_config(&config.wallets).unwrap();
        let tokens = deploy_tokens(&config, &wallets).await;
        let client = EthTokenClient::connect(RPC_URL, TokenHandle::erc20(tokens[1]).unwrap(), 1)
            .await
            .unwrap();

        let source = wallets.get(0).unwrap();
        let outcome = distribute(&client, source, &wallets.others(0)).await.unwrap();
        assert_eq!(outcome.receipts.len(), 3);
        for address in wallets.others(0) {
            assert_eq!(client.balance_of(address).await.unwrap(), outcome.plan.share);
        }

        let destination = Address::repeat_byte(0x90);
        let before = client.balance_of(destination).await.unwrap();
        let senders = wallets.select(&[]).unwrap();
        let report = bulk_transfer(
            &client,
            &senders,
            &BulkTransferConfig {
                destination,
                amount: U256::one(),
                repeat: 3,
            },
        )
        .await;
        assert!(report.is_complete());
        assert_eq!(
            client.balance_of(destination).await.unwrap(),
            before + U256::from(12)
        );

        let report = poll_once(&client, &PollOptions::default()).await.unwrap();
        assert!(!report.events.is_empty());
    });
}
