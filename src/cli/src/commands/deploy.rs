//! Deploy command for the operator CLI.

use crate::config::OpsConfig;
use crate::errors::CliError;
use crate::wallet::WalletSet;
use chain::deploy::{deploy_all, new_deploy_client, Deployment};
use chain::Artifact;
use ethers::utils::to_checksum;
use registry::{log_outcome, PairToken, RegistryClient, SwapPairRecord, TokenRecord};
use tracing::{info, warn};

/// Runs the deploy command.
///
/// The swap contract and `count` tokens are deployed by the first wallet.
/// When `register` is set every token and the first pair are reported to the
/// registry; registry failures are logged and do not fail the deployment.
pub async fn run(config: &OpsConfig, count: usize, register: bool) -> Result<Deployment, CliError> {
    let token_artifact = Artifact::load(&config.artifacts.token)?;
    let swap_artifact = Artifact::load(&config.artifacts.swap)?;

    let wallets = WalletSet::from_config(&config.wallets)?;
    let deployer = wallets.get(0)?;
    info!("Deploying from {} ({:?})", deployer.label(), deployer.address());

    let client = new_deploy_client(&config.rpc_url, deployer).await?;
    let deployment = deploy_all(client, &token_artifact, &swap_artifact, count).await?;

    if register {
        let accepted = register_deployment(config, &deployment).await;
        info!("Registry accepted {} record(s)", accepted);
    }

    Ok(deployment)
}

/// Reports every deployed token and the first pair to the registry.
///
/// Failures are logged per record and never abort the deployment. Returns the
/// number of records the registry accepted.
pub async fn register_deployment(config: &OpsConfig, deployment: &Deployment) -> usize {
    let registry = match RegistryClient::new(&config.registry_url) {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Skipping registration: {}", e);
            return 0;
        }
    };

    let mut accepted = 0;

    for token in &deployment.tokens {
        let record = TokenRecord::erc20(token.name.as_str(), to_checksum(&token.address, None));
        let result = registry.register_token(&record).await;
        if log_outcome(&format!("token {}", token.name), &result) {
            accepted += 1;
        }
    }

    if let [first, second, ..] = deployment.tokens.as_slice() {
        let record = SwapPairRecord::local(
            &config.rpc_url,
            &to_checksum(&deployment.swap, None),
            PairToken {
                symbol: first.symbol.clone(),
                address: to_checksum(&first.address, None),
            },
            PairToken {
                symbol: second.symbol.clone(),
                address: to_checksum(&second.address, None),
            },
        );
        let result = registry.register_swap_pair(&record).await;
        if log_outcome(&format!("pair {}/{}", first.symbol, second.symbol), &result) {
            accepted += 1;
        }
    }

    accepted
}
