//! Deployment of the swap contract and ERC20 test tokens.

use crate::artifacts::Artifact;
use crate::errors::ChainClientError;
use ethers::{
    contract::ContractFactory,
    core::types::Address,
    middleware::{Middleware, SignerMiddleware},
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
};
use log::info;
use serde::Serialize;
use std::sync::Arc;
use workflow::Wallet;

/// A signing client for deployments.
pub type DeployClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// A deployed ERC20 token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedToken {
    pub name: String,
    pub symbol: String,
    pub address: Address,
}

/// Everything deployed by [`deploy_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub swap: Address,
    pub tokens: Vec<DeployedToken>,
}

/// Name and symbol of the `index`-th test token.
pub fn token_identity(index: usize) -> (String, String) {
    (format!("tango{}", index), format!("TNG{}", index))
}

/// Creates a signing client for `wallet` on an HTTP endpoint.
pub async fn new_deploy_client(rpc_url: &str, wallet: &Wallet) -> Result<Arc<DeployClient>, ChainClientError> {
    // Create a provider
    let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
        ChainClientError::EthereumError(format!("Failed to create provider: {}", e))
    })?;

    let chain_id = provider
        .get_chainid()
        .await
        .map_err(|e| ChainClientError::EthereumError(format!("Failed to get chain id: {}", e)))?
        .as_u64();

    // Create a signer
    let signer = wallet.signer().clone().with_chain_id(chain_id);
    Ok(Arc::new(SignerMiddleware::new(provider, signer)))
}

/// Deploys a contract whose constructor takes no argument.
pub async fn deploy_swap<M: Middleware + 'static>(
    client: Arc<M>,
    artifact: &Artifact,
) -> Result<Address, ChainClientError> {
    deploy(client, artifact, ()).await
}

/// Deploys an ERC20 token with the given name and symbol.
pub async fn deploy_token<M: Middleware + 'static>(
    client: Arc<M>,
    artifact: &Artifact,
    name: &str,
    symbol: &str,
) -> Result<DeployedToken, ChainClientError> {
    let address = deploy(client, artifact, (name.to_string(), symbol.to_string())).await?;
    info!("Token {} ({}) deployed to {:?}", name, symbol, address);
    Ok(DeployedToken {
        name: name.to_string(),
        symbol: symbol.to_string(),
        address,
    })
}

/// Deploys the swap contract, then `count` tokens one after another.
pub async fn deploy_all<M: Middleware + 'static>(
    client: Arc<M>,
    token_artifact: &Artifact,
    swap_artifact: &Artifact,
    count: usize,
) -> Result<Deployment, ChainClientError> {
    let swap = deploy_swap(client.clone(), swap_artifact).await?;
    info!("Swap contract deployed to {:?}", swap);

    let mut tokens = Vec::with_capacity(count);
    for index in 0..count {
        let (name, symbol) = token_identity(index);
        tokens.push(deploy_token(client.clone(), token_artifact, &name, &symbol).await?);
    }

    Ok(Deployment { swap, tokens })
}

async fn deploy<M, T>(client: Arc<M>, artifact: &Artifact, args: T) -> Result<Address, ChainClientError>
where
    M: Middleware + 'static,
    T: ethers::abi::Tokenize,
{
    if !artifact.is_deployable() {
        return Err(ChainClientError::ArtifactError(format!(
            "{} has no bytecode",
            artifact.contract_name
        )));
    }

    let factory = ContractFactory::new(artifact.abi.clone(), artifact.bytecode.clone(), client);
    let contract = factory
        .deploy(args)
        .map_err(|e| ChainClientError::DeploymentError(format!("Failed to encode constructor: {}", e)))?
        .send()
        .await
        .map_err(|e| {
            ChainClientError::DeploymentError(format!(
                "Failed to deploy {}: {}",
                artifact.contract_name, e
            ))
        })?;

    Ok(contract.address())
}
