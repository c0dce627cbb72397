use std::sync::Arc;

use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::db::ContractRepository;
use crate::error::AppError;
use crate::eth::contract::{lastTransactionCall, LEDGER_ABI_JSON, LEDGER_BYTECODE_HEX};
use crate::eth::{ContractDescriptor, GatewayError, LastTransaction, LedgerGateway};

/// Outcome of connecting to the ledger at startup. `freshly_deployed` tells
/// the caller that a new contract was created, which forces a reset of the
/// local user and message stores.
pub struct Bootstrap {
    pub gateway: Arc<EthGateway>,
    pub freshly_deployed: bool,
}

/// Live gateway backed by an alloy provider with the operator wallet.
pub struct EthGateway {
    provider: DynProvider,
    contract_address: Address,
    abi: serde_json::Value,
    faucet_amount: U256,
}

impl EthGateway {
    /// Connects to the configured RPC endpoint and makes sure a ledger
    /// contract exists, deploying one if necessary. Any failure here is a
    /// fatal startup condition; the process must not serve traffic.
    pub async fn bootstrap(config: &Config, pool: &Pool<Sqlite>) -> Result<Bootstrap, AppError> {
        let signer: PrivateKeySigner = config
            .wallet_private_key
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid WALLET_PRIVATE_KEY: {}", e)))?;
        let wallet = EthereumWallet::from(signer);

        let url = config
            .rpc_url
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid RPC_URL {}: {}", config.rpc_url, e)))?;
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url).erased();

        // Connectivity check before anything else touches the chain
        provider.get_chain_id().await.map_err(|e| {
            AppError::Gateway(format!("Failed to reach ledger RPC at {}: {}", config.rpc_url, e))
        })?;

        let abi: serde_json::Value = serde_json::from_str(LEDGER_ABI_JSON)
            .map_err(|e| AppError::Internal(format!("Embedded ledger ABI is invalid: {}", e)))?;
        let faucet_amount = U256::from(config.faucet_amount_wei);

        // Reuse the recorded deployment if its code is still on chain
        if let Some(record) = ContractRepository::get(pool).await? {
            if let Ok(address) = record.address.parse::<Address>() {
                let code = provider.get_code_at(address).await.map_err(|e| {
                    AppError::Gateway(format!("Failed to read code at {}: {}", address, e))
                })?;
                if !code.is_empty() {
                    tracing::info!("Reusing ledger contract at {}", address);
                    return Ok(Bootstrap {
                        gateway: Arc::new(Self {
                            provider,
                            contract_address: address,
                            abi,
                            faucet_amount,
                        }),
                        freshly_deployed: false,
                    });
                }
                tracing::warn!("Recorded contract {} has no code, redeploying", address);
            }
        }

        let address = Self::deploy(&provider).await?;
        ContractRepository::set(pool, &address.to_string(), LEDGER_ABI_JSON).await?;
        tracing::info!("Deployed ledger contract at {}", address);

        Ok(Bootstrap {
            gateway: Arc::new(Self {
                provider,
                contract_address: address,
                abi,
                faucet_amount,
            }),
            freshly_deployed: true,
        })
    }

    async fn deploy(provider: &DynProvider) -> Result<Address, AppError> {
        let code = hex::decode(LEDGER_BYTECODE_HEX.trim())
            .map_err(|e| AppError::Internal(format!("Embedded ledger bytecode is invalid: {}", e)))?;

        let tx = TransactionRequest::default().with_deploy_code(code);
        let receipt = provider
            .send_transaction(tx)
            .await
            .map_err(|e| AppError::Gateway(format!("Contract deployment failed: {}", e)))?
            .get_receipt()
            .await
            .map_err(|e| AppError::Gateway(format!("Deployment not confirmed: {}", e)))?;

        receipt
            .contract_address
            .ok_or_else(|| AppError::Gateway("Deployment receipt carries no contract address".to_string()))
    }
}

#[async_trait]
impl LedgerGateway for EthGateway {
    async fn last_transaction(&self) -> Result<LastTransaction, GatewayError> {
        let data = lastTransactionCall {}.abi_encode();
        let tx = TransactionRequest::default()
            .to(self.contract_address)
            .input(data.into());

        let raw = self
            .provider
            .call(tx)
            .await
            .map_err(|e| GatewayError::Rpc(format!("lastTransaction call failed: {}", e)))?;

        let ret = lastTransactionCall::abi_decode_returns(&raw)
            .map_err(|e| GatewayError::Rpc(format!("Bad lastTransaction response: {}", e)))?;

        Ok(LastTransaction {
            sender: ret.sender.to_string(),
            recipient: ret.recipient.to_string(),
            amount: ret.amount.to_string(),
            timestamp: ret.timestamp.to_string(),
        })
    }

    fn descriptor(&self) -> ContractDescriptor {
        ContractDescriptor {
            address: self.contract_address.to_string(),
            abi: self.abi.clone(),
        }
    }

    async fn request_funds(&self, target: &str) -> Result<(), GatewayError> {
        let to: Address = target
            .parse()
            .map_err(|e| GatewayError::Config(format!("Invalid target address {}: {}", target, e)))?;

        let tx = TransactionRequest::default().to(to).value(self.faucet_amount);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| GatewayError::Rpc(format!("Funds transfer failed: {}", e)))?;

        pending
            .get_receipt()
            .await
            .map_err(|e| GatewayError::Rpc(format!("Funds transfer not confirmed: {}", e)))?;

        Ok(())
    }
}
