// ABOUTME: Settlement bridge submitting settleQROrder calls to the payment contract
// ABOUTME: Signs with the contract owner key and waits for the transaction receipt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

use crate::config::SettlementConfig;
use crate::errors::{AppError, AppResult};
use alloy::primitives::{Address, FixedBytes};
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

sol! {
    #[sol(rpc)]
    contract QrPayment {
        function settleQROrder(address beneficiary, bytes32 orderHash) external;
    }
}

/// Outcome of a settlement submission
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReceipt {
    /// Whether the transaction was mined successfully
    pub success: bool,
    /// Hash of the mined transaction
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    /// Human-readable outcome
    pub message: String,
}

/// Submits order settlements on behalf of the contract owner
#[async_trait]
pub trait SettlementClient: Send + Sync {
    /// Settle one QR order for a beneficiary
    async fn settle_order(&self, beneficiary: &str, order_hash: &str)
        -> AppResult<SettlementReceipt>;
}

/// Chain-backed settlement client
///
/// The signer and contract address are validated lazily on the first
/// call so the server starts fine without settlement configured.
pub struct ChainSettlementClient {
    config: SettlementConfig,
}

impl ChainSettlementClient {
    #[must_use]
    pub const fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    fn signer(&self) -> AppResult<PrivateKeySigner> {
        let key = self.config.owner_private_key.trim();
        if key.is_empty() {
            return Err(AppError::config(
                "CONTRACT_OWNER_PRIVATE_KEY is not configured",
            ));
        }
        let normalized = key.strip_prefix("0x").unwrap_or(key);
        format!("0x{normalized}")
            .parse::<PrivateKeySigner>()
            .map_err(|e| AppError::config(format!("Invalid owner private key: {e}")))
    }

    fn contract_address(&self) -> AppResult<Address> {
        let address = self.config.contract_address.trim();
        if address.is_empty() {
            return Err(AppError::config("QR_PAYMENT_ADDRESS is not configured"));
        }
        address
            .parse::<Address>()
            .map_err(|e| AppError::config(format!("Invalid contract address: {e}")))
    }
}

fn parse_beneficiary(beneficiary: &str) -> AppResult<Address> {
    beneficiary
        .trim()
        .parse::<Address>()
        .map_err(|e| AppError::invalid_request(format!("Invalid beneficiary address: {e}")))
}

fn parse_order_hash(order_hash: &str) -> AppResult<FixedBytes<32>> {
    order_hash
        .trim()
        .parse::<FixedBytes<32>>()
        .map_err(|e| AppError::invalid_request(format!("Invalid order hash: {e}")))
}

#[async_trait]
impl SettlementClient for ChainSettlementClient {
    async fn settle_order(
        &self,
        beneficiary: &str,
        order_hash: &str,
    ) -> AppResult<SettlementReceipt> {
        let beneficiary = parse_beneficiary(beneficiary)?;
        let order_hash = parse_order_hash(order_hash)?;
        let signer = self.signer()?;
        let contract_address = self.contract_address()?;

        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(&self.config.rpc_url)
            .await
            .map_err(|e| AppError::settlement(format!("Failed to connect to RPC: {e}")))?;

        let contract = QrPayment::new(contract_address, provider);
        let pending = contract
            .settleQROrder(beneficiary, order_hash)
            .send()
            .await
            .map_err(|e| AppError::settlement(format!("Failed to submit settlement: {e}")))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AppError::settlement(format!("Settlement was not mined: {e}")))?;

        let tx_hash = format!("{:#x}", receipt.transaction_hash);
        if !receipt.status() {
            return Err(AppError::settlement(format!(
                "Settlement transaction reverted: {tx_hash}"
            )));
        }

        info!(tx_hash = %tx_hash, beneficiary = %beneficiary, "Order settled");
        Ok(SettlementReceipt {
            success: true,
            tx_hash,
            message: "Order settled successfully".to_owned(),
        })
    }
}
