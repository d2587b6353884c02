use async_trait::async_trait;

use hexmint_core::{AccountId, ColorValue, ContractAddress, NetworkId};
use hexmint_sync::{LedgerTransport, TransportError, TxStream};

use crate::node::LedgerHandle;

#[async_trait]
impl LedgerTransport for LedgerHandle {
    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        Ok(self.network())
    }

    async fn accounts(&self) -> Result<Vec<AccountId>, TransportError> {
        Ok(self.managed_accounts().to_vec())
    }

    async fn total_supply(&self, contract: &ContractAddress) -> Result<u64, TransportError> {
        self.read(contract, |registry| registry.total_supply()).await
    }

    async fn color_at(
        &self,
        contract: &ContractAddress,
        position: u64,
    ) -> Result<ColorValue, TransportError> {
        self.read(contract, |registry| registry.color_at(position).cloned())
            .await?
            .map_err(|_| TransportError::NotFound { position })
    }

    async fn colors_range(
        &self,
        contract: &ContractAddress,
        start: u64,
        count: u64,
    ) -> Result<Option<Vec<ColorValue>>, TransportError> {
        self.read(contract, |registry| registry.colors_range(start, count))
            .await?
            .map(Some)
            .map_err(|_| TransportError::NotFound {
                position: start.saturating_add(count),
            })
    }

    async fn send_mint(
        &self,
        contract: &ContractAddress,
        from: &AccountId,
        value: ColorValue,
    ) -> Result<TxStream, TransportError> {
        self.enqueue_mint(contract, from, value).await
    }
}
