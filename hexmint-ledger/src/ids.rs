//! Deterministic identifiers derived with SHA-256.

use sha2::{Digest, Sha256};

use hexmint_core::{AccountId, ColorValue, ContractAddress, NetworkId};
use hexmint_sync::TxHash;

/// Length in bytes of account and contract addresses.
const ADDRESS_BYTES: usize = 20;

fn digest(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn address_hex(hash: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(&hash[..ADDRESS_BYTES]))
}

/// Address of the registry deployed by `deployer` as its `nonce`-th deployment.
pub fn contract_address(network: NetworkId, deployer: &AccountId, nonce: u64) -> ContractAddress {
    let hash = digest(&[
        &network.0.to_be_bytes(),
        deployer.0.as_bytes(),
        &nonce.to_be_bytes(),
    ]);
    ContractAddress(address_hex(&hash))
}

pub fn tx_hash(from: &AccountId, value: &ColorValue, nonce: u64) -> TxHash {
    let hash = digest(&[from.0.as_bytes(), value.as_str().as_bytes(), &nonce.to_be_bytes()]);
    TxHash(format!("0x{}", hex::encode(hash)))
}

/// `count` well-known development accounts.
pub fn dev_accounts(count: usize) -> Vec<AccountId> {
    (0..count)
        .map(|i| {
            let hash = digest(&[b"hexmint:dev-account:", &(i as u64).to_be_bytes()]);
            AccountId(address_hex(&hash))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_twenty_bytes_and_not_zero() {
        let accounts = dev_accounts(2);
        let address = contract_address(NetworkId(5777), &accounts[0], 0);
        assert_eq!(address.0.len(), 2 + ADDRESS_BYTES * 2);
        assert_ne!(address.0, AccountId::zero().0);
        assert_ne!(accounts[0], accounts[1]);
    }

    #[test]
    fn nonce_changes_the_hash() {
        let from = AccountId::from("0xabc");
        let value = ColorValue::from("#000000");
        assert_ne!(tx_hash(&from, &value, 0), tx_hash(&from, &value, 1));
        assert_eq!(tx_hash(&from, &value, 3), tx_hash(&from, &value, 3));
        assert_eq!(tx_hash(&from, &value, 3).0.len(), 66);
    }
}
