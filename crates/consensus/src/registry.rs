//! Lookup maps over the registered networks' address and key prefixes.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{OnceLock, RwLock};

use crate::params::{chain_params, Network, Params};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistryError {
    /// The network magic is already a standard network or was previously
    /// registered.
    DuplicateNet,
    /// The id intended to identify a hierarchical deterministic private
    /// extended key is not registered.
    UnknownHdKeyId,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateNet => write!(f, "duplicate network"),
            RegistryError::UnknownHdKeyId => {
                write!(f, "unknown hd private extended key bytes")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Tracks which networks are registered and answers prefix membership
/// queries for address decoding. Library code takes a registry argument so
/// it works regardless of the network being standard or not; a process-wide
/// handle is available through [`global_registry`].
#[derive(Default)]
pub struct ParamsRegistry {
    registered_nets: HashSet<u32>,
    pubkey_hash_addr_ids: HashSet<u8>,
    script_hash_addr_ids: HashSet<u8>,
    bech32_segwit_prefixes: HashSet<String>,
    hd_priv_to_pub_key_ids: HashMap<[u8; 4], [u8; 4]>,
}

impl ParamsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all built-in networks already registered.
    pub fn with_default_networks() -> Self {
        let mut registry = Self::new();
        for network in Network::ALL {
            // The built-in parameter sets carry distinct magics, so this
            // cannot fail on a fresh registry.
            if registry.register(chain_params(network)).is_err() {
                panic!("default network registered twice");
            }
        }
        registry
    }

    /// Registers the parameters for a network. Fails with `DuplicateNet` if
    /// the network magic is already present; registration is not idempotent
    /// and nothing unregisters.
    pub fn register(&mut self, params: &Params) -> Result<(), RegistryError> {
        if !self.registered_nets.insert(params.net_magic) {
            return Err(RegistryError::DuplicateNet);
        }
        self.pubkey_hash_addr_ids.insert(params.pubkey_hash_addr_id);
        self.script_hash_addr_ids.insert(params.script_hash_addr_id);
        self.hd_priv_to_pub_key_ids
            .insert(params.hd_private_key_id, params.hd_public_key_id);

        // A valid bech32 segwit address always has the human-readable part
        // for the network followed by '1'.
        let mut prefix = String::with_capacity(params.bech32_hrp_segwit.len() + 1);
        prefix.push_str(params.bech32_hrp_segwit);
        prefix.push('1');
        self.bech32_segwit_prefixes.insert(prefix);
        Ok(())
    }

    /// Whether the id is known to prefix a pay-to-pubkey-hash address on any
    /// registered network. Callers decoding an address string should check
    /// this and [`Self::is_script_hash_addr_id`]; if both match the address
    /// is undeterminable.
    pub fn is_pubkey_hash_addr_id(&self, id: u8) -> bool {
        self.pubkey_hash_addr_ids.contains(&id)
    }

    /// Whether the id is known to prefix a pay-to-script-hash address on any
    /// registered network.
    pub fn is_script_hash_addr_id(&self, id: u8) -> bool {
        self.script_hash_addr_ids.contains(&id)
    }

    /// Whether the prefix is a known bech32 segwit address prefix on any
    /// registered network. Case-insensitive.
    pub fn is_bech32_segwit_prefix(&self, prefix: &str) -> bool {
        self.bech32_segwit_prefixes
            .contains(&prefix.to_lowercase())
    }

    /// Maps a private hierarchical deterministic extended key id to the
    /// matching public key id.
    pub fn hd_private_key_to_public_key_id(
        &self,
        id: &[u8],
    ) -> Result<[u8; 4], RegistryError> {
        let key: [u8; 4] = id.try_into().map_err(|_| RegistryError::UnknownHdKeyId)?;
        self.hd_priv_to_pub_key_ids
            .get(&key)
            .copied()
            .ok_or(RegistryError::UnknownHdKeyId)
    }
}

/// Process-wide registry, populated with the default networks on first use.
/// Registrations after init are rare and serialize on the lock.
pub fn global_registry() -> &'static RwLock<ParamsRegistry> {
    static REGISTRY: OnceLock<RwLock<ParamsRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(ParamsRegistry::with_default_networks()))
}

#[cfg(test)]
mod tests {
    use super::{ParamsRegistry, RegistryError};
    use crate::params::{chain_params, Network, Params};

    fn mock_net_params() -> Params {
        let mut params = chain_params(Network::MainNet).clone();
        params.name = "mocknet";
        params.net_magic = 0xffffffff;
        params.bech32_hrp_segwit = "tc";
        params.pubkey_hash_addr_id = 0x9f;
        params.script_hash_addr_id = 0xf9;
        params.hd_private_key_id = [0x01, 0x02, 0x03, 0x04];
        params.hd_public_key_id = [0x05, 0x06, 0x07, 0x08];
        params
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut registry = ParamsRegistry::with_default_networks();
        let mock = mock_net_params();
        registry.register(&mock).expect("register mocknet");
        assert_eq!(registry.register(&mock), Err(RegistryError::DuplicateNet));
        // Every default network is also already taken.
        for network in Network::ALL {
            assert_eq!(
                registry.register(chain_params(network)),
                Err(RegistryError::DuplicateNet)
            );
        }
    }

    #[test]
    fn prefix_queries_cover_registered_networks() {
        let mut registry = ParamsRegistry::with_default_networks();

        assert!(registry.is_pubkey_hash_addr_id(0x00)); // mainnet
        assert!(registry.is_pubkey_hash_addr_id(0x75)); // cjdcoin
        assert!(!registry.is_pubkey_hash_addr_id(0x9f));
        assert!(registry.is_script_hash_addr_id(0x05));
        assert!(!registry.is_script_hash_addr_id(0xf9));

        registry.register(&mock_net_params()).expect("register");
        assert!(registry.is_pubkey_hash_addr_id(0x9f));
        assert!(registry.is_script_hash_addr_id(0xf9));
    }

    #[test]
    fn bech32_lookup_is_case_insensitive() {
        let mut registry = ParamsRegistry::with_default_networks();
        registry.register(&mock_net_params()).expect("register");

        for prefix in ["bc1", "tb1", "bcrt1", "sb1", "cjdcoin1", "tpk1", "tc1", "TC1", "Tc1"] {
            assert!(
                registry.is_bech32_segwit_prefix(prefix),
                "missing prefix {prefix}"
            );
        }
        assert!(!registry.is_bech32_segwit_prefix("bc"));
        assert!(!registry.is_bech32_segwit_prefix("tc"));
        assert!(!registry.is_bech32_segwit_prefix("xx1"));
    }

    #[test]
    fn global_handle_starts_with_default_networks() {
        let registry = super::global_registry().read().expect("read lock");
        assert!(registry.is_bech32_segwit_prefix("bc1"));
        assert!(registry.is_pubkey_hash_addr_id(0x75));
        assert!(registry
            .hd_private_key_to_public_key_id(&[0x6b, 0x86, 0x3b, 0xed])
            .is_ok());
    }

    #[test]
    fn hd_key_id_mapping() {
        let mut registry = ParamsRegistry::with_default_networks();
        registry.register(&mock_net_params()).expect("register");

        assert_eq!(
            registry.hd_private_key_to_public_key_id(&[0x04, 0x88, 0xad, 0xe4]),
            Ok([0x04, 0x88, 0xb2, 0x1e])
        );
        assert_eq!(
            registry.hd_private_key_to_public_key_id(&[0x01, 0x02, 0x03, 0x04]),
            Ok([0x05, 0x06, 0x07, 0x08])
        );
        // Unknown magic and wrong lengths fail alike.
        assert_eq!(
            registry.hd_private_key_to_public_key_id(&[0xff, 0xff, 0xff, 0xff]),
            Err(RegistryError::UnknownHdKeyId)
        );
        assert_eq!(
            registry.hd_private_key_to_public_key_id(&[0x04, 0x88, 0xad]),
            Err(RegistryError::UnknownHdKeyId)
        );
        assert_eq!(
            registry.hd_private_key_to_public_key_id(&[0x04, 0x88, 0xad, 0xe4, 0x00]),
            Err(RegistryError::UnknownHdKeyId)
        );
    }
}
