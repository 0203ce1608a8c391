//! Filter-header checkpoint enforcement.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use cjdcoind_consensus::{hash256_from_hex, Hash256, Network, Params};

/// The filter chains a peer can serve headers for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FilterType {
    /// The basic filter covering output scripts and outpoints.
    Regular,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlError {
    /// The received filter header disagrees with a hard-coded checkpoint.
    BadCheckpoint,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::BadCheckpoint => {
                write!(f, "filter header disagrees with checkpoint")
            }
        }
    }
}

impl std::error::Error for ControlError {}

type CheckpointTable = HashMap<u32, HashMap<(FilterType, u32), Hash256>>;

// Only ever called with known good literals.
fn header_literal(hex: &str) -> Hash256 {
    match hash256_from_hex(hex) {
        Some(hash) => hash,
        None => panic!("invalid hard-coded filter header literal"),
    }
}

fn checkpoint_table() -> &'static CheckpointTable {
    static TABLE: OnceLock<CheckpointTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = CheckpointTable::new();

        let mainnet = cjdcoind_consensus::chain_params(Network::MainNet);
        table.insert(
            mainnet.net_magic,
            HashMap::from([
                (
                    (FilterType::Regular, 100_000),
                    header_literal(
                        "7dc7dd312c092acb9561d267772c7edf2451b5551e6221bcc5ca464686865e36",
                    ),
                ),
                (
                    (FilterType::Regular, 200_000),
                    header_literal(
                        "aa13ebf54300605b52d1285ed16505ceef50f304f286c7ac7972c60060d57d18",
                    ),
                ),
                (
                    (FilterType::Regular, 400_000),
                    header_literal(
                        "d1e40702ba58461f80e33340b9131f30b4167bc7c94a0244bfbd713ff32d76fa",
                    ),
                ),
                (
                    (FilterType::Regular, 560_000),
                    header_literal(
                        "1da546f9f414aeb6b77ef21d4897dde643352a85c4695cc0d7d4ab7b46d76da2",
                    ),
                ),
            ]),
        );

        let pkt = cjdcoind_consensus::chain_params(Network::PktMainNet);
        table.insert(
            pkt.net_magic,
            HashMap::from([
                (
                    (FilterType::Regular, 8 << 13),
                    header_literal(
                        "fd7da47b10ee57feea3f11ade8a54a3fe45f149f3247a6f278b1b88430585225",
                    ),
                ),
                (
                    (FilterType::Regular, 32 << 13),
                    header_literal(
                        "67c24937e3029558f4b6b29715cd17f8e93ce7caf85df882f785b47a3b5a30c4",
                    ),
                ),
                (
                    (FilterType::Regular, 64 << 13),
                    header_literal(
                        "fe106ce48c441649d82b6f12b81ed4b74e29eef8dc200d391451d4277d6bc50b",
                    ),
                ),
            ]),
        );

        table
    })
}

/// Constrains a filter header received from a peer to the compiled-in value
/// for its height. Heights without a checkpoint pass: we simply cannot
/// refute them.
pub fn control_cf_header(
    params: &Params,
    filter_type: FilterType,
    height: u32,
    received: &Hash256,
) -> Result<(), ControlError> {
    control_cf_header_with(checkpoint_table(), params, filter_type, height, received)
}

fn control_cf_header_with(
    table: &CheckpointTable,
    params: &Params,
    filter_type: FilterType,
    height: u32,
    received: &Hash256,
) -> Result<(), ControlError> {
    let Some(checkpoints) = table.get(&params.net_magic) else {
        return Ok(());
    };
    match checkpoints.get(&(filter_type, height)) {
        Some(expected) if expected != received => Err(ControlError::BadCheckpoint),
        _ => Ok(()),
    }
}

/// The lowest height at which compact-filter backups from peers are
/// considered trustworthy for the network.
pub fn min_backup_height(params: &Params) -> u32 {
    checkpoint_table()
        .get(&params.net_magic)
        .and_then(|checkpoints| checkpoints.keys().map(|(_, height)| *height).min())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cjdcoind_consensus::chain_params;

    #[test]
    fn checkpointed_heights_are_enforced() {
        let mainnet = chain_params(Network::MainNet);
        let height = 999u32;
        let expected = header_literal(
            "4a242283a406a7c089f671bb8df7671e5d5e9ba577cea1047d30a7f4919df193",
        );
        let table = CheckpointTable::from([(
            mainnet.net_magic,
            HashMap::from([((FilterType::Regular, height), expected)]),
        )]);

        // The recorded header passes.
        control_cf_header_with(&table, mainnet, FilterType::Regular, height, &expected)
            .expect("matching header");

        // Any other header at that height is rejected.
        let wrong = header_literal(
            "000000000006a7c089f671bb8df7671e5d5e9ba577cea1047d30a7f4919df193",
        );
        assert_eq!(
            control_cf_header_with(&table, mainnet, FilterType::Regular, height, &wrong),
            Err(ControlError::BadCheckpoint)
        );

        // An uncheckpointed height passes: nothing to refute with.
        control_cf_header_with(&table, mainnet, FilterType::Regular, 99, &wrong)
            .expect("unknown height");
    }

    #[test]
    fn builtin_table_accepts_its_own_values() {
        for network in Network::ALL {
            let params = chain_params(network);
            let Some(checkpoints) = checkpoint_table().get(&params.net_magic) else {
                continue;
            };
            for ((filter_type, height), expected) in checkpoints {
                control_cf_header(params, *filter_type, *height, expected)
                    .expect("recorded header");
                assert_eq!(
                    control_cf_header(params, *filter_type, *height, &[0u8; 32]),
                    Err(ControlError::BadCheckpoint)
                );
            }
        }
    }

    #[test]
    fn networks_without_checkpoints_pass_everything() {
        let regtest = chain_params(Network::RegressionNet);
        control_cf_header(regtest, FilterType::Regular, 0, &[0xaa; 32]).expect("pass");
        assert_eq!(min_backup_height(regtest), 0);
    }

    #[test]
    fn min_backup_height_is_first_checkpoint() {
        let mainnet = chain_params(Network::MainNet);
        assert_eq!(min_backup_height(mainnet), 100_000);
    }
}
