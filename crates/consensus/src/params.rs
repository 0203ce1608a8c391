//! Parameters for every network the node can participate in.

use std::sync::OnceLock;
use std::time::Duration;

use primitive_types::U256;

use crate::Hash256;

/// A known good point in the block chain the node refuses to disagree with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub height: i64,
    pub hash: Hash256,
}

/// A BIP-9 consensus rule change voted in by miners.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deployment {
    /// Bit within the block version this deployment signals on.
    pub bit_number: u8,
    /// Median block time after which voting starts.
    pub start_time: u64,
    /// Median block time after which the attempted deployment expires.
    pub expire_time: u64,
}

/// Offsets into [`Params::deployments`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentId {
    TestDummy = 0,
    Csv = 1,
    Segwit = 2,
}

pub const DEFINED_DEPLOYMENTS: usize = 3;

/// The networks with built-in parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Network {
    MainNet,
    TestNet3,
    RegressionNet,
    SimNet,
    PktMainNet,
    PktTestNet,
}

impl Network {
    pub const ALL: [Network; 6] = [
        Network::MainNet,
        Network::TestNet3,
        Network::RegressionNet,
        Network::SimNet,
        Network::PktMainNet,
        Network::PktTestNet,
    ];

    pub fn as_str(self) -> &'static str {
        chain_params(self).name
    }
}

/// Defines a network by its parameters. Used to differentiate networks as
/// well as addresses and keys for one network from those intended for use on
/// another network.
#[derive(Clone, Debug)]
pub struct Params {
    /// Human-readable identifier for the network.
    pub name: &'static str,
    /// Magic bytes identifying the network on the wire.
    pub net_magic: u32,
    /// Default peer-to-peer port.
    pub default_port: u16,

    /// Starting block hash.
    pub genesis_hash: Hash256,
    /// Highest allowed proof of work value for a block as a uint256.
    pub pow_limit: U256,
    /// Highest allowed proof of work value in compact form.
    pub pow_limit_bits: u32,

    // Block heights at which the specified softfork BIP became active.
    pub bip34_height: i64,
    pub bip65_height: i64,
    pub bip66_height: i64,

    /// Number of blocks before newly mined coins can be spent.
    pub coinbase_maturity: u16,
    /// Interval of blocks before the subsidy is reduced; -1 means never.
    pub subsidy_reduction_interval: i64,
    /// Desired time window examined when retargeting difficulty.
    pub target_timespan: Duration,
    /// Desired time to generate each block.
    pub target_time_per_block: Duration,
    /// Limits the amount of adjustment between difficulty retargets.
    pub retarget_adjustment_factor: i64,
    /// Whether minimum difficulty drops after enough time without a block.
    /// Only useful for test networks.
    pub reduce_min_difficulty: bool,
    /// Delay before minimum difficulty kicks in when `reduce_min_difficulty`.
    pub min_diff_reduction_time: Duration,
    /// Whether CPU mining is allowed.
    pub generate_supported: bool,

    /// Checkpoints ordered from oldest to newest.
    pub checkpoints: &'static [Checkpoint],

    /// Positive votes required within a confirmation window to lock in a
    /// rule change.
    pub rule_change_activation_threshold: u32,
    /// Blocks in each threshold state retarget window.
    pub miner_confirmation_window: u32,
    pub deployments: [Deployment; DEFINED_DEPLOYMENTS],

    /// Whether the mempool relays non-standard transactions.
    pub relay_non_std_txs: bool,

    /// Human-readable part for Bech32 encoded segwit addresses (BIP 173).
    pub bech32_hrp_segwit: &'static str,

    // Address encoding magics.
    pub pubkey_hash_addr_id: u8,
    pub script_hash_addr_id: u8,
    pub private_key_id: u8,
    pub witness_pubkey_hash_addr_id: u8,
    pub witness_script_hash_addr_id: u8,

    // BIP32 hierarchical deterministic extended key magics.
    pub hd_private_key_id: [u8; 4],
    pub hd_public_key_id: [u8; 4],
    /// BIP44 coin type used in the hierarchical deterministic path.
    pub hd_coin_type: u32,
}

impl Params {
    /// The checkpoint recorded at exactly this height, if any.
    pub fn checkpoint_at(&self, height: i64) -> Option<&Checkpoint> {
        self.checkpoints
            .binary_search_by_key(&height, |checkpoint| checkpoint.height)
            .ok()
            .map(|index| &self.checkpoints[index])
    }

    pub fn latest_checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }
}

/// Shared parameters for a network; built once, then handed out read-only.
pub fn chain_params(network: Network) -> &'static Params {
    match network {
        Network::MainNet => {
            static PARAMS: OnceLock<Params> = OnceLock::new();
            PARAMS.get_or_init(mainnet_params)
        }
        Network::TestNet3 => {
            static PARAMS: OnceLock<Params> = OnceLock::new();
            PARAMS.get_or_init(testnet3_params)
        }
        Network::RegressionNet => {
            static PARAMS: OnceLock<Params> = OnceLock::new();
            PARAMS.get_or_init(regression_net_params)
        }
        Network::SimNet => {
            static PARAMS: OnceLock<Params> = OnceLock::new();
            PARAMS.get_or_init(simnet_params)
        }
        Network::PktMainNet => {
            static PARAMS: OnceLock<Params> = OnceLock::new();
            PARAMS.get_or_init(pkt_mainnet_params)
        }
        Network::PktTestNet => {
            static PARAMS: OnceLock<Params> = OnceLock::new();
            PARAMS.get_or_init(pkt_testnet_params)
        }
    }
}

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const MINUTE: Duration = Duration::from_secs(60);

/// Highest target representable with 2^224 - 1, shared by mainnet and
/// testnet3.
fn standard_pow_limit() -> U256 {
    (U256::one() << 224) - 1
}

/// 2^255 - 1, used by the regression and simulation networks.
fn easy_pow_limit() -> U256 {
    (U256::one() << 255) - 1
}

/// Target for compact 0x1f0fffff, used by the pkt networks.
fn pkt_pow_limit() -> U256 {
    U256::from(0x0f_ffffu64) << 224
}

// Converts a hard-coded big-endian hex string into internal byte order. Only
// ever called with known good literals, so a malformed one is a programming
// error worth stopping on.
fn hash_literal(hex: &str) -> Hash256 {
    match hash256_from_hex(hex) {
        Some(hash) => hash,
        None => panic!("invalid hard-coded hash literal"),
    }
}

fn checkpoint(height: i64, hex: &str) -> Checkpoint {
    Checkpoint {
        height,
        hash: hash_literal(hex),
    }
}

/// Parses a big-endian hex digest into internal (little-endian) byte order.
pub fn hash256_from_hex(hex: &str) -> Option<Hash256> {
    if hex.len() != 64 {
        return None;
    }
    let mut out = [0u8; 32];
    let bytes = hex.as_bytes();
    for i in 0..32 {
        let high = (bytes[i * 2] as char).to_digit(16)?;
        let low = (bytes[i * 2 + 1] as char).to_digit(16)?;
        // Display order is reversed with respect to storage order.
        out[31 - i] = ((high << 4) | low) as u8;
    }
    Some(out)
}

/// Renders a digest as the big-endian hex form used everywhere user-facing.
pub fn hash256_to_hex(hash: &Hash256) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(64);
    for byte in hash.iter().rev() {
        out.push(DIGITS[(byte >> 4) as usize] as char);
        out.push(DIGITS[(byte & 0x0f) as usize] as char);
    }
    out
}

fn mainnet_checkpoints() -> &'static [Checkpoint] {
    static CHECKPOINTS: OnceLock<Vec<Checkpoint>> = OnceLock::new();
    CHECKPOINTS.get_or_init(|| {
        vec![
            checkpoint(11111, "0000000069e244f73d78e8fd29ba2fd2ed618bd6fa2ee92559f542fdb26e7c1d"),
            checkpoint(33333, "000000002dd5588a74784eaa7ab0507a18ad16a236e7b1ce69f00d7ddfb5d0a6"),
            checkpoint(74000, "0000000000573993a3c9e41ce34471c079dcf5f52a0e824a81e7f953b8661a20"),
            checkpoint(105000, "00000000000291ce28027faea320c8d2b054b2e0fe44a773f3eefb151d6bdc97"),
            checkpoint(134444, "00000000000005b12ffd4cd315cd34ffd4a594f430ac814c91184a0d42d2b0fe"),
            checkpoint(168000, "000000000000099e61ea72015e79632f216fe6cb33d7899acb35b75c8303b763"),
            checkpoint(193000, "000000000000059f452a5f7340de6682a977387c17010ff6e6c3bd83ca8b1317"),
            checkpoint(210000, "000000000000048b95347e83192f69cf0366076336c639f9b7228e9ba171342e"),
            checkpoint(216116, "00000000000001b4f4b433e81ee46494af945cf96014816a4e2370f11b23df4e"),
            checkpoint(225430, "00000000000001c108384350f74090433e7fcf79a606b8e797f065b130575932"),
            checkpoint(250000, "000000000000003887df1f29024b06fc2200b55f8af8f35453d7be294df2d214"),
            checkpoint(267300, "000000000000000a83fbd660e918f218bf37edd92b748ad940483c7c116179ac"),
            checkpoint(279000, "0000000000000001ae8c72a0b0c301f67e3afca10e819efa9041e458e9bd7e40"),
            checkpoint(300255, "0000000000000000162804527c6e9b9f0563a280525f9d08c12041def0a0f3b2"),
            checkpoint(319400, "000000000000000021c6052e9becade189495d1c539aa37c58917305fd15f13b"),
            checkpoint(343185, "0000000000000000072b8bf361d01a6ba7d445dd024203fafc78768ed4368554"),
            checkpoint(352940, "000000000000000010755df42dba556bb72be6a32f3ce0b6941ce4430152c9ff"),
            checkpoint(382320, "00000000000000000a8dc6ed5b133d0eb2fd6af56203e4159789b092defd8ab2"),
            checkpoint(400000, "000000000000000004ec466ce4732fe6f1ed1cddc2ed4b328fff5224276e3f6f"),
            checkpoint(430000, "000000000000000001868b2bb3a285f3cc6b33ea234eb70facf4dcdf22186b87"),
            checkpoint(460000, "000000000000000000ef751bbce8e744ad303c47ece06c8d863e4d417efc258c"),
            checkpoint(490000, "000000000000000000de069137b17b8d5a3dfbd5b145b2dcfb203f15d0c4de90"),
            checkpoint(520000, "0000000000000000000d26984c0229c9f6962dc74db0a6d525f2f1640396f69c"),
            checkpoint(550000, "000000000000000000223b7a2298fb1c6c75fb0efc28a4c56853ff4112ec6bc9"),
            checkpoint(560000, "0000000000000000002c7b276daf6efb2b6aa68e2ce3be67ef925b3264ae7122"),
        ]
    })
}

fn testnet3_checkpoints() -> &'static [Checkpoint] {
    static CHECKPOINTS: OnceLock<Vec<Checkpoint>> = OnceLock::new();
    CHECKPOINTS.get_or_init(|| {
        vec![
            checkpoint(546, "000000002a936ca763904c3c35fce2f3556c559c0214345d31b1bcebf76acb70"),
            checkpoint(100000, "00000000009e2958c15ff9290d571bf9459e93b19765c6801ddeccadbb160a1e"),
            checkpoint(200000, "0000000000287bffd321963ef05feab753ebe274e1d78b2fd4e2bfe9ad3aa6f2"),
            checkpoint(300001, "0000000000004829474748f3d1bc8fcf893c88be255e6d7f571c548aff57abf4"),
            checkpoint(400002, "0000000005e2c73b8ecb82ae2dbc2e8274614ebad7172b53528aba7501f5a089"),
            checkpoint(500011, "00000000000929f63977fbac92ff570a9bd9e7715401ee96f2848f7b07750b02"),
            checkpoint(600002, "000000000001f471389afd6ee94dcace5ccc44adc18e8bff402443f034b07240"),
            checkpoint(700000, "000000000000406178b12a4dea3b27e13b3c4fe4510994fd667d7c1e6a3f4dc1"),
            checkpoint(800010, "000000000017ed35296433190b6829db01e657d80631d43f5983fa403bfdb4c1"),
            checkpoint(900000, "0000000000356f8d8924556e765b7a94aaebc6b5c8685dcfa2b1ee8b41acd89b"),
            checkpoint(1000007, "00000000001ccb893d8a1f25b70ad173ce955e5f50124261bbbc50379a612ddf"),
            checkpoint(1100007, "00000000000abc7b2cd18768ab3dee20857326a818d1946ed6796f42d66dd1e8"),
            checkpoint(1200007, "00000000000004f2dc41845771909db57e04191714ed8c963f7e56713a7b6cea"),
            checkpoint(1300007, "0000000072eab69d54df75107c052b26b0395b44f77578184293bf1bb1dbd9fa"),
        ]
    })
}

fn pkt_mainnet_checkpoints() -> &'static [Checkpoint] {
    static CHECKPOINTS: OnceLock<Vec<Checkpoint>> = OnceLock::new();
    CHECKPOINTS.get_or_init(|| {
        vec![
            checkpoint(1 << 13, "2b6b3d2951d365f26fd5b5362ab8dd5695ea6f5bd6c19ea9b16eb63a3de95ede"),
            checkpoint(2 << 13, "462d3eee0c728cfbb2ba64b6cc221d3176be10494cade158d45ee6007137ed42"),
            checkpoint(3 << 13, "82138a230458214e98a6c708f32b2ab3fced21bbb2c752dd26250a3cf29cfb15"),
            checkpoint(4 << 13, "9e2f78040c97b244fcbbf9dd528e02f3aaa54705d04408e3079ee98f427cb1fa"),
            checkpoint(5 << 13, "08e6918278fe6d856d8fd17e72724ce0dffd0050497d1fcec6ca1632564be05e"),
            checkpoint(6 << 13, "93750d17acef2c270c90b2a6fc7d0867628ce8d656e54b3ab2057806a6cfe737"),
            checkpoint(7 << 13, "bbc2ef64b1c3963d900b229a5e9120a641c31c55d48ed911f167c23bed660774"),
            checkpoint(8 << 13, "26e5ca803a949a5ee09926a1042408e9c1ca0cfc4950c134791fa5eb2624183c"),
            checkpoint(9 << 13, "461c001b8cab33692f86e34fcd5e2657681be91ac1197139b8304346c0c4993f"),
            checkpoint(10 << 13, "e1b107cdfea386d284741b28a097a3057ce008225b7e42692eb06afd0398f887"),
            checkpoint(11 << 13, "ae399b156d8e33b8ff04baedc5cb8b413d64f6cb2510ed4cbf06af2e0c09a94e"),
            checkpoint(12 << 13, "8745c74b6a105b0173c076adc2728ffae48e6e1c8219e9ab7588e020a10e07cb"),
            checkpoint(13 << 13, "b5eb8b0e48d063110c4423ae62ce679b1c2a67f7ad5ff7c96d277f8ccc118ec6"),
            checkpoint(14 << 13, "94a4ac13860530c9a5237f0ba41afbd86917ebf92fea4d30177bbac201209109"),
            checkpoint(15 << 13, "9c9125ff3fe3592e9cc6f009c2e051a5b7359519d95f7cd9e447352bfbfa9809"),
            checkpoint(16 << 13, "7194f5f6210489ecd6bd0feb84fc72c00a4b4aed33e6e2da5a92faec94d56879"),
            checkpoint(17 << 13, "60d6ceb6590c48d04dbeccd3ee8b8aba6e038f69f81984aafa2f57ae2050e79f"),
            checkpoint(18 << 13, "1ef6428da1d7bdde105250c864edd5001110545fc266e6c1bdace7019a90b76d"),
            checkpoint(19 << 13, "150cd3bd68fbafe3f4f51d05318f5c341a22f48d62b5e3ed952bfd5f681c8743"),
            checkpoint(20 << 13, "3c8a1d44c35bdcde485e8e0238593c4228f40643a89ab02c8766dc837c24ae9d"),
            checkpoint(21 << 13, "31c64a73ffef1340d7869b8338b0e0133f0946322eb2c608e2b85cae889b20d6"),
            checkpoint(22 << 13, "e3efac3c5c12f6a1578496d13dc8b000559c65199ed97e913eea6d4902e65a44"),
            checkpoint(23 << 13, "854051b9d04d91e37541bd8e14500bf5fa9e5ffd014830f9b21ca88e2aa5734c"),
            checkpoint(24 << 13, "594567c710572b7ee01a3013d54efb4ca1a283d05ebbc24d206decb77aeef942"),
            checkpoint(25 << 13, "3ebb1fe776473614228540b3d4cb3e5454f22b4bc26ae8a4aa514465cf0ee2e5"),
            checkpoint(26 << 13, "7cf46a131b05a8b4be4e068a4311a532a9514cb215640d8833bc3b8b52474acc"),
            checkpoint(27 << 13, "238ad730b57a9141813c1f33615157f9af8f00514dcf1b3206fea096dcf6e9d9"),
            checkpoint(28 << 13, "28b4cdf10297b018acb97562dd985c7d5bdbdbb6121768e1cb9c9c7910193c41"),
            checkpoint(29 << 13, "d098b160ceb577dfc28804d3ef516001b1f74c1d34af9a84919c70f044b0a0f1"),
            checkpoint(30 << 13, "4074c0b74e7e0e6b91e4d2ab93faf4b72d1ee03c5777ad91d71e0503e2819709"),
            checkpoint(31 << 13, "2998c6feb6c3e7cb17801c136631bf1167af08c0f869d2827aa833dced585ac7"),
            checkpoint(32 << 13, "1d2d6ece172b67878cdc308aa9d2d1cb684d60f663fd820dd24aaaebc92e1450"),
            checkpoint(33 << 13, "0b094732bd84b5e1b084fbe4e4a8ba008a3bb038c7a6ebae8df025458c47dfc7"),
            checkpoint(34 << 13, "f521cddf3407fe0b9500f39b011840d12f65262fe10c8790b217a952bd80f082"),
            checkpoint(35 << 13, "59da8e25b7113a7b91253eccc36234a4526135add60430addb74796fa8d9f42e"),
            checkpoint(36 << 13, "46ac9323f6a3dd96e69f9f49b26844054265d96265d8f5f7b45ad23ac042ca0f"),
            checkpoint(37 << 13, "dce255e7d16645c0602516282f777f88798840c7fb7cad6882a15025110e2c03"),
            checkpoint(38 << 13, "7bb3249f9b28f67e3671bacbe5e54479ffc5d21207c5e140f8a4fcf8252c8a9e"),
            checkpoint(39 << 13, "46f8778b0613af0a85aea57969e56b895c542080befe8ac96eef00886dbbd62b"),
            checkpoint(40 << 13, "abaff3c0e48b822aec3fa4b3e40ddc3ac7121e1efa96c6883bb7217b49df3d2e"),
            checkpoint(41 << 13, "b92112df054c6cb30ab41f44b903baaa4a4e59a70432ce15a65daf09c96a7242"),
            checkpoint(42 << 13, "9b3267527e78c72f869d9a8f62523a6abec1aaa65fbad6aeba8f6794f7ca72e8"),
            checkpoint(43 << 13, "2c449d98ea67301382edd954cc717d90fd327475f8e7a0cba6099b90c986e317"),
            checkpoint(44 << 13, "c2ddcc7d981bca4a924e82b3dd54a05fd5f4aa72d9731e01b8a7ee570f128831"),
            checkpoint(45 << 13, "3708eb0ece9247df6017afab4cc6b962112fae19c721910470abaf1b82db4d81"),
            checkpoint(46 << 13, "6839f1b500f5aa04d86da0978bb8b3a11174b52eb997d01ee9af0b76bc72c9bd"),
            checkpoint(47 << 13, "83aef519fb6a066a6af06c0b2fcd9886a86e1b74a1060891eb4e1dfcc3a8090d"),
            checkpoint(48 << 13, "a55d3d59fab43d8c28784dbaee31d3710be3fef2cab0fa02c77079bc88d62c95"),
            checkpoint(49 << 13, "6d4148d977e4c75173325ddfb21071667fcd53065248523c2ad057ff99e637f5"),
            checkpoint(50 << 13, "3260b05977afa1745aed8b7dd5710c20962783be9ca14671d749cac0bb4056ac"),
            checkpoint(51 << 13, "a5486087bd1d3f777bc28870226e736193c7eb291289ddfb396e02a898eeb2f5"),
            checkpoint(52 << 13, "64ae244ff7ef2d6e907cb0cb953abda21087100e4450fc57e1166bf6961b7a04"),
            checkpoint(53 << 13, "ae7e257c67bbe717460a0413397b1cf1e41b0b6079e58f13c03f0c7c70c3965c"),
            checkpoint(54 << 13, "0bf356c09f1c1ed095bec19eda61feca281cdef863447b9734615e654346d67c"),
            checkpoint(55 << 13, "2c3b94aed82f6ea46e7fe2187f67f570f56e4f6a4d70a546ff14de9677a70b5f"),
            checkpoint(56 << 13, "3a0668eaa7a1f89e7b5c8c87805f25877fe0e48ff0d28039fb34dc0cdee664f7"),
            checkpoint(57 << 13, "2139d44b557bc114082cbef1c5afc23fbe97edbb0a8d66d2b9b963c37dc09f5c"),
            checkpoint(58 << 13, "2e57f8737b7fa34f1c040de4ba91f172f1acf0f08b5f8c49356faa6ade7964a1"),
            checkpoint(59 << 13, "6c7f3c6aca48f406da38ac82ee1128a9b3c18aa596631bf8192b2488e2b7731d"),
            checkpoint(60 << 13, "74fb58760a49b5469aabc2b193d020d781ea170e4619e605d9dfd7214fa04f12"),
            checkpoint(61 << 13, "3c7b2cebdbadca82edf7df1ff29b5ac33b5d66dcce47bf33c87cb416fb6f84fc"),
            checkpoint(62 << 13, "3615fea59b5e3f4dfdd22666372c17709807ae56506e896940a87627ff67d564"),
            checkpoint(63 << 13, "7c996aff0779b9889acb4a4e46b98a1323e4009288348155ce02b24ee4a4c644"),
            checkpoint(64 << 13, "4acf5a9646f521bb00f568036a4e739e7ecc10fdc12edd8146ab96e00666e0b8"),
        ]
    })
}

fn mainnet_params() -> Params {
    Params {
        name: "mainnet",
        net_magic: 0xd9b4bef9,
        default_port: 8333,

        genesis_hash: hash_literal(
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
        ),
        pow_limit: standard_pow_limit(),
        pow_limit_bits: 0x1d00ffff,
        bip34_height: 227931, // 000000000000024b89b42a942fe0d9fea3bb44ab7bd1b19115dd6a759c0808b8
        bip65_height: 388381, // 000000000000000004c2b624ed5d7756c508d90fd0da2c7c679febfa6c4735f0
        bip66_height: 363725, // 00000000000000000379eaa19dce8c9b722d46ae6a57c2f1a988119488b50931
        coinbase_maturity: 100,
        subsidy_reduction_interval: 210_000,
        target_timespan: 14 * DAY,
        target_time_per_block: 10 * MINUTE,
        retarget_adjustment_factor: 4, // 25% less, 400% more
        reduce_min_difficulty: false,
        min_diff_reduction_time: Duration::ZERO,
        generate_supported: false,

        checkpoints: mainnet_checkpoints(),

        rule_change_activation_threshold: 1916, // 95% of miner_confirmation_window
        miner_confirmation_window: 2016,
        deployments: [
            Deployment {
                bit_number: 28,
                start_time: 1199145601, // January 1, 2008 UTC
                expire_time: 1230767999, // December 31, 2008 UTC
            },
            Deployment {
                bit_number: 0,
                start_time: 1462060800, // May 1st, 2016
                expire_time: 1493596800, // May 1st, 2017
            },
            Deployment {
                bit_number: 1,
                start_time: 1479168000, // November 15, 2016 UTC
                expire_time: 1510704000, // November 15, 2017 UTC
            },
        ],

        relay_non_std_txs: false,

        bech32_hrp_segwit: "bc",

        pubkey_hash_addr_id: 0x00, // starts with 1
        script_hash_addr_id: 0x05, // starts with 3
        private_key_id: 0x80,      // starts with 5 (uncompressed) or K (compressed)
        witness_pubkey_hash_addr_id: 0x06,
        witness_script_hash_addr_id: 0x0a,

        hd_private_key_id: [0x04, 0x88, 0xad, 0xe4], // starts with xprv
        hd_public_key_id: [0x04, 0x88, 0xb2, 0x1e],  // starts with xpub
        hd_coin_type: 0,
    }
}

fn testnet3_params() -> Params {
    Params {
        name: "testnet3",
        net_magic: 0x0709110b,
        default_port: 18333,

        genesis_hash: hash_literal(
            "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943",
        ),
        pow_limit: standard_pow_limit(),
        pow_limit_bits: 0x1d00ffff,
        bip34_height: 21111,  // 0000000023b3a96d3484e5abb3755c413e7d41500f8e2a5c3f0dd01299cd8ef8
        bip65_height: 581885, // 00000000007f6655f22f98e72ed80d8b06dc761d5da09df0fa1dc4be4f861eb6
        bip66_height: 330776, // 000000002104c8c45e99a8853285a3b592602a3ccde2b832481da85e9e4ba182
        coinbase_maturity: 100,
        subsidy_reduction_interval: 210_000,
        target_timespan: 14 * DAY,
        target_time_per_block: 10 * MINUTE,
        retarget_adjustment_factor: 4,
        reduce_min_difficulty: true,
        min_diff_reduction_time: 20 * MINUTE, // target_time_per_block * 2
        generate_supported: false,

        checkpoints: testnet3_checkpoints(),

        rule_change_activation_threshold: 1512, // 75% of miner_confirmation_window
        miner_confirmation_window: 2016,
        deployments: [
            Deployment {
                bit_number: 28,
                start_time: 1199145601,
                expire_time: 1230767999,
            },
            Deployment {
                bit_number: 0,
                start_time: 1456790400, // March 1st, 2016
                expire_time: 1493596800,
            },
            Deployment {
                bit_number: 1,
                start_time: 1462060800,
                expire_time: 1493596800,
            },
        ],

        relay_non_std_txs: true,

        bech32_hrp_segwit: "tb",

        pubkey_hash_addr_id: 0x6f, // starts with m or n
        script_hash_addr_id: 0xc4, // starts with 2
        private_key_id: 0xef,      // starts with 9 (uncompressed) or c (compressed)
        witness_pubkey_hash_addr_id: 0x03,
        witness_script_hash_addr_id: 0x28,

        hd_private_key_id: [0x04, 0x35, 0x83, 0x94], // starts with tprv
        hd_public_key_id: [0x04, 0x35, 0x87, 0xcf],  // starts with tpub
        hd_coin_type: 1,
    }
}

fn regression_net_params() -> Params {
    Params {
        name: "regtest",
        net_magic: 0xdab5bffa,
        default_port: 18444,

        genesis_hash: hash_literal(
            "0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206",
        ),
        pow_limit: easy_pow_limit(),
        pow_limit_bits: 0x207fffff,
        bip34_height: 100_000_000, // not active, permits version 1 blocks
        bip65_height: 1351,
        bip66_height: 1251,
        coinbase_maturity: 100,
        subsidy_reduction_interval: 150,
        target_timespan: 14 * DAY,
        target_time_per_block: 10 * MINUTE,
        retarget_adjustment_factor: 4,
        reduce_min_difficulty: true,
        min_diff_reduction_time: 20 * MINUTE,
        generate_supported: true,

        checkpoints: &[],

        rule_change_activation_threshold: 108, // 75% of miner_confirmation_window
        miner_confirmation_window: 144,
        deployments: [
            Deployment {
                bit_number: 28,
                start_time: 0,
                expire_time: u64::MAX,
            },
            Deployment {
                bit_number: 0,
                start_time: 0,
                expire_time: u64::MAX,
            },
            Deployment {
                bit_number: 1,
                start_time: 0,
                expire_time: u64::MAX,
            },
        ],

        relay_non_std_txs: true,

        bech32_hrp_segwit: "bcrt",

        pubkey_hash_addr_id: 0x6f,
        script_hash_addr_id: 0xc4,
        private_key_id: 0xef,
        witness_pubkey_hash_addr_id: 0x03,
        witness_script_hash_addr_id: 0x28,

        hd_private_key_id: [0x04, 0x35, 0x83, 0x94],
        hd_public_key_id: [0x04, 0x35, 0x87, 0xcf],
        hd_coin_type: 1,
    }
}

fn simnet_params() -> Params {
    Params {
        name: "simnet",
        net_magic: 0x12141c16,
        default_port: 18555,

        genesis_hash: hash_literal(
            "683e86bd5c6d110d91b94b97137ba6bfe02dbbdb8e3dff722a669b5d69d77af6",
        ),
        pow_limit: easy_pow_limit(),
        pow_limit_bits: 0x207fffff,
        bip34_height: 0, // always active on simnet
        bip65_height: 0,
        bip66_height: 0,
        coinbase_maturity: 100,
        subsidy_reduction_interval: 210_000,
        target_timespan: 14 * DAY,
        target_time_per_block: 10 * MINUTE,
        retarget_adjustment_factor: 4,
        reduce_min_difficulty: true,
        min_diff_reduction_time: 20 * MINUTE,
        generate_supported: true,

        checkpoints: &[],

        rule_change_activation_threshold: 75, // 75% of miner_confirmation_window
        miner_confirmation_window: 100,
        deployments: [
            Deployment {
                bit_number: 28,
                start_time: 0,
                expire_time: u64::MAX,
            },
            Deployment {
                bit_number: 0,
                start_time: 0,
                expire_time: u64::MAX,
            },
            Deployment {
                bit_number: 1,
                start_time: 0,
                expire_time: u64::MAX,
            },
        ],

        relay_non_std_txs: true,

        bech32_hrp_segwit: "sb",

        pubkey_hash_addr_id: 0x3f, // starts with S
        script_hash_addr_id: 0x7b, // starts with s
        private_key_id: 0x64,      // starts with 4 (uncompressed) or F (compressed)
        witness_pubkey_hash_addr_id: 0x19,
        witness_script_hash_addr_id: 0x28,

        hd_private_key_id: [0x04, 0x20, 0xb9, 0x00], // starts with sprv
        hd_public_key_id: [0x04, 0x20, 0xbd, 0x3a],  // starts with spub
        hd_coin_type: 115, // ASCII for s
    }
}

fn pkt_mainnet_params() -> Params {
    Params {
        name: "cjdcoin",
        net_magic: 0x5b9dfdb2,
        default_port: 64764,

        genesis_hash: hash_literal(
            "0bdc1712a46194e552cf417ab0439c2d4f456c35cf63a0a406964c6f93432d85",
        ),
        pow_limit: pkt_pow_limit(),
        pow_limit_bits: 0x1f0fffff,
        bip34_height: 0,
        bip65_height: 0,
        bip66_height: 0,
        coinbase_maturity: 100,
        subsidy_reduction_interval: -1, // decimation schedule, never halves
        target_timespan: 14 * DAY / 10,
        target_time_per_block: MINUTE,
        retarget_adjustment_factor: 4,
        reduce_min_difficulty: false,
        min_diff_reduction_time: 2 * MINUTE,
        generate_supported: false,

        checkpoints: pkt_mainnet_checkpoints(),

        rule_change_activation_threshold: 1512,
        miner_confirmation_window: 2016,
        deployments: [
            Deployment {
                bit_number: 28,
                start_time: 1199145601,
                expire_time: 1230767999,
            },
            // CSV and segwit are disabled on the pkt networks.
            Deployment {
                bit_number: 0,
                start_time: u64::MAX,
                expire_time: u64::MAX,
            },
            Deployment {
                bit_number: 1,
                start_time: u64::MAX,
                expire_time: u64::MAX,
            },
        ],

        relay_non_std_txs: false,

        bech32_hrp_segwit: "cjdcoin",

        pubkey_hash_addr_id: 0x75, // starts with p
        script_hash_addr_id: 0x38, // starts with P
        private_key_id: 0xe0,      // starts with 8 (uncompressed) or a (compressed)
        witness_pubkey_hash_addr_id: 0xa3,
        witness_script_hash_addr_id: 0x22,

        hd_private_key_id: [0x6b, 0x86, 0x3b, 0xed], // starts with PpvtX
        hd_public_key_id: [0x6b, 0x85, 0xc5, 0x3f],  // starts with PpubX
        hd_coin_type: 390,
    }
}

fn pkt_testnet_params() -> Params {
    Params {
        name: "cjdcointest",
        net_magic: 0x5b9dfcb1,
        default_port: 64512,

        genesis_hash: hash_literal(
            "0bdc1712a46194e552cf417ab0439c2d4f456c35cf63a0a406964c6f93432d85",
        ),
        pow_limit: pkt_pow_limit(),
        pow_limit_bits: 0x1f0fffff,
        bip34_height: 0,
        bip65_height: 0,
        bip66_height: 0,
        coinbase_maturity: 100,
        subsidy_reduction_interval: 2_100_000,
        target_timespan: 14 * DAY / 10,
        target_time_per_block: MINUTE,
        retarget_adjustment_factor: 4,
        reduce_min_difficulty: true,
        min_diff_reduction_time: 2 * MINUTE,
        generate_supported: false,

        checkpoints: &[],

        rule_change_activation_threshold: 1512,
        miner_confirmation_window: 2016,
        deployments: [
            Deployment {
                bit_number: 28,
                start_time: 1199145601,
                expire_time: 1230767999,
            },
            Deployment {
                bit_number: 0,
                start_time: u64::MAX,
                expire_time: u64::MAX,
            },
            Deployment {
                bit_number: 1,
                start_time: u64::MAX,
                expire_time: u64::MAX,
            },
        ],

        relay_non_std_txs: true,

        bech32_hrp_segwit: "tpk",

        pubkey_hash_addr_id: 0x6f,
        script_hash_addr_id: 0xc4,
        private_key_id: 0xef,
        witness_pubkey_hash_addr_id: 0x03,
        witness_script_hash_addr_id: 0x28,

        hd_private_key_id: [0x04, 0x35, 0x83, 0x94],
        hd_public_key_id: [0x04, 0x35, 0x87, 0xcf],
        hd_coin_type: 1,
    }
}
