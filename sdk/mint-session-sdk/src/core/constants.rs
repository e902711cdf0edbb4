use crate::types::RejectionKind;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

// Candy Machine v2 program on mainnet/devnet
pub const CANDY_MACHINE_PROGRAM_ID: Pubkey =
    pubkey!("cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ");

pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const GATEWAY_PROGRAM_ID: Pubkey = pubkey!("gatem74V238djXdzWnJf94Wo1DcnuGkfijbf3AuBhfs");

pub const DEFAULT_TX_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Mint program error codes and the category each one is shown as.
pub const DEFAULT_REJECTION_CODES: &[(u32, RejectionKind)] = &[
    (0x135, RejectionKind::InsufficientFunds),
    (0x137, RejectionKind::SoldOut),
    (0x138, RejectionKind::NotYetLive),
];
