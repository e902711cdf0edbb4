//! On-chain account layout of the Candy Machine v2 mint program.
//!
//! Anchor accounts start with an 8-byte discriminator followed by the borsh
//! encoded struct. Config lines trail the struct and are not decoded here.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

pub const DISCRIMINATOR_LEN: usize = 8;

/// Anchor discriminator: first 8 bytes of `sha256("<namespace>:<name>")`.
pub fn anchor_discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let hash = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}

pub fn candy_machine_discriminator() -> [u8; DISCRIMINATOR_LEN] {
    anchor_discriminator("account", "CandyMachine")
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CandyMachineAccount {
    pub authority: [u8; 32],
    pub wallet: [u8; 32],
    pub token_mint: Option<[u8; 32]>,
    pub items_redeemed: u64,
    pub data: CandyMachineData,
}

impl CandyMachineAccount {
    /// Decode account data, ignoring trailing config lines.
    pub fn decode(data: &[u8]) -> std::io::Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "account data shorter than discriminator",
            ));
        }
        if data[..DISCRIMINATOR_LEN] != candy_machine_discriminator() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "not a candy machine account",
            ));
        }
        let mut body = &data[DISCRIMINATOR_LEN..];
        Self::deserialize(&mut body)
    }

    /// Discriminator followed by the borsh body.
    pub fn encode(&self) -> std::io::Result<Vec<u8>> {
        let mut out = candy_machine_discriminator().to_vec();
        borsh::to_writer(&mut out, self)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CandyMachineData {
    pub uuid: String,
    pub price: u64,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub max_supply: u64,
    pub is_mutable: bool,
    pub retain_authority: bool,
    pub go_live_date: Option<i64>,
    pub end_settings: Option<EndSettingsLayout>,
    pub creators: Vec<CreatorLayout>,
    pub hidden_settings: Option<HiddenSettingsLayout>,
    pub whitelist_mint_settings: Option<WhitelistMintSettingsLayout>,
    pub items_available: u64,
    pub gatekeeper: Option<GatekeeperLayout>,
}

pub const END_SETTING_DATE: u8 = 0;
pub const END_SETTING_AMOUNT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct EndSettingsLayout {
    pub end_setting_type: u8,
    pub number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreatorLayout {
    pub address: [u8; 32],
    pub verified: bool,
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct HiddenSettingsLayout {
    pub name: String,
    pub uri: String,
    pub hash: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WhitelistMintSettingsLayout {
    pub mode: u8,
    pub mint: [u8; 32],
    pub presale: bool,
    pub discount_price: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GatekeeperLayout {
    pub gatekeeper_network: [u8; 32],
    pub expire_on_use: bool,
}
