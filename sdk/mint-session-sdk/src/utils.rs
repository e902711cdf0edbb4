use crate::core::connection::LedgerConnection;
use crate::core::constants::{GATEWAY_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID};
use crate::error::{Result, SessionError};
use crate::state::{CandyMachineAccount, END_SETTING_AMOUNT, END_SETTING_DATE};
use crate::types::{EndSettings, GatingConfig, ProgramState};
use solana_sdk::pubkey::Pubkey;
use std::time::{SystemTime, UNIX_EPOCH};

//=============================================================================
// PDA Derivation Helpers
//=============================================================================

/// Derive the candy machine creator PDA that signs as mint authority
pub fn derive_creator_pda(program_id: &Pubkey, candy_machine: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"candy_machine", candy_machine.as_ref()], program_id)
}

/// Derive the token metadata account for a mint
pub fn derive_metadata_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Derive the master edition account for a mint
pub fn derive_master_edition_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            b"edition",
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Derive the gateway token a wallet holds for a gatekeeper network
pub fn derive_gateway_token(wallet: &Pubkey, network: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), b"gateway", &[0u8; 8], network.as_ref()],
        &GATEWAY_PROGRAM_ID,
    )
    .0
}

/// Derive the expire feature account of a gatekeeper network
pub fn derive_network_expire(network: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[network.as_ref(), b"expire"], &GATEWAY_PROGRAM_ID).0
}

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Decode mint program account data into a snapshot as seen at `now`.
pub fn parse_program_state(address: Pubkey, data: &[u8], now: i64) -> Result<ProgramState> {
    let account = CandyMachineAccount::decode(data)
        .map_err(|e| SessionError::LedgerRead(format!("invalid mint program account: {e}")))?;
    let cm = &account.data;

    let end_settings = match cm.end_settings {
        Some(end) if end.end_setting_type == END_SETTING_DATE => {
            Some(EndSettings::Date(end.number as i64))
        },
        Some(end) if end.end_setting_type == END_SETTING_AMOUNT => {
            Some(EndSettings::Amount(end.number))
        },
        Some(end) => {
            return Err(SessionError::LedgerRead(format!(
                "unknown end setting type {}",
                end.end_setting_type
            )))
        },
        None => None,
    };

    let total_supply = match end_settings {
        Some(EndSettings::Amount(limit)) => limit.min(cm.items_available),
        _ => cm.items_available,
    };
    let redeemed = account.items_redeemed;
    let remaining = total_supply.saturating_sub(redeemed);

    let mut is_active = matches!(cm.go_live_date, Some(go_live) if go_live < now);
    if let Some(EndSettings::Date(end)) = end_settings {
        if now > end {
            is_active = false;
        }
    }

    Ok(ProgramState {
        address,
        authority: Pubkey::new_from_array(account.authority),
        treasury: Pubkey::new_from_array(account.wallet),
        token_mint: account.token_mint.map(Pubkey::new_from_array),
        price: cm.price,
        total_supply,
        redeemed,
        remaining,
        is_active,
        is_sold_out: remaining == 0,
        go_live_at: cm.go_live_date,
        end_settings,
        gating: cm.gatekeeper.map(|g| GatingConfig {
            network: Pubkey::new_from_array(g.gatekeeper_network),
            expire_on_use: g.expire_on_use,
        }),
    })
}

/// Fetch and decode the mint program account
pub async fn fetch_program_state(
    connection: &impl LedgerConnection,
    address: &Pubkey,
    now: i64,
) -> Result<ProgramState> {
    let account = connection
        .get_account(address)
        .await
        .map_err(|e| SessionError::LedgerRead(e.to_string()))?
        .ok_or(SessionError::AccountNotFound(*address))?;

    parse_program_state(*address, &account.data, now)
}
