use crate::core::connection::LedgerConnection;
use crate::core::constants::{GATEWAY_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID};
use crate::error::{Result, SessionError};
use crate::state::anchor_discriminator;
use crate::types::ProgramState;
use crate::utils::{
    derive_creator_pda, derive_gateway_token, derive_master_edition_pda, derive_metadata_pda,
    derive_network_expire,
};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::system_instruction;
use solana_sdk::system_program;
use solana_sdk::sysvar;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::solana_program::program_pack::Pack;

/// Candy machine `mint_nft` instruction.
///
/// The payer is also mint and update authority of the new token.
pub fn mint_nft(
    program_id: &Pubkey,
    state: &ProgramState,
    payer: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    let (creator, creator_bump) = derive_creator_pda(program_id, &state.address);

    let mut data = anchor_discriminator("global", "mint_nft").to_vec();
    data.push(creator_bump);

    let mut accounts = vec![
        AccountMeta::new(state.address, false),
        AccountMeta::new_readonly(creator, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new(state.treasury, false),
        AccountMeta::new(derive_metadata_pda(mint), false),
        AccountMeta::new(*mint, false),
        AccountMeta::new_readonly(*payer, true),
        AccountMeta::new_readonly(*payer, true),
        AccountMeta::new(derive_master_edition_pda(mint), false),
        AccountMeta::new_readonly(TOKEN_METADATA_PROGRAM_ID, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(sysvar::clock::id(), false),
        AccountMeta::new_readonly(sysvar::slot_hashes::id(), false),
        AccountMeta::new_readonly(sysvar::instructions::id(), false),
    ];
    accounts.extend(gateway_accounts(state, payer));

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Remaining accounts the program checks when gating is configured.
pub fn gateway_accounts(state: &ProgramState, payer: &Pubkey) -> Vec<AccountMeta> {
    let Some(gating) = state.gating else {
        return Vec::new();
    };

    let mut accounts = vec![AccountMeta::new(
        derive_gateway_token(payer, &gating.network),
        false,
    )];
    if gating.expire_on_use {
        accounts.push(AccountMeta::new_readonly(GATEWAY_PROGRAM_ID, false));
        accounts.push(AccountMeta::new_readonly(
            derive_network_expire(&gating.network),
            false,
        ));
    }
    accounts
}

/// All instructions for one unit: create and initialize the mint, create the
/// payer's token account, mint one token into it, then call `mint_nft`.
pub fn mint_one_instructions(
    program_id: &Pubkey,
    state: &ProgramState,
    payer: &Pubkey,
    mint: &Pubkey,
    mint_rent: u64,
) -> Result<Vec<Instruction>> {
    if state.token_mint.is_some() {
        return Err(SessionError::InvalidProgramState(
            "token-priced mint programs are not supported".to_string(),
        ));
    }

    let token_account = get_associated_token_address(payer, mint);

    Ok(vec![
        system_instruction::create_account(
            payer,
            mint,
            mint_rent,
            spl_token::state::Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint(&spl_token::id(), mint, payer, Some(payer), 0)?,
        create_associated_token_account(payer, payer, mint, &spl_token::id()),
        spl_token::instruction::mint_to(&spl_token::id(), mint, &token_account, payer, &[], 1)?,
        mint_nft(program_id, state, payer, mint),
    ])
}

/// Build the purchase transaction for one unit, signed by the fresh mint
/// keypair only. The wallet signature is added by the `MintSigner`.
pub async fn build_mint_transaction(
    connection: &impl LedgerConnection,
    program_id: &Pubkey,
    state: &ProgramState,
    payer: &Pubkey,
    mint: &Keypair,
) -> Result<Transaction> {
    let mint_rent = connection
        .get_minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
        .await?;
    let instructions =
        mint_one_instructions(program_id, state, payer, &mint.pubkey(), mint_rent)?;

    let blockhash = connection.get_latest_blockhash().await?;
    let message = Message::new_with_blockhash(&instructions, Some(payer), &blockhash);
    let mut tx = Transaction::new_unsigned(message);
    tx.try_partial_sign(&[mint], blockhash)
        .map_err(|e| SessionError::Signing(e.to_string()))?;
    Ok(tx)
}
