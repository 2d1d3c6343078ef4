#![no_std]

//! # Collectible Contract
//!
//! Minimal non-fungible ledger used by the confidential quest for two
//! collections:
//!
//! - **Relic items**, deployed with `open_mint = true` so any player can forge
//!   the item an NPC asks for.
//! - **Rewards**, deployed with `open_mint = false`; only the admin and the
//!   authorized minters (the quest contract) can mint.
//!
//! ## Features
//! - Sequential token ids starting at 1
//! - Single-spender approvals, cleared on transfer
//! - Per-owner balances and total supply
//! - `base_uri || token_id` metadata URIs

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Bytes, Env,
    String, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
    pub open_mint: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    Info,
    /// Addresses allowed to mint when the collection is closed
    Minters,
    NextTokenId,
    /// Token owner: DataKey::Owner(token_id) → Address
    Owner(u64),
    Approved(u64),
    Balance(Address),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CollectibleError {
    NotAdmin = 1,
    NotMinter = 2,
    TokenNotFound = 3,
    NotOwner = 4,
    NotApproved = 5,
    SelfTransfer = 6,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvMinted {
    pub token_id: u64,
    pub to: Address,
}

#[contractevent]
pub struct EvTransferred {
    pub token_id: u64,
    pub from: Address,
    pub to: Address,
}

#[contractevent]
pub struct EvApproved {
    pub token_id: u64,
    pub owner: Address,
    pub spender: Address,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Ownership records outlive the quest records that point at them (120 days)
const TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct Collectible;

#[contractimpl]
impl Collectible {
    pub fn __constructor(
        env: Env,
        admin: Address,
        name: String,
        symbol: String,
        base_uri: String,
        open_mint: bool,
    ) {
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(
            &DataKey::Info,
            &CollectionInfo {
                name,
                symbol,
                base_uri,
                open_mint,
            },
        );
        let empty_minters: Vec<Address> = Vec::new(&env);
        env.storage().instance().set(&DataKey::Minters, &empty_minters);
        env.storage().instance().set(&DataKey::NextTokenId, &1u64);
    }

    /// Add an address that may mint into a closed collection.
    pub fn add_minter(env: Env, caller: Address, minter: Address) -> Result<(), CollectibleError> {
        caller.require_auth();
        if caller != Self::load_admin(&env) {
            return Err(CollectibleError::NotAdmin);
        }
        let mut minters = Self::load_minters(&env);
        if !minters.contains(&minter) {
            minters.push_back(minter);
            env.storage().instance().set(&DataKey::Minters, &minters);
        }
        Ok(())
    }

    /// Mint the next token to `to`. Returns its id.
    pub fn mint(env: Env, minter: Address, to: Address) -> Result<u64, CollectibleError> {
        minter.require_auth();

        let info = Self::load_info(&env);
        if !info.open_mint
            && minter != Self::load_admin(&env)
            && !Self::load_minters(&env).contains(&minter)
        {
            return Err(CollectibleError::NotMinter);
        }

        let token_id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::NextTokenId)
            .unwrap_or(1);
        env.storage()
            .instance()
            .set(&DataKey::NextTokenId, &(token_id + 1));
        env.storage()
            .instance()
            .extend_ttl(TTL_LEDGERS, TTL_LEDGERS);

        Self::write_owner(&env, token_id, &to);
        Self::adjust_balance(&env, &to, 1);

        EvMinted {
            token_id,
            to,
        }
        .publish(&env);

        Ok(token_id)
    }

    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        token_id: u64,
    ) -> Result<(), CollectibleError> {
        owner.require_auth();
        let current = Self::read_owner(&env, token_id)?;
        if current != owner {
            return Err(CollectibleError::NotOwner);
        }

        let key = DataKey::Approved(token_id);
        env.storage().persistent().set(&key, &spender);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_LEDGERS, TTL_LEDGERS);

        EvApproved {
            token_id,
            owner,
            spender,
        }
        .publish(&env);
        Ok(())
    }

    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), CollectibleError> {
        from.require_auth();
        let owner = Self::read_owner(&env, token_id)?;
        if owner != from {
            return Err(CollectibleError::NotOwner);
        }
        Self::move_token(&env, token_id, &from, &to)
    }

    /// Transfer on behalf of `from` using an approval held by `spender`.
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), CollectibleError> {
        spender.require_auth();
        let owner = Self::read_owner(&env, token_id)?;
        if owner != from {
            return Err(CollectibleError::NotOwner);
        }
        if Self::get_approved(env.clone(), token_id) != Some(spender) {
            return Err(CollectibleError::NotApproved);
        }
        Self::move_token(&env, token_id, &from, &to)
    }

    pub fn owner_of(env: Env, token_id: u64) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Owner(token_id))
    }

    pub fn get_approved(env: Env, token_id: u64) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Approved(token_id))
    }

    pub fn balance(env: Env, owner: Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(owner))
            .unwrap_or(0)
    }

    pub fn total_supply(env: Env) -> u64 {
        let next: u64 = env
            .storage()
            .instance()
            .get(&DataKey::NextTokenId)
            .unwrap_or(1);
        next - 1
    }

    pub fn name(env: Env) -> String {
        Self::load_info(&env).name
    }

    pub fn symbol(env: Env) -> String {
        Self::load_info(&env).symbol
    }

    /// `base_uri` followed by the decimal token id.
    pub fn token_uri(env: Env, token_id: u64) -> Result<String, CollectibleError> {
        Self::read_owner(&env, token_id)?;
        let base = Self::load_info(&env).base_uri;

        let mut uri = base.to_bytes();
        uri.append(&Self::decimal_bytes(&env, token_id));

        let mut buf = [0u8; 256];
        let len = uri.len() as usize;
        let len = if len > buf.len() { buf.len() } else { len };
        uri.slice(0..len as u32).copy_into_slice(&mut buf[..len]);
        Ok(String::from_bytes(&env, &buf[..len]))
    }

    // ─── Internal helpers ──────────────────────────────────────────────────

    fn move_token(
        env: &Env,
        token_id: u64,
        from: &Address,
        to: &Address,
    ) -> Result<(), CollectibleError> {
        if from == to {
            return Err(CollectibleError::SelfTransfer);
        }
        env.storage()
            .persistent()
            .remove(&DataKey::Approved(token_id));
        Self::write_owner(env, token_id, to);
        Self::adjust_balance(env, from, -1);
        Self::adjust_balance(env, to, 1);

        EvTransferred {
            token_id,
            from: from.clone(),
            to: to.clone(),
        }
        .publish(env);
        Ok(())
    }

    fn read_owner(env: &Env, token_id: u64) -> Result<Address, CollectibleError> {
        env.storage()
            .persistent()
            .get(&DataKey::Owner(token_id))
            .ok_or(CollectibleError::TokenNotFound)
    }

    fn write_owner(env: &Env, token_id: u64, owner: &Address) {
        let key = DataKey::Owner(token_id);
        env.storage().persistent().set(&key, owner);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_LEDGERS, TTL_LEDGERS);
    }

    fn adjust_balance(env: &Env, owner: &Address, delta: i32) {
        let key = DataKey::Balance(owner.clone());
        let current: u32 = env.storage().persistent().get(&key).unwrap_or(0);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as u32)
        };
        env.storage().persistent().set(&key, &next);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_LEDGERS, TTL_LEDGERS);
    }

    fn decimal_bytes(env: &Env, mut n: u64) -> Bytes {
        let mut digits = [0u8; 20];
        let mut i = digits.len();
        loop {
            i -= 1;
            digits[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        Bytes::from_slice(env, &digits[i..])
    }

    fn load_admin(env: &Env) -> Address {
        env.storage().instance().get(&DataKey::Admin).unwrap()
    }

    fn load_info(env: &Env) -> CollectionInfo {
        env.storage().instance().get(&DataKey::Info).unwrap()
    }

    fn load_minters(env: &Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&DataKey::Minters)
            .unwrap_or(Vec::new(env))
    }
}
