#![no_std]

//! # Cipher Registry
//!
//! Reference ciphertext coprocessor for the confidential quest.
//!
//! Every encrypted value lives behind an opaque 32-byte **handle**. Contracts
//! store, compare and authorize handles; they never read the plaintext. The
//! registry keeps the plaintext in its own storage and only hands it out to:
//!
//! - the configured decryption oracle (`decrypt`), and
//! - a party that holds an explicit disclosure grant (`user_decrypt`).
//!
//! ## Access model
//!
//! | List        | Granted by                         | Lets the party                     |
//! |-------------|------------------------------------|------------------------------------|
//! | access      | creation / the creator via `allow` | compute on the handle              |
//! | disclosure  | the creator via `grant_disclosure` | read the plaintext out-of-band     |
//!
//! Only the creator of a handle may extend either list. Being on the access
//! list of someone else's handle never lets a party re-share it.
//!
//! ## Input binding
//!
//! Client-side inputs are created with `encrypt_input`, which returns the
//! handle plus a proof binding it to `(owner, target contract)`:
//!
//! ```text
//! proof = keccak256("INPT" || handle || owner || target)
//! ```
//!
//! `verify_input` recomputes the proof, and on success adds the target
//! contract to the handle's access list.

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Bytes, BytesN,
    Env, String,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Plaintext behind a handle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CipherValue {
    Uint(u64),
    Bool(bool),
    Account(Address),
    Text(String),
}

/// A client-produced ciphertext and the proof binding it to owner and target.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedInput {
    pub handle: BytesN<32>,
    pub proof: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CipherEntry {
    pub value: CipherValue,
    pub creator: Address,
    /// Set only for ciphertexts created through `encrypt_input`.
    pub input_owner: Option<Address>,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    Oracle,
    Nonce,
    Cipher(BytesN<32>),
    Access(BytesN<32>, Address),
    Disclosure(BytesN<32>, Address),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    AdminNotSet = 1,
    OracleNotSet = 2,
    UnknownHandle = 3,
    NotAllowed = 4,
    TypeMismatch = 5,
    InvalidRange = 6,
    NotOracle = 7,
    DisclosureNotGranted = 8,
    NotCreator = 9,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvCipherCreated {
    pub handle: BytesN<32>,
    pub creator: Address,
}

#[contractevent]
pub struct EvAccessGranted {
    pub handle: BytesN<32>,
    pub party: Address,
}

#[contractevent]
pub struct EvDisclosureGranted {
    pub handle: BytesN<32>,
    pub party: Address,
}

#[contractevent]
pub struct EvInputRejected {
    pub handle: BytesN<32>,
    pub reason: u32,
}

// Rejection reasons for EvInputRejected
const REJECT_UNKNOWN_HANDLE: u32 = 1;
const REJECT_NOT_AN_INPUT: u32 = 2;
const REJECT_OWNER_MISMATCH: u32 = 3;
const REJECT_PROOF_MISMATCH: u32 = 4;

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Domain separator for handle derivation: ASCII "HNDL"
const HANDLE_TAG: [u8; 4] = [0x48, 0x4E, 0x44, 0x4C];

/// Domain separator for input proofs: ASCII "INPT"
const INPUT_TAG: [u8; 4] = [0x49, 0x4E, 0x50, 0x54];

const LEDGER_RATE_SECS: u32 = 5;

// Ciphertexts back long-lived quest records (120 days)
const TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const CIPHER_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct CipherRegistry;

#[contractimpl]
impl CipherRegistry {
    pub fn __constructor(env: Env, admin: Address) {
        env.storage().instance().set(&StorageKey::Admin, &admin);
        env.storage().instance().set(&StorageKey::Nonce, &0u64);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Ciphertext creation
    // ───────────────────────────────────────────────────────────────────────────

    /// Encrypt a trivially known value. The caller is allowed on the result.
    pub fn encrypt(env: Env, caller: Address, value: CipherValue) -> BytesN<32> {
        caller.require_auth();
        let handle = Self::store_cipher(&env, &caller, value, None);
        Self::write_access(&env, &handle, &caller);
        handle
    }

    /// Draw a uniform `Uint` in `[min, max)` without revealing it to anyone.
    pub fn encrypt_random(
        env: Env,
        caller: Address,
        min: u64,
        max: u64,
    ) -> Result<BytesN<32>, RegistryError> {
        caller.require_auth();
        if min >= max {
            return Err(RegistryError::InvalidRange);
        }
        let drawn = env.prng().gen_range::<u64>(min..max);
        let handle = Self::store_cipher(&env, &caller, CipherValue::Uint(drawn), None);
        Self::write_access(&env, &handle, &caller);
        Ok(handle)
    }

    /// Client-side encryption of an input destined for `target`.
    pub fn encrypt_input(
        env: Env,
        owner: Address,
        target: Address,
        value: CipherValue,
    ) -> EncryptedInput {
        owner.require_auth();
        let handle = Self::store_cipher(&env, &owner, value, Some(owner.clone()));
        Self::write_access(&env, &handle, &owner);
        let proof = Self::input_proof(&env, &handle, &owner, &target);
        EncryptedInput { handle, proof }
    }

    /// Check that `proof` binds `handle` to `owner` and `target`.
    ///
    /// Returns `false` instead of failing so callers can map a bad proof onto
    /// their own error. On success `target` is added to the access list.
    pub fn verify_input(
        env: Env,
        target: Address,
        owner: Address,
        handle: BytesN<32>,
        proof: BytesN<32>,
    ) -> bool {
        target.require_auth();

        let entry = match Self::read_cipher(&env, &handle) {
            Ok(entry) => entry,
            Err(_) => return Self::reject_input(&env, handle, REJECT_UNKNOWN_HANDLE),
        };
        let input_owner = match entry.input_owner {
            Some(o) => o,
            None => return Self::reject_input(&env, handle, REJECT_NOT_AN_INPUT),
        };
        if input_owner != owner {
            return Self::reject_input(&env, handle, REJECT_OWNER_MISMATCH);
        }
        if Self::input_proof(&env, &handle, &owner, &target) != proof {
            return Self::reject_input(&env, handle, REJECT_PROOF_MISMATCH);
        }

        Self::write_access(&env, &handle, &target);
        true
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Access control
    // ───────────────────────────────────────────────────────────────────────────

    /// Add `party` to the access list. Creator only.
    pub fn allow(
        env: Env,
        caller: Address,
        handle: BytesN<32>,
        party: Address,
    ) -> Result<(), RegistryError> {
        caller.require_auth();
        Self::require_creator(&env, &handle, &caller)?;
        Self::write_access(&env, &handle, &party);
        Ok(())
    }

    /// Let `party` read the plaintext through `user_decrypt`. Creator only.
    pub fn grant_disclosure(
        env: Env,
        caller: Address,
        handle: BytesN<32>,
        party: Address,
    ) -> Result<(), RegistryError> {
        caller.require_auth();
        Self::require_creator(&env, &handle, &caller)?;

        let key = StorageKey::Disclosure(handle.clone(), party.clone());
        env.storage().persistent().set(&key, &true);
        env.storage()
            .persistent()
            .extend_ttl(&key, CIPHER_TTL_LEDGERS, CIPHER_TTL_LEDGERS);

        EvDisclosureGranted { handle, party }.publish(&env);
        Ok(())
    }

    pub fn is_allowed(env: Env, handle: BytesN<32>, party: Address) -> bool {
        env.storage()
            .persistent()
            .get(&StorageKey::Access(handle, party))
            .unwrap_or(false)
    }

    pub fn can_disclose(env: Env, handle: BytesN<32>, party: Address) -> bool {
        env.storage()
            .persistent()
            .get(&StorageKey::Disclosure(handle, party))
            .unwrap_or(false)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Encrypted operations
    // ───────────────────────────────────────────────────────────────────────────

    /// Encrypted `a >= b`. Both operands must be `Uint` and accessible to the caller.
    pub fn compare_ge(
        env: Env,
        caller: Address,
        a: BytesN<32>,
        b: BytesN<32>,
    ) -> Result<BytesN<32>, RegistryError> {
        caller.require_auth();
        let lhs = Self::read_cipher(&env, &a)?;
        let rhs = Self::read_cipher(&env, &b)?;
        Self::require_access(&env, &a, &caller)?;
        Self::require_access(&env, &b, &caller)?;

        let verdict = match (lhs.value, rhs.value) {
            (CipherValue::Uint(x), CipherValue::Uint(y)) => x >= y,
            _ => return Err(RegistryError::TypeMismatch),
        };

        let handle = Self::store_cipher(&env, &caller, CipherValue::Bool(verdict), None);
        Self::write_access(&env, &handle, &caller);
        Ok(handle)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Decryption
    // ───────────────────────────────────────────────────────────────────────────

    /// Plaintext for the decryption oracle only.
    pub fn decrypt(
        env: Env,
        oracle: Address,
        handle: BytesN<32>,
    ) -> Result<CipherValue, RegistryError> {
        oracle.require_auth();
        if oracle != Self::load_oracle(&env)? {
            return Err(RegistryError::NotOracle);
        }
        Ok(Self::read_cipher(&env, &handle)?.value)
    }

    /// Out-of-band plaintext for a party holding a disclosure grant.
    pub fn user_decrypt(
        env: Env,
        party: Address,
        handle: BytesN<32>,
    ) -> Result<CipherValue, RegistryError> {
        party.require_auth();
        let entry = Self::read_cipher(&env, &handle)?;
        if !Self::can_disclose(env.clone(), handle, party) {
            return Err(RegistryError::DisclosureNotGranted);
        }
        Ok(entry.value)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_admin(env: Env) -> Result<Address, RegistryError> {
        Self::load_admin(&env)
    }

    pub fn get_oracle(env: Env) -> Result<Address, RegistryError> {
        Self::load_oracle(&env)
    }

    pub fn set_oracle(env: Env, oracle: Address) -> Result<(), RegistryError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::Oracle, &oracle);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal
    // ═══════════════════════════════════════════════════════════════════════════

    fn store_cipher(
        env: &Env,
        creator: &Address,
        value: CipherValue,
        input_owner: Option<Address>,
    ) -> BytesN<32> {
        let nonce: u64 = env
            .storage()
            .instance()
            .get(&StorageKey::Nonce)
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&StorageKey::Nonce, &nonce.saturating_add(1));
        env.storage()
            .instance()
            .extend_ttl(CIPHER_TTL_LEDGERS, CIPHER_TTL_LEDGERS);

        let mut pre = Bytes::from_array(env, &HANDLE_TAG);
        pre.append(&Bytes::from_array(env, &nonce.to_be_bytes()));
        pre.append(&Bytes::from_array(env, &env.ledger().sequence().to_be_bytes()));
        pre.append(&env.current_contract_address().to_string().to_bytes());
        let handle: BytesN<32> = env.crypto().keccak256(&pre).into();

        let key = StorageKey::Cipher(handle.clone());
        env.storage()
            .persistent()
            .set(
                &key,
                &CipherEntry {
                    value,
                    creator: creator.clone(),
                    input_owner,
                },
            );
        env.storage()
            .persistent()
            .extend_ttl(&key, CIPHER_TTL_LEDGERS, CIPHER_TTL_LEDGERS);

        EvCipherCreated {
            handle: handle.clone(),
            creator: creator.clone(),
        }
        .publish(env);

        handle
    }

    fn input_proof(
        env: &Env,
        handle: &BytesN<32>,
        owner: &Address,
        target: &Address,
    ) -> BytesN<32> {
        let mut pre = Bytes::from_array(env, &INPUT_TAG);
        pre.append(&Bytes::from_array(env, &handle.to_array()));
        pre.append(&owner.to_string().to_bytes());
        pre.append(&target.to_string().to_bytes());
        env.crypto().keccak256(&pre).into()
    }

    fn reject_input(env: &Env, handle: BytesN<32>, reason: u32) -> bool {
        EvInputRejected { handle, reason }.publish(env);
        false
    }

    fn read_cipher(env: &Env, handle: &BytesN<32>) -> Result<CipherEntry, RegistryError> {
        env.storage()
            .persistent()
            .get(&StorageKey::Cipher(handle.clone()))
            .ok_or(RegistryError::UnknownHandle)
    }

    fn require_creator(
        env: &Env,
        handle: &BytesN<32>,
        caller: &Address,
    ) -> Result<(), RegistryError> {
        if Self::read_cipher(env, handle)?.creator != *caller {
            return Err(RegistryError::NotCreator);
        }
        Ok(())
    }

    fn require_access(
        env: &Env,
        handle: &BytesN<32>,
        party: &Address,
    ) -> Result<(), RegistryError> {
        let allowed: bool = env
            .storage()
            .persistent()
            .get(&StorageKey::Access(handle.clone(), party.clone()))
            .unwrap_or(false);
        if !allowed {
            return Err(RegistryError::NotAllowed);
        }
        Ok(())
    }

    fn write_access(env: &Env, handle: &BytesN<32>, party: &Address) {
        let key = StorageKey::Access(handle.clone(), party.clone());
        env.storage().persistent().set(&key, &true);
        env.storage()
            .persistent()
            .extend_ttl(&key, CIPHER_TTL_LEDGERS, CIPHER_TTL_LEDGERS);

        EvAccessGranted {
            handle: handle.clone(),
            party: party.clone(),
        }
        .publish(env);
    }

    fn load_admin(env: &Env) -> Result<Address, RegistryError> {
        env.storage()
            .instance()
            .get(&StorageKey::Admin)
            .ok_or(RegistryError::AdminNotSet)
    }

    fn load_oracle(env: &Env) -> Result<Address, RegistryError> {
        env.storage()
            .instance()
            .get(&StorageKey::Oracle)
            .ok_or(RegistryError::OracleNotSet)
    }
}

#[cfg(test)]
mod test;
