#![no_std]

//! # Decryption Oracle
//!
//! Asynchronous disclosure of registry ciphertexts.
//!
//! 1. A contract calls `request_disclosure` with the handles it wants opened
//!    and the name of its callback. It gets a request id back immediately.
//! 2. Later, the relayer calls `fulfill(request_id)`. The oracle decrypts each
//!    handle through the cipher registry and invokes
//!    `requester.<callback>(request_id, values)`.
//!
//! Delivery is at-least-once: `fulfill` may run any number of times for the
//! same request, and requesters must deduplicate by request id. The oracle
//! never expires a request.

use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype, vec,
    Address, BytesN, Env, IntoVal, String, Symbol, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Plaintext shape returned by the cipher registry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CipherValue {
    Uint(u64),
    Bool(bool),
    Account(Address),
    Text(String),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisclosureRequest {
    pub requester: Address,
    pub handles: Vec<BytesN<32>>,
    pub callback: Symbol,
    pub created_ledger: u32,
    /// Number of times the callback has been delivered.
    pub deliveries: u32,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    Relayer,
    Registry,
    NextRequestId,
    Request(u64),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OracleError {
    AdminNotSet = 1,
    RegistryNotSet = 2,
    RelayerNotSet = 3,
    NotRelayer = 4,
    RequestNotFound = 5,
    HandleNotAllowed = 6,
    EmptyRequest = 7,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvDisclosureRequested {
    pub request_id: u64,
    pub requester: Address,
    pub handle_count: u32,
}

#[contractevent]
pub struct EvDisclosureFulfilled {
    pub request_id: u64,
    pub requester: Address,
    pub delivery: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  External trait interfaces
// ═══════════════════════════════════════════════════════════════════════════════

#[contractclient(name = "RegistryClient")]
pub trait CipherRegistry {
    fn is_allowed(env: Env, handle: BytesN<32>, party: Address) -> bool;
    fn decrypt(env: Env, oracle: Address, handle: BytesN<32>) -> CipherValue;
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

const LEDGER_RATE_SECS: u32 = 5;

// Requests are kept for 30 days so late redeliveries can still be served
const TTL_SECONDS: u32 = 30 * 24 * 60 * 60;
const REQUEST_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct DecryptionOracle;

#[contractimpl]
impl DecryptionOracle {
    pub fn __constructor(env: Env, admin: Address, registry: Address) {
        env.storage().instance().set(&StorageKey::Admin, &admin);
        env.storage().instance().set(&StorageKey::Relayer, &admin);
        env.storage().instance().set(&StorageKey::Registry, &registry);
        env.storage().instance().set(&StorageKey::NextRequestId, &1u64);
    }

    /// Queue a disclosure of `handles`; returns the correlation id.
    pub fn request_disclosure(
        env: Env,
        requester: Address,
        handles: Vec<BytesN<32>>,
        callback: Symbol,
    ) -> Result<u64, OracleError> {
        requester.require_auth();
        if handles.is_empty() {
            return Err(OracleError::EmptyRequest);
        }

        let registry = RegistryClient::new(&env, &Self::load_registry(&env)?);
        for handle in handles.iter() {
            if !registry.is_allowed(&handle, &requester) {
                return Err(OracleError::HandleNotAllowed);
            }
        }

        let request_id: u64 = env
            .storage()
            .instance()
            .get(&StorageKey::NextRequestId)
            .unwrap_or(1);
        env.storage()
            .instance()
            .set(&StorageKey::NextRequestId, &(request_id + 1));

        let handle_count = handles.len();
        let request = DisclosureRequest {
            requester: requester.clone(),
            handles,
            callback,
            created_ledger: env.ledger().sequence(),
            deliveries: 0,
        };
        Self::write_request(&env, request_id, &request);

        EvDisclosureRequested {
            request_id,
            requester,
            handle_count,
        }
        .publish(&env);

        Ok(request_id)
    }

    /// Decrypt and deliver a request. Safe to repeat: each call is one delivery.
    pub fn fulfill(env: Env, relayer: Address, request_id: u64) -> Result<(), OracleError> {
        relayer.require_auth();
        if relayer != Self::load_relayer(&env)? {
            return Err(OracleError::NotRelayer);
        }

        let mut request = Self::read_request(&env, request_id)?;
        let registry = RegistryClient::new(&env, &Self::load_registry(&env)?);
        let oracle = env.current_contract_address();

        let mut values: Vec<CipherValue> = Vec::new(&env);
        for handle in request.handles.iter() {
            values.push_back(registry.decrypt(&oracle, &handle));
        }

        request.deliveries = request.deliveries.saturating_add(1);
        Self::write_request(&env, request_id, &request);

        env.invoke_contract::<()>(
            &request.requester,
            &request.callback,
            vec![&env, request_id.into_val(&env), values.into_val(&env)],
        );

        EvDisclosureFulfilled {
            request_id,
            requester: request.requester,
            delivery: request.deliveries,
        }
        .publish(&env);

        Ok(())
    }

    pub fn get_request(env: Env, request_id: u64) -> Option<DisclosureRequest> {
        env.storage()
            .persistent()
            .get(&StorageKey::Request(request_id))
    }

    pub fn next_request_id(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&StorageKey::NextRequestId)
            .unwrap_or(1)
    }

    pub fn get_relayer(env: Env) -> Result<Address, OracleError> {
        Self::load_relayer(&env)
    }

    pub fn set_relayer(env: Env, new_relayer: Address) -> Result<(), OracleError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage()
            .instance()
            .set(&StorageKey::Relayer, &new_relayer);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn read_request(env: &Env, request_id: u64) -> Result<DisclosureRequest, OracleError> {
        env.storage()
            .persistent()
            .get(&StorageKey::Request(request_id))
            .ok_or(OracleError::RequestNotFound)
    }

    fn write_request(env: &Env, request_id: u64, request: &DisclosureRequest) {
        let key = StorageKey::Request(request_id);
        env.storage().persistent().set(&key, request);
        env.storage()
            .persistent()
            .extend_ttl(&key, REQUEST_TTL_LEDGERS, REQUEST_TTL_LEDGERS);
        env.storage()
            .instance()
            .extend_ttl(REQUEST_TTL_LEDGERS, REQUEST_TTL_LEDGERS);
    }

    fn load_admin(env: &Env) -> Result<Address, OracleError> {
        env.storage()
            .instance()
            .get(&StorageKey::Admin)
            .ok_or(OracleError::AdminNotSet)
    }

    fn load_relayer(env: &Env) -> Result<Address, OracleError> {
        env.storage()
            .instance()
            .get(&StorageKey::Relayer)
            .ok_or(OracleError::RelayerNotSet)
    }

    fn load_registry(env: &Env) -> Result<Address, OracleError> {
        env.storage()
            .instance()
            .get(&StorageKey::Registry)
            .ok_or(OracleError::RegistryNotSet)
    }
}

#[cfg(test)]
mod test;
