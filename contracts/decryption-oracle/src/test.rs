#![cfg(test)]

//! Oracle tests run against the real cipher registry and a mock requester
//! that records every callback it receives.

use crate::{CipherValue, DecryptionOracle, DecryptionOracleClient, OracleError};
use cipher_registry::{CipherRegistryClient, CipherValue as RegistryValue};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{contract, contractimpl, contracttype, vec, Address, BytesN, Env, Symbol, Vec};

// ════════════════════════════════════════════════════════════════════════════
//  Mock requester
// ════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone)]
enum MockKey {
    Deliveries,
    LastRequest,
    LastValues,
}

#[contract]
pub struct MockRequester;

#[contractimpl]
impl MockRequester {
    pub fn on_disclosed(env: Env, request_id: u64, values: Vec<CipherValue>) {
        let count: u32 = env.storage().instance().get(&MockKey::Deliveries).unwrap_or(0);
        env.storage().instance().set(&MockKey::Deliveries, &(count + 1));
        env.storage().instance().set(&MockKey::LastRequest, &request_id);
        env.storage().instance().set(&MockKey::LastValues, &values);
    }

    pub fn deliveries(env: Env) -> u32 {
        env.storage().instance().get(&MockKey::Deliveries).unwrap_or(0)
    }

    pub fn last_request(env: Env) -> Option<u64> {
        env.storage().instance().get(&MockKey::LastRequest)
    }

    pub fn last_values(env: Env) -> Vec<CipherValue> {
        env.storage()
            .instance()
            .get(&MockKey::LastValues)
            .unwrap_or_else(|| Vec::new(&env))
    }
}

// ════════════════════════════════════════════════════════════════════════════
//  Helpers
// ════════════════════════════════════════════════════════════════════════════

struct Fixture {
    env: Env,
    oracle: DecryptionOracleClient<'static>,
    registry: CipherRegistryClient<'static>,
    requester: MockRequesterClient<'static>,
    admin: Address,
}

fn setup() -> Fixture {
    let env = Env::default();
    env.mock_all_auths();

    env.ledger().set(soroban_sdk::testutils::LedgerInfo {
        timestamp: 1_700_000_000,
        protocol_version: 25,
        sequence_number: 100,
        network_id: Default::default(),
        base_reserve: 10,
        min_temp_entry_ttl: u32::MAX / 2,
        min_persistent_entry_ttl: u32::MAX / 2,
        max_entry_ttl: u32::MAX / 2,
    });

    let admin = Address::generate(&env);
    let registry_id = env.register(cipher_registry::CipherRegistry, (&admin,));
    let registry = CipherRegistryClient::new(&env, &registry_id);

    let oracle_id = env.register(DecryptionOracle, (&admin, &registry_id));
    let oracle = DecryptionOracleClient::new(&env, &oracle_id);
    registry.set_oracle(&oracle_id);

    let requester_id = env.register(MockRequester, ());
    let requester = MockRequesterClient::new(&env, &requester_id);

    Fixture {
        env,
        oracle,
        registry,
        requester,
        admin,
    }
}

fn assert_oracle_error<T, E>(
    result: &Result<Result<T, E>, Result<OracleError, soroban_sdk::InvokeError>>,
    expected: OracleError,
) {
    match result {
        Err(Ok(actual)) => assert_eq!(*actual, expected),
        Err(Err(invoke_err)) => panic!("Expected {:?}, got invoke error: {:?}", expected, invoke_err),
        Ok(_) => panic!("Expected {:?}, but operation succeeded", expected),
    }
}

fn callback(env: &Env) -> Symbol {
    Symbol::new(env, "on_disclosed")
}

// ════════════════════════════════════════════════════════════════════════════
//  Requests
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_request_ids_increase() {
    let f = setup();
    let who = f.requester.address.clone();
    let h = f.registry.encrypt(&who, &RegistryValue::Uint(5));

    assert_eq!(f.oracle.next_request_id(), 1);
    let id1 = f.oracle.request_disclosure(&who, &vec![&f.env, h.clone()], &callback(&f.env));
    let id2 = f.oracle.request_disclosure(&who, &vec![&f.env, h], &callback(&f.env));
    assert_eq!(id1, 1);
    assert_eq!(id2, 2);

    let req = f.oracle.get_request(&id1).unwrap();
    assert_eq!(req.requester, who);
    assert_eq!(req.deliveries, 0);
    assert_eq!(req.created_ledger, 100);
}

#[test]
fn test_request_requires_handle_access() {
    let f = setup();
    let stranger = Address::generate(&f.env);
    let h = f.registry.encrypt(&stranger, &RegistryValue::Uint(5));

    let result = f.oracle.try_request_disclosure(
        &f.requester.address,
        &vec![&f.env, h],
        &callback(&f.env),
    );
    assert_oracle_error(&result, OracleError::HandleNotAllowed);
}

#[test]
fn test_empty_request_rejected() {
    let f = setup();
    let empty: Vec<BytesN<32>> = Vec::new(&f.env);
    let result = f
        .oracle
        .try_request_disclosure(&f.requester.address, &empty, &callback(&f.env));
    assert_oracle_error(&result, OracleError::EmptyRequest);
}

// ════════════════════════════════════════════════════════════════════════════
//  Fulfilment
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_fulfill_delivers_plaintexts_in_order() {
    let f = setup();
    let who = f.requester.address.clone();
    let a = f.registry.encrypt(&who, &RegistryValue::Uint(150));
    let b = f.registry.encrypt(&who, &RegistryValue::Bool(true));

    let id = f
        .oracle
        .request_disclosure(&who, &vec![&f.env, a, b], &callback(&f.env));
    assert_eq!(f.requester.deliveries(), 0);

    f.oracle.fulfill(&f.admin, &id);

    assert_eq!(f.requester.deliveries(), 1);
    assert_eq!(f.requester.last_request(), Some(id));
    let values = f.requester.last_values();
    assert_eq!(values.len(), 2);
    assert_eq!(values.get(0).unwrap(), CipherValue::Uint(150));
    assert_eq!(values.get(1).unwrap(), CipherValue::Bool(true));
}

#[test]
fn test_fulfill_can_redeliver() {
    let f = setup();
    let who = f.requester.address.clone();
    let h = f.registry.encrypt(&who, &RegistryValue::Bool(false));
    let id = f
        .oracle
        .request_disclosure(&who, &vec![&f.env, h], &callback(&f.env));

    f.oracle.fulfill(&f.admin, &id);
    f.oracle.fulfill(&f.admin, &id);

    assert_eq!(f.requester.deliveries(), 2);
    assert_eq!(f.oracle.get_request(&id).unwrap().deliveries, 2);
}

#[test]
fn test_fulfill_relayer_only() {
    let f = setup();
    let who = f.requester.address.clone();
    let h = f.registry.encrypt(&who, &RegistryValue::Uint(1));
    let id = f
        .oracle
        .request_disclosure(&who, &vec![&f.env, h], &callback(&f.env));

    let outsider = Address::generate(&f.env);
    let result = f.oracle.try_fulfill(&outsider, &id);
    assert_oracle_error(&result, OracleError::NotRelayer);

    f.oracle.set_relayer(&outsider);
    assert_eq!(f.oracle.get_relayer(), outsider);
    f.oracle.fulfill(&outsider, &id);
    assert_eq!(f.requester.deliveries(), 1);
}

#[test]
fn test_fulfill_unknown_request() {
    let f = setup();
    let result = f.oracle.try_fulfill(&f.admin, &42);
    assert_oracle_error(&result, OracleError::RequestNotFound);
}
