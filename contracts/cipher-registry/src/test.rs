#![cfg(test)]

use crate::{CipherRegistry, CipherRegistryClient, CipherValue, RegistryError};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{Address, BytesN, Env, String};

// ════════════════════════════════════════════════════════════════════════════
//  Helpers
// ════════════════════════════════════════════════════════════════════════════

fn setup() -> (Env, CipherRegistryClient<'static>, Address) {
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
    let contract_id = env.register(CipherRegistry, (&admin,));
    let client = CipherRegistryClient::new(&env, &contract_id);

    (env, client, admin)
}

fn assert_registry_error<T, E>(
    result: &Result<Result<T, E>, Result<RegistryError, soroban_sdk::InvokeError>>,
    expected: RegistryError,
) {
    match result {
        Err(Ok(actual)) => assert_eq!(*actual, expected),
        Err(Err(invoke_err)) => panic!("Expected {:?}, got invoke error: {:?}", expected, invoke_err),
        Ok(_) => panic!("Expected {:?}, but operation succeeded", expected),
    }
}

// ════════════════════════════════════════════════════════════════════════════
//  Creation
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_handles_are_unique() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);

    let h1 = client.encrypt(&owner, &CipherValue::Uint(7));
    let h2 = client.encrypt(&owner, &CipherValue::Uint(7));
    assert_ne!(h1, h2);
    assert!(client.is_allowed(&h1, &owner));
    assert!(client.is_allowed(&h2, &owner));
}

#[test]
fn test_random_draw_stays_in_range() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let oracle = Address::generate(&env);
    client.set_oracle(&oracle);

    for _ in 0..20 {
        let h = client.encrypt_random(&owner, &100, &200);
        match client.decrypt(&oracle, &h) {
            CipherValue::Uint(v) => assert!((100..200).contains(&v)),
            other => panic!("unexpected plaintext {:?}", other),
        }
    }
}

#[test]
fn test_random_draw_empty_range_rejected() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let result = client.try_encrypt_random(&owner, &200, &200);
    assert_registry_error(&result, RegistryError::InvalidRange);
}

// ════════════════════════════════════════════════════════════════════════════
//  Access & disclosure
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_allow_is_creator_only() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let stranger = Address::generate(&env);
    let friend = Address::generate(&env);

    let h = client.encrypt(&owner, &CipherValue::Bool(true));
    let result = client.try_allow(&stranger, &h, &friend);
    assert_registry_error(&result, RegistryError::NotCreator);

    client.allow(&owner, &h, &friend);
    assert!(client.is_allowed(&h, &friend));
}

#[test]
fn test_accessor_cannot_reshare() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let player = Address::generate(&env);
    let stranger = Address::generate(&env);

    let h = client.encrypt(&owner, &CipherValue::Uint(136));
    client.allow(&owner, &h, &player);

    let result = client.try_grant_disclosure(&player, &h, &player);
    assert_registry_error(&result, RegistryError::NotCreator);
    let result = client.try_grant_disclosure(&player, &h, &stranger);
    assert_registry_error(&result, RegistryError::NotCreator);
    let result = client.try_allow(&player, &h, &stranger);
    assert_registry_error(&result, RegistryError::NotCreator);

    assert!(!client.can_disclose(&h, &player));
    assert!(!client.can_disclose(&h, &stranger));
    assert!(!client.is_allowed(&h, &stranger));
    let result = client.try_user_decrypt(&player, &h);
    assert_registry_error(&result, RegistryError::DisclosureNotGranted);
}

#[test]
fn test_user_decrypt_needs_disclosure_grant() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let player = Address::generate(&env);

    let h = client.encrypt(&owner, &CipherValue::Uint(150));
    client.allow(&owner, &h, &player);

    // Access alone does not disclose the plaintext
    let result = client.try_user_decrypt(&player, &h);
    assert_registry_error(&result, RegistryError::DisclosureNotGranted);

    client.grant_disclosure(&owner, &h, &player);
    assert!(client.can_disclose(&h, &player));
    assert_eq!(client.user_decrypt(&player, &h), CipherValue::Uint(150));
}

#[test]
fn test_unknown_handle_rejected() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let bogus = BytesN::<32>::from_array(&env, &[9u8; 32]);

    let result = client.try_allow(&owner, &bogus, &owner);
    assert_registry_error(&result, RegistryError::UnknownHandle);
}

// ════════════════════════════════════════════════════════════════════════════
//  Encrypted comparison
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_compare_ge() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let oracle = Address::generate(&env);
    client.set_oracle(&oracle);

    let low = client.encrypt(&owner, &CipherValue::Uint(120));
    let high = client.encrypt(&owner, &CipherValue::Uint(150));

    let ge = client.compare_ge(&owner, &high, &low);
    assert_eq!(client.decrypt(&oracle, &ge), CipherValue::Bool(true));

    let eq = client.compare_ge(&owner, &low, &low);
    assert_eq!(client.decrypt(&oracle, &eq), CipherValue::Bool(true));

    let lt = client.compare_ge(&owner, &low, &high);
    assert_eq!(client.decrypt(&oracle, &lt), CipherValue::Bool(false));
    assert!(client.is_allowed(&lt, &owner));
}

#[test]
fn test_compare_ge_type_mismatch() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);

    let n = client.encrypt(&owner, &CipherValue::Uint(1));
    let s = client.encrypt(&owner, &CipherValue::Text(String::from_str(&env, "relic")));
    let result = client.try_compare_ge(&owner, &n, &s);
    assert_registry_error(&result, RegistryError::TypeMismatch);
}

#[test]
fn test_compare_ge_requires_access_to_both() {
    let (env, client, _admin) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);

    let a = client.encrypt(&alice, &CipherValue::Uint(1));
    let b = client.encrypt(&bob, &CipherValue::Uint(2));
    let result = client.try_compare_ge(&alice, &a, &b);
    assert_registry_error(&result, RegistryError::NotAllowed);
}

// ════════════════════════════════════════════════════════════════════════════
//  Input proofs
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_verify_input_accepts_bound_proof() {
    let (env, client, _admin) = setup();
    let player = Address::generate(&env);
    let target = Address::generate(&env);

    let input = client.encrypt_input(&player, &target, &CipherValue::Uint(150));
    assert!(!client.is_allowed(&input.handle, &target));

    assert!(client.verify_input(&target, &player, &input.handle, &input.proof));
    assert!(client.is_allowed(&input.handle, &target));
}

#[test]
fn test_verify_input_rejects_other_target() {
    let (env, client, _admin) = setup();
    let player = Address::generate(&env);
    let target = Address::generate(&env);
    let other = Address::generate(&env);

    let input = client.encrypt_input(&player, &target, &CipherValue::Uint(150));
    assert!(!client.verify_input(&other, &player, &input.handle, &input.proof));
    assert!(!client.is_allowed(&input.handle, &other));
}

#[test]
fn test_verify_input_rejects_other_owner() {
    let (env, client, _admin) = setup();
    let player = Address::generate(&env);
    let thief = Address::generate(&env);
    let target = Address::generate(&env);

    let input = client.encrypt_input(&player, &target, &CipherValue::Uint(150));
    assert!(!client.verify_input(&target, &thief, &input.handle, &input.proof));
}

#[test]
fn test_verify_input_rejects_non_input_ciphertext() {
    let (env, client, _admin) = setup();
    let player = Address::generate(&env);
    let target = Address::generate(&env);

    let h = client.encrypt(&player, &CipherValue::Uint(150));
    let forged = BytesN::<32>::from_array(&env, &[1u8; 32]);
    assert!(!client.verify_input(&target, &player, &h, &forged));
}

// ════════════════════════════════════════════════════════════════════════════
//  Oracle-only decryption
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_decrypt_oracle_only() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let h = client.encrypt(&owner, &CipherValue::Uint(3));

    let result = client.try_decrypt(&owner, &h);
    assert_registry_error(&result, RegistryError::OracleNotSet);

    let oracle = Address::generate(&env);
    client.set_oracle(&oracle);
    assert_eq!(client.get_oracle(), oracle);

    let result = client.try_decrypt(&owner, &h);
    assert_registry_error(&result, RegistryError::NotOracle);
    assert_eq!(client.decrypt(&oracle, &h), CipherValue::Uint(3));
}
