#![no_std]

//! # Confidential Quest
//!
//! A two-NPC quest whose gates are evaluated over encrypted values. Tribute
//! amounts, the relic's collection and its name never appear on the ledger in
//! plaintext; the contract only stores and compares ciphertext handles issued
//! by the cipher registry.
//!
//! ## Quest flow
//! 1. `begin_stage1` draws an encrypted tribute requirement in `[100, 200)`.
//! 2. `unlock_stage1` lets the player's own client decrypt the requirement
//!    out-of-band.
//! 3. `submit_stage1_payment` takes an encrypted amount plus its input proof,
//!    computes `amount >= requirement` under encryption and asks the
//!    decryption oracle to open the verdict. The player is parked in a pending
//!    sub-state until the oracle calls back.
//! 4. `on_stage1_settled` is the oracle callback. It is matched to the player
//!    by request id and applied at most once; stale or duplicate deliveries
//!    are dropped. A `false` verdict returns the player to the unlocked state
//!    so they can try again.
//! 5. `unlock_stage2` reveals (to the player only) which collection the relic
//!    belongs to and what it is called.
//! 6. `submit_stage2_item` escrows the relic token into this contract.
//! 7. `mint_reward` mints exactly one reward token per player.
//!
//! ## Per-player state machine
//! ```text
//! Tribute: Unassigned -> Assigned -> Unlocked -> (Pending <-> Unlocked)* -> Completed
//! Relic:   Locked -> Unlocked -> Completed        (Unlocked requires Tribute Completed)
//! Reward:  NotMinted -> Minted                    (requires both Completed)
//! ```
//!
//! Each track is a tagged enum, so a record cannot hold a pending request id
//! without a pending state, or a delivered token without a completed relic.

use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype, vec,
    Address, BytesN, Env, String, Symbol, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvStage1Assigned {
    pub player: Address,
    pub requirement: BytesN<32>,
}

#[contractevent]
pub struct EvStage1Unlocked {
    pub player: Address,
}

/// Emitted when an encrypted tribute is accepted and its verdict sent to the oracle.
#[contractevent]
pub struct EvStage1Submitted {
    pub player: Address,
    pub request_id: u64,
}

#[contractevent]
pub struct EvStage1Settled {
    pub player: Address,
    pub request_id: u64,
    pub passed: bool,
}

/// Emitted when an oracle callback does not match any pending settlement.
#[contractevent]
pub struct EvSettlementIgnored {
    pub request_id: u64,
}

/// Emitted when a matching delivery carries no boolean verdict.
#[contractevent]
pub struct EvMalformedDisclosure {
    pub player: Address,
    pub request_id: u64,
}

#[contractevent]
pub struct EvStage2Unlocked {
    pub player: Address,
}

#[contractevent]
pub struct EvStage2Completed {
    pub player: Address,
    pub token_id: u64,
}

#[contractevent]
pub struct EvRewardMinted {
    pub player: Address,
    pub token_id: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  External trait interfaces
// ═══════════════════════════════════════════════════════════════════════════════

/// Plaintext shape used by the cipher registry and the decryption oracle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CipherValue {
    Uint(u64),
    Bool(bool),
    Account(Address),
    Text(String),
}

#[contractclient(name = "RegistryClient")]
pub trait CipherRegistry {
    fn encrypt(env: Env, caller: Address, value: CipherValue) -> BytesN<32>;
    fn encrypt_random(env: Env, caller: Address, min: u64, max: u64) -> BytesN<32>;
    fn verify_input(
        env: Env,
        target: Address,
        owner: Address,
        handle: BytesN<32>,
        proof: BytesN<32>,
    ) -> bool;
    fn grant_disclosure(env: Env, caller: Address, handle: BytesN<32>, party: Address);
    fn compare_ge(env: Env, caller: Address, a: BytesN<32>, b: BytesN<32>) -> BytesN<32>;
}

/// Asynchronous disclosure. The oracle later invokes
/// `callback(request_id, values: Vec<CipherValue>)` on the requester.
#[contractclient(name = "OracleClient")]
pub trait DecryptionOracle {
    fn request_disclosure(
        env: Env,
        requester: Address,
        handles: Vec<BytesN<32>>,
        callback: Symbol,
    ) -> u64;
}

/// Item and reward collections.
#[contractclient(name = "LedgerClient")]
pub trait CollectibleLedger {
    fn mint(env: Env, minter: Address, to: Address) -> u64;
    fn owner_of(env: Env, token_id: u64) -> Option<Address>;
    fn get_approved(env: Env, token_id: u64) -> Option<Address>;
    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, token_id: u64);
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum QuestError {
    PreconditionNotMet = 1,
    PendingSettlementExists = 2,
    InvalidCiphertextProof = 3,
    ItemNotOwnedOrNotApproved = 4,
    AlreadyFinalized = 5,
    AdminNotSet = 6,
    RegistryNotSet = 7,
    OracleNotSet = 8,
    ItemsNotSet = 9,
    RewardsNotSet = 10,
    ItemNameNotSet = 11,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Quest state & storage keys
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TributeTrack {
    Unassigned,
    Assigned(BytesN<32>),
    Unlocked(BytesN<32>),
    /// Requirement handle and the outstanding oracle request id.
    Pending(BytesN<32>, u64),
    Completed(BytesN<32>),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelicTrack {
    Locked,
    Unlocked,
    /// Token id held in escrow by this contract.
    Completed(u64),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RewardTrack {
    NotMinted,
    Minted(u64),
}

/// Stored per player, never deleted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuestRecord {
    pub tribute: TributeTrack,
    pub relic: RelicTrack,
    pub reward: RewardTrack,
}

/// Flat read view of a player's quest record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayerProgress {
    pub stage1_assigned: bool,
    pub stage1_unlocked: bool,
    pub stage1_requirement_handle: Option<BytesN<32>>,
    pub stage1_has_pending: bool,
    pub stage1_pending_request_id: Option<u64>,
    pub stage1_completed: bool,
    pub stage2_unlocked: bool,
    pub stage2_contract_handle: Option<BytesN<32>>,
    pub stage2_name_handle: Option<BytesN<32>>,
    pub stage2_token_id: Option<u64>,
    pub stage2_completed: bool,
    pub reward_minted: bool,
    pub reward_token_id: Option<u64>,
}

/// Ciphertexts describing the relic NPC 2 asks for. Shared by all players.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelicHandles {
    pub contract_handle: BytesN<32>,
    pub name_handle: BytesN<32>,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    RegistryAddress,
    OracleAddress,
    ItemsAddress,
    RewardsAddress,
    ItemName,
    RelicHandles,
    Progress(Address),
    /// Reverse index for oracle callbacks: request id → player.
    /// Present exactly while that player's tribute is `Pending` with this id.
    Settlement(u64),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Tribute requirement range, `[min, max)`.
pub const REQUIREMENT_MIN: u64 = 100;
pub const REQUIREMENT_MAX: u64 = 200;

/// Name of the oracle callback for tribute settlements.
pub const SETTLE_CALLBACK: &str = "on_stage1_settled";

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Progress TTL: 120 days, bumped on every write
const PROGRESS_TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const PROGRESS_TTL_LEDGERS: u32 = PROGRESS_TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct QuestContract;

#[contractimpl]
impl QuestContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    pub fn __constructor(
        env: Env,
        admin: Address,
        registry: Address,
        oracle: Address,
        items: Address,
        rewards: Address,
        item_name: String,
    ) {
        env.storage().instance().set(&StorageKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&StorageKey::RegistryAddress, &registry);
        env.storage()
            .instance()
            .set(&StorageKey::OracleAddress, &oracle);
        env.storage().instance().set(&StorageKey::ItemsAddress, &items);
        env.storage()
            .instance()
            .set(&StorageKey::RewardsAddress, &rewards);
        env.storage().instance().set(&StorageKey::ItemName, &item_name);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Stage 1 (tribute)
    // ───────────────────────────────────────────────────────────────────────────

    /// Draw the player's encrypted tribute requirement. Idempotent: a second
    /// call returns the handle drawn by the first.
    pub fn begin_stage1(env: Env, player: Address) -> Result<BytesN<32>, QuestError> {
        player.require_auth();

        let mut record = Self::read_record(&env, &player);
        if let Some(requirement) = Self::requirement_of(&record.tribute) {
            return Ok(requirement);
        }

        let quest = env.current_contract_address();
        let registry = RegistryClient::new(&env, &Self::load_registry(&env)?);
        // The contract is the sole accessor; the player only gains a
        // disclosure grant in `unlock_stage1`
        let requirement = registry.encrypt_random(&quest, &REQUIREMENT_MIN, &REQUIREMENT_MAX);

        record.tribute = TributeTrack::Assigned(requirement.clone());
        Self::write_record(&env, &player, &record);

        EvStage1Assigned {
            player,
            requirement: requirement.clone(),
        }
        .publish(&env);

        Ok(requirement)
    }

    /// Let the player's own client decrypt the requirement.
    pub fn unlock_stage1(env: Env, player: Address) -> Result<(), QuestError> {
        player.require_auth();

        let mut record = Self::read_record(&env, &player);
        let requirement = match record.tribute.clone() {
            TributeTrack::Unassigned => return Err(QuestError::PreconditionNotMet),
            TributeTrack::Assigned(h) => h,
            // Already unlocked in every later state
            _ => return Ok(()),
        };

        let registry = RegistryClient::new(&env, &Self::load_registry(&env)?);
        registry.grant_disclosure(&env.current_contract_address(), &requirement, &player);

        record.tribute = TributeTrack::Unlocked(requirement);
        Self::write_record(&env, &player, &record);

        EvStage1Unlocked { player }.publish(&env);
        Ok(())
    }

    /// Submit an encrypted tribute. Returns the oracle request id that will
    /// settle it.
    ///
    /// Only one settlement may be outstanding per player; a second submission
    /// before the callback arrives fails with `PendingSettlementExists`.
    pub fn submit_stage1_payment(
        env: Env,
        player: Address,
        amount: BytesN<32>,
        proof: BytesN<32>,
    ) -> Result<u64, QuestError> {
        player.require_auth();

        let mut record = Self::read_record(&env, &player);
        let requirement = match record.tribute.clone() {
            TributeTrack::Unlocked(h) => h,
            TributeTrack::Pending(_, _) => return Err(QuestError::PendingSettlementExists),
            TributeTrack::Completed(_) => return Err(QuestError::AlreadyFinalized),
            TributeTrack::Unassigned | TributeTrack::Assigned(_) => {
                return Err(QuestError::PreconditionNotMet)
            }
        };

        let quest = env.current_contract_address();
        let registry = RegistryClient::new(&env, &Self::load_registry(&env)?);
        if !registry.verify_input(&quest, &player, &amount, &proof) {
            return Err(QuestError::InvalidCiphertextProof);
        }

        let verdict = registry.compare_ge(&quest, &amount, &requirement);

        let oracle = OracleClient::new(&env, &Self::load_oracle(&env)?);
        let request_id = oracle.request_disclosure(
            &quest,
            &vec![&env, verdict],
            &Symbol::new(&env, SETTLE_CALLBACK),
        );

        record.tribute = TributeTrack::Pending(requirement, request_id);
        Self::write_settlement(&env, request_id, &player);
        Self::write_record(&env, &player, &record);

        EvStage1Submitted { player, request_id }.publish(&env);
        Ok(request_id)
    }

    /// Oracle callback for a tribute settlement.
    ///
    /// Deliveries that do not match an outstanding request (unknown id,
    /// duplicate, or superseded), or that carry no boolean verdict, are
    /// dropped without error. Only the configured oracle may call this.
    pub fn on_stage1_settled(
        env: Env,
        request_id: u64,
        values: Vec<CipherValue>,
    ) -> Result<(), QuestError> {
        Self::load_oracle(&env)?.require_auth();

        let index_key = StorageKey::Settlement(request_id);
        let player: Address = match env.storage().persistent().get(&index_key) {
            Some(p) => p,
            None => {
                EvSettlementIgnored { request_id }.publish(&env);
                return Ok(());
            }
        };

        let mut record = Self::read_record(&env, &player);
        let requirement = match record.tribute.clone() {
            TributeTrack::Pending(h, pending_id) if pending_id == request_id => h,
            // Unreachable while the index is maintained alongside the record
            _ => {
                EvSettlementIgnored { request_id }.publish(&env);
                return Ok(());
            }
        };

        // A delivery without a boolean verdict is dropped; the request stays
        // pending until a well-formed redelivery arrives
        let passed = match values.get(0) {
            Some(CipherValue::Bool(b)) => b,
            _ => {
                EvMalformedDisclosure { player, request_id }.publish(&env);
                return Ok(());
            }
        };

        env.storage().persistent().remove(&index_key);
        record.tribute = if passed {
            TributeTrack::Completed(requirement)
        } else {
            TributeTrack::Unlocked(requirement)
        };
        Self::write_record(&env, &player, &record);

        EvStage1Settled {
            player,
            request_id,
            passed,
        }
        .publish(&env);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Stage 2 (relic delivery)
    // ───────────────────────────────────────────────────────────────────────────

    /// Reveal the relic's collection and name to the player. Idempotent.
    pub fn unlock_stage2(env: Env, player: Address) -> Result<(), QuestError> {
        player.require_auth();

        let mut record = Self::read_record(&env, &player);
        if !matches!(record.tribute, TributeTrack::Completed(_)) {
            return Err(QuestError::PreconditionNotMet);
        }
        if record.relic != RelicTrack::Locked {
            return Ok(());
        }

        let quest = env.current_contract_address();
        let registry = RegistryClient::new(&env, &Self::load_registry(&env)?);
        let handles = Self::ensure_relic_handles(&env, &registry, &quest)?;
        registry.grant_disclosure(&quest, &handles.contract_handle, &player);
        registry.grant_disclosure(&quest, &handles.name_handle, &player);

        record.relic = RelicTrack::Unlocked;
        Self::write_record(&env, &player, &record);

        EvStage2Unlocked { player }.publish(&env);
        Ok(())
    }

    /// Deliver the relic. The player must own `token_id` and have approved
    /// this contract; the token is escrowed here.
    pub fn submit_stage2_item(env: Env, player: Address, token_id: u64) -> Result<(), QuestError> {
        player.require_auth();

        let mut record = Self::read_record(&env, &player);
        match record.relic {
            RelicTrack::Locked => return Err(QuestError::PreconditionNotMet),
            RelicTrack::Completed(_) => return Err(QuestError::AlreadyFinalized),
            RelicTrack::Unlocked => {}
        }

        let quest = env.current_contract_address();
        let items = LedgerClient::new(&env, &Self::load_items(&env)?);
        let owned = items.owner_of(&token_id) == Some(player.clone());
        let approved = items.get_approved(&token_id) == Some(quest.clone());
        if !owned || !approved {
            return Err(QuestError::ItemNotOwnedOrNotApproved);
        }

        items.transfer_from(&quest, &player, &quest, &token_id);

        record.relic = RelicTrack::Completed(token_id);
        Self::write_record(&env, &player, &record);

        EvStage2Completed { player, token_id }.publish(&env);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Reward
    // ───────────────────────────────────────────────────────────────────────────

    /// Mint the quest reward. Succeeds at most once per player.
    pub fn mint_reward(env: Env, player: Address) -> Result<u64, QuestError> {
        player.require_auth();

        let mut record = Self::read_record(&env, &player);
        if let RewardTrack::Minted(_) = record.reward {
            return Err(QuestError::AlreadyFinalized);
        }
        let tribute_done = matches!(record.tribute, TributeTrack::Completed(_));
        let relic_done = matches!(record.relic, RelicTrack::Completed(_));
        if !tribute_done || !relic_done {
            return Err(QuestError::PreconditionNotMet);
        }

        let rewards = LedgerClient::new(&env, &Self::load_rewards(&env)?);
        let token_id = rewards.mint(&env.current_contract_address(), &player);

        record.reward = RewardTrack::Minted(token_id);
        Self::write_record(&env, &player, &record);

        EvRewardMinted { player, token_id }.publish(&env);
        Ok(token_id)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Queries
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_progress(env: Env, player: Address) -> PlayerProgress {
        let record = Self::read_record(&env, &player);
        Self::progress_view(&env, &record)
    }

    pub fn get_record(env: Env, player: Address) -> QuestRecord {
        Self::read_record(&env, &player)
    }

    pub fn get_requirement_handle(env: Env, player: Address) -> Option<BytesN<32>> {
        Self::requirement_of(&Self::read_record(&env, &player).tribute)
    }

    /// `(collection handle, name handle)` once any player has unlocked stage 2.
    pub fn get_stage2_handles(env: Env) -> Option<(BytesN<32>, BytesN<32>)> {
        Self::read_relic_handles(&env).map(|h| (h.contract_handle, h.name_handle))
    }

    /// Player waiting on `request_id`, if that settlement is still outstanding.
    pub fn get_pending_player(env: Env, request_id: u64) -> Option<Address> {
        env.storage()
            .persistent()
            .get(&StorageKey::Settlement(request_id))
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_admin(env: Env) -> Result<Address, QuestError> {
        Self::load_admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), QuestError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage()
            .instance()
            .set(&StorageKey::Admin, &new_admin);
        Ok(())
    }

    pub fn get_oracle(env: Env) -> Result<Address, QuestError> {
        Self::load_oracle(&env)
    }

    /// Replace the oracle. Callbacks from the previous oracle are rejected
    /// from then on; settlements it still owes stay pending.
    pub fn set_oracle(env: Env, new_oracle: Address) -> Result<(), QuestError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage()
            .instance()
            .set(&StorageKey::OracleAddress, &new_oracle);
        Ok(())
    }

    pub fn get_registry(env: Env) -> Result<Address, QuestError> {
        Self::load_registry(&env)
    }

    pub fn get_items(env: Env) -> Result<Address, QuestError> {
        Self::load_items(&env)
    }

    pub fn get_rewards(env: Env) -> Result<Address, QuestError> {
        Self::load_rewards(&env)
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), QuestError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: State helpers
    // ═══════════════════════════════════════════════════════════════════════════

    fn requirement_of(track: &TributeTrack) -> Option<BytesN<32>> {
        match track {
            TributeTrack::Unassigned => None,
            TributeTrack::Assigned(h)
            | TributeTrack::Unlocked(h)
            | TributeTrack::Pending(h, _)
            | TributeTrack::Completed(h) => Some(h.clone()),
        }
    }

    fn progress_view(env: &Env, record: &QuestRecord) -> PlayerProgress {
        let stage1_assigned = record.tribute != TributeTrack::Unassigned;
        let stage1_unlocked = !matches!(
            record.tribute,
            TributeTrack::Unassigned | TributeTrack::Assigned(_)
        );
        let stage1_pending_request_id = match record.tribute {
            TributeTrack::Pending(_, id) => Some(id),
            _ => None,
        };

        let stage2_unlocked = record.relic != RelicTrack::Locked;
        let relic_handles = if stage2_unlocked {
            Self::read_relic_handles(env)
        } else {
            None
        };
        let stage2_token_id = match record.relic {
            RelicTrack::Completed(id) => Some(id),
            _ => None,
        };
        let reward_token_id = match record.reward {
            RewardTrack::Minted(id) => Some(id),
            RewardTrack::NotMinted => None,
        };

        PlayerProgress {
            stage1_assigned,
            stage1_unlocked,
            stage1_requirement_handle: Self::requirement_of(&record.tribute),
            stage1_has_pending: stage1_pending_request_id.is_some(),
            stage1_pending_request_id,
            stage1_completed: matches!(record.tribute, TributeTrack::Completed(_)),
            stage2_unlocked,
            stage2_contract_handle: relic_handles.clone().map(|h| h.contract_handle),
            stage2_name_handle: relic_handles.map(|h| h.name_handle),
            stage2_token_id,
            stage2_completed: stage2_token_id.is_some(),
            reward_minted: reward_token_id.is_some(),
            reward_token_id,
        }
    }

    /// Create the shared relic ciphertexts on first use.
    fn ensure_relic_handles(
        env: &Env,
        registry: &RegistryClient,
        quest: &Address,
    ) -> Result<RelicHandles, QuestError> {
        if let Some(handles) = Self::read_relic_handles(env) {
            return Ok(handles);
        }

        let items = Self::load_items(env)?;
        let item_name = Self::load_item_name(env)?;
        let handles = RelicHandles {
            contract_handle: registry.encrypt(quest, &CipherValue::Account(items)),
            name_handle: registry.encrypt(quest, &CipherValue::Text(item_name)),
        };
        env.storage()
            .instance()
            .set(&StorageKey::RelicHandles, &handles);
        Ok(handles)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn read_record(env: &Env, player: &Address) -> QuestRecord {
        env.storage()
            .persistent()
            .get(&StorageKey::Progress(player.clone()))
            .unwrap_or(QuestRecord {
                tribute: TributeTrack::Unassigned,
                relic: RelicTrack::Locked,
                reward: RewardTrack::NotMinted,
            })
    }

    fn write_record(env: &Env, player: &Address, record: &QuestRecord) {
        let key = StorageKey::Progress(player.clone());
        env.storage().persistent().set(&key, record);
        env.storage()
            .persistent()
            .extend_ttl(&key, PROGRESS_TTL_LEDGERS, PROGRESS_TTL_LEDGERS);
        // Keep instance storage (collaborator addresses, relic handles) alive
        env.storage()
            .instance()
            .extend_ttl(PROGRESS_TTL_LEDGERS, PROGRESS_TTL_LEDGERS);
    }

    fn write_settlement(env: &Env, request_id: u64, player: &Address) {
        let key = StorageKey::Settlement(request_id);
        env.storage().persistent().set(&key, player);
        env.storage()
            .persistent()
            .extend_ttl(&key, PROGRESS_TTL_LEDGERS, PROGRESS_TTL_LEDGERS);
    }

    fn read_relic_handles(env: &Env) -> Option<RelicHandles> {
        env.storage().instance().get(&StorageKey::RelicHandles)
    }

    fn load_admin(env: &Env) -> Result<Address, QuestError> {
        env.storage()
            .instance()
            .get(&StorageKey::Admin)
            .ok_or(QuestError::AdminNotSet)
    }

    fn load_registry(env: &Env) -> Result<Address, QuestError> {
        env.storage()
            .instance()
            .get(&StorageKey::RegistryAddress)
            .ok_or(QuestError::RegistryNotSet)
    }

    fn load_oracle(env: &Env) -> Result<Address, QuestError> {
        env.storage()
            .instance()
            .get(&StorageKey::OracleAddress)
            .ok_or(QuestError::OracleNotSet)
    }

    fn load_items(env: &Env) -> Result<Address, QuestError> {
        env.storage()
            .instance()
            .get(&StorageKey::ItemsAddress)
            .ok_or(QuestError::ItemsNotSet)
    }

    fn load_rewards(env: &Env) -> Result<Address, QuestError> {
        env.storage()
            .instance()
            .get(&StorageKey::RewardsAddress)
            .ok_or(QuestError::RewardsNotSet)
    }

    fn load_item_name(env: &Env) -> Result<String, QuestError> {
        env.storage()
            .instance()
            .get(&StorageKey::ItemName)
            .ok_or(QuestError::ItemNameNotSet)
    }
}
