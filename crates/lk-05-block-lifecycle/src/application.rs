//! # Application
//!
//! Owns the root state, the committed store and the writes of the block in
//! progress. The engine serializes calls, so nothing here locks.

use crate::config::LifecycleConfig;
use crate::domain::errors::LifecycleError;
use crate::domain::hashing::commit_hash;
use crate::domain::state::{AppState, STATE_KEY};
use crate::domain::validators::{
    decode_validator, encode_validator, validator_key, ValidatorIndex, VALIDATOR_PREFIX,
};
use lk_01_kv_store::{BatchOperation, KeyValueStore, StagedStore, WriteSet};
use lk_02_tx_auth::{authenticate, AuthError, AuthenticatedTx, CodecError};
use lk_03_registry::Registry;
use lk_04_marketplace::{dispatch, sweep_timeouts, BlockContext};
use shared_types::{
    Event, EventAttribute, Identity, MisbehaviorType, RequestBeginBlock, RequestEndBlock,
    RequestInfo, RequestInitChain, RequestQuery, ResponseBeginBlock, ResponseCheckTx,
    ResponseCode, ResponseCommit, ResponseDeliverTx, ResponseEndBlock, ResponseInfo,
    ResponseInitChain, ResponseQuery, ValidatorUpdate,
};
use tracing::{debug, error, info, warn};

/// Version of the state machine reported through `Info`.
pub const PROTOCOL_VERSION: u64 = 1;

pub struct Application {
    store: Box<dyn KeyValueStore>,
    state: AppState,
    config: LifecycleConfig,
    /// Writes of the current block, flushed at commit.
    pending: WriteSet,
    /// Height from the current block header, if a block is open.
    block_height: Option<i64>,
    val_updates: Vec<ValidatorUpdate>,
    validators: ValidatorIndex,
}

impl Application {
    /// Open the application over `store`, resuming from its last commit.
    pub fn new(
        store: Box<dyn KeyValueStore>,
        config: LifecycleConfig,
    ) -> Result<Self, LifecycleError> {
        let state = AppState::load(store.as_ref())?;
        let records = store.prefix_scan(VALIDATOR_PREFIX)?;
        let validators = ValidatorIndex::from_records(&records)?;
        info!(
            height = state.height,
            size = state.size,
            app_hash = %hex::encode(&state.app_hash),
            validators = validators.len(),
            "Application state loaded"
        );
        Ok(Self {
            store,
            state,
            config,
            pending: WriteSet::new(),
            block_height: None,
            val_updates: Vec::new(),
            validators,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Writes of the open block not yet committed.
    pub fn pending_writes(&self) -> &WriteSet {
        &self.pending
    }

    /// Height of the block being executed.
    pub fn current_height(&self) -> i64 {
        self.block_height.unwrap_or(self.state.height + 1)
    }

    /// Hand the committed store back, dropping any uncommitted writes.
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    // =========================================================================
    // ENGINE CALLS
    // =========================================================================

    pub fn info(&self, req: &RequestInfo) -> ResponseInfo {
        debug!(engine_version = %req.version, "Info");
        ResponseInfo {
            data: format!("{{\"size\":{}}}", self.state.size),
            version: env!("CARGO_PKG_VERSION").to_string(),
            app_version: PROTOCOL_VERSION,
            last_block_height: self.state.height,
            last_block_app_hash: self.state.app_hash.clone(),
        }
    }

    /// Install the genesis validator set.
    pub fn init_chain(
        &mut self,
        req: RequestInitChain,
    ) -> Result<ResponseInitChain, LifecycleError> {
        for update in req.validators {
            self.update_validator(update)?;
        }
        // genesis updates are the engine's own set; nothing to echo back
        self.val_updates.clear();
        info!(chain_id = %req.chain_id, validators = self.validators.len(), "Chain initialized");
        Ok(ResponseInitChain::default())
    }

    /// Open a block: apply equivocation evidence, then drop jobs that
    /// finished in earlier blocks.
    pub fn begin_block(
        &mut self,
        req: RequestBeginBlock,
    ) -> Result<ResponseBeginBlock, LifecycleError> {
        self.val_updates.clear();
        self.block_height = Some(req.header.height);
        debug!(height = req.header.height, "Begin block");

        for evidence in req.byzantine_validators {
            if evidence.kind != MisbehaviorType::DuplicateVote {
                continue;
            }
            let address = hex::encode(&evidence.validator.address);
            let Some(pub_key) = self.validators.lookup(&evidence.validator.address) else {
                warn!(validator = %address, "Equivocation evidence for unknown validator");
                continue;
            };
            let power = evidence.validator.power.saturating_sub(1).max(0);
            match self.update_validator(ValidatorUpdate::new(pub_key, power)) {
                Ok(()) => info!(
                    validator = %address,
                    power,
                    "Decreased validator power for equivocation"
                ),
                Err(e) => warn!(validator = %address, error = %e, "Failed to punish validator"),
            }
        }

        self.prune_finished_jobs()?;
        Ok(ResponseBeginBlock::default())
    }

    /// Stateless pre-validation: envelope and signature only.
    pub fn check_tx(&self, tx: &[u8]) -> ResponseCheckTx {
        match authenticate_raw(tx) {
            Ok(_) => ResponseCheckTx::default(),
            Err(e) => {
                debug!(error = %e, "CheckTx rejected");
                ResponseCheckTx {
                    code: e.response_code(),
                    log: e.to_string(),
                }
            }
        }
    }

    pub fn deliver_tx(&mut self, tx: &[u8]) -> ResponseDeliverTx {
        let authed = match authenticate_raw(tx) {
            Ok(authed) => authed,
            Err(e) => {
                warn!(error = %e, "DeliverTx rejected at authentication");
                return ResponseDeliverTx::failed(e.response_code(), e.to_string());
            }
        };

        let ctx = BlockContext {
            height: self.current_height(),
            app_hash: &self.state.app_hash,
            default_power: self.config.default_power,
        };
        let mut staged = StagedStore::over(self.store.as_ref(), &self.pending);
        let outcome = dispatch(
            &mut staged,
            &ctx,
            &authed.sender,
            &authed.message,
            &mut self.state.miner_activity_records,
        );

        match outcome {
            Ok(message_type) => {
                let writes = staged.into_write_set();
                self.pending.merge(writes);
                self.state.size += 1;
                debug!(
                    sender = %authed.sender,
                    %message_type,
                    size = self.state.size,
                    "Transaction applied"
                );
                ResponseDeliverTx {
                    code: ResponseCode::Ok,
                    log: String::new(),
                    events: vec![sender_event(&authed.sender, message_type.name())],
                }
            }
            Err(e) => {
                warn!(sender = %authed.sender, error = %e, "Transaction failed");
                ResponseDeliverTx::failed(e.response_code(), e.to_string())
            }
        }
    }

    /// Sweep expired jobs and report validator changes of this block.
    pub fn end_block(&mut self, req: RequestEndBlock) -> Result<ResponseEndBlock, LifecycleError> {
        let height = if req.height > 0 {
            req.height
        } else {
            self.current_height()
        };

        let mut staged = StagedStore::over(self.store.as_ref(), &self.pending);
        let swept = sweep_timeouts(&mut staged, height).map_err(|e| {
            LifecycleError::FatalInvariantViolation(format!("timeout sweep at {height}: {e}"))
        })?;
        let writes = staged.into_write_set();
        self.pending.merge(writes);

        debug!(height, swept, validator_updates = self.val_updates.len(), "End block");
        Ok(ResponseEndBlock {
            validator_updates: self.val_updates.clone(),
        })
    }

    /// Fold the block into the app hash and persist it atomically.
    pub fn commit(&mut self) -> Result<ResponseCommit, LifecycleError> {
        let block_height = self.current_height();
        if self.config.backlog_retention_blocks > 0 {
            self.prune_backlog(block_height - self.config.backlog_retention_blocks)?;
        }

        let mut next = self.state.clone();
        let app_hash = commit_hash(&self.state, &self.pending)?;
        next.app_hash = app_hash.to_vec();
        next.height += 1;

        let mut batch = std::mem::take(&mut self.pending).into_operations();
        batch.push(BatchOperation::put(STATE_KEY.to_vec(), next.to_bytes()?));
        let writes = batch.len();
        if let Err(e) = self.store.atomic_batch_write(batch) {
            error!(height = next.height, error = %e, "Commit write failed");
            return Err(LifecycleError::FatalInvariantViolation(format!(
                "commit at height {}: {e}",
                next.height
            )));
        }

        self.state = next;
        self.block_height = None;

        let mut retain_height = 0;
        if self.config.retain_blocks > 0 && self.state.height >= self.config.retain_blocks {
            retain_height = self.state.height - self.config.retain_blocks + 1;
        }
        info!(
            height = self.state.height,
            size = self.state.size,
            app_hash = %hex::encode(&self.state.app_hash),
            writes,
            retain_height,
            "Block committed"
        );
        Ok(ResponseCommit {
            data: self.state.app_hash.clone(),
            retain_height,
        })
    }

    /// Read a key from the committed store.
    pub fn query(&self, req: &RequestQuery) -> ResponseQuery {
        let mut res = ResponseQuery {
            key: req.data.clone(),
            height: self.state.height,
            ..ResponseQuery::default()
        };
        if req.prove {
            res.index = -1;
        }
        match self.store.get(&req.data) {
            Ok(value) => {
                res.log = if value.is_some() { "exists" } else { "does not exist" }.to_string();
                res.value = value;
            }
            Err(e) => {
                warn!(path = %req.path, error = %e, "Query failed");
                res.code = ResponseCode::UnknownError;
                res.log = e.to_string();
            }
        }
        res
    }

    // =========================================================================
    // VALIDATORS
    // =========================================================================

    /// Current validator set, including changes of the open block.
    pub fn validators(&self) -> Result<Vec<ValidatorUpdate>, LifecycleError> {
        let committed = self.store.prefix_scan(VALIDATOR_PREFIX)?;
        self.pending
            .overlay_scan(VALIDATOR_PREFIX, committed)
            .iter()
            .map(|(_, value)| decode_validator(value))
            .collect()
    }

    /// Add, update or (with power 0) remove a validator.
    pub fn update_validator(&mut self, update: ValidatorUpdate) -> Result<(), LifecycleError> {
        let key = validator_key(&update.pub_key);
        if update.power == 0 {
            let staged = StagedStore::over(self.store.as_ref(), &self.pending);
            if !staged.exists(&key)? {
                return Err(LifecycleError::ValidatorNotFound(hex::encode(
                    update.pub_key.as_bytes(),
                )));
            }
            self.pending.delete(&key);
            self.validators.remove(&update.pub_key);
        } else {
            self.pending.put(&key, &encode_validator(&update)?);
            self.validators.insert(update.pub_key);
        }
        self.val_updates.push(update);
        Ok(())
    }

    fn prune_finished_jobs(&mut self) -> Result<(), LifecycleError> {
        let mut staged = StagedStore::over(self.store.as_ref(), &self.pending);
        Registry::new(&mut staged)
            .prune_finished_jobs()
            .map_err(|e| LifecycleError::FatalInvariantViolation(format!("job pruning: {e}")))?;
        let writes = staged.into_write_set();
        self.pending.merge(writes);
        Ok(())
    }

    fn prune_backlog(&mut self, cutoff: i64) -> Result<(), LifecycleError> {
        let mut staged = StagedStore::over(self.store.as_ref(), &self.pending);
        let dropped = Registry::new(&mut staged)
            .prune_backlog(cutoff)
            .map_err(|e| LifecycleError::FatalInvariantViolation(format!("backlog pruning: {e}")))?;
        let writes = staged.into_write_set();
        self.pending.merge(writes);
        if dropped > 0 {
            debug!(cutoff, dropped, "Backlog retention applied");
        }
        Ok(())
    }
}

fn authenticate_raw(tx: &[u8]) -> Result<AuthenticatedTx, AuthError> {
    let wire = std::str::from_utf8(tx)
        .map_err(|e| CodecError::DecodingError(format!("transaction is not text: {e}")))?;
    authenticate(wire.trim())
}

fn sender_event(sender: &Identity, message_type: &str) -> Event {
    Event {
        kind: "app".to_string(),
        attributes: vec![
            EventAttribute {
                key: "transaction sender".to_string(),
                value: sender.to_string(),
                index: true,
            },
            EventAttribute {
                key: "message type".to_string(),
                value: message_type.to_string(),
                index: true,
            },
        ],
    }
}
