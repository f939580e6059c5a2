//! Shared fixtures for integration tests and benchmarks.

use k256::ecdsa::SigningKey;
use lk_01_kv_store::{InMemoryKVStore, KeyValueStore};
use lk_02_tx_auth::{
    identity_from_key, ClientRating, ClientRegistration, MinerRegistration, MinerServiceDone,
    MinerServiceStarting, MinerStatusUpdate, Payload, ServiceRequest, Transaction,
};
use lk_05_block_lifecycle::{Application, LifecycleConfig};
use serde::de::DeserializeOwned;
use shared_types::{
    BlockHeader, Identity, RequestBeginBlock, RequestEndBlock, RequestQuery, ResponseCode,
    ResponseCommit,
};

pub const CHAIN_ID: &str = "linkis-itest";

/// A keypair that signs marketplace transactions.
#[derive(Clone)]
pub struct Actor {
    key: SigningKey,
    id: Identity,
}

impl Actor {
    pub fn random() -> Self {
        Self::from_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Deterministic actor; `seed` must be non-zero.
    pub fn from_seed(seed: u8) -> Self {
        Self::from_key(SigningKey::from_slice(&[seed; 32]).unwrap())
    }

    fn from_key(key: SigningKey) -> Self {
        let id = identity_from_key(key.verifying_key());
        Self { key, id }
    }

    pub fn id(&self) -> &Identity {
        &self.id
    }

    /// Wire hex of `payload` signed by this actor.
    pub fn sign(&self, payload: Payload) -> String {
        Transaction::signed(payload.into_message().unwrap(), &self.key)
            .unwrap()
            .to_wire()
            .unwrap()
    }

    pub fn register_client(&self, name: &str) -> String {
        self.sign(Payload::ClientRegistration(ClientRegistration {
            client_name: name.into(),
        }))
    }

    pub fn register_miner(&self, service_types: Vec<u64>) -> String {
        self.sign(Payload::MinerRegistration(MinerRegistration {
            miner_name: format!("rig-{}", &self.id.as_str()[2..8]),
            service_types,
            ip: "10.0.0.1".into(),
            status: 1,
        }))
    }

    pub fn request_service(&self, service_type: u64, meta: &[u8]) -> String {
        self.sign(Payload::ServiceRequest(ServiceRequest {
            service_type,
            meta: meta.to_vec(),
        }))
    }

    pub fn start_service(&self, service_id: &str, max_timeout_block: i64) -> String {
        self.sign(Payload::MinerServiceStarting(MinerServiceStarting {
            service_id: service_id.into(),
            max_timeout_block,
        }))
    }

    pub fn finish_service(&self, service_id: &str, service_type: u64) -> String {
        self.sign(Payload::MinerServiceDone(MinerServiceDone {
            service_id: service_id.into(),
            service_type,
        }))
    }

    pub fn rate(&self, miner: &Identity, rating: i64) -> String {
        self.sign(Payload::ClientRating(ClientRating {
            miner_addr: miner.clone(),
            rating,
        }))
    }

    pub fn update_status(&self, add: Vec<u64>, remove: Vec<u64>, status: u8) -> String {
        self.sign(Payload::MinerStatusUpdate(MinerStatusUpdate {
            add_service_types: add,
            remove_service_types: remove,
            status,
        }))
    }
}

pub fn memory_app(config: LifecycleConfig) -> Application {
    Application::new(Box::new(InMemoryKVStore::new()), config).unwrap()
}

pub fn begin_request(height: i64) -> RequestBeginBlock {
    RequestBeginBlock {
        header: BlockHeader {
            chain_id: CHAIN_ID.into(),
            height,
            proposer_address: vec![],
        },
        ..RequestBeginBlock::default()
    }
}

/// Execute and commit a whole block, returning each transaction's code.
pub fn run_block(
    app: &mut Application,
    height: i64,
    txs: &[String],
) -> (Vec<ResponseCode>, ResponseCommit) {
    app.begin_block(begin_request(height)).unwrap();
    let codes = txs
        .iter()
        .map(|tx| app.deliver_tx(tx.as_bytes()).code)
        .collect();
    app.end_block(RequestEndBlock { height }).unwrap();
    (codes, app.commit().unwrap())
}

/// Committed JSON record at `key`, if any.
pub fn query_json<T: DeserializeOwned>(app: &Application, key: &[u8]) -> Option<T> {
    let res = app.query(&RequestQuery {
        data: key.to_vec(),
        ..RequestQuery::default()
    });
    res.value.map(|bytes| serde_json::from_slice(&bytes).unwrap())
}

/// Every key/value pair in `store`, in key order.
pub fn dump(store: &dyn KeyValueStore) -> Vec<(Vec<u8>, Vec<u8>)> {
    store.prefix_scan(b"").unwrap()
}
