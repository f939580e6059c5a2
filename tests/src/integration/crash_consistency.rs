//! # Crash Consistency
//!
//! A node that stops between `BeginBlock` and `Commit` must come back at its
//! last committed state, and re-executing the interrupted block must land on
//! the same hash as a node that never stopped.

#[cfg(test)]
mod tests {
    use crate::fixtures::{begin_request, dump, memory_app, run_block, Actor};
    use lk_01_kv_store::KeyValueStore;
    use lk_05_block_lifecycle::{Application, LifecycleConfig};

    fn blocks() -> Vec<Vec<String>> {
        let client = Actor::from_seed(9);
        let miner = Actor::from_seed(10);
        vec![
            vec![client.register_client("carol"), miner.register_miner(vec![1])],
            vec![client.request_service(1, b"render"), client.rate(miner.id(), 4)],
            vec![client.request_service(1, b"render-again")],
        ]
    }

    /// Commit the first block, then die halfway through the second.
    fn interrupted(store: Box<dyn KeyValueStore>, blocks: &[Vec<String>]) -> Box<dyn KeyValueStore> {
        let mut app = Application::new(store, LifecycleConfig::default()).unwrap();
        run_block(&mut app, 1, &blocks[0]);
        app.begin_block(begin_request(2)).unwrap();
        for tx in &blocks[1] {
            assert!(app.deliver_tx(tx.as_bytes()).code.is_ok());
        }
        assert!(!app.pending_writes().is_empty());
        app.into_store()
    }

    fn resume(store: Box<dyn KeyValueStore>, blocks: &[Vec<String>]) -> (Vec<u8>, Application) {
        let mut app = Application::new(store, LifecycleConfig::default()).unwrap();
        assert_eq!(app.state().height, 1);
        assert_eq!(app.state().size, 2);
        let mut last = Vec::new();
        for (i, txs) in blocks.iter().enumerate().skip(1) {
            last = run_block(&mut app, i as i64 + 1, txs).1.data;
        }
        (last, app)
    }

    fn uninterrupted(blocks: &[Vec<String>]) -> (Vec<u8>, Vec<(Vec<u8>, Vec<u8>)>) {
        let mut app = memory_app(LifecycleConfig::default());
        let mut last = Vec::new();
        for (i, txs) in blocks.iter().enumerate() {
            last = run_block(&mut app, i as i64 + 1, txs).1.data;
        }
        (last, dump(app.into_store().as_ref()))
    }

    #[test]
    fn test_restart_mid_block_recovers_committed_state() {
        let blocks = blocks();
        let (expected_hash, expected_state) = uninterrupted(&blocks);

        let store = interrupted(Box::new(lk_01_kv_store::InMemoryKVStore::new()), &blocks);
        let (hash, app) = resume(store, &blocks);

        assert_eq!(hash, expected_hash);
        assert_eq!(dump(app.into_store().as_ref()), expected_state);
    }

    #[cfg(feature = "rocksdb")]
    #[test]
    fn test_rocksdb_restart_mid_block_recovers_committed_state() {
        use node_runtime::adapters::storage::{RocksDbConfig, RocksDbStore};

        let blocks = blocks();
        let (expected_hash, expected_state) = uninterrupted(&blocks);
        let dir = tempfile::TempDir::new().unwrap();
        let open = || {
            Box::new(
                RocksDbStore::open(RocksDbConfig::for_testing(
                    dir.path().to_string_lossy().to_string(),
                ))
                .unwrap(),
            ) as Box<dyn KeyValueStore>
        };

        // the database handle is closed when the store is dropped
        drop(interrupted(open(), &blocks));
        let (hash, app) = resume(open(), &blocks);

        assert_eq!(hash, expected_hash);
        assert_eq!(dump(app.into_store().as_ref()), expected_state);
    }
}
