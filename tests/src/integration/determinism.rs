//! # Replica Determinism
//!
//! Independent replicas fed the same blocks must agree on every app hash and
//! on every stored byte, whether they are driven directly or through the
//! node runtime's block-log replay.

#[cfg(test)]
mod tests {
    use crate::fixtures::{begin_request, dump, memory_app, run_block, Actor};
    use lk_03_registry::{keys, JobInfo};
    use lk_05_block_lifecycle::LifecycleConfig;
    use node_runtime::{replay_reader, AppHandle, BlockRecord};
    use std::io::Cursor;

    /// Five blocks mixing accepted and rejected transactions.
    fn workload() -> Vec<Vec<String>> {
        let client = Actor::from_seed(1);
        let other = Actor::from_seed(2);
        let miner_a = Actor::from_seed(3);
        let miner_b = Actor::from_seed(4);
        vec![
            vec![
                client.register_client("alice"),
                client.request_service(5, b"early"),
                miner_a.register_miner(vec![5, 6]),
            ],
            vec![
                miner_b.register_miner(vec![5]),
                client.request_service(5, b"one"),
                other.request_service(5, b"two"),
                other.request_service(6, b"three"),
                "deadbeef".to_string(),
            ],
            vec![client.rate(miner_a.id(), 7), other.rate(miner_b.id(), 2)],
            vec![miner_b.update_status(vec![6], vec![5], 2)],
            vec![client.request_service(5, b"four"), client.request_service(6, b"five")],
        ]
    }

    fn config() -> LifecycleConfig {
        LifecycleConfig {
            retain_blocks: 2,
            backlog_retention_blocks: 3,
            default_power: 10,
        }
    }

    fn run_direct(blocks: &[Vec<String>]) -> (Vec<Vec<u8>>, Vec<(Vec<u8>, Vec<u8>)>) {
        let mut app = memory_app(config());
        let hashes = blocks
            .iter()
            .enumerate()
            .map(|(i, txs)| run_block(&mut app, i as i64 + 1, txs).1.data)
            .collect();
        (hashes, dump(app.into_store().as_ref()))
    }

    #[test]
    fn test_replicas_agree_on_hashes_and_state() {
        let blocks = workload();
        let (hashes_a, state_a) = run_direct(&blocks);
        let (hashes_b, state_b) = run_direct(&blocks);

        assert_eq!(hashes_a, hashes_b);
        assert_eq!(state_a, state_b);
        assert_eq!(hashes_a.len(), 5);
        for pair in hashes_a.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_transaction_order_changes_the_hash() {
        let mut blocks = workload();
        let (baseline, _) = run_direct(&blocks);

        // the request now lands after the miner registration and succeeds
        blocks[0].reverse();
        let (reordered, _) = run_direct(&blocks);

        assert_ne!(baseline[0], reordered[0]);
    }

    #[test]
    fn test_replay_matches_direct_execution() {
        let blocks = workload();
        let (hashes, state) = run_direct(&blocks);

        let log: Vec<String> = blocks
            .iter()
            .enumerate()
            .map(|(i, txs)| {
                serde_json::to_string(&BlockRecord {
                    begin: begin_request(i as i64 + 1),
                    txs: txs.clone(),
                })
                .unwrap()
            })
            .collect();

        let handle = AppHandle::new(memory_app(config()));
        let summary = replay_reader(&handle, Cursor::new(log.join("\n"))).unwrap();
        assert_eq!(summary.blocks, 5);
        assert_eq!(summary.app_hash, hashes[4]);

        let miner_jobs = keys::miner_jobs(Actor::from_seed(3).id());
        let direct_jobs = state
            .iter()
            .find(|(k, _)| *k == miner_jobs)
            .map(|(_, v)| serde_json::from_slice::<Vec<JobInfo>>(v).unwrap());
        let replayed_jobs = handle.with(|app| {
            app.query(&shared_types::RequestQuery {
                data: miner_jobs.clone(),
                ..Default::default()
            })
            .value
            .map(|v| serde_json::from_slice::<Vec<JobInfo>>(&v).unwrap())
        });
        assert_eq!(direct_jobs, replayed_jobs);
    }
}
