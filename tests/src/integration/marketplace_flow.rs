//! # Marketplace Flow
//!
//! A client and a miner walk the full job lifecycle across several blocks:
//!
//! ```text
//! block 1: client registers, request fails (no miners), miner registers
//! block 2: request assigned to the miner          job Registered, backlog +1
//! block 3: miner starts the job                   job Processing, backlog -1
//! block 4: miner finishes, client rates,          job Done, activity +1
//!          miner moves from type 7 to type 8
//! block 5: finished job pruned, type 7 has no miners, type 8 does
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{memory_app, query_json, run_block, Actor};
    use lk_03_registry::{
        keys, ClientInfo, ClientRatings, JobInfo, JobStatus, MinerInfo, MinerStatus,
        MinerStatuses, ServiceRequest,
    };
    use lk_05_block_lifecycle::LifecycleConfig;
    use shared_types::{Identity, ResponseCode};

    const OK: ResponseCode = ResponseCode::Ok;
    const FAIL: ResponseCode = ResponseCode::UnknownError;

    #[test]
    fn test_full_job_lifecycle() {
        let mut app = memory_app(LifecycleConfig::default());
        let client = Actor::random();
        let miner = Actor::random();

        // block 1
        let (codes, _) = run_block(
            &mut app,
            1,
            &[
                client.register_client("alice"),
                client.request_service(7, b"resnet"),
                miner.register_miner(vec![7]),
            ],
        );
        assert_eq!(codes, vec![OK, FAIL, OK]);
        let info: ClientInfo = query_json(&app, &keys::client_registration(client.id())).unwrap();
        assert_eq!(info.name, "alice");
        assert_eq!(info.power, 10);
        let miner_info: MinerInfo =
            query_json(&app, &keys::miner_registration(miner.id())).unwrap();
        assert_eq!(miner_info.service_types, vec![7]);

        // block 2
        let (codes, _) = run_block(&mut app, 2, &[client.request_service(7, b"resnet")]);
        assert_eq!(codes, vec![OK]);
        let jobs: Vec<JobInfo> = query_json(&app, &keys::miner_jobs(miner.id())).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].client_id, *client.id());
        assert_eq!(jobs[0].job_status, JobStatus::Registered);
        let service_id = jobs[0].service_id.clone();
        let backlog: Vec<ServiceRequest> = query_json(&app, keys::ALL_SERVICE_REQUESTS).unwrap();
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].service_id, service_id);
        assert_eq!(backlog[0].height, 2);

        // block 3
        let (codes, _) = run_block(&mut app, 3, &[miner.start_service(&service_id, 10)]);
        assert_eq!(codes, vec![OK]);
        let jobs: Vec<JobInfo> = query_json(&app, &keys::miner_jobs(miner.id())).unwrap();
        assert_eq!(jobs[0].job_status, JobStatus::Processing);
        assert_eq!(jobs[0].timeout_block, 13);
        let backlog: Vec<ServiceRequest> = query_json(&app, keys::ALL_SERVICE_REQUESTS).unwrap();
        assert!(backlog.is_empty());

        // block 4
        let (codes, _) = run_block(
            &mut app,
            4,
            &[
                miner.finish_service(&service_id, 7),
                client.rate(miner.id(), 5),
                client.rate(miner.id(), 9),
                miner.update_status(vec![8], vec![7], 2),
            ],
        );
        assert_eq!(codes, vec![OK, OK, OK, OK]);
        let jobs: Vec<JobInfo> = query_json(&app, &keys::miner_jobs(miner.id())).unwrap();
        assert_eq!(jobs[0].job_status, JobStatus::Done);
        assert_eq!(
            app.state()
                .miner_activity_records
                .count(4, miner.id(), 7),
            1
        );
        let ratings: ClientRatings = query_json(&app, &keys::miner_rating(miner.id())).unwrap();
        assert_eq!(ratings.get(client.id()), Some(&9));
        let statuses: MinerStatuses = query_json(&app, keys::ALL_MINER_STATUS).unwrap();
        assert_eq!(statuses.get(miner.id()), Some(&MinerStatus::Busy));
        let removed: Vec<Identity> = query_json(&app, &keys::service_type(7)).unwrap();
        assert!(removed.is_empty());

        // block 5
        let (codes, _) = run_block(
            &mut app,
            5,
            &[
                client.request_service(7, b"resnet"),
                client.request_service(8, b"llama"),
            ],
        );
        assert_eq!(codes, vec![FAIL, OK]);
        let jobs: Vec<JobInfo> = query_json(&app, &keys::miner_jobs(miner.id())).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].service_type, 8);
        assert_eq!(jobs[0].job_status, JobStatus::Registered);

        // one success per accepted transaction
        assert_eq!(app.state().size, 9);
        assert_eq!(app.state().height, 5);
    }

    #[test]
    fn test_requests_spread_over_registered_miners() {
        let mut app = memory_app(LifecycleConfig::default());
        let client = Actor::random();
        let miners: Vec<Actor> = (0..4).map(|_| Actor::random()).collect();
        let registrations: Vec<String> = miners.iter().map(|m| m.register_miner(vec![3])).collect();
        run_block(&mut app, 1, &registrations);

        let requests: Vec<String> = (0..24)
            .map(|i| client.request_service(3, format!("job-{i}").as_bytes()))
            .collect();
        let (codes, _) = run_block(&mut app, 2, &requests);
        assert!(codes.iter().all(|c| c.is_ok()));

        let assigned: usize = miners
            .iter()
            .map(|m| {
                query_json::<Vec<JobInfo>>(&app, &keys::miner_jobs(m.id()))
                    .map_or(0, |jobs| jobs.len())
            })
            .sum();
        assert_eq!(assigned, 24);
    }

    #[test]
    fn test_rating_outside_byte_range_is_clamped() {
        let mut app = memory_app(LifecycleConfig::default());
        let miner = Actor::random();
        let generous = Actor::random();
        let harsh = Actor::random();

        let (codes, _) = run_block(
            &mut app,
            1,
            &[
                miner.register_miner(vec![1]),
                generous.rate(miner.id(), 1_000),
                harsh.rate(miner.id(), -4),
            ],
        );
        assert_eq!(codes, vec![OK, OK, OK]);
        let ratings: ClientRatings = query_json(&app, &keys::miner_rating(miner.id())).unwrap();
        assert_eq!(ratings.get(generous.id()), Some(&255));
        assert_eq!(ratings.get(harsh.id()), Some(&0));
    }

    #[test]
    fn test_each_client_keeps_its_own_latest_rating() {
        let mut app = memory_app(LifecycleConfig::default());
        let miner = Actor::random();
        let first = Actor::random();
        let second = Actor::random();

        let (codes, _) = run_block(
            &mut app,
            1,
            &[miner.register_miner(vec![1]), first.rate(miner.id(), 5)],
        );
        assert_eq!(codes, vec![OK, OK]);
        let (codes, _) = run_block(
            &mut app,
            2,
            &[first.rate(miner.id(), 3), second.rate(miner.id(), 5)],
        );
        assert_eq!(codes, vec![OK, OK]);

        let ratings: ClientRatings = query_json(&app, &keys::miner_rating(miner.id())).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings.get(first.id()), Some(&3));
        assert_eq!(ratings.get(second.id()), Some(&5));
    }

    #[test]
    fn test_identical_request_in_one_block_is_rejected() {
        let mut app = memory_app(LifecycleConfig::default());
        let client = Actor::random();
        let miner = Actor::random();
        run_block(&mut app, 1, &[miner.register_miner(vec![4])]);

        let (codes, _) = run_block(
            &mut app,
            2,
            &[
                client.request_service(4, b"same"),
                client.request_service(4, b"same"),
            ],
        );
        assert_eq!(codes, vec![OK, FAIL]);
        let jobs: Vec<JobInfo> = query_json(&app, &keys::miner_jobs(miner.id())).unwrap();
        assert_eq!(jobs.len(), 1);
        let backlog: Vec<ServiceRequest> = query_json(&app, keys::ALL_SERVICE_REQUESTS).unwrap();
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn test_starting_a_job_twice_is_rejected() {
        let mut app = memory_app(LifecycleConfig::default());
        let client = Actor::random();
        let miner = Actor::random();
        run_block(
            &mut app,
            1,
            &[miner.register_miner(vec![2]), client.request_service(2, b"x")],
        );
        let jobs: Vec<JobInfo> = query_json(&app, &keys::miner_jobs(miner.id())).unwrap();
        let service_id = jobs[0].service_id.clone();

        let (codes, _) = run_block(
            &mut app,
            2,
            &[
                miner.start_service(&service_id, 5),
                miner.start_service(&service_id, 5),
                client.start_service(&service_id, 5),
            ],
        );
        assert_eq!(codes, vec![OK, FAIL, FAIL]);
    }
}
