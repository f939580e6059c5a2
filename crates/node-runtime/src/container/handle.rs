//! Shared, serialised access to the `Application`.

use lk_05_block_lifecycle::{Application, LifecycleError};
use parking_lot::Mutex;
use shared_types::{
    RequestBeginBlock, RequestEndBlock, RequestInfo, RequestInitChain, RequestQuery,
    ResponseBeginBlock, ResponseCheckTx, ResponseCommit, ResponseDeliverTx, ResponseEndBlock,
    ResponseInfo, ResponseInitChain, ResponseQuery,
};
use std::sync::Arc;

/// Cloneable handle to the application.
///
/// The engine connections (consensus, mempool, query) all share one lock, so
/// a `Query` never observes a half-applied block and `CheckTx` never races a
/// `Commit`.
#[derive(Clone)]
pub struct AppHandle {
    inner: Arc<Mutex<Application>>,
}

impl AppHandle {
    pub fn new(app: Application) -> Self {
        Self {
            inner: Arc::new(Mutex::new(app)),
        }
    }

    /// Run `f` with exclusive access to the application.
    pub fn with<R>(&self, f: impl FnOnce(&mut Application) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    pub fn info(&self, req: &RequestInfo) -> ResponseInfo {
        self.inner.lock().info(req)
    }

    pub fn init_chain(&self, req: RequestInitChain) -> Result<ResponseInitChain, LifecycleError> {
        self.inner.lock().init_chain(req)
    }

    pub fn begin_block(
        &self,
        req: RequestBeginBlock,
    ) -> Result<ResponseBeginBlock, LifecycleError> {
        self.inner.lock().begin_block(req)
    }

    pub fn check_tx(&self, tx: &[u8]) -> ResponseCheckTx {
        self.inner.lock().check_tx(tx)
    }

    pub fn deliver_tx(&self, tx: &[u8]) -> ResponseDeliverTx {
        self.inner.lock().deliver_tx(tx)
    }

    pub fn end_block(&self, req: RequestEndBlock) -> Result<ResponseEndBlock, LifecycleError> {
        self.inner.lock().end_block(req)
    }

    pub fn commit(&self) -> Result<ResponseCommit, LifecycleError> {
        self.inner.lock().commit()
    }

    pub fn query(&self, req: &RequestQuery) -> ResponseQuery {
        self.inner.lock().query(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lk_01_kv_store::InMemoryKVStore;
    use lk_05_block_lifecycle::LifecycleConfig;
    use std::thread;

    fn handle() -> AppHandle {
        AppHandle::new(
            Application::new(Box::new(InMemoryKVStore::new()), LifecycleConfig::default())
                .unwrap(),
        )
    }

    #[test]
    fn test_clones_share_one_application() {
        let a = handle();
        let b = a.clone();
        a.begin_block(RequestBeginBlock::default()).unwrap();
        a.commit().unwrap();
        assert_eq!(b.info(&RequestInfo::default()).last_block_height, 1);
    }

    #[test]
    fn test_queries_from_other_threads_see_committed_height() {
        let app = handle();
        for _ in 0..3 {
            app.begin_block(RequestBeginBlock::default()).unwrap();
            app.commit().unwrap();
        }

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let app = app.clone();
                thread::spawn(move || app.query(&RequestQuery::default()).height)
            })
            .collect();
        for reader in readers {
            assert_eq!(reader.join().unwrap(), 3);
        }
    }
}
