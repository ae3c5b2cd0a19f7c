use std::sync::Arc;

use log::Logger;
use time::OffsetDateTime;

use crate::id::IdGenerator;
use crate::store::{MemoryStore, Store};

pub type Clock = dyn Fn() -> OffsetDateTime + Send + Sync;

/// The services shared by every route.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub store: Arc<dyn Store>,
    pub ids: Arc<IdGenerator>,
    pub clock: Arc<Clock>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        store: Arc<dyn Store>,
        ids: Arc<IdGenerator>,
        clock: Arc<Clock>,
    ) -> Self {
        Self {
            logger,
            store,
            ids,
            clock,
        }
    }

    /// An environment backed by an empty in-memory store and the system clock.
    pub fn in_memory(logger: Arc<Logger>) -> Self {
        Self::new(
            logger,
            Arc::new(MemoryStore::new()),
            Arc::new(IdGenerator::new()),
            Arc::new(OffsetDateTime::now_utc),
        )
    }

    pub fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }
}
