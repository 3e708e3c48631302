//! Periodic `GET /galaxy` refresh publishing through a watch channel.
//!
//! Each tick fetches in its own task, so a slow response can overlap the
//! next tick. Responses pass through a [`RefreshSequencer`]; one that arrives
//! after a newer response has been applied is dropped. Fetch tasks belong to
//! the refresh loop and are aborted with it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use sectorwars_logic::refresh::{RefreshSequencer, RefreshTicket};
use sectorwars_logic::universe::galaxy::Galaxy;

use crate::api::GalaxyApi;

#[derive(Debug, Clone, PartialEq)]
pub struct StatsUpdate {
    pub ticket: RefreshTicket,
    pub galaxy: Option<Galaxy>,
}

pub struct StatsRefresher {
    updates: watch::Receiver<Option<StatsUpdate>>,
    discarded: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl StatsRefresher {
    /// Start refreshing every `every`; the first fetch happens immediately.
    pub fn spawn<A: GalaxyApi + 'static>(api: Arc<A>, every: Duration) -> Self {
        let (tx, updates) = watch::channel(None);
        let discarded = Arc::new(AtomicU64::new(0));
        let handle = tokio::spawn(refresh_loop(api, every, tx, Arc::clone(&discarded)));
        Self {
            updates,
            discarded,
            handle,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<StatsUpdate>> {
        self.updates.clone()
    }

    pub fn latest(&self) -> Option<StatsUpdate> {
        self.updates.borrow().clone()
    }

    /// Stale responses dropped so far.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for StatsRefresher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn refresh_loop<A: GalaxyApi + 'static>(
    api: Arc<A>,
    every: Duration,
    tx: watch::Sender<Option<StatsUpdate>>,
    discarded: Arc<AtomicU64>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut fetches = JoinSet::new();
    let mut sequencer = RefreshSequencer::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ticket = sequencer.issue();
                let api = Arc::clone(&api);
                fetches.spawn(async move { (ticket, api.get_galaxy().await) });
            }
            Some(joined) = fetches.join_next() => match joined {
                Ok((ticket, Ok(galaxy))) if sequencer.accept(ticket) => {
                    log::debug!("Applied galaxy refresh #{}", ticket.seq());
                    tx.send_replace(Some(StatsUpdate { ticket, galaxy }));
                }
                Ok((ticket, Ok(_))) => {
                    discarded.fetch_add(1, Ordering::Relaxed);
                    log::warn!("Discarding stale galaxy refresh #{}", ticket.seq());
                }
                Ok((ticket, Err(err))) => {
                    log::warn!("Galaxy refresh #{} failed: {}", ticket.seq(), err)
                }
                Err(err) => log::warn!("Galaxy refresh task ended abnormally: {}", err),
            },
        }
    }
}
