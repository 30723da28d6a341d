//! Background poll loop
//!
//! One dedicated worker thread polls for a card at a fixed interval and, when
//! one answers, drives a full session (request, resolve, select, authenticate,
//! optional write, read, halt), reporting each milestone to a channel sink.
//! Transient failures (no card, checksum mismatch, rejected key, timeout)
//! never stop the loop; only a closed transport channel or a dropped sink
//! receiver ends it. The worker checks an explicit stop flag between cycles
//! so shutdown is deterministic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use rc522_iso14443::LinkTransport;
use tracing::{debug, warn};

use crate::error::Error;
use crate::events::ReaderEvent;
use crate::layout::CardLayout;
use crate::link::ReaderLink;
use crate::session::CardSession;
use crate::types::{KeySlot, SectorKey};

/// What each poll cycle should do once a card is selected
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Pause between poll cycles
    pub interval: Duration,
    /// Memory layout of the expected card class
    pub layout: CardLayout,
    /// Target sector index
    pub sector: u8,
    /// Target block within the sector
    pub block: u8,
    /// Key slot to authenticate against
    pub slot: KeySlot,
    /// Key bytes for the target sector
    pub key: SectorKey,
    /// Data to write before reading back, if any
    pub write_payload: Option<[u8; 16]>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            layout: CardLayout::Classic1k,
            sector: 2,
            block: 1,
            slot: KeySlot::A,
            key: SectorKey::TRANSPORT,
            write_payload: None,
        }
    }
}

/// Handle to a running poll worker
#[derive(Debug)]
pub struct PollerHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask the worker to stop after the current cycle
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Stop the worker and wait for it to exit
    pub fn join(self) {
        self.stop();
        // A panic on the worker already ended the loop; nothing to unwind here
        let _ = self.thread.join();
    }
}

/// Spawns and owns the poll loop
#[derive(Debug, Clone, Copy)]
pub struct Poller;

impl Poller {
    /// Start the poll worker on its own thread
    ///
    /// The worker owns the transport for its whole lifetime; results cross to
    /// the consumer only through `sink`. Errors if the OS refuses to spawn
    /// the worker thread.
    pub fn spawn<T>(
        transport: T,
        config: PollConfig,
        sink: Sender<ReaderEvent>,
    ) -> std::io::Result<PollerHandle>
    where
        T: LinkTransport + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("rc522-poll".into())
            .spawn(move || {
                let mut link = ReaderLink::new(transport);
                run_loop(&mut link, &config, &sink, &stop_flag);
            })?;

        Ok(PollerHandle { stop, thread })
    }
}

fn run_loop<T: LinkTransport>(
    link: &mut ReaderLink<T>,
    config: &PollConfig,
    sink: &Sender<ReaderEvent>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Relaxed) {
        sleep_interruptible(config.interval, stop);
        if stop.load(Ordering::Relaxed) {
            break;
        }

        match run_cycle(link, config, sink) {
            Ok(()) => {}
            Err(CycleEnd::SinkGone) => {
                debug!("sink receiver dropped, ending poll loop");
                break;
            }
            Err(CycleEnd::Fatal(reason)) => {
                warn!(%reason, "transport lost, ending poll loop");
                let _ = sink.send(ReaderEvent::TransportFatal { reason });
                break;
            }
        }
    }
    debug!("poll loop stopped");
}

enum CycleEnd {
    /// The consumer dropped its receiver; nobody is listening anymore
    SinkGone,
    /// The transport channel is closed for good
    Fatal(String),
}

fn emit(sink: &Sender<ReaderEvent>, event: ReaderEvent) -> Result<(), CycleEnd> {
    sink.send(event).map_err(|_| CycleEnd::SinkGone)
}

/// Classify a session error: fatal ends the loop, anything else ends only
/// this cycle.
fn bail(error: &Error) -> Result<(), CycleEnd> {
    if error.is_fatal() {
        Err(CycleEnd::Fatal(error.to_string()))
    } else {
        Ok(())
    }
}

fn run_cycle<T: LinkTransport>(
    link: &mut ReaderLink<T>,
    config: &PollConfig,
    sink: &Sender<ReaderEvent>,
) -> Result<(), CycleEnd> {
    let address = match config.layout.block_address(config.sector, config.block) {
        Ok(address) => address,
        Err(e) => {
            // Misconfiguration: nothing a retry can fix, but not fatal either
            warn!(error = %e, "invalid block target, skipping cycle");
            return Ok(());
        }
    };

    let mut session = CardSession::new(link, config.layout);

    // Absence is the normal case; just wait for the next cycle.
    match session.request() {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(()),
        Err(e) => {
            if !e.is_decode() {
                return bail(&e);
            }
            warn!(error = %e, "presence request failed");
            return Ok(());
        }
    }

    let uid = match session.resolve() {
        Ok(uid) => uid,
        Err(Error::SelectFailed) => {
            emit(sink, ReaderEvent::SelectFailed)?;
            return Ok(());
        }
        Err(e) => {
            bail(&e)?;
            warn!(error = %e, "anti-collision failed");
            return Ok(());
        }
    };
    emit(sink, ReaderEvent::CardDetected { uid })?;

    if let Err(e) = session.authenticate(config.slot, address, &config.key) {
        bail(&e)?;
        emit(sink, ReaderEvent::AuthFailed)?;
        return Ok(());
    }

    if let Some(payload) = &config.write_payload {
        match session.write_block(address, payload) {
            Ok(()) => emit(sink, ReaderEvent::BlockWritten { address })?,
            Err(e) => {
                bail(&e)?;
                emit(sink, ReaderEvent::BlockWriteFailed { address })?;
                return Ok(());
            }
        }
    }

    match session.read_block(address) {
        Ok(data) => emit(sink, ReaderEvent::BlockRead { address, data })?,
        Err(e) => {
            bail(&e)?;
            warn!(error = %e, address, "block read failed");
            return Ok(());
        }
    }

    if let Err(e) = session.halt() {
        bail(&e)?;
    }
    Ok(())
}

/// Sleep in short slices so a stop request takes effect promptly
fn sleep_interruptible(total: Duration, stop: &AtomicBool) {
    const SLICE: Duration = Duration::from_millis(25);
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let step = remaining.min(SLICE);
        thread::sleep(step);
        remaining -= step;
    }
}
