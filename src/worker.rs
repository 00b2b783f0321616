//! Background transmission worker.
//!
//! Commands are acknowledged immediately and transmitted in the background. Every command
//! becomes a [`Job`] pushed onto a bounded queue; a single worker thread owns the
//! [`Transmitter`] and drains the queue in order. With one consumer there is never more
//! than one waveform on the output device, no matter how many threads submit jobs.
//!
//! The queue is a `heapless::Deque` behind a `critical_section::Mutex`, only held for the
//! push or pop itself. The worker parks while the queue is empty and is unparked by
//! [`Worker::try_submit`] and [`Worker::shutdown`].
//!
//! If the output device panics, the worker stops accepting jobs, drops every queued job
//! and exits. Every outstanding [`Receipt`] then resolves to [`Error::WorkerStopped`].

use core::cell::RefCell;
use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle, Thread};
use std::vec::Vec;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use heapless::Deque;

use crate::catalog::IrMessage;
use crate::consts::JOB_QUEUE_DEPTH;
use crate::error::Error;
use crate::output::PulseOutput;
use crate::transmit::{Transmitter, TxReport};

/// Messages transmitted back to back by the worker.
#[derive(Debug)]
pub struct Job {
    messages: Vec<IrMessage>,
    reply: Option<Sender<Result<TxReport, Error>>>,
}

impl Job {
    /// A job nobody waits for.
    pub fn new(messages: Vec<IrMessage>) -> Self {
        Self {
            messages,
            reply: None,
        }
    }

    /// A job together with the receipt that reports its outcome.
    pub fn with_receipt(messages: Vec<IrMessage>) -> (Self, Receipt) {
        let (tx, rx) = mpsc::channel();
        let job = Self {
            messages,
            reply: Some(tx),
        };
        (job, Receipt { rx })
    }

    /// The messages of the job, in transmission order.
    pub fn messages(&self) -> &[IrMessage] {
        &self.messages
    }
}

/// Outcome of a submitted job, available once the worker has finished it.
#[derive(Debug)]
pub struct Receipt {
    rx: Receiver<Result<TxReport, Error>>,
}

impl Receipt {
    /// Blocks until the job has been transmitted.
    ///
    /// # Errors
    /// The transmission error, or [`Error::WorkerStopped`] if the job was dropped.
    pub fn wait(self) -> Result<TxReport, Error> {
        self.rx.recv().unwrap_or(Err(Error::WorkerStopped))
    }

    /// Returns the outcome if the job has finished.
    pub fn try_wait(&self) -> Option<Result<TxReport, Error>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::WorkerStopped)),
        }
    }
}

struct Shared {
    jobs: Mutex<RefCell<Deque<Job, JOB_QUEUE_DEPTH>>>,
    running: AtomicBool,
}

/// Handle to the transmission thread.
pub struct Worker {
    shared: Arc<Shared>,
    thread: Thread,
    handle: Option<JoinHandle<Result<(), Error>>>,
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("running", &self.is_running())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Worker {
    /// Moves `transmitter` onto a new thread and starts draining jobs.
    ///
    /// # Errors
    /// [`Error::WorkerStopped`] if the thread cannot be spawned.
    pub fn spawn<O, D>(transmitter: Transmitter<O, D>) -> Result<Self, Error>
    where
        O: PulseOutput + Send + 'static,
        D: DelayNs + Send + 'static,
    {
        let shared = Arc::new(Shared {
            jobs: Mutex::new(RefCell::new(Deque::new())),
            running: AtomicBool::new(true),
        });
        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("ir-transmit".into())
            .spawn(move || drain(transmitter, &worker_shared))
            .map_err(|e| {
                error!("Failed to spawn transmission worker: {}", e);
                Error::WorkerStopped
            })?;
        Ok(Self {
            shared,
            thread: handle.thread().clone(),
            handle: Some(handle),
        })
    }

    /// Queues a job without blocking.
    ///
    /// Returns [`nb::Error::WouldBlock`] when the queue is full; the job is dropped and its
    /// receipt reports [`Error::WorkerStopped`].
    pub fn try_submit(&self, job: Job) -> nb::Result<(), Error> {
        critical_section::with(|cs| {
            if !self.is_running() {
                return Err(nb::Error::Other(Error::WorkerStopped));
            }
            self.shared
                .jobs
                .borrow(cs)
                .borrow_mut()
                .push_back(job)
                .map_err(|_| nb::Error::WouldBlock)
        })?;
        self.thread.unpark();
        Ok(())
    }

    /// Jobs waiting to be transmitted.
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.shared.jobs.borrow(cs).borrow().len())
    }

    /// Whether the worker still accepts jobs.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Finishes queued jobs, terminates the output device and joins the thread.
    pub fn shutdown(mut self) -> Result<(), Error> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), Error> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.shared.running.store(false, Ordering::Release);
        self.thread.unpark();
        handle.join().unwrap_or(Err(Error::WorkerStopped))
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Transmission worker stopped with error: {}", e);
        }
    }
}

fn drain<O, D>(mut transmitter: Transmitter<O, D>, shared: &Shared) -> Result<(), Error>
where
    O: PulseOutput,
    D: DelayNs,
{
    info!("Transmission worker started");
    loop {
        let job = critical_section::with(|cs| shared.jobs.borrow(cs).borrow_mut().pop_front());
        let Job { messages, reply } = match job {
            Some(job) => job,
            None if !shared.running.load(Ordering::Acquire) => break,
            None => {
                thread::park();
                continue;
            }
        };

        let result = match panic::catch_unwind(AssertUnwindSafe(|| transmitter.send_all(&messages)))
        {
            Ok(result) => result,
            Err(_) => {
                error!("Output device panicked, stopping transmission worker");
                abandon(shared);
                if let Some(reply) = reply {
                    let _ = reply.send(Err(Error::WorkerStopped));
                }
                return Err(Error::WorkerStopped);
            }
        };
        match &result {
            Ok(report) => info!(
                "Sent {} messages in {} chunks ({} us)",
                report.messages,
                report.chunks_sent,
                report.airtime_us
            ),
            Err(e) => error!("Transmission failed: {}", e),
        }
        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }
    info!("Transmission worker stopping");
    transmitter.terminate()
}

/// Refuses further jobs and drops the queued ones, disconnecting their receipts.
fn abandon(shared: &Shared) {
    let dropped = critical_section::with(|cs| {
        shared.running.store(false, Ordering::Release);
        let mut jobs = shared.jobs.borrow(cs).borrow_mut();
        let dropped = jobs.len();
        jobs.clear();
        dropped
    });
    if dropped > 0 {
        warn!("Dropped {} queued jobs", dropped);
    }
}
