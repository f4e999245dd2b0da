//! Serial background thumbnail fetcher.
//!
//! One worker task drains a FIFO of "load the image for slot S" jobs. Each job
//! re-reads the slot's *current* URL when it is drained, so rapid re-requests
//! for a recycled slot coalesce into the most recent one. Results travel back
//! over a channel and are applied in the caller's context only if the slot
//! still wants the same URL.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use image::DynamicImage;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::memory_cache::ImageCache;
use crate::domain::errors::FetchError;
use crate::domain::ports::ImageFetchPort;

/// Identity of a reusable UI slot.
pub trait SlotKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> SlotKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Callback invoked in the caller's context when a thumbnail is ready.
pub type ThumbnailListener<K> = Box<dyn FnMut(&K, Arc<DynamicImage>)>;

/// Result of a finished job, sent from the worker to the caller.
#[derive(Debug, Clone)]
pub struct ThumbnailCompletion<K> {
    /// Slot the job was drained for.
    pub slot: K,
    /// URL that was actually loaded.
    pub url: String,
    /// Decoded thumbnail.
    pub image: Arc<DynamicImage>,
}

/// Outcome of handing a completion to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The slot still wanted this URL; the listener (if any) received it.
    Delivered,
    /// The slot was reassigned or cancelled; the result was discarded.
    Stale,
    /// The job failed to download or decode. The slot keeps its request.
    Dropped,
    /// The worker has stopped and no more completions will arrive.
    Closed,
}

/// Configuration for the fetch worker.
#[derive(Debug, Clone)]
pub struct FetchWorkerConfig {
    /// Decoded images larger than this are scaled down to fit.
    pub max_width: u32,
    /// Decoded images taller than this are scaled down to fit.
    pub max_height: u32,
}

impl Default for FetchWorkerConfig {
    fn default() -> Self {
        Self {
            max_width: 400,
            max_height: 300,
        }
    }
}

/// What the worker reports back for each job it finishes.
#[derive(Debug)]
enum JobOutcome<K> {
    Ready(ThumbnailCompletion<K>),
    Failed { slot: K, url: String },
}

#[derive(Debug)]
enum WorkerCommand<K> {
    Fetch(K),
    Clear,
    Shutdown,
}

type RequestMap<K> = Arc<Mutex<HashMap<K, String>>>;

/// Caller-side handle of the thumbnail worker.
///
/// Owns the slot-to-URL map shared with the worker task. The handle itself
/// lives in the caller's single-threaded context; completions are applied
/// there through [`FetchWorker::dispatch_next`] or
/// [`FetchWorker::dispatch_pending`].
pub struct FetchWorker<K: SlotKey> {
    requests: RequestMap<K>,
    cache: Arc<ImageCache>,
    command_tx: mpsc::UnboundedSender<WorkerCommand<K>>,
    completion_rx: mpsc::UnboundedReceiver<JobOutcome<K>>,
    listener: Option<ThumbnailListener<K>>,
    handle: Option<JoinHandle<()>>,
    shut_down: bool,
}

impl<K: SlotKey> std::fmt::Debug for FetchWorker<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchWorker")
            .field("pending", &self.requests.lock().len())
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

/// State for the background worker loop.
struct WorkerState<K> {
    requests: RequestMap<K>,
    cache: Arc<ImageCache>,
    fetcher: Arc<dyn ImageFetchPort>,
    command_rx: mpsc::UnboundedReceiver<WorkerCommand<K>>,
    completion_tx: mpsc::UnboundedSender<JobOutcome<K>>,
    config: FetchWorkerConfig,
}

impl<K: SlotKey> FetchWorker<K> {
    /// Starts the worker task. Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ImageFetchPort>,
        cache: Arc<ImageCache>,
        config: FetchWorkerConfig,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let requests: RequestMap<K> = Arc::new(Mutex::new(HashMap::new()));

        let state = WorkerState {
            requests: requests.clone(),
            cache: cache.clone(),
            fetcher,
            command_rx,
            completion_tx,
            config,
        };

        let handle = tokio::spawn(state.run());
        info!("Thumbnail worker started");

        Self {
            requests,
            cache,
            command_tx,
            completion_rx,
            listener: None,
            handle: Some(handle),
            shut_down: false,
        }
    }

    /// Registers the callback that receives ready thumbnails.
    pub fn set_listener(&mut self, listener: impl FnMut(&K, Arc<DynamicImage>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Removes the listener; later completions are dropped silently.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Requests the thumbnail at `url` for `slot`.
    ///
    /// A later request for the same slot supersedes this one. `None` or an
    /// empty URL cancels the slot's pending interest.
    pub fn queue(&self, slot: K, url: Option<&str>) {
        if self.shut_down {
            warn!(slot = ?slot, "Ignoring thumbnail request after shutdown");
            return;
        }

        let Some(url) = url.filter(|u| !u.is_empty()) else {
            if self.requests.lock().remove(&slot).is_some() {
                trace!(slot = ?slot, "Cancelled thumbnail request");
            }
            return;
        };

        trace!(slot = ?slot, url, "Queued thumbnail request");
        self.requests.lock().insert(slot.clone(), url.to_string());

        if let Err(e) = self.command_tx.send(WorkerCommand::Fetch(slot)) {
            error!(error = %e, "Failed to send thumbnail request");
        }
    }

    /// Discards every job not yet drained. Slot mappings are kept.
    pub fn clear_queue(&self) {
        if let Err(e) = self.command_tx.send(WorkerCommand::Clear) {
            error!(error = %e, "Failed to send clear request");
        }
    }

    /// Stops the worker, discarding queued jobs. No requests are accepted
    /// afterwards.
    pub async fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let _ = self.command_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            error!(error = %e, "Thumbnail worker task failed");
        }
        info!("Thumbnail worker stopped");
    }

    /// Returns true once [`FetchWorker::shutdown`] has been called.
    #[must_use]
    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Returns the URL the slot currently wants, if any.
    #[must_use]
    pub fn pending_url(&self, slot: &K) -> Option<String> {
        self.requests.lock().get(slot).cloned()
    }

    /// Returns true if the slot has an outstanding request.
    #[must_use]
    pub fn is_pending(&self, slot: &K) -> bool {
        self.requests.lock().contains_key(slot)
    }

    /// Number of slots with an outstanding request.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Shared thumbnail cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Waits for the next successful completion without applying it.
    /// Failed jobs in between are skipped.
    pub async fn recv_completion(&mut self) -> Option<ThumbnailCompletion<K>> {
        loop {
            match self.completion_rx.recv().await? {
                JobOutcome::Ready(completion) => return Some(completion),
                JobOutcome::Failed { slot, url } => {
                    trace!(slot = ?slot, url = %url, "Skipping failed thumbnail job");
                }
            }
        }
    }

    fn apply(&mut self, outcome: JobOutcome<K>) -> Dispatch {
        match outcome {
            JobOutcome::Ready(completion) => self.deliver(completion),
            JobOutcome::Failed { slot, url } => {
                trace!(slot = ?slot, url = %url, "Thumbnail job failed");
                Dispatch::Dropped
            }
        }
    }

    /// Applies a completion in the caller's context.
    ///
    /// The image reaches the listener only if the slot still wants the
    /// delivered URL; the slot's request is then complete and removed.
    pub fn deliver(&mut self, completion: ThumbnailCompletion<K>) -> Dispatch {
        let ThumbnailCompletion { slot, url, image } = completion;

        {
            let mut requests = self.requests.lock();
            if requests.get(&slot) != Some(&url) {
                trace!(slot = ?slot, url = %url, "Discarding stale thumbnail");
                return Dispatch::Stale;
            }
            requests.remove(&slot);
        }

        match self.listener.as_mut() {
            Some(listener) => listener(&slot, image),
            None => trace!(slot = ?slot, "No thumbnail listener registered"),
        }
        Dispatch::Delivered
    }

    /// Waits for the next finished job and applies it.
    ///
    /// Every job the worker drains for a still-wanted URL produces exactly one
    /// [`Dispatch::Delivered`], [`Dispatch::Stale`] or [`Dispatch::Dropped`].
    pub async fn dispatch_next(&mut self) -> Dispatch {
        match self.completion_rx.recv().await {
            Some(outcome) => self.apply(outcome),
            None => Dispatch::Closed,
        }
    }

    /// Applies every completion already received, without waiting.
    /// Returns how many reached the listener.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(outcome) = self.completion_rx.try_recv() {
            if self.apply(outcome) == Dispatch::Delivered {
                delivered += 1;
            }
        }
        delivered
    }
}

impl<K: SlotKey> Drop for FetchWorker<K> {
    fn drop(&mut self) {
        if !self.shut_down {
            let _ = self.command_tx.send(WorkerCommand::Shutdown);
        }
    }
}

impl<K: SlotKey> WorkerState<K> {
    /// Drains jobs strictly in FIFO order, one at a time.
    async fn run(mut self) {
        let mut queue: VecDeque<K> = VecDeque::new();

        loop {
            tokio::select! {
                biased;
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(WorkerCommand::Fetch(slot)) => queue.push_back(slot),
                        Some(WorkerCommand::Clear) => {
                            if !queue.is_empty() {
                                debug!(discarded = queue.len(), "Cleared thumbnail queue");
                            }
                            queue.clear();
                        }
                        Some(WorkerCommand::Shutdown) | None => {
                            debug!(discarded = queue.len(), "Thumbnail worker exiting");
                            break;
                        }
                    }
                }
                () = std::future::ready(()), if !queue.is_empty() => {
                    if let Some(slot) = queue.pop_front() {
                        self.handle_job(slot).await;
                    }
                }
            }
        }
    }

    async fn handle_job(&self, slot: K) {
        let current = self.requests.lock().get(&slot).cloned();
        let Some(url) = current else {
            trace!(slot = ?slot, "Dropping cancelled thumbnail job");
            return;
        };

        let image = if let Some(image) = self.cache.get(&url) {
            image
        } else {
            debug!(slot = ?slot, url = %url, "Downloading thumbnail");
            match self.download(&url).await {
                Ok(image) => {
                    self.cache.put(url.clone(), image.clone());
                    image
                }
                Err(e) => {
                    warn!(slot = ?slot, url = %url, error = %e, "Dropping thumbnail job");
                    self.report(JobOutcome::Failed { slot, url });
                    return;
                }
            }
        };

        self.report(JobOutcome::Ready(ThumbnailCompletion { slot, url, image }));
    }

    fn report(&self, outcome: JobOutcome<K>) {
        if self.completion_tx.send(outcome).is_err() {
            debug!("Thumbnail receiver gone, completion dropped");
        }
    }

    async fn download(&self, url: &str) -> Result<Arc<DynamicImage>, FetchError> {
        let bytes = self.fetcher.fetch_bytes(url).await?;
        let (max_width, max_height) = (self.config.max_width, self.config.max_height);

        let decoded = tokio::task::spawn_blocking(move || -> Result<DynamicImage, FetchError> {
            let img = image::load_from_memory(&bytes)?;
            if img.width() > max_width || img.height() > max_height {
                Ok(img.thumbnail(max_width, max_height))
            } else {
                Ok(img)
            }
        })
        .await
        .map_err(|e| FetchError::decode(format!("decode task panicked: {e}")))??;

        Ok(Arc::new(decoded))
    }
}
