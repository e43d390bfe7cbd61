use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::batch::{AdmitReport, Applied, Dispatch, UploadBatch};
use super::error::TransferError;
use super::item::UploadItem;
use super::transport::{ProgressSink, Transport};
use super::types::{FileSource, ItemId, StatusKind, TransferEvent};
use super::validator::Validator;

type CompleteCallback = Box<dyn FnMut(&[UploadItem])>;
type ErrorCallback = Box<dyn FnMut(&str)>;

/// Host notifications. Both are optional.
#[derive(Default)]
pub struct UploadCallbacks {
    on_upload_complete: Option<CompleteCallback>,
    on_upload_error: Option<ErrorCallback>,
}

impl UploadCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired once per upload run, after every dispatched item is terminal,
    /// with the whole batch.
    pub fn on_upload_complete(mut self, callback: impl FnMut(&[UploadItem]) + 'static) -> Self {
        self.on_upload_complete = Some(Box::new(callback));
        self
    }

    /// Fired once per rejected file and once per failed transfer.
    pub fn on_upload_error(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_upload_error = Some(Box::new(callback));
        self
    }

    fn complete(&mut self, items: &[UploadItem]) {
        if let Some(callback) = self.on_upload_complete.as_mut() {
            callback(items);
        }
    }

    fn error(&mut self, message: &str) {
        if let Some(callback) = self.on_upload_error.as_mut() {
            callback(message);
        }
    }
}

/// Drives a batch from admission to terminal states.
///
/// The orchestrator and its batch belong to a single thread. Transfers run
/// as tasks on `runtime` and report back over a channel; their events are
/// applied only when the owner calls [`poll`](Self::poll) or
/// [`settle`](Self::settle).
pub struct UploadOrchestrator {
    batch: UploadBatch,
    transport: Arc<dyn Transport>,
    runtime: Handle,
    events_tx: UnboundedSender<TransferEvent>,
    events_rx: UnboundedReceiver<TransferEvent>,
    in_flight: HashMap<ItemId, AbortHandle>,
    run: Option<HashSet<ItemId>>,
    callbacks: UploadCallbacks,
}

impl UploadOrchestrator {
    pub fn new(validator: Validator, transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            batch: UploadBatch::new(validator),
            transport,
            runtime,
            events_tx,
            events_rx,
            in_flight: HashMap::new(),
            run: None,
            callbacks: UploadCallbacks::default(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: UploadCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn items(&self) -> &[UploadItem] {
        self.batch.items()
    }

    pub fn snapshot(&self) -> Vec<UploadItem> {
        self.batch.items().to_vec()
    }

    pub fn validator(&self) -> &Validator {
        self.batch.validator()
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.batch.count(StatusKind::Success)
    }

    pub fn error_count(&self) -> usize {
        self.batch.count(StatusKind::Error)
    }

    pub fn pending_count(&self) -> usize {
        self.batch.count(StatusKind::Pending)
    }

    pub fn uploading_count(&self) -> usize {
        self.batch.count(StatusKind::Uploading)
    }

    pub fn is_uploading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn admit(&mut self, files: impl IntoIterator<Item = FileSource>) -> AdmitReport {
        let report = self.batch.admit(files);

        for (file, rejection) in &report.rejected {
            warn!("Rejected {}: {}", file.name, rejection);
            self.callbacks.error(&rejection.to_string());
        }
        if !report.admitted.is_empty() {
            info!(
                "Admitted {} file(s), batch now {}/{}",
                report.admitted.len(),
                self.batch.len(),
                self.batch.validator().max_files()
            );
        }

        report
    }

    /// Removes an item and aborts its transfer. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: ItemId) {
        if self.batch.remove(id).is_none() {
            return;
        }
        if let Some(handle) = self.in_flight.remove(&id) {
            debug!("Aborting transfer of removed item {}", id);
            handle.abort();
        }
        if let Some(run) = self.run.as_mut() {
            run.remove(&id);
        }
        self.check_run_complete();
    }

    /// Starts a transfer for every Pending item. Returns how many started.
    pub fn upload_all(&mut self) -> usize {
        let dispatches = self.batch.begin_pending();
        self.dispatch(dispatches)
    }

    /// Resets every failed item to Pending and uploads just those.
    pub fn retry_failed(&mut self) -> usize {
        let ids = self.batch.reset_failed();
        if ids.is_empty() {
            return 0;
        }
        info!("Retrying {} failed upload(s)", ids.len());
        let dispatches = self.batch.begin(&ids);
        self.dispatch(dispatches)
    }

    /// Empties the batch, aborting anything still in flight.
    pub fn clear_all(&mut self) {
        let removed = self.batch.clear();
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        self.run = None;
        info!("Cleared {} item(s)", removed);
    }

    /// Applies every event that has already arrived. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Applies events until no transfer is in flight.
    pub async fn settle(&mut self) {
        self.poll();
        while !self.in_flight.is_empty() {
            match self.events_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    fn dispatch(&mut self, dispatches: Vec<Dispatch>) -> usize {
        let started = dispatches.len();
        if started == 0 {
            return 0;
        }

        let run = self.run.get_or_insert_with(HashSet::new);
        for Dispatch { ticket, source } in dispatches {
            debug!("Starting transfer of {} ({})", source.name, ticket.item);
            let transport = Arc::clone(&self.transport);
            let finished_tx = self.events_tx.clone();
            let progress_tx = self.events_tx.clone();
            let progress = ProgressSink::new(move |percent| {
                let _ = progress_tx.send(TransferEvent::Progress { ticket, percent });
            });

            // A panicking transport still has to produce a terminal event.
            let task = self.runtime.spawn(async move {
                let outcome = AssertUnwindSafe(async move { transport.send(source, progress).await })
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        warn!("Transfer task for {} panicked", ticket.item);
                        Err(TransferError::Network("transfer task panicked".to_string()))
                    });
                let _ = finished_tx.send(TransferEvent::Finished { ticket, outcome });
            });

            self.in_flight.insert(ticket.item, task.abort_handle());
            run.insert(ticket.item);
        }

        info!("Uploading {} file(s)", started);
        started
    }

    fn handle_event(&mut self, event: TransferEvent) {
        let ticket = event.ticket();
        match self.batch.apply(event) {
            Applied::Stale => debug!("Dropped stale event for {}", ticket.item),
            Applied::Unchanged => {}
            Applied::Progress { id, percent } => debug!("{} at {}%", id, percent),
            Applied::Succeeded { id, location } => {
                self.in_flight.remove(&id);
                info!("Upload of {} succeeded: {}", id, location);
                self.check_run_complete();
            }
            Applied::Failed { id, message } => {
                self.in_flight.remove(&id);
                warn!("Upload of {} failed: {}", id, message);
                self.callbacks.error(&message);
                self.check_run_complete();
            }
        }
    }

    fn check_run_complete(&mut self) {
        let Some(run) = self.run.as_ref() else {
            return;
        };

        let batch = &self.batch;
        let finished = run
            .iter()
            .all(|id| batch.get(*id).map_or(true, |item| item.status().is_terminal()));
        if !finished {
            return;
        }

        self.run = None;
        if self.batch.is_empty() {
            return;
        }

        info!(
            "Upload run complete: {} succeeded, {} failed",
            self.success_count(),
            self.error_count()
        );
        self.callbacks.complete(self.batch.items());
    }
}
