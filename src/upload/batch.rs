use tracing::debug;

use super::error::Rejection;
use super::item::UploadItem;
use super::types::{FileSource, ItemId, ResultLocation, StatusKind, Ticket, TransferEvent};
use super::validator::Validator;

/// Outcome of one `admit` call. Rejections are listed in input order.
#[derive(Debug, Default)]
pub struct AdmitReport {
    pub admitted: Vec<ItemId>,
    pub rejected: Vec<(FileSource, Rejection)>,
}

/// An item that just moved to Uploading and needs a transfer started.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub source: FileSource,
}

/// What applying a transfer event did to the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Ticket no longer matches the batch (cleared, removed or retried).
    Stale,
    Progress { id: ItemId, percent: u8 },
    /// Progress event that did not move the visible percentage.
    Unchanged,
    Succeeded { id: ItemId, location: ResultLocation },
    Failed { id: ItemId, message: String },
}

/// The ordered set of items owned by one orchestrator.
#[derive(Debug)]
pub struct UploadBatch {
    items: Vec<UploadItem>,
    generation: u64,
    validator: Validator,
}

impl UploadBatch {
    pub fn new(validator: Validator) -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
            validator,
        }
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn get(&self, id: ItemId) -> Option<&UploadItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn admit(&mut self, files: impl IntoIterator<Item = FileSource>) -> AdmitReport {
        let mut report = AdmitReport::default();

        for file in files {
            match self.validator.check(&file, &self.items) {
                Ok(()) => {
                    let item = UploadItem::new(file);
                    debug!("Admitted {} as {}", item.name(), item.id());
                    report.admitted.push(item.id());
                    self.items.push(item);
                }
                Err(rejection) => report.rejected.push((file, rejection)),
            }
        }

        report
    }

    pub fn remove(&mut self, id: ItemId) -> Option<UploadItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Empties the batch and invalidates every outstanding ticket.
    pub fn clear(&mut self) -> usize {
        self.generation += 1;
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    /// Moves every Pending item to Uploading.
    pub fn begin_pending(&mut self) -> Vec<Dispatch> {
        let generation = self.generation;
        self.items
            .iter_mut()
            .filter_map(|item| Self::begin_item(item, generation))
            .collect()
    }

    /// Moves the given items to Uploading, skipping any that are not Pending.
    pub fn begin(&mut self, ids: &[ItemId]) -> Vec<Dispatch> {
        let generation = self.generation;
        self.items
            .iter_mut()
            .filter(|item| ids.contains(&item.id()))
            .filter_map(|item| Self::begin_item(item, generation))
            .collect()
    }

    /// Error -> Pending for every failed item; returns their ids.
    pub fn reset_failed(&mut self) -> Vec<ItemId> {
        self.items
            .iter_mut()
            .filter_map(|item| item.reset_for_retry().ok().map(|()| item.id()))
            .collect()
    }

    pub fn apply(&mut self, event: TransferEvent) -> Applied {
        let ticket = event.ticket();
        if ticket.generation != self.generation {
            return Applied::Stale;
        }

        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.id() == ticket.item && item.attempt() == ticket.attempt)
        else {
            return Applied::Stale;
        };

        match event {
            TransferEvent::Progress { percent, .. } => match item.advance(percent) {
                Ok(true) => Applied::Progress {
                    id: item.id(),
                    percent: item.progress(),
                },
                Ok(false) => Applied::Unchanged,
                Err(_) => Applied::Stale,
            },
            TransferEvent::Finished { outcome, .. } => match outcome {
                Ok(location) => match item.succeed(location.clone()) {
                    Ok(()) => Applied::Succeeded {
                        id: item.id(),
                        location,
                    },
                    Err(_) => Applied::Stale,
                },
                Err(error) => {
                    let message = error.to_string();
                    match item.fail(message.clone()) {
                        Ok(()) => Applied::Failed {
                            id: item.id(),
                            message,
                        },
                        Err(_) => Applied::Stale,
                    }
                }
            },
        }
    }

    pub fn count(&self, kind: StatusKind) -> usize {
        self.items.iter().filter(|item| item.kind() == kind).count()
    }

    fn begin_item(item: &mut UploadItem, generation: u64) -> Option<Dispatch> {
        let attempt = item.begin().ok()?;
        Some(Dispatch {
            ticket: Ticket {
                item: item.id(),
                generation,
                attempt,
            },
            source: item.source().clone(),
        })
    }
}
