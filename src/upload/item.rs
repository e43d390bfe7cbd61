use super::error::TransitionError;
use super::types::{FileSource, ItemId, ResultLocation, StatusKind, UploadStatus};

/// Highest progress an in-flight item may show; 100 is reserved for success.
const MAX_IN_FLIGHT_PROGRESS: u8 = 99;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadItem {
    id: ItemId,
    source: FileSource,
    progress: u8,
    status: UploadStatus,
    attempt: u32,
}

impl UploadItem {
    pub fn new(source: FileSource) -> Self {
        Self {
            id: ItemId::new(),
            source,
            progress: 0,
            status: UploadStatus::Pending,
            attempt: 0,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn size(&self) -> u64 {
        self.source.size
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn kind(&self) -> StatusKind {
        self.status.kind()
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn result_location(&self) -> Option<&ResultLocation> {
        match &self.status {
            UploadStatus::Success(location) => Some(location),
            _ => None,
        }
    }

    /// Pending -> Uploading. Returns the new attempt number.
    pub fn begin(&mut self) -> Result<u32, TransitionError> {
        self.expect(StatusKind::Pending, StatusKind::Uploading)?;
        self.status = UploadStatus::Uploading;
        self.progress = 0;
        self.attempt += 1;
        Ok(self.attempt)
    }

    /// Records transfer progress. Regressions are ignored; returns whether
    /// the visible percentage changed.
    pub fn advance(&mut self, percent: u8) -> Result<bool, TransitionError> {
        self.expect(StatusKind::Uploading, StatusKind::Uploading)?;
        let percent = percent.min(MAX_IN_FLIGHT_PROGRESS);
        if percent <= self.progress {
            return Ok(false);
        }
        self.progress = percent;
        Ok(true)
    }

    pub fn succeed(&mut self, location: ResultLocation) -> Result<(), TransitionError> {
        self.expect(StatusKind::Uploading, StatusKind::Success)?;
        self.status = UploadStatus::Success(location);
        self.progress = 100;
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.expect(StatusKind::Uploading, StatusKind::Error)?;
        self.status = UploadStatus::Error(message.into());
        Ok(())
    }

    /// Error -> Pending, for an explicit retry.
    pub fn reset_for_retry(&mut self) -> Result<(), TransitionError> {
        self.expect(StatusKind::Error, StatusKind::Pending)?;
        self.status = UploadStatus::Pending;
        self.progress = 0;
        Ok(())
    }

    fn expect(&self, from: StatusKind, to: StatusKind) -> Result<(), TransitionError> {
        let current = self.kind();
        if current == from {
            Ok(())
        } else {
            Err(TransitionError { from: current, to })
        }
    }
}
