use std::fmt;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::error::TransferError;

/// Opaque identity of one queued file, assigned at admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file on disk that the batch refers to. The bytes are only read when
/// the transfer streams them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self::new(path, name, metadata.len()))
    }
}

/// Where the server says the uploaded document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLocation(String);

impl ResultLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success(ResultLocation),
    Error(String),
}

/// Payload-free view of [`UploadStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Pending,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            UploadStatus::Pending => StatusKind::Pending,
            UploadStatus::Uploading => StatusKind::Uploading,
            UploadStatus::Success(_) => StatusKind::Success,
            UploadStatus::Error(_) => StatusKind::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Success(_) | UploadStatus::Error(_))
    }
}

impl StatusKind {
    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Pending => "Pending",
            StatusKind::Uploading => "Uploading",
            StatusKind::Success => "Uploaded",
            StatusKind::Error => "Failed",
        }
    }
}

/// Identifies one transfer attempt of one item within one batch generation.
/// Events carrying a ticket that no longer matches the batch are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub item: ItemId,
    pub generation: u64,
    pub attempt: u32,
}

#[derive(Debug, Clone)]
pub enum TransferEvent {
    Progress {
        ticket: Ticket,
        percent: u8,
    },
    Finished {
        ticket: Ticket,
        outcome: Result<ResultLocation, TransferError>,
    },
}

impl TransferEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            TransferEvent::Progress { ticket, .. } | TransferEvent::Finished { ticket, .. } => {
                *ticket
            }
        }
    }
}
