mod batch;
mod error;
mod item;
mod orchestrator;
mod transport;
mod types;
mod validator;

pub use batch::{AdmitReport, Applied, Dispatch, UploadBatch};
pub use error::{Rejection, TransferError, TransitionError};
pub use item::UploadItem;
pub use orchestrator::{UploadCallbacks, UploadOrchestrator};
pub use transport::{interpret_response, HttpTransport, ProgressSink, Transport};
pub use types::{
    FileSource, ItemId, ResultLocation, StatusKind, Ticket, TransferEvent, UploadStatus,
};
pub use validator::Validator;
