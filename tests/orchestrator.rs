use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use compliance_uploader::config::UploaderConfig;
use compliance_uploader::upload::{
    FileSource, ItemId, ProgressSink, Rejection, ResultLocation, StatusKind, TransferError,
    Transport, UploadCallbacks, UploadItem, UploadOrchestrator, Validator,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::runtime::Handle;

const MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy)]
enum Script {
    Succeed,
    Fail(u16),
    Hang,
}

/// In-memory transport: outcomes are scripted per file name, in call order.
/// Unscripted calls succeed.
#[derive(Default)]
struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn script(self, name: &str, outcomes: &[Script]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(name.to_string(), outcomes.iter().copied().collect());
        self
    }

    fn calls_for(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|n| *n == name).count()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        source: FileSource,
        progress: ProgressSink,
    ) -> BoxFuture<'static, Result<ResultLocation, TransferError>> {
        self.calls.lock().unwrap().push(source.name.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&source.name)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Script::Succeed);

        async move {
            progress.report_percent(25);
            tokio::task::yield_now().await;
            progress.report_percent(70);
            tokio::task::yield_now().await;

            match script {
                Script::Succeed => {
                    progress.report_percent(100);
                    Ok(ResultLocation::new(format!(
                        "https://files.test/{}",
                        source.name
                    )))
                }
                Script::Fail(status) => Err(TransferError::Server {
                    status,
                    message: format!("Upload failed with status {}", status),
                }),
                Script::Hang => futures::future::pending().await,
            }
        }
        .boxed()
    }
}

/// Reports some progress, then panics inside the transfer.
struct PanickingTransport;

impl Transport for PanickingTransport {
    fn send(
        &self,
        _source: FileSource,
        progress: ProgressSink,
    ) -> BoxFuture<'static, Result<ResultLocation, TransferError>> {
        async move {
            progress.report_percent(10);
            tokio::task::yield_now().await;
            panic!("transport blew up");
        }
        .boxed()
    }
}

#[derive(Default, Clone)]
struct Recorder {
    errors: Rc<RefCell<Vec<String>>>,
    completions: Rc<RefCell<Vec<Vec<UploadItem>>>>,
}

fn setup(
    transport: Arc<dyn Transport>,
    config: &UploaderConfig,
) -> (UploadOrchestrator, Recorder) {
    let recorder = Recorder::default();
    let errors = Rc::clone(&recorder.errors);
    let completions = Rc::clone(&recorder.completions);

    let callbacks = UploadCallbacks::new()
        .on_upload_error(move |message| errors.borrow_mut().push(message.to_string()))
        .on_upload_complete(move |items| completions.borrow_mut().push(items.to_vec()));

    let orchestrator = UploadOrchestrator::new(Validator::new(config), transport, Handle::current())
        .with_callbacks(callbacks);
    (orchestrator, recorder)
}

fn file(name: &str) -> FileSource {
    FileSource::new(format!("/virtual/{}", name), name, 4 * 1024)
}

fn kinds(items: &[UploadItem]) -> Vec<StatusKind> {
    items.iter().map(|item| item.kind()).collect()
}

#[tokio::test]
async fn two_succeed_and_one_server_error() {
    let transport = Arc::new(ScriptedTransport::default().script("b.csv", &[Script::Fail(500)]));
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    let report = orchestrator.admit(vec![file("a.csv"), file("b.csv"), file("c.csv")]);
    assert_eq!(report.admitted.len(), 3);

    assert_eq!(orchestrator.upload_all(), 3);
    assert!(orchestrator.is_uploading());
    orchestrator.settle().await;

    assert_eq!(orchestrator.success_count(), 2);
    assert_eq!(orchestrator.error_count(), 1);
    assert!(!orchestrator.is_uploading());

    let completions = recorder.completions.borrow();
    assert_eq!(completions.len(), 1);
    assert_eq!(
        kinds(&completions[0]),
        vec![StatusKind::Success, StatusKind::Error, StatusKind::Success]
    );
    assert_eq!(completions[0][1].error(), Some("Upload failed with status 500"));
    assert_eq!(
        completions[0][0].result_location().map(ResultLocation::as_str),
        Some("https://files.test/a.csv")
    );
    assert!(completions[0]
        .iter()
        .filter(|item| item.kind() == StatusKind::Success)
        .all(|item| item.progress() == 100));

    assert_eq!(*recorder.errors.borrow(), vec!["Upload failed with status 500"]);
}

#[tokio::test]
async fn oversized_file_is_rejected_without_item() {
    let transport = Arc::new(ScriptedTransport::default());
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    let report = orchestrator.admit(vec![FileSource::new("/virtual/big.pdf", "big.pdf", 30 * MB)]);

    assert!(report.admitted.is_empty());
    assert!(matches!(
        report.rejected[0].1,
        Rejection::SizeExceeded { limit_mb: 10, .. }
    ));
    assert!(orchestrator.is_empty());
    assert_eq!(*recorder.errors.borrow(), vec!["File size exceeds 10MB limit"]);
}

#[tokio::test]
async fn sixth_file_is_rejected_as_batch_full() {
    let transport = Arc::new(ScriptedTransport::default());
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    let files: Vec<_> = (1..=6).map(|i| file(&format!("evidence{}.pdf", i))).collect();
    let report = orchestrator.admit(files);

    assert_eq!(report.admitted.len(), 5);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0.name, "evidence6.pdf");
    assert_eq!(report.rejected[0].1, Rejection::BatchFull { max_files: 5 });
    assert_eq!(orchestrator.pending_count(), 5);
    assert_eq!(*recorder.errors.borrow(), vec!["Maximum 5 files allowed"]);
}

#[tokio::test]
async fn each_rejection_is_reported_separately() {
    let transport = Arc::new(ScriptedTransport::default());
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    orchestrator.admit(vec![file("a.pdf")]);
    orchestrator.admit(vec![file("a.pdf"), file("image.png"), file("b.txt")]);

    assert_eq!(orchestrator.len(), 2);
    assert_eq!(
        *recorder.errors.borrow(),
        vec![
            "File \"a.pdf\" already added".to_string(),
            "File type not supported. Accepted types: .pdf, .csv, .xlsx, .json, .txt".to_string(),
        ]
    );
}

#[tokio::test]
async fn retry_only_reuploads_failed_items() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .script("b.pdf", &[Script::Fail(503), Script::Succeed])
            .script("c.pdf", &[Script::Fail(500), Script::Succeed]),
    );
    let (mut orchestrator, recorder) =
        setup(Arc::<ScriptedTransport>::clone(&transport), &UploaderConfig::default());

    orchestrator.admit(vec![file("a.pdf"), file("b.pdf"), file("c.pdf")]);
    orchestrator.upload_all();
    orchestrator.settle().await;
    assert_eq!(orchestrator.error_count(), 2);
    let first_a = orchestrator.items()[0].clone();

    assert_eq!(orchestrator.retry_failed(), 2);
    assert_eq!(orchestrator.uploading_count(), 2);
    assert_eq!(orchestrator.items()[0], first_a);
    orchestrator.settle().await;

    assert_eq!(orchestrator.success_count(), 3);
    assert_eq!(transport.calls_for("a.pdf"), 1);
    assert_eq!(transport.calls_for("b.pdf"), 2);
    assert_eq!(transport.calls_for("c.pdf"), 2);
    assert_eq!(orchestrator.items()[1].attempt(), 2);
    assert_eq!(orchestrator.items()[0].attempt(), 1);

    assert_eq!(recorder.completions.borrow().len(), 2);
    assert_eq!(recorder.errors.borrow().len(), 2);
    assert_eq!(orchestrator.retry_failed(), 0);
}

#[tokio::test]
async fn clear_all_empties_batch_with_transfers_in_flight() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .script("a.pdf", &[Script::Hang])
            .script("b.pdf", &[Script::Hang]),
    );
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    orchestrator.admit(vec![file("a.pdf"), file("b.pdf")]);
    orchestrator.upload_all();
    tokio::task::yield_now().await;
    orchestrator.poll();

    orchestrator.clear_all();
    assert!(orchestrator.is_empty());
    assert!(!orchestrator.is_uploading());

    orchestrator.settle().await;
    assert!(recorder.completions.borrow().is_empty());
    assert!(recorder.errors.borrow().is_empty());
}

#[tokio::test]
async fn events_from_before_clear_are_discarded() {
    let transport = Arc::new(ScriptedTransport::default());
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    orchestrator.admit(vec![file("a.pdf"), file("b.pdf")]);
    orchestrator.upload_all();

    // let the transfers finish without applying their events
    tokio::time::sleep(Duration::from_millis(50)).await;

    orchestrator.clear_all();
    orchestrator.admit(vec![file("a.pdf"), file("b.pdf")]);
    assert!(orchestrator.poll() > 0);

    assert_eq!(orchestrator.pending_count(), 2);
    assert!(orchestrator.items().iter().all(|item| item.progress() == 0));
    assert!(recorder.completions.borrow().is_empty());
}

#[tokio::test]
async fn removing_in_flight_item_lets_run_complete() {
    let transport = Arc::new(ScriptedTransport::default().script("slow.pdf", &[Script::Hang]));
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    orchestrator.admit(vec![file("slow.pdf"), file("fast.pdf")]);
    let slow = orchestrator.items()[0].id();
    orchestrator.upload_all();

    orchestrator.remove_item(ItemId::new());
    assert_eq!(orchestrator.len(), 2);

    orchestrator.remove_item(slow);
    orchestrator.settle().await;

    assert_eq!(orchestrator.len(), 1);
    assert_eq!(orchestrator.success_count(), 1);

    let completions = recorder.completions.borrow();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].len(), 1);
    assert_eq!(completions[0][0].name(), "fast.pdf");
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_100() {
    let transport = Arc::new(ScriptedTransport::default());
    let (mut orchestrator, _recorder) = setup(transport, &UploaderConfig::default());

    orchestrator.admit(vec![file("a.json")]);
    orchestrator.upload_all();

    let mut seen = Vec::new();
    while orchestrator.is_uploading() {
        tokio::task::yield_now().await;
        orchestrator.poll();
        let item = &orchestrator.items()[0];
        if item.kind() == StatusKind::Uploading {
            assert!(item.progress() < 100);
        }
        seen.push(item.progress());
    }

    assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(seen.last().copied(), Some(100));
    assert_eq!(orchestrator.items()[0].kind(), StatusKind::Success);
}

#[tokio::test]
async fn upload_with_nothing_pending_is_a_noop() {
    let transport = Arc::new(ScriptedTransport::default());
    let (mut orchestrator, recorder) = setup(transport, &UploaderConfig::default());

    assert_eq!(orchestrator.upload_all(), 0);
    orchestrator.settle().await;
    assert!(recorder.completions.borrow().is_empty());
}

#[tokio::test]
async fn panicking_transfer_fails_its_item() {
    let (mut orchestrator, recorder) =
        setup(Arc::new(PanickingTransport), &UploaderConfig::default());

    orchestrator.admit(vec![file("a.pdf")]);
    orchestrator.upload_all();

    tokio::time::timeout(Duration::from_secs(2), orchestrator.settle())
        .await
        .expect("settle should finish after a panicked transfer");

    assert!(!orchestrator.is_uploading());
    let item = &orchestrator.items()[0];
    assert_eq!(item.kind(), StatusKind::Error);
    assert_eq!(
        item.error(),
        Some("Network error occurred: transfer task panicked")
    );

    assert_eq!(recorder.completions.borrow().len(), 1);
    assert_eq!(
        *recorder.errors.borrow(),
        vec!["Network error occurred: transfer task panicked"]
    );
}
