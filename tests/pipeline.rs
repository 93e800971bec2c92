//! Integration tests for the batch pipeline.
//!
//! A scripted in-process engine stands in for the vision model, so these run
//! without network access, pdfium or LibreOffice.

use async_trait::async_trait;
use edgequake_docs2md::{
    convert_directory_with_engine, find_convertible_files, BatchConfig, BatchOutput,
    BatchProgressCallback, ConversionEngine, ConversionPipeline, Credential, Docs2MdError,
    EngineError, EngineInvocation, MISSING_CREDENTIAL,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Writes `<stem>_output.md` (a name that differs from the canonical one)
/// and fails for sources whose file name is listed in `fail_on`.
#[derive(Default)]
struct ScriptedEngine {
    fail_on: HashSet<String>,
    invocations: Mutex<Vec<EngineInvocation>>,
}

impl ScriptedEngine {
    fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<EngineInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversionEngine for ScriptedEngine {
    async fn convert(&self, invocation: &EngineInvocation) -> Result<(), EngineError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let name = invocation
            .source
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        if self.fail_on.contains(&name) {
            return Err(EngineError::Other(format!("simulated failure for {name}")));
        }

        let stem = invocation.source.file_stem().unwrap().to_string_lossy();
        let out = invocation.output_dir.join(format!("{stem}_output.md"));
        fs::write(&out, format!("# {stem}\n")).map_err(|e| EngineError::Io {
            path: out.clone(),
            source: e,
        })?;
        Ok(())
    }
}

fn touch(root: &Path, rel: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, b"content").unwrap();
}

fn key() -> Credential {
    Credential::new("sk-test")
}

fn names(paths: impl Iterator<Item = PathBuf>) -> Vec<String> {
    paths
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mirrors_structure_and_preserves_order() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    touch(&input, "a/report.pdf");
    touch(&input, "a/b/notes.txt");
    touch(&input, "a/b/ignored.png");

    let engine = Arc::new(ScriptedEngine::default());
    let pipeline = ConversionPipeline::new(engine.clone(), BatchConfig::default());
    let results = pipeline
        .convert_all(&input, &output, Some(&key()))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.success()));
    assert_eq!(
        names(results.iter().map(|r| r.file_path().to_path_buf())),
        vec!["report.pdf", "notes.txt"]
    );

    assert_eq!(fs::read_to_string(output.join("a/report.md")).unwrap(), "# report\n");
    assert_eq!(fs::read_to_string(output.join("a/b/notes.md")).unwrap(), "# notes\n");
    assert!(!output.join("a/report_output.md").exists());
    assert!(!output.join("a/b/notes_output.md").exists());
    assert_eq!(results[0].output_path(), Some(output.join("a/report.md").as_path()));
    assert_eq!(engine.calls().len(), 2);
}

#[tokio::test]
async fn invocation_uses_fixed_engine_options() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    touch(&input, "x/sheet.xlsx");

    let engine = Arc::new(ScriptedEngine::default());
    let pipeline = ConversionPipeline::new(engine.clone(), BatchConfig::default());
    pipeline
        .convert_all(&input, &tmp.path().join("out"), Some(&key()))
        .await
        .unwrap();

    let calls = engine.calls();
    let inv = &calls[0];
    assert!(inv.output_dir.ends_with("out/x"));
    assert!(inv.cleanup);
    assert_eq!(inv.concurrency, 10);
    assert!(!inv.maintain_format);
    assert_eq!(inv.model, "gpt-4o-mini");
    assert!(inv.instruction.contains("Markdown"));
    assert_eq!(inv.credential.expose(), "sk-test");
    assert!(inv.source.is_absolute());
}

#[tokio::test]
async fn missing_credential_fails_every_file_without_engine_calls() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    touch(&input, "one.pdf");
    touch(&input, "two.docx");
    touch(&input, "sub/three.csv");

    let credential = Credential::from_optional(Some(String::new()));
    let engine = Arc::new(ScriptedEngine::default());
    let pipeline = ConversionPipeline::new(engine.clone(), BatchConfig::default());
    let results = pipeline
        .convert_all(&input, &tmp.path().join("out"), credential.as_ref())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    for r in &results {
        assert!(!r.success());
        assert_eq!(r.error(), Some(MISSING_CREDENTIAL));
    }
    assert!(engine.calls().is_empty());
    assert!(tmp.path().join("out").is_dir());
}

#[tokio::test]
async fn blank_credential_is_treated_as_missing() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    touch(&input, "one.pdf");
    touch(&input, "two.rtf");

    for secret in ["", "  \t"] {
        let engine = Arc::new(ScriptedEngine::default());
        let pipeline = ConversionPipeline::new(engine.clone(), BatchConfig::default());
        let results = pipeline
            .convert_all(&input, &tmp.path().join("out"), Some(&Credential::new(secret)))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.error() == Some(MISSING_CREDENTIAL)));
        assert!(engine.calls().is_empty());
    }
}

#[tokio::test]
async fn filesystem_failure_is_recorded_and_batch_continues() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    touch(&input, "a.pdf");
    touch(&input, "c.pdf");
    touch(&input, "sub/b.pdf");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("sub"), b"a file where a directory belongs").unwrap();

    let engine = Arc::new(ScriptedEngine::default());
    let pipeline = ConversionPipeline::new(engine.clone(), BatchConfig::default());
    let results = pipeline
        .convert_all(&input, &output, Some(&key()))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(
        names(results.iter().map(|r| r.file_path().to_path_buf())),
        vec!["a.pdf", "c.pdf", "b.pdf"]
    );
    assert!(results[0].success());
    assert!(results[1].success());
    let failed = &results[2];
    assert!(!failed.success());
    assert!(failed
        .error()
        .unwrap()
        .starts_with("Failed to create target directory"));
    assert_eq!(engine.calls().len(), 2);
    assert!(output.join("a.md").exists());
    assert!(output.join("c.md").exists());
}

#[tokio::test]
async fn scanned_list_drives_the_batch() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    touch(&input, "a.pdf");
    let files = find_convertible_files(&input).unwrap();
    touch(&input, "late.pdf");
    fs::create_dir_all(&output).unwrap();

    let engine = Arc::new(ScriptedEngine::default());
    let pipeline = ConversionPipeline::new(engine.clone(), BatchConfig::default());
    let root = fs::canonicalize(&input).unwrap();
    let batch = BatchOutput::new(
        pipeline
            .convert_files(&files, &root, &output, Some(&key()))
            .await,
    );

    assert_eq!(batch.summary.total, 1);
    assert!(batch.summary.all_succeeded());
    assert_eq!(engine.calls().len(), 1);
    assert!(!output.join("late.md").exists());
}

#[tokio::test]
async fn one_engine_failure_does_not_stop_the_batch() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    touch(&input, "a.pdf");
    touch(&input, "b.pdf");
    touch(&input, "c.pdf");

    let engine = Arc::new(ScriptedEngine::failing_on(&["b.pdf"]));
    let out = convert_directory_with_engine(
        engine.clone(),
        &input,
        tmp.path().join("out"),
        Some(&key()),
        &BatchConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(out.summary.total, 3);
    assert_eq!(out.summary.succeeded, 2);
    assert_eq!(out.summary.failed, 1);
    assert_eq!(
        names(out.results.iter().map(|r| r.file_path().to_path_buf())),
        vec!["a.pdf", "b.pdf", "c.pdf"]
    );
    let failed = &out.results[1];
    assert!(!failed.success());
    assert_eq!(failed.error(), Some("simulated failure for b.pdf"));
    assert_eq!(engine.calls().len(), 3);
    assert!(tmp.path().join("out/c.md").exists());
}

#[tokio::test]
async fn stale_canonical_output_is_replaced() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    touch(&input, "report.pdf");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("report.md"), "stale").unwrap();
    let old = fs::File::options()
        .write(true)
        .open(output.join("report.md"))
        .unwrap();
    old.set_modified(std::time::SystemTime::UNIX_EPOCH).unwrap();

    let pipeline = ConversionPipeline::new(Arc::new(ScriptedEngine::default()), BatchConfig::default());
    let results = pipeline
        .convert_all(&input, &output, Some(&key()))
        .await
        .unwrap();

    assert!(results[0].success());
    assert_eq!(fs::read_to_string(output.join("report.md")).unwrap(), "# report\n");
    assert!(!output.join("report_output.md").exists());
}

#[tokio::test]
async fn rerun_into_same_output_is_stable() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    let output = tmp.path().join("out");
    touch(&input, "deep/er/notes.txt");

    let pipeline = ConversionPipeline::new(Arc::new(ScriptedEngine::default()), BatchConfig::default());
    for _ in 0..2 {
        let results = pipeline
            .convert_all(&input, &output, Some(&key()))
            .await
            .unwrap();
        assert!(results[0].success());
    }
    let entries: Vec<_> = fs::read_dir(output.join("deep/er"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["notes.md"]);
}

#[tokio::test]
async fn missing_input_root_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let pipeline = ConversionPipeline::new(Arc::new(ScriptedEngine::default()), BatchConfig::default());
    let err = pipeline
        .convert_all(&tmp.path().join("absent"), &tmp.path().join("out"), Some(&key()))
        .await
        .unwrap_err();
    assert!(matches!(err, Docs2MdError::InputNotFound { .. }));
    assert!(!tmp.path().join("out").exists());
}

#[tokio::test]
async fn uncreatable_output_root_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    touch(&input, "a.pdf");
    let blocker = tmp.path().join("file");
    fs::write(&blocker, b"not a dir").unwrap();

    let pipeline = ConversionPipeline::new(Arc::new(ScriptedEngine::default()), BatchConfig::default());
    let err = pipeline
        .convert_all(&input, &blocker.join("out"), Some(&key()))
        .await
        .unwrap_err();
    assert!(matches!(err, Docs2MdError::OutputDirFailed { .. }));
}

#[tokio::test]
async fn empty_tree_returns_no_results() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    touch(&input, "photo.jpg");

    let engine = Arc::new(ScriptedEngine::default());
    let pipeline = ConversionPipeline::new(engine.clone(), BatchConfig::default());
    let results = pipeline
        .convert_all(&input, &tmp.path().join("out"), Some(&key()))
        .await
        .unwrap();
    assert!(results.is_empty());
    assert!(engine.calls().is_empty());
}

// ── Progress callbacks ───────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl BatchProgressCallback for RecordingCallback {
    fn on_batch_start(&self, total: usize) {
        self.events.lock().unwrap().push(format!("start {total}"));
    }

    fn on_file_start(&self, index: usize, _total: usize, _path: &Path) {
        self.events.lock().unwrap().push(format!("file {index}"));
    }

    fn on_file_complete(&self, index: usize, _total: usize, _path: &Path) {
        self.events.lock().unwrap().push(format!("ok {index}"));
    }

    fn on_file_error(&self, index: usize, _total: usize, _path: &Path, _error: &str) {
        self.events.lock().unwrap().push(format!("err {index}"));
    }

    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {succeeded}/{total}"));
    }
}

#[tokio::test]
async fn progress_events_follow_discovery_order() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    touch(&input, "a.pdf");
    touch(&input, "b.pdf");

    let recorder = Arc::new(RecordingCallback::default());
    let config = BatchConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let pipeline = ConversionPipeline::new(Arc::new(ScriptedEngine::failing_on(&["a.pdf"])), config);
    pipeline
        .convert_all(&input, &tmp.path().join("out"), Some(&key()))
        .await
        .unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["start 2", "file 0", "err 0", "file 1", "ok 1", "done 1/2"]
    );
}
