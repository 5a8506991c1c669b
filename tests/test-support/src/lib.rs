//! Shared helpers for the workspace tests

use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, Once,
    },
};

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

/// Registers a global default tracing subscriber when called for the first time. This is intended
/// for use in tests.
pub fn subscribe() {
    static INSTALL_TRACING_SUBSCRIBER: Once = Once::new();
    INSTALL_TRACING_SUBSCRIBER.call_once(|| {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).unwrap();
    });
}

/// This is a writer that can be used with a thread-local tracing subscriber to inspect
/// logs for a single test.
#[derive(Clone, Default)]
pub struct LogWriter(pub Arc<Mutex<Vec<u8>>>);

impl LogWriter {
    /// Returns true if anything logged so far contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.logs().contains(needle)
    }

    /// Everything logged so far
    pub fn logs(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// Captures the logs of the current thread until the returned guard is dropped
pub fn capture_logs() -> (LogWriter, DefaultGuard) {
    let logs = LogWriter::default();
    let writer = logs.clone();

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(move || writer.clone())
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry().with(layer);
    let guard = tracing::subscriber::set_default(subscriber);

    (logs, guard)
}

/// A file in the system temporary directory, removed on drop
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    /// Creates a uniquely named file holding `contents`
    pub fn new(prefix: &str, contents: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let path = env::temp_dir().join(format!(
            "{prefix}-{}-{}.txt",
            process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let file = Self { path };
        file.write(contents);
        file
    }

    /// Replaces the contents of the file
    pub fn write(&self, contents: &str) {
        fs::write(&self.path, contents).unwrap();
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
