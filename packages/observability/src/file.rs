//! Append-only file sink for JSON log lines.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Line-flushed writer that appends to a single log file.
#[derive(Clone)]
pub struct AppendFileWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl AppendFileWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl Write for AppendFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        // Flush per line so `tail -f` sees complete records.
        guard.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// `MakeWriter` handing out clones of one [`AppendFileWriter`].
#[derive(Clone)]
pub struct FileWriterFactory {
    writer: AppendFileWriter,
}

impl FileWriterFactory {
    pub fn new(writer: AppendFileWriter) -> Self {
        Self { writer }
    }
}

impl<'a> MakeWriter<'a> for FileWriterFactory {
    type Writer = AppendFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}
