//! Scalar sinks for training curves.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

/// Receiver of `(name, value, step)` scalar records.
pub trait ScalarSink: Send {
    fn add_scalar(&mut self, name: &str, value: f32, step: usize);

    /// Flush any buffered output.
    fn flush(&mut self) {}
}

/// One recorded scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRecord {
    pub name: String,
    pub value: f32,
    pub step: usize,
}

/// CSV file sink.
pub struct CsvScalarSink {
    writer: BufWriter<File>,
}

impl CsvScalarSink {
    /// Create the file and write the header.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "name,step,value")?;
        Ok(Self { writer })
    }
}

impl ScalarSink for CsvScalarSink {
    fn add_scalar(&mut self, name: &str, value: f32, step: usize) {
        if let Err(e) = writeln!(self.writer, "{},{},{}", name, step, value) {
            log::warn!("failed to write scalar {}: {}", name, e);
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Drop for CsvScalarSink {
    fn drop(&mut self) {
        ScalarSink::flush(self);
    }
}

/// Forwards scalars to `log::info!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScalarSink;

impl ScalarSink for LogScalarSink {
    fn add_scalar(&mut self, name: &str, value: f32, step: usize) {
        log::info!("{} [{}]: {:.6}", name, step, value);
    }
}

/// In-memory sink. Clones share one store.
#[derive(Debug, Default, Clone)]
pub struct MemoryScalarSink {
    records: Arc<Mutex<Vec<ScalarRecord>>>,
}

impl MemoryScalarSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn records(&self) -> Vec<ScalarRecord> {
        self.records.lock().clone()
    }

    /// `(step, value)` pairs recorded under `name`, in arrival order.
    pub fn series(&self, name: &str) -> Vec<(usize, f32)> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.name == name)
            .map(|r| (r.step, r.value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ScalarSink for MemoryScalarSink {
    fn add_scalar(&mut self, name: &str, value: f32, step: usize) {
        self.records.lock().push(ScalarRecord {
            name: name.to_string(),
            value,
            step,
        });
    }
}

/// Sink that writes to multiple backends.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn ScalarSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn add<S: ScalarSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl ScalarSink for MultiSink {
    fn add_scalar(&mut self, name: &str, value: f32, step: usize) {
        for sink in &mut self.sinks {
            sink.add_scalar(name, value, step);
        }
    }

    fn flush(&mut self) {
        for sink in &mut self.sinks {
            sink.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_sink_shares_store() {
        let sink = MemoryScalarSink::new();
        let mut writer = sink.clone();

        writer.add_scalar("Data/actor_loss_per_replay", 0.5, 0);
        writer.add_scalar("Data/critic_loss_per_replay", 2.0, 0);
        writer.add_scalar("Data/actor_loss_per_replay", 0.25, 1);

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.series("Data/actor_loss_per_replay"), vec![(0, 0.5), (1, 0.25)]);
    }

    #[test]
    fn test_csv_sink_writes_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scalars.csv");
        {
            let mut sink = CsvScalarSink::new(&path).unwrap();
            sink.add_scalar("Data/average net_worth", 1012.5, 3);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines, vec!["name,step,value", "Data/average net_worth,3,1012.5"]);
    }

    #[test]
    fn test_multi_sink_fans_out() {
        let a = MemoryScalarSink::new();
        let b = MemoryScalarSink::new();
        let mut multi = MultiSink::new().add(a.clone()).add(b.clone()).add(LogScalarSink);

        multi.add_scalar("x", 1.0, 7);
        multi.flush();

        assert_eq!(a.records(), b.records());
        assert_eq!(a.series("x"), vec![(7, 1.0)]);
    }
}
