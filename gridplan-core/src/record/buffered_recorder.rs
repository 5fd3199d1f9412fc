use super::{AggregateRecorder, Record, RecordStorage, Recorder};

/// Keeps records in memory.
///
/// Written records are kept as they are. Stored records are aggregated at
/// [`AggregateRecorder::flush`] and the aggregate is kept together with the step.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    storage: RecordStorage,
    flushed: Vec<(i64, Record)>,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the written records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Returns the number of written records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Aggregated records with the step at which they were flushed.
    pub fn flushed(&self) -> &[(i64, Record)] {
        &self.flushed
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        self.flushed.push((step, record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_recorder() {
        let mut recorder = BufferedRecorder::new();
        recorder.write(Record::from_scalar("reward", -1.0));
        recorder.store(Record::from_scalar("episode_return", -13.0));
        recorder.store(Record::from_scalar("episode_return", -17.0));
        recorder.flush(2);

        assert_eq!(recorder.len(), 1);
        let (step, record) = &recorder.flushed()[0];
        assert_eq!(*step, 2);
        assert_eq!(record.get_scalar("episode_return_mean").unwrap(), -15.0);
    }
}
