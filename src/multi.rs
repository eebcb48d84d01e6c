//! Fan-out writer: one write reaches every registered stream.

use crate::error::{Result, ResultExt};
use crate::stream::Stream;

/// Handle returned by [`MultiWriter::add`], used to remove the stream again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u64);

/// Forwards `write` and `flush` to every member in registration order.
///
/// Fan-out is not atomic. If a member fails, the members before it have
/// already received the data, the members after it have not, and the error
/// names the failing member. Reading is unsupported.
#[derive(Default)]
pub struct MultiWriter<'a> {
    members: Vec<(StreamId, Box<dyn Stream + 'a>)>,
    next_id: u64,
}

impl<'a> MultiWriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `stream` at the end of the fan-out order.
    pub fn add(&mut self, stream: impl Stream + 'a) -> StreamId {
        let id = StreamId(self.next_id);
        self.next_id += 1;
        self.members.push((id, Box::new(stream)));
        id
    }

    /// Unregisters a stream and hands it back. Unknown ids return `None`.
    pub fn remove(&mut self, id: StreamId) -> Option<Box<dyn Stream + 'a>> {
        let index = self.members.iter().position(|(member, _)| *member == id)?;
        Some(self.members.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: StreamId) -> bool {
        self.members.iter().any(|(member, _)| *member == id)
    }
}

impl Stream for MultiWriter<'_> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        for (index, (_, stream)) in self.members.iter_mut().enumerate() {
            stream.write(data).with_context(|| {
                log::debug!("MultiWriter: write to member #{} failed", index);
                format!("fan-out member #{} ({})", index, stream.kind())
            })?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for (index, (_, stream)) in self.members.iter_mut().enumerate() {
            stream
                .flush()
                .with_context(|| format!("flushing fan-out member #{} ({})", index, stream.kind()))?;
        }
        Ok(())
    }
}
