use crate::error::Result;

/// Key the note list is saved under.
pub const NOTES_KEY: &str = "notes";

/// A single key-value slot holding the serialized note list.
///
/// `write` replaces whatever was there before; there is only one writer, so
/// the last write wins.
pub trait Persistence {
    fn read(&self) -> Result<Option<Vec<u8>>>;
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

/// In-process slot for tests. Counts writes so callers can check the
/// store only persists when something actually changed.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Option<Vec<u8>>,
    writes: usize,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Some(bytes.into()),
            writes: 0,
        }
    }

    pub fn contents(&self) -> Option<&[u8]> {
        self.slot.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[cfg(test)]
impl Persistence for MemoryStorage {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.slot.clone())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.slot = Some(bytes.to_vec());
        self.writes += 1;
        Ok(())
    }
}
