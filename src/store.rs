//! The note list, the edit cursor and the draft, plus the rule that every
//! change to the list is written back to storage before the call returns.

use crate::{
    error::{Error, Result},
    models::{Note, NoteId},
    storage::Persistence,
};

/// What a call to [`NoteStore::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Added(usize),
    Updated(usize),
    /// Blank text; nothing changed and nothing was written.
    Ignored,
}

pub struct NoteStore<P: Persistence> {
    notes: Vec<Note>,
    editing: Option<NoteId>,
    draft: String,
    storage: P,
}

impl<P: Persistence> NoteStore<P> {
    /// Reads the saved list once. Missing, unreadable or malformed data all
    /// give an empty list.
    pub fn load(storage: P) -> NoteStore<P> {
        let notes = match storage.read() {
            Ok(Some(bytes)) => match decode_notes(&bytes) {
                Ok(texts) => texts.into_iter().map(Note::new).collect(),
                Err(err) => {
                    log::warn!("discarding saved notes: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("could not read saved notes: {err}");
                Vec::new()
            }
        };
        log::info!("loaded {} note(s)", notes.len());

        NoteStore {
            notes,
            editing: None,
            draft: String::new(),
            storage,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Current position of the note being edited.
    pub fn editing_index(&self) -> Option<usize> {
        let id = self.editing?;
        self.position(id)
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() { "Update" } else { "Add" }
    }

    #[cfg(test)]
    pub fn storage(&self) -> &P {
        &self.storage
    }

    /// Adds `text` as a new note, or replaces the note being edited. The text
    /// is stored as typed; only the blank check trims it.
    pub fn submit(&mut self, text: &str) -> Result<Submitted> {
        if text.trim().is_empty() {
            log::debug!("ignoring blank submission");
            return Ok(Submitted::Ignored);
        }

        let outcome = match self.editing.take().and_then(|id| self.position(id)) {
            Some(index) => {
                self.notes[index].text = text.to_string();
                log::debug!("updated note {index}");
                Submitted::Updated(index)
            }
            None => {
                self.notes.push(Note::new(text));
                log::debug!("added note {}", self.notes.len() - 1);
                Submitted::Added(self.notes.len() - 1)
            }
        };
        self.draft.clear();
        self.persist()?;

        Ok(outcome)
    }

    pub fn submit_draft(&mut self) -> Result<Submitted> {
        let text = std::mem::take(&mut self.draft);
        let outcome = self.submit(&text);
        if matches!(outcome, Ok(Submitted::Ignored)) {
            self.draft = text;
        }
        outcome
    }

    pub fn begin_edit(&mut self, index: usize) -> Result<()> {
        let note = self.notes.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.notes.len(),
        })?;
        self.editing = Some(note.id);
        self.draft = note.text.clone();
        log::debug!("editing note {index}");

        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft.clear();
    }

    /// Removes the note at `index`. If it was being edited, edit mode ends
    /// and the draft is cleared; an edit of any other note carries on.
    pub fn delete(&mut self, index: usize) -> Result<Note> {
        if index >= self.notes.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.notes.len(),
            });
        }
        let removed = self.notes.remove(index);
        if self.editing == Some(removed.id) {
            self.cancel_edit();
        }
        log::debug!("deleted note {index}");
        self.persist()?;

        Ok(removed)
    }

    fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    fn persist(&mut self) -> Result<()> {
        let bytes = encode_notes(&self.notes)?;
        self.storage.write(&bytes).inspect_err(|err| {
            log::error!("failed to save notes: {err}");
        })
    }
}

/// Serializes the texts as a JSON array of strings.
pub fn encode_notes(notes: &[Note]) -> Result<Vec<u8>> {
    let texts: Vec<&str> = notes.iter().map(|n| n.text.as_str()).collect();
    Ok(serde_json::to_vec(&texts)?)
}

pub fn decode_notes(bytes: &[u8]) -> Result<Vec<String>> {
    Ok(serde_json::from_slice(bytes)?)
}
