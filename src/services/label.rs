use crate::models::ImageRecord;
use crate::services::ordering::Key;

pub const DEFAULT_MAX_LABEL_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelEditOutcome {
    Pending,
    Committed(Vec<ImageRecord>),
    Cancelled,
}

/// Modal caption editor bound to a single record.
#[derive(Debug, Clone)]
pub struct LabelEditor {
    index: usize,
    url: String,
    draft: String,
    max_length: usize,
}

impl LabelEditor {
    /// Open the editor on `images[index]`, seeded with its current label.
    pub fn open(images: &[ImageRecord], index: usize, max_length: usize) -> Option<Self> {
        let record = images.get(index)?;
        let mut editor = Self {
            index,
            url: record.url.clone(),
            draft: String::new(),
            max_length,
        };
        editor.set_draft(&record.label);
        Some(editor)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft, keeping at most `max_length` characters.
    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.chars().take(self.max_length).collect();
    }

    pub fn remaining_chars(&self) -> usize {
        self.max_length.saturating_sub(self.draft.chars().count())
    }

    pub fn can_commit(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    /// Apply the trimmed draft to the bound record. Returns `None` when the
    /// draft is blank or the record is no longer where the editor left it.
    pub fn commit(&self, images: &[ImageRecord]) -> Option<Vec<ImageRecord>> {
        if !self.can_commit() {
            return None;
        }
        let index = self.resolve(images)?;
        let label = self.draft.trim().to_string();
        Some(
            images
                .iter()
                .enumerate()
                .map(|(idx, img)| {
                    if idx == index {
                        ImageRecord {
                            label: label.clone(),
                            ..img.clone()
                        }
                    } else {
                        img.clone()
                    }
                })
                .collect(),
        )
    }

    /// Enter commits, Escape cancels, everything else keeps the modal open.
    pub fn handle_key(&self, key: Key, images: &[ImageRecord]) -> LabelEditOutcome {
        match key {
            Key::Enter => match self.commit(images) {
                Some(updated) => LabelEditOutcome::Committed(updated),
                None => LabelEditOutcome::Pending,
            },
            Key::Escape => LabelEditOutcome::Cancelled,
            _ => LabelEditOutcome::Pending,
        }
    }

    // Reorders can shift the record after the modal opened.
    fn resolve(&self, images: &[ImageRecord]) -> Option<usize> {
        match images.get(self.index) {
            Some(img) if img.url == self.url => Some(self.index),
            _ => images.iter().position(|img| img.url == self.url),
        }
    }
}
