use crate::error::ValidationError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const CSV_MEDIA_TYPES: [&str; 3] = ["text/csv", "application/csv", "application/vnd.ms-excel"];

/// Mission survey a dataset was exported from. Each slot maps to one
/// multipart field on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MissionSlot {
    Koi,
    Toi,
    K2,
}

impl MissionSlot {
    pub fn all() -> [MissionSlot; 3] {
        [MissionSlot::Koi, MissionSlot::Toi, MissionSlot::K2]
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            MissionSlot::Koi => "koi_file",
            MissionSlot::Toi => "toi_file",
            MissionSlot::K2 => "k2_file",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MissionSlot::Koi => "Kepler (KOI) Data",
            MissionSlot::Toi => "TESS (TOI) Data",
            MissionSlot::K2 => "K2 Mission Data",
        }
    }
}

/// A user-chosen dataset, read into memory at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: None,
            bytes,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn is_csv(&self) -> bool {
        has_csv_extension(&self.name)
            || self
                .media_type
                .as_deref()
                .map(is_csv_media_type)
                .unwrap_or(false)
    }
}

fn has_csv_extension(name: &str) -> bool {
    name.trim().to_ascii_lowercase().ends_with(".csv")
}

fn is_csv_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    CSV_MEDIA_TYPES.contains(&essence.as_str())
}

/// Files chosen for the next analysis run, at most one per mission slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedFileSet {
    slots: BTreeMap<MissionSlot, SelectedFile>,
}

impl SelectedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `file` in `slot`, replacing any previous choice. Non-CSV files are
    /// rejected and the slot keeps its old value.
    pub fn select_file(&mut self, slot: MissionSlot, file: SelectedFile) -> Result<(), ValidationError> {
        if !file.is_csv() {
            return Err(ValidationError::NotCsv {
                file_name: file.name,
            });
        }
        log::debug!(
            "selected {} for {} ({} bytes)",
            file.name,
            slot.field_name(),
            file.bytes.len()
        );
        self.slots.insert(slot, file);
        Ok(())
    }

    /// Validate the file name, then read the file from disk into `slot`.
    pub fn select_path(&mut self, slot: MissionSlot, path: &Path) -> Result<(), ValidationError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if !has_csv_extension(&file_name) {
            return Err(ValidationError::NotCsv { file_name });
        }
        let bytes = fs::read(path).map_err(|err| ValidationError::Unreadable {
            file_name: file_name.clone(),
            reason: err.to_string(),
        })?;
        self.select_file(slot, SelectedFile::new(file_name, bytes).with_media_type("text/csv"))
    }

    pub fn clear_slot(&mut self, slot: MissionSlot) {
        self.slots.remove(&slot);
    }

    pub fn clear_selection(&mut self) {
        self.slots.clear();
    }

    pub fn get(&self, slot: MissionSlot) -> Option<&SelectedFile> {
        self.slots.get(&slot)
    }

    /// Populated slots in KOI, TOI, K2 order.
    pub fn populated(&self) -> impl Iterator<Item = (MissionSlot, &SelectedFile)> {
        self.slots.iter().map(|(slot, file)| (*slot, file))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn ensure_ready(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Err(ValidationError::NoFilesSelected)
        } else {
            Ok(())
        }
    }
}
