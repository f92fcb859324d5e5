use std::fs;
use std::io;
use std::path::Path;

/// A user-chosen sample file. Contents are never inspected client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its media type from the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Holds the current selection; each selection replaces the previous file wholesale
#[derive(Debug, Default)]
pub struct SelectionStore {
    file: Option<InputFile>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_file(&mut self, file: InputFile) {
        self.file = Some(file);
    }

    pub fn current_file(&self) -> Option<&InputFile> {
        self.file.as_ref()
    }
}
