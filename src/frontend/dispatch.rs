//! File type classification for dropped and command-line files

use std::path::Path;

/// What a file is, judged by its complete suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.mbs` project file
    Project,
    /// `.csv` recorded data
    DataFile,
    /// `.mbc` register definitions
    RegisterDefinitions,
}

impl FileKind {
    /// Classify by the lowercase complete suffix: everything after the first
    /// dot of the file name. `log.backup.csv` therefore is not a data file.
    pub fn classify(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (_, suffix) = name.split_once('.')?;
        match suffix.to_lowercase().as_str() {
            "mbs" => Some(FileKind::Project),
            "csv" => Some(FileKind::DataFile),
            "mbc" => Some(FileKind::RegisterDefinitions),
            _ => None,
        }
    }
}
