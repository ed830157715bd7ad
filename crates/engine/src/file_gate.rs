use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use backstory_core::{codec, RecordCollection, RecordSchema};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    AlreadyExists,
}

/// Whether a regular file sits at `path`. Both the write and the read side
/// decide with this.
pub fn file_present(path: &Path) -> bool {
    path.is_file()
}

/// Writes `collection` to `path` unless a file is already there. Never
/// overwrites, so user edits to a generated file survive later runs.
pub fn write_if_absent<T: RecordSchema>(
    collection: &RecordCollection<T>,
    path: &Path,
) -> Result<WriteOutcome, EngineError> {
    if file_present(path) {
        tracing::info!(path = %path.display(), "already exists; delete to regenerate");
        return Ok(WriteOutcome::AlreadyExists);
    }

    // Encode before creating the file so a failure leaves nothing behind.
    let mut bytes = Vec::new();
    codec::encode_to_writer(collection, &mut bytes)?;

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && file_present(path) => {
            tracing::info!(path = %path.display(), "already exists; delete to regenerate");
            return Ok(WriteOutcome::AlreadyExists);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(path = %path.display(), count = collection.count, "creating file");
    file.write_all(&bytes)?;
    file.sync_all()?;
    Ok(WriteOutcome::Written)
}

/// Reads a collection of `T` from `path`, or `None` if there is no file.
pub fn read_if_present<T: RecordSchema>(
    path: &Path,
) -> Result<Option<RecordCollection<T>>, EngineError> {
    if !file_present(path) {
        tracing::info!(path = %path.display(), "did not exist; you must provide the file to read");
        return Ok(None);
    }

    tracing::info!(path = %path.display(), "reading file");
    let file = File::open(path)?;
    let collection = codec::decode_from_reader(file)?;
    Ok(Some(collection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use backstory_core::{BaseRecord, OverrideRecord};

    fn record(key: &str) -> BaseRecord {
        BaseRecord {
            key: key.into(),
            identifier: key.to_uppercase(),
            title: format!("{key} title"),
            ..BaseRecord::default()
        }
    }

    #[test]
    fn writes_then_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("backstories.xml");
        let collection = RecordCollection::new(vec![record("a"), record("b")]);

        assert_eq!(write_if_absent(&collection, &path).unwrap(), WriteOutcome::Written);
        let read: RecordCollection<BaseRecord> = read_if_present(&path).unwrap().unwrap();
        assert_eq!(read, collection);
    }

    #[test]
    fn second_write_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("backstories.xml");

        let first = RecordCollection::new(vec![record("a")]);
        write_if_absent(&first, &path).unwrap();
        let before = std::fs::read(&path).unwrap();

        let second = RecordCollection::new(vec![record("z"), record("y")]);
        assert_eq!(write_if_absent(&second, &path).unwrap(), WriteOutcome::AlreadyExists);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("replacements.xml");
        let read = read_if_present::<OverrideRecord>(&path).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn malformed_file_is_a_decode_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("replacements.xml");
        std::fs::write(&path, "<SerializableBackstoryArray><count>x</count>").unwrap();

        let result = read_if_present::<OverrideRecord>(&path);
        assert!(matches!(
            result,
            Err(EngineError::Core(backstory_core::CoreError::Decode(_)))
        ));
    }

    #[test]
    fn directory_at_path_is_not_an_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("backstories.xml");
        std::fs::create_dir(&path).unwrap();

        assert!(!file_present(&path));
        assert!(read_if_present::<BaseRecord>(&path).unwrap().is_none());

        let collection = RecordCollection::new(vec![record("a")]);
        let result = write_if_absent(&collection, &path);
        assert!(matches!(result, Err(EngineError::Io(_))), "got {result:?}");
        assert!(path.is_dir());
    }

    #[test]
    fn written_text_reads_back_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("replacements.xml");
        let mut edit = OverrideRecord::new(record("a"));
        edit.replacement_desc = Some("  indented\n\nparagraph  ".into());
        let collection = RecordCollection::new(vec![edit]);

        write_if_absent(&collection, &path).unwrap();
        let read: RecordCollection<OverrideRecord> = read_if_present(&path).unwrap().unwrap();
        assert_eq!(read, collection);
    }
}
