pub mod config;
pub mod error;
pub mod file_gate;
pub mod merge;
pub mod platform;
pub mod projection;

pub use config::EditorConfig;
pub use error::EngineError;
pub use file_gate::{file_present, read_if_present, write_if_absent, WriteOutcome};
pub use merge::{apply, AppliedEdit, MergeReport, SkipReason, SkippedEdit};
pub use platform::{resolve_data_dir, Platform};
pub use projection::build;

use std::path::{Path, PathBuf};

use backstory_core::{BaseRecord, OverrideRecord, RecordCollection, RecordSchema};
use backstory_storage::BackstoryStore;

#[derive(Debug)]
pub enum PhaseOutcome {
    /// A file was generated with this many records.
    Written { records: usize },
    /// An edit file was read and merged.
    Merged(MergeReport),
    /// Nothing to do; holds an informational error naming the file.
    Skipped(EngineError),
    Failed(EngineError),
}

impl PhaseOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of each phase of one startup run, in execution order.
#[derive(Debug)]
pub struct StartupReport {
    pub export: PhaseOutcome,
    pub example_export: PhaseOutcome,
    pub import: PhaseOutcome,
}

/// Exports backstories and imports replacements for one data directory.
pub struct Editor {
    config: EditorConfig,
    data_dir: PathBuf,
}

impl Editor {
    /// Resolves (and creates) the data directory. Fails with
    /// `UnsupportedPlatform` when no directory can be determined.
    pub fn new(config: EditorConfig) -> Result<Self, EngineError> {
        let data_dir = resolve_data_dir(&config)?;
        tracing::debug!(data_dir = %data_dir.display(), "editor data directory ready");
        Ok(Self { config, data_dir })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backstories_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.backstories_file)
    }

    pub fn replacements_example_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.replacements_example_file)
    }

    pub fn replacements_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.replacements_file)
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// Runs export, example export and import, in that order. A failing
    /// phase does not stop the ones after it.
    pub fn run<S: BackstoryStore>(&self, store: &mut S) -> StartupReport {
        let export = self.export(store);
        let example_export = self.export_examples(store);
        let import = self.import(store);
        StartupReport {
            export,
            example_export,
            import,
        }
    }

    /// Writes every backstory's editable fields to the backstories file.
    pub fn export<S: BackstoryStore>(&self, store: &S) -> PhaseOutcome {
        let path = self.backstories_path();
        settle("export", self.try_export::<BaseRecord, S>(store, store.len(), path, |_| {}))
    }

    /// Writes a few override records filled with placeholder text, showing
    /// the edit file layout.
    pub fn export_examples<S: BackstoryStore>(&self, store: &S) -> PhaseOutcome {
        let path = self.replacements_example_path();
        let count = self.config.example_count;
        settle(
            "example export",
            self.try_export::<OverrideRecord, S>(store, count, path, OverrideRecord::set_example_text),
        )
    }

    /// Reads the replacements file, if any, and merges it into `store`.
    pub fn import<S: BackstoryStore>(&self, store: &mut S) -> PhaseOutcome {
        settle("import", self.try_import(store))
    }

    fn try_export<T: RecordSchema, S: BackstoryStore>(
        &self,
        store: &S,
        array_size: usize,
        path: PathBuf,
        prepare: fn(&mut T),
    ) -> Result<PhaseOutcome, EngineError> {
        // Checked before building so an existing file skips the store walk.
        if file_present(&path) {
            tracing::info!(path = %path.display(), "already exists; delete to regenerate");
            return Ok(PhaseOutcome::Skipped(EngineError::FileAlreadyExists(path)));
        }

        let mut collection: RecordCollection<T> = build(array_size, store)?;
        collection.iter_mut().for_each(prepare);

        match write_if_absent(&collection, &path)? {
            WriteOutcome::Written => Ok(PhaseOutcome::Written {
                records: collection.count,
            }),
            WriteOutcome::AlreadyExists => {
                Ok(PhaseOutcome::Skipped(EngineError::FileAlreadyExists(path)))
            }
        }
    }

    fn try_import<S: BackstoryStore>(&self, store: &mut S) -> Result<PhaseOutcome, EngineError> {
        let path = self.replacements_path();
        let Some(edits) = read_if_present::<OverrideRecord>(&path)? else {
            return Ok(PhaseOutcome::Skipped(EngineError::FileMissing(path)));
        };
        let report = apply(&edits, store)?;
        Ok(PhaseOutcome::Merged(report))
    }
}

fn settle(phase: &'static str, result: Result<PhaseOutcome, EngineError>) -> PhaseOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::warn!(phase, %error, "phase failed");
            PhaseOutcome::Failed(error)
        }
    }
}

/// One-call entry point for hosts: resolve the data directory and run every
/// phase against `store`.
///
/// Returns an error only when the editor cannot start at all (unsupported
/// platform, unusable data directory). Per-phase problems are in the report.
pub fn run_startup<S: BackstoryStore>(
    config: EditorConfig,
    store: &mut S,
) -> Result<StartupReport, EngineError> {
    tracing::info!("backstory editor starting");
    let editor = match Editor::new(config) {
        Ok(editor) => editor,
        Err(error) => {
            tracing::warn!(%error, "backstory editor disabled");
            return Err(error);
        }
    };
    let report = editor.run(store);
    tracing::info!("backstory editor finished");
    Ok(report)
}
