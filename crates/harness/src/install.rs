use std::path::{Path, PathBuf};

use backstory_engine::{Editor, EditorConfig, EngineError, StartupReport};
use backstory_storage::MemoryStore;
use tempfile::TempDir;

use crate::fixtures;

/// A game install in a temporary data directory, with its own store.
pub struct TestInstall {
    _dir: TempDir,
    pub editor: Editor,
    pub store: MemoryStore,
}

impl TestInstall {
    /// Install backed by the vanilla fixture store.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_store(fixtures::vanilla_store()?)
    }

    pub fn with_store(store: MemoryStore) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(store, |_| {})
    }

    /// Install whose config is adjusted by `configure` after the data
    /// directory is pinned.
    pub fn with_config(
        store: MemoryStore,
        configure: impl FnOnce(&mut EditorConfig),
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut config = EditorConfig::with_data_dir(dir.path().join("SimpleBackstoryEditor"));
        configure(&mut config);
        let editor = Editor::new(config)?;
        Ok(Self {
            _dir: dir,
            editor,
            store,
        })
    }

    pub fn data_dir(&self) -> &Path {
        self.editor.data_dir()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    /// Drops an edit file where the import phase looks for it.
    pub fn write_replacements(&self, xml: &str) -> std::io::Result<()> {
        std::fs::write(self.editor.replacements_path(), xml)
    }

    pub fn run(&mut self) -> StartupReport {
        self.editor.run(&mut self.store)
    }

    pub fn run_startup(&mut self) -> Result<StartupReport, EngineError> {
        backstory_engine::run_startup(self.editor.config().clone(), &mut self.store)
    }
}
