use backstory_core::BaseRecord;

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackstorySlot {
    Childhood,
    Adulthood,
}

impl BackstorySlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Childhood => "childhood",
            Self::Adulthood => "adulthood",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StorageError> {
        match s {
            "childhood" => Ok(Self::Childhood),
            "adulthood" => Ok(Self::Adulthood),
            _ => Err(StorageError::InvalidValue(format!("unknown backstory slot: {s}"))),
        }
    }
}

/// A full backstory as the host game holds it.
///
/// Titles come in male/female pairs and are only written as pairs, through
/// [`Backstory::set_title`] and [`Backstory::set_title_short`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backstory {
    pub identifier: String,
    pub slot: BackstorySlot,
    title: String,
    title_female: String,
    title_short: String,
    title_short_female: String,
    pub base_desc: String,
    pub spawn_categories: Vec<String>,
    pub skill_gains: Vec<(String, i32)>,
    pub shuffleable: bool,
}

impl Backstory {
    /// A backstory whose female and short titles all start as `title`.
    pub fn new(identifier: &str, slot: BackstorySlot, title: &str, base_desc: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            slot,
            title: title.to_string(),
            title_female: title.to_string(),
            title_short: title.to_string(),
            title_short_female: title.to_string(),
            base_desc: base_desc.to_string(),
            spawn_categories: Vec::new(),
            skill_gains: Vec::new(),
            shuffleable: true,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_female(&self) -> &str {
        &self.title_female
    }

    pub fn title_short(&self) -> &str {
        &self.title_short
    }

    pub fn title_short_female(&self) -> &str {
        &self.title_short_female
    }

    pub fn set_title(&mut self, title: impl Into<String>, title_female: impl Into<String>) {
        self.title = title.into();
        self.title_female = title_female.into();
    }

    pub fn set_title_short(
        &mut self,
        title_short: impl Into<String>,
        title_short_female: impl Into<String>,
    ) {
        self.title_short = title_short.into();
        self.title_short_female = title_short_female.into();
    }

    /// Copies the seven fields the editor exposes.
    pub fn project(&self, key: &str) -> BaseRecord {
        BaseRecord {
            key: key.to_string(),
            identifier: self.identifier.clone(),
            title: self.title.clone(),
            title_female: self.title_female.clone(),
            title_short: self.title_short.clone(),
            title_short_female: self.title_short_female.clone(),
            base_desc: self.base_desc.clone(),
        }
    }
}

/// The authoritative backstory collection owned by the host.
pub trait BackstoryStore {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries as `(key, backstory)` in stable insertion order.
    fn entries(&self) -> impl Iterator<Item = (&str, &Backstory)>;

    fn get(&self, key: &str) -> Option<&Backstory>;

    fn get_by_identifier(&self, identifier: &str) -> Result<Option<Backstory>, StorageError>;

    /// Inserts `backstory` under `key`, replacing any existing entry.
    fn upsert(&mut self, key: &str, backstory: Backstory) -> Result<(), StorageError>;
}
