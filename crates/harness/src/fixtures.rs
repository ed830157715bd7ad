use backstory_core::{codec, BaseRecord, CoreError, OverrideField, OverrideRecord, RecordCollection};
use backstory_storage::{Backstory, BackstorySlot, MemoryStore, StorageError};

/// `(key, identifier, slot, title, title_female, description)`
const VANILLA: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("rancher", "ID1", "adulthood", "Rancher", "Rancher", "Raises animals"),
    ("urbworld_urchin", "UrbworldUrchin", "childhood", "Urbworld urchin", "Urbworld urchin", "Grew up in the undercity."),
    ("medieval_lord", "MedievalLord", "adulthood", "Lord", "Lady", "Ruled a small fief."),
    ("cave_child", "CaveChild", "childhood", "Cave child", "Cave child", "Raised in a cave system."),
    ("glitterworld_surgeon", "GlitterworldSurgeon", "adulthood", "Surgeon", "Surgeon", "Operated with glitterworld tools."),
    ("tribe_child", "TribeChild", "childhood", "Tribe child", "Tribe child", "Grew up in a tribe."),
    ("space_marine", "SpaceMarine", "adulthood", "Space marine", "Space marine", "Fought in orbit."),
    ("vatgrown_slave", "VatgrownSlave", "childhood", "Vatgrown slave", "Vatgrown slave", "Grown in a vat to work."),
    ("bartender", "Bartender", "adulthood", "Bartender", "Barmaid", "Served drinks on a rimworld."),
    ("farm_kid", "FarmKid", "childhood", "Farm kid", "Farm kid", "Worked the fields."),
    ("pirate_king", "PirateKing", "adulthood", "Pirate king", "Pirate queen", "Led a raiding band."),
    ("noble_ward", "NobleWard", "childhood", "Noble ward", "Noble ward", "Raised at court."),
    ("drifter", "Drifter", "adulthood", "Drifter", "Drifter", "Moved from place to place."),
];

/// Thirteen backstories, more than the default example count.
pub fn vanilla_store() -> Result<MemoryStore, StorageError> {
    VANILLA
        .iter()
        .map(|&(key, identifier, slot, title, title_female, desc)| -> Result<_, StorageError> {
            let mut story = Backstory::new(identifier, BackstorySlot::parse(slot)?, title, desc);
            story.set_title(title, title_female);
            story.set_title_short(short(title), short(title_female));
            Ok((key.to_string(), story))
        })
        .collect()
}

pub fn numbered_store(n: usize) -> MemoryStore {
    (0..n)
        .map(|i| {
            let story = Backstory::new(
                &format!("ID{i}"),
                BackstorySlot::Adulthood,
                &format!("Title {i}"),
                &format!("Description {i}"),
            );
            (format!("key{i}"), story)
        })
        .collect()
}

fn short(title: &str) -> String {
    title.split_whitespace().last().unwrap_or(title).to_string()
}

/// One edit: the record's key and identifier plus the replacements to set.
pub struct Edit<'a> {
    pub key: &'a str,
    pub identifier: &'a str,
    pub replacements: &'a [(OverrideField, &'a str)],
}

impl Edit<'_> {
    pub fn to_record(&self) -> OverrideRecord {
        let mut record = OverrideRecord::new(BaseRecord {
            key: self.key.to_string(),
            identifier: self.identifier.to_string(),
            ..BaseRecord::default()
        });
        for (field, value) in self.replacements {
            record.set_replacement(*field, Some(value.to_string()));
        }
        record
    }
}

/// XML for an edit file. `declared_count` overrides the count element.
pub fn edit_file(edits: &[Edit<'_>], declared_count: Option<usize>) -> Result<String, CoreError> {
    let records: Vec<OverrideRecord> = edits.iter().map(Edit::to_record).collect();
    let count = declared_count.unwrap_or(records.len());
    codec::encode(&RecordCollection::with_declared_count(count, records))
}
