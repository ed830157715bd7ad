use serde::Serialize;

/// The editable projection of one authoritative backstory.
///
/// `key` is the storage handle in the authoritative collection; `identifier`
/// is the lookup handle used to find the entry an edit applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRecord {
    pub key: String,
    pub identifier: String,
    pub title: String,
    pub title_female: String,
    pub title_short: String,
    pub title_short_female: String,
    pub base_desc: String,
}

/// The five text fields an edit file may replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideField {
    Title,
    TitleFemale,
    TitleShort,
    TitleShortFemale,
    Desc,
}

impl OverrideField {
    pub const ALL: [OverrideField; 5] = [
        Self::Title,
        Self::TitleFemale,
        Self::TitleShort,
        Self::TitleShortFemale,
        Self::Desc,
    ];

    /// Element name of the replacement value in an edit file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "replacementTitle",
            Self::TitleFemale => "replacementTitleFemale",
            Self::TitleShort => "replacementTitleShort",
            Self::TitleShortFemale => "replacementTitleShortFemale",
            Self::Desc => "replacementDesc",
        }
    }

    /// Element name of the original field this one replaces.
    pub fn original_name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::TitleFemale => "titleFemale",
            Self::TitleShort => "titleShort",
            Self::TitleShortFemale => "titleShortFemale",
            Self::Desc => "baseDesc",
        }
    }

    pub fn original<'a>(&self, base: &'a BaseRecord) -> &'a str {
        match self {
            Self::Title => &base.title,
            Self::TitleFemale => &base.title_female,
            Self::TitleShort => &base.title_short,
            Self::TitleShortFemale => &base.title_short_female,
            Self::Desc => &base.base_desc,
        }
    }

    pub fn original_mut<'a>(&self, base: &'a mut BaseRecord) -> &'a mut String {
        match self {
            Self::Title => &mut base.title,
            Self::TitleFemale => &mut base.title_female,
            Self::TitleShort => &mut base.title_short,
            Self::TitleShortFemale => &mut base.title_short_female,
            Self::Desc => &mut base.base_desc,
        }
    }

    /// Filler written into the example file so every element shows up.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Title => "Replacement Title",
            Self::TitleFemale => "Remove Unused Tags",
            Self::TitleShort => "Rplcmnt Ttl",
            Self::TitleShortFemale => "Rmv Unsd Tgs",
            Self::Desc => "Replacement Description",
        }
    }
}

/// A [`BaseRecord`] plus optional replacements for its five text fields.
/// An absent replacement means "keep the original".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideRecord {
    pub base: BaseRecord,
    pub replacement_title: Option<String>,
    pub replacement_title_female: Option<String>,
    pub replacement_title_short: Option<String>,
    pub replacement_title_short_female: Option<String>,
    pub replacement_desc: Option<String>,
}

impl OverrideRecord {
    pub fn new(base: BaseRecord) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.base.key
    }

    pub fn identifier(&self) -> &str {
        &self.base.identifier
    }

    pub fn replacement(&self, field: OverrideField) -> Option<&str> {
        let value = match field {
            OverrideField::Title => &self.replacement_title,
            OverrideField::TitleFemale => &self.replacement_title_female,
            OverrideField::TitleShort => &self.replacement_title_short,
            OverrideField::TitleShortFemale => &self.replacement_title_short_female,
            OverrideField::Desc => &self.replacement_desc,
        };
        value.as_deref()
    }

    pub fn set_replacement(&mut self, field: OverrideField, value: Option<String>) {
        let slot = match field {
            OverrideField::Title => &mut self.replacement_title,
            OverrideField::TitleFemale => &mut self.replacement_title_female,
            OverrideField::TitleShort => &mut self.replacement_title_short,
            OverrideField::TitleShortFemale => &mut self.replacement_title_short_female,
            OverrideField::Desc => &mut self.replacement_desc,
        };
        *slot = value;
    }

    /// The replacement when present, otherwise `original`.
    pub fn coalesce<'a>(&'a self, field: OverrideField, original: &'a str) -> &'a str {
        self.replacement(field).unwrap_or(original)
    }

    pub fn overridden_fields(&self) -> Vec<OverrideField> {
        OverrideField::ALL
            .into_iter()
            .filter(|field| self.replacement(*field).is_some())
            .collect()
    }

    /// Fills every replacement with placeholder text. Absent replacements
    /// are omitted from encoded output, so the example file needs these.
    pub fn set_example_text(&mut self) {
        for field in OverrideField::ALL {
            self.set_replacement(field, Some(field.placeholder().to_string()));
        }
    }
}
