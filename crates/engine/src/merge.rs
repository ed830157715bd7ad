use backstory_core::{OverrideField, OverrideRecord, RecordCollection};
use backstory_storage::{Backstory, BackstoryStore};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No authoritative backstory carries the edit's identifier.
    UnknownIdentifier,
    /// The edit has no key to write back under.
    MissingKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEdit {
    pub key: String,
    pub identifier: String,
    /// Fields whose value came from the edit rather than the original.
    pub fields: Vec<OverrideField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEdit {
    pub key: String,
    pub identifier: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub applied: Vec<AppliedEdit>,
    pub skipped: Vec<SkippedEdit>,
}

/// Merges `edits` into `store`.
///
/// A declared count that disagrees with the number of records aborts the
/// whole merge before anything is written. Otherwise each edit is applied
/// independently: every replacement that is present wins, every absent one
/// keeps the authoritative value, and the result is upserted under the
/// edit's key.
pub fn apply<S: BackstoryStore>(
    edits: &RecordCollection<OverrideRecord>,
    store: &mut S,
) -> Result<MergeReport, EngineError> {
    if !edits.is_consistent() {
        tracing::warn!(
            declared = edits.count,
            actual = edits.len(),
            "replacement count mismatch; errors assumed, fix file and try again"
        );
        return Err(EngineError::CountMismatch {
            declared: edits.count,
            actual: edits.len(),
        });
    }

    tracing::info!(count = edits.count, "updating stories from replacements");
    let mut report = MergeReport::default();

    for edit in edits {
        if edit.key().is_empty() {
            tracing::warn!(identifier = edit.identifier(), "replacement has no key; skipping");
            report.skipped.push(skipped(edit, SkipReason::MissingKey));
            continue;
        }

        let Some(mut story) = store.get_by_identifier(edit.identifier())? else {
            tracing::warn!(
                key = edit.key(),
                identifier = edit.identifier(),
                "no backstory with identifier; skipping"
            );
            report.skipped.push(skipped(edit, SkipReason::UnknownIdentifier));
            continue;
        };

        reconcile(edit, &mut story);
        store.upsert(edit.key(), story)?;

        let fields = edit.overridden_fields();
        tracing::debug!(key = edit.key(), ?fields, "replacement applied");
        report.applied.push(AppliedEdit {
            key: edit.key().to_string(),
            identifier: edit.identifier().to_string(),
            fields,
        });
    }

    tracing::info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "replacements merged"
    );
    Ok(report)
}

/// Coalesces each replacement with the authoritative value. Titles are
/// written as male/female pairs.
fn reconcile(edit: &OverrideRecord, story: &mut Backstory) {
    story.base_desc = edit.coalesce(OverrideField::Desc, &story.base_desc).to_string();

    let title = edit.coalesce(OverrideField::Title, story.title()).to_string();
    let title_female = edit
        .coalesce(OverrideField::TitleFemale, story.title_female())
        .to_string();
    story.set_title(title, title_female);

    let title_short = edit
        .coalesce(OverrideField::TitleShort, story.title_short())
        .to_string();
    let title_short_female = edit
        .coalesce(OverrideField::TitleShortFemale, story.title_short_female())
        .to_string();
    story.set_title_short(title_short, title_short_female);
}

fn skipped(edit: &OverrideRecord, reason: SkipReason) -> SkippedEdit {
    SkippedEdit {
        key: edit.key().to_string(),
        identifier: edit.identifier().to_string(),
        reason,
    }
}
