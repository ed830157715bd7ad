use backstory_core::{RecordCollection, RecordSchema};
use backstory_storage::BackstoryStore;

use crate::error::EngineError;

/// Projects up to `array_size` entries of `store`, in iteration order, onto
/// schema `T`.
///
/// Iteration stops as soon as `array_size` records are collected, so asking
/// for a few examples does not walk the whole store. A store with fewer
/// entries yields a shorter collection.
pub fn build<T: RecordSchema, S: BackstoryStore>(
    array_size: usize,
    store: &S,
) -> Result<RecordCollection<T>, EngineError> {
    tracing::info!(element = T::ELEMENT_TAG, array_size, "building projection");

    let mut records = Vec::with_capacity(array_size);
    if array_size == 0 {
        return Ok(RecordCollection::new(records));
    }

    for (key, story) in store.entries() {
        let index = records.len();
        if index >= array_size {
            return Err(EngineError::BuildIndexOverrun {
                index,
                capacity: array_size,
            });
        }

        records.push(T::from_base(story.project(key)));
        if records.len() == array_size {
            break;
        }
    }

    tracing::info!(element = T::ELEMENT_TAG, loaded = records.len(), "projection built");
    Ok(RecordCollection::new(records))
}
