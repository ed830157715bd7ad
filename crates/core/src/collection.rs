/// The serialization envelope: a declared count plus the records it covers.
///
/// `count == records.len()` is expected but not enforced, since a decoded
/// edit file may disagree with itself. Check with [`is_consistent`].
///
/// [`is_consistent`]: RecordCollection::is_consistent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCollection<T> {
    pub count: usize,
    pub records: Vec<T>,
}

impl<T> Default for RecordCollection<T> {
    fn default() -> Self {
        Self {
            count: 0,
            records: Vec::new(),
        }
    }
}

impl<T> RecordCollection<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            count: records.len(),
            records,
        }
    }

    /// Builds a collection whose declared count is taken as given.
    pub fn with_declared_count(count: usize, records: Vec<T>) -> Self {
        Self { count, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_consistent(&self) -> bool {
        self.count == self.records.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }
}

impl<'a, T> IntoIterator for &'a RecordCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
