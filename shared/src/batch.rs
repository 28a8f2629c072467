use std::collections::BTreeMap;

use derive_more::{Display, From};

use crate::FileRecord;
use crate::progress::{Tick, next_percent};

/// Identifier issued by a [`Batch`] for each admitted file.
///
/// Two files with the same name get different ids, so their progress
/// entries never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct FileId(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("Index {index} out of range for batch of {len} files")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Listener<P> = Box<dyn FnMut(&[FileRecord<P>])>;

/// Ordered set of admitted files plus their progress.
///
/// Every mutation notifies the listener with the full current sequence.
/// The batch does not enforce `max_files`; callers admit files through
/// [`crate::admission`] first.
pub struct Batch<P> {
    ids: Vec<FileId>,
    files: Vec<FileRecord<P>>,
    progress: BTreeMap<FileId, u8>,
    next_id: u64,
    listener: Option<Listener<P>>,
}

impl<P> Default for Batch<P> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            files: Vec::new(),
            progress: BTreeMap::new(),
            next_id: 0,
            listener: None,
        }
    }
}

impl<P> Batch<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(listener: impl FnMut(&[FileRecord<P>]) + 'static) -> Self {
        let mut batch = Self::new();
        batch.set_listener(listener);
        batch
    }

    pub fn set_listener(&mut self, listener: impl FnMut(&[FileRecord<P>]) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Append files in arrival order. Returns the ids issued to them.
    pub fn add(&mut self, files: Vec<FileRecord<P>>) -> Vec<FileId> {
        let mut issued = Vec::with_capacity(files.len());
        for file in files {
            let id = FileId(self.next_id);
            self.next_id += 1;
            self.ids.push(id);
            self.files.push(file);
            self.progress.insert(id, 0);
            issued.push(id);
        }
        self.notify();
        issued
    }

    pub fn remove_at(&mut self, index: usize) -> Result<(FileId, FileRecord<P>), BatchError> {
        if index >= self.files.len() {
            return Err(BatchError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }

        let id = self.ids.remove(index);
        let file = self.files.remove(index);
        self.progress.remove(&id);
        self.notify();
        Ok((id, file))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.files.clear();
        self.progress.clear();
        self.notify();
    }

    /// Apply one ticker step. `None` when the file is no longer in the batch.
    pub fn advance_progress(&mut self, id: FileId, step: u8) -> Option<Tick> {
        let percent = self.progress.get_mut(&id)?;
        let tick = next_percent(*percent, step);
        *percent = tick.percent();
        Some(tick)
    }

    pub fn progress(&self, id: FileId) -> Option<u8> {
        self.progress.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn first(&self) -> Option<&FileRecord<P>> {
        self.files.first()
    }

    pub fn records(&self) -> &[FileRecord<P>] {
        &self.files
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileRecord<P>)> {
        self.ids.iter().copied().zip(self.files.iter())
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.files);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn file(name: &str) -> FileRecord<()> {
        FileRecord::new(name, 1024, "image/png", ())
    }

    fn names(batch: &Batch<()>) -> Vec<String> {
        batch.records().iter().map(|f| f.name.clone()).collect()
    }

    fn recorded() -> (Rc<RefCell<Vec<Vec<String>>>>, Batch<()>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let batch = Batch::with_listener(move |files: &[FileRecord<()>]| {
            sink.borrow_mut()
                .push(files.iter().map(|f| f.name.clone()).collect());
        });
        (seen, batch)
    }

    #[test]
    fn add_appends_across_drops_and_notifies() {
        let (seen, mut batch) = recorded();
        batch.add(vec![file("a"), file("b")]);
        batch.add(vec![file("c")]);

        assert_eq!(names(&batch), vec!["a", "b", "c"]);
        assert_eq!(
            *seen.borrow(),
            vec![vec!["a", "b"], vec!["a", "b", "c"]]
        );
    }

    #[test]
    fn new_files_start_at_zero_progress() {
        let mut batch = Batch::new();
        let ids = batch.add(vec![file("a")]);
        assert_eq!(batch.progress(ids[0]), Some(0));
    }

    #[test]
    fn remove_preserves_order_and_drops_progress() {
        let (seen, mut batch) = recorded();
        let ids = batch.add(vec![file("a"), file("b"), file("c")]);

        let (removed_id, removed) = batch.remove_at(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(removed_id, ids[1]);
        assert_eq!(names(&batch), vec!["a", "c"]);
        assert_eq!(batch.progress(ids[1]), None);
        assert_eq!(batch.progress(ids[2]), Some(0));
        assert_eq!(seen.borrow().last().unwrap(), &vec!["a", "c"]);
    }

    #[test]
    fn out_of_range_remove_is_an_error() {
        let (seen, mut batch) = recorded();
        batch.add(vec![file("a")]);

        let err = batch.remove_at(1).unwrap_err();
        assert_eq!(err, BatchError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(batch.len(), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn clear_empties_files_and_progress() {
        let (seen, mut batch) = recorded();
        let ids = batch.add(vec![file("a"), file("b")]);
        batch.advance_progress(ids[0], 10);

        batch.clear();
        assert!(batch.is_empty());
        assert!(ids.iter().all(|id| batch.progress(*id).is_none()));
        assert_eq!(seen.borrow().last().unwrap(), &Vec::<String>::new());
    }

    #[test]
    fn same_name_twice_keeps_separate_progress() {
        let mut batch = Batch::new();
        let first = batch.add(vec![file("scan.pdf")])[0];
        let second = batch.add(vec![file("scan.pdf")])[0];
        assert_ne!(first, second);

        batch.advance_progress(first, 12);
        assert_eq!(batch.progress(first), Some(12));
        assert_eq!(batch.progress(second), Some(0));

        batch.remove_at(0).unwrap();
        assert_eq!(batch.progress(first), None);
        assert_eq!(batch.progress(second), Some(0));
    }

    #[test]
    fn tick_after_removal_is_a_no_op() {
        let mut batch = Batch::new();
        let id = batch.add(vec![file("a")])[0];
        batch.remove_at(0).unwrap();

        assert_eq!(batch.advance_progress(id, 10), None);
        assert_eq!(batch.progress(id), None);
    }

    #[test]
    fn completed_entries_stay_at_one_hundred() {
        let mut batch = Batch::new();
        let id = batch.add(vec![file("a")])[0];
        let mut last = Tick::Advanced(0);
        while last != Tick::Complete {
            last = batch.advance_progress(id, 14).unwrap();
        }
        assert_eq!(batch.progress(id), Some(100));
        assert_eq!(batch.advance_progress(id, 5), Some(Tick::Complete));
    }

    #[test]
    fn ids_are_never_reused_after_clear() {
        let mut batch = Batch::new();
        let before = batch.add(vec![file("a")])[0];
        batch.clear();
        let after = batch.add(vec![file("a")])[0];
        assert_ne!(before, after);
    }

    #[test]
    fn first_is_the_earliest_arrival() {
        let mut batch = Batch::new();
        assert!(batch.first().is_none());
        batch.add(vec![file("a"), file("b")]);
        assert_eq!(batch.first().unwrap().name, "a");
    }
}
