use crate::disk::{CompoundFile, SearchStack};
use crate::stat::{StatFlag, StatInfo};
use crate::{DocfileError, DocfileErrorConvertible};
use alloc::rc::Rc;
use core::cell::RefCell;

/// Iterates over the children of a storage in name order.
pub struct Elements<E: DocfileErrorConvertible> {
    file: Rc<RefCell<CompoundFile<E>>>,
    storage: u32,
    stack: SearchStack,
}

impl<E: DocfileErrorConvertible> Elements<E> {
    pub(crate) fn new(
        file: Rc<RefCell<CompoundFile<E>>>,
        storage: u32,
    ) -> Result<Self, DocfileError<E>> {
        let mut elements = Self {
            file,
            storage,
            stack: SearchStack::new(),
        };

        elements.reset()?;

        return Ok(elements);
    }

    /// Starts over from the first child.
    pub fn reset(&mut self) -> Result<(), DocfileError<E>> {
        let mut file = self.file.borrow_mut();

        return self.stack.reset(&mut file, self.storage);
    }

    /// Steps over up to `count` children, returning how many there were.
    pub fn skip_entries(&mut self, count: usize) -> Result<usize, DocfileError<E>> {
        let mut file = self.file.borrow_mut();
        let mut skipped = 0;

        while skipped < count {
            match self.stack.next_entry(&mut file)? {
                Some(_) => skipped += 1,
                None => break,
            }
        }

        return Ok(skipped);
    }
}

impl<E: DocfileErrorConvertible> Clone for Elements<E> {
    fn clone(&self) -> Self {
        return Self {
            file: Rc::clone(&self.file),
            storage: self.storage,
            stack: self.stack.clone(),
        };
    }
}

impl<E: DocfileErrorConvertible> Iterator for Elements<E> {
    type Item = Result<StatInfo, DocfileError<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut file = self.file.borrow_mut();

        return match self.stack.next_entry(&mut file) {
            Ok(Some((_, entry))) => Some(Ok(StatInfo::from_entry(&entry, StatFlag::Default))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        };
    }
}
