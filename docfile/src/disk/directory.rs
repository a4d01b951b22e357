use super::disk_blocks::{compare_names, DirEntry, EntryType, NO_ENTRY};
use super::{CompoundFile, StreamChain};
use crate::{DocfileError, DocfileErrorConvertible};
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Which link of a record points at another record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    Previous,
    Next,
    Child,
}

/// In-order walk over the sibling tree below a storage, driven by an explicit stack.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchStack {
    nodes: Vec<u32>,
}

impl SearchStack {
    pub fn new() -> Self {
        return Self { nodes: Vec::new() };
    }

    /// Restarts the walk at the first child of `storage`.
    pub fn reset<E: DocfileErrorConvertible>(
        &mut self,
        file: &mut CompoundFile<E>,
        storage: u32,
    ) -> Result<(), DocfileError<E>> {
        self.nodes.clear();

        if let Some(entry) = file.read_entry(storage)? {
            self.push(file, entry.child)?;
        }

        return Ok(());
    }

    /// Pushes `node` and every record down its chain of previous links.
    pub fn push<E: DocfileErrorConvertible>(
        &mut self,
        file: &mut CompoundFile<E>,
        node: u32,
    ) -> Result<(), DocfileError<E>> {
        let mut node = node;

        while node != NO_ENTRY {
            self.nodes.push(node);

            node = match file.read_entry(node)? {
                Some(entry) => entry.previous,
                None => return Err(DocfileError::CorruptedFile),
            };
        }

        return Ok(());
    }

    pub fn pop(&mut self) -> Option<u32> {
        return self.nodes.pop();
    }

    /// Pops the next record in order and queues its next-sibling subtree.
    pub fn next_entry<E: DocfileErrorConvertible>(
        &mut self,
        file: &mut CompoundFile<E>,
    ) -> Result<Option<(u32, DirEntry)>, DocfileError<E>> {
        let index = match self.pop() {
            Some(index) => index,
            None => return Ok(None),
        };

        let entry = file.entry(index)?;
        self.push(file, entry.next)?;

        return Ok(Some((index, entry)));
    }
}

impl<E: DocfileErrorConvertible> CompoundFile<E> {
    /// Looks up a child of `storage` by name.
    pub(crate) fn find_entry(
        &mut self,
        storage: u32,
        name: &[u16],
    ) -> Result<Option<(u32, DirEntry)>, DocfileError<E>> {
        let mut stack = SearchStack::new();
        stack.reset(self, storage)?;

        while let Some((index, entry)) = stack.next_entry(self)? {
            if compare_names(entry.name_units(), name) == Ordering::Equal {
                return Ok(Some((index, entry)));
            }
        }

        return Ok(None);
    }

    /// Finds the sibling below `storage` whose previous or next link points at `child`.
    fn find_parent_entry(
        &mut self,
        storage: u32,
        child: u32,
    ) -> Result<Option<(Relation, u32)>, DocfileError<E>> {
        let mut stack = SearchStack::new();
        stack.reset(self, storage)?;

        while let Some((index, entry)) = stack.next_entry(self)? {
            if entry.previous == child {
                return Ok(Some((Relation::Previous, index)));
            }

            if entry.next == child {
                return Ok(Some((Relation::Next, index)));
            }

            if entry.child == child {
                return Ok(Some((Relation::Child, index)));
            }
        }

        return Ok(None);
    }

    /// Links an already written record into the sibling tree of `storage`.
    /// Plain binary search tree insertion, no rebalancing.
    pub(crate) fn insert_entry(
        &mut self,
        storage: u32,
        new_index: u32,
        new_entry: &DirEntry,
    ) -> Result<(), DocfileError<E>> {
        let mut parent = self.entry(storage)?;

        if parent.child == NO_ENTRY {
            parent.child = new_index;
            return self.write_entry(storage, &parent);
        }

        let mut current_index = parent.child;
        let mut current = self.entry(current_index)?;

        loop {
            let order = compare_names(new_entry.name_units(), current.name_units());

            let next = if order == Ordering::Less {
                current.previous
            } else {
                current.next
            };

            if next == NO_ENTRY {
                if order == Ordering::Less {
                    current.previous = new_index;
                } else {
                    current.next = new_index;
                }

                return self.write_entry(current_index, &current);
            }

            current_index = next;
            current = self.entry(current_index)?;
        }
    }

    /// Removes the child `name` of `storage`, freeing everything it owns.
    /// A failure part way through leaves the records already deleted in place.
    pub(crate) fn destroy_entry(
        &mut self,
        storage: u32,
        name: &[u16],
    ) -> Result<(), DocfileError<E>> {
        let (index, entry) = match self.find_entry(storage, name)? {
            Some(found) => found,
            None => return Err(DocfileError::FileNotFound),
        };

        let (relation, parent) = if self.entry(storage)?.child == index {
            (Relation::Child, storage)
        } else {
            match self.find_parent_entry(storage, index)? {
                Some(found) => found,
                None => return Err(DocfileError::CorruptedFile),
            }
        };

        match entry.entry_type {
            EntryType::Storage => self.delete_storage_children(index)?,
            EntryType::Stream => self.truncate_stream(index)?,
            _ => (),
        }

        let mut deleted = self.entry(index)?;
        deleted.clear_name();
        self.write_entry(index, &deleted)?;

        return self.adjust_entry_chain(&entry, parent, relation);
    }

    fn delete_storage_children(&mut self, storage: u32) -> Result<(), DocfileError<E>> {
        let mut stack = SearchStack::new();

        loop {
            stack.reset(self, storage)?;

            let first = match stack.pop() {
                Some(index) => self.entry(index)?,
                None => return Ok(()),
            };

            self.destroy_entry(storage, first.name_units())?;
        }
    }

    fn truncate_stream(&mut self, index: u32) -> Result<(), DocfileError<E>> {
        let mut chain = StreamChain::open(self, index)?;
        chain.set_size(self, index, 0)?;
        self.set_shrunk_big_stream(index, false);

        return Ok(());
    }

    /// Points the link that referred to a deleted record at its previous sibling, or its next
    /// sibling if it had none. When both existed the next subtree is hung below the previous one.
    fn adjust_entry_chain(
        &mut self,
        deleted: &DirEntry,
        parent_index: u32,
        relation: Relation,
    ) -> Result<(), DocfileError<E>> {
        let mut parent = self.entry(parent_index)?;

        let replacement = if deleted.previous != NO_ENTRY {
            deleted.previous
        } else {
            deleted.next
        };

        match relation {
            Relation::Previous => parent.previous = replacement,
            Relation::Next => parent.next = replacement,
            Relation::Child => parent.child = replacement,
        }

        self.write_entry(parent_index, &parent)?;

        if deleted.previous != NO_ENTRY && deleted.next != NO_ENTRY {
            self.find_placeholder(deleted.next, deleted.previous)?;
        }

        return Ok(());
    }

    /// Follows next links from `store` and attaches `to_store` at the first empty one.
    fn find_placeholder(&mut self, to_store: u32, store: u32) -> Result<(), DocfileError<E>> {
        let mut index = store;
        let mut entry = self.entry(index)?;

        while entry.next != NO_ENTRY {
            index = entry.next;
            entry = self.entry(index)?;
        }

        entry.next = to_store;

        return self.write_entry(index, &entry);
    }
}
