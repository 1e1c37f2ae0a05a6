//! Inode ↔ path table for the FUSE adapter.
//!
//! FUSE addresses nodes by inode; the resolver addresses them by path. The
//! table hands out an inode the first time a path is seen and keeps the
//! mapping for the whole mount session - entries are never reclaimed, which
//! matches the populate-once namespace cache underneath.

use std::collections::HashMap;

pub const ROOT_INODE: u64 = 1;

/// Paths are stored resolver-style: `""` for the root, no leading slash.
pub struct InodeTable {
    by_inode: HashMap<u64, String>,
    by_path: HashMap<String, u64>,
    next: u64,
}

impl InodeTable {
    pub fn new() -> Self {
        let mut table = Self {
            by_inode: HashMap::new(),
            by_path: HashMap::new(),
            next: ROOT_INODE + 1,
        };
        table.by_inode.insert(ROOT_INODE, String::new());
        table.by_path.insert(String::new(), ROOT_INODE);
        table
    }

    /// The inode for `path`, allocating one on first sight.
    pub fn get_or_insert(&mut self, path: &str) -> u64 {
        if let Some(&inode) = self.by_path.get(path) {
            return inode;
        }
        let inode = self.next;
        self.next += 1;
        self.by_inode.insert(inode, path.to_string());
        self.by_path.insert(path.to_string(), inode);
        inode
    }

    pub fn path_for(&self, inode: u64) -> Option<&str> {
        self.by_inode.get(&inode).map(String::as_str)
    }

    pub fn inode_for(&self, path: &str) -> Option<u64> {
        self.by_path.get(path).copied()
    }
}
