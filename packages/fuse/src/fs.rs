//! `fuser::Filesystem` implementation over the namespace resolver.

use std::ffi::OsStr;
use std::time::{Duration, SystemTime};

use libc::c_int;

use searchfs_core::{Error, NodeAttr, NodeKind, Resolver};

use crate::inode::{InodeTable, ROOT_INODE};

/// Cached values never change for the life of the mount, so a short kernel
/// TTL is purely about keeping dentry churn down.
const TTL: Duration = Duration::from_secs(1);

pub struct SearchFs {
    resolver: Resolver,
    inodes: InodeTable,
}

impl SearchFs {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            inodes: InodeTable::new(),
        }
    }

    fn attr_for(inode: u64, node: NodeAttr) -> fuser::FileAttr {
        let now = SystemTime::now();
        let (kind, perm, size) = match node {
            NodeAttr::Directory => (fuser::FileType::Directory, 0o555, 0),
            NodeAttr::File { size } => (fuser::FileType::RegularFile, 0o444, size),
        };
        fuser::FileAttr {
            ino: inode,
            size,
            blocks: size.div_ceil(512),
            atime: now,
            mtime: now,
            ctime: now,
            crtime: now,
            kind,
            perm,
            nlink: 1,
            uid: 0,
            gid: 0,
            rdev: 0,
            flags: 0,
            blksize: 512,
        }
    }

    fn errno(path: &str, err: &Error) -> c_int {
        if err.is_not_found() {
            libc::ENOENT
        } else {
            log::warn!("resolution failed: path={path}, err={err}");
            libc::EIO
        }
    }

    fn resolve_path(&self, inode: u64) -> Option<String> {
        self.inodes.path_for(inode).map(str::to_string)
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Clamp a byte-range request to the cached document contents.
fn slice_range(len: usize, offset: i64, size: u32) -> (usize, usize) {
    let start = (offset.max(0) as usize).min(len);
    let end = start.saturating_add(size as usize).min(len);
    (start, end)
}

impl fuser::Filesystem for SearchFs {
    fn lookup(
        &mut self,
        _req: &fuser::Request<'_>,
        parent: u64,
        name: &OsStr,
        reply: fuser::ReplyEntry,
    ) {
        let Some(parent_path) = self.resolve_path(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let path = child_path(&parent_path, &name.to_string_lossy());
        match self.resolver.stat(&path) {
            Ok(node) => {
                let inode = self.inodes.get_or_insert(&path);
                reply.entry(&TTL, &Self::attr_for(inode, node), 0);
            }
            Err(err) => reply.error(Self::errno(&path, &err)),
        }
    }

    fn getattr(
        &mut self,
        _req: &fuser::Request<'_>,
        inode: u64,
        _fh: Option<u64>,
        reply: fuser::ReplyAttr,
    ) {
        let Some(path) = self.resolve_path(inode) else {
            reply.error(libc::ENOENT);
            return;
        };
        match self.resolver.stat(&path) {
            Ok(node) => reply.attr(&TTL, &Self::attr_for(inode, node)),
            Err(err) => reply.error(Self::errno(&path, &err)),
        }
    }

    fn readdir(
        &mut self,
        _req: &fuser::Request<'_>,
        inode: u64,
        _fh: u64,
        offset: i64,
        mut reply: fuser::ReplyDirectory,
    ) {
        let Some(path) = self.resolve_path(inode) else {
            reply.error(libc::ENOENT);
            return;
        };
        let entries = match self.resolver.read_dir(&path) {
            Ok(entries) => entries,
            Err(err) => {
                reply.error(Self::errno(&path, &err));
                return;
            }
        };

        let parent_inode = self
            .inodes
            .inode_for(parent_path(&path))
            .unwrap_or(ROOT_INODE);
        let mut listing = Vec::with_capacity(entries.len() + 2);
        listing.push((inode, fuser::FileType::Directory, ".".to_string()));
        listing.push((parent_inode, fuser::FileType::Directory, "..".to_string()));
        for entry in entries {
            let entry_inode = self.inodes.get_or_insert(&child_path(&path, &entry.name));
            let file_type = match entry.kind {
                NodeKind::Directory => fuser::FileType::Directory,
                NodeKind::File => fuser::FileType::RegularFile,
            };
            listing.push((entry_inode, file_type, entry.name));
        }

        let start = offset.max(0) as usize;
        for (idx, (entry_inode, file_type, name)) in listing.into_iter().enumerate().skip(start) {
            if reply.add(entry_inode, (idx + 1) as i64, file_type, name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(
        &mut self,
        _req: &fuser::Request<'_>,
        inode: u64,
        flags: i32,
        reply: fuser::ReplyOpen,
    ) {
        let Some(path) = self.resolve_path(inode) else {
            reply.error(libc::ENOENT);
            return;
        };
        let node = match self.resolver.stat(&path) {
            Ok(node) => node,
            Err(err) => {
                reply.error(Self::errno(&path, &err));
                return;
            }
        };
        if node.kind() == NodeKind::Directory {
            reply.error(libc::EISDIR);
            return;
        }
        if flags & libc::O_ACCMODE != libc::O_RDONLY {
            reply.error(libc::EROFS);
            return;
        }
        reply.opened(0, 0);
    }

    fn read(
        &mut self,
        _req: &fuser::Request<'_>,
        inode: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: fuser::ReplyData,
    ) {
        let Some(path) = self.resolve_path(inode) else {
            reply.error(libc::ENOENT);
            return;
        };
        match self.resolver.read(&path) {
            Ok(data) => {
                let (start, end) = slice_range(data.len(), offset, size);
                reply.data(&data[start..end]);
            }
            Err(err) => reply.error(Self::errno(&path, &err)),
        }
    }
}
