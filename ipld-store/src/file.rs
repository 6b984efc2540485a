// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! `get_file`'s directory/leaf split (`§6`): a dag-pb node whose links all
//! carry a name is treated as a directory listing; everything else is a
//! file and opens through [`unixfs::FileReader`]. The DAG builder in this
//! workspace never names a link (it only ever builds file trees), so this
//! is scaffolding for directory-shaped nodes produced elsewhere, not a path
//! this store's own `add_file` exercises yet.

use dagcid::Cid;
use unixfs::FileReader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub cid: Cid,
}

pub enum FileHandle {
    File(FileReader),
    Directory(Vec<DirEntry>),
}
