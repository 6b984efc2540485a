// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The facade crate (`§6`): wires the block store, link system, chunker,
//! UnixFS DAG builder, selector engine, CAR v2 codec, prefetch pool and
//! schema registry behind one `Store` type matching the External
//! Interfaces surface.

pub mod config;
mod error;
mod file;

pub use config::{KvBackend, StoreConfig};
pub use error::Error;
pub use file::{DirEntry, FileHandle};
pub use prefetch::CancellationToken;

use blockstore::{BlockStore, Filestore};
use car::{export_car_v2 as car_export, import_car_v2 as car_import};
use chunker::{Chunker, FixedSizeChunker, RabinChunker};
use dagcid::{Cid, LinkPrototype};
use dagipld::selector::{walk_matching, Progress, Selector, VisitReason};
use dagipld::Ipld;
use kvstore::{KvStore, MemoryKvStore};
use linksystem::LinkSystem;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use unixfs::{register_dag_pb, DagBuilder, DagBuilderConfig, FileReader};

/// Initializes `tracing-subscriber` from the `RUST_LOG` environment
/// variable, the way the teacher's binaries do at startup (`§1.2`). Safe to
/// call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// The result of `Store::classify`: whether a CID names a directory
/// listing or a file, without having opened either yet.
enum NodeKind {
    Directory(Vec<DirEntry>),
    File,
}

/// The store: owns the link system, the optional filestore, and the schema
/// registry, and exposes `§6`'s external interface over them.
pub struct Store<K: KvStore> {
    link_system: Arc<LinkSystem<K>>,
    filestore: Option<Filestore<K>>,
    schema_registry: schema::Registry,
    config: StoreConfig,
}

impl Store<MemoryKvStore> {
    /// Opens a store over the in-memory backend named by
    /// `config.kv_backend`. Currently the only backend this crate wires up
    /// (`§1.3`).
    pub fn open(config: StoreConfig) -> Result<Self, Error> {
        let kv = Arc::new(MemoryKvStore::new());
        let blockstore = BlockStore::new(kv.clone());
        let link_system = Arc::new(LinkSystem::new(blockstore));
        register_dag_pb(&link_system);

        let filestore = config
            .filestore_root
            .as_ref()
            .map(|root| Filestore::new(root.clone(), kv.clone()));

        let schema_registry = schema::Registry::new();
        if let Some(root) = &config.schema_root {
            let loaded = schema_registry.load_dir(root)?;
            tracing::info!(count = loaded, "loaded schema definitions");
        }

        Ok(Self {
            link_system,
            filestore,
            schema_registry,
            config,
        })
    }
}

impl<K: KvStore + 'static> Store<K> {
    fn dag_builder(&self) -> DagBuilder<'_, K> {
        DagBuilder::new(
            &self.link_system,
            DagBuilderConfig {
                max_links: self.config.max_links,
                layout: self.config.layout,
            },
        )
    }

    /// `put_node(node) -> cid`.
    pub fn put_node(&self, node: &Ipld) -> Result<Cid, Error> {
        Ok(self.link_system.store(&LinkPrototype::default_dag_cbor(), node)?)
    }

    /// `get_node(cid) -> node`. Falls back to the Filestore for raw-codec
    /// CIDs the block store doesn't hold — a no-copy-ingested leaf that
    /// collapsed straight to its own CID (`DagBuilder::build_tree`'s
    /// single-leaf case) is never `put` into the block store at all.
    pub fn get_node(&self, cid: &Cid) -> Result<Ipld, Error> {
        match self.link_system.load(cid) {
            Ok(node) => Ok(node),
            Err(linksystem::Error::BlockStore(blockstore::Error::NotFound(_))) => {
                Ok(Ipld::Bytes(self.read_filestore_leaf(cid)?))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reads a raw-codec leaf's bytes from the Filestore, re-raising the
    /// original not-found error if there is no filestore configured or the
    /// CID isn't one of its positional records.
    fn read_filestore_leaf(&self, cid: &Cid) -> Result<Vec<u8>, Error> {
        match &self.filestore {
            Some(fs) => Ok(fs.get(cid)?),
            None => Err(Error::BlockStore(blockstore::Error::NotFound(*cid))),
        }
    }

    /// `put_file(reader, use_content_defined_chunking) -> cid`.
    pub fn put_file(
        &self,
        reader: impl Read,
        use_content_defined_chunking: bool,
    ) -> Result<Cid, Error> {
        let leaves = if use_content_defined_chunking {
            self.chunk_and_store(RabinChunker::with_avg_size(reader, self.config.chunk_size))?
        } else {
            self.chunk_and_store(FixedSizeChunker::with_chunk_size(reader, self.config.chunk_size))?
        };
        Ok(self.dag_builder().build_tree(leaves)?)
    }

    fn chunk_and_store(
        &self,
        chunker: impl Chunker,
    ) -> Result<Vec<(Cid, u64)>, Error> {
        let mut leaves = Vec::new();
        for chunk in chunker {
            let bytes = chunk?;
            leaves.push(unixfs::store_leaf(&self.link_system, &bytes)?);
        }
        Ok(leaves)
    }

    /// `add_file(path) -> cid`. Uses the Filestore for no-copy ingestion
    /// when `config.filestore_root` names a root this path is under.
    pub fn add_file(&self, path: &Path) -> Result<Cid, Error> {
        let file = File::open(path)?;
        let Some(filestore) = &self.filestore else {
            return self.put_file(file, false);
        };

        let relative_path = path.strip_prefix(&self.config.filestore_root.as_ref().unwrap())
            .unwrap_or(path);

        let mut chunker = FixedSizeChunker::with_chunk_size(file, self.config.chunk_size);
        let mut leaves = Vec::new();
        let mut offset = 0u64;
        while let Some(chunk) = chunker.next() {
            let bytes = chunk?;
            let len = bytes.len() as u64;
            leaves.push(unixfs::store_leaf_no_copy(filestore, &bytes, relative_path, offset)?);
            offset += len;
        }
        Ok(self.dag_builder().build_tree(leaves)?)
    }

    /// `get_reader(cid) -> seekable byte reader`. Fails with `NotADirectory`
    /// if `cid` names a directory listing rather than a file (see
    /// `classify`'s directory heuristic) — callers wanting a directory
    /// should use `get_file` instead.
    pub fn get_reader(&self, cid: &Cid) -> Result<FileReader, Error> {
        if let NodeKind::Directory(_) = self.classify(cid)? {
            return Err(Error::NotADirectory(*cid));
        }
        Ok(FileReader::open(&self.link_system, self.filestore.as_ref(), cid)?)
    }

    /// `get_file(cid) -> file-handle`: a directory node (every top-level
    /// link named) becomes a directory listing, everything else opens as a
    /// file.
    pub fn get_file(&self, cid: &Cid) -> Result<FileHandle, Error> {
        match self.classify(cid)? {
            NodeKind::Directory(entries) => Ok(FileHandle::Directory(entries)),
            NodeKind::File => Ok(FileHandle::File(FileReader::open(
                &self.link_system,
                self.filestore.as_ref(),
                cid,
            )?)),
        }
    }

    /// Classifies `cid` as a directory listing or a file, without opening
    /// either — the single place `get_reader` and `get_file` share, so
    /// neither ever calls back into the other. Raw-codec CIDs are always a
    /// file (a directory is only ever a dag-pb node whose links are all
    /// named); only dag-pb nodes need to be loaded and inspected.
    fn classify(&self, cid: &Cid) -> Result<NodeKind, Error> {
        let (codec, _hash) = dagcid::codec_and_hash_of(cid)?;
        if codec != dagcid::Codec::DagPb {
            return Ok(NodeKind::File);
        }
        let ipld = self.link_system.load(cid)?;
        if let Ok(node) = unixfs::pb::node_from_ipld(&ipld) {
            if !node.links.is_empty() && node.links.iter().all(|l| l.name.is_some()) {
                let entries = node
                    .links
                    .into_iter()
                    .map(|l| DirEntry {
                        name: l.name.unwrap(),
                        cid: l.hash,
                    })
                    .collect();
                return Ok(NodeKind::Directory(entries));
            }
        }
        Ok(NodeKind::File)
    }

    /// `view(cid, callback)`.
    pub fn view<R>(&self, cid: &Cid, f: impl FnOnce(&[u8]) -> R) -> Result<R, Error> {
        Ok(self.link_system.blockstore().view(cid, f)?)
    }

    /// `walk(root, visit)`: drives `selector` from `root`, calling `visit`
    /// for every matched node. `progress.last_block.link` is absent for the
    /// root itself, since it was loaded externally rather than followed as
    /// a link (`§4.5`). A visitor error aborts the walk and is reported as
    /// `TraversalAborted`.
    pub fn walk<V>(&self, root: Cid, selector: &Selector, mut visit: V) -> Result<(), Error>
    where
        V: FnMut(&Progress, &Ipld, VisitReason) -> Result<(), Error> + Send,
    {
        let root_node = self.link_system.load(&root)?;
        let result = async_std::task::block_on(walk_matching(
            &*self.link_system,
            &root_node,
            selector,
            |progress, node, reason| {
                visit(progress, node, reason)
                    .map_err(|e| dagipld::Error::Custom(e.to_string()))
            },
        ));
        result.map_err(|e| Error::TraversalAborted(e.to_string()))
    }

    /// `subgraph(root, selector_node) -> [cid]`.
    pub fn subgraph(&self, root: Cid, selector: &Selector) -> Result<Vec<Cid>, Error> {
        Ok(prefetch::subgraph(&self.link_system, root, selector)?)
    }

    /// `prefetch(root, selector_node, workers)`.
    pub fn prefetch(
        &self,
        root: Cid,
        selector: &Selector,
        workers: usize,
        token: &CancellationToken,
    ) -> Result<(), Error> {
        prefetch::prefetch(self.link_system.clone(), root, selector, workers, token)
            .map_err(Error::from)
    }

    /// `export_car_v2(root, selector_node, writer)`.
    pub fn export_car_v2<W: Write + Seek>(
        &self,
        root: Cid,
        selector: &Selector,
        writer: &mut W,
        with_index: bool,
    ) -> Result<(), Error> {
        Ok(car_export(&self.link_system, root, selector, writer, with_index)?)
    }

    /// `import_car_v2(reader) -> [root_cid]`.
    pub fn import_car_v2<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<Cid>, Error> {
        Ok(car_import(&self.link_system, reader)?)
    }

    /// Validates `value` against the named schema, flattening
    /// `schema::Error::Validation`'s breadcrumb into the facade's own
    /// `SchemaValidationFailed` kind (`§7`).
    pub fn validate(&self, schema_id: &str, value: &Ipld) -> Result<(), Error> {
        self.schema_registry
            .validate(schema_id, value)
            .map_err(|e| match e {
                schema::Error::Validation { path, message } => {
                    Error::SchemaValidationFailed { path, message }
                }
                other => Error::Schema(other),
            })
    }

    /// `close()`. There is no persistent resource to flush in the default
    /// (in-memory) configuration; kept as an explicit lifecycle point for
    /// backends that do need one.
    pub fn close(self) -> Result<(), Error> {
        tracing::debug!("store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagipld::selector::RecursionLimit;
    use std::io::Cursor;

    fn explore_all() -> Selector {
        Selector::recursive(
            Selector::ExploreUnion(vec![
                Selector::Matcher,
                Selector::ExploreAll { next: Box::new(Selector::ExploreRecursiveEdge) },
            ]),
            RecursionLimit::None,
        )
    }

    #[test]
    fn put_file_small_input_collapses_to_one_leaf() {
        let store = Store::open(StoreConfig::default()).unwrap();
        let cid = store.put_file(Cursor::new(b"hello\n".to_vec()), false).unwrap();
        assert_eq!(cid.codec(), dagcid::Codec::RAW);

        let mut reader = store.get_reader(&cid).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello\n");
    }

    #[test]
    fn put_file_large_input_produces_a_parent_plus_three_leaves() {
        let store = Store::open(StoreConfig::default()).unwrap();
        let input = vec![b'A'; 700_000];
        let cid = store.put_file(Cursor::new(input.clone()), false).unwrap();

        let cids = store.subgraph(cid, &explore_all()).unwrap();
        assert_eq!(cids.len(), 4);
        assert_eq!(cids[0], cid);

        let mut reader = store.get_reader(&cid).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn put_node_then_get_node_round_trips() {
        let store = Store::open(StoreConfig::default()).unwrap();
        let mut map = std::collections::BTreeMap::new();
        map.insert("a".to_string(), Ipld::Integer(1));
        let node = Ipld::Map(map);

        let cid = store.put_node(&node).unwrap();
        assert_eq!(store.get_node(&cid).unwrap(), node);
    }

    #[test]
    fn export_then_import_round_trips_into_a_fresh_store() {
        let store = Store::open(StoreConfig::default()).unwrap();
        let cid = store.put_file(Cursor::new(b"car me\n".to_vec()), false).unwrap();

        let mut buf = Cursor::new(Vec::new());
        store.export_car_v2(cid, &Selector::Matcher, &mut buf, false).unwrap();

        let fresh = Store::open(StoreConfig::default()).unwrap();
        let mut import_cursor = Cursor::new(buf.into_inner());
        let roots = fresh.import_car_v2(&mut import_cursor).unwrap();
        assert_eq!(roots, vec![cid]);

        let mut reader = fresh.get_reader(&cid).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"car me\n");
    }

    #[test]
    fn walk_visitor_error_aborts_as_traversal_aborted() {
        let store = Store::open(StoreConfig::default()).unwrap();
        let cid = store.put_file(Cursor::new(b"abort me\n".to_vec()), false).unwrap();

        let result = store.walk(cid, &Selector::Matcher, |_progress, _node, _reason| {
            Err(Error::TraversalAborted("stop".to_string()))
        });
        assert!(matches!(result, Err(Error::TraversalAborted(_))));
    }

    #[test]
    fn get_reader_rejects_a_directory_node() {
        let store = Store::open(StoreConfig::default()).unwrap();
        let leaf_cid = store.put_file(Cursor::new(b"child\n".to_vec()), false).unwrap();

        let node = unixfs::pb::PbNode {
            data: None,
            links: vec![unixfs::pb::PbLink {
                hash: leaf_cid,
                name: Some("child".to_string()),
                tsize: Some(6),
            }],
        };
        let ipld = unixfs::pb::node_to_ipld(&node);
        let dir_cid = store
            .link_system
            .store(&LinkPrototype::dag_pb(), &ipld)
            .unwrap();

        match store.get_file(&dir_cid).unwrap() {
            FileHandle::Directory(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].name, "child");
                assert_eq!(entries[0].cid, leaf_cid);
            }
            FileHandle::File(_) => panic!("expected a directory handle"),
        }

        assert!(matches!(store.get_reader(&dir_cid), Err(Error::NotADirectory(_))));
    }

    #[test]
    fn add_file_no_copy_single_leaf_is_readable_every_way() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("small.bin");
        std::fs::write(&file_path, b"no-copy leaf\n").unwrap();

        let mut config = StoreConfig::default();
        config.filestore_root = Some(dir.path().to_path_buf());
        let store = Store::open(config).unwrap();

        let cid = store.add_file(&file_path).unwrap();
        assert_eq!(cid.codec(), dagcid::Codec::RAW);

        // The leaf collapsed straight to its own CID and was never put into
        // the block store — only `get_node`/`get_file`/`get_reader` falling
        // back to the Filestore can resolve it.
        assert!(matches!(
            store.link_system.blockstore().get(&cid),
            Err(blockstore::Error::NotFound(_))
        ));

        assert_eq!(store.get_node(&cid).unwrap(), Ipld::Bytes(b"no-copy leaf\n".to_vec()));

        let mut reader = store.get_reader(&cid).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"no-copy leaf\n");

        match store.get_file(&cid).unwrap() {
            FileHandle::File(mut reader) => {
                let mut out = Vec::new();
                reader.read_to_end(&mut out).unwrap();
                assert_eq!(out, b"no-copy leaf\n");
            }
            FileHandle::Directory(_) => panic!("expected a file handle"),
        }
    }

    #[test]
    fn schema_validation_failure_flattens_to_facade_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("post.yaml"),
            r#"
id: app.example.post
version: 1
name: Post
description: A post
status: active
schema:
  kind: struct
  fields:
    title:
      type: { kind: string }
"#,
        )
        .unwrap();

        let mut config = StoreConfig::default();
        config.schema_root = Some(dir.path().to_path_buf());
        let store = Store::open(config).unwrap();

        let err = store
            .validate("app.example.post", &Ipld::Map(Default::default()))
            .unwrap_err();
        assert!(matches!(err, Error::SchemaValidationFailed { .. }));
    }
}
