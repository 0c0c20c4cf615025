//! Snapshot file format: bincode-encoded nodes and edges inside a gzip stream

use crate::graph::{Edge, Node, NodeKey};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Unsupported snapshot version {0} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion(u32),

    #[error("Snapshot contains an edge to unknown node {0}")]
    DanglingEdge(NodeKey),

    #[error("Snapshot contains node {0} twice")]
    DuplicateNode(NodeKey),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Full contents of a snapshot file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Borrowed view written by [`Snapshot::write_to`]; encodes identically to [`Snapshot`]
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    nodes: &'a [Node],
    edges: &'a [Edge],
}

impl Snapshot {
    /// Read the snapshot at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read_from(path: &Path) -> SnapshotResult<Option<Snapshot>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let decoder = GzDecoder::new(BufReader::new(file));
        let snapshot: Snapshot = bincode::deserialize_from(decoder)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }

        info!(
            "Loaded snapshot {:?}: {} nodes, {} edges",
            path,
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(Some(snapshot))
    }

    /// Write `nodes` and `edges` to `path`, replacing any previous snapshot.
    ///
    /// The data goes to a sibling temp file first, which is then renamed over
    /// the target.
    pub fn write_to(path: &Path, nodes: &[Node], edges: &[Edge]) -> SnapshotResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = temp_path(path);
        let view = SnapshotRef {
            version: SNAPSHOT_VERSION,
            nodes,
            edges,
        };

        let written = write_compressed(&tmp_path, &view)
            .and_then(|()| fs::rename(&tmp_path, path).map_err(SnapshotError::from));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!("Failed to remove partial snapshot {:?}: {}", tmp_path, cleanup);
            }
            return Err(e);
        }

        debug!("Wrote snapshot {:?} via {:?}", path, tmp_path);
        Ok(())
    }
}

fn write_compressed(tmp_path: &Path, view: &SnapshotRef<'_>) -> SnapshotResult<()> {
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(tmp_path)?), Compression::default());
    bincode::serialize_into(&mut encoder, view)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
