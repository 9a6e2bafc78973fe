use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lineage_core::{DOCUMENT_VERSION, FamilyTree, FamilyTreeDocument, PersonId, TreeMeta};

use crate::errors::GenerationError;
use crate::model::TreeConfig;

/// Metadata block describing how a tree was generated.
pub fn build_meta(
    config: &TreeConfig,
    tree: &FamilyTree,
    seed_parent_ids: Vec<PersonId>,
    root_cluster_child_ids: Vec<PersonId>,
) -> TreeMeta {
    TreeMeta {
        document_version: DOCUMENT_VERSION.to_string(),
        pcp: config.partner_probability,
        cd_mean: config.child_count.mean,
        cd_sd: config.child_count.std_dev,
        max_children: config.child_count.max,
        ftdl: config.tree_depth_limit,
        spdl: config.sibling_partner_depth_limit,
        seed: config.seed,
        seed_parent_ids,
        root_cluster_child_ids,
        total_people: tree.people.len() as u64,
        total_marriages: tree.marriages.len() as u64,
    }
}

/// Serialize a document as pretty JSON; returns bytes written.
pub fn write_document(path: &Path, document: &FamilyTreeDocument) -> Result<u64, GenerationError> {
    let writer = BufWriter::new(File::create(path)?);
    let mut counting = CountingWriter::new(writer);
    serde_json::to_writer_pretty(&mut counting, document)?;
    counting.write_all(b"\n")?;
    counting.flush()?;
    Ok(counting.bytes_written())
}

/// Render a document exactly as [`write_document`] would.
pub fn render_document(document: &FamilyTreeDocument) -> Result<Vec<u8>, GenerationError> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
