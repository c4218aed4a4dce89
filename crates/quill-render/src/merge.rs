//! # Document Merger
//!
//! Appends one PDF after another, page for page.
//!
//! ## Scratch Handling
//! ```text
//! first.pdf ──copy──┐
//!                   ├──► TempDir (.quill-merge-XXXX)
//! second.pdf ─copy──┘        │ load both, splice page trees, save
//!                            ▼
//!                       merged.pdf ──copy──► output
//!                            │
//!                   TempDir dropped on every exit path
//! ```
//!
//! Object ids of the second document are shifted past the first, every
//! page is re-parented under a single page tree root and the outline of
//! either input is dropped. Attributes a page inherited from its old
//! page-tree nodes (`MediaBox`, `Resources`, `CropBox`, `Rotate`) are
//! copied onto the page before it moves.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MergeError, MergeResult};

const SCRATCH_PREFIX: &str = ".quill-merge-";

/// Page attributes a page may take from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Guards the `Parent` walk against cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Merges PDFs through a private scratch directory.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    /// Parent of the scratch directory; the system temp dir when `None`.
    scratch_root: Option<PathBuf>,
}

impl Merger {
    pub fn new() -> Self {
        Merger::default()
    }

    /// Creates scratch directories under `root` instead of the system
    /// temp dir.
    pub fn with_scratch_root(root: impl Into<PathBuf>) -> Self {
        Merger {
            scratch_root: Some(root.into()),
        }
    }

    /// Writes `first` followed by `second` to `output` and returns the
    /// merged page count.
    pub fn merge(&self, first: &Path, second: &Path, output: &Path) -> MergeResult<usize> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix(SCRATCH_PREFIX);
            builder
        };
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(MergeError::Scratch)?;

        debug!(scratch = %scratch.path().display(), "Merge scratch directory created");

        let first_copy = scratch.path().join("first.pdf");
        let second_copy = scratch.path().join("second.pdf");
        let merged_path = scratch.path().join("merged.pdf");

        copy_input(first, &first_copy)?;
        copy_input(second, &second_copy)?;

        let documents = vec![
            (load(&first_copy, first)?, first),
            (load(&second_copy, second)?, second),
        ];
        let mut merged = splice(documents)?;
        let pages = merged.get_pages().len();

        let mut file = fs::File::create(&merged_path).map_err(MergeError::Write)?;
        merged
            .save_to(&mut file)
            .map_err(|e| MergeError::Write(io::Error::other(e.to_string())))?;
        drop(file);

        fs::copy(&merged_path, output).map_err(MergeError::Write)?;

        scratch.close().map_err(MergeError::Scratch)?;

        debug!(pages, output = %output.display(), "Documents merged");
        Ok(pages)
    }
}

/// Number of pages of the PDF at `path`.
pub fn page_count(path: &Path) -> MergeResult<usize> {
    Ok(load(path, path)?.get_pages().len())
}

fn copy_input(source: &Path, destination: &Path) -> MergeResult<()> {
    fs::copy(source, destination)
        .map(|_| ())
        .map_err(|source_err| MergeError::Unreadable {
            path: source.to_path_buf(),
            source: source_err,
        })
}

/// Loads `path`, reporting errors against `shown` (the caller's path).
fn load(path: &Path, shown: &Path) -> MergeResult<Document> {
    let bytes = fs::read(path).map_err(|source| MergeError::Unreadable {
        path: shown.to_path_buf(),
        source,
    })?;
    Document::load_mem(&bytes).map_err(|source| MergeError::Malformed {
        path: shown.to_path_buf(),
        source,
    })
}

/// `/Type` name of a dictionary object.
fn type_of(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

/// The page dictionary at `page_id` with every inheritable attribute it
/// lacks filled in from its ancestors. The nearest ancestor wins.
fn resolve_page(doc: &Document, page_id: ObjectId) -> lopdf::Result<Dictionary> {
    let mut page = doc.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let Some(node_id) = parent else { break };
        let node = doc.get_dictionary(node_id)?;
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

/// Combines the page trees of `documents` in order.
fn splice(documents: Vec<(Document, &Path)>) -> MergeResult<Document> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects = BTreeMap::new();

    for (mut doc, path) in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages is keyed by page number, so this keeps reading order.
        for page_id in doc.get_pages().into_values() {
            let page = resolve_page(&doc, page_id).map_err(|source| MergeError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
            pages.push((page_id, page));
        }
        objects.extend(doc.objects);
    }

    let mut document = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut root_id: Option<ObjectId> = None;

    for (object_id, object) in objects {
        match type_of(&object) {
            Some(b"Catalog") => {
                if catalog.is_none() {
                    if let Ok(dictionary) = object.as_dict() {
                        catalog = Some((object_id, dictionary.clone()));
                    }
                }
            }
            Some(b"Pages") => {
                root_id.get_or_insert(object_id);
            }
            // Re-inserted below with a new parent; outlines are dropped.
            Some(b"Page" | b"Outlines" | b"Outline") => {}
            _ => {
                document.objects.insert(object_id, object);
            }
        }
    }

    let root_id = root_id.ok_or(MergeError::MissingPageTree("page tree root"))?;
    let (catalog_id, mut catalog) = catalog.ok_or(MergeError::MissingPageTree("catalog"))?;

    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let count = pages.len() as i64;

    for (page_id, mut page) in pages {
        page.set("Parent", root_id);
        document.objects.insert(page_id, Object::Dictionary(page));
    }

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Pages".to_vec()));
    root.set("Count", count);
    root.set("Kids", kids);
    document.objects.insert(root_id, Object::Dictionary(root));

    catalog.set("Pages", root_id);
    catalog.remove(b"Outlines");
    document.objects.insert(catalog_id, Object::Dictionary(catalog));

    document.trailer.set("Root", catalog_id);
    document.max_id = document.objects.len() as u32;
    document.renumber_objects();
    document.compress();

    Ok(document)
}

// =============================================================================
// Unit Tests
// =============================================================================
