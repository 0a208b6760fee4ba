use std::path::{Path, PathBuf};
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{AppError, AppResult};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfProcessor;

#[derive(Debug)]
pub struct ExtractedPage {
    pub page_number: i64,
    pub content: Vec<u8>,
    pub processing_time_ms: u64,
}

impl ExtractedPage {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.content)
    }
}

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Counts pages on the blocking pool.
    pub async fn total_pages(&self, path: PathBuf) -> AppResult<usize> {
        let processor = *self;
        tokio::task::spawn_blocking(move || processor.page_count(&path)).await?
    }

    /// Extracts one page on the blocking pool.
    pub async fn extract(&self, path: PathBuf, page_number: i64) -> AppResult<ExtractedPage> {
        let processor = *self;
        tokio::task::spawn_blocking(move || processor.extract_page(&path, page_number)).await?
    }

    pub fn page_count(&self, path: &Path) -> AppResult<usize> {
        let doc = self.open(path)?;
        let pages = doc.get_pages().len();
        tracing::debug!(path = %path.display(), pages, "Counted PDF pages");
        Ok(pages)
    }

    /// Copies page `page_number` (1-based) of the document at `path` into a
    /// standalone single-page PDF.
    pub fn extract_page(&self, path: &Path, page_number: i64) -> AppResult<ExtractedPage> {
        let start = Instant::now();
        let mut doc = self.open(path)?;

        let pages = doc.get_pages();
        let total = pages.len();
        let page_id = u32::try_from(page_number)
            .ok()
            .filter(|n| *n >= 1)
            .and_then(|n| pages.get(&n).copied())
            .ok_or(AppError::InvalidPageNumber {
                requested: page_number,
                total,
            })?;

        isolate_page(&mut doc, page_id)?;
        doc.compress();

        let mut content = Vec::new();
        doc.save_to(&mut content)
            .map_err(|e| AppError::pdf(format!("Failed to serialize page: {}", e)))?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            path = %path.display(),
            page_number,
            total_pages = total,
            output_bytes = content.len(),
            processing_time_ms,
            "Extracted single page"
        );

        Ok(ExtractedPage {
            page_number,
            content,
            processing_time_ms,
        })
    }

    /// Check if the configured document can be served
    pub fn is_available(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn open(&self, path: &Path) -> AppResult<Document> {
        if !path.exists() {
            return Err(AppError::file_not_found(path));
        }
        Ok(Document::load(path)?)
    }
}

/// Rewrites `doc` so that `page_id` is the only page reachable from the
/// catalog, then drops every object that is no longer referenced.
fn isolate_page(doc: &mut Document, page_id: ObjectId) -> AppResult<()> {
    let inherited = inherited_attributes(doc, page_id)?;

    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_id = doc.get_dictionary(catalog_id)?.get(b"Pages")?.as_reference()?;

    {
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        page.set("Parent", Object::Reference(pages_id));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    // Outlines, named destinations and forms would keep other pages alive
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    doc.objects.insert(catalog_id, Object::Dictionary(catalog));

    let pruned = doc.prune_objects();
    tracing::debug!(pruned = pruned.len(), "Pruned unreachable objects");
    Ok(())
}

/// Collects inheritable attributes the page does not set itself, taking the
/// nearest ancestor's value.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> AppResult<Vec<(Vec<u8>, Object)>> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut found = Vec::new();
    let mut visited = vec![page_id];
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(node_id) = parent {
        if missing.is_empty() || visited.contains(&node_id) {
            break;
        }
        visited.push(node_id);
        let node = doc.get_dictionary(node_id)?;
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, StringFormat};
    use tempfile::TempDir;

    fn page_content(doc: &mut Document, label: &str) -> ObjectId {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(label.as_bytes().to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()))
    }

    fn flat_pdf(num_pages: u32) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();

        for i in 0..num_pages {
            let content_id = page_content(&mut doc, &format!("Page {}", i + 1));
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    /// Two-level page tree where pages inherit MediaBox and Resources from
    /// an intermediate node.
    fn nested_pdf() -> Document {
        let mut doc = Document::with_version("1.7");
        let root_id = doc.new_object_id();
        let branch_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        )]));

        let mut leaf_kids = Vec::new();
        for i in 0..2 {
            let content_id = page_content(&mut doc, &format!("Nested {}", i + 1));
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(branch_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            leaf_kids.push(Object::Reference(doc.add_object(page)));
        }

        let branch = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Parent", Object::Reference(root_id)),
            ("Count", Object::Integer(2)),
            ("Kids", Object::Array(leaf_kids)),
            ("Resources", Object::Reference(resources_id)),
        ]);
        doc.objects.insert(branch_id, Object::Dictionary(branch));

        let root = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(2)),
            ("Kids", Object::Array(vec![Object::Reference(branch_id)])),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ]),
            ),
        ]);
        doc.objects.insert(root_id, Object::Dictionary(root));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(root_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    fn write_pdf(dir: &TempDir, name: &str, mut doc: Document) -> PathBuf {
        let path = dir.path().join(name);
        doc.save(&path).unwrap();
        path
    }

    fn page_text(bytes: &[u8]) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn counts_pages() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "five.pdf", flat_pdf(5));
        assert_eq!(PdfProcessor::new().page_count(&path).unwrap(), 5);
    }

    #[test]
    fn missing_file_is_client_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.pdf");

        let err = PdfProcessor::new().page_count(&path).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound { .. }));
        assert!(err.is_client_error());

        let err = PdfProcessor::new().extract_page(&path, 1).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_pdf_is_internal_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let err = PdfProcessor::new().page_count(&path).unwrap_err();
        assert!(matches!(err, AppError::PdfError { .. }));
        assert!(!err.is_client_error());
    }

    #[test]
    fn extracts_requested_page_only() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "three.pdf", flat_pdf(3));

        let page = PdfProcessor::new().extract_page(&path, 2).unwrap();
        assert_eq!(page.page_number, 2);
        assert!(page.content.starts_with(b"%PDF"));

        let doc = Document::load_mem(&page.content).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(page_text(&page.content).contains("Page 2"));
    }

    #[test]
    fn rejects_out_of_range_pages() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "three.pdf", flat_pdf(3));
        let processor = PdfProcessor::new();

        for page_number in [0, -1, 4, i64::MAX] {
            let err = processor.extract_page(&path, page_number).unwrap_err();
            match err {
                AppError::InvalidPageNumber { requested, total } => {
                    assert_eq!(requested, page_number);
                    assert_eq!(total, 3);
                }
                other => panic!("Expected InvalidPageNumber, got {:?}", other),
            }
        }
    }

    #[test]
    fn extracted_page_keeps_inherited_attributes() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "nested.pdf", nested_pdf());

        let page = PdfProcessor::new().extract_page(&path, 2).unwrap();
        let doc = Document::load_mem(&page.content).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page_dict = doc.get_dictionary(pages[&1]).unwrap();
        assert!(page_dict.has(b"MediaBox"));
        assert!(page_dict.has(b"Resources"));
        assert!(page_text(&page.content).contains("Nested 2"));

        let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        let pages_id = doc
            .get_dictionary(catalog_id)
            .unwrap()
            .get(b"Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        let root = doc.get_dictionary(pages_id).unwrap();
        assert_eq!(root.get(b"Count").unwrap().as_i64().unwrap(), 1);
    }

    #[test]
    fn base64_output_decodes_to_page_bytes() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "one.pdf", flat_pdf(1));

        let page = PdfProcessor::new().extract_page(&path, 1).unwrap();
        let decoded = STANDARD.decode(page.to_base64()).unwrap();
        assert_eq!(decoded, page.content);
    }

    #[tokio::test]
    async fn async_wrappers_run_on_blocking_pool() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "four.pdf", flat_pdf(4));
        let processor = PdfProcessor::new();

        assert_eq!(processor.total_pages(path.clone()).await.unwrap(), 4);
        let page = processor.extract(path, 4).await.unwrap();
        assert_eq!(page.page_number, 4);
    }

    #[test]
    fn availability_follows_file_presence() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "one.pdf", flat_pdf(1));
        let processor = PdfProcessor::default();
        assert!(processor.is_available(&path));
        assert!(!processor.is_available(&dir.path().join("gone.pdf")));
    }
}
