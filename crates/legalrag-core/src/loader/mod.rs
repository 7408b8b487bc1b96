//! Document loading and chunking
//!
//! Reads PDF, text and CSV files into [`Document`]s and splits them into
//! chunks ready for the vector store.

mod splitter;

pub use splitter::{TextSplitter, DEFAULT_SEPARATORS};

use crate::config::IngestConfig;
use crate::error::{LegalRagError, Result};
use crate::store::{Document, SOURCE_KEY};
use csv::ReaderBuilder;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Patterns picked up when loading a directory
pub const DIRECTORY_PATTERNS: [&str; 5] =
    ["**/*.pdf", "**/*.docx", "**/*.txt", "**/*.md", "**/*.csv"];

/// Extensions read as plain text; an empty string means no extension
const TEXT_EXTENSIONS: [&str; 5] = ["txt", "md", "markdown", "text", ""];

/// Loads files and splits them into chunks
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    splitter: TextSplitter,
}

impl DocumentLoader {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self {
            splitter: TextSplitter::new(chunk_size, chunk_overlap)?,
        })
    }

    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Load one file, choosing the reader by extension, and split it
    pub fn load_file(&self, path: &Path) -> Result<Vec<Document>> {
        let documents = read_documents(path)?;
        tracing::info!("Loaded {} documents from {}", documents.len(), path.display());
        Ok(self.split_documents(&documents))
    }

    /// Load every supported file under a directory and split them
    pub fn load_directory(&self, path: &Path) -> Result<Vec<Document>> {
        if !path.is_dir() {
            return Err(LegalRagError::DirectoryNotFound(path.to_path_buf()));
        }

        let mut documents = Vec::new();
        for file in scan_directory(path)? {
            match read_file(&file) {
                Ok(mut docs) => {
                    tracing::debug!("Loaded {} documents from {}", docs.len(), file.display());
                    documents.append(&mut docs);
                }
                Err(e) => {
                    tracing::error!("Error loading {}: {}", file.display(), e);
                }
            }
        }

        if documents.is_empty() {
            tracing::warn!("No documents were loaded from {}", path.display());
            return Ok(Vec::new());
        }

        tracing::info!("Loaded {} documents from {}", documents.len(), path.display());
        Ok(self.split_documents(&documents))
    }

    /// Split documents into chunks, tagging each with its chunk index
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.splitter
                    .split_text(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(move |(idx, text)| {
                        let mut chunk = Document {
                            content: text,
                            metadata: doc.metadata.clone(),
                        };
                        chunk.metadata.insert("chunk".to_string(), idx.to_string());
                        chunk
                    })
            })
            .collect()
    }
}

/// Read one file into unsplit documents (one per CSV row, otherwise one)
pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    if !path.is_file() {
        return Err(LegalRagError::FileNotFound(path.to_path_buf()));
    }
    read_file(path)
}

/// Supported files under `base_path`, skipping hidden entries
fn scan_directory(base_path: &Path) -> Result<Vec<PathBuf>> {
    let patterns = DIRECTORY_PATTERNS
        .iter()
        .map(|p| glob::Pattern::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(base_path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if let Ok(relative) = path.strip_prefix(base_path) {
            let relative_str = relative.to_string_lossy();
            if patterns.iter().any(|p| p.matches(&relative_str)) {
                files.push(path.to_path_buf());
            }
        }
    }

    Ok(files)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn read_file(path: &Path) -> Result<Vec<Document>> {
    match extension(path).as_str() {
        "pdf" => read_pdf(path),
        "docx" => read_docx(path),
        "csv" => read_csv(path),
        ext if TEXT_EXTENSIONS.contains(&ext) => read_text(path),
        ext => Err(LegalRagError::Parse(format!(
            "Unsupported file type '.{}': {}",
            ext,
            path.display()
        ))),
    }
}

fn source_document(content: String, path: &Path) -> Document {
    Document::new(content).with_metadata(SOURCE_KEY, path.display().to_string())
}

/// Extract text from a PDF file
fn read_pdf(path: &Path) -> Result<Vec<Document>> {
    let bytes = fs::read(path)?;

    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
        LegalRagError::Parse(format!(
            "Failed to extract text from PDF {}: {}",
            path.display(),
            e
        ))
    })?;

    if text.trim().is_empty() {
        return Err(LegalRagError::Parse(format!(
            "PDF file {} contains no extractable text (may be image-based)",
            path.display()
        )));
    }

    Ok(vec![source_document(text, path)])
}

/// Paragraph text from `word/document.xml` inside a DOCX archive
fn read_docx(path: &Path) -> Result<Vec<Document>> {
    let docx_error = |e: &dyn std::fmt::Display| {
        LegalRagError::Parse(format!("Failed to read DOCX {}: {}", path.display(), e))
    };

    let mut archive = zip::ZipArchive::new(fs::File::open(path)?).map_err(|e| docx_error(&e))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| docx_error(&e))?
        .read_to_string(&mut xml)?;

    let text = docx_text(&xml).map_err(|e| docx_error(&e))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![source_document(text, path)])
}

/// Collect `w:t` runs, one line per `w:p` paragraph
fn docx_text(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Plain text, read lossily so stray bytes do not reject the file
fn read_text(path: &Path) -> Result<Vec<Document>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![source_document(text, path)])
}

/// One document per CSV row, rendered as `header: value` lines
fn read_csv(path: &Path) -> Result<Vec<Document>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut documents = Vec::new();
    for (row_num, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            LegalRagError::Parse(format!(
                "Failed to parse CSV row {} of {}: {}",
                row_num + 1,
                path.display(),
                e
            ))
        })?;

        let content = record
            .iter()
            .enumerate()
            .map(|(idx, field)| format!("{}: {}", headers.get(idx).unwrap_or("unknown"), field))
            .collect::<Vec<_>>()
            .join("\n");

        documents.push(source_document(content, path).with_metadata("row", row_num.to_string()));
    }

    Ok(documents)
}
