//! Manifest model: subjects and the documents they group

use serde::{Deserialize, Deserializer};

use super::error::FetchError;

/// Document type tag as declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    Pdf,
    /// Any other tag; kept verbatim so it can still be shown
    Other(String),
}

impl FileKind {
    /// Parse a manifest type tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "md" => FileKind::Markdown,
            "pdf" => FileKind::Pdf,
            other => FileKind::Other(other.to_string()),
        }
    }

    /// The tag as written in the manifest
    pub fn tag(&self) -> &str {
        match self {
            FileKind::Markdown => "md",
            FileKind::Pdf => "pdf",
            FileKind::Other(tag) => tag,
        }
    }
}

impl<'de> Deserialize<'de> for FileKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FileKind::from_tag(&tag))
    }
}

/// A single document entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

/// A named, folder-backed group of documents
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Subject {
    /// Display name, also the expansion key
    pub name: String,
    /// Folder segment under the materials root
    pub folder: String,
    #[serde(default)]
    pub files: Vec<DocumentRef>,
}

/// The catalog loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Manifest {
    /// Parse a manifest from its JSON text
    pub fn parse(text: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Look up a subject and one of its files by position
    pub fn get(&self, subject: usize, file: usize) -> Option<(&Subject, &DocumentRef)> {
        let subject = self.subjects.get(subject)?;
        let file = subject.files.get(file)?;
        Some((subject, file))
    }
}

/// Build `<root>/<folder>/<filename>` without doubling separators
pub fn document_path(root: &str, subject: &Subject, file: &DocumentRef) -> String {
    let root = root.trim_end_matches('/');
    let folder = subject.folder.trim_matches('/');
    let filename = file.filename.trim_start_matches('/');

    if folder.is_empty() {
        format!("{}/{}", root, filename)
    } else {
        format!("{}/{}/{}", root, folder, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "subjects": [
            {
                "name": "Physics",
                "folder": "physics",
                "files": [
                    { "filename": "mechanics.md", "title": "Mechanics", "type": "md" },
                    { "filename": "optics.pdf", "title": "Optics", "type": "pdf" },
                    { "filename": "lab.docx", "title": "Lab Sheet", "type": "docx" }
                ]
            },
            { "name": "History", "folder": "history" }
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.subjects.len(), 2);

        let physics = &manifest.subjects[0];
        assert_eq!(physics.name, "Physics");
        assert_eq!(physics.files[0].kind, FileKind::Markdown);
        assert_eq!(physics.files[1].kind, FileKind::Pdf);
        assert_eq!(physics.files[2].kind, FileKind::Other("docx".to_string()));
        assert_eq!(physics.files[2].kind.tag(), "docx");

        // Missing file list means no files
        assert!(manifest.subjects[1].files.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_payload() {
        assert!(matches!(
            Manifest::parse("<html>not json</html>"),
            Err(FetchError::Manifest(_))
        ));
        assert!(matches!(
            Manifest::parse(r#"{ "subjects": [ { "folder": "x" } ] }"#),
            Err(FetchError::Manifest(_))
        ));
    }

    #[test]
    fn test_empty_object_is_empty_manifest() {
        let manifest = Manifest::parse("{}").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_document_path() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        let (subject, file) = manifest.get(0, 1).unwrap();
        assert_eq!(
            document_path("/materials", subject, file),
            "/materials/physics/optics.pdf"
        );
        assert_eq!(
            document_path("/materials/", subject, file),
            "/materials/physics/optics.pdf"
        );
        assert!(manifest.get(1, 0).is_none());
    }
}
