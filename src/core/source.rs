//! Library sources: where the manifest and documents are read from
//!
//! A library is laid out like a static site: a manifest file next to a
//! materials folder. It can be served over HTTP or sit in a local directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use super::error::FetchError;

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read access to a library
pub trait LibrarySource: Send + Sync {
    /// Retrieve a resource as raw text
    fn fetch_text(&self, path: &str) -> Result<String, FetchError>;

    /// Resolve a resource path to a location the system can open
    fn locate(&self, path: &str) -> String;
}

/// Open the source described by a configured base: a URL or a directory
pub fn open_source(base: &str) -> Result<Arc<dyn LibrarySource>> {
    if base.starts_with("http://") || base.starts_with("https://") {
        let source = HttpSource::new(base)
            .with_context(|| format!("Failed to set up HTTP client for {}", base))?;
        Ok(Arc::new(source))
    } else {
        Ok(Arc::new(DirSource::new(base)))
    }
}

/// Library served over HTTP
pub struct HttpSource {
    base: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Network {
                path: base.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl LibrarySource for HttpSource {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.locate(path);
        tracing::debug!("GET {}", url);

        let network = |e: reqwest::Error| FetchError::Network {
            path: path.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(&url).send().map_err(network)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }

        response.text().map_err(network)
    }

    fn locate(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

/// Library stored in a local directory
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl LibrarySource for DirSource {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        // Undecodable bytes are replaced, matching what HTTP text decoding does
        let bytes = std::fs::read(self.resolve(path)).map_err(|source| FetchError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn locate(&self, path: &str) -> String {
        self.resolve(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("materials/math")).unwrap();
        std::fs::write(dir.path().join("materials/math/algebra.md"), "# Algebra").unwrap();

        let source = DirSource::new(dir.path());
        let text = source.fetch_text("/materials/math/algebra.md").unwrap();
        assert_eq!(text, "# Algebra");

        let missing = source.fetch_text("/materials/math/missing.md");
        assert!(matches!(missing, Err(FetchError::Io { .. })));
    }

    #[test]
    fn test_dir_source_keeps_notes_with_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("materials/lang")).unwrap();
        std::fs::write(
            dir.path().join("materials/lang/french.md"),
            b"# Notes\n\ncaf\xe9 \xff\n",
        )
        .unwrap();

        let source = DirSource::new(dir.path());
        let text = source.fetch_text("/materials/lang/french.md").unwrap();
        assert!(text.starts_with("# Notes\n\ncaf"));
        assert!(text.contains('\u{FFFD}'));
    }

    /// Serve `count` requests on loopback: known paths get 200, others 404
    fn serve(routes: &'static [(&'static str, &'static str)], count: usize) -> String {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        std::thread::spawn(move || {
            for stream in listener.incoming().take(count) {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let target = request_line.split_whitespace().nth(1).unwrap_or("").to_string();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                        break;
                    }
                }

                let (status, body) = match routes.iter().find(|(path, _)| *path == target) {
                    Some((_, body)) => ("200 OK", *body),
                    None => ("404 Not Found", "not found"),
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        base
    }

    #[test]
    fn test_http_source_status_handling() {
        let base = serve(&[("/materials/a/hello.md", "# Hi!")], 2);
        let source = HttpSource::new(&base).unwrap();

        let text = source.fetch_text("/materials/a/hello.md").unwrap();
        assert_eq!(text, "# Hi!");

        let missing = source.fetch_text("/materials/a/missing.md");
        match missing {
            Err(FetchError::Status { status, path }) => {
                assert_eq!(status, 404);
                assert_eq!(path, "/materials/a/missing.md");
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[test]
    fn test_dir_source_locate() {
        let source = DirSource::new("/srv/library");
        assert_eq!(
            source.locate("/materials/a/b.pdf"),
            PathBuf::from("/srv/library/materials/a/b.pdf").to_string_lossy()
        );
    }

    #[test]
    fn test_http_source_locate_joins_base() {
        let source = HttpSource::new("https://example.org/notes/").unwrap();
        assert_eq!(
            source.locate("/materials/a/b.pdf"),
            "https://example.org/notes/materials/a/b.pdf"
        );
        assert_eq!(source.locate("config.json"), "https://example.org/notes/config.json");
    }
}
