use std::fs;
use std::path::PathBuf;

use crate::error::LoadError;

/// Where bank files come from. Paths are site-relative (`questions/listening/index.json`).
pub trait QuestionSource {
    fn fetch_text(&self, path: &str) -> Result<String, LoadError>;

    /// Human-readable origin, shown in the catalog footer.
    fn describe(&self) -> String;
}

/// A local directory laid out like the site's static root.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl QuestionSource for DirSource {
    fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        let full = self.root.join(path.trim_start_matches('/'));
        fs::read_to_string(&full).map_err(|source| LoadError::Io { path: full, source })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(feature = "network")]
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| LoadError::Transport {
                path: base_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(feature = "network")]
impl QuestionSource for HttpSource {
    fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        let url = self.url_for(path);
        let transport = |e: reqwest::Error| LoadError::Transport {
            path: url.clone(),
            message: e.to_string(),
        };
        let response = self.client.get(&url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                path: url,
                status: status.as_u16(),
            });
        }
        response.text().map_err(transport)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Pick a source from a config/CLI location: http(s) URLs go over the network,
/// anything else is a directory.
pub fn source_for(location: &str) -> Result<Box<dyn QuestionSource>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return http_source(location);
    }
    Ok(Box::new(DirSource::new(location)))
}

#[cfg(feature = "network")]
fn http_source(location: &str) -> Result<Box<dyn QuestionSource>, LoadError> {
    Ok(Box::new(HttpSource::new(location)?))
}

#[cfg(not(feature = "network"))]
fn http_source(location: &str) -> Result<Box<dyn QuestionSource>, LoadError> {
    Err(LoadError::Transport {
        path: location.to_string(),
        message: "built without the `network` feature".to_string(),
    })
}

impl<S: QuestionSource + ?Sized> QuestionSource for Box<S> {
    fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        (**self).fetch_text(path)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
