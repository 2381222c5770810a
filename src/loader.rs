// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Reference pose loading.
//!
//! Reference pose `id` is stored as `pose{id}.json` next to an illustrative
//! image `pose{id}.png` (or `pose{id}.PNG`). Loaders fetch these from a local
//! directory, an HTTP(S) base URL, or memory.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PoseMatchError, Result};
use crate::keypoints::KeypointSet;

/// Connection timeout in seconds.
const CONNECT_TIMEOUT: u64 = 10;

/// Read timeout in seconds.
const READ_TIMEOUT: u64 = 30;

/// Image file extensions tried in order.
const IMAGE_EXTENSIONS: [&str; 2] = ["png", "PNG"];

/// File name of the keypoint data for pose `id`.
#[must_use]
pub fn keypoints_file_name(id: u32) -> String {
    format!("pose{id}.json")
}

/// Candidate image file names for pose `id`, primary first.
#[must_use]
pub fn image_file_names(id: u32) -> [String; 2] {
    IMAGE_EXTENSIONS.map(|ext| format!("pose{id}.{ext}"))
}

/// Opaque handle to a reference pose's illustrative image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    location: String,
    dimensions: Option<(u32, u32)>,
}

impl ImageRef {
    /// Create a handle for `location` (a path or URL).
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            dimensions: None,
        }
    }

    /// Attach the decoded `(width, height)`.
    #[must_use]
    pub const fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Path or URL of the image.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// `(width, height)` if the loader decoded the image header.
    #[must_use]
    pub const fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// Source of reference pose data.
pub trait ReferenceLoader {
    /// Load the keypoints of pose `id`.
    ///
    /// # Errors
    ///
    /// [`PoseMatchError::NotFound`] if the data is missing,
    /// [`PoseMatchError::ParseError`] if it is malformed.
    fn load_keypoints(&mut self, id: u32) -> Result<KeypointSet>;

    /// Resolve the illustrative image of pose `id`, trying the primary name
    /// before the alternate-case one.
    ///
    /// # Errors
    ///
    /// [`PoseMatchError::NotFound`] if neither name exists.
    fn resolve_image(&mut self, id: u32) -> Result<ImageRef>;
}

/// Loads reference poses from a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    /// Create a loader rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseMatchError::NotFound`] if `root` is not a directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(PoseMatchError::NotFound(format!(
                "pose directory {}",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Directory the poses are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ReferenceLoader for DirectoryLoader {
    fn load_keypoints(&mut self, id: u32) -> Result<KeypointSet> {
        let path = self.root.join(keypoints_file_name(id));
        if !path.is_file() {
            return Err(PoseMatchError::NotFound(path.display().to_string()));
        }
        let text = fs::read_to_string(&path)?;
        KeypointSet::from_json_str(&text)
            .map_err(|e| PoseMatchError::ParseError(format!("{}: {e}", path.display())))
    }

    fn resolve_image(&mut self, id: u32) -> Result<ImageRef> {
        let path = image_file_names(id)
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                PoseMatchError::NotFound(format!("image for pose {id} in {}", self.root.display()))
            })?;

        let (width, height) = image::image_dimensions(&path)
            .map_err(|e| PoseMatchError::LoadError(format!("{}: {e}", path.display())))?;
        Ok(ImageRef::new(path.to_string_lossy()).with_dimensions(width, height))
    }
}

/// Loads reference poses from an HTTP(S) base URL.
pub struct HttpLoader {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpLoader {
    /// Create a loader for `base_url` (e.g. `https://example.com/poses`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT)))
            .timeout_recv_body(Some(Duration::from_secs(READ_TIMEOUT)))
            .build();
        Self::with_agent(base_url, ureq::Agent::new_with_config(config))
    }

    /// Create a loader that sends its requests through `agent`.
    #[must_use]
    pub fn with_agent(base_url: &str, agent: ureq::Agent) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// URL of resource `name`.
    #[must_use]
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    /// Check an image with a full `GET`.
    fn image_exists(&self, url: &str) -> Result<bool> {
        match self.agent.get(url).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(404 | 410)) => Ok(false),
            Err(e) => Err(Self::map_error(url, &e)),
        }
    }

    fn map_error(url: &str, err: &ureq::Error) -> PoseMatchError {
        match err {
            ureq::Error::StatusCode(404 | 410) => PoseMatchError::NotFound(url.to_string()),
            ureq::Error::Timeout(_) => {
                PoseMatchError::Network(format!("connection timed out while fetching {url}"))
            }
            _ => PoseMatchError::Network(format!("failed to fetch {url}: {err}")),
        }
    }
}

impl ReferenceLoader for HttpLoader {
    fn load_keypoints(&mut self, id: u32) -> Result<KeypointSet> {
        let url = self.url_for(&keypoints_file_name(id));
        let mut response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| Self::map_error(&url, &e))?;
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Self::map_error(&url, &e))?;
        KeypointSet::from_json_str(&text)
            .map_err(|e| PoseMatchError::ParseError(format!("{url}: {e}")))
    }

    fn resolve_image(&mut self, id: u32) -> Result<ImageRef> {
        for name in image_file_names(id) {
            let url = self.url_for(&name);
            let found = match self.agent.head(&url).call() {
                Ok(_) => true,
                // HEAD not allowed or not implemented: fall back to fetching the image.
                Err(ureq::Error::StatusCode(405 | 501)) => self.image_exists(&url)?,
                Err(ureq::Error::StatusCode(404 | 410)) => false,
                Err(e) => return Err(Self::map_error(&url, &e)),
            };
            if found {
                return Ok(ImageRef::new(url));
            }
        }
        Err(PoseMatchError::NotFound(format!(
            "image for pose {id} under {}",
            self.base_url
        )))
    }
}

/// In-memory reference poses, for tests and scripted sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    poses: HashMap<u32, KeypointSet>,
}

impl MemoryLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the keypoints of pose `id`.
    #[must_use]
    pub fn with_pose(mut self, id: u32, keypoints: KeypointSet) -> Self {
        self.poses.insert(id, keypoints);
        self
    }

    /// Register the same keypoints for every id in `1..=n`.
    #[must_use]
    pub fn uniform(n: u32, keypoints: &KeypointSet) -> Self {
        (1..=n).fold(Self::new(), |loader, id| loader.with_pose(id, keypoints.clone()))
    }
}

impl ReferenceLoader for MemoryLoader {
    fn load_keypoints(&mut self, id: u32) -> Result<KeypointSet> {
        self.poses
            .get(&id)
            .cloned()
            .ok_or_else(|| PoseMatchError::NotFound(keypoints_file_name(id)))
    }

    fn resolve_image(&mut self, id: u32) -> Result<ImageRef> {
        if self.poses.contains_key(&id) {
            let [primary, _] = image_file_names(id);
            Ok(ImageRef::new(format!("memory://{primary}")))
        } else {
            Err(PoseMatchError::NotFound(format!("image for pose {id}")))
        }
    }
}
