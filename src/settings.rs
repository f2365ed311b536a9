//! Gallery configuration
//!
//! Handles loading/saving of gallery XML files. Every optional element has a
//! `default_*` function so a file only needs to spell out what it changes.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;

/// Name of the configuration file looked up in the platform config dir
pub const CONFIG_FILE_NAME: &str = "gallery.xml";

/// Errors while reading or writing gallery configuration
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::DeError),

    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::SeError),

    #[error("plaque {index} ({label:?}): {reason}")]
    InvalidPlacement {
        index: usize,
        label: String,
        reason: String,
    },

    #[error("camera: {0}")]
    InvalidCamera(String),
}

/// 3D point as stored in XML
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// One plaque in the gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Media reference, resolved against the media root
    pub media: String,

    pub width: f32,

    pub height: f32,

    /// Center of the plaque
    pub position: Point3,

    /// Rotation about world Y, radians
    #[serde(rename = "rotationY", default)]
    pub rotation_y: f32,

    /// Caption shown on hover
    pub label: String,

    #[serde(rename = "doubleSided", default = "default_double_sided")]
    pub double_sided: bool,
}

impl Placement {
    /// Standard 16:9 plaque at eye height
    pub fn new(media: &str, x: f32, z: f32, rotation_y: f32, label: &str) -> Self {
        Self {
            media: media.to_string(),
            width: DEFAULT_PLAQUE_WIDTH,
            height: DEFAULT_PLAQUE_HEIGHT,
            position: Point3::new(x, 1.0, z),
            rotation_y,
            label: label.to_string(),
            double_sided: true,
        }
    }

    fn validate(&self, index: usize) -> Result<(), SettingsError> {
        let invalid = |reason: String| SettingsError::InvalidPlacement {
            index,
            label: self.label.clone(),
            reason,
        };

        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(invalid(format!(
                "size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if !Vec3::from(self.position).is_finite() || !self.rotation_y.is_finite() {
            return Err(invalid("position and rotation must be finite".to_string()));
        }
        if self.media.trim().is_empty() {
            return Err(invalid("missing media reference".to_string()));
        }
        Ok(())
    }
}

const DEFAULT_PLAQUE_WIDTH: f32 = 4.0;
const DEFAULT_PLAQUE_HEIGHT: f32 = 2.25;

const IRMA_BOOM: &str = "Irma Boom: The Architecture of the Book Books in reverse chronological order 2013 – 1986";

/// The built-in five-plaque gallery
pub fn default_plaques() -> Vec<Placement> {
    vec![
        Placement::new(
            "videos/video4.mp4",
            -6.0,
            -3.0,
            FRAC_PI_2,
            "Lensvelt Contract B.V. Boring collection",
        ),
        Placement::new("videos/video1.mp4", -3.0, 0.0, 0.0, "Federico D’Orazio: O"),
        Placement::new("videos/video2.mp4", 3.0, 0.0, 0.0, IRMA_BOOM),
        Placement::new("videos/video3.mp4", 6.0, -3.0, FRAC_PI_2, IRMA_BOOM),
        Placement::new(
            "videos/video5.mp4",
            -3.0,
            -6.0,
            PI,
            "Swip Stolk. Is getekent ‘Zwart op wit’",
        ),
    ]
}

/// Camera and orbit settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    #[serde(rename = "fovY", default = "default_fov_y")]
    pub fov_y: f32,

    #[serde(default = "default_near")]
    pub near: f32,

    #[serde(default = "default_far")]
    pub far: f32,

    #[serde(default = "default_camera_position")]
    pub position: Point3,

    #[serde(default)]
    pub target: Point3,

    /// Share of pending orbit motion applied per frame
    #[serde(rename = "dampingFactor", default = "default_damping_factor")]
    pub damping_factor: f32,
}

fn default_fov_y() -> f32 {
    crate::scene::camera::DEFAULT_FOV_Y_DEGREES
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_position() -> Point3 {
    Point3::new(0.0, 1.0, 5.0)
}

fn default_damping_factor() -> f32 {
    crate::scene::controls::DEFAULT_DAMPING_FACTOR
}

impl CameraSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |reason: &str| Err(SettingsError::InvalidCamera(reason.to_string()));

        if !self.fov_y.is_finite() || self.fov_y <= 0.0 || self.fov_y >= 180.0 {
            return invalid("fovY must be between 0 and 180 degrees");
        }
        if !self.near.is_finite() || self.near <= 0.0 {
            return invalid("near must be positive");
        }
        if !self.far.is_finite() || self.far <= self.near {
            return invalid("far must be greater than near");
        }
        let position = Vec3::from(self.position);
        let target = Vec3::from(self.target);
        if !position.is_finite() || !target.is_finite() {
            return invalid("position and target must be finite");
        }
        if position.distance_squared(target) < f32::EPSILON {
            return invalid("position and target must differ");
        }
        if !self.damping_factor.is_finite() {
            return invalid("dampingFactor must be finite");
        }
        Ok(())
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y: default_fov_y(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
            target: Point3::default(),
            damping_factor: default_damping_factor(),
        }
    }
}

/// Top-level gallery file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "gallery")]
pub struct GallerySettings {
    #[serde(rename = "windowWidth", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "windowHeight", default = "default_window_height")]
    pub window_height: u32,

    /// Whether VSYNC is enabled (syncs to display refresh rate)
    /// - true:  Fifo present mode, redraw every event loop turn
    /// - false: manual pacing at `target_fps`
    #[serde(rename = "vsyncEnabled", default = "default_vsync")]
    pub vsync_enabled: bool,

    /// Target frame rate (24-240) when VSYNC is off
    #[serde(rename = "targetFps", default = "default_target_fps")]
    pub target_fps: u32,

    /// Tone mapping exposure
    #[serde(default = "default_exposure")]
    pub exposure: f32,

    #[serde(default)]
    pub camera: CameraSettings,

    /// Equirectangular HDR used as background
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Directory media references and the environment are resolved against
    #[serde(rename = "mediaRoot", default = "default_media_root")]
    pub media_root: String,

    #[serde(rename = "plaque", default)]
    pub plaques: Vec<Placement>,
}

fn default_double_sided() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_vsync() -> bool {
    true
}

fn default_target_fps() -> u32 {
    60
}

fn default_exposure() -> f32 {
    1.5
}

fn default_environment() -> String {
    "cinema_lobby_4k.hdr".to_string()
}

fn default_media_root() -> String {
    ".".to_string()
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync_enabled: default_vsync(),
            target_fps: default_target_fps(),
            exposure: default_exposure(),
            camera: CameraSettings::default(),
            environment: default_environment(),
            media_root: default_media_root(),
            plaques: default_plaques(),
        }
    }
}

impl GallerySettings {
    /// Clamp FPS to valid range (24-240)
    pub fn clamp_fps(&mut self) {
        self.target_fps = self.target_fps.clamp(24, 240);
    }

    /// Parse and validate an XML document
    pub fn from_xml(xml: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = from_str(xml)?;
        settings.clamp_fps();
        settings.window_width = settings.window_width.max(1);
        settings.window_height = settings.window_height.max(1);
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize with an XML declaration
    pub fn to_xml(&self) -> Result<String, SettingsError> {
        let xml = to_string(self)?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml))
    }

    /// Load settings from a gallery XML file.
    ///
    /// A relative media root is taken relative to the file's directory.
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let mut settings = Self::from_xml(&contents)?;

        if Path::new(&settings.media_root).is_relative() {
            if let Some(dir) = path.parent() {
                settings.media_root = dir.join(&settings.media_root).to_string_lossy().into_owned();
            }
        }
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.to_xml()?)?;
        Ok(())
    }

    /// Settings for this run.
    ///
    /// An explicit path must load. Without one, `gallery.xml` in the platform
    /// config directory is used when present, else the built-in gallery.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            tracing::info!("Loading gallery: {}", path.display());
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Some(path) if path.is_file() => {
                tracing::info!("Loading gallery: {}", path.display());
                Self::load_from_file(&path)
            }
            _ => {
                tracing::info!("No gallery file, using the built-in gallery");
                Ok(Self::default())
            }
        }
    }

    /// `<config dir>/plaque-gallery/gallery.xml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plaque-gallery").join(CONFIG_FILE_NAME))
    }

    /// Reject a camera or placements the scene would refuse, before any window exists
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.camera.validate()?;
        self.plaques
            .iter()
            .enumerate()
            .try_for_each(|(index, placement)| placement.validate(index))
    }

    /// Full path of a media reference
    pub fn resolve_media(&self, media: &str) -> PathBuf {
        Path::new(&self.media_root).join(media)
    }

    pub fn environment_path(&self) -> PathBuf {
        self.resolve_media(&self.environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GallerySettings::default();
        assert_eq!(settings.target_fps, 60);
        assert!(settings.vsync_enabled);
        assert_eq!(settings.exposure, 1.5);
        assert_eq!(settings.camera.fov_y, 75.0);
        assert_eq!(settings.camera.position, Point3::new(0.0, 1.0, 5.0));
        assert_eq!(settings.plaques.len(), 5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_gallery_repeats_a_label() {
        let plaques = default_plaques();
        assert_eq!(plaques[2].label, plaques[3].label);
        assert_ne!(plaques[2].media, plaques[3].media);
        assert!(plaques.iter().all(|p| p.double_sided && p.position.y == 1.0));
    }

    #[test]
    fn test_fps_clamping() {
        let mut settings = GallerySettings::default();
        settings.target_fps = 300;
        settings.clamp_fps();
        assert_eq!(settings.target_fps, 240);

        settings.target_fps = 10;
        settings.clamp_fps();
        assert_eq!(settings.target_fps, 24);
    }

    #[test]
    fn test_parse_minimal_file_uses_defaults() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<gallery>
  <targetFps>500</targetFps>
  <plaque>
    <media>clips/a.mp4</media>
    <width>2</width>
    <height>1</height>
    <position><x>1</x><y>2</y><z>3</z></position>
    <label>Only one</label>
  </plaque>
</gallery>"#;
        let settings = GallerySettings::from_xml(xml).unwrap();
        assert_eq!(settings.target_fps, 240);
        assert_eq!(settings.exposure, 1.5);
        assert_eq!(settings.camera, CameraSettings::default());
        assert_eq!(settings.plaques.len(), 1);

        let plaque = &settings.plaques[0];
        assert_eq!(plaque.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(plaque.rotation_y, 0.0);
        assert!(plaque.double_sided);
    }

    #[test]
    fn test_empty_gallery_file_has_no_plaques() {
        use crate::media::MediaLibrary;
        use crate::scene::ViewportSize;
        use crate::session::GallerySession;
        use glam::Vec2;

        let settings = GallerySettings::from_xml("<gallery/>").unwrap();
        assert!(settings.plaques.is_empty());

        let settings = GallerySettings::from_xml("<gallery><exposure>2</exposure></gallery>").unwrap();
        assert_eq!(settings.exposure, 2.0);
        assert!(settings.plaques.is_empty());

        let mut media = MediaLibrary::new("/nonexistent");
        let mut session = GallerySession::new(
            &settings.plaques,
            &settings.camera,
            &mut media,
            ViewportSize::new(800, 600),
        )
        .unwrap();
        assert!(session.registry().is_empty());
        assert_eq!(session.pointer_moved(Vec2::new(400.0, 300.0)), None);
        assert!(!session.overlay().visible);
    }

    #[test]
    fn test_rejects_degenerate_camera() {
        let reject = |camera: &str| {
            let xml = format!("<gallery><camera>{camera}</camera></gallery>");
            matches!(GallerySettings::from_xml(&xml), Err(SettingsError::InvalidCamera(_)))
        };

        assert!(reject(
            "<position><x>1</x><y>2</y><z>3</z></position><target><x>1</x><y>2</y><z>3</z></target>"
        ));
        assert!(reject("<near>0</near>"));
        assert!(reject("<near>-1</near>"));
        assert!(reject("<near>10</near><far>5</far>"));
        assert!(reject("<near>1</near><far>1</far>"));
        assert!(reject("<fovY>NaN</fovY>"));
        assert!(reject("<fovY>0</fovY>"));
        assert!(reject("<fovY>180</fovY>"));
        assert!(reject("<dampingFactor>inf</dampingFactor>"));

        assert!(!reject("<near>0.5</near><far>50</far><fovY>60</fovY>"));
    }

    #[test]
    fn test_rejects_degenerate_plaque() {
        let xml = r#"<gallery>
  <plaque>
    <media>a.mp4</media>
    <width>0</width>
    <height>1</height>
    <position><x>0</x><y>0</y><z>0</z></position>
    <label>Flat</label>
  </plaque>
</gallery>"#;
        match GallerySettings::from_xml(xml) {
            Err(SettingsError::InvalidPlacement { index, label, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(label, "Flat");
            }
            other => panic!("expected InvalidPlacement, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let result = GallerySettings::from_xml("<gallery><plaque><width>wide</width></plaque></gallery>");
        assert!(matches!(result, Err(SettingsError::XmlParse(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("plaque-gallery-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);

        let mut settings = GallerySettings::default();
        settings.vsync_enabled = false;
        settings.plaques.truncate(2);
        settings.plaques[1].double_sided = false;
        settings.save_to_file(&path).unwrap();

        let loaded = GallerySettings::load_from_file(&path).unwrap();
        assert!(!loaded.vsync_enabled);
        assert_eq!(loaded.plaques, settings.plaques);
        assert_eq!(PathBuf::from(&loaded.media_root), dir.join("."));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let missing = Path::new("/nonexistent/plaque-gallery/gallery.xml");
        assert!(matches!(
            GallerySettings::resolve(Some(missing)),
            Err(SettingsError::Io(_))
        ));
    }
}
