//! Embedded WGSL sources
//!
//! WGSL has no includes, so the shared tone mapping prelude is prepended
//! when a module is built.

/// ACES filmic tone mapping and the shared `Globals` uniform
pub const TONE_MAPPING: &str = include_str!("tone_mapping.wgsl");

/// Equirectangular background
pub const BACKGROUND: &str = include_str!("background.wgsl");

/// Textured plaques
pub const PLAQUE: &str = include_str!("plaque.wgsl");

/// `source` with the tone mapping prelude in front
pub fn with_tone_mapping(source: &str) -> String {
    format!("{TONE_MAPPING}\n{source}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules_share_globals_from_prelude() {
        for source in [BACKGROUND, PLAQUE] {
            assert!(!source.contains("struct Globals"));
            let full = with_tone_mapping(source);
            assert!(full.contains("struct Globals"));
            assert!(full.contains("fn aces_filmic"));
            assert!(full.contains("fn vs_main") && full.contains("fn fs_main"));
        }
    }
}
