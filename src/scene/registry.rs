//! Ordered collection of the plaques placed in the scene
//!
//! Handles are slot indices. Slots are never reused, so removing a plaque
//! leaves every other handle pointing at the same plaque it did before.

use super::{Surface, SurfaceError};

/// Stable identity of a plaque inside a `SurfaceRegistry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(u32);

impl SurfaceHandle {
    /// Registry slot this handle refers to
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owns every hit-testable plaque, in declaration order
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    slots: Vec<Option<Surface>>,
    live: usize,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plaque and return its handle.
    ///
    /// Fails with `InvalidGeometry` for non-positive or non-finite dimensions.
    pub fn add(&mut self, surface: Surface) -> Result<SurfaceHandle, SurfaceError> {
        let (width, height) = (surface.geometry_width(), surface.geometry_height());
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SurfaceError::InvalidGeometry { width, height });
        }

        let handle = SurfaceHandle(self.slots.len() as u32);
        tracing::debug!(slot = handle.0, label = surface.label(), "Registered plaque");
        self.slots.push(Some(surface));
        self.live += 1;
        Ok(handle)
    }

    /// Remove a plaque; other handles stay valid
    pub fn remove(&mut self, handle: SurfaceHandle) -> Result<Surface, SurfaceError> {
        let surface = self
            .slots
            .get_mut(handle.index())
            .and_then(Option::take)
            .ok_or(SurfaceError::UnknownHandle(handle))?;
        self.live -= 1;
        Ok(surface)
    }

    pub fn get(&self, handle: SurfaceHandle) -> Option<&Surface> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    /// Live plaques with their handles, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceHandle, &Surface)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|s| (SurfaceHandle(idx as u32), s)))
    }

    /// Read-only view of the live plaques, in insertion order
    pub fn all(&self) -> impl Iterator<Item = &Surface> + '_ {
        self.iter().map(|(_, surface)| surface)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TextureHandle;
    use glam::Vec3;

    fn plaque(label: &str) -> Surface {
        Surface::new(4.0, 2.25, Vec3::ZERO, 0.0, TextureHandle(0), label).unwrap()
    }

    #[test]
    fn test_insertion_order_is_stable() {
        let mut registry = SurfaceRegistry::new();
        for label in ["a", "b", "c"] {
            registry.add(plaque(label)).unwrap();
        }
        let labels: Vec<_> = registry.all().map(Surface::label).collect();
        assert_eq!(labels, ["a", "b", "c"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_repeated_labels_get_distinct_handles() {
        let mut registry = SurfaceRegistry::new();
        let first = registry.add(plaque("Irma Boom")).unwrap();
        let second = registry.add(plaque("Irma Boom")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_keeps_other_handles_valid() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.add(plaque("a")).unwrap();
        let b = registry.add(plaque("b")).unwrap();
        let c = registry.add(plaque("c")).unwrap();

        let removed = registry.remove(b).unwrap();
        assert_eq!(removed.label(), "b");
        assert!(registry.get(b).is_none());
        assert_eq!(registry.get(a).unwrap().label(), "a");
        assert_eq!(registry.get(c).unwrap().label(), "c");
        assert_eq!(registry.len(), 2);

        // Slots are not reused
        let d = registry.add(plaque("d")).unwrap();
        assert_ne!(d, b);
        assert!(matches!(registry.remove(b), Err(SurfaceError::UnknownHandle(_))));
    }

    #[test]
    fn test_iter_skips_removed_slots() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.add(plaque("a")).unwrap();
        let b = registry.add(plaque("b")).unwrap();
        registry.remove(a).unwrap();

        let handles: Vec<_> = registry.iter().map(|(handle, _)| handle).collect();
        assert_eq!(handles, [b]);
        assert!(!registry.is_empty());

        registry.remove(b).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
