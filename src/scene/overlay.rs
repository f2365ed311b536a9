//! Hover caption state
//!
//! `LabelOverlay` is what the presentation layer draws. It is owned by the
//! `HoverController`, which is the only thing allowed to change it: once per
//! pointer move, from the result of a hit test and a projection.

use glam::Vec2;

use super::{hit_test, project, PerspectiveCamera, SurfaceHandle, SurfaceRegistry, ViewportSize};

/// The single floating caption
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelOverlay {
    pub visible: bool,
    pub text: String,
    /// Viewport pixels, origin top-left
    pub screen_x: f32,
    pub screen_y: f32,
}

impl LabelOverlay {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.screen_x, self.screen_y)
    }
}

/// Runs the hit-test-and-project cycle for pointer moves
#[derive(Debug, Default)]
pub struct HoverController {
    overlay: LabelOverlay,
    hovered: Option<SurfaceHandle>,
}

impl HoverController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay(&self) -> &LabelOverlay {
        &self.overlay
    }

    /// Plaque under the pointer after the last move
    pub fn hovered(&self) -> Option<SurfaceHandle> {
        self.hovered
    }

    /// Update the caption for a pointer at `pointer` (viewport pixels).
    ///
    /// On a miss only `visible` changes; the last text and position are kept.
    pub fn pointer_moved(
        &mut self,
        pointer: Vec2,
        viewport: ViewportSize,
        camera: &PerspectiveCamera,
        registry: &SurfaceRegistry,
    ) -> Option<SurfaceHandle> {
        let hit = hit_test(pointer, viewport, camera, registry);
        let surface = hit.and_then(|handle| registry.get(handle));

        match surface {
            Some(surface) => {
                let anchor = project(surface.anchor(), camera, viewport);
                self.overlay.visible = true;
                if self.overlay.text != surface.label() {
                    self.overlay.text = surface.label().to_owned();
                }
                self.overlay.screen_x = anchor.x;
                self.overlay.screen_y = anchor.y;
            }
            None => self.overlay.visible = false,
        }

        if hit != self.hovered {
            if let Some(previous) = self.hovered {
                tracing::debug!(slot = previous.index(), "Pointer left plaque");
            }
            if let Some(surface) = surface {
                tracing::debug!(label = surface.label(), "Pointer entered plaque");
            }
            self.hovered = hit;
        }
        hit
    }
}
