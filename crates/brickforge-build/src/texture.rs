//! Texture-region tracking.
//!
//! Texture markers on meta lines bracket the following action lines into
//! textured regions. The marker itself carries no payload; the opening
//! action line does.

use brickforge_doc::{ActionAttrs, TextureMarker};
use brickforge_scene::SceneNode;

/// Stateful detector for texture start/next/end markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureTracker {
    pending: bool,
    next: bool,
    open: bool,
}

impl TextureTracker {
    /// A new idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a texture marker on a meta line.
    pub fn on_marker(&mut self, marker: TextureMarker, node: &mut SceneNode) {
        match marker {
            TextureMarker::Start => {
                self.pending = true;
                self.next = false;
            }
            TextureMarker::Next => {
                self.pending = true;
                self.next = true;
            }
            TextureMarker::End => {
                if self.open {
                    node.end_texture();
                    self.open = false;
                }
            }
        }
    }

    /// Called before an action line emits: opens the pending region with
    /// the payload carried on the line itself.
    pub fn before_action(&mut self, attrs: Option<&ActionAttrs>, node: &mut SceneNode) {
        if self.pending {
            if let Some(payload) = attrs.and_then(|a| a.texture.clone()) {
                node.start_texture(payload);
                self.open = true;
            }
            self.pending = false;
        }
    }

    /// Called after an action line emitted: a `Next` region closes
    /// immediately behind its one line.
    pub fn after_action(&mut self, node: &mut SceneNode) {
        if self.next && self.open {
            node.end_texture();
            self.open = false;
        }
    }

    /// Whether an action line takes part in emission under the given
    /// texturing capability: with texturing on, the untextured fallback is
    /// skipped; with it off, textured lines are skipped instead.
    pub fn line_active(texturing: bool, attrs: &ActionAttrs) -> bool {
        if texturing {
            !attrs.texture_fallback
        } else {
            attrs.texture.is_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickforge_doc::{TextureMethod, TexturePayload};
    use brickforge_math::Point3;

    fn payload() -> TexturePayload {
        TexturePayload {
            method: TextureMethod::Planar,
            filename: "pattern.png".into(),
            image: None,
            points: [Point3::origin(); 3],
            extra: None,
        }
    }

    fn textured_attrs() -> ActionAttrs {
        ActionAttrs {
            texture: Some(payload()),
            texture_fallback: false,
        }
    }

    #[test]
    fn test_start_opens_on_next_action() {
        let mut node = SceneNode::new("n", false);
        let mut tracker = TextureTracker::new();
        tracker.on_marker(TextureMarker::Start, &mut node);
        assert!(!node.texture_open());
        tracker.before_action(Some(&textured_attrs()), &mut node);
        assert!(node.texture_open());
        tracker.after_action(&mut node);
        // Start regions stay open across further actions.
        assert!(node.texture_open());
        tracker.on_marker(TextureMarker::End, &mut node);
        assert!(!node.texture_open());
    }

    #[test]
    fn test_next_closes_after_one_action() {
        let mut node = SceneNode::new("n", false);
        let mut tracker = TextureTracker::new();
        tracker.on_marker(TextureMarker::Next, &mut node);
        tracker.before_action(Some(&textured_attrs()), &mut node);
        assert!(node.texture_open());
        tracker.after_action(&mut node);
        assert!(!node.texture_open());
        assert_eq!(node.texture_regions.len(), 1);
        assert!(node.texture_regions[0].end.is_some());
    }

    #[test]
    fn test_end_without_open_region_is_noop() {
        let mut node = SceneNode::new("n", false);
        let mut tracker = TextureTracker::new();
        tracker.on_marker(TextureMarker::End, &mut node);
        assert!(node.texture_regions.is_empty());
    }

    #[test]
    fn test_payloadless_action_cannot_open() {
        let mut node = SceneNode::new("n", false);
        let mut tracker = TextureTracker::new();
        tracker.on_marker(TextureMarker::Start, &mut node);
        tracker.before_action(Some(&ActionAttrs::default()), &mut node);
        assert!(!node.texture_open());
        // The pending flag was consumed either way.
        tracker.before_action(Some(&textured_attrs()), &mut node);
        assert!(!node.texture_open());
    }

    #[test]
    fn test_line_active_filtering() {
        let textured = textured_attrs();
        let fallback = ActionAttrs {
            texture: None,
            texture_fallback: true,
        };
        let plain = ActionAttrs::default();
        assert!(TextureTracker::line_active(true, &textured));
        assert!(!TextureTracker::line_active(true, &fallback));
        assert!(TextureTracker::line_active(true, &plain));
        assert!(!TextureTracker::line_active(false, &textured));
        assert!(TextureTracker::line_active(false, &fallback));
        assert!(TextureTracker::line_active(false, &plain));
    }
}
