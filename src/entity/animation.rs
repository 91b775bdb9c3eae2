//! Frame-based sprite animation advanced by the world loop

use std::collections::HashMap;

use bevy_ecs::prelude::Component;
use glam::UVec2;

/// One named animation: a run of `frames` cells starting at `first_cell`
/// in the entity's sprite sheet, stepping one cell to the right per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub first_cell: UVec2,
    pub frames: u32,
    pub repeat: bool,
}

/// Time-based sprite animation state.
///
/// The external renderer reads [`Animation::frame_cell`] each frame; the
/// world loop advances the accumulator via [`Animation::advance`]. When a
/// non-repeating clip finishes it hands over to the most recently requested
/// clip, or freezes on its last frame if none was requested.
#[derive(Debug, Clone, Component)]
pub struct Animation {
    frame_size: UVec2,
    frame_step: f32,
    accum: f32,
    current_frame: u32,
    clips: HashMap<String, Clip>,
    current: Option<String>,
    requested: Option<String>,
}

impl Animation {
    pub fn new(frame_size: UVec2, fps: f32) -> Self {
        debug_assert!(fps > 0.0);
        Self {
            frame_size,
            frame_step: 1.0 / fps,
            accum: 0.0,
            current_frame: 0,
            clips: HashMap::new(),
            current: None,
            requested: None,
        }
    }

    pub fn set_framerate(&mut self, fps: f32) {
        debug_assert!(fps > 0.0);
        self.frame_step = 1.0 / fps;
    }

    pub fn framerate(&self) -> f32 {
        1.0 / self.frame_step
    }

    pub fn frame_size(&self) -> UVec2 {
        self.frame_size
    }

    pub fn add_clip(&mut self, name: impl Into<String>, clip: Clip) {
        self.clips.insert(name.into(), clip);
    }

    /// Start a clip now (`force`), or queue it to take over when the
    /// current clip finishes. Unknown names are ignored.
    pub fn play(&mut self, name: &str, force: bool) {
        if !self.clips.contains_key(name) {
            log::warn!("unknown animation clip {name:?}");
            return;
        }
        if force || self.current.is_none() {
            self.accum = 0.0;
            self.current_frame = 0;
            self.current = Some(name.to_string());
        } else {
            self.requested = Some(name.to_string());
        }
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Advance by `dt` seconds, stepping whole frames off the accumulator.
    pub fn advance(&mut self, dt: f32) {
        let Some(current) = self.current.clone() else {
            return;
        };
        self.accum += dt;
        while self.accum >= self.frame_step {
            self.accum -= self.frame_step;
            let clip = self.clips[&current];
            if self.current_frame + 1 < clip.frames {
                self.current_frame += 1;
            } else if let Some(next) = self.requested.take() {
                self.accum = 0.0;
                self.current_frame = 0;
                self.current = Some(next);
                break;
            } else if clip.repeat {
                self.current_frame = 0;
            } else {
                // Freeze on the final frame
                self.accum = 0.0;
                break;
            }
        }
    }

    /// Top-left pixel cell of the frame to draw, in sprite-sheet space.
    pub fn frame_cell(&self) -> UVec2 {
        match self.current.as_ref().and_then(|name| self.clips.get(name)) {
            Some(clip) => UVec2::new(
                clip.first_cell.x + self.current_frame * self.frame_size.x,
                clip.first_cell.y,
            ),
            None => UVec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> Animation {
        let mut anim = Animation::new(UVec2::new(16, 32), 10.0);
        anim.add_clip(
            "walk",
            Clip {
                first_cell: UVec2::new(0, 32),
                frames: 4,
                repeat: true,
            },
        );
        anim.add_clip(
            "wave",
            Clip {
                first_cell: UVec2::new(0, 64),
                frames: 2,
                repeat: false,
            },
        );
        anim
    }

    #[test]
    fn test_advance_steps_frames() {
        let mut anim = walker();
        anim.play("walk", true);
        assert_eq!(anim.frame_cell(), UVec2::new(0, 32));

        anim.advance(0.25); // 2.5 frames at 10 fps
        assert_eq!(anim.frame_cell(), UVec2::new(32, 32));
    }

    #[test]
    fn test_repeating_clip_wraps() {
        let mut anim = walker();
        anim.play("walk", true);
        anim.advance(0.45); // one full 4-frame cycle plus slack
        assert_eq!(anim.frame_cell(), UVec2::new(0, 32));
    }

    #[test]
    fn test_non_repeating_clip_freezes_then_hands_over() {
        let mut anim = walker();
        anim.play("wave", true);
        anim.advance(1.0);
        assert_eq!(anim.current_clip(), Some("wave"));
        assert_eq!(anim.frame_cell(), UVec2::new(16, 64));

        anim.play("walk", false);
        anim.advance(0.1);
        assert_eq!(anim.current_clip(), Some("walk"));
        assert_eq!(anim.frame_cell(), UVec2::new(0, 32));
    }

    #[test]
    fn test_unknown_clip_ignored() {
        let mut anim = walker();
        anim.play("swim", true);
        assert_eq!(anim.current_clip(), None);
        anim.advance(0.5);
        assert_eq!(anim.frame_cell(), UVec2::ZERO);
    }
}
