use std::collections::HashMap;

use serde::Deserialize;

use super::{Animation, Direction, Frame, Rect};
use crate::error::SheetError;

/// Raw Aseprite JSON export ("Array" frame layout). Fields we do not use
/// (`filename`, `rotated`, `trimmed`, `spriteSourceSize`, ...) are ignored.
#[derive(Deserialize)]
struct SheetJson {
    frames: Vec<FrameJson>,
    meta: MetaJson,
}

#[derive(Deserialize)]
struct FrameJson {
    frame: Rect,
    duration: u32,
}

#[derive(Deserialize)]
struct MetaJson {
    #[serde(rename = "frameTags")]
    frame_tags: Vec<FrameTagJson>,
}

#[derive(Deserialize)]
struct FrameTagJson {
    name: String,
    from: usize,
    to: usize,
    #[serde(default)]
    direction: Option<String>,
}

/// Parsed metadata of one sprite sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteSheet {
    pub frames: Vec<Frame>,
    pub animations: HashMap<String, Animation>,
}

impl SpriteSheet {
    /// Parse an Aseprite JSON document.
    ///
    /// Frames are read first, then every frame tag is turned into an
    /// [`Animation`] whose total duration is summed from those frames.
    /// Tags that point outside the frame list or that would loop over zero
    /// milliseconds are rejected here so playback never divides by zero.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SheetError> {
        let doc: SheetJson = serde_json::from_slice(bytes)?;

        let frames: Vec<Frame> = doc
            .frames
            .into_iter()
            .map(|f| Frame {
                rect: f.frame,
                duration: f.duration,
            })
            .collect();

        let mut animations = HashMap::with_capacity(doc.meta.frame_tags.len());
        for tag in doc.meta.frame_tags {
            if tag.from > tag.to || tag.to >= frames.len() {
                return Err(SheetError::new("invalid-frame-tag")
                    .with_arg("tag", &tag.name)
                    .with_arg("from", tag.from)
                    .with_arg("to", tag.to)
                    .with_arg("frames", frames.len()));
            }

            let total_duration_ms: u64 = frames[tag.from..=tag.to]
                .iter()
                .map(|f| u64::from(f.duration))
                .sum();
            if total_duration_ms == 0 {
                return Err(SheetError::new("invalid-frame-tag")
                    .with_arg("tag", &tag.name)
                    .with_arg("reason", "zero-duration"));
            }

            let direction = tag
                .direction
                .as_deref()
                .map(Direction::parse)
                .unwrap_or_default();

            animations.insert(
                tag.name,
                Animation {
                    from: tag.from,
                    to: tag.to,
                    total_duration_ms,
                    direction,
                },
            );
        }

        Ok(Self { frames, animations })
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// Animation names, sorted for stable output.
    pub fn animation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HERO: &str = r#"{
        "frames": [
            { "filename": "hero 0.aseprite", "frame": { "x": 0, "y": 0, "w": 16, "h": 16 },
              "rotated": false, "trimmed": false, "duration": 100 },
            { "filename": "hero 1.aseprite", "frame": { "x": 16, "y": 0, "w": 16, "h": 16 },
              "rotated": false, "trimmed": false, "duration": 200 },
            { "filename": "hero 2.aseprite", "frame": { "x": 32, "y": 0, "w": 16, "h": 16 },
              "rotated": false, "trimmed": false, "duration": 50 }
        ],
        "meta": {
            "app": "https://www.aseprite.org/",
            "image": "hero.png",
            "size": { "w": 48, "h": 16 },
            "frameTags": [
                { "name": "idle", "from": 0, "to": 1, "direction": "forward" },
                { "name": "blink", "from": 2, "to": 2, "direction": "pingpong" }
            ]
        }
    }"#;

    #[test]
    fn parses_frames_and_sums_tag_durations() {
        let sheet = SpriteSheet::from_json(HERO.as_bytes()).unwrap();
        assert_eq!(sheet.frames.len(), 3);
        assert_eq!(sheet.frames[1].rect, Rect::new(16, 0, 16, 16));

        let idle = sheet.animation("idle").unwrap();
        assert_eq!((idle.from, idle.to), (0, 1));
        assert_eq!(idle.total_duration_ms, 300);
        assert_eq!(idle.frame_count(), 2);

        let blink = sheet.animation("blink").unwrap();
        assert_eq!(blink.total_duration_ms, 50);
        assert_eq!(blink.direction, Direction::Pingpong);

        assert_eq!(sheet.animation_names(), vec!["blink", "idle"]);
    }

    #[test]
    fn missing_frame_tags_is_a_parse_failure() {
        let doc = r#"{ "frames": [], "meta": {} }"#;
        let err = SpriteSheet::from_json(doc.as_bytes()).unwrap_err();
        assert_eq!(err.key, "metadata-parse");
    }

    #[test]
    fn missing_frames_is_a_parse_failure() {
        let doc = r#"{ "meta": { "frameTags": [] } }"#;
        assert!(SpriteSheet::from_json(doc.as_bytes()).is_err());
    }

    #[test]
    fn rejects_tags_outside_frame_list() {
        let doc = r#"{
            "frames": [ { "frame": { "x": 0, "y": 0, "w": 1, "h": 1 }, "duration": 10 } ],
            "meta": { "frameTags": [ { "name": "run", "from": 0, "to": 3 } ] }
        }"#;
        let err = SpriteSheet::from_json(doc.as_bytes()).unwrap_err();
        assert_eq!(err.key, "invalid-frame-tag");
        assert_eq!(err.arg("tag"), Some("run"));
    }

    #[test]
    fn rejects_zero_length_loops() {
        let doc = r#"{
            "frames": [
                { "frame": { "x": 0, "y": 0, "w": 1, "h": 1 }, "duration": 0 },
                { "frame": { "x": 1, "y": 0, "w": 1, "h": 1 }, "duration": 0 }
            ],
            "meta": { "frameTags": [ { "name": "still", "from": 0, "to": 1 } ] }
        }"#;
        let err = SpriteSheet::from_json(doc.as_bytes()).unwrap_err();
        assert_eq!(err.arg("reason"), Some("zero-duration"));
    }

    #[test]
    fn zero_duration_frames_inside_a_live_loop_are_kept() {
        let doc = r#"{
            "frames": [
                { "frame": { "x": 0, "y": 0, "w": 1, "h": 1 }, "duration": 0 },
                { "frame": { "x": 1, "y": 0, "w": 1, "h": 1 }, "duration": 40 }
            ],
            "meta": { "frameTags": [ { "name": "skip", "from": 0, "to": 1 } ] }
        }"#;
        let sheet = SpriteSheet::from_json(doc.as_bytes()).unwrap();
        assert_eq!(sheet.animation("skip").unwrap().total_duration_ms, 40);
    }
}
