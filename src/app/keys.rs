use serde::{Deserialize, Serialize};

/// The four media keys the remote can inject. The keycodes are the Android
/// framework `KeyEvent` constants consumed by `input keyevent`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MediaKey {
    PlayPause,
    Stop,
    Next,
    Previous,
}

impl MediaKey {
    pub const ALL: [MediaKey; 4] = [
        MediaKey::PlayPause,
        MediaKey::Stop,
        MediaKey::Next,
        MediaKey::Previous,
    ];

    pub fn keycode(&self) -> u32 {
        match self {
            MediaKey::PlayPause => 85,
            MediaKey::Stop => 86,
            MediaKey::Next => 87,
            MediaKey::Previous => 88,
        }
    }

    /// Framework constant name, rendered verbatim in the status label.
    pub fn android_name(&self) -> &'static str {
        match self {
            MediaKey::PlayPause => "KEYCODE_MEDIA_PLAY_PAUSE",
            MediaKey::Stop => "KEYCODE_MEDIA_STOP",
            MediaKey::Next => "KEYCODE_MEDIA_NEXT",
            MediaKey::Previous => "KEYCODE_MEDIA_PREVIOUS",
        }
    }

    /// Wire name used by the frontend and the smoke binary.
    pub fn wire_name(&self) -> &'static str {
        match self {
            MediaKey::PlayPause => "play_pause",
            MediaKey::Stop => "stop",
            MediaKey::Next => "next",
            MediaKey::Previous => "previous",
        }
    }

    pub fn parse(value: &str) -> Option<MediaKey> {
        match value.trim().to_lowercase().as_str() {
            "play_pause" | "playpause" | "play-pause" => Some(MediaKey::PlayPause),
            "stop" => Some(MediaKey::Stop),
            "next" => Some(MediaKey::Next),
            "previous" | "prev" => Some(MediaKey::Previous),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keycodes_match_android_constants() {
        assert_eq!(MediaKey::PlayPause.keycode(), 85);
        assert_eq!(MediaKey::Stop.keycode(), 86);
        assert_eq!(MediaKey::Next.keycode(), 87);
        assert_eq!(MediaKey::Previous.keycode(), 88);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!(MediaKey::parse("play_pause"), Some(MediaKey::PlayPause));
        assert_eq!(MediaKey::parse("  NEXT "), Some(MediaKey::Next));
        assert_eq!(MediaKey::parse("prev"), Some(MediaKey::Previous));
        assert_eq!(MediaKey::parse("volume_up"), None);
    }

    #[test]
    fn wire_names_round_trip() {
        for key in MediaKey::ALL {
            assert_eq!(MediaKey::parse(key.wire_name()), Some(key));
        }
    }
}
