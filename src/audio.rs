//! Audio collaborator interface
//!
//! The simulation decides *what* to play; playback itself lives outside the
//! core. [`AudioSink`] is the narrow interface the sim calls into, and
//! [`QueuedAudio`] records commands for whatever output backend the shell
//! wires up to drain each frame.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball hits paddle
    PaddleHit,
    /// Ball hits wall
    WallHit,
    /// Ball hits block (doesn't break)
    BlockHit,
    /// Block breaks
    BlockBreak,
    /// Pickup collected
    ItemPickup,
    /// Ball lost past the paddle
    BallLost,
    /// Level cleared
    LevelClear,
    /// Ball launched
    Launch,
    /// Game over
    GameOver,
}

/// What the core asks of the audio layer
pub trait AudioSink {
    fn play_effect(&mut self, effect: SoundEffect);
    /// Music pitch follows the simulation speed multiplier
    fn set_music_pitch(&mut self, pitch: f32);
}

/// A recorded audio command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCommand {
    Play(SoundEffect),
    MusicPitch(f32),
}

/// Records commands for the shell to drain once per frame
#[derive(Debug, Default)]
pub struct QueuedAudio {
    commands: Vec<AudioCommand>,
}

impl QueuedAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all commands recorded since the last drain
    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl AudioSink for QueuedAudio {
    fn play_effect(&mut self, effect: SoundEffect) {
        self.commands.push(AudioCommand::Play(effect));
    }

    fn set_music_pitch(&mut self, pitch: f32) {
        self.commands.push(AudioCommand::MusicPitch(pitch));
    }
}

/// Discards everything (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_effect(&mut self, _effect: SoundEffect) {}
    fn set_music_pitch(&mut self, _pitch: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_records_in_order() {
        let mut audio = QueuedAudio::new();
        audio.play_effect(SoundEffect::ItemPickup);
        audio.set_music_pitch(0.5);
        assert_eq!(
            audio.drain(),
            vec![
                AudioCommand::Play(SoundEffect::ItemPickup),
                AudioCommand::MusicPitch(0.5)
            ]
        );
        assert!(audio.drain().is_empty());
    }
}
