//! Sound cues
//!
//! Abilities request audio by name and volume; playback belongs to the audio
//! backend. Requests are fire-and-forget: nothing in the simulation waits on
//! them or reacts to playback failures.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::settings::GameSettings;

/// A named audio asset and the volume it should be played at (0.0 - 1.0)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub path: String,
    pub volume: f32,
}

impl SoundCue {
    pub fn new(path: impl Into<String>, volume: f32) -> Self {
        Self {
            path: path.into(),
            volume,
        }
    }
}

/// Event fired when something wants a sound played
#[derive(Event, Clone, Debug)]
pub struct SoundRequest {
    /// Entity whose action produced the sound
    pub source: Entity,
    pub cue: SoundCue,
}

/// Running tally of dispatched sound requests
#[derive(Resource, Default, Debug)]
pub struct SoundLedger {
    pub dispatched: usize,
    pub last: Option<SoundCue>,
}

/// Hand sound requests to the audio backend.
///
/// The headless build has no backend, so requests are logged with their
/// effective volume and counted.
pub fn dispatch_sound_requests(
    mut requests: EventReader<SoundRequest>,
    settings: Res<GameSettings>,
    mut ledger: ResMut<SoundLedger>,
) {
    for request in requests.read() {
        let volume = (request.cue.volume * settings.master_volume).clamp(0.0, 1.0);
        debug!(
            "Sound '{}' at volume {:.2} (source {:?})",
            request.cue.path, volume, request.source
        );
        ledger.dispatched += 1;
        ledger.last = Some(request.cue.clone());
    }
}
