//! Ambient playback for relaxation sessions.
//!
//! rodio's output objects are not `Send`, so a dedicated audio thread
//! owns the stream and sink and everything else talks to it over a
//! command channel.

pub mod chime;
pub mod ocean;
pub mod tone;

use chime::Chime;
use ocean::OceanSurf;
use tone::CalmTone;

use rodio::{OutputStream, Sink};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use crate::log_warn;

const ENABLE_LOGS: bool = true;

/// Generated soundscapes offered on the sessions screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AmbientSound {
    OceanSurf,
    CalmTone,
}

impl Default for AmbientSound {
    fn default() -> Self {
        AmbientSound::OceanSurf
    }
}

enum AudioCommand {
    Start(AmbientSound),
    Stop,
    Pause,
    Resume,
    SetVolume(f32),
    Chime,
}

/// Cloneable handle to the audio thread. The thread is spawned lazily on
/// the first command.
#[derive(Clone)]
pub struct AmbientEngine {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    is_paused: Arc<AtomicBool>,
}

impl AmbientEngine {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            is_paused: Arc::new(AtomicBool::new(false)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let is_paused = Arc::clone(&self.is_paused);

        thread::Builder::new()
            .name("calmify-audio".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("failed to open audio output: {e}"))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("failed to create audio sink: {e}"))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Start(sound) => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                log_warn!("Ambient start failed: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                match sound {
                                    AmbientSound::OceanSurf => s.append(OceanSurf::new()),
                                    AmbientSound::CalmTone => s.append(CalmTone::new()),
                                }
                                s.play();
                            }
                            is_paused.store(false, Ordering::SeqCst);
                        }
                        AudioCommand::Stop => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            is_paused.store(false, Ordering::SeqCst);
                        }
                        AudioCommand::Pause => {
                            if let Some(ref s) = sink {
                                s.pause();
                                is_paused.store(true, Ordering::SeqCst);
                            }
                        }
                        AudioCommand::Resume => {
                            if let Some(ref s) = sink {
                                s.play();
                                is_paused.store(false, Ordering::SeqCst);
                            }
                        }
                        AudioCommand::SetVolume(v) => {
                            if let Some(ref s) = sink {
                                s.set_volume(v.clamp(0.0, 1.0));
                            }
                        }
                        AudioCommand::Chime => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                log_warn!("Chime playback failed: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(Chime::new());
                                s.play();
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    pub fn start(&self, sound: AmbientSound) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Start(sound)).map_err(|e| e.to_string())
    }

    /// Stopping before the thread exists is a no-op.
    pub fn stop(&self) -> Result<(), String> {
        let guard = self.tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = guard.as_ref() {
            tx.send(AudioCommand::Stop).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn pause(&self) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Pause).map_err(|e| e.to_string())
    }

    pub fn resume(&self) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Resume).map_err(|e| e.to_string())
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::SetVolume(volume))
            .map_err(|e| e.to_string())
    }

    pub fn chime(&self) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Chime).map_err(|e| e.to_string())
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::SeqCst)
    }
}
