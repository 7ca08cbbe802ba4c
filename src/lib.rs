//! voxclip — push-to-talk dictation that turns audio into clipboard text.
//!
//! The crate is built around one adaptive pipeline: captured audio is
//! wrapped into a WAV container, classified by encoded size, and either
//! transcribed in a single Gemini call or degraded through time
//! compression, silence segmentation and bounded-concurrency per-segment
//! transcription before the pieces are reassembled in order.  A failed run
//! retains the container at a fixed path so `voxclip-recover` can replay it
//! later through the identical pipeline.
//!
//! # Module map
//!
//! | Module        | Responsibility                                         |
//! |---------------|--------------------------------------------------------|
//! | [`audio`]     | arecord capture, PCM buffer, WAV encoding              |
//! | [`config`]    | TOML settings, XDG paths                               |
//! | [`tools`]     | external binaries: ffmpeg speedup, sox silence split   |
//! | [`transcribe`]| Gemini REST client, semaphore-bounded worker pool      |
//! | [`pipeline`]  | strategy classification, orchestration, reassembly     |
//! | [`deliver`]   | clipboard publication                                  |
//! | [`recovery`]  | fixed-path retained-audio store                        |

pub mod audio;
pub mod config;
pub mod deliver;
pub mod pipeline;
pub mod recovery;
pub mod tools;
pub mod transcribe;
