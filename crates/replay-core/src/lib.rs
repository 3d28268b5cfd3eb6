//! Playback and request resilience engine for segmented recording replay.

pub mod config;
pub mod logging;

pub mod api;
pub mod buffer;
pub mod cameras;
pub mod classify;
pub mod codec;
pub mod control;
pub mod device;
pub mod loading_timeout;
pub mod navigator;
pub mod notice;
pub mod probe;
pub mod retry;
pub mod seek;
pub mod segments;
pub mod session;
pub mod surface;
pub mod timer;

