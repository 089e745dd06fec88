//! Subcommand implementations.
//!
//! Each command takes already-read input and returns its output, so the
//! binary only handles argument parsing and I/O.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Serialize;

use paint_core::pixels::HEX_COORD_MAX;
use paint_core::strokes;
use paint_core::{
    EditAction, PaintConfig, PaintSession, PixelStore, SessionStore, SubmitOutcome, Submitter,
    SystemClock, Theme,
};

use crate::validation::{validate_hex_payload, validate_input_size};

/// Resolve configuration: the JSON file if given, then a data dir override.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn load_config(
    path: Option<&Path>,
    data_dir: Option<&Path>,
) -> anyhow::Result<PaintConfig> {
    let mut config = match path {
        Some(path) => PaintConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PaintConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = Some(dir.to_path_buf());
    }
    Ok(config)
}

/// Theme from a JSON file, or a blank one sized from `config`.
///
/// # Errors
///
/// Returns an error if the theme file cannot be read or parsed.
pub fn load_theme(path: Option<&Path>, config: &PaintConfig) -> anyhow::Result<Theme> {
    let Some(path) = path else {
        return Ok(Theme {
            size: config.canvas_size,
            ..Theme::default()
        });
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read theme {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid theme {}", path.display()))
}

/// Open the persisted session in the configured data directory.
///
/// # Errors
///
/// Returns an error if no data directory is configured or it cannot be
/// created.
pub fn open_session(config: &PaintConfig, theme: Theme) -> anyhow::Result<PaintSession> {
    let store = open_store(config)?;
    let mut session = PaintSession::new(theme, config, store, Arc::new(SystemClock::new()));
    session.start();
    Ok(session)
}

fn open_store(config: &PaintConfig) -> anyhow::Result<SessionStore> {
    let Some(dir) = &config.data_dir else {
        bail!("No data directory configured (use --data-dir or PAINT_DATA_DIR)");
    };
    SessionStore::with_data_dir(dir)
        .with_context(|| format!("Failed to open data directory {}", dir.display()))
}

/// Forget the saved session. Returns whether there was one.
///
/// # Errors
///
/// Returns an error if no data directory is configured or it cannot be
/// created.
pub fn reset(config: &PaintConfig) -> anyhow::Result<bool> {
    let store = open_store(config)?;
    let existed = store.load().is_some();
    store.clear();
    tracing::info!(existed, "Cleared saved session");
    Ok(existed)
}

/// Clipboard stroke JSON → hex payload.
///
/// # Errors
///
/// Returns an error if the text holds no valid strokes or a pixel cannot be
/// hex encoded.
pub fn encode(strokes_json: &str, with_prefix: bool) -> anyhow::Result<String> {
    validate_input_size(strokes_json.len())?;
    let Some(pixels) = strokes::from_strokes_json(strokes_json, HEX_COORD_MAX + 1) else {
        bail!("Input is not a stroke array or holds no valid strokes");
    };
    let hex = if with_prefix {
        strokes::hex_clipboard_text(&pixels)?
    } else {
        pixels.to_hex()?
    };
    Ok(hex)
}

/// Hex payload (optionally `0x`-prefixed) → clipboard stroke JSON.
///
/// Malformed input is decoded leniently with a warning, or rejected when
/// `strict` is set.
///
/// # Errors
///
/// Returns an error in strict mode for malformed input.
pub fn decode(hex: &str, strict: bool) -> anyhow::Result<String> {
    let hex = strokes::strip_hex_prefix(hex);
    if let Err(e) = validate_hex_payload(hex) {
        if strict {
            return Err(e).context("Malformed hex payload");
        }
        tracing::warn!("Decoding malformed hex payload leniently: {e}");
    }
    let pixels = PixelStore::from_hex(hex);
    Ok(strokes::to_strokes_json(&pixels)?)
}

/// Animation stroke JSON for the session's frames.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn animation(session: &PaintSession) -> anyhow::Result<String> {
    Ok(session.copy_animation()?)
}

/// Transport payloads, with animation mode taken from the session unless
/// overridden.
///
/// # Errors
///
/// Returns an error if a frame cannot be hex encoded.
pub fn payloads(session: &PaintSession, animation: Option<bool>) -> anyhow::Result<Vec<String>> {
    let frames = session.frames_with_working();
    let animation = animation.unwrap_or_else(|| session.animation_enabled());
    Ok(strokes::transport_payloads(
        frames.frames(),
        frames.active_index(),
        animation,
    )?)
}

/// Per-frame summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    /// Frame index.
    pub index: usize,
    /// Frame label.
    pub label: String,
    /// Occupied pixels.
    pub pixels: usize,
    /// How long playback shows the frame, in milliseconds.
    pub duration_ms: u128,
}

/// Session summary printed by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Theme name.
    pub theme: String,
    /// Canvas size.
    pub size: u32,
    /// Frames in order.
    pub frames: Vec<FrameSummary>,
    /// Active frame index.
    pub active_frame_index: usize,
    /// Whether animation submission is on.
    pub animation_enabled: bool,
    /// Pixels over every frame.
    pub total_pixels: usize,
    /// Brush strength left, when a strength was given.
    pub remaining_strength: Option<i128>,
}

/// Summarize a session. `strength` is `(strength, already_used)`.
#[must_use]
pub fn inspect(session: &PaintSession, strength: Option<(u64, u64)>) -> SessionSummary {
    let frames = session.frames_with_working();
    SessionSummary {
        theme: session.theme().name.clone(),
        size: session.theme().size,
        frames: frames
            .frames()
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameSummary {
                index,
                label: frame.label.clone(),
                pixels: frame.pixels.len(),
                duration_ms: paint_core::frame_duration(frame.pixels.len()).as_millis(),
            })
            .collect(),
        active_frame_index: frames.active_index(),
        animation_enabled: session.animation_enabled(),
        total_pixels: frames.total_pixel_count(),
        remaining_strength: strength
            .map(|(strength, used)| session.remaining_strength(strength, used)),
    }
}

/// Apply a JSON array of edit actions to the session, then flush it to
/// storage. Returns how many actions changed the pixels.
///
/// # Errors
///
/// Returns an error if the input is not an array of actions.
pub fn apply_actions(session: &mut PaintSession, actions_json: &str) -> anyhow::Result<usize> {
    validate_input_size(actions_json.len())?;
    let actions: Vec<EditAction> =
        serde_json::from_str(actions_json).context("Expected a JSON array of edit actions")?;
    let total = actions.len();
    let changed = actions
        .into_iter()
        .map(|action| session.apply(action))
        .filter(|changed| *changed)
        .count();
    session.stop();
    tracing::info!("Applied {total} actions, {changed} changed the canvas");
    Ok(changed)
}

/// Submit the session through `submitter`, then flush it to storage.
///
/// # Errors
///
/// Returns an error if submission fails for a reason other than the user
/// cancelling.
pub async fn submit(
    session: &mut PaintSession,
    submitter: &dyn Submitter,
    day: u64,
    brush_id: u64,
) -> anyhow::Result<SubmitOutcome> {
    let outcome = session
        .submit(submitter, day, brush_id)
        .await
        .context("Submission failed")?;
    session.stop();
    Ok(outcome)
}
