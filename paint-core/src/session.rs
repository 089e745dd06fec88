//! A painting session: editor, frames, persistence and submission wired
//! together.
//!
//! The session owns no timers. Callers drive it with [`PaintSession::tick`],
//! and the injected [`Clock`] decides when debounced work is due.
//!
//! Two deferred jobs run off the working pixels:
//!
//! - frame sync copies the editor's pixels into the active frame once edits
//!   go quiet,
//! - persist writes the frame collection to the [`SessionStore`] once the
//!   frames go quiet.
//!
//! Loading another frame into the editor must not be mistaken for an edit, so
//! a frame switch cancels any pending sync and suppresses new ones until the
//! next tick.
//!
//! An animation preview plays a snapshot of the frames taken when it opens.
//! It advances on [`PaintSession::tick`] and closes when the session stops.

use std::sync::Arc;
use std::time::Duration;

use crate::strokes;
use crate::{
    AnimationPlayer, Clock, Debouncer, EditAction, EditorState, FrameManager, PaintConfig,
    PaintError, PaintResult, PixelStore, RedrawRequest, SessionDocument, SessionStore, Shortcut,
    SubmitError, SubmitOutcome, Submitter, Theme,
};

/// A playing preview and the frames it was opened on.
#[derive(Debug)]
struct Preview {
    player: AnimationPlayer,
    frames: FrameManager,
}

/// Editing session over one theme's canvas.
#[derive(Debug)]
pub struct PaintSession {
    theme: Theme,
    editor: EditorState,
    frames: FrameManager,
    animation_enabled: bool,
    store: SessionStore,
    clock: Arc<dyn Clock>,
    frame_sync: Debouncer,
    persist: Debouncer,
    redraw: RedrawRequest,
    preview: Option<Preview>,
    /// Set by a frame switch, cleared by the next tick.
    switching: bool,
    running: bool,
}

impl PaintSession {
    /// Create a session, restoring frames from `store` when it holds any.
    #[must_use]
    pub fn new(
        theme: Theme,
        config: &PaintConfig,
        store: SessionStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let restored = store.load().and_then(SessionDocument::into_frames);
        let (frames, animation_enabled) = match restored {
            Some(restored) => {
                tracing::info!("Restored {} frames from storage", restored.0.len());
                restored
            }
            None => (FrameManager::new(), false),
        };
        let mut editor =
            EditorState::new(theme.size).with_history_limit(config.history_limit);
        editor.load_pixels(frames.active_frame().pixels.clone());

        Self {
            theme,
            editor,
            frames,
            animation_enabled,
            store,
            clock,
            frame_sync: Debouncer::new(config.frame_sync_delay()),
            persist: Debouncer::new(config.persist_delay()),
            redraw: RedrawRequest::new(),
            preview: None,
            switching: false,
            running: false,
        }
    }

    /// Begin processing deferred work.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.redraw.request();
        tracing::info!("Paint session started for theme {:?}", self.theme.name);
    }

    /// Run every pending job immediately and stop.
    ///
    /// Pending work is flushed even if the session was never started, and
    /// working pixels that never reached the active frame are synced.
    pub fn stop(&mut self) {
        self.close_preview();
        let active = &self.frames.active_frame().pixels;
        let unsynced =
            !self.editor.pixels().same_storage(active) && self.editor.pixels() != active;
        if self.frame_sync.flush() || unsynced {
            self.sync_active_frame();
        }
        if self.persist.flush() {
            self.persist_now();
        }
        if std::mem::take(&mut self.running) {
            tracing::info!(
                redraws = self.redraw.delivered(),
                requested = self.redraw.requested(),
                "Paint session stopped"
            );
        }
    }

    /// Whether the session is started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The day's theme.
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The editor.
    #[must_use]
    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Frames as last synced. The active frame may lag the editor until the
    /// next frame sync; see [`PaintSession::frames_with_working`].
    #[must_use]
    pub fn frames(&self) -> &FrameManager {
        &self.frames
    }

    /// Frames with the editor's working pixels in the active slot.
    #[must_use]
    pub fn frames_with_working(&self) -> FrameManager {
        let mut frames = self.frames.clone();
        frames.update_frame_pixels(frames.active_index(), self.editor.pixels().clone());
        frames
    }

    /// Whether submission sends every frame.
    #[must_use]
    pub fn animation_enabled(&self) -> bool {
        self.animation_enabled
    }

    /// The session store.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Whether a frame sync is waiting.
    #[must_use]
    pub fn frame_sync_pending(&self) -> bool {
        self.frame_sync.has_pending()
    }

    /// Whether a persist is waiting.
    #[must_use]
    pub fn persist_pending(&self) -> bool {
        self.persist.has_pending()
    }

    /// Earliest time at which [`PaintSession::tick`] has work to do.
    #[must_use]
    pub fn next_wakeup(&self) -> Option<Duration> {
        [
            self.frame_sync.deadline(),
            self.persist.deadline(),
            self.preview.as_ref().and_then(|p| p.player.next_advance()),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Feed one action to the editor. Returns whether the pixels changed.
    pub fn apply(&mut self, action: EditAction) -> bool {
        let changed = self.editor.apply(action);
        self.redraw.request();
        if changed {
            self.pixels_changed();
        }
        changed
    }

    fn pixels_changed(&mut self) {
        if self.switching {
            return;
        }
        self.frame_sync.schedule(self.clock.now());
    }

    /// Run due jobs. Returns `true` when a redraw should happen now.
    ///
    /// Redraw requests made since the last tick collapse into one.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.switching = false;
        let now = self.clock.now();
        if self.frame_sync.fire_if_due(now) {
            self.sync_active_frame();
        }
        if self.persist.fire_if_due(now) {
            self.persist_now();
        }
        if let Some(preview) = &mut self.preview {
            if preview.player.tick(now) {
                self.redraw.request();
            }
        }
        self.redraw.take()
    }

    /// Start previewing the animation from its first frame. Returns the
    /// number of frames shown. Reopening restarts from the current frames.
    pub fn open_preview(&mut self) -> usize {
        let frames = self.frames_with_working();
        let player = AnimationPlayer::new(frames.frames(), self.clock.now());
        let count = player.frame_count();
        self.preview = Some(Preview { player, frames });
        self.redraw.request();
        tracing::debug!("Opened animation preview over {count} frames");
        count
    }

    /// The preview player, while a preview is open.
    #[must_use]
    pub fn preview(&self) -> Option<&AnimationPlayer> {
        self.preview.as_ref().map(|p| &p.player)
    }

    /// What the preview shows now: the theme's shared canvas with frames up to
    /// the current one on top.
    #[must_use]
    pub fn preview_pixels(&self) -> Option<PixelStore> {
        let preview = self.preview.as_ref()?;
        Some(preview.player.render(&preview.frames, &self.theme.background()))
    }

    /// Pause or resume the preview.
    pub fn toggle_preview(&mut self) {
        if let Some(preview) = &mut self.preview {
            preview.player.toggle(self.clock.now());
        }
    }

    /// Close the preview. Returns whether one was open.
    pub fn close_preview(&mut self) -> bool {
        let Some(mut preview) = self.preview.take() else {
            return false;
        };
        preview.player.dismiss();
        self.redraw.request();
        tracing::debug!("Closed animation preview");
        true
    }

    fn sync_active_frame(&mut self) {
        self.save_working();
        self.frames_changed();
    }

    fn frames_changed(&mut self) {
        self.persist.schedule(self.clock.now());
    }

    fn persist_now(&self) {
        match SessionDocument::from_frames(&self.frames, self.animation_enabled) {
            Ok(document) => self.store.save(&document),
            Err(e) => tracing::warn!("Failed to encode session for storage: {e}"),
        }
    }

    /// Copy the working pixels into the active frame.
    fn save_working(&mut self) {
        let active = self.frames.active_index();
        self.frames
            .update_frame_pixels(active, self.editor.pixels().clone());
    }

    /// Put the active frame into the editor without treating it as an edit.
    fn load_active(&mut self) {
        self.switching = true;
        self.frame_sync.cancel();
        self.editor
            .load_pixels(self.frames.active_frame().pixels.clone());
        self.redraw.request();
        self.frames_changed();
    }

    /// Make frame `index` active (clamped).
    pub fn switch_frame(&mut self, index: usize) -> usize {
        self.save_working();
        let active = self.frames.switch_frame(index);
        self.load_active();
        tracing::debug!("Switched to frame {active}");
        active
    }

    /// Append an empty frame and edit it.
    pub fn add_frame(&mut self) -> usize {
        self.save_working();
        let active = self.frames.add_frame();
        self.load_active();
        active
    }

    /// Delete frame `index` and edit whichever frame is then active.
    ///
    /// Refused for the last remaining frame or an invalid index.
    pub fn delete_frame(&mut self, index: usize) -> bool {
        self.save_working();
        if !self.frames.delete_frame(index) {
            return false;
        }
        self.load_active();
        true
    }

    /// Duplicate frame `index` and edit the copy.
    pub fn duplicate_frame(&mut self, index: usize) -> bool {
        self.save_working();
        if !self.frames.duplicate_frame(index) {
            return false;
        }
        self.load_active();
        true
    }

    /// Turn animation submission on or off.
    pub fn set_animation_enabled(&mut self, enabled: bool) {
        if self.animation_enabled != enabled {
            self.animation_enabled = enabled;
            self.frames_changed();
        }
    }

    /// Clipboard JSON for the working pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn copy_strokes(&self) -> PaintResult<String> {
        strokes::to_strokes_json(self.editor.pixels())
    }

    /// Clipboard JSON for the whole animation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn copy_animation(&self) -> PaintResult<String> {
        strokes::animation_strokes_json(self.frames_with_working().frames())
    }

    /// `0x`-prefixed hex of the working pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if a pixel lies beyond coordinate 255.
    pub fn copy_hex(&self) -> PaintResult<String> {
        strokes::hex_clipboard_text(self.editor.pixels())
    }

    /// Replace the working pixels with pasted strokes.
    ///
    /// Records outside the canvas are dropped. Returns `false` and leaves the
    /// canvas alone when no valid in-canvas stroke remains.
    pub fn paste(&mut self, text: &str) -> bool {
        match strokes::from_strokes_json(text, self.editor.size()) {
            Some(pixels) => self.apply(EditAction::LoadPixels(pixels)),
            None => {
                tracing::debug!("Clipboard text holds no strokes");
                false
            }
        }
    }

    /// Run a keyboard shortcut. Paste reads `clipboard`.
    pub fn handle_shortcut(&mut self, shortcut: Shortcut, clipboard: Option<&str>) -> bool {
        match (shortcut.action(), clipboard) {
            (Some(action), _) => self.apply(action),
            (None, Some(text)) => self.paste(text),
            (None, None) => false,
        }
    }

    /// Pixels over every frame, working pixels included.
    #[must_use]
    pub fn total_pixel_count(&self) -> usize {
        self.frames_with_working().total_pixel_count()
    }

    /// Strength left for a brush after this session's pixels. Display only.
    #[must_use]
    pub fn remaining_strength(&self, strength: u64, used: u64) -> i128 {
        crate::frames::remaining_strength(strength, used, self.total_pixel_count())
    }

    /// Hex payloads a submission would send, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload frame cannot be hex encoded.
    pub fn payloads(&self) -> PaintResult<Vec<String>> {
        let frames = self.frames_with_working();
        strokes::transport_payloads(frames.frames(), frames.active_index(), self.animation_enabled)
    }

    /// Save the working pixels and send the payloads one by one.
    ///
    /// A user rejection stops the run and yields
    /// [`SubmitOutcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::Submission`] for any other backend failure, or a
    /// codec error if a frame cannot be hex encoded.
    pub async fn submit(
        &mut self,
        submitter: &dyn Submitter,
        day: u64,
        brush_id: u64,
    ) -> PaintResult<SubmitOutcome> {
        self.save_working();
        self.frames_changed();
        let payloads = self.payloads()?;
        if payloads.is_empty() {
            tracing::info!("Nothing to submit");
            return Ok(SubmitOutcome::Empty);
        }
        tracing::info!(
            "Submitting {} payloads for day {day} with brush {brush_id}",
            payloads.len()
        );
        for (sent, hex) in payloads.iter().enumerate() {
            match submitter.paint(day, brush_id, hex).await {
                Ok(()) => {}
                Err(SubmitError::Rejected) => {
                    tracing::info!("Submission cancelled by user after {sent} payloads");
                    return Ok(SubmitOutcome::Cancelled { payloads: sent });
                }
                Err(SubmitError::Failed(message)) => {
                    return Err(PaintError::Submission(message));
                }
            }
        }
        Ok(SubmitOutcome::Submitted {
            payloads: payloads.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{ManualClock, Point};

    fn session() -> (PaintSession, ManualClock) {
        let clock = ManualClock::new();
        let mut session = PaintSession::new(
            Theme::new("Test", vec!["#000".into(), "#fff".into()], 16),
            &PaintConfig::default(),
            SessionStore::new(),
            Arc::new(clock.clone()),
        );
        session.start();
        (session, clock)
    }

    fn paint(session: &mut PaintSession, x: i32, y: i32) {
        session.apply(EditAction::PointerDown(Point::new(x, y)));
        session.apply(EditAction::PointerUp(Some(Point::new(x, y))));
    }

    #[test]
    fn test_frame_sync_after_quiet_period() {
        let (mut session, clock) = session();
        paint(&mut session, 1, 1);
        assert!(session.frames().active_frame().pixels.is_empty());

        clock.advance(Duration::from_millis(99));
        session.tick();
        assert!(session.frames().active_frame().pixels.is_empty());

        clock.advance(Duration::from_millis(1));
        session.tick();
        assert_eq!(session.frames().active_frame().pixels.get(1, 1), Some(0));
        assert!(session.persist_pending());
    }

    #[test]
    fn test_persist_after_quiet_period() {
        let (mut session, clock) = session();
        paint(&mut session, 2, 2);
        clock.advance(Duration::from_millis(100));
        session.tick();
        assert!(session.store().load().is_none());
        clock.advance(Duration::from_millis(500));
        session.tick();
        let doc = session.store().load().expect("persisted");
        assert_eq!(doc.frames[0].pixels.as_deref(), Some("020200"));
    }

    #[test]
    fn test_switch_does_not_write_back_through_stale_timer() {
        let (mut session, clock) = session();
        paint(&mut session, 1, 1);
        session.add_frame();
        assert!(!session.frame_sync_pending());
        assert_eq!(session.frames().frames()[0].pixels.get(1, 1), Some(0));
        assert!(session.editor().pixels().is_empty());

        clock.advance(Duration::from_secs(1));
        session.tick();
        assert_eq!(session.frames().frames()[0].pixels.len(), 1);
        assert!(session.frames().frames()[1].pixels.is_empty());
    }

    #[test]
    fn test_edits_after_switch_tick_sync_again() {
        let (mut session, clock) = session();
        session.add_frame();
        session.tick();
        paint(&mut session, 3, 3);
        assert!(session.frame_sync_pending());
        clock.advance(Duration::from_millis(100));
        session.tick();
        assert_eq!(session.frames().frames()[1].pixels.get(3, 3), Some(0));
    }

    #[test]
    fn test_switch_loads_target_and_clears_history() {
        let (mut session, _clock) = session();
        paint(&mut session, 1, 1);
        session.add_frame();
        paint(&mut session, 2, 2);
        assert_eq!(session.switch_frame(0), 0);
        assert_eq!(session.editor().pixels().get(1, 1), Some(0));
        assert!(!session.editor().history().can_undo());
        assert_eq!(session.frames().frames()[1].pixels.get(2, 2), Some(0));
    }

    #[test]
    fn test_delete_and_duplicate_load_active() {
        let (mut session, _clock) = session();
        paint(&mut session, 1, 1);
        assert!(session.duplicate_frame(0));
        assert_eq!(session.frames().active_index(), 1);
        assert_eq!(session.editor().pixels().get(1, 1), Some(0));
        paint(&mut session, 4, 4);
        assert!(session.delete_frame(1));
        assert_eq!(session.frames().len(), 1);
        assert_eq!(session.editor().pixels().len(), 1);
        assert!(!session.delete_frame(0));
    }

    #[test]
    fn test_stop_flushes_pending_work() {
        let (mut session, _clock) = session();
        paint(&mut session, 5, 5);
        session.stop();
        assert!(!session.is_running());
        assert_eq!(session.frames().active_frame().pixels.get(5, 5), Some(0));
        assert!(session.store().load().is_some());
    }

    #[test]
    fn test_restore_from_store() {
        let store = SessionStore::new();
        {
            let clock = ManualClock::new();
            let mut session = PaintSession::new(
                Theme::default(),
                &PaintConfig::default(),
                store.clone(),
                Arc::new(clock),
            );
            session.start();
            paint(&mut session, 7, 7);
            session.add_frame();
            session.set_animation_enabled(true);
            session.stop();
        }
        let restored = PaintSession::new(
            Theme::default(),
            &PaintConfig::default(),
            store,
            Arc::new(ManualClock::new()),
        );
        assert_eq!(restored.frames().len(), 2);
        assert_eq!(restored.frames().active_index(), 1);
        assert!(restored.animation_enabled());
        assert!(restored.editor().pixels().is_empty());
    }

    #[test]
    fn test_redraw_coalesced_per_tick() {
        let (mut session, _clock) = session();
        session.tick();
        session.apply(EditAction::PointerDown(Point::new(0, 0)));
        session.apply(EditAction::PointerMove(Point::new(1, 0)));
        session.apply(EditAction::PointerMove(Point::new(2, 0)));
        assert!(session.tick());
        assert!(!session.tick());
    }

    #[test]
    fn test_paste_and_shortcuts() {
        let (mut session, _clock) = session();
        assert!(!session.paste("garbage"));
        assert!(session.handle_shortcut(
            Shortcut::Paste,
            Some(r#"[{"point":{"x":1,"y":2},"color":1}]"#)
        ));
        assert_eq!(session.editor().pixels().get(1, 2), Some(1));
        assert!(!session.handle_shortcut(Shortcut::Undo, None));
        paint(&mut session, 0, 0);
        assert!(session.handle_shortcut(Shortcut::Undo, None));
        assert!(session.handle_shortcut(Shortcut::Redo, None));
    }

    #[test]
    fn test_paste_outside_canvas_applies_nothing() {
        let (mut session, _clock) = session();
        paint(&mut session, 1, 1);
        assert!(!session.paste(r#"[{"point":{"x":300,"y":0},"color":1}]"#));
        assert!(!session.paste(r#"[{"point":{"x":20000,"y":0},"color":1}]"#));
        assert_eq!(session.editor().pixels().len(), 1);
        assert!(session.editor().history().can_undo());

        assert!(session.paste(
            r#"[{"point":{"x":300,"y":0},"color":1},{"point":{"x":15,"y":0},"color":1}]"#
        ));
        assert_eq!(session.payloads().expect("payloads"), vec!["0f0001"]);
        session.stop();
        assert!(session.store().load().is_some());
    }

    #[test]
    fn test_copy_formats() {
        let (mut session, _clock) = session();
        paint(&mut session, 1, 0);
        assert_eq!(session.copy_hex().expect("hex"), "0x010000");
        assert_eq!(
            session.copy_strokes().expect("json"),
            r#"[{"point":{"x":1,"y":0},"color":0}]"#
        );
        assert!(session.copy_animation().expect("json").starts_with("[["));
    }

    #[test]
    fn test_remaining_strength_counts_working_pixels() {
        let (mut session, _clock) = session();
        paint(&mut session, 1, 1);
        assert_eq!(session.total_pixel_count(), 1);
        assert_eq!(session.remaining_strength(10, 2), 7);
    }

    #[test]
    fn test_preview_plays_snapshot_and_closes_on_stop() {
        let (mut session, clock) = session();
        paint(&mut session, 0, 0);
        session.add_frame();
        paint(&mut session, 1, 0);
        session.tick();

        assert_eq!(session.open_preview(), 2);
        assert_eq!(session.next_wakeup(), Some(clock.now() + Duration::from_millis(100)));
        let first = session.preview_pixels().expect("preview open");
        assert_eq!(first.len(), 1);

        paint(&mut session, 2, 0);
        clock.advance(Duration::from_millis(100));
        assert!(session.tick());
        assert_eq!(session.preview().expect("preview open").current_index(), 1);
        let second = session.preview_pixels().expect("preview open");
        assert_eq!(second.len(), 2);
        assert_eq!(second.get(2, 0), None);

        session.toggle_preview();
        assert!(!session.preview().expect("preview open").is_playing());
        session.stop();
        assert!(session.preview().is_none());
        assert!(!session.close_preview());
    }

    #[test]
    fn test_preview_draws_over_shared_canvas() {
        let clock = ManualClock::new();
        let theme = Theme {
            canvas: "050501".to_string(),
            ..Theme::new("Test", vec!["#000".into(), "#fff".into()], 16)
        };
        let mut session = PaintSession::new(
            theme,
            &PaintConfig::default(),
            SessionStore::new(),
            Arc::new(clock),
        );
        session.start();
        assert!(session.preview_pixels().is_none());
        session.open_preview();
        let shown = session.preview_pixels().expect("preview open");
        assert_eq!(shown.get(5, 5), Some(1));
    }

    #[test]
    fn test_next_wakeup_tracks_debouncers() {
        let (mut session, clock) = session();
        assert_eq!(session.next_wakeup(), None);
        paint(&mut session, 1, 1);
        assert_eq!(session.next_wakeup(), Some(clock.now() + Duration::from_millis(100)));
        clock.advance(Duration::from_millis(100));
        session.tick();
        assert_eq!(session.next_wakeup(), Some(clock.now() + Duration::from_millis(500)));
    }

    #[test]
    fn test_tick_before_start_is_inert() {
        let mut session = PaintSession::new(
            Theme::default(),
            &PaintConfig::default(),
            SessionStore::new(),
            Arc::new(ManualClock::new()),
        );
        session.apply(EditAction::PointerDown(Point::new(0, 0)));
        assert!(!session.tick());
    }
}
