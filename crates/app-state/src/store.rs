//! The timeline store: single owner of the editable document, its history,
//! and the presentation state published alongside it.
//!
//! Every mutating operation runs against a working copy of the document and
//! only replaces the committed document once all invariants hold, so a failed
//! edit never leaves partial changes behind.

use std::sync::Arc;

use cd_common::{
    ClipId, EditError, EditResult, EditorConfig, EntityKind, IdAllocator, Millis, SnapConfig,
    TrackId, ViewConfig,
};
use cd_timeline::snap::{self, snap_span, snap_time};
use cd_timeline::{
    audio::clamp_subtrack_volume, AudioTrackSettings, Clip, ClipPatch, ClipSpec, Track,
    TrackType, TrimEdge,
};
use crossbeam::channel::Receiver;

use crate::history::HistoryManager;
use crate::interaction::{DragKind, DragSession, Transaction};
use crate::observer::SnapshotPublisher;
use crate::pip::PipState;
use crate::playback::PlayerStore;
use crate::selection::SelectionState;
use crate::snapshot::{StoreSnapshot, TimelineSnapshot};
use crate::state::{DurationMode, TimelineState};

/// Explicitly constructed per editing session; dropped or `close`d at session end.
pub struct TimelineStore {
    config: EditorConfig,
    doc: TimelineState,
    ids: IdAllocator,
    history: HistoryManager,
    selection: SelectionState,
    view: ViewConfig,
    snap: SnapConfig,
    pip: PipState,
    transaction: Option<Transaction>,
    drag: Option<DragSession>,
    publisher: SnapshotPublisher,
    revision: u64,
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::open(EditorConfig::default())
    }
}

impl TimelineStore {
    /// Open a session with the configured opening tracks.
    pub fn new(config: EditorConfig) -> EditResult<Self> {
        config.validate()?;
        Ok(Self::open(config))
    }

    /// Open a session on a previously serialized document.
    pub fn from_snapshot(config: EditorConfig, snapshot: TimelineSnapshot) -> EditResult<Self> {
        config.validate()?;
        let mut doc = TimelineState::new();
        snapshot.restore(&mut doc);
        for clip in doc.tracks.iter().flat_map(|t| t.clips()) {
            clip.validate()?;
        }
        if !doc.is_consistent() {
            return Err(EditError::bounds("document has overlapping clips or duplicate track numbers"));
        }
        if doc.tracks.len() < config.min_tracks {
            return Err(EditError::TrackFloor {
                minimum: config.min_tracks,
            });
        }
        doc.recalculate_duration();

        let last_id = doc
            .tracks
            .iter()
            .map(|t| t.id.0)
            .chain(doc.tracks.iter().flat_map(|t| t.clips()).map(|c| c.id.0))
            .max()
            .unwrap_or(0);
        let ids = IdAllocator::resume_after(last_id).ok_or_else(|| {
            EditError::bounds(format!("document id {last_id} leaves no ids to allocate"))
        })?;
        let history = HistoryManager::new(config.max_history, TimelineSnapshot::capture(&doc));
        tracing::info!(
            tracks = doc.tracks.len(),
            clips = doc.total_clips(),
            "Timeline store opened from snapshot"
        );
        Ok(Self::assemble(config, doc, ids, history))
    }

    fn open(config: EditorConfig) -> Self {
        let mut ids = IdAllocator::new();
        let mut doc = TimelineState::new();
        let padding = config
            .opening_track_count()
            .saturating_sub(config.initial_video_tracks + config.initial_audio_tracks);
        let opening = std::iter::repeat(TrackType::Video)
            .take(config.initial_video_tracks + padding)
            .chain(std::iter::repeat(TrackType::Audio).take(config.initial_audio_tracks));
        for track_type in opening {
            let track = new_track(&doc, &mut ids, track_type);
            doc.tracks.push(track);
        }
        let history = HistoryManager::new(config.max_history, TimelineSnapshot::capture(&doc));
        tracing::info!(tracks = doc.tracks.len(), "Timeline store opened");
        Self::assemble(config, doc, ids, history)
    }

    fn assemble(
        config: EditorConfig,
        doc: TimelineState,
        ids: IdAllocator,
        history: HistoryManager,
    ) -> Self {
        Self {
            view: config.view,
            snap: config.snap,
            pip: PipState::new(&config.pip),
            config,
            doc,
            ids,
            history,
            selection: SelectionState::new(),
            transaction: None,
            drag: None,
            publisher: SnapshotPublisher::new(),
            revision: 0,
        }
    }

    /// End the session. Subscribers observe their channel disconnecting.
    pub fn close(mut self) {
        if self.transaction.is_some() {
            tracing::warn!("Closing store with an open transaction; discarding it");
        }
        self.publisher.close();
        tracing::info!(revision = self.revision, "Timeline store closed");
    }

    // --- Queries -----------------------------------------------------------

    /// Configuration the session was opened with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Tracks in display order.
    pub fn tracks(&self) -> &[Track] {
        &self.doc.tracks
    }

    /// Look up a track by id.
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.doc.find_track(track_id)
    }

    /// Look up a clip on any track. Stale ids give `None`.
    pub fn get_clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.doc.find_clip(clip_id).map(|(_, c)| c)
    }

    /// Track holding the clip.
    pub fn track_of(&self, clip_id: ClipId) -> Option<&Track> {
        self.doc.find_clip(clip_id).map(|(t, _)| t)
    }

    /// Clips under `time`, in track order.
    pub fn clips_at(&self, time: Millis) -> Vec<&Clip> {
        self.doc.clips_at(time).into_iter().map(|(_, c)| c).collect()
    }

    /// Selected clip if it is under the playhead, else the first clip under it.
    pub fn clip_at_playhead(&self, player: &PlayerStore) -> Option<&Clip> {
        let time = player.position();
        self.selection
            .selected_clip()
            .and_then(|id| self.get_clip(id))
            .filter(|c| c.covers(time))
            .or_else(|| self.doc.clips_at(time).into_iter().map(|(_, c)| c).next())
    }

    /// Derived timeline length under the current duration mode.
    pub fn total_duration(&self) -> Millis {
        self.doc.total_duration
    }

    /// Whether the duration follows content or is pinned.
    pub fn duration_mode(&self) -> DurationMode {
        self.doc.duration_mode
    }

    /// Resolved settings for one audio subtrack: override, then subtrack, then clip.
    pub fn get_audio_track_settings(
        &self,
        clip_id: ClipId,
        track_index: usize,
    ) -> Option<AudioTrackSettings> {
        let clip = self.get_clip(clip_id)?;
        Some(self.doc.audio_overrides.resolve(clip, track_index))
    }

    /// Currently selected clip, if any.
    pub fn selected_clip(&self) -> Option<ClipId> {
        self.selection.selected_clip()
    }

    /// Zoom and scroll state.
    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    /// Snap toggle and pixel threshold.
    pub fn snap_config(&self) -> &SnapConfig {
        &self.snap
    }

    /// Picture-in-picture overlay configuration.
    pub fn pip(&self) -> &PipState {
        &self.pip
    }

    /// Whether an entry before the cursor exists.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether an entry after the cursor exists.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Label of the action `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    /// Label of the action `redo` would reapply.
    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    /// Whether a transaction or drag is open.
    pub fn is_interaction_active(&self) -> bool {
        self.transaction.is_some()
    }

    /// The drag in progress, if any.
    pub fn active_drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Revision of the last published snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Capture the undoable document, e.g. for an external save.
    pub fn document(&self) -> TimelineSnapshot {
        TimelineSnapshot::capture(&self.doc)
    }

    /// Full read-only snapshot for rendering surfaces.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::new(StoreSnapshot {
            revision: self.revision,
            tracks: self.doc.tracks.clone(),
            total_duration: self.doc.total_duration,
            duration_mode: self.doc.duration_mode,
            view: self.view,
            selected_clip_id: self.selection.selected_clip(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            interaction_active: self.transaction.is_some(),
            pip: self.pip.clone(),
        })
    }

    /// Receive a snapshot after every completed mutation, starting with the current one.
    pub fn subscribe(&mut self) -> Receiver<Arc<StoreSnapshot>> {
        let current = self.snapshot();
        self.publisher.subscribe(Some(current))
    }

    /// Whether every document invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.doc.is_consistent()
            && self
                .doc
                .tracks
                .iter()
                .flat_map(|t| t.clips())
                .all(|c| c.validate().is_ok())
    }

    // --- Tracks ------------------------------------------------------------

    pub fn add_track(&mut self, track_type: TrackType) -> EditResult<TrackId> {
        self.apply("Add track", |doc, ids| {
            let track = new_track(doc, ids, track_type);
            let id = track.id;
            tracing::debug!(track = %id, %track_type, number = track.track_number, "Adding track");
            doc.tracks.push(track);
            Ok(id)
        })
    }

    /// Remove a track and all its clips. Refused below the track floor.
    pub fn remove_track(&mut self, track_id: TrackId) -> EditResult<Track> {
        let minimum = self.config.min_tracks;
        self.apply("Remove track", |doc, _| {
            let pos = doc
                .tracks
                .iter()
                .position(|t| t.id == track_id)
                .ok_or_else(|| EditError::track_not_found(track_id))?;
            if doc.tracks.len() <= minimum {
                return Err(EditError::TrackFloor { minimum });
            }
            let track = doc.tracks.remove(pos);
            for clip in track.clips() {
                doc.audio_overrides.remove_clip(clip.id);
            }
            tracing::debug!(track = %track_id, clips = track.len(), "Removed track");
            Ok(track)
        })
    }

    // --- Clips -------------------------------------------------------------

    pub fn add_clip(&mut self, track_id: TrackId, spec: ClipSpec) -> EditResult<ClipId> {
        self.apply("Add clip", |doc, ids| {
            let track = doc
                .find_track_mut(track_id)
                .ok_or_else(|| EditError::track_not_found(track_id))?;
            let clip = Clip::from_spec(ids.next_clip(), spec)?;
            let id = clip.id;
            track.insert_clip(clip)?;
            tracing::debug!(clip_id = %id, track = %track_id, "Clip added");
            Ok(id)
        })
    }

    /// Merge a partial update. Rejected unchanged if any invariant would break.
    pub fn update_clip(&mut self, clip_id: ClipId, patch: &ClipPatch) -> EditResult<()> {
        self.apply("Update clip", |doc, _| replace_with(doc, clip_id, |c| c.patched(patch)))
    }

    pub fn delete_clip(&mut self, clip_id: ClipId) -> EditResult<Clip> {
        self.apply("Delete clip", |doc, _| {
            let track = doc
                .track_of_clip_mut(clip_id)
                .ok_or_else(|| EditError::clip_not_found(clip_id))?;
            let clip = track
                .remove_clip(clip_id)
                .ok_or_else(|| EditError::clip_not_found(clip_id))?;
            doc.audio_overrides.remove_clip(clip_id);
            tracing::debug!(clip_id = %clip_id, "Clip deleted");
            Ok(clip)
        })
    }

    /// Split at track time `at`. The left half keeps `clip_id`; returns the right half's id.
    pub fn split_clip(&mut self, clip_id: ClipId, at: Millis) -> EditResult<ClipId> {
        self.apply("Split clip", |doc, ids| {
            let track = doc
                .track_of_clip_mut(clip_id)
                .ok_or_else(|| EditError::clip_not_found(clip_id))?;
            let clip = track
                .clip(clip_id)
                .ok_or_else(|| EditError::clip_not_found(clip_id))?;
            if !clip.contains_strictly(at) {
                return Err(EditError::NotOverClip { time: at });
            }
            let (left, right) = clip.split_at(at, ids.next_clip())?;
            let right_id = right.id;
            track.replace_clip(left)?;
            track.insert_clip(right)?;
            doc.audio_overrides.duplicate(clip_id, right_id);
            tracing::debug!(clip_id = %clip_id, right = %right_id, at, "Clip split");
            Ok(right_id)
        })
    }

    /// Split the clip under the playhead.
    pub fn split_at_playhead(&mut self, player: &PlayerStore) -> EditResult<ClipId> {
        let time = player.position();
        let Some(clip_id) = self.clip_at_playhead(player).map(|c| c.id) else {
            tracing::warn!(time, "Split requested with no clip under the playhead");
            return Err(EditError::NotOverClip { time });
        };
        self.split_clip(clip_id, time)
    }

    /// Restore the full source span. Fails if the grown clip would overlap a neighbour.
    pub fn reset_trim(&mut self, clip_id: ClipId) -> EditResult<()> {
        self.apply("Reset trim", |doc, _| {
            replace_with(doc, clip_id, |c| Ok(c.with_trim_reset()))
        })
    }

    /// Set one trim edge to the source offset `value`.
    pub fn trim_clip(&mut self, clip_id: ClipId, edge: TrimEdge, value: Millis) -> EditResult<()> {
        self.apply("Trim clip", |doc, _| {
            replace_with(doc, clip_id, |c| c.trimmed(edge, value))
        })
    }

    pub fn move_clip(&mut self, clip_id: ClipId, new_start: Millis) -> EditResult<()> {
        self.apply("Move clip", |doc, _| {
            replace_with(doc, clip_id, |c| c.moved_to(new_start))
        })
    }

    /// Move a clip onto another track of the same type.
    pub fn move_clip_to_track(
        &mut self,
        clip_id: ClipId,
        track_id: TrackId,
        new_start: Millis,
    ) -> EditResult<()> {
        self.apply("Move clip", |doc, _| {
            let (source, clip) = doc
                .find_clip(clip_id)
                .ok_or_else(|| EditError::clip_not_found(clip_id))?;
            let (source_id, source_type) = (source.id, source.track_type);
            let moved = clip.moved_to(new_start)?;
            if source_id == track_id {
                return replace_with(doc, clip_id, |_| Ok(moved));
            }
            let target = doc
                .find_track_mut(track_id)
                .ok_or_else(|| EditError::track_not_found(track_id))?;
            if target.track_type != source_type {
                return Err(EditError::TrackTypeMismatch {
                    expected: source_type.to_string(),
                    found: target.track_type.to_string(),
                });
            }
            target.insert_clip(moved)?;
            if let Some(source) = doc.find_track_mut(source_id) {
                source.remove_clip(clip_id);
            }
            tracing::debug!(clip_id = %clip_id, from = %source_id, to = %track_id, "Clip moved across tracks");
            Ok(())
        })
    }

    /// Set clip volume in percent, clamped to `[0, 200]`.
    pub fn set_clip_volume(&mut self, clip_id: ClipId, percent: f64) -> EditResult<()> {
        let percent = if percent.is_nan() { 100.0 } else { percent.clamp(0.0, 200.0) };
        self.apply("Change volume", |doc, _| {
            replace_with(doc, clip_id, |c| c.patched(&ClipPatch::volume(percent)))
        })
    }

    /// Flip clip mute. Returns the new muted state.
    pub fn toggle_clip_mute(&mut self, clip_id: ClipId) -> EditResult<bool> {
        self.apply("Toggle mute", |doc, _| {
            let muted = doc
                .find_clip(clip_id)
                .map(|(_, c)| !c.muted)
                .ok_or_else(|| EditError::clip_not_found(clip_id))?;
            replace_with(doc, clip_id, |c| {
                Ok(Clip {
                    muted,
                    ..c.clone()
                })
            })?;
            Ok(muted)
        })
    }

    // --- Audio subtracks ---------------------------------------------------

    /// Override a subtrack's gain (clamped to `[0, 2]`).
    pub fn set_audio_track_volume(
        &mut self,
        clip_id: ClipId,
        track_index: usize,
        volume: f64,
    ) -> EditResult<()> {
        let volume = clamp_subtrack_volume(volume);
        self.apply("Change track volume", |doc, _| {
            require_subtrack(doc, clip_id, track_index)?;
            doc.audio_overrides.set_volume(clip_id, track_index, volume);
            Ok(())
        })
    }

    pub fn set_audio_track_muted(
        &mut self,
        clip_id: ClipId,
        track_index: usize,
        muted: bool,
    ) -> EditResult<()> {
        self.apply("Mute track", |doc, _| {
            require_subtrack(doc, clip_id, track_index)?;
            doc.audio_overrides.set_muted(clip_id, track_index, muted);
            Ok(())
        })
    }

    /// Flip the resolved mute state of a subtrack. Returns the new state.
    pub fn toggle_audio_track_mute(&mut self, clip_id: ClipId, track_index: usize) -> EditResult<bool> {
        self.apply("Mute track", |doc, _| {
            let clip = require_subtrack(doc, clip_id, track_index)?;
            let muted = !doc.audio_overrides.resolve(clip, track_index).muted;
            doc.audio_overrides.set_muted(clip_id, track_index, muted);
            Ok(muted)
        })
    }

    /// Drop a subtrack override. Returns whether one existed.
    pub fn clear_audio_track_override(&mut self, clip_id: ClipId, track_index: usize) -> EditResult<bool> {
        self.apply("Reset track audio", |doc, _| {
            if doc.find_clip(clip_id).is_none() {
                return Err(EditError::clip_not_found(clip_id));
            }
            Ok(doc.audio_overrides.clear(clip_id, track_index))
        })
    }

    // --- Duration ----------------------------------------------------------

    /// Pin the timeline duration, or `None` to follow the content.
    pub fn set_fixed_duration(&mut self, duration: Option<Millis>) -> EditResult<()> {
        let mode = match duration {
            Some(ms) if ms <= 0 => {
                return Err(EditError::bounds(format!("fixed duration must be > 0, got {ms}")));
            }
            Some(ms) => DurationMode::Fixed(ms),
            None => DurationMode::Auto,
        };
        self.apply("Set duration", |doc, _| {
            doc.duration_mode = mode;
            Ok(())
        })
    }

    // --- History -----------------------------------------------------------

    /// Step back one entry. An open interaction is rolled back first.
    /// Returns whether the document changed.
    pub fn undo(&mut self) -> bool {
        let rolled_back = self.discard_interaction();
        let Some(snapshot) = self.history.undo() else {
            if rolled_back {
                self.publish();
            }
            return rolled_back;
        };
        snapshot.restore(&mut self.doc);
        self.after_restore();
        true
    }

    /// Step forward one entry. An open interaction is rolled back first.
    pub fn redo(&mut self) -> bool {
        let rolled_back = self.discard_interaction();
        let Some(snapshot) = self.history.redo() else {
            if rolled_back {
                self.publish();
            }
            return rolled_back;
        };
        snapshot.restore(&mut self.doc);
        self.after_restore();
        true
    }

    // --- Transactions and drags --------------------------------------------

    /// Open a transaction. Mutations until commit or rollback become one history entry.
    pub fn begin_transaction(&mut self, label: &str) -> EditResult<()> {
        if let Some(open) = &self.transaction {
            tracing::warn!(label, open = %open.label, "Transaction already open");
            return Err(EditError::bounds(format!(
                "transaction '{}' is already open",
                open.label
            )));
        }
        self.history.start_batch(label);
        self.transaction = Some(Transaction {
            label: label.to_string(),
            before: TimelineSnapshot::capture(&self.doc),
            selection_before: self.selection.clone(),
        });
        self.publish();
        Ok(())
    }

    /// Close the open transaction. Returns whether a history entry was recorded.
    pub fn commit_transaction(&mut self) -> EditResult<bool> {
        let transaction = self.transaction.take().ok_or(EditError::NoInteraction)?;
        self.drag = None;
        let pushed = self.history.end_batch(TimelineSnapshot::capture(&self.doc));
        tracing::debug!(label = %transaction.label, pushed, "Transaction committed");
        self.publish();
        Ok(pushed)
    }

    /// Discard the open transaction's changes.
    pub fn rollback_transaction(&mut self) -> EditResult<()> {
        if !self.discard_interaction() {
            return Err(EditError::NoInteraction);
        }
        self.publish();
        Ok(())
    }

    /// Start dragging a clip. Snap targets are frozen at this point.
    pub fn begin_drag(&mut self, clip_id: ClipId, kind: DragKind, player: &PlayerStore) -> EditResult<()> {
        let origin = self
            .get_clip(clip_id)
            .cloned()
            .ok_or_else(|| EditError::clip_not_found(clip_id))?;
        let targets = snap::collect_targets(&self.doc.tracks, Some(clip_id), Some(player.position()));
        self.begin_transaction(kind.history_label())?;
        tracing::debug!(clip_id = %clip_id, ?kind, "Drag started");
        self.drag = Some(DragSession::new(origin, kind, targets));
        Ok(())
    }

    /// Apply a drag position (snapped when enabled). Returns the value applied.
    ///
    /// An invalid position is rejected and the last valid working state kept.
    pub fn update_drag(&mut self, value: Millis) -> EditResult<Millis> {
        let session = self.drag.as_ref().ok_or(EditError::NoInteraction)?;
        let (clip_id, kind) = (session.clip_id, session.kind);
        let origin = session.origin.clone();
        let threshold = self.snap_threshold_ms();

        let applied = match kind {
            DragKind::Move => {
                let start = match threshold {
                    Some(t) => snap_span(value, origin.effective_duration(), &session.targets, t),
                    None => value,
                }
                .max(0);
                self.apply("Move clip", |doc, _| {
                    replace_with(doc, clip_id, |c| c.moved_to(start))
                })?;
                start
            }
            DragKind::TrimStart | DragKind::TrimEnd => {
                let edge_time = match threshold {
                    Some(t) => snap_time(value, &session.targets, t),
                    None => value,
                };
                let edge = if kind == DragKind::TrimStart {
                    TrimEdge::Start
                } else {
                    TrimEdge::End
                };
                let trim = origin.trim_value_for_edge_at(edge_time);
                self.apply("Trim clip", |doc, _| {
                    replace_with(doc, clip_id, |c| c.trimmed(edge, trim))
                })?;
                edge_time
            }
        };
        if let Some(session) = self.drag.as_mut() {
            session.last_applied = applied;
        }
        Ok(applied)
    }

    /// Finish the drag and record it. Returns whether anything changed.
    pub fn end_drag(&mut self) -> EditResult<bool> {
        let session = self.drag.take().ok_or(EditError::NoInteraction)?;
        tracing::debug!(clip_id = %session.clip_id, value = session.last_applied, "Drag ended");
        self.commit_transaction()
    }

    /// Abandon the drag (e.g. Escape), restoring the state from before it began.
    pub fn cancel_drag(&mut self) -> EditResult<()> {
        let session = self.drag.take().ok_or(EditError::NoInteraction)?;
        tracing::debug!(clip_id = %session.clip_id, "Drag cancelled");
        self.rollback_transaction()
    }

    /// Snap a free time (e.g. a playhead drag) against every clip edge and the playhead.
    pub fn snap_position(&self, time: Millis, exclude: Option<ClipId>, player: &PlayerStore) -> Millis {
        let Some(threshold) = self.snap_threshold_ms() else {
            return time;
        };
        let targets = snap::collect_targets(&self.doc.tracks, exclude, Some(player.position()));
        snap_time(time, &targets, threshold)
    }

    // --- Presentation state (never undoable) -------------------------------

    /// Select a clip, or clear with `None`. Unknown ids are rejected.
    pub fn select_clip(&mut self, clip_id: Option<ClipId>) -> EditResult<()> {
        if let Some(id) = clip_id {
            if self.get_clip(id).is_none() {
                return Err(EditError::clip_not_found(id));
            }
        }
        if self.selection.select_clip(clip_id) {
            self.publish();
        }
        Ok(())
    }

    pub fn select_track(&mut self, track_id: Option<TrackId>) -> EditResult<()> {
        if let Some(id) = track_id {
            if self.track(id).is_none() {
                return Err(EditError::track_not_found(id));
            }
        }
        if self.selection.select_track(track_id) {
            self.publish();
        }
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.view.set_zoom(zoom);
        tracing::debug!(zoom = self.view.zoom_level, "Zoom changed");
        self.publish();
    }

    /// Multiply the current zoom by `factor`.
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.view.zoom_level * factor);
    }

    pub fn set_scroll_position(&mut self, pixels: f64) {
        self.view.set_scroll(pixels);
        self.publish();
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap.enabled = enabled;
        self.publish();
    }

    /// Snap distance in pixels; negative or non-finite values are ignored.
    pub fn set_snap_threshold(&mut self, pixels: f64) {
        if pixels.is_finite() && pixels >= 0.0 {
            self.snap.threshold_px = pixels;
            self.publish();
        }
    }

    /// Mutate PiP configuration and publish the result.
    pub fn update_pip<R>(&mut self, f: impl FnOnce(&mut PipState) -> R) -> R {
        let out = f(&mut self.pip);
        self.publish();
        out
    }

    // --- Internals ---------------------------------------------------------

    /// Run `edit` on a working copy; commit it only on success.
    fn apply<R>(
        &mut self,
        label: &str,
        edit: impl FnOnce(&mut TimelineState, &mut IdAllocator) -> EditResult<R>,
    ) -> EditResult<R> {
        let mut working = self.doc.clone();
        let out = match edit(&mut working, &mut self.ids) {
            Ok(out) => out,
            Err(err) => {
                tracing::warn!(label, error = %err, "Edit rejected");
                return Err(err);
            }
        };
        working.recalculate_duration();
        if working == self.doc {
            return Ok(out);
        }
        self.doc = working;
        let doc = &self.doc;
        self.selection
            .retain(|id| doc.find_clip(id).is_some(), |id| doc.find_track(id).is_some());
        self.history.push(label, TimelineSnapshot::capture(&self.doc));
        self.publish();
        Ok(out)
    }

    fn after_restore(&mut self) {
        let doc = &self.doc;
        self.selection
            .retain(|id| doc.find_clip(id).is_some(), |id| doc.find_track(id).is_some());
        self.publish();
    }

    /// Roll back any open transaction (and its drag). Returns whether one was open.
    fn discard_interaction(&mut self) -> bool {
        self.drag = None;
        let Some(transaction) = self.transaction.take() else {
            return false;
        };
        self.history.cancel_batch();
        transaction.before.restore(&mut self.doc);
        self.selection = transaction.selection_before;
        let doc = &self.doc;
        self.selection
            .retain(|id| doc.find_clip(id).is_some(), |id| doc.find_track(id).is_some());
        tracing::debug!(label = %transaction.label, "Transaction rolled back");
        true
    }

    fn snap_threshold_ms(&self) -> Option<f64> {
        self.snap
            .enabled
            .then(|| snap::threshold_ms(self.snap.threshold_px, self.view.pixels_per_second))
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        self.publisher.publish(snapshot);
    }
}

fn new_track(doc: &TimelineState, ids: &mut IdAllocator, track_type: TrackType) -> Track {
    let label = track_type.default_label(doc.count_of_type(track_type) + 1);
    Track::new(ids.next_track(), doc.next_track_number(), track_type, label)
}

/// Replace a clip with `f(clip)` on its own track, re-checking overlap.
fn replace_with(
    doc: &mut TimelineState,
    clip_id: ClipId,
    f: impl FnOnce(&Clip) -> EditResult<Clip>,
) -> EditResult<()> {
    let track = doc
        .track_of_clip_mut(clip_id)
        .ok_or_else(|| EditError::clip_not_found(clip_id))?;
    let current = track
        .clip(clip_id)
        .ok_or_else(|| EditError::clip_not_found(clip_id))?;
    let next = f(current)?;
    track.replace_clip(next)
}

fn require_subtrack(doc: &TimelineState, clip_id: ClipId, track_index: usize) -> EditResult<&Clip> {
    let (_, clip) = doc
        .find_clip(clip_id)
        .ok_or_else(|| EditError::clip_not_found(clip_id))?;
    if clip.audio_track(track_index).is_none() {
        return Err(EditError::NotFound {
            kind: EntityKind::AudioTrack,
            id: format!("{clip_id}#{track_index}"),
        });
    }
    Ok(clip)
}
