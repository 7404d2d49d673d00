/// Snapshot buffer layout.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 20 floats]
/// [Letters: max_slots × 2 floats]        char code, slot state
/// [Trail: max_trail_points × 2 floats]   x, y
/// [Events: max_events × 4 floats]        kind, a, b, c
/// ```
///
/// Capacities are written into the header on every frame.
/// TypeScript reads them from the header to compute offsets dynamically.

use crate::api::config::SessionConfig;
use crate::api::types::{RoundEvent, WireEvent};
use crate::core::session::FrameSnapshot;
use crate::letters::words::WordBank;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 20;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_CURSOR_VALID: usize = 2;
pub const HEADER_CURSOR_X: usize = 3;
pub const HEADER_CURSOR_Y: usize = 4;
pub const HEADER_LOCKED: usize = 5;
pub const HEADER_PHASE: usize = 6;
pub const HEADER_OUTCOME: usize = 7;
pub const HEADER_ACTIVE_LETTER_INDEX: usize = 8;
pub const HEADER_LETTER_COUNT: usize = 9;
pub const HEADER_ACTIVE_ORDINAL: usize = 10;
pub const HEADER_HIT_MASK: usize = 11;
pub const HEADER_CHECKPOINT_COUNT: usize = 12;
pub const HEADER_TIME_REMAINING: usize = 13;
pub const HEADER_MAX_SLOTS: usize = 14;
pub const HEADER_SLOT_COUNT: usize = 15;
pub const HEADER_MAX_TRAIL: usize = 16;
pub const HEADER_TRAIL_COUNT: usize = 17;
pub const HEADER_MAX_EVENTS: usize = 18;
pub const HEADER_EVENT_COUNT: usize = 19;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per letter slot: char code, state, fixed by the wire format.
pub const SLOT_FLOATS: usize = 2;

/// Floats per trail point: x, y, fixed by the wire format.
pub const TRAIL_FLOATS: usize = 2;

/// Floats per round event: kind, a, b, c, fixed by the wire format.
pub const EVENT_FLOATS: usize = WireEvent::FLOATS;

/// Slot states.
pub const SLOT_PENDING: f32 = 0.0;
pub const SLOT_ACTIVE: f32 = 1.0;
pub const SLOT_COMPLETED: f32 = 2.0;
pub const SLOT_SPACE: f32 = 3.0;

/// Written where an optional header value is absent.
pub const NONE: f32 = -1.0;

/// Default per-frame event capacity.
pub const DEFAULT_MAX_EVENTS: usize = 32;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotLayout {
    /// Longest displayed word, spaces included.
    pub max_slots: usize,
    pub max_trail_points: usize,
    /// Maximum round events per frame.
    pub max_events: usize,

    pub slot_data_floats: usize,
    pub trail_data_floats: usize,
    pub event_data_floats: usize,

    pub slot_data_offset: usize,
    pub trail_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl SnapshotLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_slots: usize, max_trail_points: usize, max_events: usize) -> Self {
        let slot_data_floats = max_slots * SLOT_FLOATS;
        let trail_data_floats = max_trail_points * TRAIL_FLOATS;
        let event_data_floats = max_events * EVENT_FLOATS;

        let slot_data_offset = HEADER_FLOATS;
        let trail_data_offset = slot_data_offset + slot_data_floats;
        let event_data_offset = trail_data_offset + trail_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_slots,
            max_trail_points,
            max_events,
            slot_data_floats,
            trail_data_floats,
            event_data_floats,
            slot_data_offset,
            trail_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Size the letter section for the longest word the bank can produce.
    pub fn for_session(config: &SessionConfig, words: &WordBank) -> Self {
        let longest = words
            .entries()
            .iter()
            .map(|e| e.word.len())
            .max()
            .unwrap_or(0);
        let max_slots = if config.round.letter_spacing && longest > 0 {
            longest * 2 - 1
        } else {
            longest
        };
        Self::new(max_slots, config.layout.trail_capacity, DEFAULT_MAX_EVENTS)
    }

    /// Serialize one frame into `buf`. Returns the number of events written;
    /// events beyond capacity are dropped.
    ///
    /// `buf` must hold at least `buffer_total_floats` values.
    pub fn write(&self, buf: &mut [f32], snapshot: &FrameSnapshot, events: &[RoundEvent]) -> usize {
        if buf.len() < self.buffer_total_floats {
            log::warn!(
                "snapshot buffer too small: {} < {}",
                buf.len(),
                self.buffer_total_floats
            );
            return 0;
        }
        buf[..self.buffer_total_floats].fill(0.0);

        let header = &mut buf[..HEADER_FLOATS];
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_FRAME_COUNTER] = snapshot.frame as f32;
        if let Some(cursor) = snapshot.cursor {
            header[HEADER_CURSOR_VALID] = 1.0;
            header[HEADER_CURSOR_X] = cursor.x;
            header[HEADER_CURSOR_Y] = cursor.y;
        }
        header[HEADER_LOCKED] = if snapshot.locked { 1.0 } else { 0.0 };
        header[HEADER_PHASE] = snapshot.state.code() as f32;
        header[HEADER_OUTCOME] = snapshot.outcome.map_or(NONE, |o| o.code() as f32);
        header[HEADER_ACTIVE_LETTER_INDEX] = snapshot.active_letter_index as f32;
        header[HEADER_LETTER_COUNT] = snapshot.letter_count as f32;
        header[HEADER_ACTIVE_ORDINAL] = snapshot.active_ordinal.map_or(NONE, |o| o as f32);
        header[HEADER_HIT_MASK] = snapshot.hit_mask as f32;
        header[HEADER_CHECKPOINT_COUNT] = snapshot.checkpoint_count as f32;
        header[HEADER_TIME_REMAINING] = snapshot.time_remaining_secs as f32;
        header[HEADER_MAX_SLOTS] = self.max_slots as f32;
        header[HEADER_MAX_TRAIL] = self.max_trail_points as f32;
        header[HEADER_MAX_EVENTS] = self.max_events as f32;

        let slots = &mut buf[self.slot_data_offset..self.trail_data_offset];
        let mut slot_count = 0;
        for (ordinal, (ch, out)) in snapshot
            .word
            .chars()
            .zip(slots.chunks_exact_mut(SLOT_FLOATS))
            .enumerate()
        {
            out[0] = ch as u32 as f32;
            out[1] = if ch == ' ' {
                SLOT_SPACE
            } else if snapshot.completed.get(ordinal).copied().unwrap_or(false) {
                SLOT_COMPLETED
            } else if snapshot.active_ordinal == Some(ordinal) {
                SLOT_ACTIVE
            } else {
                SLOT_PENDING
            };
            slot_count += 1;
        }

        let trail = &mut buf[self.trail_data_offset..self.event_data_offset];
        let mut trail_count = 0;
        // Keep the newest points if the trail outgrew the section.
        let skip = snapshot.trail.len().saturating_sub(self.max_trail_points);
        for (point, out) in snapshot.trail[skip..].iter().zip(trail.chunks_exact_mut(TRAIL_FLOATS)) {
            out[0] = point.x;
            out[1] = point.y;
            trail_count += 1;
        }

        let written = events.len().min(self.max_events);
        if written < events.len() {
            log::warn!("dropped {} round events over capacity", events.len() - written);
        }
        let wire: Vec<WireEvent> = events[..written].iter().map(RoundEvent::to_wire).collect();
        let floats: &[f32] = bytemuck::cast_slice(&wire);
        buf[self.event_data_offset..self.event_data_offset + floats.len()].copy_from_slice(floats);

        buf[HEADER_SLOT_COUNT] = slot_count as f32;
        buf[HEADER_TRAIL_COUNT] = trail_count as f32;
        buf[HEADER_EVENT_COUNT] = written as f32;
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{RoundOutcome, EVENT_LETTER_COMPLETED};
    use crate::game::progression::RoundState;
    use glam::Vec2;

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot {
            frame: 7,
            cursor: Some(Vec2::new(120.5, 300.0)),
            locked: true,
            state: RoundState::WordActive { letter_index: 1 },
            word: "A T".to_string(),
            brand: "Test".to_string(),
            active_letter_index: 1,
            letter_count: 2,
            active_letter: Some('T'),
            active_ordinal: Some(2),
            hit_mask: 0b101,
            checkpoint_count: 4,
            active_completed: false,
            completed: vec![true, false, false],
            time_remaining_secs: 12,
            outcome: None,
            trail: vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), Vec2::new(5.0, 6.0)],
        }
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = SnapshotLayout::new(15, 100, 32);
        assert_eq!(layout.slot_data_offset, HEADER_FLOATS);
        assert_eq!(layout.trail_data_offset, layout.slot_data_offset + 15 * SLOT_FLOATS);
        assert_eq!(layout.event_data_offset, layout.trail_data_offset + 100 * TRAIL_FLOATS);
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + 32 * EVENT_FLOATS);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn sized_for_spaced_builtin_words() {
        let layout = SnapshotLayout::for_session(&SessionConfig::default(), &WordBank::builtin());
        // KINCLONG spaced out is 15 characters.
        assert_eq!(layout.max_slots, 15);
        assert_eq!(layout.max_trail_points, 100);
    }

    #[test]
    fn writes_header_letters_and_events() {
        let layout = SnapshotLayout::new(5, 2, 1);
        let mut buf = vec![9.0; layout.buffer_total_floats];
        let events = [
            RoundEvent::LetterCompleted { ordinal: 0, letter: 'A' },
            RoundEvent::RoundEnded(RoundOutcome::Stopped),
        ];
        let written = layout.write(&mut buf, &snapshot(), &events);
        assert_eq!(written, 1);

        assert_eq!(buf[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(buf[HEADER_CURSOR_VALID], 1.0);
        assert_eq!(buf[HEADER_CURSOR_X], 120.5);
        assert_eq!(buf[HEADER_PHASE], 1.0);
        assert_eq!(buf[HEADER_OUTCOME], NONE);
        assert_eq!(buf[HEADER_HIT_MASK], 5.0);
        assert_eq!(buf[HEADER_SLOT_COUNT], 3.0);
        assert_eq!(buf[HEADER_EVENT_COUNT], 1.0);

        let slots = &buf[layout.slot_data_offset..layout.trail_data_offset];
        assert_eq!(&slots[..6], &[65.0, SLOT_COMPLETED, 32.0, SLOT_SPACE, 84.0, SLOT_ACTIVE]);
        // Unused slots are cleared.
        assert_eq!(&slots[6..], &[0.0; 4]);

        // Only the newest two trail points fit.
        assert_eq!(buf[HEADER_TRAIL_COUNT], 2.0);
        let trail = &buf[layout.trail_data_offset..layout.event_data_offset];
        assert_eq!(trail, &[3.0, 4.0, 5.0, 6.0]);

        let event = &buf[layout.event_data_offset..];
        assert_eq!(event, &[EVENT_LETTER_COMPLETED, 0.0, 65.0, 0.0]);
    }

    #[test]
    fn short_buffer_is_left_alone() {
        let layout = SnapshotLayout::new(5, 2, 1);
        let mut buf = vec![9.0; 4];
        assert_eq!(layout.write(&mut buf, &snapshot(), &[]), 0);
        assert_eq!(buf, vec![9.0; 4]);
    }
}
