//! Creature event queue
//!
//! A double-buffered queue of things creatures did during a tick. The
//! simulation pushes events while it steps creatures; consumers read them
//! after the next `swap`, so a tick's events are never observed half-written.
//!
//! # Example
//!
//! ```ignore
//! sim.step(16.0);
//! for event in sim.events().iter() {
//!     if let CreatureEvent::SlideStarted { entity, duration_ms } = event {
//!         play_skid_sound(*entity, *duration_ms);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;

use crate::ai::Phase;

// ============================================================================
// Event Types
// ============================================================================

/// Something a creature did during a tick.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CreatureEvent {
    /// The locomotion state machine changed phase.
    PhaseChanged {
        entity: Entity,
        from: Phase,
        to: Phase,
    },

    /// A new destination was committed.
    TargetChosen {
        entity: Entity,
        /// Destination (Y from the terrain)
        target: Vec3,
        /// Whether the destination passed the placement check
        clear: bool,
    },

    /// A sharp turn at speed turned into a slide.
    SlideStarted {
        entity: Entity,
        /// Slide duration in milliseconds
        duration_ms: f32,
    },

    /// Aiming at the destination was suspended after a long blockage.
    AimSuppressed {
        entity: Entity,
        /// Ticks until aiming resumes
        cooldown: u32,
    },

    /// An animation clip started playing.
    ClipStarted {
        entity: Entity,
        clip: String,
    },
}

impl CreatureEvent {
    /// Creature the event is about.
    #[must_use]
    pub fn entity(&self) -> Entity {
        match self {
            Self::PhaseChanged { entity, .. }
            | Self::TargetChosen { entity, .. }
            | Self::SlideStarted { entity, .. }
            | Self::AimSuppressed { entity, .. }
            | Self::ClipStarted { entity, .. } => *entity,
        }
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
///
/// Events pushed during tick N are available for reading after the swap at
/// the start of tick N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<CreatureEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<CreatureEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed after the next swap.
    #[inline]
    pub fn push(&mut self, event: CreatureEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &CreatureEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = CreatureEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events pending for the next tick.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    fn slide(entity: Entity, duration_ms: f32) -> CreatureEvent {
        CreatureEvent::SlideStarted {
            entity,
            duration_ms,
        }
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();
        let entity = test_entity();

        queue.push(slide(entity, 490.0));
        assert!(queue.is_empty(), "Events should not be visible before swap");

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next(), Some(&slide(entity, 490.0)));
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();
        let entity = test_entity();

        queue.push(slide(entity, 1.0));
        queue.swap();
        queue.push(slide(entity, 2.0));

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&slide(entity, 1.0)]);

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events, vec![&slide(entity, 2.0)]);
    }

    #[test]
    fn test_event_queue_drain_and_clear() {
        let mut queue = EventQueue::new();
        let entity = test_entity();

        queue.push(CreatureEvent::PhaseChanged {
            entity,
            from: Phase::Walk,
            to: Phase::Run,
        });
        queue.push(CreatureEvent::ClipStarted {
            entity,
            clip: "run".into(),
        });
        queue.swap();

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert!(queue.is_empty());

        queue.push(slide(entity, 1.0));
        queue.clear();
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_event_entity() {
        let entity = test_entity();
        let event = CreatureEvent::AimSuppressed {
            entity,
            cooldown: 20,
        };

        assert_eq!(event.entity(), entity);
    }
}
