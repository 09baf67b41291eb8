use rtrb::{Consumer, Producer, PushError, RingBuffer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEventKind {
    Trigger,
    Release,
}

/// A note-on or note-off travelling from the control context to the audio context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    pub kind: NoteEventKind,
    pub note: u8,
    pub channel: u8,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn trigger(note: u8, channel: u8, velocity: u8) -> Self {
        Self {
            kind: NoteEventKind::Trigger,
            note,
            channel,
            velocity,
        }
    }

    pub fn release(note: u8, channel: u8, velocity: u8) -> Self {
        Self {
            kind: NoteEventKind::Release,
            note,
            channel,
            velocity,
        }
    }
}

/// Creates a bounded single-producer/single-consumer event queue holding `capacity`
/// events. Pushing into a full queue drops the new event and counts it.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (
        EventSender {
            producer,
            dropped: 0,
        },
        EventReceiver { consumer },
    )
}

pub struct EventSender {
    producer: Producer<NoteEvent>,
    dropped: u64,
}

impl EventSender {
    /// Never blocks and never allocates. Returns `false` if the event was dropped.
    pub fn send(&mut self, event: NoteEvent) -> bool {
        match self.producer.push(event) {
            Ok(()) => true,
            Err(PushError::Full(_)) => {
                self.dropped += 1;
                false
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn capacity(&self) -> usize {
        self.producer.buffer().capacity()
    }
}

pub struct EventReceiver {
    consumer: Consumer<NoteEvent>,
}

impl EventReceiver {
    pub fn recv(&mut self) -> Option<NoteEvent> {
        self.consumer.pop().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_drops_newest() {
        let (mut tx, mut rx) = event_queue(4);
        for note in 0..5 {
            tx.send(NoteEvent::trigger(note, 0, 100));
        }
        assert_eq!(tx.dropped(), 1);

        let mut notes = Vec::new();
        while let Some(event) = rx.recv() {
            notes.push(event.note);
        }
        assert_eq!(notes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn events_cross_threads_in_order() {
        let (mut tx, mut rx) = event_queue(16);
        let producer = std::thread::spawn(move || {
            let mut sent = 0u32;
            let mut note = 0u8;
            while sent < 200 {
                if tx.send(NoteEvent::release(note, 1, 0)) {
                    sent += 1;
                    note = note.wrapping_add(1);
                } else {
                    std::thread::yield_now();
                }
            }
        });

        let mut expected = 0u8;
        let mut received = 0u32;
        while received < 200 {
            if let Some(event) = rx.recv() {
                assert_eq!(event.note, expected);
                assert_eq!(event.kind, NoteEventKind::Release);
                expected = expected.wrapping_add(1);
                received += 1;
            }
        }
        producer.join().unwrap();
        assert!(rx.recv().is_none());
    }
}
