use super::config::SynthConfig;
use super::error::SynthError;
use super::instrument::Instrument;
use super::note::{event_queue, EventReceiver, EventSender, NoteEvent, NoteEventKind};
use super::scope::SampleScope;
use super::voice::Voice;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Number of note channels that can be routed to instrument slots.
pub const CHANNEL_COUNT: usize = 16;

/// Fixed set of instrument slots plus the channel → slot routing table.
#[derive(Debug)]
pub struct InstrumentBank {
    instruments: Box<[Instrument]>,
    channels: [AtomicU8; CHANNEL_COUNT],
}

impl InstrumentBank {
    fn new(slots: usize) -> Self {
        Self {
            instruments: (0..slots).map(|_| Instrument::default()).collect(),
            channels: std::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Instrument> {
        self.instruments.get(slot)
    }

    /// Instrument slot that plays notes arriving on `channel`.
    pub fn slot_for_channel(&self, channel: u8) -> Option<usize> {
        let slot = self.channels.get(channel as usize)?.load(Ordering::Relaxed) as usize;
        (slot < self.instruments.len()).then_some(slot)
    }

    pub fn assign_channel(&self, channel: u8, slot: usize) -> bool {
        match self.channels.get(channel as usize) {
            Some(entry) if slot < self.instruments.len() => {
                entry.store(slot as u8, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }
}

/// Counters the audio context publishes for the control context.
#[derive(Debug, Default)]
struct Telemetry {
    active_voices: AtomicUsize,
    dropped_notes: AtomicU64,
}

#[derive(Clone, Copy, Debug)]
struct ActiveVoice {
    note: u8,
    voice: usize,
}

/// Control-context side of the engine: queues note events and edits instruments.
pub struct SynthHandle {
    events: EventSender,
    bank: Arc<InstrumentBank>,
    telemetry: Arc<Telemetry>,
    scope: Arc<SampleScope>,
}

impl SynthHandle {
    /// Queues a note-on. Never blocks; if the queue is full the event is dropped.
    pub fn trigger(&mut self, note: u8, channel: u8, velocity: u8) -> bool {
        self.send(NoteEvent::trigger(note, channel, velocity))
    }

    /// Queues a note-off. Never blocks; if the queue is full the event is dropped.
    pub fn release(&mut self, note: u8, channel: u8, velocity: u8) -> bool {
        self.send(NoteEvent::release(note, channel, velocity))
    }

    pub fn send(&mut self, event: NoteEvent) -> bool {
        let sent = self.events.send(event);
        if !sent {
            log::warn!(
                "Event queue full, dropped {:?} for note {} ({} dropped so far)",
                event.kind,
                event.note,
                self.events.dropped()
            );
        }
        sent
    }

    /// Events lost to queue overflow.
    pub fn dropped_events(&self) -> u64 {
        self.events.dropped()
    }

    /// Notes that found no free voice.
    pub fn dropped_notes(&self) -> u64 {
        self.telemetry.dropped_notes.load(Ordering::Relaxed)
    }

    pub fn active_voice_count(&self) -> usize {
        self.telemetry.active_voices.load(Ordering::Relaxed)
    }

    pub fn queue_capacity(&self) -> usize {
        self.events.capacity()
    }

    /// Most recent output samples, oldest first. Best-effort, for display only.
    pub fn recent_samples(&self) -> Vec<f32> {
        self.scope.recent()
    }

    pub fn copy_recent_samples(&self, out: &mut [f32]) -> usize {
        self.scope.copy_recent(out)
    }

    pub fn instrument(&self, slot: usize) -> Option<&Instrument> {
        self.bank.get(slot)
    }

    pub fn instruments(&self) -> &InstrumentBank {
        &self.bank
    }

    pub fn assign_channel(&self, channel: u8, slot: usize) -> bool {
        let assigned = self.bank.assign_channel(channel, slot);
        if assigned {
            log::info!("Channel {channel} now plays instrument slot {slot}");
        } else {
            log::warn!("Cannot route channel {channel} to slot {slot}");
        }
        assigned
    }
}

/// Audio-context side of the engine: the voice pool and the per-sample tick.
///
/// `update` and `evaluate` must be called from one thread only, once each per sample.
/// Neither blocks nor allocates.
pub struct Synth {
    events: EventReceiver,
    bank: Arc<InstrumentBank>,
    voices: Vec<Voice>,
    /// Indices into `voices` that are not sounding.
    free: Vec<usize>,
    /// Sounding voices keyed by note. Order is not preserved.
    active: Vec<ActiveVoice>,
    config: SynthConfig,
    telemetry: Arc<Telemetry>,
    scope: Arc<SampleScope>,
}

impl Synth {
    /// Allocates the voice pool, instrument bank and event queue up front and returns
    /// the control handle together with the audio-side engine.
    pub fn new(config: SynthConfig) -> Result<(SynthHandle, Self), SynthError> {
        config.validate()?;

        let (sender, receiver) = event_queue(config.event_capacity);
        let bank = Arc::new(InstrumentBank::new(config.instrument_slots));
        let telemetry = Arc::new(Telemetry::default());
        let scope = Arc::new(SampleScope::new(config.scope_len));

        let voices = (0..config.max_voices).map(|_| Voice::new()).collect();
        // Popped from the back, so voice 0 is handed out first.
        let free = (0..config.max_voices).rev().collect();
        let active = Vec::with_capacity(config.max_voices);

        log::info!(
            "Synth ready: {} voices, {} queued events, {} instrument slots",
            config.max_voices,
            config.event_capacity,
            config.instrument_slots
        );
        if let Some(instrument) = bank.get(0) {
            log::debug!("{}", instrument.algorithm());
        }

        let handle = SynthHandle {
            events: sender,
            bank: bank.clone(),
            telemetry: telemetry.clone(),
            scope: scope.clone(),
        };
        let synth = Self {
            events: receiver,
            bank,
            voices,
            free,
            active,
            config,
            telemetry,
            scope,
        };
        Ok((handle, synth))
    }

    /// Applies queued events, then advances every active voice by `dt` seconds and
    /// returns finished voices to the pool.
    pub fn update(&mut self, dt: f32) {
        while let Some(event) = self.events.recv() {
            self.handle_event(&event);
        }

        let mut i = 0;
        while i < self.active.len() {
            let index = self.active[i].voice;
            let voice = &mut self.voices[index];
            let playing = match self.bank.get(voice.instrument()) {
                Some(instrument) => voice.update(dt, &instrument.snapshot()),
                None => false,
            };
            if playing {
                i += 1;
            } else {
                voice.reset();
                self.free.push(index);
                self.active.swap_remove(i);
            }
        }

        self.telemetry
            .active_voices
            .store(self.active.len(), Ordering::Relaxed);
    }

    /// Mixes every active voice into one output sample.
    pub fn evaluate(&mut self) -> f32 {
        let mut sample = 0.0;
        for entry in &self.active {
            let voice = &mut self.voices[entry.voice];
            sample += voice.evaluate() * voice.velocity_scale() * self.config.voice_gain;
        }
        let sample = sample * self.config.output_gain;
        self.scope.push(sample);
        sample
    }

    /// Renders `output.len()` samples, ticking once per sample.
    pub fn render(&mut self, output: &mut [f32], sample_rate: f32) {
        if !(sample_rate > 0.0) {
            output.fill(0.0);
            return;
        }
        let dt = 1.0 / sample_rate;
        for sample in output.iter_mut() {
            self.update(dt);
            *sample = self.evaluate();
        }
    }

    fn handle_event(&mut self, event: &NoteEvent) {
        let existing = self
            .active
            .iter()
            .find(|entry| entry.note == event.note)
            .map(|entry| entry.voice);

        match event.kind {
            NoteEventKind::Trigger => {
                if let Some(index) = existing {
                    self.voices[index].retrigger();
                    return;
                }
                let Some(slot) = self.bank.slot_for_channel(event.channel) else {
                    return;
                };
                let Some(instrument) = self.bank.get(slot) else {
                    return;
                };
                let Some(index) = self.free.pop() else {
                    self.telemetry.dropped_notes.fetch_add(1, Ordering::Relaxed);
                    return;
                };
                self.voices[index].trigger(
                    event.note,
                    event.velocity,
                    slot,
                    &instrument.snapshot(),
                    &self.config.tuning,
                );
                self.active.push(ActiveVoice {
                    note: event.note,
                    voice: index,
                });
            }
            NoteEventKind::Release => {
                if let Some(index) = existing {
                    self.voices[index].release();
                }
            }
        }
    }

    pub fn active_voice_count(&self) -> usize {
        self.active.len()
    }

    pub fn free_voice_count(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    /// Notes currently holding a voice, in registry order.
    pub fn active_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.active.iter().map(|entry| entry.note)
    }

    /// Voice sounding `note`, if any.
    pub fn voice_for_note(&self, note: u8) -> Option<&Voice> {
        self.active
            .iter()
            .find(|entry| entry.note == note)
            .map(|entry| &self.voices[entry.voice])
    }

    pub fn recent_samples(&self) -> Vec<f32> {
        self.scope.recent()
    }

    pub fn copy_recent_samples(&self, out: &mut [f32]) -> usize {
        self.scope.copy_recent(out)
    }

    pub fn instrument(&self, slot: usize) -> Option<&Instrument> {
        self.bank.get(slot)
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }
}
