use crate::audio::AudioBackend;
use crate::synth::Synth;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};

pub struct CpalBackend {
    stream: Option<Stream>,
    synth: Option<Synth>,
}

impl CpalBackend {
    /// The backend takes the engine over; from then on it lives on the audio thread.
    pub fn new(synth: Synth) -> Self {
        Self {
            stream: None,
            synth: Some(synth),
        }
    }

    fn build_stream(&mut self) -> Result<Stream, Box<dyn std::error::Error>> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("No output device available")?;
        log::info!("Selected device: {}", device.name().unwrap_or_default());

        let supported_config = device.default_output_config()?;
        if supported_config.sample_format() != SampleFormat::F32 {
            return Err(format!(
                "Unsupported sample format {:?}",
                supported_config.sample_format()
            )
            .into());
        }
        let stream_config: cpal::StreamConfig = supported_config.into();

        let sample_rate = stream_config.sample_rate.0 as f32;
        let channels = stream_config.channels as usize;
        let mut synth = self.synth.take().ok_or("Stream already built")?;
        log::info!("Output stream: {sample_rate} Hz, {channels} channel(s)");

        let dt = 1.0 / sample_rate;
        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    synth.update(dt);
                    let sample = synth.evaluate().clamp(-1.0, 1.0);
                    frame.fill(sample);
                }
            },
            |err| log::error!("Stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) {
        match self.build_stream() {
            Ok(stream) => match stream.play() {
                Ok(()) => self.stream = Some(stream),
                Err(e) => log::error!("Failed to start stream: {e}"),
            },
            Err(e) => log::error!("Failed to build output stream: {e}"),
        }
    }

    fn stop(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                log::error!("Failed to stop stream: {e}");
            }
        }
    }
}
