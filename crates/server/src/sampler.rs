//! Tarefa de amostragem: borda do botão, LED indicador e pico do microfone.

use crate::scheduler::{Shutdown, run_periodic};
use embedded_hal::digital::{InputPin, OutputPin};
use status_core::SharedStatus;
use status_core::config::{SamplerConfig, SoundThresholds};
use status_core::hardware::AnalogInput;
use status_core::levels::deviation_from_raw;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Dona exclusiva do botão, do LED e do canal analógico.
pub struct SampleTask<B, L, A> {
    button: B,
    led: L,
    mic: A,
    shared: SharedStatus,
    sampler: SamplerConfig,
    thresholds: SoundThresholds,
    was_held: bool,
}

impl<B, L, A> SampleTask<B, L, A>
where
    B: InputPin,
    L: OutputPin,
    A: AnalogInput,
{
    pub fn new(
        button: B,
        led: L,
        mic: A,
        shared: SharedStatus,
        sampler: SamplerConfig,
        thresholds: SoundThresholds,
    ) -> Self {
        Self {
            button,
            led,
            mic,
            shared,
            sampler,
            thresholds,
            was_held: false,
        }
    }

    /// Uma iteração do laço.
    pub fn step(&mut self) {
        // Botão é ativo em nível baixo
        let held = match self.button.is_low() {
            Ok(low) => low,
            Err(e) => {
                debug!("Falha ao ler botão: {e:?}; mantendo estado anterior");
                self.was_held
            }
        };

        if held && !self.was_held {
            let event = self.shared.with(|r| {
                r.begin_session(&self.thresholds);
                r.button_message
            });
            if let Err(e) = self.led.set_high() {
                warn!("Falha ao acender LED: {e:?}");
            }
            info!(event = event.as_str(), "Botão pressionado – nova sessão, pico zerado");
        } else if !held && self.was_held {
            let (event, peak) = self.shared.with(|r| {
                r.end_session();
                (r.button_message, r.peak_level)
            });
            if let Err(e) = self.led.set_low() {
                warn!("Falha ao apagar LED: {e:?}");
            }
            info!(event = event.as_str(), "Botão solto – pico da sessão {peak:.2} V");
        }
        self.was_held = held;

        if held {
            self.sample();
        }
    }

    fn sample(&mut self) {
        let deviation = match self.mic.read_raw() {
            Ok(raw) => deviation_from_raw(raw, &self.sampler),
            Err(e) => {
                debug!("Falha ao ler ADC: {e:?}; usando leitura zerada");
                0.0
            }
        };

        let snapshot = self.shared.with(|r| {
            r.record_sample(deviation, &self.thresholds);
            r.snapshot()
        });
        debug!(
            "Som {:.2} V | pico {:.2} V | {}",
            snapshot.current_level,
            snapshot.peak_level,
            snapshot.classification.as_str()
        );
    }

    pub fn run(mut self, shutdown: &Shutdown) {
        let period = Duration::from_millis(self.sampler.period_ms);
        run_periodic(period, shutdown, || self.step());
        debug!("Tarefa de amostragem encerrada");
    }
}
