//! Placa simulada para rodar no host sem GPIO/ADC/display reais.
//!
//! O botão alterna entre pressionado e solto num ciclo fixo; o microfone
//! gera um tom cuja amplitude cresce ao longo de cada pressão, de modo que
//! uma sessão atravessa todas as faixas de intensidade.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use status_core::config::{SamplerConfig, SimulationConfig};
use status_core::hardware::{AnalogInput, RenderSurface, SurfaceError};
use std::convert::Infallible;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Período do tom sintético.
const TONE_PERIOD: Duration = Duration::from_millis(7);

/// Ciclo pressionado/solto compartilhado por botão e microfone.
#[derive(Debug, Clone, Copy)]
pub struct PressCycle {
    start: Instant,
    press: Duration,
    release: Duration,
}

impl PressCycle {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            start: Instant::now(),
            press: Duration::from_millis(config.press_ms),
            release: Duration::from_millis(config.release_ms),
        }
    }

    /// Retorna `Some(progresso)` em `[0, 1)` se pressionado agora.
    fn pressed_progress(&self, now: Instant) -> Option<f32> {
        let total = self.press + self.release;
        if total.is_zero() {
            return None;
        }
        let elapsed = now.duration_since(self.start).as_nanos() % total.as_nanos();
        // Começa solto, depois pressiona
        let release = self.release.as_nanos();
        (elapsed >= release)
            .then(|| (elapsed - release) as f32 / self.press.as_nanos().max(1) as f32)
    }
}

/// Botão ativo em nível baixo.
pub struct SimButton {
    cycle: PressCycle,
}

impl SimButton {
    pub fn new(cycle: PressCycle) -> Self {
        Self { cycle }
    }
}

impl ErrorType for SimButton {
    type Error = Infallible;
}

impl InputPin for SimButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.cycle.pressed_progress(Instant::now()).is_some())
    }
}

#[derive(Debug, Default)]
pub struct SimLed;

impl ErrorType for SimLed {
    type Error = Infallible;
}

impl OutputPin for SimLed {
    fn set_low(&mut self) -> Result<(), Infallible> {
        debug!("LED apagado");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        debug!("LED aceso");
        Ok(())
    }
}

/// Microfone sintético em torno do ponto de repouso.
pub struct SimMicrophone {
    cycle: PressCycle,
    amplitude: f32,
    sampler: SamplerConfig,
}

impl SimMicrophone {
    pub fn new(cycle: PressCycle, amplitude: f32, sampler: SamplerConfig) -> Self {
        Self {
            cycle,
            amplitude,
            sampler,
        }
    }

    fn voltage_at(&self, now: Instant) -> f32 {
        let envelope = self.cycle.pressed_progress(now).unwrap_or(0.0);
        let t = now.duration_since(self.cycle.start).as_secs_f32();
        let phase = t / TONE_PERIOD.as_secs_f32() * std::f32::consts::TAU;
        self.sampler.quiescent_offset + self.amplitude * envelope * phase.sin()
    }
}

impl AnalogInput for SimMicrophone {
    type Error = Infallible;

    fn read_raw(&mut self) -> Result<u16, Infallible> {
        let v = self.voltage_at(Instant::now()).clamp(0.0, self.sampler.v_ref);
        let raw = v / self.sampler.v_ref * f32::from(self.sampler.adc_max);
        Ok(raw.round() as u16)
    }
}

/// Display de texto: cada quadro enviado vira uma linha de log.
#[derive(Debug, Default)]
pub struct LogSurface {
    pending: Vec<String>,
    last_frame: String,
}

impl RenderSurface for LogSurface {
    fn draw(&mut self, text: &str, _x: i32, _y: i32) -> Result<(), SurfaceError> {
        self.pending.push(text.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        let frame = self.pending.join(" | ");
        if frame != self.last_frame {
            if !frame.is_empty() {
                info!(target: "display", "{frame}");
            }
            self.last_frame = frame;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.pending.clear();
        Ok(())
    }
}
