//! Tarefa do display: desenha nível e pico enquanto o botão está pressionado.

use crate::scheduler::{Shutdown, run_periodic};
use status_core::SharedStatus;
use status_core::hardware::{RenderSurface, SurfaceError};
use std::time::Duration;
use tracing::{debug, warn};

/// Posição das linhas no display (x, y).
pub const LEVEL_POS: (i32, i32) = (4, 16);
pub const PEAK_POS: (i32, i32) = (4, 24);

pub fn level_line(level: f32) -> String {
    format!("level: {level:.2}")
}

pub fn peak_line(peak: f32) -> String {
    format!("peak: {peak:.2}")
}

/// Dona exclusiva da superfície de desenho.
pub struct DisplayTask<S> {
    surface: S,
    shared: SharedStatus,
    period: Duration,
}

impl<S: RenderSurface> DisplayTask<S> {
    pub fn new(surface: S, shared: SharedStatus, period: Duration) -> Self {
        Self {
            surface,
            shared,
            period,
        }
    }

    /// Apaga o painel no boot.
    pub fn init(&mut self) {
        let result = self.surface.clear().and_then(|_| self.surface.flush());
        if let Err(e) = result {
            warn!("Falha ao inicializar display: {e}");
        }
    }

    /// Uma iteração. Solto → nenhuma chamada à superfície; o painel mantém o
    /// último quadro.
    pub fn step(&mut self) {
        let reading = {
            let record = self.shared.lock();
            record
                .button_held
                .then_some((record.current_level, record.peak_level))
        };

        let Some((level, peak)) = reading else {
            return;
        };
        if let Err(e) = self.render(level, peak) {
            warn!("Falha ao atualizar display: {e}");
        }
    }

    fn render(&mut self, level: f32, peak: f32) -> Result<(), SurfaceError> {
        self.surface.clear()?;
        self.surface
            .draw(&level_line(level), LEVEL_POS.0, LEVEL_POS.1)?;
        self.surface.draw(&peak_line(peak), PEAK_POS.0, PEAK_POS.1)?;
        self.surface.flush()
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn run(mut self, shutdown: &Shutdown) {
        self.init();
        let period = self.period;
        run_periodic(period, shutdown, || self.step());
        debug!("Tarefa do display encerrada");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use status_core::config::SoundThresholds;
    use status_core::hardware::MemorySurface;

    fn task() -> (DisplayTask<MemorySurface>, SharedStatus) {
        let shared = SharedStatus::new();
        let t = DisplayTask::new(
            MemorySurface::new(),
            shared.clone(),
            Duration::from_millis(100),
        );
        (t, shared)
    }

    #[test]
    fn init_blanks_the_panel() {
        let (mut t, _) = task();
        t.init();
        assert_eq!(t.surface().clears, 1);
        assert_eq!(t.surface().flushes, 1);
        assert!(t.surface().shown().is_empty());
    }

    #[test]
    fn idle_issues_no_draw_calls() {
        let (mut t, _) = task();
        for _ in 0..10 {
            t.step();
        }
        let s = t.surface();
        assert_eq!(s.draw_calls, 0);
        assert_eq!(s.flushes, 0);
        assert_eq!(s.clears, 0);
    }

    #[test]
    fn held_renders_level_and_peak() {
        let (mut t, shared) = task();
        shared.with(|r| {
            r.begin_session(&SoundThresholds::default());
            r.record_sample(1.234, &SoundThresholds::default());
            r.record_sample(0.5, &SoundThresholds::default());
        });

        t.step();
        let s = t.surface();
        assert_eq!(s.shown_lines(), vec!["level: 0.50", "peak: 1.23"]);
        assert_eq!(s.shown()[0].y, 16);
        assert_eq!(s.shown()[1].y, 24);
        assert_eq!(s.flushes, 1);
    }

    #[test]
    fn release_keeps_last_frame() {
        let (mut t, shared) = task();
        shared.with(|r| {
            r.begin_session(&SoundThresholds::default());
            r.record_sample(0.25, &SoundThresholds::default());
        });
        t.step();
        shared.with(|r| r.end_session());

        t.step();
        t.step();
        let s = t.surface();
        assert_eq!(s.draw_calls, 2);
        assert_eq!(s.shown_lines(), vec!["level: 0.25", "peak: 0.25"]);
    }
}
