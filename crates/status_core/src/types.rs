//! Definição do registro de status compartilhado entre as tarefas.
//!
//! O [`StatusRecord`] é o único estado mutável do sistema. Toda leitura e
//! escrita passa pelo mutex de [`crate::shared::SharedStatus`]; aqui ficam só
//! as transições puras (borda de subida, borda de descida, nova amostra).

use crate::config::SoundThresholds;
use crate::levels::classify;

// ──────────────────────────────────────────────
// Botão
// ──────────────────────────────────────────────

/// Última transição observada no botão.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Nenhuma interação desde o boot.
    #[default]
    Idle,
    Pressed,
    Released,
}

impl ButtonEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonEvent::Idle => "idle",
            ButtonEvent::Pressed => "pressed",
            ButtonEvent::Released => "released",
        }
    }

    /// Texto exibido na página de status.
    pub fn message(self) -> &'static str {
        match self {
            ButtonEvent::Idle => "Botão sem interação",
            ButtonEvent::Pressed => "Botão pressionado!",
            ButtonEvent::Released => "Botão solto!",
        }
    }
}

// ──────────────────────────────────────────────
// Classificação do som
// ──────────────────────────────────────────────

/// Faixa de intensidade derivada do pico da sessão.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SoundLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl SoundLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SoundLevel::None => "none",
            SoundLevel::Low => "low",
            SoundLevel::Medium => "medium",
            SoundLevel::High => "high",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SoundLevel::None => "Nenhum som captado!",
            SoundLevel::Low => "Intensidade baixa captada!",
            SoundLevel::Medium => "Intensidade média captada!",
            SoundLevel::High => "Intensidade alta captada!",
        }
    }
}

// ──────────────────────────────────────────────
// Registro compartilhado
// ──────────────────────────────────────────────

/// Estado do monitor. Criado uma vez no boot e nunca destruído.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRecord {
    /// Botão fisicamente pressionado neste momento
    pub button_held: bool,
    /// Última borda observada (só muda em transições)
    pub button_message: ButtonEvent,
    /// |tensão − offset| da amostra mais recente (V, sempre ≥ 0)
    pub current_level: f32,
    /// Maior `current_level` desde a última borda de subida (V)
    pub peak_level: f32,
    /// Função pura de `peak_level`
    pub classification: SoundLevel,
}

impl StatusRecord {
    /// Borda de subida: inicia uma nova sessão e zera o pico.
    pub fn begin_session(&mut self, thresholds: &SoundThresholds) {
        self.button_held = true;
        self.button_message = ButtonEvent::Pressed;
        self.peak_level = 0.0;
        self.classification = classify(self.peak_level, thresholds);
    }

    /// Borda de descida. O pico fica congelado até a próxima sessão.
    pub fn end_session(&mut self) {
        self.button_held = false;
        self.button_message = ButtonEvent::Released;
    }

    /// Registra uma nova amostra e atualiza pico e classificação.
    pub fn record_sample(&mut self, deviation: f32, thresholds: &SoundThresholds) {
        let deviation = deviation.abs();
        self.current_level = deviation;
        if deviation > self.peak_level {
            self.peak_level = deviation;
        }
        self.classification = classify(self.peak_level, thresholds);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            button_held: self.button_held,
            button_message: self.button_message,
            current_level: self.current_level,
            peak_level: self.peak_level,
            classification: self.classification,
        }
    }
}

/// Cópia consistente do registro, tirada dentro de uma única seção crítica.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusSnapshot {
    pub button_held: bool,
    pub button_message: ButtonEvent,
    pub current_level: f32,
    pub peak_level: f32,
    pub classification: SoundLevel,
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> SoundThresholds {
        SoundThresholds::default()
    }

    #[test]
    fn default_record_is_idle() {
        let r = StatusRecord::default();
        assert!(!r.button_held);
        assert_eq!(r.button_message, ButtonEvent::Idle);
        assert_eq!(r.current_level, 0.0);
        assert_eq!(r.peak_level, 0.0);
        assert_eq!(r.classification, SoundLevel::None);
    }

    #[test]
    fn peak_is_monotonic_within_session() {
        let t = thresholds();
        let mut r = StatusRecord::default();
        r.begin_session(&t);

        let samples = [0.1, 0.7, 0.3, 1.1, 0.0, 0.9, 1.05];
        let mut last_peak = 0.0;
        let mut max_seen: f32 = 0.0;
        for s in samples {
            r.record_sample(s, &t);
            max_seen = max_seen.max(s);
            assert!(r.peak_level >= last_peak, "pico regrediu");
            assert!(r.peak_level >= r.current_level);
            assert_eq!(r.peak_level, max_seen);
            last_peak = r.peak_level;
        }
        assert_eq!(r.classification, SoundLevel::Medium);
    }

    #[test]
    fn peak_resets_on_next_session() {
        let t = thresholds();
        let mut r = StatusRecord::default();
        r.begin_session(&t);
        r.record_sample(1.4, &t);
        assert_eq!(r.classification, SoundLevel::High);
        r.end_session();
        assert_eq!(r.peak_level, 1.4, "pico fica congelado após soltar");

        r.begin_session(&t);
        assert_eq!(r.peak_level, 0.0);
        assert_eq!(r.classification, SoundLevel::None);
        assert_eq!(r.button_message, ButtonEvent::Pressed);
    }

    #[test]
    fn release_keeps_classification_and_next_press_resets() {
        let t = thresholds();
        let mut r = StatusRecord::default();
        r.begin_session(&t);
        r.record_sample(0.5, &t);
        r.end_session();
        assert_eq!(r.classification, SoundLevel::Low);
        assert_eq!(r.button_message, ButtonEvent::Released);
        assert!(!r.button_held);

        r.begin_session(&t);
        assert_eq!(r.peak_level, 0.0);
        assert_eq!(r.button_message.as_str(), "pressed");
    }

    #[test]
    fn event_names_used_in_logs() {
        let mut r = StatusRecord::default();
        assert_eq!(r.button_message.as_str(), "idle");
        r.begin_session(&thresholds());
        assert_eq!(r.button_message.as_str(), "pressed");
        r.end_session();
        assert_eq!(r.button_message.as_str(), "released");
    }

    #[test]
    fn snapshot_copies_every_field() {
        let t = thresholds();
        let mut r = StatusRecord::default();
        r.begin_session(&t);
        r.record_sample(1.65, &t);
        let s = r.snapshot();
        assert!(s.button_held);
        assert_eq!(s.button_message, ButtonEvent::Pressed);
        assert_eq!(s.current_level, 1.65);
        assert_eq!(s.peak_level, 1.65);
        assert_eq!(s.classification, SoundLevel::High);
    }
}
