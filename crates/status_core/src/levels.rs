//! Escada de thresholds e conversão ADC → desvio em volts.

use crate::config::{SamplerConfig, SoundThresholds};
use crate::types::SoundLevel;

/// Classifica um pico contra os thresholds.
///
/// Avalia do maior para o menor com `>=`: um valor exatamente na fronteira
/// conta para a faixa de cima.
pub fn classify(peak: f32, thresholds: &SoundThresholds) -> SoundLevel {
    if peak >= thresholds.high {
        SoundLevel::High
    } else if peak >= thresholds.medium {
        SoundLevel::Medium
    } else if peak >= thresholds.low {
        SoundLevel::Low
    } else {
        SoundLevel::None
    }
}

/// Converte uma leitura bruta do ADC em tensão.
pub fn raw_to_voltage(raw: u16, sampler: &SamplerConfig) -> f32 {
    let raw = raw.min(sampler.adc_max);
    f32::from(raw) * sampler.v_ref / f32::from(sampler.adc_max)
}

/// Desvio absoluto da tensão em relação ao ponto de repouso do microfone.
pub fn deviation_from_raw(raw: u16, sampler: &SamplerConfig) -> f32 {
    (raw_to_voltage(raw, sampler) - sampler.quiescent_offset).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_count_toward_upper_band() {
        let t = SoundThresholds {
            low: 0.02,
            medium: 1.0,
            high: 1.3,
        };
        assert_eq!(classify(0.00, &t).as_str(), "none");
        assert_eq!(classify(0.02, &t).as_str(), "low");
        assert_eq!(classify(0.999, &t).as_str(), "low");
        assert_eq!(classify(1.0, &t).as_str(), "medium");
        assert_eq!(classify(1.3, &t).as_str(), "high");
        assert_eq!(classify(5.0, &t).as_str(), "high");
    }

    #[test]
    fn classify_is_deterministic() {
        let t = SoundThresholds::default();
        for i in 0..=200 {
            let v = i as f32 * 0.01;
            assert_eq!(classify(v, &t), classify(v, &t));
        }
    }

    #[test]
    fn zero_raw_reads_as_full_offset() {
        let s = SamplerConfig::default();
        let d = deviation_from_raw(0, &s);
        assert!((d - 1.65).abs() < 1e-6, "desvio {d}");
        assert_eq!(classify(d, &SoundThresholds::default()), SoundLevel::High);
    }

    #[test]
    fn full_scale_is_v_ref() {
        let s = SamplerConfig::default();
        assert!((raw_to_voltage(4095, &s) - 3.3).abs() < 1e-6);
        // Leituras acima do fundo de escala são saturadas
        assert!((raw_to_voltage(u16::MAX, &s) - 3.3).abs() < 1e-6);
    }

    #[test]
    fn mid_scale_is_near_silence() {
        let s = SamplerConfig::default();
        let d = deviation_from_raw(2048, &s);
        assert!(d < 0.02, "meio da escala deveria ser silêncio, got {d}");
    }
}
