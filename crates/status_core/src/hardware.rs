//! Fronteiras com o hardware que não são cobertas pelo `embedded-hal`.
//!
//! Botão e LED usam os traits digitais do `embedded-hal` diretamente; aqui
//! ficam o canal analógico e a superfície de desenho do display.

/// Canal analógico que produz leituras em `[0, adc_max]`.
pub trait AnalogInput {
    type Error: core::fmt::Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Erro reportado pela superfície de desenho.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Texto fora da área visível ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },
}

/// Superfície de desenho do display.
///
/// `draw` acumula no buffer; só `flush` empurra o buffer para o painel.
pub trait RenderSurface {
    fn draw(&mut self, text: &str, x: i32, y: i32) -> Result<(), SurfaceError>;
    fn flush(&mut self) -> Result<(), SurfaceError>;
    /// Zera o buffer sem enviar ao painel.
    fn clear(&mut self) -> Result<(), SurfaceError>;
}

/// Um texto posicionado no buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCommand {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

/// Superfície em memória: guarda o buffer pendente e o último quadro enviado.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    pending: Vec<DrawCommand>,
    shown: Vec<DrawCommand>,
    pub draw_calls: usize,
    pub flushes: usize,
    pub clears: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quadro atualmente visível no painel.
    pub fn shown(&self) -> &[DrawCommand] {
        &self.shown
    }

    pub fn shown_lines(&self) -> Vec<&str> {
        self.shown.iter().map(|c| c.text.as_str()).collect()
    }
}

impl RenderSurface for MemorySurface {
    fn draw(&mut self, text: &str, x: i32, y: i32) -> Result<(), SurfaceError> {
        self.draw_calls += 1;
        if x < 0 || y < 0 {
            return Err(SurfaceError::OutOfBounds { x, y });
        }
        self.pending.push(DrawCommand {
            text: text.to_string(),
            x,
            y,
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        self.flushes += 1;
        self.shown = self.pending.clone();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.clears += 1;
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_is_invisible_until_flush() {
        let mut s = MemorySurface::new();
        s.draw("level: 0.10", 4, 16).unwrap();
        assert!(s.shown().is_empty());
        s.flush().unwrap();
        assert_eq!(s.shown_lines(), vec!["level: 0.10"]);
    }

    #[test]
    fn clear_does_not_touch_panel() {
        let mut s = MemorySurface::new();
        s.draw("a", 0, 0).unwrap();
        s.flush().unwrap();
        s.clear().unwrap();
        assert_eq!(s.shown_lines(), vec!["a"]);
        s.flush().unwrap();
        assert!(s.shown().is_empty());
    }

    #[test]
    fn negative_position_is_rejected() {
        let mut s = MemorySurface::new();
        assert!(matches!(
            s.draw("peak: 0.00", -1, 24),
            Err(SurfaceError::OutOfBounds { x: -1, y: 24 })
        ));
        s.flush().unwrap();
        assert!(s.shown().is_empty());
    }
}
