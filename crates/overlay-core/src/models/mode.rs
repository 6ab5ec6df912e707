use crate::constants::{BROWSE_MODE, DRAW_MODE_PREFIX};

/// An interaction mode, identified by its id (`browse`, `select`, `draw-line`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mode {
    pub id: String,
}

impl Mode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn browse() -> Self {
        Self::new(BROWSE_MODE)
    }

    /// Drawing modes forbid layer visibility changes.
    pub fn is_drawing(&self) -> bool {
        is_drawing_mode(&self.id)
    }
}

pub fn is_drawing_mode(mode_id: &str) -> bool {
    mode_id.starts_with(DRAW_MODE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_modes() {
        assert!(Mode::new("draw-line").is_drawing());
        assert!(Mode::new("draw-area").is_drawing());
        assert!(!Mode::new("add-point").is_drawing());
        assert!(!Mode::browse().is_drawing());
        assert!(!Mode::new("select").is_drawing());
    }
}
