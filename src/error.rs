pub type GridResult<T> = Result<T, GlyphGridError>;

#[derive(thiserror::Error, Debug)]
pub enum GlyphGridError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlyphGridError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            GlyphGridError::config("x")
                .to_string()
                .contains("configuration error:")
        );
        assert!(
            GlyphGridError::surface("x")
                .to_string()
                .contains("surface error:")
        );
        assert!(
            GlyphGridError::render("x")
                .to_string()
                .contains("render error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = GlyphGridError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
