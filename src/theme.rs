//! Background, ground and reticle colors.
//!
//! The reticle is always the inverse of the sky so it stays visible.

use crate::error::ThemeError;

const RGB_MASK: u32 = 0x00ff_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTheme {
    pub sky: u32,
    pub ground: u32,
    pub reticle: u32,
}

impl SceneTheme {
    /// Sets the background from `#rrggbb` and inverts it for the reticle
    pub fn update_sky_color(&mut self, color: &str) -> Result<(), ThemeError> {
        let sky = parse_hex_color(color)?;
        self.sky = sky;
        self.reticle = !sky & RGB_MASK;
        log::debug!("Sky color #{:06x}, reticle #{:06x}", self.sky, self.reticle);
        Ok(())
    }

    pub fn update_ground_color(&mut self, color: &str) -> Result<(), ThemeError> {
        self.ground = parse_hex_color(color)?;
        Ok(())
    }
}

impl Default for SceneTheme {
    fn default() -> Self {
        Self {
            sky: 0xffffff,
            ground: 0xededed,
            reticle: 0x000000,
        }
    }
}

/// Parses `#rrggbb` (the `#` is optional) into a 24-bit color
pub fn parse_hex_color(color: &str) -> Result<u32, ThemeError> {
    let digits = color.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ThemeError::InvalidColor(color.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| ThemeError::InvalidColor(color.to_string()))
}

/// 24-bit color to linear-ish `[r, g, b]` in 0.0..=1.0
pub fn rgb_f32(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reticle_inverts_sky() {
        let mut theme = SceneTheme::default();
        theme.update_sky_color("#1a2b3c").unwrap();

        assert_eq!(theme.sky, 0x1a2b3c);
        assert_eq!(theme.reticle, 0xe5d4c3);
    }

    #[test]
    fn test_ground_is_independent() {
        let mut theme = SceneTheme::default();
        theme.update_ground_color("336699").unwrap();

        assert_eq!(theme.ground, 0x336699);
        assert_eq!(theme.sky, 0xffffff);
        assert_eq!(theme.reticle, 0x000000);
    }

    #[test]
    fn test_invalid_colors_leave_theme_untouched() {
        let mut theme = SceneTheme::default();

        assert_eq!(
            theme.update_sky_color("#12345"),
            Err(ThemeError::InvalidColor("#12345".into()))
        );
        assert!(theme.update_sky_color("#gg0000").is_err());
        assert!(theme.update_ground_color("+12345").is_err());
        assert_eq!(theme, SceneTheme::default());
    }

    #[test]
    fn test_rgb_f32() {
        assert_eq!(rgb_f32(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb_f32(0x000000), [0.0, 0.0, 0.0]);
    }
}
