use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use catppuccin::FlavorName;

/// Convert a catppuccin color to a bevy Color via its RGB values.
fn cat_to_bevy(c: &catppuccin::Color) -> Color {
    Color::srgb(
        c.rgb.r as f32 / 255.0,
        c.rgb.g as f32 / 255.0,
        c.rgb.b as f32 / 255.0,
    )
}

/// Central theme resource for the application.
///
/// Wraps a catppuccin flavor and provides accessor methods returning
/// `bevy::color::Color` values from the active palette.
#[derive(Resource)]
pub struct AppTheme {
    active_flavor: FlavorName,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            active_flavor: FlavorName::Mocha,
        }
    }
}

impl AppTheme {
    fn colors(&self) -> &catppuccin::FlavorColors {
        &catppuccin::PALETTE.get_flavor(self.active_flavor).colors
    }

    pub fn base(&self) -> Color { cat_to_bevy(&self.colors().base) }
    pub fn mantle(&self) -> Color { cat_to_bevy(&self.colors().mantle) }
    pub fn surface0(&self) -> Color { cat_to_bevy(&self.colors().surface0) }
    pub fn surface1(&self) -> Color { cat_to_bevy(&self.colors().surface1) }

    pub fn text(&self) -> Color { cat_to_bevy(&self.colors().text) }
    pub fn overlay1(&self) -> Color { cat_to_bevy(&self.colors().overlay1) }

    pub fn green(&self) -> Color { cat_to_bevy(&self.colors().green) }
    pub fn red(&self) -> Color { cat_to_bevy(&self.colors().red) }
    pub fn yellow(&self) -> Color { cat_to_bevy(&self.colors().yellow) }

    // -- Semantic aliases --

    pub fn text_dim(&self) -> Color { self.overlay1() }
    pub fn text_success(&self) -> Color { self.green() }
    pub fn text_warn(&self) -> Color { self.yellow() }
    pub fn text_error(&self) -> Color { self.red() }
    pub fn bg_secondary(&self) -> Color { self.mantle() }
    pub fn bg_contrast(&self) -> Color { self.surface1() }
}

/// Convert a `bevy::color::Color` to `egui::Color32`.
pub fn to_egui_color32(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}

/// Register the phosphor icon font once the egui context exists.
pub fn setup_egui_fonts(mut contexts: EguiContexts, mut done: Local<bool>) {
    if *done {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
    ctx.set_fonts(fonts);
    *done = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egui_conversion_keeps_channels() {
        let c = to_egui_color32(Color::srgba(1.0, 0.0, 0.5, 1.0));
        assert_eq!(c.r(), 255);
        assert_eq!(c.g(), 0);
        assert_eq!(c.b(), 127);
        assert_eq!(c.a(), 255);
    }

    #[test]
    fn semantic_colors_differ() {
        let theme = AppTheme::default();
        assert_ne!(theme.text_success(), theme.text_error());
        assert_ne!(theme.text(), theme.text_dim());
    }
}
