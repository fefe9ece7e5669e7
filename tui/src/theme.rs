//! Color theme and glyphs for the whorl TUI.
//!
//! Uses Kanagawa Wave palette by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

use whorl_engine::UiOptions;

/// Kanagawa Wave color palette constants.
mod colors {
    use super::Color;

    // === Backgrounds (Sumi Ink) ===
    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_PANEL: Color = Color::Rgb(31, 31, 40); // sumiInk3
    pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 42, 55); // sumiInk4
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    // === Foregrounds (Fuji) ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_SECONDARY: Color = Color::Rgb(200, 192, 147); // oldWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray
    pub const TEXT_DISABLED: Color = Color::Rgb(113, 124, 124); // katanaGray

    // === Primary/Brand ===
    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet
    pub const PRIMARY_DIM: Color = Color::Rgb(147, 138, 169); // springViolet1

    // === Accent Colors ===
    pub const BLUE: Color = Color::Rgb(126, 156, 216); // crystalBlue
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const YELLOW: Color = Color::Rgb(230, 195, 132); // carpYellow
    pub const ORANGE: Color = Color::Rgb(255, 160, 102); // surimiOrange
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed

    // === Semantic Aliases ===
    pub const SCAN: Color = BLUE;
    pub const SUCCESS: Color = GREEN;
    pub const WARNING: Color = YELLOW;
    pub const ERROR: Color = RED;
    pub const PEACH: Color = ORANGE;
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub text_disabled: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub scan: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub peach: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            text_disabled: colors::TEXT_DISABLED,
            primary: colors::PRIMARY,
            primary_dim: colors::PRIMARY_DIM,
            scan: colors::SCAN,
            success: colors::SUCCESS,
            warning: colors::WARNING,
            error: colors::ERROR,
            peach: colors::PEACH,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_highlight: Color::DarkGray,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            text_disabled: Color::DarkGray,
            primary: Color::White,
            primary_dim: Color::Gray,
            scan: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            peach: Color::Yellow,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for icons and spinners.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub fingerprint: &'static str,
    pub matched: &'static str,
    pub rejected: &'static str,
    pub enrolled: &'static str,
    pub available: &'static str,
    pub selected: &'static str,
    pub bullet: &'static str,
    pub divider: &'static str,
    pub track: &'static str,
    pub thumb: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            fingerprint: "@",
            matched: "OK",
            rejected: "X",
            enrolled: "+",
            available: "o",
            selected: ">",
            bullet: "*",
            divider: "-",
            track: ".",
            thumb: "#",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            fingerprint: "◎",
            matched: "✓",
            rejected: "✗",
            enrolled: "●",
            available: "○",
            selected: "▸",
            bullet: "•",
            divider: "─",
            track: "░",
            thumb: "█",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Bouncing block for a progress bar with no known end.
///
/// Reduced motion parks the block at the left edge.
#[must_use]
pub fn indeterminate_bar(width: usize, tick: usize, options: UiOptions) -> String {
    let glyphs = glyphs(options);
    if width == 0 {
        return String::new();
    }
    let block = (width / 4).max(1);
    let travel = width - block;
    let offset = if options.reduced_motion || travel == 0 {
        0
    } else {
        // Advance one cell every other frame.
        let phase = (tick / 2) % (travel * 2);
        if phase <= travel { phase } else { travel * 2 - phase }
    };

    let mut bar = String::with_capacity(width * 3);
    for cell in 0..width {
        if cell >= offset && cell < offset + block {
            bar.push_str(glyphs.thumb);
        } else {
            bar.push_str(glyphs.track);
        }
    }
    bar
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn description(palette: &Palette) -> Style {
        Style::default().fg(palette.text_secondary)
    }

    #[must_use]
    pub fn success(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.success)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn error(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.error)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn scanning(palette: &Palette) -> Style {
        Style::default().fg(palette.scan)
    }

    #[must_use]
    pub fn disabled(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_disabled)
            .add_modifier(Modifier::DIM)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.peach)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use whorl_engine::UiOptions;

    use super::{indeterminate_bar, spinner_frame};

    #[test]
    fn spinner_frame_cycles_without_reduced_motion() {
        let options = UiOptions::default();
        let frame0 = spinner_frame(0, options);
        let frame1 = spinner_frame(1, options);
        assert_ne!(frame0, frame1, "spinner should cycle through frames");
    }

    #[test]
    fn spinner_frame_static_with_reduced_motion() {
        let options = UiOptions {
            reduced_motion: true,
            ..UiOptions::default()
        };
        let frame0 = spinner_frame(0, options);
        let frame1 = spinner_frame(1, options);
        let frame100 = spinner_frame(100, options);
        assert_eq!(
            frame0, frame1,
            "spinner should be static with reduced_motion"
        );
        assert_eq!(frame0, frame100, "spinner should remain static at any tick");
    }

    #[test]
    fn spinner_frame_static_with_reduced_motion_ascii() {
        let options = UiOptions {
            ascii_only: true,
            reduced_motion: true,
            ..UiOptions::default()
        };
        assert_eq!(spinner_frame(7, options), "|");
    }

    #[test]
    fn indeterminate_bar_keeps_its_width_and_moves() {
        let options = UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        };
        let first = indeterminate_bar(20, 0, options);
        let later = indeterminate_bar(20, 10, options);
        assert_eq!(first.len(), 20);
        assert_eq!(later.len(), 20);
        assert!(first.starts_with("#####"));
        assert_ne!(first, later);
    }

    #[test]
    fn indeterminate_bar_is_static_with_reduced_motion() {
        let options = UiOptions {
            ascii_only: true,
            reduced_motion: true,
            ..UiOptions::default()
        };
        assert_eq!(
            indeterminate_bar(12, 0, options),
            indeterminate_bar(12, 37, options)
        );
    }
}
