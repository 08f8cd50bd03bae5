//! ratatui adapter for tfm.
//!
//! Maps the tagged rows of a [Screen] onto theme styles and draws them as one
//! paragraph over the whole frame.

use crate::app::AppState;
use crate::config::{ColorProfile, Theme};
use crate::ui::layout::{Segment, StyleTag};
use crate::ui::render::Screen;

use ratatui::{
    Frame,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

/// How theme colors reach the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub profile: ColorProfile,
    /// Background fills are skipped so the terminal's own background shows.
    pub transparent: bool,
}

impl Appearance {
    pub fn of(app: &AppState) -> Self {
        Self {
            profile: app.color_profile(),
            transparent: app.background_opacity() < 1.0,
        }
    }
}

/// Theme style for a tag.
pub fn tag_style(theme: &Theme, tag: StyleTag, look: Appearance) -> Style {
    let style = match tag {
        StyleTag::Header => theme.header(),
        StyleTag::Status => theme.status(),
        StyleTag::Directory => theme.dir(),
        StyleTag::Selected => theme.selected(),
        StyleTag::Normal => theme.normal(),
    };
    style.to_style_with(look.profile, look.transparent)
}

pub fn to_lines<'s>(screen: &'s Screen, theme: &Theme, look: Appearance) -> Vec<Line<'s>> {
    screen
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|Segment { text, tag }| {
                    Span::styled(text.as_str(), tag_style(theme, *tag, look))
                })
                .collect::<Line>()
        })
        .collect()
}

pub fn draw(frame: &mut Frame, screen: &Screen, theme: &Theme, look: Appearance) {
    frame.render_widget(Paragraph::new(to_lines(screen, theme, look)), frame.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ui::layout::fitted_row;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::{Color, Modifier};

    #[test]
    fn draws_rows_with_theme_styles() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let screen = Screen {
            width: 12,
            height: 2,
            rows: vec![
                fitted_row("tfm | tab", 12, StyleTag::Header),
                fitted_row("src/", 12, StyleTag::Selected),
            ],
            images: Vec::new(),
        };

        let look = Appearance {
            profile: ColorProfile::TrueColor,
            transparent: false,
        };
        let mut terminal = Terminal::new(TestBackend::new(12, 2))?;
        terminal.draw(|f| draw(f, &screen, config.theme(), look))?;

        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(0, 0)].symbol(), "t");
        assert_eq!(buffer[(0, 1)].symbol(), "s");
        assert!(buffer[(0, 0)].modifier.contains(Modifier::BOLD));
        assert!(buffer[(0, 1)].modifier.contains(Modifier::REVERSED));
        Ok(())
    }

    #[test]
    fn lowered_opacity_leaves_backgrounds_unset() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::parse("[display]\nbackground_opacity = 0.8\n\n[theme.header]\nbg = \"236\"")?;
        let dir = tempfile::tempdir()?;
        let app = AppState::new(&config, dir.path(), false)?;
        let look = Appearance::of(&app);
        assert!(look.transparent);

        let header = tag_style(config.theme(), StyleTag::Header, look);
        assert_eq!(header.bg, None);
        let solid = Appearance {
            profile: ColorProfile::TrueColor,
            transparent: false,
        };
        assert_eq!(
            tag_style(config.theme(), StyleTag::Header, solid).bg,
            Some(Color::Indexed(236))
        );
        Ok(())
    }
}
