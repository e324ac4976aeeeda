use ratatui::style::{Modifier, Style};
use serde::{Deserialize, Serialize};

pub mod catppuccin;
pub mod nord;
pub mod palette;

pub use palette::{dim_color, Palette};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub border: Style,
    pub border_focus: Style,

    pub header_logo: Style,
    pub header: Style,
    pub header_active: Style,
    pub header_item: Style,
    pub header_warn: Style,

    pub status_info: Style,
    pub status_error: Style,

    pub list_item: Style,
    pub list_selected: Style,
    pub list_url: Style,
    pub highlight: Style,
    pub dimmed: Style,

    pub footer: Style,
    pub footer_segment_key: Style,
    pub footer_segment_val: Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    CatppuccinMocha,
    Nord,
}

impl PaletteType {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PaletteType::CatppuccinMocha => "Catppuccin (Mocha)",
            PaletteType::Nord => "Nord",
        }
    }
}

impl Theme {
    #[must_use]
    pub fn from_palette_type(t: PaletteType) -> Self {
        match t {
            PaletteType::CatppuccinMocha => Self::from_palette(&catppuccin::CATPPUCCIN_MOCHA),
            PaletteType::Nord => Self::from_palette(&nord::NORD),
        }
    }

    #[must_use]
    pub fn from_palette(p: &Palette) -> Self {
        Self {
            border: Style::default().fg(p.surface2),
            border_focus: Style::default().fg(p.blue),

            header_logo: Style::default()
                .bg(p.mauve)
                .fg(p.crust)
                .add_modifier(Modifier::BOLD),
            header: Style::default().bg(p.surface0).fg(p.subtext0),
            header_active: Style::default().fg(p.blue).add_modifier(Modifier::BOLD),
            header_item: Style::default().fg(p.teal).add_modifier(Modifier::BOLD),
            header_warn: Style::default().fg(p.yellow).add_modifier(Modifier::BOLD),

            status_info: Style::default()
                .bg(p.blue)
                .fg(p.crust)
                .add_modifier(Modifier::BOLD),
            status_error: Style::default().fg(p.red).add_modifier(Modifier::BOLD),

            list_item: Style::default().fg(p.text),
            list_selected: Style::default()
                .bg(p.surface1)
                .fg(p.text)
                .add_modifier(Modifier::BOLD),
            list_url: Style::default().fg(p.overlay0).add_modifier(Modifier::DIM),
            highlight: Style::default().fg(p.green).add_modifier(Modifier::BOLD),
            dimmed: Style::default().fg(p.overlay1).add_modifier(Modifier::DIM),

            footer: Style::default().bg(p.mantle).fg(p.subtext0),
            footer_segment_key: Style::default().fg(p.peach).add_modifier(Modifier::BOLD),
            footer_segment_val: Style::default().fg(p.text),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_palette_type(PaletteType::CatppuccinMocha)
    }
}
