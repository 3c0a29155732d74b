use std::io::IsTerminal;

use clap::{
  ValueEnum,
  builder::styling::{AnsiColor, Color as ClapColor, RgbColor, Style, Styles},
};
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

use crate::generator::http_rule::HttpMethod;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
  Color::Rgb { r, g, b }
}

#[derive(Debug, Clone, Copy)]
struct Palette {
  timestamp: Color,
  primary: Color,
  accent: Color,
  info: Color,
  success: Color,
  warning: Color,
  label: Color,
  value: Color,
  read: Color,
  write: Color,
  remove: Color,
}

const DARK: Palette = Palette {
  timestamp: rgb(120, 140, 160),
  primary: rgb(200, 200, 210),
  accent: rgb(229, 140, 80),
  info: rgb(110, 170, 220),
  success: rgb(120, 200, 140),
  warning: rgb(236, 190, 70),
  label: rgb(150, 170, 230),
  value: rgb(240, 220, 150),
  read: rgb(110, 200, 170),
  write: rgb(236, 190, 70),
  remove: rgb(230, 100, 100),
};

const LIGHT: Palette = Palette {
  timestamp: rgb(90, 100, 115),
  primary: rgb(40, 44, 52),
  accent: rgb(190, 90, 30),
  info: rgb(30, 100, 170),
  success: rgb(30, 130, 70),
  warning: rgb(170, 120, 0),
  label: rgb(60, 80, 160),
  value: rgb(120, 80, 20),
  read: rgb(20, 120, 100),
  write: rgb(170, 120, 0),
  remove: rgb(180, 40, 40),
};

/// Terminal colors for progress output and tables. Every accessor returns
/// `Color::Reset` when color output is disabled.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
  enabled: bool,
  palette: Palette,
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    let palette = match theme {
      Theme::Dark => DARK,
      Theme::Light => LIGHT,
    };
    Self { enabled, palette }
  }

  const fn pick(&self, color: Color) -> Color {
    if self.enabled { color } else { Color::Reset }
  }

  pub const fn timestamp(&self) -> Color {
    self.pick(self.palette.timestamp)
  }

  pub const fn primary(&self) -> Color {
    self.pick(self.palette.primary)
  }

  pub const fn accent(&self) -> Color {
    self.pick(self.palette.accent)
  }

  pub const fn info(&self) -> Color {
    self.pick(self.palette.info)
  }

  pub const fn success(&self) -> Color {
    self.pick(self.palette.success)
  }

  pub const fn warning(&self) -> Color {
    self.pick(self.palette.warning)
  }

  pub const fn label(&self) -> Color {
    self.pick(self.palette.label)
  }

  pub const fn value(&self) -> Color {
    self.pick(self.palette.value)
  }

  /// Safe methods, mutating methods and deletes each get their own color.
  pub const fn http_method(&self, method: HttpMethod) -> Color {
    match method {
      HttpMethod::Get => self.pick(self.palette.read),
      HttpMethod::Put | HttpMethod::Post | HttpMethod::Patch => self.pick(self.palette.write),
      HttpMethod::Delete => self.pick(self.palette.remove),
    }
  }

  pub const fn clap_styles() -> Styles {
    let colors = Self::new(true, Theme::Dark);

    Styles::styled()
      .header(Style::new().bold().underline().fg_color(to_clap(colors.label())))
      .usage(Style::new().bold().fg_color(to_clap(colors.label())))
      .literal(Style::new().fg_color(to_clap(colors.success())))
      .placeholder(Style::new().fg_color(to_clap(colors.info())))
      .error(Style::new().bold().fg_color(to_clap(colors.accent())))
      .valid(Style::new().fg_color(to_clap(colors.success())))
      .invalid(Style::new().bold().fg_color(to_clap(colors.accent())))
  }
}

const fn to_clap(color: Color) -> Option<ClapColor> {
  match color {
    Color::Rgb { r, g, b } => Some(ClapColor::Rgb(RgbColor(r, g, b))),
    Color::Reset => None,
    _ => Some(ClapColor::Ansi(AnsiColor::White)),
  }
}

/// Table cells only ever receive palette colors, which are RGB or reset.
pub fn comfy(color: Color) -> ComfyColor {
  match color {
    Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
    Color::AnsiValue(value) => ComfyColor::AnsiValue(value),
    _ => ComfyColor::Reset,
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => theme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()),
  }
}

/// `COLORFGBG` is `fg;bg`; background indexes 8 and up are light.
fn theme_from_colorfgbg(value: Option<&str>) -> Theme {
  match value
    .and_then(|value| value.split(';').next_back())
    .and_then(|bg| bg.parse::<u8>().ok())
  {
    Some(bg) if bg >= 8 => Theme::Light,
    _ => Theme::Dark,
  }
}
