/// RGBA color. Alpha is kept as a float so time-decayed markers can fade
/// smoothly before being composited down to a terminal cell color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0);
    pub const GRAY: Rgba = Rgba::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parse `#rrggbb` or a CSS-style color name.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Self::new(r, g, b));
        }
        match text {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "gray" | "grey" => Some(Self::GRAY),
            "red" => Some(Self::new(255, 0, 0)),
            "green" => Some(Self::new(0, 192, 0)),
            "blue" => Some(Self::new(0, 64, 255)),
            "yellow" => Some(Self::new(255, 224, 0)),
            "orange" => Some(Self::new(255, 140, 0)),
            "cyan" => Some(Self::new(0, 224, 224)),
            "magenta" => Some(Self::new(224, 0, 224)),
            "pink" => Some(Self::new(255, 128, 180)),
            _ => None,
        }
    }

    /// Composite onto a black background, folding alpha into the channels.
    /// Terminal cells have no alpha of their own.
    pub fn over_black(self) -> Self {
        let a = self.a.clamp(0.0, 1.0);
        Self {
            r: (f64::from(self.r) * a).round() as u8,
            g: (f64::from(self.g) * a).round() as u8,
            b: (f64::from(self.b) * a).round() as u8,
            a: 1.0,
        }
    }
}

/// Mutable style state of a drawing surface, saved and restored as a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub stroke: Rgba,
    pub fill: Rgba,
    pub line_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Rgba::WHITE,
            fill: Rgba::WHITE,
            line_width: 1.0,
        }
    }
}

/// Canvas-like drawing surface. The engine orchestrates *when* hooks draw;
/// everything they draw goes through this contract.
///
/// Paths are accumulated between `begin_path` and `fill`/`stroke`. `save`
/// and `restore` manage a stack of [`Style`] snapshots.
pub trait Surface {
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);

    fn set_fill(&mut self, color: Rgba);
    fn set_stroke(&mut self, color: Rgba);
    fn set_line_width(&mut self, width: f64);

    fn fill(&mut self);
    fn stroke(&mut self);

    fn save(&mut self);
    fn restore(&mut self);
}

/// Run `f` with the surface's style state saved, restoring it on every exit
/// path. Lets independently authored draw hooks set fill/stroke/line-width
/// without affecting the hooks that run after them.
pub fn with_scoped_style<R>(
    surface: &mut dyn Surface,
    f: impl FnOnce(&mut dyn Surface) -> anyhow::Result<R>,
) -> anyhow::Result<R> {
    surface.save();
    let result = f(surface);
    surface.restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        assert_eq!(Rgba::parse("#2c3d7f"), Some(Rgba::new(0x2c, 0x3d, 0x7f)));
        assert_eq!(Rgba::parse("white"), Some(Rgba::WHITE));
        assert_eq!(Rgba::parse("#12345"), None);
        assert_eq!(Rgba::parse("mauve-ish"), None);
    }

    #[test]
    fn alpha_composites_onto_black() {
        let half = Rgba::new(200, 100, 50).with_alpha(0.5).over_black();
        assert_eq!((half.r, half.g, half.b), (100, 50, 25));
        assert_eq!(half.a, 1.0);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Rgba::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Rgba::WHITE.with_alpha(-1.0).a, 0.0);
    }

    #[test]
    fn scoped_style_restores_on_the_error_path() {
        use crate::braille::BrailleSurface;

        let mut surface = BrailleSurface::new(2, 1);
        surface.set_stroke(Rgba::new(255, 0, 0));
        let result: anyhow::Result<()> = with_scoped_style(&mut surface, |s| {
            s.set_stroke(Rgba::new(0, 255, 0));
            anyhow::bail!("hook blew up")
        });
        assert!(result.is_err());

        // The next stroke still uses the pre-scope color.
        surface.begin_path();
        surface.move_to(0.0, 0.0);
        surface.line_to(3.0, 0.0);
        surface.stroke();
        let (_, color) = surface.cell(0, 0).expect("stroked cell");
        assert_eq!((color.r, color.g, color.b), (255, 0, 0));
    }
}
