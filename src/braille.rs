use crate::surface::{Rgba, Style, Surface};

/// Braille Unicode drawing surface for high-resolution terminal graphics.
/// Each character cell represents a 2x4 pixel grid (8 dots); each cell also
/// carries the color last drawn into it. Implements the canvas-like
/// [`Surface`] contract: accumulated subpaths, even-odd fill, Bresenham
/// stroking, and a saved-style stack.
pub struct BrailleSurface {
    width: usize,  // Characters
    height: usize, // Characters
    dots: Vec<u8>, // Bit patterns per char, row-major
    colors: Vec<Rgba>,
    style: Style,
    saved: Vec<Style>,
    subpaths: Vec<Vec<(f64, f64)>>,
}

impl BrailleSurface {
    /// Create a surface with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0u8; width * height],
            colors: vec![Rgba::BLACK; width * height],
            style: Style::default(),
            saved: Vec::new(),
            subpaths: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// The cell's Braille character and color, or `None` while no dot is set.
    pub fn cell(&self, cx: usize, cy: usize) -> Option<(char, Rgba)> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        let bits = self.dots[cy * self.width + cx];
        if bits == 0 {
            return None;
        }
        let ch = char::from_u32(0x2800 + u32::from(bits)).unwrap_or(' ');
        Some((ch, self.colors[cy * self.width + cx]))
    }

    /// Set a pixel in the current color.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let cx = x / 2;
        let cy = y / 4;
        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            _ => 0x80,
        };

        let idx = cy * self.width + cx;
        self.dots[idx] |= bit;
        self.colors[idx] = color;
    }

    /// Render the whole surface as lines of Braille characters.
    #[cfg(test)]
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|cy| {
                (0..self.width)
                    .map(|cx| self.cell(cx, cy).map_or('\u{2800}', |(ch, _)| ch))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Surface for BrailleSurface {
    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.push((x, y)),
            None => self.subpaths.push(vec![(x, y)]),
        }
    }

    fn close_path(&mut self) {
        if let Some(subpath) = self.subpaths.last_mut() {
            if let (Some(&first), true) = (subpath.first(), subpath.len() > 1) {
                subpath.push(first);
            }
        }
    }

    fn set_fill(&mut self, color: Rgba) {
        self.style.fill = color;
    }

    fn set_stroke(&mut self, color: Rgba) {
        self.style.stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.style.line_width = width.max(0.0);
    }

    /// Even-odd scanline fill of the accumulated subpaths. Every subpath is
    /// treated as closed, matching canvas fill semantics.
    fn fill(&mut self) {
        let color = self.style.fill.over_black();
        let ph = self.pixel_height() as i32;
        let pw = self.pixel_width() as i32;

        let mut crossings: Vec<f64> = Vec::new();
        for y in 0..ph {
            let sample = f64::from(y) + 0.5;
            crossings.clear();
            for subpath in &self.subpaths {
                if subpath.len() < 2 {
                    continue;
                }
                for i in 0..subpath.len() {
                    let (x0, y0) = subpath[i];
                    let (x1, y1) = subpath[(i + 1) % subpath.len()];
                    if (y0 <= sample && sample < y1) || (y1 <= sample && sample < y0) {
                        crossings.push(x0 + (sample - y0) * (x1 - x0) / (y1 - y0));
                    }
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = span[0].round().max(0.0) as i32;
                let end = span[1].round().min(f64::from(pw)) as i32;
                for x in start..end {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Stroke the accumulated subpaths with Bresenham lines; widths above
    /// 1.5 get a one-pixel thickening pass.
    fn stroke(&mut self) {
        let color = self.style.stroke.over_black();
        let thick = self.style.line_width > 1.5;
        let subpaths = std::mem::take(&mut self.subpaths);
        for subpath in &subpaths {
            for pair in subpath.windows(2) {
                let (x0, y0) = (pair[0].0.round() as i32, pair[0].1.round() as i32);
                let (x1, y1) = (pair[1].0.round() as i32, pair[1].1.round() as i32);
                self.line(x0, y0, x1, y1, color);
                if thick {
                    self.line(x0 + 1, y0, x1 + 1, y1, color);
                    self.line(x0, y0 + 1, x1, y1 + 1, color);
                }
            }
        }
        self.subpaths = subpaths;
    }

    fn save(&mut self) {
        self.saved.push(self.style);
    }

    fn restore(&mut self) {
        if let Some(style) = self.saved.pop() {
            self.style = style;
        }
    }
}

impl BrailleSurface {
    /// Bresenham line in the given color.
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;

            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }

            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(surface: &mut BrailleSurface, x: i32, y: i32) {
        let color = surface.style.stroke.over_black();
        surface.set_pixel(x, y, color);
    }

    #[test]
    fn single_pixel() {
        let mut surface = BrailleSurface::new(1, 1);
        dot(&mut surface, 0, 0);
        assert_eq!(surface.to_text(), "⠁"); // U+2801
    }

    #[test]
    fn all_dots() {
        let mut surface = BrailleSurface::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                dot(&mut surface, x, y);
            }
        }
        assert_eq!(surface.to_text(), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn diagonal() {
        let mut surface = BrailleSurface::new(2, 1);
        dot(&mut surface, 0, 0);
        dot(&mut surface, 1, 1);
        dot(&mut surface, 2, 2);
        dot(&mut surface, 3, 3);
        // First char: (0,0) and (1,1) = 0x01 | 0x10 = 0x11
        // Second char: (0,2) and (1,3) = 0x04 | 0x80 = 0x84
        assert_eq!(surface.to_text(), "⠑⢄");
    }

    #[test]
    fn stroke_draws_a_horizontal_line() {
        let mut surface = BrailleSurface::new(4, 1);
        surface.begin_path();
        surface.move_to(0.0, 0.0);
        surface.line_to(7.0, 0.0);
        surface.set_stroke(Rgba::new(255, 0, 0));
        surface.stroke();
        for cx in 0..4 {
            let (_, color) = surface.cell(cx, 0).expect("cell should be set");
            assert_eq!((color.r, color.g, color.b), (255, 0, 0));
        }
    }

    #[test]
    fn fill_covers_the_rectangle_interior() {
        let mut surface = BrailleSurface::new(4, 2);
        surface.begin_path();
        surface.move_to(1.0, 1.0);
        surface.line_to(7.0, 1.0);
        surface.line_to(7.0, 7.0);
        surface.line_to(1.0, 7.0);
        surface.close_path();
        surface.fill();
        // An interior cell is fully covered
        assert!(surface.cell(1, 1).is_some());
        // A point well outside stays empty
        assert!(surface.cell(3, 1).is_none() || surface.cell(3, 1).map(|(c, _)| c) != Some('⣿'));
    }

    #[test]
    fn fill_respects_even_odd_holes() {
        let mut surface = BrailleSurface::new(8, 4);
        surface.begin_path();
        surface.move_to(0.0, 0.0);
        surface.line_to(15.0, 0.0);
        surface.line_to(15.0, 15.0);
        surface.line_to(0.0, 15.0);
        surface.close_path();
        surface.move_to(6.0, 6.0);
        surface.line_to(10.0, 6.0);
        surface.line_to(10.0, 10.0);
        surface.line_to(6.0, 10.0);
        surface.close_path();
        surface.fill();
        // A pixel inside the hole stays unset: cell (4,2) covers pixels
        // x 8..10, y 8..12 — pixel (8,8) is in the hole
        let hole_cell = surface.cell(4, 2);
        if let Some((ch, _)) = hole_cell {
            let bits = ch as u32 - 0x2800;
            assert_eq!(bits & 0x01, 0, "hole pixel should be unset");
        }
    }

    #[test]
    fn save_restore_round_trips_style() {
        let mut surface = BrailleSurface::new(1, 1);
        surface.set_stroke(Rgba::new(1, 2, 3));
        surface.save();
        surface.set_stroke(Rgba::new(9, 9, 9));
        surface.set_line_width(4.0);
        surface.restore();
        assert_eq!(surface.style.stroke, Rgba::new(1, 2, 3));
        assert_eq!(surface.style.line_width, 1.0);
    }

    #[test]
    fn restore_without_save_is_a_no_op() {
        let mut surface = BrailleSurface::new(1, 1);
        surface.set_line_width(3.0);
        surface.restore();
        assert_eq!(surface.style.line_width, 3.0);
    }
}
