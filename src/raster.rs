use image::GrayImage;

/// Binary occupancy grid, origin top-left, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Raster {
    /// All-background raster.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build from text rows where `#` marks foreground. Rows shorter than
    /// the longest one are padded with background.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        Self::from_fn(width, rows.len(), |x, y| rows[y].chars().nth(x) == Some('#'))
    }

    /// Non-zero pixels are foreground.
    pub fn from_gray(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self::from_fn(w as usize, h as usize, |x, y| {
            img.get_pixel(x as u32, y as u32).0[0] > 0
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Foreground test. Out-of-bounds cells read as background, which acts
    /// as a one-cell background border around the grid.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
