//! Moore-neighbour boundary tracing on a binary raster.
//!
//! Every foreground/background transition yields one closed contour of
//! boundary cells. Outer perimeters and hole perimeters come out the same
//! way here; telling them apart is the classifier's job.

use kurbo::Point;

use crate::geom::Contour;
use crate::raster::Raster;

/// Neighbour offsets, clockwise in image coordinates (y down), starting East.
///
/// ```text
///   5 6 7
///   4 . 0
///   3 2 1
/// ```
const DX: [i64; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [i64; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

/// Offset from the arrival direction to the first neighbour searched:
/// turn left of the incoming step, then sweep clockwise.
const SEARCH_OFFSET: usize = 5;

/// Trace every boundary in `raster`.
///
/// Cells are scanned row-major. A cell starts a trace when it is
/// foreground, its left neighbour is background and no earlier trace has
/// visited it. Contour points are the boundary cell coordinates.
pub fn trace(raster: &Raster) -> Vec<Contour> {
    let (w, h) = (raster.width(), raster.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let mut visited = Visited::new(w, h);
    let mut contours = Vec::new();

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            if raster.get(x, y) && !raster.get(x - 1, y) && !visited.contains(x, y) {
                contours.push(follow(raster, x, y, &mut visited));
            }
        }
    }

    log::debug!("trace: {}x{} raster, {} contours", w, h, contours.len());
    contours
}

/// Cells already claimed by a traced boundary. Lives for one `trace` call.
struct Visited {
    width: usize,
    cells: Vec<bool>,
}

impl Visited {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            cells: vec![false; width * height],
        }
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        self.cells[y as usize * self.width + x as usize]
    }

    fn insert(&mut self, x: i64, y: i64) {
        self.cells[y as usize * self.width + x as usize] = true;
    }
}

/// Follow one boundary from `(start_x, start_y)` until it closes.
///
/// Never fails: an isolated pixel closes at length 1, and a walk that
/// doesn't return within the padded cell count is truncated.
fn follow(raster: &Raster, start_x: i64, start_y: i64, visited: &mut Visited) -> Contour {
    let mut points = vec![Point::new(start_x as f64, start_y as f64)];
    visited.insert(start_x, start_y);

    let max_steps = (raster.width() + 2) * (raster.height() + 2);
    let (mut x, mut y) = (start_x, start_y);
    let mut direction = 0usize;

    for _ in 0..max_steps {
        let search_start = (direction + SEARCH_OFFSET) % 8;
        let next = (0..8)
            .map(|i| (search_start + i) % 8)
            .find(|&d| raster.get(x + DX[d], y + DY[d]));

        let Some(d) = next else {
            break;
        };
        x += DX[d];
        y += DY[d];
        direction = d;

        if (x, y) == (start_x, start_y) {
            return Contour::new(points);
        }
        points.push(Point::new(x as f64, y as f64));
        visited.insert(x, y);
    }

    Contour::new(points)
}
