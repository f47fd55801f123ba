use crate::error::ConfigError;
use crate::physics::MAX_FIELD_DIMENSION;

/// Half-width of the square averaging window, in cells (21x21 window)
pub const DENSITY_WINDOW_RADIUS: i64 = 10;

/// Per-round record of where projectiles landed.
///
/// Impacts are counted on a one-unit grid; queries return the mean count over
/// a square window so agents sense a smooth repulsion field instead of single
/// noisy cells.
#[derive(Clone, Debug)]
pub struct ShotDensityField {
    width: usize,
    height: usize,
    counts: Vec<u32>,
    total_impacts: u32,
}

impl ShotDensityField {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        let cells = width.checked_mul(height).filter(|&cells| cells > 0);
        let Some(cells) = cells else {
            return Err(ConfigError::InvalidField {
                width: width as f32,
                height: height as f32,
                max: MAX_FIELD_DIMENSION,
            });
        };
        Ok(Self {
            width,
            height,
            counts: vec![0; cells],
            total_impacts: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn total_impacts(&self) -> u32 {
        self.total_impacts
    }

    /// Raw impact count of a single cell, `None` outside the grid
    pub fn count_at(&self, cx: usize, cy: usize) -> Option<u32> {
        (cx < self.width && cy < self.height).then(|| self.counts[cy * self.width + cx])
    }

    /// Add one impact at the cell containing (x, y). Out-of-bounds points are ignored.
    pub fn record(&mut self, x: f32, y: f32) {
        let (fx, fy) = (x.floor(), y.floor());
        if !(fx >= 0.0 && fy >= 0.0 && fx < self.width as f32 && fy < self.height as f32) {
            return;
        }
        let idx = fy as usize * self.width + fx as usize;
        self.counts[idx] = self.counts[idx].saturating_add(1);
        self.total_impacts = self.total_impacts.saturating_add(1);
    }

    /// Mean impact count over the window centred on (x, y).
    ///
    /// The query point is clamped into the grid; the window is clipped to it.
    pub fn density_at(&self, x: f32, y: f32) -> f32 {
        let cx = (x.floor() as i64).clamp(0, self.width as i64 - 1);
        let cy = (y.floor() as i64).clamp(0, self.height as i64 - 1);

        let x0 = (cx - DENSITY_WINDOW_RADIUS).max(0) as usize;
        let x1 = (cx + DENSITY_WINDOW_RADIUS).min(self.width as i64 - 1) as usize;
        let y0 = (cy - DENSITY_WINDOW_RADIUS).max(0) as usize;
        let y1 = (cy + DENSITY_WINDOW_RADIUS).min(self.height as i64 - 1) as usize;

        let mut sum: u64 = 0;
        let mut cells: u64 = 0;
        for row in y0..=y1 {
            let start = row * self.width;
            for &count in &self.counts[start + x0..=start + x1] {
                sum += u64::from(count);
            }
            cells += (x1 - x0 + 1) as u64;
        }

        if cells == 0 {
            0.0
        } else {
            sum as f32 / cells as f32
        }
    }

    pub fn clear(&mut self) {
        self.counts.fill(0);
        self.total_impacts = 0;
    }
}
