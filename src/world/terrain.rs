//! Terrain height queries
//!
//! Creatures read two layers: the ground surface and the upper (water) surface.
//! The difference between them is the water depth used for swim detection.

/// Read-only terrain height service
pub trait Terrain {
    /// Ground height at a world position
    fn height(&self, x: f32, z: f32) -> f32;

    /// Upper surface height (water level, or ground where there is no water)
    fn upper_height(&self, x: f32, z: f32) -> f32;

    /// Water depth at a world position, never negative
    fn water_depth(&self, x: f32, z: f32) -> f32 {
        (self.upper_height(x, z) - self.height(x, z)).max(0.0)
    }

    /// Ground pitch along a heading, in radians
    ///
    /// Positive when the ground rises in front of the creature.
    fn tilt(&self, x: f32, z: f32, heading: f32) -> f32 {
        const SAMPLE: f32 = 64.0;
        let (dx, dz) = (heading.sin() * SAMPLE, heading.cos() * SAMPLE);
        let front = self.height(x + dx, z + dz);
        let back = self.height(x - dx, z - dz);
        ((front - back) / (2.0 * SAMPLE)).atan()
    }
}

/// A regular height grid with a separate water surface layer
#[derive(Debug, Clone)]
pub struct HeightField {
    /// Width in cells (X axis)
    pub width: usize,
    /// Depth in cells (Z axis)
    pub depth: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Ground heights, row-major by Z
    ground: Vec<f32>,
    /// Water surface heights, row-major by Z
    water: Vec<f32>,
}

impl HeightField {
    /// Create a flat field at the given ground height with no water
    #[must_use]
    pub fn flat(width: usize, depth: usize, cell_size: f32, ground: f32) -> Self {
        let width = width.max(1);
        let depth = depth.max(1);
        Self {
            width,
            depth,
            cell_size,
            ground: vec![ground; width * depth],
            water: vec![f32::MIN; width * depth],
        }
    }

    /// Create a field by sampling a height function at each cell corner
    #[must_use]
    pub fn from_fn(
        width: usize,
        depth: usize,
        cell_size: f32,
        mut height: impl FnMut(f32, f32) -> f32,
    ) -> Self {
        let mut field = Self::flat(width, depth, cell_size, 0.0);
        for z in 0..field.depth {
            for x in 0..field.width {
                let h = height(x as f32 * cell_size, z as f32 * cell_size);
                field.ground[z * field.width + x] = h;
            }
        }
        field
    }

    /// Set the ground height at a cell
    pub fn set_height(&mut self, x: usize, z: usize, height: f32) {
        if x < self.width && z < self.depth {
            self.ground[z * self.width + x] = height;
        }
    }

    /// Set the water surface at a cell
    pub fn set_water(&mut self, x: usize, z: usize, level: f32) {
        if x < self.width && z < self.depth {
            self.water[z * self.width + x] = level;
        }
    }

    /// Flood every cell whose ground lies below `level`
    pub fn flood_below(&mut self, level: f32) {
        for (water, ground) in self.water.iter_mut().zip(&self.ground) {
            if *ground < level {
                *water = level;
            }
        }
    }

    /// World-space extent of the field along X and Z
    #[must_use]
    pub fn extent(&self) -> (f32, f32) {
        (
            (self.width - 1) as f32 * self.cell_size,
            (self.depth - 1) as f32 * self.cell_size,
        )
    }

    fn cell(&self, layer: &[f32], x: usize, z: usize) -> f32 {
        layer[z.min(self.depth - 1) * self.width + x.min(self.width - 1)]
    }

    /// Bilinear sample of a layer, clamped at the field edges
    fn sample(&self, layer: &[f32], x: f32, z: f32) -> f32 {
        if self.cell_size <= 0.0 {
            return layer[0];
        }
        let gx = (x / self.cell_size).max(0.0);
        let gz = (z / self.cell_size).max(0.0);
        let x0 = gx.floor() as usize;
        let z0 = gz.floor() as usize;
        let fx = if x0 + 1 < self.width { gx - x0 as f32 } else { 0.0 };
        let fz = if z0 + 1 < self.depth { gz - z0 as f32 } else { 0.0 };

        let h00 = self.cell(layer, x0, z0);
        let h10 = self.cell(layer, x0 + 1, z0);
        let h01 = self.cell(layer, x0, z0 + 1);
        let h11 = self.cell(layer, x0 + 1, z0 + 1);

        let near = h00 + (h10 - h00) * fx;
        let far = h01 + (h11 - h01) * fx;
        near + (far - near) * fz
    }
}

impl Terrain for HeightField {
    fn height(&self, x: f32, z: f32) -> f32 {
        self.sample(&self.ground, x, z)
    }

    fn upper_height(&self, x: f32, z: f32) -> f32 {
        self.sample(&self.water, x, z).max(self.height(x, z))
    }
}
