//! Height field decoding.
//!
//! A height map is a grayscale image in which darker pixels are higher
//! terrain. Only the red channel is read: a red value of 255 is the field
//! floor (0 m) and 0 is [`MAX_HEIGHT`] above it, with a linear ramp in
//! between. The image's own pixel dimensions become the grid dimensions.

use std::fmt;
use std::path::Path;

use fieldsight_core::{Grid, Point};
use image::DynamicImage;

/// Elevation of a fully black height-map pixel, in meters.
pub const MAX_HEIGHT: f64 = 5.0;

/// Grid width of the competition height map.
pub const DEFAULT_GRID_WIDTH: i32 = 280;

/// Grid height of the competition height map.
pub const DEFAULT_GRID_HEIGHT: i32 = 150;

/// Elevation encoded by a red-channel value.
#[inline]
pub fn elevation_from_red(red: u8, max_height: f64) -> f64 {
    f64::from(255 - red) / 255.0 * max_height
}

/// Per-cell terrain elevation, in meters.
///
/// Immutable once built; load a new one when the source image changes.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    elevations: Grid<f64>,
}

impl HeightField {
    /// Decode a height map image with the given full-scale height.
    pub fn from_image(img: &DynamicImage, max_height: f64) -> Result<Self, HeightFieldError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(HeightFieldError::Empty { width, height });
        }
        let elevations = Grid::from_fn(width as i32, height as i32, |p| {
            let px = rgba.get_pixel(p.x as u32, p.y as u32);
            elevation_from_red(px.0[0], max_height)
        });
        log::debug!("decoded {width}x{height} height field (max {max_height} m)");
        Ok(Self { elevations })
    }

    /// Read and decode a height map from disk.
    pub fn load(path: impl AsRef<Path>, max_height: f64) -> Result<Self, HeightFieldError> {
        let path = path.as_ref();
        let img = image::open(path)?;
        let field = Self::from_image(&img, max_height)?;
        log::info!(
            "loaded height map {} ({}x{})",
            path.display(),
            field.width(),
            field.height()
        );
        Ok(field)
    }

    /// Wrap row-major elevations (`index = y * width + x`).
    pub fn from_elevations(
        width: i32,
        height: i32,
        elevations: Vec<f64>,
    ) -> Result<Self, HeightFieldError> {
        let expected = width.max(0) as usize * height.max(0) as usize;
        let actual = elevations.len();
        match Grid::from_vec(width, height, elevations) {
            Some(elevations) => Ok(Self { elevations }),
            None => Err(HeightFieldError::SizeMismatch { expected, actual }),
        }
    }

    /// Build a field from a per-cell elevation function.
    pub fn from_fn(width: i32, height: i32, f: impl FnMut(Point) -> f64) -> Self {
        Self {
            elevations: Grid::from_fn(width, height, f),
        }
    }

    /// A field with every cell at floor level.
    pub fn flat(width: i32, height: i32) -> Self {
        Self {
            elevations: Grid::filled(width, height, 0.0),
        }
    }

    /// Terrain elevation at `p`, or `None` when `p` is outside the field.
    ///
    /// This is the only way elevations are read; a `None` means "no data".
    #[inline]
    pub fn elevation(&self, p: Point) -> Option<f64> {
        self.elevations.at(p)
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.elevations.contains(p)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.elevations.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.elevations.height()
    }

    #[inline]
    pub fn size(&self) -> Point {
        self.elevations.size()
    }

    /// The underlying elevation grid.
    pub fn grid(&self) -> &Grid<f64> {
        &self.elevations
    }
}

/// Errors that can occur when building a [`HeightField`].
#[derive(Debug)]
pub enum HeightFieldError {
    /// The image could not be read or decoded.
    Image(image::ImageError),
    /// The image has no pixels.
    Empty { width: u32, height: u32 },
    /// The elevation buffer does not match the requested dimensions.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for HeightFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(e) => write!(f, "height map: {e}"),
            Self::Empty { width, height } => {
                write!(f, "height map is empty ({width}x{height})")
            }
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "height field needs {expected} elevations, got {actual}"
            ),
        }
    }
}

impl std::error::Error for HeightFieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for HeightFieldError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}
