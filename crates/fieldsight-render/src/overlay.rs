use std::path::Path;

use fieldsight_core::{Grid, Point};
use fieldsight_los::{Coverage, VisibilityPair};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat, Rgba, RgbaImage};

/// Error type for overlay rendering and export.
#[derive(Debug)]
pub enum RenderError {
    /// Cells must be at least one pixel wide.
    ZeroCellSize,
    /// The overlay for `cells` at `cell_size` pixels per cell does not fit
    /// in an image buffer.
    ImageTooLarge { cells: Point, cell_size: u32 },
    /// Reading or writing an image file failed.
    Image(ImageError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::ZeroCellSize => write!(f, "cell size must be at least one pixel"),
            RenderError::ImageTooLarge { cells, cell_size } => write!(
                f,
                "a {}x{} cell overlay at {cell_size} pixels per cell is too large",
                cells.x, cells.y
            ),
            RenderError::Image(e) => write!(f, "image error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Image(e) => Some(e),
            RenderError::ZeroCellSize | RenderError::ImageTooLarge { .. } => None,
        }
    }
}

impl From<ImageError> for RenderError {
    fn from(e: ImageError) -> Self {
        RenderError::Image(e)
    }
}

/// Per-cell coverage of both grids.
pub fn coverage_grid(pair: &VisibilityPair) -> Grid<Coverage> {
    pair.can_hit
        .map(|p, &hit| Coverage::classify(hit, pair.be_seen.at(p).unwrap_or(false)))
}

/// Overlay colors, `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub visible: [u8; 4],
    pub visible_and_seen: [u8; 4],
    pub seen_only: [u8; 4],
    pub hidden: [u8; 4],
    /// Outline of the observer cell.
    pub observer: [u8; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            visible: [208, 22, 22, 128],
            visible_and_seen: [217, 107, 23, 128],
            seen_only: [226, 192, 24, 128],
            hidden: [0, 0, 0, 0],
            observer: [47, 0, 255, 153],
        }
    }
}

impl Palette {
    #[inline]
    pub fn color(&self, c: Coverage) -> [u8; 4] {
        match c {
            Coverage::Visible => self.visible,
            Coverage::VisibleAndSeen => self.visible_and_seen,
            Coverage::SeenOnly => self.seen_only,
            Coverage::Hidden => self.hidden,
        }
    }
}

/// Paints visibility grids as RGBA images, `cell_size` pixels per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayRenderer {
    cell_size: u32,
    palette: Palette,
}

impl OverlayRenderer {
    pub fn new(cell_size: u32) -> Result<Self, RenderError> {
        if cell_size == 0 {
            return Err(RenderError::ZeroCellSize);
        }
        Ok(Self {
            cell_size,
            palette: Palette::default(),
        })
    }

    /// Pixel size of the overlay for a grid of `size` cells, or `None` when
    /// the RGBA buffer would not be addressable.
    pub fn image_size(&self, size: Point) -> Option<(u32, u32)> {
        let w = (size.x.max(0) as u32).checked_mul(self.cell_size)?;
        let h = (size.y.max(0) as u32).checked_mul(self.cell_size)?;
        (w as usize).checked_mul(h as usize)?.checked_mul(4)?;
        Some((w, h))
    }

    /// Paint every cell with its coverage color and outline `observer`.
    pub fn render(
        &self,
        pair: &VisibilityPair,
        observer: Option<Point>,
    ) -> Result<RgbaImage, RenderError> {
        let cells = pair.size();
        let (w, h) = self.image_size(cells).ok_or(RenderError::ImageTooLarge {
            cells,
            cell_size: self.cell_size,
        })?;
        let mut img = RgbaImage::from_pixel(w, h, Rgba(self.palette.hidden));
        for (p, c) in coverage_grid(pair).iter() {
            if *c != Coverage::Hidden {
                self.fill_cell(&mut img, p, self.palette.color(*c));
            }
        }
        if let Some(o) = observer.filter(|&o| pair.can_hit.contains(o)) {
            self.stroke_cell(&mut img, o, self.palette.observer);
        }
        Ok(img)
    }

    fn cell_pixels(&self, p: Point) -> (u32, u32) {
        (p.x as u32 * self.cell_size, p.y as u32 * self.cell_size)
    }

    fn fill_cell(&self, img: &mut RgbaImage, p: Point, color: [u8; 4]) {
        let (x0, y0) = self.cell_pixels(p);
        for y in y0..y0 + self.cell_size {
            for x in x0..x0 + self.cell_size {
                img.put_pixel(x, y, Rgba(color));
            }
        }
    }

    fn stroke_cell(&self, img: &mut RgbaImage, p: Point, color: [u8; 4]) {
        let (x0, y0) = self.cell_pixels(p);
        let n = self.cell_size;
        let line = (n / 4).max(1);
        for dy in 0..n {
            for dx in 0..n {
                let edge = dx < line || dy < line || dx >= n - line || dy >= n - line;
                if edge {
                    img.put_pixel(x0 + dx, y0 + dy, Rgba(color));
                }
            }
        }
    }

    /// Scale `background` to the overlay size and blend the overlay over it.
    pub fn compose(&self, background: &DynamicImage, overlay: &RgbaImage) -> RgbaImage {
        let (w, h) = overlay.dimensions();
        let mut out = if background.width() == w && background.height() == h {
            background.to_rgba8()
        } else {
            log::debug!(
                "scaling background {}x{} to {w}x{h}",
                background.width(),
                background.height()
            );
            imageops::resize(background, w, h, FilterType::Triangle)
        };
        for (dst, src) in out.pixels_mut().zip(overlay.pixels()) {
            *dst = blend_over(*dst, *src);
        }
        out
    }
}

/// Source-over alpha compositing of one pixel.
fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Load a field picture to compose overlays onto.
pub fn load_background(path: impl AsRef<Path>) -> Result<DynamicImage, RenderError> {
    let path = path.as_ref();
    let img = image::open(path)?;
    log::info!("loaded background {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Write `img` as a PNG file.
pub fn save_png(img: &RgbaImage, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let path = path.as_ref();
    img.save_with_format(path, ImageFormat::Png)?;
    log::info!("wrote {}x{} overlay to {}", img.width(), img.height(), path.display());
    Ok(())
}
