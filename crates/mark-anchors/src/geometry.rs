//! Glyph bounding boxes recomputed from outline data.

use std::cell::OnceCell;

use kurbo::{Affine, Point};
use log::debug;
use read_fonts::{
    FontRef, ReadError, TableProvider,
    tables::{
        glyf::{Anchor, CompositeGlyphFlags, Glyf, Glyph},
        hmtx::Hmtx,
        loca::Loca,
    },
    types::GlyphId,
};

use crate::Result;

/// Composites nested deeper than this are treated as unresolvable.
const MAX_COMPONENT_DEPTH: usize = 64;

/// Glyph bounds in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Bounds {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self { x_min, y_min, x_max, y_max }
    }

    /// Horizontal midpoint, rounded toward negative infinity.
    pub fn x_mid(&self) -> i32 {
        (self.x_min + self.x_max).div_euclid(2)
    }

    /// Vertical midpoint, rounded toward negative infinity.
    pub fn y_mid(&self) -> i32 {
        (self.y_min + self.y_max).div_euclid(2)
    }

    pub fn height(&self) -> i32 {
        (self.y_max - self.y_min).max(0)
    }

    fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut x_min, mut y_min, mut x_max, mut y_max) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x_min = x_min.min(p.x);
            y_min = y_min.min(p.y);
            x_max = x_max.max(p.x);
            y_max = y_max.max(p.y);
        }
        Some(Self::new(ot_round(x_min), ot_round(y_min), ot_round(x_max), ot_round(y_max)))
    }
}

/// Round half up, the way font compilers round coordinates.
fn ot_round(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Source of per-glyph geometry for anchor computations.
pub trait GlyphGeometry {
    /// Recomputed bounds, or `None` if the glyph has no outline.
    fn bounds(&self, gid: GlyphId) -> Option<Bounds>;

    /// Horizontal advance width.
    fn advance(&self, gid: GlyphId) -> Option<u16>;

    /// Whether the glyph exists in the outline store (it may still be empty).
    fn contains(&self, gid: GlyphId) -> bool;
}

/// Lazily computed, cached `glyf` geometry of one font.
pub struct FontGeometry<'a> {
    glyf: Glyf<'a>,
    loca: Loca<'a>,
    hmtx: Option<Hmtx<'a>>,
    cache: Vec<OnceCell<Option<Bounds>>>,
}

impl<'a> FontGeometry<'a> {
    /// Returns `Ok(None)` when the font has no `glyf` outlines.
    pub fn new(font: &FontRef<'a>) -> Result<Option<Self>> {
        let glyf = match font.glyf() {
            Ok(glyf) => glyf,
            Err(ReadError::TableIsMissing(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let loca = font.loca(None)?;
        let hmtx = font.hmtx().ok();
        let num_glyphs = font.maxp()?.num_glyphs() as usize;

        Ok(Some(Self { glyf, loca, hmtx, cache: (0..num_glyphs).map(|_| OnceCell::new()).collect() }))
    }

    pub fn num_glyphs(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, gid: GlyphId) -> Option<Bounds> {
        let points = self.outline_points(gid, 0)?;
        Bounds::from_points(&points)
    }

    /// All outline points of a glyph with components flattened.
    ///
    /// `Some(empty)` for empty glyphs, `None` if the outline cannot be resolved.
    fn outline_points(&self, gid: GlyphId, depth: usize) -> Option<Vec<Point>> {
        if depth > MAX_COMPONENT_DEPTH {
            debug!("component depth exceeded at glyph {}", gid.to_u32());
            return None;
        }
        let glyph = match self.loca.get_glyf(gid, &self.glyf) {
            Ok(Some(glyph)) => glyph,
            Ok(None) => return Some(Vec::new()),
            Err(e) => {
                debug!("unreadable outline for glyph {}: {e}", gid.to_u32());
                return None;
            }
        };

        match glyph {
            Glyph::Simple(simple) => Some(
                simple.points().map(|p| Point::new(p.x as f64, p.y as f64)).collect(),
            ),
            Glyph::Composite(composite) => {
                let mut points: Vec<Point> = Vec::new();
                for component in composite.components() {
                    let child = self.outline_points(GlyphId::from(component.glyph), depth + 1)?;
                    let t = component.transform;
                    let linear = Affine::new([
                        t.xx.to_f32() as f64,
                        t.yx.to_f32() as f64,
                        t.xy.to_f32() as f64,
                        t.yy.to_f32() as f64,
                        0.0,
                        0.0,
                    ]);
                    let mut child: Vec<Point> = child.into_iter().map(|p| linear * p).collect();

                    let offset = match component.anchor {
                        Anchor::Offset { x, y } => {
                            let offset = Point::new(x as f64, y as f64);
                            let scaled = component
                                .flags
                                .contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET)
                                && !component
                                    .flags
                                    .contains(CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET);
                            if scaled { (linear * offset).to_vec2() } else { offset.to_vec2() }
                        }
                        Anchor::Point { base, component: matched } => {
                            let base = points.get(base as usize)?;
                            let matched = child.get(matched as usize)?;
                            *base - *matched
                        }
                    };
                    child.iter_mut().for_each(|p| *p += offset);
                    points.extend(child);
                }
                Some(points)
            }
        }
    }
}

impl GlyphGeometry for FontGeometry<'_> {
    fn bounds(&self, gid: GlyphId) -> Option<Bounds> {
        let cell = self.cache.get(gid.to_u32() as usize)?;
        *cell.get_or_init(|| self.compute(gid))
    }

    fn advance(&self, gid: GlyphId) -> Option<u16> {
        self.hmtx.as_ref()?.advance(gid)
    }

    fn contains(&self, gid: GlyphId) -> bool {
        (gid.to_u32() as usize) < self.cache.len()
    }
}

/// Convert a computed coordinate to an anchor coordinate.
pub(crate) fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
