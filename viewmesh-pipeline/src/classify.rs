//! Occlusion and validity classification of 2x2 pixel squares
//!
//! Every square of four neighboring pixels can contribute up to two
//! triangles to a camera's mesh. A triangle is only emitted when the
//! square has at least three corners not masked off as redundant, and the
//! triangle itself is not stretched across a depth discontinuity (the
//! elongation test). Squares on genuine, non-redundant depth edges mark
//! their triangles as protected from the aggressive simplification pass.

/// Depth values at the four corners of a square, top-left first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareDepths {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl SquareDepths {
    pub fn new(top_left: f32, top_right: f32, bottom_left: f32, bottom_right: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }
}

/// Which corners of a square survive the redundancy mask.
///
/// Kept as four named booleans internally; the packed byte encoding
/// (weights 1, 2, 4, 8 for top-left, top-right, bottom-left,
/// bottom-right) exists only at the conversion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CornerValidity {
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
}

impl CornerValidity {
    /// Derive validity from the four corner mask bytes (0 = not redundant).
    pub fn from_mask_bytes(top_left: u8, top_right: u8, bottom_left: u8, bottom_right: u8) -> Self {
        Self {
            top_left: top_left == 0,
            top_right: top_right == 0,
            bottom_left: bottom_left == 0,
            bottom_right: bottom_right == 0,
        }
    }

    /// Unpack the external weight-1/2/4/8 byte encoding.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            top_left: bits & 1 != 0,
            top_right: bits & 2 != 0,
            bottom_left: bits & 4 != 0,
            bottom_right: bits & 8 != 0,
        }
    }

    /// Pack into the external weight-1/2/4/8 byte encoding.
    pub fn bits(&self) -> u8 {
        (self.top_left as u8)
            | (self.top_right as u8) << 1
            | (self.bottom_left as u8) << 2
            | (self.bottom_right as u8) << 3
    }

    /// Number of corners that survive the mask.
    pub fn valid_count(&self) -> u32 {
        self.top_left as u32
            + self.top_right as u32
            + self.bottom_left as u32
            + self.bottom_right as u32
    }

    /// The unique triangle covering exactly the three valid corners.
    fn single_triangle(&self) -> Option<CornerTriangle> {
        match (
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ) {
            (true, true, true, false) => Some(CornerTriangle::TopLeft),
            (true, true, false, true) => Some(CornerTriangle::TopRight),
            (true, false, true, true) => Some(CornerTriangle::BottomLeft),
            (false, true, true, true) => Some(CornerTriangle::BottomRight),
            _ => None,
        }
    }
}

/// The four triangles formable from three corners of a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerTriangle {
    /// Corners {top-left, top-right, bottom-left}
    TopLeft,
    /// Corners {top-left, top-right, bottom-right}
    TopRight,
    /// Corners {top-left, bottom-left, bottom-right}
    BottomLeft,
    /// Corners {top-right, bottom-left, bottom-right}
    BottomRight,
}

impl CornerTriangle {
    /// Fallback evaluation order for full squares whose diagonal split
    /// fails elongation; the first passing triangle wins.
    pub const FALLBACK_ORDER: [CornerTriangle; 4] = [
        CornerTriangle::TopLeft,
        CornerTriangle::TopRight,
        CornerTriangle::BottomLeft,
        CornerTriangle::BottomRight,
    ];

    /// Vertex index offsets relative to the square's top-left pixel, in
    /// the emitted winding order.
    pub fn index_offsets(self, width: usize) -> [usize; 3] {
        match self {
            CornerTriangle::TopLeft => [0, width, 1],
            CornerTriangle::TopRight => [0, width + 1, 1],
            CornerTriangle::BottomLeft => [0, width, width + 1],
            CornerTriangle::BottomRight => [1, width, width + 1],
        }
    }

    fn corner_depths(self, depths: &SquareDepths) -> [f32; 3] {
        match self {
            CornerTriangle::TopLeft => [depths.top_left, depths.top_right, depths.bottom_left],
            CornerTriangle::TopRight => [depths.top_left, depths.top_right, depths.bottom_right],
            CornerTriangle::BottomLeft => {
                [depths.top_left, depths.bottom_left, depths.bottom_right]
            }
            CornerTriangle::BottomRight => {
                [depths.top_right, depths.bottom_left, depths.bottom_right]
            }
        }
    }

    /// Elongation test: all pairwise corner depth differences stay under
    /// the threshold. A failing triangle spans a depth discontinuity and
    /// is never emitted.
    pub fn is_compact(self, depths: &SquareDepths, threshold: f32) -> bool {
        let [a, b, c] = self.corner_depths(depths);
        (a - b).abs() < threshold && (a - c).abs() < threshold && (b - c).abs() < threshold
    }
}

/// Triangles a square contributes to the candidate mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareTriangles {
    /// Nothing survives masking or elongation.
    None,
    /// A single corner triangle.
    Single(CornerTriangle),
    /// The well-behaved full square: top-left plus bottom-right split.
    SplitQuad,
}

impl SquareTriangles {
    /// The emitted triangles, in emission order.
    pub fn triangles(self) -> impl Iterator<Item = CornerTriangle> {
        let pair: [Option<CornerTriangle>; 2] = match self {
            SquareTriangles::None => [None, None],
            SquareTriangles::Single(t) => [Some(t), None],
            SquareTriangles::SplitQuad => {
                [Some(CornerTriangle::TopLeft), Some(CornerTriangle::BottomRight)]
            }
        };
        pair.into_iter().flatten()
    }

    pub fn count(self) -> usize {
        match self {
            SquareTriangles::None => 0,
            SquareTriangles::Single(_) => 1,
            SquareTriangles::SplitQuad => 2,
        }
    }
}

/// Decide which triangles a square emits.
///
/// Full squares prefer the diagonal split; if either half is stretched,
/// the four corner triangles are tested in [`CornerTriangle::FALLBACK_ORDER`]
/// and the first compact one is emitted alone. Squares with exactly three
/// valid corners emit their unique triangle when it is compact. Anything
/// else emits nothing.
pub fn classify_square(
    depths: &SquareDepths,
    validity: CornerValidity,
    threshold: f32,
) -> SquareTriangles {
    match validity.valid_count() {
        4 => {
            if CornerTriangle::TopLeft.is_compact(depths, threshold)
                && CornerTriangle::BottomRight.is_compact(depths, threshold)
            {
                return SquareTriangles::SplitQuad;
            }
            CornerTriangle::FALLBACK_ORDER
                .into_iter()
                .find(|t| t.is_compact(depths, threshold))
                .map(SquareTriangles::Single)
                .unwrap_or(SquareTriangles::None)
        }
        3 => {
            // valid_count 3 always maps to a unique triangle
            let triangle = match validity.single_triangle() {
                Some(t) => t,
                None => return SquareTriangles::None,
            };
            if triangle.is_compact(depths, threshold) {
                SquareTriangles::Single(triangle)
            } else {
                SquareTriangles::None
            }
        }
        _ => SquareTriangles::None,
    }
}

/// Whether a square's triangles are exempt from the aggressive
/// simplification pass: its top-left pixel lies on a depth edge AND is
/// not redundant.
pub fn square_protected(edge_byte: u8, mask_byte: u8) -> bool {
    edge_byte > 0 && mask_byte == 0
}
