use crate::geometry::Pos;

/// Side indices of a rectangle, clockwise from the top.
pub const TOP: usize = 0;
pub const RIGHT: usize = 1;
pub const BOTTOM: usize = 2;
pub const LEFT: usize = 3;

/**
 * One chain-code word: an odd-length sequence of arena indices alternating
 * `contour, continuum, contour, …, contour`, enumerating in ascending level
 * the continua crossing one unit edge, separated by their bounding
 * contours. A single-element word records a unit edge spanned by one
 * contour.
 */
pub type Word = Vec<i32>;

/**
 * An axis-aligned region of the grid covered during divide and conquer.
 * `tl` is inclusive, `br` exclusive. Each side carries one chain-code word
 * per unit edge: side 0 runs left→right along `y = tl.y`, side 1 top→bottom
 * along `x = br.x`, side 2 left→right along `y = br.y`, side 3 top→bottom
 * along `x = tl.x`.
 *
 * Rectangles are short-lived: created per 1×1 cell, consumed pairwise by
 * merges. The merged rectangle absorbs the outer sides of its two parents;
 * the inner sides are dropped once their words have been propagated.
 */
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub tl: Pos,
    pub br: Pos,
    pub chain_code: [Vec<Word>; 4],
}

impl Rect {
    pub fn new(tl: Pos, br: Pos) -> Self {
        Self {
            tl,
            br,
            chain_code: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
        }
    }

    /// Extent along the given axis, in unit edges.
    pub fn extent(&self, axis: usize) -> usize {
        (self.br[axis] - self.tl[axis]) as usize
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(Pos::new(0, 0), Pos::new(0, 0))
    }
}

#[cfg(test)]
mod test {
    use super::Rect;
    use crate::geometry::Pos;

    #[test]
    fn extent_counts_unit_edges() {
        let r = Rect::new(Pos::new(1, 2), Pos::new(4, 3));
        assert_eq!(r.extent(0), 3);
        assert_eq!(r.extent(1), 1);
    }
}
