use crate::geometry::{DPoint, Pos};
use crate::rect::Rect;

/// Sentinel parent index marking a canonical (root) arena entry.
pub const ROOT: i32 = -1;

/**
 * A level-set connected component. `p` locates the contour in the plane:
 * the grid point for a real sample, the saddle point of the bilinear patch
 * for a dual-cell contour. `parent` chains equivalent contours into their
 * union-find class.
 */
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Contour {
    pub parent: i32,
    pub p: DPoint,
    pub lvl: f32,
}

impl Default for Contour {
    fn default() -> Self {
        Self {
            parent: ROOT,
            p: DPoint::new(-1.0, -1.0),
            lvl: 0.0,
        }
    }
}

/**
 * A maximal ribbon of the interpolated surface sandwiched between two
 * contours of distinct levels. `mme` lists the monotone mesh elements the
 * ribbon passes through, each represented by the real coordinate of its
 * top-left corner, ordered as a polyline. An absorbed continuum
 * (`parent >= 0`) has released its `mme` storage.
 */
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Continuum {
    pub parent: i32,
    pub inf_ctr: i32,
    pub sup_ctr: i32,
    pub mme: Vec<DPoint>,
}

/**
 * Contours and continua of a bilinearly interpolated image.
 *
 * The contour arena has length `2·w·h`: the first `w·h` slots are the real
 * samples keyed by `y·w + x`, the upper half holds one dual-cell slot per
 * cell, addressed as `idx(x, y + h)` and used only when the cell's bilinear
 * patch has a true saddle. An unused dual slot keeps the negative-`x`
 * sentinel of `Contour::default`.
 *
 * `frame` is the final rectangle covering the whole grid, carrying the
 * outer chain codes after decomposition.
 */
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CC {
    pub contours: Vec<Contour>,
    pub continua: Vec<Continuum>,
    pub w: i32,
    pub h: i32,
    pub frame: Rect,
}

impl CC {
    /// Allocate both arenas for a `w × h` image and seed the real contours
    /// from the samples. The decomposition itself is driven by `CC::new`.
    pub(crate) fn with_samples(im: &[f32], w: usize, h: usize) -> Self {
        assert_eq!(im.len(), w * h, "sample count must match dimensions");
        let mut contours = vec![Contour::default(); 2 * w * h];
        for i in 0..h {
            for j in 0..w {
                let c = &mut contours[i * w + j];
                c.p = DPoint::new(j as f64, i as f64);
                c.lvl = im[i * w + j];
            }
        }
        Self {
            contours,
            continua: Vec::new(),
            w: w as i32,
            h: h as i32,
            frame: Rect::default(),
        }
    }

    pub fn idx(&self, x: i32, y: i32) -> i32 {
        y * self.w + x
    }

    pub fn idx_pos(&self, p: Pos) -> i32 {
        self.idx(i32::from(p.x), i32::from(p.y))
    }

    /// Find the canonical contour, re-parenting the entries on the lookup
    /// path directly to the root.
    pub fn root_contour(&mut self, i: i32) -> i32 {
        let j = self.contours[i as usize].parent;
        if j < 0 {
            i
        } else {
            let r = self.root_contour(j);
            self.contours[i as usize].parent = r;
            r
        }
    }

    pub fn root_contour_at(&mut self, p: Pos) -> i32 {
        let i = self.idx_pos(p);
        self.root_contour(i)
    }

    /// Find the canonical continuum, with path compression.
    pub fn root_continuum(&mut self, i: i32) -> i32 {
        let j = self.continua[i as usize].parent;
        if j < 0 {
            i
        } else {
            let r = self.root_continuum(j);
            self.continua[i as usize].parent = r;
            r
        }
    }

    /// Make the contour at `c2` share the canonical element of the one at
    /// `c1`. Only contours of equal level may be identified.
    pub fn merge_contours(&mut self, c1: Pos, c2: Pos) {
        assert_eq!(
            self.contours[self.idx_pos(c1) as usize].lvl,
            self.contours[self.idx_pos(c2) as usize].lvl,
            "merged contours must have equal levels"
        );
        let i1 = self.root_contour_at(c1);
        let i2 = self.root_contour_at(c2);
        if i1 != i2 {
            self.contours[i2 as usize].parent = i1;
        }
    }

    /// Create the virtual sample (saddle point) in the dual cell whose
    /// top-left corner is `p`. `lvl` holds the four corner levels clockwise
    /// from top-left. Returns the dual-grid position of the new contour.
    pub fn create_saddle(&mut self, p: Pos, lvl: [f32; 4]) -> Pos {
        let dual = Pos::new(p.x, p.y + self.h as i16);
        let i = self.idx_pos(dual) as usize;
        let num = lvl[0] * lvl[2] - lvl[1] * lvl[3];
        let denom = (lvl[0] + lvl[2]) - (lvl[1] + lvl[3]);
        let c = &mut self.contours[i];
        c.p = DPoint::new(
            f64::from(p.x) + f64::from((lvl[0] - lvl[1]) / denom),
            f64::from(p.y) + f64::from((lvl[0] - lvl[3]) / denom),
        );
        c.lvl = num / denom;
        dual
    }

    /// Create a continuum bounded by the contours at `inf` and `sup`,
    /// reordering the endpoints by level, with a single starting MME at
    /// `p`. Returns the index of the new continuum.
    pub fn create_continuum(&mut self, inf: Pos, sup: Pos, p: DPoint) -> i32 {
        let i = self.continua.len() as i32;
        let mut j = self.idx_pos(inf);
        let mut k = self.idx_pos(sup);
        if self.contours[j as usize].lvl > self.contours[k as usize].lvl {
            std::mem::swap(&mut j, &mut k);
        }
        self.continua.push(Continuum {
            parent: ROOT,
            inf_ctr: j,
            sup_ctr: k,
            mme: vec![p],
        });
        i
    }

    /// Bottom-right corner of the MME whose top-left corner is `p`. For a
    /// regular cell this is the cell's own bottom-right corner; inside a
    /// saddle cell the element stops at the saddle point on the axes where
    /// `p` starts on it.
    pub fn mme_br(&self, p: DPoint) -> DPoint {
        let cx = p.x.floor() as i32;
        let cy = p.y.floor() as i32;
        let mut q = self.contours[self.idx(cx, cy + self.h) as usize].p;
        if q.x < 0.0 || p.x == q.x {
            q.x = f64::from(cx + 1);
        }
        if q.y < 0.0 || p.y == q.y {
            q.y = f64::from(cy + 1);
        }
        q
    }

    /// Whether the MME whose top-left corner is `p` lies against the unit
    /// edge whose top (or left) corner is `sep`, with `o` the edge
    /// orientation (0 = vertical edge, 1 = horizontal). A saddle-cell
    /// element may stop short of its cell boundary, so the far extent goes
    /// through `mme_br`.
    fn against_edge(&self, p: DPoint, sep: Pos, o: usize) -> bool {
        if p[1 - o].floor() != f64::from(sep[1 - o]) {
            return false;
        }
        if p[o] == f64::from(sep[o]) {
            return true;
        }
        p[o].floor() + 1.0 == f64::from(sep[o]) && self.mme_br(p)[o] == f64::from(sep[o])
    }

    /// Concatenate the MME polyline of continuum `i2` onto the one of `i1`,
    /// when the two meet along the unit edge at `sep` with orientation `o`.
    /// Either polyline is reversed first if its free end at the shared edge
    /// would otherwise stay on the boundary of the merged sequence. Returns
    /// the junction: the index in `i1`'s list of the first appended
    /// element.
    pub fn merge_mme(&mut self, i1: i32, i2: i32, sep: Pos, o: usize) -> usize {
        assert!(
            !self.continua[i1 as usize].mme.is_empty()
                && !self.continua[i2 as usize].mme.is_empty(),
            "cannot merge released MME lists"
        );
        let front = self.continua[i1 as usize].mme[0];
        if self.against_edge(front, sep, o) {
            self.continua[i1 as usize].mme.reverse();
        }
        let back = *self.continua[i2 as usize].mme.last().unwrap();
        if self.against_edge(back, sep, o) {
            self.continua[i2 as usize].mme.reverse();
        }
        let v2 = std::mem::take(&mut self.continua[i2 as usize].mme);
        let v1 = &mut self.continua[i1 as usize].mme;
        let junction = v1.len();
        v1.extend_from_slice(&v2);
        self.continua[i2 as usize].mme = v2;
        junction
    }

    /// Number of dual-cell slots holding a saddle contour.
    pub fn saddle_count(&self) -> usize {
        let n = (self.w * self.h) as usize;
        self.contours[n..].iter().filter(|c| c.p.x >= 0.0).count()
    }

    /// Number of continua that have not been absorbed into another one.
    pub fn live_continua(&self) -> usize {
        self.continua.iter().filter(|c| c.parent < 0).count()
    }

    /// Number of contour equivalence classes, counting used slots only.
    pub fn contour_classes(&self) -> usize {
        let n = (self.w * self.h) as usize;
        self.contours
            .iter()
            .enumerate()
            .filter(|(i, c)| c.parent < 0 && (*i < n || c.p.x >= 0.0))
            .count()
    }
}
