use log::debug;

use crate::cell::unit_rect;
use crate::geometry::{DPoint, Pos};
use crate::rect::{Rect, Word, BOTTOM, LEFT, RIGHT, TOP};
use crate::topology::CC;

impl CC {
    /**
     * Decompose a `w × h` image into its contours and continua. Samples
     * are row-major values at the integer lattice points; between four
     * adjacent samples the image is bilinear.
     *
     * Every 2×2 block becomes a 1×1 rectangle, and adjacent rectangles are
     * merged pairwise along their shared edge, alternating horizontal and
     * vertical passes so rectangles stay roughly square, until a single
     * rectangle covers the grid. That rectangle is kept as `frame`.
     *
     * Images with fewer than two rows or columns have no cells: the result
     * carries the real contours only and an empty frame.
     */
    pub fn new(im: &[f32], w: usize, h: usize) -> Self {
        let mut cc = CC::with_samples(im, w, h);
        if w < 2 || h < 2 {
            return cc;
        }
        let mut cols = w - 1;
        let mut rows = h - 1;
        let mut rects = Vec::with_capacity(cols * rows);
        for i in 0..rows {
            for j in 0..cols {
                let idx = i * w + j;
                let lvl = [im[idx], im[idx + 1], im[idx + 1 + w], im[idx + w]];
                rects.push(unit_rect(&mut cc, Pos::new(j as i16, i as i16), lvl));
            }
        }
        debug!("{}x{} image: {} unit rectangles", w, h, rects.len());
        while cols > 1 || rows > 1 {
            if cols > 1 {
                rects = cc.horizontal_pass(rects, rows, cols);
                cols = (cols + 1) / 2;
                debug!("horizontal pass: {} rectangles left", rects.len());
            }
            if rows > 1 {
                rects = cc.vertical_pass(rects, rows, cols);
                rows = (rows + 1) / 2;
                debug!("vertical pass: {} rectangles left", rects.len());
            }
        }
        assert_eq!(rects.len(), 1, "decomposition must end in a single rectangle");
        cc.frame = rects.pop().unwrap();
        cc
    }

    /// Merge horizontally adjacent rectangle pairs on every row. A row
    /// with an odd rectangle count carries its last rectangle unchanged.
    fn horizontal_pass(&mut self, rects: Vec<Rect>, rows: usize, cols: usize) -> Vec<Rect> {
        let mut out = Vec::with_capacity(rows * ((cols + 1) / 2));
        let mut it = rects.into_iter();
        for _ in 0..rows {
            let row: Vec<Rect> = it.by_ref().take(cols).collect();
            let mut pair = row.into_iter();
            while let Some(r1) = pair.next() {
                match pair.next() {
                    Some(r2) => out.push(self.merge_rects(r1, r2)),
                    None => out.push(r1),
                }
            }
        }
        out
    }

    /// Merge vertically adjacent rectangle pairs column-wise, keeping the
    /// row-major storage order. An odd final row carries over unchanged.
    fn vertical_pass(&mut self, rects: Vec<Rect>, rows: usize, cols: usize) -> Vec<Rect> {
        let mut out = Vec::with_capacity(((rows + 1) / 2) * cols);
        let mut it = rects.into_iter();
        let mut remaining = rows;
        while remaining >= 2 {
            let upper: Vec<Rect> = it.by_ref().take(cols).collect();
            let lower: Vec<Rect> = it.by_ref().take(cols).collect();
            for (r1, r2) in upper.into_iter().zip(lower.into_iter()) {
                out.push(self.merge_rects(r1, r2));
            }
            remaining -= 2;
        }
        out.extend(it);
        out
    }

    /**
     * Merge two adjacent rectangles into one. The relative orientation is
     * read off the corners: `o = 0` when `r2` sits right of `r1`, `o = 1`
     * when it sits below. Chain codes along the shared edge are propagated
     * unit edge by unit edge; the merged rectangle then takes the two
     * outer perpendicular sides as they are and concatenates the two sides
     * parallel to the shared edge. The inner sides are consumed.
     */
    fn merge_rects(&mut self, mut r1: Rect, mut r2: Rect) -> Rect {
        let o = if r2.tl == Pos::new(r1.br.x, r1.tl.y) {
            0
        } else {
            assert_eq!(
                r2.tl,
                Pos::new(r1.tl.x, r1.br.y),
                "merged rectangles must share a corner"
            );
            1
        };
        assert_eq!(r1.br[1 - o], r2.br[1 - o], "merged rectangles must align");

        let n = r1.chain_code[RIGHT + o].len();
        assert_eq!(
            n,
            r2.chain_code[(LEFT + o) % 4].len(),
            "shared sides must have the same extent"
        );
        let mut sep = r2.tl;
        for k in 0..n {
            self.propagate(&mut r1, &mut r2, sep, o, k);
            sep[1 - o] += 1;
        }

        let mut r = Rect::new(r1.tl, r2.br);
        for &s in [o, o + 2].iter() {
            r.chain_code[s] = std::mem::take(&mut r1.chain_code[s]);
            let mut tail = std::mem::take(&mut r2.chain_code[s]);
            r.chain_code[s].append(&mut tail);
        }
        r.chain_code[(o + 3) % 4] = std::mem::take(&mut r1.chain_code[(o + 3) % 4]);
        r.chain_code[o + 1] = std::mem::take(&mut r2.chain_code[o + 1]);
        r
    }

    /**
     * Reconcile the chain codes of one shared unit edge. `sep` is the top
     * (or left) corner of the edge and `o` its orientation; the words are
     * taken from the facing inner sides of `r1` and `r2` at index `k`.
     *
     * Both words enumerate the same geometric edge, so they start and end
     * on a common corner contour. The bands in between are walked jointly
     * by ascending level: equal levels identify the two contours (and, if
     * distinct, merge the two continua, releasing the absorbed MME
     * storage); a band reaching past the other side's level is cut there
     * and the cut is propagated through the chain codes.
     *
     * The walk reads a snapshot of the two words: splits may insert into
     * chain codes behind the walk, never into a band it has yet to read on
     * this edge.
     */
    fn propagate(&mut self, r1: &mut Rect, r2: &mut Rect, sep: Pos, o: usize, k: usize) {
        let w1 = r1.chain_code[RIGHT + o][k].clone();
        let w2 = r2.chain_code[(LEFT + o) % 4][k].clone();
        assert!(!w1.is_empty() && !w2.is_empty(), "empty chain-code word");
        assert!(
            w1.len() % 2 == 1 && w2.len() % 2 == 1,
            "chain-code words must have odd length"
        );
        assert_eq!(
            self.root_contour(w1[0]),
            self.root_contour(w2[0]),
            "shared edge must start on a common contour"
        );
        assert_eq!(
            self.root_contour(w1[w1.len() - 1]),
            self.root_contour(w2[w2.len() - 1]),
            "shared edge must end on a common contour"
        );
        if w1.len() == 1 || w2.len() == 1 {
            // A single contour spans the edge; nothing crosses it.
            assert_eq!(w1.len(), w2.len(), "edge cannot be both flat and crossed");
            return;
        }

        let mut i1 = 1;
        let mut i2 = 1;
        let mut t1 = self.next_band(&w1, &mut i1);
        let mut t2 = self.next_band(&w2, &mut i2);
        while let (Some((ic1, j1, l1)), Some((ic2, j2, l2))) = (t1, t2) {
            if l1 == l2 {
                if j1 != j2 {
                    self.contours[j2 as usize].parent = j1;
                }
                if ic1 != ic2 {
                    self.merge_mme(ic1, ic2, sep, o);
                    self.continua[ic2 as usize].parent = ic1;
                    self.continua[ic2 as usize].mme = Vec::new();
                }
                t1 = self.next_band(&w1, &mut i1);
                t2 = self.next_band(&w2, &mut i2);
            } else if l1 < l2 {
                let junction = self.merge_mme(ic1, ic2, sep, o);
                self.split_continuum(r1, r2, ic2, ic1, j1, junction, sep, o);
                t1 = self.next_band(&w1, &mut i1);
            } else {
                let junction = self.merge_mme(ic2, ic1, sep, o);
                self.split_continuum(r1, r2, ic1, ic2, j2, junction, sep, o);
                t2 = self.next_band(&w2, &mut i2);
            }
        }
        // Both words close on the same top contour, so neither side can
        // run out while the other still holds a band.
        assert!(
            t1.is_none() && t2.is_none(),
            "bands on a shared edge must pair up"
        );
    }

    /// Read the next `(continuum, upper contour, level)` triple of a
    /// chain-code word, canonicalising both indices.
    fn next_band(&mut self, word: &Word, i: &mut usize) -> Option<(i32, i32, f32)> {
        if *i >= word.len() {
            return None;
        }
        let ic = self.root_continuum(word[*i]);
        let j = self.root_contour(word[*i + 1]);
        *i += 2;
        Some((ic, j, self.contours[j as usize].lvl))
    }

    /**
     * Cut continuum `i_split` by continuum `i_ctn`, whose upper contour
     * `i_ctr` becomes the new lower bound of the remainder. `junction`
     * indexes the first element of the split continuum's polyline inside
     * the freshly merged MME list of `i_ctn`, oriented away from the cut.
     *
     * The cut has to surface in the chain codes everywhere the split
     * continuum runs past it: the walk follows the polyline outward, and
     * each time it crosses the separation line it records the pair into
     * the crossed unit edge's word on the inner side of the rectangle it
     * leaves, toggling sides. The polyline's last element then exits
     * through the frame; its edge is found by probing top, left, right and
     * bottom in turn, skipping the side the walk came in through.
     */
    fn split_continuum(
        &mut self,
        r1: &mut Rect,
        r2: &mut Rect,
        i_split: i32,
        i_ctn: i32,
        i_ctr: i32,
        junction: usize,
        sep: Pos,
        o: usize,
    ) {
        self.continua[i_split as usize].inf_ctr = i_ctr;
        let tail: Vec<DPoint> = self.continua[i_ctn as usize].mme[junction..].to_vec();
        assert!(!tail.is_empty(), "split continuum has no MME past the cut");

        let line = i32::from(sep[o]);
        let cell = |p: DPoint, axis: usize| p[axis].floor() as i32;
        let mut low = cell(tail[0], o) < line;
        for t in 0..tail.len() - 1 {
            if (cell(tail[t], o) < line) != (cell(tail[t + 1], o) < line) {
                let k = (cell(tail[t], 1 - o) - i32::from(r1.tl[1 - o])) as usize;
                let (rect, side) = if low {
                    (&mut *r1, RIGHT + o)
                } else {
                    (&mut *r2, (LEFT + o) % 4)
                };
                let word = &mut rect.chain_code[side][k];
                assert!(
                    self.insert_cut(word, i_split, i_ctn, i_ctr),
                    "crossed edge must list the split continuum"
                );
                low = !low;
            }
        }

        let p = tail[tail.len() - 1];
        let (rect, incoming) = if low {
            (r1, RIGHT + o)
        } else {
            (r2, (LEFT + o) % 4)
        };
        if incoming != TOP && p.y == f64::from(rect.tl.y) {
            let k = (p.x.floor() as i32 - i32::from(rect.tl.x)) as usize;
            let word = &mut rect.chain_code[TOP][k];
            if self.insert_cut(word, i_split, i_ctn, i_ctr) {
                return;
            }
        }
        if incoming != LEFT && p.x == f64::from(rect.tl.x) {
            let k = (p.y.floor() as i32 - i32::from(rect.tl.y)) as usize;
            let word = &mut rect.chain_code[LEFT][k];
            if self.insert_cut(word, i_split, i_ctn, i_ctr) {
                return;
            }
        }
        let q = self.mme_br(p);
        if incoming != RIGHT && q.x == f64::from(rect.br.x) {
            let k = (p.y.floor() as i32 - i32::from(rect.tl.y)) as usize;
            let word = &mut rect.chain_code[RIGHT][k];
            if self.insert_cut(word, i_split, i_ctn, i_ctr) {
                return;
            }
        }
        if incoming != BOTTOM && q.y == f64::from(rect.br.y) {
            let k = (p.x.floor() as i32 - i32::from(rect.tl.x)) as usize;
            let word = &mut rect.chain_code[BOTTOM][k];
            if self.insert_cut(word, i_split, i_ctn, i_ctr) {
                return;
            }
        }
        panic!("split continuum does not exit on the rectangle frame");
    }

    /// Find continuum `i_split` inside `word` (present at most once) and
    /// insert `i_ctn` with its bounding contour `i_ctr` immediately before
    /// it, preserving the alternation. Continuum tokens are canonicalised
    /// before the comparison. Returns whether the word was changed.
    fn insert_cut(&mut self, word: &mut Word, i_split: i32, i_ctn: i32, i_ctr: i32) -> bool {
        let mut t = 1;
        while t < word.len() {
            if self.root_continuum(word[t]) == i_split {
                word.insert(t, i_ctr);
                word.insert(t, i_ctn);
                return true;
            }
            t += 2;
        }
        false
    }
}

#[cfg(test)]
mod test {
    use crate::geometry::{DPoint, Pos};
    use crate::rect::{BOTTOM, LEFT, RIGHT, TOP};
    use crate::topology::CC;

    /// Structural invariants that must hold for any fully built
    /// decomposition.
    fn validate(cc: &mut CC) {
        for i in 0..cc.continua.len() {
            let parent = cc.continua[i].parent;
            let empty = cc.continua[i].mme.is_empty();
            if parent < 0 {
                assert!(!empty, "live continuum {} has no MME", i);
                let inf = cc.continua[i].inf_ctr;
                let sup = cc.continua[i].sup_ctr;
                let ri = cc.root_contour(inf);
                let rs = cc.root_contour(sup);
                assert!(
                    cc.contours[ri as usize].lvl <= cc.contours[rs as usize].lvl,
                    "continuum {} has inverted bounds",
                    i
                );
            } else {
                assert!(empty, "absorbed continuum {} kept its MME", i);
            }
        }
        for i in 0..cc.contours.len() {
            let mut j = i as i32;
            let mut steps = 0;
            while cc.contours[j as usize].parent >= 0 {
                j = cc.contours[j as usize].parent;
                steps += 1;
                assert!(steps <= cc.contours.len(), "contour parent cycle at {}", i);
            }
        }
        for i in 0..cc.continua.len() {
            let mut j = i as i32;
            let mut steps = 0;
            while cc.continua[j as usize].parent >= 0 {
                j = cc.continua[j as usize].parent;
                steps += 1;
                assert!(steps <= cc.continua.len(), "continuum parent cycle at {}", i);
            }
        }
        let frame = cc.frame.clone();
        assert_eq!(frame.chain_code[TOP].len(), frame.extent(0));
        assert_eq!(frame.chain_code[BOTTOM].len(), frame.extent(0));
        assert_eq!(frame.chain_code[LEFT].len(), frame.extent(1));
        assert_eq!(frame.chain_code[RIGHT].len(), frame.extent(1));
        for side in 0..4 {
            for word in &frame.chain_code[side] {
                assert_eq!(word.len() % 2, 1, "chain-code word of even length");
                let mut last = f32::NEG_INFINITY;
                for (t, &tok) in word.iter().enumerate() {
                    if t % 2 == 0 {
                        let r = cc.root_contour(tok);
                        let lvl = cc.contours[r as usize].lvl;
                        assert!(lvl > last, "contour levels must ascend strictly");
                        last = lvl;
                    } else {
                        let r = cc.root_continuum(tok);
                        assert!(cc.continua[r as usize].parent < 0);
                        assert!(!cc.continua[r as usize].mme.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn insertion_goes_before_the_split_continuum() {
        let mut cc = CC::with_samples(&[0.0, 1.0, 2.0, 3.0], 2, 2);
        let a = cc.create_continuum(Pos::new(0, 0), Pos::new(1, 0), DPoint::new(0.0, 0.0));
        let b = cc.create_continuum(Pos::new(1, 0), Pos::new(0, 1), DPoint::new(0.0, 0.0));
        let c = cc.create_continuum(Pos::new(0, 1), Pos::new(1, 1), DPoint::new(0.0, 0.0));
        let mut word = vec![0, a, 1, c, 3];
        assert!(cc.insert_cut(&mut word, c, b, 2));
        assert_eq!(word, vec![0, a, 1, b, 2, c, 3]);

        let d = cc.create_continuum(Pos::new(0, 0), Pos::new(1, 1), DPoint::new(0.0, 0.0));
        assert!(!cc.insert_cut(&mut word, d, b, 2));
    }

    #[test]
    fn insertion_compares_canonical_continua() {
        let mut cc = CC::with_samples(&[0.0, 1.0, 2.0, 3.0], 2, 2);
        let a = cc.create_continuum(Pos::new(0, 0), Pos::new(1, 0), DPoint::new(0.0, 0.0));
        let b = cc.create_continuum(Pos::new(0, 0), Pos::new(1, 0), DPoint::new(0.0, 0.0));
        let c = cc.create_continuum(Pos::new(1, 0), Pos::new(0, 1), DPoint::new(0.0, 0.0));
        cc.continua[b as usize].parent = a;
        let mut word = vec![0, b, 1];
        assert!(cc.insert_cut(&mut word, a, c, 2));
        assert_eq!(word, vec![0, c, 2, b, 1]);
    }

    #[test]
    fn horizontal_merge_of_a_ramp() {
        // Two cells side by side; the shared edge is flat so propagation
        // leaves the continua of the two halves separate.
        let mut cc = CC::new(&[0.0, 1.0, 2.0, 0.0, 1.0, 2.0], 3, 2);
        assert_eq!(cc.live_continua(), 2);
        assert_eq!(cc.saddle_count(), 0);
        assert_eq!(cc.contour_classes(), 3);
        assert_eq!(cc.frame.tl, Pos::new(0, 0));
        assert_eq!(cc.frame.br, Pos::new(2, 1));
        assert_eq!(cc.frame.chain_code[TOP].len(), 2);
        assert_eq!(cc.frame.chain_code[LEFT].len(), 1);
        // Columns of equal samples collapse to one contour each.
        assert_eq!(
            cc.root_contour_at(Pos::new(1, 0)),
            cc.root_contour_at(Pos::new(1, 1))
        );
        validate(&mut cc);
    }

    #[test]
    fn vertical_merge_of_a_ramp() {
        let mut cc = CC::new(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0], 2, 3);
        assert_eq!(cc.live_continua(), 2);
        assert_eq!(cc.contour_classes(), 3);
        assert_eq!(cc.frame.tl, Pos::new(0, 0));
        assert_eq!(cc.frame.br, Pos::new(1, 2));
        assert_eq!(cc.frame.chain_code[LEFT].len(), 2);
        assert_eq!(cc.frame.chain_code[TOP].len(), 1);
        assert_eq!(
            cc.root_contour_at(Pos::new(0, 1)),
            cc.root_contour_at(Pos::new(1, 1))
        );
        validate(&mut cc);
    }

    #[test]
    fn uniform_image_collapses_to_one_contour() {
        let mut cc = CC::new(&[7.0; 9], 3, 3);
        assert_eq!(cc.live_continua(), 0);
        assert_eq!(cc.continua.len(), 0);
        assert_eq!(cc.contour_classes(), 1);
        assert_eq!(cc.frame.br, Pos::new(2, 2));
        for side in 0..4 {
            for word in &cc.frame.chain_code[side] {
                assert_eq!(word.len(), 1);
            }
        }
        validate(&mut cc);
    }

    #[test]
    fn propagation_splits_a_continuum_crossing_finer_bands() {
        // Left cell: one band from level 0 to 3 crossing the shared edge.
        // Right cell: bands 0–1, 1–2, 2–3 on the same edge. The wide band
        // is cut twice; each cut re-surfaces on the left cell's bottom
        // edge, which the band also crosses.
        let mut cc = CC::new(&[0.0, 0.0, 1.0, 0.0, 3.0, 2.0], 3, 2);
        assert_eq!(cc.live_continua(), 3);
        assert_eq!(cc.contour_classes(), 4);

        // The wide band (index 0) was narrowed to run from the level-2
        // contour up to its original top.
        assert_eq!(cc.continua[0].inf_ctr, 5);
        assert_eq!(cc.continua[0].sup_ctr, 4);
        assert_eq!(
            cc.continua[0].mme,
            vec![DPoint::new(0.0, 0.0), DPoint::new(1.0, 0.0)]
        );
        // The trailing band of the right cell matched the remainder and
        // was absorbed.
        assert!(cc.continua[2].parent >= 0);
        assert!(cc.continua[2].mme.is_empty());
        // Both cuts were spliced into the bottom edge of the left cell, in
        // ascending level order.
        assert_eq!(cc.frame.chain_code[BOTTOM][0], vec![3, 1, 2, 3, 5, 0, 4]);
        validate(&mut cc);
    }

    #[test]
    fn checkerboard_saddles_merge_into_one_class() {
        let mut cc = CC::new(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0], 3, 3);
        assert_eq!(cc.saddle_count(), 4);
        assert_eq!(cc.continua.len(), 16);
        assert_eq!(cc.live_continua(), 9);
        // No two real samples join: the level-0 points are separate
        // components, as are the level-1 points. The four saddle contours
        // all sit at level 0.5 and connect through the shared edges.
        assert_eq!(cc.contour_classes(), 10);
        let s00 = cc.idx(0, 3);
        for &(x, y) in [(1, 3), (0, 4), (1, 4)].iter() {
            let s = cc.idx(x, y);
            assert_eq!(cc.root_contour(s), cc.root_contour(s00));
        }
        assert_eq!(cc.contours[s00 as usize].lvl, 0.5);
        assert_eq!(cc.frame.br, Pos::new(2, 2));
        for side in 0..4 {
            assert_eq!(cc.frame.chain_code[side].len(), 2);
            for word in &cc.frame.chain_code[side] {
                assert_eq!(word.len(), 5);
            }
        }
        validate(&mut cc);
    }

    #[test]
    fn degenerate_images_have_no_cells() {
        let cc = CC::new(&[1.0, 2.0, 3.0], 3, 1);
        assert_eq!(cc.continua.len(), 0);
        assert_eq!(cc.contour_classes(), 3);
        assert!(cc.frame.chain_code.iter().all(|side| side.is_empty()));
    }
}
