use crate::geometry::{DPoint, Pos};
use crate::rect::Rect;
use crate::topology::CC;

/// Side index of the edge joining two consecutive corners of a unit cell.
/// Corners are numbered clockwise from top-left:
///
/// ```text
/// 0  0  1
///  +---+
/// 3|   |1
///  +---+
/// 3  2  2
/// ```
pub fn edge_id(i: usize, j: usize) -> usize {
    assert!((i + j) % 2 == 1, "corner indices must be consecutive");
    let k = i.min(j);
    if k == 0 && i.max(j) == 3 {
        3
    } else {
        k
    }
}

/**
 * Build the 1×1 rectangle whose top-left corner is `p`, from the four
 * corner levels `lvl` (clockwise from top-left). Classifies the bilinear
 * patch, creates the cell's continua and contour merges in `cc`, and emits
 * one chain-code word per side, each in strictly ascending level order.
 *
 * When the two lowest corners are diagonally opposite and strictly
 * separated from the upper diagonal, the patch has a true saddle: a
 * dual-cell contour is created and each corner is joined to it by its own
 * continuum. If the diagonal minimum is not strict, the two middle corners
 * are swapped to make the lowest pair adjacent and the patch is handled as
 * regular.
 */
pub fn unit_rect(cc: &mut CC, p: Pos, lvl: [f32; 4]) -> Rect {
    let mut r = Rect::new(p, Pos::new(p.x + 1, p.y + 1));
    let v = [
        r.tl,
        Pos::new(r.br.x, r.tl.y),
        r.br,
        Pos::new(r.tl.x, r.br.y),
    ];
    let mut rank = [0usize, 1, 2, 3];
    rank.sort_by(|&a, &b| lvl[a].total_cmp(&lvl[b]));
    let mut vo = [v[rank[0]], v[rank[1]], v[rank[2]], v[rank[3]]];

    let mut c = [-1i32; 4]; // up to 4 continua
    if (rank[0] + rank[1]) % 2 == 0 {
        // Smallest two diagonally opposite
        if lvl[rank[1]] < lvl[rank[2]] {
            // Saddle
            let s = cc.create_saddle(p, lvl);
            let si = cc.idx_pos(s);
            let sp = cc.contours[si as usize].p;
            for i in 0..4 {
                let m = DPoint::from(vo[i]).min(sp);
                c[i] = cc.create_continuum(vo[i], s, m);
            }
            for i in 0..2 {
                for j in 2..4 {
                    let e = edge_id(rank[i], rank[j]);
                    r.chain_code[e]
                        .push(vec![cc.idx_pos(vo[i]), c[i], si, c[j], cc.idx_pos(vo[j])]);
                }
            }
            return r;
        }
        // Make the two smallest adjacent
        rank.swap(1, 2);
        vo.swap(1, 2);
    }

    for side in r.chain_code.iter_mut() {
        side.push(Vec::new());
    }
    let dtl = DPoint::from(r.tl);

    let e_min = edge_id(rank[0], rank[1]);
    r.chain_code[e_min][0].push(cc.idx_pos(vo[0]));
    if lvl[rank[0]] == lvl[rank[1]] {
        cc.merge_contours(vo[0], vo[1]);
    } else {
        c[0] = cc.create_continuum(vo[0], vo[1], dtl);
        r.chain_code[e_min][0].push(c[0]);
        r.chain_code[e_min][0].push(cc.idx_pos(vo[1]));
    }

    let e_max = edge_id(rank[2], rank[3]);
    r.chain_code[e_max][0].push(cc.idx_pos(vo[2]));
    if lvl[rank[2]] == lvl[rank[3]] {
        cc.merge_contours(vo[2], vo[3]);
    } else {
        c[1] = cc.create_continuum(vo[2], vo[3], dtl);
        r.chain_code[e_max][0].push(c[1]);
        r.chain_code[e_max][0].push(cc.idx_pos(vo[3]));
    }

    if (rank[1] + rank[2]) % 2 == 1 {
        // Two adjacent intermediate-level corners
        let e_int = edge_id(rank[1], rank[2]);
        r.chain_code[e_int][0].push(cc.idx_pos(vo[1]));
        if lvl[rank[1]] == lvl[rank[2]] {
            cc.merge_contours(vo[1], vo[2]);
        } else {
            c[2] = cc.create_continuum(vo[1], vo[2], dtl);
            r.chain_code[e_int][0].push(c[2]);
            r.chain_code[e_int][0].push(cc.idx_pos(vo[2]));
        }
        // Opposite edge, linking the minimum and the maximum across the
        // cell interior: every band crossing it, by ascending level.
        let e_mm = (e_int + 2) % 4;
        r.chain_code[e_mm][0].push(cc.idx_pos(vo[0]));
        if c[0] >= 0 {
            r.chain_code[e_mm][0].push(c[0]);
            r.chain_code[e_mm][0].push(cc.idx_pos(vo[1]));
        }
        if c[2] >= 0 {
            r.chain_code[e_mm][0].push(c[2]);
            r.chain_code[e_mm][0].push(cc.idx_pos(vo[2]));
        }
        if c[1] >= 0 {
            r.chain_code[e_mm][0].push(c[1]);
            r.chain_code[e_mm][0].push(cc.idx_pos(vo[3]));
        }
    } else {
        // Opposite intermediate-level corners
        if lvl[rank[1]] == lvl[rank[2]] {
            cc.merge_contours(vo[1], vo[2]);
        } else {
            c[2] = cc.create_continuum(vo[1], vo[2], dtl);
        }
        let e02 = edge_id(rank[0], rank[2]);
        r.chain_code[e02][0].push(cc.idx_pos(vo[0]));
        if lvl[rank[0]] == lvl[rank[2]] {
            cc.merge_contours(vo[0], vo[2]);
        } else {
            if c[0] >= 0 {
                r.chain_code[e02][0].push(c[0]);
                r.chain_code[e02][0].push(cc.idx_pos(vo[1]));
            }
            if c[2] >= 0 {
                r.chain_code[e02][0].push(c[2]);
                r.chain_code[e02][0].push(cc.idx_pos(vo[2]));
            }
        }
        let e13 = (e02 + 2) % 4;
        r.chain_code[e13][0].push(cc.idx_pos(vo[1]));
        if c[2] >= 0 {
            r.chain_code[e13][0].push(c[2]);
            r.chain_code[e13][0].push(cc.idx_pos(vo[2]));
        }
        if c[1] >= 0 {
            r.chain_code[e13][0].push(c[1]);
            r.chain_code[e13][0].push(cc.idx_pos(vo[3]));
        }
    }
    r
}
