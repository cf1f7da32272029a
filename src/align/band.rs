//! Row bands for the splice DP
//!
//! Row `i` (query residues consumed) covers at most two column spans
//! (target nt consumed, window coordinates). Bands follow the guide points
//! taken from chain anchors. Between two guides the band covers everything
//! from the left guide's diagonal to the right guide's; when that distance
//! exceeds twice the intron flank the middle is dropped, keeping one flank
//! on each side so an intron can still jump across.
//!
//! A seed can match across a splice junction by chance and pin a guide a
//! few residues off the true boundary. Rows within `slack` of a guide pair
//! whose diagonals differ by more than the band width therefore also keep
//! the diagonal on the other side of the jump.

/// Half-open column spans of one row, plus the row's offset in the cell
/// arena
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowBand {
    spans: [(u32, u32); 2],
    n: u8,
    pub off: usize,
}

impl RowBand {
    /// Union of `spans` clamped to the window. Past two spans the
    /// narrowest gaps are closed. Never empty.
    fn from_span_list(spans: &mut Vec<(i64, i64)>, wlen: i64) -> Self {
        let fallback = spans.first().map_or(0, |s| s.0.clamp(0, wlen));
        for s in spans.iter_mut() {
            *s = (s.0.clamp(0, wlen), s.1.clamp(0, wlen + 1));
        }
        spans.retain(|s| s.1 > s.0);
        spans.sort_unstable();
        let mut n = 0;
        for k in 0..spans.len() {
            let s = spans[k];
            if n > 0 && s.0 <= spans[n - 1].1 {
                spans[n - 1].1 = spans[n - 1].1.max(s.1);
            } else {
                spans[n] = s;
                n += 1;
            }
        }
        spans.truncate(n);
        while spans.len() > 2 {
            let k = (1..spans.len())
                .min_by_key(|&k| spans[k].0 - spans[k - 1].1)
                .unwrap_or(1);
            spans[k - 1].1 = spans[k - 1].1.max(spans[k].1);
            spans.remove(k);
        }

        let mut band = RowBand::default();
        match spans.as_slice() {
            [] => {
                band.spans[0] = (fallback as u32, fallback as u32 + 1);
                band.n = 1;
            }
            [a] => {
                band.spans[0] = (a.0 as u32, a.1 as u32);
                band.n = 1;
            }
            [a, b, ..] => {
                band.spans = [(a.0 as u32, a.1 as u32), (b.0 as u32, b.1 as u32)];
                band.n = 2;
            }
        }
        band
    }


    pub fn spans(&self) -> &[(u32, u32)] {
        &self.spans[..self.n as usize]
    }

    pub fn width(&self) -> usize {
        self.spans().iter().map(|s| (s.1 - s.0) as usize).sum()
    }

    pub fn first_col(&self) -> u32 {
        self.spans[0].0
    }

    /// Cell index within the row of column `j`
    #[inline(always)]
    pub fn index(&self, j: i64) -> Option<usize> {
        if j < 0 {
            return None;
        }
        let j = j as u32;
        let (a, b) = (self.spans[0], self.spans[1]);
        if j >= a.0 && j < a.1 {
            return Some((j - a.0) as usize);
        }
        if self.n == 2 && j >= b.0 && j < b.1 {
            return Some((a.1 - a.0 + j - b.0) as usize);
        }
        None
    }

    /// Column of cell `k` within the row
    #[inline(always)]
    pub fn col(&self, k: usize) -> u32 {
        let w0 = (self.spans[0].1 - self.spans[0].0) as usize;
        if k < w0 {
            self.spans[0].0 + k as u32
        } else {
            self.spans[1].0 + (k - w0) as u32
        }
    }
}

/// A point the alignment is expected to pass through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guide {
    pub q: u32,
    /// window column
    pub t: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct BandParams {
    /// half width (nt) around guide diagonals
    pub bw: i64,
    /// extra reach (nt) before the first and after the last guide
    pub max_ext: i64,
    /// flank (nt) kept on each side of a long gap
    pub flank: i64,
    /// rows on each side of a jump that keep both diagonals
    pub slack: i64,
}

/// Fill `bands` with rows `0..=m` and return the total number of cells.
/// `guides` must be strictly increasing in both coordinates.
pub fn build_bands(
    guides: &[Guide],
    m: usize,
    wlen: u32,
    params: &BandParams,
    bands: &mut Vec<RowBand>,
) -> usize {
    bands.clear();
    let wlen = wlen as i64;
    let (Some(&first), Some(&last)) = (guides.first(), guides.last()) else {
        return 0;
    };
    let bw = params.bw;
    let jumps: Vec<(Guide, Guide)> = guides
        .windows(2)
        .filter(|w| ((w[1].t - w[0].t) - 3 * (w[1].q - w[0].q) as i64).abs() > bw)
        .map(|w| (w[0], w[1]))
        .collect();
    let mut spans: Vec<(i64, i64)> = Vec::with_capacity(4);
    let mut seg = 0usize;
    let mut jump0 = 0usize;
    let mut off = 0usize;
    for i in 0..=m as u32 {
        spans.clear();
        if i <= first.q {
            let pred = first.t - 3 * (first.q - i) as i64;
            spans.push((pred - bw - params.max_ext, pred + bw + 1));
        } else if i >= last.q {
            let pred = last.t + 3 * (i - last.q) as i64;
            spans.push((pred - bw, pred + bw + params.max_ext + 1));
        } else {
            while seg + 1 < guides.len() && guides[seg + 1].q < i {
                seg += 1;
            }
            let (a, b) = (guides[seg], guides[seg + 1]);
            let left = a.t + 3 * (i - a.q) as i64;
            let right = b.t - 3 * (b.q - i) as i64;
            if right - left > 2 * params.flank {
                spans.push((left - bw, left + params.flank + 1));
                spans.push((right - params.flank, right + bw + 1));
            } else {
                let (lo, hi) = (left.min(right), left.max(right));
                spans.push((lo - bw, hi + bw + 1));
            }
        }

        let row = i as i64;
        while jump0 < jumps.len() && jumps[jump0].1.q as i64 + params.slack < row {
            jump0 += 1;
        }
        for &(a, b) in &jumps[jump0..] {
            if a.q as i64 - params.slack > row {
                break;
            }
            if i >= b.q {
                let pred = a.t + 3 * (i - a.q) as i64;
                spans.push((pred - bw, pred + bw + 1));
            } else if i <= a.q {
                let pred = b.t - 3 * (b.q - i) as i64;
                spans.push((pred - bw, pred + bw + 1));
            }
        }

        let mut band = RowBand::from_span_list(&mut spans, wlen);
        band.off = off;
        off += band.width();
        bands.push(band);
    }
    off
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BandParams {
        BandParams { bw: 6, max_ext: 30, flank: 50, slack: 0 }
    }

    #[test]
    fn test_diagonal_band() {
        let guides = [Guide { q: 0, t: 100 }, Guide { q: 20, t: 160 }];
        let mut bands = Vec::new();
        let cells = build_bands(&guides, 20, 1000, &params(), &mut bands);
        assert_eq!(bands.len(), 21);
        assert_eq!(bands[0].spans(), &[(64, 107)]);
        // interior rows: diagonal +- 6
        assert_eq!(bands[10].spans(), &[(124, 137)]);
        assert_eq!(bands[10].index(130), Some(6));
        assert_eq!(bands[10].index(200), None);
        assert_eq!(bands[20].off + bands[20].width(), cells);
    }

    #[test]
    fn test_long_gap_splits_row() {
        // 500 nt intron between q=10 and q=11
        let guides = [Guide { q: 0, t: 0 }, Guide { q: 10, t: 30 }, Guide { q: 20, t: 560 }];
        let mut bands = Vec::new();
        build_bands(&guides, 20, 2000, &params(), &mut bands);
        let row = &bands[15];
        assert_eq!(row.spans().len(), 2);
        let (s0, s1) = (row.spans()[0], row.spans()[1]);
        assert!(s0.1 < s1.0);
        assert_eq!(row.col(row.index(s1.0 as i64).unwrap()), s1.0);
        assert_eq!(row.width(), ((s0.1 - s0.0) + (s1.1 - s1.0)) as usize);
    }

    #[test]
    fn test_clamped_to_window() {
        let guides = [Guide { q: 5, t: 3 }, Guide { q: 8, t: 12 }];
        let mut bands = Vec::new();
        build_bands(&guides, 10, 20, &params(), &mut bands);
        for b in &bands {
            assert!(b.width() >= 1);
            for &(lo, hi) in b.spans() {
                assert!(lo < hi && hi <= 21);
            }
        }
    }
    #[test]
    fn test_jump_keeps_both_diagonals_nearby() {
        // seed at q=39 lands past a 500 nt intron although the junction is at q=40
        let guides = [
            Guide { q: 0, t: 0 },
            Guide { q: 34, t: 102 },
            Guide { q: 39, t: 617 },
            Guide { q: 60, t: 680 },
        ];
        let p = BandParams { slack: 6, ..params() };
        let mut bands = Vec::new();
        let cells = build_bands(&guides, 60, 2000, &p, &mut bands);
        let row = &bands[40];
        assert_eq!(row.spans(), &[(114, 127), (614, 627)]);
        assert!(row.index(120).is_some() && row.index(620).is_some());
        // before the jump the downstream diagonal is kept too
        assert!(bands[33].index(599).is_some());
        // past the slack only the own diagonal remains
        assert_eq!(bands[46].spans().len(), 1);
        assert!(bands[46].index(138).is_none());
        assert_eq!(bands[60].off + bands[60].width(), cells);

        // without slack the junction row misses the donor side
        let mut tight = Vec::new();
        build_bands(&guides, 60, 2000, &params(), &mut tight);
        assert!(tight[40].index(120).is_none());
    }
}
