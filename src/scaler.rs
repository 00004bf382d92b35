use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Surface pixels are 0RGB; the top byte must be clear.
const SURFACE_MASK: u32 = 0x00FF_FFFF;

/// Precomputed nearest source column/row for every destination pixel
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }

    #[inline]
    pub fn dst_size(&self) -> (usize, usize) {
        (self.src_x.len(), self.src_y.len())
    }
}

fn nearest_indices(dst_len: usize, src_len: usize) -> Vec<usize> {
    if src_len == 0 {
        return Vec::new();
    }
    // Sample at pixel centers so edges map symmetrically
    let scale = src_len as f32 / dst_len as f32;
    (0..dst_len)
        .map(|d| {
            let s = ((d as f32 + 0.5) * scale) as usize;
            s.min(src_len - 1)
        })
        .collect()
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    ScaleLut {
        src_x: nearest_indices(dst_w, src_w),
        src_y: nearest_indices(dst_h, src_h),
    }
}

/// Parallel nearest-neighbour stretch from the ARGB frame onto the window surface.
/// Rows are processed in parallel for cache friendly writes.
pub fn blit_stretch(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    if dw == 0 || lut.src_x.len() != dw {
        return;
    }
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&sy) = lut.src_y.get(y) else {
            return;
        };
        let src_row = &src[sy * sw..(sy + 1) * sw];
        for (px, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
            *px = src_row[sx] & SURFACE_MASK;
        }
    });
}
