// Gamma-correct mixing via lookup tables (no powf per pixel).
// Visual: the translucent mask overlay tints the photo without dark fringes.

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1)
    to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255), 4096 quantization steps
    to_srgb: [u8; 4096],
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        let mut to_linear = [0.0f32; 256];
        for (v, slot) in to_linear.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            };
        }

        let mut to_srgb = [0u8; 4096];
        for (i, slot) in to_srgb.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 {
                12.92 * l
            } else {
                1.055 * l.powf(1.0 / 2.4) - 0.055
            };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { to_linear, to_srgb }
    }

    #[inline]
    pub fn linear(&self, v: u8) -> f32 {
        self.to_linear[v as usize]
    }

    #[inline]
    pub fn srgb(&self, l: f32) -> u8 {
        self.to_srgb[(l.clamp(0.0, 1.0) * 4095.0).round() as usize]
    }

    /// Mix two sRGB channel values in linear light; `t = 0` keeps `base`, `t = 1` gives `top`.
    #[inline]
    pub fn mix(&self, base: u8, top: u8, t: f32) -> u8 {
        if t <= 0.0 {
            return base;
        }
        if t >= 1.0 {
            return top;
        }
        let l = self.linear(base) * (1.0 - t) + self.linear(top) * t;
        self.srgb(l)
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_survive_the_round_trip() {
        let lut = GammaLut::new();
        for v in [0u8, 1, 128, 254, 255] {
            assert_eq!(lut.srgb(lut.linear(v)), v);
        }
    }

    #[test]
    fn mix_extremes_return_inputs() {
        let lut = GammaLut::new();
        assert_eq!(lut.mix(10, 200, 0.0), 10);
        assert_eq!(lut.mix(10, 200, 1.0), 200);
        let mid = lut.mix(0, 255, 0.5);
        // Linear-light midpoint is brighter than the naive 128.
        assert!(mid > 128, "mid = {mid}");
    }
}
