use fastnoise_lite::{FastNoiseLite, NoiseType};

/// Octave-summed OpenSimplex2 noise, normalized to `[0, 1]`.
///
/// Frequency is fixed at 1 so callers scale coordinates themselves.
pub struct SimplexNoise {
    seed: i32,
    noise: FastNoiseLite,
}

impl SimplexNoise {
    pub fn new(seed: i32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(1.0));
        Self { seed, noise }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn simplex2(&self, x: f32, z: f32, octaves: u32, persistence: f32, lacunarity: f32) -> f32 {
        self.fractal(octaves, persistence, lacunarity, |f| {
            self.noise.get_noise_2d(x * f, z * f)
        })
    }

    pub fn simplex3(
        &self,
        x: f32,
        y: f32,
        z: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> f32 {
        self.fractal(octaves, persistence, lacunarity, |f| {
            self.noise.get_noise_3d(x * f, y * f, z * f)
        })
    }

    fn fractal(
        &self,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
        sample: impl Fn(f32) -> f32,
    ) -> f32 {
        let mut amp = 1.0_f32;
        let mut freq = 1.0_f32;
        let mut sum = 0.0_f32;
        let mut max_amp = 0.0_f32;
        for _ in 0..octaves.max(1) {
            sum += sample(freq) * amp;
            max_amp += amp;
            amp *= persistence;
            freq *= lacunarity;
        }
        let n = if max_amp > 0.0 { sum / max_amp } else { sum };
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_and_deterministic() {
        let a = SimplexNoise::new(7);
        let b = SimplexNoise::new(7);
        for i in 0..200 {
            let x = i as f32 * 0.37 - 20.0;
            let z = i as f32 * -0.11 + 3.0;
            let v = a.simplex2(x, z, 4, 0.5, 2.0);
            assert!((0.0..=1.0).contains(&v));
            assert_eq!(v, b.simplex2(x, z, 4, 0.5, 2.0));
            let w = a.simplex3(x, 1.5, z, 8, 0.5, 2.0);
            assert!((0.0..=1.0).contains(&w));
        }
    }

    #[test]
    fn varies_across_space() {
        let n = SimplexNoise::new(0);
        let samples: Vec<f32> = (0..64).map(|i| n.simplex2(i as f32 * 0.7, 0.3, 4, 0.5, 2.0)).collect();
        let lo = samples.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(hi - lo > 0.05);
    }
}
