/// One application of `x -> r * sin(x)`.
#[inline]
pub fn sine_map(x: f64, r: f64) -> f64 {
    r * x.sin()
}

/// Long-term behavior of the map for a single r-value.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractorSample {
    pub r: f64,
    pub xs: Vec<f64>,
}

impl AttractorSample {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Iterates the map `warmup` times without recording, then records the next
/// `samples` iterates.
///
/// Diverging orbits are recorded as-is, including inf and NaN.
pub fn simulate(r: f64, initial_x: f64, warmup: usize, samples: usize) -> AttractorSample {
    let mut x = initial_x;
    for _ in 0..warmup {
        x = sine_map(x, r);
    }

    let mut xs = Vec::with_capacity(samples);
    for _ in 0..samples {
        x = sine_map(x, r);
        xs.push(x);
    }

    AttractorSample { r, xs }
}
