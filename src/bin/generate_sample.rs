use anyhow::{Context, Result};

const FIRST_YEAR: i32 = 1880;
const LAST_YEAR: i32 = 2020;

/// Warming trend, amplified towards the poles, plus noise.
fn synthetic_anomaly(year: i32, latitude: i32, rng: &mut SimpleRng) -> f64 {
    let elapsed = f64::from(year - FIRST_YEAR) / f64::from(LAST_YEAR - FIRST_YEAR);
    let trend = 1.2 * elapsed.powi(2);
    let polar_amplification = 1.0 + 1.5 * (f64::from(latitude).abs() / 90.0).powi(2);
    trend * polar_amplification - 0.2 + rng.gauss(0.0, 0.35)
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tempanomaly_4x4grid.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut header = vec!["lat".to_string(), "lon".to_string()];
    header.extend((FIRST_YEAR..=LAST_YEAR).map(|y| y.to_string()));
    writer.write_record(&header)?;

    let mut rows = 0usize;
    for latitude in (-88i32..=88).step_by(4) {
        for longitude in (-178i32..=178).step_by(4) {
            let mut record = vec![latitude.to_string(), longitude.to_string()];
            for year in FIRST_YEAR..=LAST_YEAR {
                // Early polar records are sparse.
                let sparse = year < 1950 && latitude.abs() > 60;
                let gap_chance = if sparse { 0.6 } else { 0.03 };
                if rng.next_f64() < gap_chance {
                    record.push(String::new());
                } else {
                    record.push(format!("{:.4}", synthetic_anomaly(year, latitude, &mut rng)));
                }
            }
            writer.write_record(&record)?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {rows} grid cells ({} years each) to {output_path}",
        LAST_YEAR - FIRST_YEAR + 1
    );
    Ok(())
}
