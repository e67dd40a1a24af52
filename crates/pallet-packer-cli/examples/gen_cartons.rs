//! Writes a random carton list for `pallet-packer batch`.
//!
//! cargo run -p pallet-packer-cli --example gen_cartons -- cartons.yaml 200 42

use rand::{Rng, SeedableRng};
use serde::Serialize;

#[derive(Serialize)]
struct Carton {
    length: u32,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_height: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let out = args.next().unwrap_or_else(|| "cartons.yaml".into());
    let count: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(100);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(42);

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let cartons: Vec<Carton> = (0..count)
        .map(|_| Carton {
            length: rng.gen_range(4..=30),
            width: rng.gen_range(4..=24),
            height: rng.gen_range(2..=20),
            // a few entries exercise the per-row override
            max_height: rng.gen_bool(0.1).then(|| rng.gen_range(40..=72)),
        })
        .collect();

    std::fs::write(&out, serde_yaml::to_string(&cartons)?)?;
    println!("wrote {} cartons to {}", cartons.len(), out);
    Ok(())
}
