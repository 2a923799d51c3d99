//! Run the allocation pipeline on a few synthetic scenarios and print a summary.
//!
//! Usage:
//!   cargo run -p aquashare --example synthetic_farm -- 5
//!
//! Prints, per scenario, the share list of each supply point and the billed total.

use aquashare::alloc::{run, AllocCfg, Tariff};
use aquashare::geom::Wgs84;
use aquashare::synth::{draw_scenario, ReplayToken, ScenarioCfg};

fn main() {
    let count: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    for index in 0..count {
        let ds = draw_scenario(ScenarioCfg::default(), ReplayToken { seed: 2025, index });
        let out = run(&Wgs84, &ds, &AllocCfg::default(), &Tariff::default());
        println!("scenario {index}: {} footprints", out.footprints.len());
        for (sp, shares) in &out.shares {
            let parts: Vec<String> = shares
                .iter()
                .map(|s| format!("{}={:.6}", s.farmer, s.share))
                .collect();
            println!("  {sp}: {}", parts.join(" "));
        }
        let billed: f64 = out.billing.values().map(|b| b.total).sum();
        println!("  billed total: {billed:.2} over {} farmers", out.billing.len());
    }
}
