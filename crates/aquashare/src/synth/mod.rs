//! Seeded synthetic irrigation scenarios (WGS84).
//!
//! Purpose
//! - Provide small, reproducible datasets for property tests, benches and the
//!   CLI `synth` command.
//!
//! Model
//! - Supply points sit on a row, spaced so neighbouring footprints may touch.
//!   Each gets a jittered cluster of sprinklers.
//! - Parcels are a grid of cells around the row; each cell is randomly grown
//!   into its neighbours so that some parcels overlap (double-claimed ground),
//!   and a fraction is left without an owner.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use geo::{LineString, Point, Polygon};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    Dataset, Farmer, FarmerId, FarmerShare, MapView, Parcel, ParcelId, Sprinkler, SprinklerId,
    SupplyPoint, SupplyPointId,
};

/// Meters per degree of latitude (spherical approximation).
const M_PER_DEG: f64 = 111_320.0;

/// Scenario generator configuration.
#[derive(Clone, Copy, Debug)]
pub struct ScenarioCfg {
    pub supply_points: usize,
    /// Sprinklers per supply point (inclusive range).
    pub sprinklers: (usize, usize),
    pub farmers: usize,
    /// Parcel grid is `grid.0` columns by `grid.1` rows.
    pub grid: (usize, usize),
    /// Parcel cell edge in meters.
    pub cell_m: f64,
    /// Probability that a parcel has no owner.
    pub unowned_frac: f64,
    /// Max growth of a parcel into its neighbours, as a fraction of `cell_m`.
    pub overlap_frac: f64,
    /// South-west corner of the scene (lon, lat).
    pub origin: [f64; 2],
}

impl Default for ScenarioCfg {
    fn default() -> Self {
        Self {
            supply_points: 3,
            sprinklers: (1, 4),
            farmers: 5,
            grid: (8, 4),
            cell_m: 25.0,
            unowned_frac: 0.1,
            overlap_frac: 0.3,
            origin: [125.2941, 24.8055],
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw one scenario. Same `(cfg, tok)` gives the same dataset.
pub fn draw_scenario(cfg: ScenarioCfg, tok: ReplayToken) -> Dataset {
    let mut rng = tok.to_std_rng();
    let [lon0, lat0] = cfg.origin;
    let m_per_deg_lon = M_PER_DEG * lat0.to_radians().cos().max(1e-6);
    // Local meters → lon/lat.
    let at = |x: f64, y: f64| -> Point<f64> {
        Point::new(lon0 + x / m_per_deg_lon, lat0 + y / M_PER_DEG)
    };

    let (cols, rows) = (cfg.grid.0.max(1), cfg.grid.1.max(1));
    let cell = cfg.cell_m.max(1.0);
    let width = cols as f64 * cell;
    let height = rows as f64 * cell;

    let farmers: Vec<Farmer> = (0..cfg.farmers.max(1))
        .map(|i| Farmer {
            id: FarmerId::new(format!("far-{i:03}")),
            name: format!("Farmer {i}"),
            notes: None,
        })
        .collect();

    let n_sp = cfg.supply_points.max(1);
    let mut supply_points = Vec::with_capacity(n_sp);
    let mut sprinklers = Vec::new();
    for k in 0..n_sp {
        let cx = width * (k as f64 + 0.5) / n_sp as f64;
        let cy = height * 0.5;
        let id = SupplyPointId::new(format!("fct-{k:03}"));
        let draw = rng.gen_range(200.0..2000.0_f64).round();
        // Recorded shares: an even split among two random farmers.
        let a = rng.gen_range(0..farmers.len());
        let b = rng.gen_range(0..farmers.len());
        let mut shares = vec![FarmerShare {
            farmer_id: farmers[a].id.clone(),
            share: 0.5,
            computed: None,
        }];
        if b != a {
            shares.push(FarmerShare {
                farmer_id: farmers[b].id.clone(),
                share: 0.5,
                computed: None,
            });
        } else {
            shares[0].share = 1.0;
        }
        supply_points.push(SupplyPoint {
            id: id.clone(),
            name: format!("Faucet {k}"),
            location: at(cx, cy),
            annual_draw_m3: draw,
            shares,
        });

        let (lo, hi) = cfg.sprinklers;
        let count = rng.gen_range(lo.min(hi)..=hi.max(lo));
        for j in 0..count {
            let dx = rng.gen_range(-0.5..0.5) * width / n_sp as f64;
            let dy = rng.gen_range(-0.4..0.4) * height;
            sprinklers.push(Sprinkler {
                id: SprinklerId::new(format!("spr-{k:03}-{j:02}")),
                name: format!("Sprinkler {k}.{j}"),
                location: at(cx + dx, cy + dy),
                supply_point: Some(id.clone()),
            });
        }
    }
    // One orphan sprinkler that must not affect anything.
    sprinklers.push(Sprinkler {
        id: SprinklerId::new("spr-orphan"),
        name: "Orphan".into(),
        location: at(width * 0.5, height * 0.5),
        supply_point: None,
    });

    let grow = cfg.overlap_frac.clamp(0.0, 1.0) * cell;
    let mut parcels = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let x0 = c as f64 * cell - rng.gen_range(0.0..=grow);
            let y0 = r as f64 * cell - rng.gen_range(0.0..=grow);
            let x1 = (c + 1) as f64 * cell + rng.gen_range(0.0..=grow);
            let y1 = (r + 1) as f64 * cell + rng.gen_range(0.0..=grow);
            let ring: Vec<_> = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
                .into_iter()
                .map(|(x, y)| at(x, y).0)
                .collect();
            let farmer = if rng.gen::<f64>() < cfg.unowned_frac {
                None
            } else {
                Some(farmers[rng.gen_range(0..farmers.len())].id.clone())
            };
            let assessed = if rng.gen::<f64>() < 0.5 {
                Some(((x1 - x0) * (y1 - y0)).round())
            } else {
                None
            };
            parcels.push(Parcel {
                id: ParcelId::new(format!("par-{r:02}-{c:02}")),
                name: format!("Parcel {r}.{c}"),
                polygon: Polygon::new(LineString(ring), vec![]),
                farmer,
                assessed_area_sqm: assessed,
            });
        }
    }

    Dataset {
        map: MapView {
            center: [lat0, lon0],
            zoom: 16.0,
        },
        farmers,
        supply_points,
        sprinklers,
        parcels,
    }
}
