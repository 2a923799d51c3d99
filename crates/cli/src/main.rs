use anyhow::{Context, Result};
use aquashare::api::{
    apply_computed_shares, compute_faucet_shares, draw_scenario, parse_document, run,
    serialize_document, AllocCfg, RecalcMode, ScenarioCfg, ScenarioReplay, Tariff, UsageBasis,
    Wgs84,
};
use aquashare::cfg::{DEFAULT_CIRCLE_STEPS, DEFAULT_RADIUS_M};
use aquashare::model::Dataset;
use clap::{Parser, Subcommand, ValueEnum};
use provenance::InputDoc;
use serde_json::json;
use std::path::Path;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod table;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Irrigation share allocation and billing")]
struct Cmd {
    /// Sprinkler coverage radius in meters
    #[arg(long, global = true, default_value_t = DEFAULT_RADIUS_M)]
    radius: f64,

    /// Segment count of each sprinkler circle
    #[arg(long, global = true, default_value_t = DEFAULT_CIRCLE_STEPS)]
    steps: usize,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, ValueEnum)]
enum Basis {
    Computed,
    Recorded,
}

#[derive(Subcommand)]
enum Action {
    /// Validate a document and print its digest and entity counts
    Check {
        #[arg(long)]
        input: String,
    },
    /// Print computed shares per supply point as JSON
    Shares {
        #[arg(long)]
        input: String,
    },
    /// Recompute shares and write the updated document
    Recalc {
        #[arg(long)]
        input: String,
        #[arg(long)]
        out: String,
        /// Replace user-entered shares instead of only updating the computed snapshot
        #[arg(long)]
        overwrite_shares: bool,
    },
    /// Write the billing table (.csv or .parquet) plus a provenance sidecar
    Bill {
        #[arg(long)]
        input: String,
        #[arg(long)]
        out: String,
        /// Tariff JSON; missing fields use the default schedule
        #[arg(long)]
        tariff: Option<String>,
        #[arg(long, value_enum, default_value_t = Basis::Computed)]
        basis: Basis,
    },
    /// Write a synthetic scenario document
    Synth {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[arg(long, default_value_t = 3)]
        supply_points: usize,
        #[arg(long)]
        out: String,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let cfg = AllocCfg {
        buffer_radius_m: cmd.radius,
        circle_steps: cmd.steps,
        ..AllocCfg::default()
    };
    match cmd.action {
        Action::Check { input } => check(input),
        Action::Shares { input } => shares(input, cfg),
        Action::Recalc {
            input,
            out,
            overwrite_shares,
        } => recalc(input, out, overwrite_shares, cfg),
        Action::Bill {
            input,
            out,
            tariff,
            basis,
        } => bill(input, out, tariff, basis, cfg),
        Action::Synth {
            seed,
            index,
            supply_points,
            out,
        } => synth(seed, index, supply_points, out),
        Action::Report => report(),
    }
}

fn load(input: &str) -> Result<Dataset> {
    load_recorded(input).map(|(ds, _)| ds)
}

/// Parse `input` and describe it for provenance.
fn load_recorded(input: &str) -> Result<(Dataset, InputDoc)> {
    let text = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    let ds = parse_document(&text, &Wgs84).with_context(|| format!("parsing {input}"))?;
    let doc = InputDoc::new(input, &text, &ds);
    Ok((ds, doc))
}

fn write_out(out: &str, bytes: &[u8]) -> Result<()> {
    let out_path = Path::new(out);
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out_path, bytes).with_context(|| format!("writing {out}"))
}

fn check(input: String) -> Result<()> {
    let (_, doc) = load_recorded(&input)?;
    tracing::info!(input, sha256 = doc.sha256, "check");
    println!("{}", serde_json::to_string_pretty(&doc.to_json())?);
    Ok(())
}

fn shares(input: String, cfg: AllocCfg) -> Result<()> {
    let ds = load(&input)?;
    tracing::info!(input, radius = cfg.buffer_radius_m, "shares");
    let computed = compute_faucet_shares(&Wgs84, &ds.sprinklers, &ds.parcels, &cfg);
    println!("{}", serde_json::to_string_pretty(&computed)?);
    Ok(())
}

fn recalc(input: String, out: String, overwrite: bool, cfg: AllocCfg) -> Result<()> {
    let ds = load(&input)?;
    let mode = if overwrite {
        RecalcMode::Overwrite
    } else {
        RecalcMode::PreserveManual
    };
    tracing::info!(input, out, overwrite, "recalc");
    let computed = compute_faucet_shares(&Wgs84, &ds.sprinklers, &ds.parcels, &cfg);
    let next = apply_computed_shares(&ds, &computed, mode);
    write_out(&out, serialize_document(&next)?.as_bytes())
}

fn bill(
    input: String,
    out: String,
    tariff: Option<String>,
    basis: Basis,
    cfg: AllocCfg,
) -> Result<()> {
    let (ds, doc) = load_recorded(&input)?;
    let tariff: Tariff = match &tariff {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing tariff {path}"))?
        }
        None => Tariff::default(),
    };
    let cfg = AllocCfg {
        usage_basis: match basis {
            Basis::Computed => UsageBasis::Computed,
            Basis::Recorded => UsageBasis::Recorded,
        },
        ..cfg
    };
    let basis_name = match basis {
        Basis::Computed => "computed",
        Basis::Recorded => "recorded",
    };
    tracing::info!(input, out, basis = basis_name, "bill");
    let allocation = run(&Wgs84, &ds, &cfg, &tariff);
    let mut df = table::billing_frame(&ds, &allocation.billing)?;
    tracing::info!(rows = df.height(), cols = df.width(), "billing_table");
    table::write_table(&mut df, Path::new(&out))?;

    let payload = provenance::Payload {
        params: json!({
            "radius_m": cfg.buffer_radius_m,
            "circle_steps": cfg.circle_steps,
            "basis": basis_name,
            "tariff": tariff,
        }),
        inputs: vec![doc],
        rows: df.height(),
    };
    let sidecar = provenance::write_sidecar(Path::new(&out), &payload)?;
    tracing::info!(sidecar = %sidecar.display(), "provenance");
    Ok(())
}

fn synth(seed: u64, index: u64, supply_points: usize, out: String) -> Result<()> {
    tracing::info!(seed, index, supply_points, out, "synth");
    let cfg = ScenarioCfg {
        supply_points,
        ..ScenarioCfg::default()
    };
    let ds = draw_scenario(cfg, ScenarioReplay { seed, index });
    write_out(&out, serialize_document(&ds)?.as_bytes())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": aquashare::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
