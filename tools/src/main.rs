//! insight-runner: headless report builder for churn insights.
//!
//! Usage:
//!   insight-runner --input customers.json [--config insight.json] [--top 10] [--json]
//!   insight-runner --ipc-mode [--config insight.json]

use anyhow::{Context, Result};
use churn_insight_core::{
    config::InsightConfig,
    engine::{CustomerInput, CustomerReport, InsightEngine},
    format_value, label, rank_drivers, synthesize, AttributionMap, FeatureImportance,
    FeatureRecord, FeatureValue,
};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
struct InputFile {
    customers: Vec<CustomerInput>,
    #[serde(default)]
    feature_importance: Option<FeatureImportance>,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Label {
        feature: String,
    },
    FormatValue {
        #[serde(default)]
        value: Option<FeatureValue>,
    },
    Rank {
        #[serde(default)]
        attributions: Option<AttributionMap>,
        #[serde(default)]
        features: Option<FeatureRecord>,
        #[serde(default = "default_rank_limit")]
        limit: usize,
    },
    Synthesize {
        #[serde(default)]
        attributions: Option<AttributionMap>,
        churn_probability: f64,
    },
    Report {
        customer: CustomerInput,
        #[serde(default)]
        feature_importance: Option<FeatureImportance>,
    },
    Quit,
}

fn default_rank_limit() -> usize {
    5
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let as_json = args.iter().any(|a| a == "--json");
    let top = parse_arg(&args, "--top", 10usize);
    let input = flag_value(&args, "--input");

    let config = match flag_value(&args, "--config") {
        Some(path) => InsightConfig::load(path)?,
        None => InsightConfig::default(),
    };
    let engine = InsightEngine::new(config);

    if ipc_mode {
        return run_ipc_loop(&engine);
    }

    let Some(input) = input else {
        anyhow::bail!("missing --input <file> (or use --ipc-mode)");
    };

    let content = std::fs::read_to_string(input).with_context(|| format!("Cannot read {input}"))?;
    let file: InputFile =
        serde_json::from_str(&content).with_context(|| format!("Cannot parse {input}"))?;
    log::info!("loaded {} customers from {input}", file.customers.len());

    let reports = engine.report_batch(&file.customers, file.feature_importance.as_ref());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_summary(&engine, &reports, input, top);
    }

    Ok(())
}

fn run_ipc_loop(engine: &InsightEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        match handle_line(engine, &buffer)? {
            Some(response) => {
                writeln!(stdout, "{}", response)?;
                stdout.flush()?;
            }
            None => break,
        }
    }
    Ok(())
}

/// Parses one command line and answers it. Malformed commands answer with
/// an `error` object; `None` means the client asked to quit.
fn handle_line(engine: &InsightEngine, line: &str) -> Result<Option<Value>> {
    match serde_json::from_str::<IpcCommand>(line) {
        Ok(cmd) => dispatch(engine, cmd),
        Err(e) => Ok(Some(json!({ "error": e.to_string() }))),
    }
}

fn dispatch(engine: &InsightEngine, cmd: IpcCommand) -> Result<Option<Value>> {
    let response = match cmd {
        IpcCommand::Quit => return Ok(None),
        IpcCommand::Label { feature } => json!({ "label": label(&feature) }),
        IpcCommand::FormatValue { value } => json!({ "display": format_value(value.as_ref()) }),
        IpcCommand::Rank { attributions, features, limit } => {
            let drivers = rank_drivers(attributions.as_ref(), features.as_ref(), limit);
            json!({ "drivers": drivers })
        }
        IpcCommand::Synthesize { attributions, churn_probability } => {
            serde_json::to_value(synthesize(attributions.as_ref(), churn_probability))?
        }
        IpcCommand::Report { customer, feature_importance } => {
            serde_json::to_value(engine.report(&customer, feature_importance.as_ref()))?
        }
    };
    Ok(Some(response))
}

fn print_summary(engine: &InsightEngine, reports: &[CustomerReport], input: &str, top: usize) {
    let summary = engine.summarize(reports);

    println!("Churn Insight: insight-runner");
    println!("  input:      {input}");
    println!("  generated:  {}", chrono::Utc::now().to_rfc3339());
    println!();
    println!("=== PORTFOLIO SUMMARY ===");
    println!("  customers:        {}", summary.total);
    println!("  high risk:        {}", summary.high_risk);
    println!("  medium risk:      {}", summary.medium_risk);
    println!("  low risk:         {}", summary.low_risk);
    println!("  avg probability:  {:.1}%", summary.avg_probability * 100.0);
    println!(
        "  top strategy:     {}",
        summary.top_strategy.as_deref().unwrap_or("(none)")
    );

    println!();
    println!("=== SEGMENTS ===");
    for seg in &summary.segments {
        println!(
            "  {:<6} | {:>4} customers | avg {:.1}% | {}",
            seg.level.as_str(),
            seg.customer_count,
            seg.avg_churn_probability * 100.0,
            seg.insight.title,
        );
        println!("      {}", seg.insight.recommendation);
    }

    println!();
    println!("=== TOP {top} AT-RISK CUSTOMERS ===");
    if reports.is_empty() {
        println!("  (No customers)");
        return;
    }
    for r in reports.iter().take(top) {
        println!(
            "  {} | {:.1}% ({}) | {}",
            r.customer_id,
            r.churn_probability * 100.0,
            r.risk_level.as_str(),
            r.strategy.title,
        );
        for d in &r.drivers {
            let arrow = if d.effect > 0.0 { "+" } else { "-" };
            println!("      {arrow} {}: {}", d.label, d.value);
        }
        for action in &r.strategy.actions {
            println!("      * {action}");
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
