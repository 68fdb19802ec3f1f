use std::fmt::Write;

use super::format::{format_count, format_money, format_percent};
use super::Report;
use crate::{Alert, GlobalMetrics, Insight, MarketItem, Snapshot};

pub(super) fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    let snapshot = &report.snapshot;

    out.push_str("# Market Pulse Report\n\n");
    let sources: Vec<&str> = report
        .meta
        .data_sources
        .iter()
        .map(|source| source.as_str())
        .collect();
    line(&mut out, format_args!("- **Report ID:** {}", report.meta.report_id));
    line(&mut out, format_args!("- **Generated:** {}", report.meta.generated_at));
    line(&mut out, format_args!("- **Data sources:** {}", sources.join(", ")));
    line(&mut out, format_args!("- **Generation time:** {} ms", report.meta.generation_ms));
    line(&mut out, format_args!("- **Snapshot time:** {}", snapshot.generated_at()));
    line(&mut out, format_args!("- **Currency:** {}", snapshot.currency()));

    if let Some(global) = snapshot.global() {
        write_global(&mut out, global, snapshot.currency());
    }
    if !snapshot.items().is_empty() {
        write_items(&mut out, snapshot.items(), snapshot.currency());
    }
    if let Some(insight) = &report.insight {
        write_insight(&mut out, insight);
    }
    write_alerts(&mut out, &report.alerts);
    write_provenance(&mut out, snapshot);

    out
}

fn line(out: &mut String, args: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail.
    let _ = out.write_fmt(args);
    out.push('\n');
}

fn write_global(out: &mut String, global: &GlobalMetrics, currency: &str) {
    out.push_str("\n## Market Overview\n\n");
    out.push_str("| Metric | Value |\n|---|---|\n");
    line(out, format_args!("| Total market cap | {} |", format_money(global.total_market_cap, currency)));
    line(out, format_args!("| 24h volume | {} |", format_money(global.total_volume_24h, currency)));
    line(out, format_args!("| Market cap change (24h) | {} |", format_percent(global.market_cap_change_24h)));
    line(out, format_args!("| BTC dominance | {} |", format_percent(global.btc_dominance)));
    line(out, format_args!("| ETH dominance | {} |", format_percent(global.eth_dominance)));
    line(
        out,
        format_args!(
            "| Active cryptocurrencies | {} |",
            format_count(u64::from(global.active_cryptocurrencies))
        ),
    );
}

fn write_items(out: &mut String, items: &[MarketItem], currency: &str) {
    out.push_str("\n## Assets\n\n");
    out.push_str("| # | Symbol | Name | Price | 24h | Market cap | 24h volume |\n");
    out.push_str("|---|---|---|---|---|---|---|\n");
    for item in items {
        let rank = item
            .rank
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| String::from("-"));
        let market_cap = item
            .market_cap
            .map(|value| format_money(value, currency))
            .unwrap_or_else(|| String::from("n/a"));
        let volume = item
            .volume_24h
            .map(|value| format_money(value, currency))
            .unwrap_or_else(|| String::from("n/a"));
        line(
            out,
            format_args!(
                "| {rank} | {} | {} | {} | {} | {market_cap} | {volume} |",
                item.symbol,
                escape_cell(&item.name),
                format_money(item.price, currency),
                format_percent(item.change_24h),
            ),
        );
    }
}

fn write_insight(out: &mut String, insight: &Insight) {
    out.push_str("\n## Insight\n\n");
    line(
        out,
        format_args!(
            "**Sentiment:** {} (confidence {}/100)\n",
            insight.sentiment.as_str(),
            insight.confidence
        ),
    );
    line(out, format_args!("{}", insight.summary));

    for (heading, entries) in [
        ("Key points", &insight.key_points),
        ("Risks", &insight.risks),
        ("Opportunities", &insight.opportunities),
    ] {
        if entries.is_empty() {
            continue;
        }
        line(out, format_args!("\n### {heading}\n"));
        for entry in entries {
            line(out, format_args!("- {entry}"));
        }
    }
}

fn write_alerts(out: &mut String, alerts: &[Alert]) {
    out.push_str("\n## Alerts\n\n");
    if alerts.is_empty() {
        out.push_str("_No alerts triggered._\n");
        return;
    }
    for alert in alerts {
        line(
            out,
            format_args!(
                "- **[{}] {}:** {}. {}",
                alert.priority.as_str().to_ascii_uppercase(),
                alert.kind.as_str(),
                alert.title,
                alert.message
            ),
        );
    }
}

fn write_provenance(out: &mut String, snapshot: &Snapshot) {
    out.push_str("\n## Provenance\n\n");
    out.push_str("| Sub-view | Provider | Tier |\n|---|---|---|\n");
    for entry in snapshot.provenance() {
        line(
            out,
            format_args!(
                "| {} | {} | {} |",
                entry.sub_view,
                entry.provider,
                entry.tier.as_str()
            ),
        );
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
