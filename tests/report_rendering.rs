//! Report rendering from the caller's side: both formats, validation and parse-back.

use marketpulse_core::{
    render, reference_snapshot, AlertEngine, ErrorKind, GlobalMetrics, Insight, MarketItem,
    PipelineError, Provider, ProviderId, ReliabilityTier, RenderError, Report, ReportFormat,
    ReportMeta, Sentiment, Snapshot, Symbol, UtcDateTime, ValidationError,
};

fn fixed_time() -> UtcDateTime {
    UtcDateTime::parse("2024-06-01T12:00:00Z").expect("valid timestamp")
}

fn meta(data_sources: Vec<ProviderId>) -> ReportMeta {
    ReportMeta {
        report_id: String::from("2f1c9a4e-7d3b-4b8a-9c51-0e6f2d7a8b90"),
        generated_at: fixed_time(),
        data_sources,
        generation_ms: 42,
    }
}

fn small_cap_snapshot() -> Snapshot {
    let provider = Provider::coinmarketcap(ReliabilityTier::Production);
    let global = GlobalMetrics::new(2.5e9, 1.2e8, 61.0, 12.5, 40, 1.25, "USD").expect("global");
    let items = vec![
        MarketItem::new(
            Symbol::crypto("PULSE").expect("symbol"),
            "Pulse | Token",
            Some(1),
            0.42,
            -11.0,
            Some(4.2e7),
            None,
            "USD",
        )
        .expect("item"),
    ];
    Snapshot::builder("USD")
        .generated_at(fixed_time())
        .global(global, &provider)
        .items(items, &provider)
        .build()
        .expect("snapshot")
}

fn small_cap_report() -> Report {
    let snapshot = small_cap_snapshot();
    let alerts = AlertEngine::default().evaluate(&snapshot);
    let insight = Insight::new(
        "Thin market with one mover",
        Sentiment::Bearish,
        vec![String::from("PULSE fell 11%")],
        vec![String::from("Low liquidity")],
        Vec::new(),
        35,
    )
    .expect("insight");
    Report::new(
        meta(vec![ProviderId::Coinmarketcap]),
        snapshot,
        Some(insight),
        alerts,
    )
}

#[test]
fn structured_rendering_parses_back_to_the_same_report() {
    // Given: a complete report
    let report = small_cap_report();

    // When: it is rendered as JSON and parsed back
    let bytes = render(&report, ReportFormat::Structured).expect("render");
    let parsed = Report::from_structured(&bytes).expect("parse back");

    // Then: nothing is lost
    assert_eq!(parsed, report);
}

#[test]
fn text_rendering_uses_compact_money_and_signed_percentages() {
    // Given: a market whose total cap is two and a half billion
    let report = small_cap_report();

    // When: it is rendered as Markdown
    let text = String::from_utf8(render(&report, ReportFormat::Text).expect("render"))
        .expect("utf-8");

    // Then: amounts use magnitude suffixes and moves carry a sign
    assert!(text.contains("| Total market cap | $2.50B |"), "{text}");
    assert!(text.contains("-11.00%"));
    assert!(text.contains("Pulse \\| Token"));
    assert!(text.contains("## Insight"));
    assert!(text.contains("Thin market with one mover"));
    assert!(text.contains("[HIGH]") || text.contains("[MEDIUM]"));
}

#[test]
fn text_rendering_without_insight_or_alerts_omits_the_insight_section() {
    // Given: the reference snapshot with no insight and no alerts
    let snapshot = reference_snapshot("USD", 3).expect("reference");
    let report = Report::new(
        meta(snapshot.data_sources()),
        snapshot,
        None,
        Vec::new(),
    );

    // When: it is rendered as Markdown
    let text = String::from_utf8(render(&report, ReportFormat::Text).expect("render"))
        .expect("utf-8");

    // Then: the insight section is absent and the empty alert list is explicit
    assert!(!text.contains("## Insight"));
    assert!(text.contains("_No alerts triggered._"));
    assert!(text.contains("| Total market cap | $2.50T |"));
    assert!(text.contains("mocked"));
}

#[test]
fn missing_required_fields_fail_to_render() {
    // Given: reports lacking a data source list or a report id
    let mut no_sources = small_cap_report();
    no_sources.meta.data_sources.clear();
    let mut blank_id = small_cap_report();
    blank_id.meta.report_id = String::from("   ");

    // When / Then: both formats refuse to render and name the missing field
    for format in [ReportFormat::Structured, ReportFormat::Text] {
        assert!(matches!(
            render(&no_sources, format),
            Err(RenderError::MissingField {
                field: "meta.data_sources"
            })
        ));
        assert!(matches!(
            render(&blank_id, format),
            Err(RenderError::MissingField {
                field: "meta.report_id"
            })
        ));
    }
}

#[test]
fn malformed_structured_input_is_a_render_failure() {
    let error = Report::from_structured(b"{\"meta\": 12}").expect_err("malformed");
    assert!(matches!(error, RenderError::Malformed(_)));

    let pipeline_error = PipelineError::from(error);
    assert_eq!(pipeline_error.kind(), ErrorKind::RenderFailure);
}

#[test]
fn report_formats_parse_from_user_input() {
    assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Structured));
    assert_eq!("MD".parse::<ReportFormat>(), Ok(ReportFormat::Text));
    assert_eq!("markdown".parse::<ReportFormat>(), Ok(ReportFormat::Text));
    assert!(matches!(
        "pdf".parse::<ReportFormat>(),
        Err(ValidationError::InvalidFormat { .. })
    ));

    assert_eq!(ReportFormat::Text.content_type(), "text/markdown; charset=utf-8");
    assert_eq!(ReportFormat::Structured.file_extension(), "json");
}
