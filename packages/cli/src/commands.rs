//! Non-interactive subcommands.

use chrono::NaiveDate;
use hotspot_map_cli_utils::{MultiProgress, SpinnerIndicator};
use hotspot_map_dashboard::{Dashboard, DashboardConfig, HeadlessMap, HeadlessTileSource};
use hotspot_map_geocoder::{NominatimSearch, PlaceSearch};
use hotspot_map_imagery::{LayerRegistry, TileUrlBuilder, default_imagery_date};
use hotspot_map_imagery_models::LayerKey;
use hotspot_map_placement::PlacementOutcome;
use hotspot_map_render::{ResultDetail, ScoreColor};
use hotspot_map_scoring::request::parse_date;
use hotspot_map_scoring::{HttpScoringService, ScoringService};

use crate::args::{AnalyzeArgs, ScoreArgs};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub type Session = Dashboard<HeadlessMap, HttpScoringService>;

/// Starts a dashboard session against the configured scoring service.
pub fn new_session(
    config: &DashboardConfig,
    multi: &MultiProgress,
    today: NaiveDate,
) -> CliResult<Session> {
    let scoring = HttpScoringService::new(&config.scoring.base_url, config.scoring.timeout())?;
    let dashboard = Dashboard::new(config, HeadlessMap::new(), scoring, today)?
        .with_loading_indicator(SpinnerIndicator::new(multi));
    Ok(dashboard)
}

/// `layers`: prints every imagery layer for a date.
pub fn layers(
    config: &DashboardConfig,
    today: NaiveDate,
    date: Option<&str>,
    show: &[String],
) -> CliResult {
    let date = match date {
        Some(date) => parse_date(date)?,
        None => default_imagery_date(today, config.imagery.lag_days),
    };

    let mut map = HeadlessMap::new();
    let urls = TileUrlBuilder::new(config.imagery.tile_base.clone());
    let mut registry = LayerRegistry::new(urls);
    registry.initialize(&mut map, config.imagery.descriptors(), date);

    for key in show {
        let key = LayerKey::new(key.trim());
        if registry.layer(&key).is_none() {
            log::warn!("Unknown imagery layer '{key}'");
        }
        registry.toggle(&mut map, &key, true);
    }

    print_layers(&registry, date);
    Ok(())
}

/// `analyze`: places the given structures, scores them and prints the
/// results.
pub async fn analyze(
    config: &DashboardConfig,
    multi: &MultiProgress,
    today: NaiveDate,
    args: AnalyzeArgs,
) -> CliResult {
    let mut dashboard =
        new_session(config, multi, today)?.with_covariates(args.covariates.covariates());
    apply_range(&mut dashboard, args.start, args.end)?;

    for place in &args.places {
        dashboard.arm(place.structure_type);
        dashboard.handle_map_click(place.position.lat(), place.position.lon())?;
    }
    dashboard.cancel_placement();

    dashboard.analyze().await?;
    print_rows(&dashboard);

    if let Some(n) = args.detail {
        print_detail(&dashboard, n)?;
    }
    Ok(())
}

/// `score`: scores a single structure through the single-point endpoint.
pub async fn score(
    config: &DashboardConfig,
    multi: &MultiProgress,
    today: NaiveDate,
    args: ScoreArgs,
) -> CliResult {
    let mut dashboard =
        new_session(config, multi, today)?.with_covariates(args.covariates.covariates());
    apply_range(&mut dashboard, args.start, args.end)?;

    dashboard.arm(args.place.structure_type);
    let outcome = dashboard.handle_map_click(args.place.position.lat(), args.place.position.lon())?;
    dashboard.cancel_placement();
    let PlacementOutcome::Placed(id) = outcome else {
        return Err("Structure could not be placed".into());
    };

    let Some(score) = dashboard.score_structure(id).await? else {
        return Ok(());
    };
    let Some(placement) = dashboard.session().placement().store().get(id) else {
        return Ok(());
    };

    let range = dashboard.session().range();
    println!("Score for {} to {}", range.start(), range.end());
    let detail = ResultDetail {
        index: 0,
        placement,
        result: &score.result,
        score_color: ScoreColor::from_score(score.result.score),
        temperature_bucket: None,
    };
    for line in detail.summary_lines() {
        println!("  {line}");
    }
    if let Some(road_km) = score.road_km {
        println!("  Road distance: {road_km:.2} km");
    }
    if let Some(water_km) = score.water_km {
        println!("  Water distance: {water_km:.2} km");
    }
    Ok(())
}

/// Applies `--start`/`--end`, keeping the session default for a missing
/// side.
fn apply_range(
    dashboard: &mut Session,
    start: Option<String>,
    end: Option<String>,
) -> CliResult {
    if start.is_none() && end.is_none() {
        return Ok(());
    }
    let range = dashboard.session().range();
    let start = start.unwrap_or_else(|| range.start().to_string());
    let end = end.unwrap_or_else(|| range.end().to_string());
    dashboard.set_range_from_inputs(&start, &end)?;
    Ok(())
}

/// `geocode`: prints the best match for a query.
pub async fn geocode(config: &DashboardConfig, query: &str) -> CliResult {
    let search = NominatimSearch::new(&config.geocoder)?;
    match search.search(query).await? {
        Some(place) => {
            println!(
                "{:.5}, {:.5}  {}",
                place.latitude,
                place.longitude,
                place.display_name.as_deref().unwrap_or("")
            );
            if let Some(zoom) = place.zoom_hint {
                println!("Suggested zoom: {zoom}");
            }
        }
        None => println!("No match for '{query}'"),
    }
    Ok(())
}

pub fn print_layers(registry: &LayerRegistry<HeadlessTileSource>, date: NaiveDate) {
    println!("Imagery date: {date}");
    println!("{:<14} {:<8} URL", "LAYER", "VISIBLE");
    println!("{}", "-".repeat(72));
    for layer in registry.layers() {
        println!(
            "{:<14} {:<8} {}",
            layer.key(),
            if layer.is_visible() { "yes" } else { "no" },
            layer
                .tile_source()
                .map_or("unavailable", |source| source.url.as_str())
        );
    }
}

pub fn print_rows<S: ScoringService>(dashboard: &Dashboard<HeadlessMap, S>) {
    let session = dashboard.session();
    let range = session.range();
    println!("Results for {} to {}", range.start(), range.end());
    println!("{:<4} {:<10} {:>7}  RATING", "#", "TYPE", "SCORE");
    println!("{}", "-".repeat(34));
    for row in dashboard.rows() {
        println!(
            "{:<4} {:<10} {:>7.1}  {}",
            row.index + 1,
            row.structure_type.label(),
            row.score,
            row.score_color
        );
    }
    for warning in session.warnings() {
        println!("warning: {warning}");
    }
}

/// Prints the detail view of result `n` (1-based).
pub fn print_detail<S: ScoringService>(
    dashboard: &Dashboard<HeadlessMap, S>,
    n: usize,
) -> CliResult {
    let detail = n
        .checked_sub(1)
        .and_then(|index| dashboard.detail(index))
        .ok_or_else(|| {
            format!(
                "No result #{n}; {} result(s) available",
                dashboard.rows().len()
            )
        })?;
    println!();
    for line in detail.summary_lines() {
        println!("  {line}");
    }
    Ok(())
}
