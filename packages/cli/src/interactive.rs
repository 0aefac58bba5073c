//! Menu-driven session.
//!
//! Drives one dashboard session with `dialoguer` prompts standing in for the
//! map: placing a structure is "pick a type, type a coordinate", toggling
//! layers is a checklist, and so on.

use chrono::NaiveDate;
use dialoguer::{Input, MultiSelect, Select};
use hotspot_map_cli_utils::MultiProgress;
use hotspot_map_dashboard::{DashboardConfig, MessageLevel};
use hotspot_map_geocoder::NominatimSearch;
use hotspot_map_imagery::LayerState;
use hotspot_map_placement_models::{PlacedStructure, StructureId, StructureType};

use crate::args::parse_lat_lon;
use crate::commands::{self, CliResult, Session};

/// Top-level actions of the session menu.
enum Action {
    Place,
    Move,
    Remove,
    Clear,
    Dates,
    Layers,
    Search,
    Analyze,
    Score,
    Detail,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Place,
        Self::Move,
        Self::Remove,
        Self::Clear,
        Self::Dates,
        Self::Layers,
        Self::Search,
        Self::Analyze,
        Self::Score,
        Self::Detail,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Place => "Place structures",
            Self::Move => "Move a structure",
            Self::Remove => "Remove a structure",
            Self::Clear => "Clear all structures",
            Self::Dates => "Set date range",
            Self::Layers => "Toggle imagery layers",
            Self::Search => "Search for a place",
            Self::Analyze => "Analyze",
            Self::Score => "Quick-score one structure",
            Self::Detail => "Show result detail",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the session menu until the user quits.
///
/// # Errors
///
/// Returns an error if the session cannot be started or a prompt fails.
/// Failed dashboard operations are reported in the status line instead.
pub async fn run(
    config: &DashboardConfig,
    multi: &MultiProgress,
    today: NaiveDate,
) -> CliResult {
    let mut dashboard = commands::new_session(config, multi, today)?;
    let search = NominatimSearch::new(&config.geocoder)?;

    println!("Hotspot Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        print_status(&dashboard);

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Place => place_structures(&mut dashboard)?,
            Action::Move => move_structure(&mut dashboard)?,
            Action::Remove => {
                if let Some(id) = pick_structure(&dashboard, "Remove which structure?")? {
                    dashboard.remove_structure(id);
                }
            }
            Action::Clear => {
                dashboard.clear_structures();
            }
            Action::Dates => set_dates(&mut dashboard)?,
            Action::Layers => toggle_layers(&mut dashboard)?,
            Action::Search => {
                let query: String = Input::new().with_prompt("Place name").interact_text()?;
                // Failures are shown in the status line.
                let _ = dashboard.search_and_recenter(&search, &query).await;
            }
            Action::Analyze => {
                if dashboard.analyze().await.is_ok() {
                    commands::print_rows(&dashboard);
                }
            }
            Action::Score => {
                if let Some(id) = pick_structure(&dashboard, "Score which structure?")? {
                    // The score is shown in the status line.
                    let _ = dashboard.score_structure(id).await;
                }
            }
            Action::Detail => show_detail(&dashboard)?,
            Action::Quit => break,
        }
    }

    Ok(())
}

fn print_status(dashboard: &Session) {
    let session = dashboard.session();
    let range = session.range();
    let view = session.view();
    println!();
    println!(
        "{} structure(s) | {} to {} | centered on {} (zoom {})",
        session.placement().placements().len(),
        range.start(),
        range.end(),
        view.center,
        view.zoom
    );
    if let Some(message) = session.message() {
        let prefix = match message.level {
            MessageLevel::Info => "",
            MessageLevel::Warning => "warning: ",
            MessageLevel::Error => "error: ",
        };
        println!("{prefix}{}", message.text);
    }
}

/// Arms a structure type and places one structure per entered coordinate
/// until an empty line is entered.
fn place_structures(dashboard: &mut Session) -> CliResult {
    let types = StructureType::all();
    let labels: Vec<&str> = types.iter().map(|t| t.label()).collect();
    let idx = Select::new()
        .with_prompt("Structure type")
        .items(&labels)
        .default(0)
        .interact()?;
    dashboard.arm(types[idx]);

    loop {
        let input: String = Input::new()
            .with_prompt("LAT,LON (empty to stop)")
            .allow_empty(true)
            .interact_text()?;
        if input.trim().is_empty() {
            break;
        }
        match parse_lat_lon(&input) {
            Ok(position) => {
                let _ = dashboard.handle_map_click(position.lat(), position.lon());
            }
            Err(e) => println!("{e}"),
        }
    }

    dashboard.cancel_placement();
    Ok(())
}

fn move_structure(dashboard: &mut Session) -> CliResult {
    let Some(id) = pick_structure(dashboard, "Move which structure?")? else {
        return Ok(());
    };
    let input: String = Input::new().with_prompt("New LAT,LON").interact_text()?;
    match parse_lat_lon(&input) {
        Ok(position) => {
            let _ = dashboard.drag_structure(id, position.lat(), position.lon());
        }
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn pick_structure(
    dashboard: &Session,
    prompt: &str,
) -> CliResult<Option<StructureId>> {
    let placements = dashboard.session().placement().placements();
    if placements.is_empty() {
        println!("Nothing placed yet.");
        return Ok(None);
    }

    let labels: Vec<String> = placements.iter().map(structure_label).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Some(placements[idx].id))
}

fn structure_label(placement: &PlacedStructure) -> String {
    format!(
        "{} at {}",
        placement.structure_type.label(),
        placement.position
    )
}

fn set_dates(dashboard: &mut Session) -> CliResult {
    let range = dashboard.session().range();
    let start: String = Input::new()
        .with_prompt("Start date (YYYY-MM-DD)")
        .default(range.start().to_string())
        .interact_text()?;
    let end: String = Input::new()
        .with_prompt("End date (YYYY-MM-DD)")
        .default(range.end().to_string())
        .interact_text()?;

    if let Ok(Some(report)) = dashboard.set_range_from_inputs(&start, &end) {
        println!("Imagery updated for {} layer(s)", report.rebuilt.len());
    }
    Ok(())
}

fn toggle_layers(dashboard: &mut Session) -> CliResult {
    let layers = dashboard.session().layers().layers();
    let labels: Vec<String> = layers
        .iter()
        .map(|l| match l.built_for_date() {
            Some(date) => format!("{} ({date})", l.descriptor().title),
            None => format!("{} (unavailable)", l.descriptor().title),
        })
        .collect();
    let visible: Vec<bool> = layers.iter().map(LayerState::is_visible).collect();
    let keys: Vec<_> = layers.iter().map(|l| l.key().clone()).collect();

    let selected = MultiSelect::new()
        .with_prompt("Visible layers (space=toggle, enter=confirm)")
        .items(&labels)
        .defaults(&visible)
        .interact()?;

    for (i, key) in keys.iter().enumerate() {
        dashboard.toggle_layer(key, selected.contains(&i));
    }
    Ok(())
}

fn show_detail(dashboard: &Session) -> CliResult {
    let rows = dashboard.rows();
    if rows.is_empty() {
        println!("No results yet. Run an analysis first.");
        return Ok(());
    }

    let labels: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                "#{} {} ({:.1}, {})",
                r.index + 1,
                r.structure_type.label(),
                r.score,
                r.score_color
            )
        })
        .collect();
    let idx = Select::new()
        .with_prompt("Which result?")
        .items(&labels)
        .default(0)
        .interact()?;
    commands::print_detail(dashboard, rows[idx].index + 1)
}
