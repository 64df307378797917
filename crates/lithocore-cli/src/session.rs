//! Session-driven commands that print to the terminal.

use std::path::Path;
use std::time::Duration;

use lithocore_core::{AppConfig, Category};
use lithocore_layers::{
    seed_authored_layers, Bounds, LayerSnapshot, LexiconClassifier, Notice, NoticeLevel,
    RenderSurface, SearchController, SearchMode, SearchOptions, SessionStatus,
};
use lithocore_mindat::{LocalityFilters, MindatClient};

use crate::lookup::client_with_credential;

/// Prints notices as they arrive. The trigger has no terminal counterpart
/// beyond a debug log.
#[derive(Debug, Default)]
pub(crate) struct TerminalSurface {
    pub(crate) printed: Vec<String>,
    echo: bool,
}

impl TerminalSurface {
    fn echoing() -> Self {
        Self {
            printed: Vec::new(),
            echo: true,
        }
    }

    fn emit(&mut self, line: String) {
        if self.echo {
            eprintln!("{line}");
        }
        self.printed.push(line);
    }
}

impl RenderSurface for TerminalSurface {
    fn notify(&mut self, notice: Notice) {
        let prefix = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        self.emit(format!("{prefix}: {}", notice.message));
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        tracing::debug!(enabled, "search trigger toggled");
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.emit(format!(
            "view: {:.4},{:.4} .. {:.4},{:.4}",
            bounds.south, bounds.west, bounds.north, bounds.east
        ));
    }

    fn show_layer(&mut self, category: Category) {
        self.emit(format!("showing layer {category}"));
    }
}

pub(crate) fn format_layers(layers: &[LayerSnapshot]) -> String {
    layers
        .iter()
        .map(|layer| {
            let marker = if layer.visible { "x" } else { " " };
            format!(
                "[{marker}] {:<14} {:<24} {:>5}\n",
                layer.category.as_str(),
                layer.label,
                layer.count
            )
        })
        .collect()
}

fn options_from(config: &AppConfig, country: Option<String>, mode: SearchMode) -> SearchOptions {
    SearchOptions {
        mode,
        filters: LocalityFilters {
            country: country.or_else(|| config.search_country.clone()),
            ..LocalityFilters::default()
        },
        deadline: Duration::from_secs(config.session_deadline_secs),
    }
}

fn controller(
    client: MindatClient,
    options: SearchOptions,
) -> SearchController<MindatClient, LexiconClassifier> {
    SearchController::new(client, LexiconClassifier, options)
}

fn finish(status: SessionStatus) -> anyhow::Result<()> {
    if status == SessionStatus::Failed {
        anyhow::bail!("search session failed");
    }
    Ok(())
}

pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    results_only: bool,
    country: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let client = client_with_credential(config)?;
    let mode = if results_only {
        SearchMode::ResultsOnly
    } else {
        SearchMode::Classified
    };
    let mut controller = controller(client, options_from(config, country, mode));
    let mut surface = TerminalSurface::echoing();

    let report = controller.submit(query, &mut surface).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(description) = &report.mineral_description {
            println!("{description}\n");
        }
        print!("{}", format_layers(&controller.registry().snapshot()));
    }
    finish(report.status)
}

pub(crate) async fn run_select(
    config: &AppConfig,
    mineral_id: i64,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let client = client_with_credential(config)?;
    let mut controller = controller(client, options_from(config, None, SearchMode::ResultsOnly));
    let mut surface = TerminalSurface::echoing();
    let name = name.map_or_else(|| format!("Mineral #{mineral_id}"), str::to_string);

    let report = controller
        .select_mineral(mineral_id, &name, &mut surface)
        .await;

    for marker in controller.registry().bucket(Category::SearchResult) {
        match &marker.route_link {
            Some(link) => println!("{}  {link}", marker.title),
            None => println!("{}", marker.title),
        }
    }
    finish(report.status)
}

pub(crate) async fn run_warm(config: &AppConfig) -> anyhow::Result<()> {
    let client = client_with_credential(config)?;
    let options = options_from(config, None, SearchMode::Classified);
    let filters = options.filters.clone();
    let mut controller = controller(client, options);

    let sites = lithocore_core::load_sites_or_default(&config.sites_path)?;
    seed_authored_layers(controller.registry_mut(), &sites);
    let report = controller
        .warm_load(&config.default_minerals, &filters)
        .await;

    for (mineral, reason) in &report.failed {
        eprintln!("warning: {mineral} skipped: {reason}");
    }
    print!("{}", format_layers(&controller.registry().snapshot()));
    Ok(())
}

pub(crate) fn run_sites(path: &Path) -> anyhow::Result<()> {
    let sites = lithocore_core::load_sites(path)?;
    println!(
        "{}: {} sites, {} zones",
        path.display(),
        sites.sites.len(),
        sites.zones.len()
    );
    Ok(())
}
