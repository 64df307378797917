//! One-shot provider lookups: no session, no layers.

use lithocore_core::{AppConfig, MineralSummary, NormalizedLocality};
use lithocore_mindat::{normalize_locality, MindatClient};

/// Builds the client and refuses to continue without a credential, so a
/// missing key exits non-zero before any request.
pub(crate) fn client_with_credential(config: &AppConfig) -> anyhow::Result<MindatClient> {
    let client = MindatClient::from_config(config)?;
    if !client.has_credential() {
        anyhow::bail!("MINDAT_API_KEY is not configured");
    }
    Ok(client)
}

pub(crate) fn format_minerals(minerals: &[MineralSummary]) -> String {
    if minerals.is_empty() {
        return "no minerals found\n".to_string();
    }
    minerals
        .iter()
        .map(|mineral| match &mineral.formula {
            Some(formula) => format!("{:>7}  {}  [{formula}]\n", mineral.id, mineral.name),
            None => format!("{:>7}  {}\n", mineral.id, mineral.name),
        })
        .collect()
}

fn locality_line(locality: &NormalizedLocality) -> String {
    match locality.coordinate {
        Some(c) => format!(
            "{:>8}  {:<40} {:>9.4} {:>9.4}\n",
            locality.id,
            locality.name,
            c.latitude(),
            c.longitude()
        ),
        None => format!("{:>8}  {:<40} (no coordinates)\n", locality.id, locality.name),
    }
}

pub(crate) fn format_localities(localities: &[NormalizedLocality]) -> String {
    let placeable = localities.iter().filter(|l| l.is_placeable()).count();
    let mut out: String = localities.iter().map(locality_line).collect();
    out.push_str(&format!(
        "{} localities, {placeable} with coordinates\n",
        localities.len()
    ));
    out
}

pub(crate) async fn run_minerals(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let client = client_with_credential(config)?;
    let minerals = client.search_geomaterials(query).await?;
    print!("{}", format_minerals(&minerals));
    Ok(())
}

pub(crate) async fn run_localities(config: &AppConfig, mineral_id: i64) -> anyhow::Result<()> {
    let client = client_with_credential(config)?;
    let localities: Vec<NormalizedLocality> = client
        .fetch_localities_by_id(mineral_id)
        .await?
        .iter()
        .map(normalize_locality)
        .collect();
    print!("{}", format_localities(&localities));
    Ok(())
}
