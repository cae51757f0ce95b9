use std::fmt::Write;

use chrono::{Datelike, NaiveDate};
use log::{info, warn};

use aquaconn_core::distance::DistanceTable;
use aquaconn_core::matrix::ConnectivityMatrix;
use aquaconn_core::site::{Site, SiteId, SiteTable};
use aquaconn_core::trajectory::EpochSeconds;
use aquaconn_input::distances::DistanceReader;
use aquaconn_input::sites::SiteReader;
use aquaconn_output::matrix::{write_matrix_file, MatrixLabels};

use crate::report::config::Config;
use crate::report::enrich::{connect, fish_health, FishHealth};
use crate::report::error::{AppError, Result};
use crate::report::queries::{
    closest_sites, connectivity_submatrix, simulation_window, track_totals, tracks_for,
    ClosestSites,
};
use crate::report::sources::DataLoader;

/// Everything shown for one selected site.
#[derive(Debug)]
pub(crate) struct Report {
    pub site: Site,
    pub closest: ClosestSites,
    pub connectivity: ConnectivityMatrix,
    pub window: Option<(EpochSeconds, EpochSeconds)>,
    /// Trajectories and active points per closest site.
    pub tracks: Vec<(SiteId, usize, usize)>,
    pub fish_health: Option<FishHealth>,
    pub notices: Vec<String>,
}

pub(crate) struct ReportBuilder {
    config: Config,
    sites: SiteTable,
    distances: DistanceTable,
}

impl ReportBuilder {
    pub(crate) fn new(config: Config) -> Result<Self> {
        let sites = SiteReader::builder()
            .file_path(&config.site_settings.site_file)
            .build()
            .read()?;
        let distances = match &config.site_settings.distances_file {
            Some(distances_file) => DistanceReader::builder()
                .file_path(distances_file)
                .build()
                .read()?,
            None => DistanceTable::from_sites(&sites),
        };
        Ok(Self {
            config,
            sites,
            distances,
        })
    }

    pub(crate) fn sites(&self) -> &SiteTable {
        &self.sites
    }

    /// Site choices as `name (id)`, sorted by name.
    pub(crate) fn site_choices(&self) -> Vec<String> {
        self.sites
            .sorted_by_name()
            .iter()
            .map(|site| format!("{} ({})", site.name, site.id))
            .collect()
    }

    pub(crate) fn build(&self, site_id: SiteId, today: NaiveDate) -> Result<Report> {
        let settings = &self.config.report_settings;
        let data = &self.config.data_settings;
        let site = self
            .sites
            .get(site_id)
            .cloned()
            .ok_or(AppError::UnknownSite(site_id))?;
        info!("Building the report for {} ({})", site.name, site.id);

        let mut notices = Vec::new();
        let mut sources = vec![&data.connectivity];
        sources.extend(data.trajectories.iter());
        let loader = DataLoader::connect(&sources, &mut notices)?;

        let closest = closest_sites(&self.distances, &self.sites, site_id, settings.closest_count)?;
        let matrix = loader.connectivity(&data.connectivity)?;
        let connectivity = connectivity_submatrix(&matrix, &closest.ids)?;
        if let Some(submatrix_file) = &settings.submatrix_file {
            write_matrix_file(submatrix_file, &connectivity, &self.sites, MatrixLabels::SiteName)?;
            info!("Wrote neighbourhood connectivity to {}", submatrix_file.display());
        }

        let (window, tracks) = match &data.trajectories {
            Some(source) => {
                let dataset = loader.trajectories(source)?;
                let tracks = tracks_for(&dataset, &closest.ids);
                (simulation_window(&dataset), track_totals(&tracks, &closest.ids))
            }
            None => {
                warn!("No trajectory source configured, the simulation window is unknown");
                (None, Vec::new())
            }
        };

        let fish_health = if settings.fish_health {
            connect(&mut notices).map(|client| {
                let year = settings.year.unwrap_or_else(|| today.year());
                fish_health(&client, site_id, &closest.ids, year, today, &mut notices)
            })
        } else {
            None
        };

        Ok(Report {
            site,
            closest,
            connectivity,
            window,
            tracks,
            fish_health,
            notices,
        })
    }
}

impl Report {
    /// Plain-text rendering of the report.
    pub(crate) fn render(&self, sites: &SiteTable) -> String {
        let mut text = String::new();
        self.write_to(&mut text, sites)
            .map(|()| text)
            .unwrap_or_default()
    }

    fn write_to(&self, out: &mut String, sites: &SiteTable) -> std::fmt::Result {
        let name_of = |site_id: &SiteId| {
            sites
                .name_of(*site_id)
                .map(str::to_string)
                .unwrap_or_else(|| site_id.to_string())
        };

        writeln!(out, "Site: {} ({})", self.site.name, self.site.id)?;
        writeln!(
            out,
            "Position: {:.5} E, {:.5} N",
            self.site.position.lon, self.site.position.lat
        )?;
        match self.window {
            Some((start, end)) => {
                writeln!(out, "Simulation start time: {}", start)?;
                writeln!(out, "Simulation end time: {}", end)?;
            }
            None => writeln!(out, "Simulation window: unknown")?,
        }

        writeln!(out, "\nClosest sites:")?;
        for (rank, site_id) in self.closest.ids.iter().enumerate() {
            let fallow = self
                .fish_health
                .as_ref()
                .and_then(|health| {
                    health
                        .fallow
                        .iter()
                        .find(|(id, _)| id == site_id)
                        .and_then(|(_, fallow)| *fallow)
                })
                .map(|fallow| if fallow { " (fallow)" } else { "" })
                .unwrap_or_default();
            writeln!(out, "{:>3}. {} ({}){}", rank + 1, name_of(site_id), site_id, fallow)?;
        }

        writeln!(out, "\nPotential site connectivity (%), rows receive from columns:")?;
        let labels: Vec<String> = self.connectivity.site_ids().iter().map(name_of).collect();
        let width = column_width(&labels);
        write!(out, "{:width$}", "", width = width)?;
        for label in labels.iter() {
            write!(out, " {:>width$}", label, width = width)?;
        }
        writeln!(out)?;
        for (row, site_id) in self.connectivity.site_ids().iter().enumerate() {
            write!(out, "{:width$}", labels[row], width = width)?;
            for value in self.connectivity.row(*site_id).unwrap_or_default() {
                if *value > 0.0 {
                    write!(out, " {:>width$.1}", value, width = width)?;
                } else {
                    write!(out, " {:>width$}", "-", width = width)?;
                }
            }
            writeln!(out)?;
        }

        if !self.tracks.is_empty() {
            writeln!(out, "\nParticle tracks:")?;
            for (origin, trajectories, points) in self.tracks.iter() {
                writeln!(
                    out,
                    "  {}: {} trajectories, {} active points",
                    name_of(origin),
                    trajectories,
                    points
                )?;
            }
        }

        if let Some(health) = &self.fish_health {
            writeln!(out, "\nSea temperature and lice, {}:", health.year)?;
            if !health.has_temperature() {
                writeln!(out, "  No data")?;
            }
            for week in health.temperature.iter() {
                let lice = health
                    .lice
                    .data
                    .iter()
                    .find(|lice| lice.week == week.week)
                    .and_then(|lice| lice.value);
                writeln!(
                    out,
                    "  week {:>2}: {} C, {} lice",
                    week.week,
                    format_value(week.sea_temperature),
                    format_value(lice)
                )?;
            }
        }

        if !self.notices.is_empty() {
            writeln!(out, "\nNotices:")?;
            for notice in self.notices.iter() {
                writeln!(out, "  {}", notice)?;
            }
        }
        Ok(())
    }
}

fn format_value(value: Option<f64>) -> String {
    value
        .map(|value| format!("{:.2}", value))
        .unwrap_or_else(|| "-".to_string())
}

/// Padding counts chars, so names with non-ASCII letters are measured in chars too.
fn column_width(labels: &[String]) -> usize {
    labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        .max(6)
}
