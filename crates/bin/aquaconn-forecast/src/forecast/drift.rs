use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};

use aquaconn_core::site::SiteTable;
use aquaconn_output::seeds::SeedWriter;
use aquaconn_output::writer::ResultWriter;

use crate::forecast::config::{DriftCommand, DriftSettings};
use crate::forecast::error::{AppError, Result};

/// Writes one seed row per site for the drift simulator.
pub(crate) fn write_seed_file(
    settings: &DriftSettings,
    sites: &SiteTable,
    start_time: DateTime<Utc>,
) -> Result<()> {
    let mut writer = SeedWriter::new(&settings.seed_file)?;
    writer.add_sites(
        sites,
        settings.particles_per_site,
        settings.seed_radius,
        start_time,
    );
    writer.write_to_file()?;
    writer.close_file()?;
    info!(
        "Seeded {} particles at each of {} sites in {}",
        settings.particles_per_site,
        sites.len(),
        settings.seed_file.display()
    );
    Ok(())
}

/// Substitutes the run parameters into the simulator arguments.
pub(crate) fn expand_args(
    command: &DriftCommand,
    settings: &DriftSettings,
    start_time: DateTime<Utc>,
) -> Vec<String> {
    let replacements = [
        ("{seed_file}", settings.seed_file.display().to_string()),
        ("{trajectory_file}", settings.trajectory_file.display().to_string()),
        (
            "{start_time}",
            start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        ("{duration_hours}", settings.duration_hours.to_string()),
        ("{time_step_seconds}", settings.time_step_seconds.to_string()),
    ];
    command
        .args
        .iter()
        .map(|arg| {
            replacements
                .iter()
                .fold(arg.clone(), |arg, (placeholder, value)| {
                    arg.replace(placeholder, value)
                })
        })
        .collect()
}

/// Runs the external drift simulator and waits for it. A failing simulator is fatal since
/// there are no trajectories without it.
pub(crate) fn run_simulator(
    command: &DriftCommand,
    settings: &DriftSettings,
    start_time: DateTime<Utc>,
) -> Result<()> {
    let args = expand_args(command, settings, start_time);
    info!(
        "Running drift simulation from {} for {} h: {} {}",
        start_time,
        settings.duration_hours,
        command.program,
        args.join(" ")
    );
    let output = Command::new(&command.program)
        .args(&args)
        .output()
        .map_err(|source| AppError::SimulatorStart {
            program: command.program.clone(),
            source,
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("simulator: {}", line);
    }
    if !output.status.success() {
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("simulator: {}", line);
        }
        return Err(AppError::SimulatorFailed {
            program: command.program.clone(),
            status: output.status.to_string(),
        });
    }
    if !settings.trajectory_file.exists() {
        warn!(
            "Simulator finished but {} does not exist",
            settings.trajectory_file.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;

    use super::*;

    fn settings() -> DriftSettings {
        DriftSettings {
            particles_per_site: 100,
            duration_hours: 24,
            time_step_seconds: 600,
            seed_radius: 10.0,
            seed_file: PathBuf::from("/run/seeds.csv"),
            trajectory_file: PathBuf::from("/run/trajectories.parquet"),
            command: None,
        }
    }

    #[test]
    fn test_placeholders_are_substituted() {
        let command = DriftCommand {
            program: "python3".to_string(),
            args: vec![
                "drift.py".to_string(),
                "--seeds={seed_file}".to_string(),
                "{trajectory_file}".to_string(),
                "{start_time}".to_string(),
                "{duration_hours}h/{time_step_seconds}s".to_string(),
            ],
        };
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            expand_args(&command, &settings(), start),
            vec![
                "drift.py",
                "--seeds=/run/seeds.csv",
                "/run/trajectories.parquet",
                "2024-05-01T12:00:00Z",
                "24h/600s",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_simulator_is_an_error() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let failing = DriftCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 3".to_string()],
        };
        assert!(matches!(
            run_simulator(&failing, &settings(), start),
            Err(AppError::SimulatorFailed { .. })
        ));

        let missing = DriftCommand {
            program: "/nonexistent/drift-simulator".to_string(),
            args: Vec::new(),
        };
        assert!(matches!(
            run_simulator(&missing, &settings(), start),
            Err(AppError::SimulatorStart { .. })
        ));
    }
}
