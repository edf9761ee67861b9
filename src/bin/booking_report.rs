use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ritual_booking_service::{
    bootstrap,
    commands::{account::LoginRequest, availability::ListAvailabilitiesRequest},
    config::BookingConfig,
    views::{ListAllAppointmentsRequest, ListMyAppointmentsRequest},
};
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

/// Print the appointments visible to a user
#[derive(Parser, Debug)]
#[command(name = "booking-report", version)]
struct Cli {
    /// TOML config file. Falls back to BOOKING_CONFIG and the BOOKING_* variables.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    /// Also print published availabilities
    #[arg(long)]
    availabilities: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => BookingConfig::load(path)?,
        None => BookingConfig::from_env()?,
    };
    let services = bootstrap::build(&config).context("failed to start booking services")?;

    let actor = services
        .booking
        .clone()
        .oneshot(LoginRequest {
            email: cli.email,
            password: cli.password,
        })
        .await
        .context("login failed")?;

    let appointments = if actor.is_admin() {
        services
            .booking
            .clone()
            .oneshot(ListAllAppointmentsRequest { actor: Some(actor) })
            .await?
    } else {
        services
            .booking
            .clone()
            .oneshot(ListMyAppointmentsRequest { actor: Some(actor) })
            .await?
    };

    for entry in &appointments {
        println!(
            "#{:<4} {}  {:<10} {:<24} {} ({} min)",
            entry.appointment.id,
            entry.appointment.slot,
            entry.appointment.status,
            entry.client_name,
            entry.ritual_name,
            entry.ritual_duration,
        );
    }

    if cli.availabilities {
        let availabilities = services
            .booking
            .oneshot(ListAvailabilitiesRequest)
            .await?;
        println!();
        for availability in availabilities {
            println!(
                "open {}  {}",
                availability.slot,
                availability.note.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}
