use anyhow::{Context, anyhow, bail};
use citycast_core::{
    Config, LookupError, User, UserStore, WeatherService, source_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tracing::{info, warn};

use crate::render;

/// Non-interactive alternative to the password prompt.
const PASSWORD_ENV: &str = "CITYCAST_PASSWORD";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "citycast",
    version,
    about = "Current weather and 5-day forecasts for any city"
)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Create an account.
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,
    },

    /// Show current weather for a city, followed by its forecast.
    Current {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,

        /// Account to sign in with.
        #[arg(long)]
        email: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the 5-day forecast for a city.
    Forecast {
        city: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Signup { email, username } => signup(&config, &email, &username),
            Command::Current { city, email, json } => {
                let user = sign_in(&config, &email)?;
                show_current(&config, &user, &city, json).await
            }
            Command::Forecast { city, email, json } => {
                let user = sign_in(&config, &email)?;
                show_forecast(&config, &user, &city, json).await
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn signup(config: &Config, email: &str, username: &str) -> anyhow::Result<()> {
    let mut store = UserStore::open(config.users_file_path()?);
    let password = read_password("Password:", true)?;

    let user = store.register(email, username, &password)?;
    println!(
        "Account created for {} <{}>. You can now look up weather with --email {}.",
        user.username, user.email, user.email
    );
    Ok(())
}

fn sign_in(config: &Config, email: &str) -> anyhow::Result<User> {
    let store = UserStore::open(config.users_file_path()?);
    if !store.user_exists(email) {
        warn!(email, "sign-in for unknown account");
    }

    let password = read_password("Password:", false)?;
    store
        .authenticate(email, &password)
        .ok_or_else(|| anyhow!("Invalid email or password!"))
}

fn read_password(message: &str, confirm: bool) -> anyhow::Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }

    let mut prompt = Password::new(message).with_display_mode(PasswordDisplayMode::Masked);
    prompt = if confirm {
        prompt
            .with_custom_confirmation_message("Confirm password:")
            .with_custom_confirmation_error_message("Passwords do not match!")
    } else {
        prompt.without_confirmation()
    };

    prompt.prompt().context("Failed to read password")
}

async fn show_current(config: &Config, user: &User, city: &str, json: bool) -> anyhow::Result<()> {
    info!(email = %user.email, city, "current weather requested");
    let service = WeatherService::new(source_from_config(config)?);

    let report = service
        .lookup(city)
        .await
        .map_err(|e| lookup_failure(&e, city))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Hello, {}!\n", user.username);
        print!("{}", render::city_report(&report));
    }
    Ok(())
}

async fn show_forecast(config: &Config, user: &User, city: &str, json: bool) -> anyhow::Result<()> {
    info!(email = %user.email, city, "forecast requested");
    let service = WeatherService::new(source_from_config(config)?);

    let days = service
        .forecast(city)
        .await
        .map_err(|e| lookup_failure(&e, city))?;

    // Only used for the heading; the forecast stands on its own without it.
    let location = match service.current(city).await {
        Ok(weather) => Some(weather),
        Err(e) => {
            warn!(city, error = %e, "no current weather for forecast heading");
            None
        }
    };

    if json {
        let body = serde_json::json!({
            "city": location.as_ref().map_or(city, |w| w.city.as_str()),
            "country": location.as_ref().map_or("", |w| w.country_code.as_str()),
            "latitude": location.as_ref().map_or(0.0, |w| w.latitude),
            "longitude": location.as_ref().map_or(0.0, |w| w.longitude),
            "forecast": days,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", render::forecast_heading(location.as_ref(), city));
        print!("{}", render::forecast_table(&days));
    }
    Ok(())
}

fn lookup_failure(err: &LookupError, city: &str) -> anyhow::Error {
    warn!(city, error = %err, "weather lookup failed");
    anyhow!(err.user_message(city.trim()))
}
