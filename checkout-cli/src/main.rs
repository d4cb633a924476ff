//! Checkout CLI
//!
//! Command-line checkout against the checkout API: offline card checks,
//! amount formatting, and the full pay flow with a terminal 3-D Secure prompt.

mod challenge;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use checkout_client::{CheckoutClient, openapi::ApiDoc};
use checkout_flow::{CheckoutService, PaymentAttempt, validate_selection};
use checkout_types::{
    CardBrand, CardInfo, ChallengeWindowSize, ContinuePaymentRequest, CurrencyCode,
    DeviceDataRequest, PayPalOrderApproveEvent, PayerRequest, PaymentOutcome, PaymentSelection,
    ScreenMetrics, format_amount, is_valid_card_number, is_valid_cvv, is_valid_expiry,
};

use challenge::StdinChallenge;
use config::Config;

/// Screen reported in device data; a terminal has none of its own.
const CLI_SCREEN: ScreenMetrics = ScreenMetrics {
    width: 1280,
    height: 800,
    color_depth: 24,
};

#[derive(Parser)]
#[command(name = "checkout")]
#[command(author, version, about = "Checkout API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the checkout API
    #[arg(long, env = "CHECKOUT_API_URL")]
    api_url: Option<String>,

    /// Session token issued for the order
    #[arg(long, env = "CHECKOUT_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check card details without contacting the API
    Validate {
        #[command(subcommand)]
        check: ValidateCommands,
    },
    /// Format an amount given in minor units
    Format {
        /// Amount in minor units (cents)
        #[arg(allow_negative_numbers = true)]
        minor: i64,
        /// ISO 4217 currency code
        currency: String,
    },
    /// List currencies with a known symbol
    Currencies,
    /// Show an order
    Order {
        /// Order ID
        id: String,
    },
    /// Pay for an order
    Pay {
        #[command(subcommand)]
        method: PayCommands,
    },
    /// Resume an order with packed 3-D Secure authentication data
    Continue {
        /// Order ID
        order: String,
        #[arg(long)]
        payload: String,
    },
    /// Relay a PayPal approval result (APPROVE, CANCEL, ERROR)
    Paypal {
        /// Order ID
        order: String,
        #[arg(long)]
        event: PayPalOrderApproveEvent,
    },
    /// Print the OpenAPI document of the checkout API
    Schema,
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum ValidateCommands {
    /// Check a card number (length and Luhn checksum)
    Card { number: String },
    /// Check a security code
    Cvv { cvv: String },
    /// Check an expiry date against the current month
    Expiry { month: u8, year: u16 },
}

#[derive(Args)]
struct PayArgs {
    /// Order ID
    order: String,
    /// 3-D Secure challenge window (e.g. FULL_SCREEN, SIZE_390_X_400)
    #[arg(long)]
    window: Option<ChallengeWindowSize>,
    /// Payer email
    #[arg(long)]
    email: Option<String>,
    /// Where the payer lands after an external redirect
    #[arg(long)]
    return_url: Option<String>,
    /// Print the request body instead of sending it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum PayCommands {
    /// Pay with a new card
    Card {
        #[command(flatten)]
        common: PayArgs,
        #[arg(long)]
        number: String,
        #[arg(long)]
        expiry_month: u8,
        /// Two or four digits
        #[arg(long)]
        expiry_year: u16,
        #[arg(long)]
        cvv: String,
        #[arg(long)]
        cardholder: Option<String>,
        /// Save the card under this name
        #[arg(long)]
        save_as: Option<String>,
    },
    /// Pay with a saved card
    Binding {
        #[command(flatten)]
        common: PayArgs,
        #[arg(long)]
        binding_id: String,
        #[arg(long)]
        cvv: Option<String>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,checkout_flow=info,checkout_client=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_client(config: &Config) -> Result<CheckoutClient> {
    let mut client = CheckoutClient::new(&config.api_url).with_timeout(config.request_timeout)?;
    if let Some(token) = &config.session_token {
        client = client.with_session_token(token);
    }
    Ok(client)
}

fn build_service(config: &Config) -> Result<CheckoutService<CheckoutClient, StdinChallenge>> {
    Ok(CheckoutService::new(
        build_client(config)?,
        StdinChallenge::new(config.challenge_timeout),
    ))
}

/// Returns whether the value passed, with a line describing it.
fn check(check: ValidateCommands) -> (bool, String) {
    match check {
        ValidateCommands::Card { number } => {
            let valid = is_valid_card_number(&number);
            let brand = CardBrand::detect(&number);
            (valid, format!("card number ({brand})"))
        }
        ValidateCommands::Cvv { cvv } => (is_valid_cvv(&cvv), "security code".to_string()),
        ValidateCommands::Expiry { month, year } => {
            let today = chrono::Local::now().date_naive();
            (
                is_valid_expiry(month, year, today),
                format!("expiry date {month:02}/{year}"),
            )
        }
    }
}

fn attempt_from(method: PayCommands, language: &str) -> (PayArgs, PaymentAttempt) {
    let (common, selection) = match method {
        PayCommands::Card {
            common,
            number,
            expiry_month,
            expiry_year,
            cvv,
            cardholder,
            save_as,
        } => {
            let mut card = CardInfo::new(number, expiry_month, expiry_year, cvv);
            if let Some(name) = cardholder {
                card = card.with_cardholder(name);
            }
            (common, PaymentSelection::NewCard { card, save_as })
        }
        PayCommands::Binding {
            common,
            binding_id,
            cvv,
        } => (common, PaymentSelection::SavedCard { binding_id, cvv }),
    };

    let user_agent = format!("checkout-cli/{}", env!("CARGO_PKG_VERSION"));
    let device = DeviceDataRequest::new(user_agent, language, CLI_SCREEN);
    let mut attempt = PaymentAttempt::new(selection, device);
    if let Some(window) = common.window {
        attempt = attempt.with_challenge_window_size(window);
    }
    if let Some(email) = common.email.clone() {
        attempt = attempt.with_payer(PayerRequest {
            email: Some(email),
            ..Default::default()
        });
    }
    if let Some(url) = common.return_url.clone() {
        attempt = attempt.with_return_url(url);
    }
    (common, attempt)
}

fn print_outcome(outcome: &PaymentOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    if let Some(url) = outcome.redirect_url() {
        eprintln!("Open {url} to continue");
    }
    if let Some(reason) = &outcome.decline_reason {
        eprintln!("Declined: {reason}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    init_tracing(config.log_json);
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(token) = cli.session_token {
        config.session_token = Some(token);
    }
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    match cli.command {
        Commands::Validate { check: what } => {
            let (valid, subject) = check(what);
            if valid {
                println!("✓ valid {subject}");
            } else {
                println!("✗ invalid {subject}");
                std::process::exit(1);
            }
        }

        Commands::Format { minor, currency } => {
            println!("{}", format_amount(minor, &currency));
        }

        Commands::Currencies => {
            for code in CurrencyCode::all() {
                println!("{}  {:<3}  {}", code.code(), code.symbol(), code.name());
            }
        }

        Commands::Schema => {
            println!("{}", ApiDoc::openapi().to_pretty_json()?);
        }

        Commands::Health => {
            let healthy = build_client(&config)?.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Order { id } => {
            let order = build_service(&config)?.load_order(&id).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
            eprintln!("Total: {}", order.amount);
        }

        Commands::Pay { method } => {
            let (common, attempt) = attempt_from(method, &config.language);
            if common.dry_run {
                validate_selection(&attempt.selection, chrono::Local::now().date_naive())?;
                println!("{}", serde_json::to_string_pretty(&attempt.into_request())?);
            } else {
                let outcome = build_service(&config)?.pay(&common.order, attempt).await?;
                print_outcome(&outcome)?;
            }
        }

        Commands::Continue { order, payload } => {
            let outcome = build_client(&config)?
                .continue_payment(&order, &ContinuePaymentRequest::challenge_completed(payload))
                .await?;
            print_outcome(&outcome)?;
        }

        Commands::Paypal { order, event } => {
            let outcome = build_service(&config)?.resume_pay_pal(&order, event).await?;
            print_outcome(&outcome)?;
        }
    }

    Ok(())
}
