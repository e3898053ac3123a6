//! Orchestrator CLI
//!
//! Runs the routing and settlement components against a provider catalogue
//! and prints the results as JSON.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use orchestrator_core::{
    AttemptPlanner, CurrencyRules, FraudLimitPolicy, MethodEligibility, ProviderErrorNormalizer,
    ProviderSelector, SettlementStepCalculator,
};
use orchestrator_repo::{load_catalog, load_operation};
use orchestrator_types::{
    AttemptRequest, Catalog, CountryCode, CurrencyCode, Environment, MethodId, PriceTier,
    ProfileClass, ProviderId, ProviderRole,
};

#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(author, version, about = "Payment orchestration CLI", long_about = None)]
struct Cli {
    /// Provider catalogue (JSON); overrides ORCHESTRATOR_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Execution environment; overrides ORCHESTRATOR_ENV
    #[arg(long, global = true)]
    env: Option<Environment>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured providers
    Providers,
    /// List payment methods, or detect one from a card number
    Methods {
        #[arg(long)]
        card: Option<String>,
    },
    /// List purchase items with prices for a tier
    Items {
        #[arg(long, default_value = "mid")]
        tier: PriceTier,
    },
    /// Candidate providers for an attempt
    Select {
        #[arg(long, default_value = "main")]
        role: ProviderRole,
        #[arg(long)]
        currency: CurrencyCode,
        #[arg(long)]
        method: String,
        #[arg(long)]
        country: CountryCode,
    },
    /// Whether a provider offers a method in a country
    Eligibility {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        method: String,
        #[arg(long)]
        country: CountryCode,
    },
    /// Fraud decision for an amount
    Fraud {
        #[arg(long)]
        provider: String,
        #[arg(long, default_value = "default")]
        profile: ProfileClass,
        #[arg(long)]
        amount: Decimal,
    },
    /// Normalize a provider decline code
    Normalize {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        code: String,
    },
    /// Convert a decimal amount to provider minor units
    Minor {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        currency: CurrencyCode,
        #[arg(long)]
        amount: Decimal,
    },
    /// Convert provider minor units back to a decimal amount
    Decimal {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        currency: CurrencyCode,
        #[arg(long, allow_negative_numbers = true)]
        minor: i64,
    },
    /// Build an attempt plan, optionally following a decline
    Plan {
        #[arg(long)]
        currency: CurrencyCode,
        /// Method id; detected from --card when omitted
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        card: Option<String>,
        #[arg(long)]
        country: CountryCode,
        #[arg(long, default_value = "default")]
        profile: ProfileClass,
        #[arg(long)]
        amount: Decimal,
        /// Provider that declined
        #[arg(long, requires = "code")]
        declined_by: Option<String>,
        /// Raw decline code returned by --declined-by
        #[arg(long, requires = "declined_by")]
        code: Option<String>,
    },
    /// Step amount and fee ledger of an operation snapshot
    Settlement {
        /// Operation snapshot (JSON)
        #[arg(long)]
        operation: PathBuf,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,orchestrator_core=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn print_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn resolve_method(
    catalog: &Catalog,
    method: Option<String>,
    card: Option<String>,
) -> Result<MethodId> {
    match (method, card) {
        (Some(method), _) => Ok(MethodId::new(method)),
        (None, Some(card)) => catalog
            .detect_method(&card)
            .map(|m| m.id.clone())
            .ok_or_else(|| anyhow::anyhow!("No active method accepts this card number")),
        (None, None) => anyhow::bail!("Either --method or --card is required"),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = config::Config::from_env()?.with_overrides(cli.config, cli.env);
    let catalog = Arc::new(
        load_catalog(&config.catalog_path)
            .with_context(|| format!("Loading {}", config.catalog_path.display()))?,
    );
    tracing::info!(
        path = %config.catalog_path.display(),
        environment = %config.environment,
        "catalogue ready"
    );

    match cli.command {
        Commands::Providers => {
            let providers: Vec<Value> = catalog
                .providers()
                .iter()
                .map(|p| {
                    json!({
                        "id": p.id,
                        "name": p.name,
                        "role": p.role,
                        "is_active": p.is_active,
                        "environments": p.environments,
                        "runs_here": p.runs_in(config.environment),
                        "methods": p.methods.methods().collect::<Vec<_>>(),
                    })
                })
                .collect();
            print_json(json!(providers))?;
        }
        Commands::Methods { card } => {
            let methods: Vec<Value> = match card {
                Some(card) => catalog
                    .detect_method(&card)
                    .into_iter()
                    .map(method_json)
                    .collect(),
                None => catalog.methods().map(method_json).collect(),
            };
            print_json(json!(methods))?;
        }
        Commands::Items { tier } => {
            let items: Vec<Value> = catalog
                .purchase_items()
                .iter()
                .map(|item| {
                    json!({
                        "id": item.id,
                        "days": item.days,
                        "is_primary": item.is_primary,
                        "price_usd": item.price(tier),
                        "daily_price_usd": item.daily_price(tier),
                    })
                })
                .collect();
            print_json(json!(items))?;
        }
        Commands::Select {
            role,
            currency,
            method,
            country,
        } => {
            let selector = ProviderSelector::new(catalog.clone());
            let method = MethodId::new(method);
            let selected: Vec<Value> = selector
                .select(role, config.environment, &currency, &method, &country)
                .iter()
                .map(|s| json!({ "provider": s.provider.id, "eligibility": s.eligibility }))
                .collect();
            print_json(json!(selected))?;
        }
        Commands::Eligibility {
            provider,
            method,
            country,
        } => {
            let eligibility = MethodEligibility::new(catalog.clone()).is_offered(
                &ProviderId::new(provider),
                &MethodId::new(method),
                &country,
            );
            print_json(json!({ "eligibility": eligibility }))?;
        }
        Commands::Fraud {
            provider,
            profile,
            amount,
        } => {
            let decision = FraudLimitPolicy::new(catalog.clone()).evaluate(
                &ProviderId::new(provider),
                profile,
                amount,
            );
            print_json(json!({ "decision": decision }))?;
        }
        Commands::Normalize { provider, code } => {
            let decline = ProviderErrorNormalizer::new(catalog.clone())
                .normalize(&ProviderId::new(provider), &code);
            print_json(serde_json::to_value(decline)?)?;
        }
        Commands::Minor {
            provider,
            currency,
            amount,
        } => {
            let rules = CurrencyRules::new(catalog.clone());
            let provider = ProviderId::new(provider);
            let minor = rules.to_minor_units(&provider, &currency, amount)?;
            print_json(json!({
                "minor_units": minor,
                "multiplier": rules.multiplier(&provider, &currency)?,
            }))?;
        }
        Commands::Decimal {
            provider,
            currency,
            minor,
        } => {
            let amount = CurrencyRules::new(catalog.clone()).to_decimal(
                &ProviderId::new(provider),
                &currency,
                minor,
            )?;
            print_json(json!({ "amount": amount }))?;
        }
        Commands::Plan {
            currency,
            method,
            card,
            country,
            profile,
            amount,
            declined_by,
            code,
        } => {
            let request = AttemptRequest {
                environment: config.environment,
                currency,
                method: resolve_method(&catalog, method, card)?,
                country,
                profile,
                amount,
            };
            let planner = AttemptPlanner::new(catalog.clone());
            let plan = planner.plan(&request)?;
            let follow_up = match (declined_by, code) {
                (Some(provider), Some(code)) => Some(serde_json::to_value(planner.after_decline(
                    &plan,
                    &ProviderId::new(provider),
                    &code,
                )?)?),
                _ => None,
            };
            print_json(json!({ "plan": plan, "after_decline": follow_up }))?;
        }
        Commands::Settlement { operation } => {
            let operation = load_operation(&operation)?;
            let view = SettlementStepCalculator::new().view(&operation);
            print_json(serde_json::to_value(view)?)?;
        }
    }

    Ok(())
}

fn method_json(method: &orchestrator_types::PaymentMethod) -> Value {
    json!({
        "id": method.id,
        "name": method.name,
        "logo": method.logo,
        "is_active": method.is_active,
    })
}
