#![allow(clippy::result_large_err)]

use crew_payroll::{
    config::{self, database},
    core::{draft::PayrollSession, report},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: crew-payroll <period_id> [--finalize]";
const DEFAULT_CONFIG_PATH: &str = "payroll.toml";

struct Args {
    period_id: i64,
    finalize: bool,
}

fn parse_args() -> Result<Args> {
    let mut period_id = None;
    let mut finalize = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--finalize" => finalize = true,
            value => {
                let id = value.parse::<i64>().map_err(|_| Error::InvalidInput {
                    message: format!("invalid period id {value:?}; {USAGE}"),
                })?;
                period_id = Some(id);
            }
        }
    }

    let period_id = period_id.ok_or_else(|| Error::InvalidInput {
        message: USAGE.to_string(),
    })?;
    Ok(Args {
        period_id,
        finalize,
    })
}

fn config_path() -> Result<String> {
    match env::var("PAYROLL_CONFIG") {
        Ok(path) => Ok(path),
        Err(env::VarError::NotPresent) => Ok(DEFAULT_CONFIG_PATH.to_string()),
        Err(e) => Err(Error::EnvVar(e)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let args = parse_args().inspect_err(|e| error!("{}", e))?;

    // 3. Load payroll policy
    let payroll_config = config::load_config_or_default(config_path()?)
        .inspect_err(|e| error!("Failed to load payroll configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Generate the draft and show it
    let mut session = PayrollSession::new(args.period_id);
    session.generate(&db, &payroll_config).await?;
    info!("Draft for period {}:\n{}", args.period_id, report::format_draft_summary(&session));

    for row in session.flagged_rows() {
        warn!("Review {}: {}", row.full_name, report::format_draft_row(row));
    }

    // 6. Seal it if asked to
    if args.finalize {
        let summary = session
            .finalize(&db)
            .await
            .inspect_err(|e| error!("Finalization failed, nothing was written: {}", e))?;
        info!(
            "Period {} finalized: {} records, {} loan repayments",
            summary.period_id, summary.records, summary.repayments
        );
    } else {
        info!("Dry run; pass --finalize to write payroll records");
    }

    Ok(())
}
