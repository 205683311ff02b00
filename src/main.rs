//! nerium - run SQL query files against environment-configured backends.

use anyhow::Context;
use nerium_contrib::cli::{to_query_params, Cli, Command, OutputFormat};
use nerium_contrib::config::BackendConfig;
use nerium_contrib::formatter::{
    isoformat, AffixFormatter, Clock, DefaultFormatter, RequestContext, ResultFormatter,
    SystemClock,
};
use nerium_contrib::logging;
use nerium_contrib::queryable::{load_query, parse_backend_code, Queryable, TakeiQueryable};
use nerium_contrib::schema::{ResultPayload, ResultSchema};
use nerium_contrib::NeriumError;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        match e.downcast_ref::<NeriumError>() {
            Some(err) => error!("{}: {}", err.category(), err),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let config = Arc::new(BackendConfig::load_with(cli.env_file.as_deref())?);
    let queryable = TakeiQueryable::new(Arc::clone(&config));

    match cli.command {
        Command::Run {
            query_file,
            params,
            query_string,
            format,
        } => {
            let sql = load_query(&query_file)
                .with_context(|| format!("Failed to load query file {}", query_file.display()))?;
            let identifier = query_file.to_string_lossy();
            info!(
                "Running {} on backend '{}'",
                identifier,
                parse_backend_code(&identifier)
            );

            let rows = queryable
                .results(&identifier, &sql, &to_query_params(&params))
                .await?;
            let request = RequestContext::from_query_string(&query_string);

            let output = match format {
                OutputFormat::Default => {
                    serde_json::to_string_pretty(&DefaultFormatter::new(rows).format_results(&request))?
                }
                OutputFormat::Affix => {
                    serde_json::to_string_pretty(&AffixFormatter::new(rows).format_results(&request))?
                }
                OutputFormat::Schema => {
                    let payload = ResultPayload::new(query_name(&query_file), rows)
                        .with_metadata("executed", isoformat(&SystemClock.now()))
                        .with_params(
                            request
                                .params
                                .into_iter()
                                .map(|(k, v)| (k, v.into()))
                                .collect(),
                        );
                    serde_json::to_string_pretty(&ResultSchema::dump(&payload)?)?
                }
            };
            println!("{output}");
        }
        Command::Tables { query_file } => {
            let identifier = query_file.to_string_lossy();
            for table in queryable.get_table_list(&identifier).await? {
                println!("{table}");
            }
        }
    }

    Ok(())
}

/// Query name: the file name up to its first `.`.
fn query_name(query_file: &Path) -> String {
    query_file
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .unwrap_or_default()
}
