use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use kms_c2pa_signer::{
    AppState, KeyHandle, KeyManagement, SigningService,
    certificates::spki_der_from_public_key_pem,
    gcp::{CloudKms, MetadataTokens, PrivateCa, TokenSource},
    run,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[clap(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    #[clap(long, env = "PORT", default_value = "8080")]
    port: u16,
    /// Full resource name of the KMS key version.
    #[clap(long, env = "KMS_KEY_ID")]
    kms_key_id: String,
    /// Full resource name of the CA pool.
    #[clap(long, env = "CA_POOL_ID")]
    ca_pool_id: String,
    #[clap(long, env = "SIGNING_ALGORITHM", default_value = "ps256")]
    signing_algorithm: String,
    /// Bearer token for Google APIs; the metadata server is used when unset.
    #[clap(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
    #[clap(long, env = "VERIFY_KEY_MATCH", default_value = "true", action = clap::ArgAction::Set)]
    verify_key_match: bool,
    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    http_timeout_secs: u64,
}

fn build_service(args: &Args) -> Result<SigningService> {
    let http = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(args.http_timeout_secs))
        .build()
        .context("building HTTP client")?;
    let tokens = match &args.access_token {
        Some(token) => TokenSource::Static(token.clone()),
        None => TokenSource::MetadataServer(MetadataTokens::new()),
    };

    let key = KeyHandle::new(&args.kms_key_id);
    let kms = Arc::new(CloudKms::new(http.clone(), tokens.clone()));
    let pool = Arc::new(PrivateCa::new(http, tokens));

    let expected_spki = if args.verify_key_match {
        let public_key = kms
            .public_key(&key)
            .with_context(|| format!("fetching public key for {key}"))?;
        public_key.verify()?;
        Some(spki_der_from_public_key_pem(&public_key.pem)?)
    } else {
        None
    };

    let service = SigningService::new(
        kms,
        pool,
        args.ca_pool_id.clone(),
        key,
        args.signing_algorithm.clone(),
    );
    Ok(match expected_spki {
        Some(spki) => service.with_expected_key(spki),
        None => service,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // The blocking HTTP client must be built and dropped outside the async runtime.
    let service = Arc::new(build_service(&args)?);
    tracing::info!(key = %service.key(), pool = %args.ca_pool_id, "signing service ready");

    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    let result = runtime.block_on(run(
        args.host.clone(),
        args.port,
        AppState { service: service.clone() },
    ));
    drop(runtime);
    drop(service);
    result
}
