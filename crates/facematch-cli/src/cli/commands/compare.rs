use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use facematch::{
    CompareConfig, ComparisonClient, ComparisonError, ComparisonResult, ImageReference,
};
use tracing::debug;

use crate::cli::args::CompareArgs;
use crate::exit_codes;

pub async fn run(args: CompareArgs) -> anyhow::Result<i32> {
    let config = build_config(&args);

    let source = match resolve_image(&args.source).await? {
        Ok(image) => image,
        Err(e) => return Ok(report(&e)),
    };
    let target = match resolve_image(&args.target).await? {
        Ok(image) => image,
        Err(e) => return Ok(report(&e)),
    };

    let client = match ComparisonClient::new(config) {
        Ok(client) => client,
        Err(e) => return Ok(report(&e)),
    };

    match client.compare(&source, &target, &args.region).await {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_text(&result));
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => Ok(report(&e)),
    }
}

/// Environment first, then explicit flags.
fn build_config(args: &CompareArgs) -> CompareConfig {
    let mut config = CompareConfig::from_env();

    if let Some(url) = &args.endpoint_url {
        config = config.with_endpoint_url(url.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = args.max_retries {
        config = config.with_max_retries(retries);
    }
    if let Some(threshold) = args.similarity_threshold {
        config = config.with_similarity_threshold(threshold);
    }
    if let Some(filter) = args.quality_filter {
        config = config.with_quality_filter(filter);
    }
    config
}

/// Object URLs become references; anything else is read as a local file.
///
/// The outer error is a local I/O failure, the inner one a malformed
/// reference.
async fn resolve_image(
    arg: &str,
) -> anyhow::Result<Result<ImageReference, ComparisonError>> {
    if ImageReference::is_object_url(arg) {
        return Ok(ImageReference::parse(arg));
    }

    let path = Path::new(arg);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "read local image");
    Ok(Ok(ImageReference::inline(bytes)))
}

fn report(err: &ComparisonError) -> i32 {
    eprintln!("error: {err}");
    err.exit_code()
}

fn render_text(result: &ComparisonResult) -> String {
    let mut out = format!("Source Face ({}%)\n", result.source_face.confidence);
    for m in &result.matches {
        out.push_str(&format!("Target Face ({}%)\n", m.matched_face.confidence));
        out.push_str(&format!("  Similarity : {}%\n", m.similarity));
    }
    out
}
