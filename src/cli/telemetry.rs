//! Logging and optional OTLP trace export.

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::OnceCell;
use opentelemetry::{
    global, propagation::TextMapCompositePropagator, trace::TracerProvider as _, KeyValue,
};
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::{SdkTracerProvider, Tracer},
    Resource,
};
use std::{env::var, time::Duration};
use tonic::{
    metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;
use url::Url;

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Where spans go and which headers ride along with every export.
#[derive(Debug)]
struct OtlpExport {
    endpoint: Url,
    metadata: MetadataMap,
}

impl OtlpExport {
    /// `None` unless `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
    fn from_env() -> Result<Option<Self>> {
        let Ok(endpoint) = var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
            return Ok(None);
        };
        let headers = var("OTEL_EXPORTER_OTLP_HEADERS").unwrap_or_default();
        Self::new(&endpoint, &headers).map(Some)
    }

    fn new(endpoint: &str, headers: &str) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid OTLP endpoint: {endpoint}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("OTLP endpoint must use http or https: {endpoint}");
        }
        Ok(Self {
            endpoint,
            metadata: header_metadata(headers)?,
        })
    }

    /// Host to verify when exporting over TLS.
    fn tls_domain(&self) -> Option<&str> {
        if self.endpoint.scheme() == "https" {
            self.endpoint.host_str()
        } else {
            None
        }
    }

    fn into_tracer(self) -> Result<Tracer> {
        let mut builder = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.endpoint.as_str())
            .with_compression(Compression::Gzip)
            .with_timeout(Duration::from_secs(3));

        if let Some(domain) = self.tls_domain() {
            builder = builder.with_tls_config(
                ClientTlsConfig::new()
                    .domain_name(domain.to_string())
                    .with_native_roots(),
            );
        }
        if !self.metadata.is_empty() {
            builder = builder.with_metadata(self.metadata);
        }

        let instance_id =
            var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(builder.build()?)
            .with_resource(
                Resource::builder_empty()
                    .with_attributes([
                        KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                        KeyValue::new("service.instance.id", instance_id),
                        KeyValue::new("vcs.ref.head.revision", crate::GIT_COMMIT_HASH),
                    ])
                    .build(),
            )
            .build();

        let _ = TRACER_PROVIDER.set(provider.clone());

        global::set_tracer_provider(provider.clone());
        global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
            Box::new(TraceContextPropagator::new()),
            Box::new(BaggagePropagator::new()),
        ]));

        Ok(provider.tracer(env!("CARGO_PKG_NAME")))
    }
}

/// `k1=v1,k2=v2` as gRPC metadata. Keys are lowercased; empty entries are ignored.
fn header_metadata(raw: &str) -> Result<MetadataMap> {
    let mut metadata = MetadataMap::new();
    for pair in raw.split(',').filter(|pair| !pair.trim().is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("OTLP header is missing '=': {pair}"))?;
        let key = key.trim().to_ascii_lowercase();
        let name = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
            .map_err(|err| anyhow!("invalid OTLP header name {key}: {err}"))?;
        let value: MetadataValue<Ascii> = value
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid OTLP header value for {key}: {err}"))?;
        metadata.insert(name, value);
    }
    Ok(metadata)
}

/// Install the global subscriber. Spans are exported over OTLP/gRPC only when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set; `RUST_LOG` overrides the level.
///
/// # Errors
///
/// Returns an error if the exporter or subscriber cannot be initialized
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.unwrap_or(Level::ERROR).into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    if let Some(export) = OtlpExport::from_env()? {
        let otel_layer = tracing_opentelemetry::layer().with_tracer(export.into_tracer()?);
        let subscriber = Registry::default()
            .with(fmt_layer)
            .with(otel_layer)
            .with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Flush and stop the OTLP exporter, if one was started.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        debug!("shutting down tracer provider");
        if let Err(err) = provider.shutdown() {
            debug!("tracer provider shutdown failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_metadata_lowercases_keys() -> Result<()> {
        let metadata = header_metadata("Authorization = Bearer abc ,x-team=web,")?;
        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
        assert!(header_metadata("")?.is_empty());
        Ok(())
    }

    #[test]
    fn header_metadata_rejects_pair_without_value() {
        let err = header_metadata("x-team=web,broken").err().map(|e| e.to_string());
        assert!(err.is_some_and(|msg| msg.contains("missing '='")));
    }

    #[test]
    fn export_requires_http_scheme() {
        assert!(OtlpExport::new("http://localhost:4317", "").is_ok());
        assert!(OtlpExport::new("localhost:4317", "").is_err());
        assert!(OtlpExport::new("ftp://otel.cedarcore.dev", "").is_err());
    }

    #[test]
    fn tls_domain_only_for_https() -> Result<()> {
        let export = OtlpExport::new("https://otel.cedarcore.dev:4317/v1/traces", "")?;
        assert_eq!(export.tls_domain(), Some("otel.cedarcore.dev"));
        let export = OtlpExport::new("http://localhost:4317", "")?;
        assert_eq!(export.tls_domain(), None);
        Ok(())
    }

    #[test]
    fn from_env_without_endpoint_is_none() -> Result<()> {
        temp_env::with_var_unset("OTEL_EXPORTER_OTLP_ENDPOINT", || {
            assert!(OtlpExport::from_env()?.is_none());
            Ok(())
        })
    }

    #[test]
    fn shutdown_without_provider_is_noop() {
        shutdown_tracer();
    }
}
