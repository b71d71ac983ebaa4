use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coir_site::config::{Config, ContentLocation};
use coir_site::content::ContentManager;
use coir_site::dom::{Document, Element, SharedDocument};
use coir_site::safe::SafeContentManager;
use coir_site::server::CoirSiteServer;
use site_common::cms::{CmsClient, CmsClientConfig};
use site_common::source::{ContentSource, DirSource, HttpSource, HttpSourceConfig};

/// The site footer's bindable nodes.
fn footer_document() -> SharedDocument {
    Document::new()
        .with(Element::new("h3").with_data("company-name", ""))
        .with(Element::new("p").with_data("company-tagline", ""))
        .with(Element::new("a").with_data("company-phone", ""))
        .with(Element::new("span").with_data("company-email", ""))
        .with(Element::new("a").with_data("contact", "phone"))
        .with(Element::new("a").with_data("contact", "email"))
        .with(Element::new("p").with_data("contact", "address"))
        .with(Element::new("a").with_data("social-facebook", ""))
        .with(Element::new("a").with_data("social-zalo", ""))
        .with(Element::new("a").with_data("social-whatsapp", ""))
        .with(Element::new("a").with_data("social-youtube", ""))
        .shared()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting coir-site MCP server");

    // 1. Configuration and document source
    let config = Config::from_env()?;
    let source: Arc<dyn ContentSource> = match &config.location {
        ContentLocation::Dir(path) => {
            info!(content_dir = %path.display(), "reading site content from directory");
            Arc::new(DirSource::new(path.clone()))
        }
        ContentLocation::Url(url) => {
            info!(content_url = %url, "reading site content over HTTP");
            Arc::new(HttpSource::new(HttpSourceConfig::from_env(url))?)
        }
    };
    info!(
        content_base = %config.content_base,
        data_base = %config.data_base,
        refresh_ms = config.refresh_interval.as_millis() as u64,
        "configuration loaded"
    );

    // 2. Optional CMS client
    let cms = match CmsClientConfig::from_env() {
        Some(cms_config) => {
            let client = CmsClient::new(cms_config)?;
            if client.health_check().await {
                info!("CMS API reachable");
            } else {
                info!("CMS API unreachable, serving cached or fallback data");
            }
            Some(client)
        }
        None => {
            info!("CMS_API_URL not set, running without CMS");
            None
        }
    };

    // 3. Content managers and the initial footer
    let manager = Arc::new(ContentManager::new(source, &config));
    let safe = Arc::new(SafeContentManager::new(Arc::clone(&manager)));

    let footer = footer_document();
    manager.update_footer(&footer).await;
    let footer_ok = safe.update_footer_safely(&footer).await;
    info!(footer_ok, status = ?safe.status().status, "initial footer resolved");

    // 4. Background footer refresh
    manager.pages().start_auto_refresh(Arc::clone(&footer));

    let server = CoirSiteServer::new(safe, footer, cms);

    // 5. Serve
    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                tracing::info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                tracing::info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        manager.pages().stop_auto_refresh();
        info!("MCP server shut down");
    }
    Ok(())
}
