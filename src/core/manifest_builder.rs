//! Builds a viewer manifest from raw per-site icon data.
//!
//! Raw data is one entry per crawled site with every icon `<link>` found on
//! it. The builder picks one icon per site and groups sites that share the
//! same icon URL into a single [`IconRecord`].

use crate::core::icon_probe::{IconProber, ProbedIcon};
use crate::domain::model::{IconRecord, Manifest};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Icons narrower than this are never chosen.
pub const MIN_ICON_WIDTH: u32 = 96;

pub const DEFAULT_SITE_COUNT: usize = 10;

/// Ad and redirect domains that never belong in the manifest.
pub const DEFAULT_DOMAIN_BLACKLIST: &[&str] = &[
    "higheurest.com",
    "blogspot.co.id",
    "pipeschannels.com",
    "blogspot.mx",
    "bestadbid.com",
    "googlevideo.com",
    "tqeobp89axcn.com",
    "ioredi.com",
    "moradu.com",
    "fedsit.com",
    "vebadu.com",
];

/// Attributes of one icon `<link>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconLink {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteIcons {
    pub hostname: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub icons: Vec<IconLink>,
    #[serde(default)]
    pub best_icon: Option<String>,
}

/// 解析 raw site data (JSON 陣列)
pub fn parse_site_data(body: &[u8]) -> Result<Vec<SiteIcons>> {
    Ok(serde_json::from_slice(body)?)
}

/// Scheme-relative URLs (`//host/icon.png`) get `https:`.
pub fn normalize_icon_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https:{}", url)
    }
}

/// Resolves a site-relative `href` against the page it was found on.
///
/// Returns `None` for a relative `href` that has no usable base.
pub fn resolve_icon_href(site_url: Option<&str>, href: &str) -> Option<String> {
    if href.starts_with("http") || href.starts_with("//") {
        return Some(href.to_string());
    }

    site_url
        .and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(href).ok())
        .map(|resolved| resolved.to_string())
}

/// Page URL of a site, falling back to `https://{hostname}`.
pub fn site_base_url(site: &SiteIcons) -> String {
    site.url
        .clone()
        .unwrap_or_else(|| format!("https://{}", site.hostname))
}

/// Width from a `sizes` attribute: `"192x192"` → 192, `"16x16 32x32"` → 16.
pub fn declared_width(sizes: &str) -> Option<u32> {
    let first = sizes.split_whitespace().next()?;
    let (width, _) = first.split_once(['x', 'X'])?;
    width.trim().parse().ok()
}

fn is_unmasked(icon: &IconLink) -> bool {
    icon.mask.as_deref().map_or(true, str::is_empty)
}

/// Widest icon if it is at least [`MIN_ICON_WIDTH`].
///
/// Widths come from `sizes`. With a prober, icons without a declared size
/// are downloaded and measured, and the first unmasked SVG wins outright.
pub async fn select_best_icon(
    site_url: Option<&str>,
    icons: &[IconLink],
    prober: Option<&IconProber>,
) -> Option<String> {
    let mut best: Option<(String, u32)> = None;

    for icon in icons {
        let Some(resolved) = resolve_icon_href(site_url, &icon.href) else {
            tracing::debug!("Skipping unresolvable icon href: {}", icon.href);
            continue;
        };
        let url = normalize_icon_url(&resolved);

        let width = match icon.sizes.as_deref().and_then(declared_width) {
            Some(width) => width,
            None => {
                let Some(prober) = prober else {
                    tracing::debug!("Skipping icon without declared size: {}", url);
                    continue;
                };
                match prober.probe(&url).await {
                    Ok(ProbedIcon::Svg) if is_unmasked(icon) => return Some(url),
                    Ok(ProbedIcon::Svg) => {
                        tracing::debug!("Skipping masked SVG icon: {}", url);
                        continue;
                    }
                    Ok(ProbedIcon::Raster { width }) => width,
                    Err(e) => {
                        tracing::warn!("⚠️ {}", e);
                        continue;
                    }
                }
            }
        };

        let is_wider = best
            .as_ref()
            .map_or(true, |(_, best_width)| width > *best_width);
        if is_wider {
            best = Some((url, width));
        }
    }

    best.filter(|(_, width)| *width >= MIN_ICON_WIDTH)
        .map(|(url, _)| url)
}

#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    count: usize,
    blacklist: HashSet<String>,
    prober: Option<IconProber>,
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_COUNT)
    }
}

impl ManifestBuilder {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            blacklist: DEFAULT_DOMAIN_BLACKLIST
                .iter()
                .map(|d| d.to_string())
                .collect(),
            prober: None,
        }
    }

    pub fn with_blacklisted<I, D>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.blacklist.extend(domains.into_iter().map(Into::into));
        self
    }

    /// Measure icons that do not declare `sizes`.
    pub fn with_prober(mut self, prober: IconProber) -> Self {
        self.prober = Some(prober);
        self
    }

    pub fn is_blacklisted(&self, hostname: &str) -> bool {
        self.blacklist.contains(hostname)
    }

    pub async fn build(&self, sites: &[SiteIcons]) -> Manifest {
        let mut records: Vec<IconRecord> = Vec::new();
        let mut index_by_icon: HashMap<String, usize> = HashMap::new();

        for site in sites.iter().take(self.count) {
            if self.is_blacklisted(&site.hostname) {
                tracing::debug!("Skipping blacklisted domain: {}", site.hostname);
                continue;
            }

            let icon = match &site.best_icon {
                Some(best_icon) => Some(best_icon.clone()),
                None => {
                    let base = site_base_url(site);
                    select_best_icon(Some(base.as_str()), &site.icons, self.prober.as_ref()).await
                }
            };
            let Some(icon) = icon else {
                tracing::debug!("No usable icon for {}", site.hostname);
                continue;
            };

            // 相同圖示的網域合併到同一筆
            match index_by_icon.get(&icon) {
                Some(&idx) => records[idx].domains.push(site.hostname.clone()),
                None => {
                    index_by_icon.insert(icon.clone(), records.len());
                    records.push(IconRecord::new(icon, vec![site.hostname.clone()]));
                }
            }
        }

        tracing::info!(
            "Built manifest with {} icons from {} sites",
            records.len(),
            sites.len().min(self.count)
        );
        Manifest::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icon_probe::tests::png_bytes;
    use httpmock::prelude::*;

    fn link(href: &str, sizes: Option<&str>) -> IconLink {
        IconLink {
            href: href.to_string(),
            sizes: sizes.map(str::to_string),
            ..Default::default()
        }
    }

    fn site(hostname: &str, best_icon: Option<&str>) -> SiteIcons {
        SiteIcons {
            hostname: hostname.to_string(),
            url: Some(format!("https://{}", hostname)),
            rank: None,
            icons: vec![],
            best_icon: best_icon.map(str::to_string),
        }
    }

    #[test]
    fn test_declared_width() {
        assert_eq!(declared_width("192x192"), Some(192));
        assert_eq!(declared_width("16x16 32x32"), Some(16));
        assert_eq!(declared_width("180X180"), Some(180));
        assert_eq!(declared_width("any"), None);
        assert_eq!(declared_width(""), None);
    }

    #[test]
    fn test_normalize_and_resolve_urls() {
        assert_eq!(normalize_icon_url("//cdn.x.com/i.png"), "https://cdn.x.com/i.png");
        assert_eq!(normalize_icon_url("http://x.com/i.png"), "http://x.com/i.png");
        assert_eq!(
            resolve_icon_href(Some("https://x.com/home"), "/apple-touch-icon.png").as_deref(),
            Some("https://x.com/apple-touch-icon.png")
        );
        assert_eq!(
            resolve_icon_href(Some("https://x.com"), "//cdn.x.com/i.png").as_deref(),
            Some("//cdn.x.com/i.png")
        );
        assert_eq!(resolve_icon_href(None, "/touch-icon.png"), None);
    }

    #[tokio::test]
    async fn test_select_best_icon_prefers_widest() {
        let icons = vec![
            link("https://x.com/120.png", Some("120x120")),
            link("https://x.com/180.png", Some("180x180")),
            link("https://x.com/152.png", Some("152x152")),
            link("https://x.com/favicon.ico", None),
        ];
        assert_eq!(
            select_best_icon(Some("https://x.com"), &icons, None).await,
            Some("https://x.com/180.png".to_string())
        );
    }

    #[tokio::test]
    async fn test_select_best_icon_first_wins_on_tie() {
        let icons = vec![
            link("https://x.com/a.png", Some("192x192")),
            link("https://x.com/b.png", Some("192x192")),
        ];
        assert_eq!(
            select_best_icon(None, &icons, None).await,
            Some("https://x.com/a.png".to_string())
        );
    }

    #[tokio::test]
    async fn test_select_best_icon_rejects_small_icons() {
        let icons = vec![link("https://x.com/57.png", Some("57x57"))];
        assert_eq!(select_best_icon(None, &icons, None).await, None);
        assert_eq!(select_best_icon(None, &[], None).await, None);
    }

    #[tokio::test]
    async fn test_select_best_icon_skips_relative_href_without_base() {
        let icons = vec![link("/touch-icon.png", Some("180x180"))];
        assert_eq!(select_best_icon(None, &icons, None).await, None);
    }

    #[tokio::test]
    async fn test_select_best_icon_measures_undeclared_icons() {
        let server = MockServer::start();
        let icon_mock = server.mock(|when, then| {
            when.method(GET).path("/apple-touch-icon.png");
            then.status(200)
                .header("Content-Type", "image/png")
                .body(png_bytes(192, 192));
        });

        let icons = vec![
            link("/favicon-120.png", Some("120x120")),
            link("/apple-touch-icon.png", None),
        ];
        let base = server.base_url();
        let prober = IconProber::new(None).unwrap();
        let best = select_best_icon(Some(base.as_str()), &icons, Some(&prober)).await;

        icon_mock.assert();
        assert_eq!(best, Some(server.url("/apple-touch-icon.png")));
    }

    #[tokio::test]
    async fn test_select_best_icon_takes_first_unmasked_svg() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/icon.svg");
            then.status(200)
                .header("Content-Type", "image/svg+xml")
                .body("<svg xmlns=\"http://www.w3.org/2000/svg\"/>");
        });
        let big_png = server.mock(|when, then| {
            when.method(GET).path("/big.png");
            then.status(200).body(png_bytes(512, 512));
        });

        let mut masked = link("/icon.svg", None);
        masked.mask = Some("true".to_string());
        let icons = vec![masked, link("/icon.svg", None), link("/big.png", None)];
        let base = server.base_url();
        let prober = IconProber::new(None).unwrap();
        let best = select_best_icon(Some(base.as_str()), &icons, Some(&prober)).await;

        assert_eq!(best, Some(server.url("/icon.svg")));
        big_png.assert_hits(0);
    }

    #[tokio::test]
    async fn test_select_best_icon_skips_failed_downloads() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/broken.png");
            then.status(500);
        });

        let icons = vec![
            link("/broken.png", None),
            link("/icon-96.png", Some("96x96")),
        ];
        let base = server.base_url();
        let prober = IconProber::new(None).unwrap();
        let best = select_best_icon(Some(base.as_str()), &icons, Some(&prober)).await;

        assert_eq!(best, Some(server.url("/icon-96.png")));
    }

    #[tokio::test]
    async fn test_build_merges_domains_sharing_an_icon() {
        let sites = vec![
            site("google.com", Some("https://g.com/icon.png")),
            site("youtube.com", Some("https://yt.com/icon.png")),
            site("google.co.uk", Some("https://g.com/icon.png")),
        ];
        let manifest = ManifestBuilder::new(10).build(&sites).await;

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.records()[0].image_url, "https://g.com/icon.png");
        assert_eq!(manifest.records()[0].domains, vec!["google.com", "google.co.uk"]);
        assert_eq!(manifest.records()[1].domains, vec!["youtube.com"]);
    }

    #[tokio::test]
    async fn test_build_skips_blacklisted_and_iconless_sites() {
        let sites = vec![
            site("googlevideo.com", Some("https://gv.com/icon.png")),
            site("noicon.com", None),
            site("extra.com", Some("https://e.com/icon.png")),
            site("ok.com", Some("https://ok.com/icon.png")),
        ];
        let manifest = ManifestBuilder::new(10)
            .with_blacklisted(["extra.com"])
            .build(&sites)
            .await;

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.records()[0].domains, vec!["ok.com"]);
    }

    #[tokio::test]
    async fn test_build_limits_to_count() {
        let sites = vec![
            site("a.com", Some("https://a.com/i.png")),
            site("b.com", Some("https://b.com/i.png")),
            site("c.com", Some("https://c.com/i.png")),
        ];
        let manifest = ManifestBuilder::new(2).build(&sites).await;

        let domains: Vec<&str> = manifest
            .iter()
            .map(|r| r.domains[0].as_str())
            .collect();
        assert_eq!(domains, vec!["a.com", "b.com"]);
    }

    #[tokio::test]
    async fn test_build_falls_back_to_icon_selection() {
        let mut s = site("x.com", None);
        s.icons = vec![link("/touch-icon.png", Some("180x180"))];
        let manifest = ManifestBuilder::default().build(&[s]).await;

        assert_eq!(manifest.records()[0].image_url, "https://x.com/touch-icon.png");
    }

    #[tokio::test]
    async fn test_build_resolves_against_hostname_when_url_missing() {
        let mut s = site("x.com", None);
        s.url = None;
        s.icons = vec![link("/touch-icon.png", Some("180x180"))];
        let manifest = ManifestBuilder::default().build(&[s]).await;

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.records()[0].image_url, "https://x.com/touch-icon.png");
    }

    #[tokio::test]
    async fn test_build_with_measuring_keeps_site_with_undeclared_icon() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apple-touch-icon.png");
            then.status(200).body(png_bytes(180, 180));
        });

        let mut s = site("x.com", None);
        s.url = Some(server.base_url());
        s.icons = vec![link("/apple-touch-icon.png", None)];

        let without = ManifestBuilder::default().build(std::slice::from_ref(&s)).await;
        assert!(without.is_empty());

        let with = ManifestBuilder::default()
            .with_prober(IconProber::new(None).unwrap())
            .build(&[s])
            .await;
        assert_eq!(with.records()[0].image_url, server.url("/apple-touch-icon.png"));
        assert_eq!(with.records()[0].domains, vec!["x.com"]);
    }

    #[test]
    fn test_parse_site_data_keeps_extra_link_attributes() {
        let body = br#"[
            {
                "hostname": "x.com",
                "url": "https://x.com",
                "rank": 1,
                "icons": [{"href": "https://x.com/i.png", "sizes": "192x192", "rel": ["icon"]}],
                "best_icon": null
            }
        ]"#;
        let sites = parse_site_data(body).unwrap();

        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].rank, Some(1));
        assert_eq!(sites[0].icons[0].sizes.as_deref(), Some("192x192"));
        assert!(sites[0].icons[0].extra.contains_key("rel"));
    }
}
