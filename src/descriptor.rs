//! Display signals extracted from a source's free-text descriptor.
//!
//! Resolvers pack everything into the `title` field, e.g.
//!
//! ```text
//! The.Matrix.1999.1080p.BluRay.x264
//! 👤 412 💾 1.9 GB ⚙️ ThePirateBay
//! ```
//!
//! The first line is the release name. The info block starts at the first
//! line carrying all three markers.

use std::sync::LazyLock;

use regex::Regex;

use crate::streams::Source;

pub const SEEDERS_MARKER: char = '👤';
pub const SIZE_MARKER: char = '💾';
/// Gear plus the emoji variation selector; a bare `⚙` does not count
pub const PROVIDER_MARKER: &str = "\u{2699}\u{FE0F}";

pub const NO_STREAM_INFO: &str = "No Stream Info..";

static SEEDERS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"👤\s*(\d+)").unwrap());
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)💾\s*(\d+(?:[.,]\d+)?)\s*([KMGT]?B)\b").unwrap());
static PROVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"⚙\x{FE0F}\s*([^\n👤💾]+)").unwrap());
static QUALITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(2160p|1440p|1080p|720p|576p|480p|360p|4k)\b").unwrap());

/// Accessory hint only, never used for ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClass {
    /// Needs downloading before it can play
    Download,
    /// Served from a debrid cache
    Debrid,
}

impl SourceClass {
    pub fn of(name: &str) -> Self {
        if name.to_lowercase().contains("download") {
            SourceClass::Download
        } else {
            SourceClass::Debrid
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// Release name, the first descriptor line
    pub subtitle: String,
    /// Info block from the first fully-marked line onward, or [`NO_STREAM_INFO`]
    pub detail: String,
    pub class: SourceClass,
    pub seeders: Option<u32>,
    /// Size as written, e.g. "1.9 GB"
    pub size: Option<String>,
    pub size_bytes: Option<u64>,
    pub provider: Option<String>,
    pub quality: Option<String>,
}

impl StreamDescriptor {
    pub fn parse(source: &Source) -> Self {
        Self::from_parts(&source.name, &source.title)
    }

    pub fn from_parts(name: &str, title: &str) -> Self {
        let lines: Vec<&str> = title.split('\n').collect();
        let subtitle = lines[0];
        let start = lines.iter().position(|line| is_info_line(line));

        let (seeders, size, size_bytes, provider) = match start {
            Some(idx) => {
                let line = lines[idx];
                let (size, size_bytes) = parse_size(line).unzip();
                (parse_seeders(line), size, size_bytes, parse_provider(line))
            }
            None => (None, None, None, None),
        };

        StreamDescriptor {
            subtitle: subtitle.to_string(),
            detail: start
                .map(|idx| lines[idx..].join(" "))
                .unwrap_or_else(|| NO_STREAM_INFO.to_string()),
            class: SourceClass::of(name),
            seeders,
            size,
            size_bytes,
            provider,
            quality: parse_quality(name).or_else(|| parse_quality(subtitle)),
        }
    }

    pub fn has_info(&self) -> bool {
        self.detail != NO_STREAM_INFO
    }
}

fn is_info_line(line: &str) -> bool {
    line.contains(SEEDERS_MARKER) && line.contains(SIZE_MARKER) && line.contains(PROVIDER_MARKER)
}

fn parse_seeders(line: &str) -> Option<u32> {
    SEEDERS_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_size(line: &str) -> Option<(String, u64)> {
    let caps = SIZE_RE.captures(line)?;
    let amount = caps.get(1)?.as_str();
    let unit = caps.get(2)?.as_str().to_uppercase();

    let value: f64 = amount.replace(',', ".").parse().ok()?;
    let multiplier: u64 = match unit.as_str() {
        "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        "TB" => 1024 * 1024 * 1024 * 1024,
        _ => return None,
    };

    Some((format!("{} {}", amount, unit), (value * multiplier as f64) as u64))
}

fn parse_provider(line: &str) -> Option<String> {
    PROVIDER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|p| !p.is_empty())
}

fn parse_quality(text: &str) -> Option<String> {
    QUALITY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_and_detail() {
        let d = StreamDescriptor::from_parts("Torrentio", "ReleaseName.2020.1080p\n👤12 💾1.2GB ⚙️x264");
        assert_eq!(d.subtitle, "ReleaseName.2020.1080p");
        assert_eq!(d.detail, "👤12 💾1.2GB ⚙️x264");
        assert!(d.has_info());
    }

    #[test]
    fn test_detail_joins_following_lines() {
        let title = "Show.S01E01.720p\nsome/path.mkv\n👤 3 💾 700 MB ⚙️ EZTV\n🇬🇧 / 🇫🇷";
        let d = StreamDescriptor::from_parts("Torrentio", title);
        assert_eq!(d.detail, "👤 3 💾 700 MB ⚙️ EZTV 🇬🇧 / 🇫🇷");
        assert_eq!(d.provider.as_deref(), Some("EZTV"));
        assert_eq!(d.seeders, Some(3));
    }

    #[test]
    fn test_missing_markers_fall_back() {
        let d = StreamDescriptor::from_parts("Torrentio", "Release\n👤 12 💾 1 GB");
        assert_eq!(d.detail, NO_STREAM_INFO);
        assert!(!d.has_info());
        assert_eq!(d.seeders, None);

        // Markers spread across lines do not count
        let d = StreamDescriptor::from_parts("Torrentio", "Release\n👤 12\n💾 1 GB\n⚙️ X");
        assert_eq!(d.detail, NO_STREAM_INFO);
    }

    #[test]
    fn test_gear_needs_variation_selector() {
        let d = StreamDescriptor::from_parts("Torrentio", "Release\n👤 12 💾 1 GB \u{2699} X");
        assert_eq!(d.detail, NO_STREAM_INFO);
        assert_eq!(d.provider, None);

        let d = StreamDescriptor::from_parts("Torrentio", "Release\n👤 12 💾 1 GB \u{2699}\u{FE0F} X");
        assert!(d.has_info());
        assert_eq!(d.provider.as_deref(), Some("X"));
    }

    #[test]
    fn test_single_line_and_empty_title() {
        let d = StreamDescriptor::from_parts("Torrentio", "Just.A.Release.Name");
        assert_eq!(d.subtitle, "Just.A.Release.Name");
        assert_eq!(d.detail, NO_STREAM_INFO);

        let d = StreamDescriptor::from_parts("Torrentio", "");
        assert_eq!(d.subtitle, "");
        assert_eq!(d.detail, NO_STREAM_INFO);
    }

    #[test]
    fn test_first_line_can_be_the_info_line() {
        let d = StreamDescriptor::from_parts("Torrentio", "👤 1 💾 2 GB ⚙️ YTS");
        assert_eq!(d.subtitle, "👤 1 💾 2 GB ⚙️ YTS");
        assert_eq!(d.detail, "👤 1 💾 2 GB ⚙️ YTS");
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(SourceClass::of("RealDebrid Download"), SourceClass::Download);
        assert_eq!(SourceClass::of("[RD download] Torrentio"), SourceClass::Download);
        assert_eq!(SourceClass::of("Cached"), SourceClass::Debrid);
        assert_eq!(SourceClass::of(""), SourceClass::Debrid);
    }

    #[test]
    fn test_structured_signals() {
        let d = StreamDescriptor::from_parts(
            "[RD+] Torrentio\n4k",
            "The.Matrix.1999.2160p.UHD\n👤 412 💾 1.5 GB ⚙️ ThePirateBay",
        );
        assert_eq!(d.seeders, Some(412));
        assert_eq!(d.size.as_deref(), Some("1.5 GB"));
        assert_eq!(d.size_bytes, Some(1024 * 1024 * 1536));
        assert_eq!(d.provider.as_deref(), Some("ThePirateBay"));
        assert_eq!(d.quality.as_deref(), Some("4k"));
        assert_eq!(d.class, SourceClass::Debrid);
    }

    #[test]
    fn test_quality_falls_back_to_release_name() {
        let d = StreamDescriptor::from_parts("Torrentio", "Movie.2020.720p.WEB\n👤 1 💾 800 MB ⚙️ 1337x");
        assert_eq!(d.quality.as_deref(), Some("720p"));
        assert_eq!(d.size_bytes, Some(800 * 1024 * 1024));
    }

    #[test]
    fn test_parse_is_pure() {
        let source = Source {
            name: "RealDebrid Download".to_string(),
            title: "Rel\n👤5 💾3GB ⚙️Y".to_string(),
            url: "https://x".to_string(),
            info_hash: None,
        };
        let first = StreamDescriptor::parse(&source);
        let second = StreamDescriptor::parse(&source);
        assert_eq!(first, second);
        assert_eq!(first.class, SourceClass::Download);
        assert_eq!(first.size.as_deref(), Some("3 GB"));
    }
}
