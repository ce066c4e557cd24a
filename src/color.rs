//! Color naming for run font colors.
//!
//! Extraction never talks to the network directly: it asks a [`ColorNamer`]
//! for a name. [`LocalPalette`] answers from a fixed table of common colors;
//! with the `color-api` feature, [`ColorApiNamer`] asks the public color API
//! and is normally wrapped in a [`FallbackNamer`] so the palette still answers
//! when the service is unreachable.

use std::fmt;

/// An RGB triple as stored in `w:color/@w:val`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a six digit hex value such as `FF0000`. A leading `#` is accepted.
    /// `auto` and anything malformed yield `None`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Lowercase hex without `#`, the form the color API expects.
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn distance_sq(self, other: Rgb) -> u32 {
        let d = |a: u8, b: u8| (i32::from(a) - i32::from(b)).pow(2) as u32;
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Failure to name a color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ColorLookupError(pub String);

/// Maps an RGB triple to a human readable name.
pub trait ColorNamer {
    fn name(&self, rgb: Rgb) -> Result<String, ColorLookupError>;
}

const PALETTE: &[(&str, Rgb)] = &[
    ("Black", Rgb::new(0x00, 0x00, 0x00)),
    ("White", Rgb::new(0xFF, 0xFF, 0xFF)),
    ("Red", Rgb::new(0xFF, 0x00, 0x00)),
    ("Dark Red", Rgb::new(0xC0, 0x00, 0x00)),
    ("Maroon", Rgb::new(0x80, 0x00, 0x00)),
    ("Orange", Rgb::new(0xFF, 0xC0, 0x00)),
    ("Yellow", Rgb::new(0xFF, 0xFF, 0x00)),
    ("Olive", Rgb::new(0x80, 0x80, 0x00)),
    ("Lime", Rgb::new(0x00, 0xFF, 0x00)),
    ("Green", Rgb::new(0x00, 0xB0, 0x50)),
    ("Dark Green", Rgb::new(0x00, 0x64, 0x00)),
    ("Teal", Rgb::new(0x00, 0x80, 0x80)),
    ("Cyan", Rgb::new(0x00, 0xFF, 0xFF)),
    ("Light Blue", Rgb::new(0x00, 0xB0, 0xF0)),
    ("Blue", Rgb::new(0x00, 0x00, 0xFF)),
    ("Dark Blue", Rgb::new(0x00, 0x20, 0x60)),
    ("Navy", Rgb::new(0x00, 0x00, 0x80)),
    ("Purple", Rgb::new(0x70, 0x30, 0xA0)),
    ("Magenta", Rgb::new(0xFF, 0x00, 0xFF)),
    ("Pink", Rgb::new(0xFF, 0xC0, 0xCB)),
    ("Brown", Rgb::new(0x8B, 0x45, 0x13)),
    ("Gray", Rgb::new(0x80, 0x80, 0x80)),
    ("Dark Gray", Rgb::new(0x40, 0x40, 0x40)),
    ("Silver", Rgb::new(0xC0, 0xC0, 0xC0)),
];

/// Offline namer: nearest entry of a small palette of common colors.
#[derive(Debug, Clone, Copy)]
pub struct LocalPalette {
    max_distance_sq: u32,
}

impl LocalPalette {
    /// Accepts any palette entry within `max_distance` (euclidean, RGB space).
    pub fn with_tolerance(max_distance: u32) -> Self {
        Self {
            max_distance_sq: max_distance.saturating_mul(max_distance),
        }
    }
}

impl Default for LocalPalette {
    fn default() -> Self {
        Self::with_tolerance(96)
    }
}

impl ColorNamer for LocalPalette {
    fn name(&self, rgb: Rgb) -> Result<String, ColorLookupError> {
        PALETTE
            .iter()
            .map(|(name, entry)| (name, rgb.distance_sq(*entry)))
            .min_by_key(|(_, distance)| *distance)
            .filter(|(_, distance)| *distance <= self.max_distance_sq)
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| ColorLookupError(format!("no palette color close to {}", rgb)))
    }
}

/// Tries `primary` first and `secondary` when it fails.
pub struct FallbackNamer<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackNamer<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: ColorNamer, S: ColorNamer> ColorNamer for FallbackNamer<P, S> {
    fn name(&self, rgb: Rgb) -> Result<String, ColorLookupError> {
        self.primary.name(rgb).or_else(|err| {
            log::warn!("Color lookup for {} failed ({}), using fallback", rgb, err);
            self.secondary.name(rgb)
        })
    }
}

#[cfg(feature = "color-api")]
pub use self::api::ColorApiNamer;

#[cfg(feature = "color-api")]
mod api {
    use super::{ColorLookupError, ColorNamer, Rgb};
    use serde::Deserialize;
    use std::time::Duration;

    const DEFAULT_ENDPOINT: &str = "https://www.thecolorapi.com/id";

    #[derive(Deserialize)]
    struct ColorApiResponse {
        name: ColorApiName,
    }

    #[derive(Deserialize)]
    struct ColorApiName {
        value: String,
    }

    /// Names colors through the public color API (`GET /id?hex=RRGGBB`).
    pub struct ColorApiNamer {
        client: reqwest::blocking::Client,
        endpoint: String,
    }

    impl ColorApiNamer {
        pub fn new() -> Result<Self, ColorLookupError> {
            Self::with_endpoint(DEFAULT_ENDPOINT)
        }

        pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ColorLookupError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| ColorLookupError(e.to_string()))?;
            Ok(Self {
                client,
                endpoint: endpoint.into(),
            })
        }
    }

    impl ColorNamer for ColorApiNamer {
        fn name(&self, rgb: Rgb) -> Result<String, ColorLookupError> {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[("hex", rgb.to_hex())])
                .send()
                .map_err(|e| ColorLookupError(e.to_string()))?;
            if !response.status().is_success() {
                return Err(ColorLookupError(format!(
                    "color API answered {}",
                    response.status()
                )));
            }
            let body: ColorApiResponse = response
                .json()
                .map_err(|e| ColorLookupError(e.to_string()))?;
            Ok(body.name.value)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::color::{FallbackNamer, LocalPalette};
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;
        use std::thread::{self, JoinHandle};

        /// Answers a single request with `status` and `body`; yields the request line.
        fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let endpoint = format!("http://{}/id", listener.local_addr().unwrap());
            let handle = thread::spawn(move || {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut header = String::new();
                while reader.read_line(&mut header).unwrap() > 2 {
                    header.clear();
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                reader.get_mut().write_all(response.as_bytes()).unwrap();
                request_line
            });
            (endpoint, handle)
        }

        #[test]
        fn test_name_is_read_from_response() {
            let (endpoint, server) = serve_once("200 OK", r#"{"name":{"value":"Crimson"},"hex":{}}"#);
            let namer = ColorApiNamer::with_endpoint(endpoint).unwrap();
            assert_eq!(namer.name(Rgb::new(0xDC, 0x14, 0x3C)).as_deref(), Ok("Crimson"));
            assert!(server.join().unwrap().starts_with("GET /id?hex=dc143c "));
        }

        #[test]
        fn test_error_status_falls_back_to_palette() {
            let (endpoint, server) = serve_once("500 Internal Server Error", "{}");
            let api = ColorApiNamer::with_endpoint(endpoint).unwrap();
            assert!(api.name(Rgb::new(0, 0, 255)).unwrap_err().0.contains("500"));
            server.join().unwrap();

            let (endpoint, server) = serve_once("500 Internal Server Error", "{}");
            let namer = FallbackNamer::new(
                ColorApiNamer::with_endpoint(endpoint).unwrap(),
                LocalPalette::default(),
            );
            assert_eq!(namer.name(Rgb::new(0, 0, 255)).as_deref(), Ok("Blue"));
            server.join().unwrap();
        }

        #[test]
        fn test_malformed_body_is_an_error() {
            let (endpoint, server) = serve_once("200 OK", "not json");
            let namer = ColorApiNamer::with_endpoint(endpoint).unwrap();
            assert!(namer.name(Rgb::new(1, 2, 3)).is_err());
            server.join().unwrap();
        }
    }
}
