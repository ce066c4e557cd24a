//! Run converter - extracts the style of a text run.

use super::ConversionContext;
use crate::color::Rgb;
use crate::core::ast::{Node, NodeLabel};
use crate::docx::Run;

const UNKNOWN: &str = "Unknown";

/// Font color of a run after name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontColor {
    /// No explicit RGB on the run.
    #[default]
    Automatic,
    Named(String),
    /// An RGB value the namer could not name.
    Unresolved(Rgb),
}

impl FontColor {
    pub fn display_name(&self) -> &str {
        match self {
            FontColor::Automatic => "Black",
            FontColor::Named(name) => name,
            FontColor::Unresolved(_) => UNKNOWN,
        }
    }
}

/// Style of one run as reported in the output.
///
/// Every field keeps the difference between "not set" and "set"; the
/// `Unknown` / `no` sentinels only appear when rendering attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleInfo {
    pub font: Option<String>,
    /// Size in points.
    pub size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: FontColor,
}

impl StyleInfo {
    pub fn font_label(&self) -> &str {
        self.font.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn size_label(&self) -> String {
        match self.size {
            Some(points) => format!("{}pt", format_decimal(f64::from(points))),
            None => UNKNOWN.to_string(),
        }
    }

    /// Output attributes in schema order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("font", self.font_label().to_string()),
            ("size", self.size_label()),
            ("bold", yes_no(self.bold)),
            ("italic", yes_no(self.italic)),
            ("color", self.color.display_name().to_string()),
        ]
    }
}

fn yes_no(flag: Option<bool>) -> String {
    let label = if flag == Some(true) { "yes" } else { "no" };
    label.to_string()
}

/// Shortest decimal form: `12`, `10.5`, `1.15`.
pub(crate) fn format_decimal(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// Converter for Run elements.
pub struct RunConverter;

impl RunConverter {
    /// Extracts the style of `run`, falling back to the paragraph style for font and size.
    pub fn style_info(
        run: &Run,
        para_style_id: Option<&str>,
        context: &ConversionContext<'_>,
    ) -> StyleInfo {
        let props = context.resolve_run_property(&run.properties, para_style_id);

        StyleInfo {
            font: props.font,
            size: props.size_half_points.map(|half| half as f32 / 2.0),
            bold: props.bold,
            italic: props.italic,
            color: match props.color {
                Some(rgb) => context.color_name(rgb),
                None => FontColor::Automatic,
            },
        }
    }

    /// Converts a run to a `content` node carrying its full text and style.
    pub fn convert(
        run: &Run,
        para_style_id: Option<&str>,
        context: &ConversionContext<'_>,
    ) -> Node {
        let style = Self::style_info(run, para_style_id, context);
        log::debug!("Run {:?}: {:?}", run.text, style);
        Node::new(NodeLabel::Content)
            .with_text(run.text.clone())
            .attrs(style.attributes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorLookupError, ColorNamer, LocalPalette};
    use crate::docx::{RunProperties, StyleDef, StyleSheet};
    use crate::localization::RussianLocalization;
    use crate::ConvertOptions;

    struct Offline;

    impl ColorNamer for Offline {
        fn name(&self, rgb: Rgb) -> Result<String, ColorLookupError> {
            Err(ColorLookupError(format!("no network for {}", rgb)))
        }
    }

    fn styled_sheet() -> StyleSheet {
        let mut sheet = StyleSheet::default();
        sheet.insert(StyleDef {
            id: "Body".into(),
            name: "Body".into(),
            run: RunProperties {
                font: Some("Georgia".into()),
                size_half_points: Some(21),
                ..Default::default()
            },
            ..Default::default()
        });
        sheet
    }

    #[test]
    fn test_style_falls_back_to_paragraph_style() {
        let sheet = styled_sheet();
        let options = ConvertOptions::default();
        let palette = LocalPalette::default();
        let context = ConversionContext::new(&sheet, &options, &palette, &RussianLocalization);

        let style = RunConverter::style_info(&Run::default(), Some("Body"), &context);
        assert_eq!(style.font_label(), "Georgia");
        assert_eq!(style.size_label(), "10.5pt");
        assert_eq!(style.bold, None);
        assert_eq!(style.color, FontColor::Automatic);
    }

    #[test]
    fn test_missing_font_everywhere_is_unknown() {
        let sheet = StyleSheet::default();
        let options = ConvertOptions::default();
        let palette = LocalPalette::default();
        let context = ConversionContext::new(&sheet, &options, &palette, &RussianLocalization);

        let style = RunConverter::style_info(&Run::default(), Some("Missing"), &context);
        let attrs = style.attributes();
        assert_eq!(
            attrs,
            vec![
                ("font", "Unknown".to_string()),
                ("size", "Unknown".to_string()),
                ("bold", "no".to_string()),
                ("italic", "no".to_string()),
                ("color", "Black".to_string()),
            ]
        );
    }

    #[test]
    fn test_color_lookup_failure_is_unknown() {
        let sheet = StyleSheet::default();
        let options = ConvertOptions::default();
        let context = ConversionContext::new(&sheet, &options, &Offline, &RussianLocalization);
        let run = Run {
            properties: RunProperties {
                color: Some(Rgb::new(0x12, 0x34, 0x56)),
                bold: Some(true),
                size_half_points: Some(24),
                ..Default::default()
            },
            text: "x".into(),
            has_drawing: false,
        };

        let node = RunConverter::convert(&run, None, &context);
        assert_eq!(node.get_attr("color"), Some("Unknown"));
        assert_eq!(node.get_attr("bold"), Some("yes"));
        assert_eq!(node.get_attr("size"), Some("12pt"));
        assert_eq!(node.text.as_deref(), Some("x"));
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(2.998), "3");
        assert_eq!(format_decimal(2.5), "2.5");
        assert_eq!(format_decimal(1.15), "1.15");
        assert_eq!(format_decimal(12.0), "12");
    }
}
