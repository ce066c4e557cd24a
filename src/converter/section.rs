//! Page parameters of document sections.

use super::run::format_decimal;
use crate::core::ast::{Node, NodeLabel};
use crate::docx::Section;

/// Twips (twentieths of a point) per centimetre.
const TWIPS_PER_CM: f64 = 1440.0 / 2.54;

/// Margins in centimetres, rounded to two decimals, integral values without a fraction.
pub fn format_margin_cm(cm: f64) -> String {
    format_decimal(cm)
}

pub fn twips_to_cm(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_CM
}

pub struct SectionConverter;

impl SectionConverter {
    /// Converts a section to a `parameters_page` node; absent margins are left out.
    pub fn convert(section: &Section) -> Node {
        let margins = [
            ("left_margin", section.left),
            ("right_margin", section.right),
            ("top_margin", section.top),
            ("bottom_margin", section.bottom),
        ];

        let mut node = Node::new(NodeLabel::ParametersPage);
        for (name, twips) in margins {
            if let Some(twips) = twips {
                node = node.attr(name, format_margin_cm(twips_to_cm(twips)));
            }
        }
        node
    }
}
