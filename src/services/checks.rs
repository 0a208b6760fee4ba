//! Placeholder document checks.
//!
//! The catalogue is fixed; only the pass/fail status of each item is drawn
//! at random on every run, so callers get a stable shape with varying
//! results.

use once_cell::sync::Lazy;
use rand::Rng;

use crate::models::{CheckItem, CheckReport, CheckSection, CheckStatus};

#[derive(Debug, Clone, Copy)]
pub struct CheckTemplate {
    pub text: &'static str,
    pub details: &'static str,
    pub page_number: u32,
}

const PAGE_NUMBERING: CheckTemplate = CheckTemplate {
    text: "PDF has proper page numbering.",
    details: "Verify that all pages are numbered correctly and consistently throughout the document.",
    page_number: 1,
};

const TABLE_OF_CONTENTS: CheckTemplate = CheckTemplate {
    text: "Table of contents is accurate.",
    details: "Ensure the table of contents matches the actual document structure and page numbers.",
    page_number: 2,
};

const HEADERS_AND_FOOTERS: CheckTemplate = CheckTemplate {
    text: "Headers and footers are consistent.",
    details: "Check that headers and footers maintain consistent formatting and content across all pages.",
    page_number: 3,
};

const FORMATTING: CheckTemplate = CheckTemplate {
    text: "Document formatting is consistent.",
    details: "Verify consistent use of fonts, spacing, and alignment throughout the document.",
    page_number: 3,
};

const FIGURE_LABELS: CheckTemplate = CheckTemplate {
    text: "Images and figures are properly labeled.",
    details: "Ensure all images and figures have appropriate captions and references.",
    page_number: 3,
};

/// Number of times the header/footer check repeats in the first section.
const HEADER_FOOTER_REPEATS: usize = 9;

pub static CHECK_CATALOGUE: Lazy<Vec<(&'static str, Vec<CheckTemplate>)>> = Lazy::new(|| {
    let mut first = vec![PAGE_NUMBERING, TABLE_OF_CONTENTS];
    first.extend(std::iter::repeat(HEADERS_AND_FOOTERS).take(HEADER_FOOTER_REPEATS));

    vec![
        ("Section 1", first),
        ("Section 2", vec![FORMATTING, FIGURE_LABELS]),
    ]
});

/// Probability that a single check passes.
pub const PASS_PROBABILITY: f64 = 0.5;

/// Runs every check in the catalogue, drawing each status from `rng`.
pub fn run_checks<R: Rng + ?Sized>(rng: &mut R) -> CheckReport {
    let sections = CHECK_CATALOGUE
        .iter()
        .map(|(name, templates)| CheckSection {
            name: name.to_string(),
            items: templates
                .iter()
                .map(|template| CheckItem {
                    text: template.text.to_string(),
                    status: CheckStatus::from_passed(rng.gen_bool(PASS_PROBABILITY)),
                    details: template.details.to_string(),
                    page_number: template.page_number,
                })
                .collect(),
        })
        .collect();

    CheckReport { sections }
}
