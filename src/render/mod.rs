//! Document rendering
//!
//! Turns an SCI into a [`DocumentView`]: the content blocks of a printed
//! cleaning procedure plus the presentation mode used to style them. The
//! content never depends on the mode.

mod colour;

pub use colour::{colour_hex, hex_to_rgb, DEFAULT_COLOUR};

use crate::model::{non_empty, Sci};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DOCUMENT_HEADING: &str = "Standard Cleaning Procedures";
pub const DEFAULT_REVISION: &str = "00";
pub const DEFAULT_EFFECTIVE_DATE: &str = "-";
pub const DEFAULT_DESCRIPTION: &str = "Production Areas";
pub const DEFAULT_FREQUENCY: &str = "Monthly (Or refer to MCS)";
pub const DEFAULT_RESPONSIBILITY: &str = "ACS Hygiene Operator";
pub const ISSUED_BY: &str = "ACS QA Department";
pub const PPE_NOTE: &str = "Ensure correct and complete PPE is worn before any cleaning operation.";

/// Number of images shown in the inspection block
const INSPECTION_IMAGE_LIMIT: usize = 2;

const PPE_ITEMS: [(&str, &str); 6] = [
    ("🥾", "Safety Boots"),
    ("🥼", "Apron"),
    ("🥽", "Goggles"),
    ("🧤", "Gloves"),
    ("👒", "Hair Cover"),
    ("😷", "Face Mask"),
];

/// Visual style of the detail view
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Classic,
    #[default]
    Elegant,
    Opus,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Classic, ViewMode::Elegant, ViewMode::Opus];

    /// Style class name
    pub fn class(&self) -> &'static str {
        match self {
            ViewMode::Classic => "classic",
            ViewMode::Elegant => "elegant",
            ViewMode::Opus => "opus",
        }
    }

    /// Capitalized label for the mode toggle
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Classic => "Classic",
            ViewMode::Elegant => "Elegant",
            ViewMode::Opus => "Opus",
        }
    }

    /// The following mode, wrapping around
    pub fn next(&self) -> ViewMode {
        match self {
            ViewMode::Classic => ViewMode::Elegant,
            ViewMode::Elegant => ViewMode::Opus,
            ViewMode::Opus => ViewMode::Classic,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A rendered document: content plus presentation mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    pub mode: ViewMode,
    pub content: DocumentContent,
}

impl DocumentView {
    /// Style class of the outer container
    pub fn style_class(&self) -> String {
        format!("document-view {}", self.mode.class())
    }

    /// Same content in another mode
    pub fn with_mode(self, mode: ViewMode) -> Self {
        Self { mode, ..self }
    }
}

/// Mode-independent blocks of a rendered document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentContent {
    pub title: String,
    pub header: HeaderBlock,
    pub description: String,
    pub chemicals: Option<Vec<ChemicalRow>>,
    pub frequency: String,
    pub responsibility: String,
    pub inspection: Option<InspectionBlock>,
    pub ppe: PpeBlock,
    pub colour_codes: Option<Vec<ColourRow>>,
    pub equipment: Option<String>,
    pub instructions: Vec<InstructionGroup>,
    pub footer: FooterBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderBlock {
    pub heading: String,
    pub site_name: String,
    pub document_no: String,
    pub amendment: String,
    pub effective: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChemicalRow {
    pub name: String,
    pub ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionBlock {
    pub images: Vec<ImageRef>,
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpeBlock {
    pub items: Vec<PpeItem>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpeItem {
    pub icon: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColourRow {
    pub colour: String,
    pub meaning: String,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionGroup {
    pub heading: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FooterBlock {
    pub issued_by: String,
    pub approved_by: String,
}

/// Render an SCI owned by `site_name` in the given mode
pub fn render_document(sci: &Sci, site_name: &str, mode: ViewMode) -> DocumentView {
    DocumentView {
        mode,
        content: render_content(sci, site_name),
    }
}

fn render_content(sci: &Sci, site_name: &str) -> DocumentContent {
    let section = &sci.section;
    let metadata = section.document_metadata.as_ref();

    let header = HeaderBlock {
        heading: DOCUMENT_HEADING.to_string(),
        site_name: site_name.to_string(),
        document_no: sci.display_id().to_string(),
        amendment: or_default(metadata.and_then(|m| m.revision.as_deref()), DEFAULT_REVISION),
        effective: or_default(
            metadata.and_then(|m| m.effective_date.as_deref()),
            DEFAULT_EFFECTIVE_DATE,
        ),
    };

    let chemicals = non_empty_vec(&section.chemicals).map(|chemicals| {
        chemicals
            .iter()
            .map(|c| ChemicalRow {
                name: c.name.clone(),
                ratio: c.display_ratio().to_string(),
            })
            .collect()
    });

    let inspection = if section.images.is_empty() && section.key_inspection_points.is_empty() {
        None
    } else {
        Some(InspectionBlock {
            images: section
                .images
                .iter()
                .take(INSPECTION_IMAGE_LIMIT)
                .filter_map(|img| {
                    non_empty(img.url.as_deref()).map(|url| ImageRef {
                        url: url.to_string(),
                        alt: or_default(img.caption.as_deref(), "Inspection"),
                    })
                })
                .collect(),
            points: section.key_inspection_points.clone(),
        })
    };

    let colour_codes = non_empty_vec(&section.colour_codes).map(|codes| {
        codes
            .iter()
            .map(|cc| ColourRow {
                colour: cc.colour.clone(),
                meaning: cc.meaning.clone(),
                hex: colour_hex(&cc.colour).to_string(),
            })
            .collect()
    });

    let instructions = section
        .step_groups
        .iter()
        .map(|group| InstructionGroup {
            heading: match non_empty(group.frequency.as_deref()) {
                Some(freq) => format!("{} ({})", group.title, freq),
                None => group.title.clone(),
            },
            steps: group.steps.iter().map(|s| s.action.clone()).collect(),
        })
        .collect();

    DocumentContent {
        title: sci.title().to_string(),
        header,
        description: or_default(section.description.as_deref(), DEFAULT_DESCRIPTION),
        chemicals,
        frequency: or_default(section.frequency.as_deref(), DEFAULT_FREQUENCY),
        responsibility: or_default(section.responsibility.as_deref(), DEFAULT_RESPONSIBILITY),
        inspection,
        ppe: PpeBlock {
            items: PPE_ITEMS
                .iter()
                .map(|(icon, label)| PpeItem {
                    icon: icon.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            note: PPE_NOTE.to_string(),
        },
        colour_codes,
        equipment: non_empty_vec(&section.application_equipment).map(|eq| eq.join(", ")),
        instructions,
        footer: FooterBlock {
            issued_by: ISSUED_BY.to_string(),
            approved_by: site_name.to_string(),
        },
    }
}

fn or_default(value: Option<&str>, fallback: &str) -> String {
    non_empty(value).unwrap_or(fallback).to_string()
}

fn non_empty_vec<T>(items: &[T]) -> Option<&[T]> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl fmt::Display for DocumentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.content;

        writeln!(f, "{} - {}", c.header.heading, c.header.site_name)?;
        writeln!(f, "Document No: {}", c.header.document_no)?;
        writeln!(f, "Amendment:   {}", c.header.amendment)?;
        writeln!(f, "Effective:   {}", c.header.effective)?;
        writeln!(f)?;
        writeln!(f, "{}", c.title)?;
        writeln!(f, "{}", c.description)?;

        if let Some(ref chemicals) = c.chemicals {
            writeln!(f, "\nChemicals")?;
            for row in chemicals {
                writeln!(f, "  {:<30} {}", row.name, row.ratio)?;
            }
        }

        writeln!(f, "\nFrequency:      {}", c.frequency)?;
        writeln!(f, "Responsibility: {}", c.responsibility)?;

        if let Some(ref inspection) = c.inspection {
            writeln!(f, "\nKey Inspection Points")?;
            for image in &inspection.images {
                writeln!(f, "  [{}] {}", image.alt, image.url)?;
            }
            for point in &inspection.points {
                writeln!(f, "  • {}", point)?;
            }
        }

        writeln!(f, "\nPPE Requirements & Safety")?;
        let items: Vec<_> = c
            .ppe
            .items
            .iter()
            .map(|item| format!("{} {}", item.icon, item.label))
            .collect();
        writeln!(f, "  {}", items.join("  "))?;
        writeln!(f, "  {}", c.ppe.note)?;

        if let Some(ref codes) = c.colour_codes {
            writeln!(f, "\nColour Code")?;
            for code in codes {
                writeln!(f, "  {} – {}", code.colour, code.meaning)?;
            }
        }

        if let Some(ref equipment) = c.equipment {
            writeln!(f, "\nApplication Equipment")?;
            writeln!(f, "  {}", equipment)?;
        }

        writeln!(f, "\nCleaning Instructions")?;
        for group in &c.instructions {
            writeln!(f, "  {}", group.heading)?;
            for (i, step) in group.steps.iter().enumerate() {
                writeln!(f, "    {}. {}", i + 1, step)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Issued By:   {}", c.footer.issued_by)?;
        write!(f, "Approved By: {}", c.footer.approved_by)
    }
}
