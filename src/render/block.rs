//! Block markup.
//!
//! Markup lives in the handlebars templates under `templates/`. Their class
//! names (`course-recommendations-container > owl-carousel > owl-stage-outer
//! > owl-stage > owl-item`) are a fixed contract with the carousel stylesheet
//! and script shipped alongside the block. Every value is HTML-escaped except
//! the administrator-configured static text.

use handlebars::Handlebars;
use serde::Serialize;

use crate::{
    config::BlockSettings,
    error::{AppError, AppResult},
    models::{BlockContent, DisplayCard, DrilldownSection, SubcategoryGroup},
};

const BLOCK_TEMPLATE: &str = "block";

/// Registered block templates, built once at startup
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);

        registry
            .register_template_string(BLOCK_TEMPLATE, include_str!("templates/block.hbs"))
            .map_err(|e| AppError::Internal(format!("invalid block template: {}", e)))?;
        registry
            .register_partial("carousel", include_str!("templates/carousel.hbs"))
            .map_err(|e| AppError::Internal(format!("invalid carousel template: {}", e)))?;
        registry
            .register_partial("card", include_str!("templates/card.hbs"))
            .map_err(|e| AppError::Internal(format!("invalid card template: {}", e)))?;

        Ok(Self { registry })
    }

    /// Serialized block fragment
    pub fn render(&self, content: &BlockContent, settings: &BlockSettings) -> AppResult<String> {
        self.registry
            .render(BLOCK_TEMPLATE, &BlockView::new(content, settings))
            .map_err(|e| AppError::Internal(format!("rendering block failed: {}", e)))
    }
}

/// Template context. Every field is always present so strict mode can
/// catch typos in the templates.
#[derive(Debug, Serialize)]
struct BlockView<'a> {
    title: &'a str,
    mode: &'static str,
    is_static: bool,
    text: &'a str,
    /// Top-level carousel: recommendations, or category cards in drilldown
    cards: Vec<&'a DisplayCard>,
    sections: Vec<SectionView<'a>>,
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    name: &'a str,
    subcategories: &'a [SubcategoryGroup],
}

impl<'a> BlockView<'a> {
    fn new(content: &'a BlockContent, settings: &'a BlockSettings) -> Self {
        let mut view = Self {
            title: &settings.title,
            mode: content.mode(),
            is_static: false,
            text: "",
            cards: Vec::new(),
            sections: Vec::new(),
        };

        match content {
            BlockContent::Static { text } => {
                view.is_static = true;
                view.text = text.as_str();
            }
            BlockContent::Delegated { cards } => view.cards = cards.iter().collect(),
            BlockContent::Drilldown { sections } => {
                view.cards = sections.iter().map(|s| &s.category).collect();
                view.sections = sections
                    .iter()
                    .filter(|s| !s.subcategories.is_empty())
                    .map(SectionView::from)
                    .collect();
            }
        }

        view
    }
}

impl<'a> From<&'a DrilldownSection> for SectionView<'a> {
    fn from(section: &'a DrilldownSection) -> Self {
        Self {
            name: &section.category.title,
            subcategories: &section.subcategories,
        }
    }
}
