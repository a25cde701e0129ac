use serde::{Deserialize, Serialize};

/// Render-ready representation of one carousel entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCard {
    pub image_url: String,
    pub link_url: String,
    pub title: String,
    pub modified_label: String,
    pub badge_text: String,
}

/// Up to three course cards of one subcategory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryGroup {
    pub category_id: i64,
    pub name: String,
    pub cards: Vec<DisplayCard>,
}

/// One child category of the requested category, with its subcategories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrilldownSection {
    pub category: DisplayCard,
    pub subcategories: Vec<SubcategoryGroup>,
}

/// What the block shows for a given request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BlockContent {
    /// No category requested, echo the configured text
    Static { text: String },
    /// Cards chosen by the recommendation provider
    Delegated { cards: Vec<DisplayCard> },
    /// Cards read from the category tree
    Drilldown { sections: Vec<DrilldownSection> },
}

impl BlockContent {
    pub fn mode(&self) -> &'static str {
        match self {
            BlockContent::Static { .. } => "static",
            BlockContent::Delegated { .. } => "delegated",
            BlockContent::Drilldown { .. } => "drilldown",
        }
    }

    /// Total number of cards the block will render
    pub fn card_count(&self) -> usize {
        match self {
            BlockContent::Static { .. } => 0,
            BlockContent::Delegated { cards } => cards.len(),
            BlockContent::Drilldown { sections } => sections
                .iter()
                .map(|s| 1 + s.subcategories.iter().map(|g| g.cards.len()).sum::<usize>())
                .sum(),
        }
    }
}
