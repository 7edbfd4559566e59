use crate::protocol::{ContentKind, InboundMessage, PanelId};
use std::collections::BTreeMap;

const JUDGE_KINDS: &[ContentKind] = &[ContentKind::Speech];
const BOT_KINDS: &[ContentKind] = &[ContentKind::Thought, ContentKind::Speech];

/// A single display region. Holds the latest snapshot for one
/// `(panel, kind)` address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    text: String,
    follow_tail: bool,
}

impl Region {
    /// Replace the displayed text and anchor the view to the newest line
    pub fn replace(&mut self, content: &str) {
        self.text.clear();
        self.text.push_str(content);
        self.follow_tail = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.follow_tail = false;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn follows_tail(&self) -> bool {
        self.follow_tail
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fixed mapping of panel -> content kind -> region.
///
/// The set of addresses is decided at construction and never changes; only
/// region text does.
#[derive(Debug, Clone)]
pub struct PanelRegistry {
    panels: BTreeMap<PanelId, BTreeMap<ContentKind, Region>>,
}

impl PanelRegistry {
    pub fn new(layout: &[(PanelId, &[ContentKind])]) -> Self {
        let mut panels = BTreeMap::new();
        for (panel, kinds) in layout {
            let regions: &mut BTreeMap<ContentKind, Region> = panels.entry(*panel).or_default();
            for kind in kinds.iter() {
                regions.insert(*kind, Region::default());
            }
        }
        Self { panels }
    }

    /// Judge speech plus thought and speech for both bots. The user echo
    /// has no region and is therefore dropped.
    pub fn debate() -> Self {
        Self::new(&[
            (PanelId::Intermediary, JUDGE_KINDS),
            (PanelId::BotAlpha, BOT_KINDS),
            (PanelId::BotBravo, BOT_KINDS),
        ])
    }

    pub fn region(&self, panel: PanelId, kind: ContentKind) -> Option<&Region> {
        self.panels.get(&panel)?.get(&kind)
    }

    fn region_mut(&mut self, panel: PanelId, kind: ContentKind) -> Option<&mut Region> {
        self.panels.get_mut(&panel)?.get_mut(&kind)
    }

    /// Apply a snapshot. Returns false when nothing is registered at the
    /// message's address.
    pub fn apply(&mut self, message: &InboundMessage) -> bool {
        match self.region_mut(message.target_panel, message.message_type) {
            Some(region) => {
                region.replace(&message.content);
                true
            }
            None => false,
        }
    }

    /// Reset every region to empty text
    pub fn clear_all(&mut self) {
        for regions in self.panels.values_mut() {
            for region in regions.values_mut() {
                region.clear();
            }
        }
    }

    #[allow(dead_code)]
    pub fn has_panel(&self, panel: PanelId) -> bool {
        self.panels.contains_key(&panel)
    }

    #[allow(dead_code)]
    pub fn regions(&self) -> impl Iterator<Item = (PanelId, ContentKind, &Region)> {
        self.panels.iter().flat_map(|(panel, regions)| {
            regions
                .iter()
                .map(move |(kind, region)| (*panel, *kind, region))
        })
    }

    #[allow(dead_code)]
    pub fn region_count(&self) -> usize {
        self.panels.values().map(BTreeMap::len).sum()
    }
}

impl Default for PanelRegistry {
    fn default() -> Self {
        Self::debate()
    }
}
