//! Channel menu projections
//!
//! Two menus list the active channels by active position: show/hide (a
//! checkbox per channel) and bring-to-front (a radio group). Entries carry
//! the position, never a reference into the registry; the command a view
//! hands back is resolved against the registry at the time it is applied.

use crate::model::ChannelRegistry;
use crate::types::{Channel, ChannelId, Rgb};

/// Which channel menu an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    ShowHide,
    BringToFront,
}

/// Command produced when a menu entry is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Set the visibility of the channel at this active position
    ToggleShowHide { position: usize, visible: bool },
    /// Bring the channel at this active position to the front
    BringToFront { position: usize },
}

/// One entry of a channel menu
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub channel: ChannelId,
    /// Active index of the channel
    pub position: usize,
    pub label: String,
    /// Icon color
    pub color: Rgb,
    pub checked: bool,
    /// Whether the entry is listed at all
    pub visible: bool,
}

/// A channel menu with its entries
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMenu {
    pub kind: MenuKind,
    pub entries: Vec<MenuEntry>,
    pub enabled: bool,
}

impl ChannelMenu {
    fn empty(kind: MenuKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            enabled: false,
        }
    }

    /// The command to issue when `entry` is clicked
    pub fn command_for(&self, entry: &MenuEntry) -> MenuCommand {
        match self.kind {
            MenuKind::ShowHide => MenuCommand::ToggleShowHide {
                position: entry.position,
                visible: !entry.checked,
            },
            MenuKind::BringToFront => MenuCommand::BringToFront {
                position: entry.position,
            },
        }
    }

    pub fn any_visible(&self) -> bool {
        self.entries.iter().any(|e| e.visible)
    }

    fn entry_mut(&mut self, position: usize) -> Option<&mut MenuEntry> {
        self.entries.get_mut(position)
    }
}

/// Both channel menus
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMenus {
    pub show_hide: ChannelMenu,
    pub bring_to_front: ChannelMenu,
}

impl Default for ChannelMenus {
    fn default() -> Self {
        Self {
            show_hide: ChannelMenu::empty(MenuKind::ShowHide),
            bring_to_front: ChannelMenu::empty(MenuKind::BringToFront),
        }
    }
}

impl ChannelMenus {
    /// Build both menus from the active channels
    pub fn rebuild(registry: &ChannelRegistry, front: Option<usize>) -> Self {
        let active: Vec<Channel> = registry.channels().into_iter().filter(|c| c.active).collect();

        let entry = |position: usize, channel: &Channel| MenuEntry {
            channel: channel.id,
            position,
            label: channel.label.clone(),
            color: channel.color,
            checked: false,
            visible: true,
        };

        let show_hide = ChannelMenu {
            kind: MenuKind::ShowHide,
            entries: active
                .iter()
                .enumerate()
                .map(|(pos, c)| MenuEntry {
                    checked: c.visible,
                    ..entry(pos, c)
                })
                .collect(),
            enabled: !active.is_empty(),
        };

        let mut bring_to_front = ChannelMenu {
            kind: MenuKind::BringToFront,
            entries: active
                .iter()
                .enumerate()
                .map(|(pos, c)| MenuEntry {
                    checked: front == Some(pos),
                    visible: c.visible,
                    ..entry(pos, c)
                })
                .collect(),
            enabled: false,
        };
        bring_to_front.enabled = bring_to_front.any_visible();

        Self {
            show_hide,
            bring_to_front,
        }
    }

    /// Update the entries at `position` after a display change of `channel`.
    /// Returns false if no entry exists there.
    pub fn refresh_entry(&mut self, position: usize, channel: &Channel) -> bool {
        let Some(show_hide) = self.show_hide.entry_mut(position) else {
            return false;
        };
        show_hide.label = channel.label.clone();
        show_hide.color = channel.color;
        show_hide.checked = channel.visible;

        if let Some(front) = self.bring_to_front.entry_mut(position) {
            front.label = channel.label.clone();
            front.color = channel.color;
            front.visible = channel.visible;
        }
        self.bring_to_front.enabled = self.bring_to_front.any_visible();
        true
    }

    /// Check the bring-to-front entry at `front` and uncheck the others
    pub fn select_front(&mut self, front: Option<usize>) {
        for entry in &mut self.bring_to_front.entries {
            entry.checked = Some(entry.position) == front;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.show_hide.entries.is_empty()
    }
}

/// Fixed actions of the plot context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    ToggleHighlightSamples,
    ClearData,
    ClearMarkers,
    AddNote,
    ManageNotes,
}

impl ContextAction {
    pub fn label(&self) -> &'static str {
        match self {
            ContextAction::ToggleHighlightSamples => "Highlight Samples",
            ContextAction::ClearData => "Clear Data",
            ContextAction::ClearMarkers => "Clear Markers",
            ContextAction::AddNote => "Add Note...",
            ContextAction::ManageNotes => "Manage Notes",
        }
    }
}

/// Plot context menu projection
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub bring_to_front: ChannelMenu,
    pub show_hide: ChannelMenu,
    /// Check state of the highlight-samples entry
    pub highlight_samples: bool,
    /// Groups of actions, rendered with separators in between
    pub groups: Vec<Vec<ContextAction>>,
}

impl ContextMenu {
    pub fn new(menus: &ChannelMenus, highlight_samples: bool) -> Self {
        Self {
            bring_to_front: menus.bring_to_front.clone(),
            show_hide: menus.show_hide.clone(),
            highlight_samples,
            groups: vec![
                vec![
                    ContextAction::ToggleHighlightSamples,
                    ContextAction::ClearData,
                    ContextAction::ClearMarkers,
                ],
                vec![ContextAction::AddNote, ContextAction::ManageNotes],
            ],
        }
    }
}
