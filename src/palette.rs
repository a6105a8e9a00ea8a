//! Route colour table.
//!
//! Routes carry a stable colour index; the palette resolves it to concrete
//! colours with `index % len`.

/// Colours for one palette slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Polyline colour for an enabled route
    pub enabled: &'static str,
    /// Polyline colour while the route is hovered
    pub highlighted: &'static str,
    /// List entry colour for a disabled route
    pub disabled: &'static str,
}

const fn entry(
    enabled: &'static str,
    highlighted: &'static str,
    disabled: &'static str,
) -> PaletteEntry {
    PaletteEntry {
        enabled,
        highlighted,
        disabled,
    }
}

/// Blue, green, red, purple, yellow, pink, indigo, fuchsia, rose, cyan,
/// lime, emerald, teal.
pub const DEFAULT_PALETTE: [PaletteEntry; 13] = [
    entry("#3b82f6", "#2563eb", "#bfdbfe"),
    entry("#22c55e", "#16a34a", "#bbf7d0"),
    entry("#ef4444", "#dc2626", "#fecaca"),
    entry("#a855f7", "#9333ea", "#e9d5ff"),
    entry("#eab308", "#ca8a04", "#fef08a"),
    entry("#ec4899", "#db2777", "#fbcfe8"),
    entry("#6366f1", "#4f46e5", "#c7d2fe"),
    entry("#d946ef", "#c026d3", "#f5d0fe"),
    entry("#f43f5e", "#e11d48", "#fecdd3"),
    entry("#06b6d4", "#0891b2", "#a5f3fc"),
    entry("#84cc16", "#65a30d", "#d9f99d"),
    entry("#10b981", "#059669", "#a7f3d0"),
    entry("#14b8a6", "#0d9488", "#99f6e4"),
];

/// An ordered, non-empty table of colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl Palette {
    /// Build a palette from custom entries. Returns `None` if `entries` is empty.
    pub fn new(entries: Vec<PaletteEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a colour index, wrapping around the table.
    pub fn entry(&self, color_index: usize) -> &PaletteEntry {
        &self.entries[color_index % self.entries.len()]
    }

    /// Polyline colour for a route, taking hover highlighting into account.
    pub fn line_color(&self, color_index: usize, highlighted: bool) -> &'static str {
        let entry = self.entry(color_index);
        if highlighted {
            entry.highlighted
        } else {
            entry.enabled
        }
    }
}
