/// Fallback colors for datasets without a configured color (ColorBrewer Set1)
pub const SET1: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf", "#999999",
];

/// Color for the dataset at `position`, cycling through the palette.
pub fn default_color(position: usize) -> &'static str {
    SET1[position % SET1.len()]
}
