// src/presentation.rs

//! Lookup tables and formatting for badges, scores and categories.

use serde::Serialize;

use crate::models::{problem::Category, solution::Badge};

pub const DEFAULT_MAX_VISIBLE_BADGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeMeta {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

/// Display metadata of a badge. Unknown badges have none and are not rendered.
pub fn badge_meta(badge: &Badge) -> Option<BadgeMeta> {
    let meta = match badge {
        Badge::Fastest => BadgeMeta {
            name: "Fastest",
            icon: "⚡",
            color: "#10b981",
            description: "Highest speedup among solutions to this problem",
        },
        Badge::MemoryEfficient => BadgeMeta {
            name: "Memory Efficient",
            icon: "💾",
            color: "#3b82f6",
            description: "Uses the least memory among solutions to this problem",
        },
        Badge::MostEfficient => BadgeMeta {
            name: "Most Efficient",
            icon: "🏆",
            color: "#8b5cf6",
            description: "Best balance of speed and memory",
        },
        Badge::Readable => BadgeMeta {
            name: "Readable",
            icon: "📖",
            color: "#f59e0b",
            description: "High readability score",
        },
        Badge::Verified => BadgeMeta {
            name: "Verified",
            icon: "✅",
            color: "#22c55e",
            description: "Output verified against the baseline",
        },
        Badge::CommunityFavorite => BadgeMeta {
            name: "Community Favorite",
            icon: "❤️",
            color: "#ec4899",
            description: "Among the most voted solutions",
        },
        Badge::Minimal => BadgeMeta {
            name: "Minimal",
            icon: "✂️",
            color: "#6366f1",
            description: "Fewest lines of code",
        },
        Badge::Other(_) => return None,
    };
    Some(meta)
}

/// Badges to show plus the count hidden behind a `+N` marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeList {
    pub visible: Vec<Badge>,
    pub remaining: usize,
}

impl BadgeList {
    pub fn new(badges: &[Badge], max_visible: usize) -> Self {
        let visible: Vec<Badge> = badges.iter().take(max_visible).cloned().collect();
        Self {
            remaining: badges.len().saturating_sub(visible.len()),
            visible,
        }
    }

    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self
            .visible
            .iter()
            .filter_map(|b| badge_meta(b).map(|m| format!("{} {}", m.icon, m.name)))
            .collect();
        if self.remaining > 0 {
            parts.push(format!("+{}", self.remaining));
        }
        parts.join(" · ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl EfficiencyTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            EfficiencyTier::Excellent
        } else if score >= 60.0 {
            EfficiencyTier::Good
        } else if score >= 40.0 {
            EfficiencyTier::Fair
        } else {
            EfficiencyTier::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EfficiencyTier::Excellent => "Excellent",
            EfficiencyTier::Good => "Good",
            EfficiencyTier::Fair => "Fair",
            EfficiencyTier::Poor => "Poor",
        }
    }

    /// Colored marker for markdown output (green, blue, yellow, red).
    pub fn marker(&self) -> &'static str {
        match self {
            EfficiencyTier::Excellent => "🟢",
            EfficiencyTier::Good => "🔵",
            EfficiencyTier::Fair => "🟡",
            EfficiencyTier::Poor => "🔴",
        }
    }
}

/// `"87/100"` for an efficiency score.
pub fn efficiency_label(score: f64) -> String {
    format!("{:.0}/100", score)
}

/// `"87/100 🟢 Excellent"`: the score label followed by its tier.
pub fn efficiency_cell(score: f64) -> String {
    let tier = EfficiencyTier::from_score(score);
    format!("{} {} {}", efficiency_label(score), tier.marker(), tier.label())
}

pub fn category_meta(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Sorting => ("Sorting", "⬆️"),
        Category::Searching => ("Searching", "🔍"),
        Category::Graphs => ("Graphs", "🌐"),
        Category::Strings => ("Strings", "📝"),
        Category::Math => ("Math", "🔢"),
        Category::DataStructures => ("Data Structures", "🗂️"),
        Category::Io => ("I/O Optimization", "⚡"),
        Category::Memory => ("Memory Management", "💾"),
        Category::Crypto => ("Cryptography", "🔐"),
        Category::Ml => ("Machine Learning", "🤖"),
    }
}

/// `"12.5x faster"`, or `"N/A"` when unknown.
pub fn format_speedup(speedup: Option<f64>) -> String {
    match speedup {
        Some(s) if s.is_finite() => {
            if s.fract() == 0.0 {
                format!("{:.0}x faster", s)
            } else {
                format!("{:.1}x faster", s)
            }
        }
        _ => "N/A".to_string(),
    }
}

pub fn format_ms(ms: f64, precision: usize) -> String {
    format!("{:.*}ms", precision, ms)
}

pub fn format_kb(bytes: u64) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}

/// `1234567` -> `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
