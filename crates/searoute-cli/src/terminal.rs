//! Colors for the text renderer.
//!
//! Every field of [`ColorPalette`] is an ANSI sequence named after the role it
//! plays in route output, or `""` when color is off.

/// Raw SGR sequences.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    /// Reverse video green, used for the departure label.
    pub const DEPARTURE: &str = "\x1b[1;7;32m";
    pub const WAYPOINT: &str = "\x1b[1;7;36m";
    pub const ARRIVAL: &str = "\x1b[1;7;35m";
    pub const EMPHASIS: &str = "\x1b[1;97m";
    pub const MUTED: &str = "\x1b[90m";
    pub const WATER: &str = "\x1b[34m";
    pub const WARNING: &str = "\x1b[33m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub departure: &'static str,
    pub waypoint: &'static str,
    pub arrival: &'static str,
    /// Headline values.
    pub emphasis: &'static str,
    /// Cell indices and search statistics.
    pub muted: &'static str,
    /// Snapped coordinates.
    pub water: &'static str,
    /// Straight-line fallbacks.
    pub warning: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            departure: colors::DEPARTURE,
            waypoint: colors::WAYPOINT,
            arrival: colors::ARRIVAL,
            emphasis: colors::EMPHASIS,
            muted: colors::MUTED,
            water: colors::WATER,
            warning: colors::WARNING,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            departure: "",
            waypoint: "",
            arrival: "",
            emphasis: "",
            muted: "",
            water: "",
            warning: "",
        }
    }

    /// Picks [`colored`](Self::colored) or [`plain`](Self::plain) from the environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::for_env(
            std::env::var_os("NO_COLOR").is_some(),
            std::env::var("TERM").ok().as_deref(),
        )
    }

    /// `NO_COLOR` (<https://no-color.org/>) wins over everything; `TERM=dumb` disables color too.
    fn for_env(no_color: bool, term: Option<&str>) -> Self {
        let dumb = term.is_some_and(|t| t.eq_ignore_ascii_case("dumb"));
        if no_color || dumb {
            Self::plain()
        } else {
            Self::colored()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Groups digits in threes for cell and node counts.
///
/// ```
/// # use searoute_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(64_800), "64,800");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut groups: Vec<&str> = Vec::with_capacity(digits.len() / 3 + 1);
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );
    groups.join(",")
}
