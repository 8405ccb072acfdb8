use console::Style;

/// How a status string is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Good,
    Warning,
    Bad,
    Unknown,
}

impl StatusClass {
    pub fn of(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "active" | "healthy" | "online" | "running" | "ok" => StatusClass::Good,
            "warning" | "degraded" | "starting" | "maintenance" | "pending" => StatusClass::Warning,
            "error" | "offline" | "unhealthy" | "critical" | "failed" | "down" => StatusClass::Bad,
            _ => StatusClass::Unknown,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            StatusClass::Good => "●",
            StatusClass::Warning => "▲",
            StatusClass::Bad => "✖",
            StatusClass::Unknown => "○",
        }
    }

    /// Classifies a 0-100 health score.
    pub fn of_score(score: f64) -> Self {
        if score >= 80.0 {
            StatusClass::Good
        } else if score >= 50.0 {
            StatusClass::Warning
        } else {
            StatusClass::Bad
        }
    }
}

/// Colour decisions for terminal output, kept apart from layout so the
/// renderers can be exercised without a terminal.
#[derive(Debug, Clone)]
pub struct Palette {
    good: Style,
    warning: Style,
    bad: Style,
    muted: Style,
    heading: Style,
}

impl Palette {
    /// Colours when stdout is a terminal that supports them.
    pub fn detect() -> Self {
        if console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            good: Style::new().green().force_styling(true),
            warning: Style::new().yellow().force_styling(true),
            bad: Style::new().red().force_styling(true),
            muted: Style::new().dim().force_styling(true),
            heading: Style::new().bold().cyan().force_styling(true),
        }
    }

    pub fn plain() -> Self {
        Self {
            good: Style::new(),
            warning: Style::new(),
            bad: Style::new(),
            muted: Style::new(),
            heading: Style::new(),
        }
    }

    fn style(&self, class: StatusClass) -> &Style {
        match class {
            StatusClass::Good => &self.good,
            StatusClass::Warning => &self.warning,
            StatusClass::Bad => &self.bad,
            StatusClass::Unknown => &self.muted,
        }
    }

    pub fn paint(&self, class: StatusClass, text: &str) -> String {
        self.style(class).apply_to(text).to_string()
    }

    /// `● active`, coloured by what the status means.
    pub fn status(&self, status: &str) -> String {
        let class = StatusClass::of(status);
        self.paint(class, &format!("{} {}", class.glyph(), status))
    }

    pub fn score(&self, score: f64) -> String {
        self.paint(StatusClass::of_score(score), &format!("{:.0}", score))
    }

    pub fn heading(&self, text: &str) -> String {
        self.heading.apply_to(text).to_string()
    }

    pub fn muted(&self, text: &str) -> String {
        self.muted.apply_to(text).to_string()
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(StatusClass::Good, &format!("✔ {}", text))
    }

    pub fn failure(&self, text: &str) -> String {
        self.paint(StatusClass::Bad, &format!("✖ {}", text))
    }
}
