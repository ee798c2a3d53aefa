//! Static catalogue of the tools exposed by the web app.
//!
//! The host renders navigation and the search box from this list, so the ids
//! double as route segments (`/tools/<id>`).
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    pub features: &'static [&'static str],
    /// Short alias typed into the command palette, e.g. `pct`.
    pub shortcut: Option<&'static str>,
    pub path: &'static str,
}

static TOOLS: &[Tool] = &[
    Tool {
        id: "percentage-calculator",
        name: "Percentage Calculator",
        description: "Calculate percentages, percentage change and percentage difference",
        category: "calculators",
        keywords: &["percent", "percentage", "ratio", "increase", "decrease", "discount"],
        features: &["percent of", "what percent", "percent change", "percent difference"],
        shortcut: Some("pct"),
        path: "/tools/percentage-calculator",
    },
    Tool {
        id: "bmi-calculator",
        name: "BMI Calculator",
        description: "Compute body mass index in metric or imperial units",
        category: "calculators",
        keywords: &["bmi", "body mass index", "weight", "health", "height"],
        features: &["metric units", "imperial units", "healthy weight range"],
        shortcut: Some("bmi"),
        path: "/tools/bmi-calculator",
    },
    Tool {
        id: "json-formatter",
        name: "JSON Formatter",
        description: "Pretty-print, minify and validate JSON documents",
        category: "formatters",
        keywords: &["json", "format", "beautify", "minify", "validate", "pretty print"],
        features: &["pretty print", "minify", "error location"],
        shortcut: Some("json"),
        path: "/tools/json-formatter",
    },
    Tool {
        id: "jwt-decoder",
        name: "JWT Decoder",
        description: "Decode JSON Web Tokens and inspect header, payload and expiry",
        category: "converters",
        keywords: &["jwt", "token", "json web token", "decode", "auth", "bearer"],
        features: &["header", "payload", "expiry check", "hmac signing"],
        shortcut: Some("jwt"),
        path: "/tools/jwt-decoder",
    },
    Tool {
        id: "gradient-generator",
        name: "CSS Gradient Generator",
        description: "Build linear and radial CSS gradients from color stops",
        category: "generators",
        keywords: &["css", "gradient", "color", "linear", "radial", "background"],
        features: &["linear gradient", "radial gradient", "color stops"],
        shortcut: Some("grad"),
        path: "/tools/gradient-generator",
    },
    Tool {
        id: "lorem-ipsum",
        name: "Lorem Ipsum Generator",
        description: "Generate placeholder text as words, sentences or paragraphs",
        category: "generators",
        keywords: &["lorem", "ipsum", "placeholder", "dummy text", "filler"],
        features: &["paragraphs", "sentences", "words"],
        shortcut: Some("lorem"),
        path: "/tools/lorem-ipsum",
    },
    Tool {
        id: "countdown-timer",
        name: "Countdown Timer",
        description: "Count down from a set duration with pause and resume",
        category: "timers",
        keywords: &["timer", "countdown", "alarm", "clock"],
        features: &["pause", "resume", "reset"],
        shortcut: Some("timer"),
        path: "/tools/countdown-timer",
    },
    Tool {
        id: "stopwatch",
        name: "Stopwatch",
        description: "Measure elapsed time and record laps",
        category: "timers",
        keywords: &["stopwatch", "lap", "elapsed", "clock", "time"],
        features: &["laps", "split times"],
        shortcut: Some("sw"),
        path: "/tools/stopwatch",
    },
    Tool {
        id: "pomodoro-timer",
        name: "Pomodoro Timer",
        description: "Alternate focused work sessions with short and long breaks",
        category: "timers",
        keywords: &["pomodoro", "focus", "productivity", "break", "timer"],
        features: &["work sessions", "short breaks", "long breaks"],
        shortcut: Some("pomo"),
        path: "/tools/pomodoro-timer",
    },
];

pub fn all_tools() -> &'static [Tool] {
    TOOLS
}

pub fn find_tool(id: &str) -> Option<&'static Tool> {
    let id = id.trim();
    TOOLS.iter().find(|tool| tool.id == id)
}

pub fn tools_in_category(category: &str) -> Vec<&'static Tool> {
    let category = category.trim().to_lowercase();
    TOOLS
        .iter()
        .filter(|tool| tool.category == category)
        .collect()
}

/// Categories in first-seen order.
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for tool in TOOLS {
        if !out.contains(&tool.category) {
            out.push(tool.category);
        }
    }
    out
}
