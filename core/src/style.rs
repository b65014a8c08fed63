use colored::{Color, ColoredString, Colorize};

use crate::report::Tally;
use crate::testing::Status;

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    match v.as_str() {
        "truecolor" | "24bit" => true,
        _ => false,
    }
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for Status {
    fn color(&self) -> Color {
        use Status::*;
        if !self::is_truecolor_supported() {
            return match self {
                Passed => Color::Green,
                Failed => Color::Yellow,
                TimedOut => Color::Red,
                Errored => Color::Magenta,
                Recorded => Color::Blue,
            };
        }

        match self {
            Passed => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Failed => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            TimedOut => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
            Errored => Color::TrueColor {
                r: 171,
                g: 40,
                b: 200,
            },
            Recorded => Color::TrueColor {
                r: 40,
                g: 110,
                b: 210,
            },
        }
    }
}

pub fn status_badge(status: Status) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", status.code())
        .on_color(status.color())
        .bold()
        .color(fg)
}

/// One-line summary of a graded run, e.g. `All 3 tests passed ✨`.
pub fn summary_line(tally: &Tally, num_malformed: usize) -> String {
    let bar = "-".repeat(5);
    let num_total = tally.total();
    let num_failed = tally.num_failures();

    let msg = if num_failed == 0 && num_malformed == 0 {
        format!("All {} tests passed ✨", num_total).green().to_string()
    } else {
        let summary_msg = if tally.passed > 0 {
            format!("{}/{} tests failed 💣", num_failed, num_total)
        } else {
            format!("All {} tests failed 💀", num_total)
        };

        let mut details: Vec<String> = [Status::Failed, Status::Errored, Status::TimedOut]
            .into_iter()
            .filter(|&s| tally.get(s) > 0)
            .map(|s| {
                format!(
                    "{}{}{}",
                    self::status_badge(s),
                    "x".dimmed(),
                    tally.get(s).to_string().bold().bright_white(),
                )
            })
            .collect();
        if num_malformed > 0 {
            details.push(format!("{} malformed", num_malformed));
        }

        format!("{} ({})", summary_msg.bright_red(), details.join(", "))
    };

    format!("{} {} {}", bar, msg, bar)
}
